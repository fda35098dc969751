//! Configuration resolution.
//!
//! Every option is declared once in [`OPTIONS`]. The command line parser,
//! the environment bindings and the help text are all built from that
//! table. Values are resolved with this precedence:
//!
//! 1. command line flag
//! 2. environment variable (`CSVTOJSON_*`)
//! 3. YAML config file given with `--config`
//! 4. the table default
//!
//! Config file layout:
//!
//! ```yaml
//! csv-file: people.csv
//! out-file: people.yaml
//! values:
//!   allow-malformed: true
//!   fill-empty-with: "n/a"
//!   replace-with: "@example\\.com,@example.org"
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use clap::builder::BoolishValueParser;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde::Deserialize;

use crate::error::{ConfigError, ConfigResult};
use crate::output::OutputFormat;
use crate::parser::TransformConfig;

/// Whether an option is a switch or takes a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Flag,
    Value,
}

/// Declaration of one command line option.
#[derive(Debug, Clone, Copy)]
pub struct OptionSpec {
    pub name: &'static str,
    pub short: Option<char>,
    pub env: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub default: &'static str,
}

pub const CONFIG: &str = "config";
pub const CSV_FILE: &str = "csv-file";
pub const OUT_FILE: &str = "out-file";
pub const DEBUG: &str = "debug";
pub const YAML: &str = "yaml";
pub const PRETTY: &str = "pretty";
pub const ALLOW_MALFORMED: &str = "allow-malformed";
pub const FILL_EMPTY_WITH: &str = "fill-empty-with";
pub const REPLACE_WITH: &str = "replace-with";
pub const ENCODING: &str = "encoding";

/// All options understood by the converter.
pub const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: CONFIG,
        short: None,
        env: "CSVTOJSON_CONFIG",
        description: "YAML config file with default values for the other options",
        kind: OptionKind::Value,
        default: "",
    },
    OptionSpec {
        name: CSV_FILE,
        short: Some('c'),
        env: "CSVTOJSON_CSV_FILE",
        description: "input csv file name",
        kind: OptionKind::Value,
        default: "",
    },
    OptionSpec {
        name: OUT_FILE,
        short: Some('o'),
        env: "CSVTOJSON_OUT_FILE",
        description: "output file name; a .yaml or .yml extension selects YAML (default: stdout)",
        kind: OptionKind::Value,
        default: "",
    },
    OptionSpec {
        name: DEBUG,
        short: Some('d'),
        env: "CSVTOJSON_DEBUG",
        description: "print detailed logs for errors",
        kind: OptionKind::Flag,
        default: "false",
    },
    OptionSpec {
        name: YAML,
        short: None,
        env: "CSVTOJSON_YAML",
        description: "marshal to yaml instead of json",
        kind: OptionKind::Flag,
        default: "false",
    },
    OptionSpec {
        name: PRETTY,
        short: None,
        env: "CSVTOJSON_PRETTY",
        description: "indent json output",
        kind: OptionKind::Flag,
        default: "false",
    },
    OptionSpec {
        name: ALLOW_MALFORMED,
        short: None,
        env: "CSVTOJSON_ALLOW_MALFORMED",
        description: "allow parsing malformed CSV",
        kind: OptionKind::Flag,
        default: "false",
    },
    OptionSpec {
        name: FILL_EMPTY_WITH,
        short: None,
        env: "CSVTOJSON_FILL_EMPTY_WITH",
        description: "value to fill empty cells with. --allow-malformed must be set for this to be effective",
        kind: OptionKind::Value,
        default: "",
    },
    OptionSpec {
        name: REPLACE_WITH,
        short: None,
        env: "CSVTOJSON_REPLACE_WITH",
        description: "simple text find and replace. Usage --replace-with <search>,<replacement>",
        kind: OptionKind::Value,
        default: "",
    },
    OptionSpec {
        name: ENCODING,
        short: None,
        env: "CSVTOJSON_ENCODING",
        description: "input encoding label (e.g. latin1), or 'auto' to detect (default: utf-8)",
        kind: OptionKind::Value,
        default: "",
    },
];

impl OptionSpec {
    pub fn find(name: &str) -> Option<&'static OptionSpec> {
        OPTIONS.iter().find(|spec| spec.name == name)
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name)
            .long(self.name)
            .env(self.env)
            .help(self.description);
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        match self.kind {
            OptionKind::Flag => arg
                .action(ArgAction::SetTrue)
                .value_parser(BoolishValueParser::new()),
            OptionKind::Value => arg.action(ArgAction::Set).value_name("VALUE"),
        }
    }
}

/// Build the command line parser from [`OPTIONS`].
pub fn command() -> Command {
    Command::new("csvtojson")
        .version(env!("CARGO_PKG_VERSION"))
        .about("csvtojson is a simple command line tool to parse CSV files and convert them to JSON")
        .args(OPTIONS.iter().map(OptionSpec::to_arg))
}

/// Fully resolved configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub csv_file: PathBuf,
    pub out_file: Option<PathBuf>,
    pub debug: bool,
    pub format: OutputFormat,
    pub pretty: bool,
    pub values: TransformConfig,
}

impl Config {
    /// Resolve from the process arguments and environment.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(std::env::args_os())
    }

    /// Resolve from the given arguments (first item is the program name).
    pub fn load_from<I, T>(args: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> ConfigResult<Self> {
        let file = match matches.get_one::<String>(CONFIG) {
            Some(path) => FileConfig::load(Path::new(path))?,
            None => FileConfig::default(),
        };
        let r = Resolver { matches };

        let csv_file = r
            .string(CSV_FILE, file.csv_file)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .ok_or(ConfigError::MissingCsvFile)?;
        let out_file = r
            .string(OUT_FILE, file.out_file)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let yaml_extension = out_file.as_deref().and_then(OutputFormat::from_path) == Some(OutputFormat::Yaml);
        let format = if r.flag(YAML, file.yaml) || yaml_extension {
            OutputFormat::Yaml
        } else {
            OutputFormat::Json
        };

        let values = TransformConfig {
            allow_malformed: r.flag(ALLOW_MALFORMED, file.values.allow_malformed),
            fill_empty_with: r
                .string(FILL_EMPTY_WITH, file.values.fill_empty_with)
                .unwrap_or_default(),
            replace_with: r
                .string(REPLACE_WITH, file.values.replace_with)
                .filter(|s| !s.is_empty()),
            encoding: r
                .string(ENCODING, file.values.encoding)
                .filter(|s| !s.is_empty()),
        };

        Ok(Config {
            csv_file,
            out_file,
            debug: r.flag(DEBUG, file.debug),
            format,
            pretty: r.flag(PRETTY, file.pretty),
            values,
        })
    }

    /// Option combinations that are accepted but have no effect.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.values.allow_malformed && !self.values.fill_empty_with.is_empty() {
            warnings.push(format!(
                "--{} has no effect without --{}",
                FILL_EMPTY_WITH, ALLOW_MALFORMED
            ));
        }
        if self.pretty && self.format == OutputFormat::Yaml {
            warnings.push(format!("--{} only applies to JSON output", PRETTY));
        }
        warnings
    }
}

struct Resolver<'a> {
    matches: &'a ArgMatches,
}

impl Resolver<'_> {
    fn explicit(&self, name: &str) -> bool {
        matches!(
            self.matches.value_source(name),
            Some(ValueSource::CommandLine | ValueSource::EnvVariable)
        )
    }

    fn string(&self, name: &str, from_file: Option<String>) -> Option<String> {
        if self.explicit(name) {
            return self.matches.get_one::<String>(name).cloned();
        }
        from_file.or_else(|| {
            OptionSpec::find(name)
                .map(|spec| spec.default)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
        })
    }

    fn flag(&self, name: &str, from_file: Option<bool>) -> bool {
        if self.explicit(name) {
            return self.matches.get_flag(name);
        }
        from_file.unwrap_or_else(|| {
            OptionSpec::find(name).is_some_and(|spec| spec.default == "true")
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct FileConfig {
    csv_file: Option<String>,
    out_file: Option<String>,
    debug: Option<bool>,
    yaml: Option<bool>,
    pretty: Option<bool>,
    values: FileValues,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct FileValues {
    allow_malformed: Option<bool>,
    fill_empty_with: Option<String>,
    replace_with: Option<String>,
    encoding: Option<String>,
}

impl FileConfig {
    fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }
}
