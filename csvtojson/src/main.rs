//! csvtojson CLI - convert a CSV file to JSON or YAML
//!
//! ```bash
//! csvtojson -c people.csv                          # JSON on stdout
//! csvtojson -c people.csv -o people.yaml           # YAML file
//! csvtojson -c people.csv --allow-malformed --fill-empty-with n/a
//! csvtojson -c people.csv --replace-with 'Rob,Bob'
//! csvtojson --config csvtojson.yaml                # options from a file
//! ```
//!
//! Every option can also be set through its `CSVTOJSON_*` environment
//! variable or a `.env` file in the working directory.

use std::fs;
use std::io::Write;
use std::path::Path;

use csvtojson::{init_subscriber, parse, Config, ConfigError, Error, Logger};

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let config = match Config::load() {
        Ok(config) => config,
        Err(ConfigError::Args(e)) => e.exit(),
        Err(e) => {
            init_subscriber(false);
            Logger::tracing().error(e.to_string());
            std::process::exit(1);
        }
    };

    init_subscriber(config.debug);
    let logger = Logger::tracing();

    if let Err(e) = run(&config, &logger) {
        logger.error(e.to_string());
        std::process::exit(1);
    }
}

fn run(config: &Config, logger: &Logger) -> Result<(), Error> {
    for warning in config.warnings() {
        logger.warning(warning);
    }

    let raw = fs::read(&config.csv_file).map_err(|source| Error::Io {
        path: config.csv_file.clone(),
        source,
    })?;
    logger
        .with_field("file", config.csv_file.display())
        .with_field("bytes", raw.len())
        .debug("Read input");

    let table = parse(&raw, &config.values, Some(logger))?;
    logger
        .with_field("records", table.len())
        .with_field("columns", table.headers().len())
        .debug("Parsed CSV");

    let marshaled = table.marshal(config.format, config.pretty)?;
    write_output(&marshaled, config.out_file.as_deref())?;
    Ok(())
}

fn write_output(content: &[u8], path: Option<&Path>) -> Result<(), Error> {
    match path {
        Some(p) => fs::write(p, content).map_err(|source| Error::Io {
            path: p.to_path_buf(),
            source,
        }),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content)
                .and_then(|_| {
                    if content.ends_with(b"\n") {
                        Ok(())
                    } else {
                        stdout.write_all(b"\n")
                    }
                })
                .map_err(|source| Error::Io {
                    path: "<stdout>".into(),
                    source,
                })
        }
    }
}
