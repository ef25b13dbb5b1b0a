//! `meridian`: compile Filter Encoding 2.0 filters from the command line
//!
//! Usage:
//!   meridian compile --filter roads.xml --mapping roads.json [--strict-type-names] [--pretty]
//!   meridian parse --filter roads.xml

mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use meridian_fes::{parse_filter_str, CompileOptions, Compiler, FieldMapping, Filter};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[clap(name = "meridian")]
#[clap(about = "Compile OGC Filter Encoding 2.0 filters into backend-neutral predicates")]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[clap(long, global = true, default_value = "warn")]
    log_level: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a filter against a field mapping and print the predicate as JSON
    Compile {
        /// Filter XML document
        #[clap(short, long)]
        filter: PathBuf,

        /// Field mapping JSON file
        #[clap(short, long)]
        mapping: PathBuf,

        /// Fail on identifiers of other feature types instead of skipping them
        #[clap(long)]
        strict_type_names: bool,

        /// Pretty-print the JSON output
        #[clap(long)]
        pretty: bool,
    },

    /// Parse a filter and print its syntax tree
    Parse {
        /// Filter XML document
        #[clap(short, long)]
        filter: PathBuf,
    },
}

fn read_filter(path: &Path) -> Result<Filter> {
    let xml = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read filter {}", path.display()))?;
    parse_filter_str(&xml).with_context(|| format!("Invalid filter in {}", path.display()))
}

fn read_mapping(path: &Path) -> Result<FieldMapping> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mapping {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid mapping in {}", path.display()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Compile {
            filter,
            mapping,
            strict_type_names,
            pretty,
        } => {
            let parsed = read_filter(&filter)?;
            let mapping = read_mapping(&mapping)?;
            info!(feature_type = %mapping.type_name, "Compiling {}", filter.display());

            let predicate = Compiler::new(&mapping)
                .with_options(CompileOptions { strict_type_names })
                .compile(&parsed)
                .with_context(|| format!("Failed to compile {}", filter.display()))?;

            let json = if pretty {
                serde_json::to_string_pretty(&predicate)?
            } else {
                serde_json::to_string(&predicate)?
            };
            println!("{}", json);
        }
        Command::Parse { filter } => {
            let parsed = read_filter(&filter)?;
            println!("{:#?}", parsed);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_simple_logging(&cli.log_level);
    run(cli)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_compile_arguments() {
        let cli = Cli::try_parse_from([
            "meridian",
            "compile",
            "--filter",
            "f.xml",
            "--mapping",
            "m.json",
            "--pretty",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Command::Compile {
                filter,
                mapping,
                strict_type_names,
                pretty,
            } => {
                assert_eq!(filter, PathBuf::from("f.xml"));
                assert_eq!(mapping, PathBuf::from("m.json"));
                assert!(!strict_type_names);
                assert!(pretty);
            }
            other => panic!("expected compile, got {:?}", other),
        }
    }
}
