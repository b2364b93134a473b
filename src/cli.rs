//! FsaKit CLI - inspect, reformat and simulate automaton files
//!
//! ```bash
//! fsakit-cli check door.fsa
//! fsakit-cli fmt door.fsa -o door.fsa
//! fsakit-cli dump door.fsa --json
//! fsakit-cli simulate door.fsa open close ?
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::info;
use thiserror::Error;

use fsakit::parser::EPSILON_TOKEN;
use fsakit::{read_file, to_text, write_file, Automaton, CodecError};

#[derive(Parser, Debug)]
#[command(name = "fsakit-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a file and summarise it
    Check { file: PathBuf },
    /// Read a file and write it back in canonical form
    Fmt {
        file: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the automaton description
    Dump {
        file: PathBuf,
        /// Print a JSON snapshot instead
        #[arg(long)]
        json: bool,
    },
    /// Reset, then step through the given events ('?' is epsilon)
    Simulate { file: PathBuf, events: Vec<String> },
}

#[derive(Error, Debug)]
enum CliError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("Could not encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Check { file } => {
            let fsa = load(&file)?;
            println!("✅ {} is a valid automaton", file.display());
            println!("  States: {}", fsa.state_count());
            println!("  Transitions: {}", fsa.transition_count());
            println!("  Initial: {}", names(fsa.initial_states()));
            println!("  Final: {}", names(fsa.final_states()));
        }
        Commands::Fmt { file, output } => {
            let fsa = load(&file)?;
            match output {
                Some(path) => {
                    write_file(&path, &fsa)?;
                    info!("Wrote {}", path.display());
                }
                None => print!("{}", to_text(&fsa)),
            }
        }
        Commands::Dump { file, json } => {
            let fsa = load(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&fsa.snapshot())?);
            } else {
                print!("{}", fsa.serialize());
            }
        }
        Commands::Simulate { file, events } => {
            let mut fsa = load(&file)?;
            fsa.reset();
            println!("reset -> {}", names(fsa.current_states()));
            for event in &events {
                let trigger = (event != EPSILON_TOKEN).then_some(event.as_str());
                fsa.step(trigger);
                println!("step {} -> {}", event, names(fsa.current_states()));
            }
            println!("recognised: {}", fsa.is_recognised());
        }
    }

    Ok(())
}

fn load(path: &Path) -> Result<Automaton, CodecError> {
    let mut fsa = Automaton::new();
    read_file(path, &mut fsa)?;
    info!(
        "Loaded {} ({} states, {} transitions)",
        path.display(),
        fsa.state_count(),
        fsa.transition_count()
    );
    Ok(fsa)
}

fn names<'a>(states: impl Iterator<Item = &'a fsakit::State>) -> String {
    let names: Vec<&str> = states.map(|s| s.name()).collect();
    format!("{{{}}}", names.join(", "))
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
    fn test_simulate_arguments() {
        let cli = Cli::try_parse_from(["fsakit-cli", "simulate", "door.fsa", "open", "?"]).unwrap();
        match cli.command {
            Commands::Simulate { file, events } => {
                assert_eq!(file, PathBuf::from("door.fsa"));
                assert_eq!(events, ["open", "?"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_configuration_flags_are_not_accepted() {
        assert!(Cli::try_parse_from(["fsakit-cli", "--notify-on-remove", "check", "a.fsa"]).is_err());
        assert!(Cli::try_parse_from(["fsakit-cli", "check", "a.fsa", "--config", "c.json"]).is_err());
    }
}
