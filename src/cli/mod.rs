pub mod form;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "dailyreport",
    about = "Teacher's daily classroom report with spreadsheet submission"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fill in the report interactively, section by section
    Fill,
    /// Print the current draft
    Show {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Set a single field of the draft
    Set { field: String, value: String },
    /// Submit the draft to the configured webhook
    Submit,
    /// Copy a short summary to the clipboard
    Copy,
    /// Write a printable Markdown and JSON copy of the report
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Discard the draft and start a fresh report
    Clear,
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Doctor,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_set_command() {
        let cli = Cli::try_parse_from(["dailyreport", "set", "teacher_name", "Ms. Achieng"])
            .expect("set parsed");

        match cli.command {
            Commands::Set { field, value } => {
                assert_eq!(field, "teacher_name");
                assert_eq!(value, "Ms. Achieng");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
