use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "inventory")]
#[command(about = "Inventory database operations")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Apply schema migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Print per-item lot usage as JSON
    UsageReport {
        /// Indent the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum MigrateAction {
    /// Apply the whole catalog in order
    Up,
    /// Apply the named catalog migrations in the order given
    Apply {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Apply SQL files, each as one migration
    File {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print catalog migration names
    List,
}

impl Command {
    pub fn needs_database(&self) -> bool {
        !matches!(
            self,
            Command::Migrate {
                action: MigrateAction::List
            }
        )
    }
}
