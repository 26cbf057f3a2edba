use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cantine planner: invoice scanning, weekly menus and BIO/EGALIM tracking
/// for a school kitchen.
#[derive(Parser, Debug)]
#[command(name = "cantine")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the TOML config file (default: ./cantine.toml if present).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted JSON collections.
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive kitchen session (scan, compose, analyse).
    Session,

    /// Print the menu grid of a week.
    Grid {
        /// Any date in the week (YYYY-MM-DD); defaults to today.
        #[arg(short, long)]
        week: Option<String>,
    },

    /// Print the menu cost and BIO/EGALIM analysis of a week.
    Analysis {
        /// Any date in the week (YYYY-MM-DD); defaults to today.
        #[arg(short, long)]
        week: Option<String>,

        /// Students per day; overrides the configured count.
        #[arg(short, long)]
        students: Option<i64>,
    },

    /// Export a week's menu as CSV.
    Export {
        /// Any date in the week (YYYY-MM-DD); defaults to today.
        #[arg(short, long)]
        week: Option<String>,

        /// Output file or directory.
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List saved recipes.
    Recipes,
}

impl Default for Command {
    fn default() -> Self {
        Command::Session
    }
}
