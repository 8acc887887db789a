use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line access to the Kodik search API
#[derive(Parser)]
#[command(name = "kodik")]
#[command(about = "Query the Kodik video metadata API", long_about = None)]
pub struct Cli {
    /// TOML source configuration; KODIK_* environment variables are used when absent
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Token cache database URL (defaults to a SQLite file in the user data directory)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Remember validated tokens for this run only
    #[arg(long, global = true)]
    pub no_persist: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the configured token is accepted
    Check {
        /// Trust a previous successful check
        #[arg(long)]
        cache: bool,
    },
    /// Search materials by title
    Search {
        /// At least three characters
        title: String,
    },
    /// Fetch one material by its Kodik id
    Get {
        id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let cli = Cli::parse_from(["kodik", "check", "--cache"]);
        assert!(matches!(cli.command, Commands::Check { cache: true }));

        let cli = Cli::parse_from(["kodik", "search", "Наруто", "--no-persist"]);
        assert!(cli.no_persist);
        assert!(matches!(cli.command, Commands::Search { ref title } if title == "Наруто"));

        let cli = Cli::parse_from(["kodik", "--config", "kodik.toml", "get", "serial-1"]);
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("kodik.toml")));
        assert!(matches!(cli.command, Commands::Get { ref id } if id == "serial-1"));
    }
}
