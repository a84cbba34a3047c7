use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fragmap")]
#[command(about = "Structural and fragility profiler for Python codebases", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Files or directories to ingest before running the command
    #[arg(short, long = "path", global = true, default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Configuration file (defaults to the nearest .fragmap.toml)
    #[arg(short, long, global = true, env = "FRAGMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "terminal")]
    pub format: OutputFormat,

    /// Run without the persistent store
    #[arg(long = "no-store", global = true)]
    pub no_store: bool,

    /// Number of extraction threads (0 = all cores)
    #[arg(short = 'j', long, global = true)]
    pub jobs: Option<usize>,

    /// Increase verbosity level (can be repeated: -v, -vv)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract facts from the paths and refresh the baseline
    Ingest,

    /// Interpret, judge and score every file in scope
    Analyze {
        /// Only files whose path contains this text
        #[arg(default_value = "")]
        scope: String,
    },

    /// Multi-factor fragility scores
    Risk {
        #[arg(default_value = "")]
        scope: String,
    },

    /// Check architectural policy rules
    Policy {
        #[arg(default_value = "")]
        scope: String,
    },

    /// Extrapolate a file's health from its stored history
    Forecast {
        /// File to forecast
        source: String,
    },

    /// Compare the structural complexity of two files
    Compare { a: String, b: String },

    /// Propose a refactor plan for a file
    Plan { target: String },

    /// Summary of the dependency graph and role distribution
    Blueprint,

    /// Executive summary over every stored analysis
    Insights,

    /// Warn about the worst stored offender
    Alert,

    /// Fail when any file is RED or health is below the configured floor
    Gate {
        /// Report the verdict without failing
        #[arg(long)]
        shadow: bool,
    },

    /// Search logged interactions
    Recall { keyword: String },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum OutputFormat {
    Json,
    Terminal,
}

impl From<OutputFormat> for crate::io::OutputFormat {
    fn from(f: OutputFormat) -> Self {
        match f {
            OutputFormat::Json => crate::io::OutputFormat::Json,
            OutputFormat::Terminal => crate::io::OutputFormat::Terminal,
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fragmap", "gate", "--shadow", "-p", "src", "-p", "lib", "--format", "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Gate { shadow: true }));
        assert_eq!(cli.paths, vec![PathBuf::from("src"), PathBuf::from("lib")]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["fragmap", "analyze"]).unwrap();
        assert_eq!(cli.paths, vec![PathBuf::from(".")]);
        assert_eq!(cli.verbosity, 0);
        assert!(matches!(cli.command, Commands::Analyze { ref scope } if scope.is_empty()));
    }

    #[test]
    fn test_compare_requires_two_targets() {
        assert!(Cli::try_parse_from(["fragmap", "compare", "a.py"]).is_err());
    }
}
