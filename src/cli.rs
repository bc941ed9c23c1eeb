//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the roster manager.

use clap::{Args, Parser, Subcommand};

/// Hogwarts Roster - browse and manage the student roster
///
/// Loads the student list and the family lists, derives names, portraits and
/// blood status, and lets you filter, sort, search and assign roles.
#[derive(Parser, Debug)]
#[command(name = "hogwarts-roster")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the roster comes from
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Path to configuration file
    #[arg(short, long, env = "ROSTER_CONFIG")]
    pub config: Option<String>,

    /// Student list location (http(s) URL, file:// URL or path)
    #[arg(long)]
    pub students_url: Option<String>,

    /// Family lists location (http(s) URL, file:// URL or path)
    #[arg(long)]
    pub families_url: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the filtered, sorted student listing
    List {
        #[command(flatten)]
        source: SourceArgs,

        /// Filter: all, expelled, prefects, squad, a house or a blood status
        #[arg(short, long)]
        filter: Option<String>,

        /// Sort key: first-name, middle-name, last-name, nick-name, house, blood-status, gender
        #[arg(short, long)]
        sort: Option<String>,

        /// Sort direction: asc or desc
        #[arg(short, long)]
        direction: Option<String>,

        /// Only students whose first, last or nick name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the detail card of a student
    Show {
        #[command(flatten)]
        source: SourceArgs,

        /// Full name or first name of the student
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Count the students each filter would show
    Counts {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Start an interactive session
    Shell {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

impl Commands {
    /// Source arguments of commands that load the roster
    pub fn source(&self) -> Option<&SourceArgs> {
        match self {
            Commands::List { source, .. }
            | Commands::Show { source, .. }
            | Commands::Counts { source }
            | Commands::Shell { source } => Some(source),
            Commands::Version | Commands::Config { .. } => None,
        }
    }
}
