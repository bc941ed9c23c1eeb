//! Hogwarts Roster - student roster manager
//!
//! Loads the student and family documents, then lists, searches and
//! manages students from the command line or an interactive shell.

mod cli;
mod config;
mod error;
mod logging;
mod roster;
mod shell;
mod source;
mod ui;
mod version;

use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};

use crate::cli::{Cli, Commands, ConfigSubcommand, SourceArgs};
use crate::config::RosterConfig;
use crate::error::{Error, Result};
use crate::roster::{Filter, Roster};
use crate::shell::Session;
use crate::source::DocumentSource;

fn main() {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        debug!(error = %e.format_for_log(), "Command failed");
        ui::show_error(&e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<()> {
    // Commands that don't load the roster use simple setup
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone());
        }
        _ => {}
    }

    let source = cli.command.source().cloned().unwrap_or_default();
    let config = load_config(&source)?;

    // The guards must be kept alive for the lifetime of the program
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    let build = version::build_info();
    info!(
        version = %build.full_version(),
        students = %config.source.students_url,
        families = %config.source.families_url,
        "Starting hogwarts-roster"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(execute(cli.command, config))
}

/// Load the configuration and apply source overrides from the command line
fn load_config(source: &SourceArgs) -> Result<RosterConfig> {
    let mut config = RosterConfig::load(source.config.as_deref())?;

    if let Some(url) = &source.students_url {
        config.source.students_url = url.clone();
    }
    if let Some(url) = &source.families_url {
        config.source.families_url = url.clone();
    }
    config.validate()?;

    Ok(config)
}

/// Fetch both documents and build the roster with the configured view
async fn load_roster(config: &RosterConfig) -> Result<Roster> {
    let source = DocumentSource::from_locations(
        &config.source.students_url,
        &config.source.families_url,
        config.source.timeout_secs,
    )?;
    let students = source::load(&source, &config.image_layout()).await?;

    let mut roster = Roster::new(config.filter(), config.sort_spec());
    roster.set_students(students);
    Ok(roster)
}

async fn execute(command: Commands, config: RosterConfig) -> Result<()> {
    match command {
        Commands::List {
            filter,
            sort,
            direction,
            search,
            json,
            ..
        } => {
            // Reject bad arguments before fetching anything
            let mut spec = config.sort_spec();
            if let Some(key) = sort {
                spec.key = key.parse()?;
            }
            if let Some(direction) = direction {
                spec.direction = direction.parse()?;
            }

            let mut roster = load_roster(&config).await?;
            if let Some(filter) = filter {
                roster.set_filter(Filter::parse(&filter));
            }
            roster.set_sort(spec);

            let (title, rows) = match search.as_deref() {
                Some(term) if !term.trim().is_empty() => {
                    let rows = roster
                        .search(term, config.view.max_search_len)
                        .map_err(|e| Error::invalid_argument("search term", term, e.to_string()))?;
                    (format!("SEARCH \"{}\"", term.trim()), rows)
                }
                _ => (roster.filter().title(), roster.view()),
            };

            if json {
                let output = serde_json::to_string_pretty(&rows)
                    .map_err(|e| Error::Internal(format!("Failed to serialize listing: {}", e)))?;
                println!("{}", output);
            } else {
                print!(
                    "{}",
                    ui::render_listing(&title, &roster.sort(), &rows, roster.len())
                );
            }
        }

        Commands::Show { name, .. } => {
            let query = name.join(" ");
            let roster = load_roster(&config).await?;
            let student = roster
                .find_by_name(&query)
                .ok_or(Error::StudentNotFound { query })?;
            print!(
                "{}",
                ui::render_detail(student, &config.image_layout(), &config.placeholder_path())
            );
        }

        Commands::Counts { .. } => {
            let roster = load_roster(&config).await?;
            print!("{}", ui::render_counts(&roster.counts()));
        }

        Commands::Shell { .. } => {
            let roster = load_roster(&config).await?;
            let session = Session::new(
                roster,
                config.view.max_search_len,
                config.image_layout(),
                config.placeholder_path(),
            );
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            shell::run(
                session,
                input,
                &mut stdout,
                Duration::from_millis(config.view.search_debounce_ms),
            )
            .await?;
        }

        Commands::Version | Commands::Config { .. } => {
            return Err(Error::Internal(
                "command does not load the roster".to_string(),
            ));
        }
    }

    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = RosterConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            let path = config::init_config(path.as_deref(), force)?;
            println!("Configuration file created: {}", path.display());
        }
        ConfigSubcommand::Validate { config } => {
            RosterConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}
