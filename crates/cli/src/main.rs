mod metrics;
mod prompt;
mod summary;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use accredit_core::{
    load_config, load_config_from_env, package_pending, render_single, suggest_column_mapping,
    AttendeeRecord, BatchRunner, CardRenderer, Config, PdfCardRenderer, ResolvedConfig, Role,
    RosterReader, SanitizedConfig, ZipArchiver,
};

/// Config file used when none is given and it exists.
const DEFAULT_CONFIG: &str = "accredit.toml";

/// Range of identifiers drawn by `single --random` (11 digits).
const RANDOM_ID_RANGE: std::ops::Range<u64> = 20_000_000_000..30_000_000_000;

/// Accredit: event accreditation cards from a ticketing export
///
/// Renders one PDF card per attendee (QR code plus name on the role's
/// template) and packages each run into a single timestamped zip archive.
#[derive(Parser, Debug)]
#[command(name = "accredit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (defaults to accredit.toml when present)
    #[arg(short, long, env = "ACCREDIT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Write a Prometheus text snapshot of the run's metrics to this file
    #[arg(long)]
    metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render cards for every attendee in a roster and archive them
    #[command(alias = "run")]
    Batch {
        /// Roster file (defaults to the latest file in the input folder)
        input: Option<PathBuf>,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render a single card without a roster or archive
    Single {
        /// Attendee identifier encoded in the QR code
        #[arg(conflicts_with = "random")]
        id: Option<String>,

        /// Use a random 11-digit identifier
        #[arg(long)]
        random: bool,

        /// Force a role instead of classifying the ticket type
        #[arg(long)]
        role: Option<Role>,

        /// Ticket type to classify
        #[arg(long)]
        ticket_type: Option<String>,

        /// First name (prompted when omitted)
        #[arg(long)]
        first_name: Option<String>,

        /// Last name (prompted when omitted)
        #[arg(long)]
        last_name: Option<String>,

        /// Company line
        #[arg(long)]
        company: Option<String>,
    },

    /// Archive cards left in the output folder by a run whose packaging failed
    Package {
        /// Print the archive manifest as JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest a column mapping for a roster's header row
    Columns {
        /// Roster file to inspect
        file: PathBuf,

        /// Print the suggestion as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.json_logs);

    let metrics_file = cli.metrics_file.clone();
    let result = run(cli).await;

    if let Some(path) = metrics_file {
        if let Err(e) = metrics::write_metrics_file(&path) {
            warn!("Failed to write metrics to {}: {:#}", path.display(), e);
        }
    }

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so JSON summaries on stdout stay parseable
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Batch { input, json } => {
            let settings = resolve_settings(cli.config.as_deref())?;
            run_batch(settings, input.as_deref(), json).await
        }
        Commands::Single {
            id,
            random,
            role,
            ticket_type,
            first_name,
            last_name,
            company,
        } => {
            let settings = resolve_settings(cli.config.as_deref())?;
            let id = match (id, random) {
                (_, true) => random_attendee_id(&mut rand::rng()),
                (Some(id), false) => id,
                (None, false) => prompt::ask("Attendee identifier", None)?,
            };
            let first_name = match first_name {
                Some(name) => name,
                None => prompt::ask("First name", None)?,
            };
            let last_name = match last_name {
                Some(name) => name,
                None => prompt::ask("Last name", None)?,
            };

            let mut record = AttendeeRecord::new(1, id, first_name, last_name)
                .with_ticket_type(ticket_type.unwrap_or_default());
            if let Some(company) = company.filter(|c| !c.trim().is_empty()) {
                record = record.with_company(company);
            }

            let renderer = PdfCardRenderer::from_config(&settings);
            renderer
                .validate()
                .await
                .context("Renderer is not ready")?;
            let document = render_single(&settings, &renderer, record, role)
                .await
                .context("Failed to render card")?;
            println!("{}", document.path.display());
            Ok(())
        }
        Commands::Package { json } => {
            let settings = resolve_settings(cli.config.as_deref())?;
            run_package(&settings, json).await
        }
        Commands::Columns { file, json } => show_columns(&file, json),
        Commands::Config => {
            let config = load_settings_file(cli.config.as_deref())?;
            let sanitized = SanitizedConfig::from(&config);
            println!("{}", serde_json::to_string_pretty(&sanitized)?);
            Ok(())
        }
    }
}

/// Loads the config file (plus `ACCREDIT_` overrides), or the environment
/// alone when no file is given and the default file is absent.
fn load_settings_file(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG);
            load_config(Path::new(DEFAULT_CONFIG))
                .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG))
        }
        None => {
            info!("No configuration file, reading ACCREDIT_* environment variables");
            load_config_from_env().context("Failed to load config from environment")
        }
    }
}

fn resolve_settings(path: Option<&Path>) -> Result<ResolvedConfig> {
    let config = load_settings_file(path)?;
    let settings = ResolvedConfig::resolve(config).context("Invalid configuration")?;
    info!(
        "Configuration loaded: input {}, output {}, archive {}",
        settings.input_folder.display(),
        settings.output_folder.display(),
        settings.archive_folder.display()
    );
    Ok(settings)
}

async fn run_batch(settings: ResolvedConfig, input: Option<&Path>, json: bool) -> Result<()> {
    let renderer = Arc::new(PdfCardRenderer::from_config(&settings));
    renderer
        .validate()
        .await
        .context("Renderer is not ready")?;

    let mut runner = BatchRunner::new(settings, renderer, Arc::new(ZipArchiver::new()));
    let result = match runner.run(input).await {
        Ok(result) => result,
        Err(e) => {
            // A packaging failure still reports counts and skipped rows
            if let Some(tally) = e.tally() {
                if json {
                    println!("{}", serde_json::to_string_pretty(tally)?);
                } else {
                    print!("{}", summary::render_incomplete(tally));
                }
            }
            return Err(e).context("Batch run failed");
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", summary::render(&result));
    }
    Ok(())
}

async fn run_package(settings: &ResolvedConfig, json: bool) -> Result<()> {
    let manifest = package_pending(settings, &ZipArchiver::new())
        .await
        .context("Packaging failed")?;

    match manifest {
        Some(manifest) if json => println!("{}", serde_json::to_string_pretty(&manifest)?),
        Some(manifest) => print!("{}", summary::render_package(&manifest)),
        None if json => println!("null"),
        None => println!(
            "No pending cards in {}",
            settings.output_folder.display()
        ),
    }
    Ok(())
}

fn show_columns(file: &Path, json: bool) -> Result<()> {
    let headers = RosterReader::read_headers(file)
        .with_context(|| format!("Failed to read headers from {}", file.display()))?;
    let mapping = suggest_column_mapping(&headers);

    if json {
        println!("{}", serde_json::to_string_pretty(&mapping)?);
    } else {
        print!("{}", summary::render_columns(&headers, &mapping));
    }
    Ok(())
}

fn random_attendee_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.random_range(RANDOM_ID_RANGE).to_string()
}
