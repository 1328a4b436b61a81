//! CLI parser and command dispatch.

mod output;
mod query;
mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use roadworks::config::{load_settings, LoadOptions, Settings};
use roadworks::http_client::HttpClient;
use roadworks::manifest::ManifestResolver;
use roadworks::session::{self, Remote, Session};
use roadworks::sheets::SpreadsheetFetcher;
use roadworks::store::LocalStore;

#[derive(Parser)]
#[command(name = "roadworks")]
#[command(about = "Look up road work intervention numbers from the weekly programming sheets")]
#[command(version)]
pub struct Cli {
    /// Snapshot directory (overrides ROADWORKS_DATA_DIR and config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path (default: ./config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Manifest URL (overrides BASES_JSON_URL and config file)
    #[arg(long, global = true)]
    bases_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Show per-source ingestion status (ingests if there is no snapshot)
    Status,

    /// Discard the local snapshot and ingest again
    Refresh,

    /// List the values available for each filter
    Options,

    /// Find intervention numbers matching all filters
    Query {
        /// Highway
        #[arg(long)]
        rodovia: Option<String>,
        /// Service type
        #[arg(long)]
        tipo: Option<String>,
        /// Start date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(long)]
        data: Option<String>,
        /// Direction
        #[arg(long)]
        sentido: Option<String>,
        /// Contractor
        #[arg(long)]
        executor: Option<String>,
        /// Period: Diurno or Noturno (default: any)
        #[arg(long)]
        periodo: Option<String>,
    },
}

/// Everything a command needs to open a session.
pub(crate) struct Context {
    pub settings: Settings,
    pub store: LocalStore,
    resolver: ManifestResolver,
    fetcher: SpreadsheetFetcher,
}

impl Context {
    fn new(settings: Settings) -> anyhow::Result<Self> {
        let client = HttpClient::new(settings.user_agent.as_deref())?;
        Ok(Self {
            store: LocalStore::new(settings.data_dir.clone()),
            resolver: ManifestResolver::new(client.clone(), settings.manifest_timeout),
            fetcher: SpreadsheetFetcher::new(client, settings.sheet_timeout),
            settings,
        })
    }

    fn remote(&self) -> Remote<'_> {
        Remote {
            manifest: &self.resolver,
            manifest_url: &self.settings.manifest_url,
            sheets: &self.fetcher,
        }
    }

    pub async fn open_session(&self) -> Session {
        session::open_session(&self.store, &self.remote()).await
    }

    pub async fn refresh(&self) -> anyhow::Result<Session> {
        Ok(session::refresh(&self.store, &self.remote()).await?)
    }
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data_dir: cli.data_dir,
        bases_url: cli.bases_url,
    };
    let settings = load_settings(&options);
    tracing::debug!(
        "Using data dir {} and manifest from {}",
        settings.data_dir.display(),
        settings.manifest_url_layer.as_str()
    );
    let ctx = Context::new(settings)?;

    match cli.command {
        Commands::Status => status::cmd_status(&ctx).await,
        Commands::Refresh => status::cmd_refresh(&ctx).await,
        Commands::Options => query::cmd_options(&ctx).await,
        Commands::Query {
            rodovia,
            tipo,
            data,
            sentido,
            executor,
            periodo,
        } => {
            let selections = roadworks::query::Selections {
                rodovia,
                tipo,
                data,
                sentido,
                executor,
                periodo,
            };
            query::cmd_query(&ctx, &selections).await
        }
    }
}
