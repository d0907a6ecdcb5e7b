use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use inquire::validator::Validation;
use tracing::info;
use tracing_subscriber::EnvFilter;

use assetman::auth::{CredentialHasher, JwtService};
use assetman::config::{ServerConfig, StorageConfig, parse_api_keys};
use assetman::files::{FileState, StorageClient, create_file_router};
use assetman::jobs::{spawn_notification_sweeper, spawn_token_sweeper};
use assetman::mail::{LogMailer, MailQueue, run_mail_worker};
use assetman::server::{AppState, create_router};
use assetman::service::{CreateUser, UserService};
use assetman::store::{SqliteStore, Store};
use assetman::types::KnownRole;

const DEFAULT_DATABASE: &str = "./data/assetman.db";

#[derive(Parser)]
#[command(name = "assetman")]
#[command(about = "An asset management backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the API server, and the file proxy when storage is configured
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Host to bind to
    #[arg(long, env = "ASSETMAN_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port of the REST API
    #[arg(long, short, env = "ASSETMAN_PORT", default_value = "8080")]
    port: u16,

    /// Port of the file proxy
    #[arg(long, env = "ASSETMAN_FILE_PORT", default_value = "8081")]
    file_port: u16,

    /// SQLite database file
    #[arg(long, env = "ASSETMAN_DATABASE", default_value = DEFAULT_DATABASE)]
    database: PathBuf,

    /// Secret used to sign login tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Comma separated keys accepted by the file proxy
    #[arg(long, env = "API_KEYS", default_value = "", hide_env_values = true)]
    api_keys: String,

    /// Seconds between expired token sweeps (0 disables)
    #[arg(long, env = "ASSETMAN_TOKEN_SWEEP_SECS", default_value = "3600")]
    token_sweep_secs: u64,

    /// Seconds between notification sweeps (0 disables)
    #[arg(long, env = "ASSETMAN_NOTIFICATION_SWEEP_SECS", default_value = "86400")]
    notification_sweep_secs: u64,

    /// Base URL of the remote document store
    #[arg(long, env = "NEXTCLOUD_API_ENDPOINT")]
    storage_endpoint: Option<String>,

    /// Path under the endpoint where asset files are kept
    #[arg(long, env = "NEXTCLOUD_ASSET_PATH", default_value = "")]
    storage_asset_path: String,

    #[arg(long, env = "NEXTCLOUD_USERNAME", default_value = "")]
    storage_username: String,

    #[arg(long, env = "NEXTCLOUD_PASSWORD", default_value = "", hide_env_values = true)]
    storage_password: String,
}

impl ServeArgs {
    fn into_config(self) -> ServerConfig {
        let storage = self.storage_endpoint.map(|endpoint| StorageConfig {
            endpoint,
            asset_path: self.storage_asset_path,
            username: self.storage_username,
            password: self.storage_password,
        });
        ServerConfig {
            host: self.host,
            port: self.port,
            file_port: self.file_port,
            database: self.database,
            jwt_secret: self.jwt_secret,
            api_keys: parse_api_keys(&self.api_keys),
            token_sweep_interval: Duration::from_secs(self.token_sweep_secs),
            notification_sweep_interval: Duration::from_secs(self.notification_sweep_secs),
            storage,
        }
    }
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Create the database and, optionally, the first administrator
    Init(InitArgs),
}

#[derive(Args)]
struct InitArgs {
    /// SQLite database file
    #[arg(long, env = "ASSETMAN_DATABASE", default_value = DEFAULT_DATABASE)]
    database: PathBuf,

    /// Skip interactive prompts
    #[arg(long)]
    non_interactive: bool,

    /// Employee number of the first administrator
    #[arg(long)]
    admin_nip: Option<String>,

    #[arg(long)]
    admin_name: Option<String>,

    #[arg(long, default_value = "")]
    admin_email: String,

    #[arg(long, env = "ASSETMAN_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

fn open_store(database: &Path) -> anyhow::Result<SqliteStore> {
    if let Some(parent) = database.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let store = SqliteStore::new(database)?;
    store.initialize()?;
    Ok(store)
}

fn run_init(args: InitArgs) -> anyhow::Result<()> {
    let store: Arc<dyn Store> = Arc::new(open_store(&args.database)?);
    println!("Database ready at {}", args.database.display());

    let admin = match (args.admin_nip, args.admin_name, args.admin_password) {
        (Some(nip), Some(name), Some(password)) => Some((nip, name, args.admin_email, password)),
        _ if args.non_interactive => None,
        _ => prompt_admin()?,
    };
    let Some((nip, name, email, password)) = admin else {
        return Ok(());
    };

    let existing = store.count_users()?;
    if existing > 0 {
        bail!(
            "Database already initialized with {existing} user(s): {}",
            args.database.display()
        );
    }

    let users = UserService::new(store, Arc::new(CredentialHasher::new()));
    let user = users.create(CreateUser {
        nip,
        user_full_name: name,
        user_email: email,
        user_password: password,
        role_id: KnownRole::Administrator.id(),
        area_id: None,
        outlet_id: None,
    })?;

    println!("Created administrator {} ({})", user.user_full_name, user.nip);
    Ok(())
}

fn prompt_admin() -> anyhow::Result<Option<(String, String, String, String)>> {
    let create = inquire::Confirm::new("Would you like to create an administrator?")
        .with_default(true)
        .prompt()?;
    if !create {
        return Ok(None);
    }

    let not_blank = |input: &str| -> Result<Validation, inquire::CustomUserError> {
        if input.trim().is_empty() {
            Ok(Validation::Invalid("Value cannot be empty".into()))
        } else {
            Ok(Validation::Valid)
        }
    };

    let nip = inquire::Text::new("NIP:")
        .with_validator(not_blank)
        .prompt()?;
    let name = inquire::Text::new("Full name:")
        .with_validator(not_blank)
        .prompt()?;
    let email = inquire::Text::new("E-mail:").prompt()?;
    let password = inquire::Password::new("Password:")
        .with_validator(not_blank)
        .prompt()?;

    Ok(Some((nip, name, email, password)))
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let store = open_store(&config.database)?;
    if store.count_users()? == 0 {
        bail!("No users found. Run 'assetman admin init' first to create an administrator.");
    }
    let store: Arc<dyn Store> = Arc::new(store);

    let (mail, mail_rx) = MailQueue::channel();
    tokio::spawn(run_mail_worker(mail_rx, Arc::new(LogMailer)));

    let state = Arc::new(AppState::new(
        store,
        JwtService::new(&config.jwt_secret),
        mail,
    ));

    spawn_token_sweeper(state.auth.clone(), config.token_sweep_interval);
    spawn_notification_sweeper(
        state.notifications.clone(),
        config.notification_sweep_interval,
    );

    if let Some(storage) = config.storage.clone() {
        let file_state = Arc::new(FileState {
            client: StorageClient::new(storage)?,
            api_keys: config.api_keys.clone(),
        });
        let addr = config.file_socket_addr()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("Starting file proxy on {}", addr);
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, create_file_router(file_state)).await {
                tracing::error!("File proxy stopped: {e}");
            }
        });
    } else {
        info!("No storage endpoint configured, file proxy disabled");
    }

    let app = create_router(state);
    let addr = config.socket_addr()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("assetman=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init(args) => run_init(args)?,
        },
        Commands::Serve(args) => run_serve(args.into_config()).await?,
    }

    Ok(())
}
