/// RemoteJob Server - task marketplace backend
use clap::{Parser, Subcommand};
use remotejob_core::StorageContext;
use remotejob_server::{
    config::ServerConfig,
    create_router,
    services::{notifier, AuthService, WalletEvents},
    state::{AdminCredentials, AppState},
};
use remotejob_storage::LocalStorageContext;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "remotejob-server")]
#[command(about = "RemoteJob task marketplace server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long, env = "REMOTEJOB_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print a bcrypt hash for auth.admin_password_hash
    HashPassword {
        /// Password to hash
        password: String,
        /// bcrypt cost
        #[arg(long, default_value_t = bcrypt::DEFAULT_COST)]
        cost: u32,
    },
    /// List all users
    ListUsers {
        /// Configuration file path
        #[arg(short, long, env = "REMOTEJOB_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "remotejob_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(config).await?;
        }
        Commands::HashPassword { password, cost } => {
            println!("{}", bcrypt::hash(password, cost)?);
        }
        Commands::ListUsers { config } => {
            list_users(config).await?;
        }
    }

    Ok(())
}

async fn serve(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::load_from(config_path.as_deref())?;
    config.validate()?;

    tracing::info!("Starting RemoteJob Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    // Initialize database; opening it now surfaces a bad URL before we bind
    let db = Arc::new(LocalStorageContext::connect(config.storage.database_url.clone()));
    db.pool().await?;
    tracing::info!("Database connected");

    let auth_service = Arc::new(AuthService::new(
        config.auth.jwt_secret.clone(),
        config.auth.bcrypt_cost,
        config.auth.user_token_days,
        config.auth.admin_token_days,
    ));

    let notifier = notifier::from_settings(&config.notifications)?;
    if config.notifications.enabled {
        tracing::info!("Admin notifications enabled");
    } else {
        tracing::info!("Admin notifications disabled, logging instead");
    }

    let events = WalletEvents::new(config.events.channel_capacity);

    let admin = match (&config.auth.admin_email, &config.auth.admin_password_hash) {
        (Some(email), Some(password_hash)) => Some(AdminCredentials {
            email: email.trim().to_lowercase(),
            password_hash: password_hash.clone(),
        }),
        _ => {
            tracing::warn!("No admin credentials configured, admin login disabled");
            None
        }
    };

    // Build application state
    let app_state = AppState::new(Arc::clone(&db), auth_service, notifier, events, admin);

    // Build router
    let app = create_router(app_state);

    // Create server address
    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}

async fn list_users(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = ServerConfig::load_from(config_path.as_deref())?;
    let db = LocalStorageContext::connect(config.storage.database_url.clone());

    let users = db.get_all_users().await?;

    println!("Users:");
    for user in users {
        println!(
            "  {} - {} <{}> balance {}",
            user.id,
            user.full_name(),
            user.email,
            user.wallet_balance
        );
    }

    db.close().await;
    Ok(())
}
