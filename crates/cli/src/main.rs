use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "optiondesk")]
#[command(about = "Binary-options trading platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server, price feed, and expiry scheduler
    Server {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Check stored balances against transaction history
    Reconcile {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        /// Only reconcile this user id
        #[arg(long)]
        user: Option<String>,
        /// Reset drifted balances to the transaction-implied value
        #[arg(long)]
        repair: bool,
    },
    /// Create an admin account
    CreateAdmin {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// Password; prefer the env var over the flag in shared shells
        #[arg(long, env = "OPTIONDESK_ADMIN_PASSWORD")]
        password: String,
        /// Grant the super-admin role instead of admin
        #[arg(long)]
        super_admin: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Server { config } => commands::server::run(&config).await,
        Commands::Reconcile {
            config,
            user,
            repair,
        } => commands::reconcile::run(&config, user.as_deref(), repair).await,
        Commands::CreateAdmin {
            config,
            username,
            email,
            password,
            super_admin,
        } => commands::create_admin::run(&config, username, email, &password, super_admin).await,
    }
}
