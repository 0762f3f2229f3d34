use anyhow::Context;
use bookshop_kernel::settings::Settings;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookshop", version, about = "Bookshop API command-line entrypoint")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the effective configuration as JSON, secrets redacted
    Config,
    /// Print a bcrypt hash of PASSWORD, e.g. for seed users
    HashPassword {
        password: String,
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(4..=31))]
        cost: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            let mut settings = load_settings()?;
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            bookshop_telemetry::init(&settings.telemetry)?;

            tracing::info!(env = ?settings.environment, "bookshop CLI serving");
            bookshop_app::run(settings).await
        }
        Command::Config => {
            let settings = load_settings()?;
            let rendered = serde_json::to_string_pretty(&settings.redacted())
                .context("failed to render settings")?;
            println!("{rendered}");
            Ok(())
        }
        Command::HashPassword { password, cost } => {
            let hash = bookshop_authz::password::hash_password(&password, cost)
                .await
                .context("failed to hash password")?;
            println!("{hash}");
            Ok(())
        }
    }
}

fn load_settings() -> anyhow::Result<Settings> {
    Settings::load().with_context(|| "failed to load bookshop settings")
}
