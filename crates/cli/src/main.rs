use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_kernel::Settings;

/// Operate the SHELF book review backend
#[derive(Debug, Parser)]
#[command(name = "shelf-cli", version, about)]
struct Cli {
    /// Override the database URL from configuration
    #[arg(long, global = true, env = "SHELF_DATABASE__URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations, boot every module and serve HTTP until Ctrl-C
    Serve {
        /// Override the listening port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending migrations and exit
    Migrate,
    /// Print the effective configuration, secrets redacted
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load().with_context(|| "failed to load SHELF settings")?;
    if let Some(url) = cli.database_url {
        settings.database.url = url;
    }
    shelf_telemetry::init(&settings.telemetry);

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            let app = shelf_app::bootstrap(settings).await?;
            app.serve().await
        }
        Command::Migrate => {
            let applied = shelf_app::migrate(&settings).await?;
            tracing::info!(applied, db = %settings.database.url, "migrations complete");
            println!("applied {} migration(s)", applied);
            Ok(())
        }
        Command::Config => {
            println!("environment      = {:?}", settings.environment);
            println!(
                "server           = {}:{}",
                settings.server.host, settings.server.port
            );
            println!("api_prefix       = {:?}", settings.server.api_prefix);
            println!("database.url     = {}", settings.database.url);
            println!("auth.cookie_name = {}", settings.auth.cookie_name);
            println!(
                "auth.jwt_secret  = {}",
                if settings.uses_default_secret() {
                    "<development default>"
                } else {
                    "<redacted>"
                }
            );
            Ok(())
        }
    }
}
