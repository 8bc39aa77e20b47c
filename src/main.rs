use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use nero::constants::{DEFAULT_ENDPOINT, DEFAULT_PORT};
use nero::{chat, web_server, Config, HttpReadingClient};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Address of the tarot reading service.
    #[arg(long, global = true, env = "NERO_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Chat with Nero in the terminal, one question per line.
    Chat,
    /// Serve the chat widget over HTTP.
    Serve {
        #[arg(long, env = "NERO_PORT", default_value_t = DEFAULT_PORT, help = "Port for the web widget.")]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (NERO_ENDPOINT, NERO_PORT, RUST_LOG)
    dotenvy::dotenv().ok();

    // Logs go to stderr so the chat transcript on stdout stays clean.
    // Reads log level from RUST_LOG (e.g., RUST_LOG=info,nero=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new(&cli.endpoint).context("Invalid configuration")?;

    info!(endpoint = %config.endpoint, "Nero starting with command: {:?}", cli.command);

    match cli.command {
        Commands::Chat => {
            let transport = HttpReadingClient::new(&config);
            let input = tokio::io::BufReader::new(tokio::io::stdin());
            let mut output = tokio::io::stdout();
            chat::run_chat(input, &mut output, &transport)
                .await
                .context("Chat session failed")?;
            info!("Chat session finished.");
        }
        Commands::Serve { port } => {
            let mut web_server_handle =
                tokio::spawn(async move { web_server::start_web_server(port, &config).await });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, shutting down...");
                    web_server_handle.abort();
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(Ok(())) => info!("Web server task completed."),
                        Ok(Err(e)) => return Err(e),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }
            info!("Shutdown complete.");
        }
    }

    Ok(())
}
