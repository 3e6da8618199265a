use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use zendesk_core::MockStore;

#[derive(Parser, Debug)]
#[command(name = "zendesk-mock-server", about = "In-memory Zendesk API for local testing")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Email of the session user `/users/me` answers with.
    #[arg(long, env = "ZENDESK_USERNAME", default_value = mock_server::DEFAULT_USERNAME)]
    username: String,
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    mock_server::run(listener, MockStore::shared(&args.username)).await
}
