//! Runs a Heptago room server.
//!
//! ```text
//! heptago-server --host 0.0.0.0 --port 8765
//! RUST_LOG=debug heptago-server
//! ```

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use heptago::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8765)]
    port: u16,

    /// Length of generated room codes (at least 1)
    #[arg(
        long,
        default_value_t = RoomConfig::default().room_code_length,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    code_length: usize,
}

#[tokio::main]
async fn main() -> Result<(), HeptagoError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);
    let room_config = RoomConfig {
        room_code_length: args.code_length,
        ..RoomConfig::default()
    };
    tracing::debug!(?args, "starting");

    let server = HeptagoServer::builder()
        .bind(&addr)
        .room_config(room_config)
        .build()
        .await?;
    server.run().await
}
