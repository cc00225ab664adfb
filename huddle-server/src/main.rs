use anyhow::Result;
use clap::Parser;
use huddle_core::IceServerConfig;
use huddle_server::{AppState, RosterHandle, SignalingService, router};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "huddle-server")]
#[command(about = "Signaling and presence relay for the huddle audio room")]
struct Args {
    /// Address the WebSocket endpoint binds to.
    #[arg(long, default_value = "0.0.0.0:3001")]
    bind: SocketAddr,

    /// STUN/TURN urls handed to connecting endpoints. Defaults to a public
    /// STUN server when omitted.
    #[arg(long = "ice-url")]
    ice_urls: Vec<String>,

    #[arg(long)]
    turn_username: Option<String>,

    #[arg(long)]
    turn_credential: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let ice_servers = if args.ice_urls.is_empty() {
        IceServerConfig::default_stun()
    } else {
        vec![IceServerConfig {
            urls: args.ice_urls,
            username: args.turn_username,
            credential: args.turn_credential,
        }]
    };

    let signaling = SignalingService::new(ice_servers);
    let roster = RosterHandle::spawn(Arc::new(signaling.clone()));

    let app = router(AppState { signaling, roster });

    info!("Signaling server listening on http://{}", args.bind);
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
