//! Minimal listener: connect, print incoming notifications, Ctrl-C to exit.
//!
//! Endpoints and the access token come from the environment:
//!   NOTIFY_WS_URL   (default ws://localhost:8000/ws/notifications/)
//!   NOTIFY_API_URL  (default http://localhost:8000)
//!   NOTIFY_TOKEN    (unset -> polling fallback)

use std::sync::Arc;

use notilink::{ClientConfig, MemoryTokenStore, NotificationClient, NotificationEvent};
use tracing::info;

#[tokio::main]
async fn main() -> notilink::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,notilink=debug".into()),
        )
        .init();

    let ws_url = std::env::var("NOTIFY_WS_URL")
        .unwrap_or_else(|_| "ws://localhost:8000/ws/notifications/".to_string());
    let api_url =
        std::env::var("NOTIFY_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

    let tokens = Arc::new(MemoryTokenStore::new());
    if let Ok(token) = std::env::var("NOTIFY_TOKEN") {
        tokens.set_token(token);
    }

    let client = NotificationClient::new(ClientConfig::new(ws_url, api_url), tokens)?;

    client
        .connect(
            |event| match event {
                NotificationEvent::Notification(n) => {
                    info!("[{:?}] {} {}", n.event, n.title, n.body);
                }
                NotificationEvent::Raw(value) => {
                    info!("unhandled message: {value}");
                }
            },
            |connected| info!("connected: {connected}"),
        )
        .await;

    tokio::signal::ctrl_c().await?;
    client.disconnect().await;
    Ok(())
}
