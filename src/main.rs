use std::error::Error;
use std::path::PathBuf;

use megacommerce_storefront::server::{DEFAULT_CONFIG_PATH, Server, ServerArgs};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
  let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
  let args = ServerArgs { config_path: PathBuf::from(config_path) };

  let mut server = Server::new(args).await?;

  let level = server.config().await.service.log_level.parse().unwrap_or(Level::DEBUG);
  let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
  tracing::subscriber::set_global_default(subscriber)?;

  server.run().await
}
