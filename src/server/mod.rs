mod config;
mod database;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::spawn;
use tokio::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc::{self, Receiver};
use tracing::{debug, error, info, warn};

use crate::auth::{IdentityHub, IdentityProvider};
use crate::models::config::Config;
use crate::models::errors::InternalError;
use crate::store::database::DocumentStore;
use crate::storefront::{Storefront, StorefrontArgs};

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

pub struct Server {
  pub(crate) errors: mpsc::Sender<InternalError>,
  pub(crate) config: Arc<Mutex<Config>>,
  pub(crate) config_path: PathBuf,
  pub(crate) store: Option<Arc<dyn DocumentStore>>,
  pub(crate) identity: Arc<IdentityHub>,
}

#[derive(Debug)]
pub struct ServerArgs {
  pub config_path: PathBuf,
}

impl Default for ServerArgs {
  fn default() -> Self {
    Self { config_path: PathBuf::from(DEFAULT_CONFIG_PATH) }
  }
}

impl Server {
  pub async fn new(args: ServerArgs) -> Result<Self, Box<dyn Error>> {
    let (tx, rx) = mpsc::channel::<InternalError>(100);

    spawn(async move {
      Server::errors_listener(rx).await;
    });

    let server = Self {
      errors: tx,
      config: Arc::new(Mutex::new(Config::default())),
      config_path: args.config_path,
      store: None,
      identity: Arc::new(IdentityHub::new()),
    };

    server.init_service_config().await;

    Ok(server)
  }

  pub async fn config(&self) -> Config {
    self.config.lock().await.clone()
  }

  /// The identity source handed to the navigation guard. Sign-in and
  /// sign-out are driven through it.
  pub fn identity(&self) -> Arc<IdentityHub> {
    self.identity.clone()
  }

  /// Opens the store backend and wires the storefront over it, with the
  /// product list hydrated and a review subscription per listed product.
  pub async fn storefront(&mut self) -> Result<Storefront, Box<dyn Error>> {
    let store = match &self.store {
      Some(store) => store.clone(),
      None => {
        let store = self.init_store().await?;
        self.store = Some(store.clone());
        store
      }
    };

    let identity: Arc<dyn IdentityProvider> = self.identity.clone();
    let storefront = Storefront::new(StorefrontArgs { store, identity });

    storefront.products.hydrate().await;
    let handles = storefront.reviews.subscribe_all().await?;
    let products = storefront.products.products().len();
    info!(products, subscriptions = handles.len(), "storefront ready");

    Ok(storefront)
  }

  pub async fn run(&mut self) -> Result<(), Box<dyn Error>> {
    let storefront = self.storefront().await?;

    let mut updates = storefront.reviews.updates();
    let watcher = spawn(async move {
      loop {
        match updates.recv().await {
          Ok(product_id) => debug!(product_id = %product_id, "reviews updated"),
          Err(RecvError::Lagged(skipped)) => warn!(skipped, "review updates lagged"),
          Err(RecvError::Closed) => break,
        }
      }
    });

    if let Err(err) = tokio::signal::ctrl_c().await {
      let _ = self
        .errors
        .send(InternalError {
          temp: false,
          err: Box::new(err),
          msg: "failed to listen for the shutdown signal".into(),
          path: "storefront.server.run".into(),
        })
        .await;
    }

    info!("shutting down");
    storefront.reviews.cancel_all();
    watcher.abort();

    Ok(())
  }

  async fn errors_listener(mut receiver: Receiver<InternalError>) {
    while let Some(msg) = receiver.recv().await {
      error!(path = %msg.path, temp = msg.temp, err = %msg.err, "{}", msg.msg);
    }
  }
}
