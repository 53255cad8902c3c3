use std::fs;

use crate::models::{config::Config, errors::InternalError};
use crate::server::Server;

impl Server {
  /// Loads the service config. On failure the error is reported and the
  /// defaults stay in place.
  pub async fn init_service_config(&self) {
    let path = "storefront.server.init_service_config";

    let yaml_string = match fs::read_to_string(&self.config_path) {
      Ok(s) => s,
      Err(err) => {
        let _ = self
          .errors
          .send(InternalError {
            temp: false,
            msg: format!("failed to load service config file {}", self.config_path.display()),
            path: path.into(),
            err: Box::new(err),
          })
          .await;
        return;
      }
    };

    let parsed_config: Config = match serde_yaml::from_str(&yaml_string) {
      Ok(cfg) => cfg,
      Err(e) => {
        let _ = self
          .errors
          .send(InternalError {
            temp: false,
            msg: "failed to parse config data".into(),
            path: path.into(),
            err: Box::new(e),
          })
          .await;
        return;
      }
    };

    let mut config = self.config.lock().await;
    *config = parsed_config;
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use ulid::Ulid;

  use crate::models::config::StoreBackend;
  use crate::server::{Server, ServerArgs};

  fn temp_config(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("storefront-{}.yaml", Ulid::new()));
    std::fs::write(&path, contents).unwrap();
    path
  }

  #[tokio::test]
  async fn loads_the_config_file() {
    let path = temp_config("service:\n  env: test\n  log_level: info\n");
    let server = Server::new(ServerArgs { config_path: path.clone() }).await.unwrap();

    let config = server.config().await;
    assert_eq!(config.service.env, "test");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.service.backend, StoreBackend::Memory);

    std::fs::remove_file(path).unwrap();
  }

  #[tokio::test]
  async fn missing_or_invalid_files_keep_the_defaults() {
    let missing = std::env::temp_dir().join(format!("storefront-{}.yaml", Ulid::new()));
    let server = Server::new(ServerArgs { config_path: missing }).await.unwrap();
    assert_eq!(server.config().await.service.env, "dev");

    let path = temp_config("service: [not, a, map]\n");
    let server = Server::new(ServerArgs { config_path: path.clone() }).await.unwrap();
    assert_eq!(server.config().await.service.log_level, "debug");

    std::fs::remove_file(path).unwrap();
  }
}
