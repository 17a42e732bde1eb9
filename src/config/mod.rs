// Adding the context method to errors:
use eyre::WrapErr;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::convert::From;

#[derive(Debug, Deserialize)]
pub struct Config {
  pub db_path: String,
  pub bind_address: String,
  pub upload_dir: String,
  // Public prefix for uploaded files. When absent the
  // URL is built from the request scheme and host.
  pub uploads_url: Option<String>,
  pub max_upload_size: usize,
  // JSON request bodies, articles carry their whole
  // HTML content.
  pub max_json_size: usize,
  // Login rate limiter settings:
  pub rl_max_requests: u32,
  pub rl_max_requests_time: u32,
  pub rl_block_duration: u32,
  pub api_name: String,
  // Only used by the setup binary to seed the
  // first administrator:
  pub admin_name: String,
  pub admin_email: String,
  pub admin_password: String
}

// Subset of the config that ends up in the app state.
// The admin credentials shouldn't be moved around with
// every request.
#[derive(Debug, Serialize)]
pub struct ApiInfo {
  pub name: String,
  pub uploads_url: Option<String>,
  pub version: String
}

impl From<Config> for ApiInfo {
  fn from(config: Config) -> Self {
    Self {
      name: config.api_name,
      // Trailing slashes would give us double slashes in
      // the upload URLs:
      uploads_url: config.uploads_url
        .map(|url| url.trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty()),
      version: env!("CARGO_PKG_VERSION").to_string()
    }
  }
}

impl Config {

  pub fn from_env() -> Result<Config> {
    let mut c = config::Config::new();
    // RUST_LOG is already set in main.rs if it
    // was absent.
    // You have to use lowercase when compared to
    // what's in the .env file.
    c.set_default("bind_address", "127.0.0.1:8080")?;
    c.set_default("db_path", "./azul360.sqlite")?;
    c.set_default("upload_dir", "./uploads")?;
    // 5 MB:
    c.set_default("max_upload_size", 5242880)?;
    // 4 MB, actix defaults to 32 KB:
    c.set_default("max_json_size", 4194304)?;
    // Login attempts allowed per time window, then
    // the login endpoint is blocked for a while:
    c.set_default("rl_max_requests", 10)?;
    c.set_default("rl_max_requests_time", 60)?;
    c.set_default("rl_block_duration", 300)?;
    c.set_default("api_name", "API Azul 360 Parceiros")?;
    c.set_default("admin_name", "Admin")?;
    c.set_default("admin_email", "admin@azul360.com.br")?;
    // Change it right after the first login.
    c.set_default("admin_password", "admin123")?;

    c.merge(config::Environment::default())?;
    // The error has to be given a context for
    // color_eyre to work here:
    c.try_into()
      .context("Loading configuration from env")
  }

}
