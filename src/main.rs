mod config;
mod db;
mod utils;
mod app;
use color_eyre::Result;
use dotenv::dotenv;
use std::env;

#[actix_web::main]
async fn main() -> Result<()> {
  // The .env file is optional, real environment variables
  // take precedence over it.
  dotenv().ok();
  if env::var("RUST_LOG").is_err() {
    env::set_var("RUST_LOG", "info,actix_web=info");
  }
  env_logger::init();

  app::run().await
}
