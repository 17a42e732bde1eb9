#![allow(dead_code)]
mod config;
mod db;
mod utils;

use std::env;
use std::fs;
use color_eyre::Result;
use eyre::WrapErr;
use dotenv::dotenv;
use log::{info, warn};
use getopts::Options;
use serde::Deserialize;
use crate::db::Pool;
use crate::db::entities::{Article, Banner, Category, User};
use crate::db::schema::TABLES;
use crate::config::Config;
use crate::utils::password_utils::hash_password;

const DEFAULT_DEMO_FILE: &'static str = "./resources/demo.json";

// Copy pasted this from getopts doc.
fn print_usage(program: &str, opts: Options) {
  let brief = format!("Usage: {} [options]", program);
  print!("{}", opts.usage(&brief));
}

#[derive(Deserialize)]
struct DemoContent {
  categories: Vec<Category>,
  banners: Vec<Banner>,
  articles: Vec<Article>
}

fn seed_admin(pool: &Pool, config: &Config) -> Result<()> {
  let email = config.admin_email.trim().to_lowercase();
  if db::user_exists(pool, &email)? {
    info!("admin_user: Exists ({})", email);
    return Ok(());
  }
  let mut admin = User {
    id: -1,
    name: config.admin_name.clone(),
    email,
    password: hash_password(&config.admin_password)?,
    created_at: 0
  };
  db::insert_user(pool, &mut admin)?;
  info!("admin_user: Created ({})", admin.email);
  if config.admin_password == "admin123" {
    warn!("The admin account uses the default password, change ADMIN_PASSWORD");
  }
  Ok(())
}

fn load_demo(pool: &Pool, path: &str) -> Result<()> {
  let contents = fs::read_to_string(path)
    .with_context(|| format!("Reading demo content from {}", path))?;
  let demo: DemoContent = serde_json::from_str(&contents)
    .context("Parsing demo content")?;

  for mut category in demo.categories {
    if db::category_exists(pool, &category.name)? {
      info!("Category {} already exists, skipped", category.name);
      continue;
    }
    db::insert_category(pool, &mut category)?;
  }
  let banner_count = demo.banners.len();
  for mut banner in demo.banners {
    db::insert_banner(pool, &mut banner)?;
  }
  let article_count = demo.articles.len();
  for mut article in demo.articles {
    db::insert_article(pool, &mut article)?;
  }
  info!("Demo content loaded: {} banners, {} articles", banner_count, article_count);
  Ok(())
}

/**
 * Prepares a database: tables, the admin account and
 * optionally some demo content.
 */
fn main() -> Result<()> {
  dotenv().ok();
  if env::var("RUST_LOG").is_err() {
    env::set_var("RUST_LOG", "info");
  }
  env_logger::init();

  let args: Vec<String> = env::args().collect();
  let program = args[0].clone();
  let mut opts = Options::new();
  opts.optflag("d", "demo", "load the demo categories, banners and articles");
  opts.optopt("f", "file", "demo content file (default ./resources/demo.json)", "FILE");
  opts.optflag("h", "help", "print this help menu");
  let matches = opts.parse(&args[1..])
    .context("Parsing command line arguments")?;
  if matches.opt_present("h") {
    print_usage(&program, opts);
    return Ok(());
  }

  let config = Config::from_env()?;
  let manager = db::connection_manager(&config.db_path);
  let pool = Pool::new(manager)
    .context("Database connection failed")?;
  info!("connection: OK ({})", config.db_path);

  db::create_schema(&pool)?;
  for table in TABLES.iter() {
    info!("table_{}: OK", table);
  }
  seed_admin(&pool, &config)?;

  if matches.opt_present("d") {
    let path = matches.opt_str("f")
      .unwrap_or_else(|| DEFAULT_DEMO_FILE.to_string());
    load_demo(&pool, &path)?;
  }

  Ok(())
}
