use actix_web::{middleware, web, App, HttpServer, HttpResponse};
use actix_cors::Cors;
use color_eyre::Result;
use eyre::WrapErr;
use log::{debug, error, info};
use rate_limiter::BasicRateLimiter;
use upload::UploadService;
use std::sync::RwLock;
// I think we have to add crate here because
// of the other crate named "config" that we
// use as a dependency.
use crate::config::{Config, ApiInfo};
use crate::db::{self, Pool};
use dtos::JsonStatus;
mod handlers;
mod dtos;
mod error;
mod helpers;
mod rate_limiter;
mod upload;

// Declare app state struct:
pub struct AppState {
  pub pool: Pool,
  pub rate_limiter: RwLock<BasicRateLimiter>,
  pub upload_service: UploadService,
  pub api_info: ApiInfo
}

impl AppState {

  // Returns true when the request has to be refused.
  pub fn check_rate_limit(&self) -> bool {
    match self.rate_limiter.write() {
      Ok(mut rl) => rl.update(),
      Err(e) => {
        // I decided to ignore possible weird rate limiter lock
        // errors which should never happen.
        error!("Could not get a write handle on the \
          rate limiter, SHOULD NEVER HAPPEN - {}", e);
        false
      }
    }
  }

}

// Function to start the server, main.rs has the
// #[actix_web::main] thingy.
pub async fn run() -> Result<()> {
  // from_env already gives a context to its errors.
  let config = Config::from_env()?;
  debug!("Current config: {:?}", config);
  let manager = db::connection_manager(&config.db_path);
  let pool = Pool::new(manager)
    .context("Database connection failed")?;
  // Makes a fresh database usable right away. The setup
  // binary is still needed for the admin account.
  db::create_schema(&pool)?;

  // Crash immediately if the upload directory is not
  // writable:
  let upload_service = UploadService::open(
    &config.upload_dir,
    config.max_upload_size
  ).context("Fatal: upload directory is not writable")?;

  // Got to save the bind_address for later because
  // we'll be destroying "config" by moving it into
  // app_state as ApiInfo.
  let bind_address = config.bind_address.clone();
  let max_json_size = config.max_json_size;

  let app_state = web::Data::new(
    AppState {
      pool,
      upload_service,
      rate_limiter: RwLock::new(
        BasicRateLimiter::new(
          config.rl_max_requests,
          config.rl_max_requests_time,
          config.rl_block_duration
        )
      ),
      api_info: config.into()
    }
  );

  info!("Starting server on {}", bind_address);
  HttpServer::new(move|| {
    App::new()
      .app_data(app_state.clone())
      .wrap(cors())
      .wrap(middleware::Logger::default())
      .configure(|cfg| app_config(cfg, max_json_size))
      .default_service(web::route().to(handlers::not_found))
  })
  .bind(bind_address)?
  .run()
  .await
  .context("Start Actix web server")

}

// Any origin is allowed, the admin panel and the public
// site can be served from anywhere.
fn cors() -> Cors {
  Cors::default()
    .allow_any_origin()
    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
    .allowed_headers(vec![
      "Content-Type",
      "Authorization",
      "X-Requested-With"
    ])
    .expose_headers(vec!["X-Total-Count"])
    .max_age(3600)
}

pub fn app_config(cfg: &mut web::ServiceConfig, max_json_size: usize) {
  extractor_config(cfg, max_json_size);
  base_endpoints_config(cfg);
}

// Extractor failures answer with the same JSON as all
// the other errors.
fn extractor_config(cfg: &mut web::ServiceConfig, max_json_size: usize) {
  let json_config = web::JsonConfig::default().limit(max_json_size);
  cfg.app_data(json_config.error_handler(|err, _| {
    let message = format!("Dados inválidos enviados: {}", err);
    actix_web::error::InternalError::from_response(
      err,
      HttpResponse::BadRequest().json(JsonStatus::error(&message))
    ).into()
  }))
  .app_data(web::PathConfig::default().error_handler(|err, _| {
    actix_web::error::InternalError::from_response(
      err,
      HttpResponse::BadRequest().json(JsonStatus::error("Parâmetros de caminho inválidos"))
    ).into()
  }))
  .app_data(web::QueryConfig::default().error_handler(|err, _| {
    actix_web::error::InternalError::from_response(
      err,
      HttpResponse::BadRequest().json(JsonStatus::error("Parâmetros de consulta inválidos"))
    ).into()
  }));
}

// Every resource also answers on its old PHP file name so
// that deployed frontends keep working.
fn legacy_paths(name: &str) -> [String; 2] {
  [format!("/{}", name), format!("/{}.php", name)]
}

// Route configuration:
fn base_endpoints_config(cfg: &mut web::ServiceConfig) {
  cfg.route("/", web::get().to(handlers::index))
    .route("/index.php", web::get().to(handlers::index));
  for path in &legacy_paths("test") {
    cfg.route(path.as_str(), web::get().to(handlers::test));
  }
  for path in &legacy_paths("articles") {
    cfg.service(
      web::resource(path.as_str())
        .route(web::get().to(handlers::articles))
        .route(web::post().to(handlers::post_article))
        .route(web::delete().to(handlers::delete_article))
    );
  }
  cfg.route("/articles/{id}", web::get().to(handlers::article));
  for path in &legacy_paths("categories") {
    cfg.service(
      web::resource(path.as_str())
        .route(web::get().to(handlers::categories))
        .route(web::post().to(handlers::post_category))
        .route(web::delete().to(handlers::delete_category))
    );
  }
  for path in &legacy_paths("banners") {
    cfg.service(
      web::resource(path.as_str())
        .route(web::get().to(handlers::banners))
        .route(web::post().to(handlers::post_banner))
        .route(web::delete().to(handlers::delete_banner))
    );
  }
  for path in &legacy_paths("users") {
    cfg.service(
      web::resource(path.as_str())
        .route(web::get().to(handlers::users))
        .route(web::post().to(handlers::post_user))
        .route(web::delete().to(handlers::delete_user))
    );
  }
  for path in &legacy_paths("login") {
    cfg.route(path.as_str(), web::post().to(handlers::login));
  }
  for path in &legacy_paths("metrics") {
    cfg.route(path.as_str(), web::post().to(handlers::metrics));
  }
  for path in &legacy_paths("upload") {
    cfg.route(path.as_str(), web::post().to(handlers::upload));
  }
  cfg.route("/uploads/{file_name}", web::get().to(handlers::uploaded_file));
}
