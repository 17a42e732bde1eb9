use actix_web::{
  web,
  HttpResponse,
  HttpRequest,
  Result
};
use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};
use std::convert::TryFrom;
use log::{error, info, warn};
use crate::db::entities::*;
use crate::db;
use crate::utils::time_utils;
use super::dtos::*;
use super::error::{Error, map_db_error};
use super::upload::{content_type_for, served_inline};
use super::AppState;
use super::helpers;

// Module with all the API handler functions, grouped
// by resource.

/* --- Status --- */

// Also used by the old frontend to check if the API is
// reachable, so database errors aren't HTTP errors here.
pub async fn index(
  app_state: web::Data<AppState>
) -> HttpResponse {
  let mut status = StatusInfo {
    status: "online",
    message: format!("{} operacional", app_state.api_info.name),
    database: None,
    tables: None,
    database_error: None
  };
  match db::table_names(&app_state.pool) {
    Ok(tables) => {
      status.database = Some("Connected");
      status.tables = Some(tables);
    },
    Err(e) => {
      error!("Status check could not reach the database - {:?}", e);
      status.database_error = Some(e.to_string());
    }
  }
  HttpResponse::Ok().json(status)
}

pub async fn test(
  app_state: web::Data<AppState>
) -> HttpResponse {
  let database = match app_state.pool.get() {
    Ok(_) => String::from("Conectado com sucesso ao banco"),
    Err(e) => format!("Erro de conexão: {}", e)
  };
  HttpResponse::Ok().json(TestInfo {
    status: "online",
    message: String::from("A API está funcionando corretamente."),
    server_time: time_utils::current_datetime_sql(),
    version: app_state.api_info.version.clone(),
    database
  })
}

// Default response when no route matched the request:
pub async fn not_found() -> Result<HttpResponse, Error> {
  Err(Error::NotFound(String::from("Endpoint não encontrado")))
}

/* --- Articles --- */

pub async fn articles(
  app_state: web::Data<AppState>,
  query: web::Query<ArticlesQuery>
) -> Result<HttpResponse, Error> {
  let filter: db::ArticleFilter = query.into_inner().into();
  let total = db::article_count(&app_state.pool, &filter)
    .map_err(map_db_error)?;
  let articles: Vec<ArticleDto> = db::articles(&app_state.pool, &filter)
    .map_err(map_db_error)?
    .into_iter()
    .map(ArticleDto::from)
    .collect();
  // The body stays a plain array like it always was, the
  // total for pagination is in a header.
  Ok(
    HttpResponse::Ok()
      .header("X-Total-Count", total.to_string())
      .json(articles)
  )
}

// Path variables have to be in a tuple.
pub async fn article(
  app_state: web::Data<AppState>,
  path: web::Path<(i64,)>
) -> Result<HttpResponse, Error> {
  let id = path.into_inner().0;
  match db::article_by_id(&app_state.pool, id).map_err(map_db_error)? {
    Some(a) => Ok(HttpResponse::Ok().json(ArticleDto::from(a))),
    None => Err(Error::NotFound("Artigo não encontrado".to_string()))
  }
}

pub async fn post_article(
  app_state: web::Data<AppState>,
  body: web::Json<NewArticleDto>
) -> Result<HttpResponse, Error> {
  let mut article: Article = body.into_inner().into();
  db::insert_article(&app_state.pool, &mut article)
    .map_err(|e| {
      error!("Could not insert an article - {:?}", e);
      Error::DatabaseError(format!("Failed to insert article - {}", e))
    })?;
  info!("Article {} created: {}", article.id, article.title);
  Ok(HttpResponse::Ok().json(JsonStatus::success_with_id(article.id)))
}

pub async fn delete_article(
  app_state: web::Data<AppState>,
  body: web::Json<IdBody>
) -> Result<HttpResponse, Error> {
  let deleted = db::delete_article(&app_state.pool, body.id)
    .map_err(map_db_error)?;
  info!("Delete article {} - {} row(s)", body.id, deleted);
  Ok(HttpResponse::Ok().json(JsonStatus::success()))
}

/* --- Categories --- */

pub async fn categories(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let categories: Vec<CategoryDto> = db::all_categories(&app_state.pool)
    .map_err(map_db_error)?
    .into_iter()
    .map(CategoryDto::from)
    .collect();
  Ok(HttpResponse::Ok().json(categories))
}

// Duplicates are not HTTP errors, the admin panel reads
// "success" and "error" from the body.
pub async fn post_category(
  app_state: web::Data<AppState>,
  body: web::Json<NewCategoryDto>
) -> Result<HttpResponse, Error> {
  let mut category = Category::try_from(body.into_inner())?;
  let duplicate = JsonStatus::error("Categoria já existe");
  if db::category_exists(&app_state.pool, &category.name).map_err(map_db_error)? {
    return Ok(HttpResponse::Ok().json(duplicate));
  }
  // The UNIQUE constraint can still refuse it if someone
  // else inserted the same name in the meantime.
  if !db::insert_category(&app_state.pool, &mut category).map_err(map_db_error)? {
    return Ok(HttpResponse::Ok().json(duplicate));
  }
  info!("Category {} created: {}", category.id, category.name);
  Ok(HttpResponse::Ok().json(JsonStatus::success_with_id(category.id)))
}

pub async fn delete_category(
  app_state: web::Data<AppState>,
  body: web::Json<IdBody>
) -> Result<HttpResponse, Error> {
  let deleted = db::delete_category(&app_state.pool, body.id)
    .map_err(map_db_error)?;
  info!("Delete category {} - {} row(s)", body.id, deleted);
  Ok(HttpResponse::Ok().json(JsonStatus::success()))
}

/* --- Banners --- */

pub async fn banners(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let banners: Vec<BannerDto> = db::all_banners(&app_state.pool)
    .map_err(map_db_error)?
    .into_iter()
    .map(BannerDto::from)
    .collect();
  Ok(HttpResponse::Ok().json(banners))
}

pub async fn post_banner(
  app_state: web::Data<AppState>,
  body: web::Json<NewBannerDto>
) -> Result<HttpResponse, Error> {
  let mut banner = Banner::try_from(body.into_inner())?;
  db::insert_banner(&app_state.pool, &mut banner)
    .map_err(map_db_error)?;
  info!("Banner {} created", banner.id);
  Ok(HttpResponse::Ok().json(JsonStatus::success_with_id(banner.id)))
}

pub async fn delete_banner(
  app_state: web::Data<AppState>,
  body: web::Json<IdBody>
) -> Result<HttpResponse, Error> {
  let deleted = db::delete_banner(&app_state.pool, body.id)
    .map_err(map_db_error)?;
  info!("Delete banner {} - {} row(s)", body.id, deleted);
  Ok(HttpResponse::Ok().json(JsonStatus::success()))
}

/* --- Users --- */

pub async fn users(
  app_state: web::Data<AppState>
) -> Result<HttpResponse, Error> {
  let users = db::all_users(&app_state.pool)
    .map_err(map_db_error)?;
  Ok(HttpResponse::Ok().json(users))
}

pub async fn post_user(
  app_state: web::Data<AppState>,
  body: web::Json<NewUserDto>
) -> Result<HttpResponse, Error> {
  let validated = ValidatedUser::try_from(body.into_inner())?;
  let duplicate = JsonStatus::error("E-mail já cadastrado");
  if db::user_exists(&app_state.pool, &validated.email).map_err(map_db_error)? {
    return Ok(HttpResponse::Ok().json(duplicate));
  }
  let mut user = User {
    id: -1,
    name: validated.name,
    email: validated.email,
    password: helpers::hash_password(validated.password).await?,
    created_at: 0
  };
  if !db::insert_user(&app_state.pool, &mut user).map_err(map_db_error)? {
    return Ok(HttpResponse::Ok().json(duplicate));
  }
  info!("User {} created: {}", user.id, user.email);
  Ok(HttpResponse::Ok().json(JsonStatus::success_with_id(user.id)))
}

pub async fn delete_user(
  app_state: web::Data<AppState>,
  body: web::Json<IdBody>
) -> Result<HttpResponse, Error> {
  let deleted = db::delete_user(&app_state.pool, body.id)
    .map_err(map_db_error)?;
  info!("Delete user {} - {} row(s)", body.id, deleted);
  Ok(HttpResponse::Ok().json(JsonStatus::success()))
}

/* --- Login --- */

pub async fn login(
  app_state: web::Data<AppState>,
  body: web::Json<LoginBody>,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  if app_state.check_rate_limit() {
    warn!("Login refused by the rate limiter for {:?}", helpers::real_ip_addr(&req));
    return Err(Error::TooManyRequests);
  }
  let email = normalize_email(&body.email);
  let user = db::user_by_email(&app_state.pool, &email)
    .map_err(map_db_error)?;
  let verified = match user {
    Some(user) => {
      let matches = helpers::verify_password(
        body.password.clone(),
        user.password.clone()
      ).await;
      if matches { Some(user) } else { None }
    },
    None => None
  };
  match verified {
    Some(user) => {
      info!("User {} logged in", user.email);
      Ok(HttpResponse::Ok().json(LoginResponse {
        success: true,
        user: user.into()
      }))
    },
    None => {
      warn!(
        "Failed login attempt for {} from {:?}",
        email,
        helpers::real_ip_addr(&req)
      );
      Ok(HttpResponse::Ok().json(JsonStatus::error("Credenciais inválidas")))
    }
  }
}

/* --- Metrics --- */

// Counting something that doesn't exist is not an error,
// the frontend ignores the answer anyway.
pub async fn metrics(
  app_state: web::Data<AppState>,
  body: web::Json<MetricBody>
) -> Result<HttpResponse, Error> {
  let updated = match body.metric_type {
    MetricType::View => db::increment_article_views(&app_state.pool, body.id),
    MetricType::Click => db::increment_banner_clicks(&app_state.pool, body.id)
  }.map_err(map_db_error)?;
  if updated == 0 {
    warn!("Metric {:?} for unknown id {}", body.metric_type, body.id);
  }
  Ok(HttpResponse::Ok().json(JsonStatus::success()))
}

/* --- Uploads --- */

// Takes the first field named "file" in the multipart
// form, other fields are skipped.
pub async fn upload(
  app_state: web::Data<AppState>,
  mut payload: Multipart,
  req: HttpRequest
) -> Result<HttpResponse, Error> {
  let max_size = app_state.upload_service.max_size();
  while let Some(mut field) = payload.try_next().await
    .map_err(|e| Error::BadRequest(format!("Formulário inválido: {}", e)))? {
    let disposition = field.content_disposition()
      .filter(|cd| cd.get_name() == Some("file"));
    let disposition = match disposition {
      Some(cd) => cd,
      None => {
        // Skip the data of fields we don't care about:
        while let Some(_) = field.next().await {}
        continue;
      }
    };
    let original_name = disposition.get_filename()
      .unwrap_or("")
      .to_string();

    let mut data: Vec<u8> = Vec::new();
    while let Some(chunk) = field.next().await {
      let chunk = chunk
        .map_err(|e| Error::BadRequest(format!("Falha ao ler arquivo: {}", e)))?;
      if data.len() + chunk.len() > max_size {
        return Err(Error::BadRequest(format!(
          "Arquivo muito grande, máximo de {} bytes",
          max_size
        )));
      }
      data.extend_from_slice(&chunk);
    }

    let name = app_state.upload_service.save(&original_name, &data)
      .await
      .map_err(|e| {
        error!("Could not save uploaded file {} - {}", original_name, e);
        Error::InternalServerError(format!("Falha ao mover arquivo - {}", e))
      })?;
    let url = helpers::upload_url(&req, &app_state.api_info, &name);
    return Ok(HttpResponse::Ok().json(JsonStatus::success_with_url(url)));
  }
  Ok(HttpResponse::Ok().json(JsonStatus::error("Nenhum arquivo enviado")))
}

pub async fn uploaded_file(
  app_state: web::Data<AppState>,
  path: web::Path<(String,)>
) -> Result<HttpResponse, Error> {
  let name = path.into_inner().0;
  match app_state.upload_service.read(&name).await {
    Some(data) => {
      let content_type = content_type_for(&name);
      let mut response = HttpResponse::Ok();
      response
        .content_type(content_type)
        .header("X-Content-Type-Options", "nosniff");
      if !served_inline(content_type) {
        // Stored names are sanitized, nothing to quote:
        response.header(
          "Content-Disposition",
          format!("attachment; filename=\"{}\"", name)
        );
      }
      Ok(response.body(data))
    },
    None => Err(Error::NotFound("Arquivo não encontrado".to_string()))
  }
}
