use actix_web::{
  error::ResponseError,
  http::StatusCode,
  HttpResponse
};
use derive_more::Display;
use log::error;
use std::fmt;
use super::dtos::JsonStatus;

// I don't want internal details to show up to random
// internet people, the full error output should only
// appear in logs. The other variants carry a message
// that's meant for the admin panel.
#[derive(Debug, Display)]
pub enum Error {
  #[display(fmt = "Erro interno do servidor")]
  InternalServerError(String),
  #[display(fmt = "Erro de banco de dados")]
  DatabaseError(String),
  #[display(fmt = "{}", _0)]
  NotFound(String),
  #[display(fmt = "{}", _0)]
  BadRequest(String),
  #[display(fmt = "Muitas tentativas, tente novamente mais tarde")]
  TooManyRequests
}

// Error responses use the same JSON shape as the
// "success": false answers.
impl ResponseError for Error {
  fn status_code(&self) -> StatusCode {
    match self {
      Error::InternalServerError(_) | Error::DatabaseError(_) =>
        StatusCode::INTERNAL_SERVER_ERROR,
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) => StatusCode::BAD_REQUEST,
      Error::TooManyRequests => StatusCode::TOO_MANY_REQUESTS
    }
  }

  fn error_response(&self) -> HttpResponse {
    HttpResponse::build(self.status_code())
      .json(JsonStatus::error(&self.to_string()))
  }
}

// The data access layer uses eyre reports, which have
// to be logged here since they won't be in the response.
pub fn map_db_error<E: fmt::Debug + fmt::Display>(e: E) -> Error {
  error!("Database error: {:?}", e);
  Error::DatabaseError(e.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn internal_details_are_not_displayed() {
    let e = Error::DatabaseError("no such table: articles".to_string());
    assert_eq!("Erro de banco de dados", e.to_string());
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, e.status_code());
  }

  #[test]
  fn client_errors_display_their_message() {
    let e = Error::NotFound("Artigo não encontrado".to_string());
    assert_eq!("Artigo não encontrado", e.to_string());
    assert_eq!(StatusCode::NOT_FOUND, e.status_code());
    assert_eq!(StatusCode::TOO_MANY_REQUESTS, Error::TooManyRequests.status_code());
  }
}
