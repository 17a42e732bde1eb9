use actix_web::{web, HttpRequest};
use std::net::IpAddr;
use std::str::FromStr;
use regex::Regex;
use lazy_static::lazy_static;
use log::error;
use crate::config::ApiInfo;
use crate::utils::password_utils;
use super::error::Error;

// Only used for logging, nothing depends on actually
// getting an address.
pub fn real_ip_addr(req: &HttpRequest) -> Option<IpAddr> {
  // The goal of the regex is to remove the port part
  // from the "IP address" that Actix gives us, which
  // may or may not have a port part.
  lazy_static! {
    static ref PORT_REGEX: Regex = Regex::new(
      r"^\[?([^\]]+?)\]?:\d+$"
    ).unwrap();
  }

  req.connection_info().realip_remote_addr()
    .and_then(|ip| {
      IpAddr::from_str(ip)
        .ok()
        .or_else(|| IpAddr::from_str(&PORT_REGEX.replace(ip, "$1")).ok())
    })
}

// Public URL of an uploaded file. Uses the configured
// prefix or the scheme and host the request came in with.
pub fn upload_url(req: &HttpRequest, api_info: &ApiInfo, name: &str) -> String {
  match &api_info.uploads_url {
    Some(prefix) => format!("{}/{}", prefix, name),
    None => {
      let info = req.connection_info();
      format!("{}://{}/uploads/{}", info.scheme(), info.host(), name)
    }
  }
}

// Argon2 is slow on purpose, so both of these run on the
// blocking thread pool instead of the worker.
pub async fn hash_password(password: String) -> Result<String, Error> {
  web::block(move || password_utils::hash_password(&password))
    .await
    .map_err(|e| {
      error!("Could not hash a password - {:?}", e);
      Error::InternalServerError(format!("{:?}", e))
    })
}

pub async fn verify_password(password: String, hash: String) -> bool {
  let verified = web::block(move || {
    Ok::<bool, ()>(password_utils::verify_password(&password, &hash))
  }).await;
  match verified {
    Ok(v) => v,
    Err(e) => {
      error!("Password verification did not complete - {:?}", e);
      false
    }
  }
}
