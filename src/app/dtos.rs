use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use crate::db::entities::*;
use crate::db::{ArticleFilter, DEFAULT_MAX_ARTICLES, MAX_ARTICLES};
use crate::utils::{
  time_utils::{self, DateFormat},
  serde_utils,
  text_utils
};
use super::error::Error;

// The JSON field names are the column names, the frontend
// maps them (image_url -> imageUrl etc.) on its side.

// Column sizes from the original database:
const MAX_TITLE_LENGTH: usize = 255;
const MAX_CATEGORY_LENGTH: usize = 50;
const MAX_URL_LENGTH: usize = 255;
const MAX_AUTHOR_LENGTH: usize = 100;
const MAX_DATE_LENGTH: usize = 50;
const MAX_ICON_LENGTH: usize = 50;
const MAX_DESCRIPTION_LENGTH: usize = 255;
const MAX_BANNER_TITLE_LENGTH: usize = 100;
const MAX_CTA_LENGTH: usize = 50;
const MAX_NAME_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 100;
// Generated excerpts:
const EXCERPT_LENGTH: usize = 200;
// SQLite integers are i64, a bigger OFFSET would be
// bound as a REAL and make the query fail.
const MAX_START: usize = i64::MAX as usize;

pub const DEFAULT_TITLE: &'static str = "Sem título";
pub const DEFAULT_CATEGORY: &'static str = "Geral";
pub const DEFAULT_AUTHOR: &'static str = "Admin";
pub const DEFAULT_ICON: &'static str = "fa-tag";

// Trims, applies the default when nothing is left, then
// cuts to the column size.
fn text_or(value: Option<String>, default: &str, max_chars: usize) -> String {
  let mut text = serde_utils::empty_string_to_none(value)
    .map(|s| s.trim().to_string())
    .unwrap_or_else(|| default.to_string());
  text_utils::truncate_utf8(&mut text, max_chars);
  text
}

fn required_text(
  value: Option<String>,
  max_chars: usize,
  message: &str
) -> Result<String, Error> {
  let text = text_or(value, "", max_chars);
  if text.is_empty() {
    Err(Error::BadRequest(message.to_string()))
  } else {
    Ok(text)
  }
}

pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

/* --- Articles --- */

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticleDto {
  pub id: i64,
  pub title: String,
  pub excerpt: String,
  pub content: String,
  pub category: String,
  pub image_url: String,
  pub author: String,
  pub publish_date: String,
  pub views: i64,
  pub created_at: String
}

impl From<Article> for ArticleDto {
  fn from(article: Article) -> Self {
    Self {
      id: article.id,
      title: article.title,
      excerpt: article.excerpt,
      content: article.content,
      category: article.category,
      image_url: article.image_url,
      author: article.author,
      publish_date: article.publish_date,
      views: article.views,
      created_at: time_utils::timestamp_to_date_string(
        article.created_at,
        DateFormat::Sql
      )
    }
  }
}

// Everything is optional in there, the old API filled in
// defaults for whatever was missing.
#[derive(Debug, Default, Deserialize)]
pub struct NewArticleDto {
  pub title: Option<String>,
  pub excerpt: Option<String>,
  pub content: Option<String>,
  pub category: Option<String>,
  pub image_url: Option<String>,
  pub author: Option<String>,
  pub publish_date: Option<String>
}

impl From<NewArticleDto> for Article {
  fn from(dto: NewArticleDto) -> Self {
    let content = dto.content.unwrap_or_default();
    // Summaries used to be generated on the admin panel,
    // we derive one from the body text when it's missing.
    let excerpt = serde_utils::empty_string_to_none(dto.excerpt)
      .map(|e| e.trim().to_string())
      .unwrap_or_else(|| text_utils::excerpt_from_content(&content, EXCERPT_LENGTH));
    let publish_date = serde_utils::empty_string_to_none(dto.publish_date)
      .unwrap_or_else(time_utils::current_publish_date);
    Self {
      id: -1,
      title: text_or(dto.title, DEFAULT_TITLE, MAX_TITLE_LENGTH),
      excerpt,
      content,
      category: text_or(dto.category, DEFAULT_CATEGORY, MAX_CATEGORY_LENGTH),
      image_url: text_or(dto.image_url, "", MAX_URL_LENGTH),
      author: text_or(dto.author, DEFAULT_AUTHOR, MAX_AUTHOR_LENGTH),
      publish_date: text_or(Some(publish_date), "", MAX_DATE_LENGTH),
      views: 0,
      created_at: 0
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
  pub q: Option<String>,
  pub category: Option<String>,
  pub start: Option<usize>,
  pub max: Option<usize>
}

impl From<ArticlesQuery> for ArticleFilter {
  fn from(query: ArticlesQuery) -> Self {
    Self {
      query: serde_utils::empty_string_to_none(query.q),
      category: serde_utils::empty_string_to_none(query.category),
      start: query.start.unwrap_or(0).min(MAX_START),
      max: query.max
        .map(|m| if m > MAX_ARTICLES { MAX_ARTICLES } else { m })
        .unwrap_or(DEFAULT_MAX_ARTICLES)
    }
  }
}

/* --- Categories --- */

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryDto {
  pub id: i64,
  pub name: String,
  pub icon: String,
  pub description: String
}

impl From<Category> for CategoryDto {
  fn from(category: Category) -> Self {
    Self {
      id: category.id,
      name: category.name,
      icon: category.icon,
      description: category.description
    }
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct NewCategoryDto {
  pub name: Option<String>,
  pub icon: Option<String>,
  pub description: Option<String>
}

impl TryFrom<NewCategoryDto> for Category {
  type Error = Error;

  fn try_from(dto: NewCategoryDto) -> Result<Self, Self::Error> {
    Ok(Self {
      id: -1,
      name: required_text(dto.name, MAX_CATEGORY_LENGTH, "O nome da categoria é obrigatório")?,
      icon: text_or(dto.icon, DEFAULT_ICON, MAX_ICON_LENGTH),
      description: text_or(dto.description, "", MAX_DESCRIPTION_LENGTH),
      created_at: 0
    })
  }
}

/* --- Banners --- */

#[derive(Debug, Serialize, Deserialize)]
pub struct BannerDto {
  pub id: i64,
  pub image_url: String,
  pub title: String,
  pub subtitle: String,
  pub cta: String,
  pub link: String,
  pub clicks: i64
}

impl From<Banner> for BannerDto {
  fn from(banner: Banner) -> Self {
    Self {
      id: banner.id,
      image_url: banner.image_url,
      title: banner.title,
      subtitle: banner.subtitle,
      cta: banner.cta,
      link: banner.link,
      clicks: banner.clicks
    }
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct NewBannerDto {
  pub image_url: Option<String>,
  pub title: Option<String>,
  pub subtitle: Option<String>,
  pub cta: Option<String>,
  pub link: Option<String>
}

impl TryFrom<NewBannerDto> for Banner {
  type Error = Error;

  fn try_from(dto: NewBannerDto) -> Result<Self, Self::Error> {
    Ok(Self {
      id: -1,
      image_url: required_text(dto.image_url, MAX_URL_LENGTH, "A imagem do banner é obrigatória")?,
      title: text_or(dto.title, "", MAX_BANNER_TITLE_LENGTH),
      subtitle: text_or(dto.subtitle, "", MAX_DESCRIPTION_LENGTH),
      cta: text_or(dto.cta, "", MAX_CTA_LENGTH),
      link: text_or(dto.link, "", MAX_URL_LENGTH),
      clicks: 0,
      created_at: 0
    })
  }
}

/* --- Users --- */

// Passwords are hashed in the handler, this only checks
// that we have everything.
#[derive(Debug, Default, Deserialize)]
pub struct NewUserDto {
  pub name: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>
}

pub struct ValidatedUser {
  pub name: String,
  pub email: String,
  pub password: String
}

impl TryFrom<NewUserDto> for ValidatedUser {
  type Error = Error;

  fn try_from(dto: NewUserDto) -> Result<Self, Self::Error> {
    let email = normalize_email(
      &required_text(dto.email, MAX_EMAIL_LENGTH, "O e-mail é obrigatório")?
    );
    // The password is not trimmed.
    let password = match dto.password {
      Some(p) if !p.is_empty() => p,
      _ => return Err(Error::BadRequest("A senha é obrigatória".to_string()))
    };
    Ok(Self {
      name: required_text(dto.name, MAX_NAME_LENGTH, "O nome é obrigatório")?,
      email,
      password
    })
  }
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email: String,
  pub password: String
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub success: bool,
  pub user: UserSummary
}

/* --- Misc request bodies --- */

// DELETE requests carry the ID in a JSON body.
#[derive(Debug, Deserialize)]
pub struct IdBody {
  #[serde(deserialize_with = "serde_utils::deserialize_id")]
  pub id: i64
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
  View,
  Click
}

#[derive(Debug, Deserialize)]
pub struct MetricBody {
  #[serde(rename = "type")]
  pub metric_type: MetricType,
  #[serde(deserialize_with = "serde_utils::deserialize_id")]
  pub id: i64
}

/* --- Responses --- */

// Generic answer for write operations. The old API used
// "success" plus either an "id" or an "error".
#[derive(Debug, Deserialize, Serialize)]
pub struct JsonStatus {
  pub success: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub id: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub url: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>
}

impl JsonStatus {
  pub fn success() -> Self {
    Self {
      success: true,
      id: None,
      url: None,
      error: None
    }
  }

  pub fn success_with_id(id: i64) -> Self {
    Self {
      id: Some(id),
      ..Self::success()
    }
  }

  pub fn success_with_url(url: String) -> Self {
    Self {
      url: Some(url),
      ..Self::success()
    }
  }

  pub fn error(message: &str) -> Self {
    Self {
      success: false,
      id: None,
      url: None,
      error: Some(message.to_string())
    }
  }
}

#[derive(Debug, Serialize)]
pub struct StatusInfo {
  pub status: &'static str,
  pub message: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub database: Option<&'static str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tables: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub database_error: Option<String>
}

#[derive(Debug, Serialize)]
pub struct TestInfo {
  pub status: &'static str,
  pub message: String,
  pub server_time: String,
  pub version: String,
  pub database: String
}
