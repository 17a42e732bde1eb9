use serde::{Deserialize, Serialize};

// Flat records, close to what's in the tables. The
// JSON representations live in app::dtos.
// Deserialize is only there for the demo content the
// setup binary loads.

#[derive(Debug, Serialize, Deserialize)]
pub struct Article {
  #[serde(default)]
  pub id: i64,
  pub title: String,
  pub excerpt: String,
  pub content: String,
  pub category: String,
  pub image_url: String,
  pub author: String,
  pub publish_date: String,
  #[serde(default)]
  pub views: i64,
  #[serde(default)]
  pub created_at: i64
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Category {
  #[serde(default)]
  pub id: i64,
  pub name: String,
  pub icon: String,
  pub description: String,
  #[serde(default)]
  pub created_at: i64
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Banner {
  #[serde(default)]
  pub id: i64,
  pub image_url: String,
  pub title: String,
  pub subtitle: String,
  pub cta: String,
  #[serde(default)]
  pub link: String,
  #[serde(default)]
  pub clicks: i64,
  #[serde(default)]
  pub created_at: i64
}

// The password hash is only read by the login process,
// listing users uses UserSummary.
#[derive(Debug)]
pub struct User {
  pub id: i64,
  pub name: String,
  pub email: String,
  pub password: String,
  pub created_at: i64
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
  pub id: i64,
  pub name: String,
  pub email: String
}

impl From<User> for UserSummary {
  fn from(user: User) -> Self {
    Self {
      id: user.id,
      name: user.name,
      email: user.email
    }
  }
}
