use super::entities::*;
use rusqlite::{Row, Error};

// Column order has to match the field lists in the
// queries from the db module.

pub const ARTICLE_FIELDS: &'static str =
  "id, title, excerpt, content, category, image_url, author, publish_date, views, created_at";

pub fn map_article(row: &Row) -> Result<Article, Error> {
  Ok(Article {
    id: row.get(0)?,
    title: row.get(1)?,
    excerpt: row.get(2)?,
    content: row.get(3)?,
    category: row.get(4)?,
    image_url: row.get(5)?,
    author: row.get(6)?,
    publish_date: row.get(7)?,
    views: row.get(8)?,
    created_at: row.get(9)?
  })
}

pub fn map_category(row: &Row) -> Result<Category, Error> {
  Ok(Category {
    id: row.get(0)?,
    name: row.get(1)?,
    icon: row.get(2)?,
    description: row.get(3)?,
    created_at: row.get(4)?
  })
}

pub fn map_banner(row: &Row) -> Result<Banner, Error> {
  Ok(Banner {
    id: row.get(0)?,
    image_url: row.get(1)?,
    title: row.get(2)?,
    subtitle: row.get(3)?,
    cta: row.get(4)?,
    link: row.get(5)?,
    clicks: row.get(6)?,
    created_at: row.get(7)?
  })
}

pub fn map_user(row: &Row) -> Result<User, Error> {
  Ok(User {
    id: row.get(0)?,
    name: row.get(1)?,
    email: row.get(2)?,
    password: row.get(3)?,
    created_at: row.get(4)?
  })
}

pub fn map_user_summary(row: &Row) -> Result<UserSummary, Error> {
  Ok(UserSummary {
    id: row.get(0)?,
    name: row.get(1)?,
    email: row.get(2)?
  })
}
