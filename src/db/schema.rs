use rusqlite::{Connection, NO_PARAMS};
use eyre::WrapErr;
use color_eyre::Result;

// Table names in creation order. The setup binary reports
// on each of them.
pub const TABLES: [&'static str; 4] = ["users", "categories", "articles", "banners"];

// Text columns are NOT NULL with empty defaults so that the
// mappers can read them as plain Strings.
const CREATE_USERS: &'static str = "CREATE TABLE IF NOT EXISTS users (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL,
  email TEXT NOT NULL UNIQUE,
  password TEXT NOT NULL,
  created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
)";

const CREATE_CATEGORIES: &'static str = "CREATE TABLE IF NOT EXISTS categories (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  name TEXT NOT NULL UNIQUE,
  icon TEXT NOT NULL DEFAULT 'fa-tag',
  description TEXT NOT NULL DEFAULT '',
  created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
)";

const CREATE_ARTICLES: &'static str = "CREATE TABLE IF NOT EXISTS articles (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  title TEXT NOT NULL,
  excerpt TEXT NOT NULL DEFAULT '',
  content TEXT NOT NULL DEFAULT '',
  category TEXT NOT NULL DEFAULT '',
  image_url TEXT NOT NULL DEFAULT '',
  author TEXT NOT NULL DEFAULT '',
  publish_date TEXT NOT NULL DEFAULT '',
  views INTEGER NOT NULL DEFAULT 0,
  created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
)";

const CREATE_BANNERS: &'static str = "CREATE TABLE IF NOT EXISTS banners (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  image_url TEXT NOT NULL,
  title TEXT NOT NULL DEFAULT '',
  subtitle TEXT NOT NULL DEFAULT '',
  cta TEXT NOT NULL DEFAULT '',
  link TEXT NOT NULL DEFAULT '',
  clicks INTEGER NOT NULL DEFAULT 0,
  created_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
)";

// Can be run on every startup, nothing happens when the
// tables are already there.
pub fn create_schema(conn: &Connection) -> Result<()> {
  for (table, statement) in TABLES.iter().zip(
    [CREATE_USERS, CREATE_CATEGORIES, CREATE_ARTICLES, CREATE_BANNERS].iter()
  ) {
    conn.execute(statement, NO_PARAMS)
      .with_context(|| format!("Creating table {}", table))?;
  }
  conn.execute(
    "CREATE INDEX IF NOT EXISTS articles_created_at ON articles (created_at)",
    NO_PARAMS
  ).context("Creating articles index")?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn schema_creation_is_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    create_schema(&conn).unwrap();
    create_schema(&conn).unwrap();
    let count: i64 = conn.query_row(
      "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name IN \
      ('users', 'categories', 'articles', 'banners')",
      NO_PARAMS,
      |row| row.get(0)
    ).unwrap();
    assert_eq!(4, count);
  }
}
