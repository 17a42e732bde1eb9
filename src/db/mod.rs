use rusqlite::{params, NO_PARAMS, Row, ToSql, OptionalExtension};
pub mod entities;
pub mod schema;
mod mappers;
mod helpers;
mod queries;
use eyre::WrapErr;
use color_eyre::Result;
use entities::*;
use mappers::*;
use crate::utils::time_utils::current_timestamp;

// Type alias to make function signatures much clearer:
pub type Pool = r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>;

// Every connection gets our SQL functions, the search
// queries need them.
pub fn connection_manager(db_path: &str) -> r2d2_sqlite::SqliteConnectionManager {
  r2d2_sqlite::SqliteConnectionManager::file(db_path)
    .with_init(helpers::register_functions)
}

pub const DEFAULT_MAX_ARTICLES: usize = 30;
pub const MAX_ARTICLES: usize = 100;

// Search and pagination options for the article listing.
#[derive(Debug)]
pub struct ArticleFilter {
  pub query: Option<String>,
  pub category: Option<String>,
  pub start: usize,
  pub max: usize
}

impl Default for ArticleFilter {
  fn default() -> Self {
    Self {
      query: None,
      category: None,
      start: 0,
      max: DEFAULT_MAX_ARTICLES
    }
  }
}

// Stole most of the signature from the rusqlite doc.
fn select_many<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Vec<T>>
  where
    P: IntoIterator,
    P::Item: ToSql,
    F: FnMut(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let conn = pool.get()?;
  let mut stmt = conn.prepare(query)?;
  stmt.query_map(params, mapper)
    .and_then(Iterator::collect)
    .context("Generic select_many query")
}

fn select_one<T, P, F>(
  pool: &Pool,
  query: &str,
  params: P,
  mapper: F
) -> Result<Option<T>>
  where
    P: IntoIterator,
    P::Item: ToSql,
    F: FnOnce(&Row<'_>) -> Result<T, rusqlite::Error>,
{
  let conn = pool.get()?;
  conn.query_row(query, params, mapper)
    .optional()
    .context("Generic select_one query")
}

fn exists<P>(
  pool: &Pool,
  query: &str,
  params: P
) -> Result<bool>
  where
    P: IntoIterator,
    P::Item: ToSql,
{
  let found: Option<i64> = select_one(pool, query, params, |row| row.get(0))?;
  Ok(found.is_some())
}

// Returns the amount of affected rows.
fn execute<P>(
  pool: &Pool,
  query: &str,
  params: P
) -> Result<usize>
  where
    P: IntoIterator,
    P::Item: ToSql,
{
  let conn = pool.get()?;
  conn.execute(query, params)
    .context("Generic execute statement")
}

// Runs an INSERT and gives back the new row ID, or None
// when a UNIQUE constraint refused the row.
fn insert<P>(
  pool: &Pool,
  query: &str,
  params: P
) -> Result<Option<i64>>
  where
    P: IntoIterator,
    P::Item: ToSql,
{
  let conn = pool.get()?;
  match conn.execute(query, params) {
    Ok(_) => Ok(Some(conn.last_insert_rowid())),
    Err(e) if helpers::is_unique_violation(&e) => Ok(None),
    Err(e) => Err(e).context("Generic insert statement")
  }
}

/* --- Articles --- */

pub fn articles(
  pool: &Pool,
  filter: &ArticleFilter
) -> Result<Vec<Article>> {
  let (query, params) = helpers::article_filter_query(filter);
  select_many(pool, &query.to_string(), &params, map_article)
}

pub fn article_count(
  pool: &Pool,
  filter: &ArticleFilter
) -> Result<i64> {
  let (query, params) = helpers::article_filter_query(filter);
  let conn = pool.get()?;
  conn.query_row(&query.to_count().to_string(), &params, |row| row.get(0))
    .context("Counting articles")
}

pub fn article_by_id(
  pool: &Pool,
  id: i64
) -> Result<Option<Article>> {
  select_one(
    pool,
    &format!("SELECT {} FROM articles WHERE id = ?", ARTICLE_FIELDS),
    params![id],
    map_article
  )
}

// Sets the id and created_at fields of the article.
pub fn insert_article(
  pool: &Pool,
  article: &mut Article
) -> Result<()> {
  article.created_at = current_timestamp();
  let id = insert(
    pool,
    "INSERT INTO articles (title, excerpt, content, category, image_url, \
    author, publish_date, views, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
    params![
      article.title,
      article.excerpt,
      article.content,
      article.category,
      article.image_url,
      article.author,
      article.publish_date,
      article.created_at
    ]
  )?;
  // There's no UNIQUE column in articles.
  article.id = id.unwrap_or(-1);
  article.views = 0;
  Ok(())
}

pub fn delete_article(
  pool: &Pool,
  id: i64
) -> Result<usize> {
  execute(pool, "DELETE FROM articles WHERE id = ?", params![id])
}

pub fn increment_article_views(
  pool: &Pool,
  id: i64
) -> Result<usize> {
  execute(pool, "UPDATE articles SET views = views + 1 WHERE id = ?", params![id])
}

/* --- Categories --- */

pub fn all_categories(
  pool: &Pool
) -> Result<Vec<Category>> {
  select_many(
    pool,
    "SELECT id, name, icon, description, created_at \
    FROM categories ORDER BY name ASC",
    NO_PARAMS,
    map_category
  )
}

pub fn category_exists(
  pool: &Pool,
  name: &str
) -> Result<bool> {
  exists(pool, "SELECT id FROM categories WHERE name = ?", params![name])
}

// Returns false if a category with the same name got
// inserted in the meantime.
pub fn insert_category(
  pool: &Pool,
  category: &mut Category
) -> Result<bool> {
  category.created_at = current_timestamp();
  let id = insert(
    pool,
    "INSERT INTO categories (name, icon, description, created_at) \
    VALUES (?, ?, ?, ?)",
    params![
      category.name,
      category.icon,
      category.description,
      category.created_at
    ]
  )?;
  Ok(match id {
    Some(id) => {
      category.id = id;
      true
    },
    None => false
  })
}

pub fn delete_category(
  pool: &Pool,
  id: i64
) -> Result<usize> {
  execute(pool, "DELETE FROM categories WHERE id = ?", params![id])
}

/* --- Banners --- */

pub fn all_banners(
  pool: &Pool
) -> Result<Vec<Banner>> {
  select_many(
    pool,
    "SELECT id, image_url, title, subtitle, cta, link, clicks, created_at \
    FROM banners ORDER BY id DESC",
    NO_PARAMS,
    map_banner
  )
}

pub fn insert_banner(
  pool: &Pool,
  banner: &mut Banner
) -> Result<()> {
  banner.created_at = current_timestamp();
  let id = insert(
    pool,
    "INSERT INTO banners (image_url, title, subtitle, cta, link, clicks, created_at) \
    VALUES (?, ?, ?, ?, ?, 0, ?)",
    params![
      banner.image_url,
      banner.title,
      banner.subtitle,
      banner.cta,
      banner.link,
      banner.created_at
    ]
  )?;
  banner.id = id.unwrap_or(-1);
  banner.clicks = 0;
  Ok(())
}

pub fn delete_banner(
  pool: &Pool,
  id: i64
) -> Result<usize> {
  execute(pool, "DELETE FROM banners WHERE id = ?", params![id])
}

pub fn increment_banner_clicks(
  pool: &Pool,
  id: i64
) -> Result<usize> {
  execute(pool, "UPDATE banners SET clicks = clicks + 1 WHERE id = ?", params![id])
}

/* --- Users --- */

pub fn all_users(
  pool: &Pool
) -> Result<Vec<UserSummary>> {
  select_many(
    pool,
    "SELECT id, name, email FROM users ORDER BY id ASC",
    NO_PARAMS,
    map_user_summary
  )
}

pub fn user_exists(
  pool: &Pool,
  email: &str
) -> Result<bool> {
  exists(pool, "SELECT id FROM users WHERE email = ?", params![email])
}

pub fn user_by_email(
  pool: &Pool,
  email: &str
) -> Result<Option<User>> {
  select_one(
    pool,
    "SELECT id, name, email, password, created_at FROM users WHERE email = ?",
    params![email],
    map_user
  )
}

// The password field has to already be hashed. Returns
// false when the email is taken.
pub fn insert_user(
  pool: &Pool,
  user: &mut User
) -> Result<bool> {
  user.created_at = current_timestamp();
  let id = insert(
    pool,
    "INSERT INTO users (name, email, password, created_at) VALUES (?, ?, ?, ?)",
    params![user.name, user.email, user.password, user.created_at]
  )?;
  Ok(match id {
    Some(id) => {
      user.id = id;
      true
    },
    None => false
  })
}

pub fn delete_user(
  pool: &Pool,
  id: i64
) -> Result<usize> {
  execute(pool, "DELETE FROM users WHERE id = ?", params![id])
}

/* --- Misc --- */

pub fn table_names(
  pool: &Pool
) -> Result<Vec<String>> {
  select_many(
    pool,
    "SELECT name FROM sqlite_master WHERE type = 'table' \
    AND name NOT LIKE 'sqlite_%' ORDER BY name ASC",
    NO_PARAMS,
    |row| row.get(0)
  )
}

pub fn create_schema(
  pool: &Pool
) -> Result<()> {
  let conn = pool.get()?;
  schema::create_schema(&conn)
}

// In-memory pool for tests. A single connection because
// every in-memory connection is its own database.
#[cfg(test)]
pub fn test_pool() -> Pool {
  let manager = r2d2_sqlite::SqliteConnectionManager::memory()
    .with_init(helpers::register_functions);
  let pool = r2d2::Pool::builder()
    .max_size(1)
    .build(manager)
    .unwrap();
  create_schema(&pool).unwrap();
  pool
}

#[cfg(test)]
pub fn sample_article(title: &str, category: &str) -> Article {
  Article {
    id: -1,
    title: title.to_string(),
    excerpt: format!("Resumo de {}", title),
    content: format!("<p>{}</p>", title),
    category: category.to_string(),
    image_url: String::new(),
    author: "Ana Silva".to_string(),
    publish_date: "24 Out, 2023".to_string(),
    views: 0,
    created_at: 0
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn category(name: &str) -> Category {
    Category {
      id: -1,
      name: name.to_string(),
      icon: "fa-tag".to_string(),
      description: String::new(),
      created_at: 0
    }
  }

  #[test]
  fn inserted_article_can_be_read_back() {
    let pool = test_pool();
    let mut article = sample_article("Destinos em alta", "Destinos");
    insert_article(&pool, &mut article).unwrap();
    assert!(article.id > 0);
    let found = article_by_id(&pool, article.id).unwrap().unwrap();
    assert_eq!("Destinos em alta", found.title);
    assert_eq!(0, found.views);
    assert!(article_by_id(&pool, article.id + 1).unwrap().is_none());
  }

  #[test]
  fn articles_are_filtered_and_newest_first() {
    let pool = test_pool();
    for (title, cat) in &[
      ("IA no atendimento", "Tecnologia"),
      ("Vendas de pacotes", "Marketing"),
      ("Novo portal com IA", "Tecnologia")
    ] {
      insert_article(&pool, &mut sample_article(title, cat)).unwrap();
    }
    let all = articles(&pool, &ArticleFilter::default()).unwrap();
    assert_eq!(3, all.len());
    // Same created_at second, so the id breaks the tie:
    assert_eq!("Novo portal com IA", all[0].title);

    let search = ArticleFilter {
      query: Some("ia".to_string()),
      ..ArticleFilter::default()
    };
    assert_eq!(2, articles(&pool, &search).unwrap().len());
    assert_eq!(2, article_count(&pool, &search).unwrap());

    // The category column is searched too:
    let by_text_category = ArticleFilter {
      query: Some("marketing".to_string()),
      ..ArticleFilter::default()
    };
    assert_eq!("Vendas de pacotes", articles(&pool, &by_text_category).unwrap()[0].title);

    let paged = ArticleFilter {
      category: Some("Tecnologia".to_string()),
      start: 1,
      max: 1,
      ..ArticleFilter::default()
    };
    let page = articles(&pool, &paged).unwrap();
    assert_eq!(1, page.len());
    assert_eq!("IA no atendimento", page[0].title);
  }

  #[test]
  fn like_wildcards_in_search_are_literal() {
    let pool = test_pool();
    insert_article(&pool, &mut sample_article("Desconto de 100%", "Marketing")).unwrap();
    insert_article(&pool, &mut sample_article("Desconto de 1000 reais", "Marketing")).unwrap();
    let filter = ArticleFilter {
      query: Some("100%".to_string()),
      ..ArticleFilter::default()
    };
    let found = articles(&pool, &filter).unwrap();
    assert_eq!(1, found.len());
    assert_eq!("Desconto de 100%", found[0].title);
  }

  #[test]
  fn search_ignores_accented_letter_case() {
    let pool = test_pool();
    insert_article(&pool, &mut sample_article("GESTÃO DE AGÊNCIAS", "Gestão")).unwrap();
    insert_article(&pool, &mut sample_article("Roteiros no Nordeste", "Destinos")).unwrap();
    let filter = ArticleFilter {
      query: Some("gestão de agências".to_string()),
      ..ArticleFilter::default()
    };
    let found = articles(&pool, &filter).unwrap();
    assert_eq!(1, found.len());
    assert_eq!("GESTÃO DE AGÊNCIAS", found[0].title);
    let upper = ArticleFilter {
      query: Some("NORDESTE".to_string()),
      ..ArticleFilter::default()
    };
    assert_eq!(1, article_count(&pool, &upper).unwrap());
  }

  #[test]
  fn counters_are_incremented() {
    let pool = test_pool();
    let mut article = sample_article("Sustentabilidade", "Gestão");
    insert_article(&pool, &mut article).unwrap();
    assert_eq!(1, increment_article_views(&pool, article.id).unwrap());
    increment_article_views(&pool, article.id).unwrap();
    assert_eq!(2, article_by_id(&pool, article.id).unwrap().unwrap().views);
    assert_eq!(0, increment_article_views(&pool, 999).unwrap());

    let mut banner = Banner {
      id: -1,
      image_url: "https://example.com/b.jpg".to_string(),
      title: "Campanha".to_string(),
      subtitle: String::new(),
      cta: "Ver".to_string(),
      link: String::new(),
      clicks: 0,
      created_at: 0
    };
    insert_banner(&pool, &mut banner).unwrap();
    increment_banner_clicks(&pool, banner.id).unwrap();
    assert_eq!(1, all_banners(&pool).unwrap()[0].clicks);
  }

  #[test]
  fn duplicate_category_is_refused_by_constraint() {
    let pool = test_pool();
    assert!(insert_category(&pool, &mut category("Marketing")).unwrap());
    assert!(category_exists(&pool, "Marketing").unwrap());
    assert!(!category_exists(&pool, "Gestão").unwrap());
    assert!(!insert_category(&pool, &mut category("Marketing")).unwrap());
    assert_eq!(1, all_categories(&pool).unwrap().len());
  }

  #[test]
  fn categories_are_sorted_by_name_and_deleted() {
    let pool = test_pool();
    let mut tech = category("Tecnologia");
    insert_category(&pool, &mut tech).unwrap();
    insert_category(&pool, &mut category("Destinos")).unwrap();
    let names: Vec<String> = all_categories(&pool).unwrap()
      .into_iter().map(|c| c.name).collect();
    assert_eq!(vec!["Destinos", "Tecnologia"], names);
    assert_eq!(1, delete_category(&pool, tech.id).unwrap());
    assert_eq!(0, delete_category(&pool, tech.id).unwrap());
  }

  #[test]
  fn users_are_unique_by_email() {
    let pool = test_pool();
    let mut user = User {
      id: -1,
      name: "Admin".to_string(),
      email: "admin@azul360.com.br".to_string(),
      password: "hash".to_string(),
      created_at: 0
    };
    assert!(insert_user(&pool, &mut user).unwrap());
    assert!(user_exists(&pool, "admin@azul360.com.br").unwrap());
    let mut twin = User { id: -1, created_at: 0, ..user };
    assert!(!insert_user(&pool, &mut twin).unwrap());
    let listed = all_users(&pool).unwrap();
    assert_eq!(1, listed.len());
    assert_eq!("admin@azul360.com.br", listed[0].email);
    assert_eq!("hash", user_by_email(&pool, "admin@azul360.com.br").unwrap().unwrap().password);
  }

  #[test]
  fn table_names_lists_schema() {
    let pool = test_pool();
    let tables = table_names(&pool).unwrap();
    assert_eq!(vec!["articles", "banners", "categories", "users"], tables);
  }
}
