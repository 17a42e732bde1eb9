use rusqlite::{Connection, Error, ErrorCode};
use crate::utils::text_utils::like_pattern;
use super::queries::{Query, Order, OrderBy};
use super::mappers::ARTICLE_FIELDS;
use super::ArticleFilter;

// SQLITE_CONSTRAINT_UNIQUE extended result code.
const CONSTRAINT_UNIQUE: i32 = 2067;

// The UNIQUE constraints are the last line of defense
// behind the "does it exist" checks.
pub fn is_unique_violation(error: &Error) -> bool {
  match error {
    Error::SqliteFailure(e, _) =>
      e.code == ErrorCode::ConstraintViolation &&
      e.extended_code == CONSTRAINT_UNIQUE,
    _ => false
  }
}

// SQLite's own lower() and LIKE only fold ASCII, which
// doesn't work for Portuguese. Registered on every
// connection the pool opens.
pub fn register_functions(conn: &mut Connection) -> Result<(), Error> {
  conn.create_scalar_function("unicode_lower", 1, true, |ctx| {
    let text: Option<String> = ctx.get(0)?;
    Ok(text.map(|t| t.to_lowercase()))
  })
}

// Builds the article listing query and its parameters from
// the filter. The same text pattern is bound once per
// searched column.
pub fn article_filter_query(filter: &ArticleFilter) -> (Query, Vec<String>) {
  let mut query = Query::select(ARTICLE_FIELDS, "articles");
  let mut params: Vec<String> = Vec::new();
  // The pattern is lowercased here, the columns in SQL.
  let pattern = filter.query.as_ref()
    .and_then(|q| like_pattern(&q.to_lowercase()));
  if let Some(pattern) = pattern {
    query = query.and_where(
      "(unicode_lower(title) LIKE ? ESCAPE '\\' \
      OR unicode_lower(excerpt) LIKE ? ESCAPE '\\' \
      OR unicode_lower(category) LIKE ? ESCAPE '\\')"
    );
    params.extend(vec![pattern; 3]);
  }
  if let Some(category) = &filter.category {
    let category = category.trim();
    if !category.is_empty() {
      query = query.and_where("category = ?");
      params.push(category.to_string());
    }
  }
  let query = query
    .order(OrderBy::new(Order::Desc, "created_at"))
    .order(OrderBy::new(Order::Desc, "id"))
    .limit(filter.max)
    .offset(filter.start);
  (query, params)
}
