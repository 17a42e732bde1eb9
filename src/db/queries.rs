// Small SELECT builder for the article listing, which has
// a variable amount of WHERE conditions.
// Everything that comes from users has to go through
// parameters, this only glues SQL fragments together.

use std::fmt;

pub enum Order {
  Asc,
  Desc
}

pub struct OrderBy {
  pub order: Order,
  pub field: String
}

impl OrderBy {
  pub fn new(order: Order, field: &str) -> Self {
    OrderBy {
      order,
      field: field.to_string()
    }
  }
}

// The "q_" in front of field names is just because
// "where" is a reserved keyword in Rust.
pub struct Query {
  q_fields: Vec<String>,
  q_from: String,
  q_where: Vec<String>,
  q_order: Vec<OrderBy>,
  limit: Option<usize>,
  offset: Option<usize>,
}

impl Query {

  pub fn select(fields: &str, from: &str) -> Self {
    Query {
      q_fields: vec![fields.to_string()],
      q_from: from.to_string(),
      q_where: Vec::new(),
      q_order: Vec::new(),
      limit: None,
      offset: None
    }
  }

  // Conditions are all glued with AND, use parentheses
  // inside of a condition to get an OR.
  pub fn and_where(mut self, condition: &str) -> Self {
    self.q_where.push(condition.to_string());
    self
  }

  pub fn order(mut self, order: OrderBy) -> Self {
    self.q_order.push(order);
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn offset(mut self, offset: usize) -> Self {
    self.offset = Some(offset);
    self
  }

  // Same query with the fields replaced by count(*), no
  // ordering and no limits.
  pub fn to_count(&self) -> Query {
    Query {
      q_fields: vec!["count(*)".to_string()],
      q_from: self.q_from.clone(),
      q_where: self.q_where.clone(),
      q_order: Vec::new(),
      limit: None,
      offset: None
    }
  }

}

impl fmt::Display for Query {

  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "SELECT {} FROM {}", self.q_fields.join(","), self.q_from)?;
    if !self.q_where.is_empty() {
      write!(f, " WHERE {}", self.q_where.join(" AND "))?;
    }
    if !self.q_order.is_empty() {
      let orders: Vec<String> = self.q_order.iter()
        .map(|o| format!(
          "{} {}",
          o.field,
          match o.order {
            Order::Asc => "ASC",
            Order::Desc => "DESC"
          }
        ))
        .collect();
      write!(f, " ORDER BY {}", orders.join(", "))?;
    }
    // SQLite wants a LIMIT when OFFSET is present, -1
    // means no limit.
    match (self.limit, self.offset) {
      (Some(lim), Some(off)) => write!(f, " LIMIT {} OFFSET {}", lim, off),
      (Some(lim), None) => write!(f, " LIMIT {}", lim),
      (None, Some(off)) => write!(f, " LIMIT -1 OFFSET {}", off),
      (None, None) => Ok(())
    }
  }

}
