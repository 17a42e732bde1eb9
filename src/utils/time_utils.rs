use chrono::{Local, TimeZone};

// chrono formatting reference:
// https://docs.rs/chrono/0.4.19/chrono/format/strftime/index.html
// Display date the frontend shows on article cards, e.g. "14 Oct, 2026":
const DATE_FORMAT_PUBLISH: &'static str = "%d %b, %Y";
// Same thing the MySQL TIMESTAMP columns of the old API used to return:
const DATE_FORMAT_SQL: &'static str = "%Y-%m-%d %H:%M:%S";

pub enum DateFormat {
  Publish,
  Sql,
}

pub fn timestamp_to_date_string(timestamp: i64, format: DateFormat) -> String {
  let d = Local.timestamp(timestamp, 0);
  let format_str = match format {
    DateFormat::Publish => DATE_FORMAT_PUBLISH,
    DateFormat::Sql => DATE_FORMAT_SQL,
  };
  d.format(format_str).to_string()
}

pub fn current_timestamp() -> i64 {
  Local::now().timestamp()
}

pub fn current_publish_date() -> String {
  timestamp_to_date_string(current_timestamp(), DateFormat::Publish)
}

pub fn current_datetime_sql() -> String {
  Local::now().format(DATE_FORMAT_SQL).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  // Noon UTC so that local time zones can't change the day.
  const SOME_NOON: i64 = 1615118400;

  #[test]
  fn publish_date_formats_as_expected() {
    let result = timestamp_to_date_string(SOME_NOON, DateFormat::Publish);
    assert_eq!("07 Mar, 2021", result);
  }

  #[test]
  fn sql_date_has_the_right_shape() {
    let result = timestamp_to_date_string(SOME_NOON, DateFormat::Sql);
    assert!(result.starts_with("2021-03-07 "));
    assert_eq!(19, result.len());
  }
}
