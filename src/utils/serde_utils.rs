use serde::{Deserialize, Deserializer};
use serde::de::Error;

// The frontend turns every id into a string before sending
// it back (String(d.id)), other clients send plain numbers.
// To be used with annotation:
// #[serde(deserialize_with = "serde_utils::deserialize_id")]
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
  Number(i64),
  Text(String)
}

pub fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  match StringOrNumber::deserialize(deserializer)? {
    StringOrNumber::Number(id) => Ok(id),
    StringOrNumber::Text(s) => s.trim().parse::<i64>()
      .map_err(|_| D::Error::custom(format!("invalid id: {}", s)))
  }
}

// Empty or blank strings become None. I do it in the DTO
// conversions with this plain function instead of a custom
// deserializer.
pub fn empty_string_to_none(value: Option<String>) -> Option<String> {
  match value {
    Some(s) => if s.trim().is_empty()
      { None } else { Some(s) },
    None => None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Deserialize)]
  struct IdHolder {
    #[serde(deserialize_with = "deserialize_id")]
    id: i64
  }

  #[test]
  fn id_from_number_or_string() {
    let from_number: IdHolder = serde_json::from_str(r#"{"id": 12}"#).unwrap();
    let from_string: IdHolder = serde_json::from_str(r#"{"id": " 27"}"#).unwrap();
    assert_eq!(12, from_number.id);
    assert_eq!(27, from_string.id);
  }

  #[test]
  fn id_from_garbage_string_fails() {
    let result = serde_json::from_str::<IdHolder>(r#"{"id": "marketing"}"#);
    assert!(result.is_err());
  }

  #[test]
  fn blank_string_is_none() {
    assert_eq!(None, empty_string_to_none(Some("  ".to_string())));
    assert_eq!(None, empty_string_to_none(None));
    assert_eq!(Some("a".to_string()), empty_string_to_none(Some("a".to_string())));
  }
}
