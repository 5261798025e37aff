//! Encoding and decoding helpers between JSON attribute maps and the values
//! stored in SQLite columns.
//!
//! Every resource round-trips through a `serde_json::Map` keyed by column
//! name, so one set of helpers serves all tables. Dates are stored as
//! `YYYY-MM-DD` text, which keeps lexical and chronological order identical.

use chrono::NaiveDate;
use coursebook_core::resource::Resource;
use rusqlite::types::Value as SqlValue;
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn json_to_sql(column: &str, value: &Value) -> Result<SqlValue> {
  Ok(match value {
    Value::Null => SqlValue::Null,
    Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
    Value::Number(n) => match n.as_i64() {
      Some(i) => SqlValue::Integer(i),
      None => SqlValue::Real(
        n.as_f64()
          .ok_or_else(|| Error::UnsupportedValue(column.to_owned()))?,
      ),
    },
    Value::String(s) => SqlValue::Text(s.clone()),
    Value::Array(_) | Value::Object(_) => {
      return Err(Error::UnsupportedValue(column.to_owned()));
    }
  })
}

pub fn sql_to_json(value: SqlValue) -> Value {
  match value {
    SqlValue::Null | SqlValue::Blob(_) => Value::Null,
    SqlValue::Integer(i) => Value::from(i),
    SqlValue::Real(f) => serde_json::Number::from_f64(f)
      .map(Value::Number)
      .unwrap_or(Value::Null),
    SqlValue::Text(s) => Value::String(s),
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// Column list for `SELECT`, `id` first.
pub fn select_list<R: Resource>() -> String {
  std::iter::once("id")
    .chain(R::COLUMNS.iter().copied())
    .collect::<Vec<_>>()
    .join(", ")
}

/// Read a row selected with [`select_list`] into an attribute map.
pub fn read_row<R: Resource>(row: &rusqlite::Row<'_>) -> rusqlite::Result<Map<String, Value>> {
  let mut map = Map::with_capacity(R::COLUMNS.len() + 1);
  map.insert("id".to_owned(), sql_to_json(row.get(0)?));
  for (i, column) in R::COLUMNS.iter().enumerate() {
    map.insert((*column).to_owned(), sql_to_json(row.get(i + 1)?));
  }
  Ok(map)
}

pub fn decode<R: Resource>(map: Map<String, Value>) -> Result<R> {
  Ok(serde_json::from_value(Value::Object(map))?)
}

/// Serialise a draft into `(columns, values)` ready for `INSERT`.
pub fn encode_draft<R: Resource>(draft: &R::Draft) -> Result<(Vec<String>, Vec<SqlValue>)> {
  let map = match serde_json::to_value(draft)? {
    Value::Object(map) => map,
    _ => return Err(Error::UnsupportedValue(R::TABLE.to_owned())),
  };
  R::check_attributes(&map)?;

  let mut columns = Vec::with_capacity(map.len());
  let mut values = Vec::with_capacity(map.len());
  for (column, value) in &map {
    values.push(json_to_sql(column, value)?);
    columns.push(column.clone());
  }
  Ok((columns, values))
}
