//! Generic, synchronous CRUD over any [`Resource`] table.
//!
//! These run on the connection thread inside `tokio_rusqlite::Connection::call`.
//! Table and column names are only ever taken from the resource's static
//! declaration; user input reaches SQL as bound parameters.

use coursebook_core::resource::{Attributes, ListQuery, Page, Resource};
use rusqlite::{Connection, OptionalExtension as _, Params, params_from_iter, types::Value as SqlValue};

use crate::{
  Result,
  encode::{decode, encode_draft, json_to_sql, read_row, select_list},
};

/// `SELECT` every row of `R` matching `clause` (a SQL fragment placed after
/// `WHERE`).
pub fn select_where<R: Resource>(
  conn: &Connection,
  clause: &str,
  params: impl Params,
) -> Result<Vec<R>> {
  let sql = format!("SELECT {} FROM {} WHERE {clause}", select_list::<R>(), R::TABLE);
  let mut stmt = conn.prepare(&sql)?;
  let maps = stmt
    .query_map(params, read_row::<R>)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  maps.into_iter().map(decode).collect()
}

pub fn find<R: Resource>(conn: &Connection, id: i64) -> Result<Option<R>> {
  let sql = format!("SELECT {} FROM {} WHERE id = ?1", select_list::<R>(), R::TABLE);
  conn
    .query_row(&sql, [id], read_row::<R>)
    .optional()?
    .map(decode)
    .transpose()
}

pub fn insert<R: Resource>(conn: &Connection, draft: &R::Draft) -> Result<R> {
  let (columns, values) = encode_draft::<R>(draft)?;
  let placeholders = (1..=values.len())
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!(
    "INSERT INTO {} ({}) VALUES ({placeholders})",
    R::TABLE,
    columns.join(", ")
  );
  conn.execute(&sql, params_from_iter(values))?;

  let id = conn.last_insert_rowid();
  find::<R>(conn, id)?.ok_or_else(|| {
    coursebook_core::Error::ResourceNotFound { resource: R::TABLE, id }.into()
  })
}

/// Apply `attrs` to row `id`. The changed row must still decode as `R`;
/// otherwise the update is rolled back and reported as an invalid request.
pub fn update<R: Resource>(
  conn: &mut Connection,
  id: i64,
  attrs: &Attributes,
) -> Result<Option<R>> {
  R::check_attributes(attrs)?;
  if attrs.is_empty() {
    return find::<R>(conn, id);
  }

  let mut assignments = Vec::with_capacity(attrs.len());
  let mut values = Vec::with_capacity(attrs.len() + 1);
  for (i, (column, value)) in attrs.iter().enumerate() {
    assignments.push(format!("{column} = ?{}", i + 1));
    values.push(json_to_sql(column, value)?);
  }
  values.push(SqlValue::Integer(id));

  let sql = format!(
    "UPDATE {} SET {} WHERE id = ?{}",
    R::TABLE,
    assignments.join(", "),
    values.len()
  );

  let tx = conn.transaction()?;
  if tx.execute(&sql, params_from_iter(values))? == 0 {
    return Ok(None);
  }
  let row = match find::<R>(&tx, id) {
    Ok(row) => row,
    Err(crate::Error::Json(e)) => {
      tx.rollback()?;
      return Err(coursebook_core::Error::InvalidRequest(e.to_string()).into());
    }
    Err(e) => return Err(e),
  };
  tx.commit()?;
  Ok(row)
}

pub fn delete<R: Resource>(conn: &Connection, id: i64) -> Result<bool> {
  let sql = format!("DELETE FROM {} WHERE id = ?1", R::TABLE);
  Ok(conn.execute(&sql, [id])? > 0)
}

/// Escape `LIKE` wildcards so user text matches literally under `ESCAPE '\'`.
fn escape_like(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

fn sql_int(name: &str, value: usize) -> Result<i64> {
  i64::try_from(value).map_err(|_| {
    coursebook_core::Error::InvalidRequest(format!("{name} is out of range")).into()
  })
}

pub fn list<R: Resource>(conn: &Connection, query: &ListQuery) -> Result<Page<R>> {
  query.validate::<R>()?;
  let (skip, limit) = query.window()?;
  let sql_offset = sql_int("skip", skip)?;
  let sql_limit = match limit {
    Some(l) => sql_int("limit", l)?,
    None => -1,
  };

  let mut conds: Vec<String> = vec![];
  let mut values: Vec<SqlValue> = vec![];

  for (column, value) in &query.filters {
    values.push(SqlValue::Text(value.clone()));
    conds.push(format!("{column} = ?{}", values.len()));
  }

  if let Some(text) = query.search.as_deref().filter(|t| !t.is_empty())
    && !R::SEARCHABLE.is_empty()
  {
    values.push(SqlValue::Text(format!("%{}%", escape_like(text))));
    let n = values.len();
    let any = R::SEARCHABLE
      .iter()
      .map(|c| format!("{c} LIKE ?{n} ESCAPE '\\'"))
      .collect::<Vec<_>>()
      .join(" OR ");
    conds.push(format!("({any})"));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };

  let total: i64 = conn.query_row(
    &format!("SELECT COUNT(*) FROM {} {where_clause}", R::TABLE),
    params_from_iter(values.iter()),
    |r| r.get(0),
  )?;

  let direction = query.order_direction.as_sql();
  let order_column = query.order_column();
  let order = if order_column == "id" {
    format!("id {direction}")
  } else {
    format!("{order_column} {direction}, id {direction}")
  };

  values.push(SqlValue::Integer(sql_limit));
  values.push(SqlValue::Integer(sql_offset));
  let sql = format!(
    "SELECT {} FROM {} {where_clause} ORDER BY {order} LIMIT ?{} OFFSET ?{}",
    select_list::<R>(),
    R::TABLE,
    values.len() - 1,
    values.len()
  );

  let mut stmt = conn.prepare(&sql)?;
  let maps = stmt
    .query_map(params_from_iter(values.iter()), read_row::<R>)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  let data = maps.into_iter().map(decode).collect::<Result<Vec<R>>>()?;

  Ok(Page { data, total: total as usize, skip, limit })
}
