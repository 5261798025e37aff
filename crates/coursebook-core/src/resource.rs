//! The generic CRUD abstraction shared by every stored entity.
//!
//! A [`Resource`] declares its table, its writable columns and the columns
//! free-text search runs over. Backends only ever interpolate names taken from
//! these static declarations; anything coming from a request is checked
//! against them first (see [`ListQuery::validate`]).

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Error, Result};

/// Partial attribute set used by `update`. Keys must be declared columns.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

// ─── Trait ───────────────────────────────────────────────────────────────────

pub trait Resource:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  /// Insert payload: every column except `id`.
  type Draft: Serialize + DeserializeOwned + Send + Sync + 'static;

  /// SQL table name.
  const TABLE: &'static str;
  /// Human-readable singular name used in response messages.
  const LABEL: &'static str;
  /// Writable columns, excluding `id`.
  const COLUMNS: &'static [&'static str];
  /// Text columns matched by [`ListQuery::search`].
  const SEARCHABLE: &'static [&'static str] = &[];

  fn id(&self) -> i64;

  /// `true` if `column` is `id` or one of [`Self::COLUMNS`].
  fn has_column(column: &str) -> bool {
    column == "id" || Self::COLUMNS.contains(&column)
  }

  /// Reject attribute maps that touch `id` or undeclared columns.
  fn check_attributes(attrs: &Attributes) -> Result<()> {
    for key in attrs.keys() {
      if !Self::COLUMNS.contains(&key.as_str()) {
        return Err(Error::UnknownColumn {
          resource: Self::TABLE,
          column:   key.clone(),
        });
      }
    }
    Ok(())
  }
}

// ─── Query type ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  Asc,
  #[default]
  Desc,
}

impl SortDirection {
  pub fn as_sql(self) -> &'static str {
    match self {
      Self::Asc => "ASC",
      Self::Desc => "DESC",
    }
  }
}

/// Parameters for a generic `list` call.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
  /// Equality filters, `(column, value)`.
  pub filters:         Vec<(String, String)>,
  /// Case-insensitive substring match over the searchable columns.
  pub search:          Option<String>,
  pub skip:            Option<usize>,
  pub limit:           Option<usize>,
  /// 1-based page number; only used together with `per_page`.
  pub page:            Option<usize>,
  pub per_page:        Option<usize>,
  /// Defaults to `id`.
  pub order_column:    Option<String>,
  pub order_direction: SortDirection,
}

impl ListQuery {
  pub fn filter(mut self, column: &str, value: impl ToString) -> Self {
    self.filters.push((column.to_owned(), value.to_string()));
    self
  }

  /// Check every column name against `R`'s declaration.
  pub fn validate<R: Resource>(&self) -> Result<()> {
    let unknown = self
      .filters
      .iter()
      .map(|(c, _)| c.as_str())
      .chain(self.order_column.as_deref())
      .find(|c| !R::has_column(c));

    match unknown {
      Some(column) => Err(Error::UnknownColumn {
        resource: R::TABLE,
        column:   column.to_owned(),
      }),
      None => Ok(()),
    }
  }

  pub fn order_column(&self) -> &str {
    self.order_column.as_deref().unwrap_or("id")
  }

  /// Resolve `(offset, limit)`. Page-based pagination wins when `per_page`
  /// is set. An offset past `usize::MAX` is an invalid request.
  pub fn window(&self) -> Result<(usize, Option<usize>)> {
    match self.per_page {
      Some(per_page) => {
        let page = self.page.unwrap_or(1).max(1);
        let offset = (page - 1).checked_mul(per_page).ok_or_else(|| {
          Error::InvalidRequest("page is out of range".into())
        })?;
        Ok((offset, Some(per_page)))
      }
      None => Ok((self.skip.unwrap_or(0), self.limit)),
    }
  }
}

/// One slice of a list result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<R> {
  pub data:  Vec<R>,
  /// Number of rows matching the filters, ignoring the window.
  pub total: usize,
  pub skip:  usize,
  pub limit: Option<usize>,
}
