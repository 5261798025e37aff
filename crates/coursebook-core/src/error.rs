//! Error types for `coursebook-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("course subgroup not found: {0}")]
  SubgroupNotFound(i64),

  #[error("course group not found: {0}")]
  GroupNotFound(i64),

  #[error("course date not found: {0}")]
  CourseDateNotFound(i64),

  #[error("{resource} not found: {id}")]
  ResourceNotFound { resource: &'static str, id: i64 },

  /// A candidate group on a future date does not have the same number of
  /// subgroups as the source group.
  #[error("Some groups are not identical")]
  ShapeMismatch {
    course_date_id: i64,
    expected:       usize,
    found:          usize,
  },

  #[error("unknown column {column:?} for {resource}")]
  UnknownColumn { resource: &'static str, column: String },

  #[error("invalid request: {0}")]
  InvalidRequest(String),

  /// The write conflicts with stored data, e.g. a dangling or still-used
  /// reference.
  #[error("conflict: {0}")]
  Conflict(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// `true` for every variant that means "the referenced record is missing".
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::SubgroupNotFound(_)
        | Self::GroupNotFound(_)
        | Self::CourseDateNotFound(_)
        | Self::ResourceNotFound { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
