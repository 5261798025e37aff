//! Moving clients between course subgroups.
//!
//! A transfer runs in two phases:
//!
//! 1. [`TransferPlan::resolve`] looks up both subgroups, their groups and the
//!    initial course date, and computes the target subgroup's position. A
//!    missing record fails here, before the backend opens a transaction.
//! 2. [`TransferPlan::apply`] performs the moves. Backends call it inside a
//!    single transaction and roll back on any error, so a
//!    [`Error::ShapeMismatch`] found on the third date leaves the first two
//!    dates untouched.
//!
//! In single-date mode the clients are moved on the initial subgroup's date
//! only. In all-days mode every date of the course on or after `today` is
//! visited; on each, every group of the target degree must have as many
//! subgroups as the initial group, and the clients land in the subgroup at
//! the target's position.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error,
  schedule::{CourseDate, CourseGroup, CourseSubgroup},
};

// ─── Request ─────────────────────────────────────────────────────────────────

/// Body of `POST /clients/transfer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
  pub initial_subgroup_id: i64,
  pub target_subgroup_id:  i64,
  pub client_ids:          Vec<i64>,
  pub move_all_days:       bool,
}

impl TransferRequest {
  pub fn validate(&self) -> crate::Result<()> {
    if self.client_ids.is_empty() {
      return Err(Error::InvalidRequest("clientIds must not be empty".into()));
    }
    Ok(())
  }
}

// ─── Position ────────────────────────────────────────────────────────────────

/// Order sibling subgroups by position (`id` ascending).
pub fn sort_by_position(subgroups: &mut [CourseSubgroup]) {
  subgroups.sort_by_key(|s| s.id);
}

/// Zero-based rank of `subgroup_id` among `siblings` sorted by `id`.
pub fn position_of(siblings: &[CourseSubgroup], subgroup_id: i64) -> Option<usize> {
  let mut ids: Vec<i64> = siblings.iter().map(|s| s.id).collect();
  ids.sort_unstable();
  ids.binary_search(&subgroup_id).ok()
}

// ─── Port ────────────────────────────────────────────────────────────────────

/// Synchronous view of the schedule tables used by a transfer.
///
/// Implemented by storage backends over a connection or an open transaction.
/// List methods may return rows in any order.
pub trait SchedulePort {
  type Error: From<Error>;

  fn subgroup(&self, id: i64) -> Result<Option<CourseSubgroup>, Self::Error>;

  fn group(&self, id: i64) -> Result<Option<CourseGroup>, Self::Error>;

  fn course_date(&self, id: i64) -> Result<Option<CourseDate>, Self::Error>;

  /// Every date of the course.
  fn course_dates(&self, course_id: i64) -> Result<Vec<CourseDate>, Self::Error>;

  /// Groups on `course_date_id` whose degree is `degree_id`.
  fn groups_on_date(
    &self,
    course_date_id: i64,
    degree_id: i64,
  ) -> Result<Vec<CourseGroup>, Self::Error>;

  fn subgroups_of(&self, course_group_id: i64) -> Result<Vec<CourseSubgroup>, Self::Error>;

  /// Point every booking of `client_id` on `course_date_id` at `target`.
  /// Returns the number of rows changed; zero is not an error.
  fn reassign_client(
    &self,
    course_date_id: i64,
    client_id: i64,
    target: &CourseSubgroup,
  ) -> Result<usize, Self::Error>;
}

// ─── Plan ────────────────────────────────────────────────────────────────────

/// A validated transfer with every referenced record loaded.
#[derive(Debug, Clone)]
pub struct TransferPlan {
  pub initial_date:    CourseDate,
  pub initial_group:   CourseGroup,
  pub target:          CourseSubgroup,
  pub target_group:    CourseGroup,
  pub target_position: usize,
  pub client_ids:      Vec<i64>,
  pub move_all_days:   bool,
}

impl TransferPlan {
  pub fn resolve<P: SchedulePort>(
    port: &P,
    request: TransferRequest,
  ) -> Result<Self, P::Error> {
    request.validate()?;

    let initial = port
      .subgroup(request.initial_subgroup_id)?
      .ok_or(Error::SubgroupNotFound(request.initial_subgroup_id))?;
    let target = port
      .subgroup(request.target_subgroup_id)?
      .ok_or(Error::SubgroupNotFound(request.target_subgroup_id))?;

    let initial_group = port
      .group(initial.course_group_id)?
      .ok_or(Error::GroupNotFound(initial.course_group_id))?;
    let initial_date = port
      .course_date(initial_group.course_date_id)?
      .ok_or(Error::CourseDateNotFound(initial_group.course_date_id))?;
    let target_group = port
      .group(target.course_group_id)?
      .ok_or(Error::GroupNotFound(target.course_group_id))?;

    let siblings = port.subgroups_of(target_group.id)?;
    let target_position = position_of(&siblings, target.id)
      .ok_or(Error::SubgroupNotFound(target.id))?;

    Ok(Self {
      initial_date,
      initial_group,
      target,
      target_group,
      target_position,
      client_ids: request.client_ids,
      move_all_days: request.move_all_days,
    })
  }

  /// Perform the moves. Returns the subgroups clients were moved into, in
  /// visiting order; always empty in single-date mode.
  ///
  /// Must run inside a transaction: on error, earlier dates have already been
  /// written through `port`.
  pub fn apply<P: SchedulePort>(
    &self,
    port: &P,
    today: NaiveDate,
  ) -> Result<Vec<CourseSubgroup>, P::Error> {
    if !self.move_all_days {
      self.move_clients(port, self.initial_date.id, &self.target)?;
      return Ok(Vec::new());
    }

    let expected = port.subgroups_of(self.initial_group.id)?.len();
    let mut dates = port.course_dates(self.initial_group.course_id)?;
    dates.sort_by_key(|d| (d.date, d.id));

    let mut changed = Vec::new();
    for date in dates.iter().filter(|d| d.date >= today) {
      let mut candidates = port.groups_on_date(date.id, self.target_group.degree_id)?;
      candidates.sort_by_key(|g| g.id);

      for group in candidates {
        let mut subgroups = port.subgroups_of(group.id)?;
        if subgroups.len() != expected {
          tracing::warn!(
            course_date_id = date.id,
            course_group_id = group.id,
            expected,
            found = subgroups.len(),
            "group shape differs from source group"
          );
          return Err(self.mismatch(date, expected, subgroups.len()).into());
        }

        sort_by_position(&mut subgroups);
        let found = subgroups.len();
        let resolved = subgroups
          .into_iter()
          .nth(self.target_position)
          .ok_or_else(|| self.mismatch(date, expected, found))?;

        self.move_clients(port, date.id, &resolved)?;
        changed.push(resolved);
      }
    }

    Ok(changed)
  }

  fn move_clients<P: SchedulePort>(
    &self,
    port: &P,
    course_date_id: i64,
    target: &CourseSubgroup,
  ) -> Result<usize, P::Error> {
    let mut moved = 0;
    for &client_id in &self.client_ids {
      moved += port.reassign_client(course_date_id, client_id, target)?;
    }
    tracing::debug!(course_date_id, subgroup_id = target.id, moved, "moved clients");
    Ok(moved)
  }

  fn mismatch(&self, date: &CourseDate, expected: usize, found: usize) -> Error {
    Error::ShapeMismatch { course_date_id: date.id, expected, found }
  }
}
