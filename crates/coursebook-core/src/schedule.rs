//! Scheduling entities: courses, their dated sessions, degree groups,
//! subgroups, clients, and the booking rows that tie a client to a subgroup.
//!
//! Every entity is stored with an integer `id` assigned by the store. Each has
//! a matching `New*` draft carrying the insert payload.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::resource::Resource;

// ─── Course ──────────────────────────────────────────────────────────────────

/// A bookable activity offered across one or more calendar dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourse {
  pub name:        String,
  #[serde(default)]
  pub description: Option<String>,
}

impl Resource for Course {
  type Draft = NewCourse;

  const TABLE: &'static str = "courses";
  const LABEL: &'static str = "Course";
  const COLUMNS: &'static [&'static str] = &["name", "description"];
  const SEARCHABLE: &'static [&'static str] = &["name", "description"];

  fn id(&self) -> i64 { self.id }
}

// ─── CourseDate ──────────────────────────────────────────────────────────────

/// One scheduled day-instance of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDate {
  pub id:         i64,
  pub course_id:  i64,
  pub date:       NaiveDate,
  /// `HH:MM`.
  pub hour_start: Option<String>,
  pub hour_end:   Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseDate {
  pub course_id:  i64,
  pub date:       NaiveDate,
  #[serde(default)]
  pub hour_start: Option<String>,
  #[serde(default)]
  pub hour_end:   Option<String>,
}

impl Resource for CourseDate {
  type Draft = NewCourseDate;

  const TABLE: &'static str = "course_dates";
  const LABEL: &'static str = "Course Date";
  const COLUMNS: &'static [&'static str] =
    &["course_id", "date", "hour_start", "hour_end"];

  fn id(&self) -> i64 { self.id }
}

// ─── Degree ──────────────────────────────────────────────────────────────────

/// A skill level used to group clients of similar ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Degree {
  pub id:           i64,
  pub name:         String,
  pub degree_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDegree {
  pub name:         String,
  #[serde(default)]
  pub degree_order: i64,
}

impl Resource for Degree {
  type Draft = NewDegree;

  const TABLE: &'static str = "degrees";
  const LABEL: &'static str = "Degree";
  const COLUMNS: &'static [&'static str] = &["name", "degree_order"];
  const SEARCHABLE: &'static [&'static str] = &["name"];

  fn id(&self) -> i64 { self.id }
}

// ─── CourseGroup ─────────────────────────────────────────────────────────────

/// A degree-specific cohort within a course date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseGroup {
  pub id:             i64,
  pub course_id:      i64,
  pub course_date_id: i64,
  pub degree_id:      i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseGroup {
  pub course_id:      i64,
  pub course_date_id: i64,
  pub degree_id:      i64,
}

impl Resource for CourseGroup {
  type Draft = NewCourseGroup;

  const TABLE: &'static str = "course_groups";
  const LABEL: &'static str = "Course Group";
  const COLUMNS: &'static [&'static str] =
    &["course_id", "course_date_id", "degree_id"];

  fn id(&self) -> i64 { self.id }
}

// ─── CourseSubgroup ──────────────────────────────────────────────────────────

/// A capacity-limited subdivision of a [`CourseGroup`].
///
/// A subgroup has no stored position. Its position is its rank among the
/// sibling subgroups of the same group sorted by `id` ascending; see
/// [`crate::transfer::position_of`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSubgroup {
  pub id:               i64,
  pub course_id:        i64,
  pub course_date_id:   i64,
  pub course_group_id:  i64,
  pub degree_id:        i64,
  /// `None` means unlimited.
  pub max_participants: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCourseSubgroup {
  pub course_id:        i64,
  pub course_date_id:   i64,
  pub course_group_id:  i64,
  pub degree_id:        i64,
  #[serde(default)]
  pub max_participants: Option<i64>,
}

impl Resource for CourseSubgroup {
  type Draft = NewCourseSubgroup;

  const TABLE: &'static str = "course_subgroups";
  const LABEL: &'static str = "Course Subgroup";
  const COLUMNS: &'static [&'static str] = &[
    "course_id",
    "course_date_id",
    "course_group_id",
    "degree_id",
    "max_participants",
  ];

  fn id(&self) -> i64 { self.id }
}

// ─── Client ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
  pub id:         i64,
  pub first_name: String,
  pub last_name:  String,
  pub email:      Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
  pub first_name: String,
  pub last_name:  String,
  #[serde(default)]
  pub email:      Option<String>,
}

impl Resource for Client {
  type Draft = NewClient;

  const TABLE: &'static str = "clients";
  const LABEL: &'static str = "Client";
  const COLUMNS: &'static [&'static str] = &["first_name", "last_name", "email"];
  const SEARCHABLE: &'static [&'static str] = &["first_name", "last_name", "email"];

  fn id(&self) -> i64 { self.id }
}

// ─── BookingUser ─────────────────────────────────────────────────────────────

/// A client's enrollment for one course date.
///
/// `course_subgroup_id`, `course_group_id` and `degree_id` always describe the
/// same subgroup → group → degree chain; a transfer rewrites all three from a
/// single resolved [`CourseSubgroup`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingUser {
  pub id:                 i64,
  pub client_id:          i64,
  pub course_id:          i64,
  pub course_date_id:     i64,
  pub course_group_id:    i64,
  pub course_subgroup_id: i64,
  pub degree_id:          i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBookingUser {
  pub client_id:          i64,
  pub course_id:          i64,
  pub course_date_id:     i64,
  pub course_group_id:    i64,
  pub course_subgroup_id: i64,
  pub degree_id:          i64,
}

impl NewBookingUser {
  /// Enroll `client_id` into `subgroup`, copying the subgroup's chain.
  pub fn in_subgroup(client_id: i64, subgroup: &CourseSubgroup) -> Self {
    Self {
      client_id,
      course_id:          subgroup.course_id,
      course_date_id:     subgroup.course_date_id,
      course_group_id:    subgroup.course_group_id,
      course_subgroup_id: subgroup.id,
      degree_id:          subgroup.degree_id,
    }
  }
}

impl Resource for BookingUser {
  type Draft = NewBookingUser;

  const TABLE: &'static str = "booking_users";
  const LABEL: &'static str = "Booking User";
  const COLUMNS: &'static [&'static str] = &[
    "client_id",
    "course_id",
    "course_date_id",
    "course_group_id",
    "course_subgroup_id",
    "degree_id",
  ];

  fn id(&self) -> i64 { self.id }
}
