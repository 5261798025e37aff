//! [`SchedulePort`] over a borrowed SQLite connection.
//!
//! Wrapping a `rusqlite::Transaction` (which derefs to `Connection`) makes
//! every read and write of a transfer part of that transaction.

use coursebook_core::{
  schedule::{CourseDate, CourseGroup, CourseSubgroup},
  transfer::SchedulePort,
};
use rusqlite::Connection;

use crate::{Error, Result, table};

pub struct SqliteSchedule<'c> {
  conn: &'c Connection,
}

impl<'c> SqliteSchedule<'c> {
  pub fn new(conn: &'c Connection) -> Self { Self { conn } }
}

impl SchedulePort for SqliteSchedule<'_> {
  type Error = Error;

  fn subgroup(&self, id: i64) -> Result<Option<CourseSubgroup>> {
    table::find(self.conn, id)
  }

  fn group(&self, id: i64) -> Result<Option<CourseGroup>> {
    table::find(self.conn, id)
  }

  fn course_date(&self, id: i64) -> Result<Option<CourseDate>> {
    table::find(self.conn, id)
  }

  fn course_dates(&self, course_id: i64) -> Result<Vec<CourseDate>> {
    table::select_where(self.conn, "course_id = ?1 ORDER BY date, id", [course_id])
  }

  fn groups_on_date(&self, course_date_id: i64, degree_id: i64) -> Result<Vec<CourseGroup>> {
    table::select_where(
      self.conn,
      "course_date_id = ?1 AND degree_id = ?2 ORDER BY id",
      [course_date_id, degree_id],
    )
  }

  fn subgroups_of(&self, course_group_id: i64) -> Result<Vec<CourseSubgroup>> {
    table::select_where(self.conn, "course_group_id = ?1 ORDER BY id", [course_group_id])
  }

  fn reassign_client(
    &self,
    course_date_id: i64,
    client_id: i64,
    target: &CourseSubgroup,
  ) -> Result<usize> {
    Ok(self.conn.execute(
      "UPDATE booking_users
          SET course_subgroup_id = ?1, course_group_id = ?2, degree_id = ?3
        WHERE course_date_id = ?4 AND client_id = ?5",
      [
        target.id,
        target.course_group_id,
        target.degree_id,
        course_date_id,
        client_id,
      ],
    )?)
  }
}
