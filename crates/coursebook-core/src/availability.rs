//! Date-range availability for a course.
//!
//! Backends load the raw schedule rows and per-subgroup booking counts; the
//! shaping into dates → groups → subgroups happens here so every backend
//! derives positions and free places the same way.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  schedule::{CourseDate, CourseGroup, CourseSubgroup},
  transfer::sort_by_position,
};

/// Inclusive date bounds; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
  pub start_date: Option<NaiveDate>,
  pub end_date:   Option<NaiveDate>,
}

impl DateRange {
  pub fn validate(&self) -> Result<()> {
    if let (Some(start), Some(end)) = (self.start_date, self.end_date)
      && start > end
    {
      return Err(Error::InvalidRequest(format!(
        "startDate {start} is after endDate {end}"
      )));
    }
    Ok(())
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start_date.is_none_or(|s| date >= s) && self.end_date.is_none_or(|e| date <= e)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgroupAvailability {
  pub subgroup_id:      i64,
  pub position:         usize,
  pub max_participants: Option<i64>,
  pub booked:           i64,
  /// `None` when the subgroup has no capacity limit.
  pub available:        Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAvailability {
  pub group:     CourseGroup,
  pub subgroups: Vec<SubgroupAvailability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAvailability {
  pub course_date: CourseDate,
  pub groups:      Vec<GroupAvailability>,
}

/// Assemble availability for the dates in `range`.
///
/// `booked` maps subgroup id → number of bookings; missing entries count as
/// zero. Rows belonging to dates outside `range` are ignored.
pub fn summarize(
  range: &DateRange,
  mut dates: Vec<CourseDate>,
  groups: Vec<CourseGroup>,
  subgroups: Vec<CourseSubgroup>,
  booked: &HashMap<i64, i64>,
) -> Vec<DateAvailability> {
  dates.retain(|d| range.contains(d.date));
  dates.sort_by_key(|d| (d.date, d.id));

  let mut by_group: HashMap<i64, Vec<CourseSubgroup>> = HashMap::new();
  for s in subgroups {
    by_group.entry(s.course_group_id).or_default().push(s);
  }

  let mut by_date: HashMap<i64, Vec<CourseGroup>> = HashMap::new();
  for g in groups {
    by_date.entry(g.course_date_id).or_default().push(g);
  }

  dates
    .into_iter()
    .map(|course_date| {
      let mut groups = by_date.remove(&course_date.id).unwrap_or_default();
      groups.sort_by_key(|g| g.id);

      let groups = groups
        .into_iter()
        .map(|group| {
          let mut subs = by_group.remove(&group.id).unwrap_or_default();
          sort_by_position(&mut subs);
          let subgroups = subs
            .into_iter()
            .enumerate()
            .map(|(position, s)| {
              let booked = booked.get(&s.id).copied().unwrap_or(0);
              SubgroupAvailability {
                subgroup_id: s.id,
                position,
                max_participants: s.max_participants,
                booked,
                available: s.max_participants.map(|max| max.saturating_sub(booked).max(0)),
              }
            })
            .collect();
          GroupAvailability { group, subgroups }
        })
        .collect();

      DateAvailability { course_date, groups }
    })
    .collect()
}
