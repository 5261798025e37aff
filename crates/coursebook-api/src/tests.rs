//! Router-level tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use chrono::{Days, Local, NaiveDate};
use coursebook_core::{
  schedule::{
    BookingUser, Client, Course, CourseDate, CourseGroup, CourseSubgroup, Degree,
    NewBookingUser, NewClient, NewCourse, NewCourseDate, NewCourseGroup,
    NewCourseSubgroup, NewDegree,
  },
  store::BookingStore,
};
use coursebook_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn store() -> Arc<SqliteStore> {
  Arc::new(SqliteStore::open_in_memory().await.unwrap())
}

async fn send(
  store: &Arc<SqliteStore>,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = api_router(store.clone())
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
  let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
  (status, json)
}

fn days_from_today(n: u64) -> NaiveDate {
  Local::now().date_naive().checked_add_days(Days::new(n)).unwrap()
}

/// A course dated `n` days from today with one group of `subgroups` subgroups.
async fn session(
  s: &SqliteStore,
  course: &Course,
  degree: &Degree,
  in_days: u64,
  subgroups: usize,
) -> (CourseDate, Vec<CourseSubgroup>) {
  let date = s
    .create::<CourseDate>(NewCourseDate {
      course_id:  course.id,
      date:       days_from_today(in_days),
      hour_start: None,
      hour_end:   None,
    })
    .await
    .unwrap();
  let group = s
    .create::<CourseGroup>(NewCourseGroup {
      course_id:      course.id,
      course_date_id: date.id,
      degree_id:      degree.id,
    })
    .await
    .unwrap();
  let mut subs = Vec::new();
  for _ in 0..subgroups {
    subs.push(
      s.create::<CourseSubgroup>(NewCourseSubgroup {
        course_id:        course.id,
        course_date_id:   date.id,
        course_group_id:  group.id,
        degree_id:        degree.id,
        max_participants: Some(5),
      })
      .await
      .unwrap(),
    );
  }
  (date, subs)
}

async fn basics(s: &SqliteStore) -> (Course, Degree, Client) {
  let course = s
    .create::<Course>(NewCourse { name: "Week course".into(), description: None })
    .await
    .unwrap();
  let degree = s
    .create::<Degree>(NewDegree { name: "Blue".into(), degree_order: 2 })
    .await
    .unwrap();
  let client = s
    .create::<Client>(NewClient {
      first_name: "Ana".into(),
      last_name:  "Lopez".into(),
      email:      Some("ana@example.com".into()),
    })
    .await
    .unwrap();
  (course, degree, client)
}

// ─── CRUD ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_course() {
  let s = store().await;
  let (status, body) = send(
    &s,
    "POST",
    "/courses",
    Some(json!({ "name": "Freestyle", "description": "Park" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(body["success"], true);
  assert_eq!(body["message"], "Course saved successfully");
  let id = body["data"]["id"].as_i64().unwrap();

  let (status, body) = send(&s, "GET", &format!("/courses/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["name"], "Freestyle");
  assert_eq!(body["message"], "Course retrieved successfully");
}

#[tokio::test]
async fn get_missing_returns_error_envelope() {
  let s = store().await;
  let (status, body) = send(&s, "GET", "/clients/12", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["success"], false);
  assert_eq!(body["code"], 404);
  assert_eq!(body["message"], "Client not found");
}

#[tokio::test]
async fn create_with_missing_field_is_bad_request() {
  let s = store().await;
  let (status, body) = send(&s, "POST", "/clients", Some(json!({ "first_name": "Ana" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
  assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn list_supports_search_and_paging() {
  let s = store().await;
  for name in ["Ana", "Anabel", "Bruno"] {
    s.create::<Client>(NewClient {
      first_name: name.into(),
      last_name:  "Diaz".into(),
      email:      None,
    })
    .await
    .unwrap();
  }

  let (status, body) = send(&s, "GET", "/clients?search=ana&perPage=1&page=1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["total"], 2);
  assert_eq!(body["data"]["data"].as_array().unwrap().len(), 1);
  assert_eq!(body["message"], "Clients retrieved successfully");

  let (status, body) = send(&s, "GET", "/clients?no_such_column=1", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);
}

#[tokio::test]
async fn update_and_delete_degree() {
  let s = store().await;
  let (_, degree, _) = basics(&s).await;

  let (status, body) = send(
    &s,
    "PUT",
    &format!("/degrees/{}", degree.id),
    Some(json!({ "name": "Red" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["data"]["name"], "Red");
  assert_eq!(body["data"]["degree_order"], 2);

  let (status, body) = send(&s, "DELETE", &format!("/degrees/{}", degree.id), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["message"], "Degree deleted successfully");

  let (status, _) = send(&s, "DELETE", &format!("/degrees/{}", degree.id), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_page_is_bad_request_and_store_survives() {
  let s = store().await;
  let (status, body) = send(
    &s,
    "GET",
    "/courses?page=18446744073709551615&perPage=2",
    None,
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["code"], 400);

  let (status, body) = send(&s, "GET", "/courses", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
}

#[tokio::test]
async fn constraint_failures_are_client_errors() {
  let s = store().await;
  let (course, degree, client) = basics(&s).await;
  let (date, subs) = session(&s, &course, &degree, 1, 1).await;

  let (status, body) = send(
    &s,
    "POST",
    "/booking-users",
    Some(json!({
      "client_id":          client.id,
      "course_id":          course.id,
      "course_date_id":     999,
      "course_group_id":    subs[0].course_group_id,
      "course_subgroup_id": subs[0].id,
      "degree_id":          degree.id,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(!body["message"].as_str().unwrap().contains("FOREIGN KEY"));

  let (status, body) = send(
    &s,
    "PUT",
    &format!("/clients/{}", client.id),
    Some(json!({ "first_name": null })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["message"], "invalid request: first_name must not be null");

  let (status, _) = send(
    &s,
    "POST",
    "/booking-users",
    Some(json!({
      "client_id":          client.id,
      "course_id":          course.id,
      "course_date_id":     date.id,
      "course_group_id":    subs[0].course_group_id,
      "course_subgroup_id": subs[0].id,
      "degree_id":          degree.id + 1,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Transfer ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_date_transfer_returns_empty_data() {
  let s = store().await;
  let (course, degree, client) = basics(&s).await;
  let (date, subs) = session(&s, &course, &degree, 1, 2).await;
  s.create::<BookingUser>(NewBookingUser::in_subgroup(client.id, &subs[0]))
    .await
    .unwrap();

  let (status, body) = send(
    &s,
    "POST",
    "/clients/transfer",
    Some(json!({
      "initialSubgroupId": subs[0].id,
      "targetSubgroupId":  subs[1].id,
      "clientIds":         [client.id],
      "moveAllDays":       false,
    })),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);
  assert_eq!(body["data"], json!([]));
  assert_eq!(body["message"], "Clients transfer successfully");

  let (_, listed) = send(
    &s,
    "GET",
    &format!("/booking-users?course_date_id={}", date.id),
    None,
  )
  .await;
  assert_eq!(listed["data"]["data"][0]["course_subgroup_id"], subs[1].id);
}

#[tokio::test]
async fn all_days_transfer_lists_changed_subgroups() {
  let s = store().await;
  let (course, degree, client) = basics(&s).await;
  let (_, first) = session(&s, &course, &degree, 1, 2).await;
  let (_, second) = session(&s, &course, &degree, 2, 2).await;
  for sub in [&first[0], &second[0]] {
    s.create::<BookingUser>(NewBookingUser::in_subgroup(client.id, sub))
      .await
      .unwrap();
  }

  let (status, body) = send(
    &s,
    "POST",
    "/clients/transfer",
    Some(json!({
      "initialSubgroupId": first[0].id,
      "targetSubgroupId":  first[1].id,
      "clientIds":         [client.id],
      "moveAllDays":       true,
    })),
  )
  .await;

  assert_eq!(status, StatusCode::OK);
  let ids: Vec<i64> = body["data"]
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["id"].as_i64().unwrap())
    .collect();
  assert_eq!(ids, vec![first[1].id, second[1].id]);
}

#[tokio::test]
async fn transfer_with_unknown_subgroup_is_404() {
  let s = store().await;
  let (status, body) = send(
    &s,
    "POST",
    "/clients/transfer",
    Some(json!({
      "initialSubgroupId": 1,
      "targetSubgroupId":  2,
      "clientIds":         [3],
      "moveAllDays":       false,
    })),
  )
  .await;

  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["success"], false);
  assert_eq!(body["message"], "No existe el subgrupo");
}

#[tokio::test]
async fn transfer_shape_mismatch_is_409() {
  let s = store().await;
  let (course, degree, client) = basics(&s).await;
  let (_, first) = session(&s, &course, &degree, 1, 2).await;
  let (_, _second) = session(&s, &course, &degree, 2, 3).await;
  let booking = s
    .create::<BookingUser>(NewBookingUser::in_subgroup(client.id, &first[0]))
    .await
    .unwrap();

  let (status, body) = send(
    &s,
    "POST",
    "/clients/transfer",
    Some(json!({
      "initialSubgroupId": first[0].id,
      "targetSubgroupId":  first[1].id,
      "clientIds":         [client.id],
      "moveAllDays":       true,
    })),
  )
  .await;

  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["message"], "Some groups are not identical");
  assert_eq!(body["code"], 409);

  let unchanged = s.find::<BookingUser>(booking.id).await.unwrap().unwrap();
  assert_eq!(unchanged.course_subgroup_id, first[0].id);
}

#[tokio::test]
async fn transfer_body_is_validated() {
  let s = store().await;

  let (status, body) = send(
    &s,
    "POST",
    "/clients/transfer",
    Some(json!({
      "initialSubgroupId": 1,
      "targetSubgroupId":  2,
      "clientIds":         [],
      "moveAllDays":       false,
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(body["success"], false);

  let (status, _) = send(
    &s,
    "POST",
    "/clients/transfer",
    Some(json!({ "initialSubgroupId": "ten", "clientIds": [1] })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ─── Availability ────────────────────────────────────────────────────────────

#[tokio::test]
async fn availability_for_missing_course_is_404() {
  let s = store().await;
  let (status, body) = send(&s, "GET", "/courses/9/availability", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(body["success"], false);
}

#[tokio::test]
async fn availability_reports_free_places() {
  let s = store().await;
  let (course, degree, client) = basics(&s).await;
  let (date, subs) = session(&s, &course, &degree, 3, 2).await;
  s.create::<BookingUser>(NewBookingUser::in_subgroup(client.id, &subs[0]))
    .await
    .unwrap();

  let uri = format!(
    "/courses/{}/availability?startDate={}&endDate={}",
    course.id, date.date, date.date
  );
  let (status, body) = send(&s, "GET", &uri, None).await;

  assert_eq!(status, StatusCode::OK);
  let subgroups = &body["data"][0]["groups"][0]["subgroups"];
  assert_eq!(subgroups[0]["booked"], 1);
  assert_eq!(subgroups[0]["available"], 4);
  assert_eq!(subgroups[1]["available"], 5);

  let bad = format!(
    "/courses/{}/availability?startDate={}&endDate={}",
    course.id,
    days_from_today(5),
    days_from_today(4)
  );
  let (status, _) = send(&s, "GET", &bad, None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
