pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod deals;
pub mod news;

use axum::Json;

use crate::{error::Status, prelude::*};

pub async fn health() -> &'static str {
  "OK"
}

pub fn ok() -> Json<Status> {
  Json(Status { success: true, msg: None })
}

/// Public listings degrade to an empty page instead of failing.
pub fn or_empty<T: Default>(result: Result<T>, what: &str) -> T {
  result.unwrap_or_else(|err| {
    error!("Error fetching {what}: {err}");
    T::default()
  })
}
