use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("database error: {0}")]
  Db(DbErr),

  #[error("Profile not found")]
  ProfileNotFound,
  #[error("Deal not found")]
  DealNotFound,
  #[error("Article not found")]
  ArticleNotFound,
  #[error("Referral not found")]
  ReferralNotFound,
  #[error("Player deal not found")]
  PlayerDealNotFound,

  #[error("{0}")]
  InvalidArgs(String),
  #[error("Emails do not match")]
  EmailsMismatch,
  #[error("Email is already registered")]
  EmailTaken,
  #[error("Slug is already taken")]
  SlugTaken,
  #[error("Already exists")]
  Duplicate,
  #[error("Invalid credentials")]
  InvalidCredentials,
  #[error("Login required")]
  Unauthorized,
  #[error("Forbidden")]
  Forbidden,
  #[error("Deal already joined")]
  AlreadyJoined,
  #[error("Deal is not available in your country")]
  NotEligible,

  #[error("geolocation: {0}")]
  Geo(String),
}

impl From<DbErr> for Error {
  fn from(err: DbErr) -> Self {
    match err.sql_err() {
      Some(SqlErr::UniqueConstraintViolation(_)) => Error::Duplicate,
      _ => Error::Db(err),
    }
  }
}

impl From<JsonRejection> for Error {
  fn from(rejection: JsonRejection) -> Self {
    Error::InvalidArgs(rejection.body_text())
  }
}

impl From<QueryRejection> for Error {
  fn from(rejection: QueryRejection) -> Self {
    Error::InvalidArgs(rejection.body_text())
  }
}

impl From<PathRejection> for Error {
  fn from(rejection: PathRejection) -> Self {
    Error::InvalidArgs(rejection.body_text())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub fn status(&self) -> StatusCode {
    match self {
      Error::ProfileNotFound
      | Error::DealNotFound
      | Error::ArticleNotFound
      | Error::ReferralNotFound
      | Error::PlayerDealNotFound => StatusCode::NOT_FOUND,
      Error::InvalidArgs(_) | Error::EmailsMismatch => StatusCode::BAD_REQUEST,
      Error::InvalidCredentials | Error::Unauthorized => {
        StatusCode::UNAUTHORIZED
      }
      Error::Forbidden | Error::NotEligible => StatusCode::FORBIDDEN,
      Error::EmailTaken
      | Error::SlugTaken
      | Error::Duplicate
      | Error::AlreadyJoined => StatusCode::CONFLICT,
      Error::Db(_) | Error::Geo(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

#[derive(Serialize)]
pub struct Status {
  pub success: bool,
  pub msg: Option<String>,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = self.status();
    let msg = if status.is_server_error() {
      tracing::error!("request failed: {self}");
      "Internal server error".to_string()
    } else {
      self.to_string()
    };

    (status, Json(Status { success: false, msg: Some(msg) })).into_response()
  }
}
