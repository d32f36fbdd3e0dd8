use axum::{Json, extract::State};
use serde::Deserialize;

use super::or_empty;
use crate::{
  entity::news,
  plugins::server::extract::{Path, Query},
  prelude::*,
  state::AppState,
  sv::{self, news::DEFAULT_LIMIT},
};

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
  pub limit: Option<u64>,
}

pub async fn list(
  State(app): State<Arc<AppState>>,
  Query(query): Query<NewsQuery>,
) -> Json<Vec<news::Model>> {
  let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
  Json(or_empty(sv::News::new(&app.db).published(limit).await, "news"))
}

pub async fn by_slug(
  State(app): State<Arc<AppState>>,
  Path(slug): Path<String>,
) -> Result<Json<news::Model>> {
  sv::News::new(&app.db)
    .by_slug(&slug)
    .await?
    .map(Json)
    .ok_or(Error::ArticleNotFound)
}
