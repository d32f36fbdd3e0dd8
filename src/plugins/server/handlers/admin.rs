use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use super::ok;
use crate::{
  entity::{
    PlayerDealStatus, ReferralStatus, Role, deal, news, player_deal,
    player_earning, profile, referral, sub_affiliate,
  },
  error::Status,
  plugins::server::extract::{Admin, Path, Payload},
  prelude::*,
  state::AppState,
  sv::{
    self,
    deal::{DealPatch, NewDeal},
    earning::NewEarning,
    news::NewArticle,
  },
  utils,
};

#[derive(Debug, Deserialize)]
pub struct PublishReq {
  pub published: bool,
}

#[derive(Debug, Deserialize)]
pub struct ActiveReq {
  pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoleReq {
  pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct ReferralStatusReq {
  pub status: ReferralStatus,
}

#[derive(Debug, Deserialize)]
pub struct PlayerDealStatusReq {
  pub status: PlayerDealStatus,
}

#[derive(Debug, Deserialize)]
pub struct CommissionReq {
  pub rate: i32,
}

pub async fn deals(
  State(app): State<Arc<AppState>>,
  _: Admin,
) -> Result<Json<Vec<deal::Model>>> {
  Ok(Json(sv::Deal::new(&app.db).all().await?))
}

pub async fn create_deal(
  State(app): State<Arc<AppState>>,
  Admin(session): Admin,
  Payload(new): Payload<NewDeal>,
) -> Result<(StatusCode, Json<deal::Model>)> {
  let deal = sv::Deal::new(&app.db).create(new).await?;
  info!("{} created deal {}", session.profile_id, deal.slug);
  Ok((StatusCode::CREATED, Json(deal)))
}

pub async fn deal(
  State(app): State<Arc<AppState>>,
  _: Admin,
  Path(id): Path<i32>,
) -> Result<Json<deal::Model>> {
  sv::Deal::new(&app.db)
    .by_id(id)
    .await?
    .map(Json)
    .ok_or(Error::DealNotFound)
}

pub async fn set_deal_active(
  State(app): State<Arc<AppState>>,
  Admin(session): Admin,
  Path(id): Path<i32>,
  Payload(req): Payload<ActiveReq>,
) -> Result<Json<deal::Model>> {
  let deal = sv::Deal::new(&app.db).set_active(id, req.active).await?;
  info!("{} set deal {} active={}", session.profile_id, deal.slug, req.active);
  Ok(Json(deal))
}

pub async fn update_deal(
  State(app): State<Arc<AppState>>,
  _: Admin,
  Path(id): Path<i32>,
  Payload(patch): Payload<DealPatch>,
) -> Result<Json<deal::Model>> {
  Ok(Json(sv::Deal::new(&app.db).update(id, patch).await?))
}

pub async fn create_article(
  State(app): State<Arc<AppState>>,
  _: Admin,
  Payload(new): Payload<NewArticle>,
) -> Result<(StatusCode, Json<news::Model>)> {
  let article = sv::News::new(&app.db).create(new).await?;
  Ok((StatusCode::CREATED, Json(article)))
}

pub async fn publish_article(
  State(app): State<Arc<AppState>>,
  _: Admin,
  Path(id): Path<i32>,
  Payload(req): Payload<PublishReq>,
) -> Result<Json<news::Model>> {
  let article =
    sv::News::new(&app.db).set_published(id, req.published).await?;
  Ok(Json(article))
}

pub async fn profiles(
  State(app): State<Arc<AppState>>,
  _: Admin,
) -> Result<Json<Vec<profile::Model>>> {
  Ok(Json(sv::Profile::new(&app.db).all().await?))
}

pub async fn set_role(
  State(app): State<Arc<AppState>>,
  Admin(session): Admin,
  Path(id): Path<String>,
  Payload(req): Payload<RoleReq>,
) -> Result<Json<profile::Model>> {
  let profile = sv::Profile::new(&app.db).set_role(&id, req.role).await?;
  app.sessions.set_role(&profile.id, profile.role);
  info!("{} set role of {} to {:?}", session.profile_id, id, req.role);
  Ok(Json(profile))
}

pub async fn set_referral_status(
  State(app): State<Arc<AppState>>,
  _: Admin,
  Path(id): Path<i32>,
  Payload(req): Payload<ReferralStatusReq>,
) -> Result<Json<referral::Model>> {
  let referral =
    sv::Referral::new(&app.db).set_status(id, req.status).await?;
  Ok(Json(referral))
}

pub async fn set_commission(
  State(app): State<Arc<AppState>>,
  _: Admin,
  Path(id): Path<i32>,
  Payload(req): Payload<CommissionReq>,
) -> Result<Json<sub_affiliate::Model>> {
  let affiliate =
    sv::Referral::new(&app.db).set_commission_rate(id, req.rate).await?;
  Ok(Json(affiliate))
}

pub async fn set_player_deal_status(
  State(app): State<Arc<AppState>>,
  _: Admin,
  Path(id): Path<i32>,
  Payload(req): Payload<PlayerDealStatusReq>,
) -> Result<Json<player_deal::Model>> {
  let joined =
    sv::PlayerDeal::new(&app.db).set_status(id, req.status).await?;
  Ok(Json(joined))
}

pub async fn record_earning(
  State(app): State<Arc<AppState>>,
  Admin(session): Admin,
  Payload(new): Payload<NewEarning>,
) -> Result<(StatusCode, Json<player_earning::Model>)> {
  let earning = sv::Earning::new(&app.db).record(new).await?;
  info!(
    "{} recorded {} rakeback for player deal {} ({})",
    session.profile_id,
    utils::format_cents(earning.rakeback),
    earning.player_deal_id,
    utils::format_period(earning.month, earning.year)
  );
  Ok((StatusCode::CREATED, Json(earning)))
}

pub async fn clear_geo_cache(
  State(app): State<Arc<AppState>>,
  Admin(session): Admin,
) -> Json<Status> {
  let removed = app.geo.purge();
  info!("{} purged {removed} geo cache entries", session.profile_id);
  ok()
}
