use axum::{
  Json,
  extract::State,
  http::{HeaderMap, header},
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::or_empty;
use crate::{
  entity::{deal, player_deal},
  error::Status,
  plugins::server::extract::{
    Auth, ClientIp, Path, Payload, Query, referral_cookie,
  },
  prelude::*,
  state::AppState,
  sv,
};

#[derive(Debug, Deserialize)]
pub struct DealsQuery {
  #[serde(rename = "ref")]
  pub referral: Option<String>,
  /// Only deals claimable from the visitor's country.
  #[serde(default)]
  pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct DealView {
  #[serde(flatten)]
  pub deal: deal::Model,
  pub claimable: bool,
}

impl DealView {
  fn new(deal: deal::Model, country: Option<&str>) -> Self {
    let claimable = deal.is_available_in(country);
    Self { deal, claimable }
  }
}

#[derive(Debug, Serialize)]
pub struct DealsPage {
  pub country: Option<String>,
  pub deals: Vec<DealView>,
}

#[derive(Debug, Serialize)]
pub struct GeoView {
  pub country: String,
}

pub async fn geo(
  State(app): State<Arc<AppState>>,
  ClientIp(ip): ClientIp,
) -> Json<GeoView> {
  let country = match ip {
    Some(ip) => app.geo.country_for(ip).await,
    None => app.geo.get_user_country().await,
  };
  Json(GeoView { country })
}

/// Forgets the cached country so the next request resolves it afresh.
pub async fn forget_geo(
  State(app): State<Arc<AppState>>,
  ClientIp(ip): ClientIp,
) -> Json<Status> {
  app.geo.clear_country_cache();
  if let Some(ip) = ip {
    app.geo.forget(ip);
  }
  super::ok()
}

pub async fn list(
  State(app): State<Arc<AppState>>,
  ClientIp(ip): ClientIp,
  Query(query): Query<DealsQuery>,
) -> impl IntoResponse {
  let country = app.visitor_country(ip).await;
  let catalogue = sv::Deal::new(&app.db);
  let deals = if query.available {
    catalogue.available_in(country.as_deref()).await
  } else {
    catalogue.active().await
  };
  let deals = or_empty(deals, "deals");

  let mut headers = HeaderMap::new();
  if let Some(code) = query.referral {
    match sv::Referral::new(&app.db).sub_affiliate_by_code(&code).await {
      Ok(Some(affiliate)) => {
        if let Some(cookie) = referral_cookie(&affiliate.referral_code) {
          headers.insert(header::SET_COOKIE, cookie);
        }
      }
      Ok(None) => debug!("Unknown referral code {code}"),
      Err(err) => warn!("Failed to check referral code {code}: {err}"),
    }
  }

  let deals = deals
    .into_iter()
    .map(|deal| DealView::new(deal, country.as_deref()))
    .collect();

  (headers, Json(DealsPage { country, deals }))
}

pub async fn by_slug(
  State(app): State<Arc<AppState>>,
  ClientIp(ip): ClientIp,
  Path(slug): Path<String>,
) -> Result<Json<DealView>> {
  let deal = sv::Deal::new(&app.db)
    .by_slug(&slug)
    .await?
    .ok_or(Error::DealNotFound)?;
  let country = app.visitor_country(ip).await;

  Ok(Json(DealView::new(deal, country.as_deref())))
}

#[derive(Debug, Deserialize)]
pub struct ClaimReq {
  pub username: String,
}

#[derive(Debug, Serialize)]
pub struct Claimed {
  pub claim_url: String,
  pub player_deal: player_deal::Model,
}

pub async fn claim(
  State(app): State<Arc<AppState>>,
  Auth(session): Auth,
  ClientIp(ip): ClientIp,
  Path(slug): Path<String>,
  Payload(req): Payload<ClaimReq>,
) -> Result<Json<Claimed>> {
  let deal = sv::Deal::new(&app.db)
    .by_slug(&slug)
    .await?
    .ok_or(Error::DealNotFound)?;

  let country = app.visitor_country(ip).await;
  if !deal.is_available_in(country.as_deref()) {
    return Err(Error::NotEligible);
  }

  let player_deal = sv::PlayerDeal::new(&app.db)
    .join(&session.profile_id, deal.id, &req.username)
    .await?;
  info!("{} claimed deal {}", session.profile_id, deal.slug);

  Ok(Json(Claimed { claim_url: deal.claim_url, player_deal }))
}
