use axum::{Json, extract::State};
use serde::Serialize;

use super::or_empty;
use crate::{
  entity::{deal, player_deal, player_earning, profile, referral, sub_affiliate},
  plugins::server::extract::Auth,
  prelude::*,
  state::AppState,
  sv::{self, earning::EarningTotals, referral::ReferralSummary},
  utils,
};

#[derive(Debug, Serialize)]
pub struct JoinedDeal {
  #[serde(flatten)]
  pub joined: player_deal::Model,
  pub deal: Option<deal::Model>,
}

#[derive(Debug, Serialize)]
pub struct EarningRow {
  #[serde(flatten)]
  pub row: player_earning::Model,
  pub period: String,
}

/// What a sub-affiliate gets to see about the players they referred.
#[derive(Debug, Serialize)]
pub struct Referred {
  pub full_name: String,
  pub country: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReferralRow {
  #[serde(flatten)]
  pub referral: referral::Model,
  pub referred: Option<Referred>,
}

#[derive(Debug, Serialize)]
pub struct AffiliateView {
  pub sub_affiliate: sub_affiliate::Model,
  pub referrals: Vec<ReferralRow>,
  pub summary: ReferralSummary,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
  pub profile: profile::Model,
  pub deals: Vec<JoinedDeal>,
  pub earnings: Vec<EarningRow>,
  pub totals: EarningTotals,
  pub affiliate: Option<AffiliateView>,
}

async fn affiliate_view(
  app: &AppState,
  profile_id: &str,
) -> Result<Option<AffiliateView>> {
  let referrals = sv::Referral::new(&app.db);
  let Some(sub_affiliate) = referrals.sub_affiliate_of(profile_id).await?
  else {
    return Ok(None);
  };

  let (rows, summary) = futures::join!(
    referrals.by_sub_affiliate(sub_affiliate.id),
    referrals.summary(&sub_affiliate)
  );

  let referrals = or_empty(rows, "referrals")
    .into_iter()
    .map(|(referral, referred)| ReferralRow {
      referral,
      referred: referred.map(|p| Referred {
        full_name: p.full_name,
        country: p.country,
      }),
    })
    .collect();

  Ok(Some(AffiliateView {
    sub_affiliate,
    referrals,
    summary: or_empty(summary, "referral summary"),
  }))
}

pub async fn dashboard(
  State(app): State<Arc<AppState>>,
  Auth(session): Auth,
) -> Result<Json<Dashboard>> {
  let profile = sv::Profile::new(&app.db)
    .by_id(&session.profile_id)
    .await?
    .ok_or(Error::ProfileNotFound)?;

  let players = sv::PlayerDeal::new(&app.db);
  let earnings = sv::Earning::new(&app.db);
  let (deals, rows, totals, affiliate) = futures::join!(
    players.by_profile(&profile.id),
    earnings.by_profile(&profile.id),
    earnings.totals(&profile.id),
    affiliate_view(&app, &profile.id)
  );

  let rows = or_empty(rows, "earnings");
  let totals = or_empty(totals, "earning totals");

  let deals = or_empty(deals, "player deals")
    .into_iter()
    .map(|(joined, deal)| JoinedDeal { joined, deal })
    .collect();

  let earnings = rows
    .into_iter()
    .map(|row| {
      let period = utils::format_period(row.month, row.year);
      EarningRow { row, period }
    })
    .collect();

  Ok(Json(Dashboard {
    profile,
    deals,
    earnings,
    totals,
    affiliate: or_empty(affiliate, "affiliate"),
  }))
}
