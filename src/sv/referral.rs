use sea_orm::sea_query::Expr;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  entity::{
    ReferralStatus, player_earning, profile, referral, sub_affiliate,
  },
  prelude::*,
};

pub const CODE_LEN: usize = 8;
pub const DEFAULT_COMMISSION_RATE: i32 = 20;

pub fn normalize_code(code: &str) -> String {
  code.trim().to_ascii_uppercase()
}

fn generate_code() -> String {
  Uuid::new_v4().simple().to_string()[..CODE_LEN].to_ascii_uppercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferralSummary {
  pub total: u64,
  pub pending: u64,
  pub active: u64,
  pub inactive: u64,
  /// Net rake generated by referred players, in cents.
  pub net_rake: i64,
  /// Sub-affiliate share of `net_rake`, in cents.
  pub commission: i64,
}

pub struct Referral<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Referral<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Turn a profile into a sub-affiliate, or return the existing record.
  pub async fn become_sub_affiliate(
    &self,
    profile_id: &str,
  ) -> Result<sub_affiliate::Model> {
    if let Some(existing) = self.sub_affiliate_of(profile_id).await? {
      return Ok(existing);
    }

    let txn = self.db.begin().await?;

    let profile = profile::Entity::find_by_id(profile_id)
      .one(&txn)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    let mut code = generate_code();
    while sub_affiliate::Entity::find()
      .filter(sub_affiliate::Column::ReferralCode.eq(code.as_str()))
      .one(&txn)
      .await?
      .is_some()
    {
      code = generate_code();
    }

    let now = Utc::now().naive_utc();
    let affiliate = sub_affiliate::ActiveModel {
      profile_id: Set(profile.id.clone()),
      referral_code: Set(code),
      commission_rate: Set(DEFAULT_COMMISSION_RATE),
      created_at: Set(now),
      ..Default::default()
    }
    .insert(&txn)
    .await?;

    profile::ActiveModel {
      is_sub_affiliate: Set(true),
      updated_at: Set(now),
      ..profile.into()
    }
    .update(&txn)
    .await?;

    txn.commit().await?;
    info!("{} became sub-affiliate {}", profile_id, affiliate.referral_code);
    Ok(affiliate)
  }

  pub async fn sub_affiliate_by_code(
    &self,
    code: &str,
  ) -> Result<Option<sub_affiliate::Model>> {
    Ok(
      sub_affiliate::Entity::find()
        .filter(sub_affiliate::Column::ReferralCode.eq(normalize_code(code)))
        .one(self.db)
        .await?,
    )
  }

  pub async fn sub_affiliate_of(
    &self,
    profile_id: &str,
  ) -> Result<Option<sub_affiliate::Model>> {
    Ok(
      sub_affiliate::Entity::find()
        .filter(sub_affiliate::Column::ProfileId.eq(profile_id))
        .one(self.db)
        .await?,
    )
  }

  pub async fn set_commission_rate(
    &self,
    sub_affiliate_id: i32,
    rate: i32,
  ) -> Result<sub_affiliate::Model> {
    if !(0..=100).contains(&rate) {
      return Err(Error::InvalidArgs("Commission must be 0-100".into()));
    }

    let affiliate = sub_affiliate::Entity::find_by_id(sub_affiliate_id)
      .one(self.db)
      .await?
      .ok_or(Error::ReferralNotFound)?;

    Ok(
      sub_affiliate::ActiveModel {
        commission_rate: Set(rate),
        ..affiliate.into()
      }
      .update(self.db)
      .await?,
    )
  }

  /// Attribute a fresh sign-up to the owner of `code`.
  pub async fn record_signup(
    &self,
    code: &str,
    referred_profile_id: &str,
  ) -> Result<referral::Model> {
    let affiliate = self
      .sub_affiliate_by_code(code)
      .await?
      .ok_or(Error::ReferralNotFound)?;

    if affiliate.profile_id == referred_profile_id {
      return Err(Error::InvalidArgs("Cannot refer yourself".into()));
    }

    let existing = referral::Entity::find()
      .filter(referral::Column::ReferredProfileId.eq(referred_profile_id))
      .one(self.db)
      .await?;
    if existing.is_some() {
      return Err(Error::InvalidArgs("Profile already has a referrer".into()));
    }

    Ok(
      referral::ActiveModel {
        sub_affiliate_id: Set(affiliate.id),
        referred_profile_id: Set(referred_profile_id.to_string()),
        player_deal_id: Set(None),
        status: Set(ReferralStatus::Pending),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
      }
      .insert(self.db)
      .await?,
    )
  }

  /// Link the first deal a referred player joins and activate the referral.
  /// Returns `None` when the player was not referred or is already linked.
  pub async fn link_player_deal<C: ConnectionTrait>(
    conn: &C,
    referred_profile_id: &str,
    player_deal_id: i32,
  ) -> Result<Option<referral::Model>> {
    let Some(referral) = referral::Entity::find()
      .filter(referral::Column::ReferredProfileId.eq(referred_profile_id))
      .filter(referral::Column::PlayerDealId.is_null())
      .one(conn)
      .await?
    else {
      return Ok(None);
    };

    let updated = referral::ActiveModel {
      player_deal_id: Set(Some(player_deal_id)),
      status: Set(ReferralStatus::Active),
      ..referral.into()
    }
    .update(conn)
    .await?;

    Ok(Some(updated))
  }

  pub async fn set_status(
    &self,
    id: i32,
    status: ReferralStatus,
  ) -> Result<referral::Model> {
    let referral = referral::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::ReferralNotFound)?;

    Ok(
      referral::ActiveModel { status: Set(status), ..referral.into() }
        .update(self.db)
        .await?,
    )
  }

  pub async fn by_sub_affiliate(
    &self,
    sub_affiliate_id: i32,
  ) -> Result<Vec<(referral::Model, Option<profile::Model>)>> {
    Ok(
      referral::Entity::find()
        .filter(referral::Column::SubAffiliateId.eq(sub_affiliate_id))
        .order_by_desc(referral::Column::CreatedAt)
        .find_also_related(profile::Entity)
        .all(self.db)
        .await?,
    )
  }

  pub async fn summary(
    &self,
    affiliate: &sub_affiliate::Model,
  ) -> Result<ReferralSummary> {
    let referrals = referral::Entity::find()
      .filter(referral::Column::SubAffiliateId.eq(affiliate.id))
      .all(self.db)
      .await?;

    let mut summary = ReferralSummary {
      total: referrals.len() as u64,
      ..Default::default()
    };
    for referral in &referrals {
      match referral.status {
        ReferralStatus::Pending => summary.pending += 1,
        ReferralStatus::Active => summary.active += 1,
        ReferralStatus::Inactive => summary.inactive += 1,
      }
    }

    let deal_ids: Vec<i32> =
      referrals.iter().filter_map(|r| r.player_deal_id).collect();
    if deal_ids.is_empty() {
      return Ok(summary);
    }

    let net_rake: Option<Option<i64>> = player_earning::Entity::find()
      .select_only()
      .column_as(Expr::col(player_earning::Column::NetRake).sum(), "net_rake")
      .filter(player_earning::Column::PlayerDealId.is_in(deal_ids))
      .into_tuple()
      .one(self.db)
      .await?;

    summary.net_rake = net_rake.flatten().unwrap_or(0);
    summary.commission =
      summary.net_rake * affiliate.commission_rate as i64 / 100;
    Ok(summary)
  }
}
