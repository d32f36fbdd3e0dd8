use crate::{
  entity::{PlayerDealStatus, deal, player_deal},
  prelude::*,
  sv::Referral,
};

pub struct PlayerDeal<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> PlayerDeal<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Record that a player signed up to a deal under `username`.
  /// A pending referral of the player gets linked to this row.
  pub async fn join(
    &self,
    profile_id: &str,
    deal_id: i32,
    username: &str,
  ) -> Result<player_deal::Model> {
    let username = username.trim();
    if username.is_empty() {
      return Err(Error::InvalidArgs("Room username is required".into()));
    }

    let txn = self.db.begin().await?;

    deal::Entity::find_by_id(deal_id)
      .filter(deal::Column::IsActive.eq(true))
      .one(&txn)
      .await?
      .ok_or(Error::DealNotFound)?;

    let existing = player_deal::Entity::find()
      .filter(player_deal::Column::ProfileId.eq(profile_id))
      .filter(player_deal::Column::DealId.eq(deal_id))
      .one(&txn)
      .await?;
    if existing.is_some() {
      return Err(Error::AlreadyJoined);
    }

    let joined = player_deal::ActiveModel {
      profile_id: Set(profile_id.to_string()),
      deal_id: Set(deal_id),
      username: Set(username.to_string()),
      status: Set(PlayerDealStatus::Pending),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    }
    .insert(&txn)
    .await?;

    if let Some(referral) =
      Referral::link_player_deal(&txn, profile_id, joined.id).await?
    {
      debug!("Referral {} activated by deal {}", referral.id, joined.id);
    }

    txn.commit().await?;
    Ok(joined)
  }

  pub async fn by_profile(
    &self,
    profile_id: &str,
  ) -> Result<Vec<(player_deal::Model, Option<deal::Model>)>> {
    Ok(
      player_deal::Entity::find()
        .filter(player_deal::Column::ProfileId.eq(profile_id))
        .order_by_desc(player_deal::Column::CreatedAt)
        .find_also_related(deal::Entity)
        .all(self.db)
        .await?,
    )
  }

  pub async fn set_status(
    &self,
    id: i32,
    status: PlayerDealStatus,
  ) -> Result<player_deal::Model> {
    let joined = player_deal::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::PlayerDealNotFound)?;

    Ok(
      player_deal::ActiveModel { status: Set(status), ..joined.into() }
        .update(self.db)
        .await?,
    )
  }
}
