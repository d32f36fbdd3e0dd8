use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{player_deal, profile, sub_affiliate};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "active")]
  Active,
  #[sea_orm(string_value = "inactive")]
  Inactive,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referrals")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub sub_affiliate_id: i32,
  #[sea_orm(unique)]
  pub referred_profile_id: String,
  pub player_deal_id: Option<i32>,
  pub status: ReferralStatus,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "sub_affiliate::Entity",
    from = "Column::SubAffiliateId",
    to = "sub_affiliate::Column::Id"
  )]
  SubAffiliate,
  #[sea_orm(
    belongs_to = "profile::Entity",
    from = "Column::ReferredProfileId",
    to = "profile::Column::Id"
  )]
  Referred,
  #[sea_orm(
    belongs_to = "player_deal::Entity",
    from = "Column::PlayerDealId",
    to = "player_deal::Column::Id"
  )]
  PlayerDeal,
}

impl Related<sub_affiliate::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::SubAffiliate.def()
  }
}

impl Related<profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referred.def()
  }
}

impl Related<player_deal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PlayerDeal.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
