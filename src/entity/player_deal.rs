use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{deal, player_earning, profile};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PlayerDealStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "active")]
  Active,
  #[sea_orm(string_value = "rejected")]
  Rejected,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player_deals")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub profile_id: String,
  pub deal_id: i32,
  /// Account name at the poker room.
  pub username: String,
  pub status: PlayerDealStatus,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "profile::Entity",
    from = "Column::ProfileId",
    to = "profile::Column::Id"
  )]
  Profile,
  #[sea_orm(
    belongs_to = "deal::Entity",
    from = "Column::DealId",
    to = "deal::Column::Id"
  )]
  Deal,
  #[sea_orm(has_many = "player_earning::Entity")]
  Earnings,
}

impl Related<profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Profile.def()
  }
}

impl Related<deal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Deal.def()
  }
}

impl Related<player_earning::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Earnings.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
