use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{player_deal, sub_affiliate};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
  #[sea_orm(string_value = "player")]
  #[default]
  Player,
  #[sea_orm(string_value = "admin")]
  Admin,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  #[sea_orm(unique)]
  pub email: String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  #[serde(skip_serializing)]
  pub password_salt: String,
  pub full_name: String,
  pub country: Option<String>,
  pub discord: Option<String>,
  pub whatsapp: Option<String>,
  pub telegram: Option<String>,
  pub role: Role,
  pub is_sub_affiliate: bool,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "player_deal::Entity")]
  PlayerDeals,
  #[sea_orm(has_one = "sub_affiliate::Entity")]
  SubAffiliate,
}

impl Related<player_deal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PlayerDeals.def()
  }
}

impl Related<sub_affiliate::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::SubAffiliate.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
