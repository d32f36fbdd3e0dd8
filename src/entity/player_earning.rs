use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::player_deal;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[derive(EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  #[sea_orm(string_value = "pending")]
  #[default]
  Pending,
  #[sea_orm(string_value = "paid")]
  Paid,
}

/// Monthly rake report for one player deal. Amounts are in cents.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player_earnings")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub player_deal_id: i32,
  pub month: i32,
  pub year: i32,
  pub gross_rake: i64,
  pub net_rake: i64,
  pub rakeback: i64,
  pub payment_status: PaymentStatus,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "player_deal::Entity",
    from = "Column::PlayerDealId",
    to = "player_deal::Column::Id"
  )]
  PlayerDeal,
}

impl Related<player_deal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PlayerDeal.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
