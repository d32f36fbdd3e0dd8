use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::player_deal;
use crate::sv::deal::is_deal_available;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "deals")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
  #[sea_orm(unique)]
  pub slug: String,
  pub tagline: Option<String>,
  #[sea_orm(column_type = "Text", nullable)]
  pub description: Option<String>,
  pub rakeback: Option<String>,
  pub bonus: Option<String>,
  pub primary_color: Option<String>,
  pub secondary_color: Option<String>,
  pub logo_url: Option<String>,
  /// JSON array of two-letter country codes. `null` or `[]` means global.
  #[sea_orm(column_type = "Json", nullable)]
  pub available_countries: Option<Json>,
  pub claim_url: String,
  pub learn_more_url: Option<String>,
  pub is_active: bool,
  pub sort_order: i32,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

impl Model {
  /// Allow-list as stored. A malformed column reads as no restriction.
  pub fn countries(&self) -> Vec<String> {
    self
      .available_countries
      .as_ref()
      .and_then(|value| json::from_value(value.clone()).ok())
      .unwrap_or_default()
  }

  pub fn is_available_in(&self, country: Option<&str>) -> bool {
    let countries = self.countries();
    is_deal_available(Some(countries.as_slice()), country)
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "player_deal::Entity")]
  PlayerDeals,
}

impl Related<player_deal::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PlayerDeals.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
