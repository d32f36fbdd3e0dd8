use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::{profile, referral};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sub_affiliates")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  #[sea_orm(unique)]
  pub profile_id: String,
  #[sea_orm(unique)]
  pub referral_code: String,
  /// Percent of referred players' net rake.
  pub commission_rate: i32,
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
  #[sea_orm(has_many = "referral::Entity")]
  Referrals,
}

impl Related<profile::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Profile.def()
  }
}

impl Related<referral::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Referrals.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
