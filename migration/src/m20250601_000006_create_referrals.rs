use sea_orm_migration::prelude::*;

use super::{
  m20250601_000001_create_profiles::Profiles,
  m20250601_000004_create_sub_affiliates::SubAffiliates,
  m20250601_000005_create_player_deals::PlayerDeals,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Referrals::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Referrals::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(Referrals::SubAffiliateId).integer().not_null(),
          )
          .col(
            ColumnDef::new(Referrals::ReferredProfileId)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(ColumnDef::new(Referrals::PlayerDealId).integer().null())
          .col(
            ColumnDef::new(Referrals::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(Referrals::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_referrals_sub_affiliate")
              .from(Referrals::Table, Referrals::SubAffiliateId)
              .to(SubAffiliates::Table, SubAffiliates::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_referrals_profile")
              .from(Referrals::Table, Referrals::ReferredProfileId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_referrals_player_deal")
              .from(Referrals::Table, Referrals::PlayerDealId)
              .to(PlayerDeals::Table, PlayerDeals::Id)
              .on_delete(ForeignKeyAction::SetNull),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_referrals_sub_affiliate")
          .table(Referrals::Table)
          .col(Referrals::SubAffiliateId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(Referrals::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum Referrals {
  Table,
  Id,
  SubAffiliateId,
  ReferredProfileId,
  PlayerDealId,
  Status,
  CreatedAt,
}
