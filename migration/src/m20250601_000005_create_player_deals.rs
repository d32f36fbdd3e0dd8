use sea_orm_migration::prelude::*;

use super::{
  m20250601_000001_create_profiles::Profiles,
  m20250601_000002_create_deals::Deals,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PlayerDeals::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PlayerDeals::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(PlayerDeals::ProfileId).string().not_null())
          .col(ColumnDef::new(PlayerDeals::DealId).integer().not_null())
          .col(ColumnDef::new(PlayerDeals::Username).string().not_null())
          .col(
            ColumnDef::new(PlayerDeals::Status)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(ColumnDef::new(PlayerDeals::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_player_deals_profile")
              .from(PlayerDeals::Table, PlayerDeals::ProfileId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_player_deals_deal")
              .from(PlayerDeals::Table, PlayerDeals::DealId)
              .to(Deals::Table, Deals::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_player_deals_profile_deal")
          .table(PlayerDeals::Table)
          .col(PlayerDeals::ProfileId)
          .col(PlayerDeals::DealId)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PlayerDeals::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PlayerDeals {
  Table,
  Id,
  ProfileId,
  DealId,
  Username,
  Status,
  CreatedAt,
}
