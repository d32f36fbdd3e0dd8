use sea_orm_migration::prelude::*;

use super::m20250601_000005_create_player_deals::PlayerDeals;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PlayerEarnings::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PlayerEarnings::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(PlayerEarnings::PlayerDealId).integer().not_null(),
          )
          .col(ColumnDef::new(PlayerEarnings::Month).integer().not_null())
          .col(ColumnDef::new(PlayerEarnings::Year).integer().not_null())
          .col(
            ColumnDef::new(PlayerEarnings::GrossRake)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(PlayerEarnings::NetRake)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(PlayerEarnings::Rakeback)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(PlayerEarnings::PaymentStatus)
              .string()
              .not_null()
              .default("pending"),
          )
          .col(
            ColumnDef::new(PlayerEarnings::CreatedAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_player_earnings_player_deal")
              .from(PlayerEarnings::Table, PlayerEarnings::PlayerDealId)
              .to(PlayerDeals::Table, PlayerDeals::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_player_earnings_period")
          .table(PlayerEarnings::Table)
          .col(PlayerEarnings::PlayerDealId)
          .col(PlayerEarnings::Year)
          .col(PlayerEarnings::Month)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PlayerEarnings::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PlayerEarnings {
  Table,
  Id,
  PlayerDealId,
  Month,
  Year,
  GrossRake,
  NetRake,
  Rakeback,
  PaymentStatus,
  CreatedAt,
}
