use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(SubAffiliates::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(SubAffiliates::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(
            ColumnDef::new(SubAffiliates::ProfileId)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(SubAffiliates::ReferralCode)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(SubAffiliates::CommissionRate)
              .integer()
              .not_null()
              .default(20),
          )
          .col(ColumnDef::new(SubAffiliates::CreatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_sub_affiliates_profile")
              .from(SubAffiliates::Table, SubAffiliates::ProfileId)
              .to(Profiles::Table, Profiles::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(SubAffiliates::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum SubAffiliates {
  Table,
  Id,
  ProfileId,
  ReferralCode,
  CommissionRate,
  CreatedAt,
}
