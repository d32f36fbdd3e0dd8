use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Deals::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Deals::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Deals::Name).string().not_null())
          .col(ColumnDef::new(Deals::Slug).string().not_null().unique_key())
          .col(ColumnDef::new(Deals::Tagline).string().null())
          .col(ColumnDef::new(Deals::Description).text().null())
          .col(ColumnDef::new(Deals::Rakeback).string().null())
          .col(ColumnDef::new(Deals::Bonus).string().null())
          .col(ColumnDef::new(Deals::PrimaryColor).string().null())
          .col(ColumnDef::new(Deals::SecondaryColor).string().null())
          .col(ColumnDef::new(Deals::LogoUrl).string().null())
          .col(ColumnDef::new(Deals::AvailableCountries).json().null())
          .col(ColumnDef::new(Deals::ClaimUrl).string().not_null())
          .col(ColumnDef::new(Deals::LearnMoreUrl).string().null())
          .col(
            ColumnDef::new(Deals::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(
            ColumnDef::new(Deals::SortOrder)
              .integer()
              .not_null()
              .default(0),
          )
          .col(ColumnDef::new(Deals::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Deals::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Deals::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Deals {
  Table,
  Id,
  Name,
  Slug,
  Tagline,
  Description,
  Rakeback,
  Bonus,
  PrimaryColor,
  SecondaryColor,
  LogoUrl,
  AvailableCountries,
  ClaimUrl,
  LearnMoreUrl,
  IsActive,
  SortOrder,
  CreatedAt,
  UpdatedAt,
}
