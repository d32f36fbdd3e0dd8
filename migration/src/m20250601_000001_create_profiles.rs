use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Profiles::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Profiles::Id).string().not_null().primary_key(),
          )
          .col(ColumnDef::new(Profiles::Email).string().not_null().unique_key())
          .col(ColumnDef::new(Profiles::PasswordHash).string().not_null())
          .col(ColumnDef::new(Profiles::PasswordSalt).string().not_null())
          .col(ColumnDef::new(Profiles::FullName).string().not_null())
          .col(ColumnDef::new(Profiles::Country).string().null())
          .col(ColumnDef::new(Profiles::Discord).string().null())
          .col(ColumnDef::new(Profiles::Whatsapp).string().null())
          .col(ColumnDef::new(Profiles::Telegram).string().null())
          .col(
            ColumnDef::new(Profiles::Role)
              .string()
              .not_null()
              .default("player"),
          )
          .col(
            ColumnDef::new(Profiles::IsSubAffiliate)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(Profiles::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Profiles::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Profiles::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Profiles {
  Table,
  Id,
  Email,
  PasswordHash,
  PasswordSalt,
  FullName,
  Country,
  Discord,
  Whatsapp,
  Telegram,
  Role,
  IsSubAffiliate,
  CreatedAt,
  UpdatedAt,
}
