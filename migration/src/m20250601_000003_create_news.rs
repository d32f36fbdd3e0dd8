use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(News::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(News::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(News::Slug).string().not_null().unique_key())
          .col(ColumnDef::new(News::Title).string().not_null())
          .col(ColumnDef::new(News::Excerpt).string().null())
          .col(ColumnDef::new(News::Body).text().not_null())
          .col(ColumnDef::new(News::CoverUrl).string().null())
          .col(ColumnDef::new(News::Category).string().null())
          .col(
            ColumnDef::new(News::IsPublished)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(News::PublishedAt).date_time().null())
          .col(ColumnDef::new(News::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_news_published_at")
          .table(News::Table)
          .col(News::PublishedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(News::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum News {
  Table,
  Id,
  Slug,
  Title,
  Excerpt,
  Body,
  CoverUrl,
  Category,
  IsPublished,
  PublishedAt,
  CreatedAt,
}
