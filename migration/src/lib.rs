pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_profiles;
mod m20250601_000002_create_deals;
mod m20250601_000003_create_news;
mod m20250601_000004_create_sub_affiliates;
mod m20250601_000005_create_player_deals;
mod m20250601_000006_create_referrals;
mod m20250601_000007_create_player_earnings;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20250601_000001_create_profiles::Migration),
      Box::new(m20250601_000002_create_deals::Migration),
      Box::new(m20250601_000003_create_news::Migration),
      Box::new(m20250601_000004_create_sub_affiliates::Migration),
      Box::new(m20250601_000005_create_player_deals::Migration),
      Box::new(m20250601_000006_create_referrals::Migration),
      Box::new(m20250601_000007_create_player_earnings::Migration),
    ]
  }
}
