//! Shared test utilities for database setup

#[cfg(test)]
pub mod test_db {
  use migration::{Migrator, MigratorTrait};
  use sea_orm::{Database, DatabaseConnection};

  use crate::{
    entity::{Role, deal, profile},
    sv::{self, deal::NewDeal, profile::Registration},
  };

  pub const SECRET: &str = "test-secret";

  /// Creates an in-memory SQLite database with the full schema
  pub async fn setup() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
  }

  pub fn registration(email: &str) -> Registration {
    Registration {
      email: email.into(),
      confirm_email: email.into(),
      password: "hunter2hunter2".into(),
      full_name: "Test Player".into(),
      ..Default::default()
    }
  }

  pub async fn player(db: &DatabaseConnection, email: &str) -> profile::Model {
    sv::Profile::new(db)
      .register(registration(email), Role::Player, SECRET)
      .await
      .unwrap()
  }

  pub async fn deal(
    db: &DatabaseConnection,
    slug: &str,
    countries: &[&str],
  ) -> deal::Model {
    let countries = (!countries.is_empty())
      .then(|| countries.iter().map(|code| code.to_string()).collect());

    sv::Deal::new(db)
      .create(NewDeal {
        name: slug.to_uppercase(),
        slug: slug.into(),
        available_countries: countries,
        claim_url: format!("https://{slug}.example/claim"),
        ..Default::default()
      })
      .await
      .unwrap()
  }
}
