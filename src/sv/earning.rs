use serde::{Deserialize, Serialize};

use crate::{
  entity::{PaymentStatus, player_deal, player_earning},
  prelude::*,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewEarning {
  pub player_deal_id: i32,
  pub month: i32,
  pub year: i32,
  pub gross_rake: i64,
  pub net_rake: i64,
  pub rakeback: i64,
  #[serde(default)]
  pub payment_status: PaymentStatus,
}

/// Sums over a player's earnings, in cents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EarningTotals {
  pub gross_rake: i64,
  pub net_rake: i64,
  pub rakeback: i64,
  pub paid: i64,
  pub pending: i64,
}

impl EarningTotals {
  pub fn from_rows(rows: &[player_earning::Model]) -> Self {
    rows.iter().fold(Self::default(), |mut totals, row| {
      totals.gross_rake += row.gross_rake;
      totals.net_rake += row.net_rake;
      totals.rakeback += row.rakeback;
      match row.payment_status {
        PaymentStatus::Paid => totals.paid += row.rakeback,
        PaymentStatus::Pending => totals.pending += row.rakeback,
      }
      totals
    })
  }
}

pub struct Earning<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Earning<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Earnings across all of a player's deals, newest period first.
  pub async fn by_profile(
    &self,
    profile_id: &str,
  ) -> Result<Vec<player_earning::Model>> {
    Ok(
      player_earning::Entity::find()
        .inner_join(player_deal::Entity)
        .filter(player_deal::Column::ProfileId.eq(profile_id))
        .order_by_desc(player_earning::Column::Year)
        .order_by_desc(player_earning::Column::Month)
        .all(self.db)
        .await?,
    )
  }

  pub async fn totals(&self, profile_id: &str) -> Result<EarningTotals> {
    let rows = self.by_profile(profile_id).await?;
    Ok(EarningTotals::from_rows(&rows))
  }

  pub async fn record(&self, new: NewEarning) -> Result<player_earning::Model> {
    if !(1..=12).contains(&new.month) {
      return Err(Error::InvalidArgs("Month must be 1-12".into()));
    }
    if !(2000..=2100).contains(&new.year) {
      return Err(Error::InvalidArgs("Year out of range".into()));
    }
    if new.gross_rake < 0 || new.net_rake < 0 || new.rakeback < 0 {
      return Err(Error::InvalidArgs("Amounts must not be negative".into()));
    }

    player_deal::Entity::find_by_id(new.player_deal_id)
      .one(self.db)
      .await?
      .ok_or(Error::PlayerDealNotFound)?;

    Ok(
      player_earning::ActiveModel {
        player_deal_id: Set(new.player_deal_id),
        month: Set(new.month),
        year: Set(new.year),
        gross_rake: Set(new.gross_rake),
        net_rake: Set(new.net_rake),
        rakeback: Set(new.rakeback),
        payment_status: Set(new.payment_status),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
      }
      .insert(self.db)
      .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::{self, test_utils::test_db};

  fn earning(player_deal_id: i32, month: i32, net: i64) -> NewEarning {
    NewEarning {
      player_deal_id,
      month,
      year: 2025,
      gross_rake: net + 1_000,
      net_rake: net,
      rakeback: net / 2,
      payment_status: PaymentStatus::Pending,
    }
  }

  #[tokio::test]
  async fn test_by_profile_is_scoped_and_ordered() {
    let db = test_db::setup().await;
    let me = test_db::player(&db, "me@example.com").await;
    let other = test_db::player(&db, "other@example.com").await;
    let deal = test_db::deal(&db, "ggpoker", &[]).await;
    let players = sv::PlayerDeal::new(&db);
    let mine = players.join(&me.id, deal.id, "me").await.unwrap();
    let theirs = players.join(&other.id, deal.id, "them").await.unwrap();

    let sv = Earning::new(&db);
    sv.record(earning(mine.id, 1, 2_000)).await.unwrap();
    sv.record(earning(mine.id, 3, 4_000)).await.unwrap();
    sv.record(NewEarning {
      payment_status: PaymentStatus::Paid,
      ..earning(mine.id, 2, 6_000)
    })
    .await
    .unwrap();
    sv.record(earning(theirs.id, 1, 50_000)).await.unwrap();

    let rows = sv.by_profile(&me.id).await.unwrap();
    let months: Vec<i32> = rows.iter().map(|r| r.month).collect();
    assert_eq!(months, vec![3, 2, 1]);

    let totals = sv.totals(&me.id).await.unwrap();
    assert_eq!(totals.net_rake, 12_000);
    assert_eq!(totals.gross_rake, 15_000);
    assert_eq!(totals.rakeback, 6_000);
    assert_eq!(totals.paid, 3_000);
    assert_eq!(totals.pending, 3_000);
  }

  #[tokio::test]
  async fn test_record_validation() {
    let db = test_db::setup().await;
    let sv = Earning::new(&db);

    assert!(matches!(
      sv.record(earning(1, 13, 100)).await,
      Err(Error::InvalidArgs(_))
    ));
    assert!(matches!(
      sv.record(earning(1, 1, -5)).await,
      Err(Error::InvalidArgs(_))
    ));
    assert!(matches!(
      sv.record(earning(42, 1, 100)).await,
      Err(Error::PlayerDealNotFound)
    ));
  }

  #[tokio::test]
  async fn test_totals_empty() {
    let db = test_db::setup().await;
    let me = test_db::player(&db, "me@example.com").await;

    let totals = Earning::new(&db).totals(&me.id).await.unwrap();

    assert_eq!(totals, EarningTotals::default());
  }
}
