use serde::{Deserialize, Deserializer};

use crate::{entity::deal, prelude::*, sv::geo::normalize_country};

/// Whether a deal with the given allow-list can be claimed from `country`.
///
/// An absent or empty list means the deal is global. An unknown country
/// (resolution still in flight) is treated optimistically.
pub fn is_deal_available(
  available_countries: Option<&[String]>,
  user_country: Option<&str>,
) -> bool {
  let Some(countries) = available_countries.filter(|list| !list.is_empty())
  else {
    return true;
  };

  let Some(country) = user_country else {
    return true;
  };

  let country = country.trim();
  countries.iter().any(|code| code.trim().eq_ignore_ascii_case(country))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDeal {
  pub name: String,
  pub slug: String,
  pub tagline: Option<String>,
  pub description: Option<String>,
  pub rakeback: Option<String>,
  pub bonus: Option<String>,
  pub primary_color: Option<String>,
  pub secondary_color: Option<String>,
  pub logo_url: Option<String>,
  pub available_countries: Option<Vec<String>>,
  pub claim_url: String,
  pub learn_more_url: Option<String>,
  pub sort_order: Option<i32>,
}

/// Absent field stays `None`, an explicit `null` becomes `Some(None)`.
fn nullable<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

/// Partial update. `None` leaves the column untouched, `Some(None)` on a
/// nullable column clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealPatch {
  pub name: Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub tagline: Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub description: Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub rakeback: Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub bonus: Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub primary_color: Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub secondary_color: Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub logo_url: Option<Option<String>>,
  pub available_countries: Option<Vec<String>>,
  pub claim_url: Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub learn_more_url: Option<Option<String>>,
  pub is_active: Option<bool>,
  pub sort_order: Option<i32>,
}

fn required_name(name: &str) -> Result<String> {
  let name = name.trim();
  if name.is_empty() {
    return Err(Error::InvalidArgs("Deal name is required".into()));
  }
  Ok(name.to_string())
}

fn slug_taken(err: Error) -> Error {
  match err {
    Error::Duplicate => Error::SlugTaken,
    err => err,
  }
}

fn countries_json(countries: Vec<String>) -> Result<Option<json::Value>> {
  let codes = countries
    .iter()
    .map(|code| {
      normalize_country(code).ok_or_else(|| {
        Error::InvalidArgs(format!("Invalid country code: {code}"))
      })
    })
    .collect::<Result<Vec<_>>>()?;

  Ok(Some(json::Value::from(codes)))
}

fn check_url(url: &str) -> Result<()> {
  if url.starts_with("https://") || url.starts_with("http://") {
    Ok(())
  } else {
    Err(Error::InvalidArgs(format!("Invalid URL: {url}")))
  }
}

pub struct Deal<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Deal<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn active(&self) -> Result<Vec<deal::Model>> {
    Ok(
      deal::Entity::find()
        .filter(deal::Column::IsActive.eq(true))
        .order_by_asc(deal::Column::SortOrder)
        .order_by_asc(deal::Column::Name)
        .all(self.db)
        .await?,
    )
  }

  pub async fn all(&self) -> Result<Vec<deal::Model>> {
    Ok(
      deal::Entity::find()
        .order_by_asc(deal::Column::SortOrder)
        .order_by_asc(deal::Column::Name)
        .all(self.db)
        .await?,
    )
  }

  /// Active deals claimable from `country`.
  pub async fn available_in(
    &self,
    country: Option<&str>,
  ) -> Result<Vec<deal::Model>> {
    let deals = self.active().await?;
    Ok(
      deals.into_iter().filter(|deal| deal.is_available_in(country)).collect(),
    )
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<deal::Model>> {
    Ok(deal::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn by_slug(&self, slug: &str) -> Result<Option<deal::Model>> {
    Ok(
      deal::Entity::find()
        .filter(deal::Column::Slug.eq(slug))
        .filter(deal::Column::IsActive.eq(true))
        .one(self.db)
        .await?,
    )
  }

  pub async fn create(&self, new: NewDeal) -> Result<deal::Model> {
    let name = required_name(&new.name)?;
    let slug = new.slug.trim().to_lowercase();
    if slug.is_empty() {
      return Err(Error::InvalidArgs("Deal slug is required".into()));
    }
    check_url(&new.claim_url)?;
    if let Some(url) = &new.learn_more_url {
      check_url(url)?;
    }

    let available_countries = match new.available_countries {
      Some(countries) => countries_json(countries)?,
      None => None,
    };

    let taken = deal::Entity::find()
      .filter(deal::Column::Slug.eq(slug.as_str()))
      .one(self.db)
      .await?;
    if taken.is_some() {
      return Err(Error::SlugTaken);
    }

    let now = Utc::now().naive_utc();
    let deal = deal::ActiveModel {
      name: Set(name),
      slug: Set(slug),
      tagline: Set(new.tagline),
      description: Set(new.description),
      rakeback: Set(new.rakeback),
      bonus: Set(new.bonus),
      primary_color: Set(new.primary_color),
      secondary_color: Set(new.secondary_color),
      logo_url: Set(new.logo_url),
      available_countries: Set(available_countries),
      claim_url: Set(new.claim_url),
      learn_more_url: Set(new.learn_more_url),
      is_active: Set(true),
      sort_order: Set(new.sort_order.unwrap_or(0)),
      created_at: Set(now),
      updated_at: Set(now),
      ..Default::default()
    };

    deal.insert(self.db).await.map_err(|err| slug_taken(err.into()))
  }

  pub async fn update(&self, id: i32, patch: DealPatch) -> Result<deal::Model> {
    let deal = deal::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::DealNotFound)?;

    let mut model: deal::ActiveModel = deal.into();

    if let Some(name) = patch.name {
      model.name = Set(required_name(&name)?);
    }
    if let Some(tagline) = patch.tagline {
      model.tagline = Set(tagline);
    }
    if let Some(description) = patch.description {
      model.description = Set(description);
    }
    if let Some(rakeback) = patch.rakeback {
      model.rakeback = Set(rakeback);
    }
    if let Some(bonus) = patch.bonus {
      model.bonus = Set(bonus);
    }
    if let Some(color) = patch.primary_color {
      model.primary_color = Set(color);
    }
    if let Some(color) = patch.secondary_color {
      model.secondary_color = Set(color);
    }
    if let Some(url) = patch.logo_url {
      model.logo_url = Set(url);
    }
    if let Some(countries) = patch.available_countries {
      model.available_countries = Set(countries_json(countries)?);
    }
    if let Some(url) = patch.claim_url {
      check_url(&url)?;
      model.claim_url = Set(url);
    }
    if let Some(url) = patch.learn_more_url {
      if let Some(url) = &url {
        check_url(url)?;
      }
      model.learn_more_url = Set(url);
    }
    if let Some(active) = patch.is_active {
      model.is_active = Set(active);
    }
    if let Some(order) = patch.sort_order {
      model.sort_order = Set(order);
    }
    model.updated_at = Set(Utc::now().naive_utc());

    Ok(model.update(self.db).await?)
  }

  pub async fn set_active(&self, id: i32, active: bool) -> Result<deal::Model> {
    self
      .update(id, DealPatch { is_active: Some(active), ..Default::default() })
      .await
  }
}
