use serde::Deserialize;

use crate::{entity::news, prelude::*};

pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewArticle {
  pub slug: String,
  pub title: String,
  pub excerpt: Option<String>,
  pub body: String,
  pub cover_url: Option<String>,
  pub category: Option<String>,
  #[serde(default)]
  pub publish: bool,
}

pub struct News<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> News<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Published articles, newest first.
  pub async fn published(&self, limit: u64) -> Result<Vec<news::Model>> {
    Ok(
      news::Entity::find()
        .filter(news::Column::IsPublished.eq(true))
        .order_by_desc(news::Column::PublishedAt)
        .limit(limit.clamp(1, MAX_LIMIT))
        .all(self.db)
        .await?,
    )
  }

  pub async fn by_slug(&self, slug: &str) -> Result<Option<news::Model>> {
    Ok(
      news::Entity::find()
        .filter(news::Column::Slug.eq(slug))
        .filter(news::Column::IsPublished.eq(true))
        .one(self.db)
        .await?,
    )
  }

  pub async fn create(&self, new: NewArticle) -> Result<news::Model> {
    if new.title.trim().is_empty() || new.body.trim().is_empty() {
      return Err(Error::InvalidArgs("Title and body are required".into()));
    }
    if new.slug.trim().is_empty() {
      return Err(Error::InvalidArgs("Article slug is required".into()));
    }

    let now = Utc::now().naive_utc();
    let article = news::ActiveModel {
      slug: Set(new.slug.trim().to_lowercase()),
      title: Set(new.title),
      excerpt: Set(new.excerpt),
      body: Set(new.body),
      cover_url: Set(new.cover_url),
      category: Set(new.category),
      is_published: Set(new.publish),
      published_at: Set(new.publish.then_some(now)),
      created_at: Set(now),
      ..Default::default()
    };

    article.insert(self.db).await.map_err(|err| match Error::from(err) {
      Error::Duplicate => Error::SlugTaken,
      err => err,
    })
  }

  /// Publishing stamps `published_at` once; unpublishing keeps it.
  pub async fn set_published(
    &self,
    id: i32,
    published: bool,
  ) -> Result<news::Model> {
    let article = news::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::ArticleNotFound)?;

    let published_at = match article.published_at {
      None if published => Some(Utc::now().naive_utc()),
      stamp => stamp,
    };

    Ok(
      news::ActiveModel {
        is_published: Set(published),
        published_at: Set(published_at),
        ..article.into()
      }
      .update(self.db)
      .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db;

  fn article(slug: &str, publish: bool) -> NewArticle {
    NewArticle {
      slug: slug.into(),
      title: format!("Title {slug}"),
      body: "Body".into(),
      publish,
      ..Default::default()
    }
  }

  #[tokio::test]
  async fn test_only_published_are_listed() {
    let db = test_db::setup().await;
    let sv = News::new(&db);

    sv.create(article("wsop-recap", true)).await.unwrap();
    sv.create(article("draft", false)).await.unwrap();

    let listed = sv.published(DEFAULT_LIMIT).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].slug, "wsop-recap");

    assert!(sv.by_slug("draft").await.unwrap().is_none());
    assert!(sv.by_slug("wsop-recap").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn test_limit_is_applied() {
    let db = test_db::setup().await;
    let sv = News::new(&db);

    for i in 0..3 {
      sv.create(article(&format!("post-{i}"), true)).await.unwrap();
    }

    assert_eq!(sv.published(2).await.unwrap().len(), 2);
    assert_eq!(sv.published(0).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_publish_later() {
    let db = test_db::setup().await;
    let sv = News::new(&db);

    let draft = sv.create(article("draft", false)).await.unwrap();
    assert!(draft.published_at.is_none());

    let published = sv.set_published(draft.id, true).await.unwrap();
    assert!(published.is_published);
    assert!(published.published_at.is_some());

    let hidden = sv.set_published(draft.id, false).await.unwrap();
    assert_eq!(hidden.published_at, published.published_at);
  }

  #[tokio::test]
  async fn test_duplicate_slug_is_taken() {
    let db = test_db::setup().await;
    let sv = News::new(&db);
    sv.create(article("wsop-recap", true)).await.unwrap();

    let result = sv.create(article("WSOP-Recap", false)).await;

    assert!(matches!(result, Err(Error::SlugTaken)));
  }

  #[tokio::test]
  async fn test_create_requires_title() {
    let db = test_db::setup().await;

    let result = News::new(&db)
      .create(NewArticle { title: " ".into(), ..article("x", true) })
      .await;

    assert!(matches!(result, Err(Error::InvalidArgs(_))));
  }
}
