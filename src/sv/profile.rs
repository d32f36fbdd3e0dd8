use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use uuid::Uuid;

use crate::{
  entity::{Role, profile},
  prelude::*,
  sv::geo::normalize_country,
};

type HmacSha256 = Hmac<Sha256>;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Registration {
  pub email: String,
  pub confirm_email: String,
  pub password: String,
  pub full_name: String,
  pub country: Option<String>,
  pub discord: Option<String>,
  pub whatsapp: Option<String>,
  pub telegram: Option<String>,
  /// Sub-affiliate code; falls back to the attribution cookie.
  #[serde(rename = "ref")]
  pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPatch {
  pub full_name: Option<String>,
  pub country: Option<String>,
  pub discord: Option<String>,
  pub whatsapp: Option<String>,
  pub telegram: Option<String>,
}

fn mac(secret: &str, salt: &str, password: &str) -> HmacSha256 {
  let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
    .expect("HMAC can take key of any size");
  mac.update(salt.as_bytes());
  mac.update(password.as_bytes());
  mac
}

pub fn hash_password(secret: &str, salt: &str, password: &str) -> String {
  hex::encode(mac(secret, salt, password).finalize().into_bytes())
}

pub fn verify_password(
  secret: &str,
  salt: &str,
  password: &str,
  hash: &str,
) -> bool {
  let Ok(expected) = hex::decode(hash) else {
    return false;
  };
  mac(secret, salt, password).verify_slice(&expected).is_ok()
}

pub fn normalize_email(email: &str) -> String {
  email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
  match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
    }
    None => false,
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn country(value: Option<String>) -> Result<Option<String>> {
  match non_empty(value) {
    Some(code) => normalize_country(&code)
      .map(Some)
      .ok_or_else(|| Error::InvalidArgs(format!("Invalid country: {code}"))),
    None => Ok(None),
  }
}

pub struct Profile<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Profile<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn register(
    &self,
    form: Registration,
    role: Role,
    secret: &str,
  ) -> Result<profile::Model> {
    let email = normalize_email(&form.email);
    if email != normalize_email(&form.confirm_email) {
      return Err(Error::EmailsMismatch);
    }
    if !is_valid_email(&email) {
      return Err(Error::InvalidArgs("Invalid email address".into()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::InvalidArgs(format!(
        "Password must be at least {MIN_PASSWORD_LEN} characters"
      )));
    }
    let full_name = non_empty(Some(form.full_name))
      .ok_or_else(|| Error::InvalidArgs("Full name is required".into()))?;
    let country = country(form.country)?;

    if self.by_email(&email).await?.is_some() {
      return Err(Error::EmailTaken);
    }

    let now = Utc::now().naive_utc();
    let salt = Uuid::new_v4().simple().to_string();
    let profile = profile::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      password_hash: Set(hash_password(secret, &salt, &form.password)),
      password_salt: Set(salt),
      email: Set(email),
      full_name: Set(full_name),
      country: Set(country),
      discord: Set(non_empty(form.discord)),
      whatsapp: Set(non_empty(form.whatsapp)),
      telegram: Set(non_empty(form.telegram)),
      role: Set(role),
      is_sub_affiliate: Set(false),
      created_at: Set(now),
      updated_at: Set(now),
    };

    // Two sign-ups can race past the lookup above.
    profile.insert(self.db).await.map_err(|err| match Error::from(err) {
      Error::Duplicate => Error::EmailTaken,
      err => err,
    })
  }

  pub async fn authenticate(
    &self,
    email: &str,
    password: &str,
    secret: &str,
  ) -> Result<profile::Model> {
    let profile = self
      .by_email(&normalize_email(email))
      .await?
      .ok_or(Error::InvalidCredentials)?;

    if !verify_password(
      secret,
      &profile.password_salt,
      password,
      &profile.password_hash,
    ) {
      return Err(Error::InvalidCredentials);
    }

    Ok(profile)
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<profile::Model>> {
    Ok(profile::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn by_email(&self, email: &str) -> Result<Option<profile::Model>> {
    Ok(
      profile::Entity::find()
        .filter(profile::Column::Email.eq(normalize_email(email)))
        .one(self.db)
        .await?,
    )
  }

  pub async fn update_contacts(
    &self,
    id: &str,
    patch: ContactPatch,
  ) -> Result<profile::Model> {
    let profile = profile::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    let mut model: profile::ActiveModel = profile.into();

    if let Some(name) = patch.full_name {
      let name = non_empty(Some(name))
        .ok_or_else(|| Error::InvalidArgs("Full name is required".into()))?;
      model.full_name = Set(name);
    }
    if patch.country.is_some() {
      model.country = Set(country(patch.country)?);
    }
    if patch.discord.is_some() {
      model.discord = Set(non_empty(patch.discord));
    }
    if patch.whatsapp.is_some() {
      model.whatsapp = Set(non_empty(patch.whatsapp));
    }
    if patch.telegram.is_some() {
      model.telegram = Set(non_empty(patch.telegram));
    }
    model.updated_at = Set(Utc::now().naive_utc());

    Ok(model.update(self.db).await?)
  }

  pub async fn set_role(&self, id: &str, role: Role) -> Result<profile::Model> {
    let profile = profile::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::ProfileNotFound)?;

    Ok(
      profile::ActiveModel {
        role: Set(role),
        updated_at: Set(Utc::now().naive_utc()),
        ..profile.into()
      }
      .update(self.db)
      .await?,
    )
  }

  pub async fn all(&self) -> Result<Vec<profile::Model>> {
    Ok(
      profile::Entity::find()
        .order_by_asc(profile::Column::CreatedAt)
        .all(self.db)
        .await?,
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::test_utils::test_db::{self, SECRET, registration};

  #[tokio::test]
  async fn test_register_and_authenticate() {
    let db = test_db::setup().await;
    let sv = Profile::new(&db);

    let form = Registration {
      email: " Player@Example.com ".into(),
      confirm_email: "player@example.com".into(),
      country: Some("pt".into()),
      discord: Some("  ".into()),
      ..registration("player@example.com")
    };
    let profile = sv.register(form, Role::Player, SECRET).await.unwrap();

    assert_eq!(profile.email, "player@example.com");
    assert_eq!(profile.country.as_deref(), Some("PT"));
    assert_eq!(profile.discord, None);
    assert_eq!(profile.role, Role::Player);
    assert_ne!(profile.password_hash, "hunter2hunter2");

    let authed = sv
      .authenticate("PLAYER@example.com", "hunter2hunter2", SECRET)
      .await
      .unwrap();
    assert_eq!(authed.id, profile.id);
  }

  #[tokio::test]
  async fn test_emails_must_match() {
    let db = test_db::setup().await;

    let form = Registration {
      confirm_email: "other@example.com".into(),
      ..registration("player@example.com")
    };
    let result = Profile::new(&db).register(form, Role::Player, SECRET).await;

    assert!(matches!(result, Err(Error::EmailsMismatch)));
    assert_eq!(
      Error::EmailsMismatch.to_string(),
      "Emails do not match"
    );
  }

  #[tokio::test]
  async fn test_register_validation() {
    let db = test_db::setup().await;
    let sv = Profile::new(&db);

    let short = Registration {
      password: "short".into(),
      ..registration("a@example.com")
    };
    assert!(matches!(
      sv.register(short, Role::Player, SECRET).await,
      Err(Error::InvalidArgs(_))
    ));

    let bad_email = registration("not-an-email");
    assert!(matches!(
      sv.register(bad_email, Role::Player, SECRET).await,
      Err(Error::InvalidArgs(_))
    ));

    let bad_country = Registration {
      country: Some("Portugal".into()),
      ..registration("b@example.com")
    };
    assert!(matches!(
      sv.register(bad_country, Role::Player, SECRET).await,
      Err(Error::InvalidArgs(_))
    ));
  }

  #[tokio::test]
  async fn test_duplicate_email() {
    let db = test_db::setup().await;
    test_db::player(&db, "dup@example.com").await;

    let result = Profile::new(&db)
      .register(registration("DUP@example.com"), Role::Player, SECRET)
      .await;

    assert!(matches!(result, Err(Error::EmailTaken)));
  }

  #[tokio::test]
  async fn test_wrong_password_is_invalid_credentials() {
    let db = test_db::setup().await;
    test_db::player(&db, "p@example.com").await;
    let sv = Profile::new(&db);

    assert!(matches!(
      sv.authenticate("p@example.com", "wrong-password", SECRET).await,
      Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
      sv.authenticate("nobody@example.com", "hunter2hunter2", SECRET).await,
      Err(Error::InvalidCredentials)
    ));
    assert!(matches!(
      sv.authenticate("p@example.com", "hunter2hunter2", "other-secret").await,
      Err(Error::InvalidCredentials)
    ));
  }

  #[tokio::test]
  async fn test_update_contacts_and_role() {
    let db = test_db::setup().await;
    let profile = test_db::player(&db, "p@example.com").await;
    let sv = Profile::new(&db);

    let patch = ContactPatch {
      telegram: Some("@grinder".into()),
      country: Some("br".into()),
      ..Default::default()
    };
    let updated = sv.update_contacts(&profile.id, patch).await.unwrap();
    assert_eq!(updated.telegram.as_deref(), Some("@grinder"));
    assert_eq!(updated.country.as_deref(), Some("BR"));
    assert_eq!(updated.full_name, profile.full_name);

    let admin = sv.set_role(&profile.id, Role::Admin).await.unwrap();
    assert_eq!(admin.role, Role::Admin);

    assert!(matches!(
      sv.set_role("missing", Role::Admin).await,
      Err(Error::ProfileNotFound)
    ));
  }

  #[test]
  fn test_password_hash_round_trip() {
    let hash = hash_password("s", "salt", "pw");
    assert!(verify_password("s", "salt", "pw", &hash));
    assert!(!verify_password("s", "pepper", "pw", &hash));
    assert!(!verify_password("s", "salt", "pw", "not-hex"));
  }
}
