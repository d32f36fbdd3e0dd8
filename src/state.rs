use std::{env, net::IpAddr, path::PathBuf};

use migration::Migrator;

use crate::{
  entity::profile,
  prelude::*,
  sv::{
    self, Geo, Session, Sessions,
    geo::{FileStore, IpApi, MemoryStore, Store},
  },
};

#[derive(Debug, Clone)]
pub struct Config {
  pub db_url: String,
  pub port: u16,
  pub secret: String,
  /// Emails promoted to admin when they register.
  pub admins: HashSet<String>,
  pub geo_api_url: String,
  pub geo_fallback: String,
  pub geo_cache_ttl: Duration,
  pub geo_timeout: Duration,
  pub geo_cache_path: Option<PathBuf>,
  pub session_ttl: Duration,
  pub rate_per_second: u64,
  pub rate_burst: u32,
}

fn var_or(name: &str, default: &str) -> String {
  env::var(name).ok().filter(|v| !v.trim().is_empty()).unwrap_or(default.into())
}

fn duration_var(name: &str, default: &str) -> anyhow::Result<Duration> {
  let raw = var_or(name, default);
  humantime::parse_duration(&raw)
    .with_context(|| format!("{name}: invalid duration `{raw}`"))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(name) {
    Ok(raw) if !raw.trim().is_empty() => {
      raw.trim().parse().with_context(|| format!("{name}: invalid value"))
    }
    _ => Ok(default),
  }
}

pub fn parse_admins(raw: &str) -> HashSet<String> {
  raw
    .split(',')
    .map(sv::profile::normalize_email)
    .filter(|email| !email.is_empty())
    .collect()
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let secret = env::var("SERVER_SECRET").context("SERVER_SECRET not set")?;

    Ok(Self {
      db_url: var_or("DATABASE_URL", "sqlite:rakedeals.db?mode=rwc"),
      port: parse_var("PORT", 3000)?,
      secret,
      admins: parse_admins(&var_or("ADMIN_EMAILS", "")),
      geo_api_url: var_or("GEO_API_URL", sv::geo::IPAPI_URL),
      geo_fallback: var_or("GEO_FALLBACK", sv::geo::FALLBACK_COUNTRY),
      geo_cache_ttl: duration_var("GEO_CACHE_TTL", "30d")?,
      geo_timeout: duration_var("GEO_TIMEOUT", "5s")?,
      geo_cache_path: env::var("GEO_CACHE_PATH").ok().map(PathBuf::from),
      session_ttl: duration_var("SESSION_TTL", "7d")?,
      rate_per_second: parse_var("RATE_PER_SECOND", 2)?,
      rate_burst: parse_var("RATE_BURST", 100)?,
    })
  }

  #[cfg(test)]
  pub fn test() -> Self {
    Self {
      db_url: "sqlite::memory:".into(),
      port: 0,
      secret: sv::test_utils::test_db::SECRET.into(),
      admins: parse_admins("admin@example.com"),
      geo_api_url: sv::geo::IPAPI_URL.into(),
      geo_fallback: sv::geo::FALLBACK_COUNTRY.into(),
      geo_cache_ttl: sv::geo::CACHE_TTL,
      geo_timeout: Duration::from_secs(1),
      geo_cache_path: None,
      session_ttl: Duration::from_secs(3600),
      rate_per_second: 2,
      rate_burst: 100,
    }
  }
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
  pub geo: Geo,
  pub sessions: Sessions,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    let db = Database::connect(&config.db_url)
      .await
      .with_context(|| format!("Failed to connect to {}", config.db_url))?;
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    let store: Arc<dyn Store> = match &config.geo_cache_path {
      Some(path) => {
        let store = FileStore::new(path);
        info!("Geo cache persisted to {}", store.path().display());
        Arc::new(store)
      }
      None => Arc::new(MemoryStore::new()),
    };
    let lookup = IpApi::new(&config.geo_api_url, config.geo_timeout)?;
    let geo = Geo::new(store, Arc::new(lookup))
      .with_ttl(config.geo_cache_ttl)
      .with_fallback(&config.geo_fallback);
    info!("Unresolved visitors default to {}", geo.fallback());

    Ok(Self::from_parts(db, config, geo))
  }

  pub fn from_parts(db: DatabaseConnection, config: Config, geo: Geo) -> Self {
    let sessions = Sessions::new(config.session_ttl);
    Self { db, config, geo, sessions }
  }

  pub fn is_admin_email(&self, email: &str) -> bool {
    self.config.admins.contains(&sv::profile::normalize_email(email))
  }

  pub async fn login(
    &self,
    email: &str,
    password: &str,
  ) -> Result<(Session, profile::Model)> {
    let profile = sv::Profile::new(&self.db)
      .authenticate(email, password, &self.config.secret)
      .await?;
    let session = self.sessions.open(&profile);
    info!("{} logged in", profile.id);
    Ok((session, profile))
  }

  /// Country of a visitor, `None` when their address is unknown.
  pub async fn visitor_country(&self, ip: Option<IpAddr>) -> Option<String> {
    match ip {
      Some(ip) => Some(self.geo.country_for(ip).await),
      None => None,
    }
  }

  pub fn logout(&self, token: &str) -> bool {
    self.sessions.close(token)
  }

  pub fn gc_sessions(&self) {
    let removed = self.sessions.gc();
    if removed > 0 {
      debug!("Dropped {removed} idle sessions, {} live", self.sessions.len());
    }
  }

  pub fn gc_geo_cache(&self) {
    let removed = self.geo.gc();
    if removed > 0 {
      debug!("Evicted {removed} stale geo cache entries");
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_admins() {
    let admins = parse_admins(" Admin@Example.com, ,ops@example.com");
    assert_eq!(admins.len(), 2);
    assert!(admins.contains("admin@example.com"));
  }
}
