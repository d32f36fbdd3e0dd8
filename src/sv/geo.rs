//! Visitor country resolution through an IP geolocation API.
//!
//! Lookups are cached per key for [`CACHE_TTL`]. The resolver never fails:
//! any lookup error is logged and the fallback country is returned instead.

use std::{
  fs,
  net::IpAddr,
  path::{Path, PathBuf},
  sync::Mutex,
};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

pub const CACHE_KEY: &str = "user_country_cache";
pub const CACHE_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);
pub const FALLBACK_COUNTRY: &str = "US";
pub const IPAPI_URL: &str = "https://ipapi.co";

/// Cached lookup result. `timestamp` is milliseconds since the epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
  pub country_code: String,
  pub timestamp: i64,
}

impl CacheEntry {
  pub fn new(country_code: impl Into<String>) -> Self {
    Self {
      country_code: country_code.into(),
      timestamp: Utc::now().timestamp_millis(),
    }
  }

  pub fn is_fresh(&self, ttl: Duration, now_ms: i64) -> bool {
    let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_sub(self.timestamp) < ttl_ms
  }
}

/// Two ASCII letters, uppercased.
pub fn normalize_country(code: &str) -> Option<String> {
  let code = code.trim();
  (code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()))
    .then(|| code.to_ascii_uppercase())
}

fn is_public(ip: IpAddr) -> bool {
  match ip {
    IpAddr::V4(v4) => {
      !(v4.is_private()
        || v4.is_loopback()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_broadcast())
    }
    IpAddr::V6(v6) => {
      if let Some(v4) = v6.to_ipv4_mapped() {
        return is_public(IpAddr::V4(v4));
      }
      let head = v6.segments()[0];
      // fc00::/7 unique local, fe80::/10 link-local
      let unique_local = head & 0xfe00 == 0xfc00;
      let link_local = head & 0xffc0 == 0xfe80;
      !(v6.is_loopback() || v6.is_unspecified() || unique_local || link_local)
    }
  }
}

pub trait Store: Send + Sync {
  fn get(&self, key: &str) -> Option<CacheEntry>;

  fn set(&self, key: &str, entry: CacheEntry);

  fn remove(&self, key: &str);

  /// Drops entries older than `ttl`, returns how many were removed.
  fn evict(&self, ttl: Duration, now_ms: i64) -> usize;

  fn clear(&self) -> usize;
}

#[derive(Default)]
pub struct MemoryStore {
  entries: DashMap<String, CacheEntry>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl Store for MemoryStore {
  fn get(&self, key: &str) -> Option<CacheEntry> {
    self.entries.get(key).map(|entry| entry.clone())
  }

  fn set(&self, key: &str, entry: CacheEntry) {
    self.entries.insert(key.to_string(), entry);
  }

  fn remove(&self, key: &str) {
    self.entries.remove(key);
  }

  fn evict(&self, ttl: Duration, now_ms: i64) -> usize {
    let before = self.entries.len();
    self.entries.retain(|_, entry| entry.is_fresh(ttl, now_ms));
    before - self.entries.len()
  }

  fn clear(&self) -> usize {
    let before = self.entries.len();
    self.entries.clear();
    before
  }
}

/// JSON object on disk mapping keys to entries.
/// An unreadable or corrupt file behaves like an empty cache.
pub struct FileStore {
  path: PathBuf,
  lock: Mutex<()>,
}

impl FileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into(), lock: Mutex::new(()) }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn load(&self) -> HashMap<String, CacheEntry> {
    let raw = match fs::read_to_string(&self.path) {
      Ok(raw) => raw,
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        return HashMap::new();
      }
      Err(err) => {
        warn!("Failed to read geo cache {}: {err}", self.path.display());
        return HashMap::new();
      }
    };

    json::from_str(&raw).unwrap_or_else(|err| {
      warn!("Corrupt geo cache {}: {err}", self.path.display());
      HashMap::new()
    })
  }

  fn save(&self, entries: &HashMap<String, CacheEntry>) {
    let result = json::to_string(entries)
      .map_err(|err| err.to_string())
      .and_then(|raw| {
        fs::write(&self.path, raw).map_err(|err| err.to_string())
      });

    if let Err(err) = result {
      warn!("Failed to write geo cache {}: {err}", self.path.display());
    }
  }

  fn with_entries<T>(
    &self,
    f: impl FnOnce(&mut HashMap<String, CacheEntry>) -> (T, bool),
  ) -> T {
    let _guard = self.lock.lock().unwrap_or_else(|poison| poison.into_inner());
    let mut entries = self.load();
    let (out, dirty) = f(&mut entries);
    if dirty {
      self.save(&entries);
    }
    out
  }
}

impl Store for FileStore {
  fn get(&self, key: &str) -> Option<CacheEntry> {
    self.with_entries(|entries| (entries.get(key).cloned(), false))
  }

  fn set(&self, key: &str, entry: CacheEntry) {
    self.with_entries(|entries| {
      entries.insert(key.to_string(), entry);
      ((), true)
    })
  }

  fn remove(&self, key: &str) {
    self.with_entries(|entries| {
      let removed = entries.remove(key).is_some();
      ((), removed)
    })
  }

  fn evict(&self, ttl: Duration, now_ms: i64) -> usize {
    self.with_entries(|entries| {
      let before = entries.len();
      entries.retain(|_, entry| entry.is_fresh(ttl, now_ms));
      let removed = before - entries.len();
      (removed, removed > 0)
    })
  }

  fn clear(&self) -> usize {
    self.with_entries(|entries| {
      let removed = entries.len();
      entries.clear();
      (removed, removed > 0)
    })
  }
}

/// One network lookup. `None` asks the service to use the caller's address.
#[async_trait]
pub trait Lookup: Send + Sync {
  async fn lookup(&self, ip: Option<IpAddr>) -> Result<String>;
}

/// Response body of ipapi.co. Errors come back as `{"error": true, ...}`.
#[derive(Debug, Deserialize)]
pub struct IpApiResponse {
  pub country_code: Option<String>,
  #[allow(dead_code)]
  pub country_name: Option<String>,
  #[serde(default)]
  pub error: bool,
  pub reason: Option<String>,
}

impl IpApiResponse {
  pub fn country(self) -> Result<String> {
    if self.error {
      let reason = self.reason.unwrap_or_else(|| "Unknown error".into());
      return Err(Error::Geo(reason));
    }

    let code = self
      .country_code
      .ok_or_else(|| Error::Geo("Missing country_code".into()))?;

    normalize_country(&code)
      .ok_or_else(|| Error::Geo(format!("Invalid country_code: {code:?}")))
  }
}

#[derive(Clone)]
pub struct IpApi {
  client: Client,
  base_url: String,
}

impl IpApi {
  pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| Error::Geo(format!("Failed to build client: {e}")))?;

    let base_url = base_url.into().trim_end_matches('/').to_string();
    Ok(Self { client, base_url })
  }

  fn url(&self, ip: Option<IpAddr>) -> String {
    match ip {
      Some(ip) => format!("{}/{ip}/json/", self.base_url),
      None => format!("{}/json/", self.base_url),
    }
  }
}

#[async_trait]
impl Lookup for IpApi {
  async fn lookup(&self, ip: Option<IpAddr>) -> Result<String> {
    let response = self
      .client
      .get(self.url(ip))
      .send()
      .await
      .and_then(|response| response.error_for_status())
      .map_err(|e| Error::Geo(format!("Request failed: {e}")))?;

    let body: IpApiResponse = response
      .json()
      .await
      .map_err(|e| Error::Geo(format!("Failed to parse response: {e}")))?;

    body.country()
  }
}

pub struct Geo {
  store: Arc<dyn Store>,
  lookup: Arc<dyn Lookup>,
  ttl: Duration,
  fallback: String,
}

impl Geo {
  pub fn new(store: Arc<dyn Store>, lookup: Arc<dyn Lookup>) -> Self {
    Self { store, lookup, ttl: CACHE_TTL, fallback: FALLBACK_COUNTRY.into() }
  }

  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  pub fn with_fallback(mut self, fallback: &str) -> Self {
    self.fallback =
      normalize_country(fallback).unwrap_or_else(|| FALLBACK_COUNTRY.into());
    self
  }

  pub fn fallback(&self) -> &str {
    &self.fallback
  }

  /// Country of whoever the lookup service sees as the caller.
  pub async fn get_user_country(&self) -> String {
    self.resolve(CACHE_KEY, None).await
  }

  /// Country of a specific visitor. Non-routable addresses get the fallback.
  pub async fn country_for(&self, ip: IpAddr) -> String {
    if !is_public(ip) {
      trace!("{ip} is not public, using fallback country");
      return self.fallback.clone();
    }
    self.resolve(&format!("ip:{ip}"), Some(ip)).await
  }

  pub fn clear_country_cache(&self) {
    self.store.remove(CACHE_KEY);
  }

  /// Drops the cached country of one visitor address.
  pub fn forget(&self, ip: IpAddr) {
    self.store.remove(&format!("ip:{ip}"));
  }

  /// Forgets every cached country, per-IP entries included.
  pub fn purge(&self) -> usize {
    self.store.clear()
  }

  pub fn gc(&self) -> usize {
    self.store.evict(self.ttl, Utc::now().timestamp_millis())
  }

  async fn resolve(&self, key: &str, ip: Option<IpAddr>) -> String {
    let now = Utc::now().timestamp_millis();

    if let Some(entry) = self.store.get(key)
      && entry.is_fresh(self.ttl, now)
      && let Some(code) = normalize_country(&entry.country_code)
    {
      return code;
    }

    match self.lookup.lookup(ip).await {
      Ok(code) => {
        debug!("Resolved {key} to {code}");
        self.store.set(key, CacheEntry::new(code.as_str()));
        code
      }
      Err(err) => {
        error!("Error getting user country: {err}");
        self.fallback.clone()
      }
    }
  }
}
