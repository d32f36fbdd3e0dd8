//! Logged-in visitors, keyed by bearer token.

use serde::Serialize;
use uuid::Uuid;

use crate::{
  entity::{Role, profile},
  prelude::*,
};

#[derive(Debug, Clone, Serialize)]
pub struct Session {
  pub token: String,
  pub profile_id: String,
  pub role: Role,
  pub created_at: DateTime,
  pub last_seen: DateTime,
}

impl Session {
  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }
}

pub struct Sessions {
  inner: DashMap<String, Session>,
  ttl: TimeDelta,
}

impl Sessions {
  /// Sessions idle for longer than `ttl` are treated as logged out.
  pub fn new(ttl: Duration) -> Self {
    let ttl =
      TimeDelta::from_std(ttl).unwrap_or_else(|_| TimeDelta::days(36_500));
    Self { inner: DashMap::new(), ttl }
  }

  fn is_live(&self, session: &Session, now: DateTime) -> bool {
    now - session.last_seen < self.ttl
  }

  pub fn open(&self, profile: &profile::Model) -> Session {
    let now = Utc::now().naive_utc();
    let session = Session {
      token: Uuid::new_v4().to_string(),
      profile_id: profile.id.clone(),
      role: profile.role,
      created_at: now,
      last_seen: now,
    };
    self.inner.insert(session.token.clone(), session.clone());
    session
  }

  /// Looks up a live session and marks it as seen. An expired one is
  /// dropped on the spot.
  pub fn current(&self, token: &str) -> Option<Session> {
    let now = Utc::now().naive_utc();
    {
      let mut session = self.inner.get_mut(token)?;
      if self.is_live(&session, now) {
        session.last_seen = now;
        return Some(session.clone());
      }
    }
    self.inner.remove(token);
    None
  }

  pub fn is_logged_in(&self, token: &str) -> bool {
    let now = Utc::now().naive_utc();
    self.inner.get(token).is_some_and(|session| self.is_live(&session, now))
  }

  pub fn close(&self, token: &str) -> bool {
    self.inner.remove(token).is_some()
  }

  /// Keeps live sessions in step with a role change.
  pub fn set_role(&self, profile_id: &str, role: Role) {
    for mut session in self.inner.iter_mut() {
      if session.profile_id == profile_id {
        session.role = role;
      }
    }
  }

  /// Drops expired sessions, returns how many were removed.
  pub fn gc(&self) -> usize {
    let now = Utc::now().naive_utc();
    let before = self.inner.len();
    self.inner.retain(|_, session| now - session.last_seen < self.ttl);
    before - self.inner.len()
  }

  pub fn len(&self) -> usize {
    self.inner.len()
  }
}
