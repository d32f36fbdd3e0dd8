use std::net::{IpAddr, SocketAddr};

use axum::{
  extract::{ConnectInfo, FromRequest, FromRequestParts},
  http::{HeaderMap, HeaderValue, header, request::Parts},
};

use crate::{prelude::*, state::AppState, sv::Session};

pub const REFERRAL_COOKIE: &str = "ref";
/// Attribution window for a `ref` link.
pub const REFERRAL_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// JSON body whose rejections answer in the usual error shape.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Payload<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

/// Visitor address: first `X-Forwarded-For` hop, else the peer address.
pub struct ClientIp(pub Option<IpAddr>);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    let forwarded = parts
      .headers
      .get("x-forwarded-for")
      .and_then(|value| value.to_str().ok())
      .and_then(|value| value.split(',').next())
      .and_then(|ip| ip.trim().parse().ok());

    let peer = parts
      .extensions
      .get::<ConnectInfo<SocketAddr>>()
      .map(|ConnectInfo(addr)| addr.ip());

    Ok(Self(forwarded.or(peer)))
  }
}

pub fn bearer(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Bearer ")
    .map(str::trim)
}

/// A logged-in visitor.
pub struct Auth(pub Session);

impl FromRequestParts<Arc<AppState>> for Auth {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    let token = bearer(&parts.headers).ok_or(Error::Unauthorized)?;
    app.sessions.current(token).map(Auth).ok_or(Error::Unauthorized)
  }
}

pub struct Admin(pub Session);

impl FromRequestParts<Arc<AppState>> for Admin {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    app: &Arc<AppState>,
  ) -> Result<Self> {
    let Auth(session) = Auth::from_request_parts(parts, app).await?;
    if !session.is_admin() {
      return Err(Error::Forbidden);
    }
    Ok(Admin(session))
  }
}

pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|value| value.to_str().ok())
    .flat_map(|value| value.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(key, _)| *key == name)
    .map(|(_, value)| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

/// Referral code remembered from an earlier `?ref=` visit.
pub struct ReferralCookie(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for ReferralCookie {
  type Rejection = std::convert::Infallible;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    Ok(Self(cookie(&parts.headers, REFERRAL_COOKIE)))
  }
}

pub fn referral_cookie(code: &str) -> Option<HeaderValue> {
  HeaderValue::from_str(&format!(
    "{REFERRAL_COOKIE}={code}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
    REFERRAL_WINDOW.as_secs()
  ))
  .ok()
}

pub fn clear_referral_cookie() -> HeaderValue {
  HeaderValue::from_static("ref=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax")
}
