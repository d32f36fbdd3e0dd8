use axum::{
  Json,
  extract::State,
  http::{HeaderMap, StatusCode, header},
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use super::ok;
use crate::{
  entity::{Role, profile, sub_affiliate},
  error::Status,
  plugins::server::extract::{
    Auth, Payload, ReferralCookie, bearer, clear_referral_cookie,
  },
  prelude::*,
  state::AppState,
  sv::{
    self,
    profile::{ContactPatch, Registration},
  },
};

#[derive(Debug, Serialize)]
pub struct AuthResp {
  pub token: String,
  pub profile: profile::Model,
}

#[derive(Debug, Serialize)]
pub struct SessionState {
  pub logged_in: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginReq {
  pub email: String,
  pub password: String,
}

pub async fn register(
  State(app): State<Arc<AppState>>,
  ReferralCookie(cookie): ReferralCookie,
  Payload(form): Payload<Registration>,
) -> Result<impl IntoResponse> {
  let role =
    if app.is_admin_email(&form.email) { Role::Admin } else { Role::Player };
  let code = form.referral_code.clone().or(cookie);

  let profile = sv::Profile::new(&app.db)
    .register(form, role, &app.config.secret)
    .await?;
  info!("Registered {} as {:?}", profile.id, profile.role);

  if let Some(code) = code {
    match sv::Referral::new(&app.db).record_signup(&code, &profile.id).await {
      Ok(referral) => {
        info!("{} referred via {code} ({})", profile.id, referral.id)
      }
      Err(err) => {
        warn!("Referral {code} not recorded for {}: {err}", profile.id)
      }
    }
  }

  let session = app.sessions.open(&profile);

  let mut headers = HeaderMap::new();
  headers.insert(header::SET_COOKIE, clear_referral_cookie());

  Ok((
    StatusCode::CREATED,
    headers,
    Json(AuthResp { token: session.token, profile }),
  ))
}

pub async fn login(
  State(app): State<Arc<AppState>>,
  Payload(req): Payload<LoginReq>,
) -> Result<Json<AuthResp>> {
  let (session, profile) = app.login(&req.email, &req.password).await?;
  Ok(Json(AuthResp { token: session.token, profile }))
}

pub async fn logout(
  State(app): State<Arc<AppState>>,
  Auth(session): Auth,
) -> Json<Status> {
  app.logout(&session.token);
  ok()
}

/// Login state without a 401, for deciding whether to prompt for login.
pub async fn session(
  State(app): State<Arc<AppState>>,
  headers: HeaderMap,
) -> Json<SessionState> {
  let logged_in =
    bearer(&headers).is_some_and(|token| app.sessions.is_logged_in(token));
  Json(SessionState { logged_in })
}

pub async fn me(
  State(app): State<Arc<AppState>>,
  Auth(session): Auth,
) -> Result<Json<profile::Model>> {
  match sv::Profile::new(&app.db).by_id(&session.profile_id).await? {
    Some(profile) => Ok(Json(profile)),
    None => {
      app.logout(&session.token);
      Err(Error::Unauthorized)
    }
  }
}

pub async fn update_profile(
  State(app): State<Arc<AppState>>,
  Auth(session): Auth,
  Payload(patch): Payload<ContactPatch>,
) -> Result<Json<profile::Model>> {
  let profile = sv::Profile::new(&app.db)
    .update_contacts(&session.profile_id, patch)
    .await?;
  Ok(Json(profile))
}

pub async fn become_affiliate(
  State(app): State<Arc<AppState>>,
  Auth(session): Auth,
) -> Result<Json<sub_affiliate::Model>> {
  let affiliate = sv::Referral::new(&app.db)
    .become_sub_affiliate(&session.profile_id)
    .await?;
  Ok(Json(affiliate))
}
