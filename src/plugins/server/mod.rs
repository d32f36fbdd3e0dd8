mod extract;
mod handlers;

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::{
  Router,
  routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

use handlers::{admin, auth, dashboard, deals, news};

pub fn router(app: Arc<AppState>) -> Router {
  let admin = Router::new()
    .route("/deals", get(admin::deals).post(admin::create_deal))
    .route("/deals/{id}", get(admin::deal).put(admin::update_deal))
    .route("/deals/{id}/active", put(admin::set_deal_active))
    .route("/news", post(admin::create_article))
    .route("/news/{id}/published", put(admin::publish_article))
    .route("/profiles", get(admin::profiles))
    .route("/profiles/{id}/role", put(admin::set_role))
    .route("/referrals/{id}/status", put(admin::set_referral_status))
    .route("/player-deals/{id}/status", put(admin::set_player_deal_status))
    .route("/sub-affiliates/{id}/commission", put(admin::set_commission))
    .route("/earnings", post(admin::record_earning))
    .route("/geo-cache", delete(admin::clear_geo_cache));

  Router::new()
    .route("/health", get(handlers::health))
    .route("/api/geo", get(deals::geo))
    .route("/api/geo/cache", delete(deals::forget_geo))
    .route("/api/deals", get(deals::list))
    .route("/api/deals/{slug}", get(deals::by_slug))
    .route("/api/deals/{slug}/claim", post(deals::claim))
    .route("/api/news", get(news::list))
    .route("/api/news/{slug}", get(news::by_slug))
    .route("/api/auth/register", post(auth::register))
    .route("/api/auth/login", post(auth::login))
    .route("/api/auth/logout", post(auth::logout))
    .route("/api/auth/session", get(auth::session))
    .route("/api/auth/me", get(auth::me))
    .route("/api/profile", put(auth::update_profile))
    .route("/api/affiliate", post(auth::become_affiliate))
    .route("/api/dashboard", get(dashboard::dashboard))
    .nest("/api/admin", admin)
    .layer(TraceLayer::new_for_http())
    .with_state(app)
}

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(app.config.rate_per_second)
        .burst_size(app.config.rate_burst)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let governor_limiter = governor_conf.limiter().clone();

    tokio::spawn(async move {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        governor_limiter.retain_recent();
      }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));

    let router = router(app)
      .layer(
        ServiceBuilder::new().layer(GovernorLayer::new(governor_conf)).layer(
          CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        ),
      )
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;

    info!("HTTP Server listening on {addr}");

    tokio::spawn(async move {
      if let Err(err) = axum::serve(listener, router).await {
        error!("HTTP Server stopped: {err}");
      }
    });

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
  };
  use tower::ServiceExt;

  use super::*;
  use crate::{
    state::Config,
    sv::{
      self, Geo,
      geo::{MemoryStore, tests::FakeLookup},
      test_utils::test_db,
    },
  };

  struct Resp {
    status: StatusCode,
    headers: HeaderMap,
    body: json::Value,
  }

  async fn app() -> (Router, Arc<AppState>) {
    let db = test_db::setup().await;
    let geo = Geo::new(Arc::new(MemoryStore::new()), FakeLookup::ok("BR"));
    let app = Arc::new(AppState::from_parts(db, Config::test(), geo));
    (router(app.clone()), app)
  }

  async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<json::Value>,
    cookie: Option<&str>,
  ) -> Resp {
    let mut req = Request::builder()
      .method(method)
      .uri(uri)
      .header("x-forwarded-for", "8.8.8.8");
    if let Some(token) = token {
      req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(cookie) = cookie {
      req = req.header(header::COOKIE, cookie);
    }
    let req = match body {
      Some(body) => req
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string())),
      None => req.body(Body::empty()),
    }
    .unwrap();

    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = json::from_slice(&bytes).unwrap_or(json::Value::Null);

    Resp { status, headers, body }
  }

  fn signup(email: &str) -> json::Value {
    json::json!({
      "email": email,
      "confirm_email": email,
      "password": "hunter2hunter2",
      "full_name": "Test Player",
    })
  }

  async fn register(
    router: &Router,
    email: &str,
    cookie: Option<&str>,
  ) -> Resp {
    let body = Some(signup(email));
    send(router, "POST", "/api/auth/register", None, body, cookie).await
  }

  fn token(resp: &Resp) -> String {
    resp.body["token"].as_str().unwrap().to_string()
  }

  fn find<'a>(deals: &'a json::Value, slug: &str) -> &'a json::Value {
    deals
      .as_array()
      .unwrap()
      .iter()
      .find(|deal| deal["slug"] == slug)
      .unwrap()
  }

  #[tokio::test]
  async fn test_health() {
    let (router, _) = app().await;

    let resp = send(&router, "GET", "/health", None, None, None).await;

    assert_eq!(resp.status, StatusCode::OK);
  }

  #[tokio::test]
  async fn test_deals_are_flagged_per_visitor_country() {
    let (router, app) = app().await;
    test_db::deal(&app.db, "global", &[]).await;
    test_db::deal(&app.db, "brazil", &["BR", "PT"]).await;
    test_db::deal(&app.db, "canada", &["CA"]).await;

    let resp = send(&router, "GET", "/api/deals", None, None, None).await;

    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["country"], "BR");
    let deals = &resp.body["deals"];
    assert_eq!(deals.as_array().unwrap().len(), 3);
    assert_eq!(find(deals, "global")["claimable"], true);
    assert_eq!(find(deals, "brazil")["claimable"], true);
    assert_eq!(find(deals, "canada")["claimable"], false);
    assert!(resp.headers.get(header::SET_COOKIE).is_none());

    let geo = send(&router, "GET", "/api/geo", None, None, None).await;
    assert_eq!(geo.body["country"], "BR");
  }

  #[tokio::test]
  async fn test_ref_link_sets_attribution_cookie() {
    let (router, app) = app().await;
    let owner = test_db::player(&app.db, "owner@example.com").await;
    let affiliate = sv::Referral::new(&app.db)
      .become_sub_affiliate(&owner.id)
      .await
      .unwrap();

    let code = affiliate.referral_code.to_lowercase();
    let uri = format!("/api/deals?ref={code}");
    let resp = send(&router, "GET", &uri, None, None, None).await;

    assert_eq!(
      resp.headers[header::SET_COOKIE].to_str().unwrap(),
      format!(
        "ref={}; Max-Age=604800; Path=/; HttpOnly; SameSite=Lax",
        affiliate.referral_code
      )
    );

    let resp =
      send(&router, "GET", "/api/deals?ref=NOPE1234", None, None, None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.headers.get(header::SET_COOKIE).is_none());
  }

  #[tokio::test]
  async fn test_claim_requires_session_and_eligibility() {
    let (router, app) = app().await;
    test_db::deal(&app.db, "brazil", &["BR"]).await;
    test_db::deal(&app.db, "canada", &["CA"]).await;
    let body = Some(json::json!({ "username": "grinder" }));

    let resp =
      send(&router, "POST", "/api/deals/brazil/claim", None, body.clone(), None)
        .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["success"], false);

    let registered = register(&router, "p@example.com", None).await;
    assert_eq!(registered.status, StatusCode::CREATED);
    let token = token(&registered);

    let resp = send(
      &router,
      "POST",
      "/api/deals/canada/claim",
      Some(&token),
      body.clone(),
      None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp = send(
      &router,
      "POST",
      "/api/deals/brazil/claim",
      Some(&token),
      body.clone(),
      None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["claim_url"], "https://brazil.example/claim");
    assert_eq!(resp.body["player_deal"]["username"], "grinder");

    let resp = send(
      &router,
      "POST",
      "/api/deals/brazil/claim",
      Some(&token),
      body,
      None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn test_referral_cookie_flows_into_dashboard() {
    let (router, app) = app().await;
    test_db::deal(&app.db, "global", &[]).await;

    let owner = register(&router, "owner@example.com", None).await;
    let owner_token = token(&owner);
    let affiliate = send(
      &router,
      "POST",
      "/api/affiliate",
      Some(&owner_token),
      None,
      None,
    )
    .await;
    assert_eq!(affiliate.status, StatusCode::OK);
    let code = affiliate.body["referral_code"].as_str().unwrap().to_string();

    let cookie = format!("ref={code}");
    let referred =
      register(&router, "friend@example.com", Some(&cookie)).await;
    assert_eq!(referred.status, StatusCode::CREATED);
    assert!(
      referred.headers[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .starts_with("ref=; Max-Age=0")
    );

    let resp = send(
      &router,
      "POST",
      "/api/deals/global/claim",
      Some(&token(&referred)),
      Some(json::json!({ "username": "friend" })),
      None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::OK);

    let dashboard =
      send(&router, "GET", "/api/dashboard", Some(&owner_token), None, None)
        .await;
    assert_eq!(dashboard.status, StatusCode::OK);
    let view = &dashboard.body["affiliate"];
    assert_eq!(view["summary"]["total"], 1);
    assert_eq!(view["summary"]["active"], 1);
    assert_eq!(view["referrals"][0]["referred"]["full_name"], "Test Player");

    let dashboard = send(
      &router,
      "GET",
      "/api/dashboard",
      Some(&token(&referred)),
      None,
      None,
    )
    .await;
    assert_eq!(dashboard.body["deals"][0]["deal"]["slug"], "global");
    assert!(dashboard.body["affiliate"].is_null());
  }

  #[tokio::test]
  async fn test_auth_errors() {
    let (router, _) = app().await;
    register(&router, "p@example.com", None).await;

    let resp = send(
      &router,
      "POST",
      "/api/auth/login",
      None,
      Some(json::json!({ "email": "p@example.com", "password": "nope" })),
      None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["msg"], "Invalid credentials");

    let mut form = signup("q@example.com");
    form["confirm_email"] = "other@example.com".into();
    let resp =
      send(&router, "POST", "/api/auth/register", None, Some(form), None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["msg"], "Emails do not match");

    let resp = register(&router, "P@example.com", None).await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn test_login_me_logout() {
    let (router, _) = app().await;
    register(&router, "p@example.com", None).await;

    let login = send(
      &router,
      "POST",
      "/api/auth/login",
      None,
      Some(json::json!({
        "email": "P@example.com",
        "password": "hunter2hunter2",
      })),
      None,
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(login.body["profile"].get("password_hash").is_none());
    let token = token(&login);

    let me =
      send(&router, "GET", "/api/auth/me", Some(&token), None, None).await;
    assert_eq!(me.body["email"], "p@example.com");

    send(&router, "POST", "/api/auth/logout", Some(&token), None, None).await;
    let me =
      send(&router, "GET", "/api/auth/me", Some(&token), None, None).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn test_admin_routes_require_admin_role() {
    let (router, _) = app().await;

    let player = token(&register(&router, "p@example.com", None).await);
    let resp =
      send(&router, "GET", "/api/admin/profiles", Some(&player), None, None)
        .await;
    assert_eq!(resp.status, StatusCode::FORBIDDEN);

    let resp =
      send(&router, "GET", "/api/admin/profiles", None, None, None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);

    let admin = register(&router, "admin@example.com", None).await;
    assert_eq!(admin.body["profile"]["role"], "admin");
    let admin = token(&admin);

    let resp =
      send(&router, "GET", "/api/admin/profiles", Some(&admin), None, None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body.as_array().unwrap().len(), 2);

    let resp = send(
      &router,
      "POST",
      "/api/admin/deals",
      Some(&admin),
      Some(json::json!({
        "name": "Natural8",
        "slug": "natural8",
        "available_countries": ["br"],
        "claim_url": "https://natural8.example/claim",
      })),
      None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    assert_eq!(resp.body["available_countries"], json::json!(["BR"]));

    let resp =
      send(&router, "DELETE", "/api/admin/geo-cache", Some(&admin), None, None)
        .await;
    assert_eq!(resp.body["success"], true);
  }

  async fn admin_token(router: &Router) -> String {
    token(&register(router, "admin@example.com", None).await)
  }

  fn natural8() -> json::Value {
    json::json!({
      "name": "Natural8",
      "slug": "n8",
      "claim_url": "https://natural8.example/claim",
    })
  }

  #[tokio::test]
  async fn test_duplicate_deal_slug_is_conflict() {
    let (router, _) = app().await;
    let admin = admin_token(&router).await;

    let uri = "/api/admin/deals";
    let first =
      send(&router, "POST", uri, Some(&admin), Some(natural8()), None).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second =
      send(&router, "POST", uri, Some(&admin), Some(natural8()), None).await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["success"], false);
    assert_eq!(second.body["msg"], "Slug is already taken");
  }

  #[tokio::test]
  async fn test_bad_input_answers_in_json() {
    let (router, _) = app().await;
    let admin = admin_token(&router).await;

    let resp = send(
      &router,
      "POST",
      "/api/auth/login",
      None,
      Some(json::json!("not an object")),
      None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);
    assert!(resp.body["msg"].is_string());

    let resp =
      send(&router, "GET", "/api/news?limit=-1", None, None, None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);

    let resp =
      send(&router, "GET", "/api/admin/deals/abc", Some(&admin), None, None)
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["success"], false);
  }

  #[tokio::test]
  async fn test_admin_deal_toggle_and_available_filter() {
    let (router, app) = app().await;
    let admin = admin_token(&router).await;
    let canada = test_db::deal(&app.db, "canada", &["CA"]).await;
    test_db::deal(&app.db, "global", &[]).await;

    let uri = format!("/api/admin/deals/{}", canada.id);
    let resp = send(&router, "GET", &uri, Some(&admin), None, None).await;
    assert_eq!(resp.body["slug"], "canada");

    let resp =
      send(&router, "GET", "/api/deals?available=true", None, None, None)
        .await;
    let deals = resp.body["deals"].as_array().unwrap();
    assert_eq!(deals.len(), 1);
    assert_eq!(deals[0]["slug"], "global");

    let uri = format!("/api/admin/deals/{}/active", canada.id);
    let body = Some(json::json!({ "active": false }));
    let resp = send(&router, "PUT", &uri, Some(&admin), body, None).await;
    assert_eq!(resp.body["is_active"], false);

    let resp = send(&router, "GET", "/api/deals", None, None, None).await;
    assert_eq!(resp.body["deals"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn test_session_state() {
    let (router, _) = app().await;

    let resp =
      send(&router, "GET", "/api/auth/session", None, None, None).await;
    assert_eq!(resp.body["logged_in"], false);

    let token = token(&register(&router, "p@example.com", None).await);
    let resp =
      send(&router, "GET", "/api/auth/session", Some(&token), None, None)
        .await;
    assert_eq!(resp.body["logged_in"], true);
  }

  #[tokio::test]
  async fn test_forget_geo_cache() {
    let (router, app) = app().await;

    send(&router, "GET", "/api/geo", None, None, None).await;
    assert_eq!(app.geo.purge(), 1);

    send(&router, "GET", "/api/geo", None, None, None).await;
    let resp =
      send(&router, "DELETE", "/api/geo/cache", None, None, None).await;
    assert_eq!(resp.body["success"], true);
    assert_eq!(app.geo.purge(), 0);
  }
}
