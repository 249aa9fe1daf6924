use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::Router;
use chrono::{Days, Utc};
use tower::ServiceExt;

use eventlink::config::AppConfig;
use eventlink::db;
use eventlink::db::queries;
use eventlink::handlers;
use eventlink::models::{Role, User};
use eventlink::services::auth::{hash_password, issue_token};
use eventlink::services::notifications::{Notification, NotificationSink};
use eventlink::state::AppState;

// ── Mock sinks ──

struct MockSink {
    sent: Arc<Mutex<Vec<Notification>>>,
}

#[async_trait]
impl NotificationSink for MockSink {
    async fn send(&self, note: Notification) -> anyhow::Result<()> {
        self.sent.lock().unwrap().push(note);
        Ok(())
    }
}

struct FailingSink;

#[async_trait]
impl NotificationSink for FailingSink {
    async fn send(&self, _note: Notification) -> anyhow::Result<()> {
        anyhow::bail!("relay unreachable")
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        token_secret: "test-secret".to_string(),
        mail_api_url: "".to_string(),
        mail_api_token: "".to_string(),
        mail_from: "noreply@test.local".to_string(),
    }
}

fn test_state() -> (Arc<AppState>, Arc<Mutex<Vec<Notification>>>) {
    let conn = db::init_db(":memory:").unwrap();
    let sent = Arc::new(Mutex::new(vec![]));
    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        notifications: Box::new(MockSink {
            sent: Arc::clone(&sent),
        }),
    });
    (state, sent)
}

fn failing_state() -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: test_config(),
        notifications: Box::new(FailingSink),
    })
}

fn test_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/change-role", post(handlers::auth::change_role))
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route("/api/users", get(handlers::users::get_users))
        .route("/api/users/:id", put(handlers::users::update_user))
        .route("/api/users/:id", delete(handlers::users::delete_user))
        .route(
            "/api/organizations",
            get(handlers::organizations::get_organizations)
                .post(handlers::organizations::create_organization),
        )
        .route(
            "/api/organizations/:id",
            get(handlers::organizations::get_organization)
                .put(handlers::organizations::update_organization)
                .delete(handlers::organizations::delete_organization),
        )
        .route(
            "/api/events",
            get(handlers::events::get_events).post(handlers::events::create_event),
        )
        .route(
            "/api/events/:id",
            get(handlers::events::get_event)
                .put(handlers::events::update_event)
                .delete(handlers::events::delete_event),
        )
        .route(
            "/api/events/:id/status",
            put(handlers::events::update_event_status),
        )
        .route(
            "/api/events/organization/:id",
            get(handlers::events::get_events_for_organization),
        )
        .route(
            "/api/crews",
            get(handlers::crews::get_crews).post(handlers::crews::create_crew),
        )
        .route(
            "/api/crews/:id",
            get(handlers::crews::get_crew)
                .put(handlers::crews::update_crew)
                .delete(handlers::crews::delete_crew),
        )
        .route(
            "/api/crews/:id/status",
            put(handlers::crews::update_crew_status),
        )
        .route(
            "/api/crews/:id/members",
            post(handlers::crews::add_crew_member),
        )
        .route(
            "/api/crews/:id/members/:member_id",
            put(handlers::crews::update_crew_member).delete(handlers::crews::remove_crew_member),
        )
        .route(
            "/api/calendar/bookings",
            get(handlers::calendar::get_bookings).post(handlers::calendar::create_booking),
        )
        .route(
            "/api/calendar/check-availability",
            get(handlers::calendar::check_availability),
        )
        .route(
            "/api/calendar/block-dates",
            post(handlers::calendar::block_dates),
        )
        .route(
            "/api/calendar/bookings/:id/status",
            put(handlers::calendar::update_booking_status),
        )
        .route(
            "/api/calendar/bookings/:id",
            delete(handlers::calendar::delete_booking),
        )
        .with_state(state)
}

/// Insert a user directly and mint a token for it.
fn seed_user(state: &Arc<AppState>, username: &str, email: &str, role: Role) -> (String, String) {
    let now = Utc::now().naive_utc();
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password_hash: hash_password("Passw0rd1").unwrap(),
        role,
        created_at: now,
        updated_at: now,
    };
    {
        let db = state.db.lock().unwrap();
        queries::create_user(&db, &user).unwrap();
    }
    let token = issue_token(&state.config.token_secret, &user).unwrap();
    (user.id, token)
}

fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(res: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A datetime range `days` days from now, `hours` long, as wire strings.
fn future_range(days: u64, hours: u64) -> (String, String) {
    let start = Utc::now()
        .naive_utc()
        .checked_add_days(Days::new(days))
        .unwrap();
    let end = start + chrono::Duration::hours(hours as i64);
    (
        start.format("%Y-%m-%dT%H:%M:%S").to_string(),
        end.format("%Y-%m-%dT%H:%M:%S").to_string(),
    )
}

fn booking_body(start: &str, end: &str, title: &str) -> serde_json::Value {
    serde_json::json!({
        "startDate": start,
        "endDate": end,
        "title": title,
    })
}

// ── Auth ──

#[tokio::test]
async fn test_register_login_round_trip() {
    let (state, _) = test_state();

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "username": "alice",
                "email": "alice@example.edu",
                "password": "Passw0rd1",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["username"], "alice");
    assert_eq!(json["role"], "organizer");
    let token = json["token"].as_str().unwrap().to_string();

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({
                "email": "alice@example.edu",
                "password": "Passw0rd1",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(request("GET", "/api/auth/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["email"], "alice@example.edu");
    assert!(json.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (state, _) = test_state();
    seed_user(&state, "alice", "alice@example.edu", Role::Organizer);

    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "username": "alice2",
                "email": "alice@example.edu",
                "password": "Passw0rd1",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("already has an account"));
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let (state, _) = test_state();

    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "username": "bob",
                "email": "bob@example.edu",
                "password": "weak",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (state, _) = test_state();
    seed_user(&state, "alice", "alice@example.edu", Role::Organizer);

    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({
                "email": "alice@example.edu",
                "password": "WrongPass1",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_role_requires_staff_admin() {
    let (state, _) = test_state();
    let (_, organizer) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (_, admin) = seed_user(&state, "root", "root@example.edu", Role::StaffAdmin);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/auth/change-role",
            Some(&organizer),
            Some(serde_json::json!({ "email": "root@example.edu", "role": "organizer" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/auth/change-role",
            Some(&admin),
            Some(serde_json::json!({ "email": "alice@example.edu", "role": "staff advisor" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Assigning the role the user already holds is rejected
    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/auth/change-role",
            Some(&admin),
            Some(serde_json::json!({ "email": "alice@example.edu", "role": "staff advisor" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/auth/change-role",
            Some(&admin),
            Some(serde_json::json!({ "email": "alice@example.edu", "role": "superuser" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_change_password_verifies_old() {
    let (state, _) = test_state();
    let (_, token) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/auth/change-password",
            Some(&token),
            Some(serde_json::json!({ "oldPassword": "nope", "newPassword": "NewPassw0rd" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/auth/change-password",
            Some(&token),
            Some(serde_json::json!({ "oldPassword": "Passw0rd1", "newPassword": "NewPassw0rd" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({
                "email": "alice@example.edu",
                "password": "NewPassw0rd",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

// ── Calendar bookings ──

#[tokio::test]
async fn test_bookings_require_auth() {
    let (state, _) = test_state();

    let res = test_app(state)
        .oneshot(request("GET", "/api/calendar/bookings", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_organizer_booking_starts_pending() {
    let (state, _) = test_state();
    let (_, token) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (start, end) = future_range(7, 2);

    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&token),
            Some(booking_body(&start, &end, "Club meetup")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["status"], "pending");
    assert_eq!(json["isBlocked"], false);
}

#[tokio::test]
async fn test_staff_admin_booking_auto_approved() {
    let (state, _) = test_state();
    let (_, token) = seed_user(&state, "root", "root@example.edu", Role::StaffAdmin);
    let (start, end) = future_range(7, 2);

    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&token),
            Some(booking_body(&start, &end, "Faculty day")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["status"], "approved");
}

#[tokio::test]
async fn test_overlapping_approved_booking_conflicts() {
    let (state, _) = test_state();
    let (_, admin) = seed_user(&state, "root", "root@example.edu", Role::StaffAdmin);
    let (_, organizer) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (start, end) = future_range(7, 4);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&admin),
            Some(booking_body(&start, &end, "Faculty day")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&organizer),
            Some(booking_body(&start, &end, "Club meetup")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["conflicts"].as_array().unwrap().len(), 1);
    assert_eq!(json["conflicts"][0]["title"], "Faculty day");
}

#[tokio::test]
async fn test_pending_bookings_do_not_conflict() {
    let (state, _) = test_state();
    let (_, alice) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (_, bob) = seed_user(&state, "bob", "bob@example.edu", Role::Organizer);
    let (start, end) = future_range(7, 4);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&alice),
            Some(booking_body(&start, &end, "Club meetup")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Both requests land as pending; neither occupies the range yet
    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&bob),
            Some(booking_body(&start, &end, "Chess night")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_booking_rejects_inverted_range() {
    let (state, _) = test_state();
    let (_, token) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (start, end) = future_range(7, 2);

    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&token),
            Some(booking_body(&end, &start, "Backwards")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_check_availability() {
    let (state, _) = test_state();
    let (_, admin) = seed_user(&state, "root", "root@example.edu", Role::StaffAdmin);
    let (start, end) = future_range(7, 4);

    let res = test_app(state.clone())
        .oneshot(request(
            "GET",
            &format!("/api/calendar/check-availability?startDate={start}&endDate={end}"),
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["isAvailable"], true);

    test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&admin),
            Some(booking_body(&start, &end, "Faculty day")),
        ))
        .await
        .unwrap();

    let res = test_app(state)
        .oneshot(request(
            "GET",
            &format!("/api/calendar/check-availability?startDate={start}&endDate={end}"),
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json["isAvailable"], false);
    assert_eq!(json["conflicts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_block_dates_staff_admin_only() {
    let (state, _) = test_state();
    let (_, organizer) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (_, admin) = seed_user(&state, "root", "root@example.edu", Role::StaffAdmin);
    let (start, end) = future_range(10, 48);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/block-dates",
            Some(&organizer),
            Some(serde_json::json!({
                "startDate": start,
                "endDate": end,
                "reason": "Exam week",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/block-dates",
            Some(&admin),
            Some(serde_json::json!({
                "startDate": start,
                "endDate": end,
                "reason": "Exam week",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["status"], "blocked");
    assert_eq!(json["isBlocked"], true);
    assert_eq!(json["title"], "Blocked: Exam week");

    // The blocked range now conflicts with new bookings
    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&organizer),
            Some(booking_body(&start, &end, "Club meetup")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_booking_status_update_permissions() {
    let (state, _) = test_state();
    let (_, organizer) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (advisor_user_id, advisor) =
        seed_user(&state, "carol", "carol@example.edu", Role::StaffAdvisor);
    let (start, end) = future_range(7, 2);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&organizer),
            Some(booking_body(&start, &end, "Club meetup")),
        ))
        .await
        .unwrap();
    let booking = body_json(res).await;
    let id = booking["id"].as_str().unwrap().to_string();

    let res = test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/calendar/bookings/{id}/status"),
            Some(&organizer),
            Some(serde_json::json!({ "status": "approved" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/calendar/bookings/{id}/status"),
            Some(&advisor),
            Some(serde_json::json!({ "status": "approved" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"], "approved");
    assert_eq!(json["lastModifiedBy"], advisor_user_id);
}

#[tokio::test]
async fn test_booking_status_rejects_invalid_targets() {
    let (state, _) = test_state();
    let (_, organizer) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (_, advisor) = seed_user(&state, "carol", "carol@example.edu", Role::StaffAdvisor);
    let (start, end) = future_range(7, 2);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&organizer),
            Some(booking_body(&start, &end, "Club meetup")),
        ))
        .await
        .unwrap();
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    for target in ["blocked", "pending", "nonsense"] {
        let res = test_app(state.clone())
            .oneshot(request(
                "PUT",
                &format!("/api/calendar/bookings/{id}/status"),
                Some(&advisor),
                Some(serde_json::json!({ "status": target })),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "target {target}");
    }

    let res = test_app(state)
        .oneshot(request(
            "PUT",
            "/api/calendar/bookings/no-such-id/status",
            Some(&advisor),
            Some(serde_json::json!({ "status": "approved" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_approving_conflicting_pending_booking_fails() {
    let (state, _) = test_state();
    let (_, organizer) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (_, admin) = seed_user(&state, "root", "root@example.edu", Role::StaffAdmin);
    let (start, end) = future_range(7, 4);

    // Pending request first, then an approved booking lands on the same range
    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&organizer),
            Some(booking_body(&start, &end, "Club meetup")),
        ))
        .await
        .unwrap();
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&admin),
            Some(booking_body(&start, &end, "Faculty day")),
        ))
        .await
        .unwrap();

    let res = test_app(state)
        .oneshot(request(
            "PUT",
            &format!("/api/calendar/bookings/{id}/status"),
            Some(&admin),
            Some(serde_json::json!({ "status": "approved" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let json = body_json(res).await;
    assert_eq!(json["conflicts"][0]["title"], "Faculty day");
}

#[tokio::test]
async fn test_delete_booking_ownership_rules() {
    let (state, _) = test_state();
    let (_, alice) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (_, bob) = seed_user(&state, "bob", "bob@example.edu", Role::Organizer);
    let (_, admin) = seed_user(&state, "root", "root@example.edu", Role::StaffAdmin);
    let (start, end) = future_range(7, 2);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&alice),
            Some(booking_body(&start, &end, "Club meetup")),
        ))
        .await
        .unwrap();
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    // Another organizer cannot delete it
    let res = test_app(state.clone())
        .oneshot(request(
            "DELETE",
            &format!("/api/calendar/bookings/{id}"),
            Some(&bob),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The creator can while it is still pending
    let res = test_app(state.clone())
        .oneshot(request(
            "DELETE",
            &format!("/api/calendar/bookings/{id}"),
            Some(&alice),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Once approved, only staff admin may remove it
    let (start2, end2) = future_range(8, 2);
    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&alice),
            Some(booking_body(&start2, &end2, "Second meetup")),
        ))
        .await
        .unwrap();
    let id2 = body_json(res).await["id"].as_str().unwrap().to_string();
    test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/calendar/bookings/{id2}/status"),
            Some(&admin),
            Some(serde_json::json!({ "status": "approved" })),
        ))
        .await
        .unwrap();

    let res = test_app(state.clone())
        .oneshot(request(
            "DELETE",
            &format!("/api/calendar/bookings/{id2}"),
            Some(&alice),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test_app(state.clone())
        .oneshot(request(
            "DELETE",
            &format!("/api/calendar/bookings/{id2}"),
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(request(
            "DELETE",
            "/api/calendar/bookings/no-such-id",
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bookings_list_includes_creator_summary() {
    let (state, _) = test_state();
    let (alice_id, alice) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (start, end) = future_range(7, 2);

    test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/calendar/bookings",
            Some(&alice),
            Some(booking_body(&start, &end, "Club meetup")),
        ))
        .await
        .unwrap();

    let res = test_app(state)
        .oneshot(request("GET", "/api/calendar/bookings", Some(&alice), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["creator"]["id"], alice_id);
    assert_eq!(json[0]["creator"]["username"], "alice");
    assert!(json[0]["lastModifier"].is_null());
}

// ── Organizations ──

async fn create_org(
    state: &Arc<AppState>,
    token: &str,
    name: &str,
    president_id: &str,
    advisor_id: &str,
) -> (StatusCode, serde_json::Value) {
    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/organizations",
            Some(token),
            Some(serde_json::json!({
                "name": name,
                "presidentId": president_id,
                "staffAdvisorId": advisor_id,
            })),
        ))
        .await
        .unwrap();
    let status = res.status();
    (status, body_json(res).await)
}

#[tokio::test]
async fn test_organization_create_requires_staff_advisor() {
    let (state, sent) = test_state();
    let (president_id, organizer) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (advisor_id, advisor) = seed_user(&state, "carol", "carol@example.edu", Role::StaffAdvisor);

    let (status, _) = create_org(&state, &organizer, "Chess Club", &president_id, &advisor_id).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, json) =
        create_org(&state, &advisor, "Chess Club", &president_id, &advisor_id).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["name"], "Chess Club");
    assert_eq!(json["president"]["username"], "alice");
    assert_eq!(json["staffAdvisor"]["username"], "carol");

    let notes = sent.lock().unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].to.contains(&"alice@example.edu".to_string()));
}

#[tokio::test]
async fn test_organization_duplicate_name_rejected() {
    let (state, _) = test_state();
    let (president_id, _) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (advisor_id, advisor) = seed_user(&state, "carol", "carol@example.edu", Role::StaffAdvisor);

    let (status, _) = create_org(&state, &advisor, "Chess Club", &president_id, &advisor_id).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, json) =
        create_org(&state, &advisor, "Chess Club", &president_id, &advisor_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn test_organization_advisor_must_hold_role() {
    let (state, _) = test_state();
    let (president_id, _) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (other_id, _) = seed_user(&state, "bob", "bob@example.edu", Role::Organizer);
    let (_, advisor) = seed_user(&state, "carol", "carol@example.edu", Role::StaffAdvisor);

    let (status, json) = create_org(&state, &advisor, "Chess Club", &president_id, &other_id).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("staff advisor"));
}

#[tokio::test]
async fn test_organization_update_reports_changed_fields() {
    let (state, _) = test_state();
    let (president_id, _) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (advisor_id, advisor) = seed_user(&state, "carol", "carol@example.edu", Role::StaffAdvisor);

    let (_, org) = create_org(&state, &advisor, "Chess Club", &president_id, &advisor_id).await;
    let id = org["id"].as_str().unwrap().to_string();

    let res = test_app(state)
        .oneshot(request(
            "PUT",
            &format!("/api/organizations/{id}"),
            Some(&advisor),
            Some(serde_json::json!({ "name": "Chess Society" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["name"], "Chess Society");
    assert_eq!(json["changedFields"], serde_json::json!(["name"]));
}

#[tokio::test]
async fn test_organization_delete_cascades_events() {
    let (state, _) = test_state();
    let (president_id, _) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (advisor_id, advisor) = seed_user(&state, "carol", "carol@example.edu", Role::StaffAdvisor);

    let (_, org) = create_org(&state, &advisor, "Chess Club", &president_id, &advisor_id).await;
    let org_id = org["id"].as_str().unwrap().to_string();

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/events",
            Some(&advisor),
            Some(event_body(&org_id, "Blitz Night")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let event_id = body_json(res).await["id"].as_str().unwrap().to_string();

    let res = test_app(state.clone())
        .oneshot(request(
            "DELETE",
            &format!("/api/organizations/{org_id}"),
            Some(&advisor),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(request(
            "GET",
            &format!("/api/events/{event_id}"),
            Some(&advisor),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

// ── Events ──

fn event_body(org_id: &str, name: &str) -> serde_json::Value {
    let date = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(14))
        .unwrap();
    serde_json::json!({
        "organizationId": org_id,
        "name": name,
        "date": date.format("%Y-%m-%d").to_string(),
        "startTime": "09:00",
        "finishTime": "17:00",
        "timePeriod": "Full day",
        "president": "Alice",
        "proposalPath": "/uploads/proposal.pdf",
        "formPath": "/uploads/form.pdf",
        "mode": "Physical",
        "eventType": "Academic",
        "venue": "Main hall",
    })
}

async fn setup_org(state: &Arc<AppState>) -> (String, String, String) {
    let (president_id, _) = seed_user(state, "alice", "alice@example.edu", Role::Organizer);
    let (advisor_id, advisor) = seed_user(state, "carol", "carol@example.edu", Role::StaffAdvisor);
    let (_, org) = create_org(state, &advisor, "Chess Club", &president_id, &advisor_id).await;
    (org["id"].as_str().unwrap().to_string(), advisor, president_id)
}

#[tokio::test]
async fn test_event_create_and_fetch() {
    let (state, sent) = test_state();
    let (org_id, advisor, _) = setup_org(&state).await;

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/events",
            Some(&advisor),
            Some(event_body(&org_id, "Blitz Night")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["status"], "Pending");
    let id = json["id"].as_str().unwrap().to_string();

    // Registration notified the organization officers
    {
        let notes = sent.lock().unwrap();
        let last = notes.last().unwrap();
        assert!(last.subject.contains("Event registered"));
        assert!(last.to.contains(&"carol@example.edu".to_string()));
    }

    let res = test_app(state.clone())
        .oneshot(request("GET", &format!("/api/events/{id}"), Some(&advisor), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["name"], "Blitz Night");
    assert_eq!(json["organization"]["name"], "Chess Club");

    let res = test_app(state)
        .oneshot(request(
            "GET",
            &format!("/api/events/organization/{org_id}"),
            Some(&advisor),
            None,
        ))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_event_duplicate_name_within_organization() {
    let (state, _) = test_state();
    let (org_id, advisor, _) = setup_org(&state).await;

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/events",
            Some(&advisor),
            Some(event_body(&org_id, "Blitz Night")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Case-insensitive match
    let res = test_app(state)
        .oneshot(request(
            "POST",
            "/api/events",
            Some(&advisor),
            Some(event_body(&org_id, "blitz night")),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_rejects_past_date_and_bad_times() {
    let (state, _) = test_state();
    let (org_id, advisor, _) = setup_org(&state).await;

    let mut body = event_body(&org_id, "Blitz Night");
    body["date"] = serde_json::json!("2020-01-01");
    let res = test_app(state.clone())
        .oneshot(request("POST", "/api/events", Some(&advisor), Some(body)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mut body = event_body(&org_id, "Blitz Night");
    body["startTime"] = serde_json::json!("18:00");
    body["finishTime"] = serde_json::json!("09:00");
    let res = test_app(state)
        .oneshot(request("POST", "/api/events", Some(&advisor), Some(body)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_event_update_rejects_status_field() {
    let (state, _) = test_state();
    let (org_id, advisor, _) = setup_org(&state).await;

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/events",
            Some(&advisor),
            Some(event_body(&org_id, "Blitz Night")),
        ))
        .await
        .unwrap();
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    let res = test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/events/{id}"),
            Some(&advisor),
            Some(serde_json::json!({ "status": "Approved" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test_app(state)
        .oneshot(request(
            "PUT",
            &format!("/api/events/{id}"),
            Some(&advisor),
            Some(serde_json::json!({ "venue": "Auditorium" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["venue"], "Auditorium");
    assert_eq!(json["changedFields"], serde_json::json!(["venue"]));
}

#[tokio::test]
async fn test_event_status_update_owning_advisor_only() {
    let (state, _) = test_state();
    let (org_id, advisor, _) = setup_org(&state).await;
    let (_, other_advisor) = seed_user(&state, "dave", "dave@example.edu", Role::StaffAdvisor);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/events",
            Some(&advisor),
            Some(event_body(&org_id, "Blitz Night")),
        ))
        .await
        .unwrap();
    let id = body_json(res).await["id"].as_str().unwrap().to_string();

    let res = test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/events/{id}/status"),
            Some(&other_advisor),
            Some(serde_json::json!({ "status": "Approved" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test_app(state)
        .oneshot(request(
            "PUT",
            &format!("/api/events/{id}/status"),
            Some(&advisor),
            Some(serde_json::json!({ "status": "Approved" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["status"], "Approved");
}

// ── Crews ──

#[tokio::test]
async fn test_crew_lifecycle() {
    let (state, _) = test_state();
    let (_, token) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);

    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            "/api/crews",
            Some(&token),
            Some(serde_json::json!({
                "name": "Sound Crew",
                "workType": "Audio",
                "crewMembers": [{ "name": "Eve", "email": "eve@example.edu" }],
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    assert_eq!(json["status"], "active");
    assert_eq!(json["crewMembers"].as_array().unwrap().len(), 1);
    let id = json["id"].as_str().unwrap().to_string();

    // Add a member
    let res = test_app(state.clone())
        .oneshot(request(
            "POST",
            &format!("/api/crews/{id}/members"),
            Some(&token),
            Some(serde_json::json!({ "name": "Frank" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let json = body_json(res).await;
    let members = json["crewMembers"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    let member_id = members[1]["id"].as_str().unwrap().to_string();

    // Update the member
    let res = test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/crews/{id}/members/{member_id}"),
            Some(&token),
            Some(serde_json::json!({ "name": "Franklin", "phone": "555-0100" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["crewMembers"][1]["name"], "Franklin");

    // Remove the member
    let res = test_app(state.clone())
        .oneshot(request(
            "DELETE",
            &format!("/api/crews/{id}/members/{member_id}"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["crewMembers"].as_array().unwrap().len(), 1);

    // Unknown member is a 404
    let res = test_app(state.clone())
        .oneshot(request(
            "DELETE",
            &format!("/api/crews/{id}/members/{member_id}"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Status flips between active and inactive only
    let res = test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/crews/{id}/status"),
            Some(&token),
            Some(serde_json::json!({ "status": "inactive" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/crews/{id}/status"),
            Some(&token),
            Some(serde_json::json!({ "status": "disbanded" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test_app(state)
        .oneshot(request("DELETE", &format!("/api/crews/{id}"), Some(&token), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

// ── Users ──

#[tokio::test]
async fn test_user_update_and_delete() {
    let (state, _) = test_state();
    let (alice_id, token) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (bob_id, _) = seed_user(&state, "bob", "bob@example.edu", Role::Organizer);

    // Renaming onto an existing email is rejected
    let res = test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/users/{alice_id}"),
            Some(&token),
            Some(serde_json::json!({ "email": "bob@example.edu" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = test_app(state.clone())
        .oneshot(request(
            "PUT",
            &format!("/api/users/{alice_id}"),
            Some(&token),
            Some(serde_json::json!({ "username": "alicia" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let json = body_json(res).await;
    assert_eq!(json["username"], "alicia");

    let res = test_app(state.clone())
        .oneshot(request(
            "DELETE",
            &format!("/api/users/{bob_id}"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = test_app(state)
        .oneshot(request("GET", "/api/users", Some(&token), None))
        .await
        .unwrap();
    let json = body_json(res).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

// ── Notifications ──

#[tokio::test]
async fn test_request_succeeds_when_notification_sink_fails() {
    let state = failing_state();
    let (president_id, _) = seed_user(&state, "alice", "alice@example.edu", Role::Organizer);
    let (advisor_id, advisor) = seed_user(&state, "carol", "carol@example.edu", Role::StaffAdvisor);

    let (status, _) = create_org(&state, &advisor, "Chess Club", &president_id, &advisor_id).await;
    assert_eq!(status, StatusCode::CREATED);
}
