use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{CurrentUser, LoginRequest, LoginResponse, PublicUser, RegisterRequest, StatusMessage},
        extractors::AuthUser,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users/test", get(status))
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/current", get(current))
}

pub async fn status() -> Json<StatusMessage> {
    Json(StatusMessage { msg: "Users works!" })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<PublicUser>, AppError> {
    let user = services::register(&state, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let token = services::login(&state, payload).await?;
    Ok(Json(LoginResponse {
        success: true,
        token,
    }))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn current(AuthUser(user): AuthUser) -> Json<CurrentUser> {
    Json(CurrentUser {
        id: user.id,
        name: user.name,
        email: user.email,
    })
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use time::{Duration as TimeDuration, OffsetDateTime};
    use tower::ServiceExt;

    use crate::{app::build_app, auth::claims::Claims, state::AppState};

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_with_auth(uri: &str, auth: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri(uri);
        if let Some(a) = auth {
            req = req.header(header::AUTHORIZATION, a);
        }
        req.body(Body::empty()).unwrap()
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn ann() -> Value {
        json!({ "name": "Ann", "email": "ann@x.com", "password": "secret1" })
    }

    #[tokio::test]
    async fn test_route_reports_status() {
        let app = build_app(AppState::fake());
        let resp = app.oneshot(get_with_auth("/api/users/test", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({ "msg": "Users works!" }));
    }

    #[tokio::test]
    async fn register_login_current_scenario() {
        let state = AppState::fake();
        let app = build_app(state.clone());

        let resp = app
            .clone()
            .oneshot(post_json("/api/users/register", ann()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let registered = body_json(resp).await;
        assert_eq!(registered["name"], "Ann");
        assert_eq!(registered["email"], "ann@x.com");
        assert!(registered.get("password").is_none());
        assert!(registered.get("password_hash").is_none());

        let stored = state
            .users
            .find_by_email("ann@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "secret1");

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/users/login",
                json!({ "email": "ann@x.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let login = body_json(resp).await;
        assert_eq!(login["success"], true);
        let token = login["token"].as_str().unwrap().to_string();
        assert!(token.starts_with("Bearer "));

        let resp = app
            .clone()
            .oneshot(get_with_auth("/api/users/current", Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({ "id": registered["id"], "name": "Ann", "email": "ann@x.com" })
        );

        let resp = app
            .oneshot(post_json(
                "/api/users/login",
                json!({ "email": "ann@x.com", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({ "password": "Password incorrect!" })
        );
    }

    #[tokio::test]
    async fn duplicate_registration_is_400_with_email_message() {
        let app = build_app(AppState::fake());
        let first = app
            .clone()
            .oneshot(post_json("/api/users/register", ann()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let resp = app
            .oneshot(post_json("/api/users/register", ann()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({ "email": "The email, ann@x.com, already exists!" })
        );
    }

    #[tokio::test]
    async fn unknown_email_is_404() {
        let app = build_app(AppState::fake());
        let resp = app
            .oneshot(post_json(
                "/api/users/login",
                json!({ "email": "nobody@x.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await, json!({ "email": "User not found!" }));
    }

    #[tokio::test]
    async fn unknown_email_of_any_shape_is_404() {
        let app = build_app(AppState::fake());
        for email in ["bob@localhost", "not-an-email", ""] {
            let resp = app
                .clone()
                .oneshot(post_json(
                    "/api/users/login",
                    json!({ "email": email, "password": "secret1" }),
                ))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "email = {email:?}");
            assert_eq!(body_json(resp).await, json!({ "email": "User not found!" }));
        }
    }

    #[tokio::test]
    async fn long_passphrase_round_trip() {
        let app = build_app(AppState::fake());
        let passphrase = "correct horse battery staple 42, and a few more words for good measure";

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/users/register",
                json!({ "name": "Ann", "email": "ann@x.com", "password": passphrase }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/users/login",
                json!({ "email": "ann@x.com", "password": passphrase }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let token = body_json(resp).await["token"].as_str().unwrap().to_string();

        let resp = app
            .oneshot(get_with_auth("/api/users/current", Some(&token)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_login_password_is_password_incorrect() {
        let app = build_app(AppState::fake());
        app.clone()
            .oneshot(post_json("/api/users/register", ann()))
            .await
            .unwrap();

        let resp = app
            .oneshot(post_json(
                "/api/users/login",
                json!({ "email": "ann@x.com", "password": "" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({ "password": "Password incorrect!" })
        );
    }

    #[tokio::test]
    async fn register_without_name_is_field_scoped() {
        let app = build_app(AppState::fake());
        let resp = app
            .oneshot(post_json(
                "/api/users/register",
                json!({ "email": "ann@x.com", "password": "secret1" }),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({ "name": "Name field is required" })
        );
    }

    #[tokio::test]
    async fn current_rejects_missing_malformed_and_foreign_tokens() {
        let app = build_app(AppState::fake());

        for auth in [
            None,
            Some("Bearer"),
            Some("Basic dXNlcjpwYXNz"),
            Some("Bearer not.a.jwt"),
        ] {
            let resp = app
                .clone()
                .oneshot(get_with_auth("/api/users/current", auth))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "auth = {auth:?}");
        }
    }

    #[tokio::test]
    async fn current_rejects_expired_token() {
        let state = AppState::fake();
        let app = build_app(state.clone());
        app.clone()
            .oneshot(post_json("/api/users/register", ann()))
            .await
            .unwrap();
        let user = state
            .users
            .find_by_email("ann@x.com")
            .await
            .unwrap()
            .unwrap();

        let issued = OffsetDateTime::now_utc() - TimeDuration::seconds(3601);
        let claims = Claims {
            sub: user.id,
            name: user.name.clone(),
            avatar: user.avatar.clone(),
            iat: issued.unix_timestamp() as usize,
            exp: (issued + TimeDuration::seconds(3600)).unix_timestamp() as usize,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(state.config.jwt.secret.as_bytes()),
        )
        .unwrap();

        let resp = app
            .oneshot(get_with_auth(
                "/api/users/current",
                Some(&format!("Bearer {token}")),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn current_rejects_token_for_unknown_user() {
        let state = AppState::fake();
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: uuid::Uuid::new_v4(),
            name: "Ghost".into(),
            avatar: String::new(),
            iat: now.unix_timestamp() as usize,
            exp: (now + TimeDuration::seconds(3600)).unix_timestamp() as usize,
        };
        let token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(state.config.jwt.secret.as_bytes()),
        )
        .unwrap();

        let resp = build_app(state)
            .oneshot(get_with_auth(
                "/api/users/current",
                Some(&format!("Bearer {token}")),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
