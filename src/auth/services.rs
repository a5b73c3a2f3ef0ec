use axum::extract::FromRef;
use tracing::{info, warn};

use crate::{
    auth::{
        avatar::{gravatar_url, AvatarOptions},
        dto::{LoginRequest, RegisterRequest},
        jwt::{JwtKeys, BEARER_PREFIX},
        repo_types::{NewUser, User},
        validation::validate_register,
    },
    error::AppError,
    state::AppState,
};

/// Creates an account. Fails with `DuplicateEmail` if the email is taken,
/// including when a concurrent registration wins the insert.
pub async fn register(state: &AppState, req: RegisterRequest) -> Result<User, AppError> {
    validate_register(&req)?;
    // Stored and echoed exactly as sent; uniqueness is case-sensitive.
    let email = req.email;

    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateEmail(email));
    }

    let avatar = gravatar_url(&email, AvatarOptions::default());
    let password_hash = state.hasher.hash_blocking_pool(req.password).await?;

    let user = state
        .users
        .create(NewUser {
            name: req.name,
            email,
            password_hash,
            avatar,
        })
        .await
        .map_err(|e| {
            let e = AppError::from(e);
            if let AppError::DuplicateEmail(ref email) = e {
                warn!(email = %email, "email registered concurrently");
            }
            e
        })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(user)
}

/// Verifies credentials and returns a `Bearer <jwt>` string.
pub async fn login(state: &AppState, req: LoginRequest) -> Result<String, AppError> {
    let email = req.email.as_str();

    let Some(user) = state.users.find_by_email(email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::UserNotFound);
    };

    let ok = state
        .hasher
        .verify_blocking_pool(req.password, user.password_hash.clone())
        .await?;
    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidPassword);
    }

    let token = JwtKeys::from_ref(state).sign(&user)?;
    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(format!("{BEARER_PREFIX}{token}"))
}
