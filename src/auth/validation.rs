use std::collections::BTreeMap;

use crate::auth::dto::RegisterRequest;
use crate::error::AppError;

/// Registration needs all three fields present. Length and format are not
/// checked; login is not validated at all, so its outcomes stay
/// `UserNotFound` / `InvalidPassword`.
pub fn validate_register(req: &RegisterRequest) -> Result<(), AppError> {
    let mut errors = BTreeMap::new();

    if req.name.trim().is_empty() {
        errors.insert("name", "Name field is required".to_string());
    }
    if req.email.trim().is_empty() {
        errors.insert("email", "Email field is required".to_string());
    }
    if req.password.is_empty() {
        errors.insert("password", "Password field is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
