use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::users::dto::UserView;

/// Request body for login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Not a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: UserView,
}
