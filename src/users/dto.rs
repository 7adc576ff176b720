use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::users::repo::User;

/// Request body for creating a user (registration and admin create).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"),
        custom(
            function = "crate::validation::validate_name_chars",
            message = "Name can only contain letters and spaces"
        )
    )]
    pub name: String,
    #[validate(
        email(message = "Not a valid email address"),
        length(max = 120, message = "Email must be at most 120 characters"),
        custom(
            function = "crate::validation::validate_email_format",
            message = "Invalid email format"
        )
    )]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters long"))]
    pub password: String,
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: Option<i32>,
}

/// Partial update; absent fields leave the stored values untouched.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"),
        custom(
            function = "crate::validation::validate_name_chars",
            message = "Name can only contain letters and spaces"
        )
    )]
    pub name: Option<String>,
    #[validate(
        email(message = "Not a valid email address"),
        length(max = 120, message = "Email must be at most 120 characters"),
        custom(
            function = "crate::validation::validate_email_format",
            message = "Invalid email format"
        )
    )]
    pub email: Option<String>,
    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters long"))]
    pub password: Option<String>,
    #[validate(range(min = 1, max = 150, message = "Age must be between 1 and 150"))]
    pub age: Option<i32>,
    pub is_active: Option<bool>,
}

/// Public part of the user returned to clients; the password hash never
/// leaves the service.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: Option<i32>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_create() -> serde_json::Value {
        serde_json::json!({
            "name": "Ann Lee",
            "email": "ann@x.com",
            "password": "secret1",
            "age": 30
        })
    }

    #[test]
    fn create_request_accepts_valid_input() {
        let req: CreateUserRequest = serde_json::from_value(valid_create()).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_collects_every_field_error() {
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "A1",
            "email": "not-an-email",
            "password": "short",
            "age": 200
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("age"));
    }

    #[test]
    fn create_request_rejects_email_failing_the_explicit_pattern() {
        // passes the general syntax check, fails the pattern pass
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "Ann Lee",
            "email": "ann@example.c",
            "password": "secret1"
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn create_request_age_is_optional() {
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "Ann Lee",
            "email": "ann@x.com",
            "password": "secret1"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.age, None);
    }

    #[test]
    fn update_request_allows_empty_payload() {
        let req: UpdateUserRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_request_checks_present_fields() {
        let req: UpdateUserRequest = serde_json::from_value(serde_json::json!({
            "name": "x",
            "age": 0
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("age"));
    }

    #[test]
    fn user_view_never_serializes_a_password() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ann Lee".into(),
            email: "ann@x.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$digest".into(),
            age: Some(30),
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(UserView::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "ann@x.com");
    }

    #[test]
    fn user_row_serialization_skips_the_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ann Lee".into(),
            email: "ann@x.com".into(),
            password_hash: "secret-digest".into(),
            age: None,
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
