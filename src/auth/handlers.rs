use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginData, LoginRequest},
        extractors::AuthUser,
        jwt::JwtKeys,
    },
    error::{ApiError, ErrorBody},
    response::ApiResponse,
    state::AppState,
    users::{
        dto::{CreateUserRequest, UserView},
        services,
    },
    validation::ValidatedJson,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), Response> {
    let user = services::register(&state, payload).await.map_err(|e| {
        match e {
            // registration reports duplicates as a conflict; the user CRUD
            // boundary keeps them at 400
            ApiError::DuplicateEmail => (
                StatusCode::CONFLICT,
                Json(ErrorBody::new(
                    "Duplicate email",
                    "Email address already exists",
                )),
            )
                .into_response(),
            other => other.into_response(),
        }
    })?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            UserView::from(user),
            "User registered successfully",
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginData>>, ApiError> {
    let user = services::authenticate(&state, &payload.email, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(ApiResponse::ok(
        LoginData {
            token,
            user: user.into(),
        },
        "Login successful",
    )))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = services::get_user(&state, user_id).await?;
    Ok(Json(ApiResponse::ok(
        user.into(),
        "User retrieved successfully",
    )))
}
