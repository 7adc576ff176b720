use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch},
    Json, Router,
};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    error::ApiError,
    response::ApiResponse,
    state::AppState,
    users::{
        dto::{CreateUserRequest, UpdateUserRequest, UserView},
        services,
    },
    validation::ValidatedJson,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/search", get(search_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/toggle-status", patch(toggle_user_status))
        .route("/users/:id/permanent", delete(permanently_delete_user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<UserView>>>, ApiError> {
    let users = services::list_users(&state).await?;
    let views: Vec<UserView> = users.into_iter().map(UserView::from).collect();
    Ok(Json(ApiResponse::list(
        views,
        "Users retrieved successfully",
    )))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = services::get_user(&state, id).await?;
    Ok(Json(ApiResponse::ok(
        user.into(),
        "User retrieved successfully",
    )))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ApiError> {
    let user = services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(user.into(), "User created successfully")),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = services::update_user(&state, id, payload).await?;
    Ok(Json(ApiResponse::ok(
        user.into(),
        "User updated successfully",
    )))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    services::delete_user(&state, id).await?;
    Ok(Json(ApiResponse::message_only("User deleted successfully")))
}

/// Flips the active flag on any user, soft-deleted ones included.
#[instrument(skip(state))]
pub async fn toggle_user_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = services::toggle_user_status(&state, id).await?;
    Ok(Json(ApiResponse::ok(
        user.into(),
        "User status updated successfully",
    )))
}

#[instrument(skip(state))]
pub async fn permanently_delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    services::permanently_delete_user(&state, id).await?;
    Ok(Json(ApiResponse::message_only(
        "User permanently deleted",
    )))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[instrument(skip(state))]
pub async fn search_users(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<Vec<UserView>>>, ApiError> {
    let q = params.q.unwrap_or_default();
    let users = services::search_users(&state, &q).await?;
    let views: Vec<UserView> = users.into_iter().map(UserView::from).collect();
    Ok(Json(ApiResponse::list(
        views,
        &format!("Search results for: {}", q),
    )))
}
