use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use agora_types::{
    CreatePostRequest, LikeStatusResponse, PageQuery, PostResponse, PostsResponse,
    UpdatePostRequest,
};

use super::auth::require_user;
use super::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;

pub(crate) fn parse_post_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid post ID".to_string()))
}

/// POST /posts - Create a new post
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<CreatePostRequest>,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    let author_id = require_user(&state, &headers)?;
    let post = state
        .posts
        .create_post(&author_id, &payload.content, payload.image_url)?;
    Ok((StatusCode::CREATED, Json(PostResponse { post })))
}

/// GET /posts/:post_id
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> ApiResult<Json<PostResponse>> {
    let post_id = parse_post_id(&post_id)?;
    let post = state.posts.get_post_by_id(&post_id)?;
    Ok(Json(PostResponse { post }))
}

/// PUT /posts/:post_id - Author-only edit
pub async fn update_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
    ApiJson(payload): ApiJson<UpdatePostRequest>,
) -> ApiResult<Json<PostResponse>> {
    let requester_id = require_user(&state, &headers)?;
    let post_id = parse_post_id(&post_id)?;
    let post = state
        .posts
        .update_post(&post_id, &requester_id, &payload.content, payload.image_url)?;
    Ok(Json(PostResponse { post }))
}

/// DELETE /posts/:post_id - Author-only delete
pub async fn delete_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
) -> ApiResult<StatusCode> {
    let requester_id = require_user(&state, &headers)?;
    let post_id = parse_post_id(&post_id)?;
    state.posts.delete_post(&post_id, &requester_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /feed - Posts from followed accounts, newest first
pub async fn get_feed(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<PostsResponse>> {
    let user_id = require_user(&state, &headers)?;
    let page = query.pagination();
    let posts = state.posts.get_feed(&user_id, page.limit, page.offset)?;
    Ok(Json(PostsResponse { posts }))
}

/// POST /posts/:post_id/like
pub async fn like_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = require_user(&state, &headers)?;
    let post_id = parse_post_id(&post_id)?;
    state.interactions.like_post(&post_id, &user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /posts/:post_id/like
pub async fn unlike_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
) -> ApiResult<StatusCode> {
    let user_id = require_user(&state, &headers)?;
    let post_id = parse_post_id(&post_id)?;
    state.interactions.unlike_post(&post_id, &user_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /posts/:post_id/like - Whether the requester likes the post
pub async fn get_like_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
) -> ApiResult<Json<LikeStatusResponse>> {
    let user_id = require_user(&state, &headers)?;
    let post_id = parse_post_id(&post_id)?;
    let liked = state.interactions.has_liked(&post_id, &user_id)?;
    Ok(Json(LikeStatusResponse { liked }))
}
