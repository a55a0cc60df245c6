use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};

use agora_types::{
    FollowStatusResponse, PageQuery, PostsResponse, SearchQuery, UpdateProfileRequest,
    UserResponse, UsersResponse,
};

use super::auth::require_user;
use super::{ApiJson, ApiResult};
use crate::state::AppState;

/// GET /users/search?q= - Find users by name or username
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<UsersResponse>> {
    let page = query.pagination();
    let term = query.q.as_deref().unwrap_or_default();
    let users = state.users.search_users(term, page.limit, page.offset)?;
    Ok(Json(UsersResponse { users }))
}

/// GET /users/:username - Public profile
pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.get_profile(&username)?;
    Ok(Json(UserResponse { user }))
}

/// GET /users/:username/posts - Posts by a user, newest first
pub async fn get_user_posts(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<PostsResponse>> {
    let page = query.pagination();
    let posts = state
        .posts
        .get_posts_by_user(&username, page.limit, page.offset)?;
    Ok(Json(PostsResponse { posts }))
}

/// GET /profile - The requester's own profile
pub async fn get_own_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<UserResponse>> {
    let user_id = require_user(&state, &headers)?;
    let user = state.users.get_user_by_id(&user_id)?;
    Ok(Json(UserResponse { user }))
}

/// PUT /profile - Update name, bio or image URL
pub async fn update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(payload): ApiJson<UpdateProfileRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = require_user(&state, &headers)?;
    let user = state
        .users
        .update_profile(&user_id, payload.name, payload.bio, payload.image_url)?;
    Ok(Json(UserResponse { user }))
}

/// POST /users/:username/follow
pub async fn follow_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> ApiResult<StatusCode> {
    let follower_id = require_user(&state, &headers)?;
    let target = state.users.get_profile(&username)?;
    state.interactions.follow_user(&target.id, &follower_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /users/:username/follow
pub async fn unfollow_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> ApiResult<StatusCode> {
    let follower_id = require_user(&state, &headers)?;
    let target = state.users.get_profile(&username)?;
    state.interactions.unfollow_user(&target.id, &follower_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /users/:username/follow - Whether the requester follows the user
pub async fn get_follow_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
) -> ApiResult<Json<FollowStatusResponse>> {
    let follower_id = require_user(&state, &headers)?;
    let target = state.users.get_profile(&username)?;
    let following = state.interactions.is_following(&target.id, &follower_id)?;
    Ok(Json(FollowStatusResponse { following }))
}

/// GET /users/:username/followers
pub async fn get_followers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<UsersResponse>> {
    require_user(&state, &headers)?;
    let page = query.pagination();
    let users = state
        .interactions
        .get_followers(&username, page.limit, page.offset)?;
    Ok(Json(UsersResponse { users }))
}

/// GET /users/:username/following
pub async fn get_following(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<UsersResponse>> {
    require_user(&state, &headers)?;
    let page = query.pagination();
    let users = state
        .interactions
        .get_following(&username, page.limit, page.offset)?;
    Ok(Json(UsersResponse { users }))
}
