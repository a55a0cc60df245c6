use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use uuid::Uuid;

use agora_types::{CommentResponse, CommentsResponse, CreateCommentRequest, PageQuery};

use super::auth::require_user;
use super::posts::parse_post_id;
use super::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;

/// POST /posts/:post_id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
    ApiJson(payload): ApiJson<CreateCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let author_id = require_user(&state, &headers)?;
    let post_id = parse_post_id(&post_id)?;
    let comment = state
        .comments
        .add_comment(&post_id, &author_id, &payload.content)?;
    Ok((StatusCode::CREATED, Json(CommentResponse { comment })))
}

/// GET /posts/:post_id/comments - Oldest first
pub async fn get_comments(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(post_id): Path<String>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<CommentsResponse>> {
    require_user(&state, &headers)?;
    let post_id = parse_post_id(&post_id)?;
    let page = query.pagination();
    let comments = state
        .comments
        .get_comments(&post_id, page.limit, page.offset)?;
    Ok(Json(CommentsResponse { comments }))
}

/// DELETE /posts/:post_id/comments/:comment_id - Author-only delete
pub async fn delete_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let requester_id = require_user(&state, &headers)?;
    parse_post_id(&post_id)?;
    let comment_id = Uuid::parse_str(&comment_id)
        .map_err(|_| ApiError::BadRequest("Invalid comment ID".to_string()))?;
    state.comments.delete_comment(&comment_id, &requester_id)?;
    Ok(StatusCode::NO_CONTENT)
}
