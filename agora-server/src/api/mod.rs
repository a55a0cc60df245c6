pub mod auth;
pub mod comments;
pub mod error;
pub mod extract;
pub mod posts;
pub mod users;

pub use error::{ApiError, ApiResult};
pub use extract::ApiJson;

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::state::AppState;

/// Build the full application router with its middleware stack
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Accounts
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(users::get_own_profile).put(users::update_profile),
        )
        // Users and the follow graph
        .route("/users/search", get(users::search_users))
        .route("/users/:username", get(users::get_user))
        .route("/users/:username/posts", get(users::get_user_posts))
        .route(
            "/users/:username/follow",
            get(users::get_follow_status)
                .post(users::follow_user)
                .delete(users::unfollow_user),
        )
        .route("/users/:username/followers", get(users::get_followers))
        .route("/users/:username/following", get(users::get_following))
        // Posts
        .route("/posts", post(posts::create_post))
        .route(
            "/posts/:post_id",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/posts/:post_id/like",
            get(posts::get_like_status)
                .post(posts::like_post)
                .delete(posts::unlike_post),
        )
        .route(
            "/posts/:post_id/comments",
            post(comments::add_comment).get(comments::get_comments),
        )
        .route(
            "/posts/:post_id/comments/:comment_id",
            axum::routing::delete(comments::delete_comment),
        )
        .route("/feed", get(posts::get_feed))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}
