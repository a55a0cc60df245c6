use std::sync::Arc;

use chrono::Duration;

use crate::db::repositories::{
    CommentRepository, FollowRepository, LikeRepository, PostRepository, UserRepository,
};
use crate::db::Database;
use crate::password::PasswordHasher;
use crate::session::SessionManager;
use crate::usecase::{CommentService, InteractionService, PostService, UserService};

#[derive(Clone)]
pub struct AppState {
    pub session_manager: SessionManager,
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub comments: Arc<CommentService>,
    pub interactions: Arc<InteractionService>,
}

impl AppState {
    /// Wire every service to the SQLite repositories behind `db`.
    pub fn new(db: Database, session_ttl: Duration, hasher: PasswordHasher) -> Self {
        let session_manager = SessionManager::new(db.clone(), session_ttl);

        let user_repo = Arc::new(UserRepository::new(db.pool.clone()));
        let post_repo = Arc::new(PostRepository::new(db.pool.clone()));
        let comment_repo = Arc::new(CommentRepository::new(db.pool.clone()));
        let like_repo = Arc::new(LikeRepository::new(db.pool.clone()));
        let follow_repo = Arc::new(FollowRepository::new(db.pool.clone()));

        Self {
            users: Arc::new(UserService::new(
                user_repo.clone(),
                Arc::new(session_manager.clone()),
                hasher,
            )),
            posts: Arc::new(PostService::new(post_repo.clone(), user_repo.clone())),
            comments: Arc::new(CommentService::new(comment_repo, post_repo.clone())),
            interactions: Arc::new(InteractionService::new(
                like_repo,
                follow_repo,
                post_repo,
                user_repo,
            )),
            session_manager,
        }
    }
}
