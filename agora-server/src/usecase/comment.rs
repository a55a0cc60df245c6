use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use agora_types::Comment;

use super::{from_repo, ServiceError, ServiceResult};
use crate::db::repositories::{timestamp_now, CommentStore, PostStore};
use crate::validation;

pub struct CommentService {
    comments: Arc<dyn CommentStore>,
    posts: Arc<dyn PostStore>,
}

impl CommentService {
    pub fn new(comments: Arc<dyn CommentStore>, posts: Arc<dyn PostStore>) -> Self {
        Self { comments, posts }
    }

    fn ensure_post_exists(&self, post_id: &Uuid) -> ServiceResult<()> {
        self.posts
            .get_by_id(post_id)
            .map(|_| ())
            .map_err(from_repo("get post"))
    }

    #[instrument(skip(self, content))]
    pub fn add_comment(
        &self,
        post_id: &Uuid,
        author_id: &Uuid,
        content: &str,
    ) -> ServiceResult<Comment> {
        self.ensure_post_exists(post_id)?;
        validation::validate_comment_content(content)?;

        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: *post_id,
            author_id: *author_id,
            content: content.to_string(),
            created_at: timestamp_now(),
        };
        self.comments
            .create(&comment)
            .map_err(from_repo("create comment"))?;
        Ok(comment)
    }

    #[instrument(skip(self))]
    pub fn get_comments(
        &self,
        post_id: &Uuid,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<Vec<Comment>> {
        self.ensure_post_exists(post_id)?;
        self.comments
            .get_by_post(post_id, limit, offset)
            .map_err(from_repo("get comments"))
    }

    /// Only the comment's author may delete it.
    #[instrument(skip(self))]
    pub fn delete_comment(&self, comment_id: &Uuid, requester_id: &Uuid) -> ServiceResult<()> {
        let comment = self
            .comments
            .get_by_id(comment_id)
            .map_err(from_repo("get comment"))?;
        if comment.author_id != *requester_id {
            tracing::warn!(%comment_id, %requester_id, "Rejected deletion of another user's comment");
            return Err(ServiceError::Unauthorized);
        }
        self.comments
            .delete(comment_id)
            .map_err(from_repo("delete comment"))
    }
}
