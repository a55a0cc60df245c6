use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use agora_types::Post;

use super::{from_repo, ServiceError, ServiceResult};
use crate::db::repositories::{timestamp_now, PostStore, UserStore};
use crate::validation;

pub struct PostService {
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserStore>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostStore>, users: Arc<dyn UserStore>) -> Self {
        Self { posts, users }
    }

    #[instrument(skip(self, content))]
    pub fn create_post(
        &self,
        author_id: &Uuid,
        content: &str,
        image_url: Option<String>,
    ) -> ServiceResult<Post> {
        validation::validate_post_content(content)?;
        validation::validate_image_url(image_url.as_deref())?;

        let now = timestamp_now();
        let post = Post {
            id: Uuid::new_v4(),
            author_id: *author_id,
            content: content.to_string(),
            image_url,
            created_at: now,
            updated_at: now,
        };
        self.posts.create(&post).map_err(from_repo("create post"))?;

        tracing::debug!(post_id = %post.id, "Created post");
        Ok(post)
    }

    #[instrument(skip(self))]
    pub fn get_post_by_id(&self, post_id: &Uuid) -> ServiceResult<Post> {
        self.posts.get_by_id(post_id).map_err(from_repo("get post"))
    }

    #[instrument(skip(self))]
    pub fn get_posts_by_user(
        &self,
        username: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<Vec<Post>> {
        let author = self
            .users
            .get_by_username(username)
            .map_err(from_repo("get user by username"))?;
        self.posts
            .get_by_author(&author.id, limit, offset)
            .map_err(from_repo("get posts by user"))
    }

    /// Load a post and make sure `requester_id` wrote it.
    fn owned_post(&self, post_id: &Uuid, requester_id: &Uuid) -> ServiceResult<Post> {
        let post = self
            .posts
            .get_by_id(post_id)
            .map_err(from_repo("get post"))?;
        if post.author_id != *requester_id {
            tracing::warn!(%post_id, %requester_id, "Rejected change to another user's post");
            return Err(ServiceError::Unauthorized);
        }
        Ok(post)
    }

    /// Replace the content; the image URL is replaced only when one is given.
    #[instrument(skip(self, content))]
    pub fn update_post(
        &self,
        post_id: &Uuid,
        requester_id: &Uuid,
        content: &str,
        image_url: Option<String>,
    ) -> ServiceResult<Post> {
        let mut post = self.owned_post(post_id, requester_id)?;

        post.content = content.to_string();
        if image_url.is_some() {
            post.image_url = image_url;
        }

        validation::validate_post_content(&post.content)?;
        validation::validate_image_url(post.image_url.as_deref())?;

        post.updated_at = timestamp_now();
        self.posts.update(&post).map_err(from_repo("update post"))?;
        Ok(post)
    }

    #[instrument(skip(self))]
    pub fn delete_post(&self, post_id: &Uuid, requester_id: &Uuid) -> ServiceResult<()> {
        self.owned_post(post_id, requester_id)?;
        self.posts.delete(post_id).map_err(from_repo("delete post"))?;
        tracing::debug!(%post_id, "Deleted post");
        Ok(())
    }

    #[instrument(skip(self))]
    pub fn get_feed(&self, user_id: &Uuid, limit: u32, offset: u32) -> ServiceResult<Vec<Post>> {
        self.posts
            .get_feed(user_id, limit, offset)
            .map_err(from_repo("get feed"))
    }
}
