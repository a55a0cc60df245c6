use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use agora_types::{Follow, Like, User};

use super::{from_repo, ServiceError, ServiceResult};
use crate::db::repositories::{timestamp_now, FollowStore, LikeStore, PostStore, UserStore};

/// Likes and follows
pub struct InteractionService {
    likes: Arc<dyn LikeStore>,
    follows: Arc<dyn FollowStore>,
    posts: Arc<dyn PostStore>,
    users: Arc<dyn UserStore>,
}

impl InteractionService {
    pub fn new(
        likes: Arc<dyn LikeStore>,
        follows: Arc<dyn FollowStore>,
        posts: Arc<dyn PostStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            likes,
            follows,
            posts,
            users,
        }
    }

    /// Liking twice is not an error.
    #[instrument(skip(self))]
    pub fn like_post(&self, post_id: &Uuid, user_id: &Uuid) -> ServiceResult<()> {
        self.posts
            .get_by_id(post_id)
            .map_err(from_repo("get post"))?;
        self.likes
            .create(&Like {
                user_id: *user_id,
                post_id: *post_id,
                created_at: timestamp_now(),
            })
            .map_err(from_repo("like post"))
    }

    #[instrument(skip(self))]
    pub fn unlike_post(&self, post_id: &Uuid, user_id: &Uuid) -> ServiceResult<()> {
        self.likes
            .delete(user_id, post_id)
            .map_err(from_repo("unlike post"))
    }

    #[instrument(skip(self))]
    pub fn has_liked(&self, post_id: &Uuid, user_id: &Uuid) -> ServiceResult<bool> {
        self.likes
            .exists(user_id, post_id)
            .map_err(from_repo("check like"))
    }

    /// `follower_id` starts following `user_id`. Following twice is not an error.
    #[instrument(skip(self))]
    pub fn follow_user(&self, user_id: &Uuid, follower_id: &Uuid) -> ServiceResult<()> {
        if user_id == follower_id {
            return Err(ServiceError::CannotFollowSelf);
        }
        self.users
            .get_by_id(user_id)
            .map_err(from_repo("get user to follow"))?;
        self.follows
            .create(&Follow {
                user_id: *user_id,
                follower_id: *follower_id,
                created_at: timestamp_now(),
            })
            .map_err(from_repo("follow user"))
    }

    #[instrument(skip(self))]
    pub fn unfollow_user(&self, user_id: &Uuid, follower_id: &Uuid) -> ServiceResult<()> {
        self.follows
            .delete(user_id, follower_id)
            .map_err(from_repo("unfollow user"))
    }

    #[instrument(skip(self))]
    pub fn is_following(&self, user_id: &Uuid, follower_id: &Uuid) -> ServiceResult<bool> {
        self.follows
            .exists(user_id, follower_id)
            .map_err(from_repo("check follow"))
    }

    #[instrument(skip(self))]
    pub fn get_followers(
        &self,
        username: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<Vec<User>> {
        let user = self
            .users
            .get_by_username(username)
            .map_err(from_repo("get user by username"))?;
        let followers = self
            .follows
            .get_followers(&user.id, limit, offset)
            .map_err(from_repo("get followers"))?;
        Ok(followers.into_iter().map(User::scrubbed).collect())
    }

    #[instrument(skip(self))]
    pub fn get_following(
        &self,
        username: &str,
        limit: u32,
        offset: u32,
    ) -> ServiceResult<Vec<User>> {
        let user = self
            .users
            .get_by_username(username)
            .map_err(from_repo("get user by username"))?;
        let following = self
            .follows
            .get_following(&user.id, limit, offset)
            .map_err(from_repo("get following"))?;
        Ok(following.into_iter().map(User::scrubbed).collect())
    }
}
