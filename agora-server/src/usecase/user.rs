use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use agora_types::User;

use super::{from_repo, ServiceError, ServiceResult};
use crate::db::repositories::{timestamp_now, UserStore};
use crate::db::{RepoError, RepoResult};
use crate::password::PasswordHasher;
use crate::validation;

/// Issues the opaque token handed back by a successful login.
pub trait TokenIssuer: Send + Sync {
    fn issue_token(&self, user_id: Uuid) -> anyhow::Result<String>;
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub token: String,
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenIssuer>,
    hasher: PasswordHasher,
}

/// Turn a lookup hit into `taken`; a miss means the value is free.
fn ensure_available(
    lookup: RepoResult<User>,
    taken: ServiceError,
    context: &'static str,
) -> ServiceResult<()> {
    match lookup {
        Ok(_) => Err(taken),
        Err(RepoError::NotFound) => Ok(()),
        Err(err) => Err(ServiceError::internal(context, err)),
    }
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: Arc<dyn TokenIssuer>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            tokens,
            hasher,
        }
    }

    #[instrument(skip(self, password))]
    pub fn register(
        &self,
        name: &str,
        username: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<User> {
        validation::validate_profile(name, username, email, None, None)?;
        validation::validate_password(password)?;

        ensure_available(
            self.users.get_by_email(email),
            ServiceError::DuplicateEmail,
            "check email availability",
        )?;
        ensure_available(
            self.users.get_by_username(username),
            ServiceError::DuplicateUsername,
            "check username availability",
        )?;

        let password_hash = self
            .hasher
            .hash(password)
            .map_err(|e| ServiceError::internal("hash password", e))?;

        let now = timestamp_now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password: password_hash,
            bio: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).map_err(from_repo("create user"))?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user.scrubbed())
    }

    #[instrument(skip(self, password))]
    pub fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let user = match self.users.get_by_email(email) {
            Ok(user) => user,
            Err(RepoError::NotFound) => {
                tracing::warn!("Login attempt for unknown email");
                return Err(ServiceError::InvalidCredentials);
            }
            Err(err) => return Err(ServiceError::internal("look up user", err)),
        };

        let matches = self
            .hasher
            .verify(password, &user.password)
            .map_err(|e| ServiceError::internal("verify password", e))?;
        if !matches {
            tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue_token(user.id)
            .map_err(|e| ServiceError::internal("issue session token", e))?;

        Ok(LoginOutcome {
            user: user.scrubbed(),
            token,
        })
    }

    #[instrument(skip(self))]
    pub fn get_profile(&self, username: &str) -> ServiceResult<User> {
        let user = self
            .users
            .get_by_username(username)
            .map_err(from_repo("get user by username"))?;
        Ok(user.scrubbed())
    }

    #[instrument(skip(self))]
    pub fn get_user_by_id(&self, user_id: &Uuid) -> ServiceResult<User> {
        let user = self
            .users
            .get_by_id(user_id)
            .map_err(from_repo("get user by id"))?;
        Ok(user.scrubbed())
    }

    /// Apply whichever fields are `Some`, leaving the rest untouched.
    #[instrument(skip(self))]
    pub fn update_profile(
        &self,
        user_id: &Uuid,
        name: Option<String>,
        bio: Option<String>,
        image_url: Option<String>,
    ) -> ServiceResult<User> {
        let mut user = self
            .users
            .get_by_id(user_id)
            .map_err(from_repo("get user for update"))?;

        if let Some(name) = name {
            user.name = name;
        }
        if let Some(bio) = bio {
            user.bio = Some(bio);
        }
        if let Some(image_url) = image_url {
            user.image_url = Some(image_url);
        }

        validation::validate_profile(
            &user.name,
            &user.username,
            &user.email,
            user.bio.as_deref(),
            user.image_url.as_deref(),
        )?;

        user.updated_at = timestamp_now();
        self.users.update(&user).map_err(from_repo("update user"))?;

        Ok(user.scrubbed())
    }

    #[instrument(skip(self))]
    pub fn search_users(&self, query: &str, limit: u32, offset: u32) -> ServiceResult<Vec<User>> {
        validation::validate_search_query(query)?;
        let users = self
            .users
            .search(query.trim(), limit, offset)
            .map_err(from_repo("search users"))?;
        Ok(users.into_iter().map(User::scrubbed).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{register, services};

    #[test]
    fn test_register_returns_scrubbed_user() {
        let s = services();
        let ann = s
            .users
            .register("Ann", "ann", "ann@x.com", "secret1")
            .unwrap();

        assert!(!ann.id.is_nil());
        assert_eq!(ann.username, "ann");
        assert_eq!(ann.password, "");
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let s = services();
        s.users
            .register("Ann", "ann", "ann@x.com", "secret1")
            .unwrap();

        let same_email = s.users.register("Ann B", "annb", "ann@x.com", "secret1");
        assert!(matches!(same_email, Err(ServiceError::DuplicateEmail)));

        let same_username = s.users.register("Ann C", "ann", "other@x.com", "secret1");
        assert!(matches!(same_username, Err(ServiceError::DuplicateUsername)));
    }

    #[test]
    fn test_register_validates_fields() {
        let s = services();
        for (name, username, email, password) in [
            ("", "ann", "ann@x.com", "secret1"),
            ("Ann", "an", "ann@x.com", "secret1"),
            ("Ann", "ann!", "ann@x.com", "secret1"),
            ("Ann", "ann", "not-an-email", "secret1"),
            ("Ann", "ann", "ann@x.com", "short"),
        ] {
            let result = s.users.register(name, username, email, password);
            assert!(
                matches!(result, Err(ServiceError::Validation(_))),
                "expected validation failure for {username}/{email}"
            );
        }
    }

    #[test]
    fn test_login_success_and_failures() {
        let s = services();
        let ann = s
            .users
            .register("Ann", "ann", "ann@x.com", "secret1")
            .unwrap();

        let outcome = s.users.login("ann@x.com", "secret1").unwrap();
        assert!(!outcome.token.is_empty());
        assert_eq!(outcome.user.id, ann.id);
        assert_eq!(outcome.user.password, "");

        assert!(matches!(
            s.users.login("ann@x.com", "wrong"),
            Err(ServiceError::InvalidCredentials)
        ));
        assert!(matches!(
            s.users.login("nobody@x.com", "secret1"),
            Err(ServiceError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_get_profile() {
        let s = services();
        let ann = register(&s, "ann");

        let profile = s.users.get_profile("ann").unwrap();
        assert_eq!(profile.id, ann.id);
        assert_eq!(profile.password, "");
        assert!(matches!(s.users.get_profile("ghost"), Err(ServiceError::NotFound)));

        assert_eq!(s.users.get_user_by_id(&ann.id).unwrap().username, "ann");
        assert!(matches!(
            s.users.get_user_by_id(&Uuid::new_v4()),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn test_update_profile_only_touches_supplied_fields() {
        let s = services();
        let ann = register(&s, "ann");

        let updated = s
            .users
            .update_profile(&ann.id, None, Some("hello there".to_string()), None)
            .unwrap();
        assert_eq!(updated.name, ann.name);
        assert_eq!(updated.bio.as_deref(), Some("hello there"));
        assert_eq!(updated.password, "");

        let renamed = s
            .users
            .update_profile(&ann.id, Some("Ann Lee".to_string()), None, None)
            .unwrap();
        assert_eq!(renamed.name, "Ann Lee");
        assert_eq!(renamed.bio.as_deref(), Some("hello there"));

        let stored = s.users.get_profile("ann").unwrap();
        assert_eq!(stored.name, "Ann Lee");
        assert!(stored.updated_at >= ann.updated_at);
    }

    #[test]
    fn test_update_profile_revalidates() {
        let s = services();
        let ann = register(&s, "ann");

        let bad_url = s
            .users
            .update_profile(&ann.id, None, None, Some("nope".to_string()));
        assert!(matches!(bad_url, Err(ServiceError::Validation(_))));

        let empty_name = s.users.update_profile(&ann.id, Some(String::new()), None, None);
        assert!(matches!(empty_name, Err(ServiceError::Validation(_))));

        let missing = s.users.update_profile(&Uuid::new_v4(), None, None, None);
        assert!(matches!(missing, Err(ServiceError::NotFound)));
    }

    #[test]
    fn test_search_users() {
        let s = services();
        register(&s, "annie");
        register(&s, "joanna");
        register(&s, "bob");

        let found = s.users.search_users("ANN", 10, 0).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|u| u.password.is_empty()));

        assert!(s.users.search_users("ann", 10, 2).unwrap().is_empty());
        assert!(matches!(
            s.users.search_users("  ", 10, 0),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn test_search_users_ignores_unicode_case() {
        let s = services();
        let emile = s
            .users
            .register("Émile Zola", "zola", "zola@example.com", "secret1")
            .unwrap();
        register(&s, "bob");

        for query in ["émile", "ÉMILE", "  Émile  "] {
            let found = s.users.search_users(query, 10, 0).unwrap();
            assert_eq!(found.len(), 1, "query {query:?}");
            assert_eq!(found[0].id, emile.id);
        }
    }
}
