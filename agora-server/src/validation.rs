/// Field validation for users, posts and comments.
/// Lengths are counted in characters, not bytes.
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

pub const NAME_MAX: usize = 100;
pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 50;
pub const PASSWORD_MIN: usize = 6;
pub const BIO_MAX: usize = 500;
pub const POST_CONTENT_MAX: usize = 1000;
pub const COMMENT_CONTENT_MAX: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {problem}")]
pub struct ValidationError {
    pub field: &'static str,
    pub problem: String,
}

impl ValidationError {
    fn new(field: &'static str, problem: impl Into<String>) -> Self {
        Self {
            field,
            problem: problem.into(),
        }
    }
}

pub type ValidationResult = Result<(), ValidationError>;

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}$")
            .expect("email pattern is valid")
    })
}

fn username_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("username pattern is valid"))
}

fn check_length(field: &'static str, value: &str, min: usize, max: usize) -> ValidationResult {
    let len = value.chars().count();
    if len < min {
        let problem = if min == 1 {
            "must not be empty".to_string()
        } else {
            format!("must be at least {min} characters")
        };
        return Err(ValidationError::new(field, problem));
    }
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> ValidationResult {
    check_length("name", name, 1, NAME_MAX)
}

pub fn validate_username(username: &str) -> ValidationResult {
    check_length("username", username, USERNAME_MIN, USERNAME_MAX)?;
    if !username_regex().is_match(username) {
        return Err(ValidationError::new(
            "username",
            "must contain only letters and digits",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> ValidationResult {
    if !email_regex().is_match(email) {
        return Err(ValidationError::new("email", "must be a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ValidationResult {
    if password.chars().count() < PASSWORD_MIN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {PASSWORD_MIN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_bio(bio: Option<&str>) -> ValidationResult {
    match bio {
        Some(bio) => check_length("bio", bio, 0, BIO_MAX),
        None => Ok(()),
    }
}

/// Absent is fine; present must be an absolute http(s) URL.
pub fn validate_image_url(image_url: Option<&str>) -> ValidationResult {
    let Some(raw) = image_url else {
        return Ok(());
    };
    let parsed =
        Url::parse(raw).map_err(|_| ValidationError::new("image_url", "must be a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::new(
            "image_url",
            "must use http or https",
        ));
    }
    Ok(())
}

pub fn validate_post_content(content: &str) -> ValidationResult {
    check_length("content", content, 1, POST_CONTENT_MAX)
}

pub fn validate_comment_content(content: &str) -> ValidationResult {
    check_length("content", content, 1, COMMENT_CONTENT_MAX)
}

pub fn validate_search_query(query: &str) -> ValidationResult {
    if query.trim().is_empty() {
        return Err(ValidationError::new("query", "must not be empty"));
    }
    Ok(())
}

/// Profile fields shared by registration and profile updates.
pub fn validate_profile(
    name: &str,
    username: &str,
    email: &str,
    bio: Option<&str>,
    image_url: Option<&str>,
) -> ValidationResult {
    validate_name(name)?;
    validate_username(username)?;
    validate_email(email)?;
    validate_bio(bio)?;
    validate_image_url(image_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("ann").is_ok());
        assert!(validate_username("Ann2024").is_ok());
        assert!(validate_username("an").is_err());
        assert!(validate_username("ann_smith").is_err());
        assert!(validate_username("ann smith").is_err());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("ann@example.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
        assert!(validate_email("ann@example").is_err());
        assert!(validate_email("ann.example.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn test_image_url_rules() {
        assert!(validate_image_url(None).is_ok());
        assert!(validate_image_url(Some("https://cdn.example.com/a.png")).is_ok());
        assert!(validate_image_url(Some("http://example.com")).is_ok());
        assert!(validate_image_url(Some("not a url")).is_err());
        assert!(validate_image_url(Some("/relative/path.png")).is_err());

        let err = validate_image_url(Some("ftp://example.com/a.png")).unwrap_err();
        assert_eq!(err.field, "image_url");
    }

    #[test]
    fn test_lengths_count_characters() {
        // 1000 two-byte characters is still within the post limit
        assert!(validate_post_content(&"é".repeat(1000)).is_ok());
        assert!(validate_post_content(&"é".repeat(1001)).is_err());
        assert!(validate_comment_content(&"x".repeat(500)).is_ok());
        assert!(validate_comment_content(&"x".repeat(501)).is_err());
        assert!(validate_bio(Some(&"b".repeat(500))).is_ok());
        assert!(validate_bio(Some(&"b".repeat(501))).is_err());
    }

    #[test]
    fn test_empty_content_message() {
        let err = validate_post_content("").unwrap_err();
        assert_eq!(err.to_string(), "content must not be empty");
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    proptest! {
        #[test]
        fn prop_alphanumeric_usernames_in_range_are_valid(username in "[A-Za-z0-9]{3,50}") {
            prop_assert!(validate_username(&username).is_ok());
        }

        #[test]
        fn prop_post_content_bounds(len in 0usize..1200) {
            let content = "p".repeat(len);
            prop_assert_eq!(validate_post_content(&content).is_ok(), (1..=1000).contains(&len));
        }
    }
}
