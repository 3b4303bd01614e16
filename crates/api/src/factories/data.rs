//! Payload factory for the mock REST API
//!
//! Every generated field carries a fresh id from [`next_id`], so cases running
//! in parallel never produce the same title, username or email.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::str::FromStr;

use shopcheck_common::{next_id, CheckError};

use crate::models::{Comment, Post, User};

/// Fields to force on a generated post
#[derive(Debug, Clone, Default)]
pub struct PostOverrides {
    pub id: Option<u64>,
    pub user_id: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserOverrides {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommentOverrides {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub body: Option<String>,
}

/// Deliberately malformed posts for boundary checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidPost {
    Empty,
    LongTitle,
    MissingBody,
}

impl InvalidPost {
    pub fn all() -> [InvalidPost; 3] {
        [InvalidPost::Empty, InvalidPost::LongTitle, InvalidPost::MissingBody]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidPost::Empty => "empty",
            InvalidPost::LongTitle => "long_title",
            InvalidPost::MissingBody => "missing_body",
        }
    }
}

impl fmt::Display for InvalidPost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvalidPost {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(InvalidPost::Empty),
            "long_title" => Ok(InvalidPost::LongTitle),
            "missing_body" => Ok(InvalidPost::MissingBody),
            other => Err(CheckError::Fixture(format!("unknown invalid post kind: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DataFactory;

impl DataFactory {
    pub fn create_post() -> Post {
        Self::create_post_with(PostOverrides::default())
    }

    pub fn create_post_with(overrides: PostOverrides) -> Post {
        let id = next_id();
        Post {
            id: overrides.id,
            user_id: overrides.user_id.unwrap_or(1),
            title: overrides.title.unwrap_or_else(|| format!("Test Post Title {}", id)),
            body: overrides.body.unwrap_or_else(|| {
                let generated = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
                format!(
                    "This is a test post body generated at {}. \
                     It contains sample content for testing purposes.",
                    generated
                )
            }),
        }
    }

    /// `count` posts; without a forced user id the i-th post belongs to user i+1
    pub fn create_posts(count: usize, overrides: PostOverrides) -> Vec<Post> {
        (0..count)
            .map(|i| {
                let mut overrides = overrides.clone();
                overrides.user_id = overrides.user_id.or(Some(i as u64 + 1));
                Self::create_post_with(overrides)
            })
            .collect()
    }

    pub fn create_user() -> User {
        Self::create_user_with(UserOverrides::default())
    }

    pub fn create_user_with(overrides: UserOverrides) -> User {
        let id = next_id();
        User {
            id: overrides.id,
            name: overrides.name.unwrap_or_else(|| format!("Test User {}", id)),
            username: overrides.username.unwrap_or_else(|| format!("testuser_{}", id)),
            email: overrides.email.unwrap_or_else(|| format!("test_{}@example.com", id)),
            phone: overrides
                .phone
                .unwrap_or_else(|| format!("555-0{:03}-{:04}", id % 1000, id % 10000)),
            website: overrides.website.unwrap_or_else(|| format!("test{}.com", id)),
        }
    }

    pub fn create_comment(post_id: u64) -> Comment {
        Self::create_comment_with(post_id, CommentOverrides::default())
    }

    pub fn create_comment_with(post_id: u64, overrides: CommentOverrides) -> Comment {
        let id = next_id();
        Comment {
            post_id,
            id: overrides.id,
            name: overrides.name.unwrap_or_else(|| format!("Commenter {}", id)),
            email: overrides.email.unwrap_or_else(|| format!("commenter_{}@test.com", id)),
            body: overrides
                .body
                .unwrap_or_else(|| format!("This is a test comment {}. Great post!", id)),
        }
    }

    /// Fixed malformed payloads; these are never randomised
    pub fn create_invalid_post(kind: InvalidPost) -> Post {
        let (title, body) = match kind {
            InvalidPost::Empty => (String::new(), String::new()),
            InvalidPost::LongTitle => ("A".repeat(300), "Valid body".to_string()),
            InvalidPost::MissingBody => ("Title without body".to_string(), String::new()),
        };
        Post {
            id: None,
            user_id: 1,
            title,
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use test_case::test_case;

    #[test]
    fn test_generated_fields_unique() {
        let titles: HashSet<String> = (0..200).map(|_| DataFactory::create_post().title).collect();
        assert_eq!(titles.len(), 200);

        let users: Vec<User> = (0..150).map(|_| DataFactory::create_user()).collect();
        let usernames: HashSet<&str> = users.iter().map(|u| u.username.as_str()).collect();
        let emails: HashSet<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(usernames.len(), 150);
        assert_eq!(emails.len(), 150);
    }

    #[test]
    fn test_overrides_replace_defaults() {
        let post = DataFactory::create_post_with(PostOverrides {
            user_id: Some(2),
            title: Some("premium Post".into()),
            ..Default::default()
        });
        assert_eq!(post.user_id, 2);
        assert_eq!(post.title, "premium Post");
        assert!(post.body.starts_with("This is a test post body generated at "));
        assert!(post.id.is_none());

        let user = DataFactory::create_user_with(UserOverrides {
            email: Some("fixed@example.com".into()),
            ..Default::default()
        });
        assert_eq!(user.email, "fixed@example.com");
        assert!(user.username.starts_with("testuser_"));
    }

    #[test]
    fn test_create_posts_assigns_users() {
        let posts = DataFactory::create_posts(3, PostOverrides::default());
        let users: Vec<u64> = posts.iter().map(|p| p.user_id).collect();
        assert_eq!(users, vec![1, 2, 3]);

        let forced = DataFactory::create_posts(
            3,
            PostOverrides {
                user_id: Some(42),
                ..Default::default()
            },
        );
        assert!(forced.iter().all(|p| p.user_id == 42));
    }

    #[test]
    fn test_comment_targets_post() {
        let comment = DataFactory::create_comment(101);
        assert_eq!(comment.post_id, 101);
        assert!(comment.email.ends_with("@test.com"));
    }

    #[test_case(InvalidPost::Empty, "", "" ; "empty")]
    #[test_case(InvalidPost::MissingBody, "Title without body", "" ; "missing body")]
    fn test_invalid_posts(kind: InvalidPost, title: &str, body: &str) {
        let post = DataFactory::create_invalid_post(kind);
        assert_eq!(post.title, title);
        assert_eq!(post.body, body);
        assert_eq!(post.user_id, 1);
    }

    #[test]
    fn test_long_title_length() {
        let post = DataFactory::create_invalid_post(InvalidPost::LongTitle);
        assert_eq!(post.title.chars().count(), 300);
        assert_eq!(post.body, "Valid body");
    }

    #[test]
    fn test_invalid_kind_parse() {
        assert_eq!("long_title".parse::<InvalidPost>().unwrap(), InvalidPost::LongTitle);
        assert!("broken".parse::<InvalidPost>().is_err());
    }
}
