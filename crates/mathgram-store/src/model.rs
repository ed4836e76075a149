//! Persisted records and the views handed out to readers.
use std::fmt;

use mathgram_core::Timestamp;
use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(UserId);
id_type!(PostId);
id_type!(CommentId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub created_at: Timestamp,
}

impl User {
    /// The name shown next to the user's content.
    pub fn display_name(&self) -> &str {
        display_name(self.name.as_deref(), &self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,
    pub email: String,
    pub author_name: Option<String>,
    pub title: String,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub email: String,
    pub author_name: Option<String>,
    pub content: String,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub post_id: PostId,
    pub user_id: UserId,
    pub created_at: Timestamp,
}

/// A post as shown in the feed. Title and content are still raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostView {
    pub id: PostId,
    pub user_id: UserId,
    pub email: String,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub likes: usize,
    pub created_at: Timestamp,
    pub avatar_url: String,
}

/// A comment as shown below a post. The content is still raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    pub id: CommentId,
    pub user_id: UserId,
    pub email: String,
    pub author_name: String,
    pub content: String,
    pub created_at: Timestamp,
    pub avatar_url: String,
}

/// The given name, or the local part of the email address if there is none.
pub fn display_name<'a>(name: Option<&'a str>, email: &'a str) -> &'a str {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => email.split('@').next().unwrap_or(email),
    }
}
