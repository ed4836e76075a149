//! In-memory store with JSON snapshot persistence.
//!
//! The whole store is loaded at startup and written back after every change, which is plenty for
//! the data volume of a single community.
use std::fs;
use std::io;
use std::path::Path;

use mathgram_core::Timestamp;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::avatar::DEFAULT_AVATAR_SIZE;
use crate::error::{Result, StoreError};
use crate::model::{
    Comment, CommentId, CommentView, Like, Post, PostId, PostView, User, UserId, display_name,
};
use crate::store::Store;
use crate::validate::validate_email;

/// Header for version checking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotHeader {
    /// Identifies the file as a mathgram snapshot
    pub magic: String,
    /// Format version (increment on breaking changes)
    pub version: u32,
}

impl SnapshotHeader {
    pub const MAGIC: &'static str = "MATHGRAM";
    pub const VERSION: u32 = 1;

    pub fn current() -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: Self::VERSION,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == Self::MAGIC && self.version == Self::VERSION
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
struct Tables {
    next_id: u64,
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    header: SnapshotHeader,
    tables: Tables,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryStore {
    tables: Tables,
    avatar_size: u32,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: Tables::default(),
            avatar_size: DEFAULT_AVATAR_SIZE,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the avatar size used in post and comment views.
    pub fn with_avatar_size(mut self, size: u32) -> Self {
        self.avatar_size = size;
        self
    }

    /// Loads a snapshot. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("No snapshot at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(err) => {
                error!("Failed to read snapshot {}: {err}", path.display());
                return Err(err.into());
            }
        };
        Self::from_json(&json).inspect_err(|err| {
            error!("Failed to load snapshot {}: {err}", path.display());
        })
    }

    /// Writes a snapshot, replacing the file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.write_snapshot(path).inspect_err(|err| {
            error!("Failed to save snapshot {}: {err}", path.display());
        })?;
        debug!("Saved snapshot to {}", path.display());
        Ok(())
    }

    fn write_snapshot(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        let snapshot = Snapshot {
            header: SnapshotHeader::current(),
            tables: self.tables.clone(),
        };
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        if !snapshot.header.is_valid() {
            return Err(StoreError::Snapshot(format!(
                "unsupported header {:?} (expected {} version {})",
                snapshot.header,
                SnapshotHeader::MAGIC,
                SnapshotHeader::VERSION
            )));
        }
        Ok(Self {
            tables: snapshot.tables,
            ..Self::default()
        })
    }

    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.tables.users.iter().find(|u| u.id == user_id)
    }

    pub fn post(&self, post_id: PostId) -> Option<&Post> {
        self.tables.posts.iter().find(|p| p.id == post_id)
    }

    /// Number of likes of a post.
    pub fn like_count(&self, post_id: PostId) -> usize {
        self.tables
            .likes
            .iter()
            .filter(|like| like.post_id == post_id)
            .count()
    }

    fn next_id(&mut self) -> u64 {
        self.tables.next_id += 1;
        self.tables.next_id
    }

    fn require_user(&self, user_id: UserId) -> Result<()> {
        match self.user(user_id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NoSuchUser(user_id)),
        }
    }

    fn require_post(&self, post_id: PostId) -> Result<()> {
        match self.post(post_id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NoSuchPost(post_id)),
        }
    }
}

/// `None` for a blank name, so that the display name falls back to the email.
fn optional_name(name: &str) -> Option<String> {
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

impl Store for MemoryStore {
    fn create_user(
        &mut self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<UserId> {
        if !validate_email(email) {
            return Err(StoreError::InvalidEmail);
        }
        if self.tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::EmailExists);
        }
        let id = UserId(self.next_id());
        self.tables.users.push(User {
            id,
            email: email.to_string(),
            name: name.and_then(optional_name),
            password_hash: password_hash.to_string(),
            created_at: Timestamp::now(),
        });
        info!("Created user {id}");
        Ok(id)
    }

    fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.tables.users.iter().find(|u| u.email == email).cloned()
    }

    fn create_post(
        &mut self,
        user_id: UserId,
        email: &str,
        author_name: &str,
        title: &str,
        content: &str,
    ) -> Result<PostId> {
        if title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        if content.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }
        self.require_user(user_id)?;
        let id = PostId(self.next_id());
        self.tables.posts.push(Post {
            id,
            user_id,
            email: email.to_string(),
            author_name: optional_name(author_name),
            title: title.to_string(),
            content: content.to_string(),
            created_at: Timestamp::now(),
        });
        info!("User {user_id} created post {id}");
        Ok(id)
    }

    fn list_posts(&self) -> Vec<PostView> {
        let mut posts: Vec<&Post> = self.tables.posts.iter().collect();
        // Ids grow monotonically, so they break ties between posts created in the same second.
        posts.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        posts
            .into_iter()
            .map(|post| PostView {
                id: post.id,
                user_id: post.user_id,
                email: post.email.clone(),
                author_name: display_name(post.author_name.as_deref(), &post.email).to_string(),
                title: post.title.clone(),
                content: post.content.clone(),
                likes: self.like_count(post.id),
                created_at: post.created_at,
                avatar_url: self.avatar_url(&post.email, self.avatar_size),
            })
            .collect()
    }

    fn toggle_like(&mut self, post_id: PostId, user_id: UserId) -> Result<bool> {
        self.require_post(post_id)?;
        self.require_user(user_id)?;
        let likes = &mut self.tables.likes;
        if let Some(idx) = likes
            .iter()
            .position(|like| like.post_id == post_id && like.user_id == user_id)
        {
            likes.remove(idx);
            debug!("User {user_id} unliked post {post_id}");
            Ok(false)
        } else {
            likes.push(Like {
                post_id,
                user_id,
                created_at: Timestamp::now(),
            });
            debug!("User {user_id} liked post {post_id}");
            Ok(true)
        }
    }

    fn has_liked(&self, post_id: PostId, user_id: UserId) -> bool {
        self.tables
            .likes
            .iter()
            .any(|like| like.post_id == post_id && like.user_id == user_id)
    }

    fn list_comments(&self, post_id: PostId) -> Vec<CommentView> {
        let mut comments: Vec<&Comment> = self
            .tables
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        comments
            .into_iter()
            .map(|comment| CommentView {
                id: comment.id,
                user_id: comment.user_id,
                email: comment.email.clone(),
                author_name: display_name(comment.author_name.as_deref(), &comment.email)
                    .to_string(),
                content: comment.content.clone(),
                created_at: comment.created_at,
                avatar_url: self.avatar_url(&comment.email, self.avatar_size),
            })
            .collect()
    }

    fn create_comment(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        email: &str,
        author_name: &str,
        content: &str,
    ) -> Result<CommentId> {
        if content.trim().is_empty() {
            return Err(StoreError::EmptyComment);
        }
        self.require_post(post_id)?;
        self.require_user(user_id)?;
        let id = CommentId(self.next_id());
        self.tables.comments.push(Comment {
            id,
            post_id,
            user_id,
            email: email.to_string(),
            author_name: optional_name(author_name),
            content: content.to_string(),
            created_at: Timestamp::now(),
        });
        info!("User {user_id} commented on post {post_id}");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_user() -> (MemoryStore, UserId) {
        let mut store = MemoryStore::new();
        let user = store
            .create_user("ana@example.com", Some("Ana"), "hash")
            .unwrap();
        (store, user)
    }

    #[test]
    fn test_create_user_validation() {
        let (mut store, _) = store_with_user();
        assert!(matches!(
            store.create_user("not-an-email", None, "hash"),
            Err(StoreError::InvalidEmail)
        ));
        assert!(matches!(
            store.create_user("ana@example.com", None, "hash"),
            Err(StoreError::EmailExists)
        ));
    }

    #[test]
    fn test_find_user() {
        let (store, id) = store_with_user();
        let user = store.find_user_by_email("ana@example.com").unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.display_name(), "Ana");
        assert!(store.find_user_by_email("bob@example.com").is_none());
    }

    #[test]
    fn test_blank_post_rejected() {
        let (mut store, user) = store_with_user();
        assert!(matches!(
            store.create_post(user, "ana@example.com", "Ana", "   ", "x"),
            Err(StoreError::EmptyTitle)
        ));
        assert!(matches!(
            store.create_post(user, "ana@example.com", "Ana", "T", "\n\t"),
            Err(StoreError::EmptyContent)
        ));
        assert!(store.list_posts().is_empty());
    }

    #[test]
    fn test_post_by_unknown_user() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            store.create_post(UserId(42), "x@example.com", "", "T", "C"),
            Err(StoreError::NoSuchUser(UserId(42)))
        ));
    }

    #[test]
    fn test_posts_newest_first() {
        let (mut store, user) = store_with_user();
        let first = store
            .create_post(user, "ana@example.com", "Ana", "First", "1")
            .unwrap();
        let second = store
            .create_post(user, "ana@example.com", "Ana", "Second", "2")
            .unwrap();
        let ids: Vec<_> = store.list_posts().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[test]
    fn test_author_falls_back_to_email() {
        let (mut store, user) = store_with_user();
        store
            .create_post(user, "ana@example.com", "", "T", "C")
            .unwrap();
        assert_eq!(store.list_posts()[0].author_name, "ana");
    }

    #[test]
    fn test_toggle_like() {
        let (mut store, user) = store_with_user();
        let post = store
            .create_post(user, "ana@example.com", "Ana", "T", "C")
            .unwrap();
        assert!(!store.has_liked(post, user));
        assert!(store.toggle_like(post, user).unwrap());
        assert!(store.has_liked(post, user));
        assert_eq!(store.list_posts()[0].likes, 1);
        assert!(!store.toggle_like(post, user).unwrap());
        assert!(!store.has_liked(post, user));
        assert_eq!(store.list_posts()[0].likes, 0);
    }

    #[test]
    fn test_like_unknown_post() {
        let (mut store, user) = store_with_user();
        assert!(matches!(
            store.toggle_like(PostId(99), user),
            Err(StoreError::NoSuchPost(PostId(99)))
        ));
    }

    #[test]
    fn test_comments_oldest_first() {
        let (mut store, user) = store_with_user();
        let post = store
            .create_post(user, "ana@example.com", "Ana", "T", "C")
            .unwrap();
        let a = store
            .create_comment(post, user, "ana@example.com", "Ana", "first")
            .unwrap();
        let b = store
            .create_comment(post, user, "ana@example.com", "Ana", "second")
            .unwrap();
        let ids: Vec<_> = store.list_comments(post).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(matches!(
            store.create_comment(post, user, "ana@example.com", "Ana", " "),
            Err(StoreError::EmptyComment)
        ));
    }

    #[test]
    fn test_raw_text_is_stored_verbatim() {
        let (mut store, user) = store_with_user();
        let content = r"<b>$x < y$</b> & \frac{1}{2}";
        store
            .create_post(user, "ana@example.com", "Ana", "<T>", content)
            .unwrap();
        let post = &store.list_posts()[0];
        assert_eq!(post.title, "<T>");
        assert_eq!(post.content, content);
    }

    #[test]
    fn test_avatar_size() {
        let mut store = MemoryStore::new().with_avatar_size(24);
        let user = store.create_user("ana@example.com", None, "h").unwrap();
        store
            .create_post(user, "ana@example.com", "", "T", "C")
            .unwrap();
        assert!(store.list_posts()[0].avatar_url.contains("?s=24&"));
    }

    #[test]
    fn test_json_roundtrip() {
        let (mut store, user) = store_with_user();
        let post = store
            .create_post(user, "ana@example.com", "Ana", "T", "C")
            .unwrap();
        store.toggle_like(post, user).unwrap();
        let restored = MemoryStore::from_json(&store.to_json().unwrap()).unwrap();
        assert_eq!(restored, store);
    }

    #[test]
    fn test_rejects_foreign_snapshot() {
        let json = r#"{"header": {"magic": "OTHER", "version": 1}, "tables": {"next_id": 0, "users": [], "posts": [], "comments": [], "likes": []}}"#;
        assert!(matches!(
            MemoryStore::from_json(json),
            Err(StoreError::Snapshot(_))
        ));
    }

    #[test]
    fn test_save_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("mathgram.json");
        let err = MemoryStore::new().save(&path).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(!err.is_validation());
        assert!(!path.exists());
    }
}
