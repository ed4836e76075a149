use crate::error::Result;
use crate::model::{CommentId, CommentView, PostId, PostView, User, UserId};

/// Persistence of users, posts, comments and likes.
///
/// All text fields are stored exactly as submitted. Escaping happens when content is shown or
/// exported, never on the way in.
pub trait Store {
    /// Registers a user with an already hashed password.
    ///
    /// Fails with `InvalidEmail` for a malformed address and `EmailExists` if the address is taken.
    fn create_user(
        &mut self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<UserId>;

    fn find_user_by_email(&self, email: &str) -> Option<User>;

    /// Publishes a post. Title and content must not be blank.
    fn create_post(
        &mut self,
        user_id: UserId,
        email: &str,
        author_name: &str,
        title: &str,
        content: &str,
    ) -> Result<PostId>;

    /// All posts, newest first, with their current like counts.
    fn list_posts(&self) -> Vec<PostView>;

    /// Likes the post if `user_id` has not liked it yet, unlikes it otherwise.
    ///
    /// Returns whether the post is liked after the call.
    fn toggle_like(&mut self, post_id: PostId, user_id: UserId) -> Result<bool>;

    fn has_liked(&self, post_id: PostId, user_id: UserId) -> bool;

    /// The comments of a post, oldest first.
    fn list_comments(&self, post_id: PostId) -> Vec<CommentView>;

    /// Adds a comment. The content must not be blank.
    fn create_comment(
        &mut self,
        post_id: PostId,
        user_id: UserId,
        email: &str,
        author_name: &str,
        content: &str,
    ) -> Result<CommentId>;

    /// The avatar for `email` at `size` pixels.
    fn avatar_url(&self, email: &str, size: u32) -> String {
        crate::avatar::avatar_url(email, size)
    }
}
