//! Registration, login and the per-request session.
use tracing::{info, warn};

use crate::error::{AuthError, StoreError};
use crate::model::{CommentId, PostId, UserId, display_name};
use crate::store::Store;
use crate::validate::{validate_email, validate_password};

pub use bcrypt::DEFAULT_COST;

/// A filled-in registration form.
#[derive(Debug, Clone, Copy)]
pub struct Registration<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub password: &'a str,
    pub confirm_password: &'a str,
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    Ok(bcrypt::hash(password, cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Validates the form, hashes the password with the given bcrypt `cost` and creates the user.
pub fn register<S: Store + ?Sized>(
    store: &mut S,
    form: &Registration<'_>,
    cost: u32,
) -> Result<UserId, AuthError> {
    if form.email.is_empty() || form.password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    if form.password != form.confirm_password {
        return Err(AuthError::PasswordMismatch);
    }
    if !validate_email(form.email) {
        return Err(StoreError::InvalidEmail.into());
    }
    validate_password(form.password).map_err(StoreError::from)?;

    let hash = hash_password(form.password, cost)?;
    let id = store.create_user(form.email, form.name, &hash)?;
    Ok(id)
}

/// Checks the credentials and opens a session for the user.
pub fn authenticate<S: Store + ?Sized>(
    store: &S,
    email: &str,
    password: &str,
) -> Result<Session, AuthError> {
    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingFields);
    }
    let Some(user) = store.find_user_by_email(email) else {
        return Err(AuthError::InvalidCredentials);
    };
    match verify_password(password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return Err(AuthError::InvalidCredentials),
        Err(err) => {
            warn!("Stored password hash of user {} is unusable: {err}", user.id);
            return Err(AuthError::InvalidCredentials);
        }
    }
    info!("User {} logged in", user.id);
    Ok(Session {
        user_id: user.id,
        email: user.email.clone(),
        name: user.display_name().to_string(),
    })
}

/// The logged-in user, passed explicitly to everything done on their behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
}

impl Session {
    pub fn new(user_id: UserId, email: &str, name: Option<&str>) -> Self {
        Self {
            user_id,
            email: email.to_string(),
            name: display_name(name, email).to_string(),
        }
    }

    pub fn create_post<S: Store + ?Sized>(
        &self,
        store: &mut S,
        title: &str,
        content: &str,
    ) -> Result<PostId, StoreError> {
        store.create_post(self.user_id, &self.email, &self.name, title, content)
    }

    pub fn create_comment<S: Store + ?Sized>(
        &self,
        store: &mut S,
        post_id: PostId,
        content: &str,
    ) -> Result<CommentId, StoreError> {
        store.create_comment(post_id, self.user_id, &self.email, &self.name, content)
    }

    pub fn toggle_like<S: Store + ?Sized>(
        &self,
        store: &mut S,
        post_id: PostId,
    ) -> Result<bool, StoreError> {
        store.toggle_like(post_id, self.user_id)
    }

    pub fn has_liked<S: Store + ?Sized>(&self, store: &S, post_id: PostId) -> bool {
        store.has_liked(post_id, self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    // The lowest cost bcrypt accepts keeps the tests fast.
    const COST: u32 = 4;

    fn form<'a>(email: &'a str, password: &'a str, confirm: &'a str) -> Registration<'a> {
        Registration {
            email,
            name: Some("Ana"),
            password,
            confirm_password: confirm,
        }
    }

    #[test]
    fn test_register_and_login() {
        let mut store = MemoryStore::new();
        let id = register(&mut store, &form("ana@example.com", "abc123", "abc123"), COST).unwrap();
        let session = authenticate(&store, "ana@example.com", "abc123").unwrap();
        assert_eq!(session.user_id, id);
        assert_eq!(session.name, "Ana");
        // The password itself is never stored.
        let user = store.find_user_by_email("ana@example.com").unwrap();
        assert_ne!(user.password_hash, "abc123");
    }

    #[test]
    fn test_register_errors() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            register(&mut store, &form("", "abc123", "abc123"), COST),
            Err(AuthError::MissingFields)
        ));
        assert!(matches!(
            register(&mut store, &form("ana@example.com", "abc123", "abc124"), COST),
            Err(AuthError::PasswordMismatch)
        ));
        assert!(matches!(
            register(&mut store, &form("ana", "abc123", "abc123"), COST),
            Err(AuthError::Store(StoreError::InvalidEmail))
        ));
        assert!(matches!(
            register(&mut store, &form("ana@example.com", "abcdef", "abcdef"), COST),
            Err(AuthError::Store(StoreError::WeakPassword(_)))
        ));
        register(&mut store, &form("ana@example.com", "abc123", "abc123"), COST).unwrap();
        assert!(matches!(
            register(&mut store, &form("ana@example.com", "abc123", "abc123"), COST),
            Err(AuthError::Store(StoreError::EmailExists))
        ));
    }

    #[test]
    fn test_wrong_password() {
        let mut store = MemoryStore::new();
        register(&mut store, &form("ana@example.com", "abc123", "abc123"), COST).unwrap();
        assert!(matches!(
            authenticate(&store, "ana@example.com", "wrong1"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            authenticate(&store, "bob@example.com", "abc123"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_corrupt_hash_is_rejected() {
        let mut store = MemoryStore::new();
        store
            .create_user("ana@example.com", None, "not a bcrypt hash")
            .unwrap();
        assert!(matches!(
            authenticate(&store, "ana@example.com", "abc123"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_session_acts_for_user() {
        let mut store = MemoryStore::new();
        let id = store.create_user("bob@example.com", None, "h").unwrap();
        let session = Session::new(id, "bob@example.com", None);
        assert_eq!(session.name, "bob");

        let post = session.create_post(&mut store, "T", "$x$").unwrap();
        assert!(session.toggle_like(&mut store, post).unwrap());
        assert!(session.has_liked(&store, post));
        session.create_comment(&mut store, post, "nice").unwrap();

        let comments = store.list_comments(post);
        assert_eq!(comments[0].author_name, "bob");
    }
}
