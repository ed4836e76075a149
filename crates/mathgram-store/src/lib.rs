//! Users, posts, comments and likes.
//!
//! [`Store`] is the persistence seam; [`MemoryStore`] implements it in memory and persists to a
//! JSON snapshot. Accounts are managed through [`register`] and [`authenticate`], and everything a
//! logged-in user does goes through an explicit [`Session`].
//!
//! ```rust
//! use mathgram_store::{MemoryStore, Registration, Store, authenticate, register};
//!
//! let mut store = MemoryStore::new();
//! let form = Registration {
//!     email: "ana@example.com",
//!     name: Some("Ana"),
//!     password: "abc123",
//!     confirm_password: "abc123",
//! };
//! register(&mut store, &form, 4).unwrap();
//!
//! let session = authenticate(&store, "ana@example.com", "abc123").unwrap();
//! let post = session.create_post(&mut store, "Pitágoras", "$a^2+b^2=c^2$").unwrap();
//! assert!(session.toggle_like(&mut store, post).unwrap());
//! assert_eq!(store.list_posts()[0].likes, 1);
//! ```
pub mod auth;
mod avatar;
pub mod error;
mod memory;
pub mod model;
mod store;
mod validate;

pub use self::auth::{Registration, Session, authenticate, register};
pub use self::avatar::{DEFAULT_AVATAR_SIZE, avatar_url};
pub use self::error::{AuthError, StoreError, WeakPassword};
pub use self::memory::{MemoryStore, SnapshotHeader};
pub use self::model::{CommentId, CommentView, PostId, PostView, User, UserId};
pub use self::store::Store;
pub use self::validate::{MIN_PASSWORD_LEN, validate_email, validate_password};
