//! Storage and identity seam
//!
//! The post collection, per-user activity records and anonymous auth belong
//! to an external backend. The core only talks to it through `VoidStore`.
//! Futures are `?Send`: everything runs on the browser's single thread.

pub mod id;
pub mod memory;

#[cfg(target_arch = "wasm32")]
pub mod web;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use memory::MemoryStore;
#[cfg(target_arch = "wasm32")]
pub use web::JsStore;

/// Opaque document id; ordered lexicographically by the backend
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anonymous user id issued by the auth backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorId(String);

impl AuthorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AuthorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in user as reported by the auth backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: AuthorId,
    /// From the token's custom claims
    #[serde(default)]
    pub admin: bool,
}

/// A stored thought
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub content: String,
    pub author_id: AuthorId,
    /// Server-assigned, milliseconds since epoch
    #[serde(default)]
    pub created_at: f64,
}

/// What the client writes; id and timestamp are assigned by storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub content: String,
    pub author_id: AuthorId,
    #[serde(rename = "content_words")]
    pub content_words: Vec<String>,
}

impl NewPost {
    pub fn new(content: &str, author_id: AuthorId) -> Self {
        Self {
            content: content.to_string(),
            author_id,
            content_words: crate::content::content_words(content),
        }
    }
}

/// Id range for a probe query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdRange {
    /// `id >= anchor`, ascending
    AtOrAfter(PostId),
    /// `id < anchor`, descending (nearest the anchor first)
    Before(PostId),
}

impl IdRange {
    pub fn anchor(&self) -> &PostId {
        match self {
            IdRange::AtOrAfter(id) | IdRange::Before(id) => id,
        }
    }
}

/// Backend failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Write rejected by the backend's posting-rate rule
    #[error("rate limited")]
    RateLimited,
    #[error("permission denied")]
    PermissionDenied,
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// Backend call an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SubmitPost,
    FetchPosts,
    UpsertActivity,
    SignIn,
}

impl StoreError {
    /// Classify an SDK error code
    ///
    /// The posting-rate rule rejects post writes with `permission-denied`;
    /// anywhere else that code is a real permission problem.
    pub fn from_code(code: &str, operation: Operation) -> Self {
        match (code, operation) {
            ("permission-denied", Operation::SubmitPost) => StoreError::RateLimited,
            ("permission-denied", _) => StoreError::PermissionDenied,
            (code, _) => StoreError::Unavailable(code.to_string()),
        }
    }
}

/// Everything the core needs from the backend
#[async_trait(?Send)]
pub trait VoidStore {
    /// Commit a new post; resolves only once storage has acknowledged it
    async fn submit_post(&self, post: NewPost) -> Result<PostId, StoreError>;

    /// Up to `limit` posts in `range`, ordered by id in the range's direction
    async fn fetch_posts(
        &self,
        range: IdRange,
        exclude_author: Option<&AuthorId>,
        limit: usize,
    ) -> Result<Vec<Post>, StoreError>;

    /// A fresh id from the same scheme as real post ids (never persisted)
    fn generate_probe_id(&self) -> PostId;

    /// Record the author's latest post time
    async fn upsert_user_activity(
        &self,
        author: &AuthorId,
        timestamp_ms: f64,
    ) -> Result<(), StoreError>;

    /// Ask the auth backend for an anonymous identity
    async fn sign_in_anonymously(&self) -> Result<Identity, StoreError>;
}
