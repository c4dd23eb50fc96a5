//! Browser backend bridge
//!
//! The hosted database and auth SDK live in JavaScript. The page exposes a
//! small `window.voidBackend` object and this module calls it. Values cross
//! the boundary as JSON so the Rust side stays on serde types.
//!
//! Expected JS surface:
//! - `submitPost(post) -> Promise<string>` (resolves with the new id)
//! - `fetchPosts(anchor, direction, excludeAuthor, limit) -> Promise<Post[]>`
//! - `upsertUserActivity(uid, timestampMs) -> Promise<void>`
//! - `signInAnonymously() -> Promise<{uid, admin}>`
//! - `onIdentityChanged(callback)` where callback receives `{uid, admin}` or `null`
//!
//! Rejections carry the SDK error `code`; `permission-denied` on a post
//! write is the posting-rate rule.

use std::cell::RefCell;

use async_trait::async_trait;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

use super::id::auto_id;
use super::{
    AuthorId, IdRange, Identity, NewPost, Operation, Post, PostId, StoreError, VoidStore,
};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = voidBackend, js_name = submitPost, catch)]
    async fn js_submit_post(post: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = voidBackend, js_name = fetchPosts, catch)]
    async fn js_fetch_posts(
        anchor: &str,
        direction: &str,
        exclude_author: Option<String>,
        limit: u32,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = voidBackend, js_name = upsertUserActivity, catch)]
    async fn js_upsert_user_activity(uid: &str, timestamp_ms: f64) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = voidBackend, js_name = signInAnonymously, catch)]
    async fn js_sign_in_anonymously() -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = voidBackend, js_name = onIdentityChanged)]
    fn js_on_identity_changed(callback: &Closure<dyn FnMut(JsValue)>);
}

/// Map a JS rejection from `operation` to a store error
fn store_error(err: JsValue, operation: Operation) -> StoreError {
    let code = js_sys::Reflect::get(&err, &JsValue::from_str("code"))
        .ok()
        .and_then(|c| c.as_string());
    match code.as_deref() {
        Some(code) => StoreError::from_code(code, operation),
        None => StoreError::Unavailable(
            err.as_string()
                .unwrap_or_else(|| "unknown backend error".to_string()),
        ),
    }
}

fn decode<T: DeserializeOwned>(value: &JsValue) -> Result<T, StoreError> {
    let json = js_sys::JSON::stringify(value)
        .map_err(|_| StoreError::Malformed("value is not serializable".to_string()))?;
    let json: String = json.into();
    serde_json::from_str(&json).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn encode<T: serde::Serialize>(value: &T) -> Result<JsValue, StoreError> {
    let json = serde_json::to_string(value).map_err(|e| StoreError::Malformed(e.to_string()))?;
    js_sys::JSON::parse(&json).map_err(|_| StoreError::Malformed("invalid JSON".to_string()))
}

/// Parse an identity notification payload (`null` means signed out)
fn identity_from_js(value: &JsValue) -> Option<Identity> {
    if value.is_null() || value.is_undefined() {
        return None;
    }
    match decode::<Identity>(value) {
        Ok(identity) => Some(identity),
        Err(e) => {
            log::warn!("Unreadable identity notification: {}", e);
            None
        }
    }
}

/// `VoidStore` backed by `window.voidBackend`
pub struct JsStore {
    rng: RefCell<Pcg32>,
}

impl JsStore {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(Pcg32::seed_from_u64(seed)),
        }
    }

    /// Register `handler` for identity changes
    ///
    /// The handler may be called any number of times, including with `None`
    /// between two identities. The registration lives for the page.
    pub fn subscribe_identity(&self, mut handler: impl FnMut(Option<Identity>) + 'static) {
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            handler(identity_from_js(&value));
        });
        js_on_identity_changed(&closure);
        closure.forget();
    }
}

#[async_trait(?Send)]
impl VoidStore for JsStore {
    async fn submit_post(&self, post: NewPost) -> Result<PostId, StoreError> {
        let payload = encode(&post)?;
        let id = js_submit_post(payload)
            .await
            .map_err(|e| store_error(e, Operation::SubmitPost))?;
        id.as_string()
            .map(PostId::new)
            .ok_or_else(|| StoreError::Malformed("submitPost did not return an id".to_string()))
    }

    async fn fetch_posts(
        &self,
        range: IdRange,
        exclude_author: Option<&AuthorId>,
        limit: usize,
    ) -> Result<Vec<Post>, StoreError> {
        let direction = match range {
            IdRange::AtOrAfter(_) => "asc",
            IdRange::Before(_) => "desc",
        };
        let value = js_fetch_posts(
            range.anchor().as_str(),
            direction,
            exclude_author.map(|a| a.as_str().to_string()),
            limit as u32,
        )
        .await
        .map_err(|e| store_error(e, Operation::FetchPosts))?;
        decode(&value)
    }

    fn generate_probe_id(&self) -> PostId {
        auto_id(&mut *self.rng.borrow_mut())
    }

    async fn upsert_user_activity(
        &self,
        author: &AuthorId,
        timestamp_ms: f64,
    ) -> Result<(), StoreError> {
        js_upsert_user_activity(author.as_str(), timestamp_ms)
            .await
            .map(|_| ())
            .map_err(|e| store_error(e, Operation::UpsertActivity))
    }

    async fn sign_in_anonymously(&self) -> Result<Identity, StoreError> {
        let value = js_sign_in_anonymously()
            .await
            .map_err(|e| store_error(e, Operation::SignIn))?;
        decode(&value)
    }
}
