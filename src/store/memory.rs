//! In-process backend
//!
//! Posts are kept in a `BTreeMap` keyed by id so range probes behave like the
//! hosted backend's ordered id queries. Used by the native demo and tests;
//! failures can be queued to exercise error paths.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

use async_trait::async_trait;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::id::auto_id;
use super::{AuthorId, IdRange, Identity, NewPost, Post, PostId, StoreError, VoidStore};
use crate::platform::Clock;

pub struct MemoryStore {
    posts: RefCell<BTreeMap<PostId, Post>>,
    activity: RefCell<HashMap<AuthorId, f64>>,
    rng: RefCell<Pcg32>,
    clock: Rc<dyn Clock>,
    next_anon: Cell<u64>,
    submit_failures: RefCell<VecDeque<StoreError>>,
    fetch_failures: RefCell<VecDeque<StoreError>>,
    sign_in_failure: RefCell<Option<StoreError>>,
}

impl MemoryStore {
    pub fn new(clock: Rc<dyn Clock>, seed: u64) -> Self {
        Self {
            posts: RefCell::new(BTreeMap::new()),
            activity: RefCell::new(HashMap::new()),
            rng: RefCell::new(Pcg32::seed_from_u64(seed)),
            clock,
            next_anon: Cell::new(1),
            submit_failures: RefCell::new(VecDeque::new()),
            fetch_failures: RefCell::new(VecDeque::new()),
            sign_in_failure: RefCell::new(None),
        }
    }

    /// Insert a post directly (seeding)
    pub fn insert(&self, author: &AuthorId, content: &str) -> PostId {
        let id = auto_id(&mut *self.rng.borrow_mut());
        self.insert_with_id(id.clone(), author, content);
        id
    }

    pub fn insert_with_id(&self, id: PostId, author: &AuthorId, content: &str) {
        let post = Post {
            id: id.clone(),
            content: content.to_string(),
            author_id: author.clone(),
            created_at: self.clock.now_ms(),
        };
        self.posts.borrow_mut().insert(id, post);
    }

    pub fn len(&self) -> usize {
        self.posts.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.borrow().is_empty()
    }

    pub fn posts_by(&self, author: &AuthorId) -> Vec<Post> {
        self.posts
            .borrow()
            .values()
            .filter(|p| &p.author_id == author)
            .cloned()
            .collect()
    }

    pub fn last_activity(&self, author: &AuthorId) -> Option<f64> {
        self.activity.borrow().get(author).copied()
    }

    /// Make the next submit fail with `err`
    pub fn fail_next_submit(&self, err: StoreError) {
        self.submit_failures.borrow_mut().push_back(err);
    }

    /// Make the next fetch fail with `err`
    pub fn fail_next_fetch(&self, err: StoreError) {
        self.fetch_failures.borrow_mut().push_back(err);
    }

    /// Make anonymous sign-in fail with `err`
    pub fn fail_sign_in(&self, err: StoreError) {
        *self.sign_in_failure.borrow_mut() = Some(err);
    }
}

#[async_trait(?Send)]
impl VoidStore for MemoryStore {
    async fn submit_post(&self, post: NewPost) -> Result<PostId, StoreError> {
        if let Some(err) = self.submit_failures.borrow_mut().pop_front() {
            return Err(err);
        }
        let id = auto_id(&mut *self.rng.borrow_mut());
        self.insert_with_id(id.clone(), &post.author_id, &post.content);
        log::debug!("Stored post {} ({} words)", id, post.content_words.len());
        Ok(id)
    }

    async fn fetch_posts(
        &self,
        range: IdRange,
        exclude_author: Option<&AuthorId>,
        limit: usize,
    ) -> Result<Vec<Post>, StoreError> {
        if let Some(err) = self.fetch_failures.borrow_mut().pop_front() {
            return Err(err);
        }
        let posts = self.posts.borrow();
        let keep = |p: &&Post| exclude_author.is_none_or(|a| &p.author_id != a);
        let batch: Vec<Post> = match &range {
            IdRange::AtOrAfter(anchor) => posts
                .range(anchor.clone()..)
                .map(|(_, p)| p)
                .filter(keep)
                .take(limit)
                .cloned()
                .collect(),
            IdRange::Before(anchor) => posts
                .range(..anchor.clone())
                .rev()
                .map(|(_, p)| p)
                .filter(keep)
                .take(limit)
                .cloned()
                .collect(),
        };
        Ok(batch)
    }

    fn generate_probe_id(&self) -> PostId {
        auto_id(&mut *self.rng.borrow_mut())
    }

    async fn upsert_user_activity(
        &self,
        author: &AuthorId,
        timestamp_ms: f64,
    ) -> Result<(), StoreError> {
        self.activity
            .borrow_mut()
            .insert(author.clone(), timestamp_ms);
        Ok(())
    }

    async fn sign_in_anonymously(&self) -> Result<Identity, StoreError> {
        if let Some(err) = self.sign_in_failure.borrow().clone() {
            return Err(err);
        }
        let n = self.next_anon.get();
        self.next_anon.set(n + 1);
        Ok(Identity {
            uid: AuthorId::new(format!("anon-{}", n)),
            admin: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualClock;
    use pollster::block_on;

    fn store() -> MemoryStore {
        MemoryStore::new(Rc::new(ManualClock::new(1_000.0)), 42)
    }

    #[test]
    fn test_submit_assigns_id_and_timestamp() {
        let store = store();
        let author = AuthorId::new("u1");
        let id = block_on(store.submit_post(NewPost::new("hello void", author.clone()))).unwrap();
        let posts = store.posts_by(&author);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, id);
        assert_eq!(posts[0].created_at, 1_000.0);
    }

    #[test]
    fn test_range_queries_are_ordered() {
        let store = store();
        let a = AuthorId::new("a");
        for id in ["b", "d", "f", "h"] {
            store.insert_with_id(PostId::new(id), &a, id);
        }
        let after = block_on(store.fetch_posts(IdRange::AtOrAfter(PostId::new("d")), None, 2)).unwrap();
        let ids: Vec<&str> = after.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["d", "f"]);

        let before = block_on(store.fetch_posts(IdRange::Before(PostId::new("g")), None, 10)).unwrap();
        let ids: Vec<&str> = before.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["f", "d", "b"]);
    }

    #[test]
    fn test_fetch_excludes_author() {
        let store = store();
        let me = AuthorId::new("me");
        let other = AuthorId::new("other");
        store.insert_with_id(PostId::new("a"), &me, "mine");
        store.insert_with_id(PostId::new("b"), &other, "theirs");
        let batch =
            block_on(store.fetch_posts(IdRange::AtOrAfter(PostId::new("")), Some(&me), 10)).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].content, "theirs");
    }

    #[test]
    fn test_queued_failures_fire_once() {
        let store = store();
        store.fail_next_submit(StoreError::RateLimited);
        let author = AuthorId::new("u1");
        assert_eq!(
            block_on(store.submit_post(NewPost::new("one", author.clone()))),
            Err(StoreError::RateLimited)
        );
        assert!(block_on(store.submit_post(NewPost::new("two", author))).is_ok());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_anonymous_identities_are_distinct() {
        let store = store();
        let a = block_on(store.sign_in_anonymously()).unwrap();
        let b = block_on(store.sign_in_anonymously()).unwrap();
        assert_ne!(a.uid, b.uid);
        assert!(!a.admin);
    }
}
