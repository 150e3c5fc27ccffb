#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chirp_server::error::DatabaseError;
use chirp_server::feed::{ContentRef, FeedStore, TagMatch};
use chirp_server::{AppError, AppState, Result, Settings, User, UserStore};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

struct StoredPost {
    content: ContentRef,
    tags: Vec<String>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    follows: HashMap<Uuid, HashSet<Uuid>>,
    interests: HashMap<Uuid, Vec<String>>,
    posts: Vec<StoredPost>,
}

/// In-memory stand-in for the Postgres store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add_user(&self, name: &str) -> Uuid {
        let user = User::new(format!("{}@example.com", name), Some(name.to_string()), "unused".into());
        let id = user.id;
        self.inner.write().unwrap().users.insert(id, user);
        id
    }

    pub fn follow(&self, follower: Uuid, followee: Uuid) {
        self.inner
            .write()
            .unwrap()
            .follows
            .entry(follower)
            .or_default()
            .insert(followee);
    }

    pub fn set_interests(&self, user: Uuid, labels: &[&str]) {
        self.inner
            .write()
            .unwrap()
            .interests
            .insert(user, labels.iter().map(|l| l.to_string()).collect());
    }

    pub fn add_post(&self, author: Uuid, created_at: DateTime<Utc>, tags: &[&str]) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().unwrap().posts.push(StoredPost {
            content: ContentRef { id, author_id: author, created_at },
            tags: tags.iter().map(|t| t.to_string()).collect(),
        });
        id
    }
}

fn newest_first(items: &mut [ContentRef]) {
    items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

#[async_trait]
impl FeedStore for MemoryStore {
    async fn viewer_exists(&self, viewer_id: Uuid) -> Result<bool> {
        Ok(self.inner.read().unwrap().users.contains_key(&viewer_id))
    }

    async fn followed_author_ids(&self, viewer_id: Uuid) -> Result<HashSet<Uuid>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .follows
            .get(&viewer_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn interest_labels(&self, viewer_id: Uuid) -> Result<HashSet<String>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .interests
            .get(&viewer_id)
            .map(|labels| labels.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn recent_by_authors(&self, author_ids: &[Uuid], limit: i64) -> Result<Vec<ContentRef>> {
        let inner = self.inner.read().unwrap();
        let mut items: Vec<ContentRef> = inner
            .posts
            .iter()
            .filter(|p| author_ids.contains(&p.content.author_id))
            .map(|p| p.content.clone())
            .collect();
        newest_first(&mut items);
        items.truncate(limit as usize);
        Ok(items)
    }

    async fn recent_by_tag_labels(
        &self,
        labels: &[String],
        exclude_author: Option<Uuid>,
        limit: i64,
    ) -> Result<Vec<TagMatch>> {
        let inner = self.inner.read().unwrap();
        let mut matches: Vec<TagMatch> = inner
            .posts
            .iter()
            .filter(|p| Some(p.content.author_id) != exclude_author)
            .filter_map(|p| {
                let count = p
                    .tags
                    .iter()
                    .filter(|t| labels.contains(&t.to_lowercase()))
                    .count() as i64;
                (count > 0).then(|| TagMatch { content: p.content.clone(), matched_tag_count: count })
            })
            .collect();
        matches.sort_by(|a, b| {
            (b.matched_tag_count, b.content.created_at, b.content.id)
                .cmp(&(a.matched_tag_count, a.content.created_at, a.content.id))
        });
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn global_recent(
        &self,
        exclude_author: Option<Uuid>,
        exclude_ids: &[Uuid],
        limit: i64,
    ) -> Result<Vec<ContentRef>> {
        let inner = self.inner.read().unwrap();
        let mut items: Vec<ContentRef> = inner
            .posts
            .iter()
            .filter(|p| Some(p.content.author_id) != exclude_author)
            .filter(|p| !exclude_ids.contains(&p.content.id))
            .map(|p| p.content.clone())
            .collect();
        newest_first(&mut items);
        items.truncate(limit as usize);
        Ok(items)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<User> {
        let mut inner = self.inner.write().unwrap();
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(AppError::DatabaseError(DatabaseError::Duplicate));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.inner.read().unwrap().users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_interests(&self, user_id: Uuid) -> Result<Vec<String>> {
        Ok(self
            .inner
            .read()
            .unwrap()
            .interests
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_interests(&self, user_id: Uuid, labels: &[String]) -> Result<()> {
        self.inner
            .write()
            .unwrap()
            .interests
            .insert(user_id, labels.to_vec());
        Ok(())
    }
}

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn test_settings() -> Settings {
    Settings::new_for_test().expect("Failed to load test config")
}

pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    AppState::from_stores(test_settings(), store.clone(), store).expect("Failed to build test state")
}
