use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::application::dto::posts::PostInput;
use crate::application::ports::post_repository::{PostRepository, PostUnitOfWork, TagStore};
use crate::domain::posts::post::{PostDraft, PostRow};

pub(crate) fn input(title: &str, tags: &[&str]) -> PostInput {
    PostInput {
        title: Some(title.to_string()),
        content: Some("content".into()),
        category: Some("general".into()),
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
    }
}

#[derive(Debug, Clone)]
struct StoredPost {
    draft: PostDraft,
    created_at: i64,
    updated_at: i64,
}

#[derive(Debug, Clone, Default)]
struct State {
    posts: BTreeMap<i64, StoredPost>,
    tags: BTreeMap<String, i64>,
    links: BTreeSet<(i64, i64)>,
    next_post: i64,
    next_tag: i64,
    clock: i64,
}

impl State {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn tag_names_of(&self, post_id: i64) -> Vec<String> {
        let mut names: Vec<String> = self
            .tags
            .iter()
            .filter(|(_, id)| self.links.contains(&(post_id, **id)))
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    fn rows_for(&self, id: i64, post: &StoredPost) -> Vec<PostRow> {
        let at = |t: i64| {
            chrono::DateTime::<chrono::Utc>::from_timestamp(1_700_000_000 + t, 0).unwrap_or_default()
        };
        let row = |tag: Option<String>| PostRow {
            id,
            title: post.draft.title.clone(),
            content: post.draft.content.clone(),
            category: post.draft.category.clone(),
            created_at: at(post.created_at),
            updated_at: at(post.updated_at),
            tag,
        };
        let names = self.tag_names_of(id);
        if names.is_empty() {
            vec![row(None)]
        } else {
            names.into_iter().map(|n| row(Some(n))).collect()
        }
    }
}

/// Serialises units of work behind one lock and stages writes until commit.
#[derive(Default)]
pub(crate) struct InMemoryPostRepository {
    state: Arc<Mutex<State>>,
    fail_on_tag: Option<String>,
}

impl InMemoryPostRepository {
    /// Linking a tag with this name fails, as a storage error would.
    pub(crate) fn failing_on_tag(name: &str) -> Self {
        Self {
            state: Arc::default(),
            fail_on_tag: Some(name.to_string()),
        }
    }

    pub(crate) async fn post_count(&self) -> usize {
        self.state.lock().await.posts.len()
    }

    pub(crate) async fn tag_count(&self) -> usize {
        self.state.lock().await.tags.len()
    }

    pub(crate) async fn link_count(&self) -> usize {
        self.state.lock().await.links.len()
    }

    pub(crate) async fn has_tag(&self, name: &str) -> bool {
        self.state.lock().await.tags.contains_key(name)
    }

    pub(crate) async fn tag_ids_of(&self, post_id: i64) -> BTreeSet<i64> {
        self.state
            .lock()
            .await
            .links
            .iter()
            .filter(|(p, _)| *p == post_id)
            .map(|(_, t)| *t)
            .collect()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn begin(&self) -> anyhow::Result<Box<dyn PostUnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(InMemoryUnitOfWork {
            guard,
            staged,
            fail_on_tag: self.fail_on_tag.clone(),
        }))
    }

    async fn list_rows(&self, term: Option<&str>) -> anyhow::Result<Vec<PostRow>> {
        let state = self.state.lock().await;
        let needle = term.map(str::to_lowercase);
        let mut out = Vec::new();
        for (id, post) in &state.posts {
            let matched = match &needle {
                None => true,
                Some(n) => {
                    [&post.draft.title, &post.draft.content, &post.draft.category]
                        .iter()
                        .any(|f| f.to_lowercase().contains(n.as_str()))
                        || state
                            .tag_names_of(*id)
                            .iter()
                            .any(|t| t.to_lowercase().contains(n.as_str()))
                }
            };
            if matched {
                out.extend(state.rows_for(*id, post));
            }
        }
        Ok(out)
    }

    async fn get_rows(&self, id: i64) -> anyhow::Result<Vec<PostRow>> {
        let state = self.state.lock().await;
        Ok(state
            .posts
            .get(&id)
            .map(|post| state.rows_for(id, post))
            .unwrap_or_default())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut state = self.state.lock().await;
        if state.posts.remove(&id).is_none() {
            return Ok(false);
        }
        state.links.retain(|(p, _)| *p != id);
        Ok(true)
    }
}

struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<State>,
    staged: State,
    fail_on_tag: Option<String>,
}

#[async_trait]
impl TagStore for InMemoryUnitOfWork {
    async fn find_tag_id(&mut self, name: &str) -> anyhow::Result<Option<i64>> {
        Ok(self.staged.tags.get(name).copied())
    }

    async fn insert_tag(&mut self, name: &str) -> anyhow::Result<Option<i64>> {
        if self.staged.tags.contains_key(name) {
            return Ok(None);
        }
        self.staged.next_tag += 1;
        let id = self.staged.next_tag;
        self.staged.tags.insert(name.to_string(), id);
        Ok(Some(id))
    }
}

#[async_trait]
impl PostUnitOfWork for InMemoryUnitOfWork {
    async fn insert_post(&mut self, draft: &PostDraft) -> anyhow::Result<i64> {
        let now = self.staged.tick();
        self.staged.next_post += 1;
        let id = self.staged.next_post;
        self.staged.posts.insert(
            id,
            StoredPost {
                draft: draft.clone(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(id)
    }

    async fn lock_post(&mut self, id: i64) -> anyhow::Result<bool> {
        Ok(self.staged.posts.contains_key(&id))
    }

    async fn update_post(&mut self, id: i64, draft: &PostDraft) -> anyhow::Result<()> {
        let now = self.staged.tick();
        let post = self
            .staged
            .posts
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("post {id} vanished"))?;
        post.draft = draft.clone();
        post.updated_at = now;
        Ok(())
    }

    async fn clear_post_tags(&mut self, post_id: i64) -> anyhow::Result<()> {
        self.staged.links.retain(|(p, _)| *p != post_id);
        Ok(())
    }

    async fn link_post_tag(&mut self, post_id: i64, tag_id: i64) -> anyhow::Result<()> {
        if let Some(fail) = &self.fail_on_tag {
            if self.staged.tags.get(fail) == Some(&tag_id) {
                anyhow::bail!("simulated failure linking {fail:?}");
            }
        }
        self.staged.links.insert((post_id, tag_id));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let InMemoryUnitOfWork {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }
}
