use async_trait::async_trait;

use crate::domain::posts::post::{PostDraft, PostRow};

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Opens a unit-of-work. Dropping it without `commit` rolls everything back.
    async fn begin(&self) -> anyhow::Result<Box<dyn PostUnitOfWork>>;

    // term: None => every post; Some(t) => posts whose title, content, category
    // or any tag name contains t (case-insensitive)
    async fn list_rows(&self, term: Option<&str>) -> anyhow::Result<Vec<PostRow>>;

    async fn get_rows(&self, id: i64) -> anyhow::Result<Vec<PostRow>>;

    // Returns false if no post had this id
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

/// Storage seen by the tag resolver.
#[async_trait]
pub trait TagStore: Send {
    async fn find_tag_id(&mut self, name: &str) -> anyhow::Result<Option<i64>>;

    /// Inserts a tag row. `None` means the unique name constraint rejected it.
    async fn insert_tag(&mut self, name: &str) -> anyhow::Result<Option<i64>>;
}

#[async_trait]
pub trait PostUnitOfWork: TagStore {
    async fn insert_post(&mut self, draft: &PostDraft) -> anyhow::Result<i64>;

    /// Locks the post row for the rest of the unit-of-work; false if absent.
    async fn lock_post(&mut self, id: i64) -> anyhow::Result<bool>;

    async fn update_post(&mut self, id: i64, draft: &PostDraft) -> anyhow::Result<()>;

    async fn clear_post_tags(&mut self, post_id: i64) -> anyhow::Result<()>;

    /// Links a post to a tag; linking an already linked pair is a no-op.
    async fn link_post_tag(&mut self, post_id: i64, tag_id: i64) -> anyhow::Result<()>;

    async fn commit(self: Box<Self>) -> anyhow::Result<()>;
}
