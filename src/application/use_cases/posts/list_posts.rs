use crate::application::ports::post_repository::PostRepository;
use crate::application::services::posts::{fold_rows, normalize_term};
use crate::domain::posts::post::Post;

pub struct ListPosts<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PostRepository + ?Sized> ListPosts<'a, R> {
    pub async fn execute(&self, term: Option<String>) -> anyhow::Result<Vec<Post>> {
        let term = normalize_term(term);
        let rows = self.repo.list_rows(term.as_deref()).await?;
        Ok(fold_rows(rows))
    }
}
