use crate::application::ports::post_repository::PostRepository;
use crate::application::services::posts::fold_rows;
use crate::domain::posts::post::Post;

pub struct GetPost<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PostRepository + ?Sized> GetPost<'a, R> {
    pub async fn execute(&self, id: i64) -> anyhow::Result<Option<Post>> {
        let rows = self.repo.get_rows(id).await?;
        Ok(fold_rows(rows).into_iter().next())
    }
}
