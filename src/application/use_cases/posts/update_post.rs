use crate::application::dto::posts::PostInput;
use crate::application::ports::post_repository::PostRepository;
use crate::application::services::tagging;
use crate::application::use_cases::posts::{PostError, validate};

pub struct UpdatePost<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PostRepository + ?Sized> UpdatePost<'a, R> {
    /// Replaces the post's fields and its whole tag set atomically.
    /// Returns false if the post does not exist.
    pub async fn execute(&self, id: i64, input: PostInput) -> Result<bool, PostError> {
        let (draft, tags) = validate(input)?;
        let mut uow = self.repo.begin().await?;
        if !uow.lock_post(id).await? {
            return Ok(false);
        }
        uow.update_post(id, &draft).await?;
        uow.clear_post_tags(id).await?;
        tagging::attach_tags(uow.as_mut(), id, &tags).await?;
        uow.commit().await?;
        tracing::info!(post_id = id, tags = tags.len(), "post_updated");
        Ok(true)
    }
}
