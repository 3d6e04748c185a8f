use crate::application::dto::posts::PostInput;
use crate::application::ports::post_repository::PostRepository;
use crate::application::services::tagging;
use crate::application::use_cases::posts::{PostError, validate};

pub struct CreatePost<'a, R: PostRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: PostRepository + ?Sized> CreatePost<'a, R> {
    /// Inserts the post and links every requested tag in one unit-of-work.
    pub async fn execute(&self, input: PostInput) -> Result<i64, PostError> {
        let (draft, tags) = validate(input)?;
        let mut uow = self.repo.begin().await?;
        let post_id = uow.insert_post(&draft).await?;
        tagging::attach_tags(uow.as_mut(), post_id, &tags).await?;
        uow.commit().await?;
        tracing::info!(post_id, tags = tags.len(), "post_created");
        Ok(post_id)
    }
}
