pub mod create_post;
pub mod delete_post;
pub mod get_post;
pub mod list_posts;
pub mod update_post;

#[cfg(test)]
pub(crate) mod test_support;

use crate::application::dto::posts::PostInput;
use crate::domain::posts::post::PostDraft;

#[derive(thiserror::Error, Debug)]
pub enum PostError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Presence checks shared by create and update: absent or empty is missing,
/// anything else is kept as given. Runs before any storage call.
pub(crate) fn validate(input: PostInput) -> Result<(PostDraft, Vec<String>), PostError> {
    let present = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(title), Some(content), Some(category)) = (
        present(input.title),
        present(input.content),
        present(input.category),
    ) else {
        return Err(PostError::Validation("All fields required".into()));
    };
    let tags = input
        .tags
        .ok_or_else(|| PostError::Validation("tags must be provided".into()))?;
    if tags.iter().any(|t| t.is_empty()) {
        return Err(PostError::Validation("tag names must not be empty".into()));
    }
    Ok((
        PostDraft {
            title,
            content,
            category,
        },
        tags,
    ))
}
