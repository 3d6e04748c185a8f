use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::dto::posts::PostInput;
use crate::application::use_cases::posts::create_post::CreatePost;
use crate::application::use_cases::posts::delete_post::DeletePost;
use crate::application::use_cases::posts::get_post::GetPost;
use crate::application::use_cases::posts::list_posts::ListPosts;
use crate::application::use_cases::posts::update_post::UpdatePost;
use crate::bootstrap::app_context::AppContext;
use crate::domain::posts::post as domain;
use crate::presentation::http::error::{ApiError, ErrorBody};

#[derive(Debug, Serialize, ToSchema)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub tags: Vec<String>,
}

impl From<domain::Post> for Post {
    fn from(p: domain::Post) -> Self {
        Post {
            id: p.id,
            title: p.title,
            content: p.content,
            category: p.category,
            created_at: p.created_at,
            updated_at: p.updated_at,
            tags: p.tags,
        }
    }
}

/// Body of create and update. Fields are optional here so that a missing
/// field is reported by validation with a JSON error, not by the extractor.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl From<PostRequest> for PostInput {
    fn from(r: PostRequest) -> Self {
        PostInput {
            title: r.title,
            content: r.content,
            category: r.category,
            tags: r.tags,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatePostResponse {
    pub message: String,
    #[serde(rename = "postId")]
    pub post_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    pub term: Option<String>,
}

#[utoipa::path(post, path = "/posts", tag = "Posts", request_body = PostRequest,
    responses(
        (status = 201, body = CreatePostResponse),
        (status = 400, body = ErrorBody),
        (status = 500, body = ErrorBody)
    ))]
pub async fn create_post(
    State(ctx): State<AppContext>,
    body: Result<Json<PostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatePostResponse>), ApiError> {
    let Json(req) = body?;
    let repo = ctx.post_repo();
    let uc = CreatePost {
        repo: repo.as_ref(),
    };
    let post_id = uc.execute(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatePostResponse {
            message: "Post Created".into(),
            post_id,
        }),
    ))
}

#[utoipa::path(get, path = "/posts", tag = "Posts",
    params(("term" = Option<String>, Query, description = "Case-insensitive search over title, content, category and tags")),
    responses((status = 200, body = [Post]), (status = 500, body = ErrorBody)))]
pub async fn list_posts(
    State(ctx): State<AppContext>,
    Query(q): Query<ListPostsQuery>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let repo = ctx.post_repo();
    let uc = ListPosts {
        repo: repo.as_ref(),
    };
    let posts = uc.execute(q.term).await?;
    Ok(Json(posts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(get, path = "/posts/{id}", tag = "Posts",
    params(("id" = i64, Path, description = "Post ID")),
    responses((status = 200, body = Post), (status = 404, body = ErrorBody)))]
pub async fn get_post(
    State(ctx): State<AppContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Post>, ApiError> {
    let Path(id) = id?;
    let repo = ctx.post_repo();
    let uc = GetPost {
        repo: repo.as_ref(),
    };
    let post = uc.execute(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(post.into()))
}

#[utoipa::path(put, path = "/posts/{id}", tag = "Posts", request_body = PostRequest,
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody)
    ))]
pub async fn update_post(
    State(ctx): State<AppContext>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<PostRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    let Json(req) = body?;
    let repo = ctx.post_repo();
    let uc = UpdatePost {
        repo: repo.as_ref(),
    };
    if !uc.execute(id, req.into()).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Json(MessageResponse {
        message: "Post updated successfully".into(),
    }))
}

#[utoipa::path(delete, path = "/posts/{id}", tag = "Posts",
    params(("id" = i64, Path, description = "Post ID")),
    responses((status = 204), (status = 404, body = ErrorBody)))]
pub async fn delete_post(
    State(ctx): State<AppContext>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let repo = ctx.post_repo();
    let uc = DeletePost {
        repo: repo.as_ref(),
    };
    if uc.execute(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .with_state(ctx)
}
