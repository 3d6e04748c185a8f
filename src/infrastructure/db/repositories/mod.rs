pub mod post_repository_sqlx;
