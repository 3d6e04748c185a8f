pub mod posts;
pub mod tagging;
