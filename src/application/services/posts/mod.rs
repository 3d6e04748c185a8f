use std::collections::HashMap;

use crate::domain::posts::post::{Post, PostRow};

/// Folds join rows into posts, one per id, in first-seen order.
/// Rows with a null tag (posts without tags) contribute no tag name.
pub fn fold_rows(rows: Vec<PostRow>) -> Vec<Post> {
    let mut out: Vec<Post> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();
    for row in rows {
        let slot = match index.get(&row.id) {
            Some(&i) => i,
            None => {
                index.insert(row.id, out.len());
                out.push(Post {
                    id: row.id,
                    title: row.title,
                    content: row.content,
                    category: row.category,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                    tags: Vec::new(),
                });
                out.len() - 1
            }
        };
        if let Some(tag) = row.tag {
            out[slot].tags.push(tag);
        }
    }
    out
}

/// Builds an ILIKE pattern matching `term` literally as a substring.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Blank search terms mean "no filter".
pub fn normalize_term(term: Option<String>) -> Option<String> {
    term.filter(|s| !s.trim().is_empty())
}
