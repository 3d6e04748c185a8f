use std::collections::{BTreeSet, HashMap};

use crate::application::ports::post_repository::{PostUnitOfWork, TagStore};

/// Maps a tag name to its id, creating the tag on first use.
///
/// Runs inside the caller's unit-of-work. When a concurrent writer creates the
/// same name between the lookup and the insert, the unique constraint rejects
/// our row and the winner's id is re-read instead.
pub async fn resolve_tag<S: TagStore + ?Sized>(store: &mut S, name: &str) -> anyhow::Result<i64> {
    if let Some(id) = store.find_tag_id(name).await? {
        return Ok(id);
    }
    if let Some(id) = store.insert_tag(name).await? {
        tracing::debug!(tag = %name, tag_id = id, "tag_created");
        return Ok(id);
    }
    tracing::warn!(tag = %name, "tag_insert_conflict");
    store
        .find_tag_id(name)
        .await?
        .ok_or_else(|| anyhow::anyhow!("tag {name:?} conflicted on insert but was not found"))
}

/// Links every name to the post, in input order.
///
/// Distinct names are resolved first in sorted order. A tag insert waits on
/// any uncommitted insert of the same name, so concurrent writers that create
/// overlapping tags must take those waits in one global order.
pub async fn attach_tags<U: PostUnitOfWork + ?Sized>(
    uow: &mut U,
    post_id: i64,
    names: &[String],
) -> anyhow::Result<()> {
    let distinct: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    let mut ids: HashMap<&str, i64> = HashMap::with_capacity(distinct.len());
    for name in distinct {
        ids.insert(name, resolve_tag(uow, name).await?);
    }
    for name in names {
        let tag_id = ids
            .get(name.as_str())
            .copied()
            .ok_or_else(|| anyhow::anyhow!("tag {name:?} was not resolved"))?;
        uow.link_post_tag(post_id, tag_id).await?;
    }
    Ok(())
}
