//! Group parent resolution during domain migration.
//!
//! Migration overwrites each group's specific id with its new numeric id as
//! it scans, so a parent looked up against live rows would resolve
//! differently depending on scan order. Resolution therefore runs against an
//! immutable snapshot of the domain's groups taken before the first
//! write-back: every parent lookup observes pre-migration specific ids,
//! whatever the order.

use tracing::warn;

use crate::ident::encode_specific_id;
use crate::store::SourceGroup;

/// Resolves the new numeric parent id of `group`.
///
/// Returns `None` for a root group. A parent reference that matches no
/// group of the snapshot is dangling (the parent was removed, or belongs to
/// another domain); the link is dropped with a warning rather than failing
/// the migration.
#[must_use]
pub fn resolve_parent(domain_id: i64, group: &SourceGroup, snapshot: &[SourceGroup]) -> Option<i64> {
    let parent_specific_id = group.parent_specific_id.as_deref()?;
    match snapshot
        .iter()
        .find(|candidate| candidate.specific_id == parent_specific_id)
    {
        Some(parent) => Some(encode_specific_id(&parent.specific_id)),
        None => {
            warn!(
                domain_id,
                group_id = group.id,
                parent_specific_id,
                "dangling parent reference, group becomes a root"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(id: i64, specific_id: &str, parent: Option<&str>) -> SourceGroup {
        SourceGroup {
            id,
            specific_id: specific_id.to_string(),
            parent_specific_id: parent.map(str::to_string),
        }
    }

    #[test]
    fn root_group_has_no_parent() {
        let snapshot = vec![group(1, "X", None)];
        assert_eq!(resolve_parent(5, &snapshot[0], &snapshot), None);
    }

    #[test]
    fn parent_resolves_to_its_encoded_specific_id() {
        let snapshot = vec![group(1, "X", None), group(2, "Y", Some("X"))];
        assert_eq!(
            resolve_parent(5, &snapshot[1], &snapshot),
            Some(encode_specific_id("X"))
        );
    }

    #[test]
    fn numeric_parent_ids_resolve_to_themselves() {
        let snapshot = vec![group(1, "10", None), group(2, "11", Some("10"))];
        assert_eq!(resolve_parent(5, &snapshot[1], &snapshot), Some(10));
    }

    #[test]
    fn dangling_parent_is_dropped() {
        let snapshot = vec![group(3, "C", Some("Z"))];
        assert_eq!(resolve_parent(5, &snapshot[0], &snapshot), None);
    }

    #[test]
    fn resolution_is_independent_of_snapshot_order() {
        let forward = vec![group(1, "X", None), group(2, "Y", Some("X"))];
        let backward = vec![forward[1].clone(), forward[0].clone()];
        assert_eq!(
            resolve_parent(5, &forward[1], &forward),
            resolve_parent(5, &backward[0], &backward)
        );
    }
}
