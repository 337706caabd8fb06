//! Reply-chain rebuild.
//!
//! During the import pass each comment's `rid` holds the provisional ordinal of
//! its parent. Once every record has been attempted, those values are rewritten
//! to the parents' final ids in one bulk correction. Only comments committed by
//! this run are touched; a parent that was skipped resolves to `0`.

use crate::remap::{IdentifierMapping, Ordinal};
use crate::store::ImportStore;
use anyhow::Result;

/// A comment written during the import pass, with the parent it declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedComment {
    pub comment_id: i64,
    pub provisional_parent: Option<Ordinal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RidCorrection {
    pub comment_id: i64,
    pub rid: i64,
}

/// Final parent id for every committed comment. Pure; no storage access.
pub fn plan_rid_corrections(
    committed: &[CommittedComment],
    mapping: &IdentifierMapping,
) -> Vec<RidCorrection> {
    committed
        .iter()
        .map(|comment| {
            let rid = comment
                .provisional_parent
                .and_then(|parent| mapping.final_id(parent))
                .unwrap_or(0);
            if rid == 0 {
                if let Some(parent) = comment.provisional_parent {
                    tracing::debug!(
                        comment_id = comment.comment_id,
                        %parent,
                        "parent was not imported, detaching reply"
                    );
                }
            }
            RidCorrection {
                comment_id: comment.comment_id,
                rid,
            }
        })
        .collect()
}

/// Plans and applies the corrections. Returns the number of rows rewritten.
pub fn rebuild_reply_chain<S: ImportStore + ?Sized>(
    store: &S,
    committed: &[CommittedComment],
    mapping: &IdentifierMapping,
) -> Result<usize> {
    let updates: Vec<(i64, i64)> = plan_rid_corrections(committed, mapping)
        .into_iter()
        .map(|correction| (correction.comment_id, correction.rid))
        .collect();
    let rewritten = store.rewrite_parents(&updates)?;
    tracing::info!(comments = committed.len(), rewritten, "reply chain rebuilt");
    Ok(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::NewComment;
    use crate::database::repositories::{CommentRepository, UserRepository};
    use crate::database::Database;

    fn ordinal(n: usize) -> Option<Ordinal> {
        Some(Ordinal::from_index(n - 1))
    }

    fn committed(comment_id: i64, provisional_parent: Option<Ordinal>) -> CommittedComment {
        CommittedComment {
            comment_id,
            provisional_parent,
        }
    }

    fn correction(comment_id: i64, rid: i64) -> RidCorrection {
        RidCorrection { comment_id, rid }
    }

    #[test]
    fn committed_parents_map_to_final_ids() {
        let mut mapping = IdentifierMapping::new();
        mapping.record_committed(Ordinal::from_index(0), 100);
        mapping.record_committed(Ordinal::from_index(2), 102);
        let committed = [committed(100, None), committed(102, ordinal(1))];
        let plan = plan_rid_corrections(&committed, &mapping);
        assert_eq!(plan, vec![correction(100, 0), correction(102, 100)]);
    }

    #[test]
    fn skipped_parent_resolves_to_no_parent() {
        let mut mapping = IdentifierMapping::new();
        mapping.record_committed(Ordinal::from_index(1), 7);
        let committed = [committed(7, ordinal(1))];
        let plan = plan_rid_corrections(&committed, &mapping);
        assert_eq!(plan, vec![correction(7, 0)]);
    }

    #[test]
    fn rebuild_only_touches_committed_comments() {
        let db = Database::open_in_memory().unwrap();
        let (bystander, parent, child) = db
            .with_repositories(|repos| {
                let user = repos.users().create("u", "u@example.com", "")?;
                let base = NewComment {
                    user_id: user.id,
                    ..NewComment::default()
                };
                // Pre-existing comment whose rid looks like a provisional ordinal.
                let reply = NewComment {
                    rid: 1,
                    ..base.clone()
                };
                let bystander = repos.comments().create(&reply)?;
                let parent = repos.comments().create(&base)?;
                let child = repos.comments().create(&reply)?;
                Ok((bystander, parent, child))
            })
            .unwrap();

        let mut mapping = IdentifierMapping::new();
        mapping.record_committed(Ordinal::from_index(0), parent);
        mapping.record_committed(Ordinal::from_index(1), child);
        let committed = [committed(parent, None), committed(child, ordinal(1))];
        let rewritten = rebuild_reply_chain(&db, &committed, &mapping).unwrap();
        assert_eq!(rewritten, 2);

        db.with_repositories(|repos| {
            assert_eq!(repos.comments().get(child)?.unwrap().rid, parent);
            assert_eq!(repos.comments().get(parent)?.unwrap().rid, 0);
            assert_eq!(repos.comments().get(bystander)?.unwrap().rid, 1);
            Ok(())
        })
        .unwrap();
    }
}
