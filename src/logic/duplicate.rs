use crate::logic::param_walk::{self, LeafTransform};
use crate::logic::reference::CaseRef;
use crate::model::{Case, Id, NewCase, ParamTree, UserContext};
use crate::store::traits::Store;
use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum DuplicateError {
    #[error("invalid duplication request: {0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Import request for a destination collection.
///
/// With `source_case_ids` empty this is a fresh import: one new case per
/// interface, seeded from the interface itself. With `source_case_ids`
/// present (1:1 with `interface_ids` by position) it is a
/// duplicate-with-rewrite of existing cases.
#[derive(Debug, Clone, Deserialize)]
pub struct DuplicateRequest {
    pub col_id: Id,
    pub project_id: Id,
    pub interface_ids: Vec<Id>,
    #[serde(default)]
    pub source_case_ids: Vec<Id>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedImport {
    pub interface_id: Id,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct DuplicateOutcome {
    pub created: Vec<Case>,
    /// Items whose interface or source case no longer exists. Reported, not
    /// fatal to the batch.
    pub skipped: Vec<SkippedImport>,
    /// Reference values that could not be re-pointed at a sibling in the
    /// destination collection, one entry per occurrence site. These are left
    /// exactly as they were.
    pub unresolved: Vec<String>,
}

pub struct Duplicator;

impl Duplicator {
    pub async fn duplicate<S: Store>(
        store: &S,
        user: &UserContext,
        req: DuplicateRequest,
    ) -> Result<DuplicateOutcome, DuplicateError> {
        Self::validate(&req)?;

        let mut created = Vec::new();
        let mut skipped = Vec::new();
        let rewrite = !req.source_case_ids.is_empty();

        // Phase 1: create every destination case. Nothing is rewritten yet;
        // a reference may point forward at a sibling created later in this
        // same batch, so rewriting cannot be interleaved with creation.
        if rewrite {
            for (interface_id, source_id) in req.interface_ids.iter().zip(&req.source_case_ids) {
                let Some(source) = store.get_case(source_id).await? else {
                    log::warn!("skipping import of interface {interface_id}: source case {source_id} not found");
                    skipped.push(SkippedImport {
                        interface_id: interface_id.clone(),
                        reason: format!("source case {source_id} not found"),
                    });
                    continue;
                };
                let case = store
                    .save_case(NewCase::duplicate_of(&source, &req.col_id), user)
                    .await?;
                log::info!(
                    "user {} duplicated case {} as {} into collection {}",
                    user.user_id,
                    source.id,
                    case.id,
                    req.col_id
                );
                created.push(case);
            }
        } else {
            for interface_id in &req.interface_ids {
                let Some(info) = store.get_interface_base_info(interface_id).await? else {
                    log::warn!("skipping import of interface {interface_id}: interface not found");
                    skipped.push(SkippedImport {
                        interface_id: interface_id.clone(),
                        reason: "interface not found".to_string(),
                    });
                    continue;
                };
                let case = store
                    .save_case(
                        NewCase {
                            interface_id: interface_id.clone(),
                            col_id: req.col_id.clone(),
                            project_id: req.project_id.clone(),
                            name: info.title,
                            case_env: None,
                            index: 0,
                            req_query: Vec::new(),
                            req_headers: Vec::new(),
                            req_params: Vec::new(),
                            req_body_form: Vec::new(),
                            req_body_type: info.req_body_type,
                            req_body_other: info.req_body_other,
                        },
                        user,
                    )
                    .await?;
                log::info!(
                    "user {} imported interface {} as case {} into collection {}",
                    user.user_id,
                    interface_id,
                    case.id,
                    req.col_id
                );
                created.push(case);
            }
        }

        // Phase 2: every new case exists and is addressable by id, so
        // cross-case references can now be re-pointed at their siblings.
        let mut unresolved = Vec::new();
        if rewrite {
            for case in created.iter_mut() {
                let changed = Self::rewrite_case(store, case, &mut unresolved).await?;
                if changed {
                    *case = store.update_case(case.clone(), user).await?;
                }
            }
        }

        Ok(DuplicateOutcome {
            created,
            skipped,
            unresolved,
        })
    }

    fn validate(req: &DuplicateRequest) -> Result<(), DuplicateError> {
        if req.col_id.is_empty() {
            return Err(DuplicateError::Validation("col_id must not be empty".into()));
        }
        if req.project_id.is_empty() {
            return Err(DuplicateError::Validation(
                "project_id must not be empty".into(),
            ));
        }
        if req.interface_ids.is_empty() {
            return Err(DuplicateError::Validation(
                "interface_ids must not be empty".into(),
            ));
        }
        if !req.source_case_ids.is_empty()
            && req.source_case_ids.len() != req.interface_ids.len()
        {
            return Err(DuplicateError::Validation(
                "source_case_ids must pair 1:1 with interface_ids".into(),
            ));
        }
        Ok(())
    }

    /// Rewrites every reference in one new case's parameters. Returns whether
    /// anything changed; unresolvable references are recorded and left as-is.
    async fn rewrite_case<S: Store>(
        store: &S,
        case: &mut Case,
        unresolved: &mut Vec<String>,
    ) -> Result<bool> {
        let mut rewriter = SiblingRewriter {
            store,
            dest_col_id: case.col_id.clone(),
            unresolved: Vec::new(),
        };

        let mut changed = false;
        if let Some(body) = &case.req_body_other {
            if let Some(rewritten) = param_walk::walk_body_object(body, &mut rewriter).await? {
                case.req_body_other = Some(rewritten);
                changed = true;
            }
        }

        let mut query = ParamTree::List(std::mem::take(&mut case.req_query));
        let query_changed = param_walk::walk_tree(&mut query, &mut rewriter).await?;
        if let ParamTree::List(records) = query {
            case.req_query = records;
        }
        changed |= query_changed;

        unresolved.append(&mut rewriter.unresolved);
        Ok(changed)
    }
}

/// The rewrite transform: parse the leaf as a reference, look up the original
/// target to learn its (interface, index), and substitute the destination
/// collection's case at the same coordinates.
struct SiblingRewriter<'a, S: Store> {
    store: &'a S,
    dest_col_id: Id,
    unresolved: Vec<String>,
}

#[async_trait::async_trait]
impl<'a, S: Store> LeafTransform for SiblingRewriter<'a, S> {
    async fn apply(&mut self, _key: &str, value: &str) -> Result<Option<String>> {
        let Some(reference) = CaseRef::parse(value) else {
            return Ok(None);
        };
        let Some(target) = self.store.get_case(&reference.source_case_id).await? else {
            // The referenced case is gone; nothing to correlate against.
            self.unresolved.push(value.to_string());
            return Ok(None);
        };
        let sibling = self
            .store
            .find_case_by_interface_and_index(&self.dest_col_id, &target.interface_id, target.index)
            .await?;
        match sibling {
            Some(sibling) => Ok(Some(reference.with_source(&sibling.id))),
            None => {
                // Target was not part of this batch; leave the reference
                // dangling rather than guessing.
                self.unresolved.push(value.to_string());
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn request(interface_ids: Vec<&str>, source_case_ids: Vec<&str>) -> DuplicateRequest {
        DuplicateRequest {
            col_id: "col-dest".to_string(),
            project_id: "project-1".to_string(),
            interface_ids: interface_ids.into_iter().map(String::from).collect(),
            source_case_ids: source_case_ids.into_iter().map(String::from).collect(),
        }
    }

    #[tokio::test]
    async fn rejects_empty_interface_list() {
        let store = MemoryStore::new();
        let err = Duplicator::duplicate(&store, &UserContext::system(), request(vec![], vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, DuplicateError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_mismatched_source_list() {
        let store = MemoryStore::new();
        let err = Duplicator::duplicate(
            &store,
            &UserContext::system(),
            request(vec!["if-1", "if-2"], vec!["case-1"]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DuplicateError::Validation(_)));
    }

    #[tokio::test]
    async fn rejects_missing_destination_ids() {
        let store = MemoryStore::new();
        let mut req = request(vec!["if-1"], vec![]);
        req.col_id = String::new();
        let err = Duplicator::duplicate(&store, &UserContext::system(), req)
            .await
            .unwrap_err();
        assert!(matches!(err, DuplicateError::Validation(_)));
    }

    #[tokio::test]
    async fn fresh_import_reports_missing_interfaces() {
        let store = MemoryStore::new();
        let outcome = Duplicator::duplicate(
            &store,
            &UserContext::system(),
            request(vec!["if-gone"], vec![]),
        )
        .await
        .unwrap();
        assert!(outcome.created.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].interface_id, "if-gone");
    }
}
