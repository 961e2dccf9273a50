use futures::future::{join_all, BoxFuture, FutureExt};

use crate::model::term::{Term, TermSet};
use crate::services::taxonomy::{TaxonomyService, TermRecord};

/// Top-level ancestor data threaded down to every descendant.
#[derive(Debug, Clone)]
struct Lineage {
    main_parent_id: String,
    parent_name: String,
}

/// Resolves each set name inside the group and builds the term forest.
///
/// Names are processed in order and duplicates are kept. A name that matches
/// nothing is skipped; a name whose lookup fails is logged and skipped. Term
/// fetch failures only empty the branch they occurred in.
pub async fn build_forest(
    service: &dyn TaxonomyService,
    group_id: &str,
    set_names: &[String],
) -> Vec<TermSet> {
    let mut forest: Vec<TermSet> = Vec::new();

    for name in set_names {
        let sets = match service.find_sets_by_name(group_id, name).await {
            Ok(sets) => sets,
            Err(e) => {
                tracing::warn!(group_id, set_name = %name, error = %e, "failed to resolve term set");
                continue;
            }
        };

        if sets.is_empty() {
            tracing::debug!(group_id, set_name = %name, "no term set matches name");
            continue;
        }

        for set in sets {
            let terms = fetch_level(service, &set.id, None, None, 1).await;
            forest.push(TermSet {
                set_name: set.display_name(),
                set_id: set.id,
                terms,
            });
        }
    }

    tracing::info!(group_id, sets = forest.len(), "term forest built");
    forest
}

fn fetch_level<'a>(
    service: &'a dyn TaxonomyService,
    set_id: &'a str,
    parent_term_id: Option<String>,
    lineage: Option<Lineage>,
    depth: u32,
) -> BoxFuture<'a, Vec<Term>> {
    async move {
        let records = match service.list_terms(set_id, parent_term_id.as_deref()).await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    set_id,
                    parent_term_id = ?parent_term_id,
                    error = %e,
                    "failed to fetch terms"
                );
                return Vec::new();
            }
        };

        // Siblings are fetched together; the level completes when all have.
        let pending = records
            .into_iter()
            .map(|record| build_term(service, set_id, record, lineage.clone(), depth));

        join_all(pending).await
    }
    .boxed()
}

async fn build_term(
    service: &dyn TaxonomyService,
    set_id: &str,
    record: TermRecord,
    lineage: Option<Lineage>,
    depth: u32,
) -> Term {
    let name = record.display_name();
    let lineage = lineage.unwrap_or_else(|| Lineage {
        main_parent_id: record.id.clone(),
        parent_name: name.clone(),
    });

    let children = if record.children_count > 0 {
        fetch_level(
            service,
            set_id,
            Some(record.id.clone()),
            Some(lineage.clone()),
            depth + 1,
        )
        .await
    } else {
        Vec::new()
    };

    Term {
        id: record.id,
        name,
        hierarchy_level: Term::hierarchy_level_for(depth),
        depth,
        set_id: set_id.to_string(),
        main_parent_id: Some(lineage.main_parent_id),
        parent_name: Some(lineage.parent_name),
        children,
    }
}
