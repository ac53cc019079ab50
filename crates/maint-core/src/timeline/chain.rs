//! Review chain resolution.
//!
//! A review delegated from one reviewer to another (typically a group handing
//! a review to one of its members) leaves one review row per hop, linked
//! through `assigned_from`. The timeline reports such a chain as a single
//! review: opened by the first reviewer, decided once, and both entries
//! attributed to the first reviewer when any delegation happened. The
//! delegation hops themselves are not reported.

use std::collections::HashMap;

use super::fact::{FactKind, FactSource, RawFact};
use crate::core::{CoreError, CoreResult};

/// One review row, as seen through its opening fact.
struct Hop<'a> {
    opened: &'a RawFact,
    assigned_from: Option<i64>,
    /// Accept/decline facts recorded on this review, in emission order.
    decisions: Vec<&'a RawFact>,
}

/// Collapse review facts into one opening and at most one terminal fact per
/// chain.
///
/// Every fact in `facts` must be a review fact. Output keeps chains in the
/// order their first review was emitted, opening fact before terminal fact.
pub fn resolve_review_chains(facts: &[RawFact]) -> CoreResult<Vec<RawFact>> {
    let mut order: Vec<i64> = Vec::new();
    let mut hops: HashMap<i64, Hop<'_>> = HashMap::new();

    for fact in facts.iter().filter(|f| f.kind == FactKind::ReviewOpened) {
        let FactSource::Review {
            review_id,
            assigned_from,
        } = fact.source
        else {
            return Err(CoreError::UnmappedFact {
                kind: fact.kind.as_str(),
            });
        };
        order.push(review_id);
        hops.insert(
            review_id,
            Hop {
                opened: fact,
                assigned_from,
                decisions: Vec::new(),
            },
        );
    }

    for fact in facts.iter().filter(|f| f.kind != FactKind::ReviewOpened) {
        let review_id = fact.source.review_id().ok_or(CoreError::UnmappedFact {
            kind: fact.kind.as_str(),
        })?;
        let hop = hops.get_mut(&review_id).ok_or_else(|| CoreError::AmbiguousChain {
            review_id,
            reason: format!("{} recorded for a review that was never opened", fact.kind.as_str()),
        })?;
        match fact.kind {
            FactKind::ReviewAccepted | FactKind::ReviewDeclined => hop.decisions.push(fact),
            // the delegation itself is visible only through the next hop's link
            FactKind::ReviewAssigned => {}
            other => {
                return Err(CoreError::UnmappedFact {
                    kind: other.as_str(),
                })
            }
        }
    }

    // parent -> delegated review
    let mut next: HashMap<i64, i64> = HashMap::new();
    for &review_id in &order {
        let Some(parent) = hops[&review_id].assigned_from else {
            continue;
        };
        if !hops.contains_key(&parent) {
            return Err(CoreError::AmbiguousChain {
                review_id,
                reason: format!("delegated from unknown review {parent}"),
            });
        }
        if let Some(sibling) = next.insert(parent, review_id) {
            return Err(CoreError::AmbiguousChain {
                review_id: parent,
                reason: format!("delegated to both review {sibling} and review {review_id}"),
            });
        }
    }

    let mut resolved = Vec::new();
    let mut visited = 0usize;

    for &root_id in order.iter().filter(|id| hops[*id].assigned_from.is_none()) {
        let mut chain = vec![root_id];
        while let Some(&child) = next.get(chain.last().unwrap_or(&root_id)) {
            chain.push(child);
        }
        visited += chain.len();

        let root = &hops[&root_id];
        let Some(first_actor) = root.opened.actor.clone() else {
            return Err(CoreError::AmbiguousChain {
                review_id: root_id,
                reason: "first review has no reviewer".to_string(),
            });
        };
        let delegated = chain.len() > 1;

        resolved.push(RawFact {
            actor: Some(first_actor.clone()),
            ..root.opened.clone()
        });

        let decision = chain
            .iter()
            .rev()
            .find_map(|id| latest(&hops[id].decisions));

        if let Some(decision) = decision {
            let actor = if delegated {
                Some(first_actor)
            } else {
                decision.actor.clone().or(Some(first_actor))
            };
            resolved.push(RawFact {
                actor,
                ..decision.clone()
            });
        }

        tracing::debug!(
            review_id = root_id,
            hops = chain.len(),
            decided = decision.is_some(),
            "resolved review chain"
        );
    }

    // every review reachable from a root has been visited; the rest loop
    if visited != order.len() {
        let stuck = order
            .iter()
            .copied()
            .find(|id| hops[id].assigned_from.is_some() && !reachable(&hops, &next, *id))
            .unwrap_or_default();
        return Err(CoreError::AmbiguousChain {
            review_id: stuck,
            reason: "delegation links form a cycle".to_string(),
        });
    }

    Ok(resolved)
}

/// Latest decision by timestamp; ties go to the later-emitted fact.
fn latest<'a>(decisions: &[&'a RawFact]) -> Option<&'a RawFact> {
    decisions
        .iter()
        .copied()
        .enumerate()
        .max_by_key(|(idx, fact)| (fact.when, *idx))
        .map(|(_, fact)| fact)
}

/// Whether walking `assigned_from` links from `review_id` ends at a root.
fn reachable(hops: &HashMap<i64, Hop<'_>>, next: &HashMap<i64, i64>, review_id: i64) -> bool {
    let mut current = review_id;
    for _ in 0..=next.len() {
        match hops.get(&current).and_then(|h| h.assigned_from) {
            None => return true,
            Some(parent) => current = parent,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn at(days_ago: i64) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-30T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
            - Duration::days(days_ago)
    }

    fn fact(
        kind: FactKind,
        review_id: i64,
        assigned_from: Option<i64>,
        days_ago: i64,
        actor: Option<&str>,
    ) -> RawFact {
        RawFact::new(
            kind,
            FactSource::Review {
                review_id,
                assigned_from,
            },
            at(days_ago),
            actor.map(str::to_string),
        )
    }

    fn opened(review_id: i64, from: Option<i64>, days_ago: i64, actor: &str) -> RawFact {
        fact(FactKind::ReviewOpened, review_id, from, days_ago, Some(actor))
    }

    fn summary(facts: &[RawFact]) -> Vec<(FactKind, Option<&str>, DateTime<Utc>)> {
        facts
            .iter()
            .map(|f| (f.kind, f.actor.as_deref(), f.when))
            .collect()
    }

    #[test]
    fn test_single_review_keeps_deciding_actor() {
        let facts = vec![
            opened(1, None, 6, "alice"),
            fact(FactKind::ReviewDeclined, 1, None, 4, Some("alice")),
        ];

        let resolved = resolve_review_chains(&facts).unwrap();
        assert_eq!(
            summary(&resolved),
            vec![
                (FactKind::ReviewOpened, Some("alice"), at(6)),
                (FactKind::ReviewDeclined, Some("alice"), at(4)),
            ]
        );
    }

    #[test]
    fn test_group_review_decided_by_member_is_attributed_to_group() {
        let facts = vec![
            opened(1, None, 6, "qa-team"),
            fact(FactKind::ReviewAccepted, 1, None, 2, Some("carol")),
        ];

        let resolved = resolve_review_chains(&facts).unwrap();
        // no delegation: the actual decider is reported
        assert_eq!(resolved[1].actor.as_deref(), Some("carol"));
    }

    #[test]
    fn test_delegated_chain_collapses_to_group() {
        let facts = vec![
            opened(1, None, 6, "qa-team"),
            opened(2, Some(1), 5, "carol"),
            fact(FactKind::ReviewAssigned, 1, None, 5, Some("carol")),
            fact(FactKind::ReviewAccepted, 2, Some(1), 3, Some("carol")),
        ];

        let resolved = resolve_review_chains(&facts).unwrap();
        assert_eq!(
            summary(&resolved),
            vec![
                (FactKind::ReviewOpened, Some("qa-team"), at(6)),
                (FactKind::ReviewAccepted, Some("qa-team"), at(3)),
            ]
        );
    }

    #[test]
    fn test_multiple_reassignments_report_only_first_actor() {
        let facts = vec![
            opened(1, None, 8, "qa-team"),
            opened(2, Some(1), 7, "security-team"),
            opened(3, Some(2), 6, "dave"),
            fact(FactKind::ReviewAssigned, 1, None, 7, Some("erin")),
            fact(FactKind::ReviewAssigned, 2, Some(1), 6, Some("erin")),
            fact(FactKind::ReviewDeclined, 3, Some(2), 1, Some("dave")),
        ];

        let resolved = resolve_review_chains(&facts).unwrap();
        assert_eq!(
            summary(&resolved),
            vec![
                (FactKind::ReviewOpened, Some("qa-team"), at(8)),
                (FactKind::ReviewDeclined, Some("qa-team"), at(1)),
            ]
        );
    }

    #[test]
    fn test_open_chain_emits_only_opening() {
        let facts = vec![opened(1, None, 6, "qa-team"), opened(2, Some(1), 5, "carol")];

        let resolved = resolve_review_chains(&facts).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].kind, FactKind::ReviewOpened);
    }

    #[test]
    fn test_latest_decision_wins() {
        let facts = vec![
            opened(1, None, 6, "alice"),
            fact(FactKind::ReviewDeclined, 1, None, 5, Some("alice")),
            fact(FactKind::ReviewAccepted, 1, None, 2, Some("alice")),
        ];

        let resolved = resolve_review_chains(&facts).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[1].kind, FactKind::ReviewAccepted);
    }

    #[test]
    fn test_decision_without_actor_falls_back_to_reviewer() {
        let facts = vec![
            opened(1, None, 6, "alice"),
            fact(FactKind::ReviewAccepted, 1, None, 2, None),
        ];

        let resolved = resolve_review_chains(&facts).unwrap();
        assert_eq!(resolved[1].actor.as_deref(), Some("alice"));
    }

    #[test]
    fn test_independent_reviews_stay_separate() {
        let facts = vec![
            opened(1, None, 6, "alice"),
            opened(2, None, 4, "bob"),
            fact(FactKind::ReviewDeclined, 1, None, 5, Some("alice")),
            fact(FactKind::ReviewAccepted, 2, None, 1, Some("bob")),
        ];

        let resolved = resolve_review_chains(&facts).unwrap();
        let kinds: Vec<_> = resolved.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                FactKind::ReviewOpened,
                FactKind::ReviewDeclined,
                FactKind::ReviewOpened,
                FactKind::ReviewAccepted,
            ]
        );
    }

    #[test]
    fn test_first_review_without_reviewer_is_ambiguous() {
        let facts = vec![fact(FactKind::ReviewOpened, 1, None, 6, None)];

        let err = resolve_review_chains(&facts).unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousChain { review_id: 1, .. }));
    }

    #[test]
    fn test_unknown_parent_is_ambiguous() {
        let facts = vec![opened(2, Some(99), 5, "carol")];

        let err = resolve_review_chains(&facts).unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousChain { review_id: 2, .. }));
    }

    #[test]
    fn test_fork_is_ambiguous() {
        let facts = vec![
            opened(1, None, 6, "qa-team"),
            opened(2, Some(1), 5, "carol"),
            opened(3, Some(1), 5, "dave"),
        ];

        let err = resolve_review_chains(&facts).unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousChain { review_id: 1, .. }));
    }

    #[test]
    fn test_cycle_is_ambiguous() {
        let facts = vec![
            opened(1, None, 6, "alice"),
            opened(2, Some(3), 5, "carol"),
            opened(3, Some(2), 5, "dave"),
        ];

        let err = resolve_review_chains(&facts).unwrap_err();
        match err {
            CoreError::AmbiguousChain { review_id, reason } => {
                assert!(review_id == 2 || review_id == 3);
                assert!(reason.contains("cycle"));
            }
            other => panic!("expected AmbiguousChain, got {other:?}"),
        }
    }

    #[test]
    fn test_decision_for_unopened_review_is_ambiguous() {
        let facts = vec![fact(FactKind::ReviewAccepted, 7, None, 1, Some("alice"))];

        let err = resolve_review_chains(&facts).unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousChain { review_id: 7, .. }));
    }
}
