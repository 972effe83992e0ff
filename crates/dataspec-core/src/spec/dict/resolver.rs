//! Fixpoint resolution of intra-mapping references
//!
//! Each pending reference is an edge `key -> target`. A pass walks the pending
//! edges in order and resolves every edge whose target already has a canonical
//! value; values resolved earlier in a pass are visible to later edges of the
//! same pass. Passes repeat until every edge is resolved, a pass makes no
//! progress, or the pass limit is reached.

use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// A reference edge awaiting resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingReference {
    pub key: String,
    pub target: String,
}

/// Why an edge stayed unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnresolvedCause {
    /// The edge lies on a cycle of unresolved references
    Cycle,
    /// The edge's chain of targets runs into a cycle it is not part of
    DependsOnCycle,
    /// The chain ends at a resolved value; more passes would have resolved it
    PassLimit,
    /// The chain ends at a key with no canonical value
    MissingTarget,
}

impl UnresolvedCause {
    pub fn reason(self) -> &'static str {
        match self {
            UnresolvedCause::Cycle => "reference cycle",
            UnresolvedCause::DependsOnCycle => "target depends on a reference cycle",
            UnresolvedCause::PassLimit => "reference pass limit reached",
            UnresolvedCause::MissingTarget => "target is missing or invalid",
        }
    }
}

/// An edge left unresolved after the fixpoint stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnresolvedReference {
    pub key: String,
    pub target: String,
    pub cause: UnresolvedCause,
}

#[derive(Debug, Default)]
pub(crate) struct ReferenceGraph {
    edges: Vec<PendingReference>,
}

impl ReferenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<K: Into<String>, T: Into<String>>(&mut self, key: K, target: T) {
        self.edges.push(PendingReference {
            key: key.into(),
            target: target.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Resolve edges into `resolved`, returning the edges that never resolved
    pub fn resolve(self, resolved: &mut HashMap<String, Value>, pass_limit: usize) -> Vec<UnresolvedReference> {
        let mut pending = self.edges;
        let mut pass = 0;

        while !pending.is_empty() && pass < pass_limit {
            pass += 1;
            let before = pending.len();
            let mut remaining = Vec::with_capacity(before);
            for edge in pending {
                match resolved.get(&edge.target).cloned() {
                    Some(value) => {
                        resolved.insert(edge.key, value);
                    }
                    None => remaining.push(edge),
                }
            }
            pending = remaining;

            tracing::trace!(
                pass,
                resolved = before - pending.len(),
                remaining = pending.len(),
                "reference resolution pass"
            );
            if pending.len() == before {
                break;
            }
        }

        let targets: HashMap<&str, &str> = pending
            .iter()
            .map(|e| (e.key.as_str(), e.target.as_str()))
            .collect();
        let unresolved = pending
            .iter()
            .map(|edge| UnresolvedReference {
                key: edge.key.clone(),
                target: edge.target.clone(),
                cause: cause_of(&edge.key, &targets, resolved),
            })
            .collect::<Vec<_>>();

        for edge in &unresolved {
            tracing::debug!(key = %edge.key, target = %edge.target, cause = ?edge.cause, "unresolvable reference");
        }
        unresolved
    }
}

/// Follow unresolved targets from `start` until the chain closes or ends
fn cause_of<'a>(
    start: &'a str,
    targets: &HashMap<&'a str, &'a str>,
    resolved: &HashMap<String, Value>,
) -> UnresolvedCause {
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut current = start;
    while let Some(&next) = targets.get(current) {
        if next == start {
            return UnresolvedCause::Cycle;
        }
        if !visited.insert(next) {
            return UnresolvedCause::DependsOnCycle;
        }
        current = next;
    }
    if resolved.contains_key(current) {
        UnresolvedCause::PassLimit
    } else {
        UnresolvedCause::MissingTarget
    }
}
