// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Embedding rule evaluation.
//!
//! Pure checks over the cell graph: may node A be nested inside node B, and
//! does A's box geometrically sit inside B's? Both must pass before the
//! engine commits an embedding; neither mutates anything.

use crate::model::{CellGraph, CellId, NodeKind, Rect};
use std::fmt;

/// Why a prospective embedding was rejected. Rejections are expected,
/// user-triggered outcomes, not errors; `Display` produces the reason shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedRejection {
    /// Annotations render independent of nesting and take no part in it.
    AnnotationParent { node: CellId },
    AnnotationChild { node: CellId },
    /// A trust boundary may only sit inside another trust boundary.
    BoundaryInsideOther { child: CellId, parent_kind: NodeKind },
    /// The prospective child already appears in the parent's ancestry
    /// (covers direct, deep, and self cycles).
    Circular { parent: CellId, child: CellId },
    UnknownNode { id: CellId },
}

impl fmt::Display for EmbedRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnnotationParent { node } => {
                write!(f, "annotation node '{node}' cannot contain embedded children")
            }
            Self::AnnotationChild { node } => {
                write!(f, "annotation node '{node}' cannot be embedded in another node")
            }
            Self::BoundaryInsideOther { child, parent_kind } => {
                write!(
                    f,
                    "trust-boundary node '{child}' may only be embedded inside another \
                     trust-boundary, not a {parent_kind}"
                )
            }
            Self::Circular { parent, child } => {
                write!(
                    f,
                    "embedding '{child}' under '{parent}' would create a circular ancestry"
                )
            }
            Self::UnknownNode { id } => write!(f, "node '{id}' does not exist"),
        }
    }
}

impl std::error::Error for EmbedRejection {}

/// Rule evaluation for nesting `child` inside `parent`.
///
/// Rule order: annotation exclusion, trust-boundary restriction, cycle walk.
/// Geometry is deliberately not consulted here; see
/// [`is_completely_contained`].
pub fn validate_embedding(
    graph: &CellGraph,
    parent: &CellId,
    child: &CellId,
) -> Result<(), EmbedRejection> {
    let parent_node = graph
        .node(parent)
        .ok_or_else(|| EmbedRejection::UnknownNode { id: parent.clone() })?;
    let child_node = graph
        .node(child)
        .ok_or_else(|| EmbedRejection::UnknownNode { id: child.clone() })?;

    if parent_node.kind() == NodeKind::Annotation {
        return Err(EmbedRejection::AnnotationParent {
            node: parent.clone(),
        });
    }
    if child_node.kind() == NodeKind::Annotation {
        return Err(EmbedRejection::AnnotationChild { node: child.clone() });
    }

    if child_node.kind() == NodeKind::TrustBoundary
        && parent_node.kind() != NodeKind::TrustBoundary
    {
        return Err(EmbedRejection::BoundaryInsideOther {
            child: child.clone(),
            parent_kind: parent_node.kind(),
        });
    }

    // Self-embedding is the degenerate cycle.
    if parent == child || graph.is_ancestor(child, parent) {
        return Err(EmbedRejection::Circular {
            parent: parent.clone(),
            child: child.clone(),
        });
    }

    Ok(())
}

/// Strict bounding-box containment on all four sides. Partial overlap is
/// false. Evaluated independently of rule validity.
pub fn is_completely_contained(child: &Rect, parent: &Rect) -> bool {
    parent.contains_rect(child)
}

/// Commit-ready drop-target candidates for `node`: every other node whose
/// box completely contains `node`'s box and whose rules admit the embedding,
/// sorted front-most first. Choosing among them stays the caller's concern.
pub fn candidate_parents(graph: &CellGraph, node: &CellId) -> Vec<CellId> {
    let Some(subject) = graph.node(node) else {
        return Vec::new();
    };
    let subject_box = subject.geometry();

    let mut candidates: Vec<&crate::model::Node> = graph
        .nodes()
        .values()
        .filter(|candidate| candidate.id() != node)
        .filter(|candidate| is_completely_contained(&subject_box, &candidate.geometry()))
        .filter(|candidate| validate_embedding(graph, candidate.id(), node).is_ok())
        .collect();

    candidates.sort_by(|a, b| b.z_order().cmp(&a.z_order()).then_with(|| a.id().cmp(b.id())));
    candidates.into_iter().map(|c| c.id().clone()).collect()
}
