// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Z-order layering.
//!
//! Stacking uses a small set of baseline layers: trust boundaries at the
//! back, ordinary nodes in the middle, annotations on top. Embedding
//! promotes the child above its parent without letting a boundary cross in
//! front of ordinary nodes. Everything here *plans* z changes as
//! `(cell, new_z)` pairs; applying them (and recording history) is the
//! engine's job.

use crate::model::{CellGraph, CellId, NodeKind};
use std::collections::BTreeMap;
use std::fmt;

pub const TRUST_BOUNDARY_LAYER: i32 = 1;
pub const EMBEDDED_BOUNDARY_LAYER: i32 = 2;
pub const DEFAULT_LAYER: i32 = 10;
pub const EMBEDDED_LAYER: i32 = 15;
pub const ANNOTATION_LAYER: i32 = 20;

/// Baseline layer for a node kind, embedded or free-standing.
pub fn layer_for(kind: NodeKind, embedded: bool) -> i32 {
    match (kind, embedded) {
        (NodeKind::Annotation, _) => ANNOTATION_LAYER,
        (NodeKind::TrustBoundary, false) => TRUST_BOUNDARY_LAYER,
        (NodeKind::TrustBoundary, true) => EMBEDDED_BOUNDARY_LAYER,
        (_, false) => DEFAULT_LAYER,
        (_, true) => EMBEDDED_LAYER,
    }
}

/// New z values for every edge touching `node`, so that no edge renders
/// behind either of its endpoints. Entries are emitted only where the value
/// actually changes.
pub fn edge_relayer_plan(graph: &CellGraph, node: &CellId) -> Vec<(CellId, i32)> {
    graph
        .edges_touching(node)
        .filter_map(|(id, edge)| {
            let new_z = edge_target_z(graph, id)?;
            (new_z != edge.z_order()).then(|| (id.clone(), new_z))
        })
        .collect()
}

fn edge_target_z(graph: &CellGraph, edge_id: &CellId) -> Option<i32> {
    let edge = graph.edge(edge_id)?;
    let source_z = graph.node(edge.source().node())?.z_order();
    let target_z = graph.node(edge.target().node())?.z_order();
    Some(source_z.max(target_z))
}

/// Sibling reorder operations. Reordering happens only among a cell's
/// current siblings-by-layer (same parent, same stacking band), so a
/// move-to-front can never pull an embedded child behind its parent or a
/// trust boundary in front of an ordinary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOp {
    Forward,
    Backward,
    ToFront,
    ToBack,
}

/// The inclusive z range a node may occupy without violating the layering
/// invariants.
fn band_bounds(graph: &CellGraph, id: &CellId) -> Option<(i32, i32)> {
    let node = graph.node(id)?;
    let parent_z = node
        .parent()
        .and_then(|parent| graph.node(parent))
        .map(|parent| parent.z_order());

    let bounds = match node.kind() {
        NodeKind::TrustBoundary => (
            parent_z.map_or(TRUST_BOUNDARY_LAYER, |z| z + 1),
            DEFAULT_LAYER - 1,
        ),
        NodeKind::Annotation => (ANNOTATION_LAYER, i32::MAX),
        _ => (
            parent_z.map_or(DEFAULT_LAYER, |z| (z + 1).max(DEFAULT_LAYER)),
            ANNOTATION_LAYER - 1,
        ),
    };
    Some(bounds)
}

fn same_band(graph: &CellGraph, a: &CellId, b: &CellId) -> bool {
    let (Some(node_a), Some(node_b)) = (graph.node(a), graph.node(b)) else {
        return false;
    };
    if node_a.parent() != node_b.parent() {
        return false;
    }
    match (node_a.kind(), node_b.kind()) {
        (NodeKind::TrustBoundary, NodeKind::TrustBoundary) => true,
        (NodeKind::Annotation, NodeKind::Annotation) => true,
        (ka, kb) => ka.is_ordinary() && kb.is_ordinary(),
    }
}

/// Plans one reorder op for each of `cells` among its siblings-by-layer.
/// Cells that are already at the requested extreme produce no entry.
pub fn reorder_plan(graph: &CellGraph, cells: &[CellId], op: ReorderOp) -> Vec<(CellId, i32)> {
    let mut plan: BTreeMap<CellId, i32> = BTreeMap::new();

    for id in cells {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let Some((band_min, band_max)) = band_bounds(graph, id) else {
            continue;
        };
        let current = node.z_order();

        let siblings: Vec<(CellId, i32)> = graph
            .nodes()
            .keys()
            .filter(|other| *other != id && same_band(graph, id, other))
            .map(|other| (other.clone(), graph.nodes()[other].z_order()))
            .collect();

        match op {
            // One step forward/backward swaps z with the adjacent sibling,
            // keeping the set of occupied layers stable.
            ReorderOp::Forward => {
                let neighbor = siblings
                    .iter()
                    .filter(|(_, z)| *z > current)
                    .min_by_key(|(other, z)| (*z, other.clone()));
                if let Some((other, z)) = neighbor {
                    plan.insert(id.clone(), (*z).clamp(band_min, band_max));
                    plan.insert(other.clone(), current);
                }
            }
            ReorderOp::Backward => {
                let neighbor = siblings
                    .iter()
                    .filter(|(_, z)| *z < current)
                    .max_by_key(|(other, z)| (*z, other.clone()));
                if let Some((other, z)) = neighbor {
                    plan.insert(id.clone(), (*z).clamp(band_min, band_max));
                    plan.insert(other.clone(), current);
                }
            }
            ReorderOp::ToFront => {
                let top = siblings.iter().map(|(_, z)| *z).max();
                if let Some(top) = top {
                    let new_z = (top.saturating_add(1)).clamp(band_min, band_max);
                    if top >= current && new_z != current {
                        plan.insert(id.clone(), new_z);
                    }
                }
            }
            ReorderOp::ToBack => {
                let back = siblings.iter().map(|(_, z)| *z).min();
                if let Some(back) = back {
                    let new_z = (back.saturating_sub(1)).clamp(band_min, band_max);
                    if back <= current && new_z != current {
                        plan.insert(id.clone(), new_z);
                    }
                }
            }
        }
    }

    plan.into_iter().collect()
}

/// One corrected stacking violation found in a loaded diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZOrderFix {
    pub node: CellId,
    pub from: i32,
    pub to: i32,
    pub violation: ZOrderViolation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrderViolation {
    /// Embedded child rendered at or behind its parent.
    ChildBehindParent,
    /// Trust boundary rendered at or above the ordinary baseline.
    BoundaryAboveOrdinary,
}

impl fmt::Display for ZOrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChildBehindParent => f.write_str("embedded child behind its parent"),
            Self::BoundaryAboveOrdinary => {
                f.write_str("trust boundary in front of ordinary nodes")
            }
        }
    }
}

/// Walks every node parents-first and plans corrections for the two
/// stacking invariants. Applying the returned fixes and re-running yields
/// an empty plan.
pub fn correction_plan(graph: &CellGraph) -> Vec<ZOrderFix> {
    let mut order: Vec<CellId> = graph.nodes().keys().cloned().collect();
    order.sort_by_key(|id| graph.ancestors(id).count());

    // Corrections cascade: a parent fixed earlier in the walk is seen at its
    // corrected value by its children.
    let mut corrected: BTreeMap<CellId, i32> = graph
        .nodes()
        .iter()
        .map(|(id, node)| (id.clone(), node.z_order()))
        .collect();
    let mut fixes = Vec::new();

    for id in order {
        let node = &graph.nodes()[&id];
        let current = corrected[&id];
        let parent_z = node
            .parent()
            .and_then(|parent| corrected.get(parent))
            .copied();

        if node.kind() == NodeKind::TrustBoundary {
            let above_ordinary = current >= DEFAULT_LAYER;
            let behind_parent = parent_z.is_some_and(|z| current <= z);
            if above_ordinary || behind_parent {
                // Boundary corrections must not cross the ordinary baseline
                // themselves. A parent already at the band ceiling leaves no
                // strictly higher slot; the child lands on the ceiling.
                let floor = parent_z.map_or(TRUST_BOUNDARY_LAYER, |z| z + 1);
                let to = floor.min(DEFAULT_LAYER - 1);
                if to != current {
                    let violation = if above_ordinary {
                        ZOrderViolation::BoundaryAboveOrdinary
                    } else {
                        ZOrderViolation::ChildBehindParent
                    };
                    fixes.push(ZOrderFix {
                        node: id.clone(),
                        from: current,
                        to,
                        violation,
                    });
                    corrected.insert(id.clone(), to);
                }
            }
            continue;
        }

        if let Some(parent_z) = parent_z {
            if current <= parent_z {
                let to = parent_z + 1;
                fixes.push(ZOrderFix {
                    node: id.clone(),
                    from: current,
                    to,
                    violation: ZOrderViolation::ChildBehindParent,
                });
                corrected.insert(id.clone(), to);
            }
        }
    }

    fixes
}

/// Edge counterpart of [`correction_plan`]: every edge whose z sits below
/// the max of its endpoints gets lifted.
pub fn edge_correction_plan(graph: &CellGraph) -> Vec<(CellId, i32)> {
    graph
        .edges()
        .iter()
        .filter_map(|(id, edge)| {
            let new_z = edge_target_z(graph, id)?;
            (edge.z_order() < new_z).then(|| (id.clone(), new_z))
        })
        .collect()
}

#[cfg(test)]
mod tests;
