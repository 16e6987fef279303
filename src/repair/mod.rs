// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Post-load repair.
//!
//! Diagrams arrive from disk with whatever an older build, a hand edit, or
//! an interrupted save left behind. This pass walks the loaded graph once,
//! corrects what can be corrected (illegal embeddings, stacking
//! violations), reports what can only be flagged (missing port
//! references), and leaves history untouched. Applying it twice finds
//! nothing the second time.

use std::fmt;

use crate::embedding::{self, EmbedRejection};
use crate::model::{CellGraph, CellId};
use crate::ports::{self, PortStateCache, PortWarning};
use crate::zorder::{self, ZOrderFix};

/// One problem found in a loaded diagram, corrected or flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairViolation {
    /// The parent reference broke an embedding rule; the child was
    /// detached.
    InvalidEmbedding {
        child: CellId,
        parent: CellId,
        rejection: EmbedRejection,
    },
    /// A node's z sat outside its band; it was moved to `fix.to`.
    ZOrder(ZOrderFix),
    /// An edge rendered behind one of its endpoints; it was lifted.
    EdgeZOrder { edge: CellId, from: i32, to: i32 },
    /// An edge references a port its node does not have. Flagged only —
    /// the endpoint itself is still structurally valid.
    Port(PortWarning),
}

impl fmt::Display for RepairViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmbedding {
                child,
                parent,
                rejection,
            } => write!(
                f,
                "node '{child}' detached from '{parent}': {rejection}"
            ),
            Self::ZOrder(fix) => write!(
                f,
                "node '{node}' moved from layer {from} to {to}: {violation}",
                node = fix.node,
                from = fix.from,
                to = fix.to,
                violation = fix.violation,
            ),
            Self::EdgeZOrder { edge, from, to } => {
                write!(f, "edge '{edge}' lifted from layer {from} to {to}")
            }
            Self::Port(warning) => write!(f, "{warning}"),
        }
    }
}

/// Outcome of one repair pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RepairReport {
    /// Number of corrections actually written to the graph.
    pub fixed: usize,
    /// Everything found, corrected and flagged alike.
    pub violations: Vec<RepairViolation>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Runs the full repair pass: embedding rules first (detaching changes the
/// parent relation the z-order walk depends on), then node stacking, then
/// edge stacking, then port reference checks. Port visibility is
/// re-synchronized to connection state as part of the pass.
pub fn validate_and_fix(
    graph: &mut CellGraph,
    cache: &mut PortStateCache,
    tick: u64,
) -> RepairReport {
    let mut report = RepairReport::default();

    fix_embeddings(graph, &mut report);
    fix_node_stacking(graph, &mut report);
    fix_edge_stacking(graph, &mut report);
    flag_port_references(graph, &mut report);

    ports::hide_unconnected_ports(graph, cache, tick);
    report
}

/// Detaches every child whose parent reference breaks an embedding rule.
/// Structural cycles cannot survive loading, but rule violations (an
/// annotation with a parent, a boundary inside an ordinary node) can.
fn fix_embeddings(graph: &mut CellGraph, report: &mut RepairReport) {
    let pairs: Vec<(CellId, CellId)> = graph
        .nodes()
        .iter()
        .filter_map(|(id, node)| node.parent().map(|parent| (id.clone(), parent.clone())))
        .collect();

    for (child, parent) in pairs {
        if let Err(rejection) = embedding::validate_embedding(graph, &parent, &child) {
            if let Some(node) = graph.node_mut(&child) {
                node.set_parent(None);
            }
            report.fixed += 1;
            report.violations.push(RepairViolation::InvalidEmbedding {
                child,
                parent,
                rejection,
            });
        }
    }
}

fn fix_node_stacking(graph: &mut CellGraph, report: &mut RepairReport) {
    for fix in zorder::correction_plan(graph) {
        if let Some(node) = graph.node_mut(&fix.node) {
            node.set_z_order(fix.to);
        }
        report.fixed += 1;
        report.violations.push(RepairViolation::ZOrder(fix));
    }
}

fn fix_edge_stacking(graph: &mut CellGraph, report: &mut RepairReport) {
    for (edge_id, to) in zorder::edge_correction_plan(graph) {
        let Some(edge) = graph.edge_mut(&edge_id) else {
            continue;
        };
        let from = edge.z_order();
        edge.set_z_order(to);
        report.fixed += 1;
        report.violations.push(RepairViolation::EdgeZOrder {
            edge: edge_id,
            from,
            to,
        });
    }
}

/// Flags edge endpoints whose port id does not exist on the endpoint node.
/// Nothing is changed: the endpoint still connects at node level, and
/// deleting data on load is not this pass's call.
fn flag_port_references(graph: &CellGraph, report: &mut RepairReport) {
    for (edge_id, edge) in graph.edges() {
        for endpoint in [edge.source(), edge.target()] {
            let Some(port) = endpoint.port() else {
                continue;
            };
            let known = graph
                .node(endpoint.node())
                .is_some_and(|node| node.ports().contains_key(port));
            if !known {
                report
                    .violations
                    .push(RepairViolation::Port(PortWarning::UnknownPort {
                        edge: edge_id.clone(),
                        node: endpoint.node().clone(),
                        port: port.clone(),
                    }));
            }
        }
    }
}
