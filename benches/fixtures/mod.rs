// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use proteus::model::{CellGraph, CellId, Edge, Endpoint, Node, NodeKind, Port, PortId, Rect};

const COLUMNS: i64 = 10;
const CELL_WIDTH: i64 = 100;
const CELL_HEIGHT: i64 = 60;
const PITCH_X: i64 = 150;
const PITCH_Y: i64 = 120;

#[derive(Debug, Clone, Copy)]
pub enum Case {
    Small,
    Medium,
    Large,
}

pub fn node_count(case: Case) -> usize {
    match case {
        Case::Small => 20,
        Case::Medium => 200,
        Case::Large => 1000,
    }
}

fn cid(value: String) -> CellId {
    CellId::new(value).expect("cell id")
}

fn pid(value: &str) -> PortId {
    PortId::new(value).expect("port id")
}

fn kind_for(idx: usize) -> NodeKind {
    match idx % 3 {
        0 => NodeKind::Process,
        1 => NodeKind::Store,
        _ => NodeKind::Actor,
    }
}

/// A well-formed diagram: a grid of ported nodes chained by flows, with one
/// trust boundary per grid row sitting behind its row.
pub fn diagram(case: Case) -> CellGraph {
    let count = node_count(case);
    let mut graph = CellGraph::new();

    let rows = (count as i64 + COLUMNS - 1) / COLUMNS;
    for row in 0..rows {
        let mut boundary = Node::new(
            cid(format!("tb{row:04}")),
            NodeKind::TrustBoundary,
            format!("zone {row}"),
            Rect::new(-20, row * PITCH_Y - 20, COLUMNS * PITCH_X, PITCH_Y),
        );
        boundary.set_z_order(1);
        graph.insert_node(boundary).expect("boundary");
    }

    for idx in 0..count {
        let col = (idx as i64) % COLUMNS;
        let row = (idx as i64) / COLUMNS;
        let mut node = Node::new(
            cid(format!("n{idx:05}")),
            kind_for(idx),
            format!("node {idx}"),
            Rect::new(col * PITCH_X, row * PITCH_Y, CELL_WIDTH, CELL_HEIGHT),
        );
        node.set_z_order(10);
        node.ports_mut().insert(pid("in"), Port::new(idx > 0));
        node.ports_mut().insert(pid("out"), Port::new(idx + 1 < count));
        graph.insert_node(node).expect("node");
    }

    for idx in 1..count {
        let mut edge = Edge::new(
            cid(format!("e{idx:05}")),
            Endpoint::new(cid(format!("n{:05}", idx - 1)), Some(pid("out"))),
            Endpoint::new(cid(format!("n{idx:05}")), Some(pid("in"))),
        );
        edge.set_z_order(10);
        graph.insert_edge(edge).expect("edge");
    }

    graph
}

/// The same diagram after a simulated bad save: boundaries in front of the
/// grid, a share of edges behind their endpoints, a share of nodes stuck
/// behind a parent they were embedded in.
pub fn corrupted_diagram(case: Case) -> CellGraph {
    let mut graph = diagram(case);
    let count = node_count(case);

    let boundary_ids: Vec<CellId> = graph
        .nodes()
        .iter()
        .filter(|(_, node)| node.kind() == NodeKind::TrustBoundary)
        .map(|(id, _)| id.clone())
        .collect();
    for id in &boundary_ids {
        graph.node_mut(id).expect("boundary").set_z_order(12);
    }

    for idx in (0..count).step_by(7) {
        let id = cid(format!("n{idx:05}"));
        let row = (idx as i64) / COLUMNS;
        let parent = cid(format!("tb{row:04}"));
        let node = graph.node_mut(&id).expect("node");
        node.set_parent(Some(parent));
        node.set_z_order(0);
    }

    for idx in (1..count).step_by(5) {
        graph
            .edge_mut(&cid(format!("e{idx:05}")))
            .expect("edge")
            .set_z_order(0);
    }

    graph
}
