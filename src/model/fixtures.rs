// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::cell::{Edge, Endpoint, Node, NodeKind, Port};
use super::geometry::Rect;
use super::graph::CellGraph;
use super::ids::{CellId, PortId};

fn cid(value: &str) -> CellId {
    CellId::new(value).expect("cell id")
}

fn pid(value: &str) -> PortId {
    PortId::new(value).expect("port id")
}

/// Three processes nested a <- b <- c.
pub(crate) fn nested_chain() -> CellGraph {
    let mut graph = CellGraph::new();

    let mut a = Node::new(cid("a"), NodeKind::Process, "A", Rect::new(0, 0, 600, 600));
    a.set_z_order(10);
    let mut b = Node::new(cid("b"), NodeKind::Process, "B", Rect::new(50, 50, 400, 400));
    b.set_z_order(15);
    b.set_parent(Some(cid("a")));
    let mut c = Node::new(cid("c"), NodeKind::Process, "C", Rect::new(100, 100, 200, 200));
    c.set_z_order(16);
    c.set_parent(Some(cid("b")));

    graph.insert_node(a).expect("a");
    graph.insert_node(b).expect("b");
    graph.insert_node(c).expect("c");
    graph
}

/// A trust boundary, a ported process inside it, a ported store outside,
/// and one flow p1:out -> s1:in.
pub(crate) fn boundary_with_process() -> CellGraph {
    let mut graph = CellGraph::new();

    let mut boundary = Node::new(
        cid("b1"),
        NodeKind::TrustBoundary,
        "Perimeter",
        Rect::new(100, 100, 400, 400),
    );
    boundary.set_z_order(1);

    let mut process = Node::new(
        cid("p1"),
        NodeKind::Process,
        "Web App",
        Rect::new(150, 150, 100, 80),
    );
    process.set_z_order(10);
    process.ports_mut().insert(pid("in"), Port::new(false));
    process.ports_mut().insert(pid("out"), Port::new(true));

    let mut store = Node::new(
        cid("s1"),
        NodeKind::Store,
        "Database",
        Rect::new(600, 150, 120, 80),
    );
    store.set_z_order(10);
    store.ports_mut().insert(pid("in"), Port::new(true));
    store.ports_mut().insert(pid("out"), Port::new(false));

    graph.insert_node(boundary).expect("b1");
    graph.insert_node(process).expect("p1");
    graph.insert_node(store).expect("s1");

    let mut flow = Edge::new(
        cid("f1"),
        Endpoint::new(cid("p1"), Some(pid("out"))),
        Endpoint::new(cid("s1"), Some(pid("in"))),
    );
    flow.set_label("query");
    flow.set_z_order(10);
    graph.insert_edge(flow).expect("f1");

    graph
}
