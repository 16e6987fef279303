// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::rstest;

use super::{
    correction_plan, edge_correction_plan, edge_relayer_plan, layer_for, reorder_plan, ReorderOp,
    ZOrderViolation, ANNOTATION_LAYER, DEFAULT_LAYER, EMBEDDED_BOUNDARY_LAYER, EMBEDDED_LAYER,
    TRUST_BOUNDARY_LAYER,
};
use crate::model::fixtures;
use crate::model::{CellGraph, CellId, Node, NodeKind, Rect};

fn cid(value: &str) -> CellId {
    CellId::new(value).expect("cell id")
}

fn node_at(id: &str, kind: NodeKind, z: i32, parent: Option<&str>) -> Node {
    let mut node = Node::new(cid(id), kind, id, Rect::new(0, 0, 100, 100));
    node.set_z_order(z);
    node.set_parent(parent.map(cid));
    node
}

#[rstest]
#[case(NodeKind::TrustBoundary, false, TRUST_BOUNDARY_LAYER)]
#[case(NodeKind::TrustBoundary, true, EMBEDDED_BOUNDARY_LAYER)]
#[case(NodeKind::Process, false, DEFAULT_LAYER)]
#[case(NodeKind::Actor, true, EMBEDDED_LAYER)]
#[case(NodeKind::Store, true, EMBEDDED_LAYER)]
#[case(NodeKind::Annotation, false, ANNOTATION_LAYER)]
#[case(NodeKind::Annotation, true, ANNOTATION_LAYER)]
fn baselines_per_kind(#[case] kind: NodeKind, #[case] embedded: bool, #[case] expected: i32) {
    assert_eq!(layer_for(kind, embedded), expected);
}

#[test]
fn embedded_boundary_stays_behind_ordinary_baseline() {
    assert!(layer_for(NodeKind::TrustBoundary, true) < DEFAULT_LAYER);
    assert!(layer_for(NodeKind::TrustBoundary, true) > layer_for(NodeKind::TrustBoundary, false));
}

#[test]
fn edge_relayer_lifts_edge_to_max_endpoint() {
    let mut graph = fixtures::boundary_with_process();
    graph.node_mut(&cid("p1")).expect("p1").set_z_order(15);
    let plan = edge_relayer_plan(&graph, &cid("p1"));
    assert_eq!(plan, vec![(cid("f1"), 15)]);
}

#[test]
fn edge_relayer_is_quiet_when_already_consistent() {
    let graph = fixtures::boundary_with_process();
    assert!(edge_relayer_plan(&graph, &cid("p1")).is_empty());
}

#[test]
fn forward_swaps_with_next_sibling() {
    let mut graph = CellGraph::new();
    graph.insert_node(node_at("a", NodeKind::Process, 10, None)).expect("a");
    graph.insert_node(node_at("b", NodeKind::Process, 11, None)).expect("b");
    graph.insert_node(node_at("c", NodeKind::Process, 12, None)).expect("c");

    let plan = reorder_plan(&graph, &[cid("a")], ReorderOp::Forward);
    assert_eq!(plan, vec![(cid("a"), 11), (cid("b"), 10)]);
}

#[test]
fn backward_swaps_with_previous_sibling() {
    let mut graph = CellGraph::new();
    graph.insert_node(node_at("a", NodeKind::Process, 10, None)).expect("a");
    graph.insert_node(node_at("b", NodeKind::Process, 11, None)).expect("b");

    let plan = reorder_plan(&graph, &[cid("b")], ReorderOp::Backward);
    assert_eq!(plan, vec![(cid("a"), 11), (cid("b"), 10)]);
}

#[test]
fn to_front_on_boundary_never_crosses_ordinary_baseline() {
    let mut graph = CellGraph::new();
    graph
        .insert_node(node_at("b1", NodeKind::TrustBoundary, 1, None))
        .expect("b1");
    graph
        .insert_node(node_at("b2", NodeKind::TrustBoundary, DEFAULT_LAYER - 1, None))
        .expect("b2");
    graph.insert_node(node_at("p", NodeKind::Process, 10, None)).expect("p");

    let plan = reorder_plan(&graph, &[cid("b1")], ReorderOp::ToFront);
    for (_, new_z) in &plan {
        assert!(*new_z < DEFAULT_LAYER);
    }
}

#[test]
fn to_back_on_embedded_child_never_drops_behind_parent() {
    let graph = fixtures::nested_chain();
    // c is embedded in b (z 15); sending c to back must keep it above b.
    let plan = reorder_plan(&graph, &[cid("c")], ReorderOp::ToBack);
    let parent_z = graph.node(&cid("b")).expect("b").z_order();
    for (_, new_z) in &plan {
        assert!(*new_z > parent_z);
    }
}

#[test]
fn reorder_ignores_cells_outside_the_band() {
    let mut graph = CellGraph::new();
    graph.insert_node(node_at("p", NodeKind::Process, 10, None)).expect("p");
    graph
        .insert_node(node_at("note", NodeKind::Annotation, 20, None))
        .expect("note");

    // The annotation is not a sibling-by-layer of the process; nothing to do.
    assert!(reorder_plan(&graph, &[cid("p")], ReorderOp::ToFront).is_empty());
}

#[test]
fn reorder_at_extreme_is_a_no_op() {
    let mut graph = CellGraph::new();
    graph.insert_node(node_at("a", NodeKind::Process, 10, None)).expect("a");
    graph.insert_node(node_at("b", NodeKind::Process, 12, None)).expect("b");

    assert!(reorder_plan(&graph, &[cid("b")], ReorderOp::Forward).is_empty());
    assert!(reorder_plan(&graph, &[cid("a")], ReorderOp::Backward).is_empty());
}

#[test]
fn correction_fixes_child_behind_parent() {
    let mut graph = fixtures::nested_chain();
    graph.node_mut(&cid("b")).expect("b").set_z_order(5);

    let fixes = correction_plan(&graph);
    let fix = fixes.iter().find(|fix| fix.node == cid("b")).expect("fix for b");
    assert_eq!(fix.violation, ZOrderViolation::ChildBehindParent);
    assert!(fix.to > graph.node(&cid("a")).expect("a").z_order());
}

#[test]
fn correction_fixes_boundary_above_ordinary() {
    let mut graph = fixtures::boundary_with_process();
    graph.node_mut(&cid("b1")).expect("b1").set_z_order(30);

    let fixes = correction_plan(&graph);
    let fix = fixes.iter().find(|fix| fix.node == cid("b1")).expect("fix for b1");
    assert_eq!(fix.violation, ZOrderViolation::BoundaryAboveOrdinary);
    assert_eq!(fix.to, TRUST_BOUNDARY_LAYER);
}

#[test]
fn correction_cascades_through_nesting_in_one_pass() {
    let mut graph = fixtures::nested_chain();
    graph.node_mut(&cid("a")).expect("a").set_z_order(20);
    // b (15) and c (16) are now both at-or-behind their corrected ancestors.

    let fixes = correction_plan(&graph);
    let mut corrected = graph.clone();
    for fix in &fixes {
        corrected
            .node_mut(&fix.node)
            .expect("fixed node")
            .set_z_order(fix.to);
    }
    assert!(correction_plan(&corrected).is_empty());
}

#[test]
fn correction_keeps_nested_boundaries_below_ordinary_baseline() {
    let mut graph = CellGraph::new();
    graph
        .insert_node(node_at("outer", NodeKind::TrustBoundary, DEFAULT_LAYER - 1, None))
        .expect("outer");
    graph
        .insert_node(node_at("inner", NodeKind::TrustBoundary, 3, Some("outer")))
        .expect("inner");
    graph.insert_node(node_at("p", NodeKind::Process, 10, None)).expect("p");

    let fixes = correction_plan(&graph);
    let fix = fixes.iter().find(|fix| fix.node == cid("inner")).expect("fix for inner");
    assert_eq!(fix.violation, ZOrderViolation::ChildBehindParent);
    assert!(fix.to < DEFAULT_LAYER);

    let mut corrected = graph.clone();
    for fix in &fixes {
        corrected
            .node_mut(&fix.node)
            .expect("fixed node")
            .set_z_order(fix.to);
    }
    assert!(correction_plan(&corrected).is_empty());
}

#[test]
fn correction_is_idempotent_on_clean_graphs() {
    let graph = fixtures::boundary_with_process();
    assert!(correction_plan(&graph).is_empty());
    assert!(edge_correction_plan(&graph).is_empty());
}

#[test]
fn edge_correction_lifts_buried_edges() {
    let mut graph = fixtures::boundary_with_process();
    graph.edge_mut(&cid("f1")).expect("f1").set_z_order(0);
    let plan = edge_correction_plan(&graph);
    assert_eq!(plan, vec![(cid("f1"), 10)]);
}
