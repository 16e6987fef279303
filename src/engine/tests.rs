// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::{Engine, EngineError, EngineEvent};
use crate::history::gesture::GestureKind;
use crate::model::fixtures;
use crate::model::{CellGraph, CellId, Edge, Endpoint, Node, NodeKind, PortId, Rect};
use crate::ops::{Highlight, Mutation, SELECTION_HIGHLIGHT_PATH};
use crate::zorder::ReorderOp;

fn cid(value: &str) -> CellId {
    CellId::new(value).expect("cell id")
}

fn pid(value: &str) -> PortId {
    PortId::new(value).expect("port id")
}

fn engine_with(graph: &CellGraph) -> Engine {
    let mut engine = Engine::new();
    let issues = engine.load_snapshot(&graph.to_snapshot());
    assert!(issues.is_empty());
    engine.drain_events();
    engine
}

fn move_p1(x: i64) -> Mutation {
    Mutation::SetGeometry {
        id: cid("p1"),
        geometry: Rect::new(x, 150, 100, 80),
    }
}

#[test]
fn forty_drag_frames_coalesce_into_one_history_record() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    for frame in 1..=40 {
        engine.gesture_frame(move_p1(150 + frame * 2)).expect("frame");
    }
    engine.finalize_gesture(&cid("p1")).expect("finalize");

    assert_eq!(engine.undo_depth(), 1);
    let events = engine.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        EngineEvent::GestureCompleted { kind: GestureKind::Move, .. }
    )));

    assert!(engine.undo().expect("undo"));
    assert_eq!(
        engine.graph().node(&cid("p1")).expect("p1").geometry(),
        Rect::new(150, 150, 100, 80)
    );
}

#[test]
fn gesture_without_net_change_records_nothing() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    engine.gesture_frame(move_p1(160)).expect("frame");
    engine.gesture_frame(move_p1(150)).expect("frame");
    engine.finalize_gesture(&cid("p1")).expect("finalize");

    assert!(!engine.can_undo());
    // Completion is still announced so the UI can clean up.
    assert!(engine
        .drain_events()
        .iter()
        .any(|event| matches!(event, EngineEvent::GestureCompleted { .. })));
}

#[test]
fn cancelled_gesture_snaps_back_without_history() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    engine.gesture_frame(move_p1(400)).expect("frame");
    engine.cancel_gesture(&cid("p1")).expect("cancel");

    assert!(!engine.can_undo());
    assert_eq!(
        engine.graph().node(&cid("p1")).expect("p1").geometry(),
        Rect::new(150, 150, 100, 80)
    );
}

#[test]
fn non_geometry_mutations_are_rejected_as_gesture_frames() {
    let mut engine = engine_with(&fixtures::boundary_with_process());
    let err = engine
        .gesture_frame(Mutation::SetLabel {
            id: cid("p1"),
            label: "x".to_owned(),
        })
        .expect_err("rejected");
    assert!(matches!(err, EngineError::NotAGestureMutation { .. }));
}

#[test]
fn hover_toggle_produces_zero_history_records() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    for on in [true, false] {
        engine
            .apply(Mutation::SetHighlight {
                id: cid("p1"),
                highlight: Highlight::Hover,
                on,
            })
            .expect("apply");
    }

    assert!(!engine.can_undo());
}

#[test]
fn label_edit_is_one_undo_step() {
    let mut engine = engine_with(&fixtures::boundary_with_process());
    engine
        .apply(Mutation::SetLabel {
            id: cid("p1"),
            label: "Gateway".to_owned(),
        })
        .expect("apply");

    assert_eq!(engine.undo_depth(), 1);
    assert!(engine.undo().expect("undo"));
    assert_eq!(engine.graph().node(&cid("p1")).expect("p1").label(), "Web App");
    assert!(engine.can_redo());
    assert!(engine.redo().expect("redo"));
    assert_eq!(engine.graph().node(&cid("p1")).expect("p1").label(), "Gateway");
}

#[test]
fn embedding_promotes_child_and_relayers_edges_as_one_step() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    engine.embed_node(&cid("b1"), &cid("p1")).expect("embed");

    let p1 = engine.graph().node(&cid("p1")).expect("p1");
    assert_eq!(p1.parent(), Some(&cid("b1")));
    assert_eq!(p1.z_order(), 15);
    // The touching edge rides up with its endpoint.
    assert_eq!(engine.graph().edge(&cid("f1")).expect("f1").z_order(), 15);
    assert_eq!(engine.undo_depth(), 1);

    assert!(engine.undo().expect("undo"));
    let p1 = engine.graph().node(&cid("p1")).expect("p1");
    assert_eq!(p1.parent(), None);
    assert_eq!(p1.z_order(), 10);
    assert_eq!(engine.graph().edge(&cid("f1")).expect("f1").z_order(), 10);
}

#[test]
fn embedding_requires_complete_containment() {
    let mut engine = engine_with(&fixtures::boundary_with_process());
    // s1 pokes outside b1.
    let err = engine.embed_node(&cid("b1"), &cid("s1")).expect_err("rejected");
    assert!(matches!(err, EngineError::NotContained { .. }));
    assert!(!engine.can_undo());
}

#[test]
fn embedding_rule_rejection_leaves_graph_untouched() {
    let mut graph = fixtures::boundary_with_process();
    graph
        .insert_node(Node::new(
            cid("note"),
            NodeKind::Annotation,
            "note",
            Rect::new(150, 150, 40, 20),
        ))
        .expect("insert");
    let mut engine = engine_with(&graph);

    let err = engine.embed_node(&cid("b1"), &cid("note")).expect_err("rejected");
    assert!(matches!(err, EngineError::EmbeddingRejected(_)));
    assert_eq!(engine.graph().node(&cid("note")).expect("note").parent(), None);
}

#[test]
fn release_restores_baseline_layer() {
    let mut engine = engine_with(&fixtures::boundary_with_process());
    engine.embed_node(&cid("b1"), &cid("p1")).expect("embed");

    engine.release_node(&cid("p1")).expect("release");

    let p1 = engine.graph().node(&cid("p1")).expect("p1");
    assert_eq!(p1.parent(), None);
    assert_eq!(p1.z_order(), 10);
    assert_eq!(engine.undo_depth(), 2);
}

#[test]
fn atomic_sequence_is_a_single_undo_step() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    engine
        .apply_atomic(&[
            Mutation::SetLabel {
                id: cid("p1"),
                label: "API".to_owned(),
            },
            Mutation::SetGeometry {
                id: cid("p1"),
                geometry: Rect::new(200, 200, 100, 80),
            },
        ])
        .expect("atomic");

    assert_eq!(engine.undo_depth(), 1);
    assert!(engine.undo().expect("undo"));
    let p1 = engine.graph().node(&cid("p1")).expect("p1");
    assert_eq!(p1.label(), "Web App");
    assert_eq!(p1.geometry(), Rect::new(150, 150, 100, 80));
}

#[test]
fn failed_atomic_sequence_rolls_back_completely() {
    let mut engine = engine_with(&fixtures::boundary_with_process());
    let before = engine.graph().clone();

    let err = engine
        .apply_atomic(&[
            Mutation::SetLabel {
                id: cid("p1"),
                label: "API".to_owned(),
            },
            Mutation::SetLabel {
                id: cid("ghost"),
                label: "x".to_owned(),
            },
        ])
        .expect_err("rolled back");

    assert!(matches!(err, EngineError::Apply(_)));
    assert_eq!(engine.graph(), &before);
    assert!(!engine.can_undo());
    assert!(engine.drain_events().is_empty());
}

#[test]
fn remote_mutations_notify_but_never_record() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    engine
        .apply_remote(Mutation::SetGeometry {
            id: cid("p1"),
            geometry: Rect::new(10, 10, 100, 80),
        })
        .expect("remote");

    assert!(!engine.can_undo());
    assert!(engine
        .drain_events()
        .iter()
        .any(|event| matches!(event, EngineEvent::NodeMoved { .. })));
    // Last applied wins: the remote geometry is in effect.
    assert_eq!(
        engine.graph().node(&cid("p1")).expect("p1").geometry(),
        Rect::new(10, 10, 100, 80)
    );
}

#[test]
fn recording_resumes_after_a_failed_visual_batch() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    let err = engine.apply_visual(&[
        Mutation::SetHighlight {
            id: cid("p1"),
            highlight: Highlight::Hover,
            on: true,
        },
        Mutation::SetAttr {
            id: cid("ghost"),
            path: SmolStr::new_static("style/opacity"),
            value: Some(SmolStr::new_static("0.5")),
        },
    ]);
    assert!(err.is_err());

    // The suspension depth must have been released on the error path.
    engine
        .apply(Mutation::SetLabel {
            id: cid("p1"),
            label: "API".to_owned(),
        })
        .expect("apply");
    assert!(engine.can_undo());
}

#[test]
fn undo_clears_selection_and_transient_styling() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    engine.select(&[cid("p1")]).expect("select");
    assert!(engine
        .graph()
        .node(&cid("p1"))
        .expect("p1")
        .attrs()
        .contains_key(SELECTION_HIGHLIGHT_PATH));

    engine
        .apply(Mutation::SetLabel {
            id: cid("p1"),
            label: "API".to_owned(),
        })
        .expect("apply");
    assert!(engine.undo().expect("undo"));

    assert!(engine.selection().is_empty());
    assert!(!engine
        .graph()
        .node(&cid("p1"))
        .expect("p1")
        .attrs()
        .contains_key(SELECTION_HIGHLIGHT_PATH));
}

#[test]
fn selection_changes_are_never_undo_steps() {
    let mut engine = engine_with(&fixtures::boundary_with_process());
    engine.select(&[cid("p1"), cid("s1")]).expect("select");
    engine.clear_selection().expect("clear");
    assert!(!engine.can_undo());
}

#[test]
fn delete_node_detaches_edges_as_one_undoable_step() {
    let mut engine = engine_with(&fixtures::boundary_with_process());
    let before = engine.graph().clone();

    engine.delete_node(&cid("p1")).expect("delete");

    assert!(engine.graph().node(&cid("p1")).is_none());
    assert!(engine.graph().edge(&cid("f1")).is_none());
    assert_eq!(engine.undo_depth(), 1);
    let events = engine.drain_events();
    assert!(events
        .iter()
        .any(|event| matches!(event, EngineEvent::EdgeRemoved { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, EngineEvent::NodeRemoved { .. })));

    assert!(engine.undo().expect("undo"));
    assert_eq!(engine.graph(), &before);
}

#[test]
fn undo_restores_connected_port_visibility() {
    let graph = fixtures::boundary_with_process();
    let mut engine = engine_with(&graph);

    // Deleting p1 drops f1 and hides s1's now-unconnected "in" port.
    engine.delete_node(&cid("p1")).expect("delete");
    assert!(!engine
        .graph()
        .node(&cid("s1"))
        .expect("s1")
        .ports()[&pid("in")]
        .visible());

    assert!(engine.undo().expect("undo"));

    // f1 is back; the port it references must be visible again.
    let s1 = engine.graph().node(&cid("s1")).expect("s1");
    assert!(s1.ports()[&pid("in")].visible());
    assert_eq!(engine.graph(), &graph);
}

#[test]
fn connect_edge_surfaces_malformed_port_as_warning() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    let edge = Edge::new(
        cid("f2"),
        Endpoint::new(cid("s1"), Some(pid("ghost"))),
        Endpoint::new(cid("p1"), Some(pid("in"))),
    );
    engine.connect_edge(edge).expect("connect");

    // The edge lands despite the bad reference; the healthy endpoint's
    // port is forced visible.
    assert!(engine.graph().edge(&cid("f2")).is_some());
    assert!(engine
        .graph()
        .node(&cid("p1"))
        .expect("p1")
        .ports()[&pid("in")]
        .visible());
    assert!(engine
        .drain_events()
        .iter()
        .any(|event| matches!(event, EngineEvent::PortWarning(_))));
}

#[test]
fn edge_draw_choreography_shows_then_hides_ports() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    engine.begin_edge_draw();
    assert!(engine
        .graph()
        .node(&cid("p1"))
        .expect("p1")
        .ports()[&pid("in")]
        .visible());

    engine.end_edge_draw();
    let p1 = engine.graph().node(&cid("p1")).expect("p1");
    assert!(!p1.ports()[&pid("in")].visible());
    // "out" carries f1 and must survive the sweep.
    assert!(p1.ports()[&pid("out")].visible());
    assert!(!engine.can_undo());
}

#[test]
fn reorder_to_front_is_recorded_and_clamped() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    engine.reorder(&[cid("p1")], ReorderOp::ToFront).expect("reorder");
    assert_eq!(engine.graph().node(&cid("p1")).expect("p1").z_order(), 11);
    assert_eq!(engine.undo_depth(), 1);

    assert!(engine.undo().expect("undo"));
    assert_eq!(engine.graph().node(&cid("p1")).expect("p1").z_order(), 10);
}

#[test]
fn bulk_load_emits_no_per_cell_events() {
    let graph = fixtures::boundary_with_process();
    let mut engine = Engine::new();
    let issues = engine.load_snapshot(&graph.to_snapshot());
    assert!(issues.is_empty());

    let events = engine.drain_events();
    assert!(!events
        .iter()
        .any(|event| matches!(event, EngineEvent::NodeAdded { .. })));
    assert!(!engine.can_undo());
    assert_eq!(engine.graph().nodes().len(), 3);
}

#[test]
fn gesture_finalized_inside_a_group_joins_the_group_record() {
    let graph = fixtures::boundary_with_process();
    let mut engine = engine_with(&graph);

    engine.gesture_frame(move_p1(300)).expect("frame");
    engine
        .atomic(|engine| {
            engine.apply_inner(&Mutation::SetLabel {
                id: cid("s1"),
                label: "Ledger".to_owned(),
            })?;
            engine.finalize_gesture(&cid("p1"))?;
            Ok(())
        })
        .expect("atomic");

    // The label edit and the coalesced drag collapse into one record.
    assert_eq!(engine.undo_depth(), 1);
    assert!(engine
        .drain_events()
        .iter()
        .any(|event| matches!(event, EngineEvent::GestureCompleted { .. })));

    assert!(engine.undo().expect("undo"));
    assert_eq!(engine.graph(), &graph);
}

#[test]
fn mid_gesture_applies_on_the_tracked_cell_stay_unrecorded() {
    let mut engine = engine_with(&fixtures::boundary_with_process());

    engine.gesture_frame(move_p1(170)).expect("frame");
    // A stray non-frame mutation on the dragged cell must not fork history.
    engine
        .apply(Mutation::SetGeometry {
            id: cid("p1"),
            geometry: Rect::new(180, 150, 100, 80),
        })
        .expect("apply");
    assert!(!engine.can_undo());

    engine.finalize_gesture(&cid("p1")).expect("finalize");
    assert_eq!(engine.undo_depth(), 1);
}
