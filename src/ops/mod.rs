// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Low-level mutations against the cell graph.
//!
//! A [`Mutation`] is a *request*; applying one yields the [`CellChange`]s
//! that actually happened, each carrying enough before/after state to be
//! inverted. Undo/redo replays inverted changes; the history layer decides
//! which changes are worth keeping.

use std::fmt;

use smol_str::SmolStr;

use crate::model::{CellGraph, CellId, Edge, Endpoint, Node, Point, Rect};

/// Attribute path toggled by hover glow.
pub const HOVER_GLOW_PATH: &str = "style/hover-glow";
/// Attribute path toggled by selection highlight.
pub const SELECTION_HIGHLIGHT_PATH: &str = "style/selection-highlight";
/// Attribute path toggled by temporary drag tooling.
pub const DRAG_PREVIEW_PATH: &str = "style/drag-preview";

/// Transient visual styling paths that must never survive in a restored
/// snapshot.
pub const TRANSIENT_STYLE_PATHS: [&str; 3] = [
    HOVER_GLOW_PATH,
    SELECTION_HIGHLIGHT_PATH,
    DRAG_PREVIEW_PATH,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Hover,
    Selection,
    DragPreview,
}

impl Highlight {
    pub fn attr_path(self) -> &'static str {
        match self {
            Self::Hover => HOVER_GLOW_PATH,
            Self::Selection => SELECTION_HIGHLIGHT_PATH,
            Self::DragPreview => DRAG_PREVIEW_PATH,
        }
    }
}

/// A requested low-level mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddNode { node: Node },
    /// Fails while edges still touch the node; callers detach first.
    RemoveNode { id: CellId },
    SetGeometry { id: CellId, geometry: Rect },
    SetParent { id: CellId, parent: Option<CellId> },
    SetZOrder { id: CellId, z_order: i32 },
    SetLabel { id: CellId, label: String },
    AddEdge { edge: Edge },
    RemoveEdge { id: CellId },
    SetEdgeSource { id: CellId, endpoint: Endpoint },
    SetEdgeTarget { id: CellId, endpoint: Endpoint },
    SetWaypoints { id: CellId, waypoints: Vec<Point> },
    SetAttr {
        id: CellId,
        path: SmolStr,
        value: Option<SmolStr>,
    },
    SetHighlight {
        id: CellId,
        highlight: Highlight,
        on: bool,
    },
}

/// The declared kind of a mutation, used by the history layer's fixed
/// exclude-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    AddNode,
    RemoveNode,
    Geometry,
    Reparent,
    ZOrder,
    Label,
    AddEdge,
    RemoveEdge,
    Retarget,
    VertexEdit,
    AttrEdit,
    HoverHighlight,
    SelectionHighlight,
    DragPreview,
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::AddNode { .. } => MutationKind::AddNode,
            Self::RemoveNode { .. } => MutationKind::RemoveNode,
            Self::SetGeometry { .. } => MutationKind::Geometry,
            Self::SetParent { .. } => MutationKind::Reparent,
            Self::SetZOrder { .. } => MutationKind::ZOrder,
            Self::SetLabel { .. } => MutationKind::Label,
            Self::AddEdge { .. } => MutationKind::AddEdge,
            Self::RemoveEdge { .. } => MutationKind::RemoveEdge,
            Self::SetEdgeSource { .. } | Self::SetEdgeTarget { .. } => MutationKind::Retarget,
            Self::SetWaypoints { .. } => MutationKind::VertexEdit,
            Self::SetAttr { .. } => MutationKind::AttrEdit,
            Self::SetHighlight { highlight, .. } => match highlight {
                Highlight::Hover => MutationKind::HoverHighlight,
                Highlight::Selection => MutationKind::SelectionHighlight,
                Highlight::DragPreview => MutationKind::DragPreview,
            },
        }
    }

    /// The cell this mutation targets.
    pub fn target(&self) -> &CellId {
        match self {
            Self::AddNode { node } => node.id(),
            Self::AddEdge { edge } => edge.id(),
            Self::RemoveNode { id }
            | Self::SetGeometry { id, .. }
            | Self::SetParent { id, .. }
            | Self::SetZOrder { id, .. }
            | Self::SetLabel { id, .. }
            | Self::RemoveEdge { id }
            | Self::SetEdgeSource { id, .. }
            | Self::SetEdgeTarget { id, .. }
            | Self::SetWaypoints { id, .. }
            | Self::SetAttr { id, .. }
            | Self::SetHighlight { id, .. } => id,
        }
    }
}

/// A change that has been applied, with enough state to invert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellChange {
    NodeAdded { node: Node },
    /// The node carried no children at removal time; reparenting of its
    /// children is emitted as separate `Parent` changes beforehand.
    NodeRemoved { node: Node },
    EdgeAdded { edge: Edge },
    EdgeRemoved { edge: Edge },
    Geometry { id: CellId, from: Rect, to: Rect },
    Parent {
        id: CellId,
        from: Option<CellId>,
        to: Option<CellId>,
    },
    ZOrder { id: CellId, from: i32, to: i32 },
    Label { id: CellId, from: String, to: String },
    Source { id: CellId, from: Endpoint, to: Endpoint },
    Target { id: CellId, from: Endpoint, to: Endpoint },
    Waypoints {
        id: CellId,
        from: Vec<Point>,
        to: Vec<Point>,
    },
    Attr {
        id: CellId,
        path: SmolStr,
        from: Option<SmolStr>,
        to: Option<SmolStr>,
    },
}

impl CellChange {
    pub fn cell(&self) -> &CellId {
        match self {
            Self::NodeAdded { node } | Self::NodeRemoved { node } => node.id(),
            Self::EdgeAdded { edge } | Self::EdgeRemoved { edge } => edge.id(),
            Self::Geometry { id, .. }
            | Self::Parent { id, .. }
            | Self::ZOrder { id, .. }
            | Self::Label { id, .. }
            | Self::Source { id, .. }
            | Self::Target { id, .. }
            | Self::Waypoints { id, .. }
            | Self::Attr { id, .. } => id,
        }
    }

    pub fn inverted(&self) -> CellChange {
        match self {
            Self::NodeAdded { node } => Self::NodeRemoved { node: node.clone() },
            Self::NodeRemoved { node } => Self::NodeAdded { node: node.clone() },
            Self::EdgeAdded { edge } => Self::EdgeRemoved { edge: edge.clone() },
            Self::EdgeRemoved { edge } => Self::EdgeAdded { edge: edge.clone() },
            Self::Geometry { id, from, to } => Self::Geometry {
                id: id.clone(),
                from: *to,
                to: *from,
            },
            Self::Parent { id, from, to } => Self::Parent {
                id: id.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Self::ZOrder { id, from, to } => Self::ZOrder {
                id: id.clone(),
                from: *to,
                to: *from,
            },
            Self::Label { id, from, to } => Self::Label {
                id: id.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Self::Source { id, from, to } => Self::Source {
                id: id.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Self::Target { id, from, to } => Self::Target {
                id: id.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Self::Waypoints { id, from, to } => Self::Waypoints {
                id: id.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Self::Attr { id, path, from, to } => Self::Attr {
                id: id.clone(),
                path: path.clone(),
                from: to.clone(),
                to: from.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyError {
    UnknownNode { id: CellId },
    UnknownEdge { id: CellId },
    UnknownCell { id: CellId },
    DuplicateCellId { id: CellId },
    /// Structural cycle guard on reparenting. Rule-level embedding
    /// validation happens before a `SetParent` is ever issued; this is the
    /// last line of defense.
    WouldCycle { parent: CellId, child: CellId },
    NodeHasEdges { id: CellId },
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { id } => write!(f, "node '{id}' does not exist"),
            Self::UnknownEdge { id } => write!(f, "edge '{id}' does not exist"),
            Self::UnknownCell { id } => write!(f, "cell '{id}' does not exist"),
            Self::DuplicateCellId { id } => write!(f, "cell id '{id}' is already in use"),
            Self::WouldCycle { parent, child } => {
                write!(f, "parenting '{child}' under '{parent}' would form a cycle")
            }
            Self::NodeHasEdges { id } => {
                write!(f, "node '{id}' still has edges attached; detach them first")
            }
        }
    }
}

impl std::error::Error for ApplyError {}

/// Applies one mutation, returning the changes that took effect. A mutation
/// that would not change anything returns an empty list.
pub fn apply_mutation(graph: &mut CellGraph, mutation: &Mutation) -> Result<Vec<CellChange>, ApplyError> {
    match mutation {
        Mutation::AddNode { node } => {
            graph
                .insert_node(node.clone())
                .map_err(|_| ApplyError::DuplicateCellId {
                    id: node.id().clone(),
                })?;
            Ok(vec![CellChange::NodeAdded { node: node.clone() }])
        }
        Mutation::RemoveNode { id } => {
            if graph.node(id).is_none() {
                return Err(ApplyError::UnknownNode { id: id.clone() });
            }
            if graph.edges_touching(id).next().is_some() {
                return Err(ApplyError::NodeHasEdges { id: id.clone() });
            }

            let inherited = graph.node(id).and_then(|node| node.parent()).cloned();
            let mut changes = Vec::new();
            let children: Vec<CellId> = graph.children(id).map(|(child, _)| child.clone()).collect();
            for child in children {
                changes.push(CellChange::Parent {
                    id: child.clone(),
                    from: Some(id.clone()),
                    to: inherited.clone(),
                });
            }
            // remove_node itself performs the reparenting recorded above.
            let node = graph.remove_node(id).ok_or_else(|| ApplyError::UnknownNode {
                id: id.clone(),
            })?;
            changes.push(CellChange::NodeRemoved { node });
            Ok(changes)
        }
        Mutation::SetGeometry { id, geometry } => {
            let node = graph
                .node_mut(id)
                .ok_or_else(|| ApplyError::UnknownNode { id: id.clone() })?;
            let from = node.geometry();
            if from == *geometry {
                return Ok(Vec::new());
            }
            node.set_geometry(*geometry);
            Ok(vec![CellChange::Geometry {
                id: id.clone(),
                from,
                to: *geometry,
            }])
        }
        Mutation::SetParent { id, parent } => {
            if let Some(parent) = parent {
                if graph.node(parent).is_none() {
                    return Err(ApplyError::UnknownNode { id: parent.clone() });
                }
                if parent == id || graph.is_ancestor(id, parent) {
                    return Err(ApplyError::WouldCycle {
                        parent: parent.clone(),
                        child: id.clone(),
                    });
                }
            }
            let node = graph
                .node_mut(id)
                .ok_or_else(|| ApplyError::UnknownNode { id: id.clone() })?;
            let from = node.parent().cloned();
            if from == *parent {
                return Ok(Vec::new());
            }
            node.set_parent(parent.clone());
            Ok(vec![CellChange::Parent {
                id: id.clone(),
                from,
                to: parent.clone(),
            }])
        }
        Mutation::SetZOrder { id, z_order } => {
            if let Some(node) = graph.node_mut(id) {
                let from = node.z_order();
                if from == *z_order {
                    return Ok(Vec::new());
                }
                node.set_z_order(*z_order);
                return Ok(vec![CellChange::ZOrder {
                    id: id.clone(),
                    from,
                    to: *z_order,
                }]);
            }
            if let Some(edge) = graph.edge_mut(id) {
                let from = edge.z_order();
                if from == *z_order {
                    return Ok(Vec::new());
                }
                edge.set_z_order(*z_order);
                return Ok(vec![CellChange::ZOrder {
                    id: id.clone(),
                    from,
                    to: *z_order,
                }]);
            }
            Err(ApplyError::UnknownCell { id: id.clone() })
        }
        Mutation::SetLabel { id, label } => {
            if let Some(node) = graph.node_mut(id) {
                let from = node.label().to_owned();
                if from == *label {
                    return Ok(Vec::new());
                }
                node.set_label(label.clone());
                return Ok(vec![CellChange::Label {
                    id: id.clone(),
                    from,
                    to: label.clone(),
                }]);
            }
            if let Some(edge) = graph.edge_mut(id) {
                let from = edge.label().to_owned();
                if from == *label {
                    return Ok(Vec::new());
                }
                edge.set_label(label.clone());
                return Ok(vec![CellChange::Label {
                    id: id.clone(),
                    from,
                    to: label.clone(),
                }]);
            }
            Err(ApplyError::UnknownCell { id: id.clone() })
        }
        Mutation::AddEdge { edge } => {
            graph.insert_edge(edge.clone()).map_err(|err| match err {
                crate::model::GraphError::DuplicateCellId { id } => {
                    ApplyError::DuplicateCellId { id }
                }
                crate::model::GraphError::UnknownNode { id } => ApplyError::UnknownNode { id },
            })?;
            Ok(vec![CellChange::EdgeAdded { edge: edge.clone() }])
        }
        Mutation::RemoveEdge { id } => {
            let edge = graph
                .remove_edge(id)
                .ok_or_else(|| ApplyError::UnknownEdge { id: id.clone() })?;
            Ok(vec![CellChange::EdgeRemoved { edge }])
        }
        Mutation::SetEdgeSource { id, endpoint } => {
            if graph.node(endpoint.node()).is_none() {
                return Err(ApplyError::UnknownNode {
                    id: endpoint.node().clone(),
                });
            }
            let edge = graph
                .edge_mut(id)
                .ok_or_else(|| ApplyError::UnknownEdge { id: id.clone() })?;
            let from = edge.source().clone();
            if from == *endpoint {
                return Ok(Vec::new());
            }
            edge.set_source(endpoint.clone());
            Ok(vec![CellChange::Source {
                id: id.clone(),
                from,
                to: endpoint.clone(),
            }])
        }
        Mutation::SetEdgeTarget { id, endpoint } => {
            if graph.node(endpoint.node()).is_none() {
                return Err(ApplyError::UnknownNode {
                    id: endpoint.node().clone(),
                });
            }
            let edge = graph
                .edge_mut(id)
                .ok_or_else(|| ApplyError::UnknownEdge { id: id.clone() })?;
            let from = edge.target().clone();
            if from == *endpoint {
                return Ok(Vec::new());
            }
            edge.set_target(endpoint.clone());
            Ok(vec![CellChange::Target {
                id: id.clone(),
                from,
                to: endpoint.clone(),
            }])
        }
        Mutation::SetWaypoints { id, waypoints } => {
            let edge = graph
                .edge_mut(id)
                .ok_or_else(|| ApplyError::UnknownEdge { id: id.clone() })?;
            let from = edge.waypoints().to_vec();
            if from == *waypoints {
                return Ok(Vec::new());
            }
            edge.set_waypoints(waypoints.clone());
            Ok(vec![CellChange::Waypoints {
                id: id.clone(),
                from,
                to: waypoints.clone(),
            }])
        }
        Mutation::SetAttr { id, path, value } => set_attr(graph, id, path, value.clone()),
        Mutation::SetHighlight { id, highlight, on } => {
            let value = on.then(|| SmolStr::new_static("1"));
            set_attr(graph, id, &SmolStr::new_static(highlight.attr_path()), value)
        }
    }
}

fn set_attr(
    graph: &mut CellGraph,
    id: &CellId,
    path: &SmolStr,
    value: Option<SmolStr>,
) -> Result<Vec<CellChange>, ApplyError> {
    let attrs = if let Some(node) = graph.node_mut(id) {
        node.attrs_mut()
    } else if let Some(edge) = graph.edge_mut(id) {
        edge.attrs_mut()
    } else {
        return Err(ApplyError::UnknownCell { id: id.clone() });
    };

    let from = attrs.get(path).cloned();
    if from == value {
        return Ok(Vec::new());
    }
    match &value {
        Some(new) => {
            attrs.insert(path.clone(), new.clone());
        }
        None => {
            attrs.remove(path);
        }
    }
    Ok(vec![CellChange::Attr {
        id: id.clone(),
        path: path.clone(),
        from,
        to: value,
    }])
}

/// Replays an already-applied change (typically an inverted one during
/// undo). Failure here means a layer this engine depends on broke
/// consistency; callers treat it as fatal.
pub fn apply_change(graph: &mut CellGraph, change: &CellChange) -> Result<(), ApplyError> {
    match change {
        CellChange::NodeAdded { node } => graph
            .insert_node(node.clone())
            .map_err(|_| ApplyError::DuplicateCellId {
                id: node.id().clone(),
            }),
        CellChange::NodeRemoved { node } => {
            graph
                .remove_node(node.id())
                .map(|_| ())
                .ok_or_else(|| ApplyError::UnknownNode {
                    id: node.id().clone(),
                })
        }
        CellChange::EdgeAdded { edge } => {
            graph.insert_edge(edge.clone()).map_err(|err| match err {
                crate::model::GraphError::DuplicateCellId { id } => {
                    ApplyError::DuplicateCellId { id }
                }
                crate::model::GraphError::UnknownNode { id } => ApplyError::UnknownNode { id },
            })
        }
        CellChange::EdgeRemoved { edge } => {
            graph
                .remove_edge(edge.id())
                .map(|_| ())
                .ok_or_else(|| ApplyError::UnknownEdge {
                    id: edge.id().clone(),
                })
        }
        CellChange::Geometry { id, to, .. } => {
            apply_mutation(graph, &Mutation::SetGeometry {
                id: id.clone(),
                geometry: *to,
            })
            .map(|_| ())
        }
        CellChange::Parent { id, to, .. } => {
            apply_mutation(graph, &Mutation::SetParent {
                id: id.clone(),
                parent: to.clone(),
            })
            .map(|_| ())
        }
        CellChange::ZOrder { id, to, .. } => {
            apply_mutation(graph, &Mutation::SetZOrder {
                id: id.clone(),
                z_order: *to,
            })
            .map(|_| ())
        }
        CellChange::Label { id, to, .. } => {
            apply_mutation(graph, &Mutation::SetLabel {
                id: id.clone(),
                label: to.clone(),
            })
            .map(|_| ())
        }
        CellChange::Source { id, to, .. } => {
            apply_mutation(graph, &Mutation::SetEdgeSource {
                id: id.clone(),
                endpoint: to.clone(),
            })
            .map(|_| ())
        }
        CellChange::Target { id, to, .. } => {
            apply_mutation(graph, &Mutation::SetEdgeTarget {
                id: id.clone(),
                endpoint: to.clone(),
            })
            .map(|_| ())
        }
        CellChange::Waypoints { id, to, .. } => {
            apply_mutation(graph, &Mutation::SetWaypoints {
                id: id.clone(),
                waypoints: to.clone(),
            })
            .map(|_| ())
        }
        CellChange::Attr { id, path, to, .. } => {
            set_attr(graph, id, path, to.clone()).map(|_| ())
        }
    }
}
