// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::cell::{Edge, Endpoint, Node, NodeKind};
use super::geometry::{Point, Rect};
use super::ids::{CellId, PortId};

/// Arena of diagram cells, keyed by id. Nodes and edges share one id space.
///
/// The embedding relation is stored as per-node parent ids and is kept a
/// forest: every mutation path that sets a parent goes through cycle
/// validation before it reaches this arena.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellGraph {
    nodes: BTreeMap<CellId, Node>,
    edges: BTreeMap<CellId, Edge>,
}

impl CellGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &BTreeMap<CellId, Node> {
        &self.nodes
    }

    pub fn edges(&self) -> &BTreeMap<CellId, Edge> {
        &self.edges
    }

    pub fn node(&self, id: &CellId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &CellId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn edge(&self, id: &CellId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edge_mut(&mut self, id: &CellId) -> Option<&mut Edge> {
        self.edges.get_mut(id)
    }

    pub fn contains_cell(&self, id: &CellId) -> bool {
        self.nodes.contains_key(id) || self.edges.contains_key(id)
    }

    pub fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        let id = node.id().clone();
        if self.contains_cell(&id) {
            return Err(GraphError::DuplicateCellId { id });
        }
        self.nodes.insert(id, node);
        Ok(())
    }

    pub fn insert_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        let id = edge.id().clone();
        if self.contains_cell(&id) {
            return Err(GraphError::DuplicateCellId { id });
        }
        for endpoint in [edge.source(), edge.target()] {
            if !self.nodes.contains_key(endpoint.node()) {
                return Err(GraphError::UnknownNode {
                    id: endpoint.node().clone(),
                });
            }
        }
        self.edges.insert(id, edge);
        Ok(())
    }

    /// Removes a node, releasing its children to the removed node's parent.
    /// Children are never cascade-deleted. Edges touching the node are the
    /// caller's responsibility to detach first.
    pub fn remove_node(&mut self, id: &CellId) -> Option<Node> {
        let node = self.nodes.remove(id)?;
        let inherited = node.parent().cloned();
        for child in self.nodes.values_mut() {
            if child.parent() == Some(id) {
                child.set_parent(inherited.clone());
            }
        }
        Some(node)
    }

    pub fn remove_edge(&mut self, id: &CellId) -> Option<Edge> {
        self.edges.remove(id)
    }

    pub fn edges_touching<'a>(
        &'a self,
        node: &'a CellId,
    ) -> impl Iterator<Item = (&'a CellId, &'a Edge)> + 'a {
        self.edges.iter().filter(move |(_, edge)| edge.touches(node))
    }

    pub fn children<'a>(
        &'a self,
        parent: &'a CellId,
    ) -> impl Iterator<Item = (&'a CellId, &'a Node)> + 'a {
        self.nodes
            .iter()
            .filter(move |(_, node)| node.parent() == Some(parent))
    }

    /// Walks the ancestor chain of `id`, starting with its direct parent.
    pub fn ancestors<'a>(&'a self, id: &CellId) -> Ancestors<'a> {
        let next = self.nodes.get(id).and_then(|node| node.parent()).cloned();
        Ancestors { graph: self, next }
    }

    /// True if `ancestor` appears anywhere in the ancestor chain of `id`.
    pub fn is_ancestor(&self, ancestor: &CellId, id: &CellId) -> bool {
        self.ancestors(id).any(|hop| &hop == ancestor)
    }
}

/// Iterator over a node's ancestor ids, nearest first.
pub struct Ancestors<'a> {
    graph: &'a CellGraph,
    next: Option<CellId>,
}

impl Iterator for Ancestors<'_> {
    type Item = CellId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self
            .graph
            .nodes
            .get(&current)
            .and_then(|node| node.parent())
            .cloned();
        Some(current)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    DuplicateCellId { id: CellId },
    UnknownNode { id: CellId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCellId { id } => write!(f, "cell id '{id}' is already in use"),
            Self::UnknownNode { id } => write!(f, "node '{id}' does not exist"),
        }
    }
}

impl std::error::Error for GraphError {}

/// Flat, serializable form of a diagram as handed over by the persistence
/// collaborator. Loading is tolerant: structurally impossible rows are
/// reported as [`SnapshotIssue`]s and skipped or sanitized, never panicked
/// on — older save formats and hand-edited files must still load.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiagramSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeSnapshot>,
    #[serde(default)]
    pub edges: Vec<EdgeSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: CellId,
    pub kind: NodeKind,
    #[serde(default)]
    pub label: String,
    pub geometry: Rect,
    #[serde(default)]
    pub z_order: i32,
    #[serde(default)]
    pub parent: Option<CellId>,
    #[serde(default)]
    pub ports: Vec<PortSnapshot>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSnapshot {
    pub id: PortId,
    #[serde(default)]
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub id: CellId,
    #[serde(default)]
    pub label: String,
    pub source_node: CellId,
    #[serde(default)]
    pub source_port: Option<PortId>,
    pub target_node: CellId,
    #[serde(default)]
    pub target_port: Option<PortId>,
    #[serde(default)]
    pub z_order: i32,
    #[serde(default)]
    pub waypoints: Vec<Point>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
}

/// A row in a snapshot the loader could not take at face value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotIssue {
    DuplicateCellId { id: CellId },
    UnknownParent { node: CellId, parent: CellId },
    CircularParent { node: CellId },
    DanglingEndpoint { edge: CellId, node: CellId },
}

impl fmt::Display for SnapshotIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateCellId { id } => write!(f, "duplicate cell id '{id}', row skipped"),
            Self::UnknownParent { node, parent } => {
                write!(f, "node '{node}' references unknown parent '{parent}', detached")
            }
            Self::CircularParent { node } => {
                write!(f, "node '{node}' sits on a circular parent chain, detached")
            }
            Self::DanglingEndpoint { edge, node } => {
                write!(f, "edge '{edge}' references unknown node '{node}', edge skipped")
            }
        }
    }
}

impl CellGraph {
    /// Builds a graph from a freshly deserialized snapshot.
    ///
    /// Rows that cannot be represented (duplicate ids, dangling edge
    /// endpoints) are skipped; parent references that are unknown or would
    /// form a cycle are cleared. Edge port references are *not* checked
    /// here — a port id pointing at nothing is a repair-pass concern, not a
    /// structural impossibility.
    pub fn from_snapshot(snapshot: &DiagramSnapshot) -> (Self, Vec<SnapshotIssue>) {
        let mut graph = Self::new();
        let mut issues = Vec::new();

        for row in &snapshot.nodes {
            let mut node = Node::new(row.id.clone(), row.kind, row.label.clone(), row.geometry);
            node.set_z_order(row.z_order);
            node.set_parent(row.parent.clone());
            for port in &row.ports {
                node.ports_mut()
                    .insert(port.id.clone(), super::cell::Port::new(port.visible));
            }
            for (key, value) in &row.attrs {
                node.attrs_mut()
                    .insert(key.as_str().into(), value.as_str().into());
            }
            if graph.insert_node(node).is_err() {
                issues.push(SnapshotIssue::DuplicateCellId { id: row.id.clone() });
            }
        }

        graph.sanitize_parents(&mut issues);

        for row in &snapshot.edges {
            if graph.contains_cell(&row.id) {
                issues.push(SnapshotIssue::DuplicateCellId { id: row.id.clone() });
                continue;
            }
            let mut dangling = false;
            for endpoint in [&row.source_node, &row.target_node] {
                if !graph.nodes.contains_key(endpoint) {
                    issues.push(SnapshotIssue::DanglingEndpoint {
                        edge: row.id.clone(),
                        node: endpoint.clone(),
                    });
                    dangling = true;
                }
            }
            if dangling {
                continue;
            }
            let mut edge = Edge::new(
                row.id.clone(),
                Endpoint::new(row.source_node.clone(), row.source_port.clone()),
                Endpoint::new(row.target_node.clone(), row.target_port.clone()),
            );
            edge.set_label(row.label.clone());
            edge.set_z_order(row.z_order);
            edge.set_waypoints(row.waypoints.clone());
            for (key, value) in &row.attrs {
                edge.attrs_mut()
                    .insert(key.as_str().into(), value.as_str().into());
            }
            // Endpoints were checked above; insertion cannot fail.
            graph
                .edges
                .insert(edge.id().clone(), edge);
        }

        (graph, issues)
    }

    pub fn to_snapshot(&self) -> DiagramSnapshot {
        let nodes = self
            .nodes
            .values()
            .map(|node| NodeSnapshot {
                id: node.id().clone(),
                kind: node.kind(),
                label: node.label().to_owned(),
                geometry: node.geometry(),
                z_order: node.z_order(),
                parent: node.parent().cloned(),
                ports: node
                    .ports()
                    .iter()
                    .map(|(id, port)| PortSnapshot {
                        id: id.clone(),
                        visible: port.visible(),
                    })
                    .collect(),
                attrs: node
                    .attrs()
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            })
            .collect();

        let edges = self
            .edges
            .values()
            .map(|edge| EdgeSnapshot {
                id: edge.id().clone(),
                label: edge.label().to_owned(),
                source_node: edge.source().node().clone(),
                source_port: edge.source().port().cloned(),
                target_node: edge.target().node().clone(),
                target_port: edge.target().port().cloned(),
                z_order: edge.z_order(),
                waypoints: edge.waypoints().to_vec(),
                attrs: edge
                    .attrs()
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_string()))
                    .collect(),
            })
            .collect();

        DiagramSnapshot { nodes, edges }
    }

    /// Clears parent references that point at unknown nodes or close a
    /// cycle. After this, the parent relation is a forest and ancestor
    /// walks terminate.
    fn sanitize_parents(&mut self, issues: &mut Vec<SnapshotIssue>) {
        let ids: Vec<CellId> = self.nodes.keys().cloned().collect();

        for id in &ids {
            let Some(parent) = self.nodes[id].parent().cloned() else {
                continue;
            };
            if !self.nodes.contains_key(&parent) {
                issues.push(SnapshotIssue::UnknownParent {
                    node: id.clone(),
                    parent,
                });
                if let Some(node) = self.nodes.get_mut(id) {
                    node.set_parent(None);
                }
            }
        }

        for id in &ids {
            let mut seen: BTreeSet<CellId> = BTreeSet::new();
            seen.insert(id.clone());
            let mut current = self.nodes.get(id).and_then(|node| node.parent()).cloned();
            while let Some(hop) = current {
                if !seen.insert(hop.clone()) {
                    // Walking from a cycle member always revisits the start
                    // node first; a walk that merely enters a cycle revisits
                    // the entry point instead. Only cycle members detach;
                    // descendants keep their chain, which terminates once
                    // the cycle is broken.
                    if &hop == id {
                        issues.push(SnapshotIssue::CircularParent { node: id.clone() });
                        if let Some(node) = self.nodes.get_mut(id) {
                            node.set_parent(None);
                        }
                    }
                    break;
                }
                current = self.nodes.get(&hop).and_then(|node| node.parent()).cloned();
            }
        }
    }
}
