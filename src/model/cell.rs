// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use smol_str::SmolStr;

use super::geometry::{Point, Rect};
use super::ids::{CellId, PortId};

/// The closed set of node types. The kind is decided at creation and stored
/// on the node; nothing in the engine inspects capabilities at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Actor,
    Process,
    Store,
    TrustBoundary,
    Annotation,
}

impl NodeKind {
    /// Kinds that stack at the ordinary baseline layer.
    pub fn is_ordinary(self) -> bool {
        matches!(self, Self::Actor | Self::Process | Self::Store)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Actor => "actor",
            Self::Process => "process",
            Self::Store => "store",
            Self::TrustBoundary => "trust-boundary",
            Self::Annotation => "annotation",
        };
        f.write_str(name)
    }
}

/// A named connection point on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Port {
    visible: bool,
}

impl Port {
    pub fn new(visible: bool) -> Self {
        Self { visible }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

/// A diagram node. The parent pointer lives here as an id; the containing
/// [`CellGraph`](super::graph::CellGraph) owns the arena and keeps the
/// embedding relation a forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: CellId,
    kind: NodeKind,
    label: String,
    geometry: Rect,
    z_order: i32,
    parent: Option<CellId>,
    ports: BTreeMap<PortId, Port>,
    attrs: BTreeMap<SmolStr, SmolStr>,
}

impl Node {
    pub fn new(id: CellId, kind: NodeKind, label: impl Into<String>, geometry: Rect) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            geometry,
            z_order: 0,
            parent: None,
            ports: BTreeMap::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &CellId {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn geometry(&self) -> Rect {
        self.geometry
    }

    pub fn set_geometry(&mut self, geometry: Rect) {
        self.geometry = geometry;
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }

    pub fn parent(&self) -> Option<&CellId> {
        self.parent.as_ref()
    }

    pub fn set_parent(&mut self, parent: Option<CellId>) {
        self.parent = parent;
    }

    pub fn ports(&self) -> &BTreeMap<PortId, Port> {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut BTreeMap<PortId, Port> {
        &mut self.ports
    }

    pub fn attrs(&self) -> &BTreeMap<SmolStr, SmolStr> {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut BTreeMap<SmolStr, SmolStr> {
        &mut self.attrs
    }
}

/// One end of an edge: the node it attaches to and, optionally, the specific
/// port on that node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    node: CellId,
    port: Option<PortId>,
}

impl Endpoint {
    pub fn new(node: CellId, port: Option<PortId>) -> Self {
        Self { node, port }
    }

    pub fn node(&self) -> &CellId {
        &self.node
    }

    pub fn port(&self) -> Option<&PortId> {
        self.port.as_ref()
    }
}

/// A flow between two nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    id: CellId,
    label: String,
    source: Endpoint,
    target: Endpoint,
    z_order: i32,
    waypoints: Vec<Point>,
    attrs: BTreeMap<SmolStr, SmolStr>,
}

impl Edge {
    pub fn new(id: CellId, source: Endpoint, target: Endpoint) -> Self {
        Self {
            id,
            label: String::new(),
            source,
            target,
            z_order: 0,
            waypoints: Vec::new(),
            attrs: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &CellId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn source(&self) -> &Endpoint {
        &self.source
    }

    pub fn set_source(&mut self, source: Endpoint) {
        self.source = source;
    }

    pub fn target(&self) -> &Endpoint {
        &self.target
    }

    pub fn set_target(&mut self, target: Endpoint) {
        self.target = target;
    }

    /// True if either end attaches to `node`.
    pub fn touches(&self, node: &CellId) -> bool {
        self.source.node() == node || self.target.node() == node
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    pub fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    pub fn set_waypoints(&mut self, waypoints: Vec<Point>) {
        self.waypoints = waypoints;
    }

    pub fn attrs(&self) -> &BTreeMap<SmolStr, SmolStr> {
        &self.attrs
    }

    pub fn attrs_mut(&mut self) -> &mut BTreeMap<SmolStr, SmolStr> {
        &mut self.attrs
    }
}
