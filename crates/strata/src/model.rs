//! Label types carried by the layout graph, and the options that configure a layout.
//!
//! `GraphLabel` doubles as the configuration surface: it is (de)serializable with defaults for
//! every field, so callers can load partial JSON option blocks.

use crate::graphlib::{EdgeKey, Graph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The graph type every layout phase operates on.
pub type LayoutGraph = Graph<NodeLabel, EdgeLabel, GraphLabel>;

/// Opaque pass-through payload. Layout never reads or writes it.
pub type Extras = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RankDir {
    #[default]
    TB,
    BT,
    LR,
    RL,
}

impl RankDir {
    pub fn is_horizontal(self) -> bool {
        matches!(self, RankDir::LR | RankDir::RL)
    }

    pub fn is_reversed(self) -> bool {
        matches!(self, RankDir::BT | RankDir::RL)
    }
}

/// Which of the four vertical/horizontal alignments anchors the averaged packing coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Align {
    #[default]
    UL,
    UR,
    DL,
    DR,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ranker {
    #[default]
    NetworkSimplex,
    TightTree,
    LongestPath,
}

/// Cycle-breaking strategy. Only the depth-first back-edge reverser is provided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Acyclicer {
    #[default]
    Greedy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphLabel {
    pub rankdir: RankDir,
    pub align: Align,
    pub ranker: Ranker,
    pub acyclicer: Acyclicer,
    pub nodesep: f64,
    pub edgesep: f64,
    pub ranksep: f64,
    pub marginx: f64,
    pub marginy: f64,
    /// Space kept between a container's border and its children.
    pub compound_padding: f64,

    /// Overall size, written by layout.
    pub width: f64,
    pub height: f64,
}

impl Default for GraphLabel {
    fn default() -> Self {
        Self {
            rankdir: RankDir::TB,
            align: Align::UL,
            ranker: Ranker::NetworkSimplex,
            acyclicer: Acyclicer::Greedy,
            nodesep: 50.0,
            edgesep: 20.0,
            ranksep: 50.0,
            marginx: 0.0,
            marginy: 0.0,
            compound_padding: 30.0,
            width: 0.0,
            height: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeLabel {
    pub width: f64,
    pub height: f64,
    /// Center, set by layout.
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rank: Option<i32>,
    pub order: Option<usize>,

    /// Chain node standing in for one rank step of a long edge during ordering.
    #[serde(skip)]
    pub dummy: bool,
    #[serde(skip)]
    pub edge_obj: Option<EdgeKey>,
    /// Descendants chosen as endpoints for edges leaving / entering this container.
    #[serde(skip)]
    pub border_top: Option<String>,
    #[serde(skip)]
    pub border_bottom: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: Extras,
}

impl NodeLabel {
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn center(&self) -> Option<Point> {
        Some(Point {
            x: self.x?,
            y: self.y?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLabel {
    /// Minimum rank distance between the endpoints.
    pub minlen: usize,
    pub weight: f64,

    pub points: Vec<Point>,
    /// Label anchor, set by layout.
    pub x: Option<f64>,
    pub y: Option<f64>,

    #[serde(skip)]
    pub reversed: bool,
    #[serde(skip)]
    pub forward_name: Option<String>,
    /// Caller's edge this layout-graph edge was copied from.
    #[serde(skip)]
    pub origin: Option<EdgeKey>,
    /// Original `(v, w)` of an edge moved off a container.
    #[serde(skip)]
    pub redirected: Option<(String, String)>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: Extras,
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self {
            minlen: 1,
            weight: 1.0,
            points: Vec::new(),
            x: None,
            y: None,
            reversed: false,
            forward_name: None,
            origin: None,
            redirected: None,
            extras: Extras::new(),
        }
    }
}

impl EdgeLabel {
    pub fn weighted(weight: f64, minlen: usize) -> Self {
        Self {
            weight,
            minlen,
            ..Default::default()
        }
    }
}
