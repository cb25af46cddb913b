//! JSON output of a layout
//!
//! Positions are written in canvas units, nodes in graph order, edges as
//! `[source, target]` id pairs.

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryShape;
use crate::io::{IoError, IoResult, LayoutWriter};
use crate::observer::Frame;

/// Canvas extent in layout units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
}

/// A node and where it ended up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Serialized form of a layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub canvas: Canvas,
    pub boundary: BoundaryShape,
    pub temperature: f64,
    pub nodes: Vec<NodePosition>,
    pub edges: Vec<[String; 2]>,
}

impl LayoutDocument {
    pub fn from_frame(frame: &Frame<'_>) -> Self {
        Self {
            canvas: Canvas {
                width: frame.config.canvas_width,
                height: frame.config.canvas_height,
            },
            boundary: frame.config.boundary,
            temperature: frame.temperature(),
            nodes: frame
                .positions()
                .map(|(id, p)| NodePosition {
                    id: id.to_string(),
                    x: p.x,
                    y: p.y,
                })
                .collect(),
            edges: frame
                .graph
                .edges()
                .iter()
                .map(|edge| {
                    let (a, b) = frame.graph.edge_ids(edge);
                    [a.to_string(), b.to_string()]
                })
                .collect(),
        }
    }
}

/// Writes layouts as pretty-printed JSON
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonWriter;

impl JsonWriter {
    pub fn new() -> Self {
        Self
    }
}

impl LayoutWriter for JsonWriter {
    fn render(&self, frame: &Frame<'_>) -> IoResult<String> {
        let document = LayoutDocument::from_frame(frame);
        serde_json::to_string_pretty(&document).map_err(|e| IoError::Write(e.to_string()))
    }

    fn format_id(&self) -> &str {
        "json"
    }

    fn extensions(&self) -> &[&str] {
        &["json"]
    }
}
