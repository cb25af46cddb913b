//! SVG rendering of a layout
//!
//! Layout coordinates are mapped from the canvas onto a fixed pixel frame
//! (800x600 by default) with a margin so border nodes stay fully visible.
//! Colors and sizes follow the classic look: white background, black edges,
//! red nodes with a black border.

use askama::Template;

use crate::boundary::BoundaryShape;
use crate::io::{IoError, IoResult, LayoutWriter};
use crate::observer::Frame;
use crate::vector::Vector2;

/// Drawing style
#[derive(Debug, Clone)]
pub struct Palette {
    pub background: &'static str,
    pub node: &'static str,
    pub node_border: &'static str,
    pub node_border_thickness: u32,
    pub node_radius: u32,
    pub edge: &'static str,
    pub edge_thickness: u32,
    pub outline: &'static str,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: "rgb(255,255,255)",
            node: "rgb(255,0,0)",
            node_border: "rgb(0,0,0)",
            node_border_thickness: 2,
            node_radius: 10,
            edge: "rgb(0,0,0)",
            edge_thickness: 2,
            outline: "rgb(200,200,200)",
        }
    }
}

struct NodeMark {
    id: String,
    cx: String,
    cy: String,
}

struct EdgeMark {
    x1: String,
    y1: String,
    x2: String,
    y2: String,
}

struct Outline {
    cx: String,
    cy: String,
    rx: String,
    ry: String,
}

#[derive(Template)]
#[template(path = "layout.svg", escape = "html")]
struct LayoutTemplate<'a> {
    title: &'a str,
    width: u32,
    height: u32,
    palette: &'a Palette,
    outline: Option<Outline>,
    edges: Vec<EdgeMark>,
    nodes: Vec<NodeMark>,
}

#[derive(Template)]
#[template(path = "preview.html")]
struct PreviewTemplate<'a> {
    title: &'a str,
    status: String,
    temperature: String,
    svg: &'a str,
}

fn px(value: f64) -> String {
    format!("{value:.2}")
}

/// Writes layouts as standalone SVG documents
#[derive(Debug, Clone)]
pub struct SvgWriter {
    width: u32,
    height: u32,
    palette: Palette,
    title: String,
}

impl Default for SvgWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgWriter {
    /// 800x600 frame with the default palette
    pub fn new() -> Self {
        Self {
            width: 800,
            height: 600,
            palette: Palette::default(),
            title: "Graph layout".to_string(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn margin(&self) -> f64 {
        f64::from(self.palette.node_radius + self.palette.node_border_thickness)
    }

    /// Pixel position of a layout point
    pub fn to_pixels(&self, pos: Vector2, canvas_width: f64, canvas_height: f64) -> Vector2 {
        let margin = self.margin();
        let span = Vector2::new(
            (f64::from(self.width) - 2.0 * margin).max(0.0),
            (f64::from(self.height) - 2.0 * margin).max(0.0),
        );
        let unit = Vector2::new(pos.x / canvas_width, pos.y / canvas_height);
        unit.componentwise_multiply(span)
            .add(Vector2::new(margin, margin))
    }

    /// Wrap the SVG of `frame` in an HTML page for the live preview
    pub fn render_page(&self, frame: &Frame<'_>, status: &str) -> IoResult<String> {
        let svg = self.render(frame)?;
        PreviewTemplate {
            title: &self.title,
            status: status.to_string(),
            temperature: format!("{:.5}", frame.temperature()),
            svg: &svg,
        }
        .render()
        .map_err(|e| IoError::Write(e.to_string()))
    }
}

impl LayoutWriter for SvgWriter {
    fn render(&self, frame: &Frame<'_>) -> IoResult<String> {
        let (cw, ch) = (frame.config.canvas_width, frame.config.canvas_height);
        let state = frame.state;
        let pixel = |i: usize| self.to_pixels(state.positions()[i], cw, ch);

        let edges = frame
            .graph
            .edges()
            .iter()
            .map(|edge| {
                let (a, b) = (pixel(edge.source), pixel(edge.target));
                EdgeMark {
                    x1: px(a.x),
                    y1: px(a.y),
                    x2: px(b.x),
                    y2: px(b.y),
                }
            })
            .collect();

        let nodes = frame
            .graph
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let p = pixel(i);
                NodeMark {
                    id: id.clone(),
                    cx: px(p.x),
                    cy: px(p.y),
                }
            })
            .collect();

        let outline = (frame.config.boundary == BoundaryShape::Ellipse).then(|| {
            let center = self.to_pixels(Vector2::new(cw / 2.0, ch / 2.0), cw, ch);
            let corner = self.to_pixels(Vector2::new(cw, ch), cw, ch);
            Outline {
                cx: px(center.x),
                cy: px(center.y),
                rx: px(corner.x - center.x),
                ry: px(corner.y - center.y),
            }
        });

        LayoutTemplate {
            title: &self.title,
            width: self.width,
            height: self.height,
            palette: &self.palette,
            outline,
            edges,
            nodes,
        }
        .render()
        .map_err(|e| IoError::Write(e.to_string()))
    }

    fn format_id(&self) -> &str {
        "svg"
    }

    fn extensions(&self) -> &[&str] {
        &["svg"]
    }
}
