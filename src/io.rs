//! Graph loading and layout output dispatch
//!
//! `GraphReader` parses the plain-text graph description; `LayoutWriter`
//! implementations render a finished (or in-progress) layout, and
//! `FormatRegistry` picks one by format id or output file extension.
//!
//! Graph description format:
//!
//! ```text
//! N M
//! <node id>      (N lines)
//! <id> <id>      (M lines)
//! ```

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::graph::{GraphFormatError, GraphModel};
use crate::json_writer::JsonWriter;
use crate::observer::Frame;
use crate::svg_writer::SvgWriter;

/// Errors that can occur during reading or writing
#[derive(Error, Debug)]
pub enum IoError {
    /// The output format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The graph description is malformed
    #[error("invalid graph description: {0}")]
    Format(#[from] GraphFormatError),

    /// A rendering/writing error occurred
    #[error("write error: {0}")]
    Write(String),
}

/// Result type for reader/writer operations
pub type IoResult<T> = Result<T, IoError>;

/// Parser for the plain-text graph description
#[derive(Debug, Default, Clone, Copy)]
pub struct GraphReader;

impl GraphReader {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse a graph description file
    pub fn read(&self, input: &Path) -> IoResult<GraphModel> {
        let text = fs::read_to_string(input)?;
        Ok(self.parse(&text)?)
    }

    /// Parse a graph description.
    ///
    /// Leading blank lines and trailing blank lines are ignored; anything else
    /// must match the declared counts exactly.
    pub fn parse(&self, text: &str) -> Result<GraphModel, GraphFormatError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .skip_while(|(_, line)| line.is_empty());

        let (header_line, header) = lines.next().unwrap_or((1, ""));
        let (node_count, edge_count) = parse_header(header_line, header)?;

        let mut nodes = Vec::with_capacity(node_count);
        for found in 0..node_count {
            let (line_no, line) = lines.next().ok_or(GraphFormatError::MissingLines {
                what: "node",
                expected: node_count,
                found,
            })?;
            if line.is_empty() {
                return Err(GraphFormatError::EmptyNodeId { line: line_no });
            }
            nodes.push(line.to_string());
        }

        let mut edges = Vec::with_capacity(edge_count);
        for found in 0..edge_count {
            let (line_no, line) = lines.next().ok_or(GraphFormatError::MissingLines {
                what: "edge",
                expected: edge_count,
                found,
            })?;
            let mut ids = line.split_whitespace();
            match (ids.next(), ids.next(), ids.next()) {
                (Some(a), Some(b), None) => edges.push((a, b)),
                _ => {
                    return Err(GraphFormatError::MalformedEdge {
                        line: line_no,
                        found: line.to_string(),
                    });
                }
            }
        }

        if let Some((line_no, _)) = lines.find(|(_, line)| !line.is_empty()) {
            return Err(GraphFormatError::TrailingContent {
                line: line_no,
                nodes: node_count,
                edges: edge_count,
            });
        }

        GraphModel::new(nodes, edges)
    }
}

fn parse_header(line: usize, header: &str) -> Result<(usize, usize), GraphFormatError> {
    let mut fields = header.split_whitespace();
    let (Some(n), Some(m), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(GraphFormatError::BadHeader {
            line,
            found: header.to_string(),
        });
    };

    let count = |what: &'static str, value: &str| {
        value.parse::<usize>().map_err(|_| GraphFormatError::BadCount {
            line,
            what,
            value: value.to_string(),
        })
    };

    Ok((count("node", n)?, count("edge", m)?))
}

/// A writer renders a layout frame to a specific output format
pub trait LayoutWriter {
    /// Render the frame to the format's textual representation
    fn render(&self, frame: &Frame<'_>) -> IoResult<String>;

    /// Identifier for this output format (e.g., "svg", "json")
    fn format_id(&self) -> &str;

    /// File extensions this writer produces
    fn extensions(&self) -> &[&str];

    /// Render and write to `output`, creating parent directories as needed
    fn write(&self, frame: &Frame<'_>, output: &Path) -> IoResult<()> {
        let rendered = self.render(frame)?;
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(output, rendered)?;
        Ok(())
    }

    /// Check if this writer handles the given file extension
    fn supports_extension(&self, ext: &str) -> bool {
        self.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Registry of available layout writers
pub struct FormatRegistry {
    writers: Vec<Box<dyn LayoutWriter + Send + Sync>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            writers: Vec::new(),
        }
    }

    /// Create a registry with `SvgWriter` (svg) and `JsonWriter` (json)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_writer(Box::new(SvgWriter::new()));
        registry.register_writer(Box::new(JsonWriter::new()));
        registry
    }

    /// Register a writer
    pub fn register_writer(&mut self, writer: Box<dyn LayoutWriter + Send + Sync>) {
        self.writers.push(writer);
    }

    /// Find a writer by format ID
    pub fn writer_for_format(&self, format_id: &str) -> Option<&(dyn LayoutWriter + Send + Sync)> {
        self.writers
            .iter()
            .find(|w| w.format_id().eq_ignore_ascii_case(format_id))
            .map(|w| w.as_ref())
    }

    /// Get file extension from a path
    pub fn extension_from_path(path: &Path) -> Option<&str> {
        path.extension().and_then(|e| e.to_str())
    }

    /// Find a writer for the given output path based on its extension
    pub fn writer_for_path(&self, path: &Path) -> IoResult<&(dyn LayoutWriter + Send + Sync)> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.writers
            .iter()
            .find(|w| w.supports_extension(ext))
            .map(|w| w.as_ref())
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    /// Resolve an explicit format, falling back to the output extension
    pub fn resolve(
        &self,
        format: Option<&str>,
        output: &Path,
    ) -> IoResult<&(dyn LayoutWriter + Send + Sync)> {
        match format {
            Some(id) => self
                .writer_for_format(id)
                .ok_or_else(|| IoError::UnsupportedFormat(id.to_string())),
            None => self.writer_for_path(output),
        }
    }
}
