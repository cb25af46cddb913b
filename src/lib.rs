//! frlayout - Fruchterman-Reingold force-directed layout for undirected graphs.
//!
//! Nodes repel each other, edges pull their endpoints together, and a cooling
//! temperature caps how far a node may move per step. Positions stay inside a
//! rectangular or elliptical boundary. Observers see the layout between steps
//! and writers turn the final layout into SVG or JSON.

pub mod boundary;
pub mod config;
pub mod forces;
pub mod graph;
pub mod io;
pub mod json_writer;
pub mod layout;
pub mod observer;
pub mod simulator;
pub mod svg_writer;
pub mod vector;
