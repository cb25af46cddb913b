//! Fruchterman-Reingold force accumulation
//!
//! Each call recomputes net displacements from current positions only; there
//! is no velocity or momentum carried between steps.

use crate::graph::GraphModel;
use crate::layout::LayoutState;
use crate::vector::Vector2;

/// Net displacement per node, in graph order
pub type Displacements = Vec<Vector2>;

/// Repulsion/attraction model parameterized by the two coefficients and the
/// ideal edge length `k`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceAccumulator {
    repulsion: f64,
    attraction: f64,
    k: f64,
}

impl ForceAccumulator {
    pub fn new(repulsion: f64, attraction: f64, k: f64) -> Self {
        Self {
            repulsion,
            attraction,
            k,
        }
    }

    /// Ideal edge length for `node_count` nodes on a canvas of `area`
    pub fn ideal_edge_length(area: f64, node_count: usize) -> f64 {
        (area / node_count as f64).sqrt()
    }

    pub fn k(&self) -> f64 {
        self.k
    }

    /// Repulsive force magnitude at distance `dist`: `c1 * k² / dist`
    pub fn repulsion(&self, dist: f64) -> f64 {
        self.repulsion * self.k * self.k / dist
    }

    /// Attractive force magnitude at distance `dist`: `c2 * dist² / k`
    pub fn attraction(&self, dist: f64) -> f64 {
        self.attraction * dist * dist / self.k
    }

    /// Net displacement of every node for one step.
    ///
    /// Coincident pairs (distance exactly zero) contribute nothing.
    pub fn compute(&self, graph: &GraphModel, state: &LayoutState) -> Displacements {
        let positions = state.positions();
        let mut disp = vec![Vector2::ZERO; positions.len()];

        for (u, &pu) in positions.iter().enumerate() {
            for (v, &pv) in positions.iter().enumerate() {
                if u == v {
                    continue;
                }
                let delta = pu.subtract(pv);
                let dist = delta.magnitude();
                if dist == 0.0 {
                    continue;
                }
                disp[u] = disp[u].add(delta.scale(self.repulsion(dist) / dist));
            }
        }

        for edge in graph.edges() {
            let delta = positions[edge.source].subtract(positions[edge.target]);
            let dist = delta.magnitude();
            if dist == 0.0 {
                continue;
            }
            let pull = delta.scale(self.attraction(dist) / dist);
            disp[edge.source] = disp[edge.source].subtract(pull);
            disp[edge.target] = disp[edge.target].add(pull);
        }

        disp
    }
}
