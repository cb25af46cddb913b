//! Evolving layout state: one position per node plus the temperature

use rand::Rng;

use crate::config::ConfigError;
use crate::graph::GraphModel;
use crate::vector::Vector2;

/// Positions of every node (in graph order) and the current temperature
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutState {
    positions: Vec<Vector2>,
    temperature: f64,
}

impl LayoutState {
    /// Build a state from explicit positions, one per node in graph order
    pub fn from_positions(
        graph: &GraphModel,
        positions: Vec<Vector2>,
    ) -> Result<Self, ConfigError> {
        if positions.len() != graph.node_count() {
            return Err(ConfigError::PositionCountMismatch {
                expected: graph.node_count(),
                found: positions.len(),
            });
        }
        Ok(Self {
            positions,
            temperature: 0.0,
        })
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub(crate) fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    /// Position of the node at `index`, `None` past the last node
    pub fn position(&self, index: usize) -> Option<Vector2> {
        self.positions.get(index).copied()
    }

    pub(crate) fn set_position(&mut self, index: usize, position: Vector2) {
        self.positions[index] = position;
    }

    pub fn positions(&self) -> &[Vector2] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of the node named `id`
    pub fn get(&self, graph: &GraphModel, id: &str) -> Option<Vector2> {
        graph.index_of(id).and_then(|i| self.position(i))
    }

    /// `(id, position)` pairs in graph order
    pub fn iter<'a>(
        &'a self,
        graph: &'a GraphModel,
    ) -> impl Iterator<Item = (&'a str, Vector2)> + 'a {
        graph
            .nodes()
            .iter()
            .map(String::as_str)
            .zip(self.positions.iter().copied())
    }

    /// Smallest axis-aligned box holding every node, as `(min, max)`
    pub fn bounding_box(&self) -> Option<(Vector2, Vector2)> {
        let first = *self.positions.first()?;
        Some(self.positions.iter().fold((first, first), |(lo, hi), p| {
            (
                Vector2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Vector2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }
}

/// Place every node uniformly at random over `[0, width) x [0, height)`.
///
/// Two draws per node in graph order, x first, so a seeded generator always
/// yields the same layout for the same graph.
pub fn randomize_positions<R: Rng + ?Sized>(
    graph: &GraphModel,
    width: f64,
    height: f64,
    rng: &mut R,
) -> LayoutState {
    let positions = graph
        .nodes()
        .iter()
        .map(|_| {
            let x = rng.r#gen::<f64>() * width;
            let y = rng.r#gen::<f64>() * height;
            Vector2::new(x, y)
        })
        .collect();

    LayoutState {
        positions,
        temperature: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn path_graph(n: usize) -> GraphModel {
        let ids: Vec<String> = (1..=n).map(|i| i.to_string()).collect();
        let edges: Vec<(String, String)> = ids
            .windows(2)
            .map(|w| (w[0].clone(), w[1].clone()))
            .collect();
        GraphModel::new(ids, edges).unwrap()
    }

    #[test]
    fn random_positions_cover_every_node_within_canvas() {
        let graph = path_graph(50);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let state = randomize_positions(&graph, 4.0, 2.0, &mut rng);

        assert_eq!(state.len(), 50);
        for p in state.positions() {
            assert!((0.0..4.0).contains(&p.x), "x out of range: {p}");
            assert!((0.0..2.0).contains(&p.y), "y out of range: {p}");
        }
    }

    #[test]
    fn same_seed_same_layout() {
        let graph = path_graph(10);

        let a = randomize_positions(&graph, 1.0, 1.0, &mut ChaCha8Rng::seed_from_u64(3));
        let b = randomize_positions(&graph, 1.0, 1.0, &mut ChaCha8Rng::seed_from_u64(3));
        let c = randomize_positions(&graph, 1.0, 1.0, &mut ChaCha8Rng::seed_from_u64(4));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn lookup_by_node_id() {
        let graph = path_graph(3);
        let state = LayoutState::from_positions(
            &graph,
            vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.5),
                Vector2::new(0.25, 1.0),
            ],
        )
        .unwrap();

        assert_eq!(state.get(&graph, "2"), Some(Vector2::new(1.0, 0.5)));
        assert_eq!(state.get(&graph, "9"), None);
        assert_eq!(state.position(1), Some(Vector2::new(1.0, 0.5)));
        assert_eq!(state.position(3), None);

        let ids: Vec<&str> = state.iter(&graph).map(|(id, _)| id).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn empty_state_lookups_return_none() {
        let graph = path_graph(2);
        let state = LayoutState::default();

        assert_eq!(state.get(&graph, "1"), None);
        assert_eq!(state.position(0), None);
        assert_eq!(state.iter(&graph).count(), 0);
    }

    #[test]
    fn from_positions_checks_count() {
        let graph = path_graph(3);
        let err = LayoutState::from_positions(&graph, vec![Vector2::ZERO]).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::PositionCountMismatch {
                expected: 3,
                found: 1
            }
        ));
    }

    #[test]
    fn bounding_box_spans_all_nodes() {
        let graph = path_graph(3);
        let state = LayoutState::from_positions(
            &graph,
            vec![
                Vector2::new(0.5, 0.1),
                Vector2::new(0.2, 0.9),
                Vector2::new(0.7, 0.4),
            ],
        )
        .unwrap();

        assert_eq!(
            state.bounding_box(),
            Some((Vector2::new(0.2, 0.1), Vector2::new(0.7, 0.9)))
        );
    }
}
