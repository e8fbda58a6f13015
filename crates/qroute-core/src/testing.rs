use crate::network::types::{VertexId, WeightVector, WeightedEdge};

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub(crate) fn weights(triples: &[(usize, usize, f64)]) -> WeightVector {
    triples.iter().map(|&t| WeightedEdge::from(t)).collect()
}

pub(crate) fn path(ids: &[usize]) -> Vec<VertexId> {
    ids.iter().copied().map(VertexId::new).collect()
}

pub(crate) fn single_edge(capacity: f64) -> WeightVector {
    weights(&[(0, 1, capacity)])
}

// 0 -> 1 -> 2 -> 3, with the bottleneck in the middle
pub(crate) fn line() -> WeightVector {
    weights(&[(0, 1, 5.0), (1, 2, 2.0), (2, 3, 3.0)])
}

// Two disjoint routes from 0 to 3: a cheap one through 1 and an expensive one through 2
pub(crate) fn diamond() -> WeightVector {
    weights(&[(0, 1, 1.0), (1, 3, 1.0), (0, 2, 2.0), (2, 3, 2.0)])
}

// The directed graph used to illustrate Yen's algorithm, with vertices C..H mapped to 0..5
pub(crate) fn yen() -> WeightVector {
    weights(&[
        (0, 1, 3.0), // C -> D
        (0, 2, 2.0), // C -> E
        (1, 3, 4.0), // D -> F
        (2, 1, 1.0), // E -> D
        (2, 3, 2.0), // E -> F
        (2, 4, 3.0), // E -> G
        (3, 4, 2.0), // F -> G
        (3, 5, 1.0), // F -> H
        (4, 5, 2.0), // G -> H
    ])
}

// A host (0) with two peers (3 and 4) reachable through a shared first hop
pub(crate) fn star() -> WeightVector {
    weights(&[(0, 1, 10.0), (1, 3, 4.0), (1, 2, 8.0), (2, 4, 8.0), (0, 4, 2.0)])
}
