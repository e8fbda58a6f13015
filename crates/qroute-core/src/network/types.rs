/// A vertex of the capacity graph.
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    PartialEq,
    Eq,
    Hash,
    derive_more::Display,
    derive_more::FromStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct VertexId(usize);

impl VertexId {
    /// ID 0.
    pub const ZERO: VertexId = Self::new(0);

    /// Creates a new ID.
    pub const fn new(val: usize) -> Self {
        Self(val)
    }

    /// Returns the inner representation of the ID.
    pub const fn inner(self) -> usize {
        self.0
    }
}

impl From<usize> for VertexId {
    fn from(val: usize) -> Self {
        Self::new(val)
    }
}

/// A directed edge with its capacity, in EPR pairs per second.
#[derive(Debug, Clone, Copy, PartialEq, derive_new::new, serde::Serialize, serde::Deserialize)]
pub struct WeightedEdge {
    pub src: VertexId,
    pub dst: VertexId,
    pub capacity: f64,
}

impl From<(usize, usize, f64)> for WeightedEdge {
    fn from((src, dst, capacity): (usize, usize, f64)) -> Self {
        Self::new(VertexId::new(src), VertexId::new(dst), capacity)
    }
}

/// Unweighted (src, dst) pairs.
pub type EdgeVector = Vec<(VertexId, VertexId)>;

/// Weighted edges, as produced by [`CapacityGraph::weights`](super::CapacityGraph::weights).
pub type WeightVector = Vec<WeightedEdge>;

/// An outgoing edge as stored in the adjacency lists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Channel {
    pub(crate) dst: VertexId,
    pub(crate) capacity: f64,
    /// The capacity the edge was built with.
    pub(crate) initial: f64,
}

impl Channel {
    /// Residuals at or below this amount count as used up.
    pub(crate) fn slack(&self) -> f64 {
        self.initial * RESIDUAL_EPSILON
    }
}

/// Relative to an edge's initial capacity.
pub(crate) const RESIDUAL_EPSILON: f64 = 1e-9;

/// A loopless path found by a search, including both endpoints.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Route {
    pub(crate) cost: f64,
    pub(crate) vertices: Vec<VertexId>,
}

impl Route {
    /// The hops of the route, i.e., every vertex but the source.
    pub(crate) fn hops(&self) -> &[VertexId] {
        &self.vertices[1..]
    }
}
