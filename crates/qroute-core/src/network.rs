//! This module defines the [`CapacityGraph`], a directed network whose edges generate entangled
//! pairs at a finite rate. The capacity of an edge doubles as its weight for path searches.

pub(crate) mod search;
pub mod types;

use itertools::Itertools;
use petgraph::{dot::Dot, graph::DiGraph};
use rand::prelude::*;

use crate::error::ConfigError;

use self::types::{Channel, VertexId, WeightVector, WeightedEdge};

/// A quantum network characterized by edge capacities only.
///
/// Edges are directional and, in principle, the capacity can be different for the two
/// directions. Capacities only ever decrease, as demands are admitted; an edge whose residual
/// capacity reaches zero is removed from the graph.
#[derive(Debug, Clone)]
pub struct CapacityGraph {
    // Outgoing channels, indexed by source vertex
    adjacency: Vec<Vec<Channel>>,
    measurement_probability: f64,
}

impl CapacityGraph {
    /// Creates a network from explicit `(src, dst, capacity)` triples. The default measurement
    /// probability is 1.
    ///
    /// Correctness properties:
    ///
    /// - Every capacity must be finite and non-negative.
    ///
    /// The vertex set is `0..=max_id`, where `max_id` is the largest ID named by any edge. Parallel
    /// edges are merged into one edge carrying the sum of their capacities.
    pub fn new(weights: &[WeightedEdge]) -> Result<Self, TopologyError> {
        let nr_vertices = weights
            .iter()
            .map(|e| e.src.inner().max(e.dst.inner()) + 1)
            .max()
            .unwrap_or(0);
        let mut graph = Self {
            adjacency: vec![Vec::new(); nr_vertices],
            measurement_probability: 1.0,
        };
        for &WeightedEdge { src, dst, capacity } in weights {
            // CORRECTNESS: Every capacity must be finite and non-negative.
            if !(capacity.is_finite() && capacity >= 0.0) {
                return Err(TopologyError::InvalidCapacity { src, dst, capacity });
            }
            graph.add_capacity(src, dst, capacity);
        }
        Ok(graph)
    }

    /// Creates a network with the given `(src, dst)` pairs and draws each capacity from `dist`.
    /// If `bidirectional` is true, every pair `(a, b)` yields both `a -> b` and `b -> a`, with
    /// the same capacity.
    pub fn new_random<R, D>(
        edges: &[(VertexId, VertexId)],
        rng: &mut R,
        dist: D,
        bidirectional: bool,
    ) -> Result<Self, TopologyError>
    where
        R: Rng + ?Sized,
        D: Distribution<f64>,
    {
        let mut weights = Vec::with_capacity(edges.len() * 2);
        for &(src, dst) in edges {
            let capacity = dist.sample(rng);
            weights.push(WeightedEdge::new(src, dst, capacity));
            if bidirectional {
                weights.push(WeightedEdge::new(dst, src, capacity));
            }
        }
        Self::new(&weights)
    }

    /// Returns the measurement probability.
    pub fn measurement_probability(&self) -> f64 {
        self.measurement_probability
    }

    /// Sets the measurement probability. Values outside of `[0, 1]` are rejected and the previous
    /// value is kept.
    pub fn set_measurement_probability(&mut self, probability: f64) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(ConfigError::InvalidProbability(probability));
        }
        self.measurement_probability = probability;
        Ok(())
    }

    /// Returns the number of vertices.
    pub fn nr_vertices(&self) -> usize {
        self.adjacency.len()
    }

    /// Returns the number of edges.
    pub fn nr_edges(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Returns `true` if `vertex` belongs to the graph.
    pub fn contains(&self, vertex: VertexId) -> bool {
        vertex.inner() < self.nr_vertices()
    }

    /// Returns the min-max in-degree of the graph.
    pub fn in_degree(&self) -> (usize, usize) {
        let mut degrees = vec![0; self.nr_vertices()];
        for chan in self.adjacency.iter().flatten() {
            degrees[chan.dst.inner()] += 1;
        }
        min_max(degrees)
    }

    /// Returns the min-max out-degree of the graph.
    pub fn out_degree(&self) -> (usize, usize) {
        min_max(self.adjacency.iter().map(Vec::len))
    }

    /// Returns the total capacity across all edges.
    pub fn total_capacity(&self) -> f64 {
        self.adjacency
            .iter()
            .flatten()
            .map(|chan| chan.capacity)
            .sum()
    }

    /// Returns a snapshot of the current weights, sorted by `(src, dst)`.
    pub fn weights(&self) -> WeightVector {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(src, chans)| {
                chans
                    .iter()
                    .map(move |chan| WeightedEdge::new(VertexId::new(src), chan.dst, chan.capacity))
            })
            .sorted_by_key(|e| (e.src, e.dst))
            .collect()
    }

    /// Renders the graph in Graphviz DOT format, labelling edges with their residual capacity.
    pub fn to_dot(&self) -> String {
        let mut g = DiGraph::<VertexId, f64>::new();
        let indices = (0..self.nr_vertices())
            .map(|i| g.add_node(VertexId::new(i)))
            .collect::<Vec<_>>();
        for WeightedEdge { src, dst, capacity } in self.weights() {
            g.add_edge(indices[src.inner()], indices[dst.inner()], capacity);
        }
        format!("{}", Dot::new(&g))
    }

    pub(crate) fn channels(&self, vertex: VertexId) -> &[Channel] {
        self.adjacency
            .get(vertex.inner())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn channel(&self, src: VertexId, dst: VertexId) -> Option<&Channel> {
        self.channels(src).iter().find(|chan| chan.dst == dst)
    }

    /// Returns the residual capacity of the edge `src -> dst`, if it exists.
    pub(crate) fn capacity(&self, src: VertexId, dst: VertexId) -> Option<f64> {
        self.channel(src, dst).map(|chan| chan.capacity)
    }

    /// Returns the smallest residual capacity along the path starting at `src` and visiting
    /// `hops`, or `None` if some edge on the path does not exist.
    pub(crate) fn bottleneck(&self, src: VertexId, hops: &[VertexId]) -> Option<f64> {
        let mut min = f64::INFINITY;
        for (a, b) in path_edges(src, hops) {
            min = min.min(self.capacity(a, b)?);
        }
        Some(min)
    }

    /// Returns `true` if every edge along the path can carry `amount`. An edge whose residual
    /// falls short of `amount` by no more than its slack still counts.
    pub(crate) fn has_capacity(&self, src: VertexId, hops: &[VertexId], amount: f64) -> bool {
        path_edges(src, hops).all(|(a, b)| {
            self.channel(a, b)
                .map_or(false, |chan| chan.capacity + chan.slack() >= amount)
        })
    }

    /// Removes `amount` from every edge along the path. Edges left with no more than their slack
    /// are removed. If some edge cannot carry `amount`, nothing is changed and `false` is
    /// returned.
    #[must_use]
    pub(crate) fn remove_capacity(&mut self, src: VertexId, hops: &[VertexId], amount: f64) -> bool {
        if !self.has_capacity(src, hops, amount) {
            return false;
        }
        for (a, b) in path_edges(src, hops) {
            let chans = &mut self.adjacency[a.inner()];
            if let Some(pos) = chans.iter().position(|chan| chan.dst == b) {
                chans[pos].capacity -= amount;
                if chans[pos].capacity <= chans[pos].slack() {
                    chans.remove(pos);
                }
            }
        }
        true
    }

    /// Removes the edge with the smallest residual capacity along the path.
    pub(crate) fn remove_smallest_capacity_edge(&mut self, src: VertexId, hops: &[VertexId]) {
        let smallest = path_edges(src, hops)
            .filter_map(|(a, b)| self.capacity(a, b).map(|c| (c, a, b)))
            .min_by(|x, y| x.0.total_cmp(&y.0));
        if let Some((_, a, b)) = smallest {
            self.adjacency[a.inner()].retain(|chan| chan.dst != b);
        }
    }

    fn add_capacity(&mut self, src: VertexId, dst: VertexId, capacity: f64) {
        let chans = &mut self.adjacency[src.inner()];
        match chans.iter_mut().find(|chan| chan.dst == dst) {
            Some(chan) => {
                chan.capacity += capacity;
                chan.initial += capacity;
            }
            None => chans.push(Channel {
                dst,
                capacity,
                initial: capacity,
            }),
        }
    }
}

/// The edges of the path starting at `src` and visiting `hops`.
pub(crate) fn path_edges(
    src: VertexId,
    hops: &[VertexId],
) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
    std::iter::once(src)
        .chain(hops.iter().copied())
        .tuple_windows()
}

fn min_max(degrees: impl IntoIterator<Item = usize>) -> (usize, usize) {
    degrees.into_iter().minmax().into_option().unwrap_or((0, 0))
}

/// Errors building a [`CapacityGraph`].
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("edge {src} -> {dst} has an invalid capacity ({capacity})")]
    InvalidCapacity {
        src: VertexId,
        dst: VertexId,
        capacity: f64,
    },
}
