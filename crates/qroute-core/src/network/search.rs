//! Path searches over residual capacities: Dijkstra's algorithm and Yen's k-shortest paths on
//! top of it.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use rustc_hash::FxHashSet;

use super::{
    types::{Route, VertexId},
    CapacityGraph,
};

/// Edges and vertices a search must not use.
#[derive(Debug, Default)]
struct Exclusions {
    edges: FxHashSet<(VertexId, VertexId)>,
    vertices: FxHashSet<VertexId>,
}

impl CapacityGraph {
    /// Finds the path from `src` to `dst` with the smallest total capacity. Edges without
    /// residual capacity are never traversed.
    pub(crate) fn shortest_path(&self, src: VertexId, dst: VertexId) -> Option<Route> {
        self.dijkstra(src, dst, &Exclusions::default())
    }

    /// Finds up to `k` loopless paths from `src` to `dst`, in non-decreasing order of cost.
    pub(crate) fn k_shortest_paths(&self, src: VertexId, dst: VertexId, k: usize) -> Vec<Route> {
        let mut found = Vec::new();
        if k == 0 {
            return found;
        }
        let Some(first) = self.shortest_path(src, dst) else {
            return found;
        };
        found.push(first);
        let mut candidates: Vec<Route> = Vec::new();
        while found.len() < k {
            let last = found[found.len() - 1].vertices.clone();
            for i in 0..last.len() - 1 {
                let spur = last[i];
                let root = &last[..=i];
                let mut excluded = Exclusions::default();
                // Forbid the next edge of every known path sharing this root
                for route in &found {
                    if route.vertices.len() > i + 1 && route.vertices[..=i] == *root {
                        excluded.edges.insert((route.vertices[i], route.vertices[i + 1]));
                    }
                }
                // Keep the result loopless
                excluded.vertices.extend(root[..i].iter().copied());
                let Some(spur_route) = self.dijkstra(spur, dst, &excluded) else {
                    continue;
                };
                let mut vertices = root[..i].to_vec();
                vertices.extend(spur_route.vertices);
                let is_new = |r: &Route| r.vertices != vertices;
                if candidates.iter().all(is_new) && found.iter().all(is_new) {
                    let cost = self.path_cost(&vertices);
                    candidates.push(Route { cost, vertices });
                }
            }
            // Ties go to the earliest candidate
            let Some(best) = candidates
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| a.cost.total_cmp(&b.cost))
                .map(|(i, _)| i)
            else {
                break;
            };
            found.push(candidates.remove(best));
        }
        log::trace!("found {} paths from {src} to {dst} (k = {k})", found.len());
        found
    }

    fn dijkstra(&self, src: VertexId, dst: VertexId, excluded: &Exclusions) -> Option<Route> {
        if src == dst || !self.contains(src) || !self.contains(dst) {
            return None;
        }
        let nr_vertices = self.nr_vertices();
        let mut distances = vec![f64::INFINITY; nr_vertices];
        let mut predecessors: Vec<Option<VertexId>> = vec![None; nr_vertices];
        let mut heap = BinaryHeap::new();
        distances[src.inner()] = 0.0;
        heap.push(Reverse((OrderedFloat(0.0), src)));

        while let Some(Reverse((OrderedFloat(cost), vertex))) = heap.pop() {
            if vertex == dst {
                break;
            }
            if cost > distances[vertex.inner()] {
                continue;
            }
            for chan in self.channels(vertex) {
                if chan.capacity <= 0.0
                    || excluded.vertices.contains(&chan.dst)
                    || excluded.edges.contains(&(vertex, chan.dst))
                {
                    continue;
                }
                let next_cost = cost + chan.capacity;
                if next_cost < distances[chan.dst.inner()] {
                    distances[chan.dst.inner()] = next_cost;
                    predecessors[chan.dst.inner()] = Some(vertex);
                    heap.push(Reverse((OrderedFloat(next_cost), chan.dst)));
                }
            }
        }

        if distances[dst.inner()].is_infinite() {
            return None;
        }
        // Walk back from the destination
        let mut vertices = vec![dst];
        let mut cur = dst;
        while let Some(prev) = predecessors[cur.inner()] {
            vertices.push(prev);
            cur = prev;
        }
        vertices.reverse();
        Some(Route {
            cost: distances[dst.inner()],
            vertices,
        })
    }

    fn path_cost(&self, vertices: &[VertexId]) -> f64 {
        vertices
            .windows(2)
            .map(|w| self.capacity(w[0], w[1]).unwrap_or(f64::INFINITY))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn v(i: usize) -> VertexId {
        VertexId::new(i)
    }

    fn ids(route: &Route) -> Vec<usize> {
        route.vertices.iter().map(|v| v.inner()).collect()
    }

    #[test]
    fn shortest_path_prefers_smaller_total() -> anyhow::Result<()> {
        let graph = CapacityGraph::new(&testing::diamond())?;
        let route = graph.shortest_path(v(0), v(3)).unwrap();
        assert_eq!(ids(&route), vec![0, 1, 3]);
        assert_eq!(route.cost, 2.0);
        assert_eq!(route.hops(), testing::path(&[1, 3]).as_slice());
        Ok(())
    }

    #[test]
    fn shortest_path_on_yen_graph() -> anyhow::Result<()> {
        let graph = CapacityGraph::new(&testing::yen())?;
        let route = graph.shortest_path(v(0), v(5)).unwrap();
        assert_eq!(ids(&route), vec![0, 2, 3, 5]);
        assert_eq!(route.cost, 5.0);
        Ok(())
    }

    #[test]
    fn unreachable_destination_has_no_path() -> anyhow::Result<()> {
        let graph = CapacityGraph::new(&testing::line())?;
        assert!(graph.shortest_path(v(3), v(0)).is_none());
        assert!(graph.shortest_path(v(0), v(0)).is_none());
        assert!(graph.shortest_path(v(0), v(9)).is_none());
        Ok(())
    }

    #[test]
    fn pruned_edges_are_not_traversed() -> anyhow::Result<()> {
        let mut graph = CapacityGraph::new(&testing::diamond())?;
        assert!(graph.remove_capacity(v(0), &[v(1), v(3)], 1.0));
        let route = graph.shortest_path(v(0), v(3)).unwrap();
        assert_eq!(ids(&route), vec![0, 2, 3]);
        Ok(())
    }

    #[test]
    fn zero_capacity_edges_are_not_traversed() -> anyhow::Result<()> {
        let graph = CapacityGraph::new(&testing::weights(&[(0, 1, 0.0)]))?;
        assert!(graph.shortest_path(v(0), v(1)).is_none());
        Ok(())
    }

    #[test]
    fn k_shortest_paths_works() -> anyhow::Result<()> {
        let graph = CapacityGraph::new(&testing::yen())?;
        let routes = graph.k_shortest_paths(v(0), v(5), 4);
        let paths = routes.iter().map(ids).collect::<Vec<_>>();
        insta::assert_yaml_snapshot!(paths, @r###"
        - - 0
          - 2
          - 3
          - 5
        - - 0
          - 2
          - 4
          - 5
        - - 0
          - 1
          - 3
          - 5
        - - 0
          - 2
          - 3
          - 4
          - 5
        "###);
        let costs = routes.iter().map(|r| r.cost).collect::<Vec<_>>();
        assert_eq!(costs, vec![5.0, 7.0, 8.0, 8.0]);
        Ok(())
    }

    #[test]
    fn k_shortest_paths_stops_when_exhausted() -> anyhow::Result<()> {
        let graph = CapacityGraph::new(&testing::diamond())?;
        let routes = graph.k_shortest_paths(v(0), v(3), 10);
        let paths = routes.iter().map(ids).collect::<Vec<_>>();
        assert_eq!(paths, vec![vec![0, 1, 3], vec![0, 2, 3]]);
        assert!(graph.k_shortest_paths(v(0), v(3), 0).is_empty());
        assert!(graph.k_shortest_paths(v(3), v(0), 3).is_empty());
        Ok(())
    }
}
