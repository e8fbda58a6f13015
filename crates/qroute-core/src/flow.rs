//! This module defines fixed-rate point-to-point flows and the routine that admits them into a
//! [`CapacityGraph`].

use std::fmt;

use itertools::Itertools;

use crate::{
    error::RequestError,
    network::{types::VertexId, CapacityGraph},
    rate,
};

/// A flow requiring a constant end-to-end rate, e.g., for metrology, sensing or QKD.
#[derive(Debug, Clone, PartialEq, derive_new::new, serde::Serialize, serde::Deserialize)]
pub struct FlowDescriptor {
    src: VertexId,
    dst: VertexId,
    /// In EPR/s.
    net_rate: f64,

    // Set by the router
    #[new(default)]
    #[serde(default)]
    path: Vec<VertexId>,
    #[new(default)]
    #[serde(default)]
    gross_rate: f64,
    #[new(default)]
    #[serde(default)]
    searches: usize,
}

impl FlowDescriptor {
    /// The source vertex.
    pub fn src(&self) -> VertexId {
        self.src
    }

    /// The destination vertex.
    pub fn dst(&self) -> VertexId {
        self.dst
    }

    /// The requested net rate, in EPR/s.
    pub fn net_rate(&self) -> f64 {
        self.net_rate
    }

    /// The hops of the assigned path, not including the source. Empty if the flow is not routed.
    pub fn path(&self) -> &[VertexId] {
        &self.path
    }

    /// The gross rate consumed along the path, in EPR/s. Zero if the flow is not routed.
    pub fn gross_rate(&self) -> f64 {
        self.gross_rate
    }

    /// The number of shortest-path searches performed for this flow.
    pub fn searches(&self) -> usize {
        self.searches
    }

    /// Returns `true` if the flow was admitted.
    pub fn is_routed(&self) -> bool {
        !self.path.is_empty()
    }

    /// Moves the routing outcome of `other` into `self`, leaving `other` unrouted.
    pub fn take_route_from(&mut self, other: &mut FlowDescriptor) {
        self.path = std::mem::take(&mut other.path);
        self.gross_rate = std::mem::take(&mut other.gross_rate);
        self.searches = std::mem::take(&mut other.searches);
    }

    fn clear_route(&mut self) {
        self.path.clear();
        self.gross_rate = 0.0;
        self.searches = 0;
    }
}

impl fmt::Display for FlowDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}, net rate {}, gross rate {}, path [{}], searches {}",
            self.src,
            self.dst,
            self.net_rate,
            self.gross_rate,
            self.path.iter().join(","),
            self.searches
        )
    }
}

impl CapacityGraph {
    /// Routes `flows` with no feasibility check. See [`CapacityGraph::route_checked`].
    pub fn route(&mut self, flows: &mut [FlowDescriptor]) -> Result<(), RequestError> {
        self.route_checked(flows, |_| true)
    }

    /// Routes `flows` one by one, in the order in which they are given, starting with the current
    /// capacities. Whenever a flow is admitted its descriptor is updated with the path and gross
    /// rate, and the capacities along the path are decreased. A flow that cannot be admitted is
    /// left with an empty path and a zero gross rate.
    ///
    /// A flow is only admitted if `is_feasible` accepts it once its tentative path and gross rate
    /// are filled in.
    ///
    /// This function returns an error if some flow is ill-formed, in which case neither the
    /// graph nor any descriptor is changed.
    pub fn route_checked<F>(
        &mut self,
        flows: &mut [FlowDescriptor],
        is_feasible: F,
    ) -> Result<(), RequestError>
    where
        F: Fn(&FlowDescriptor) -> bool,
    {
        // CORRECTNESS: Every flow must be validated before the graph is changed.
        for (index, flow) in flows.iter().enumerate() {
            self.validate_flow(index, flow)?;
        }
        let mut nr_admitted = 0;
        for flow in flows.iter_mut() {
            flow.clear_route();
            if self.route_flow(flow, &is_feasible) {
                nr_admitted += 1;
            }
        }
        log::info!("admitted {nr_admitted} of {} flows", flows.len());
        Ok(())
    }

    fn validate_flow(&self, index: usize, flow: &FlowDescriptor) -> Result<(), RequestError> {
        for vertex in [flow.src, flow.dst] {
            if !self.contains(vertex) {
                return Err(RequestError::UnknownVertex { index, vertex });
            }
        }
        if flow.src == flow.dst {
            return Err(RequestError::SameEndpoints {
                index,
                vertex: flow.src,
            });
        }
        if !(flow.net_rate.is_finite() && flow.net_rate >= 0.0) {
            return Err(RequestError::InvalidRate {
                index,
                rate: flow.net_rate,
            });
        }
        Ok(())
    }

    // Searches on a scratch copy of the graph. Whenever the shortest path cannot carry the
    // required gross rate, its smallest edge is dropped from the copy and the search is repeated.
    fn route_flow<F>(&mut self, flow: &mut FlowDescriptor, is_feasible: &F) -> bool
    where
        F: Fn(&FlowDescriptor) -> bool,
    {
        let mut scratch = self.clone();
        loop {
            flow.searches += 1;
            let Some(route) = scratch.shortest_path(flow.src, flow.dst) else {
                log::debug!("unroutable flow: {flow}");
                return false;
            };
            let hops = route.hops();
            let gross_rate =
                rate::gross_rate(flow.net_rate, self.measurement_probability(), hops.len());
            if !self.has_capacity(flow.src, hops, gross_rate) {
                scratch.remove_smallest_capacity_edge(flow.src, hops);
                continue;
            }
            flow.path = hops.to_vec();
            flow.gross_rate = gross_rate;
            if !is_feasible(&*flow) {
                log::debug!("infeasible flow: {flow}");
                flow.path.clear();
                flow.gross_rate = 0.0;
                return false;
            }
            let committed = self.remove_capacity(flow.src, hops, gross_rate);
            debug_assert!(committed, "capacity checked before commit");
            log::debug!("admitted flow: {flow}");
            return true;
        }
    }
}
