#![warn(unreachable_pub, missing_debug_implementations)]

//! The core routing library. A [`CapacityGraph`] models a quantum network whose links generate
//! entangled pairs at a finite rate. Fixed-rate [flows](FlowDescriptor) are admitted with
//! [`CapacityGraph::route`], elastic multi-peer [apps](AppDescriptor) with
//! [`CapacityGraph::route_apps`]. Every admission permanently consumes capacity, so demands are
//! served strictly in the order they are given.

pub mod algo;
pub mod app;
pub mod error;
pub mod flow;
pub mod network;
pub mod rate;

#[cfg(test)]
pub(crate) mod testing;

pub use algo::SelectionAlgo;
pub use app::{Allocation, AppDescriptor, AppOpts};
pub use error::{ConfigError, Error, RequestError};
pub use flow::FlowDescriptor;
pub use network::{
    types::{EdgeVector, VertexId, WeightVector, WeightedEdge},
    CapacityGraph, TopologyError,
};
