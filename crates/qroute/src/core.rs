//! Core data structures and routines. The most common entry points are
//! [`CapacityGraph::route`](network::CapacityGraph::route) for fixed-rate flows and
//! [`CapacityGraph::route_apps`](network::CapacityGraph::route_apps) for elastic apps.

pub use qroute_core::*;
