//! Utilities for reading networks and demands from files and writing graphs.

pub use qroute_utils::*;
