//! `qroute` routes demands over a quantum network whose links generate entangled pairs at a
//! finite rate. Fixed-rate flows are admitted along a single path each; elastic apps are
//! allocated capacity along several paths towards their peers, in proportion to their priority.
//! Routing is online: demands are served one at a time, in the order given, and every admission
//! permanently consumes capacity.

#![warn(unreachable_pub, missing_docs)]

pub mod core;
pub mod utils;
