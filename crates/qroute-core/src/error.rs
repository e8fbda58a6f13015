//! Error kinds shared by the routers.

use crate::network::types::VertexId;

/// Invalid configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The measurement probability is not in `[0, 1]`.
    #[error("invalid measurement probability ({0}), must be in [0, 1]")]
    InvalidProbability(f64),

    /// The routing policy name is not known.
    #[error("invalid routing algorithm: {name} (valid options are: {valid})")]
    UnknownAlgo {
        /// The name that was given.
        name: String,
        /// The valid names, comma-separated.
        valid: String,
    },

    /// The app allocation quantum is not positive.
    #[error("invalid allocation quantum ({0}), must be positive")]
    InvalidQuantum(f64),

    /// The k-shortest-paths search was asked for no paths.
    #[error("the number of paths per search must be positive")]
    ZeroPaths,
}

/// An ill-formed demand. The index is the position of the descriptor in the batch.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// A flow has the same source and destination.
    #[error("request {index} has the same source and destination ({vertex})")]
    SameEndpoints {
        /// The descriptor index.
        index: usize,
        /// The repeated vertex.
        vertex: VertexId,
    },

    /// A demand names a vertex that is not in the graph.
    #[error("request {index} refers to an unknown vertex ({vertex})")]
    UnknownVertex {
        /// The descriptor index.
        index: usize,
        /// The unknown vertex.
        vertex: VertexId,
    },

    /// A flow asks for a negative or non-finite rate.
    #[error("request {index} has an invalid net rate ({rate})")]
    InvalidRate {
        /// The descriptor index.
        index: usize,
        /// The invalid rate.
        rate: f64,
    },

    /// An app lists its own host as a peer.
    #[error("request {index} lists its host ({host}) as a peer")]
    HostIsPeer {
        /// The descriptor index.
        index: usize,
        /// The host vertex.
        host: VertexId,
    },

    /// An app has a non-positive or non-finite priority.
    #[error("request {index} has an invalid priority ({priority})")]
    InvalidPriority {
        /// The descriptor index.
        index: usize,
        /// The invalid priority.
        priority: f64,
    },
}

/// Any routing error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration.
    #[error("invalid configuration")]
    Config(#[from] ConfigError),

    /// Ill-formed request.
    #[error("malformed request")]
    Request(#[from] RequestError),
}
