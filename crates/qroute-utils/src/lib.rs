//! Utilities for interfacing with the routers through files.

#![warn(unreachable_pub, missing_debug_implementations, missing_docs)]

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use qroute_core::{AppDescriptor, CapacityGraph, FlowDescriptor, WeightedEdge};
use serde::de::DeserializeOwned;

/// Reads a [`CapacityGraph`] from a file containing a [`NetworkSpec`] in JSON or Dhall format.
pub fn read_network(network_spec: impl AsRef<Path>) -> Result<CapacityGraph, Error> {
    let spec = read_network_spec(network_spec)?;
    let mut graph = CapacityGraph::new(&spec.edges)?;
    if let Some(probability) = spec.measurement_probability {
        graph.set_measurement_probability(probability)?;
    }
    log::info!(
        "read network with {} vertices and {} edges",
        graph.nr_vertices(),
        graph.nr_edges()
    );
    Ok(graph)
}

/// Reads a [`NetworkSpec`] from a file in JSON or Dhall format.
pub fn read_network_spec(path: impl AsRef<Path>) -> Result<NetworkSpec, Error> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let spec: NetworkSpec = match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents)?,
        Some("dhall") => serde_dhall::from_str(&contents).parse().map_err(Box::new)?,
        _ => return Err(Error::UnknownFileType(path.as_ref().into())),
    };
    Ok(spec)
}

/// Reads [`FlowDescriptor`]s from a file in JSON or MsgPack format.
pub fn read_flows(path: impl AsRef<Path>) -> Result<Vec<FlowDescriptor>, Error> {
    read_demands(path)
}

/// Reads [`AppDescriptor`]s from a file in JSON or MsgPack format.
pub fn read_apps(path: impl AsRef<Path>) -> Result<Vec<AppDescriptor>, Error> {
    read_demands(path)
}

fn read_demands<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<Vec<T>, Error> {
    let demands: Vec<T> = match path.as_ref().extension().and_then(|ext| ext.to_str()) {
        Some("json") => {
            let contents = std::fs::read_to_string(path.as_ref())?;
            serde_json::from_str(&contents)?
        }
        Some("msgpack") => {
            let f = File::open(path)?;
            let reader = BufReader::new(f);
            rmp_serde::decode::from_read(reader)?
        }
        _ => return Err(Error::UnknownFileType(path.as_ref().into())),
    };
    Ok(demands)
}

/// Writes the graph in Graphviz DOT format.
pub fn write_dot(graph: &CapacityGraph, path: impl AsRef<Path>) -> Result<(), Error> {
    std::fs::write(path, graph.to_dot())?;
    Ok(())
}

/// A network specification.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct NetworkSpec {
    /// Directed edges and their capacities.
    pub edges: Vec<WeightedEdge>,
    /// Measurement probability. Defaults to 1.
    #[serde(default)]
    pub measurement_probability: Option<f64>,
}

/// Error kinds for specifications and I/O.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unknown file type.
    #[error("unknown file type: {0}")]
    UnknownFileType(PathBuf),

    /// Error serializing/deserializing Dhall.
    #[error("Dhall error")]
    Dhall(#[from] Box<serde_dhall::Error>),

    /// Error serializing/deserializing JSON.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Error serializing/deserializing MsgPack.
    #[error("MsgPack error")]
    MsgPack(#[from] rmp_serde::decode::Error),

    /// I/O error.
    #[error("IO error")]
    Io(#[from] std::io::Error),

    /// Error constructing a valid graph.
    #[error("invalid topology")]
    Topology(#[from] qroute_core::TopologyError),

    /// Invalid network configuration.
    #[error("invalid configuration")]
    Config(#[from] qroute_core::ConfigError),
}
