//! This module defines elastic multi-peer apps and the routine that allocates capacity to them.
//!
//! Apps are served in rounds. In every round each app still in contention searches for the k
//! shortest paths towards its peers, earns `priority * quantum` of gross rate on its deficit
//! counter, then spends it greedily along those paths. An app leaves contention once none of its
//! peers can be reached. Unspent deficit is kept in the descriptor across calls.
//!
//! Runs of rounds in which every app spends its whole deficit on its cheapest path are collapsed
//! into one round that grants several quanta at once, so the number of rounds does not grow with
//! capacity.

use std::fmt;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::{
    error::{ConfigError, Error, RequestError},
    network::{
        path_edges,
        types::{Route, VertexId},
        CapacityGraph,
    },
    rate,
};

/// App routing options.
#[derive(Debug, Clone, typed_builder::TypedBuilder, serde::Serialize, serde::Deserialize)]
pub struct AppOpts {
    /// Paths requested from every k-shortest-paths search.
    #[builder(default = 3)]
    pub k: usize,
    /// Gross rate, in EPR/s, earned per unit of priority in every round.
    #[builder(default = 1.0)]
    pub quantum: f64,
}

impl AppOpts {
    /// Checks that the options can drive an allocation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.k == 0 {
            return Err(ConfigError::ZeroPaths);
        }
        if !(self.quantum.is_finite() && self.quantum > 0.0) {
            return Err(ConfigError::InvalidQuantum(self.quantum));
        }
        Ok(())
    }
}

impl Default for AppOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Capacity assigned to an app along one path.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Allocation {
    /// End-to-end rate, in EPR/s.
    pub net_rate: f64,
    /// Rate consumed from every edge of the path, in EPR/s.
    pub gross_rate: f64,
    /// Hops, not including the host.
    pub path: Vec<VertexId>,
}

/// An elastic app, e.g., a distributed quantum computation, that can use any amount of
/// entanglement between its host and any of its peers.
#[derive(Debug, Clone, PartialEq, derive_new::new, serde::Serialize, serde::Deserialize)]
pub struct AppDescriptor {
    host: VertexId,
    peers: Vec<VertexId>,
    priority: f64,

    // Set by the router
    #[new(default)]
    #[serde(default)]
    allocations: Vec<Allocation>,
    #[new(default)]
    #[serde(default)]
    searches: usize,

    // Gross rate owed to the app, carried across rounds and calls
    #[new(default)]
    #[serde(default)]
    deficit: f64,
}

impl AppDescriptor {
    /// The vertex hosting the computation.
    pub fn host(&self) -> VertexId {
        self.host
    }

    /// The possible entanglement peers.
    pub fn peers(&self) -> &[VertexId] {
        &self.peers
    }

    /// The app's weight.
    pub fn priority(&self) -> f64 {
        self.priority
    }

    /// The allocated paths, in the order in which they were first used.
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }

    /// The number of k-shortest-paths searches performed for this app.
    pub fn searches(&self) -> usize {
        self.searches
    }

    /// The current deficit counter, in EPR/s of gross rate.
    pub fn deficit(&self) -> f64 {
        self.deficit
    }

    /// The total net rate across all allocations.
    pub fn net_rate(&self) -> f64 {
        self.allocations.iter().map(|a| a.net_rate).sum()
    }

    /// The total gross rate across all allocations.
    pub fn gross_rate(&self) -> f64 {
        self.allocations.iter().map(|a| a.gross_rate).sum()
    }

    fn allocate(&mut self, net_rate: f64, gross_rate: f64, path: &[VertexId]) {
        match self.allocations.iter_mut().find(|a| a.path == path) {
            Some(a) => {
                a.net_rate += net_rate;
                a.gross_rate += gross_rate;
            }
            None => self.allocations.push(Allocation {
                net_rate,
                gross_rate,
                path: path.to_vec(),
            }),
        }
    }
}

impl fmt::Display for AppDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "host {}, peers [{}], priority {}, allocations [{}], searches {}, deficit {}",
            self.host,
            self.peers.iter().join(","),
            self.priority,
            self.allocations
                .iter()
                .map(|a| format!(
                    "({}, {}, [{}])",
                    a.net_rate,
                    a.gross_rate,
                    a.path.iter().join(",")
                ))
                .join(", "),
            self.searches,
            self.deficit
        )
    }
}

impl CapacityGraph {
    /// Allocates capacity to `apps` starting with the current capacities, until no app can reach
    /// any of its peers. Apps take turns in the order in which they are given, so earlier apps
    /// see more capacity within a round. Every allocation permanently decreases the capacities
    /// along its path.
    ///
    /// This function returns an error if the options or some app are invalid, in which case
    /// neither the graph nor any descriptor is changed.
    pub fn route_apps(&mut self, apps: &mut [AppDescriptor], opts: &AppOpts) -> Result<(), Error> {
        opts.validate()?;
        // CORRECTNESS: Every app must be validated before the graph is changed.
        for (index, app) in apps.iter().enumerate() {
            self.validate_app(index, app)?;
        }
        for app in apps.iter_mut() {
            app.allocations.clear();
            app.searches = 0;
        }
        let mut active = (0..apps.len()).collect::<Vec<_>>();
        let mut nr_rounds = 0;
        while !active.is_empty() {
            nr_rounds += 1;
            let before = self.weights();
            let plans = active
                .iter()
                .filter_map(|&i| {
                    let candidates = self.candidates(&mut apps[i], opts.k);
                    (!candidates.is_empty()).then_some((i, candidates))
                })
                .collect::<Vec<_>>();
            let quanta = self.quanta_to_grant(apps, &plans, opts.quantum);
            if quanta > 1.0 {
                log::trace!("round {nr_rounds}: granting {quanta} quanta at once");
            }
            for (i, candidates) in &plans {
                let app = &mut apps[*i];
                app.deficit += app.priority * opts.quantum * quanta;
                self.serve_app(app, candidates);
            }
            active = plans.into_iter().map(|(i, _)| i).collect();
            if !active.is_empty() && self.weights() == before {
                log::warn!("round {nr_rounds} consumed no capacity, stopping");
                break;
            }
        }
        log::info!(
            "allocated {} EPR/s to {} apps in {nr_rounds} rounds",
            apps.iter().map(AppDescriptor::gross_rate).sum::<f64>(),
            apps.len()
        );
        Ok(())
    }

    fn validate_app(&self, index: usize, app: &AppDescriptor) -> Result<(), RequestError> {
        if !self.contains(app.host) {
            return Err(RequestError::UnknownVertex {
                index,
                vertex: app.host,
            });
        }
        for &peer in &app.peers {
            if !self.contains(peer) {
                return Err(RequestError::UnknownVertex {
                    index,
                    vertex: peer,
                });
            }
            if peer == app.host {
                return Err(RequestError::HostIsPeer {
                    index,
                    host: app.host,
                });
            }
        }
        if !(app.priority.is_finite() && app.priority > 0.0) {
            return Err(RequestError::InvalidPriority {
                index,
                priority: app.priority,
            });
        }
        Ok(())
    }

    // Searches for the app's cheapest paths to any of its peers, dropping those that cannot
    // deliver any net rate.
    fn candidates(&self, app: &mut AppDescriptor, k: usize) -> Vec<Route> {
        let probability = self.measurement_probability();
        let mut candidates = Vec::new();
        for &peer in &app.peers {
            app.searches += 1;
            candidates.extend(
                self.k_shortest_paths(app.host, peer, k)
                    .into_iter()
                    .filter(|route| rate::swap_success(probability, route.hops().len()) > 0.0),
            );
        }
        if candidates.is_empty() {
            log::debug!("app out of paths: {app}");
        }
        candidates.sort_by(|a, b| a.cost.total_cmp(&b.cost));
        candidates
    }

    // The number of quanta every app can be granted in this round while each one still spends
    // its whole deficit on its cheapest path. This is at least one.
    fn quanta_to_grant(
        &self,
        apps: &[AppDescriptor],
        plans: &[(usize, Vec<Route>)],
        quantum: f64,
    ) -> f64 {
        // Per edge: deficit already owed, and gross rate earned per quantum
        let mut load = FxHashMap::<(VertexId, VertexId), (f64, f64)>::default();
        for (i, candidates) in plans {
            let app = &apps[*i];
            let Some(cheapest) = candidates.first() else {
                continue;
            };
            for edge in path_edges(app.host, cheapest.hops()) {
                let (owed, per_quantum) = load.entry(edge).or_default();
                *owed += app.deficit;
                *per_quantum += app.priority * quantum;
            }
        }
        load.into_iter()
            .map(|((a, b), (owed, per_quantum))| {
                let capacity = self.capacity(a, b).unwrap_or_default();
                ((capacity - owed) / per_quantum).floor()
            })
            .min_by(f64::total_cmp)
            .unwrap_or(1.0)
            .max(1.0)
    }

    // Spends the app's deficit along its candidate paths, cheapest first.
    fn serve_app(&mut self, app: &mut AppDescriptor, candidates: &[Route]) {
        let probability = self.measurement_probability();
        for route in candidates {
            if app.deficit <= 0.0 {
                break;
            }
            let hops = route.hops();
            // An earlier allocation in this round may have used up an edge
            let Some(bottleneck) = self.bottleneck(app.host, hops) else {
                continue;
            };
            let gross_rate = bottleneck.min(app.deficit);
            let committed = self.remove_capacity(app.host, hops, gross_rate);
            debug_assert!(committed, "bottleneck checked before commit");
            app.deficit -= gross_rate;
            app.allocate(
                rate::net_rate(gross_rate, probability, hops.len()),
                gross_rate,
                hops,
            );
        }
        log::trace!("served app: {app}");
    }
}
