//! Builders and fixtures shared by unit, behaviour and benchmark code.
//!
//! The helpers are gated behind the `test-support` feature (and `cfg(test)`).

use std::thread;
use std::time::Duration;

use crate::{
    Diagnostics, EdgeSpec, NodeKind, NodeSpec, ProblemDescription, SolveError,
    SolveRequest, SolveResponse, Solver, StationSpec, VehicleSpec,
};

/// Fluent builder for [`ProblemDescription`] fixtures.
///
/// # Examples
/// ```rust
/// use evroute_core::test_support::DescriptionBuilder;
///
/// let description = DescriptionBuilder::new()
///     .depot("d")
///     .customer("c", 5.0, 0.0)
///     .edge("d", "c", 3.0)
///     .vehicle(100.0, 200.0)
///     .build();
/// assert_eq!(description.nodes.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DescriptionBuilder {
    description: ProblemDescription,
}

impl DescriptionBuilder {
    /// Start from an empty description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a depot node.
    #[must_use]
    pub fn depot(mut self, id: &str) -> Self {
        self.description
            .nodes
            .push(NodeSpec::new(id, NodeKind::Depot));
        self
    }

    /// Add a customer node.
    #[must_use]
    pub fn customer(mut self, id: &str, pickup: f64, delivery: f64) -> Self {
        self.description
            .nodes
            .push(NodeSpec::customer(id, pickup, delivery));
        self
    }

    /// Add a station node without registering a charger on it.
    #[must_use]
    pub fn station_node(mut self, id: &str) -> Self {
        self.description
            .nodes
            .push(NodeSpec::new(id, NodeKind::Station));
        self
    }

    /// Register a charger on an existing node id.
    #[must_use]
    pub fn charging_station(mut self, id: &str, max_ports: u32, charging_rate: f64) -> Self {
        self.description.charging_stations.push(StationSpec {
            id: id.to_owned(),
            max_ports: Some(max_ports),
            charging_rate: Some(charging_rate),
        });
        self
    }

    /// Add an undirected edge.
    #[must_use]
    pub fn edge(mut self, source: &str, target: &str, distance: f64) -> Self {
        self.description
            .edges
            .push(EdgeSpec::new(source, target, distance));
        self
    }

    /// Add an anonymous vehicle.
    #[must_use]
    pub fn vehicle(mut self, capacity: f64, battery_capacity: f64) -> Self {
        self.description.vehicles.push(VehicleSpec {
            capacity: Some(capacity),
            battery_capacity: Some(battery_capacity),
            ..VehicleSpec::default()
        });
        self
    }

    /// Add a vehicle with an external id.
    #[must_use]
    pub fn named_vehicle(mut self, id: &str, capacity: f64, battery_capacity: f64) -> Self {
        self.description.vehicles.push(VehicleSpec {
            id: Some(id.to_owned()),
            capacity: Some(capacity),
            battery_capacity: Some(battery_capacity),
            initial_battery: None,
        });
        self
    }

    /// Set the energy consumption rate.
    #[must_use]
    pub const fn energy_rate(mut self, rate: f64) -> Self {
        self.description.constraints.energy_consumption_rate = Some(rate);
        self
    }

    /// Set the minimum battery fraction.
    #[must_use]
    pub const fn min_battery_threshold(mut self, fraction: f64) -> Self {
        self.description.constraints.min_battery_threshold = Some(fraction);
        self
    }

    /// Finish the description.
    #[must_use]
    pub fn build(self) -> ProblemDescription {
        self.description
    }

    /// Finish the description with one extra edge appended.
    #[must_use]
    pub fn build_with_edge(mut self, edge: EdgeSpec) -> ProblemDescription {
        self.description.edges.push(edge);
        self.description
    }
}

/// One vehicle, one customer with a small pickup and one reachable station.
///
/// Ids match the role-plus-index labels the exact solver emits.
#[must_use]
pub fn single_customer() -> ProblemDescription {
    DescriptionBuilder::new()
        .depot("depot-0")
        .customer("customer-1", 5.0, 0.0)
        .station_node("station-2")
        .edge("depot-0", "customer-1", 10.0)
        .edge("customer-1", "station-2", 5.0)
        .edge("depot-0", "station-2", 8.0)
        .vehicle(100.0, 100.0)
        .charging_station("station-2", 1, 50.0)
        .energy_rate(0.1)
        .build()
}

/// A graph where the cheapest depot-to-customer path runs through a relay.
///
/// `D - A - C` costs 2 while the direct `D - C` edge costs 5.
#[must_use]
pub fn relay_detour() -> ProblemDescription {
    DescriptionBuilder::new()
        .depot("D")
        .customer("C", 1.0, 1.0)
        .station_node("A")
        .edge("D", "A", 1.0)
        .edge("A", "C", 1.0)
        .edge("D", "C", 5.0)
        .vehicle(100.0, 200.0)
        .charging_station("A", 1, 50.0)
        .build()
}

/// A fully connected depot plus `customers` customers and one station.
///
/// Distances grow with the index gap so the instance has a clear structure.
#[must_use]
pub fn complete_graph(customers: usize, vehicles: usize) -> ProblemDescription {
    let ids: Vec<String> = std::iter::once("depot".to_owned())
        .chain((1..=customers).map(|i| format!("c{i}")))
        .chain(std::iter::once("station".to_owned()))
        .collect();
    let mut builder = DescriptionBuilder::new().depot("depot");
    let demands = [1.0, 2.0, 3.0, 4.0].into_iter().cycle();
    for (id, demand) in ids.iter().skip(1).take(customers).zip(demands) {
        builder = builder.customer(id, demand, demand);
    }
    builder = builder.station_node("station");
    for (i, source) in ids.iter().enumerate() {
        for (j, target) in ids.iter().enumerate().skip(i + 1) {
            let gap = u32::try_from(j - i).unwrap_or(u32::MAX);
            builder = builder.edge(source, target, f64::from(gap.saturating_add(1)));
        }
    }
    for _ in 0..vehicles {
        builder = builder.vehicle(100.0, 500.0);
    }
    builder.charging_station("station", 2, 50.0).build()
}

/// A [`Solver`] that returns a canned outcome, optionally after a delay.
#[derive(Debug, Clone)]
pub struct FixedSolver {
    outcome: Result<SolveResponse, SolveError>,
    delay: Duration,
}

impl Default for FixedSolver {
    fn default() -> Self {
        Self {
            outcome: Ok(SolveResponse {
                routes: Vec::new(),
                diagnostics: Diagnostics::default(),
            }),
            delay: Duration::ZERO,
        }
    }
}

impl FixedSolver {
    /// A solver that always answers with `response`.
    #[must_use]
    pub const fn answering(response: SolveResponse) -> Self {
        Self {
            outcome: Ok(response),
            delay: Duration::ZERO,
        }
    }

    /// A solver that always fails with `error`.
    #[must_use]
    pub const fn failing(error: SolveError) -> Self {
        Self {
            outcome: Err(error),
            delay: Duration::ZERO,
        }
    }

    /// Sleep for `delay` before answering.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Solver for FixedSolver {
    fn solve(&self, _request: &SolveRequest) -> Result<SolveResponse, SolveError> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.outcome.clone()
    }
}
