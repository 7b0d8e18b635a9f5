//! Indexed problem model shared by every solver.
//!
//! A [`Problem`] is built once per request from a
//! [`ProblemDescription`](crate::ProblemDescription). Nodes are re-indexed
//! after a stable sort by role (depot, customers, stations), so the depot is
//! index 0 whenever one exists. Fleet and station limits are taken from the
//! first entry of each list and applied uniformly.

mod error;
mod matrix;

use std::collections::{BTreeMap, HashMap};

use crate::description::{NodeKind, ProblemDescription, StationSpec};

pub use error::ValidationError;
pub use matrix::DistanceMatrix;

/// Cargo capacity used when the first vehicle omits one.
pub const DEFAULT_VEHICLE_CAPACITY: f64 = 100.0;
/// Battery capacity used when the first vehicle omits one.
pub const DEFAULT_BATTERY_CAPACITY: f64 = 200.0;
/// Energy per unit distance per unit load when the constraints omit it.
pub const DEFAULT_ENERGY_RATE: f64 = 0.1;
/// Charging rate used when the first station omits one.
pub const DEFAULT_CHARGING_RATE: f64 = 50.0;
/// Fixed minimum state of charge used by the search and exact solvers.
pub const DEFAULT_MIN_BATTERY_FRACTION: f64 = 0.15;

/// A node after ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// External label.
    pub id: String,
    /// Role of the node.
    pub kind: NodeKind,
}

/// Pickup and delivery amounts for one customer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Demand {
    /// Amount collected at the customer.
    pub pickup: f64,
    /// Amount dropped at the customer.
    pub delivery: f64,
}

impl Demand {
    /// Combined magnitude used to rank customers.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "demand totals are floating point")]
    pub fn total(self) -> f64 {
        self.pickup + self.delivery
    }
}

/// Homogeneous fleet limits and energy parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetParams {
    /// External ids for each vehicle slot, when the caller supplied them.
    pub vehicle_ids: Vec<Option<String>>,
    /// Cargo capacity of every vehicle.
    pub capacity: f64,
    /// Battery capacity of every vehicle.
    pub battery_capacity: f64,
    /// Energy per unit distance per unit load.
    pub energy_rate: f64,
    /// Caller-supplied minimum state of charge, as a fraction.
    pub min_battery_fraction: Option<f64>,
}

impl FleetParams {
    /// Number of vehicles in the fleet.
    #[must_use]
    pub const fn vehicle_count(&self) -> usize {
        self.vehicle_ids.len()
    }

    /// Minimum energy at the fixed 15% threshold.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "threshold is a battery fraction")]
    pub fn fixed_min_energy(&self) -> f64 {
        DEFAULT_MIN_BATTERY_FRACTION * self.battery_capacity
    }

    /// Minimum energy at the caller-supplied threshold, falling back to 15%.
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "threshold is a battery fraction")]
    pub fn configured_min_energy(&self) -> f64 {
        self.min_battery_fraction
            .unwrap_or(DEFAULT_MIN_BATTERY_FRACTION)
            * self.battery_capacity
    }
}

/// A charging station and its port count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargingStation {
    /// Node index hosting the station.
    pub index: usize,
    /// Number of vehicles that can charge at once.
    pub max_ports: u32,
}

/// All charging stations sharing a single charging rate.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargingNetwork {
    /// Stations in declaration order.
    pub stations: Vec<ChargingStation>,
    /// Energy restored per time unit, taken from the first station.
    pub charging_rate: f64,
}

impl ChargingNetwork {
    /// Whether `index` hosts a charging station.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.stations.iter().any(|station| station.index == index)
    }

    /// Port count of the station at `index`.
    #[must_use]
    pub fn ports(&self, index: usize) -> Option<u32> {
        self.stations
            .iter()
            .find(|station| station.index == index)
            .map(|station| station.max_ports)
    }
}

/// Customer node index to demand.
pub type CustomerDemands = BTreeMap<usize, Demand>;

/// The indexed problem consumed by every solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    nodes: Vec<Node>,
    index_by_id: HashMap<String, usize>,
    depot: usize,
    has_depot: bool,
    distances: DistanceMatrix,
    fleet: FleetParams,
    charging: ChargingNetwork,
    demands: CustomerDemands,
}

impl Problem {
    /// Validate and index a description.
    ///
    /// # Errors
    /// Returns [`ValidationError`] when the description is structurally
    /// unusable: no nodes, duplicate ids, dangling edge or station references,
    /// invalid distances, station limits or demands, or an empty fleet.
    ///
    /// # Examples
    /// ```
    /// use evroute_core::{EdgeSpec, NodeKind, NodeSpec, Problem, ProblemDescription, VehicleSpec};
    ///
    /// let description = ProblemDescription {
    ///     nodes: vec![
    ///         NodeSpec::customer("c1", 5.0, 0.0),
    ///         NodeSpec::new("home", NodeKind::Depot),
    ///     ],
    ///     edges: vec![EdgeSpec::new("home", "c1", 3.0)],
    ///     vehicles: vec![VehicleSpec::default()],
    ///     ..ProblemDescription::default()
    /// };
    /// let problem = Problem::from_description(&description).unwrap();
    /// assert_eq!(problem.depot(), 0);
    /// assert_eq!(problem.label(1), Some("c1"));
    /// ```
    pub fn from_description(description: &ProblemDescription) -> Result<Self, ValidationError> {
        if description.nodes.is_empty() {
            return Err(ValidationError::NoNodes);
        }
        let first_vehicle = description
            .vehicles
            .first()
            .ok_or(ValidationError::NoVehicles)?;

        let mut sorted: Vec<_> = description.nodes.iter().collect();
        sorted.sort_by_key(|node| node.kind);

        let mut index_by_id = HashMap::with_capacity(sorted.len());
        let mut demands = CustomerDemands::new();
        for (index, node) in sorted.iter().enumerate() {
            if index_by_id.insert(node.id.clone(), index).is_some() {
                return Err(ValidationError::DuplicateNode {
                    id: node.id.clone(),
                });
            }
            if node.kind == NodeKind::Customer {
                if !valid_amount(node.pickup) || !valid_amount(node.delivery) {
                    return Err(ValidationError::NegativeDemand {
                        id: node.id.clone(),
                    });
                }
                demands.insert(
                    index,
                    Demand {
                        pickup: node.pickup,
                        delivery: node.delivery,
                    },
                );
            }
        }

        let distances = build_matrix(description, &index_by_id, sorted.len())?;
        let charging = build_charging(&description.charging_stations, &index_by_id)?;

        let depot_index = sorted.iter().position(|node| node.kind == NodeKind::Depot);
        if depot_index.is_none() {
            log::warn!("problem has no depot node; treating node 0 as the depot");
        }

        let fleet = FleetParams {
            vehicle_ids: description
                .vehicles
                .iter()
                .map(|vehicle| vehicle.id.clone())
                .collect(),
            capacity: first_vehicle
                .capacity
                .unwrap_or(DEFAULT_VEHICLE_CAPACITY),
            battery_capacity: first_vehicle
                .battery_capacity
                .unwrap_or(DEFAULT_BATTERY_CAPACITY),
            energy_rate: description
                .constraints
                .energy_consumption_rate
                .unwrap_or(DEFAULT_ENERGY_RATE),
            min_battery_fraction: description.constraints.min_battery_threshold,
        };

        let nodes = sorted
            .into_iter()
            .map(|node| Node {
                id: node.id.clone(),
                kind: node.kind,
            })
            .collect();

        Ok(Self {
            nodes,
            index_by_id,
            depot: depot_index.unwrap_or(0),
            has_depot: depot_index.is_some(),
            distances,
            fleet,
            charging,
            demands,
        })
    }

    /// Nodes in index order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the depot.
    #[must_use]
    pub const fn depot(&self) -> usize {
        self.depot
    }

    /// Whether the depot index refers to an explicit depot node.
    #[must_use]
    pub const fn has_depot(&self) -> bool {
        self.has_depot
    }

    /// Fail with [`ValidationError::MissingDepot`] unless an explicit depot exists.
    ///
    /// # Errors
    /// Returns [`ValidationError::MissingDepot`] when the depot is only the
    /// index-0 fallback.
    pub const fn require_depot(&self) -> Result<usize, ValidationError> {
        if self.has_depot {
            Ok(self.depot)
        } else {
            Err(ValidationError::MissingDepot)
        }
    }

    /// Direct distances between nodes.
    #[must_use]
    pub const fn distances(&self) -> &DistanceMatrix {
        &self.distances
    }

    /// Fleet limits.
    #[must_use]
    pub const fn fleet(&self) -> &FleetParams {
        &self.fleet
    }

    /// Charging stations.
    #[must_use]
    pub const fn charging(&self) -> &ChargingNetwork {
        &self.charging
    }

    /// Customer demand table.
    #[must_use]
    pub const fn demands(&self) -> &CustomerDemands {
        &self.demands
    }

    /// Demand at `index`, if it is a customer.
    #[must_use]
    pub fn demand(&self, index: usize) -> Option<Demand> {
        self.demands.get(&index).copied()
    }

    /// Customer indices in ascending order.
    pub fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        self.demands.keys().copied()
    }

    /// External label of the node at `index`.
    #[must_use]
    pub fn label(&self, index: usize) -> Option<&str> {
        self.nodes.get(index).map(|node| node.id.as_str())
    }

    /// Index of the node with external label `id`.
    #[must_use]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    /// External labels for a route of indices. Unknown indices are skipped.
    #[must_use]
    pub fn labels(&self, route: &[usize]) -> Vec<String> {
        route
            .iter()
            .filter_map(|&index| self.label(index))
            .map(str::to_owned)
            .collect()
    }
}

fn valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

fn build_matrix(
    description: &ProblemDescription,
    index_by_id: &HashMap<String, usize>,
    size: usize,
) -> Result<DistanceMatrix, ValidationError> {
    let mut matrix = DistanceMatrix::new(size);
    for edge in &description.edges {
        let lookup = |id: &String| {
            index_by_id
                .get(id)
                .copied()
                .ok_or_else(|| ValidationError::UnknownEdgeEndpoint { id: id.clone() })
        };
        let source = lookup(&edge.source)?;
        let target = lookup(&edge.target)?;
        if !valid_amount(edge.distance) {
            return Err(ValidationError::InvalidDistance {
                source_id: edge.source.clone(),
                target_id: edge.target.clone(),
            });
        }
        if source == target {
            log::debug!("ignoring self-loop edge on {:?}", edge.source);
            continue;
        }
        matrix.set_symmetric(source, target, edge.distance);
    }
    Ok(matrix)
}

fn build_charging(
    specs: &[StationSpec],
    index_by_id: &HashMap<String, usize>,
) -> Result<ChargingNetwork, ValidationError> {
    let mut stations = Vec::with_capacity(specs.len());
    for spec in specs {
        let index =
            index_by_id
                .get(&spec.id)
                .copied()
                .ok_or_else(|| ValidationError::UnknownStation {
                    id: spec.id.clone(),
                })?;
        let max_ports = spec.max_ports.unwrap_or(1);
        let rate_ok = spec
            .charging_rate
            .is_none_or(|rate| rate.is_finite() && rate > 0.0);
        if max_ports == 0 || !rate_ok {
            return Err(ValidationError::InvalidStation {
                id: spec.id.clone(),
            });
        }
        stations.push(ChargingStation { index, max_ports });
    }
    let charging_rate = specs
        .first()
        .and_then(|spec| spec.charging_rate)
        .unwrap_or(DEFAULT_CHARGING_RATE);
    Ok(ChargingNetwork {
        stations,
        charging_rate,
    })
}
