//! Raw problem descriptions as received from callers.
//!
//! These types mirror the JSON payload sent by the routing front end. They are
//! deliberately permissive: optional fields fall back to documented defaults
//! and presentation-only fields (coordinates, display labels) are ignored.
//! Structural validation happens when a description is ingested into a
//! [`Problem`](crate::Problem).

/// Role of a node in the routing graph.
///
/// The declaration order doubles as the ingestion sort priority, so the depot
/// always sorts ahead of customers and customers ahead of stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeKind {
    /// Start and end point for every vehicle.
    Depot,
    /// A stop with pickup and delivery demand.
    Customer,
    /// A charging station.
    Station,
}

impl NodeKind {
    /// Lower-case role name used in labels and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Depot => "depot",
            Self::Customer => "customer",
            Self::Station => "station",
        }
    }
}

/// A complete, unvalidated problem description.
///
/// # Examples
/// ```
/// # #[cfg(feature = "serde")]
/// # fn main() -> Result<(), serde_json::Error> {
/// use evroute_core::ProblemDescription;
///
/// let payload = r#"{
///     "nodes": [{"id": "depot-0", "type": "depot"}],
///     "edges": [],
///     "vehicles": [{"capacity": 50}]
/// }"#;
/// let description: ProblemDescription = serde_json::from_str(payload)?;
/// assert_eq!(description.nodes.len(), 1);
/// # Ok(())
/// # }
/// # #[cfg(not(feature = "serde"))]
/// # fn main() {}
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemDescription {
    /// Solver selection tag carried alongside the problem.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: Option<String>,
    /// Graph nodes in caller order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub nodes: Vec<NodeSpec>,
    /// Undirected edges between nodes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub edges: Vec<EdgeSpec>,
    /// Fleet entries; only the first entry's limits are used.
    #[cfg_attr(feature = "serde", serde(default))]
    pub vehicles: Vec<VehicleSpec>,
    /// Charging station definitions.
    #[cfg_attr(feature = "serde", serde(default))]
    pub charging_stations: Vec<StationSpec>,
    /// Energy constraints.
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: ConstraintSpec,
}

/// A node entry.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeSpec {
    /// External label, unique within the description.
    pub id: String,
    /// Role of the node.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: NodeKind,
    /// Amount collected at the node (customers only).
    #[cfg_attr(feature = "serde", serde(default))]
    pub pickup: f64,
    /// Amount dropped at the node (customers only).
    #[cfg_attr(feature = "serde", serde(default))]
    pub delivery: f64,
}

impl NodeSpec {
    /// Construct a node with no demand.
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind,
            pickup: 0.0,
            delivery: 0.0,
        }
    }

    /// Construct a customer node with the given demand.
    pub fn customer(id: impl Into<String>, pickup: f64, delivery: f64) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Customer,
            pickup,
            delivery,
        }
    }
}

/// An undirected edge.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeSpec {
    /// Id of one endpoint.
    pub source: String,
    /// Id of the other endpoint.
    pub target: String,
    /// Travel distance between the endpoints.
    #[cfg_attr(feature = "serde", serde(default))]
    pub distance: f64,
}

impl EdgeSpec {
    /// Construct an edge.
    pub fn new(source: impl Into<String>, target: impl Into<String>, distance: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            distance,
        }
    }
}

/// A fleet entry.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VehicleSpec {
    /// Optional external vehicle id.
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: Option<String>,
    /// Cargo capacity.
    #[cfg_attr(feature = "serde", serde(default))]
    pub capacity: Option<f64>,
    /// Battery capacity in energy units.
    #[cfg_attr(feature = "serde", serde(default))]
    pub battery_capacity: Option<f64>,
    /// Starting charge. Accepted for compatibility; every vehicle starts full.
    #[cfg_attr(feature = "serde", serde(default))]
    pub initial_battery: Option<f64>,
}

/// A charging station entry referencing a node id.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StationSpec {
    /// Id of the node hosting the station.
    pub id: String,
    /// Number of vehicles that can charge at once.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_ports: Option<u32>,
    /// Energy restored per time unit.
    #[cfg_attr(feature = "serde", serde(default))]
    pub charging_rate: Option<f64>,
}

/// Energy constraints for the whole fleet.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintSpec {
    /// Energy used per unit distance per unit load.
    #[cfg_attr(feature = "serde", serde(default))]
    pub energy_consumption_rate: Option<f64>,
    /// Minimum state of charge as a fraction of battery capacity.
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_battery_threshold: Option<f64>,
    /// Working time limit. Accepted for compatibility and not enforced.
    #[cfg_attr(feature = "serde", serde(default))]
    pub time_limit: Option<f64>,
}
