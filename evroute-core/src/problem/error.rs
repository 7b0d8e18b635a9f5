use thiserror::Error;

/// Errors raised while ingesting a [`ProblemDescription`](crate::ProblemDescription).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The description contains no nodes.
    #[error("problem must contain at least one node")]
    NoNodes,
    /// Two nodes share the same id.
    #[error("node id {id:?} appears more than once")]
    DuplicateNode {
        /// The repeated id.
        id: String,
    },
    /// An edge references a node that does not exist.
    #[error("edge endpoint {id:?} does not match any node")]
    UnknownEdgeEndpoint {
        /// The dangling id.
        id: String,
    },
    /// An edge distance is negative or not finite.
    #[error("edge {source_id:?} -> {target_id:?} has an invalid distance")]
    InvalidDistance {
        /// Edge source id.
        source_id: String,
        /// Edge target id.
        target_id: String,
    },
    /// A charging station references a node that does not exist.
    #[error("charging station {id:?} does not match any node")]
    UnknownStation {
        /// The dangling station id.
        id: String,
    },
    /// A charging station has no ports or a non-positive charging rate.
    #[error("charging station {id:?} needs at least one port and a positive rate")]
    InvalidStation {
        /// The offending station id.
        id: String,
    },
    /// A customer carries a negative or non-finite demand.
    #[error("customer {id:?} has a negative demand")]
    NegativeDemand {
        /// The offending customer id.
        id: String,
    },
    /// A customer demand is not a whole number where a solver counts units.
    #[error("customer {id:?} has a fractional demand; this solver needs whole units")]
    FractionalDemand {
        /// The offending customer id.
        id: String,
    },
    /// The fleet is empty.
    #[error("problem must list at least one vehicle")]
    NoVehicles,
    /// No node is typed as a depot.
    #[error("problem must contain a depot node")]
    MissingDepot,
}
