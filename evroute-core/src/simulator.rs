//! Deterministic replay of a single vehicle route.
//!
//! The simulator walks a route leg by leg, applying demand at each arrival,
//! billing energy for the leg and detouring to the nearest charging station
//! whenever the battery drops below the fixed minimum. It never mutates the
//! [`Problem`] and produces the same [`SimulationTrace`] for the same inputs.
#![expect(
    clippy::float_arithmetic,
    reason = "energy and load accounting is floating point"
)]

use std::collections::HashMap;
use std::fmt;

use crate::problem::{ChargingStation, Problem};

/// A single entry of the simulation log.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// The vehicle travelled `from -> to`.
    Travel {
        /// Departure node index.
        from: usize,
        /// Arrival node index.
        to: usize,
        /// Leg distance.
        distance: f64,
        /// Delivery demand at the arrival node.
        delivery: f64,
        /// Pickup demand at the arrival node.
        pickup: f64,
        /// Load after servicing the arrival node.
        load: f64,
        /// Energy remaining after the leg.
        energy: f64,
    },
    /// The vehicle detoured to a station and recharged to full.
    Charge {
        /// Station node index.
        station: usize,
        /// Time spent queueing for a port.
        wait: f64,
        /// Energy restored.
        charged: f64,
        /// Time spent charging.
        charge_time: f64,
    },
    /// Energy fell below the minimum and no station exists.
    Stranded {
        /// Node where the vehicle ran low.
        at: usize,
        /// Energy remaining.
        energy: f64,
    },
}

impl fmt::Display for SimulationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Travel {
                from,
                to,
                distance,
                delivery,
                pickup,
                load,
                energy,
            } => write!(
                f,
                "Travel {from}->{to}: Dist={distance}, Delivery={delivery}, Pickup={pickup}, \
                 Load={load}, Energy Left={energy:.2}"
            ),
            Self::Charge {
                station,
                wait,
                charged,
                charge_time,
            } => write!(
                f,
                "Charge at {station}: Wait={wait}, Charged={charged:.2}, Time={charge_time:.1}"
            ),
            Self::Stranded { at, energy } => {
                write!(f, "Stranded at {at}: Energy Left={energy:.2}, no charging station")
            }
        }
    }
}

/// Result of replaying one route.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationTrace {
    /// The replayed route.
    pub route: Vec<usize>,
    /// Distance travelled, including charging detours.
    pub distance: f64,
    /// Energy after every leg and every recharge.
    pub energy_trace: Vec<f64>,
    /// Load after every leg and every recharge.
    pub load_trace: Vec<f64>,
    /// Charging wait plus charge duration.
    pub elapsed_time: f64,
    /// Nominal pickup demand of the customers visited.
    pub total_pickup: f64,
    /// Nominal delivery demand of the customers visited.
    pub total_delivery: f64,
    /// Energy at the end of the route.
    pub final_energy: f64,
    /// Load at the end of the route.
    pub final_load: f64,
    /// Ordered event log.
    pub events: Vec<SimulationEvent>,
}

impl SimulationTrace {
    /// Number of charging stops.
    #[must_use]
    pub fn charge_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, SimulationEvent::Charge { .. }))
            .count()
    }

    /// Human-readable log lines.
    #[must_use]
    pub fn event_log(&self) -> Vec<String> {
        self.events.iter().map(ToString::to_string).collect()
    }
}

/// Replays routes against a [`Problem`].
///
/// # Examples
/// ```
/// use evroute_core::{EdgeSpec, NodeKind, NodeSpec, Problem, ProblemDescription, RouteSimulator, VehicleSpec};
///
/// let description = ProblemDescription {
///     nodes: vec![NodeSpec::new("d", NodeKind::Depot), NodeSpec::customer("c", 5.0, 0.0)],
///     edges: vec![EdgeSpec::new("d", "c", 10.0)],
///     vehicles: vec![VehicleSpec::default()],
///     ..ProblemDescription::default()
/// };
/// let problem = Problem::from_description(&description).unwrap();
/// let trace = RouteSimulator::new(&problem).simulate(&[0, 1, 0]);
/// assert_eq!(trace.distance, 20.0);
/// assert_eq!(trace.load_trace, vec![5.0, 5.0]);
/// ```
#[derive(Debug, Clone)]
pub struct RouteSimulator<'a> {
    problem: &'a Problem,
    occupancy: HashMap<usize, u32>,
}

impl<'a> RouteSimulator<'a> {
    /// Create a simulator where every station starts idle.
    #[must_use]
    pub fn new(problem: &'a Problem) -> Self {
        Self {
            problem,
            occupancy: HashMap::new(),
        }
    }

    /// Record `vehicles` already charging at the station on node `station`.
    #[must_use]
    pub fn with_occupancy(mut self, station: usize, vehicles: u32) -> Self {
        self.occupancy.insert(station, vehicles);
        self
    }

    /// Replay `route`, a sequence of node indices.
    ///
    /// The vehicle starts empty with a full battery. Routes with fewer than
    /// two nodes produce an empty trace at that starting state.
    #[must_use]
    pub fn simulate(&self, route: &[usize]) -> SimulationTrace {
        let fleet = self.problem.fleet();
        let distances = self.problem.distances();
        let min_energy = fleet.fixed_min_energy();

        let mut trace = SimulationTrace {
            route: route.to_vec(),
            ..SimulationTrace::default()
        };
        let mut load = 0.0_f64;
        let mut energy = fleet.battery_capacity;

        for leg in route.windows(2) {
            let [from, to] = *leg else { continue };
            let distance = distances.get(from, to);
            let demand = self.problem.demand(to).unwrap_or_default();

            // Delivery before pickup.
            load = (load - demand.delivery).max(0.0);
            load = (load + demand.pickup).min(fleet.capacity);
            trace.total_delivery += demand.delivery;
            trace.total_pickup += demand.pickup;

            // The leg is billed at the load held after servicing `to`, not the
            // load carried across it. Routes are compared on this figure, so do
            // not change it to the departure load.
            energy -= self.leg_energy(distance, load);
            trace.distance += distance;
            trace.energy_trace.push(energy);
            trace.load_trace.push(load);
            trace.events.push(SimulationEvent::Travel {
                from,
                to,
                distance,
                delivery: demand.delivery,
                pickup: demand.pickup,
                load,
                energy,
            });

            if energy < min_energy {
                energy = self.recharge(&mut trace, to, energy, load);
            }
        }

        trace.final_energy = energy;
        trace.final_load = load;
        trace
    }

    fn recharge(&self, trace: &mut SimulationTrace, at: usize, energy: f64, load: f64) -> f64 {
        let Some(station) = self.nearest_station(at) else {
            log::debug!("vehicle stranded at node {at} with energy {energy:.2}");
            trace.events.push(SimulationEvent::Stranded { at, energy });
            return energy;
        };
        let fleet = self.problem.fleet();
        // Unreachable stations surface as an infinite detour.
        let detour = self.problem.distances().get(at, station.index);
        let arrival_energy = energy - self.leg_energy(detour, load);
        trace.distance += detour;

        let occupied = self.occupancy.get(&station.index).copied().unwrap_or(0);
        let wait = f64::from(occupied.saturating_sub(station.max_ports));
        let charged = fleet.battery_capacity - arrival_energy;
        let charge_time = charged / self.problem.charging().charging_rate;
        trace.elapsed_time += wait + charge_time;

        trace.energy_trace.push(fleet.battery_capacity);
        trace.load_trace.push(load);
        trace.events.push(SimulationEvent::Charge {
            station: station.index,
            wait,
            charged,
            charge_time,
        });
        fleet.battery_capacity
    }

    fn leg_energy(&self, distance: f64, load: f64) -> f64 {
        // An empty vehicle spends nothing, even on an infinite leg.
        if load <= 0.0 {
            return 0.0;
        }
        self.problem.fleet().energy_rate * distance * load
    }

    /// Nearest station by direct distance; the first listed wins ties.
    fn nearest_station(&self, from: usize) -> Option<ChargingStation> {
        let distances = self.problem.distances();
        self.problem
            .charging()
            .stations
            .iter()
            .fold(None, |best: Option<(ChargingStation, f64)>, station| {
                let distance = distances.get(from, station.index);
                match best {
                    Some((_, best_distance)) if best_distance <= distance => best,
                    _ => Some((*station, distance)),
                }
            })
            .map(|(station, _)| station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{DescriptionBuilder, single_customer};
    use rstest::{fixture, rstest};

    /// Depot, one heavy customer and one station. The customer leg drains the
    /// battery below 15%.
    #[fixture]
    fn draining_problem() -> Problem {
        let description = DescriptionBuilder::new()
            .depot("d")
            .customer("c", 50.0, 0.0)
            .station_node("s")
            .edge("d", "c", 10.0)
            .edge("c", "s", 2.0)
            .edge("d", "s", 12.0)
            .vehicle(100.0, 100.0)
            .charging_station("s", 1, 20.0)
            .energy_rate(0.18)
            .build();
        Problem::from_description(&description).expect("valid problem")
    }

    #[rstest]
    fn delivery_is_applied_before_pickup() {
        let description = DescriptionBuilder::new()
            .depot("d")
            .customer("a", 30.0, 0.0)
            .customer("b", 10.0, 25.0)
            .edge("d", "a", 1.0)
            .edge("a", "b", 1.0)
            .edge("b", "d", 1.0)
            .vehicle(100.0, 1000.0)
            .build();
        let problem = Problem::from_description(&description).expect("valid problem");
        let trace = RouteSimulator::new(&problem).simulate(&[0, 1, 2, 0]);
        assert_eq!(trace.load_trace, vec![30.0, 15.0, 15.0]);
        assert!((trace.total_delivery - 25.0).abs() < f64::EPSILON);
        assert!((trace.total_pickup - 40.0).abs() < f64::EPSILON);
    }

    #[rstest]
    fn load_is_clamped_to_capacity_and_zero() {
        let description = DescriptionBuilder::new()
            .depot("d")
            .customer("a", 0.0, 40.0)
            .customer("b", 90.0, 0.0)
            .edge("d", "a", 1.0)
            .edge("a", "b", 1.0)
            .edge("b", "d", 1.0)
            .vehicle(60.0, 1000.0)
            .build();
        let problem = Problem::from_description(&description).expect("valid problem");
        let trace = RouteSimulator::new(&problem).simulate(&[0, 1, 2, 0]);
        assert_eq!(trace.load_trace, vec![0.0, 60.0, 60.0]);
    }

    #[rstest]
    fn leg_energy_uses_load_after_arrival() {
        let problem = Problem::from_description(&single_customer()).expect("valid problem");
        let trace = RouteSimulator::new(&problem).simulate(&[0, 1]);
        // pickup 5 at the customer, billed over the 10 unit leg at rate 0.1
        let spent = problem.fleet().battery_capacity - trace.final_energy;
        assert!((spent - 5.0).abs() < 1e-9);
    }

    #[rstest]
    fn charging_event_restores_full_battery(draining_problem: Problem) {
        let trace = RouteSimulator::new(&draining_problem).simulate(&[0, 1]);
        let charge = trace
            .events
            .iter()
            .find_map(|event| match event {
                SimulationEvent::Charge {
                    station,
                    wait,
                    charged,
                    charge_time,
                } => Some((*station, *wait, *charged, *charge_time)),
                _ => None,
            })
            .expect("a charge event");
        let (station, wait, charged, charge_time) = charge;
        assert_eq!(station, 2);
        assert!(wait.abs() < f64::EPSILON);
        // 100 - 0.18*10*50 = 10, detour 2 costs 18, arrival -8, deficit 108
        assert!((charged - 108.0).abs() < 1e-9);
        assert!((charge_time - charged / 20.0).abs() < 1e-9);
        assert!((trace.elapsed_time - charge_time).abs() < 1e-9);
        assert!((trace.distance - 12.0).abs() < 1e-9);
        assert_eq!(trace.energy_trace, vec![10.0, 100.0]);
        assert_eq!(trace.load_trace, vec![50.0, 50.0]);
    }

    #[rstest]
    #[case(0, 0.0)]
    #[case(1, 0.0)]
    #[case(4, 3.0)]
    fn wait_reflects_station_occupancy(
        draining_problem: Problem,
        #[case] occupied: u32,
        #[case] expected_wait: f64,
    ) {
        let trace = RouteSimulator::new(&draining_problem)
            .with_occupancy(2, occupied)
            .simulate(&[0, 1, 0]);
        let wait = trace.events.iter().find_map(|event| match event {
            SimulationEvent::Charge { wait, .. } => Some(*wait),
            _ => None,
        });
        assert_eq!(wait, Some(expected_wait));
    }

    #[rstest]
    fn unreachable_station_surfaces_infinite_detour() {
        let description = DescriptionBuilder::new()
            .depot("d")
            .customer("c", 50.0, 0.0)
            .station_node("s")
            .edge("d", "c", 10.0)
            .vehicle(100.0, 100.0)
            .charging_station("s", 1, 20.0)
            .energy_rate(0.18)
            .build();
        let problem = Problem::from_description(&description).expect("valid problem");
        let trace = RouteSimulator::new(&problem).simulate(&[0, 1]);
        assert!(trace.distance.is_infinite());
        assert_eq!(trace.charge_count(), 1);
    }

    #[rstest]
    fn missing_station_strands_vehicle() {
        let description = DescriptionBuilder::new()
            .depot("d")
            .customer("c", 50.0, 0.0)
            .edge("d", "c", 10.0)
            .vehicle(100.0, 100.0)
            .energy_rate(0.18)
            .build();
        let problem = Problem::from_description(&description).expect("valid problem");
        let trace = RouteSimulator::new(&problem).simulate(&[0, 1]);
        assert!(matches!(
            trace.events.last(),
            Some(SimulationEvent::Stranded { at: 1, .. })
        ));
        assert_eq!(trace.charge_count(), 0);
    }

    #[rstest]
    fn event_log_is_human_readable() {
        let problem = Problem::from_description(&single_customer()).expect("valid problem");
        let trace = RouteSimulator::new(&problem).simulate(&[0, 1]);
        assert_eq!(
            trace.event_log(),
            vec!["Travel 0->1: Dist=10, Delivery=0, Pickup=5, Load=5, Energy Left=95.00"]
        );
    }

    #[rstest]
    fn short_routes_yield_empty_trace() {
        let problem = Problem::from_description(&single_customer()).expect("valid problem");
        let trace = RouteSimulator::new(&problem).simulate(&[0]);
        assert!(trace.events.is_empty());
        assert!((trace.final_energy - problem.fleet().battery_capacity).abs() < f64::EPSILON);
    }
}
