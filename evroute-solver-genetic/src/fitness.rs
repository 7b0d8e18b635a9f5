//! Feasibility-penalised route evaluation.
#![expect(
    clippy::float_arithmetic,
    reason = "fitness accumulates floating-point distance, energy and load"
)]

use evroute_core::Problem;

use crate::config::{PENALTY, Penalty};
use crate::genotype::Individual;

/// Problem data the fitness function reads, resolved once per solve.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FitnessContext<'a> {
    problem: &'a Problem,
    depot: usize,
    min_energy: f64,
    penalty: Penalty,
}

impl<'a> FitnessContext<'a> {
    pub(crate) fn new(problem: &'a Problem, depot: usize, penalty: Penalty) -> Self {
        Self {
            problem,
            depot,
            min_energy: problem.fleet().configured_min_energy(),
            penalty,
        }
    }

    /// Total fleet distance, or a penalty when any vehicle is infeasible.
    ///
    /// Each vehicle leaves the depot empty on a full battery. Load changes by
    /// `pickup - delivery` without clamping, and each leg costs
    /// `distance * rate * load` energy at the load held after arrival. A
    /// vehicle below the minimum charge recharges only at a station, and the
    /// return leg is not checked against the energy minimum.
    pub(crate) fn evaluate(&self, individual: &Individual) -> f64 {
        let mut distance = 0.0;
        let mut violation = 0.0;
        for route in individual.routes() {
            match self.replay(route) {
                Ok(route_distance) => distance += route_distance,
                Err(_) if self.penalty == Penalty::Cliff => return PENALTY,
                Err(amount) => violation += amount,
            }
        }
        if violation > 0.0 {
            PENALTY + violation
        } else {
            distance
        }
    }

    /// Whether every vehicle's route passes all checks.
    pub(crate) fn is_feasible(&self, individual: &Individual) -> bool {
        individual
            .routes()
            .iter()
            .all(|route| self.replay(route).is_ok())
    }

    /// Replay one vehicle. `Err` carries the total violation found.
    fn replay(&self, route: &[usize]) -> Result<f64, f64> {
        let fleet = self.problem.fleet();
        let distances = self.problem.distances();
        let mut energy = fleet.battery_capacity;
        let mut load = 0.0;
        let mut distance = 0.0;
        let mut violation = 0.0;
        let mut previous = self.depot;

        for &node in route {
            let leg = distances.get(previous, node);
            if leg.is_infinite() {
                violation += 1.0;
                if self.penalty == Penalty::Cliff {
                    return Err(violation);
                }
                previous = node;
                continue;
            }
            distance += leg;
            let demand = self.problem.demand(node).unwrap_or_default();
            load += demand.pickup - demand.delivery;
            // Billed at the load held after servicing `node`, as the route
            // simulator does. A negative load bills nothing.
            energy -= leg * fleet.energy_rate * load.max(0.0);

            if energy < self.min_energy {
                if self.problem.charging().contains(node) {
                    energy = fleet.battery_capacity;
                } else {
                    violation += self.min_energy - energy;
                    if self.penalty == Penalty::Cliff {
                        return Err(violation);
                    }
                }
            }
            if load < 0.0 || load > fleet.capacity {
                violation += if load < 0.0 { -load } else { load - fleet.capacity };
                if self.penalty == Penalty::Cliff {
                    return Err(violation);
                }
            }
            previous = node;
        }

        let back = distances.get(previous, self.depot);
        if back.is_infinite() {
            violation += 1.0;
        } else {
            distance += back;
        }
        if violation > 0.0 {
            Err(violation)
        } else {
            Ok(distance)
        }
    }
}
