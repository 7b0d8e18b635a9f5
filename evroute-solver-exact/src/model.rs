//! `good_lp` formulation of the routing problem for `ExactSolver`.
//!
//! Every vehicle owns a binary per directed arc of the edge set plus energy,
//! load and cumulative pickup/delivery variables per node. Conditional
//! constraints ("when this arc is used", "when energy allows the transfer")
//! are linearised with big-M terms derived from the fleet limits.
//!
//! Arcs into the depot close a route and carry no transitions: the depot
//! variables describe the state a vehicle departs with.

#![expect(
    clippy::float_arithmetic,
    reason = "big-M bounds and energy coefficients are floating point"
)]

use std::collections::{BTreeMap, BTreeSet};

use evroute_core::{Problem, SolveError, ValidationError};
use good_lp::{
    Constraint, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable,
    constraint, microlp, variable,
};

/// Gap separating an energy gate that opens from one that stays shut.
const GATE_EPSILON: f64 = 1e-6;

/// Values above this count as a selected arc.
const SELECTED: f64 = 0.5;

#[derive(Debug, Clone, Copy)]
struct NodeVars {
    energy: Variable,
    load: Variable,
    pickup: Variable,
    delivery: Variable,
}

#[derive(Debug)]
struct VehicleVars {
    arcs: BTreeMap<(usize, usize), Variable>,
    nodes: Vec<NodeVars>,
    charging: BTreeMap<usize, Variable>,
}

impl VehicleVars {
    fn inflow(&self, node: usize) -> Expression {
        self.arcs
            .iter()
            .filter(|&(&(_, to), _)| to == node)
            .fold(constant(0.0), |sum, (_, &arc)| sum + arc)
    }

    fn outflow(&self, node: usize) -> Expression {
        self.arcs
            .iter()
            .filter(|&(&(from, _), _)| from == node)
            .fold(constant(0.0), |sum, (_, &arc)| sum + arc)
    }

    fn touches(&self, node: usize) -> bool {
        self.arcs
            .keys()
            .any(|&(from, to)| from == node || to == node)
    }
}

/// Fleet constants shared by every big-M term.
#[derive(Debug, Clone, Copy)]
struct Limits {
    battery: f64,
    min_energy: f64,
    capacity: f64,
    energy_rate: f64,
    /// Upper bound on any cumulative cargo quantity.
    cargo: f64,
}

impl Limits {
    fn of(problem: &Problem) -> Self {
        let fleet = problem.fleet();
        let largest_demand = problem
            .demands()
            .values()
            .map(|demand| demand.pickup.max(demand.delivery))
            .fold(0.0, f64::max);
        let capacity = fleet.capacity.max(0.0);
        Self {
            battery: fleet.battery_capacity,
            min_energy: fleet.fixed_min_energy(),
            capacity,
            energy_rate: fleet.energy_rate,
            cargo: capacity + largest_demand,
        }
    }
}

/// Arcs each vehicle selected in an optimal assignment.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Assignment {
    /// Selected arcs per vehicle, ordered by tail then head.
    pub(crate) arcs: Vec<BTreeSet<(usize, usize)>>,
    /// Objective value of the assignment.
    pub(crate) objective: f64,
}

/// A built but unsolved routing programme.
pub(crate) struct EnergyModel {
    variables: ProblemVariables,
    constraints: Vec<Constraint>,
    vehicles: Vec<VehicleVars>,
    objective: Expression,
}

impl EnergyModel {
    /// Encode `problem` with `depot` as every vehicle's start and end.
    ///
    /// Instances whose depot has no outgoing arc, or with a customer no arc
    /// enters, are rejected before any variable is created. Cargo variables
    /// are integers, so a fractional demand is a validation error.
    pub(crate) fn build(problem: &Problem, depot: usize) -> Result<Self, SolveError> {
        ensure_whole_demands(problem)?;
        ensure_reachable(problem, depot)?;
        let limits = Limits::of(problem);
        let mut model = Self {
            variables: ProblemVariables::new(),
            constraints: Vec::new(),
            vehicles: Vec::new(),
            objective: constant(0.0),
        };
        for _ in 0..problem.fleet().vehicle_count() {
            let vehicle = model.add_vehicle(problem, depot, limits);
            model.route_constraints(problem, depot, &vehicle);
            model.transition_constraints(problem, depot, limits, &vehicle);
            model.charging_constraints(problem, limits, &vehicle);
            model.vehicles.push(vehicle);
        }
        model.port_constraints(problem);
        Ok(model)
    }

    /// Number of constraints in the programme.
    pub(crate) const fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Solve to optimality and read back the selected arcs.
    pub(crate) fn solve(self) -> Result<Assignment, SolveError> {
        let Self {
            variables,
            constraints,
            vehicles,
            objective,
        } = self;
        let solution = constraints
            .into_iter()
            .fold(
                variables.minimise(objective.clone()).using(microlp),
                SolverModel::with,
            )
            .solve()
            .map_err(|err| match err {
                ResolutionError::Infeasible => SolveError::Infeasible,
                other => SolveError::Backend {
                    message: other.to_string(),
                },
            })?;
        let arcs = vehicles
            .iter()
            .map(|vehicle| {
                vehicle
                    .arcs
                    .iter()
                    .filter(|&(_, &arc)| solution.value(arc) > SELECTED)
                    .map(|(&arc, _)| arc)
                    .collect()
            })
            .collect();
        Ok(Assignment {
            arcs,
            objective: solution.eval(objective),
        })
    }

    fn add_vehicle(&mut self, problem: &Problem, depot: usize, limits: Limits) -> VehicleVars {
        let arcs = problem
            .distances()
            .arcs()
            .map(|(from, to, distance)| {
                let arc = self.variables.add(variable().binary());
                self.objective += distance * arc;
                ((from, to), arc)
            })
            .collect();

        let nodes = (0..problem.node_count())
            .map(|node| {
                let energy = if node == depot {
                    self.variables
                        .add(variable().min(limits.battery).max(limits.battery))
                } else {
                    self.variables
                        .add(variable().min(limits.min_energy).max(limits.battery))
                };
                self.objective += energy;
                let (pickup_max, delivery_max) = if node == depot {
                    (0.0, 0.0)
                } else if let Some(demand) = problem.demand(node) {
                    (demand.pickup, demand.delivery)
                } else {
                    (limits.capacity, limits.capacity)
                };
                NodeVars {
                    energy,
                    load: self
                        .variables
                        .add(variable().min(0.0).max(limits.capacity)),
                    pickup: self
                        .variables
                        .add(variable().integer().min(0.0).max(pickup_max)),
                    delivery: self
                        .variables
                        .add(variable().integer().min(0.0).max(delivery_max)),
                }
            })
            .collect();

        let charging = problem
            .charging()
            .stations
            .iter()
            .map(|station| {
                let time = self.variables.add(variable().min(0.0));
                self.objective += time;
                (station.index, time)
            })
            .collect();

        VehicleVars {
            arcs,
            nodes,
            charging,
        }
    }

    /// Depot departure and return, customer visits and flow conservation.
    ///
    /// Only customers must be entered; station nodes, with or without a
    /// charger, are optional relays. No sub-tour elimination is added.
    fn route_constraints(&mut self, problem: &Problem, depot: usize, vehicle: &VehicleVars) {
        for node in 0..problem.node_count() {
            let inflow = vehicle.inflow(node);
            let outflow = vehicle.outflow(node);
            if node == depot {
                self.constraints
                    .push(constraint::eq(outflow, constant(1.0)));
                self.constraints.push(constraint::eq(inflow, constant(1.0)));
                continue;
            }
            if !vehicle.touches(node) {
                continue;
            }
            if problem.demands().contains_key(&node) {
                self.constraints
                    .push(constraint::geq(inflow.clone(), constant(1.0)));
            }
            self.constraints.push(constraint::eq(inflow, outflow));
        }
    }

    /// Energy, cargo and load updates along every arc that leaves a node
    /// other than towards the depot.
    fn transition_constraints(
        &mut self,
        problem: &Problem,
        depot: usize,
        limits: Limits,
        vehicle: &VehicleVars,
    ) {
        let cargo_m = 3.0 * limits.cargo;
        for (&(from, to), &arc) in &vehicle.arcs {
            if to == depot {
                continue;
            }
            let (Some(&tail), Some(&head)) = (vehicle.nodes.get(from), vehicle.nodes.get(to))
            else {
                continue;
            };
            let consumption = limits.energy_rate * problem.distances().get(from, to);

            // Billed on the load held at the tail of the arc.
            self.pin_when_selected(
                Expression::from(head.energy) - tail.energy + consumption * tail.load,
                arc,
                limits.battery + consumption * limits.capacity,
            );

            let demand = problem.demand(to).unwrap_or_default();
            let (picked, delivered) = if demand.pickup > 0.0 || demand.delivery > 0.0 {
                let gate = self.energy_gate(tail, consumption, limits);
                let space = constant(limits.capacity) - tail.pickup;
                (
                    self.transfer(demand.pickup, space, gate, limits),
                    self.transfer(demand.delivery, Expression::from(tail.pickup), gate, limits),
                )
            } else {
                (constant(0.0), constant(0.0))
            };

            self.pin_when_selected(
                Expression::from(head.pickup) - tail.pickup - picked,
                arc,
                cargo_m,
            );
            self.pin_when_selected(
                Expression::from(head.delivery) - tail.delivery - delivered,
                arc,
                cargo_m,
            );
            self.pin_when_selected(
                Expression::from(head.load) - tail.load - head.pickup + head.delivery,
                arc,
                cargo_m,
            );
        }
    }

    /// Charging time is the energy deficit on arrival over the charging rate.
    fn charging_constraints(&mut self, problem: &Problem, limits: Limits, vehicle: &VehicleVars) {
        let rate = problem.charging().charging_rate;
        for (&station, &time) in &vehicle.charging {
            let Some(node) = vehicle.nodes.get(station) else {
                continue;
            };
            self.constraints.push(constraint::eq(
                rate * time + node.energy,
                constant(limits.battery),
            ));
        }
    }

    /// Bounds the summed charging time at each station by its port count.
    fn port_constraints(&mut self, problem: &Problem) {
        for station in &problem.charging().stations {
            let total = self
                .vehicles
                .iter()
                .filter_map(|vehicle| vehicle.charging.get(&station.index))
                .fold(constant(0.0), |sum, &time| sum + time);
            self.constraints.push(constraint::leq(
                total,
                constant(f64::from(station.max_ports)),
            ));
        }
    }

    /// `expression == 0` whenever `arc` is selected.
    fn pin_when_selected(&mut self, expression: Expression, arc: Variable, big_m: f64) {
        let slack = constant(big_m) - big_m * arc;
        self.constraints
            .push(constraint::leq(expression.clone(), slack.clone()));
        self.constraints
            .push(constraint::geq(expression + slack, constant(0.0)));
    }

    /// Binary that is one exactly when leaving `tail` with its cumulative
    /// pickup aboard keeps energy at or above the threshold.
    fn energy_gate(&mut self, tail: NodeVars, consumption: f64, limits: Limits) -> Variable {
        let gate = self.variables.add(variable().binary());
        let margin =
            Expression::from(tail.energy) - consumption * tail.pickup - limits.min_energy;
        let below = consumption * limits.cargo;
        let above = limits.battery - limits.min_energy + GATE_EPSILON;
        self.constraints.push(constraint::geq(
            margin.clone(),
            constant(-below) + below * gate,
        ));
        self.constraints.push(constraint::leq(
            margin,
            above * gate - GATE_EPSILON,
        ));
        gate
    }

    /// `min(requested, space)` when `gate` is open, zero otherwise.
    fn transfer(
        &mut self,
        requested: f64,
        space: Expression,
        gate: Variable,
        limits: Limits,
    ) -> Expression {
        if requested <= 0.0 {
            return constant(0.0);
        }
        let big_m = requested + limits.cargo + limits.capacity;
        let smaller = self
            .variables
            .add(variable().min(-limits.cargo).max(requested));
        let request_binds = self.variables.add(variable().binary());
        self.constraints
            .push(constraint::leq(Expression::from(smaller), space.clone()));
        self.constraints.push(constraint::geq(
            Expression::from(smaller),
            constant(requested - big_m) + big_m * request_binds,
        ));
        self.constraints.push(constraint::geq(
            Expression::from(smaller),
            space - big_m * request_binds,
        ));

        let granted = self
            .variables
            .add(variable().min(-limits.cargo).max(requested));
        self.pin_when_selected(Expression::from(granted) - smaller, gate, big_m);
        self.constraints.push(constraint::leq(
            Expression::from(granted),
            requested * gate,
        ));
        self.constraints.push(constraint::geq(
            Expression::from(granted),
            -limits.cargo * gate,
        ));
        Expression::from(granted)
    }
}

fn constant(value: f64) -> Expression {
    Expression::from(value)
}

fn ensure_whole_demands(problem: &Problem) -> Result<(), ValidationError> {
    if let Some(&node) = problem
        .demands()
        .iter()
        .find(|(_, demand)| demand.pickup.fract() > 0.0 || demand.delivery.fract() > 0.0)
        .map(|(node, _)| node)
    {
        return Err(ValidationError::FractionalDemand {
            id: problem.label(node).unwrap_or_default().to_owned(),
        });
    }
    Ok(())
}

fn ensure_reachable(problem: &Problem, depot: usize) -> Result<(), SolveError> {
    let distances = problem.distances();
    let nodes = problem.node_count();
    if !(0..nodes).any(|to| distances.has_arc(depot, to)) {
        log::debug!("depot has no outgoing arc");
        return Err(SolveError::Infeasible);
    }
    if let Some(stranded) = problem
        .customers()
        .find(|&customer| !(0..nodes).any(|from| distances.has_arc(from, customer)))
    {
        log::debug!(
            "customer {} has no incoming arc",
            problem.label(stranded).unwrap_or_default()
        );
        return Err(SolveError::Infeasible);
    }
    Ok(())
}
