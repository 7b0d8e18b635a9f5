//! Greedy customer-to-vehicle assignment.

use evroute_core::CustomerDemands;

/// Deal customers to `vehicles` slots in descending order of demand.
///
/// Customers are ranked by `pickup + delivery`, largest first, keeping index
/// order among equal totals, and dealt round-robin. Capacity is not
/// considered, so a slot may receive more demand than a vehicle can carry.
/// With zero vehicles no slots are produced.
///
/// # Examples
/// ```
/// use evroute_core::{CustomerDemands, Demand};
/// use evroute_solver_search::partition_by_demand;
///
/// let demands = CustomerDemands::from([
///     (1, Demand { pickup: 1.0, delivery: 0.0 }),
///     (2, Demand { pickup: 9.0, delivery: 0.0 }),
///     (3, Demand { pickup: 5.0, delivery: 0.0 }),
/// ]);
/// assert_eq!(partition_by_demand(&demands, 2), vec![vec![2, 1], vec![3]]);
/// ```
#[must_use]
pub fn partition_by_demand(demands: &CustomerDemands, vehicles: usize) -> Vec<Vec<usize>> {
    let mut ranked: Vec<_> = demands.iter().map(|(&index, demand)| (index, demand.total())).collect();
    // Stable sort keeps ascending index order among ties.
    ranked.sort_by(|(_, lhs), (_, rhs)| rhs.total_cmp(lhs));

    let mut slots = vec![Vec::new(); vehicles];
    if slots.is_empty() {
        return slots;
    }
    for (customer, slot) in ranked
        .into_iter()
        .map(|(index, _)| index)
        .zip((0..vehicles).cycle())
    {
        if let Some(route) = slots.get_mut(slot) {
            route.push(customer);
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use evroute_core::Demand;
    use rstest::rstest;

    fn demand(total: f64) -> Demand {
        Demand {
            pickup: total,
            delivery: 0.0,
        }
    }

    #[rstest]
    fn equal_totals_keep_index_order() {
        let demands = CustomerDemands::from([(4, demand(3.0)), (2, demand(3.0)), (7, demand(8.0))]);
        assert_eq!(partition_by_demand(&demands, 1), vec![vec![7, 2, 4]]);
    }

    #[rstest]
    fn more_vehicles_than_customers_leaves_empty_slots() {
        let demands = CustomerDemands::from([(1, demand(1.0))]);
        assert_eq!(partition_by_demand(&demands, 3), vec![vec![1], vec![], vec![]]);
    }

    #[rstest]
    fn zero_vehicles_yields_no_slots() {
        let demands = CustomerDemands::from([(1, demand(1.0))]);
        assert!(partition_by_demand(&demands, 0).is_empty());
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn every_customer_is_assigned_once(#[case] vehicles: usize) {
        let demands: CustomerDemands = (1..=9)
            .map(|i| (i, demand(f64::from(u32::try_from(i).unwrap_or(0)))))
            .collect();
        let mut assigned: Vec<_> = partition_by_demand(&demands, vehicles)
            .into_iter()
            .flatten()
            .collect();
        assigned.sort_unstable();
        assert_eq!(assigned, (1..=9).collect::<Vec<_>>());
    }
}
