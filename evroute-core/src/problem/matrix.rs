//! Dense symmetric distance matrix built from the edge list.

/// Direct distances between every pair of nodes.
///
/// The diagonal is zero and pairs without an edge are `f64::INFINITY`. The
/// matrix is not a transitive closure: multi-hop costs must be searched for.
///
/// # Examples
/// ```
/// use evroute_core::DistanceMatrix;
///
/// let mut matrix = DistanceMatrix::new(3);
/// matrix.set_symmetric(0, 2, 4.0);
/// assert_eq!(matrix.get(2, 0), 4.0);
/// assert!(matrix.get(0, 1).is_infinite());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Create an `size` x `size` matrix with no connections.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let mut values = vec![f64::INFINITY; size.saturating_mul(size)];
        for i in 0..size {
            if let Some(cell) = values.get_mut(i * size + i) {
                *cell = 0.0;
            }
        }
        Self { size, values }
    }

    /// Number of nodes covered by the matrix.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether the matrix covers no nodes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Record an undirected edge. Later edges overwrite earlier ones.
    ///
    /// Self-loops are ignored so the diagonal stays zero.
    pub fn set_symmetric(&mut self, i: usize, j: usize, distance: f64) {
        if i == j || i >= self.size || j >= self.size {
            return;
        }
        for (row, col) in [(i, j), (j, i)] {
            if let Some(cell) = self.values.get_mut(row * self.size + col) {
                *cell = distance;
            }
        }
    }

    /// Direct distance from `i` to `j`; infinite when unconnected or out of range.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        if i >= self.size || j >= self.size {
            return f64::INFINITY;
        }
        self.values
            .get(i * self.size + j)
            .copied()
            .unwrap_or(f64::INFINITY)
    }

    /// Whether a direct edge with positive length joins `i` and `j`.
    ///
    /// Zero-length edges between distinct nodes are not traversable arcs.
    #[must_use]
    pub fn has_arc(&self, i: usize, j: usize) -> bool {
        let distance = self.get(i, j);
        i != j && distance.is_finite() && distance > 0.0
    }

    /// Nodes directly reachable from `i`, with their distances, in index order.
    pub fn neighbours(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..self.size)
            .filter(move |&j| j != i)
            .map(move |j| (j, self.get(i, j)))
            .filter(|(_, distance)| distance.is_finite())
    }

    /// Every directed arc `(i, j, distance)` as accepted by [`Self::has_arc`].
    pub fn arcs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.size).flat_map(move |i| {
            (0..self.size)
                .filter(move |&j| self.has_arc(i, j))
                .map(move |j| (i, j, self.get(i, j)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn new_matrix_has_zero_diagonal() {
        let matrix = DistanceMatrix::new(3);
        for i in 0..3 {
            assert!(matrix.get(i, i).abs() < f64::EPSILON);
        }
        assert!(matrix.get(0, 1).is_infinite());
    }

    #[rstest]
    fn self_loops_leave_the_diagonal_at_zero() {
        let mut matrix = DistanceMatrix::new(2);
        matrix.set_symmetric(1, 1, 7.0);
        assert!(matrix.get(1, 1).abs() < f64::EPSILON);
        assert_eq!(matrix.arcs().count(), 0);
    }

    #[rstest]
    fn out_of_range_lookups_are_infinite() {
        let matrix = DistanceMatrix::new(2);
        assert!(matrix.get(5, 0).is_infinite());
    }

    #[rstest]
    #[case(0.0, false)]
    #[case(3.0, true)]
    fn arcs_require_positive_length(#[case] distance: f64, #[case] expected: bool) {
        let mut matrix = DistanceMatrix::new(2);
        matrix.set_symmetric(0, 1, distance);
        assert_eq!(matrix.has_arc(0, 1), expected);
        assert_eq!(matrix.arcs().count(), if expected { 2 } else { 0 });
    }

    #[rstest]
    fn neighbours_skip_unconnected_nodes() {
        let mut matrix = DistanceMatrix::new(4);
        matrix.set_symmetric(1, 3, 2.5);
        let neighbours: Vec<_> = matrix.neighbours(1).collect();
        assert_eq!(neighbours, vec![(3, 2.5)]);
    }
}
