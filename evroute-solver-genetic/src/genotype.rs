//! Partition genotype and its variation operators.
//!
//! An [`Individual`] assigns every customer to exactly one vehicle, in visiting
//! order. Both operators work on the flattened customer sequence and then cut
//! it back into sublists, so every offspring is still a partition of the same
//! customers with one sublist per vehicle.

use rand::Rng;
use rand::seq::SliceRandom;

/// One candidate solution: a visiting order per vehicle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Individual {
    routes: Vec<Vec<usize>>,
}

impl Individual {
    /// Wrap explicit per-vehicle customer lists.
    #[must_use]
    pub const fn new(routes: Vec<Vec<usize>>) -> Self {
        Self { routes }
    }

    /// Shuffle `customers` and cut them into `vehicles` near-equal chunks.
    ///
    /// The first `customers.len() % vehicles` chunks hold one extra customer.
    pub fn random<R: Rng + ?Sized>(customers: &[usize], vehicles: usize, rng: &mut R) -> Self {
        let mut order = customers.to_vec();
        order.shuffle(rng);
        Self::from_sequence(&order, &even_lengths(order.len(), vehicles))
    }

    /// Cut `sequence` into consecutive chunks of the given lengths.
    fn from_sequence(sequence: &[usize], lengths: &[usize]) -> Self {
        let mut rest = sequence;
        let routes = lengths
            .iter()
            .map(|&length| {
                let (head, tail) = rest.split_at(length.min(rest.len()));
                rest = tail;
                head.to_vec()
            })
            .collect();
        Self { routes }
    }

    /// Per-vehicle customer lists.
    #[must_use]
    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    /// Consume into per-vehicle customer lists.
    #[must_use]
    pub fn into_routes(self) -> Vec<Vec<usize>> {
        self.routes
    }

    fn lengths(&self) -> Vec<usize> {
        self.routes.iter().map(Vec::len).collect()
    }

    fn flatten(&self) -> Vec<usize> {
        self.routes.iter().flatten().copied().collect()
    }

    /// Order-preserving two-point crossover.
    ///
    /// Each child keeps one parent's genes between two cut points and takes
    /// the remaining customers in the other parent's order. Children keep the
    /// sublist lengths of the parent whose segment they inherit.
    pub fn crossover<R: Rng + ?Sized>(&mut self, other: &mut Self, rng: &mut R) {
        let first = self.flatten();
        let second = other.flatten();
        let size = first.len().min(second.len());
        if size < 2 {
            return;
        }
        let (start, end) = two_points(size, rng);
        let child_first = ordered_child(&first, &second, start, end);
        let child_second = ordered_child(&second, &first, start, end);
        *self = Self::from_sequence(&child_first, &self.lengths());
        *other = Self::from_sequence(&child_second, &other.lengths());
    }

    /// Swap each position with a random other position with probability
    /// `gene_probability`, keeping sublist lengths.
    pub fn mutate<R: Rng + ?Sized>(&mut self, gene_probability: f64, rng: &mut R) {
        let mut sequence = self.flatten();
        let size = sequence.len();
        if size < 2 {
            return;
        }
        for position in 0..size {
            if rng.r#gen::<f64>() < gene_probability {
                let mut partner = rng.gen_range(0..size - 1);
                if partner >= position {
                    partner += 1;
                }
                sequence.swap(position, partner);
            }
        }
        *self = Self::from_sequence(&sequence, &self.lengths());
    }
}

/// Chunk lengths that deal `count` items across `slots` as evenly as possible.
fn even_lengths(count: usize, slots: usize) -> Vec<usize> {
    let mut lengths = vec![0; slots];
    if slots == 0 {
        return lengths;
    }
    for slot in (0..slots).cycle().take(count) {
        if let Some(length) = lengths.get_mut(slot) {
            *length += 1;
        }
    }
    lengths
}

/// Two distinct cut points `start < end` within `1..=size`.
fn two_points<R: Rng + ?Sized>(size: usize, rng: &mut R) -> (usize, usize) {
    let first = rng.gen_range(1..=size);
    let mut second = rng.gen_range(1..size);
    if second >= first {
        second += 1;
    }
    if first < second {
        (first, second)
    } else {
        (second, first)
    }
}

/// Keep `keeper[start..end]` in place and fill the other positions with the
/// genes of `donor` in donor order.
fn ordered_child(keeper: &[usize], donor: &[usize], start: usize, end: usize) -> Vec<usize> {
    let kept = keeper.get(start..end).unwrap_or_default();
    let mut fill = donor.iter().copied().filter(|gene| !kept.contains(gene));
    keeper
        .iter()
        .enumerate()
        .map(|(position, &gene)| {
            if (start..end).contains(&position) {
                gene
            } else {
                fill.next().unwrap_or(gene)
            }
        })
        .collect()
}
