//! Odometer-style enumeration of slot candidate assignments.

/// Iterator over every assignment of one candidate index per slot.
///
/// Works like a mixed-radix counter: the last position advances fastest and
/// carries into the previous position when its radix is exhausted. Memory use
/// stays proportional to the number of slots; the full product is never
/// materialized.
#[derive(Debug)]
pub struct Combinations {
    radices: Vec<usize>,
    state: Vec<usize>,
    exhausted: bool,
}

impl Combinations {
    /// Create a counter over the given per-slot candidate counts. An empty
    /// radix list or any zero radix yields no combinations.
    pub fn new(radices: &[usize]) -> Self {
        let exhausted = radices.is_empty() || radices.iter().any(|&radix| radix == 0);
        Self {
            radices: radices.to_vec(),
            state: vec![0; radices.len()],
            exhausted,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let current = self.state.clone();

        self.exhausted = true;
        let mut position = self.state.len();
        while position > 0 {
            position -= 1;
            self.state[position] += 1;
            if self.state[position] < self.radices[position] {
                self.exhausted = false;
                break;
            }
            self.state[position] = 0;
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::Combinations;

    #[test]
    fn enumerates_in_odometer_order_with_last_slot_fastest() {
        let all: Vec<Vec<usize>> = Combinations::new(&[2, 3, 1]).collect();
        assert_eq!(all, vec![
            vec![0, 0, 0],
            vec![0, 1, 0],
            vec![0, 2, 0],
            vec![1, 0, 0],
            vec![1, 1, 0],
            vec![1, 2, 0],
        ]);
    }

    #[test]
    fn single_slot_counts_through_its_candidates() {
        let all: Vec<Vec<usize>> = Combinations::new(&[3]).collect();
        assert_eq!(all, vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn empty_and_zero_radices_yield_nothing() {
        assert_eq!(Combinations::new(&[]).count(), 0);
        assert_eq!(Combinations::new(&[2, 0, 3]).count(), 0);
    }
}
