use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Orders a tier of invigilation candidates.
pub trait PoolShuffler {
    fn shuffle(&mut self, names: &mut [String]);
}

/// Uniform shuffle backed by `StdRng`; seed it to make pools reproducible.
#[derive(Debug, Clone)]
pub struct RandomShuffler {
    rng: StdRng,
}

impl RandomShuffler {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl PoolShuffler for RandomShuffler {
    fn shuffle(&mut self, names: &mut [String]) {
        names.shuffle(&mut self.rng);
    }
}

/// Leaves each tier in roster order.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreserveOrder;

impl PoolShuffler for PreserveOrder {
    fn shuffle(&mut self, _names: &mut [String]) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        (0..12).map(|index| format!("Teacher {index}")).collect()
    }

    #[test]
    fn seeded_shuffles_are_reproducible() {
        let mut first = names();
        let mut second = names();
        RandomShuffler::seeded(7).shuffle(&mut first);
        RandomShuffler::seeded(7).shuffle(&mut second);
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        let mut expected = names();
        expected.sort();
        assert_eq!(sorted, expected, "shuffle keeps the same members");
    }

    #[test]
    fn preserve_order_is_identity() {
        let mut shuffled = names();
        PreserveOrder.shuffle(&mut shuffled);
        assert_eq!(shuffled, names());
    }
}
