use rand::{rngs::StdRng, seq::SliceRandom, Rng, RngCore, SeedableRng};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectError {
    #[error("cannot select from an empty candidate list")]
    EmptyInput,
}

/// Seedable randomness for draws.
///
/// The seed is kept alongside the generator so any draw can be replayed.
#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from OS entropy. Used on every production path.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::rngs::OsRng.next_u64())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    pub fn pick_index(&mut self, len: usize) -> Result<usize, SelectError> {
        if len == 0 {
            return Err(SelectError::EmptyInput);
        }
        Ok(self.rng.gen_range(0..len))
    }

    /// Uniform choice among `items`.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, SelectError> {
        let index = self.pick_index(items.len())?;
        Ok(&items[index])
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Shuffled copy; `items` is left untouched.
    pub fn shuffled<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut copy = items.to_vec();
        self.shuffle(&mut copy);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_rejects_empty_input() {
        let mut rng = RngState::from_seed(7);
        let empty: [u32; 0] = [];
        assert_eq!(rng.pick(&empty), Err(SelectError::EmptyInput));
        assert_eq!(rng.pick_index(0), Err(SelectError::EmptyInput));
    }

    #[test]
    fn pick_single_candidate() {
        let mut rng = RngState::from_seed(7);
        assert_eq!(rng.pick(&["only"]), Ok(&"only"));
    }

    #[test]
    fn pick_covers_every_candidate() {
        let mut rng = RngState::from_seed(11);
        let items = [0usize, 1, 2, 3];
        let mut hits = [0u32; 4];
        for _ in 0..4000 {
            hits[*rng.pick(&items).expect("pick")] += 1;
        }
        for count in hits {
            assert!((800..1200).contains(&count), "skewed pick: {hits:?}");
        }
    }

    #[test]
    fn shuffled_keeps_original_and_elements() {
        let mut rng = RngState::from_seed(3);
        let items: Vec<u32> = (0..20).collect();
        let shuffled = rng.shuffled(&items);
        assert_eq!(items, (0..20).collect::<Vec<_>>());
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, items);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RngState::from_seed(42);
        let mut b = RngState::from_seed(42);
        assert_eq!(a.seed(), 42);
        for _ in 0..8 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
        assert_eq!(a.shuffled(&[1, 2, 3, 4, 5]), b.shuffled(&[1, 2, 3, 4, 5]));
    }
}
