//! Injectable randomness and time

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};

/// Source of every random draw the operations make.
///
/// Any `rand` generator qualifies; tests use a seeded `StdRng`.
pub trait RandomSource: Send {
    /// Uniform float in [0, 1)
    fn unit(&mut self) -> f64;

    /// Uniform index in [0, n); `n` must be positive
    fn below(&mut self, n: usize) -> usize;

    /// Uniform ASCII letter or digit
    fn alphanumeric(&mut self) -> char;
}

impl<R: RngCore + Send> RandomSource for R {
    fn unit(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn below(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }

    fn alphanumeric(&mut self) -> char {
        char::from(self.sample(Alphanumeric))
    }
}

impl dyn RandomSource + '_ {
    /// True with the given probability
    pub fn chance(&mut self, probability: f64) -> bool {
        self.unit() < probability
    }

    /// Uniform value in [0, n); `n` must be positive
    pub fn below_u32(&mut self, n: u32) -> u32 {
        u32::try_from(self.below(n as usize)).unwrap_or(0)
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

/// Wall-clock abstraction
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_seeded_sources_agree() {
        let mut a = StdRng::seed_from_u64(11);
        let mut b = StdRng::seed_from_u64(11);
        let a: &mut dyn RandomSource = &mut a;
        let b: &mut dyn RandomSource = &mut b;
        for _ in 0..32 {
            assert_eq!(a.below(9), b.below(9));
            assert_eq!(a.alphanumeric(), b.alphanumeric());
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = StdRng::seed_from_u64(3);
        let rng: &mut dyn RandomSource = &mut rng;
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_pick_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let rng: &mut dyn RandomSource = &mut rng;
        let items = [1, 2, 3];
        for _ in 0..100 {
            assert!(items.contains(rng.pick(&items)));
        }
    }

    #[test]
    fn test_below_u32_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(8);
        let rng: &mut dyn RandomSource = &mut rng;
        let drawn: Vec<u32> = (0..200).map(|_| rng.below_u32(7)).collect();
        assert!(drawn.iter().all(|h| *h < 7));
        assert!(drawn.contains(&0) && drawn.contains(&6));
    }
}
