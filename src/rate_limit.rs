use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng as _, SeedableRng as _};

use crate::config::{ConfigError, DelayRange};

/// Blocks before each request for a random delay within the configured range.
#[derive(Debug)]
pub struct RateLimiter {
    min: Duration,
    max: Duration,
    rng: SmallRng,
}

impl RateLimiter {
    pub fn new(range: DelayRange) -> Result<Self, ConfigError> {
        Self::with_rng(range, SmallRng::from_entropy())
    }

    pub fn seeded(range: DelayRange, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(range, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(range: DelayRange, rng: SmallRng) -> Result<Self, ConfigError> {
        let (min, max) = range.bounds()?;
        Ok(Self { min, max, rng })
    }

    pub fn bounds(&self) -> (Duration, Duration) {
        (self.min, self.max)
    }

    pub fn sample(&mut self) -> Duration {
        self.rng.gen_range(self.min..=self.max)
    }

    pub fn wait(&mut self) -> Duration {
        let delay = self.sample();
        tracing::debug!(?delay, "rate limit delay");
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        delay
    }
}
