//! Build configuration for perfect hash table construction
//!
//! Collects the tunables of the two-level construction: coefficient vector
//! capacity, RNG seeding and the optional resampling cap.

use crate::constants::DEFAULT_COEFFICIENT_CAPACITY;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Configuration parameters for building a perfect hash table
#[derive(Debug, Clone)]
pub struct BuildConfiguration {
    /// Length of every coefficient vector (longest hashed key prefix)
    pub coefficient_capacity: usize,

    /// Seed for coefficient sampling (`None` = seed from OS entropy)
    pub seed: Option<u64>,

    /// Maximum second-level resampling rounds per bucket.
    ///
    /// `None` retries until success. Expected rounds are O(1), but the loop
    /// has no worst-case bound.
    pub max_attempts: Option<u64>,

    /// Log bucket statistics after construction
    pub verbose: bool,
}

impl Default for BuildConfiguration {
    fn default() -> Self {
        Self {
            coefficient_capacity: DEFAULT_COEFFICIENT_CAPACITY,
            seed: None,
            max_attempts: None,
            verbose: true,
        }
    }
}

impl BuildConfiguration {
    /// Create a configuration with a fixed seed, for reproducible layouts
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.coefficient_capacity == 0 {
            return Err("coefficient_capacity must be greater than 0".to_string());
        }

        if self.max_attempts == Some(0) {
            return Err("max_attempts must be greater than 0 when set".to_string());
        }

        Ok(())
    }

    /// Random number generator for coefficient sampling
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Log configuration parameters via tracing
    pub fn print(&self) {
        tracing::info!("Build Configuration:");
        tracing::info!("  coefficient_capacity = {}", self.coefficient_capacity);
        match self.seed {
            Some(seed) => tracing::debug!("  seed = {}", seed),
            None => tracing::debug!("  seed = from entropy"),
        }
        match self.max_attempts {
            Some(cap) => tracing::info!("  max_attempts = {}", cap),
            None => tracing::info!("  max_attempts = unbounded"),
        }
        tracing::debug!("  verbose = {}", self.verbose);
    }
}
