// src/model/distribution.rs

use crate::error::{SimError, SimResult};
use rand::distributions::{Uniform, WeightedIndex};
use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when checking that discrete probabilities add up to one.
const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// A distribution family plus its parameters, as it appears in configuration.
///
/// Serialized with a `kind` tag, e.g. `{"kind": "normal", "mean": 10, "std_dev": 2}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DistributionSpec {
    /// Always yields the same value. Zero-variance scenarios use this.
    Constant { value: f64 },
    Normal { mean: f64, std_dev: f64 },
    /// Continuous uniform on `[low, high]`.
    Uniform { low: f64, high: f64 },
    Poisson { mean: f64 },
    /// An empirical table: `values[i]` occurs with `probabilities[i]`.
    Discrete {
        values: Vec<f64>,
        probabilities: Vec<f64>,
    },
}

impl DistributionSpec {
    /// Checks that the parameters lie inside the family's domain.
    pub fn validate(&self) -> SimResult<()> {
        match self {
            DistributionSpec::Constant { value } => {
                if !value.is_finite() {
                    return Err(SimError::distribution("constant value must be finite"));
                }
            }
            DistributionSpec::Normal { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() {
                    return Err(SimError::distribution(
                        "normal mean and std_dev must be finite",
                    ));
                }
                if *std_dev < 0.0 {
                    return Err(SimError::distribution(format!(
                        "normal std_dev must be >= 0, got {}",
                        std_dev
                    )));
                }
            }
            DistributionSpec::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() {
                    return Err(SimError::distribution("uniform bounds must be finite"));
                }
                if low > high {
                    return Err(SimError::distribution(format!(
                        "uniform low ({}) exceeds high ({})",
                        low, high
                    )));
                }
                if !(high - low).is_finite() {
                    return Err(SimError::distribution(format!(
                        "uniform range [{}, {}] is too wide",
                        low, high
                    )));
                }
            }
            DistributionSpec::Poisson { mean } => {
                if !mean.is_finite() || *mean <= 0.0 {
                    return Err(SimError::distribution(format!(
                        "poisson mean must be finite and > 0, got {}",
                        mean
                    )));
                }
            }
            DistributionSpec::Discrete {
                values,
                probabilities,
            } => {
                if values.is_empty() {
                    return Err(SimError::distribution("discrete table has no values"));
                }
                if values.len() != probabilities.len() {
                    return Err(SimError::distribution(format!(
                        "discrete table has {} values but {} probabilities",
                        values.len(),
                        probabilities.len()
                    )));
                }
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(SimError::distribution("discrete values must be finite"));
                }
                if probabilities.iter().any(|p| !p.is_finite() || *p < 0.0) {
                    return Err(SimError::distribution(
                        "discrete probabilities must be finite and >= 0",
                    ));
                }
                let total: f64 = probabilities.iter().sum();
                if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
                    return Err(SimError::distribution(format!(
                        "discrete probabilities sum to {}, expected 1",
                        total
                    )));
                }
            }
        }
        Ok(())
    }

    /// Mean of the unclamped distribution.
    pub fn mean(&self) -> f64 {
        match self {
            DistributionSpec::Constant { value } => *value,
            DistributionSpec::Normal { mean, .. } => *mean,
            DistributionSpec::Uniform { low, high } => (low + high) / 2.0,
            DistributionSpec::Poisson { mean } => *mean,
            DistributionSpec::Discrete {
                values,
                probabilities,
            } => values
                .iter()
                .zip(probabilities)
                .map(|(v, p)| v * p)
                .sum(),
        }
    }
}

impl fmt::Display for DistributionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistributionSpec::Constant { value } => write!(f, "constant({})", value),
            DistributionSpec::Normal { mean, std_dev } => {
                write!(f, "normal(mean={}, sd={})", mean, std_dev)
            }
            DistributionSpec::Uniform { low, high } => write!(f, "uniform[{}, {}]", low, high),
            DistributionSpec::Poisson { mean } => write!(f, "poisson({})", mean),
            DistributionSpec::Discrete { values, .. } => {
                write!(f, "discrete({} outcomes)", values.len())
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Kernel {
    Constant(f64),
    Normal(Normal<f64>),
    Uniform(Uniform<f64>),
    Poisson(Poisson<f64>),
    Discrete {
        values: Vec<f64>,
        index: WeightedIndex<f64>,
    },
}

/// A validated, ready-to-draw distribution that yields whole units.
///
/// Raw draws are rounded to the nearest integer and then clamped at `floor`.
/// Mass below the floor piles up on the floor; nothing is resampled.
#[derive(Debug, Clone)]
pub struct Sampler {
    kernel: Kernel,
    floor: u32,
}

impl Sampler {
    /// Daily demand: never below zero.
    pub fn demand(spec: &DistributionSpec) -> SimResult<Self> {
        Self::with_floor(spec, 0)
    }

    /// Supplier lead time in days: at least one day unless zero lead time is allowed.
    pub fn lead_time(spec: &DistributionSpec, allow_zero: bool) -> SimResult<Self> {
        Self::with_floor(spec, if allow_zero { 0 } else { 1 })
    }

    pub fn with_floor(spec: &DistributionSpec, floor: u32) -> SimResult<Self> {
        spec.validate()?;

        let kernel = match spec {
            DistributionSpec::Constant { value } => Kernel::Constant(*value),
            DistributionSpec::Normal { mean, std_dev } => Kernel::Normal(
                Normal::new(*mean, *std_dev)
                    .map_err(|e| SimError::distribution(format!("normal: {}", e)))?,
            ),
            DistributionSpec::Uniform { low, high } => {
                Kernel::Uniform(Uniform::new_inclusive(*low, *high))
            }
            DistributionSpec::Poisson { mean } => Kernel::Poisson(
                Poisson::new(*mean)
                    .map_err(|e| SimError::distribution(format!("poisson: {}", e)))?,
            ),
            DistributionSpec::Discrete {
                values,
                probabilities,
            } => Kernel::Discrete {
                values: values.clone(),
                index: WeightedIndex::new(probabilities)
                    .map_err(|e| SimError::distribution(format!("discrete: {}", e)))?,
            },
        };

        Ok(Self { kernel, floor })
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    /// One draw straight from the family, before rounding and clamping.
    pub fn raw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.kernel {
            Kernel::Constant(value) => *value,
            Kernel::Normal(normal) => normal.sample(rng),
            Kernel::Uniform(uniform) => uniform.sample(rng),
            Kernel::Poisson(poisson) => poisson.sample(rng),
            Kernel::Discrete { values, index } => values[index.sample(rng)],
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        clamp_draw(self.raw(rng), self.floor)
    }
}

fn clamp_draw(raw: f64, floor: u32) -> u32 {
    let rounded = raw.round();
    // NaN fails this comparison as well
    if !(rounded >= floor as f64) {
        floor
    } else if rounded >= u32::MAX as f64 {
        u32::MAX
    } else {
        rounded as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn constant_always_yields_its_value() {
        let sampler = Sampler::demand(&DistributionSpec::Constant { value: 10.0 }).unwrap();
        let mut rng = rng();
        for _ in 0..20 {
            assert_eq!(sampler.sample(&mut rng), 10);
        }
    }

    #[test]
    fn negative_demand_is_clamped_to_zero() {
        let spec = DistributionSpec::Normal {
            mean: -50.0,
            std_dev: 1.0,
        };
        let sampler = Sampler::demand(&spec).unwrap();
        let mut rng = rng();
        for _ in 0..100 {
            assert!(sampler.raw(&mut rng) < 0.0);
        }
        for _ in 0..100 {
            assert_eq!(sampler.sample(&mut rng), 0);
        }
    }

    #[test]
    fn lead_time_is_at_least_one_day_unless_zero_is_allowed() {
        let spec = DistributionSpec::Constant { value: 0.0 };
        let mut rng = rng();

        let strict = Sampler::lead_time(&spec, false).unwrap();
        assert_eq!(strict.floor(), 1);
        assert_eq!(strict.sample(&mut rng), 1);

        let relaxed = Sampler::lead_time(&spec, true).unwrap();
        assert_eq!(relaxed.sample(&mut rng), 0);
    }

    #[test]
    fn draws_are_rounded_to_whole_units() {
        assert_eq!(clamp_draw(2.4, 0), 2);
        assert_eq!(clamp_draw(2.5, 0), 3);
        assert_eq!(clamp_draw(-0.4, 0), 0);
        assert_eq!(clamp_draw(0.6, 1), 1);
        assert_eq!(clamp_draw(f64::NAN, 1), 1);
    }

    #[test]
    fn discrete_draws_only_listed_values() {
        let spec = DistributionSpec::Discrete {
            values: vec![1.0, 2.0, 3.0],
            probabilities: vec![0.6, 0.3, 0.1],
        };
        let sampler = Sampler::lead_time(&spec, false).unwrap();
        let mut rng = rng();
        let mut seen = [0usize; 4];
        for _ in 0..2_000 {
            let value = sampler.sample(&mut rng) as usize;
            assert!((1..=3).contains(&value));
            seen[value] += 1;
        }
        // 60% weight on one day should dominate
        assert!(seen[1] > seen[2] && seen[2] > seen[3]);
    }

    #[test]
    fn uniform_stays_inside_bounds() {
        let sampler = Sampler::demand(&DistributionSpec::Uniform {
            low: 2.0,
            high: 6.0,
        })
        .unwrap();
        let mut rng = rng();
        for _ in 0..500 {
            let d = sampler.sample(&mut rng);
            assert!((2..=6).contains(&d));
        }
    }

    #[test]
    fn poisson_sample_mean_is_close_to_parameter() {
        let sampler = Sampler::demand(&DistributionSpec::Poisson { mean: 4.0 }).unwrap();
        let mut rng = rng();
        let n = 5_000;
        let total: u64 = (0..n).map(|_| sampler.sample(&mut rng) as u64).sum();
        let mean = total as f64 / n as f64;
        assert!((mean - 4.0).abs() < 0.2, "sample mean {}", mean);
    }

    #[test]
    fn same_seed_gives_same_draws() {
        let spec = DistributionSpec::Normal {
            mean: 10.0,
            std_dev: 3.0,
        };
        let sampler = Sampler::demand(&spec).unwrap();
        let mut a = rng();
        let mut b = rng();
        let left: Vec<u32> = (0..50).map(|_| sampler.sample(&mut a)).collect();
        let right: Vec<u32> = (0..50).map(|_| sampler.sample(&mut b)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn out_of_domain_parameters_are_rejected() {
        let bad = vec![
            DistributionSpec::Normal {
                mean: 10.0,
                std_dev: -1.0,
            },
            DistributionSpec::Uniform {
                low: 5.0,
                high: 1.0,
            },
            DistributionSpec::Uniform {
                low: -1e308,
                high: 1e308,
            },
            DistributionSpec::Poisson { mean: 0.0 },
            DistributionSpec::Constant { value: f64::NAN },
            DistributionSpec::Discrete {
                values: vec![1.0, 2.0],
                probabilities: vec![1.0],
            },
            DistributionSpec::Discrete {
                values: vec![1.0, 2.0],
                probabilities: vec![0.5, 0.4],
            },
            DistributionSpec::Discrete {
                values: vec![],
                probabilities: vec![],
            },
        ];
        for spec in bad {
            let err = Sampler::demand(&spec).unwrap_err();
            assert!(
                matches!(err, SimError::InvalidDistribution(_)),
                "{} gave {:?}",
                spec,
                err
            );
        }
    }

    #[test]
    fn spec_mean_matches_family() {
        let spec = DistributionSpec::Discrete {
            values: vec![0.0, 1.0, 2.0, 3.0, 4.0],
            probabilities: vec![0.10, 0.25, 0.35, 0.21, 0.09],
        };
        assert!((spec.mean() - 1.94).abs() < 1e-9);
        assert_eq!(DistributionSpec::Uniform { low: 2.0, high: 4.0 }.mean(), 3.0);
    }

    #[test]
    fn parses_tagged_json() {
        let spec: DistributionSpec =
            serde_json::from_str(r#"{"kind": "normal", "mean": 10.0, "std_dev": 2.5}"#).unwrap();
        assert_eq!(
            spec,
            DistributionSpec::Normal {
                mean: 10.0,
                std_dev: 2.5
            }
        );
    }
}
