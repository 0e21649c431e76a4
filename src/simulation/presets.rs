// src/simulation/presets.rs

use crate::simulation::comparison::{NamedPolicy, PolicyCatalog};
use crate::simulation::config::{PolicyParameters, DEFAULT_CYCLES};

/// The four classroom policies as (label, M, N).
pub const PRESET_POLICIES: [(&str, u32, u32); 4] = [
    ("Policy A", 11, 5),
    ("Policy B", 11, 6),
    ("Policy C", 12, 5),
    ("Policy D", 12, 6),
];

/// Presets A-D on top of `base`, each run for `cycles` of its own review interval.
pub fn preset_catalog(base: &PolicyParameters, cycles: u32) -> PolicyCatalog {
    let policies = PRESET_POLICIES
        .iter()
        .map(|&(label, m, n)| {
            let parameters = PolicyParameters {
                review_interval: n,
                order_up_to: m,
                ..base.clone()
            }
            .with_cycles(cycles);
            NamedPolicy::new(format!("{} (M={}, N={})", label, m, n), parameters)
        })
        .collect();
    PolicyCatalog::new(policies)
}

/// A user-chosen (M, N) on top of `base`, run for `cycles` of its review interval.
pub fn custom_policy(base: &PolicyParameters, order_up_to: u32, review_interval: u32, cycles: u32) -> NamedPolicy {
    let parameters = PolicyParameters {
        review_interval,
        order_up_to,
        ..base.clone()
    }
    .with_cycles(cycles);
    NamedPolicy::new(
        format!("Custom (M={}, N={})", order_up_to, review_interval),
        parameters,
    )
}

/// Presets A-D on the default scenario.
pub fn default_catalog() -> PolicyCatalog {
    preset_catalog(&PolicyParameters::default(), DEFAULT_CYCLES)
}
