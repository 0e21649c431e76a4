//! Monte Carlo simulation of periodic-review (M, N) inventory policies.
//!
//! Every `N` days the stock position is reviewed and topped up to `M`. Demand and
//! supplier lead time are random, so each policy is run over many independent
//! replications and compared on cost and service level.

pub mod error;
pub mod io;
pub mod model;
pub mod simulation;
pub mod strategy;

pub use error::{SimError, SimResult};
pub use model::distribution::{DistributionSpec, Sampler};
pub use model::inventory::ShortageMode;
pub use model::orders::OpenOrder;
pub use simulation::comparison::{
    cheapest, comparison_rows, ComparisonRow, NamedPolicy, PolicyCatalog, PolicyComparator,
    PolicyComparison,
};
pub use simulation::config::{CostOverrides, CostParameters, PolicyParameters, SimulationConfig};
pub use simulation::engine::{DayRecord, ReplicationResult, ReplicationSimulator};
pub use simulation::monte_carlo::{derive_seed, summarize, MonteCarloRunner, SimulationSummary};
