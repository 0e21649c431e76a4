use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use periodic_review_sim::io::reporting;
use periodic_review_sim::io::scenario::load_scenario;
use periodic_review_sim::simulation::config::{CostOverrides, DEFAULT_CYCLES};
use periodic_review_sim::simulation::presets::{custom_policy, preset_catalog};
use periodic_review_sim::{
    cheapest, comparison_rows, derive_seed, MonteCarloRunner, PolicyCatalog, PolicyComparator,
    PolicyParameters, ReplicationSimulator, ShortageMode,
};
use std::path::PathBuf;

/// Compare (M, N) periodic-review inventory policies by Monte Carlo simulation.
#[derive(Parser, Debug)]
#[command(name = "periodic-review-sim", version)]
struct Args {
    /// JSON scenario file; the preset policies A-D are used when omitted.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Replications per policy.
    #[arg(short, long)]
    replications: Option<u32>,

    /// Master seed; every replication seed is derived from it.
    #[arg(long)]
    seed: Option<u64>,

    /// Review cycles per run (presets only).
    #[arg(long, default_value_t = DEFAULT_CYCLES)]
    cycles: u32,

    /// Also run a custom policy with this order-up-to level M and review interval N.
    #[arg(long, num_args = 2, value_names = ["M", "N"])]
    custom: Option<Vec<u32>>,

    /// Holding cost per unit per day.
    #[arg(long)]
    holding: Option<f64>,

    /// Shortage cost per unit per day.
    #[arg(long)]
    shortage: Option<f64>,

    /// Fixed cost per order placed.
    #[arg(long)]
    ordering_cost: Option<f64>,

    /// Purchasing cost per unit ordered.
    #[arg(long)]
    unit_cost: Option<f64>,

    /// Carry unmet demand as backorders instead of losing it.
    #[arg(long)]
    backorder: bool,

    /// Run on a single thread.
    #[arg(long)]
    sequential: bool,

    /// Print the daily log of the first replication of this policy.
    #[arg(long)]
    inspect: Option<String>,

    /// Write the inspected daily log to this CSV file.
    #[arg(long, requires = "inspect")]
    daily_csv: Option<PathBuf>,

    /// Write the comparison table to this CSV file.
    #[arg(long)]
    summary_csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("=== (M, N) Inventory Policy Simulation ===");

    // 1. SETUP CONFIGURATION
    let (catalog, file_config) = match &args.scenario {
        Some(path) => {
            let scenario = load_scenario(path)
                .with_context(|| format!("loading scenario '{}'", path.display()))?;
            (scenario.catalog(), scenario.simulation)
        }
        None => (preset_catalog(&PolicyParameters::default(), args.cycles), None),
    };
    let catalog: PolicyCatalog = match args.custom.as_deref() {
        Some(&[m, n]) => catalog.with_policy(custom_policy(
            &PolicyParameters::default(),
            m,
            n,
            args.cycles,
        )),
        _ => catalog,
    };
    let overrides = CostOverrides {
        holding: args.holding,
        shortage: args.shortage,
        ordering: args.ordering_cost,
        unit: args.unit_cost,
    };
    let catalog = if overrides.is_empty() {
        catalog
    } else {
        catalog.map_parameters(|p| overrides.apply(&mut p.costs))
    };
    let catalog = if args.backorder {
        catalog.map_parameters(|p| p.shortage_mode = ShortageMode::Backorder)
    } else {
        catalog
    };

    let mut config = file_config.unwrap_or_default();
    if let Some(replications) = args.replications {
        config.replications = replications;
    }
    if let Some(seed) = args.seed {
        config.master_seed = seed;
    }
    if args.sequential {
        config.parallel = false;
    }
    info!(
        "{} policies, {} replications each, master seed {}",
        catalog.len(),
        config.replications,
        config.master_seed
    );

    // 2. RUN ALL POLICIES
    let master_seed = config.master_seed;
    let comparator = PolicyComparator::new(MonteCarloRunner::new(config)?);
    let results = comparator.compare(&catalog)?;
    let rows = comparison_rows(&results);

    // 3. PRINT COMPARISON
    println!("\n{}", reporting::format_comparison_table(&rows));
    if let Some(best) = cheapest(&results) {
        println!(
            "Cheapest policy: {} at {:.2} per cycle (service level {:.2}%)",
            best.name,
            best.summary.mean_cost_per_cycle,
            best.summary.service_level * 100.0
        );
    }
    if let Some(path) = &args.summary_csv {
        reporting::write_comparison(path, &rows)?;
    }

    // 4. INSPECT ONE POLICY
    if let Some(name) = &args.inspect {
        let Some(policy) = catalog.get(name) else {
            bail!(
                "no policy named '{}'; available: {}",
                name,
                catalog.names().join(", ")
            );
        };
        let run = ReplicationSimulator::new(&policy.parameters)?.run(derive_seed(master_seed, 0))?;
        println!("\n=== Daily log: {} (replication 0) ===", policy.name);
        println!("{}", reporting::format_daily_table(&run.days));
        println!("Total cost: {:.2}", run.total_cost);
        if let Some(path) = &args.daily_csv {
            reporting::write_daily_log(path, &run)?;
        }
    }

    Ok(())
}
