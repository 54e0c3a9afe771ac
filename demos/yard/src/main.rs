//! yard — the enroute hauling planner on a small construction yard.
//!
//! Three workers run construction and delivery jobs.  Whenever a job
//! starts, the planner looks for loose material it can drop into storage on
//! the way; deliveries out of low-priority storage are first staged in
//! better storage nearer the site.  Every planned haul is logged, and a
//! summary of where each stack ended up is printed at the end.
//!
//! ```text
//! cargo run -p yard -- --settings demos/yard/settings.toml --batch -v
//! RUST_LOG=er_planner=debug cargo run -p yard
//! ```

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use er_core::{AgentId, ItemId, PathCheck, PlannerSettings, Tick};
use er_planner::{DetourReason, HaulAction, HaulHost};
use er_sim::{BatchExtension, SimBuilder, SimObserver, Task};
use er_storage::{StoragePriority, StorageView};

use scenario::{build_yard, kind_name};

// ── Command line ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "yard")]
#[command(about = "Run the enroute hauling planner on a small construction yard")]
struct Args {
    /// Planner settings TOML file; built-in defaults when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Install the inventory-batch extension
    #[arg(long)]
    batch: bool,

    /// Check detours with path costs instead of region reachability
    #[arg(long)]
    pathfinding: bool,

    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct HaulLog {
    opportunities: usize,
    before_carry:  usize,
    finished:      usize,
}

impl SimObserver for HaulLog {
    fn on_action(&mut self, tick: Tick, action: &HaulAction) {
        match action.reason {
            DetourReason::Opportunity => self.opportunities += 1,
            DetourReason::BeforeCarry => self.before_carry += 1,
        }
        info!(
            %tick,
            agent = %action.agent,
            item = %action.item,
            from = %action.from,
            to = %action.store_cell,
            reason = %action.reason,
            "haul planned"
        );
    }

    fn on_task_finished(&mut self, tick: Tick, agent: AgentId, task: &Task) {
        self.finished += 1;
        info!(%tick, %agent, task = %task.describe(), "task finished");
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        info!(%final_tick, "simulation finished");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match args.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let mut settings = match &args.settings {
        Some(path) => PlannerSettings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => PlannerSettings::default(),
    };
    if args.pathfinding {
        settings.path_check = PathCheck::Pathfinding;
    }

    println!("=== yard — enroute hauling planner ===");
    println!("Ticks: {}  |  Batch: {}  |  Path check: {:?}", args.ticks, args.batch, settings.path_check);
    println!();

    let (world, tasks) = build_yard()?;
    let mut builder = SimBuilder::new(world, settings).end_tick(Tick(args.ticks));
    if args.batch {
        builder = builder.inventory_batch(BatchExtension::default());
    }
    for (agent, task) in tasks {
        builder = builder.task(agent, task);
    }
    let mut sim = builder.build()?;

    let mut log = HaulLog::default();
    sim.run(&mut log)?;

    // ── Summary ───────────────────────────────────────────────────────────
    println!("Hauls planned: {} opportunistic, {} before-carry", log.opportunities, log.before_carry);
    println!("Tasks finished: {}", log.finished);
    println!();
    println!("{:<10} {:<7} {:<10} {}", "item", "kind", "where", "storage");
    for i in 0..sim.world.item_count() {
        let Some(item) = sim.world.item(ItemId::from_index(i)) else {
            continue;
        };
        let priority = sim.world.storage().current_priority_of(&item);
        let place = item.position().map_or_else(|| "held".to_owned(), |c| c.to_string());
        let stored = if priority == StoragePriority::Unstored { "-".to_owned() } else { priority.to_string() };
        println!("{:<10} {:<7} {:<10} {}", item.id.to_string(), kind_name(item.kind), place, stored);
    }
    println!();
    for i in 0..sim.world.agent_count() {
        let agent = AgentId::from_index(i);
        let status = sim.report(agent).unwrap_or_else(|| "idle".to_owned());
        println!("{agent}: {status}");
    }
    Ok(())
}
