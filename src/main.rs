//! Fairbid - Main binary
//!
//! Runs a decentralized auction for capacity allocation: agents bid for
//! tasks, gossip their winning lists over a fixed neighbor graph, and settle
//! on one winner per task with no central coordinator.
//!
//! A run is described by a YAML scenario (agents, links, arrival timeline);
//! without one, a built-in two-agent demo runs. The final winning list of
//! every agent is printed as a table, the way each agent locally believes
//! the allocation ended up.

mod config;

use std::time::Instant;

use clap::Parser;
use simulation::Simulation;
use tracing::info;

pub use config::{AgentSpec, ArrivalSpec, ScenarioConfig, TaskSpec};

/// Fairbid - decentralized auction-based task allocation
#[derive(Parser, Debug)]
#[command(name = "fairbid")]
#[command(about = "Auction-based task allocation over a gossip network")]
#[command(version)]
struct Args {
    /// Path to a YAML scenario file (omit to run the built-in demo)
    #[arg(long, env = "FAIRBID_CONFIG")]
    config: Option<String>,

    /// Override the scenario's duration in ticks
    #[arg(long, env = "FAIRBID_DURATION")]
    duration: Option<u64>,

    /// Override the scenario's master seed
    #[arg(long, env = "FAIRBID_SEED")]
    seed: Option<u64>,

    /// Override the scenario's gossip rounds per tick
    #[arg(long)]
    rounds_per_tick: Option<u32>,

    /// Run the full duration even after beliefs settle
    #[arg(long)]
    run_to_end: bool,

    /// Debug-level protocol logging
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    // ─────────────────────────────────────────────────────────────────────────
    // Load scenario with CLI/env overrides
    // ─────────────────────────────────────────────────────────────────────────
    let mut scenario = match &args.config {
        Some(path) => {
            info!("loading scenario from {}", path);
            ScenarioConfig::load(path)?
        }
        None => ScenarioConfig::demo(),
    };

    if let Some(duration) = args.duration {
        scenario.duration = duration;
    }
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    if let Some(rounds) = args.rounds_per_tick {
        scenario.rounds_per_tick = rounds;
    }
    if args.run_to_end {
        scenario.stop_on_convergence = false;
    }

    print_scenario_banner(&scenario, args.config.as_deref());

    // ─────────────────────────────────────────────────────────────────────────
    // Build and run
    // ─────────────────────────────────────────────────────────────────────────
    let mut sim = scenario.build()?;
    let start = Instant::now();
    sim.run()?;
    let elapsed = start.elapsed();

    // ─────────────────────────────────────────────────────────────────────────
    // Report
    // ─────────────────────────────────────────────────────────────────────────
    for bidder in sim.agents() {
        print_winning_list(bidder);
    }
    print_run_summary(&sim, elapsed.as_secs_f64());

    Ok(())
}

fn print_scenario_banner(scenario: &ScenarioConfig, path: Option<&str>) {
    eprintln!("╔════════════════════════════════════════════════════════════╗");
    eprintln!(
        "║  Fairbid - {:<48}║",
        path.unwrap_or("built-in demo scenario")
    );
    eprintln!("╠════════════════════════════════════════════════════════════╣");
    eprintln!(
        "║  Agents: {:4}  │  Links: {:4}  │  Arrivals: {:4}            ║",
        scenario.agents.len(),
        scenario.links.len(),
        scenario.arrivals.len()
    );
    eprintln!(
        "║  Ticks:  {:4}  │  Seed: {:5}  │  Rounds/tick: {:2}           ║",
        scenario.duration, scenario.seed, scenario.rounds_per_tick
    );
    eprintln!("╚════════════════════════════════════════════════════════════╝");
    eprintln!();
}

/// Print one agent's winning list as a table.
///
/// Mirrors what the agent locally believes: each row is a task it has heard
/// of, the agent it thinks won, the winning price, and the tick the winning
/// bid was placed at.
fn print_winning_list(bidder: &auction::Bidder) {
    eprintln!("Winning list of {}", bidder.id());

    let rows: Vec<(String, String, String, String)> = bidder
        .winning_list()
        .iter()
        .map(|(task, bid)| {
            (
                task.clone(),
                bid.agent().to_string(),
                format!("{:.4}", bid.price().to_float()),
                bid.placed_at().to_string(),
            )
        })
        .collect();

    let mut widths = ["Task".len(), "Winner".len(), "Price".len(), "Placed".len()];
    for (task, winner, price, placed) in &rows {
        widths[0] = widths[0].max(task.len());
        widths[1] = widths[1].max(winner.len());
        widths[2] = widths[2].max(price.len());
        widths[3] = widths[3].max(placed.len());
    }

    let rule = |left: &str, mid: &str, right: &str| {
        eprintln!(
            "{}{}{}{}{}{}{}{}{}",
            left,
            "─".repeat(widths[0] + 2),
            mid,
            "─".repeat(widths[1] + 2),
            mid,
            "─".repeat(widths[2] + 2),
            mid,
            "─".repeat(widths[3] + 2),
            right
        );
    };

    rule("┌", "┬", "┐");
    eprintln!(
        "│ {:w0$} │ {:w1$} │ {:w2$} │ {:w3$} │",
        "Task",
        "Winner",
        "Price",
        "Placed",
        w0 = widths[0],
        w1 = widths[1],
        w2 = widths[2],
        w3 = widths[3]
    );
    rule("├", "┼", "┤");
    for (task, winner, price, placed) in &rows {
        eprintln!(
            "│ {:w0$} │ {:w1$} │ {:>w2$} │ {:>w3$} │",
            task,
            winner,
            price,
            placed,
            w0 = widths[0],
            w1 = widths[1],
            w2 = widths[2],
            w3 = widths[3]
        );
    }
    rule("└", "┴", "┘");
    eprintln!();
}

fn print_run_summary(sim: &Simulation, elapsed_secs: f64) {
    let stats = sim.stats();
    eprintln!("╔════════════════════════════════════════════════════════════╗");
    eprintln!(
        "║  Run complete{:<47}║",
        if sim.is_converged() {
            " (converged)"
        } else {
            ""
        }
    );
    eprintln!("╠════════════════════════════════════════════════════════════╣");
    eprintln!(
        "║  Ticks: {:6}  │  Arrivals: {:5}  │  Elapsed: {:7.3}s     ║",
        stats.ticks_run, stats.tasks_arrived, elapsed_secs
    );
    eprintln!(
        "║  Bids: {:7}  │  Messages: {:5}                           ║",
        stats.bids_placed, stats.messages_sent
    );
    eprintln!(
        "║  Adoptions: {:5}  │  Raises: {:5}  │  Concessions: {:5}   ║",
        stats.adoptions, stats.raises, stats.concessions
    );
    eprintln!("╚════════════════════════════════════════════════════════════╝");
}
