//! CLI entry point: parse/ground a SAS task and either inspect it, evaluate
//! one of the two heuristics on its initial state, or search for a
//! cost-optimal plan.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use classical_heuristics::{Heuristic, HMax, LmCut};
use classical_model::{read_sas_file, Task};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "planner", version, about = "A cost-optimal classical planner over FDR/SAS tasks.")]
struct Args {
    /// Logging level: error, warn, info, debug or trace.
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and ground a task, printing it deterministically for debugging.
    Parse { sas_file: PathBuf },
    /// Print h_max of the initial state.
    Hmax { sas_file: PathBuf },
    /// Print h_LMCUT of the initial state.
    Lmcut { sas_file: PathBuf },
    /// Search for a cost-optimal plan with the given heuristic.
    Plan {
        sas_file: PathBuf,
        heuristic: HeuristicName,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HeuristicName {
    Hmax,
    Lmcut,
}

fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // Usage/argument-count mismatches are not failures: print clap's
            // usage line and exit 0, reserving non-zero exit codes for
            // parse/ground failures below.
            let _ = e.print();
            std::process::exit(0);
        }
    };

    tracing_subscriber::fmt().with_max_level(args.log_level).init();

    match args.command {
        Command::Parse { sas_file } => cmd_parse(&sas_file),
        Command::Hmax { sas_file } => cmd_evaluate(&sas_file, &HMax),
        Command::Lmcut { sas_file } => cmd_evaluate(&sas_file, &LmCut),
        Command::Plan { sas_file, heuristic } => cmd_plan(&sas_file, heuristic),
    }
}

fn ground_task(sas_file: &PathBuf) -> Result<Task> {
    let sas = read_sas_file(sas_file).with_context(|| format!("failed to parse {}", sas_file.display()))?;
    Task::ground(&sas).with_context(|| format!("failed to ground {}", sas_file.display()))
}

fn cmd_parse(sas_file: &PathBuf) -> Result<()> {
    let task = ground_task(sas_file)?;
    info!(num_vars = task.num_vars, num_facts = task.facts.len(), num_operators = task.num_operators(), "task grounded");

    let mut facts: Vec<_> = task.facts.iter().map(|f| task.facts.name_of(f).to_string()).collect();
    facts.sort();
    println!("facts:");
    for name in &facts {
        println!("  {name}");
    }

    let mut initial: Vec<String> = (0..task.num_vars)
        .map(|v| task.facts.name_of(task.initial.get(v.into())).to_string())
        .collect();
    initial.sort();
    println!("initial state:");
    for name in &initial {
        println!("  {name}");
    }

    let mut goal: Vec<String> = task.goal.iter().map(|&(_, f)| task.facts.name_of(f).to_string()).collect();
    goal.sort();
    println!("goal:");
    for name in &goal {
        println!("  {name}");
    }

    let mut operators: Vec<(String, u32)> = task.operators.entries().map(|(_, op)| (op.name.to_string(), op.cost)).collect();
    operators.sort();
    println!("operators:");
    for (name, cost) in &operators {
        println!("  {name} (cost {cost})");
    }

    Ok(())
}

fn cmd_evaluate(sas_file: &PathBuf, heuristic: &impl Heuristic) -> Result<()> {
    let task = ground_task(sas_file)?;
    let h = heuristic.estimate(&task, &task.initial);
    println!("{h}");
    Ok(())
}

fn cmd_plan(sas_file: &PathBuf, heuristic: HeuristicName) -> Result<()> {
    let task = ground_task(sas_file)?;
    let found = match heuristic {
        HeuristicName::Hmax => classical_search::plan(&task, &HMax),
        HeuristicName::Lmcut => classical_search::plan(&task, &LmCut),
    };
    match found {
        Some((ops, cost)) => {
            for op in &ops {
                println!("{op}");
            }
            println!("Plan cost: {cost}");
        }
        None => println!("Plan not found"),
    }
    Ok(())
}
