use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use sched_lite::config::{GeneratorConfig, SimConfig, Workload};
use sched_lite::report::Report;
use sched_lite::scheduler::Policy;
use sched_lite::shutdown::install_shutdown_handler;
use sched_lite::simulation::Simulation;

#[derive(Parser, Debug)]
#[command(name = "sched-lite")]
#[command(version)]
#[command(about = "A multi-policy job scheduler simulation")]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run a simulation and print its report
    Run(RunArgs),
}

// =============================================================================
// Run Arguments
// =============================================================================

#[derive(Parser, Debug)]
struct RunArgs {
    /// Number of simulated servers
    #[arg(long, short = 's', default_value = "3")]
    servers: u64,

    /// Scheduling policy: rr, sjf or priority (unknown values fall back to rr)
    #[arg(long, short = 'p', default_value = "rr")]
    policy: String,

    /// Round-robin quantum, in time units
    #[arg(long, short = 'q', default_value = "2.0")]
    quantum: f64,

    /// Number of jobs to generate and wait for
    #[arg(long, short = 'j', default_value = "20")]
    jobs: usize,

    /// Wall-clock milliseconds per simulated time unit
    #[arg(long, default_value = "100")]
    time_unit_ms: u64,

    /// Seed for the job generator (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

// =============================================================================
// Helper Functions
// =============================================================================

fn build_config(args: &RunArgs) -> SimConfig {
    let generator = GeneratorConfig {
        seed: args.seed,
        ..GeneratorConfig::default()
    };

    SimConfig::new(
        args.servers,
        Policy::from_selector(&args.policy),
        args.quantum,
        args.jobs,
    )
    .with_time_unit(Duration::from_millis(args.time_unit_ms))
    .with_workload(Workload::Generated(generator))
}

fn print_table(report: &Report) {
    println!("Simulation Report");
    println!("{}", "=".repeat(40));
    println!("Policy:            {}", report.policy);
    println!("Servers:           {}", report.server_count);
    println!("Jobs completed:    {}", report.completed);
    println!("Elapsed:           {:.2}", report.elapsed);
    println!("Throughput:        {:.3} jobs/unit", report.throughput);
    println!("Mean turnaround:   {:.2}", report.mean_turnaround);
    println!("Mean response:     {:.2}", report.mean_response);
    println!("Mean waiting:      {:.2}", report.mean_waiting);
    println!("Max waiting:       {:.2}", report.max_waiting);
    println!("CPU utilization:   {:.1}%", report.utilization_percent);
    println!();
    println!("{:<8} BUSY", "SERVER");
    println!("{}", "-".repeat(20));
    for (server_id, busy) in &report.busy_by_server {
        println!("{:<8} {:.2}", server_id, busy);
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

async fn run_simulation(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args);
    let policy = config.policy;
    let server_count = config.server_count;

    let simulation = Simulation::new(config)?;
    let outcome = simulation.run(install_shutdown_handler()).await?;
    let report = Report::compute(&outcome, policy, server_count);

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Table => print_table(&report),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Commands::Run(run_args) => run_simulation(run_args).await?,
    }

    Ok(())
}
