use std::io::{self, BufReader};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use fitalloc::{AllocationEngine, HeapGrowth, SbrkHeap, Session, SimulatedHeap, Strategy};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Drive a first-fit / best-fit allocator from line commands on stdin.
///
/// Commands: `alloc:<bytes>`, `dealloc`, `dealloc:<address>`,
/// `strategy:<first|best>`, `report`.
#[derive(Parser, Debug)]
#[command(name = "fitalloc", version)]
struct Cli {
  /// Fit strategy (first, best, or 1/2). Left unset, allocations fail until
  /// a `strategy:` command picks one.
  #[arg(short, long, env = "FITALLOC_STRATEGY")]
  strategy: Option<Strategy>,

  /// Where new memory comes from.
  #[arg(long, value_enum, env = "FITALLOC_HEAP", default_value_t = HeapKind::Sbrk)]
  heap: HeapKind,

  /// Size of the simulated heap in bytes.
  #[arg(long, env = "FITALLOC_CAPACITY", default_value_t = 1 << 20)]
  capacity: usize,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum HeapKind {
  /// Grow the real process break with sbrk(2).
  Sbrk,
  /// Hand out addresses from a bounded, unmapped range.
  Simulated,
}

fn main() -> Result<()> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(io::stderr)
    .with_target(false)
    .init();

  let cli = Cli::parse();

  let heap: Box<dyn HeapGrowth> = match cli.heap {
    HeapKind::Sbrk => Box::new(SbrkHeap::new()),
    HeapKind::Simulated => Box::new(SimulatedHeap::new(cli.capacity)),
  };

  let mut engine = AllocationEngine::new(heap);
  if let Some(strategy) = cli.strategy {
    engine.set_strategy(strategy);
  }

  info!(
    strategy = engine.strategy_name().unwrap_or("unset"),
    heap = ?cli.heap,
    "starting session"
  );

  let mut session = Session::new(engine, io::stdout().lock(), io::stderr().lock());
  let stats = session
    .run(BufReader::new(io::stdin().lock()))
    .context("command session failed")?;

  let registry = session.engine().registry();
  info!(
    allocations = stats.num_allocations,
    deallocations = stats.num_deallocations,
    free_chunks = registry.free_snapshot().len(),
    free_bytes = registry.free_bytes(),
    occupied_bytes = registry.occupied_bytes(),
    "session finished"
  );

  Ok(())
}
