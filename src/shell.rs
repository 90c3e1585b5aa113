//! Line-oriented driver for an [`AllocationEngine`].
//!
//! ```text
//!   alloc:<bytes>        allocate, print the address
//!   dealloc              free the most recent allocation
//!   dealloc:<address>    free a specific address (hex with 0x, or decimal)
//!   strategy:<name>      switch to first-fit or best-fit
//!   report               print the counters
//! ```
//!
//! The report is printed once more when the input ends.

use std::{
  fmt,
  io::{self, BufRead, Write},
  str::FromStr,
};

use thiserror::Error;
use tracing::debug;

use crate::{
  chunk::Address,
  engine::AllocationEngine,
  heap::HeapGrowth,
  stats::Stats,
  strategy::{Strategy, UnknownStrategy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Alloc(usize),
  Dealloc(Option<Address>),
  SetStrategy(Strategy),
  Report,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
  #[error("invalid size `{0}`")]
  InvalidSize(String),

  #[error("invalid address `{0}`")]
  InvalidAddress(String),

  #[error(transparent)]
  UnknownStrategy(#[from] UnknownStrategy),

  #[error("unknown command `{0}`")]
  Unknown(String),
}

impl Command {
  /// Parses one input line. Blank lines yield `Ok(None)`.
  pub fn parse_line(
    line: &str,
  ) -> Result<Option<Self>, CommandError> {
    let line = line.trim();

    if line.is_empty() {
      return Ok(None);
    }

    line.parse().map(Some)
  }
}

impl FromStr for Command {
  type Err = CommandError;

  fn from_str(
    s: &str,
  ) -> Result<Self, Self::Err> {
    let (name, argument) = match s.split_once(':') {
      Some((name, argument)) => (name.trim(), Some(argument.trim())),
      None => (s.trim(), None),
    };

    match (name, argument) {
      ("alloc", Some(size)) => size
        .parse()
        .map(Command::Alloc)
        .map_err(|_| CommandError::InvalidSize(size.to_string())),
      ("dealloc", None) => Ok(Command::Dealloc(None)),
      ("dealloc", Some(address)) => parse_address(address)
        .map(|address| Command::Dealloc(Some(address)))
        .ok_or_else(|| CommandError::InvalidAddress(address.to_string())),
      ("strategy", Some(strategy)) => Ok(Command::SetStrategy(strategy.parse()?)),
      ("report", None) => Ok(Command::Report),
      _ => Err(CommandError::Unknown(s.to_string())),
    }
  }
}

fn parse_address(
  text: &str,
) -> Option<Address> {
  let raw = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
    Some(hex) => usize::from_str_radix(hex, 16).ok()?,
    None => text.parse().ok()?,
  };

  Some(Address::new(raw))
}

/// Human readable view of the counters.
pub struct Report<'a>(pub &'a Stats);

impl fmt::Display for Report<'_> {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    let stats = self.0;

    writeln!(f, "===== Memory Manager Report =====")?;
    writeln!(f, "Total Allocated: {} bytes", stats.total_allocated)?;
    writeln!(f, "Total Freed: {} bytes", stats.total_freed)?;
    writeln!(f, "Number of Allocations: {}", stats.num_allocations)?;
    writeln!(f, "Number of Deallocations: {}", stats.num_deallocations)?;
    write!(f, "=================================")
  }
}

/// Runs commands against an engine, printing results to `out` and problems
/// to `err`. A bad command is reported and skipped; it never ends the
/// session.
pub struct Session<H, W, E> {
  engine: AllocationEngine<H>,
  out: W,
  err: E,
}

impl<H: HeapGrowth, W: Write, E: Write> Session<H, W, E> {
  pub fn new(
    engine: AllocationEngine<H>,
    out: W,
    err: E,
  ) -> Self {
    Self { engine, out, err }
  }

  pub fn engine(&self) -> &AllocationEngine<H> {
    &self.engine
  }

  pub fn into_parts(self) -> (AllocationEngine<H>, W, E) {
    (self.engine, self.out, self.err)
  }

  /// Executes every line of `input`, then prints the final report.
  pub fn run<R: BufRead>(
    &mut self,
    input: R,
  ) -> io::Result<Stats> {
    for line in input.lines() {
      let line = line?;

      match Command::parse_line(&line) {
        Ok(Some(command)) => self.execute(command)?,
        Ok(None) => {}
        Err(err) => writeln!(self.err, "Warning: {err}, skipping")?,
      }
    }

    let stats = self.engine.stats_snapshot();
    writeln!(self.out, "{}", Report(&stats))?;
    self.out.flush()?;

    Ok(stats)
  }

  pub fn execute(
    &mut self,
    command: Command,
  ) -> io::Result<()> {
    debug!(?command, "executing");

    match command {
      Command::Alloc(size) => match self.engine.allocate(size) {
        Ok(address) => writeln!(self.out, "Allocated {size} bytes at {address}"),
        Err(err) => writeln!(self.err, "Error: allocating {size} bytes: {err}"),
      },
      Command::Dealloc(target) => {
        let target = target.or_else(|| {
          self
            .engine
            .registry()
            .last_occupied()
            .map(|chunk| chunk.address())
        });

        let Some(address) = target else {
          return writeln!(
            self.err,
            "Warning: Attempted deallocation with no occupied memory."
          );
        };

        match self.engine.deallocate(address) {
          Ok(()) => writeln!(self.out, "Deallocated memory at {address}"),
          Err(err) => writeln!(self.err, "Error: {err}"),
        }
      }
      Command::SetStrategy(strategy) => {
        self.engine.set_strategy(strategy);
        writeln!(self.out, "Strategy set to {strategy}")
      }
      Command::Report => {
        let stats = self.engine.stats_snapshot();
        writeln!(self.out, "{}", Report(&stats))
      }
    }
  }
}
