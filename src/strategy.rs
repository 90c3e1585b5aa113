use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{chunk::Chunk, registry::ChunkRegistry};

/// Policy picking which free chunk serves a request.
///
/// Implementors only choose. [`FitStrategy::search`] does the removal so
/// every policy moves chunks out of the free set the same way.
pub trait FitStrategy {
  fn name(&self) -> &'static str;

  /// Index into `free` of the chosen chunk, or `None` when nothing is large
  /// enough. `chunk_size` is never zero.
  fn select(
    &self,
    free: &[Chunk],
    chunk_size: usize,
  ) -> Option<usize>;

  /// Picks a chunk and takes it out of the free set.
  fn search(
    &self,
    registry: &mut ChunkRegistry,
    chunk_size: usize,
  ) -> Option<Chunk> {
    let index = self.select(registry.free_snapshot(), chunk_size)?;
    registry.take_free_at(index)
  }
}

/// First chunk in insertion order that is large enough.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl FitStrategy for FirstFit {
  fn name(&self) -> &'static str {
    "first-fit"
  }

  fn select(
    &self,
    free: &[Chunk],
    chunk_size: usize,
  ) -> Option<usize> {
    free.iter().position(|chunk| chunk.size() >= chunk_size)
  }
}

/// Chunk leaving the fewest unused bytes. Ties go to the earliest inserted.
#[derive(Debug, Clone, Copy, Default)]
pub struct BestFit;

impl FitStrategy for BestFit {
  fn name(&self) -> &'static str {
    "best-fit"
  }

  fn select(
    &self,
    free: &[Chunk],
    chunk_size: usize,
  ) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;

    for (index, chunk) in free.iter().enumerate() {
      // Only chunks that fit have a meaningful slack.
      let Some(slack) = chunk.slack(chunk_size) else {
        continue;
      };

      if best.is_none_or(|(_, smallest)| slack < smallest) {
        best = Some((index, slack));

        if slack == 0 {
          break;
        }
      }
    }

    best.map(|(index, _)| index)
  }
}

/// The built-in strategies, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
  #[default]
  FirstFit,
  BestFit,
}

impl FitStrategy for Strategy {
  fn name(&self) -> &'static str {
    match self {
      Strategy::FirstFit => FirstFit.name(),
      Strategy::BestFit => BestFit.name(),
    }
  }

  fn select(
    &self,
    free: &[Chunk],
    chunk_size: usize,
  ) -> Option<usize> {
    match self {
      Strategy::FirstFit => FirstFit.select(free, chunk_size),
      Strategy::BestFit => BestFit.select(free, chunk_size),
    }
  }
}

impl fmt::Display for Strategy {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.name())
  }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown strategy `{0}` (expected first-fit or best-fit)")]
pub struct UnknownStrategy(pub String);

impl FromStr for Strategy {
  type Err = UnknownStrategy;

  fn from_str(
    s: &str,
  ) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "1" | "first" | "first-fit" | "first_fit" | "firstfit" => Ok(Strategy::FirstFit),
      "2" | "best" | "best-fit" | "best_fit" | "bestfit" => Ok(Strategy::BestFit),
      _ => Err(UnknownStrategy(s.to_string())),
    }
  }
}
