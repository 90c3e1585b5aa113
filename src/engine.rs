use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::{
  chunk::{Address, Chunk},
  error::{AllocError, AllocResult},
  heap::HeapGrowth,
  registry::ChunkRegistry,
  stats::{Stats, StatsCollector},
  strategy::FitStrategy,
};

/// Free-list allocator over a growable heap.
///
/// ```text
///   allocate(n)
///     │
///     ├─ strategy.search(free, n) ──hit──► free ──► occupied ──► address
///     │
///     └─ miss ──► heap.grow(n) ──ok──► new chunk ──► occupied ──► address
///                              └─err─► OutOfMemory
///
///   deallocate(address)
///     └─ occupied ──► free            (or NotFound)
/// ```
///
/// Chunks are never split or merged: a freed chunk goes back on the free
/// list at the size it was allocated with, and a smaller request served
/// from it wastes the remainder.
pub struct AllocationEngine<H> {
  registry: ChunkRegistry,
  strategy: Option<Box<dyn FitStrategy>>,
  heap: H,
  stats: StatsCollector,
}

impl<H: HeapGrowth> AllocationEngine<H> {
  /// Engine with no strategy. Every `allocate` fails with
  /// [`AllocError::StrategyUnset`] until one is set. Those calls still count
  /// towards the allocation stats.
  pub fn new(
    heap: H,
  ) -> Self {
    Self {
      registry: ChunkRegistry::new(),
      strategy: None,
      heap,
      stats: StatsCollector::new(),
    }
  }

  pub fn with_strategy(
    heap: H,
    strategy: impl FitStrategy + 'static,
  ) -> Self {
    let mut engine = Self::new(heap);
    engine.set_strategy(strategy);
    engine
  }

  /// Takes effect on the next `allocate`. Tracked chunks are left alone.
  pub fn set_strategy(
    &mut self,
    strategy: impl FitStrategy + 'static,
  ) {
    debug!(strategy = strategy.name(), "fit strategy selected");
    self.strategy = Some(Box::new(strategy));
  }

  pub fn clear_strategy(&mut self) {
    self.strategy = None;
  }

  pub fn strategy_name(&self) -> Option<&'static str> {
    self.strategy.as_ref().map(|strategy| strategy.name())
  }

  pub fn allocate(
    &mut self,
    size: usize,
  ) -> AllocResult<Address> {
    let Some(requested) = NonZeroUsize::new(size) else {
      return Err(AllocError::InvalidSize);
    };

    // Every validated call counts, whether or not it ends up served.
    self.stats.record_allocation(size);

    let strategy = self.strategy.as_deref().ok_or(AllocError::StrategyUnset)?;

    if let Some(chunk) = strategy.search(&mut self.registry, size) {
      trace!(
        strategy = strategy.name(),
        requested = size,
        chunk_size = chunk.size(),
        address = %chunk.address(),
        "reusing free chunk"
      );
      self.registry.insert_occupied(chunk);
      return Ok(chunk.address());
    }

    let address = self.heap.grow(size)?;
    let chunk = Chunk::sized(requested, address);

    debug!(requested = size, %address, "heap grown");
    self.registry.insert_occupied(chunk);

    Ok(address)
  }

  pub fn deallocate(
    &mut self,
    address: Address,
  ) -> AllocResult<()> {
    self.stats.record_deallocation();

    let chunk = self.registry.remove_occupied_by_address(address)?;

    self.stats.record_freed(chunk.size());
    self.registry.insert_free(chunk);
    trace!(size = chunk.size(), %address, "chunk released");

    Ok(())
  }

  pub fn stats_snapshot(&self) -> Stats {
    self.stats.snapshot()
  }

  pub fn registry(&self) -> &ChunkRegistry {
    &self.registry
  }

  pub fn heap(&self) -> &H {
    &self.heap
  }
}
