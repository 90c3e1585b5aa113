/// Point-in-time copy of the allocator counters.
///
/// Counters track requests rather than successes: an allocation that ends
/// in `OutOfMemory` still counts, and so does a deallocation of an unknown
/// address. `total_freed` only grows when a chunk is actually released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
  pub total_allocated: usize,
  pub total_freed: usize,
  pub num_allocations: u64,
  pub num_deallocations: u64,
}

/// Owns the counters. Only the engine moves them forward.
#[derive(Debug, Default)]
pub struct StatsCollector {
  stats: Stats,
}

impl StatsCollector {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn snapshot(&self) -> Stats {
    self.stats
  }

  pub(crate) fn record_allocation(
    &mut self,
    size: usize,
  ) {
    self.stats.num_allocations = self.stats.num_allocations.saturating_add(1);
    self.stats.total_allocated = self.stats.total_allocated.saturating_add(size);
  }

  pub(crate) fn record_deallocation(&mut self) {
    self.stats.num_deallocations = self.stats.num_deallocations.saturating_add(1);
  }

  pub(crate) fn record_freed(
    &mut self,
    size: usize,
  ) {
    self.stats.total_freed = self.stats.total_freed.saturating_add(size);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_counters_accumulate() {
    let mut collector = StatsCollector::new();

    collector.record_allocation(10);
    collector.record_allocation(6);
    collector.record_deallocation();
    collector.record_freed(10);
    collector.record_deallocation();

    assert_eq!(
      collector.snapshot(),
      Stats {
        total_allocated: 16,
        total_freed: 10,
        num_allocations: 2,
        num_deallocations: 2,
      }
    );
  }

  #[test]
  fn test_counters_saturate() {
    let mut collector = StatsCollector::new();

    collector.record_allocation(usize::MAX);
    collector.record_allocation(1);

    assert_eq!(collector.snapshot().total_allocated, usize::MAX);
    assert_eq!(collector.snapshot().num_allocations, 2);
  }

  #[test]
  fn test_snapshot_is_a_copy() {
    let mut collector = StatsCollector::new();
    let before = collector.snapshot();

    collector.record_deallocation();

    assert_eq!(before, Stats::default());
    assert_eq!(collector.snapshot().num_deallocations, 1);
  }
}
