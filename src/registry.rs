use crate::chunk::{Address, Chunk};
use crate::error::{AllocError, AllocResult};

/// Free and occupied chunk records, each kept in insertion order.
///
/// ```text
///   free:      [ {10 @ A} ][ {5 @ B} ][ {8 @ C} ]   <- searched by a FitStrategy
///   occupied:  [ {16 @ D} ][ {32 @ E} ]             <- searched by address on free
/// ```
///
/// An address appears at most once across both sets. Breaking that is a
/// bookkeeping bug and trips a debug assertion.
#[derive(Debug, Default)]
pub struct ChunkRegistry {
  free: Vec<Chunk>,
  occupied: Vec<Chunk>,
}

impl ChunkRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_free(
    &mut self,
    chunk: Chunk,
  ) {
    debug_assert!(
      !self.contains(chunk.address()),
      "chunk at {} is already tracked",
      chunk.address()
    );
    self.free.push(chunk);
  }

  pub fn insert_occupied(
    &mut self,
    chunk: Chunk,
  ) {
    debug_assert!(
      !self.contains(chunk.address()),
      "chunk at {} is already tracked",
      chunk.address()
    );
    self.occupied.push(chunk);
  }

  /// Removes the free record equal to `chunk`. Returns `false` if there
  /// was none.
  pub fn remove_free(
    &mut self,
    chunk: &Chunk,
  ) -> bool {
    match self.free.iter().position(|free| free == chunk) {
      Some(index) => {
        self.free.remove(index);
        true
      }
      None => false,
    }
  }

  /// Removes the free record at `index`, keeping the order of the rest.
  pub(crate) fn take_free_at(
    &mut self,
    index: usize,
  ) -> Option<Chunk> {
    (index < self.free.len()).then(|| self.free.remove(index))
  }

  pub fn remove_occupied_by_address(
    &mut self,
    address: Address,
  ) -> AllocResult<Chunk> {
    let index = self
      .occupied
      .iter()
      .position(|chunk| chunk.address() == address)
      .ok_or(AllocError::NotFound(address))?;

    Ok(self.occupied.remove(index))
  }

  pub fn free_snapshot(&self) -> &[Chunk] {
    &self.free
  }

  pub fn occupied_snapshot(&self) -> &[Chunk] {
    &self.occupied
  }

  /// Most recently occupied chunk.
  pub fn last_occupied(&self) -> Option<&Chunk> {
    self.occupied.last()
  }

  pub fn contains(
    &self,
    address: Address,
  ) -> bool {
    self
      .free
      .iter()
      .chain(self.occupied.iter())
      .any(|chunk| chunk.address() == address)
  }

  pub fn free_bytes(&self) -> usize {
    self.free.iter().map(Chunk::size).sum()
  }

  pub fn occupied_bytes(&self) -> usize {
    self.occupied.iter().map(Chunk::size).sum()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chunk(
    size: usize,
    address: usize,
  ) -> Chunk {
    Chunk::new(size, Address::new(address)).unwrap()
  }

  #[test]
  fn test_insertion_order_is_preserved() {
    let mut registry = ChunkRegistry::new();

    registry.insert_free(chunk(10, 0x10));
    registry.insert_free(chunk(5, 0x20));
    registry.insert_free(chunk(8, 0x30));

    let sizes: Vec<usize> = registry.free_snapshot().iter().map(Chunk::size).collect();
    assert_eq!(sizes, vec![10, 5, 8]);
    assert_eq!(registry.free_bytes(), 23);
  }

  #[test]
  fn test_remove_free_removes_exactly_one() {
    let mut registry = ChunkRegistry::new();
    let target = chunk(5, 0x20);

    registry.insert_free(chunk(10, 0x10));
    registry.insert_free(target);

    assert!(registry.remove_free(&target));
    assert!(!registry.remove_free(&target));
    assert_eq!(registry.free_snapshot(), &[chunk(10, 0x10)]);
  }

  #[test]
  fn test_take_free_at_out_of_range() {
    let mut registry = ChunkRegistry::new();
    registry.insert_free(chunk(10, 0x10));

    assert_eq!(registry.take_free_at(1), None);
    assert_eq!(registry.take_free_at(0), Some(chunk(10, 0x10)));
    assert!(registry.free_snapshot().is_empty());
  }

  #[test]
  fn test_remove_occupied_by_address() {
    let mut registry = ChunkRegistry::new();

    registry.insert_occupied(chunk(16, 0x100));
    registry.insert_occupied(chunk(32, 0x200));

    assert_eq!(
      registry.remove_occupied_by_address(Address::new(0x100)),
      Ok(chunk(16, 0x100))
    );
    assert_eq!(
      registry.remove_occupied_by_address(Address::new(0x100)),
      Err(AllocError::NotFound(Address::new(0x100)))
    );
    assert_eq!(registry.last_occupied(), Some(&chunk(32, 0x200)));
    assert_eq!(registry.occupied_bytes(), 32);
  }

  #[test]
  fn test_contains_spans_both_sets() {
    let mut registry = ChunkRegistry::new();

    registry.insert_free(chunk(1, 0x1));
    registry.insert_occupied(chunk(2, 0x2));

    assert!(registry.contains(Address::new(0x1)));
    assert!(registry.contains(Address::new(0x2)));
    assert!(!registry.contains(Address::new(0x3)));
  }

  #[test]
  #[cfg(debug_assertions)]
  #[should_panic(expected = "already tracked")]
  fn test_duplicate_address_is_a_bug() {
    let mut registry = ChunkRegistry::new();

    registry.insert_free(chunk(1, 0x1));
    registry.insert_occupied(chunk(4, 0x1));
  }
}
