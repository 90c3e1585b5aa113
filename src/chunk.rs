use std::{fmt, num::NonZeroUsize};

/// Opaque handle to the start of a heap region.
///
/// The allocator never reads or writes through an `Address`; it only
/// compares them. Use [`Address::as_ptr`] to get at the memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(usize);

impl Address {
  pub const fn new(raw: usize) -> Self {
    Self(raw)
  }

  pub fn from_ptr<T>(ptr: *mut T) -> Self {
    Self(ptr as usize)
  }

  pub const fn get(self) -> usize {
    self.0
  }

  pub fn as_ptr(self) -> *mut u8 {
    self.0 as *mut u8
  }
}

impl fmt::Display for Address {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(f, "{:#x}", self.0)
  }
}

/// Record of one contiguous region, either free or in use.
///
/// Chunks never change after creation. Only the set they live in does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
  size: usize,
  address: Address,
}

impl Chunk {
  /// Returns `None` for a zero size: an empty region is never tracked.
  pub fn new(
    size: usize,
    address: Address,
  ) -> Option<Self> {
    NonZeroUsize::new(size).map(|size| Self::sized(size, address))
  }

  pub fn sized(
    size: NonZeroUsize,
    address: Address,
  ) -> Self {
    Self {
      size: size.get(),
      address,
    }
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn address(&self) -> Address {
    self.address
  }

  /// Bytes left unused if this chunk serves a request of `size` bytes, or
  /// `None` when the chunk is too small.
  pub fn slack(
    &self,
    size: usize,
  ) -> Option<usize> {
    self.size.checked_sub(size)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_zero_size_is_rejected() {
    assert!(Chunk::new(0, Address::new(0x1000)).is_none());
  }

  #[test]
  fn test_sized_matches_new() {
    let size = NonZeroUsize::new(24).unwrap();

    assert_eq!(
      Some(Chunk::sized(size, Address::new(0x40))),
      Chunk::new(24, Address::new(0x40))
    );
  }

  #[test]
  fn test_slack() {
    let chunk = Chunk::new(10, Address::new(0x1000)).unwrap();

    assert_eq!(chunk.slack(6), Some(4));
    assert_eq!(chunk.slack(10), Some(0));
    assert_eq!(chunk.slack(11), None);
  }

  #[test]
  fn test_address_display_is_hex() {
    assert_eq!(Address::new(0x55aa).to_string(), "0x55aa");
  }

  #[test]
  fn test_address_pointer_round_trip() {
    let mut value = 7u64;
    let ptr = &mut value as *mut u64;
    let address = Address::from_ptr(ptr);

    assert_eq!(address.as_ptr() as *mut u64, ptr);
  }
}
