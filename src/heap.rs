use libc::{c_void, intptr_t, sbrk};
use tracing::trace;

use crate::{
  align,
  align::WORD,
  chunk::Address,
  error::HeapExhausted,
};

/// Source of fresh memory for the allocator.
///
/// Each successful `grow` hands out a region of at least `bytes` bytes that
/// overlaps nothing handed out before. A failure hands out nothing.
pub trait HeapGrowth {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Result<Address, HeapExhausted>;
}

impl<H: HeapGrowth + ?Sized> HeapGrowth for &mut H {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Result<Address, HeapExhausted> {
    (**self).grow(bytes)
  }
}

impl<H: HeapGrowth + ?Sized> HeapGrowth for Box<H> {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Result<Address, HeapExhausted> {
    (**self).grow(bytes)
  }
}

/// Current program break, as reported by `sbrk(0)`.
pub fn program_break() -> Address {
  Address::from_ptr(unsafe { sbrk(0) })
}

/// Grows the process data segment with `sbrk(2)`.
///
/// ```text
///   before grow(n)                      after grow(n)
///   ┌──────────┐◄─ program break        ┌──────────┐
///   │   heap   │                        │  n bytes │◄─ returned address
///   └──────────┘                        ├──────────┤
///                                       │   heap   │
///                                       └──────────┘
/// ```
///
/// Requests are rounded up to the machine word so every region starts on a
/// word boundary. Memory is never returned to the OS.
///
/// Only one `SbrkHeap` should be live at a time, and nothing else in the
/// process should move the break while it is in use.
#[derive(Debug)]
pub struct SbrkHeap {
  // sbrk is process-global state: keep this type !Send and !Sync.
  _not_send: std::marker::PhantomData<*mut u8>,
  grown: usize,
}

impl SbrkHeap {
  pub fn new() -> Self {
    Self {
      _not_send: std::marker::PhantomData,
      grown: 0,
    }
  }

  /// Total bytes this heap has asked the OS for.
  pub fn grown(&self) -> usize {
    self.grown
  }
}

impl Default for SbrkHeap {
  fn default() -> Self {
    Self::new()
  }
}

impl HeapGrowth for SbrkHeap {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Result<Address, HeapExhausted> {
    let exhausted = HeapExhausted { requested: bytes };

    let size = align!(bytes).ok_or(exhausted)?;

    // The old break may be unaligned. Ask for enough slack to align whatever
    // start sbrk hands back, without reading the break beforehand.
    let increment = size
      .checked_add(WORD - 1)
      .filter(|increment| *increment <= intptr_t::MAX as usize)
      .ok_or(exhausted)?;

    let start = unsafe { sbrk(increment as intptr_t) };

    if start == usize::MAX as *mut c_void {
      return Err(exhausted);
    }

    self.grown += increment;
    let address = Address::new(align!(start as usize).ok_or(exhausted)?);
    trace!(requested = bytes, grown = increment, %address, "sbrk");

    Ok(address)
  }
}

/// Bounded, purely bookkeeping address space.
///
/// Hands out word-aligned addresses from `base` upwards until `capacity`
/// bytes have been handed out. Nothing is ever mapped, so the addresses
/// must not be dereferenced. Useful for deterministic runs and for
/// exercising out-of-memory paths.
#[derive(Debug, Clone)]
pub struct SimulatedHeap {
  base: usize,
  next: usize,
  capacity: usize,
}

impl SimulatedHeap {
  pub const DEFAULT_BASE: usize = 0x1000_0000;

  pub fn new(
    capacity: usize,
  ) -> Self {
    Self::with_base(Self::DEFAULT_BASE, capacity)
  }

  /// `base` is rounded up to a word boundary.
  pub fn with_base(
    base: usize,
    capacity: usize,
  ) -> Self {
    let base = align!(base).unwrap_or(base & !(WORD - 1));

    Self {
      base,
      next: base,
      capacity,
    }
  }

  pub fn used(&self) -> usize {
    self.next - self.base
  }

  pub fn remaining(&self) -> usize {
    self.capacity - self.used()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }
}

impl HeapGrowth for SimulatedHeap {
  fn grow(
    &mut self,
    bytes: usize,
  ) -> Result<Address, HeapExhausted> {
    let exhausted = HeapExhausted { requested: bytes };

    let size = align!(bytes)
      .filter(|size| *size <= self.remaining())
      .ok_or(exhausted)?;
    let end = self.next.checked_add(size).ok_or(exhausted)?;

    let address = Address::new(self.next);
    self.next = end;
    trace!(requested = bytes, grown = size, %address, "simulated grow");

    Ok(address)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::align::is_word_aligned;

  #[test]
  fn test_simulated_heap_is_contiguous_and_aligned() {
    let mut heap = SimulatedHeap::with_base(0x1000, 1024);

    let first = heap.grow(3).unwrap();
    let second = heap.grow(WORD + 1).unwrap();

    assert_eq!(first, Address::new(0x1000));
    assert_eq!(second, Address::new(0x1000 + WORD));
    assert!(is_word_aligned(second.get()));
    assert_eq!(heap.used(), WORD * 3);
  }

  #[test]
  fn test_simulated_heap_exhaustion_is_all_or_nothing() {
    let mut heap = SimulatedHeap::with_base(0x1000, WORD * 2);

    heap.grow(WORD).unwrap();

    assert_eq!(
      heap.grow(WORD + 1),
      Err(HeapExhausted {
        requested: WORD + 1
      })
    );
    assert_eq!(heap.remaining(), WORD);
    assert_eq!(heap.grow(WORD), Ok(Address::new(0x1000 + WORD)));
    assert_eq!(heap.remaining(), 0);
  }

  #[test]
  fn test_simulated_heap_unaligned_base() {
    let heap = SimulatedHeap::with_base(0x1001, 64);

    assert!(is_word_aligned(heap.base));
  }

  #[test]
  fn test_simulated_heap_huge_request() {
    let mut heap = SimulatedHeap::new(64);

    assert!(heap.grow(usize::MAX).is_err());
    assert_eq!(heap.used(), 0);
  }

  #[test]
  fn test_sbrk_heap_grows_program_break() {
    let mut heap = SbrkHeap::new();

    let address = heap.grow(13).unwrap();

    assert!(is_word_aligned(address.get()));
    assert!(program_break().get() >= address.get() + 13);
    assert!(heap.grown() >= align!(13usize).unwrap());

    unsafe {
      let ptr = address.as_ptr() as *mut usize;
      ptr.write(0xDEADBEEF);
      assert_eq!(ptr.read(), 0xDEADBEEF);
    }
  }

  #[test]
  fn test_sbrk_regions_are_aligned_and_disjoint() {
    let mut heap = SbrkHeap::new();
    let sizes = [1, WORD + 3, 3 * WORD, 7];

    let mut regions: Vec<(usize, usize)> = sizes
      .iter()
      .map(|size| (heap.grow(*size).unwrap().get(), *size))
      .collect();
    let break_after = program_break().get();

    regions.sort();
    for (start, size) in &regions {
      assert!(is_word_aligned(*start));
      assert!(start + size <= break_after);
    }
    for pair in regions.windows(2) {
      assert!(pair[0].0 + pair[0].1 <= pair[1].0);
    }
    assert_eq!(
      heap.grown(),
      sizes.iter().map(|size| align!(*size).unwrap() + WORD - 1).sum::<usize>()
    );
  }

  #[test]
  fn test_sbrk_heap_rejects_oversized_request() {
    let mut heap = SbrkHeap::new();

    assert_eq!(
      heap.grow(usize::MAX),
      Err(HeapExhausted {
        requested: usize::MAX
      })
    );
  }

  #[test]
  fn test_boxed_heap_forwards() {
    let mut heap: Box<dyn HeapGrowth> = Box::new(SimulatedHeap::with_base(0x2000, 64));

    assert_eq!(heap.grow(1), Ok(Address::new(0x2000)));
  }
}
