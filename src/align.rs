/// Size of a machine word in bytes. Every region handed out by a heap
/// backend starts and ends on a multiple of this.
pub const WORD: usize = ::core::mem::size_of::<usize>();

/// Rounds `value` up to the next multiple of the machine word size.
///
/// Returns `None` instead of wrapping when the rounded value does not fit
/// in a `usize`.
///
/// # Examples
///
/// ```rust
/// use fitalloc::align;
///
/// match fitalloc::align::WORD {
///     8 => assert_eq!(align!(13), Some(16)), // 64 bit machine.
///     4 => assert_eq!(align!(11), Some(12)), // 32 bit machine.
///     _ => {},
/// };
///
/// assert_eq!(align!(usize::MAX), None);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value as usize)
      .checked_add($crate::align::WORD - 1)
      .map(|padded| padded & !($crate::align::WORD - 1))
  };
}

/// Whether `value` already sits on a word boundary.
pub fn is_word_aligned(value: usize) -> bool {
  value & (WORD - 1) == 0
}
