//! Fixed-size chunking for batched uploads and fetches.

/// Split `items` into consecutive chunks of at most `size` elements.
///
/// Produces `ceil(len / size)` chunks; every chunk except possibly the last has
/// exactly `size` elements, and concatenating the chunks reproduces the input
/// order. `size` must be non-zero.
pub(crate) fn chunks<T>(items: &[T], size: usize) -> impl Iterator<Item = &[T]> {
    debug_assert!(size > 0, "chunk size must be non-zero");
    items.chunks(size)
}

/// Number of chunks `chunks` will produce for a sequence of `len` elements.
pub(crate) fn chunk_count(len: usize, size: usize) -> usize {
    len.div_ceil(size)
}
