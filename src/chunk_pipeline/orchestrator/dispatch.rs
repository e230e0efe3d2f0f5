// In: src/chunk_pipeline/orchestrator/dispatch.rs

//! Chunking and per-chunk dispatch, sequential or on the rayon pool.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::config::CodecConfig;
use crate::error::SjzipError;

/// Splits `text` into consecutive slices of `chunk_size` characters. Every
/// slice but the last has exactly `chunk_size` characters.
pub(crate) fn split_chunks(text: &str, chunk_size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    if chunk_size == 0 {
        return chunks;
    }

    let mut start = 0;
    let mut count = 0;
    for (offset, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if count > 0 {
        chunks.push(&text[start..]);
    }
    chunks
}

/// Runs `work` over every item, preserving order. Items are processed on the
/// rayon pool when the config allows it and there are enough of them.
///
/// The cancel flag is checked before each item; once it is set, the call fails
/// with `Cancelled` and any finished results are dropped.
pub(crate) fn run_chunks<I, T, F>(
    items: &[I],
    config: &CodecConfig,
    cancel: Option<&AtomicBool>,
    work: F,
) -> Result<Vec<T>, SjzipError>
where
    I: Sync,
    T: Send,
    F: Fn(usize, &I) -> Result<T, SjzipError> + Sync,
{
    let total = items.len();
    let completed = AtomicUsize::new(0);

    let job = |(index, item): (usize, &I)| -> Result<T, SjzipError> {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(SjzipError::Cancelled {
                completed: completed.load(Ordering::Relaxed),
                total,
            });
        }
        let out = work(index, item)?;
        completed.fetch_add(1, Ordering::Relaxed);
        Ok(out)
    };

    if config.parallel && total >= config.parallel_threshold.max(1) {
        log::debug!("dispatching {} chunks on the rayon pool", total);
        items.par_iter().enumerate().map(&job).collect()
    } else {
        items.iter().enumerate().map(&job).collect()
    }
}
