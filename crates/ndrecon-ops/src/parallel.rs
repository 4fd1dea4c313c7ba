use rayon::prelude::*;
use thiserror::Error;

use ndrecon_tensor::ExecutionStrategy;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The chunk length for the chunked strategy must be valid.
    #[error("chunk length must be > 0 for Chunked strategy")]
    InvalidChunkLength(usize),

    /// Input and output sizes do not match.
    #[error("source and destination slices must have the same length")]
    SizeMismatch,
}

/// Runs `op(i, &mut dst[i])` for every index of `dst` with the given strategy.
///
/// Kernels whose output element depends only on its own index (gathers,
/// element-wise maps, per-index reductions) are all written against this.
pub fn for_each_indexed<T, F>(
    strategy: ExecutionStrategy,
    dst: &mut [T],
    op: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut T) + Sync + Send,
{
    match strategy {
        ExecutionStrategy::Serial => {
            dst.iter_mut().enumerate().for_each(|(i, d)| op(i, d));
        }
        ExecutionStrategy::ParallelElements => {
            dst.par_iter_mut().enumerate().for_each(|(i, d)| op(i, d));
        }
        ExecutionStrategy::Chunked(len) => {
            if len == 0 {
                return Err(ParallelError::InvalidChunkLength(len));
            }
            dst.par_chunks_mut(len)
                .enumerate()
                .for_each(|(c, chunk)| {
                    let base = c * len;
                    chunk
                        .iter_mut()
                        .enumerate()
                        .for_each(|(i, d)| op(base + i, d));
                });
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                dst.par_iter_mut().enumerate().for_each(|(i, d)| op(i, d));
            });
        }
    }
    Ok(())
}

/// Runs `op(&mut dst[i])` for every element of `dst`.
pub fn for_each_mut<T, F>(strategy: ExecutionStrategy, dst: &mut [T], op: F) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(&mut T) + Sync + Send,
{
    for_each_indexed(strategy, dst, |_, d| op(d))
}

/// Runs `op(&src[i], &mut dst[i])` for every index; the slices must have equal length.
pub fn zip_for_each<S, T, F>(
    strategy: ExecutionStrategy,
    src: &[S],
    dst: &mut [T],
    op: F,
) -> Result<(), ParallelError>
where
    S: Sync,
    T: Send,
    F: Fn(&S, &mut T) + Sync + Send,
{
    if src.len() != dst.len() {
        return Err(ParallelError::SizeMismatch);
    }
    for_each_indexed(strategy, dst, |i, d| op(&src[i], d))
}
