//! Factor-two resampling over the last `D` axes.
//!
//! Leading axes are treated as independent batch entries.

use ndrecon_kernels::{RealScalar, Scalar};
use ndrecon_tensor::Tensor;
use num_traits::Float;
use num_traits::One;

use crate::{
    error::TensorOpsError,
    parallel::for_each_indexed,
    placement::{ComputeScope, Placement},
    spatial::SpatialShape,
};

/// Resamples `x` to `out_dims` with `sample(batch, coords, src_shape, src)` per output element.
fn resample<T, const D: usize, F>(
    x: &Tensor<T>,
    placement: Placement,
    in_sp: SpatialShape<D>,
    out_dims: [usize; D],
    sample: F,
) -> Result<Tensor<T>, TensorOpsError>
where
    T: Scalar,
    F: Fn(usize, [usize; D], &SpatialShape<D>, &[T]) -> T + Send + Sync,
{
    let out_sp = SpatialShape {
        batch: in_sp.batch.clone(),
        dims: out_dims,
    };
    let resolved = placement.resolve(x);
    let scope = ComputeScope::enter(resolved.compute)?;
    let src = scope.stage(x)?;
    let data = src.as_slice();
    let mut out = scope.alloc(&out_sp.with_dims(out_dims), T::ZERO)?;
    for_each_indexed(scope.strategy(), out.as_slice_mut(), |j, d| {
        let (b, c) = out_sp.locate(j);
        *d = sample(b, c, &in_sp, data);
    })?;
    log::trace!(
        "resampled {:?} -> {:?} on {}",
        in_sp.dims,
        out_dims,
        scope.device()
    );
    scope.finish(out, resolved.alloc)
}

/// Halves every spatial axis by averaging each `2^D` block.
///
/// # Errors
///
/// Fails when a spatial axis has odd length.
pub fn downsample<T: Scalar, const D: usize>(
    x: &Tensor<T>,
    placement: Placement,
) -> Result<Tensor<T>, TensorOpsError> {
    let in_sp = SpatialShape::<D>::split(&x.shape)?;
    if in_sp.dims.iter().any(|d| d % 2 != 0) {
        return Err(TensorOpsError::InvalidGeometry(format!(
            "downsample needs even spatial sizes, got {:?}",
            in_sp.dims
        )));
    }
    let out_dims = in_sp.dims.map(|d| d / 2);
    let weight = <T::Real as RealScalar>::from_usize(1 << D).recip();
    resample(x, placement, in_sp, out_dims, move |b, c, sp, data| {
        let mut acc = T::ZERO;
        for corner in 0..(1usize << D) {
            let mut src = c;
            for (k, s) in src.iter_mut().enumerate() {
                *s = 2 * *s + ((corner >> k) & 1);
            }
            acc += data[sp.offset(b, &src)];
        }
        acc.scale_real(weight)
    })
}

/// Doubles every spatial axis by nearest-neighbour replication.
pub fn upsample_nn<T: Scalar, const D: usize>(
    x: &Tensor<T>,
    placement: Placement,
) -> Result<Tensor<T>, TensorOpsError> {
    let in_sp = SpatialShape::<D>::split(&x.shape)?;
    let out_dims = in_sp.dims.map(|d| d * 2);
    resample(x, placement, in_sp, out_dims, |b, c, sp, data| {
        data[sp.offset(b, &c.map(|v| v / 2))]
    })
}

/// Doubles every spatial axis by D-linear interpolation.
///
/// Even output coordinates copy the source sample, odd ones average the two
/// neighbours along that axis. The upper neighbour is clamped to the last
/// index, so the final odd coordinate replicates the edge.
pub fn upsample_lin<T: Scalar, const D: usize>(
    x: &Tensor<T>,
    placement: Placement,
) -> Result<Tensor<T>, TensorOpsError> {
    let in_sp = SpatialShape::<D>::split(&x.shape)?;
    let out_dims = in_sp.dims.map(|d| d * 2);
    let one = <T::Real as One>::one();
    let half = one / (one + one);
    resample(x, placement, in_sp, out_dims, move |b, c, sp, data| {
        let mut acc = T::ZERO;
        'corners: for corner in 0..(1usize << D) {
            let mut src = [0; D];
            let mut weight = one;
            for k in 0..D {
                let upper = (corner >> k) & 1 == 1;
                let lo = c[k] / 2;
                if c[k] % 2 == 0 {
                    if upper {
                        continue 'corners;
                    }
                    src[k] = lo;
                } else {
                    src[k] = if upper { (lo + 1).min(sp.dims[k] - 1) } else { lo };
                    weight = weight * half;
                }
            }
            acc += data[sp.offset(b, &src)].scale_real(weight);
        }
        acc
    })
}
