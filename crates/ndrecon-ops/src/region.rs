//! Spatial region operations: crop, centred zero-padding, border masking and
//! origin mirroring.
//!
//! All geometry is validated before any device work starts, so a rejected
//! call never touches its output.

use ndrecon_kernels::{Element, RealScalar};
use ndrecon_tensor::Tensor;
use num_traits::Zero;

use crate::{
    error::TensorOpsError,
    parallel::for_each_indexed,
    placement::{ComputeScope, DeviceSelector},
    spatial::{check_same_batch, SpatialShape},
};

/// Writes `f(batch, coords, src)` into every element of `out`, with `input` as the first array.
fn gather_into<T, const D: usize, F>(
    input: &Tensor<T>,
    out: &mut Tensor<T>,
    out_sp: SpatialShape<D>,
    compute: DeviceSelector,
    f: F,
) -> Result<(), TensorOpsError>
where
    T: Copy + Send + Sync,
    F: Fn(usize, [usize; D], &[T], &mut T) + Send + Sync,
{
    let scope = ComputeScope::enter(compute.resolve(input))?;
    let strategy = scope.strategy();
    let src = scope.stage(input)?;
    let src = src.as_slice();
    scope.update(out, |t| {
        Ok(for_each_indexed(strategy, t.as_slice_mut(), |j, d| {
            let (b, c) = out_sp.locate(j);
            f(b, c, src, d)
        })?)
    })
}

/// Masks every element of `image` for which `outside(coords)` holds.
fn mask_in_place<T, const D: usize, F>(
    image: &mut Tensor<T>,
    sp: SpatialShape<D>,
    compute: DeviceSelector,
    outside: F,
) -> Result<(), TensorOpsError>
where
    T: Element,
    F: Fn([usize; D]) -> bool + Send + Sync,
{
    let scope = ComputeScope::enter(compute.resolve(image))?;
    let strategy = scope.strategy();
    scope.update(image, |t| {
        Ok(for_each_indexed(strategy, t.as_slice_mut(), |j, d| {
            if outside(sp.locate(j).1) {
                *d = T::ZERO;
            }
        })?)
    })
}

/// Copies the window of `input` starting at `offset` with the spatial size of `out`.
///
/// # Errors
///
/// Fails when the batch axes differ or the window does not fit in `input`.
pub fn crop<T, const D: usize>(
    offset: [usize; D],
    input: &Tensor<T>,
    out: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError>
where
    T: Copy + Send + Sync,
{
    let in_sp = SpatialShape::<D>::split(&input.shape)?;
    let out_sp = SpatialShape::<D>::split(&out.shape)?;
    check_same_batch(&in_sp, &out_sp, &input.shape, &out.shape)?;
    for k in 0..D {
        let end = offset[k].checked_add(out_sp.dims[k]);
        if end.map_or(true, |end| end > in_sp.dims[k]) {
            return Err(TensorOpsError::InvalidGeometry(format!(
                "crop of {:?} at {:?} exceeds input {:?}",
                out_sp.dims, offset, in_sp.dims
            )));
        }
    }
    gather_into(input, out, out_sp, compute, |b, mut c, src, d| {
        for k in 0..D {
            c[k] += offset[k];
        }
        *d = src[in_sp.offset(b, &c)];
    })
}

/// Places `input` in the centre of `out` and zero-fills the rest.
///
/// The input's origin lands at `(out - in) / 2` along every spatial axis.
///
/// # Errors
///
/// Fails when the batch axes differ or `input` is larger than `out`.
pub fn expand_with_zero_fill<T, const D: usize>(
    input: &Tensor<T>,
    out: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError>
where
    T: Copy + Send + Sync + Zero,
{
    let in_sp = SpatialShape::<D>::split(&input.shape)?;
    let out_sp = SpatialShape::<D>::split(&out.shape)?;
    check_same_batch(&in_sp, &out_sp, &input.shape, &out.shape)?;
    if in_sp.dims.iter().zip(out_sp.dims.iter()).any(|(i, o)| i > o) {
        return Err(TensorOpsError::InvalidGeometry(format!(
            "cannot expand {:?} into {:?}",
            in_sp.dims, out_sp.dims
        )));
    }
    let mut start = [0; D];
    for k in 0..D {
        start[k] = (out_sp.dims[k] - in_sp.dims[k]) / 2;
    }
    gather_into(input, out, out_sp, compute, |b, c, src, d| {
        let mut inner = [0; D];
        for k in 0..D {
            if c[k] < start[k] || c[k] - start[k] >= in_sp.dims[k] {
                *d = T::zero();
                return;
            }
            inner[k] = c[k] - start[k];
        }
        *d = src[in_sp.offset(b, &inner)];
    })
}

/// Zeroes everything outside the centred `matrix_size` box.
///
/// The kept box starts at `(size - matrix_size) / 2` along every spatial axis.
///
/// # Errors
///
/// Fails when `matrix_size` exceeds the spatial size of `image`.
pub fn zero_fill_border<T: Element, const D: usize>(
    matrix_size: [usize; D],
    image: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    let sp = SpatialShape::<D>::split(&image.shape)?;
    if matrix_size.iter().zip(sp.dims.iter()).any(|(m, s)| m > s) {
        return Err(TensorOpsError::InvalidGeometry(format!(
            "matrix size {:?} exceeds image {:?}",
            matrix_size, sp.dims
        )));
    }
    let mut start = [0; D];
    for k in 0..D {
        start[k] = (sp.dims[k] - matrix_size[k]) / 2;
    }
    mask_in_place(image, sp, compute, move |c| {
        (0..D).any(|k| c[k] < start[k] || c[k] >= start[k] + matrix_size[k])
    })
}

/// Zeroes everything farther than `radius` from the spatial centre `size / 2`.
///
/// Points exactly on the circle are kept.
pub fn zero_fill_border_circular<T: Element, const D: usize>(
    radius: T::Real,
    image: &mut Tensor<T>,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError> {
    let sp = SpatialShape::<D>::split(&image.shape)?;
    let centre = sp.dims.map(|d| <T::Real as RealScalar>::from_usize(d / 2));
    let r2 = radius * radius;
    mask_in_place(image, sp, compute, move |c| {
        let mut dist2 = <T::Real as Element>::ZERO;
        for k in 0..D {
            let delta = <T::Real as RealScalar>::from_usize(c[k]) - centre[k];
            dist2 = dist2 + delta * delta;
        }
        dist2 > r2
    })
}

/// Point-reflects `input` through the spatial origin `size / 2` into `out`.
///
/// Output coordinate `c` reads input coordinate `2 * origin - c`. Where that
/// falls outside the array the output is zeroed when `zero_fill` is set and
/// left untouched otherwise. On odd sizes the mirror is an involution.
///
/// # Errors
///
/// Fails when `input` and `out` have different shapes.
pub fn origin_mirror<T, const D: usize>(
    input: &Tensor<T>,
    out: &mut Tensor<T>,
    zero_fill: bool,
    compute: DeviceSelector,
) -> Result<(), TensorOpsError>
where
    T: Copy + Send + Sync + Zero,
{
    crate::elementwise::check_same_shape(input, out)?;
    let sp = SpatialShape::<D>::split(&input.shape)?;
    let twice_origin = sp.dims.map(|d| 2 * (d / 2));
    let in_sp = sp.clone();
    gather_into(input, out, sp, compute, move |b, c, src, d| {
        let mut mirrored = [0; D];
        for k in 0..D {
            match twice_origin[k].checked_sub(c[k]) {
                Some(m) if m < in_sp.dims[k] => mirrored[k] = m,
                _ => {
                    if zero_fill {
                        *d = T::zero();
                    }
                    return;
                }
            }
        }
        *d = src[in_sp.offset(b, &mirrored)];
    })
}
