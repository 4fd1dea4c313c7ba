//! Index arithmetic for arrays whose last `D` axes are spatial.

use crate::error::TensorOpsError;

/// Shape split into leading batch axes and `D` trailing spatial axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpatialShape<const D: usize> {
    /// Leading non-spatial axes.
    pub batch: Vec<usize>,
    /// Trailing spatial axes, slowest first.
    pub dims: [usize; D],
}

impl<const D: usize> SpatialShape<D> {
    /// Splits `shape`; fails when it has fewer than `D` axes.
    pub fn split(shape: &[usize]) -> Result<Self, TensorOpsError> {
        if D == 0 || shape.len() < D {
            return Err(TensorOpsError::InvalidGeometry(format!(
                "{} spatial axes requested for shape {:?}",
                D, shape
            )));
        }
        let (batch, spatial) = shape.split_at(shape.len() - D);
        let mut dims = [0; D];
        dims.copy_from_slice(spatial);
        Ok(Self {
            batch: batch.to_vec(),
            dims,
        })
    }

    /// Number of spatial elements per batch entry.
    pub fn spatial_numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Number of batch entries.
    pub fn batch_numel(&self) -> usize {
        self.batch.iter().product()
    }

    /// Full shape with the spatial axes replaced by `dims`.
    pub fn with_dims(&self, dims: [usize; D]) -> Vec<usize> {
        self.batch.iter().copied().chain(dims).collect()
    }

    /// Splits a flat offset into a batch index and spatial coordinates.
    #[inline]
    pub fn locate(&self, offset: usize) -> (usize, [usize; D]) {
        let n = self.spatial_numel();
        (offset / n, unravel(offset % n, &self.dims))
    }

    /// Flat offset of `coords` inside batch entry `batch`.
    #[inline]
    pub fn offset(&self, batch: usize, coords: &[usize; D]) -> usize {
        batch * self.spatial_numel() + ravel(coords, &self.dims)
    }
}

/// Row-major coordinates of `offset` in a `dims` block.
#[inline]
pub fn unravel<const D: usize>(mut offset: usize, dims: &[usize; D]) -> [usize; D] {
    let mut coords = [0; D];
    for k in (0..D).rev() {
        coords[k] = offset % dims[k];
        offset /= dims[k];
    }
    coords
}

/// Row-major offset of `coords` in a `dims` block.
#[inline]
pub fn ravel<const D: usize>(coords: &[usize; D], dims: &[usize; D]) -> usize {
    coords
        .iter()
        .zip(dims.iter())
        .fold(0, |acc, (&c, &d)| acc * d + c)
}

/// Validates that `a` and `b` have the same batch axes.
pub fn check_same_batch<const D: usize>(
    a: &SpatialShape<D>,
    b: &SpatialShape<D>,
    a_shape: &[usize],
    b_shape: &[usize],
) -> Result<(), TensorOpsError> {
    if a.batch != b.batch {
        return Err(TensorOpsError::ShapeMismatch(a_shape.to_vec(), b_shape.to_vec()));
    }
    Ok(())
}
