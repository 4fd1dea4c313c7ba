use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub};

use num_traits::Zero;

use crate::element::{ComponentAbs, Element, ElementKind, RealScalar, Reciprocal};

/// Fixed-size vector element with `D` components.
///
/// Arithmetic is component-wise. Real component types make it an [`Element`]
/// whose magnitude is the Euclidean length; integer component types still
/// support addition so they can be summed, cropped and padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VectorTd<T, const D: usize>(pub [T; D]);

impl<T: Copy, const D: usize> VectorTd<T, D> {
    /// Create a vector from its components.
    #[inline]
    pub fn new(components: [T; D]) -> Self {
        Self(components)
    }

    /// Vector with every component equal to `value`.
    #[inline]
    pub fn splat(value: T) -> Self {
        Self([value; D])
    }

    /// Convert the vector to an array.
    #[inline]
    pub fn to_array(self) -> [T; D] {
        self.0
    }

    /// Applies `f` to every component.
    #[inline]
    pub fn map<U: Copy>(self, f: impl Fn(T) -> U) -> VectorTd<U, D> {
        VectorTd(self.0.map(f))
    }
}

impl<R: RealScalar, const D: usize> VectorTd<R, D> {
    /// Dot product between two vectors.
    #[inline]
    pub fn dot(self, rhs: Self) -> R {
        self.0
            .iter()
            .zip(rhs.0.iter())
            .fold(R::zero(), |acc, (a, b)| acc + *a * *b)
    }

    /// Euclidean length of the vector.
    #[inline]
    pub fn length(self) -> R {
        self.dot(self).sqrt()
    }
}

impl<T, const D: usize> From<[T; D]> for VectorTd<T, D> {
    #[inline]
    fn from(arr: [T; D]) -> Self {
        Self(arr)
    }
}

impl<T, const D: usize> Index<usize> for VectorTd<T, D> {
    type Output = T;

    #[inline]
    fn index(&self, i: usize) -> &T {
        &self.0[i]
    }
}

impl<T, const D: usize> IndexMut<usize> for VectorTd<T, D> {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.0[i]
    }
}

impl<T: Copy + Add<Output = T>, const D: usize> Add for VectorTd<T, D> {
    type Output = Self;

    #[inline]
    fn add(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a = *a + b;
        }
        self
    }
}

impl<T: Copy + Add<Output = T>, const D: usize> AddAssign for VectorTd<T, D> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: Copy + Sub<Output = T>, const D: usize> Sub for VectorTd<T, D> {
    type Output = Self;

    #[inline]
    fn sub(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a = *a - b;
        }
        self
    }
}

impl<T: Copy + Mul<Output = T>, const D: usize> Mul for VectorTd<T, D> {
    type Output = Self;

    #[inline]
    fn mul(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a = *a * b;
        }
        self
    }
}

impl<T: Copy + Zero, const D: usize> Zero for VectorTd<T, D> {
    #[inline]
    fn zero() -> Self {
        Self([T::zero(); D])
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0.iter().all(Zero::is_zero)
    }
}

impl<T: Copy + Zero, const D: usize> Default for VectorTd<T, D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<R: RealScalar, const D: usize> Element for VectorTd<R, D> {
    type Real = R;
    const ZERO: Self = VectorTd([R::ZERO; D]);
    const KIND: ElementKind = ElementKind::Vector { components: D };

    #[inline]
    fn magnitude(&self) -> R {
        self.length()
    }

    #[inline]
    fn norm_squared(&self) -> R {
        self.dot(*self)
    }
}

impl<R: RealScalar, const D: usize> ComponentAbs for VectorTd<R, D> {
    #[inline]
    fn component_abs(self) -> Self {
        self.map(|c| c.abs())
    }
}

impl<R: RealScalar, const D: usize> Reciprocal for VectorTd<R, D> {
    #[inline]
    fn reciprocal(self) -> Self {
        self.map(|c| c.reciprocal())
    }
}
