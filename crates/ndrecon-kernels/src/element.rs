use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub};

use num_complex::Complex;

/// The algebraic family an element type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Real floating-point scalar.
    Real,
    /// Complex scalar made of two reals.
    Complex,
    /// Fixed-size vector of reals.
    Vector {
        /// Number of components.
        components: usize,
    },
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementKind::Real => write!(f, "real"),
            ElementKind::Complex => write!(f, "complex"),
            ElementKind::Vector { components } => write!(f, "vector{}", components),
        }
    }
}

/// Capabilities shared by every element an array can hold.
///
/// Generic kernels are written once against this trait and monomorphized per
/// element type.
pub trait Element: Copy + Send + Sync + PartialEq + Debug + 'static {
    /// The real type magnitudes are measured in.
    type Real: RealScalar;

    /// The additive identity.
    const ZERO: Self;

    /// The element family.
    const KIND: ElementKind;

    /// Returns true for the exact zero element.
    #[inline]
    fn is_exact_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Euclidean magnitude.
    fn magnitude(&self) -> Self::Real;

    /// Squared Euclidean magnitude.
    fn norm_squared(&self) -> Self::Real;
}

/// Element-wise multiplicative inverse.
///
/// Zero maps to the IEEE sentinel, it does not panic. Vector elements invert
/// each component.
pub trait Reciprocal: Element {
    /// Multiplicative inverse.
    fn reciprocal(self) -> Self;
}

/// Real or complex scalar field element.
pub trait Scalar:
    Element
    + Reciprocal
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + MulAssign
{
    /// Complex conjugate; identity for reals.
    fn conj(self) -> Self;

    /// Embeds a real value.
    fn from_real(re: Self::Real) -> Self;

    /// Builds an element from real and imaginary parts. Reals drop `im`.
    fn from_parts(re: Self::Real, im: Self::Real) -> Self;

    /// Real part.
    fn re(self) -> Self::Real;

    /// Imaginary part; zero for reals.
    fn im(self) -> Self::Real;

    /// Multiplies by a real factor.
    fn scale_real(self, factor: Self::Real) -> Self;
}

/// Real floating-point scalar.
pub trait RealScalar: Scalar<Real = Self> + num_traits::Float {
    /// Converts an element count.
    fn from_usize(n: usize) -> Self;
}

/// Component-wise absolute value.
pub trait ComponentAbs: Element {
    /// Returns the element with every real component replaced by its absolute value.
    fn component_abs(self) -> Self;
}

macro_rules! impl_real {
    ($t:ty) => {
        impl Element for $t {
            type Real = $t;
            const ZERO: Self = 0.0;
            const KIND: ElementKind = ElementKind::Real;

            #[inline]
            fn magnitude(&self) -> $t {
                self.abs()
            }

            #[inline]
            fn norm_squared(&self) -> $t {
                self * self
            }
        }

        impl Reciprocal for $t {
            #[inline]
            fn reciprocal(self) -> Self {
                1.0 / self
            }
        }

        impl Scalar for $t {
            #[inline]
            fn conj(self) -> Self {
                self
            }

            #[inline]
            fn from_real(re: $t) -> Self {
                re
            }

            #[inline]
            fn from_parts(re: $t, _im: $t) -> Self {
                re
            }

            #[inline]
            fn re(self) -> $t {
                self
            }

            #[inline]
            fn im(self) -> $t {
                0.0
            }

            #[inline]
            fn scale_real(self, factor: $t) -> Self {
                self * factor
            }
        }

        impl RealScalar for $t {
            #[inline]
            fn from_usize(n: usize) -> Self {
                n as $t
            }
        }

        impl ComponentAbs for $t {
            #[inline]
            fn component_abs(self) -> Self {
                self.abs()
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);

macro_rules! impl_complex {
    ($t:ty) => {
        impl Element for Complex<$t> {
            type Real = $t;
            const ZERO: Self = Complex { re: 0.0, im: 0.0 };
            const KIND: ElementKind = ElementKind::Complex;

            #[inline]
            fn magnitude(&self) -> $t {
                self.norm()
            }

            #[inline]
            fn norm_squared(&self) -> $t {
                self.norm_sqr()
            }
        }

        impl Reciprocal for Complex<$t> {
            #[inline]
            fn reciprocal(self) -> Self {
                let n = self.norm_sqr();
                Complex::new(self.re / n, -self.im / n)
            }
        }

        impl Scalar for Complex<$t> {
            #[inline]
            fn conj(self) -> Self {
                Complex::new(self.re, -self.im)
            }

            #[inline]
            fn from_real(re: $t) -> Self {
                Complex::new(re, 0.0)
            }

            #[inline]
            fn from_parts(re: $t, im: $t) -> Self {
                Complex::new(re, im)
            }

            #[inline]
            fn re(self) -> $t {
                self.re
            }

            #[inline]
            fn im(self) -> $t {
                self.im
            }

            #[inline]
            fn scale_real(self, factor: $t) -> Self {
                Complex::new(self.re * factor, self.im * factor)
            }
        }
    };
}

impl_complex!(f32);
impl_complex!(f64);
