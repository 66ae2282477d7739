//! Square roots computed two ways.
//!
//! This crate compares the square root provided by the platform
//! ([`reference_sqrt`]) with a hand-iterated Newton–Raphson
//! approximation ([`newton_sqrt`]).  The Newton update for √x is
//!
//! z ← z - (z² - x) / (2z)
//!
//! and [`newton_sqrt`] applies it exactly ⌊x⌋ times starting from
//! z = 1, without any convergence test.  In particular, for x in
//! (0, 1) no update is performed and `1` is returned.
//!
//! # Example
//!
//! ```
//! use newtsqrt::{newton_sqrt, reference_sqrt};
//! assert_eq!(reference_sqrt(9.), 3.);
//! assert!((newton_sqrt(9.) - 3f64).abs() < 1e-12);
//! assert_eq!(newton_sqrt(0.5), 1.);
//! ```
//!
//! # Configurable iteration
//!
//! The function [`newton`] returns a [`Newton`] structure whose
//! default configuration reproduces [`newton_sqrt`] and which
//! provides methods to change the initial guess, the number of
//! iterations (see [`maxiter`][Newton::maxiter]) and the termination
//! criterion (see [`terminate`][Newton::terminate]).  [`newton_tol`]
//! starts with a tolerance based criterion instead.
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use newtsqrt::newton_tol;
//! assert!((newton_tol(0.5f64).root()? - 0.5f64.sqrt()).abs() < 1e-12);
//! # Ok(()) }
//! ```
//!
//! The driver ([`write_report`]) prints, for each i in 0..[`COUNT`],
//! both square roots and their absolute difference.

use std::{
    fmt::{self, Debug, Display, Formatter},
    io::{self, Write},
    ops::{Neg, Add, Sub, Mul, Div},
    result::Result,
};

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

/// Errors that may be returned by [`Newton::root`] and
/// [`Newton::estimate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Error<T> {
    /// The number `x` whose square root is requested is negative.
    Negative { x: T },
    /// The number `x` whose square root is requested is NaN or
    /// infinite.
    NotFinite { x: T },
    /// An iterate became the non-finite value `z`, for example
    /// because the initial guess was `0`.
    Diverged { z: T },
    /// Report that the maximum number of iterations has been reached,
    /// when option `maxiter_err` is turned on.  `z` is the last
    /// iterate.
    MaxIter { z: T },
}

impl<T: Display> Display for Error<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::Negative { x } =>
                write!(f, "cannot take the square root of {x} < 0"),
            Error::NotFinite { x } =>
                write!(f, "cannot take the square root of the non-finite \
                           value {x}"),
            Error::Diverged { z } =>
                write!(f, "the Newton iteration produced the non-finite \
                           value {z}"),
            Error::MaxIter { z } =>
                write!(f, "maximum number of iterations reached \
                           (last iterate: {z})"),
        }
    }
}

impl<T: Debug + Display> std::error::Error for Error<T> {}

////////////////////////////////////////////////////////////////////////
//
// Termination

/// Trait for termination criteria of the Newton iteration.
pub trait Terminate<T> {
    /// Return `true` if the iterate `z`, obtained by applying one
    /// Newton update to `prev`, is deemed good enough.
    ///
    /// This function may mutate `self`, e.g. to count calls.
    fn stop(&mut self, prev: &T, z: &T) -> bool;
}

/// Indicate that the type `Self` uses relative and absolute
/// tolerances that can be updated from type `U`.
pub trait SetTolerances<U> {
    /// Set the relative tolerance.  Set the default value if `rtol` is ≤ 0.
    fn set_rtol(&mut self, rtol: U);
    /// Set the absolute tolerance.  Set the default value if `atol` is < 0.
    fn set_atol(&mut self, atol: U);
}

/// Enable using a closure `stop` as a termination criterion.  The
/// call `stop(prev, z)` receives two consecutive iterates and must
/// return `true` to end the iteration with `z`.
impl<T, F> Terminate<T> for F
where
    F: FnMut(&T, &T) -> bool,
    T: Real,
{
    fn stop(&mut self, prev: &T, z: &T) -> bool {
        self(prev, z)
    }
}

/// Termination criterion that never fires: the iteration runs for
/// the full number of passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Never;

impl<T> Terminate<T> for Never {
    #[inline]
    fn stop(&mut self, _prev: &T, _z: &T) -> bool { false }
}

/// Termination criterion based on a relative tolerance `rtol` and an
/// absolute tolerance `atol`: the iteration stops as soon as two
/// consecutive iterates satisfy |z - prev| ≤ `rtol` · |z| + `atol`.
#[derive(Clone, Debug)]
pub struct Tol<U> {
    /// Relative tolerance.
    pub rtol: U,
    /// Absolute tolerance.
    pub atol: U,
}

macro_rules! impl_traits_tol_fXX {
    ($t: ty, $rtol: expr, $atol: expr) => {
        impl Default for Tol<$t> {
            fn default() -> Self { Tol { rtol: $rtol, atol: $atol } }
        }
        impl Terminate<$t> for Tol<$t> {
            #[inline]
            fn stop(&mut self, prev: &$t, z: &$t) -> bool {
                (z - prev).abs() <= self.rtol * z.abs() + self.atol
            }
        }
        impl SetTolerances<$t> for Tol<$t> {
            fn set_rtol(&mut self, rtol: $t) {
                self.rtol = if rtol <= 0. { $rtol } else { rtol }
            }
            fn set_atol(&mut self, atol: $t) {
                self.atol = if atol < 0. { $atol } else { atol }
            }
        }
    }
}

impl_traits_tol_fXX!(f64, 4. * f64::EPSILON, 2e-12);
impl_traits_tol_fXX!(f32, 4. * f32::EPSILON, 2e-6);

////////////////////////////////////////////////////////////////////////
//
// Real types

/// Floating point types on which square roots are computed.
pub trait Real:
    Copy + PartialOrd + Debug + Display
    + Neg<Output = Self> + Add<Output = Self> + Sub<Output = Self>
    + Mul<Output = Self> + Div<Output = Self>
{
    /// Type for the tolerance based termination criterion used by
    /// [`newton_tol`].
    type DefaultTerminate: Default + Terminate<Self>;

    const ZERO: Self;
    const ONE: Self;
    const TWO: Self;

    /// Square root as computed by the platform.
    fn sqrt(self) -> Self;

    fn abs(self) -> Self;

    /// Returns `true` iff `self` is neither infinite nor NaN.
    fn is_finite(self) -> bool;

    /// Number of Newton passes performed for the input `self`,
    /// i.e. ⌊`self`⌋.  Negative and NaN values give `0`.
    fn passes(self) -> usize;
}

macro_rules! impl_real_fXX {
    ($t: ty) => {
        impl Real for $t {
            type DefaultTerminate = Tol<$t>;
            const ZERO: Self = 0.;
            const ONE: Self = 1.;
            const TWO: Self = 2.;
            #[inline]
            fn sqrt(self) -> Self { <$t>::sqrt(self) }
            #[inline]
            fn abs(self) -> Self { <$t>::abs(self) }
            #[inline]
            fn is_finite(self) -> bool { <$t>::is_finite(self) }
            #[inline]
            fn passes(self) -> usize {
                // Float to integer casts truncate toward zero and
                // saturate (NaN ↦ 0).
                self as usize
            }
        }
    }
}

impl_real_fXX!(f64);
impl_real_fXX!(f32);

////////////////////////////////////////////////////////////////////////
//
// Square roots

/// Return the square root of `x ≥ 0` as computed by the platform
/// primitive.  This is the value the Newton approximations are
/// compared against.
///
/// ```
/// use newtsqrt::reference_sqrt;
/// assert_eq!(reference_sqrt(0.), 0.);
/// assert_eq!(reference_sqrt(4f32), 2.);
/// ```
#[inline]
pub fn reference_sqrt<T: Real>(x: T) -> T {
    x.sqrt()
}

/// One Newton update of `z` for the equation z² = `x`.
#[inline]
fn newton_step<T: Real>(z: T, x: T) -> T {
    z - (z * z - x) / (T::TWO * z)
}

/// Approximate √`x` by applying the Newton update exactly ⌊`x`⌋
/// times to the initial guess `1`.  `newton_sqrt(0)` is `0`.
///
/// There is no convergence test: large inputs get more passes than
/// they need and inputs in (0, 1) get none at all, in which case the
/// initial guess `1` is returned.  Use [`newton_tol`] for an
/// approximation that is accurate on the whole positive axis.
///
/// ```
/// use newtsqrt::newton_sqrt;
/// assert_eq!(newton_sqrt(0.), 0.);
/// assert_eq!(newton_sqrt(1.), 1.);
/// assert_eq!(newton_sqrt(0.25), 1.);
/// assert!((newton_sqrt(4.) - 2f64).abs() < 1e-6);
/// ```
pub fn newton_sqrt<T: Real>(x: T) -> T {
    if x == T::ZERO { return T::ZERO }
    let mut z = T::ONE;
    for _ in 0 .. x.passes() {
        z = newton_step(z, x);
    }
    z
}

////////////////////////////////////////////////////////////////////////
//
// Configurable Newton iteration

/// Outcome of a successful [`Newton`] run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate<T> {
    /// Approximation of the square root.
    pub root: T,
    /// Number of Newton updates performed.
    pub niter: usize,
}

/// Newton iteration for √x with configurable initial guess, number
/// of passes and termination criterion.  Created by [`newton`] or
/// [`newton_tol`].
pub struct Newton<T, Term> {
    x: T,
    z0: T,
    t: Term,
    maxiter: Option<usize>, // `None`: ⌊x⌋ passes
    maxiter_err: bool,
}

/// Approximate √`x` with Newton's method, configured as
/// [`newton_sqrt`]: initial guess `1`, ⌊`x`⌋ passes and no
/// termination criterion.  Nothing is computed until
/// [`root`][Newton::root] or [`estimate`][Newton::estimate] is
/// called.
///
/// Contrarily to [`newton_sqrt`], invalid inputs are reported as
/// errors.
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use newtsqrt::{newton, newton_sqrt};
/// let e = newton(9f64).estimate()?;
/// assert_eq!(e.niter, 9);
/// assert_eq!(e.root, newton_sqrt(9.));
/// assert!(newton(-1f64).root().is_err());
/// # Ok(()) }
/// ```
#[must_use]
pub fn newton<T: Real>(x: T) -> Newton<T, Never> {
    Newton {
        x,
        z0: T::ONE,
        t: Never,
        maxiter: None,
        maxiter_err: false,
    }
}

/// Approximate √`x` with Newton's method, stopping when two
/// consecutive iterates are close enough according to [`Tol`].
///
/// The default tolerances for [`f64`] (resp. [`f32`]) are
/// `rtol: 4. * f64::EPSILON` and `atol: 2e-12` (resp.
/// `rtol: 4. * f32::EPSILON` and `atol: 2e-6`).  The default maximum
/// number of iterations is `100` and reaching it simply returns the
/// last iterate (you can report that as an error by calling
/// [`maxiter_err`][Newton::maxiter_err]`(true)`).
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use newtsqrt::newton_tol;
/// let r = newton_tol(2f64).atol(0.).root()?;
/// assert!((r - 2f64.sqrt()).abs() < 1e-15);
/// # Ok(()) }
/// ```
#[must_use]
pub fn newton_tol<T: Real>(x: T) -> Newton<T, T::DefaultTerminate> {
    newton(x).maxiter(100).terminate(T::DefaultTerminate::default())
}

impl<T, Term> Newton<T, Term>
where T: Real, Term: Terminate<T> {
    /// Set the initial guess (default: `1`).
    pub fn initial(mut self, z0: T) -> Self {
        self.z0 = z0;
        self
    }

    /// Perform at most `n` Newton updates instead of ⌊x⌋.  With the
    /// default (never firing) criterion, exactly `n` updates are
    /// performed; `n = 0` returns the initial guess.
    pub fn maxiter(mut self, n: usize) -> Self {
        self.maxiter = Some(n);
        self
    }

    /// If `err` is `true` report the reach of the maximum number of
    /// iterations as an error.  Otherwise, just stop working and
    /// provide the last iterate.
    pub fn maxiter_err(mut self, err: bool) -> Self {
        self.maxiter_err = err;
        self
    }

    /// Change the termination criterion to `t`.
    ///
    /// You can use a closure `FnMut(&T, &T) -> bool` as the
    /// termination criterion `t`.
    pub fn terminate<Tr>(self, t: Tr) -> Newton<T, Tr>
    where Tr: Terminate<T> {
        Newton {
            t,
            x: self.x,
            z0: self.z0,
            maxiter: self.maxiter,
            maxiter_err: self.maxiter_err,
        }
    }

    /// Set the relative tolerance of the termination criterion (that
    /// implements [`SetTolerances`]), leaving unchanged the value of
    /// the absolute tolerance.
    ///
    /// Set the default value if `rtol` is ≤ 0.
    pub fn rtol<U>(mut self, rtol: U) -> Self
    where Term: SetTolerances<U> {
        self.t.set_rtol(rtol);
        self
    }

    /// Set the absolute tolerance of the termination criterion (that
    /// implements [`SetTolerances`]), leaving unchanged the value of
    /// the relative tolerance.
    ///
    /// Set the default value if `atol` is < 0.
    pub fn atol<U>(mut self, atol: U) -> Self
    where Term: SetTolerances<U> {
        self.t.set_atol(atol);
        self
    }

    /// Run the iteration and return the approximation of √x together
    /// with the number of updates performed.
    ///
    /// Return an error if x is negative or not finite, if an iterate
    /// is not finite or, when [`maxiter_err`][Newton::maxiter_err]
    /// was turned on, if the maximum number of iterations was reached
    /// before the termination criterion fired.
    pub fn estimate(&mut self) -> Result<Estimate<T>, Error<T>> {
        let x = self.x;
        if !x.is_finite() { return Err(Error::NotFinite { x }) }
        if x < T::ZERO { return Err(Error::Negative { x }) }
        if x == T::ZERO {
            return Ok(Estimate { root: T::ZERO, niter: 0 })
        }
        let maxiter = self.maxiter.unwrap_or_else(|| x.passes());
        let mut z = self.z0;
        for i in 0 .. maxiter {
            let prev = z;
            z = newton_step(z, x);
            tracing::trace!(pass = i + 1, z = %z, "newton update");
            if !z.is_finite() { return Err(Error::Diverged { z }) }
            if self.t.stop(&prev, &z) {
                return Ok(Estimate { root: z, niter: i + 1 })
            }
        }
        tracing::debug!(maxiter, x = %x, z = %z,
                        "maximum number of newton updates reached");
        if self.maxiter_err {
            Err(Error::MaxIter { z })
        } else {
            Ok(Estimate { root: z, niter: maxiter })
        }
    }

    /// Return an approximation of √x.  See
    /// [`estimate`][Newton::estimate] for the possible errors.
    pub fn root(&mut self) -> Result<T, Error<T>> {
        self.estimate().map(|e| e.root)
    }
}

////////////////////////////////////////////////////////////////////////
//
// Driver

/// Number of integers, starting from `0`, whose square roots are
/// reported by the `newtsqrt` program.
pub const COUNT: usize = 10;

/// Both square roots of the integer `i` and their absolute
/// difference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Comparison<T> {
    pub i: usize,
    /// [`reference_sqrt`] of `i`.
    pub sqrt: T,
    /// [`newton_sqrt`] of `i`.
    pub newt: T,
    /// |`sqrt` - `newt`|.
    pub diff: T,
}

impl Comparison<f64> {
    pub fn new(i: usize) -> Self {
        let x = i as f64;
        let sqrt = reference_sqrt(x);
        let newt = newton_sqrt(x);
        Comparison { i, sqrt, newt, diff: (sqrt - newt).abs() }
    }
}

/// Four lines, without a final newline.
impl<T: Display> Display for Comparison<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} squared:", self.i)?;
        writeln!(f, "  Sqrt: {}", self.sqrt)?;
        writeln!(f, "  Newt: {}", self.newt)?;
        write!(f, "  Difference: {}", self.diff)
    }
}

/// Comparisons for the integers `0 .. count`, in increasing order.
pub fn comparisons(count: usize) -> impl Iterator<Item = Comparison<f64>> {
    (0 .. count).map(Comparison::new)
}

/// Write the comparisons for the integers `0 .. count` to `out`.
///
/// ```
/// # fn main() -> std::io::Result<()> {
/// let mut out = Vec::new();
/// newtsqrt::write_report(&mut out, 2)?;
/// assert_eq!(String::from_utf8_lossy(&out),
///            "0 squared:\n  Sqrt: 0\n  Newt: 0\n  Difference: 0\n\
///             1 squared:\n  Sqrt: 1\n  Newt: 1\n  Difference: 0\n");
/// # Ok(()) }
/// ```
pub fn write_report<W: Write>(mut out: W, count: usize) -> io::Result<()> {
    for c in comparisons(count) {
        tracing::debug!(i = c.i, sqrt = c.sqrt, newt = c.newt,
                        diff = c.diff, "comparison");
        writeln!(out, "{c}")?;
    }
    out.flush()
}

////////////////////////////////////////////////////////////////////////
//
// Tests

#[cfg(test)]
macro_rules! assert_approx_eq {
    ($a: expr, $b: expr, $err: expr) => {
        let a = $a;
        let b = $b;
        if ! ((a - b).abs() <= $err) {
            panic!("|left - right| ≤ {:e}\n  left: {}\n right: {}",
                   $err, a, b);
        }
    }
}
