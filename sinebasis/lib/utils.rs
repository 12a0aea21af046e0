//! Miscellaneous tools.

use std::ops::Add;
use ndarray::{ self as nd, Ix1 };
use ndarray_linalg::Scalar;
use num_traits::{ One, Zero };

/// Integrate using the trapezoidal rule.
///
/// *Panics if `y` has length less than 2*.
#[cfg(test)]
pub(crate) fn trapz<S, A>(y: &nd::ArrayBase<S, Ix1>, dx: A) -> A
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    let n: usize = y.len();
    let two = A::one() + A::one();
    (dx / two) * (y[0] + two * y.slice(nd::s![1..n - 1]).sum() + y[n - 1])
}

/// Calculate the norm of a wavefunction.
///
/// *Panics if `q` has length less than 2*.
pub fn wf_norm<S, A>(q: &nd::ArrayBase<S, Ix1>, dx: A::Real) -> A::Real
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    let n: usize = q.len();
    let two = <A as Scalar>::Real::one() + <A as Scalar>::Real::one();
    (dx / two) * (
        q[0].square()
        + two * q.iter().skip(1).take(n - 2).map(|qk| qk.square())
            .fold(<A as Scalar>::Real::zero(), <A as Scalar>::Real::add)
        + q[n - 1].square()
    )
}

/// Renormalize a wavefunction in place.
///
/// *Panics if `q` has length less than 2*.
pub fn wf_renormalize<S, A>(q: &mut nd::ArrayBase<S, Ix1>, dx: A::Real)
where
    S: nd::DataMut<Elem = A>,
    A: Scalar,
{
    let norm = A::from_real(wf_norm(q, dx).sqrt());
    q.iter_mut().for_each(|qk| { *qk /= norm; });
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use approx::assert_abs_diff_eq;
    use super::*;

    #[test]
    fn integrates_sine_squared() {
        let x: nd::Array1<f64> = nd::Array1::linspace(0.0, PI, 1001);
        let dx = x[1] - x[0];
        let y = x.mapv(|xk| xk.sin().powi(2));
        assert_abs_diff_eq!(trapz(&y, dx), PI / 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(wf_norm(&x.mapv(f64::sin), dx), PI / 2.0, epsilon = 1e-10);
    }

    #[test]
    fn renormalizes() {
        let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 501);
        let dx = x[1] - x[0];
        let mut q = x.mapv(|xk| 3.0 * (PI * xk).sin());
        wf_renormalize(&mut q, dx);
        assert_abs_diff_eq!(wf_norm(&q, dx), 1.0, epsilon = 1e-12);
    }
}
