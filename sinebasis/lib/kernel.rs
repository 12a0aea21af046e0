//! Closed-form matrix elements of a rectangular barrier in the infinite
//! square well eigenbasis.
//!
//! Over a domain `[xi, xf]` of length `L`, the basis functions are
//! ```text
//! φ_k(x) = √(2/L) sin(k π (x - xi) / L),  k = 1, 2, ...
//! ```
//! For a barrier of constant height `V` over `[a, b]`, the matrix element
//! `∫ φ_n V φ_m dx` is `V (F(b) - F(a))` where `F` is one of the
//! antiderivatives
//! ```text
//!          u     sin(2 n π u / L)
//! F_nn  =  -  -  ----------------          (n = m)
//!          L        2 n π
//!
//!          sin((m - n) π u / L)   sin((m + n) π u / L)
//! F_nm  =  -------------------- - --------------------   (n ≠ m)
//!               (m - n) π              (m + n) π
//! ```
//! with `u = x - xi`, and the normalization `2/L` already folded in.

use std::f64::consts::PI;
use crate::scan::Barrier;

/// Infinite square well eigenbasis over a fixed domain.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SineBasis {
    xi: f64,
    xf: f64,
    l: f64,
}

impl SineBasis {
    /// Create a new basis over `domain`; the endpoints may be given in either
    /// order.
    pub fn new(domain: (f64, f64)) -> Self {
        let (xi, xf)
            = if domain.0 <= domain.1 { domain } else { (domain.1, domain.0) };
        Self { xi, xf, l: (xf - xi).abs() }
    }

    /// Width of the domain.
    pub fn length(&self) -> f64 { self.l }

    /// Left and right edges of the domain.
    pub fn domain(&self) -> (f64, f64) { (self.xi, self.xf) }

    /// Evaluate the `k`-th basis function, which vanishes outside of the
    /// domain.
    pub fn phi(&self, k: usize, x: f64) -> f64 {
        if x < self.xi || x > self.xf { return 0.0; }
        (2.0 / self.l).sqrt() * (k as f64 * PI * (x - self.xi) / self.l).sin()
    }

    /// Kinetic energy of the `n`-th basis function, `π² n² / L²`, in units
    /// where `ħ²/2m = 1`.
    pub fn kinetic(&self, n: usize) -> f64 {
        (PI * n as f64 / self.l).powi(2)
    }

    /// Antiderivative for diagonal elements.
    pub fn fnn(&self, x: f64, n: usize) -> f64 {
        let u = x - self.xi;
        let n = n as f64;
        u / self.l - (2.0 * n * PI * u / self.l).sin() / (2.0 * n * PI)
    }

    /// Antiderivative for off-diagonal elements.
    ///
    /// `n` and `m` must differ.
    pub fn fnm(&self, x: f64, n: usize, m: usize) -> f64 {
        let u = x - self.xi;
        let d = m as f64 - n as f64;
        let s = (m + n) as f64;
        (d * PI * u / self.l).sin() / (d * PI)
            - (s * PI * u / self.l).sin() / (s * PI)
    }

    // barrier edges clipped to the domain, since the basis functions vanish
    // outside of it
    fn clip(&self, b: &Barrier) -> Option<(f64, f64)> {
        let a = b.left().max(self.xi);
        let c = b.right().min(self.xf);
        (a < c).then_some((a, c))
    }

    /// Contribution of a single barrier to the `(n, n)` element.
    pub fn diag(&self, b: &Barrier, n: usize) -> f64 {
        match self.clip(b) {
            Some((a, c)) => b.height * (self.fnn(c, n) - self.fnn(a, n)),
            None => 0.0,
        }
    }

    /// Contribution of a single barrier to the `(n, m)` element, `n ≠ m`.
    pub fn offdiag(&self, b: &Barrier, n: usize, m: usize) -> f64 {
        match self.clip(b) {
            Some((a, c)) => b.height * (self.fnm(c, n, m) - self.fnm(a, n, m)),
            None => 0.0,
        }
    }

    /// Contribution of a single barrier to the `(n, m)` element for any `n`,
    /// `m`.
    pub fn element(&self, b: &Barrier, n: usize, m: usize) -> f64 {
        if n == m { self.diag(b, n) } else { self.offdiag(b, n, m) }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray as nd;
    use crate::utils::trapz;
    use super::*;

    fn barrier(left: f64, right: f64, height: f64) -> Barrier {
        Barrier { center: (left + right) / 2.0, width: right - left, height }
    }

    // direct numerical integration of φ_n V φ_m over the barrier
    fn numeric(basis: &SineBasis, b: &Barrier, n: usize, m: usize) -> f64 {
        let x: nd::Array1<f64> = nd::Array1::linspace(b.left(), b.right(), 20001);
        let dx = x[1] - x[0];
        let y = x.mapv(|xk| b.height * basis.phi(n, xk) * basis.phi(m, xk));
        trapz(&y, dx)
    }

    #[test]
    fn orthonormal_over_full_domain() {
        let basis = SineBasis::new((0.0, 10.0));
        let full = barrier(0.0, 10.0, 1.0);
        for n in 1..=6 {
            assert_abs_diff_eq!(basis.diag(&full, n), 1.0, epsilon = 1e-12);
            for m in (1..=6).filter(|m| *m != n) {
                assert_abs_diff_eq!(basis.offdiag(&full, n, m), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn matches_numerical_integration() {
        for domain in [(0.0, 10.0), (-3.0, 2.0)] {
            let basis = SineBasis::new(domain);
            let (xi, xf) = domain;
            let l = xf - xi;
            let b = barrier(xi + 0.3 * l, xi + 0.45 * l, -7.5);
            for n in 1..=5 {
                for m in 1..=5 {
                    assert_abs_diff_eq!(
                        basis.element(&b, n, m),
                        numeric(&basis, &b, n, m),
                        epsilon = 1e-6,
                    );
                }
            }
        }
    }

    #[test]
    fn symmetric_in_indices() {
        let basis = SineBasis::new((0.0, 4.0));
        let b = barrier(1.1, 1.9, 3.0);
        for n in 1..=8 {
            for m in 1..=8 {
                assert_abs_diff_eq!(
                    basis.element(&b, n, m),
                    basis.element(&b, m, n),
                    epsilon = 1e-14,
                );
            }
        }
    }

    #[test]
    fn clips_to_domain() {
        let basis = SineBasis::new((0.0, 1.0));
        let inside = barrier(0.5, 1.0, 2.0);
        let overhang = barrier(0.5, 1.5, 2.0);
        let outside = barrier(1.5, 2.5, 2.0);
        assert_eq!(basis.diag(&overhang, 3), basis.diag(&inside, 3));
        assert_eq!(basis.diag(&outside, 3), 0.0);
        assert_eq!(basis.offdiag(&outside, 1, 2), 0.0);
    }

    #[test]
    fn kinetic_energies() {
        let basis = SineBasis::new((10.0, 0.0));
        assert_eq!(basis.domain(), (0.0, 10.0));
        assert_abs_diff_eq!(basis.kinetic(1), PI * PI / 100.0, epsilon = 1e-15);
        assert_abs_diff_eq!(basis.kinetic(3), 9.0 * PI * PI / 100.0, epsilon = 1e-14);
        assert_eq!(basis.phi(2, -1.0), 0.0);
        assert_abs_diff_eq!(basis.phi(1, 5.0), (0.2_f64).sqrt(), epsilon = 1e-15);
    }
}
