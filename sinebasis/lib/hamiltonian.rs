//! Assembly and diagonalization of the Hamiltonian in the infinite square
//! well eigenbasis.

use std::cmp;
use ndarray as nd;
use ndarray_linalg::{ self as la, EighInto };
use crate::{
    Arr1,
    error::{ HamError, LengthError },
    kernel::SineBasis,
    potential::Potential,
    scan::{ Barriers, ScanConfig },
    utils::wf_renormalize,
};

pub type HamResult<T> = Result<T, HamError>;

/// A single eigenstate of the Hamiltonian.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// Energy
    pub e: f64,
    /// Coefficients in the sine basis, starting with `k = 1`.
    pub coeffs: nd::Array1<f64>,
}

impl Solution {
    /// Compare two `Solution`s by their energy.
    pub fn cmp_energy(&self, other: &Self) -> Option<cmp::Ordering> {
        self.e.partial_cmp(&other.e)
    }
}

/// Compute the `n_basis × n_basis` Hamiltonian matrix for a set of barriers.
///
/// Element `(n, m)` (1-indexed) is the sum over all barriers of the
/// [barrier matrix elements][SineBasis::element], plus the kinetic energy
/// `π² n² / L²` on the diagonal. Only the lower triangle is computed; the
/// upper triangle is its mirror image.
pub fn build_matrix(basis: &SineBasis, barriers: &Barriers, n_basis: usize)
    -> nd::Array2<f64>
{
    let mut H: nd::Array2<f64> = nd::Array2::zeros((n_basis, n_basis));
    for i in 0..n_basis {
        let n = i + 1;
        H[[i, i]]
            = basis.kinetic(n)
            + barriers.iter().map(|b| basis.diag(b, n)).sum::<f64>();
        for j in 0..i {
            let m = j + 1;
            let hnm: f64
                = barriers.iter().map(|b| basis.offdiag(b, n, m)).sum();
            H[[i, j]] = hnm;
            H[[j, i]] = hnm;
        }
    }
    H
}

/// Options for [`Hamiltonian::with_options`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct HamOptions {
    /// Left edge of the domain; defaults to the left-most region endpoint.
    pub xi: Option<f64>,
    /// Right edge of the domain; defaults to the right-most region endpoint.
    pub xf: Option<f64>,
    /// Barrier scan settings.
    pub scan: ScanConfig,
}

/// The Hamiltonian of a particle in a [`Potential`], expanded in the infinite
/// square well eigenbasis of the domain and diagonalized.
///
/// A `Hamiltonian` is fixed once constructed; to change the basis size or the
/// potential, build a new one (see [`Self::into_potential`]).
///
/// ```
/// use std::f64::consts::PI;
/// use sinebasis::{ hamiltonian::Hamiltonian, potential::Potential };
///
/// let pot: Potential = "
/// [parameters]
/// v0 = -15
/// w = 1
///
/// [regions]
/// left = \"0, 4.5|0\"
/// well = \"4.5, 5.5|v0\"
/// right = \"5.5, 10|0\"
/// ".parse().unwrap();
/// let ham = Hamiltonian::new(pot, 50).unwrap();
/// assert_eq!(ham.domain(), (0.0, 10.0));
/// assert!(ham.eigenvals()[0] < PI.powi(2) / 100.0);
/// ```
#[derive(Clone, Debug)]
pub struct Hamiltonian {
    pot: Potential,
    basis: SineBasis,
    barriers: Barriers,
    ham: nd::Array2<f64>,
    eigenvals: nd::Array1<f64>,
    eigenvecs: nd::Array2<f64>,
}

impl Hamiltonian {
    /// Build with the domain taken from the potential's regions and default
    /// scan settings.
    pub fn new(pot: Potential, n_basis: usize) -> HamResult<Self> {
        Self::with_options(pot, n_basis, HamOptions::default())
    }

    /// Build with explicit options.
    pub fn with_options(pot: Potential, n_basis: usize, opts: HamOptions)
        -> HamResult<Self>
    {
        HamError::check_basis_size(n_basis)?;
        let (xi_pot, xf_pot) = pot.bounds();
        let domain = (opts.xi.unwrap_or(xi_pot), opts.xf.unwrap_or(xf_pot));
        HamError::check_domain(domain)?;
        let basis = SineBasis::new(domain);
        let barriers = opts.scan.scan(&pot, domain)?;
        let ham = build_matrix(&basis, &barriers, n_basis);
        let (eigenvals, eigenvecs): (nd::Array1<f64>, nd::Array2<f64>)
            = ham.clone().eigh_into(la::UPLO::Lower)?;
        Ok(Self { pot, basis, barriers, ham, eigenvals, eigenvecs })
    }

    /// Number of basis functions.
    pub fn n_basis(&self) -> usize { self.eigenvals.len() }

    /// Left and right edges of the domain.
    pub fn domain(&self) -> (f64, f64) { self.basis.domain() }

    /// Get a reference to the basis.
    pub fn basis(&self) -> &SineBasis { &self.basis }

    /// Get a reference to the potential.
    pub fn potential(&self) -> &Potential { &self.pot }

    /// Evaluate the potential at a single position.
    pub fn eval_potential(&self, x: f64) -> f64 { self.pot.eval(x) }

    /// Get the barriers the matrix was assembled from.
    pub fn barriers(&self) -> &Barriers { &self.barriers }

    /// Get a reference to the Hamiltonian matrix.
    pub fn ham(&self) -> &nd::Array2<f64> { &self.ham }

    /// Get the energy eigenvalues, in ascending order.
    pub fn eigenvals(&self) -> &nd::Array1<f64> { &self.eigenvals }

    /// Get the eigenvectors, stored as the columns of the returned matrix in
    /// the same order as [`Self::eigenvals`].
    pub fn eigenvecs(&self) -> &nd::Array2<f64> { &self.eigenvecs }

    /// Get the basis coefficients of the `k`-th eigenstate (0-indexed).
    ///
    /// *Panics if `k` is out of bounds*.
    pub fn eigenvec(&self, k: usize) -> nd::ArrayView1<'_, f64> {
        self.eigenvecs.column(k)
    }

    /// Return the lowest `n_solutions` eigenstates.
    pub fn solutions(&self, n_solutions: usize) -> HamResult<Vec<Solution>> {
        let available = self.n_basis();
        if n_solutions > available {
            return Err(HamError::TooManySolutions {
                requested: n_solutions,
                available,
            });
        }
        let sols: Vec<Solution>
            = self.eigenvals.iter().zip(self.eigenvecs.columns())
            .take(n_solutions)
            .map(|(e, v)| Solution { e: *e, coeffs: v.to_owned() })
            .collect();
        Ok(sols)
    }

    /// Reconstruct a wavefunction on an array of positions from its basis
    /// coefficients.
    pub fn wavefunction<S, T>(&self, coeffs: &Arr1<S>, x: &Arr1<T>)
        -> HamResult<nd::Array1<f64>>
    where
        S: nd::Data<Elem = f64>,
        T: nd::Data<Elem = f64>,
    {
        LengthError::check(coeffs, self.n_basis())?;
        Ok(x.mapv(|xk| self.expand(coeffs, xk)))
    }

    fn expand<S>(&self, coeffs: &Arr1<S>, x: f64) -> f64
    where S: nd::Data<Elem = f64>
    {
        coeffs.iter().enumerate()
            .map(|(i, c)| c * self.basis.phi(i + 1, x))
            .sum()
    }

    /// Sample the `k`-th eigenstate (0-indexed) on `npoints` evenly spaced
    /// points spanning the domain, renormalized on that grid.
    ///
    /// *Panics if `k` is out of bounds or `npoints` is less than 2*.
    pub fn wavefunction_grid(&self, k: usize, npoints: usize)
        -> (nd::Array1<f64>, nd::Array1<f64>)
    {
        let (xi, xf) = self.domain();
        let x: nd::Array1<f64> = nd::Array1::linspace(xi, xf, npoints);
        let dx = x[1] - x[0];
        let coeffs = self.eigenvec(k);
        let mut psi: nd::Array1<f64> = x.mapv(|xk| self.expand(&coeffs, xk));
        wf_renormalize(&mut psi, dx);
        (x, psi)
    }

    /// Release the potential, e.g. to adjust it before building anew.
    pub fn into_potential(self) -> Potential { self.pot }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;
    use approx::assert_abs_diff_eq;
    use crate::{ error::ScanError, utils::wf_norm };
    use super::*;

    const SQUARE: &str = "
[parameters]
l = 10
v0 = 0

[regions]
well = \"0, l|v0\"
";

    const SINGLE: &str = "
[parameters]
v0 = -15
w = 1
l = 10

[regions]
left = \"0, (l - w) / 2|0\"
well = \"(l - w) / 2, (l + w) / 2|v0\"
right = \"(l + w) / 2, l|0\"
";

    #[test]
    fn square_well_is_diagonal() {
        let pot: Potential = SQUARE.parse().unwrap();
        let ham = Hamiltonian::new(pot, 12).unwrap();
        let H = ham.ham();
        for ((i, j), h) in H.indexed_iter() {
            if i == j {
                let n = (i + 1) as f64;
                assert_abs_diff_eq!(*h, PI * PI * n * n / 100.0, epsilon = 1e-12);
            } else {
                assert_eq!(*h, 0.0);
            }
        }
        for (k, e) in ham.eigenvals().iter().enumerate() {
            let n = (k + 1) as f64;
            assert_abs_diff_eq!(*e, PI * PI * n * n / 100.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn symmetric_and_sorted() {
        let pot: Potential = SINGLE.parse().unwrap();
        let ham = Hamiltonian::new(pot, 30).unwrap();
        let H = ham.ham();
        for i in 0..30 {
            for j in 0..30 {
                assert_eq!(H[[i, j]], H[[j, i]]);
            }
        }
        assert!(ham.eigenvals().windows(2).into_iter().all(|w| w[0] <= w[1]));
    }

    #[test]
    fn attractive_well_lowers_ground_state() {
        let pot: Potential = SINGLE.parse().unwrap();
        let ham = Hamiltonian::new(pot, 50).unwrap();
        assert!(ham.eigenvals()[0] < PI * PI / 100.0);
        assert!(ham.eigenvals()[0] < 0.0);
        assert_eq!(ham.domain(), (0.0, 10.0));
        assert_eq!(ham.eval_potential(5.0), -15.0);
    }

    #[test]
    fn eigenvectors_are_orthonormal() {
        let pot: Potential = SINGLE.parse().unwrap();
        let ham = Hamiltonian::new(pot, 20).unwrap();
        let V = ham.eigenvecs();
        let overlap = V.t().dot(V);
        for ((i, j), o) in overlap.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_abs_diff_eq!(*o, expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn truncated_solutions() {
        let pot: Potential = SINGLE.parse().unwrap();
        let ham = Hamiltonian::new(pot, 20).unwrap();
        let sols = ham.solutions(5).unwrap();
        assert_eq!(sols.len(), 5);
        assert!(sols.iter().all(|s| s.coeffs.len() == 20));
        assert_eq!(sols[0].e, ham.eigenvals()[0]);
        assert_eq!(
            sols[0].cmp_energy(&sols[1]),
            Some(cmp::Ordering::Less),
        );
        assert!(matches!(
            ham.solutions(21),
            Err(HamError::TooManySolutions { requested: 21, available: 20 })
        ));
    }

    #[test]
    fn wavefunctions() {
        let pot: Potential = SINGLE.parse().unwrap();
        let ham = Hamiltonian::new(pot, 40).unwrap();
        let (x, psi) = ham.wavefunction_grid(0, 2001);
        let dx = x[1] - x[0];
        assert_abs_diff_eq!(wf_norm(&psi, dx), 1.0, epsilon = 1e-12);
        // the ground state piles up in the well
        let imax = psi.iter().enumerate()
            .max_by(|l, r| l.1.abs().total_cmp(&r.1.abs()))
            .unwrap()
            .0;
        assert!((x[imax] - 5.0).abs() < 0.5);

        // coefficients are orthonormal, so the reconstruction is already
        // normalized
        let direct = ham.wavefunction(&ham.eigenvec(0), &x).unwrap();
        assert_abs_diff_eq!(wf_norm(&direct, dx), 1.0, epsilon = 1e-4);
        assert!(matches!(
            ham.wavefunction(&nd::Array1::<f64>::zeros(3), &x),
            Err(HamError::Length(_))
        ));
    }

    #[test]
    fn domain_override() {
        let pot: Potential = SINGLE.parse().unwrap();
        let opts = HamOptions { xi: Some(-5.0), xf: Some(15.0), ..Default::default() };
        let ham = Hamiltonian::with_options(pot, 10, opts).unwrap();
        assert_eq!(ham.domain(), (-5.0, 15.0));
        assert_abs_diff_eq!(ham.basis().length(), 20.0, epsilon = 1e-15);
    }

    #[test]
    fn failures() {
        let pot: Potential = SINGLE.parse().unwrap();
        assert!(matches!(
            Hamiltonian::new(pot.clone(), 0),
            Err(HamError::InvalidBasisSize(0))
        ));
        let opts = HamOptions { xi: Some(3.0), xf: Some(3.0), ..Default::default() };
        assert!(matches!(
            Hamiltonian::with_options(pot, 5, opts),
            Err(HamError::BadDomain(..))
        ));
        let bare: Potential = "[regions]\na = 0, 1|2".parse().unwrap();
        assert!(matches!(
            Hamiltonian::new(bare, 5),
            Err(HamError::Scan(ScanError::Degenerate))
        ));
    }
}
