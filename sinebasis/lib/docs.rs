//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Units](#units)
//! - [Barrier decomposition](#barrier-decomposition)
//! - [Vacuum regions](#vacuum-regions)
//! - [Periodic potentials](#periodic-potentials)
//!
//! # Background
//! The one-dimensional time-independent Schrödinger equation (TISE),
//! ```text
//!    ħ² ∂²
//! - --- --- ψ(x) + V(x) ψ(x) = E ψ(x)
//!   2 m ∂x²
//! ```
//! is an eigenvalue problem for the Hamiltonian operator *H* = -(*ħ*²/2 *m*)
//! (*∂*²/*∂*x²) + *V*(*x*). Instead of discretizing *x*, this crate expands
//! *ψ* in a complete set of known functions and solves the resulting matrix
//! eigenvalue problem. The basis used is the set of eigenfunctions of an
//! infinite square well spanning the domain \[*x*<sub>i</sub>,
//! *x*<sub>f</sub>\] of width *L*[^1],
//! ```text
//!            ⎛2⎞¹ᐟ²    ⎛k π (x - xᵢ)⎞
//! φ_k(x)  =  ⎜-⎟    sin⎜------------⎟,   k = 1, 2, ...
//!            ⎝L⎠       ⎝     L      ⎠
//! ```
//! which vanish at both edges of the domain, are orthonormal, and are
//! eigenfunctions of the kinetic term. Writing *ψ* = Σ<sub>*k*</sub>
//! *c*<sub>*k*</sub> *φ*<sub>*k*</sub> and projecting onto *φ*<sub>*n*</sub>
//! gives
//! ```text
//! Σ_m H[n, m] c[m] = E c[n]
//!
//!              π² n²
//! H[n, m]  =  ------ δ[n, m] + ∫ φ_n(x) V(x) φ_m(x) dx
//!               L²
//! ```
//! Truncating the expansion to the first *N* basis functions gives a real,
//! symmetric *N*×*N* matrix whose eigenvalues approximate the lowest *N*
//! energies from above, and whose eigenvectors are the expansion
//! coefficients of the corresponding eigenstates. The approximation improves
//! monotonically with *N*, most quickly for the lowest states.
//!
//! The restriction to the domain is physical, not only numerical: every
//! solution is that of the given potential placed inside an infinite square
//! well. States of a bound potential should therefore be sought in a domain
//! wide enough that they decay to nothing before reaching its edges.
//!
//! # Units
//! All quantities in this crate are in natural units where *ħ*²/2 *m* = 1,
//! so that the TISE reads
//! ```text
//!   ∂²ψ
//! - --- + V(x) ψ(x) = E ψ(x)
//!   ∂x²
//! ```
//! Choosing a characteristic length *a* fixes the natural energy scale *ε* =
//! *ħ*²/2 *m* *a*², roughly the ground-state energy of a particle of mass
//! *m* confined to a box of size *a*. Positions are then measured in units of
//! *a* and energies (including potentials) in units of *ε*. In these units,
//! the *k*-th level of a bare infinite square well of width *L* has energy
//! *π*² *k*² / *L*².
//!
//! # Barrier decomposition
//! The potential matrix elements are integrals of a product of two sines
//! against *V*. When *V* is constant over an interval \[*a*, *b*\], the
//! integral has a closed form,
//! ```text
//! ∫_a^b φ_n(x) V φ_m(x) dx  =  V (F_nm(b) - F_nm(a))
//! ```
//! where, with *u* = *x* - *x*<sub>i</sub>,
//! ```text
//!          u     sin(2 n π u / L)
//! F_nn  =  -  -  ----------------                       (n = m)
//!          L        2 n π
//!
//!          sin((m - n) π u / L)   sin((m + n) π u / L)
//! F_nm  =  -------------------- - --------------------   (n ≠ m)
//!               (m - n) π              (m + n) π
//! ```
//! Any potential can be approximated to arbitrary precision by a sequence of
//! such constant-height "barriers", so the matrix elements are computed
//! without numerical quadrature by first reducing *V* to a list of
//! barriers. This is done by sampling *V* on a uniform grid across the domain
//! and collecting runs of equal values ("plateaus") into single barriers,
//! each with the height of *V* at its center.
//! Piecewise-constant potentials then reduce exactly (up to the grid
//! resolution at their edges) to a handful of barriers, while smooth
//! potentials reduce to one barrier per grid point, i.e. a midpoint-rule
//! staircase.
//!
//! The grid spacing is chosen from the magnitudes of the potential's
//! parameters: when all of them exceed 1, a fixed spacing of 0.1 is used;
//! otherwise the spacing is the smallest magnitude divided by a divisor
//! between 2 and 10, so that features set by small parameters are still
//! resolved.
//!
//! # Vacuum regions
//! Many potentials of interest consist of some structure surrounded by flat
//! "vacuum" on either side. When the two outermost plateaus differ in width
//! from every interior plateau (and from twice any interior width, which is
//! what a pair of adjacent identical interior plateaus would look like), they
//! are reported separately from the interior barriers. Both contribute to the
//! Hamiltonian in the same way; the distinction is informational.
//!
//! # Periodic potentials
//! A useful check of the method is the Kronig-Penney model[^2], a periodic
//! array of square wells. For deep, well-separated wells, tunneling between
//! neighbors is weak and the single-well levels split into narrow bands; in
//! a finite array of two wells, the lowest states come in near-degenerate
//! pairs whose splitting shrinks exponentially with the barrier between
//! them. Declaring the array with a single region body using the floor
//! modulo operator,
//! ```text
//! [parameters]
//! w = 2
//! v0 = -15
//! l = 10
//!
//! [regions]
//! lattice = "0, l|where((x % (2 * w)) < w, v0, 0)"
//! ```
//! shows the barrier scan recovering the individual wells from a single
//! non-constant expression.
//!
//! [^1]: D. J. Griffiths, *Introduction to Quantum Mechanics*, 2nd ed.,
//! Section 2.2 (Pearson Prentice Hall, 2005).
//!
//! [^2]: R. de L. Kronig and W. G. Penney, "Quantum mechanics of electrons in
//! crystal lattices." Proc. R. Soc. Lond. A **130** 814 499-513 (1931).
