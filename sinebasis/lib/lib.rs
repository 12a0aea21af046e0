#![allow(non_snake_case)]

//! Provides functions and higher-level constructs for the solution of the
//! one-dimensional, time-independent Schrödinger equation by expansion in the
//! eigenbasis of an infinite square well.
//!
//! Potentials are declared as piecewise functions of position over a set of
//! disjoint regions (see [`potential`] and [`config`]). A declared potential
//! is reduced to a list of rectangular barriers by a coarse scan (see
//! [`scan`]), whose matrix elements in the sine basis have closed forms (see
//! [`kernel`]), so that the Hamiltonian matrix is assembled without any
//! numerical quadrature before being diagonalized (see [`hamiltonian`]).
//!
//! Units are such that *ħ*²/2*m* = 1.
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod expr;
pub mod config;
pub mod potential;
pub mod scan;
pub mod kernel;
pub mod hamiltonian;
pub mod output;
pub mod utils;

pub mod docs;

pub(crate) const DEF_COARSE_STEP: f64 = 0.1;
pub(crate) const DEF_DIVISOR: f64 = 10.0;
pub(crate) const MAX_SCAN_SAMPLES: usize = 100_000_000;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
