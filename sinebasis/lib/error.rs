//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray as nd;
use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, A>(a: &nd::ArrayBase<S, nd::Ix1>, n: usize)
        -> Result<(), Self>
    where S: nd::Data<Elem = A>
    {
        let na = a.len();
        (na == n).then_some(()).ok_or(Self(na, n))
    }
}

/// Returned from the [expression language][crate::expr].
#[derive(Debug, Error)]
pub enum ExprError {
    /// A character that cannot begin any token.
    #[error("unexpected character {0:?} at position {1}")]
    UnexpectedChar(char, usize),

    /// A token that doesn't fit the grammar where it appears.
    #[error("unexpected {0} at position {1}")]
    UnexpectedToken(String, usize),

    /// The expression ended early.
    #[error("unexpected end of expression")]
    UnexpectedEnd,

    /// A numeric literal that could not be parsed.
    #[error("malformed number {0:?}")]
    BadNumber(String),

    /// A call to a function outside the allowed set.
    #[error("unknown function {0:?}")]
    UnknownFunction(String),

    /// A function called with the wrong number of arguments.
    #[error("{func} takes {expected} argument(s); got {got}")]
    Arity { func: String, expected: usize, got: usize },

    /// A name that is neither a parameter, a constant, nor the position
    /// variable.
    #[error("unknown name {0:?}")]
    UnknownName(String),

    /// An expression referencing the position variable where a plain number
    /// is required.
    #[error("expression depends on the position variable `x` but must be constant")]
    NotConstant,
}

/// Returned while reading a potential configuration. Every variant here is a
/// configuration error: the potential cannot be constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failure to read the configuration file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A line that is neither a section header, a comment, nor an entry.
    #[error("line {line}: expected a section header or `key = value`; got {text:?}")]
    Syntax { line: usize, text: String },

    /// An entry appearing before the first section header.
    #[error("line {line}: entry {key:?} appears outside of any section")]
    Orphan { line: usize, key: String },

    /// A section header appearing twice.
    #[error("line {line}: duplicate section [{name}]")]
    DuplicateSection { line: usize, name: String },

    /// A key appearing twice in the same section.
    #[error("line {line}: duplicate key {key:?} in section [{section}]")]
    DuplicateKey { line: usize, section: String, key: String },

    /// A required section is absent.
    #[error("[{0}] is required to define a potential")]
    MissingSection(&'static str),

    /// The `[regions]` section exists but declares nothing.
    #[error("at least one region is required to define a potential")]
    NoRegions,

    /// A parameter name that would shadow the position variable or a
    /// built-in constant.
    #[error("{0:?} is reserved and cannot be used as a parameter name")]
    ReservedName(String),

    /// A parameter expression that failed to parse or evaluate.
    #[error("parameter {name:?}: {source}")]
    Parameter { name: String, #[source] source: ExprError },

    /// A region whose text is not of the form `xi,xf|expression`, or whose
    /// interval is empty or non-finite.
    #[error("region {key:?}: {reason}")]
    Region { key: String, reason: String },

    /// A region whose interval or body expression failed to parse or
    /// evaluate.
    #[error("region {key:?}: {source}")]
    RegionExpr { key: String, #[source] source: ExprError },

    /// Two regions with intersecting intervals.
    #[error("regions [{0}, {1}) and [{2}, {3}) overlap")]
    Overlap(f64, f64, f64, f64),
}

/// Returned from [`Potential`][crate::potential::Potential] methods.
#[derive(Debug, Error)]
pub enum PotError {
    /// The potential was evaluated at something that isn't a number or a
    /// sequence of numbers.
    #[error("potentials can only be evaluated at numeric positions; got {0:?}")]
    InvalidArgument(String),

    /// Lookup of an undeclared parameter.
    #[error("{0:?} is not a parameter of this potential")]
    UnknownAttribute(String),

    /// [`ConfigError`]
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Returned from the [barrier scanner][crate::scan].
#[derive(Debug, Error)]
pub enum ScanError {
    /// No usable parameter magnitudes to derive a scan step from.
    #[error("cannot choose a scan step: the potential has no non-zero parameter magnitudes")]
    Degenerate,

    /// Step divisor outside of `[2, 10]`.
    #[error("scan step divisor must lie in [2, 10]; got {0}")]
    BadDivisor(f64),

    /// Non-positive or non-finite explicit step.
    #[error("scan step must be positive and finite; got {0}")]
    BadStep(f64),

    /// Empty, inverted, or non-finite domain.
    #[error("cannot scan over the domain [{0}, {1}]")]
    BadDomain(f64, f64),

    /// The chosen step would require an unreasonable number of samples.
    #[error("scan would require {0} samples; use a coarser step")]
    TooManySamples(usize),

    /// The potential produced a NaN or infinite value.
    #[error("potential is not finite at x = {0}")]
    NonFinite(f64),
}

/// Returned from [`Hamiltonian`][crate::hamiltonian::Hamiltonian]
/// construction and queries.
#[derive(Debug, Error)]
pub enum HamError {
    /// Fewer than one basis function requested.
    #[error("number of basis functions must be at least 1; got {0}")]
    InvalidBasisSize(usize),

    /// More solutions requested than basis functions available.
    #[error("requested {requested} solutions but only {available} are available")]
    TooManySolutions { requested: usize, available: usize },

    /// Empty, inverted, or non-finite domain.
    #[error("invalid domain [{0}, {1}]")]
    BadDomain(f64, f64),

    /// [`LengthError`]
    #[error("array length error: {0}")]
    Length(#[from] LengthError),

    /// [`PotError`]
    #[error("potential error: {0}")]
    Potential(#[from] PotError),

    /// [`ScanError`]
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),

    /// [`LinalgError`].
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),
}

impl HamError {
    pub(crate) fn check_basis_size(n_basis: usize) -> Result<(), Self> {
        (n_basis >= 1).then_some(()).ok_or(Self::InvalidBasisSize(n_basis))
    }

    pub(crate) fn check_domain(domain: (f64, f64)) -> Result<(), Self> {
        let (xi, xf) = domain;
        (xi.is_finite() && xf.is_finite() && xi < xf)
            .then_some(())
            .ok_or(Self::BadDomain(xi, xf))
    }
}

/// Returned from the [solution file][crate::output] reader and writer.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Failure to read or write the file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The first line is not the expected header.
    #[error("missing header line {0:?}")]
    MissingHeader(&'static str),

    /// A value that could not be parsed as a number.
    #[error("line {line}: cannot parse {token:?} as a number")]
    Parse { line: usize, token: String },

    /// A row with a different number of coefficients than the first row.
    #[error("line {line}: expected {expected} coefficients; got {got}")]
    Ragged { line: usize, expected: usize, got: usize },
}
