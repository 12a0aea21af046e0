//! Piecewise-defined one-dimensional potentials.
//!
//! A [`Potential`] is declared by a configuration with two sections:
//! `[parameters]`, holding `name = <expression>` lines evaluated in order, and
//! `[regions]`, holding `key = "<xi>,<xf>|<expression>"` lines. Each region
//! covers the half-open interval `[xi, xf)`; its body is either a constant or,
//! if it references `x`, a function of position. Outside of all regions the
//! potential is zero.
//!
//! ```
//! use sinebasis::potential::Potential;
//!
//! let mut pot: Potential = "
//! [parameters]
//! w = 1
//! v0 = -15
//!
//! [regions]
//! left = \"0, 5 - w / 2|0\"
//! well = \"5 - w / 2, 5 + w / 2|v0\"
//! right = \"5 + w / 2, 10|0\"
//! ".parse().unwrap();
//! assert_eq!(pot.eval(5.0), -15.0);
//! assert_eq!(pot.eval(11.0), 0.0);
//!
//! pot.adjust([("v0", -3.0)]).unwrap();
//! assert_eq!(pot.eval(5.0), -3.0);
//! ```

use std::{
    collections::{ BTreeMap, BTreeSet },
    path::{ Path, PathBuf },
    str::FromStr,
};
use ndarray as nd;
use crate::{
    Arr1,
    config::{ Config, Entry },
    error::{ ConfigError, PotError },
    expr::{ self, BoundExpr, Expr },
};

pub type PotResult<T> = Result<T, PotError>;

/// Name of the section holding parameter definitions.
pub const PARAMETERS: &str = "parameters";

/// Name of the section holding region definitions.
pub const REGIONS: &str = "regions";

/// The value of a potential within a single region.
#[derive(Clone, Debug, PartialEq)]
pub enum RegionFn {
    Const(f64),
    Func(BoundExpr),
}

impl RegionFn {
    /// Evaluate at position `x`.
    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Self::Const(v) => *v,
            Self::Func(f) => f.eval(x),
        }
    }

    /// Return `true` if `self` is `Const`.
    pub fn is_const(&self) -> bool { matches!(self, Self::Const(_)) }
}

/// A half-open interval `[start, end)` and the potential's value over it.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    pub start: f64,
    pub end: f64,
    pub value: RegionFn,
}

impl Region {
    /// Return `true` if `x` lies in `[start, end)`.
    pub fn contains(&self, x: f64) -> bool { self.start <= x && x < self.end }
}

// unbound form of a region, kept so that regions can be re-derived whenever
// parameters change
#[derive(Clone, Debug)]
struct RegionDecl {
    key: String,
    start: Expr,
    end: Expr,
    body: Expr,
}

impl RegionDecl {
    fn parse(entry: &Entry, modules: &mut BTreeSet<&'static str>)
        -> Result<Self, ConfigError>
    {
        let key = entry.key.clone();
        let (interval, body)
            = entry.value.split_once('|')
            .ok_or_else(|| ConfigError::Region {
                key: key.clone(),
                reason: "expected `<xi>,<xf>|<expression>`".to_string(),
            })?;
        let (bounds, mods)
            = Expr::parse_list(interval)
            .map_err(|source| ConfigError::RegionExpr { key: key.clone(), source })?;
        modules.extend(mods);
        let (body, mods)
            = Expr::parse_with_modules(body)
            .map_err(|source| ConfigError::RegionExpr { key: key.clone(), source })?;
        modules.extend(mods);
        let [start, end]: [Expr; 2]
            = bounds.try_into()
            .map_err(|b: Vec<Expr>| ConfigError::Region {
                key: key.clone(),
                reason: format!("expected two interval bounds; got {}", b.len()),
            })?;
        Ok(Self { key, start, end, body })
    }

    fn derive(&self, params: &BTreeMap<String, f64>)
        -> Result<Region, ConfigError>
    {
        let err = |source| {
            ConfigError::RegionExpr { key: self.key.clone(), source }
        };
        let start = self.start.bind_const(params).map_err(err)?;
        let end = self.end.bind_const(params).map_err(err)?;
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(ConfigError::Region {
                key: self.key.clone(),
                reason: format!("[{}, {}) is not a finite, non-empty interval", start, end),
            });
        }
        let f = self.body.bind(params).map_err(err)?;
        let value
            = match f.as_const() {
                Some(v) => RegionFn::Const(v),
                None => RegionFn::Func(f),
            };
        Ok(Region { start, end, value })
    }
}

// full rebuild of the region list from the declarations under the given
// parameters; a repeated interval replaces the earlier body, and any other
// overlap is an error
fn derive_regions(decls: &[RegionDecl], params: &BTreeMap<String, f64>)
    -> Result<Vec<Region>, ConfigError>
{
    let mut regions: Vec<Region> = Vec::with_capacity(decls.len());
    for decl in decls.iter() {
        let region = decl.derive(params)?;
        match regions.iter_mut()
            .find(|r| r.start == region.start && r.end == region.end)
        {
            Some(existing) => { *existing = region; },
            None => { regions.push(region); },
        }
    }
    regions.sort_by(|l, r| l.start.total_cmp(&r.start));
    for (l, r) in regions.iter().zip(regions.iter().skip(1)) {
        if r.start < l.end {
            return Err(ConfigError::Overlap(l.start, l.end, r.start, r.end));
        }
    }
    Ok(regions)
}

/// Argument to [`Potential::evaluate`].
#[derive(Clone, Debug)]
pub enum PotArg<'a> {
    /// A single position.
    Scalar(f64),
    /// A sequence of positions.
    Seq(nd::ArrayView1<'a, f64>),
    /// Text, which is never a valid position and always gives
    /// [`PotError::InvalidArgument`].
    Text(&'a str),
}

impl From<f64> for PotArg<'_> {
    fn from(x: f64) -> Self { Self::Scalar(x) }
}

impl From<i32> for PotArg<'_> {
    fn from(x: i32) -> Self { Self::Scalar(x.into()) }
}

impl<'a> From<&'a [f64]> for PotArg<'a> {
    fn from(x: &'a [f64]) -> Self { Self::Seq(nd::ArrayView1::from(x)) }
}

impl<'a> From<&'a Vec<f64>> for PotArg<'a> {
    fn from(x: &'a Vec<f64>) -> Self { Self::Seq(nd::ArrayView1::from(x)) }
}

impl<'a> From<&'a nd::Array1<f64>> for PotArg<'a> {
    fn from(x: &'a nd::Array1<f64>) -> Self { Self::Seq(x.view()) }
}

impl<'a> From<nd::ArrayView1<'a, f64>> for PotArg<'a> {
    fn from(x: nd::ArrayView1<'a, f64>) -> Self { Self::Seq(x) }
}

impl<'a> From<&'a str> for PotArg<'a> {
    fn from(x: &'a str) -> Self { Self::Text(x) }
}

/// Result of [`Potential::evaluate`], shaped like its argument.
#[derive(Clone, Debug, PartialEq)]
pub enum PotValue {
    Scalar(f64),
    Array(nd::Array1<f64>),
}

impl PotValue {
    /// Return the scalar value, if `self` is `Scalar`.
    pub fn scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(v) => Some(*v),
            Self::Array(_) => None,
        }
    }

    /// Return the array of values, if `self` is `Array`.
    pub fn array(&self) -> Option<&nd::Array1<f64>> {
        match self {
            Self::Scalar(_) => None,
            Self::Array(a) => Some(a),
        }
    }
}

/// A piecewise-defined potential with a named set of numeric parameters.
///
/// Numeric parameters and the set of modules referenced by qualified function
/// names (`np.sin`, `math.pi`, ...) are kept apart; only the former are
/// physical quantities.
#[derive(Clone, Debug)]
pub struct Potential {
    source: Option<PathBuf>,
    params: BTreeMap<String, f64>,
    modules: BTreeSet<&'static str>,
    decls: Vec<RegionDecl>,
    regions: Vec<Region>,
}

impl Potential {
    /// Read a potential from a configuration file.
    pub fn from_file<P>(path: P) -> PotResult<Self>
    where P: AsRef<Path>
    {
        let path = path.as_ref();
        let config = Config::from_file(path)?;
        let source = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Ok(Self::from_config(&config, Some(source))?)
    }

    /// Read a potential from configuration text.
    pub fn from_config_str(text: &str) -> PotResult<Self> {
        let config = Config::parse(text)?;
        Ok(Self::from_config(&config, None)?)
    }

    /// Build a potential from an already-parsed configuration.
    ///
    /// `source` is only used to identify the potential in warnings.
    pub fn from_config(config: &Config, source: Option<PathBuf>)
        -> Result<Self, ConfigError>
    {
        let mut params: BTreeMap<String, f64> = BTreeMap::new();
        let mut modules: BTreeSet<&'static str> = BTreeSet::new();
        if let Some(section) = config.section(PARAMETERS) {
            for Entry { key, value, .. } in section.entries.iter() {
                let reserved
                    = key == expr::POSITION
                    || expr::CONSTANTS.iter().any(|(c, _)| *c == key.as_str());
                if reserved {
                    return Err(ConfigError::ReservedName(key.clone()));
                }
                let err = |source| {
                    ConfigError::Parameter { name: key.clone(), source }
                };
                let (e, mods) = Expr::parse_with_modules(value).map_err(err)?;
                let val = e.bind_const(&params).map_err(err)?;
                modules.extend(mods);
                params.insert(key.clone(), val);
            }
        }

        let section
            = config.section(REGIONS)
            .ok_or(ConfigError::MissingSection(REGIONS))?;
        if section.entries.is_empty() {
            return Err(ConfigError::NoRegions);
        }
        let decls: Vec<RegionDecl>
            = section.entries.iter()
            .map(|entry| RegionDecl::parse(entry, &mut modules))
            .collect::<Result<_, _>>()?;
        let regions = derive_regions(&decls, &params)?;
        Ok(Self { source, params, modules, decls, regions })
    }

    /// Path of the file this potential was read from, if any.
    pub fn source(&self) -> Option<&Path> { self.source.as_deref() }

    /// Get a reference to the numeric parameters.
    pub fn params(&self) -> &BTreeMap<String, f64> { &self.params }

    /// Get the value of a single parameter.
    pub fn get(&self, name: &str) -> PotResult<f64> {
        self.params.get(name)
            .copied()
            .ok_or_else(|| PotError::UnknownAttribute(name.to_string()))
    }

    /// Absolute values of all numeric parameters.
    pub fn magnitudes(&self) -> Vec<f64> {
        self.params.values().map(|v| v.abs()).collect()
    }

    /// Canonical names of all modules referenced by the configuration.
    pub fn modules(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().copied()
    }

    /// Get the current regions, sorted by their left edges.
    pub fn regions(&self) -> &[Region] { &self.regions }

    /// Return the smallest and largest region endpoints.
    pub fn bounds(&self) -> (f64, f64) {
        self.regions.iter()
            .fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(xi, xf), r| (xi.min(r.start), xf.max(r.end)),
            )
    }

    /// Evaluate at a single position.
    pub fn eval(&self, x: f64) -> f64 {
        self.regions.iter()
            .find(|r| r.contains(x))
            .map(|r| r.value.eval(x))
            .unwrap_or(0.0)
    }

    /// Evaluate at an array of positions.
    pub fn eval_arr<S>(&self, x: &Arr1<S>) -> nd::Array1<f64>
    where S: nd::Data<Elem = f64>
    {
        x.mapv(|xk| self.eval(xk))
    }

    /// Evaluate at a position or a sequence of positions given in any of the
    /// forms accepted by [`PotArg`].
    ///
    /// Text arguments give [`PotError::InvalidArgument`], even if they look
    /// like numbers.
    pub fn evaluate<'a, A>(&self, arg: A) -> PotResult<PotValue>
    where A: Into<PotArg<'a>>
    {
        match arg.into() {
            PotArg::Scalar(x) => Ok(PotValue::Scalar(self.eval(x))),
            PotArg::Seq(x) => Ok(PotValue::Array(self.eval_arr(&x))),
            PotArg::Text(s) => Err(PotError::InvalidArgument(s.to_string())),
        }
    }

    /// Overwrite the values of existing parameters and re-derive all regions.
    ///
    /// Names that aren't parameters of `self` are skipped with a warning and
    /// returned. If re-deriving the regions fails, all updates are rolled back
    /// and the error is returned.
    pub fn adjust<I, K>(&mut self, updates: I) -> PotResult<Vec<String>>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut params = self.params.clone();
        let mut skipped: Vec<String> = Vec::new();
        for (name, val) in updates.into_iter() {
            let name = name.as_ref();
            match params.get_mut(name) {
                Some(p) => { *p = val; },
                None => {
                    println!(
                        "potential::adjust: WARNING: '{}' is not a valid \
                        parameter for '{}'",
                        name,
                        self.source.as_deref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "<potential>".to_string()),
                    );
                    skipped.push(name.to_string());
                },
            }
        }
        let regions = derive_regions(&self.decls, &params)?;
        self.params = params;
        self.regions = regions;
        Ok(skipped)
    }
}

impl FromStr for Potential {
    type Err = PotError;

    fn from_str(s: &str) -> PotResult<Self> { Self::from_config_str(s) }
}
