//! Reduction of a potential to a list of rectangular barriers.
//!
//! The potential is sampled left to right on a uniform grid. Runs of equal
//! samples ("plateaus") become barriers; a smoothly varying potential becomes
//! a staircase of barriers one step wide, each taking the value of the
//! potential at its center. Each barrier can then be integrated
//! against pairs of basis functions exactly (see [`kernel`][crate::kernel]).
//!
//! The grid step is chosen from the magnitudes of the potential's numeric
//! parameters so that features on the scale of the smallest parameter aren't
//! stepped over: if every magnitude exceeds 1, a fixed step of `0.1` is used;
//! otherwise the step is the smallest magnitude divided by a divisor between 2
//! and 10.

use crate::{
    error::ScanError,
    potential::Potential,
    DEF_COARSE_STEP,
    DEF_DIVISOR,
    MAX_SCAN_SAMPLES,
};

pub type ScanResult<T> = Result<T, ScanError>;

// above this many samples a warning is printed
const WARN_SCAN_SAMPLES: usize = 10_000_000;

/// A region of constant potential.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Barrier {
    /// Midpoint.
    pub center: f64,
    /// Full width.
    pub width: f64,
    /// Value of the potential over the barrier.
    pub height: f64,
}

impl Barrier {
    /// Left edge.
    pub fn left(&self) -> f64 { self.center - self.width / 2.0 }

    /// Right edge.
    pub fn right(&self) -> f64 { self.center + self.width / 2.0 }
}

/// Barriers found by a scan, split into interior barriers and the pair of
/// edge regions when those are recognized as a distinct vacuum region.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Barriers {
    pub interior: Vec<Barrier>,
    pub vacuum: Vec<Barrier>,
}

impl Barriers {
    /// Centers of the interior barriers.
    pub fn centers(&self) -> Vec<f64> {
        self.interior.iter().map(|b| b.center).collect()
    }

    /// Widths of the interior barriers.
    pub fn widths(&self) -> Vec<f64> {
        self.interior.iter().map(|b| b.width).collect()
    }

    /// Centers of the vacuum barriers; empty if there is no vacuum region.
    pub fn vacuum_centers(&self) -> Vec<f64> {
        self.vacuum.iter().map(|b| b.center).collect()
    }

    /// Widths of the vacuum barriers, or `None` if there is no vacuum
    /// region.
    pub fn vacuum_widths(&self) -> Option<Vec<f64>> {
        (!self.vacuum.is_empty())
            .then(|| self.vacuum.iter().map(|b| b.width).collect())
    }

    /// Return `true` if the edge regions were classified as vacuum.
    pub fn has_vacuum(&self) -> bool { !self.vacuum.is_empty() }

    /// Iterate over all barriers, interior first.
    pub fn iter(&self) -> impl Iterator<Item = &Barrier> + '_ {
        self.interior.iter().chain(self.vacuum.iter())
    }

    /// Total number of barriers.
    pub fn len(&self) -> usize { self.interior.len() + self.vacuum.len() }

    /// Return `true` if no barriers were found.
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Scan settings.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScanConfig {
    /// Divisor applied to the smallest parameter magnitude when that
    /// magnitude is at most 1; must lie in `[2, 10]` (default: `10`).
    pub divisor: f64,
    /// Explicit grid step, bypassing the parameter heuristic (default:
    /// `None`).
    pub step: Option<f64>,
}

impl Default for ScanConfig {
    fn default() -> Self { Self { divisor: DEF_DIVISOR, step: None } }
}

impl ScanConfig {
    /// Determine the grid step to use for `pot`.
    pub fn step_for(&self, pot: &Potential) -> ScanResult<f64> {
        match self.step {
            Some(step) => {
                (step.is_finite() && step > 0.0)
                    .then_some(step)
                    .ok_or(ScanError::BadStep(step))
            },
            None => choose_step(&pot.magnitudes(), self.divisor),
        }
    }

    /// Scan `pot` over `domain`.
    pub fn scan(&self, pot: &Potential, domain: (f64, f64))
        -> ScanResult<Barriers>
    {
        let step = self.step_for(pot)?;
        let plateaus = find_plateaus(pot, domain, step)?;
        Ok(classify(plateaus, step))
    }
}

/// Choose a grid step from a set of parameter magnitudes.
///
/// Zero and non-finite magnitudes carry no length scale and are ignored;
/// [`ScanError::Degenerate`] is returned if nothing is left.
pub fn choose_step(magnitudes: &[f64], divisor: f64) -> ScanResult<f64> {
    if !(2.0..=10.0).contains(&divisor) {
        return Err(ScanError::BadDivisor(divisor));
    }
    let smallest
        = magnitudes.iter()
        .map(|m| m.abs())
        .filter(|m| m.is_finite() && *m > 0.0)
        .min_by(f64::total_cmp)
        .ok_or(ScanError::Degenerate)?;
    if smallest > 1.0 {
        Ok(DEF_COARSE_STEP)
    } else {
        Ok(smallest / divisor)
    }
}

#[derive(Copy, Clone, Debug)]
struct Plateau {
    value: f64,
    left: f64,
    last: f64,
    count: usize,
}

impl Plateau {
    fn start(value: f64, x: f64) -> Self {
        Self { value, left: x, last: x, count: 1 }
    }

    fn extend(&mut self, x: f64) {
        self.last = x;
        self.count += 1;
    }

    // closed by the first sample of the next plateau, which serves as the
    // right edge; this inflates the width by one step relative to the
    // plateau's own samples
    fn close(self, pot: &Potential, next: f64) -> ScanResult<Barrier> {
        barrier_at(pot, (self.left + next) / 2.0, next - self.left)
    }

    // still open at the end of the scan
    fn flush(self, pot: &Potential) -> ScanResult<Barrier> {
        barrier_at(pot, (self.left + self.last) / 2.0, self.last - self.left)
    }
}

// the height of a barrier is the potential at its center
fn barrier_at(pot: &Potential, center: f64, width: f64) -> ScanResult<Barrier> {
    let height = sample(pot, center)?;
    Ok(Barrier { center, width, height })
}

fn sample(pot: &Potential, x: f64) -> ScanResult<f64> {
    let v = pot.eval(x);
    v.is_finite().then_some(v).ok_or(ScanError::NonFinite(x))
}

/// Walk `domain` with the given step and return every plateau of constant
/// potential, in order.
///
/// Equal samples extend the current plateau; any change in value closes it.
/// A plateau still open at the end of the walk is kept only if it spans more
/// than one sample. The last sample always lies at or beyond `xf`. Each
/// barrier's height is the potential evaluated at its center, and a
/// non-finite sample anywhere gives [`ScanError::NonFinite`].
pub fn find_plateaus(pot: &Potential, domain: (f64, f64), step: f64)
    -> ScanResult<Vec<Barrier>>
{
    let (xi, xf) = domain;
    if !(xi.is_finite() && xf.is_finite() && xi < xf) {
        return Err(ScanError::BadDomain(xi, xf));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(ScanError::BadStep(step));
    }
    let mut nsteps = ((xf - xi) / step).round();
    if (xf - xi) - nsteps * step > 1e-9 * step { nsteps += 1.0; }
    if nsteps + 1.0 > MAX_SCAN_SAMPLES as f64 {
        return Err(ScanError::TooManySamples(nsteps as usize + 1));
    }
    let nsteps = nsteps as usize;
    if nsteps + 1 > WARN_SCAN_SAMPLES {
        println!(
            "scan::find_plateaus: WARNING: scanning {} samples; this may take \
            a while",
            nsteps + 1,
        );
    }

    let mut plateaus: Vec<Barrier> = Vec::new();
    let mut cur = Plateau::start(sample(pot, xi)?, xi);
    for k in 1..=nsteps {
        let x = xi + k as f64 * step;
        let v = sample(pot, x)?;
        if v == cur.value {
            cur.extend(x);
        } else {
            plateaus.push(cur.close(pot, x)?);
            cur = Plateau::start(v, x);
        }
    }
    if cur.count > 1 { plateaus.push(cur.flush(pot)?); }
    Ok(plateaus)
}

// edge widths are compared with interior widths to within half a step
fn width_matches(edge: f64, interior: f64, step: f64) -> bool {
    let tol = step / 2.0;
    (edge - interior).abs() <= tol || (edge - 2.0 * interior).abs() <= tol
}

/// Split a list of plateaus into interior barriers and vacuum edge regions.
///
/// With at least three plateaus, the first and last are treated as a distinct
/// vacuum region if neither of their widths matches, exactly or at double,
/// the width of any interior plateau. Otherwise every plateau is interior.
/// This is a heuristic; asymmetric or multi-barrier potentials may be
/// classified either way, which doesn't affect the matrix elements since
/// both kinds of barrier are summed.
pub fn classify(plateaus: Vec<Barrier>, step: f64) -> Barriers {
    let n = plateaus.len();
    if n < 3 {
        return Barriers { interior: plateaus, vacuum: Vec::new() };
    }
    let first = plateaus[0];
    let last = plateaus[n - 1];
    let inner = &plateaus[1..n - 1];
    let edge_matches
        = [first, last].iter()
        .any(|edge| {
            inner.iter().any(|b| width_matches(edge.width, b.width, step))
        });
    if edge_matches {
        Barriers { interior: plateaus, vacuum: Vec::new() }
    } else {
        Barriers { interior: inner.to_vec(), vacuum: vec![first, last] }
    }
}

/// Scan `pot` over `domain` with default settings.
pub fn scan(pot: &Potential, domain: (f64, f64)) -> ScanResult<Barriers> {
    ScanConfig::default().scan(pot, domain)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use super::*;

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

    const CELLS: &str = "
[parameters]
v0 = 4
w = 2
s = 1
n = 5

[regions]
cells = \"0, w * n|where(x % w < s, v0, 0)\"
";

    #[test]
    fn step_choice() {
        assert_eq!(choose_step(&[2.0, 15.0, 10.0], 10.0).unwrap(), DEF_COARSE_STEP);
        assert_eq!(choose_step(&[0.5, 15.0], 10.0).unwrap(), 0.05);
        assert_eq!(choose_step(&[0.5, 15.0], 2.0).unwrap(), 0.25);
        assert_eq!(choose_step(&[1.0, 15.0], 10.0).unwrap(), 0.1);
        assert_eq!(choose_step(&[0.0, 4.0], 10.0).unwrap(), DEF_COARSE_STEP);
        assert!(matches!(choose_step(&[], 10.0), Err(ScanError::Degenerate)));
        assert!(matches!(choose_step(&[0.0], 10.0), Err(ScanError::Degenerate)));
        assert!(matches!(
            choose_step(&[1.0], 20.0),
            Err(ScanError::BadDivisor(_))
        ));
    }

    #[test]
    fn single_well() {
        let pot: Potential = SINGLE.parse().unwrap();
        let barriers = scan(&pot, (0.0, 10.0)).unwrap();
        // edges are 4.5 wide and the well is 1 wide: vacuum
        assert!(barriers.has_vacuum());
        assert_eq!(barriers.interior.len(), 1);
        let well = barriers.interior[0];
        assert_eq!(well.height, -15.0);
        assert_abs_diff_eq!(well.center, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(well.width, 1.0, epsilon = 1e-9);
        let vacuum_widths = barriers.vacuum_widths().unwrap();
        assert_abs_diff_eq!(vacuum_widths[0], 4.5, epsilon = 1e-9);
        assert_abs_diff_eq!(vacuum_widths[1], 4.5, epsilon = 1e-9);
        assert!(barriers.vacuum.iter().all(|b| b.height == 0.0));
        assert_eq!(barriers.len(), 3);
    }

    #[test]
    fn periodic_cells() {
        let pot: Potential = CELLS.parse().unwrap();
        let barriers = scan(&pot, (0.0, 10.0)).unwrap();
        // every plateau is 1 wide, so the edges match and merge back in
        assert!(!barriers.has_vacuum());
        assert_eq!(barriers.vacuum_widths(), None);
        assert_eq!(barriers.interior.len(), 10);
        for (k, b) in barriers.interior.iter().enumerate() {
            let expected = if k % 2 == 0 { 4.0 } else { 0.0 };
            assert_eq!(b.height, expected);
            assert_abs_diff_eq!(b.center, k as f64 + 0.5, epsilon = 1e-9);
            assert_abs_diff_eq!(b.width, 1.0, epsilon = 1e-9);
        }
        let total: f64 = barriers.widths().iter().sum();
        assert_abs_diff_eq!(total, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn equal_values_extend_plateau() {
        let pot: Potential = "
[parameters]
v0 = 3
[regions]
a = \"0, 4|v0\"
b = \"4, 8|v0\"
".parse().unwrap();
        let plateaus = find_plateaus(&pot, (0.0, 8.0), 0.5).unwrap();
        assert_eq!(plateaus.len(), 1);
        assert_eq!(plateaus[0].height, 3.0);
        assert_abs_diff_eq!(plateaus[0].width, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(plateaus[0].center, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn smooth_potential_becomes_staircase() {
        let pot: Potential = "
[parameters]
k = 0.5
[regions]
a = \"-1, 1|k * x^2\"
".parse().unwrap();
        let step = ScanConfig::default().step_for(&pot).unwrap();
        assert_eq!(step, 0.05);
        let plateaus = find_plateaus(&pot, (-1.0, 1.0), step).unwrap();
        // one barrier per sample, covering the whole domain
        let total: f64 = plateaus.iter().map(|b| b.width).sum();
        assert_eq!(plateaus.len(), 40);
        assert!((total - 2.0).abs() < 2.0 * step);
        // mirrored steps about the origin have equal heights
        assert_abs_diff_eq!(plateaus[19].height, plateaus[20].height, epsilon = 1e-12);
    }

    #[test]
    fn heights_taken_at_centers() {
        let pot: Potential = "
[parameters]
w = 1
v = 1.5
[regions]
a = \"-10, 10|0.5 * w * x^2 + v * sin(3 * x)\"
".parse().unwrap();
        let plateaus = find_plateaus(&pot, (-10.0, 10.0), 0.1).unwrap();
        assert_eq!(plateaus.len(), 200);
        for b in plateaus.iter() {
            assert_eq!(b.height, pot.eval(b.center));
        }
        // the left sample of the steepest step differs from its center value
        let edge = plateaus.first().unwrap();
        assert!((pot.eval(edge.left()) - edge.height).abs() > 0.25);
    }

    #[test]
    fn double_well_keeps_all_interior() {
        let pot: Potential = "
[parameters]
l = 10
v0 = -50
[regions]
left = \"0, 2|0\"
well_a = \"2, 3|v0\"
middle = \"3, 7|0\"
well_b = \"7, 8|v0\"
right = \"8, l|0\"
".parse().unwrap();
        let barriers = scan(&pot, (0.0, 10.0)).unwrap();
        // edges are 2 wide, twice the wells
        assert!(!barriers.has_vacuum());
        let widths = barriers.widths();
        assert_eq!(widths.len(), 5);
        for (w, expected) in widths.iter().zip([2.0, 1.0, 4.0, 1.0, 2.0]) {
            assert_abs_diff_eq!(*w, expected, epsilon = 1e-9);
        }
        let heights: Vec<f64> = barriers.interior.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![0.0, -50.0, 0.0, -50.0, 0.0]);
    }

    #[test]
    fn one_matching_edge_keeps_all_interior() {
        let pot: Potential = "
[parameters]
v0 = -5
[regions]
a = \"0, 1|0\"
b = \"1, 2|v0\"
c = \"2, 5|0\"
d = \"5, 6|v0\"
e = \"6, 10|0\"
".parse().unwrap();
        let barriers = scan(&pot, (0.0, 10.0)).unwrap();
        // left edge matches the wells; right edge (4) matches nothing
        assert!(!barriers.has_vacuum());
        assert_eq!(barriers.interior.len(), 5);
        assert_abs_diff_eq!(barriers.interior[0].width, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(barriers.interior[4].width, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn scan_reaches_domain_end() {
        let pot: Potential = "
[parameters]
v0 = 3
[regions]
a = \"0, 2|v0\"
".parse().unwrap();
        let plateaus = find_plateaus(&pot, (0.0, 1.03), 0.1).unwrap();
        assert_eq!(plateaus.len(), 1);
        assert!(plateaus[0].right() >= 1.03);
        // exact multiples of the step don't gain a sample
        let plateaus = find_plateaus(&pot, (0.0, 1.0), 0.1).unwrap();
        assert_abs_diff_eq!(plateaus[0].right(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn non_finite_samples_rejected() {
        let pot: Potential = "
[parameters]
a = 1
[regions]
r = \"0, 1|a * sqrt(x - 0.5)\"
".parse().unwrap();
        assert!(matches!(
            find_plateaus(&pot, (0.0, 1.0), 0.1),
            Err(ScanError::NonFinite(_))
        ));
        assert!(matches!(scan(&pot, (0.0, 1.0)), Err(ScanError::NonFinite(_))));
    }

    #[test]
    fn bad_inputs() {
        let pot: Potential = SINGLE.parse().unwrap();
        assert!(matches!(
            find_plateaus(&pot, (1.0, 1.0), 0.1),
            Err(ScanError::BadDomain(..))
        ));
        assert!(matches!(
            find_plateaus(&pot, (0.0, 1.0), 0.0),
            Err(ScanError::BadStep(_))
        ));
        assert!(matches!(
            find_plateaus(&pot, (0.0, 1e12), 1e-3),
            Err(ScanError::TooManySamples(_))
        ));
        let explicit = ScanConfig { step: Some(-1.0), ..Default::default() };
        assert!(matches!(explicit.step_for(&pot), Err(ScanError::BadStep(_))));

        let bare: Potential = "[regions]\na = 0, 1|2".parse().unwrap();
        assert!(matches!(scan(&bare, (0.0, 1.0)), Err(ScanError::Degenerate)));
        let explicit = ScanConfig { step: Some(0.25), ..Default::default() };
        assert_eq!(explicit.scan(&bare, (0.0, 1.0)).unwrap().len(), 1);
    }
}
