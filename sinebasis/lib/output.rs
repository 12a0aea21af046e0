//! Plain-text storage for solution sets.
//!
//! Files begin with the header line
//! ```text
//! Eigenval      Eigenvec
//! ```
//! followed by one line per solution holding the energy and then the basis
//! coefficients, all separated by whitespace. Values are written with 17
//! significant digits, which is enough to read back every `f64` exactly.

use std::{
    fs,
    io::{ BufRead, BufReader, BufWriter, Write },
    path::Path,
};
use ndarray as nd;
use crate::{
    Arr1,
    Arr2,
    error::OutputError,
    hamiltonian::Solution,
};

pub type OutputResult<T> = Result<T, OutputError>;

/// First line of every solution file.
pub const HEADER: &str = "Eigenval      Eigenvec";

fn write_row<'a, W, I>(out: &mut W, e: f64, coeffs: I) -> OutputResult<()>
where
    W: Write,
    I: IntoIterator<Item = &'a f64>,
{
    write!(out, "{:.16e}", e)?;
    for c in coeffs.into_iter() {
        write!(out, " {:.16e}", c)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Write a set of solutions, preceded by [`HEADER`].
pub fn write_solutions<W>(mut out: W, sols: &[Solution]) -> OutputResult<()>
where W: Write
{
    writeln!(out, "{}", HEADER)?;
    for sol in sols.iter() {
        write_row(&mut out, sol.e, sol.coeffs.iter())?;
    }
    out.flush()?;
    Ok(())
}

/// Write the lowest `n` eigenpairs directly from arrays of eigenvalues and
/// eigenvectors (stored as columns), preceded by [`HEADER`].
///
/// *Panics if `n` exceeds the number of eigenvalues or eigenvector columns*.
pub fn write_eigen<W, S, T>(
    mut out: W,
    eigenvals: &Arr1<S>,
    eigenvecs: &Arr2<T>,
    n: usize,
) -> OutputResult<()>
where
    W: Write,
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    writeln!(out, "{}", HEADER)?;
    for k in 0..n {
        write_row(&mut out, eigenvals[k], eigenvecs.column(k).iter())?;
    }
    out.flush()?;
    Ok(())
}

/// Read a set of solutions written by [`write_solutions`] or
/// [`write_eigen`].
///
/// Blank lines are skipped. Every row must carry the same number of
/// coefficients.
pub fn read_solutions<R>(input: R) -> OutputResult<Vec<Solution>>
where R: BufRead
{
    let mut lines = input.lines();
    let header: Option<String> = lines.next().transpose()?;
    if header.as_deref().map(str::trim) != Some(HEADER) {
        return Err(OutputError::MissingHeader(HEADER));
    }
    let mut sols: Vec<Solution> = Vec::new();
    for (k, line) in lines.enumerate() {
        let line_no = k + 2;
        let line = line?;
        if line.trim().is_empty() { continue; }
        let values: Vec<f64>
            = line.split_whitespace()
            .map(|token| {
                token.parse::<f64>()
                    .map_err(|_| OutputError::Parse {
                        line: line_no,
                        token: token.to_string(),
                    })
            })
            .collect::<OutputResult<_>>()?;
        let ncoeffs = values.len() - 1;
        if let Some(first) = sols.first() {
            if first.coeffs.len() != ncoeffs {
                return Err(OutputError::Ragged {
                    line: line_no,
                    expected: first.coeffs.len(),
                    got: ncoeffs,
                });
            }
        }
        sols.push(Solution {
            e: values[0],
            coeffs: values[1..].iter().copied().collect(),
        });
    }
    Ok(sols)
}

/// Write a set of solutions to a file, creating or truncating it.
pub fn save<P>(path: P, sols: &[Solution]) -> OutputResult<()>
where P: AsRef<Path>
{
    let out = BufWriter::new(fs::File::create(path)?);
    write_solutions(out, sols)
}

/// Read a set of solutions from a file.
pub fn load<P>(path: P) -> OutputResult<Vec<Solution>>
where P: AsRef<Path>
{
    let input = BufReader::new(fs::File::open(path)?);
    read_solutions(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sols() -> Vec<Solution> {
        vec![
            Solution { e: -12.25, coeffs: nd::array![0.9, -0.1, 1.0 / 3.0] },
            Solution { e: 0.1 + 0.2, coeffs: nd::array![1e-300, 2.5e17, -0.0] },
        ]
    }

    #[test]
    fn written_values_read_back_exactly() {
        let mut buf: Vec<u8> = Vec::new();
        write_solutions(&mut buf, &sols()).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert_eq!(text.lines().next(), Some(HEADER));
        assert_eq!(text.lines().count(), 3);
        assert_eq!(read_solutions(buf.as_slice()).unwrap(), sols());
    }

    #[test]
    fn eigen_arrays_match_solutions() {
        let eigenvals = nd::array![1.0, 2.0, 3.0];
        let eigenvecs = nd::array![
            [1.0, 0.0, 0.0],
            [0.0, 0.6, 0.8],
            [0.0, 0.8, -0.6],
        ];
        let mut buf: Vec<u8> = Vec::new();
        write_eigen(&mut buf, &eigenvals, &eigenvecs, 2).unwrap();
        let read = read_solutions(buf.as_slice()).unwrap();
        assert_eq!(read.len(), 2);
        assert_eq!(read[1].e, 2.0);
        assert_eq!(read[1].coeffs, nd::array![0.0, 0.6, 0.8]);
    }

    #[test]
    fn header_only() {
        let read = read_solutions(format!("{}\n\n", HEADER).as_bytes()).unwrap();
        assert!(read.is_empty());
    }

    #[test]
    fn malformed_files() {
        assert!(matches!(
            read_solutions("1.0 2.0\n".as_bytes()),
            Err(OutputError::MissingHeader(_))
        ));
        assert!(matches!(
            read_solutions("".as_bytes()),
            Err(OutputError::MissingHeader(_))
        ));
        let text = format!("{}\n1.0 0.5 0.5\n2.0 nan? 1.0\n", HEADER);
        assert!(matches!(
            read_solutions(text.as_bytes()),
            Err(OutputError::Parse { line: 3, .. })
        ));
        let text = format!("{}\n1.0 0.5 0.5\n2.0 1.0\n", HEADER);
        assert!(matches!(
            read_solutions(text.as_bytes()),
            Err(OutputError::Ragged { line: 3, expected: 2, got: 1 })
        ));
    }
}
