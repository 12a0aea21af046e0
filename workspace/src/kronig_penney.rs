use std::{ fs, io::Write, path::PathBuf };
use ndarray as nd;
use sinebasis::{ hamiltonian::Hamiltonian, output, potential::Potential };

const POTENTIAL: &str
    = concat!(env!("CARGO_MANIFEST_DIR"), "/../sinebasis/potentials/kp.cfg");
const N_BASIS: usize = 150; // number of basis functions
const N_SOLS: usize = 20; // number of solutions kept per well depth
const N_BAND: usize = 9; // bulk states in the lowest band

fn main() -> anyhow::Result<()> {
    let depths: nd::Array1<f64> = nd::Array1::linspace(-5.0, -50.0, 10);
    let outdir = PathBuf::from("output");
    fs::create_dir_all(&outdir)?;

    let mut summary = fs::File::create(outdir.join("kp_bands.dat"))?;
    writeln!(summary, "v0      band_min      band_max      next")?;

    let mut pot = Potential::from_file(POTENTIAL)?;
    for &v0 in depths.iter() {
        pot.adjust([("v0", v0)])?;
        let ham = Hamiltonian::new(pot, N_BASIS)?;
        let sols = ham.solutions(N_SOLS)?;
        output::save(outdir.join(format!("kp_v0={:.1}.dat", v0)), &sols)?;

        let e = ham.eigenvals();
        let (band_min, band_max, next) = (e[0], e[N_BAND - 1], e[N_BAND]);
        println!(
            "v0 = {:6.1}: lowest band [{:.6}, {:.6}], width {:.3e}; next state {:.6}",
            v0, band_min, band_max, band_max - band_min, next,
        );
        writeln!(
            summary,
            "{:.1} {:.16e} {:.16e} {:.16e}",
            v0, band_min, band_max, next,
        )?;
        pot = ham.into_potential();
    }
    Ok(())
}
