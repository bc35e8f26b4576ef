//! Sub-cases chosen for random cells of every ambiguous MC33 case
//!
//! Corner magnitudes are drawn uniformly with the sign pattern of the
//! case representative, so the face and interior tests see every
//! resolution the case admits.

use anyhow::{Context, Result};
use clap::Parser;
use isomesh_mc33::tables::REPRESENTATIVES;
use isomesh_mc33::{classify, PatternTable, SubCase};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

const AMBIGUOUS_CASES: [usize; 7] = [3, 4, 6, 7, 10, 12, 13];

#[derive(Parser, Debug)]
#[command(name = "ambiguous_cases")]
#[command(about = "Tally the MC33 sub-cases of random ambiguous cells", long_about = None)]
struct Args {
    /// Cells sampled per case
    #[arg(short, long, default_value = "10000")]
    samples: usize,

    /// Random seed
    #[arg(long, default_value = "33")]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);

    let table = PatternTable::global().context("building the pattern table")?;
    println!("Pattern table: {} patterns, {} packed entries", table.len(), table.packed().len());

    for case in AMBIGUOUS_CASES {
        let positive = REPRESENTATIVES[case];
        let mut tally: BTreeMap<&'static str, (SubCase, usize)> = BTreeMap::new();

        for _ in 0..args.samples {
            let v: [f64; 8] = std::array::from_fn(|k| {
                let magnitude = rng.gen_range(0.01..1.0);
                if positive.contains(&k) {
                    magnitude
                } else {
                    -magnitude
                }
            });
            let sub_case = classify(&v).sub_case;
            tally.entry(sub_case.label()).or_insert((sub_case, 0)).1 += 1;
        }

        println!("\nCase {} (positive corners {:?})", case, positive);
        for (label, (sub_case, count)) in &tally {
            println!(
                "  {:<7} {:>6.2}%  {:>2} triangles",
                label,
                100.0 * *count as f64 / args.samples as f64,
                sub_case.triangle_count()
            );
        }
    }

    Ok(())
}
