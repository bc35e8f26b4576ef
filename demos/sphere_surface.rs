//! Extract the isosurface of a sphere distance field
//!
//! ```text
//! cargo run --bin sphere_surface -- --resolution 48 --radius 0.7 --sharing independent
//! RUST_LOG=debug cargo run --bin sphere_surface -- --json
//! ```

use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};
use isomesh_core::{sphere_field, GridDescriptor, IsoSurface, Point3d, Vector3d};
use isomesh_mc33::{
    init_thread_pool, Mc33, Mc33Config, NormalSign, ThreadPoolConfig, VertexSharing,
};
use log::info;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "sphere_surface")]
#[command(about = "Extract a sphere isosurface with Marching Cubes 33", long_about = None)]
struct Args {
    /// Cells along each axis of the [-1, 1] cube
    #[arg(short, long, default_value = "32")]
    resolution: usize,

    /// Sphere radius
    #[arg(long, default_value = "0.8")]
    radius: f64,

    /// Isovalue, extracted from `radius - distance`
    #[arg(long, default_value = "0.0")]
    iso: f64,

    /// Vertex sharing between neighbouring cells
    #[arg(long, value_enum, default_value = "shared")]
    sharing: Sharing,

    /// Point normals toward the inside of the sphere
    #[arg(long)]
    inward: bool,

    /// Worker threads for the parallel stages (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Print the statistics as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Sharing {
    Shared,
    Independent,
}

impl From<Sharing> for VertexSharing {
    fn from(sharing: Sharing) -> Self {
        match sharing {
            Sharing::Shared => VertexSharing::Shared,
            Sharing::Independent => VertexSharing::Independent,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    ensure!(args.resolution > 0, "resolution must be at least 1");

    if let Some(threads) = args.threads {
        init_thread_pool(ThreadPoolConfig::default().with_threads(threads))?;
    }

    let step = 2.0 / args.resolution as f64;
    let grid = GridDescriptor::new(
        [args.resolution; 3],
        Point3d::new(-1.0, -1.0, -1.0),
        Vector3d::new(step, step, step),
    )?;
    let field = sphere_field(&grid, Point3d::origin(), args.radius);
    info!("Sampled {} grid points", field.len());

    let config = Mc33Config::default()
        .with_iso_value(args.iso)
        .with_vertex_sharing(args.sharing.into())
        .with_normal_sign(if args.inward {
            NormalSign::Inward
        } else {
            NormalSign::Outward
        });
    let mc = Mc33::new(config);

    let start = Instant::now();
    let mut surface = IsoSurface::new();
    let stats = mc.extract_into(&grid, &field, &mut surface)?;
    let elapsed = start.elapsed();

    let edges = surface.to_triangle_mesh().edge_report();
    let volume = surface.signed_volume();

    if args.json {
        let report = serde_json::json!({
            "config": config,
            "stats": stats,
            "signed_volume": volume,
            "edges": edges,
            "closed": edges.is_closed(),
            "elapsed_ms": elapsed.as_secs_f64() * 1000.0,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Marching Cubes 33 sphere");
    println!("========================");
    println!("Grid: {}^3 cells, step {:.4}", args.resolution, step);
    println!("Vertices: {}", stats.vertices);
    println!("Triangles: {}", stats.triangles);
    println!("Surface cells: {} of {}", stats.surface_cells, stats.cells_visited);
    println!("Degenerate triangles dropped: {}", stats.degenerate_dropped);
    println!("Signed volume: {:.5}", volume);
    println!("Closed: {} ({:?})", edges.is_closed(), edges);
    println!("Time: {:.2?}", elapsed);

    println!("\nCells per case:");
    for (case, count) in stats.case_histogram.iter().enumerate().filter(|(_, &c)| c > 0) {
        println!("  {:>2}: {}", case, count);
    }

    Ok(())
}
