//! Marching Cubes 33 isosurface extraction

use crate::cache::{LocalSlots, SlabCache, VertexSlots};
use crate::classify::classify;
use crate::gradient::{GradientField, NormalSign};
use crate::parallel;
use crate::pattern::PatternTable;
use crate::sampler::GridSampler;
use crate::tables::CENTER;
use crate::triangulate::{Triangulator, COLOR_DEFAULT};
use crate::weld::weld_coincident_vertices;
use isomesh_core::{Error, GridDescriptor, IsoSurface, Result, ScalarField, SurfaceWriter};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// How vertices are shared between neighbouring cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexSharing {
    /// Sequential scan with a rolling slab cache; every surface vertex is
    /// created once
    #[default]
    Shared,
    /// Cells resolve their own vertices and z-slabs run in parallel;
    /// vertices on shared edges are duplicated
    Independent,
}

/// Configuration for MC33 extraction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mc33Config {
    /// Isovalue of the extracted surface
    pub iso_value: f64,
    /// Direction of the output normals
    pub normal_sign: NormalSign,
    pub vertex_sharing: VertexSharing,
    /// Keep per-vertex diagnostic colours in the returned surface
    pub diagnostic_colors: bool,
    /// Edge id (0 to 12) whose vertices are coloured red
    pub highlight_edge: Option<u8>,
}

impl Default for Mc33Config {
    fn default() -> Self {
        Self {
            iso_value: 0.0,
            normal_sign: NormalSign::Outward,
            vertex_sharing: VertexSharing::Shared,
            diagnostic_colors: false,
            highlight_edge: None,
        }
    }
}

impl Mc33Config {
    pub fn with_iso_value(mut self, iso_value: f64) -> Self {
        self.iso_value = iso_value;
        self
    }

    pub fn with_normal_sign(mut self, normal_sign: NormalSign) -> Self {
        self.normal_sign = normal_sign;
        self
    }

    pub fn with_vertex_sharing(mut self, vertex_sharing: VertexSharing) -> Self {
        self.vertex_sharing = vertex_sharing;
        self
    }

    pub fn with_diagnostic_colors(mut self, enabled: bool) -> Self {
        self.diagnostic_colors = enabled;
        self
    }

    pub fn with_highlight_edge(mut self, edge: Option<u8>) -> Self {
        self.highlight_edge = edge;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.iso_value.is_finite() {
            return Err(Error::InvalidData(format!(
                "isovalue must be finite, got {}",
                self.iso_value
            )));
        }
        if let Some(edge) = self.highlight_edge {
            if edge > CENTER {
                return Err(Error::InvalidData(format!(
                    "highlight edge {} is out of range 0..={}",
                    edge, CENTER
                )));
            }
        }
        Ok(())
    }
}

/// Counters collected during one extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub cells_visited: usize,
    /// Cells the surface passes through
    pub surface_cells: usize,
    /// Vertices handed to the writer
    pub vertices: usize,
    /// Triangles handed to the writer
    pub triangles: usize,
    /// Triangles dropped for naming a vertex twice, including those that
    /// collapsed when vertices snapped onto one grid point were merged
    pub degenerate_dropped: usize,
    /// Surface cells per MC33 case
    pub case_histogram: [usize; 15],
}

impl ExtractionStats {
    /// Add the counts of `other`
    pub fn merge(&mut self, other: &ExtractionStats) {
        self.cells_visited += other.cells_visited;
        self.surface_cells += other.surface_cells;
        self.vertices += other.vertices;
        self.triangles += other.triangles;
        self.degenerate_dropped += other.degenerate_dropped;
        for (total, count) in self.case_histogram.iter_mut().zip(other.case_histogram) {
            *total += count;
        }
    }
}

/// Marching Cubes 33 extractor
#[derive(Debug, Clone, Default)]
pub struct Mc33 {
    config: Mc33Config,
}

impl Mc33 {
    /// Create a new extractor with configuration
    pub fn new(config: Mc33Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Mc33Config {
        &self.config
    }

    /// Extract the isosurface of `field` sampled on `grid`
    pub fn extract(&self, grid: &GridDescriptor, field: &[f64]) -> Result<IsoSurface> {
        let mut surface = if self.config.diagnostic_colors {
            IsoSurface::with_colors()
        } else {
            IsoSurface::new()
        };
        self.extract_into(grid, field, &mut surface)?;
        Ok(surface)
    }

    /// Extract into any [`SurfaceWriter`], returning the extraction statistics
    pub fn extract_into<W: SurfaceWriter>(
        &self,
        grid: &GridDescriptor,
        field: &[f64],
        writer: &mut W,
    ) -> Result<ExtractionStats> {
        self.config.validate()?;
        // descriptors can arrive through serde without passing `new`
        let grid = GridDescriptor::new(grid.cells(), grid.origin(), grid.step())?;
        let field = ScalarField::new(&grid, field)?;
        let table = PatternTable::global()?;

        let [nx, ny, nz] = grid.cells();
        info!(
            "Extracting MC33 isosurface: {}x{}x{} cells, iso {}, {:?} vertices",
            nx, ny, nz, self.config.iso_value, self.config.vertex_sharing
        );

        let gradients = GradientField::estimate(&field);
        let sampler = GridSampler::new(field, self.config.iso_value);
        let triangulator = Triangulator::new(
            &grid,
            &gradients,
            table,
            self.config.normal_sign,
            self.config.highlight_edge,
        );

        let weld = sampler.touches_iso();
        if weld {
            debug!("Field has samples exactly at the isovalue, merging snapped vertices");
        }

        let stats = match self.config.vertex_sharing {
            VertexSharing::Shared if weld => {
                let mut staged = IsoSurface::with_colors();
                let mut stats = extract_shared(&sampler, &triangulator, &mut staged)?;
                stats.degenerate_dropped += weld_coincident_vertices(&mut staged);
                stats.triangles = staged.triangle_count();
                stats.vertices = forward(&staged, writer);
                stats
            }
            VertexSharing::Shared => extract_shared(&sampler, &triangulator, writer)?,
            VertexSharing::Independent => {
                extract_independent(&sampler, &triangulator, weld, writer)?
            }
        };

        info!(
            "MC33 extraction finished: {} vertices, {} triangles",
            stats.vertices, stats.triangles
        );
        debug!("MC33 extraction stats: {:?}", stats);

        Ok(stats)
    }
}

/// Classify and triangulate every cell of z-slab `z` in scan order
fn process_slab<S, W>(
    sampler: &GridSampler<'_>,
    triangulator: &Triangulator<'_>,
    z: usize,
    slots: &mut S,
    writer: &mut W,
) -> Result<ExtractionStats>
where
    S: VertexSlots,
    W: SurfaceWriter,
{
    let [nx, ny, _] = sampler.field().grid().cells();
    let mut stats = ExtractionStats::default();

    for y in 0..ny {
        for x in 0..nx {
            stats.cells_visited += 1;
            let v = sampler.corner_values(x, y, z);
            let classification = classify(&v);
            if classification.is_empty() {
                continue;
            }

            stats.surface_cells += 1;
            stats.case_histogram[classification.case as usize] += 1;

            slots.begin_cell([x, y, z]);
            let out = triangulator.emit([x, y, z], &v, &classification, slots, writer)?;
            stats.triangles += out.triangles;
            stats.degenerate_dropped += out.degenerate;
        }
    }

    Ok(stats)
}

/// Sequential scan sharing every edge vertex through a slab cache
fn extract_shared<W: SurfaceWriter>(
    sampler: &GridSampler<'_>,
    triangulator: &Triangulator<'_>,
    writer: &mut W,
) -> Result<ExtractionStats> {
    let [_, _, nz] = sampler.field().grid().cells();
    let mut cache = SlabCache::new(sampler.field().grid().cells());
    let mut stats = ExtractionStats::default();
    let before = writer.vertex_count();
    for z in 0..nz {
        stats.merge(&process_slab(sampler, triangulator, z, &mut cache, writer)?);
        cache.advance();
    }
    stats.vertices = writer.vertex_count() - before;
    Ok(stats)
}

/// Copy a staged surface into `writer`, returning the number of vertices
fn forward<W: SurfaceWriter>(staged: &IsoSurface, writer: &mut W) -> usize {
    let colors = staged.colors.as_deref().unwrap_or_default();
    let remap: Vec<u32> = staged
        .positions
        .iter()
        .zip(&staged.normals)
        .enumerate()
        .map(|(k, (&p, &n))| {
            let color = colors.get(k).copied().unwrap_or(COLOR_DEFAULT);
            writer.add_vertex(p, n, color)
        })
        .collect();
    for triangle in &staged.triangles {
        writer.add_triangle(triangle.map(|i| remap[i as usize]));
    }
    remap.len()
}

/// Cache-free extraction: z-slabs in parallel, merged in slab order
fn extract_independent<W: SurfaceWriter>(
    sampler: &GridSampler<'_>,
    triangulator: &Triangulator<'_>,
    weld: bool,
    writer: &mut W,
) -> Result<ExtractionStats> {
    let [_, _, nz] = sampler.field().grid().cells();
    let slabs: Vec<usize> = (0..nz).collect();

    let results = parallel::parallel_map(&slabs, |&z| -> Result<(IsoSurface, ExtractionStats)> {
        let mut local = IsoSurface::with_colors();
        let mut slots = LocalSlots::new();
        let mut stats = process_slab(sampler, triangulator, z, &mut slots, &mut local)?;
        if weld {
            // vertices are per cell, so only slivers inside one cell merge
            stats.degenerate_dropped += weld_coincident_vertices(&mut local);
            stats.triangles = local.triangle_count();
        }
        Ok((local, stats))
    });

    let mut stats = ExtractionStats::default();
    for result in results {
        let (local, slab_stats) = result?;
        stats.merge(&slab_stats);
        stats.vertices += forward(&local, writer);
    }

    Ok(stats)
}

/// Extract the isosurface at `iso` with the default configuration
pub fn extract_isosurface(grid: &GridDescriptor, iso: f64, field: &[f64]) -> Result<IsoSurface> {
    Mc33::new(Mc33Config::default().with_iso_value(iso)).extract(grid, field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use isomesh_core::{sphere_field, Point3d, Vector3d};

    #[test]
    fn test_mc33_config_default() {
        let config = Mc33Config::default();
        assert_eq!(config.iso_value, 0.0);
        assert_eq!(config.normal_sign, NormalSign::Outward);
        assert_eq!(config.vertex_sharing, VertexSharing::Shared);
        assert!(!config.diagnostic_colors);
        assert_eq!(config.highlight_edge, None);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = Mc33Config::default()
            .with_iso_value(0.25)
            .with_normal_sign(NormalSign::Inward)
            .with_vertex_sharing(VertexSharing::Independent)
            .with_diagnostic_colors(true)
            .with_highlight_edge(Some(12));
        let json = serde_json::to_string(&config).unwrap();
        let back: Mc33Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let grid = GridDescriptor::unit([1, 1, 1]).unwrap();
        let field = [0.0; 8];

        let mc = Mc33::new(Mc33Config::default().with_highlight_edge(Some(13)));
        assert!(matches!(mc.extract(&grid, &field), Err(Error::InvalidData(_))));

        let mc = Mc33::new(Mc33Config::default().with_iso_value(f64::NAN));
        assert!(matches!(mc.extract(&grid, &field), Err(Error::InvalidData(_))));

        let mc = Mc33::default();
        assert!(matches!(
            mc.extract(&grid, &field[..7]),
            Err(Error::FieldLength {
                expected: 8,
                actual: 7
            })
        ));
    }

    #[test]
    fn test_stats_merge() {
        let mut a = ExtractionStats {
            cells_visited: 2,
            triangles: 3,
            ..Default::default()
        };
        a.case_histogram[1] = 1;
        let mut b = a.clone();
        b.case_histogram[13] = 4;

        a.merge(&b);
        assert_eq!(a.cells_visited, 4);
        assert_eq!(a.triangles, 6);
        assert_eq!(a.case_histogram[1], 2);
        assert_eq!(a.case_histogram[13], 4);
    }

    #[test]
    fn test_sphere_stats() {
        let grid = GridDescriptor::new(
            [6, 6, 6],
            Point3d::new(-1.5, -1.5, -1.5),
            Vector3d::new(0.5, 0.5, 0.5),
        )
        .unwrap();
        let field = sphere_field(&grid, Point3d::origin(), 1.0);

        let mut surface = IsoSurface::new();
        let stats = Mc33::default()
            .extract_into(&grid, &field, &mut surface)
            .unwrap();

        assert_eq!(stats.cells_visited, 216);
        assert!(stats.surface_cells > 0);
        assert_eq!(stats.case_histogram.iter().sum::<usize>(), stats.surface_cells);
        assert_eq!(stats.vertices, surface.vertex_count());
        assert_eq!(stats.triangles, surface.triangle_count());
        assert!(surface.colors.is_none());
    }
}
