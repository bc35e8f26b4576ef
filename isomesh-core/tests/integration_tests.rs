use approx::assert_relative_eq;
use isomesh_core::*;

#[test]
fn test_sampled_field_over_offset_grid() {
    let grid = GridDescriptor::new(
        [3, 2, 1],
        Point3d::new(-1.0, -1.0, -1.0),
        Vector3d::new(0.5, 1.0, 2.0),
    )
    .unwrap();
    let values = sample_field(&grid, |p| p.x * p.y * p.z);
    let field = ScalarField::new(&grid, &values).unwrap();

    let p = grid.point_position(3, 2, 1);
    assert_relative_eq!(p, Point3d::new(0.5, 1.0, 1.0));
    assert_relative_eq!(field.value(3, 2, 1), 0.5);
    assert_eq!(field.values().len(), 4 * 3 * 2);
}

#[test]
fn test_field_rejects_wrong_length() {
    let grid = GridDescriptor::unit([4, 4, 4]).unwrap();
    let err = ScalarField::new(&grid, &[0.0; 64]).unwrap_err();
    assert_eq!(err.to_string(), "Scalar field has 64 samples, grid expects 125");
}

#[test]
fn test_grid_descriptor_serde() {
    let grid = GridDescriptor::new(
        [8, 4, 2],
        Point3d::new(1.0, 2.0, 3.0),
        Vector3d::new(0.25, 0.5, 1.0),
    )
    .unwrap();
    let json = serde_json::to_string(&grid).unwrap();
    let back: GridDescriptor = serde_json::from_str(&json).unwrap();
    assert_eq!(back, grid);
}

#[test]
fn test_writers_agree() {
    let mut surface = IsoSurface::with_colors();
    let mut buffer = IndexedSurfaceBuffer::new(16);

    let quad = [
        Point3d::new(0.0, 0.0, 0.0),
        Point3d::new(1.0, 0.0, 0.0),
        Point3d::new(1.0, 1.0, 0.0),
        Point3d::new(0.0, 1.0, 0.0),
    ];
    let n = Vector3d::new(0.0, 0.0, 1.0);

    fn write<W: SurfaceWriter>(writer: &mut W, quad: &[Point3d; 4], n: Vector3d) {
        let ids: Vec<u32> = quad
            .iter()
            .map(|&p| writer.add_vertex(p, n, [255, 255, 255]))
            .collect();
        writer.add_triangle([ids[0], ids[1], ids[2]]);
        writer.add_triangle([ids[0], ids[2], ids[3]]);
    }

    write(&mut surface, &quad, n);
    write(&mut buffer, &quad, n);

    assert_eq!(surface.vertex_count(), buffer.vertex_count());
    assert_eq!(surface.triangle_count(), buffer.triangle_count());

    let flat: Vec<u32> = surface.triangles.iter().flatten().copied().collect();
    assert_eq!(flat, buffer.indices());

    let mesh = surface.to_triangle_mesh();
    let normals = mesh.calculate_face_normals();
    assert!(normals.iter().all(|fn_| fn_.z > 0.99));
    assert_eq!(mesh.edge_report().boundary, 4);
}
