// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::f32::consts::PI;

use glam::Quat;

use super::*;

pub struct Box;

impl Box {
    pub fn build(center: Vec3, size: Vec3) -> QuadEdgeMesh {
        let hsize = size * 0.5;

        let v1 = center + Vec3::new(-hsize.x, -hsize.y, -hsize.z);
        let v2 = center + Vec3::new(hsize.x, -hsize.y, -hsize.z);
        let v3 = center + Vec3::new(hsize.x, -hsize.y, hsize.z);
        let v4 = center + Vec3::new(-hsize.x, -hsize.y, hsize.z);

        let v5 = center + Vec3::new(-hsize.x, hsize.y, -hsize.z);
        let v6 = center + Vec3::new(-hsize.x, hsize.y, hsize.z);
        let v7 = center + Vec3::new(hsize.x, hsize.y, hsize.z);
        let v8 = center + Vec3::new(hsize.x, hsize.y, -hsize.z);

        QuadEdgeMesh::build_from_polygons(
            &[v1, v2, v3, v4, v5, v6, v7, v8],
            &[
                // Bottom, top
                &[0, 1, 2, 3],
                &[4, 5, 6, 7],
                // Front, back
                &[4, 7, 1, 0],
                &[3, 2, 6, 5],
                // Left, right
                &[5, 4, 0, 3],
                &[6, 2, 1, 7],
            ],
        )
        .expect("Cube construction should not fail")
    }
}

/// A single regular polygon face, with a hole (the outside) on its other
/// side.
pub struct Polygon;
impl Polygon {
    /// Builds a regular polygon with `num_vertices` sides on the XZ plane.
    /// Panics if `num_vertices` is less than 3.
    pub fn build(center: Vec3, radius: f32, num_vertices: usize) -> QuadEdgeMesh {
        let angle_delta = (2.0 * PI) / num_vertices as f32;
        let verts = (0..num_vertices)
            .map(|i| {
                let q = Quat::from_rotation_y(angle_delta * i as f32);
                q * (Vec3::Z * radius) + center
            })
            .collect_vec();
        let polygon = (0..num_vertices).collect_vec();

        QuadEdgeMesh::build_from_polygons(&verts, &[&polygon])
            .expect("Polygon construction should not fail")
    }
}

/// An open grid of quads on the XZ plane, with one corner at the origin.
pub struct Grid;
impl Grid {
    /// Builds a grid with `rows` x `cols` quads. The vertex in row `i` and
    /// column `j` is placed at `(j * spacing, 0, i * spacing)`.
    pub fn build(rows: usize, cols: usize, spacing: f32) -> QuadEdgeMesh {
        let idx = |i: usize, j: usize| i * (cols + 1) + j;
        let verts = (0..=rows)
            .cartesian_product(0..=cols)
            .map(|(i, j)| Vec3::new(j as f32 * spacing, 0.0, i as f32 * spacing))
            .collect_vec();
        let polygons = (0..rows)
            .cartesian_product(0..cols)
            .map(|(i, j)| [idx(i, j), idx(i, j + 1), idx(i + 1, j + 1), idx(i + 1, j)])
            .collect_vec();

        QuadEdgeMesh::build_from_polygons(&verts, &polygons)
            .expect("Grid construction should not fail")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_polygon() {
        let mesh = Polygon::build(Vec3::ZERO, 2.0, 6);
        let conn = mesh.read_connectivity();
        let positions = mesh.read_positions();

        assert_eq!(conn.num_vertices(), 6);
        assert_eq!(conn.num_edges(), 6);
        assert_eq!(conn.num_faces(), 1);
        for (v, _) in conn.iter_vertices() {
            assert!((positions[v].length() - 2.0).abs() < 1e-5);
        }
        assert!(conn.validate().is_valid());
    }

    #[test]
    fn test_grid() {
        let mesh = Grid::build(2, 3, 0.5);
        let conn = mesh.read_connectivity();

        assert_eq!(conn.num_vertices(), 12);
        assert_eq!(conn.num_edges(), 17);
        assert_eq!(conn.num_faces(), 6);
        let boundary = conn
            .iter_primal_edges()
            .filter(|&e| conn.at_edge(e).is_boundary().unwrap())
            .count();
        assert_eq!(boundary, 10);
        assert!(conn.validate().is_valid());
    }
}
