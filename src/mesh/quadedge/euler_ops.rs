// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;

/// Creates a new bundle of four records, disconnected from everything else.
/// Returns the first primal record. Both primal records are alone in their
/// Onext cycle and the two dual records form a cycle of two, so the edge has
/// a single region around it. No origin is set.
pub fn make_edge(conn: &mut MeshConnectivity) -> EdgeId {
    let e0 = conn.alloc_edge_record(EdgeRole::Primal);
    let e1 = conn.alloc_edge_record(EdgeRole::Dual);
    let e2 = conn.alloc_edge_record(EdgeRole::Primal);
    let e3 = conn.alloc_edge_record(EdgeRole::Dual);

    conn.set_rot(e0, e1);
    conn.set_rot(e1, e2);
    conn.set_rot(e2, e3);
    conn.set_rot(e3, e0);

    conn.set_onext(e0, e0);
    conn.set_onext(e2, e2);
    conn.set_onext(e1, e3);
    conn.set_onext(e3, e1);

    e0
}

/// The Guibas-Stolfi splice. If `a` and `b` are in different Onext cycles,
/// merges them, inserting the cycle of `a` right after `b`. If they are in
/// the same cycle, splits it in two. The dual cycles are updated accordingly.
/// Splice is its own inverse.
pub fn splice(conn: &mut MeshConnectivity, a: EdgeId, b: EdgeId) -> Result<()> {
    // --- Collect handles ---
    let role_a = conn.at_edge(a).role()?;
    let role_b = conn.at_edge(b).role()?;
    if role_a != role_b {
        bail!("Cannot splice {a:?} ({role_a:?}) with {b:?} ({role_b:?})");
    }
    let a_next = conn.onext(a)?;
    let b_next = conn.onext(b)?;
    let alpha = conn.rot_inv(a_next)?;
    let beta = conn.rot_inv(b_next)?;
    let alpha_next = conn.onext(alpha)?;
    let beta_next = conn.onext(beta)?;

    // --- Fix connectivity ---
    conn.set_onext(a, b_next);
    conn.set_onext(b, a_next);
    conn.set_onext(alpha, beta_next);
    conn.set_onext(beta, alpha_next);

    Ok(())
}

/// Splits the edge `e`, going from `v` to `w`, by inserting a new vertex `x`
/// in between. Afterwards, `e` goes from `v` to `x` and the returned edge
/// goes from `x` to `w`. Both keep the faces on either side of `e`.
pub fn split_edge(conn: &mut MeshConnectivity, e: EdgeId) -> Result<EdgeId> {
    // --- Collect handles ---
    let (v, w) = conn.at_edge(e).src_dst_pair()?;
    let e_sym = conn.sym(e)?;
    let e_sym_prev = conn.oprev(e_sym)?;
    let f_l = conn.left_face(e)?;
    let f_r = conn.right_face(e)?;

    // --- Allocate new elements ---
    let x = conn.alloc_vertex(None);
    let e_new = make_edge(conn);
    let e_new_sym = conn.sym(e_new)?;
    let e_new_rot = conn.rot(e_new)?;
    let e_new_rot_inv = conn.rot_inv(e_new)?;

    // --- Fix connectivity ---

    // The new edge takes the place of sym(e) around w
    if e_sym_prev != e_sym {
        splice(conn, e_sym, e_sym_prev)?;
        splice(conn, e_new_sym, e_sym_prev)?;
    }
    // ...and sym(e) joins the new edge around x
    splice(conn, e_sym, e_new)?;

    conn.set_origin(e_sym, Some(Origin::Vertex(x)));
    conn.set_origin(e_new, Some(Origin::Vertex(x)));
    conn.set_origin(e_new_sym, Some(Origin::Vertex(w)));
    conn.set_origin(e_new_rot, f_l.map(Origin::Face));
    conn.set_origin(e_new_rot_inv, f_r.map(Origin::Face));

    conn[x].edge = Some(e_new);
    if conn[w].edge == Some(e_sym) {
        conn[w].edge = Some(e_new_sym);
    }

    log::debug!("split_edge: {v:?} -> {x:?} -> {w:?}");
    Ok(e_new)
}

/// The result of [`slice_open`].
///
/// When an endpoint of the sliced edge already touched a hole, it is split in
/// two. The vertex copy and the original can still share a position, so the
/// surface is no longer a single sheet at those points.
#[derive(Debug, Clone)]
pub struct SlicedEdge {
    /// The new edge, with the same endpoints as the sliced one. It bounds the
    /// face that was on the right of the sliced edge.
    pub edge: EdgeId,
    /// `(original, copy)` for every endpoint that was duplicated.
    pub split_vertices: SVec<(VertexId, VertexId)>,
}

/// Cuts the mesh open along `e`, which must have a face on both sides. A copy
/// of `e` takes over its right face, and a new hole with two sides opens
/// between them. Endpoints that were already on a hole are duplicated, and
/// the holes merge.
pub fn slice_open(conn: &mut MeshConnectivity, e: EdgeId) -> Result<SlicedEdge> {
    // --- Collect handles ---
    let (v, w) = conn.at_edge(e).src_dst_pair()?;
    let f_r = match (conn.left_face(e)?, conn.right_face(e)?) {
        (Some(_), Some(f_r)) => f_r,
        _ => bail!("Cannot slice {e:?} open: It lies on a boundary, so it is already open"),
    };
    let e_sym = conn.sym(e)?;
    let e_prev = conn.oprev(e)?;

    // --- Open the hole ---
    let e_new = make_edge(conn);
    let e_new_sym = conn.sym(e_new)?;
    splice(conn, e_new, e_prev)?;
    splice(conn, e_new_sym, e_sym)?;
    conn.set_origin(e_new, Some(Origin::Vertex(v)));
    conn.set_origin(e_new_sym, Some(Origin::Vertex(w)));

    // The hole is the region bounded by e_new and sym(e)
    conn.set_left_face(e_new, None)?;
    conn.set_left_face(e_new_sym, Some(f_r))?;
    if conn[f_r].edge == Some(e_sym) {
        conn[f_r].edge = Some(e_new_sym);
    }

    // --- Duplicate endpoints touching another hole ---
    // Both lookups happen before any splice. Splitting `v` merges the slit
    // with the hole found there, which may be the same hole `w` touches.
    let other_at_v = other_hole_at_origin(conn, e_new)?;
    let other_at_w = other_hole_at_origin(conn, e_sym)?;
    let mut split_vertices = SVec::new();
    for (on_hole, moved, original, other) in [
        (e_new, e_new, v, other_at_v),
        (e_sym, e_new_sym, w, other_at_w),
    ] {
        if let Some(other) = other {
            splice(conn, on_hole, other)?;
            let copy = conn.alloc_vertex(Some(moved));
            conn.set_ring_origin(moved, Some(Origin::Vertex(copy)))?;
            let kept = if moved == on_hole { other } else { on_hole };
            conn[original].edge = Some(kept);
            split_vertices.push((original, copy));
        }
    }

    log::debug!(
        "slice_open: {e:?} from {v:?} to {w:?}, {} vertices duplicated",
        split_vertices.len()
    );
    Ok(SlicedEdge {
        edge: e_new,
        split_vertices,
    })
}

/// Looks around the origin of `e`, which has a hole on its left, for an edge
/// that has a different hole on its left. The answer depends on the current
/// hole cycles, so it must be asked before any splice merges them.
fn other_hole_at_origin(conn: &MeshConnectivity, e: EdgeId) -> Result<Option<EdgeId>> {
    let hole = conn.lnext_ring(e)?.collect_svec();
    for h in conn.onext_ring(e)?.skip(1) {
        if conn.left_face(h)?.is_none() && !hole.contains(&h) {
            return Ok(Some(h));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod test {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn counts(mesh: &QuadEdgeMesh) -> (usize, usize, usize) {
        let conn = mesh.read_connectivity();
        (conn.num_vertices(), conn.num_edges(), conn.num_faces())
    }

    /// Number of distinct Lnext cycles without a face.
    fn count_holes(conn: &MeshConnectivity) -> usize {
        let mut seen = HashSet::new();
        let mut holes = 0;
        for (h, record) in conn.iter_edge_records() {
            if record.role() != EdgeRole::Primal || seen.contains(&h) {
                continue;
            }
            if conn.left_face(h).unwrap().is_none() {
                holes += 1;
                seen.extend(conn.lnext_ring(h).unwrap());
            }
        }
        holes
    }

    fn destinations(conn: &MeshConnectivity, edges: &[EdgeId]) -> Vec<Origin> {
        edges
            .iter()
            .map(|&e| conn.at_edge(e).dest().end())
            .collect()
    }

    fn grid_vertex(mesh: &QuadEdgeMesh, i: usize, j: usize) -> VertexId {
        let positions = mesh.read_positions();
        let target = Vec3::new(j as f32, 0.0, i as f32);
        mesh.read_connectivity()
            .iter_vertices()
            .map(|(v, _)| v)
            .find(|&v| positions[v].distance(target) < 1e-6)
            .unwrap()
    }

    #[test]
    fn test_make_edge() {
        let mut conn = MeshConnectivity::new();
        let e = make_edge(&mut conn);
        let sym = conn.sym(e).unwrap();

        assert_eq!(conn.num_edge_records(), 4);
        assert_eq!(conn.onext(e).unwrap(), e);
        assert_eq!(conn.onext(sym).unwrap(), sym);
        assert_ne!(e, sym);
        for h in [e, conn.rot(e).unwrap(), sym, conn.rot_inv(e).unwrap()] {
            let rot = conn.rot(h).unwrap();
            assert_eq!(conn.at_edge(h).rot().rot().rot().rot().end(), h);
            assert_eq!(conn.sym(conn.sym(h).unwrap()).unwrap(), h);
            assert_eq!(
                conn.record(rot).unwrap().role(),
                conn.record(h).unwrap().role().flipped()
            );
            assert_eq!(conn.record(h).unwrap().origin(), None);
        }
        assert!(conn.validate().is_valid());
    }

    #[test]
    fn test_splice_is_its_own_inverse() {
        let mut conn = MeshConnectivity::new();
        let a = make_edge(&mut conn);
        let b = make_edge(&mut conn);

        splice(&mut conn, a, b).unwrap();
        assert_eq!(conn.onext(b).unwrap(), a);
        assert_eq!(conn.onext(a).unwrap(), b);
        assert!(conn.ring_has_size::<OnextOp>(a, 2).unwrap());
        // The two lone edges now share the region around them
        assert!(conn.ring_has_size::<LnextOp>(a, 4).unwrap());

        splice(&mut conn, a, b).unwrap();
        assert!(conn.ring_has_size::<OnextOp>(a, 1).unwrap());
        assert!(conn.ring_has_size::<OnextOp>(b, 1).unwrap());
        assert!(conn.ring_has_size::<LnextOp>(a, 2).unwrap());
        assert!(conn.validate().is_valid());
    }

    #[test]
    fn test_splice_rejects_mixed_roles() {
        let mut conn = MeshConnectivity::new();
        let a = make_edge(&mut conn);
        let b = make_edge(&mut conn);
        let b_rot = conn.rot(b).unwrap();

        assert!(splice(&mut conn, a, b_rot).is_err());
        assert_eq!(conn.onext(a).unwrap(), a);
        assert_eq!(conn.onext(b_rot).unwrap(), conn.rot_inv(b).unwrap());
    }

    #[test]
    fn test_split_edge_on_closed_mesh() {
        init();
        let mut mesh = primitives::Box::build(Vec3::ZERO, Vec3::ONE);
        assert_eq!(counts(&mesh), (8, 12, 6));

        let e = mesh.read_connectivity().iter_primal_edges().next().unwrap();
        let (v, w) = mesh.read_connectivity().at_edge(e).src_dst_pair().unwrap();
        let (f_l, f_r) = {
            let conn = mesh.read_connectivity();
            (conn.left_face(e).unwrap(), conn.right_face(e).unwrap())
        };

        let e_new = mesh.split_edge(e).unwrap();
        assert_eq!(counts(&mesh), (9, 13, 6));

        let conn = mesh.read_connectivity();
        let x = conn.at_edge(e).dst_vertex().end();
        assert_eq!(conn.at_edge(e).vertex().end(), v);
        assert_eq!(conn.at_edge(e_new).src_dst_pair().unwrap(), (x, w));
        for h in [e, e_new] {
            assert_eq!(conn.left_face(h).unwrap(), f_l);
            assert_eq!(conn.right_face(h).unwrap(), f_r);
        }
        assert_eq!(conn.at_vertex(x).degree().unwrap(), 2);
        assert_eq!(conn.lnext(e).unwrap(), e_new);
        assert!(conn.ring_has_size::<LnextOp>(e, 5).unwrap());
        assert!(conn.ring_has_size::<RnextOp>(e, 5).unwrap());
        assert!(conn.validate().is_valid());
    }

    #[test]
    fn test_split_hexagon_edge() {
        let (mut mesh, f) = quadedge::test::hexagon();
        let old_lnext = mesh.read_connectivity().lnext(f[0]).unwrap();
        assert_eq!(old_lnext, f[1]);

        let e_new = mesh.split_edge(f[0]).unwrap();

        let conn = mesh.read_connectivity();
        assert_eq!(conn.lnext(f[0]).unwrap(), e_new);
        assert_eq!(conn.lnext(e_new).unwrap(), old_lnext);
        assert!(conn.ring_has_size::<LnextOp>(f[0], 7).unwrap());
        // The exterior side grew as well
        let outer = conn.sym(f[0]).unwrap();
        assert!(conn.ring_has_size::<LnextOp>(outer, 7).unwrap());
        assert_eq!(count_holes(&conn), 1);
        assert!(conn.validate().is_valid());
    }

    #[test]
    fn test_split_edge_requires_endpoints() {
        let mut conn = MeshConnectivity::new();
        let e = make_edge(&mut conn);
        let dual = conn.rot(e).unwrap();

        assert!(split_edge(&mut conn, e).is_err());
        assert!(split_edge(&mut conn, dual).is_err());
        assert_eq!(conn.num_edge_records(), 4);
        assert_eq!(conn.num_vertices(), 0);
    }

    #[test]
    fn test_slice_interior_edge() {
        init();
        let mut mesh = primitives::Grid::build(3, 3, 1.0);
        assert_eq!(counts(&mesh), (16, 24, 9));
        assert_eq!(count_holes(&mesh.read_connectivity()), 1);

        let (a, b) = (grid_vertex(&mesh, 1, 1), grid_vertex(&mesh, 1, 2));
        let e = mesh.find_edge(a, b).unwrap();
        let f_r = mesh.read_connectivity().right_face(e).unwrap();

        let sliced = mesh.slice_open(e).unwrap();
        assert!(sliced.split_vertices.is_empty());
        assert_eq!(counts(&mesh), (16, 25, 9));

        let conn = mesh.read_connectivity();
        assert_eq!(count_holes(&conn), 2);
        assert_eq!(conn.at_edge(sliced.edge).src_dst_pair().unwrap(), (a, b));
        assert_eq!(conn.right_face(sliced.edge).unwrap(), f_r);
        assert_eq!(conn.left_face(sliced.edge).unwrap(), None);
        assert_eq!(conn.right_face(e).unwrap(), None);
        assert!(conn.ring_has_size::<LnextOp>(sliced.edge, 2).unwrap());
        assert!(conn.validate().is_valid());
    }

    #[test]
    fn test_slice_path_to_boundary() {
        let mut mesh = primitives::Grid::build(3, 3, 1.0);
        let (a, b) = (grid_vertex(&mesh, 1, 1), grid_vertex(&mesh, 1, 2));
        let e = mesh.find_edge(a, b).unwrap();
        mesh.slice_open(e).unwrap();

        // Continue the cut from the border to the end of the first cut
        let border = grid_vertex(&mesh, 0, 1);
        let e2 = mesh.find_edge(border, a).unwrap();
        let sliced = mesh.slice_open(e2).unwrap();

        assert_eq!(counts(&mesh), (18, 26, 9));
        let originals = sliced.split_vertices.iter().map(|(o, _)| *o).collect_vec();
        assert_eq!(originals, vec![border, a]);

        let conn = mesh.read_connectivity();
        assert_eq!(count_holes(&conn), 1);
        let positions = mesh.read_positions();
        for &(original, copy) in &sliced.split_vertices {
            assert_eq!(positions[original], positions[copy]);
            assert!(conn.find_edge(original, copy).is_none());
            for h in conn.at_vertex(copy).outgoing_edges().unwrap() {
                assert_eq!(conn.at_edge(h).vertex().end(), copy);
            }
        }
        assert!(conn.validate().is_valid());
    }

    #[test]
    fn test_slice_chord_separates_mesh() {
        init();
        // The middle edge of a 1x2 strip joins two border vertices
        let mut mesh = primitives::Grid::build(1, 2, 1.0);
        assert_eq!(counts(&mesh), (6, 7, 2));
        let (a, b) = (grid_vertex(&mesh, 0, 1), grid_vertex(&mesh, 1, 1));
        let e = mesh.find_edge(a, b).unwrap();

        let sliced = mesh.slice_open(e).unwrap();
        assert_eq!(counts(&mesh), (8, 8, 2));
        let originals = sliced.split_vertices.iter().map(|(o, _)| *o).collect_vec();
        assert_eq!(originals, vec![a, b]);

        let conn = mesh.read_connectivity();
        assert_eq!(count_holes(&conn), 2);
        for (v, _) in conn.iter_vertices() {
            let h = conn.at_vertex(v).edge().end();
            assert_eq!(conn.hole_wedges(h).unwrap().len(), 1, "{v:?} is pinched");
        }

        // Each side of the cut is its own strip of four vertices
        let left = conn.begin_front(Some(e)).unwrap().collect_vec();
        let right = conn.begin_front(Some(sliced.edge)).unwrap().collect_vec();
        assert_eq!(left.len(), 4);
        assert_eq!(right.len(), 4);
        let left_dests = destinations(&conn, &left);
        assert!(destinations(&conn, &right)
            .iter()
            .all(|d| !left_dests.contains(d)));
        assert!(conn.validate().is_valid());
    }

    #[test]
    fn test_slice_boundary_edge_is_rejected() {
        let mut mesh = primitives::Grid::build(2, 2, 1.0);
        let e = {
            let conn = mesh.read_connectivity();
            let e = conn
                .iter_primal_edges()
                .find(|&e| conn.at_edge(e).is_boundary().unwrap())
                .unwrap();
            e
        };
        let before = mesh.read_connectivity().num_edge_records();

        assert!(mesh.slice_open(e).is_err());
        assert_eq!(mesh.read_connectivity().num_edge_records(), before);
        assert_eq!(counts(&mesh), (9, 12, 4));
    }
}
