// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::marker::PhantomData;

use super::*;

/// A single step along one of the rotational cycles of the edge algebra.
pub trait RingOp {
    fn step(conn: &MeshConnectivity, e: EdgeId) -> Result<EdgeId, TraversalError>;
}

/// Counter-clockwise around the origin of the edge.
pub struct OnextOp;
/// Counter-clockwise around the left face of the edge.
pub struct LnextOp;
/// Around the right face of the edge.
pub struct RnextOp;
/// Around the destination of the edge, through the edges coming into it.
pub struct DnextOp;

impl RingOp for OnextOp {
    fn step(conn: &MeshConnectivity, e: EdgeId) -> Result<EdgeId, TraversalError> {
        conn.onext(e)
    }
}

impl RingOp for LnextOp {
    fn step(conn: &MeshConnectivity, e: EdgeId) -> Result<EdgeId, TraversalError> {
        conn.lnext(e)
    }
}

impl RingOp for RnextOp {
    fn step(conn: &MeshConnectivity, e: EdgeId) -> Result<EdgeId, TraversalError> {
        conn.rnext(e)
    }
}

impl RingOp for DnextOp {
    fn step(conn: &MeshConnectivity, e: EdgeId) -> Result<EdgeId, TraversalError> {
        conn.dnext(e)
    }
}

/// Walks a rotational cycle once, starting at (and yielding first) the start
/// edge.
pub struct RingIter<'a, Op: RingOp> {
    conn: &'a MeshConnectivity,
    start: EdgeId,
    next: EdgeId,
    count: usize,
    _op: PhantomData<Op>,
}

impl<'a, Op: RingOp> RingIter<'a, Op> {
    pub fn new(conn: &'a MeshConnectivity, start: EdgeId) -> Result<Self, TraversalError> {
        conn.record(start)?;
        Ok(Self {
            conn,
            start,
            next: start,
            count: 0,
            _op: PhantomData,
        })
    }

    pub fn start(&self) -> EdgeId {
        self.start
    }
}

impl<'a, Op: RingOp> Iterator for RingIter<'a, Op> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.count >= MAX_LOOP_ITERATIONS {
            panic!("Max number of iterations reached. Is the mesh malformed?");
        } else if self.count > 0 && self.next == self.start {
            None
        } else {
            let res = self.next;
            self.next = Op::step(self.conn, self.next).unwrap_or_else(|err| {
                panic!("Broken link while walking a ring: {err}. Is the mesh malformed?")
            });
            self.count += 1;
            Some(res)
        }
    }
}

impl<'a, Op: RingOp> std::iter::FusedIterator for RingIter<'a, Op> {}

impl MeshConnectivity {
    /// The edges leaving the origin of `e`, counter-clockwise.
    pub fn onext_ring(&self, e: EdgeId) -> Result<RingIter<'_, OnextOp>, TraversalError> {
        RingIter::new(self, e)
    }

    /// The edges bounding the left face of `e`.
    pub fn lnext_ring(&self, e: EdgeId) -> Result<RingIter<'_, LnextOp>, TraversalError> {
        RingIter::new(self, e)
    }

    pub fn rnext_ring(&self, e: EdgeId) -> Result<RingIter<'_, RnextOp>, TraversalError> {
        RingIter::new(self, e)
    }

    pub fn dnext_ring(&self, e: EdgeId) -> Result<RingIter<'_, DnextOp>, TraversalError> {
        RingIter::new(self, e)
    }

    /// Returns whether the `Op` cycle through `e` closes after exactly `n`
    /// steps. Never walks more than `n` steps, so it is safe to call on
    /// cycles that may be broken.
    pub fn ring_has_size<Op: RingOp>(&self, e: EdgeId, n: usize) -> Result<bool, TraversalError> {
        self.record(e)?;
        let mut h = e;
        for step in 1..=n {
            h = Op::step(self, h)?;
            if h == e {
                return Ok(step == n);
            }
        }
        Ok(false)
    }

    /// Counts the edges in the `Op` cycle through `e`. Unlike the ring
    /// iterators, a cycle that does not close is reported as an error instead
    /// of panicking.
    pub fn ring_size<Op: RingOp>(&self, e: EdgeId) -> Result<usize, TraversalError> {
        self.record(e)?;
        let mut h = e;
        for step in 1..=MAX_LOOP_ITERATIONS {
            h = Op::step(self, h)?;
            if h == e {
                return Ok(step);
            }
        }
        Err(TraversalError::RingBadLoop(e))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_isolated_edge_rings() {
        let mut conn = MeshConnectivity::new();
        let e = euler_ops::make_edge(&mut conn);
        let sym = conn.sym(e).unwrap();

        assert_eq!(conn.onext_ring(e).unwrap().collect_vec(), vec![e]);
        assert_eq!(conn.onext_ring(sym).unwrap().collect_vec(), vec![sym]);
        // Both sides of a lone edge are the same region, going around it.
        assert_eq!(conn.lnext_ring(e).unwrap().collect_vec(), vec![e, sym]);
        assert!(conn.ring_has_size::<OnextOp>(e, 1).unwrap());
        assert!(!conn.ring_has_size::<OnextOp>(e, 0).unwrap());
        assert!(!conn.ring_has_size::<LnextOp>(e, 1).unwrap());
        assert!(conn.ring_has_size::<LnextOp>(e, 2).unwrap());
        assert_eq!(conn.ring_size::<LnextOp>(e), Ok(2));
    }

    #[test]
    fn test_onext_ring_matches_vertex_degree() {
        let mesh = primitives::Grid::build(3, 3, 1.0);
        let conn = mesh.read_connectivity();
        let mut degrees = HashMap::<usize, usize>::new();
        for (v, _) in conn.iter_vertices() {
            let h = conn.at_vertex(v).edge().end();
            let ring = conn.onext_ring(h).unwrap().collect_vec();
            assert!(conn.ring_has_size::<OnextOp>(h, ring.len()).unwrap());
            for &r in &ring {
                assert_eq!(conn.at_edge(r).vertex().end(), v);
            }
            *degrees.entry(ring.len()).or_default() += 1;
        }
        // 4 corners, 8 border vertices and 4 interior vertices
        assert_eq!(degrees[&2], 4);
        assert_eq!(degrees[&3], 8);
        assert_eq!(degrees[&4], 4);
    }

    #[test]
    fn test_ring_iter_is_fused() {
        let mesh = primitives::Polygon::build(Vec3::ZERO, 1.0, 5);
        let conn = mesh.read_connectivity();
        let (_, face) = conn.iter_faces().next().unwrap();
        let mut ring = conn.lnext_ring(face.edge().unwrap()).unwrap();
        assert_eq!(ring.by_ref().count(), 5);
        assert_eq!(ring.next(), None);
        assert_eq!(ring.next(), None);
    }

    #[test]
    fn test_ring_of_missing_edge() {
        let mut conn = MeshConnectivity::new();
        let e = euler_ops::make_edge(&mut conn);
        let sym = conn.sym(e).unwrap();
        let empty = MeshConnectivity::new();
        assert_eq!(
            empty.onext_ring(e).err(),
            Some(TraversalError::EdgeNotFound(e))
        );
        assert!(empty.ring_has_size::<LnextOp>(sym, 2).is_err());
    }
}
