// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::prelude::*;
use crate::sync::{BorrowedRef, InteriorMutable, MutableRef};

use slotmap::SlotMap;

/// Implements indexing traits so the mesh data structure can be used to access
/// vertex, face or edge record information using ids as indices.
pub mod mesh_index_impls;

/// Type-safe wrappers over the internal allocator indices used as pointers
pub mod id_types;
pub use id_types::*;

/// An API to represent type-safe and error-handled graph traversals over a mesh
pub mod traversals;
pub use traversals::*;

/// Iterators over the Onext, Lnext, Rnext and Dnext cycles of an edge
pub mod rings;
pub use rings::*;

/// The topological operators: MakeEdge, Splice, SplitEdge and SliceOpen
pub mod euler_ops;
pub use euler_ops::SlicedEdge;

/// Cost-ordered flood traversal over the primal or the dual graph
pub mod front;
pub use front::*;

/// Primitive shapes, like polygons, boxes or grids
pub mod primitives;

pub mod channels;
pub use channels::*;

/// Consistency checks over the whole link structure
pub mod validate;
pub use validate::*;

/// Quad-edge meshes are made of cyclic linked lists. This means it is
/// sometimes impossible to ensure some algorithms will terminate when the mesh
/// is malformed. To ensure the code never goes into an infinite loop, this max
/// number of iterations will be performed before panicking. It should be large
/// enough, as faces or vertex fans with a very large number of edges may
/// trigger it.
pub const MAX_LOOP_ITERATIONS: usize = 8196;

/// A directed edge. Each record belongs to a bundle of four created together
/// by [`euler_ops::make_edge`]: the edge, its reverse, and the two dual edges
/// crossing it.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    rot: Option<EdgeId>,
    onext: Option<EdgeId>,
    origin: Option<Origin>,
    role: EdgeRole,
}

impl EdgeRecord {
    fn new(role: EdgeRole) -> Self {
        Self {
            rot: None,
            onext: None,
            origin: None,
            role,
        }
    }

    pub fn role(&self) -> EdgeRole {
        self.role
    }

    pub fn origin(&self) -> Option<Origin> {
        self.origin
    }
}

#[derive(Debug, Clone)]
pub struct Vertex {
    edge: Option<EdgeId>,
}

impl Vertex {
    /// Any primal edge leaving this vertex
    pub fn edge(&self) -> Option<EdgeId> {
        self.edge
    }
}

#[derive(Debug, Clone)]
pub struct Face {
    edge: Option<EdgeId>,
}

impl Face {
    /// Any primal edge that has this face on its left
    pub fn edge(&self) -> Option<EdgeId> {
        self.edge
    }
}

#[derive(Debug, Clone, Default)]
pub struct MeshConnectivity {
    edges: SlotMap<EdgeId, EdgeRecord>,
    vertices: SlotMap<VertexId, Vertex>,
    faces: SlotMap<FaceId, Face>,
}

#[derive(Debug)]
pub struct QuadEdgeMesh {
    connectivity: InteriorMutable<MeshConnectivity>,
    positions: InteriorMutable<Positions>,
}

impl MeshConnectivity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter()
    }

    pub fn iter_faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter()
    }

    pub fn iter_edge_records(&self) -> impl Iterator<Item = (EdgeId, &EdgeRecord)> {
        self.edges.iter()
    }

    /// Iterates one primal record per bundle, i.e. one per undirected edge.
    pub fn iter_primal_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges.iter().filter_map(move |(id, record)| {
            let sym = self.sym(id).ok()?;
            (record.role == EdgeRole::Primal && id < sym).then_some(id)
        })
    }

    /// Adds a new vertex to the mesh, disconnected from everything else. Returns its handle.
    fn alloc_vertex(&mut self, edge: Option<EdgeId>) -> VertexId {
        self.vertices.insert(Vertex { edge })
    }

    /// Adds a new face to the mesh, disconnected from everything else. Returns its handle.
    fn alloc_face(&mut self, edge: Option<EdgeId>) -> FaceId {
        self.faces.insert(Face { edge })
    }

    /// Adds a single unlinked edge record. Only `make_edge` should call this,
    /// since records always come in bundles of four.
    fn alloc_edge_record(&mut self, role: EdgeRole) -> EdgeId {
        self.edges.insert(EdgeRecord::new(role))
    }

    fn set_rot(&mut self, e: EdgeId, rot: EdgeId) {
        self[e].rot = Some(rot);
    }

    fn set_onext(&mut self, e: EdgeId, onext: EdgeId) {
        self[e].onext = Some(onext);
    }

    fn set_origin(&mut self, e: EdgeId, origin: Option<Origin>) {
        self[e].origin = origin;
    }

    /// Sets the origin of every record in the Onext cycle of `e`.
    fn set_ring_origin(&mut self, e: EdgeId, origin: Option<Origin>) -> Result<(), TraversalError> {
        let ring = self.onext_ring(e)?.collect_svec();
        for h in ring {
            self.set_origin(h, origin);
        }
        Ok(())
    }

    /// Sets the left face of every edge in the Lnext cycle of `e`.
    fn set_left_face(&mut self, e: EdgeId, face: Option<FaceId>) -> Result<(), TraversalError> {
        let duals = self
            .lnext_ring(e)?
            .map(|h| self.rot(h))
            .collect::<Result<SVec<_>, _>>()?;
        for d in duals {
            self.set_origin(d, face.map(Origin::Face));
        }
        Ok(())
    }

    pub fn record(&self, e: EdgeId) -> Result<&EdgeRecord, TraversalError> {
        self.edges.get(e).ok_or(TraversalError::EdgeNotFound(e))
    }

    pub fn rot(&self, e: EdgeId) -> Result<EdgeId, TraversalError> {
        self.record(e)?.rot.ok_or(TraversalError::EdgeHasNoRot(e))
    }

    pub fn onext(&self, e: EdgeId) -> Result<EdgeId, TraversalError> {
        self.record(e)?.onext.ok_or(TraversalError::EdgeHasNoOnext(e))
    }

    pub fn sym(&self, e: EdgeId) -> Result<EdgeId, TraversalError> {
        self.rot(self.rot(e)?)
    }

    pub fn rot_inv(&self, e: EdgeId) -> Result<EdgeId, TraversalError> {
        self.rot(self.sym(e)?)
    }

    pub fn lnext(&self, e: EdgeId) -> Result<EdgeId, TraversalError> {
        self.rot_inv(self.onext(self.rot(e)?)?)
    }

    pub fn rnext(&self, e: EdgeId) -> Result<EdgeId, TraversalError> {
        self.rot(self.onext(self.rot_inv(e)?)?)
    }

    pub fn dnext(&self, e: EdgeId) -> Result<EdgeId, TraversalError> {
        self.sym(self.onext(self.sym(e)?)?)
    }

    /// The inverse of `onext`: the previous edge around the origin.
    pub fn oprev(&self, e: EdgeId) -> Result<EdgeId, TraversalError> {
        self.rot_inv(self.onext(self.rot_inv(e)?)?)
    }

    /// The face to the left of the primal edge `e`, or `None` when that side
    /// is a hole or the exterior.
    pub fn left_face(&self, e: EdgeId) -> Result<Option<FaceId>, TraversalError> {
        self.face_at_dual(e, self.rot(e)?)
    }

    /// The face to the right of the primal edge `e`, or `None` when that side
    /// is a hole or the exterior.
    pub fn right_face(&self, e: EdgeId) -> Result<Option<FaceId>, TraversalError> {
        self.face_at_dual(e, self.rot_inv(e)?)
    }

    fn face_at_dual(&self, e: EdgeId, dual: EdgeId) -> Result<Option<FaceId>, TraversalError> {
        if self.record(e)?.role != EdgeRole::Primal {
            return Err(TraversalError::NotPrimal(e));
        }
        match self.record(dual)?.origin {
            Some(Origin::Face(f)) => Ok(Some(f)),
            Some(Origin::Vertex(_)) => Err(TraversalError::NotDual(dual)),
            None => Ok(None),
        }
    }

    /// Returns the edge going from `p` to `q`, if there is one.
    pub fn find_edge(&self, p: VertexId, q: VertexId) -> Option<EdgeId> {
        let h0 = self.vertex(p)?.edge?;
        self.onext_ring(h0)
            .ok()?
            .find(|&h| self.at_edge(h).dst_vertex().try_end().ok() == Some(q))
    }

    /// Connects `p` and `q` with a new edge, or returns the edge that already
    /// goes from `p` to `q`. At each endpoint, the new edge is spliced in
    /// right after an edge whose left side has no face.
    pub fn add_edge(&mut self, p: VertexId, q: VertexId) -> Result<EdgeId> {
        if p == q {
            bail!("Cannot connect vertex {p:?} to itself");
        }
        for v in [p, q] {
            if self.vertex(v).is_none() {
                bail!("Vertex {v:?} is not part of this mesh");
            }
        }
        if let Some(existing) = self.find_edge(p, q) {
            return Ok(existing);
        }

        let p_anchor = self.border_insertion_point(p)?;
        let q_anchor = self.border_insertion_point(q)?;

        let e = euler_ops::make_edge(self);
        let e_sym = self.sym(e)?;
        self.set_origin(e, Some(Origin::Vertex(p)));
        self.set_origin(e_sym, Some(Origin::Vertex(q)));

        for (h, v, anchor) in [(e, p, p_anchor), (e_sym, q, q_anchor)] {
            match anchor {
                Some(anchor) => euler_ops::splice(self, h, anchor)?,
                None => self[v].edge = Some(h),
            }
        }

        log::trace!("add_edge: {p:?} -> {q:?} as {e:?}");
        Ok(e)
    }

    /// Finds where a new edge can be attached to `v`. Returns `None` for an
    /// isolated vertex.
    ///
    /// The new edge goes right after the first edge without a left face,
    /// walking the Onext cycle from the edge stored in the vertex. A vertex
    /// where the boundary passes more than once is rejected, since it is not
    /// clear which of its holes the edge should enter.
    fn border_insertion_point(&self, v: VertexId) -> Result<Option<EdgeId>> {
        match self.vertex(v).and_then(|vertex| vertex.edge) {
            None => Ok(None),
            Some(h0) => {
                if self.hole_wedges(h0)?.len() > 1 {
                    bail!("Vertex {v:?} touches the boundary more than once");
                }
                for h in self.onext_ring(h0)? {
                    if self.left_face(h)?.is_none() {
                        return Ok(Some(h));
                    }
                }
                bail!(
                    "Vertex {v:?} is surrounded by faces. \
                     Connecting another edge would make it non-manifold."
                )
            }
        }
    }

    /// The edges around the origin of `h0` that start a run of consecutive
    /// edges without a left face, in Onext order. On a manifold this has at
    /// most one element. A ring with no faces at all counts as a single run.
    pub fn hole_wedges(&self, h0: EdgeId) -> Result<SVec<EdgeId>, TraversalError> {
        let ring = self.onext_ring(h0)?.collect_svec();
        let lefts = ring
            .iter()
            .map(|&h| self.left_face(h))
            .collect::<Result<SVec<_>, _>>()?;
        if lefts.iter().all(Option::is_none) {
            return Ok(ring.into_iter().take(1).collect());
        }
        let n = ring.len();
        Ok((0..n)
            .filter(|&i| lefts[i].is_none() && lefts[(i + n - 1) % n].is_some())
            .map(|i| ring[i])
            .collect())
    }

    /// Assigns a new face to the Lnext cycle of `e`.
    pub fn add_face(&mut self, e: EdgeId) -> Result<FaceId> {
        if let Some(face) = self.left_face(e)? {
            bail!("The left side of {e:?} already belongs to {face:?}");
        }
        let face = self.alloc_face(Some(e));
        self.set_left_face(e, Some(face))?;
        log::trace!("add_face: {face:?} bounded by {e:?}");
        Ok(face)
    }

    /// First record of `role` in arena order whose destination is set. Used
    /// to seed a frontier when the caller does not provide an edge.
    fn default_seed(&self, role: EdgeRole) -> Option<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, record)| record.role == role)
            .map(|(id, _)| id)
            .find(|&id| self.at_edge(id).dest().try_end().is_ok())
    }

    /// Number of undirected edges, i.e. number of bundles.
    pub fn num_edges(&self) -> usize {
        self.edges.len() / 4
    }

    pub fn num_edge_records(&self) -> usize {
        self.edges.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }
}

impl QuadEdgeMesh {
    pub fn new() -> Self {
        Self {
            connectivity: InteriorMutable::new(MeshConnectivity::new()),
            positions: InteriorMutable::new(Positions::new()),
        }
    }

    pub fn read_connectivity(&self) -> BorrowedRef<'_, MeshConnectivity> {
        self.connectivity.borrow()
    }

    pub fn write_connectivity(&self) -> MutableRef<'_, MeshConnectivity> {
        self.connectivity.borrow_mut()
    }

    pub fn read_positions(&self) -> BorrowedRef<'_, Positions> {
        self.positions.borrow()
    }

    pub fn write_positions(&self) -> MutableRef<'_, Positions> {
        self.positions.borrow_mut()
    }

    /// Adds an isolated vertex at `position`.
    pub fn add_point(&mut self, position: Vec3) -> VertexId {
        let v = self.write_connectivity().alloc_vertex(None);
        self.write_positions()[v] = position;
        v
    }

    pub fn find_edge(&self, p: VertexId, q: VertexId) -> Option<EdgeId> {
        self.read_connectivity().find_edge(p, q)
    }

    pub fn add_edge(&mut self, p: VertexId, q: VertexId) -> Result<EdgeId> {
        self.write_connectivity().add_edge(p, q)
    }

    pub fn add_face(&mut self, e: EdgeId) -> Result<FaceId> {
        self.write_connectivity().add_face(e)
    }

    /// Splits `e` in two, placing the new vertex at the midpoint of the edge.
    /// Returns the edge running from the new vertex to the old destination.
    pub fn split_edge(&mut self, e: EdgeId) -> Result<EdgeId> {
        let mut conn = self.write_connectivity();
        let (src, dst) = conn.at_edge(e).src_dst_pair()?;
        let e_new = euler_ops::split_edge(&mut conn, e)?;
        let mid = conn.at_edge(e_new).vertex().try_end()?;

        let mut positions = self.write_positions();
        let mid_pos = positions[src].lerp(positions[dst], 0.5);
        positions[mid] = mid_pos;
        Ok(e_new)
    }

    /// Cuts the mesh open along `e`. Duplicated vertices keep the position of
    /// the vertex they were split from.
    pub fn slice_open(&mut self, e: EdgeId) -> Result<SlicedEdge> {
        let sliced = euler_ops::slice_open(&mut self.write_connectivity(), e)?;
        let mut positions = self.write_positions();
        for &(original, copy) in &sliced.split_vertices {
            let pos = positions[original];
            positions[copy] = pos;
        }
        Ok(sliced)
    }

    /// Builds this mesh from a list of vertices, and a list of polygons,
    /// containing indices that reference those vertices.
    ///
    /// - Generic over Index: Use as much precision as you need / want.
    /// - Generic over Polygon: Use whatever input layout you want.
    ///
    /// If unsure, you can pass `Vec<Vec<u32>>` as `polygons`. You can also use
    /// `[[u32;3]]` or `&[&[u32]]`. Same for `u8`, `u16` or `usize` indices.
    ///
    /// All polygons must be oriented the same way, and every vertex must be
    /// surrounded by a single fan of polygons.
    #[profiling::function]
    pub fn build_from_polygons<Index, Polygon>(
        positions: &[Vec3],
        polygons: &[Polygon],
    ) -> Result<Self>
    where
        Index: num_traits::AsPrimitive<usize> + 'static + Eq + PartialEq + core::hash::Hash + Copy,
        Polygon: AsRef<[Index]>,
    {
        let mesh = Self::new();
        let mut conn = mesh.write_connectivity();
        let mut positions_ch = mesh.write_positions();

        // Maps indices from the `polygons` array to the allocated vertices in
        // the newly created mesh.
        let mut index_to_vertex = HashMap::<Index, VertexId>::new();

        // First pass over polygon data: sanity checks and vertex allocation
        for polygon in polygons.iter().map(|p| p.as_ref()) {
            if polygon.len() < 3 {
                bail!("Cannot build meshes where polygons have less than three vertices.")
            }
            if polygon.iter().duplicates().next().is_some() {
                bail!("Cannot not build meshes where a polygon has duplicate vertices")
            }

            for index in polygon {
                let position = positions.get(index.as_()).ok_or_else(|| {
                    anyhow!("Out-of-bounds index in the polygon array {}", index.as_())
                })?;
                index_to_vertex.entry(*index).or_insert_with(|| {
                    let v = conn.alloc_vertex(None);
                    positions_ch[v] = *position;
                    v
                });
            }
        }

        // Maps the oriented pair that first introduced an undirected edge to
        // the primal record going in that direction.
        let mut pair_to_edge = HashMap::<(Index, Index), EdgeId>::new();
        let mut used_pairs = HashSet::<(Index, Index)>::new();
        // Every primal record leaving each vertex.
        let mut outgoing = HashMap::<VertexId, SVec<EdgeId>>::new();
        // The counter-clockwise successor of a record around its origin, as
        // given by the polygon corners.
        let mut fan_next = HashMap::<EdgeId, EdgeId>::new();
        let mut polygon_edges = Vec::with_capacity(polygons.len());

        for polygon in polygons.iter().map(|p| p.as_ref()) {
            // Cyclically ordered list of the primal records of this face.
            let mut edges_in_face = SVec::new();

            for (&a, &b) in polygon.iter().circular_tuple_windows() {
                if !used_pairs.insert((a, b)) {
                    bail!(
                        "Found multiple oriented edges with the same indices.\
                         This means either (i) surface is non-manifold or (ii) faces \
                         are not oriented in the same direction"
                    )
                }

                let h = match pair_to_edge.get(&(b, a)) {
                    Some(&twin) => conn.sym(twin)?,
                    None => {
                        let (v_a, v_b) = (index_to_vertex[&a], index_to_vertex[&b]);
                        let e = euler_ops::make_edge(&mut conn);
                        let e_sym = conn.sym(e)?;
                        conn.set_origin(e, Some(Origin::Vertex(v_a)));
                        conn.set_origin(e_sym, Some(Origin::Vertex(v_b)));
                        outgoing.entry(v_a).or_default().push(e);
                        outgoing.entry(v_b).or_default().push(e_sym);
                        pair_to_edge.insert((a, b), e);
                        e
                    }
                };
                edges_in_face.push(h);
            }

            // At corner u -> v -> w, the edge coming back to u follows the
            // edge going to w around v.
            for (&h1, &h2) in edges_in_face.iter().circular_tuple_windows() {
                fan_next.insert(h2, conn.sym(h1)?);
            }
            polygon_edges.push(edges_in_face);
        }

        // Turn each vertex fan into an Onext cycle. A boundary fan is a chain
        // with a single start, an interior fan is already a cycle. Anything
        // else is not a polygon fan, but some other (thus, non-manifold)
        // structure.
        for (&v, fan) in outgoing.iter() {
            let targets: HashSet<EdgeId> =
                fan.iter().filter_map(|h| fan_next.get(h)).copied().collect();
            let starts = fan.iter().filter(|h| !targets.contains(h)).collect_svec();
            if starts.len() > 1 {
                bail!("At least one of the vertices is not a polygon fan, but some other nonmanifold structure instead.")
            }

            let first = starts.first().map(|h| **h).unwrap_or(fan[0]);
            let mut ring: SVec<EdgeId> = smallvec::smallvec![first];
            let mut h = first;
            while let Some(&next) = fan_next.get(&h) {
                if next == first || ring.len() > fan.len() {
                    break;
                }
                ring.push(next);
                h = next;
            }
            if ring.len() != fan.len() {
                bail!("At least one of the vertices is not a polygon fan, but some other nonmanifold structure instead.")
            }

            for (&prev, &h) in ring.iter().tuple_windows() {
                euler_ops::splice(&mut conn, h, prev)?;
            }
            conn[v].edge = Some(first);
        }

        for edges_in_face in &polygon_edges {
            let h0 = edges_in_face[0];
            if !conn.ring_has_size::<LnextOp>(h0, edges_in_face.len())? {
                bail!("A polygon boundary does not close into a face loop. Is the input non-manifold?")
            }
            conn.add_face(h0)?;
        }

        log::debug!(
            "build_from_polygons: {} vertices, {} edges, {} faces",
            conn.num_vertices(),
            conn.num_edges(),
            conn.num_faces()
        );

        drop(conn);
        drop(positions_ch);
        Ok(mesh)
    }
}

impl Default for QuadEdgeMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for QuadEdgeMesh {
    fn clone(&self) -> Self {
        Self {
            connectivity: InteriorMutable::new(MeshConnectivity::clone(&self.read_connectivity())),
            positions: InteriorMutable::new(Positions::clone(&self.read_positions())),
        }
    }
}
