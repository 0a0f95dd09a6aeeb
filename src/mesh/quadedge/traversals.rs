// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

pub trait Location {}

impl Location for VertexId {}
impl Location for FaceId {}
impl Location for EdgeId {}
impl Location for Origin {}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TraversalError {
    EdgeNotFound(EdgeId),
    EdgeHasNoRot(EdgeId),
    EdgeHasNoOnext(EdgeId),
    EdgeHasNoOrigin(EdgeId),
    NotPrimal(EdgeId),
    NotDual(EdgeId),
    VertexHasNoEdge(VertexId),
    FaceHasNoEdge(FaceId),
    RingBadLoop(EdgeId),
}
impl std::fmt::Display for TraversalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{:?}", self))
    }
}
impl std::error::Error for TraversalError {}

#[derive(Clone, Copy)]
pub struct ValidTraversal<'a, L>
where
    L: Location,
{
    inner: &'a MeshConnectivity,
    location: L,
}

pub type Traversal<'a, L> = Result<ValidTraversal<'a, L>, TraversalError>;

/* ===================== */
/* Traversal on vertices */
/* ===================== */

pub trait VertexTraversal<'a> {
    fn edge(&'a self) -> Traversal<'a, EdgeId>;
}

impl<'a> VertexTraversal<'a> for Traversal<'a, VertexId> {
    fn edge(&'a self) -> Traversal<'a, EdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .edge
                    .ok_or(TraversalError::VertexHasNoEdge(valid.location))?,
            })
        })
    }
}

/* ================== */
/* Traversal on faces */
/* ================== */

pub trait FaceTraversal<'a> {
    fn edge(&'a self) -> Traversal<'a, EdgeId>;
}
impl<'a> FaceTraversal<'a> for Traversal<'a, FaceId> {
    fn edge(&'a self) -> Traversal<'a, EdgeId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid.inner[valid.location]
                    .edge
                    .ok_or(TraversalError::FaceHasNoEdge(valid.location))?,
            })
        })
    }
}

/* =================== */
/* Traversal on edges  */
/* =================== */

/// Moves along the two stored links of an edge record.
pub trait EdgeTraversal<'a> {
    fn rot(&'a self) -> Traversal<'a, EdgeId>;
    fn onext(&'a self) -> Traversal<'a, EdgeId>;
    fn origin(&'a self) -> Traversal<'a, Origin>;
    fn role(&'a self) -> Result<EdgeRole, TraversalError>;
}

macro_rules! impl_edge_step {
    ($name:ident) => {
        fn $name(&'a self) -> Traversal<'a, EdgeId> {
            self.and_then(|valid| {
                Ok(ValidTraversal {
                    inner: valid.inner,
                    location: valid.inner.$name(valid.location)?,
                })
            })
        }
    };
}

impl<'a> EdgeTraversal<'a> for Traversal<'a, EdgeId> {
    impl_edge_step!(rot);
    impl_edge_step!(onext);

    fn origin(&'a self) -> Traversal<'a, Origin> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: valid
                    .inner
                    .record(valid.location)?
                    .origin
                    .ok_or(TraversalError::EdgeHasNoOrigin(valid.location))?,
            })
        })
    }

    fn role(&'a self) -> Result<EdgeRole, TraversalError> {
        self.and_then(|valid| Ok(valid.inner.record(valid.location)?.role))
    }
}

/* ================ */
/*   Edge Helpers   */
/* ================ */

/// The derived moves of the edge algebra, plus the endpoints and faces of
/// an edge.
pub trait EdgeTraversalHelpers<'a> {
    fn sym(&'a self) -> Traversal<'a, EdgeId>;
    fn rot_inv(&'a self) -> Traversal<'a, EdgeId>;
    fn lnext(&'a self) -> Traversal<'a, EdgeId>;
    fn rnext(&'a self) -> Traversal<'a, EdgeId>;
    fn dnext(&'a self) -> Traversal<'a, EdgeId>;
    fn oprev(&'a self) -> Traversal<'a, EdgeId>;
    fn dest(&'a self) -> Traversal<'a, Origin>;
    fn vertex(&'a self) -> Traversal<'a, VertexId>;
    fn dst_vertex(&'a self) -> Traversal<'a, VertexId>;
    fn src_dst_pair(&'a self) -> Result<(VertexId, VertexId), TraversalError>;
    fn left_face(&'a self) -> Result<Option<FaceId>, TraversalError>;
    fn right_face(&'a self) -> Result<Option<FaceId>, TraversalError>;
    fn is_boundary(&'a self) -> Result<bool, TraversalError>;
}

impl<'a> EdgeTraversalHelpers<'a> for Traversal<'a, EdgeId> {
    impl_edge_step!(sym);
    impl_edge_step!(rot_inv);
    impl_edge_step!(lnext);
    impl_edge_step!(rnext);
    impl_edge_step!(dnext);
    impl_edge_step!(oprev);

    fn dest(&'a self) -> Traversal<'a, Origin> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: self.sym().origin().try_end()?,
            })
        })
    }

    fn vertex(&'a self) -> Traversal<'a, VertexId> {
        self.and_then(|valid| match self.origin().try_end()? {
            Origin::Vertex(v) => Ok(ValidTraversal {
                inner: valid.inner,
                location: v,
            }),
            Origin::Face(_) => Err(TraversalError::NotPrimal(valid.location)),
        })
    }

    fn dst_vertex(&'a self) -> Traversal<'a, VertexId> {
        self.and_then(|valid| {
            Ok(ValidTraversal {
                inner: valid.inner,
                location: self.sym().vertex().try_end()?,
            })
        })
    }

    fn src_dst_pair(&'a self) -> Result<(VertexId, VertexId), TraversalError> {
        Ok((self.vertex().try_end()?, self.dst_vertex().try_end()?))
    }

    fn left_face(&'a self) -> Result<Option<FaceId>, TraversalError> {
        self.and_then(|valid| valid.inner.left_face(valid.location))
    }

    fn right_face(&'a self) -> Result<Option<FaceId>, TraversalError> {
        self.and_then(|valid| valid.inner.right_face(valid.location))
    }

    /// An edge is on the boundary when at least one of its sides has no face.
    fn is_boundary(&'a self) -> Result<bool, TraversalError> {
        Ok(self.left_face()?.is_none() || self.right_face()?.is_none())
    }
}

/* =================== */
/*  Generic traversal  */
/* =================== */

pub trait AnyTraversal<'a, L> {
    fn end(&'a self) -> L;
    fn try_end(&'a self) -> Result<L, TraversalError>;
}
impl<'a, L> AnyTraversal<'a, L> for Traversal<'a, L>
where
    L: Location + Copy,
{
    fn end(&'a self) -> L {
        self.map(|valid| valid.location)
            .unwrap_or_else(|err| panic!("Error during traversal: {:?}", err))
    }

    fn try_end(&'a self) -> Result<L, TraversalError> {
        self.map(|valid| valid.location)
    }
}

/* ============ */
/*  Initiators  */
/* ============ */

impl MeshConnectivity {
    pub fn at_edge(&self, edge_id: EdgeId) -> Traversal<'_, EdgeId> {
        Ok(ValidTraversal {
            inner: self,
            location: edge_id,
        })
    }

    pub fn at_face(&self, face_id: FaceId) -> Traversal<'_, FaceId> {
        Ok(ValidTraversal {
            inner: self,
            location: face_id,
        })
    }

    pub fn at_vertex(&self, vertex_id: VertexId) -> Traversal<'_, VertexId> {
        Ok(ValidTraversal {
            inner: self,
            location: vertex_id,
        })
    }
}

/* ================ */
/*  Vertex Helpers  */
/* ================ */

pub trait VertexTraversalHelpers<'a> {
    fn outgoing_edges(&'a self) -> Result<SVec<EdgeId>, TraversalError>;
    fn degree(&'a self) -> Result<usize, TraversalError>;
}

impl<'a> VertexTraversalHelpers<'a> for Traversal<'a, VertexId> {
    /// The edges leaving this vertex, in counter-clockwise order.
    fn outgoing_edges(&'a self) -> Result<SVec<EdgeId>, TraversalError> {
        self.and_then(|valid| {
            // Could be an isolated vertex. Return an empty list in that case.
            match valid.inner[valid.location].edge {
                Some(h0) => Ok(valid.inner.onext_ring(h0)?.collect_svec()),
                None => Ok(SVec::new()),
            }
        })
    }

    fn degree(&'a self) -> Result<usize, TraversalError> {
        Ok(self.outgoing_edges()?.len())
    }
}

/* ============== */
/*  Face Helpers  */
/* ============== */

pub trait FaceTraversalHelpers<'a> {
    fn edges(&'a self) -> Result<SVec<EdgeId>, TraversalError>;
    fn vertices(&'a self) -> Result<SVec<VertexId>, TraversalError>;
}

impl<'a> FaceTraversalHelpers<'a> for Traversal<'a, FaceId> {
    /// The edges around this face, following its Lnext cycle.
    fn edges(&'a self) -> Result<SVec<EdgeId>, TraversalError> {
        self.and_then(|valid| Ok(valid.inner.lnext_ring(self.edge().try_end()?)?.collect_svec()))
    }

    fn vertices(&'a self) -> Result<SVec<VertexId>, TraversalError> {
        self.and_then(|valid| {
            self.edges()?
                .iter()
                .map(|&h| valid.inner.at_edge(h).vertex().try_end())
                .collect()
        })
    }
}
