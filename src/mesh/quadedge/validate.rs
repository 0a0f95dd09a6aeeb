// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The record is missing its rot or onext link, or the link points to a
    /// record that does not exist.
    MissingLink { edge: EdgeId },
    /// Four rotations do not lead back to the record.
    RotationNotClosed { edge: EdgeId },
    /// A rotation does not switch between primal and dual.
    RoleMismatch { edge: EdgeId },
    /// Some other record also has this one as its onext.
    OnextNotPermutation { edge: EdgeId },
    /// The record and its onext start at different elements.
    OriginMismatch { edge: EdgeId },
    /// The origin is of the wrong kind for the role, or it was deleted.
    InvalidOrigin { edge: EdgeId },
    /// The record and its lnext have different left faces.
    LeftFaceMismatch { edge: EdgeId },
    /// The vertex points to an edge that does not start at it.
    InvalidVertexEdge { vertex: VertexId },
    /// The boundary passes through the vertex more than once, so its faces
    /// do not form a single fan.
    PinchedVertex { vertex: VertexId },
    /// The face points to an edge that does not have it on its left.
    InvalidFaceEdge { face: FaceId },
    /// A face loop that does not close.
    OpenLoop { face: FaceId },
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    /// Isolated vertices. These are allowed, but usually temporary.
    pub isolated_vertices: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }
}

impl MeshConnectivity {
    /// Checks the link structure of the whole mesh. Unlike the traversals,
    /// this never panics on a malformed mesh.
    #[profiling::function]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (e, _) in self.iter_edge_records() {
            self.validate_edge(e, &mut report);
        }
        for (v, _) in self.iter_vertices() {
            self.validate_vertex(v, &mut report);
        }
        for (f, _) in self.iter_faces() {
            self.validate_face(f, &mut report);
        }

        if !report.is_valid() {
            log::debug!("validate: found {} errors", report.errors.len());
        }
        report
    }

    fn validate_edge(&self, e: EdgeId, report: &mut ValidationReport) {
        let record = match self.record(e) {
            Ok(record) => record,
            Err(_) => return,
        };

        let (rot, onext) = match (self.rot(e), self.onext(e)) {
            (Ok(rot), Ok(onext)) if self.record(rot).is_ok() && self.record(onext).is_ok() => {
                (rot, onext)
            }
            _ => {
                report.add_error(ValidationError::MissingLink { edge: e });
                return;
            }
        };

        match self.at_edge(e).rot().rot().rot().rot().try_end() {
            Ok(h) if h == e => {}
            _ => report.add_error(ValidationError::RotationNotClosed { edge: e }),
        }
        if self.record(rot).map(|r| r.role) != Ok(record.role.flipped()) {
            report.add_error(ValidationError::RoleMismatch { edge: e });
        }
        if self.oprev(onext) != Ok(e) {
            report.add_error(ValidationError::OnextNotPermutation { edge: e });
        }

        match record.origin {
            Some(origin) if origin.role() != record.role || !self.origin_exists(origin) => {
                report.add_error(ValidationError::InvalidOrigin { edge: e })
            }
            _ => {}
        }
        if self.record(onext).map(|r| r.origin) != Ok(record.origin) {
            report.add_error(ValidationError::OriginMismatch { edge: e });
        }

        if record.role == EdgeRole::Primal {
            let left = self.left_face(e);
            let next_left = self.lnext(e).and_then(|next| self.left_face(next));
            if left.is_err() || left != next_left {
                report.add_error(ValidationError::LeftFaceMismatch { edge: e });
            }
        }
    }

    fn origin_exists(&self, origin: Origin) -> bool {
        match origin {
            Origin::Vertex(v) => self.vertex(v).is_some(),
            Origin::Face(f) => self.face(f).is_some(),
        }
    }

    fn validate_vertex(&self, v: VertexId, report: &mut ValidationReport) {
        match self.at_vertex(v).edge().origin().try_end() {
            Ok(Origin::Vertex(w)) if w == v => {}
            Err(TraversalError::VertexHasNoEdge(_)) => {
                report.isolated_vertices += 1;
                return;
            }
            _ => {
                report.add_error(ValidationError::InvalidVertexEdge { vertex: v });
                return;
            }
        }

        // Open cycles are reported by the edge checks
        let h = match self.at_vertex(v).edge().try_end() {
            Ok(h) if self.ring_size::<OnextOp>(h).is_ok() => h,
            _ => return,
        };
        if let Ok(wedges) = self.hole_wedges(h) {
            if wedges.len() > 1 {
                report.add_error(ValidationError::PinchedVertex { vertex: v });
            }
        }
    }

    fn validate_face(&self, f: FaceId, report: &mut ValidationReport) {
        let h = match self.at_face(f).edge().try_end() {
            Ok(h) => h,
            Err(_) => {
                report.add_error(ValidationError::InvalidFaceEdge { face: f });
                return;
            }
        };
        if self.left_face(h) != Ok(Some(f)) {
            report.add_error(ValidationError::InvalidFaceEdge { face: f });
        }
        if self.ring_size::<LnextOp>(h).is_err() {
            report.add_error(ValidationError::OpenLoop { face: f });
        }
    }
}
