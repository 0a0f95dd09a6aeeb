// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

slotmap::new_key_type! { pub struct EdgeId; }
slotmap::new_key_type! { pub struct VertexId; }
slotmap::new_key_type! { pub struct FaceId; }

/// Whether an edge record connects two vertices (primal) or two faces (dual).
/// The two members of a bundle reachable through `sym` share a role, and
/// `rot` always flips it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeRole {
    Primal,
    Dual,
}

impl EdgeRole {
    pub fn flipped(self) -> Self {
        match self {
            EdgeRole::Primal => EdgeRole::Dual,
            EdgeRole::Dual => EdgeRole::Primal,
        }
    }
}

/// The element an edge record starts at. Primal records start at a vertex,
/// dual records start at a face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    Vertex(VertexId),
    Face(FaceId),
}

impl Origin {
    pub fn role(&self) -> EdgeRole {
        match self {
            Origin::Vertex(_) => EdgeRole::Primal,
            Origin::Face(_) => EdgeRole::Dual,
        }
    }
}
