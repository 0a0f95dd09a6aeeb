// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// An id naming an element stored in one of the arenas of a
/// [`MeshConnectivity`]. Lets `conn[id]` and [`MeshConnectivity::get`] work
/// for every kind of element.
pub trait ElementId: slotmap::Key + 'static {
    type Element;
    const KIND: &'static str;

    fn arena(conn: &MeshConnectivity) -> &SlotMap<Self, Self::Element>;
    fn arena_mut(conn: &mut MeshConnectivity) -> &mut SlotMap<Self, Self::Element>;
}

impl ElementId for EdgeId {
    type Element = EdgeRecord;
    const KIND: &'static str = "Edge record";

    fn arena(conn: &MeshConnectivity) -> &SlotMap<Self, Self::Element> {
        &conn.edges
    }
    fn arena_mut(conn: &mut MeshConnectivity) -> &mut SlotMap<Self, Self::Element> {
        &mut conn.edges
    }
}

impl ElementId for VertexId {
    type Element = Vertex;
    const KIND: &'static str = "Vertex";

    fn arena(conn: &MeshConnectivity) -> &SlotMap<Self, Self::Element> {
        &conn.vertices
    }
    fn arena_mut(conn: &mut MeshConnectivity) -> &mut SlotMap<Self, Self::Element> {
        &mut conn.vertices
    }
}

impl ElementId for FaceId {
    type Element = Face;
    const KIND: &'static str = "Face";

    fn arena(conn: &MeshConnectivity) -> &SlotMap<Self, Self::Element> {
        &conn.faces
    }
    fn arena_mut(conn: &mut MeshConnectivity) -> &mut SlotMap<Self, Self::Element> {
        &mut conn.faces
    }
}

fn missing_element<K: ElementId>(id: K) -> ! {
    panic!(
        "{} {:?} is not in the mesh. Was it removed by an edit?",
        K::KIND,
        id
    )
}

impl<K: ElementId> std::ops::Index<K> for MeshConnectivity {
    type Output = K::Element;

    fn index(&self, id: K) -> &Self::Output {
        match K::arena(self).get(id) {
            Some(element) => element,
            None => missing_element(id),
        }
    }
}

impl<K: ElementId> std::ops::IndexMut<K> for MeshConnectivity {
    fn index_mut(&mut self, id: K) -> &mut Self::Output {
        match K::arena_mut(self).get_mut(id) {
            Some(element) => element,
            None => missing_element(id),
        }
    }
}

impl MeshConnectivity {
    /// Returns the element named by `id`, or `None` if it was removed.
    pub fn get<K: ElementId>(&self, id: K) -> Option<&K::Element> {
        K::arena(self).get(id)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.get(id)
    }

    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.get(id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeRecord> {
        self.get(id)
    }
}
