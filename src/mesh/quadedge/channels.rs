// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::*;

/// Payload attached to the vertices, faces or edge records of a mesh. Reading
/// a key that was never written gives back the channel's default value, so
/// elements created by an Euler operator always have a value.
#[derive(Debug, Clone)]
pub struct Channel<K: slotmap::Key, V> {
    inner: slotmap::SecondaryMap<K, V>,
    default: V,
}

impl<K: slotmap::Key, V: Default> Default for Channel<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: slotmap::Key, V> std::ops::Index<K> for Channel<K, V> {
    type Output = V;

    fn index(&self, index: K) -> &Self::Output {
        // Will return the default value for never-accessed keys.
        self.inner.get(index).unwrap_or(&self.default)
    }
}

impl<K: slotmap::Key, V: Clone> std::ops::IndexMut<K> for Channel<K, V> {
    fn index_mut(&mut self, index: K) -> &mut Self::Output {
        let default = self.default.clone();
        self.inner
            .entry(index)
            // From the `entry` documentation in slotmap: May return None if the
            // key was removed from the originating slot map.
            .expect("Error indexing channel. Key was removed from the originating slotmap.")
            // Will insert the default value for never-accessed keys.
            .or_insert(default)
    }
}

impl<K: slotmap::Key, V> Channel<K, V> {
    /// Constructs a new, empty channel.
    pub fn new() -> Self
    where
        V: Default,
    {
        Self::with_default(V::default())
    }

    /// Constructs a new channel where unset keys read as `default`.
    pub fn with_default(default: V) -> Self {
        Self {
            inner: slotmap::SecondaryMap::new(),
            default,
        }
    }

    /// Returns the explicitly written value for `key`, if any.
    pub fn get(&self, key: K) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        self.inner.iter()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Vertex coordinates of a [`QuadEdgeMesh`].
pub type Positions = Channel<VertexId, Vec3>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unset_keys_read_as_default() {
        let mut conn = MeshConnectivity::new();
        let a = conn.alloc_vertex(None);
        let b = conn.alloc_vertex(None);

        let mut weights = Channel::<VertexId, f32>::with_default(0.5);
        weights[a] = 2.0;

        assert_eq!(weights[a], 2.0);
        assert_eq!(weights[b], 0.5);
        assert_eq!(weights.get(b), None);
        assert_eq!(weights.len(), 1);
    }

    #[test]
    fn edge_payload_follows_records() {
        let mut conn = MeshConnectivity::new();
        let e = euler_ops::make_edge(&mut conn);
        let sym = conn.sym(e).unwrap();

        let mut labels = Channel::<EdgeId, &'static str>::new();
        labels[e] = "forward";
        labels[sym] = "backward";

        assert_eq!(labels[e], "forward");
        assert_eq!(labels[conn.sym(sym).unwrap()], "forward");
    }
}
