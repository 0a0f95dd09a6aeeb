// Copyright (C) 2023 setzer22 and contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::{cmp::Ordering, collections::BinaryHeap};

use float_ord::FloatOrd;

use super::*;

/// The cost of moving along an edge during a front traversal.
pub trait EdgeCost {
    fn cost(&self, conn: &MeshConnectivity, edge: EdgeId) -> f32;
}

/// Every edge costs the same, which gives a breadth-first traversal.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnitCost;

impl EdgeCost for UnitCost {
    fn cost(&self, _conn: &MeshConnectivity, _edge: EdgeId) -> f32 {
        1.0
    }
}

impl<F> EdgeCost for F
where
    F: Fn(&MeshConnectivity, EdgeId) -> f32,
{
    fn cost(&self, conn: &MeshConnectivity, edge: EdgeId) -> f32 {
        self(conn, edge)
    }
}

/// The length of a primal edge. Edges without two endpoints, like dual edges,
/// cost 1.
#[derive(Clone, Copy, Debug)]
pub struct EdgeLengthCost<'p> {
    pub positions: &'p Positions,
}

impl<'p> EdgeCost for EdgeLengthCost<'p> {
    fn cost(&self, conn: &MeshConnectivity, edge: EdgeId) -> f32 {
        match conn.at_edge(edge).src_dst_pair() {
            Ok((src, dst)) => self.positions[src].distance(self.positions[dst]),
            Err(_) => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FrontAtom {
    edge: EdgeId,
    cost: FloatOrd<f32>,
    /// Discovery order, breaks ties between equal costs
    order: u64,
}

// Reversed so the BinaryHeap pops the cheapest atom first.
impl Ord for FrontAtom {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.order.cmp(&self.order))
    }
}

impl PartialOrd for FrontAtom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Floods the primal graph (visiting vertices) or the dual graph (visiting
/// faces) from a seed edge, cheapest path first. Each item is the edge
/// through which its destination was first reached, so every reachable
/// element is the destination of exactly one item.
pub struct FrontIterator<'a, C: EdgeCost = UnitCost> {
    conn: &'a MeshConnectivity,
    cost: C,
    active: bool,
    front: BinaryHeap<FrontAtom>,
    visited: HashSet<Origin>,
    current: Option<EdgeId>,
    current_cost: f32,
    discovered: u64,
}

impl<'a, C: EdgeCost> FrontIterator<'a, C> {
    /// Starts a front over the records of the given `role`. When `seed` is
    /// `None`, the first record of that role (in allocation order) with a
    /// destination is used. A mesh without such a record gives an iterator
    /// that is inactive from the start.
    pub fn new(
        conn: &'a MeshConnectivity,
        role: EdgeRole,
        seed: Option<EdgeId>,
        cost: C,
    ) -> Result<Self, TraversalError> {
        let seed = match seed {
            Some(seed) => {
                if conn.record(seed)?.role != role {
                    return Err(match role {
                        EdgeRole::Primal => TraversalError::NotPrimal(seed),
                        EdgeRole::Dual => TraversalError::NotDual(seed),
                    });
                }
                Some(seed)
            }
            None => conn.default_seed(role),
        };

        let mut front = Self {
            conn,
            cost,
            active: seed.is_some(),
            front: BinaryHeap::new(),
            visited: HashSet::new(),
            current: None,
            current_cost: 0.0,
            discovered: 0,
        };
        if let Some(seed) = seed {
            front.push(seed, 0.0);
        }
        log::trace!("front: starting {role:?} traversal at {seed:?}");
        Ok(front)
    }

    fn push(&mut self, edge: EdgeId, cost: f32) {
        self.front.push(FrontAtom {
            edge,
            cost: FloatOrd(cost),
            order: self.discovered,
        });
        self.discovered += 1;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current(&self) -> Option<EdgeId> {
        self.current
    }

    /// The accumulated cost of the path that reached the current edge.
    pub fn current_cost(&self) -> Option<f32> {
        self.current.map(|_| self.current_cost)
    }

    pub fn is_visited(&self, element: Origin) -> bool {
        self.visited.contains(&element)
    }

    /// Moves to the next cheapest edge leading to an unvisited element. Once
    /// the front runs dry the iterator becomes inactive and stays that way.
    pub fn advance(&mut self) {
        if !self.active {
            return;
        }

        while let Some(atom) = self.front.pop() {
            let dest = match self.conn.at_edge(atom.edge).dest().try_end() {
                Ok(dest) => dest,
                Err(TraversalError::EdgeHasNoOrigin(_)) => continue,
                Err(err) => panic!("Error during front traversal: {err}. Is the mesh malformed?"),
            };
            if !self.visited.insert(dest) {
                continue;
            }

            self.current = Some(atom.edge);
            self.current_cost = atom.cost.0;

            let around_dest = self.conn.at_edge(atom.edge).sym().end();
            let candidates = self
                .conn
                .onext_ring(around_dest)
                .map(|ring| ring.collect_svec())
                .unwrap_or_else(|err| {
                    panic!("Error during front traversal: {err}. Is the mesh malformed?")
                });
            for h in candidates {
                if let Ok(next) = self.conn.at_edge(h).dest().try_end() {
                    if !self.visited.contains(&next) {
                        let cost = self.current_cost + self.cost.cost(self.conn, h);
                        self.push(h, cost);
                    }
                }
            }
            return;
        }

        log::trace!("front: exhausted after {} elements", self.visited.len());
        self.active = false;
        self.current = None;
    }
}

impl<'a, C: EdgeCost> Iterator for FrontIterator<'a, C> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance();
        self.current
    }
}

impl<'a, C: EdgeCost> std::iter::FusedIterator for FrontIterator<'a, C> {}

/// Two fronts are equal when both are still running or both are exhausted.
impl<'a, C: EdgeCost> PartialEq for FrontIterator<'a, C> {
    fn eq(&self, other: &Self) -> bool {
        self.active == other.active
    }
}

impl MeshConnectivity {
    /// A breadth-first front over the vertices, starting at `seed`.
    pub fn begin_front(&self, seed: Option<EdgeId>) -> Result<FrontIterator<'_>, TraversalError> {
        FrontIterator::new(self, EdgeRole::Primal, seed, UnitCost)
    }

    pub fn begin_front_with_cost<C: EdgeCost>(
        &self,
        seed: Option<EdgeId>,
        cost: C,
    ) -> Result<FrontIterator<'_, C>, TraversalError> {
        FrontIterator::new(self, EdgeRole::Primal, seed, cost)
    }

    /// A breadth-first front over the faces, starting at the dual edge `seed`.
    pub fn begin_dual_front(
        &self,
        seed: Option<EdgeId>,
    ) -> Result<FrontIterator<'_>, TraversalError> {
        FrontIterator::new(self, EdgeRole::Dual, seed, UnitCost)
    }

    pub fn begin_dual_front_with_cost<C: EdgeCost>(
        &self,
        seed: Option<EdgeId>,
        cost: C,
    ) -> Result<FrontIterator<'_, C>, TraversalError> {
        FrontIterator::new(self, EdgeRole::Dual, seed, cost)
    }
}
