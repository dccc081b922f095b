/*
 * Copyright (C) 2023 Open Source Robotics Foundation
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 *
*/

use crate::error::GraphError;
use crate::timing::TimingConstraint;
use uuid::Uuid;

/// A weighted transition to a vertex in the next rung.
///
/// Destinations are addressed by position, never by pointer, so rungs can
/// be inserted and removed without rewriting unrelated parts of the graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub cost: f64,
    pub to_index: usize,
}

/// The outgoing edges of a single vertex, in ascending destination order.
pub type EdgeList = Vec<Edge>;

/// One layer of the ladder: a waypoint identity, its timing constraint and
/// the joint data of its admissible configurations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rung {
    pub id: Uuid,
    pub timing: TimingConstraint,
    /// `vertex_count * dof` joint values, one configuration after another
    /// in oracle enumeration order.
    pub joints: Vec<f64>,
}

/// A layered DAG over joint configurations.
///
/// Rung `i` holds the admissible configurations for waypoint `i`; the edge
/// block at index `i` holds one [`EdgeList`] per vertex of rung `i`,
/// pointing into rung `i + 1`. There is always exactly one fewer edge
/// block than there are rungs, or none at all.
///
/// Edges are derived state. Structural mutations clear the blocks they
/// invalidate and leave it to the caller to rebuild them; an unassigned
/// block reads as "no edges".
#[derive(Debug, Clone, PartialEq)]
pub struct LadderGraph {
    dof: usize,
    rungs: Vec<Rung>,
    edges: Vec<Vec<EdgeList>>,
}

impl LadderGraph {
    /// Create an empty graph for configurations of `dof` joints. The
    /// degrees of freedom are immutable for the graph's lifetime.
    ///
    /// Panics if `dof` is zero.
    pub fn new(dof: usize) -> Self {
        assert!(dof > 0, "a joint configuration needs at least one joint");
        Self {
            dof,
            rungs: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn dof(&self) -> usize {
        self.dof
    }

    /// The number of rungs.
    pub fn size(&self) -> usize {
        self.rungs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rungs.is_empty()
    }

    pub fn is_first(&self, index: usize) -> bool {
        index == 0
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 == self.rungs.len()
    }

    /// Drop every rung and edge block, keeping the degrees of freedom.
    pub fn clear(&mut self) {
        self.rungs.clear();
        self.edges.clear();
    }

    /// Resize an empty graph to `n` empty rungs, ready for `assign_rung`.
    pub fn allocate(&mut self, n: usize) -> Result<(), GraphError> {
        if !self.rungs.is_empty() {
            return Err(GraphError::AlreadyAllocated(self.rungs.len()));
        }

        self.rungs.resize_with(n, Rung::default);
        self.edges.resize_with(n.saturating_sub(1), Vec::new);
        Ok(())
    }

    /// Overwrite the identity, timing and joint data of rung `index`.
    /// `joints` holds whole configurations back to back, so its length
    /// must be a multiple of the graph's degrees of freedom. Edge blocks
    /// are not touched.
    pub fn assign_rung(
        &mut self,
        index: usize,
        id: Uuid,
        timing: TimingConstraint,
        joints: Vec<f64>,
    ) -> Result<(), GraphError> {
        self.check_index(index)?;
        if joints.len() % self.dof != 0 {
            return Err(GraphError::MisalignedJointData {
                len: joints.len(),
                dof: self.dof,
            });
        }

        let rung = &mut self.rungs[index];
        rung.id = id;
        rung.timing = timing;
        rung.joints = joints;
        Ok(())
    }

    /// Insert an empty rung at `index`, shifting subsequent rungs right.
    ///
    /// The edge blocks adjacent to the new rung are invalidated: the block
    /// out of rung `index - 1` is cleared and the new rung's own outgoing
    /// block starts empty. The caller is expected to rebuild both.
    pub fn insert_rung(&mut self, index: usize) -> Result<(), GraphError> {
        if index > self.rungs.len() {
            return Err(GraphError::OutOfBounds {
                index,
                len: self.rungs.len(),
            });
        }

        let had = self.rungs.len();
        self.rungs.insert(index, Rung::default());
        if had == 0 {
            return Ok(());
        }

        if index == had {
            // Appended at the tail: only a fresh incoming block is needed.
            self.edges.push(Vec::new());
        } else {
            self.edges.insert(index, Vec::new());
            if index > 0 {
                // The block out of the previous rung now points into the
                // new rung and is stale.
                self.edges[index - 1].clear();
            }
        }

        Ok(())
    }

    /// Delete rung `index`, shifting subsequent rungs left.
    ///
    /// When the removed rung was interior, the block out of rung
    /// `index - 1` is invalidated: it now points into what used to be rung
    /// `index + 1` and must be rebuilt by the caller.
    pub fn remove_rung(&mut self, index: usize) -> Result<(), GraphError> {
        self.check_index(index)?;

        let had = self.rungs.len();
        self.rungs.remove(index);
        if had == 1 {
            return Ok(());
        }

        if index + 1 == had {
            // Removed the last rung together with its incoming block.
            self.edges.remove(index - 1);
        } else {
            self.edges.remove(index);
            if index > 0 {
                self.edges[index - 1].clear();
            }
        }

        Ok(())
    }

    /// Reset the joint data of rung `index` in place. Identity and timing
    /// are preserved.
    pub fn clear_vertices(&mut self, index: usize) -> Result<(), GraphError> {
        self.check_index(index)?;
        self.rungs[index].joints.clear();
        Ok(())
    }

    /// Reset the edge block out of rung `index` in place. A no-op on the
    /// last rung, which has no outgoing block.
    pub fn clear_edges(&mut self, index: usize) -> Result<(), GraphError> {
        self.check_index(index)?;
        if let Some(block) = self.edges.get_mut(index) {
            block.clear();
        }

        Ok(())
    }

    /// Install the per-vertex edge lists from rung `index` into rung
    /// `index + 1`. The block must contain exactly one list per vertex of
    /// rung `index`.
    pub fn assign_edges(&mut self, index: usize, edges: Vec<EdgeList>) -> Result<(), GraphError> {
        self.check_index(index)?;
        if index + 1 >= self.rungs.len() {
            return Err(GraphError::NoNextRung(index));
        }

        let expected = self.vertex_count(index);
        if edges.len() != expected {
            return Err(GraphError::EdgeCountMismatch {
                given: edges.len(),
                expected,
            });
        }

        debug_assert!(
            {
                let next = self.vertex_count(index + 1);
                edges.iter().flatten().all(|e| e.to_index < next)
            },
            "edge destination out of range for rung {}",
            index + 1
        );

        self.edges[index] = edges;
        Ok(())
    }

    /// Read access to rung `index`. Panics when out of bounds.
    pub fn rung(&self, index: usize) -> &Rung {
        &self.rungs[index]
    }

    /// The number of joint configurations stored in rung `index`.
    pub fn vertex_count(&self, index: usize) -> usize {
        self.rungs[index].joints.len() / self.dof
    }

    /// The joint configuration of one vertex. Panics when out of bounds.
    pub fn vertex(&self, rung: usize, vertex: usize) -> &[f64] {
        let start = vertex * self.dof;
        &self.rungs[rung].joints[start..start + self.dof]
    }

    /// The outgoing edges of one vertex. Empty when the block has not been
    /// assigned or was invalidated by a structural mutation.
    pub fn edges_out_of(&self, rung: usize, vertex: usize) -> &[Edge] {
        self.edges
            .get(rung)
            .and_then(|block| block.get(vertex))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The whole edge block out of `rung`, as installed by `assign_edges`.
    pub fn edge_block(&self, rung: usize) -> &[EdgeList] {
        self.edges.get(rung).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The position of the rung carrying `id`, scanning in rung order.
    pub fn index_of(&self, id: &Uuid) -> Option<usize> {
        self.rungs.iter().position(|rung| rung.id == *id)
    }

    fn check_index(&self, index: usize) -> Result<(), GraphError> {
        if index >= self.rungs.len() {
            return Err(GraphError::OutOfBounds {
                index,
                len: self.rungs.len(),
            });
        }

        Ok(())
    }
}
