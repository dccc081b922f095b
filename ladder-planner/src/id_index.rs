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

use std::collections::HashMap;
use uuid::Uuid;

/// Forward map from waypoint identity to current rung position.
///
/// The ladder graph answers `index_of` by scanning its rungs; the planner
/// keeps this map alongside so repeated incremental edits stay O(1) per
/// lookup. Structural mutations must shift the stored positions exactly
/// the way the rungs shifted, which `insert_at` and `remove_at` do.
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    positions: HashMap<Uuid, usize>,
}

impl IdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
    }

    pub fn get(&self, id: &Uuid) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.positions.contains_key(id)
    }

    /// Replace the whole mapping from a rung-ordered id sequence.
    pub fn rebuild(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.positions.clear();
        for (position, id) in ids.into_iter().enumerate() {
            self.positions.insert(id, position);
        }
    }

    /// Record an insertion at `position`: every mapping at or past the
    /// position moves up by one, then the new id is added.
    pub fn insert_at(&mut self, id: Uuid, position: usize) {
        for p in self.positions.values_mut() {
            if *p >= position {
                *p += 1;
            }
        }

        self.positions.insert(id, position);
    }

    /// Record a removal from `position`: the id is dropped and every
    /// mapping past the position moves down by one.
    pub fn remove_at(&mut self, id: &Uuid, position: usize) {
        self.positions.remove(id);
        for p in self.positions.values_mut() {
            if *p > position {
                *p -= 1;
            }
        }
    }
}
