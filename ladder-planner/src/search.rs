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

use crate::graph::LadderGraph;

/// Single-pass shortest path over a [`LadderGraph`].
///
/// Because edges only ever point from one rung to the next, a forward
/// relaxation in rung order visits every edge exactly once; no priority
/// queue is needed and the cost of the search is linear in the number of
/// edges. Ties break toward the lowest vertex index: relaxation accepts
/// strict improvements only and destination lists are in ascending order.
///
/// The search borrows the graph immutably and keeps its own distance and
/// predecessor tables, so it never mutates the graph it searches.
pub struct DagSearch<'a> {
    graph: &'a LadderGraph,
    distance: Vec<Vec<f64>>,
    predecessor: Vec<Vec<usize>>,
}

impl<'a> DagSearch<'a> {
    /// Prepare the search tables: every vertex of the first rung starts at
    /// distance zero, every other vertex at positive infinity.
    pub fn new(graph: &'a LadderGraph) -> Self {
        let n = graph.size();
        let mut distance = Vec::with_capacity(n);
        let mut predecessor = Vec::with_capacity(n);
        for i in 0..n {
            let count = graph.vertex_count(i);
            let init = if i == 0 { 0.0 } else { f64::INFINITY };
            distance.push(vec![init; count]);
            predecessor.push(vec![0; count]);
        }

        Self {
            graph,
            distance,
            predecessor,
        }
    }

    /// Relax every edge once, rung by rung, and return the cheapest cost
    /// of reaching the final rung. Positive infinity means no vertex of
    /// the final rung is reachable.
    pub fn run(&mut self) -> f64 {
        let n = self.graph.size();
        for i in 0..n.saturating_sub(1) {
            let (head, tail) = self.distance.split_at_mut(i + 1);
            let dist_here = &head[i];
            let dist_next = &mut tail[0];
            let pred_next = &mut self.predecessor[i + 1];

            for v in 0..dist_here.len() {
                let dv = dist_here[v];
                if !dv.is_finite() {
                    continue;
                }

                for edge in self.graph.edges_out_of(i, v) {
                    let candidate = dv + edge.cost;
                    if candidate < dist_next[edge.to_index] {
                        dist_next[edge.to_index] = candidate;
                        pred_next[edge.to_index] = v;
                    }
                }
            }
        }

        self.terminal_cost()
    }

    /// The cheapest distance currently recorded for the final rung.
    pub fn terminal_cost(&self) -> f64 {
        match self.distance.last() {
            Some(last) => last.iter().copied().fold(f64::INFINITY, f64::min),
            None => f64::INFINITY,
        }
    }

    /// The chosen vertex index for every rung, following predecessors back
    /// from the cheapest vertex of the final rung (lowest index on ties).
    /// Empty when the graph is infeasible or empty. Call after [`run`].
    ///
    /// [`run`]: DagSearch::run
    pub fn shortest_path(&self) -> Vec<usize> {
        let n = self.distance.len();
        if n == 0 {
            return Vec::new();
        }

        let last = &self.distance[n - 1];
        let mut best: Option<usize> = None;
        for (v, d) in last.iter().enumerate() {
            if d.is_finite() && best.map_or(true, |b| *d < last[b]) {
                best = Some(v);
            }
        }

        let mut vertex = match best {
            Some(vertex) => vertex,
            None => return Vec::new(),
        };

        let mut path = vec![0; n];
        path[n - 1] = vertex;
        for i in (1..n).rev() {
            // A finite distance at rung i > 0 implies its predecessor slot
            // was written during relaxation.
            vertex = self.predecessor[i][vertex];
            path[i - 1] = vertex;
        }

        path
    }
}
