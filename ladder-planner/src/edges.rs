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

use crate::graph::{Edge, EdgeList};
use crate::robot::{CostFunction, RobotModel};
use crate::timing::TimingConstraint;

/// Build the per-vertex edge lists between two adjacent rungs.
///
/// `from_joints` and `to_joints` are flat configuration sequences as
/// stored in a [`Rung`](crate::graph::Rung); `timing` is the destination
/// rung's constraint. When the constraint is specified, transitions
/// rejected by the model's move-validity check produce no edge at all.
/// Destinations appear in ascending index order within each list, which
/// keeps tie-breaking in the search deterministic.
///
/// The transition cost comes from `custom_cost` when one is registered,
/// and otherwise defaults to the total joint travel (the sum of absolute
/// per-joint differences). The default is deliberately not a Euclidean
/// metric; callers that want one can inject it.
pub fn build_edges<M: RobotModel>(
    model: &M,
    custom_cost: Option<&dyn CostFunction>,
    from_joints: &[f64],
    to_joints: &[f64],
    timing: &TimingConstraint,
) -> Vec<EdgeList> {
    let dof = model.dof();
    let n_from = from_joints.len() / dof;
    let n_to = to_joints.len() / dof;

    let mut edges = Vec::with_capacity(n_from);
    for i in 0..n_from {
        let from = &from_joints[i * dof..(i + 1) * dof];
        let mut list = EdgeList::with_capacity(n_to);
        for j in 0..n_to {
            let to = &to_joints[j * dof..(j + 1) * dof];
            if let Some(upper) = timing.upper() {
                if !model.is_valid_move(from, to, upper) {
                    continue;
                }
            }

            let cost = match custom_cost {
                Some(f) => f.cost(from, to),
                None => joint_travel(from, to),
            };
            list.push(Edge { cost, to_index: j });
        }

        edges.push(list);
    }

    edges
}

fn joint_travel(from: &[f64], to: &[f64]) -> f64 {
    from.iter().zip(to).map(|(a, b)| (a - b).abs()).sum()
}
