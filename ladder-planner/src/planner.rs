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

use std::sync::Arc;
use uuid::Uuid;

use crate::edges::build_edges;
use crate::error::{GraphError, PlanningError};
use crate::graph::LadderGraph;
use crate::id_index::IdIndex;
use crate::point::{JointTrajectoryPoint, TrajectoryPoint};
use crate::robot::{CostFunction, RobotModel};
use crate::search::DagSearch;

/// Facade over the ladder graph: builds the layered search space from a
/// waypoint sequence, keeps it consistent across incremental edits, and
/// extracts optimal joint trajectories.
///
/// All operations are synchronous and must be serialized by the caller;
/// the planner holds no internal synchronization. Distinct planner
/// instances are independent and may share one model.
pub struct PlanningGraph<M: RobotModel> {
    graph: LadderGraph,
    model: Arc<M>,
    custom_cost: Option<Box<dyn CostFunction>>,
    index: IdIndex,
}

impl<M: RobotModel> PlanningGraph<M> {
    pub fn new(model: Arc<M>) -> Self {
        let graph = LadderGraph::new(model.dof());
        Self {
            graph,
            model,
            custom_cost: None,
            index: IdIndex::new(),
        }
    }

    /// Replace the transition-cost metric. `None` restores the default
    /// joint-travel metric.
    pub fn set_cost_function(&mut self, cost: Option<Box<dyn CostFunction>>) {
        self.custom_cost = cost;
    }

    pub fn graph(&self) -> &LadderGraph {
        &self.graph
    }

    pub fn model(&self) -> &Arc<M> {
        &self.model
    }

    /// The rung position of a previously inserted point.
    pub fn index_of(&self, id: &Uuid) -> Option<usize> {
        self.index.get(id)
    }

    /// Rebuild the graph from an ordered waypoint sequence.
    ///
    /// Joint poses for every waypoint are computed up front, so the first
    /// inverse-kinematics failure aborts with the graph left empty.
    pub fn insert_graph<P: TrajectoryPoint<M>>(
        &mut self,
        points: &[P],
    ) -> Result<(), PlanningError> {
        if points.len() < 2 {
            tracing::error!(
                count = points.len(),
                "building a graph requires at least 2 trajectory points"
            );
            return Err(PlanningError::TooFewPoints(points.len()));
        }

        if !self.graph.is_empty() {
            self.graph.clear();
            self.index.clear();
        }

        let mut all_joint_data = Vec::with_capacity(points.len());
        for point in points {
            all_joint_data.push(self.joint_data_for(point)?);
        }

        self.graph.allocate(points.len())?;
        for (i, (point, joints)) in points.iter().zip(all_joint_data).enumerate() {
            self.graph.assign_rung(i, point.id(), point.timing(), joints)?;
        }

        for i in 0..self.graph.size() - 1 {
            self.rebuild_edges(i, i + 1)?;
        }

        self.index.rebuild(points.iter().map(|point| point.id()));
        Ok(())
    }

    /// Insert a single waypoint between `previous_id` and `next_id`.
    ///
    /// `Uuid::nil()` marks an absent neighbor. When `next_id` names no
    /// rung the point is appended at the current tail and becomes the
    /// last rung. Edge blocks are rebuilt toward whichever neighbors were
    /// named; an inverse-kinematics failure aborts before any mutation.
    pub fn add_trajectory<P: TrajectoryPoint<M> + ?Sized>(
        &mut self,
        point: &P,
        previous_id: Uuid,
        next_id: Uuid,
    ) -> Result<(), PlanningError> {
        let joints = self.joint_data_for(point)?;

        let insert_idx = match self.index.get(&next_id) {
            Some(position) => position,
            None => self.graph.size(),
        };
        self.graph.insert_rung(insert_idx)?;
        self.graph
            .assign_rung(insert_idx, point.id(), point.timing(), joints)?;
        self.index.insert_at(point.id(), insert_idx);

        if !previous_id.is_nil() && insert_idx > 0 {
            self.rebuild_edges(insert_idx - 1, insert_idx)?;
        }
        if !next_id.is_nil() && insert_idx + 1 < self.graph.size() {
            self.rebuild_edges(insert_idx, insert_idx + 1)?;
        }

        Ok(())
    }

    /// Replace the vertices and timing of an existing waypoint and
    /// rebuild the edge blocks on both of its sides.
    pub fn modify_trajectory<P: TrajectoryPoint<M> + ?Sized>(
        &mut self,
        point: &P,
    ) -> Result<(), PlanningError> {
        let index = match self.index.get(&point.id()) {
            Some(index) => index,
            None => {
                tracing::error!(id = %point.id(), "cannot modify an unknown trajectory point");
                return Err(PlanningError::UnknownPoint(point.id()));
            }
        };
        let joints = self.joint_data_for(point)?;

        self.graph.clear_vertices(index)?;
        self.graph.clear_edges(index)?;
        if index > 0 {
            self.graph.clear_edges(index - 1)?;
        }
        self.graph.assign_rung(index, point.id(), point.timing(), joints)?;

        if !self.graph.is_first(index) {
            self.rebuild_edges(index - 1, index)?;
        }
        if !self.graph.is_last(index) {
            self.rebuild_edges(index, index + 1)?;
        }

        Ok(())
    }

    /// Remove a waypoint. When the removed rung was interior, the edge
    /// block between its former neighbors is rebuilt.
    pub fn remove_trajectory<P: TrajectoryPoint<M> + ?Sized>(
        &mut self,
        point: &P,
    ) -> Result<(), PlanningError> {
        let index = match self.index.get(&point.id()) {
            Some(index) => index,
            None => {
                tracing::error!(id = %point.id(), "cannot remove an unknown trajectory point");
                return Err(PlanningError::UnknownPoint(point.id()));
            }
        };

        let interior = !self.graph.is_first(index) && !self.graph.is_last(index);
        self.graph.remove_rung(index)?;
        self.index.remove_at(&point.id(), index);

        if interior {
            // The indexes collapsed by one: the former successor now sits
            // at the removed position.
            self.rebuild_edges(index - 1, index)?;
        }

        Ok(())
    }

    /// Extract the optimal joint trajectory: one configuration per rung,
    /// each carrying its rung's timing constraint.
    ///
    /// A cost of positive infinity means no feasible path exists; the
    /// returned list is then empty. Callers are expected to test the
    /// sentinel rather than match on an error.
    pub fn shortest_path(&self) -> (f64, Vec<JointTrajectoryPoint>) {
        let mut search = DagSearch::new(&self.graph);
        let cost = search.run();
        let indices = search.shortest_path();

        let mut path = Vec::with_capacity(indices.len());
        for (rung, vertex) in indices.iter().enumerate() {
            let joints = self.graph.vertex(rung, *vertex).to_vec();
            path.push(JointTrajectoryPoint::new(
                joints,
                self.graph.rung(rung).timing,
            ));
        }

        tracing::info!(length = path.len(), cost, "computed shortest path");
        (cost, path)
    }

    /// Enumerate and flatten the joint configurations of one waypoint,
    /// rejecting IK failures and malformed configurations before anything
    /// is committed to the graph.
    fn joint_data_for<P: TrajectoryPoint<M> + ?Sized>(
        &self,
        point: &P,
    ) -> Result<Vec<f64>, PlanningError> {
        let solutions = point.joint_poses(self.model.as_ref());
        if solutions.is_empty() {
            tracing::error!(id = %point.id(), "inverse kinematics failed for trajectory point");
            return Err(PlanningError::IkFailure(point.id()));
        }

        let dof = self.graph.dof();
        let mut flat = Vec::with_capacity(solutions.len() * dof);
        for solution in &solutions {
            if solution.len() != dof {
                return Err(GraphError::MisalignedJointData {
                    len: solution.len(),
                    dof,
                }
                .into());
            }
            flat.extend_from_slice(solution);
        }

        Ok(flat)
    }

    fn rebuild_edges(&mut self, from: usize, to: usize) -> Result<(), PlanningError> {
        let edges = build_edges(
            self.model.as_ref(),
            self.custom_cost.as_deref(),
            &self.graph.rung(from).joints,
            &self.graph.rung(to).joints,
            &self.graph.rung(to).timing,
        );
        self.graph.assign_edges(from, edges)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TimingConstraint;
    use approx::assert_relative_eq;
    use time_point::Duration;

    #[derive(Clone)]
    struct TestModel {
        dof: usize,
        max_step: f64,
    }

    impl TestModel {
        fn free(dof: usize) -> Self {
            Self {
                dof,
                max_step: f64::INFINITY,
            }
        }

        fn limited(dof: usize, max_step: f64) -> Self {
            Self { dof, max_step }
        }
    }

    impl RobotModel for TestModel {
        fn dof(&self) -> usize {
            self.dof
        }

        fn is_valid_move(&self, from: &[f64], to: &[f64], _dt_upper: Duration) -> bool {
            from.iter()
                .zip(to)
                .all(|(a, b)| (a - b).abs() <= self.max_step)
        }
    }

    #[derive(Clone)]
    struct TestPoint {
        id: Uuid,
        timing: TimingConstraint,
        solutions: Vec<Vec<f64>>,
    }

    impl TestPoint {
        fn new(solutions: Vec<Vec<f64>>) -> Self {
            Self {
                id: Uuid::new_v4(),
                timing: TimingConstraint::unconstrained(),
                solutions,
            }
        }

        fn timed(solutions: Vec<Vec<f64>>, secs: f64) -> Self {
            Self {
                id: Uuid::new_v4(),
                timing: TimingConstraint::from_secs_f64(secs),
                solutions,
            }
        }

        fn replaced(&self, solutions: Vec<Vec<f64>>) -> Self {
            Self {
                id: self.id,
                timing: self.timing,
                solutions,
            }
        }
    }

    impl TrajectoryPoint<TestModel> for TestPoint {
        fn id(&self) -> Uuid {
            self.id
        }

        fn timing(&self) -> TimingConstraint {
            self.timing
        }

        fn joint_poses(&self, _model: &TestModel) -> Vec<Vec<f64>> {
            self.solutions.clone()
        }
    }

    fn planner(model: TestModel) -> PlanningGraph<TestModel> {
        PlanningGraph::new(Arc::new(model))
    }

    fn path_joints(path: &[JointTrajectoryPoint]) -> Vec<Vec<f64>> {
        path.iter().map(|p| p.joints().to_vec()).collect()
    }

    fn assert_index_consistent(planner: &PlanningGraph<TestModel>) {
        let graph = planner.graph();
        assert_eq!(planner.index.len(), graph.size());
        for i in 0..graph.size() {
            let id = graph.rung(i).id;
            assert_eq!(planner.index.get(&id), Some(i));
            assert_eq!(graph.index_of(&id), Some(i));
        }
    }

    #[test]
    fn two_rungs_one_unit_apart() {
        let mut planner = planner(TestModel::free(1));
        let points = vec![
            TestPoint::new(vec![vec![0.0]]),
            TestPoint::new(vec![vec![1.0]]),
        ];
        planner.insert_graph(&points).unwrap();

        let (cost, path) = planner.shortest_path();
        assert_relative_eq!(cost, 1.0);
        assert_eq!(path_joints(&path), vec![vec![0.0], vec![1.0]]);
    }

    #[test]
    fn equal_cost_paths_pick_the_lowest_vertex_index() {
        let mut planner = planner(TestModel::free(1));
        let points = vec![
            TestPoint::new(vec![vec![0.0], vec![10.0]]),
            TestPoint::new(vec![vec![5.0]]),
            TestPoint::new(vec![vec![0.0], vec![10.0]]),
        ];
        planner.insert_graph(&points).unwrap();

        let (cost, path) = planner.shortest_path();
        assert_relative_eq!(cost, 10.0);
        assert_eq!(path_joints(&path), vec![vec![0.0], vec![5.0], vec![0.0]]);
    }

    #[test]
    fn matching_vertices_cost_nothing() {
        let mut planner = planner(TestModel::free(2));
        let points = vec![
            TestPoint::new(vec![vec![0.0, 0.0], vec![1.0, 1.0]]),
            TestPoint::new(vec![vec![0.0, 0.0], vec![1.0, 1.0]]),
        ];
        planner.insert_graph(&points).unwrap();

        let (cost, path) = planner.shortest_path();
        assert_relative_eq!(cost, 0.0);
        assert_eq!(path_joints(&path), vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn timing_filters_out_large_steps() {
        let mut planner = planner(TestModel::limited(1, 1.0));
        let points = vec![
            TestPoint::new(vec![vec![0.0], vec![100.0]]),
            TestPoint::timed(vec![vec![0.0], vec![100.0]], 1.0),
        ];
        planner.insert_graph(&points).unwrap();

        // Only the 0 -> 0 and 100 -> 100 transitions survive the check.
        assert_eq!(planner.graph().edges_out_of(0, 0).len(), 1);
        assert_eq!(planner.graph().edges_out_of(0, 1).len(), 1);

        let (cost, path) = planner.shortest_path();
        assert_relative_eq!(cost, 0.0);
        assert_eq!(path_joints(&path), vec![vec![0.0], vec![0.0]]);
    }

    #[test]
    fn a_fully_rejected_transition_is_infeasible() {
        let mut planner = planner(TestModel::limited(1, 1.0));
        let points = vec![
            TestPoint::new(vec![vec![0.0]]),
            TestPoint::timed(vec![vec![10.0]], 1.0),
        ];
        planner.insert_graph(&points).unwrap();

        let (cost, path) = planner.shortest_path();
        assert_eq!(cost, f64::INFINITY);
        assert!(path.is_empty());
    }

    #[test]
    fn modifying_a_rung_only_rebuilds_its_adjacent_blocks() {
        let mut planner = planner(TestModel::free(1));
        let points: Vec<TestPoint> = (0..5)
            .map(|i| TestPoint::new(vec![vec![i as f64], vec![i as f64 + 0.5]]))
            .collect();
        planner.insert_graph(&points).unwrap();

        let before_first = planner.graph().edge_block(0).to_vec();
        let before_last = planner.graph().edge_block(3).to_vec();

        planner
            .modify_trajectory(&points[2].replaced(vec![vec![7.0]]))
            .unwrap();

        assert_eq!(planner.graph().edge_block(0), before_first.as_slice());
        assert_eq!(planner.graph().edge_block(3), before_last.as_slice());
        assert_eq!(planner.graph().vertex(2, 0), &[7.0]);
        assert_relative_eq!(planner.graph().edges_out_of(1, 0)[0].cost, 6.0);
        assert_index_consistent(&planner);
    }

    #[test]
    fn fewer_than_two_points_are_rejected() {
        let mut planner = planner(TestModel::free(1));
        let points = vec![TestPoint::new(vec![vec![0.0]])];
        assert_eq!(
            planner.insert_graph(&points),
            Err(PlanningError::TooFewPoints(1)),
        );
        assert!(planner.graph().is_empty());
    }

    #[test]
    fn an_ik_failure_leaves_the_graph_empty() {
        let mut planner = planner(TestModel::free(1));
        let good = TestPoint::new(vec![vec![0.0]]);
        let bad = TestPoint::new(vec![]);

        let result = planner.insert_graph(&[good.clone(), bad.clone()]);
        assert_eq!(result, Err(PlanningError::IkFailure(bad.id())));
        assert!(planner.graph().is_empty());
        assert!(planner.index.is_empty());

        // A previously built graph is also gone: the reset happens before
        // the failed rebuild is detected.
        planner
            .insert_graph(&[good.clone(), TestPoint::new(vec![vec![1.0]])])
            .unwrap();
        let result = planner.insert_graph(&[good, bad.clone()]);
        assert_eq!(result, Err(PlanningError::IkFailure(bad.id())));
        assert!(planner.graph().is_empty());
    }

    #[test]
    fn rebuilding_replaces_previous_content() {
        let mut planner = planner(TestModel::free(1));
        let first = vec![
            TestPoint::new(vec![vec![0.0]]),
            TestPoint::new(vec![vec![1.0]]),
            TestPoint::new(vec![vec![2.0]]),
        ];
        planner.insert_graph(&first).unwrap();

        let second = vec![
            TestPoint::new(vec![vec![5.0]]),
            TestPoint::new(vec![vec![6.0]]),
        ];
        planner.insert_graph(&second).unwrap();

        assert_eq!(planner.graph().size(), 2);
        assert_eq!(planner.index_of(&first[0].id()), None);
        assert_index_consistent(&planner);
    }

    #[test]
    fn adding_without_a_next_neighbor_appends_at_the_tail() {
        let mut planner = planner(TestModel::free(1));
        let points = vec![
            TestPoint::new(vec![vec![0.0]]),
            TestPoint::new(vec![vec![1.0]]),
        ];
        planner.insert_graph(&points).unwrap();

        let tail = TestPoint::new(vec![vec![3.0]]);
        planner
            .add_trajectory(&tail, points[1].id(), Uuid::nil())
            .unwrap();

        assert_eq!(planner.graph().size(), 3);
        assert_eq!(planner.index_of(&tail.id()), Some(2));
        assert_index_consistent(&planner);

        let (cost, path) = planner.shortest_path();
        assert_relative_eq!(cost, 3.0);
        assert_eq!(
            path_joints(&path),
            vec![vec![0.0], vec![1.0], vec![3.0]],
        );
    }

    #[test]
    fn adding_between_neighbors_rebuilds_both_sides() {
        let mut planner = planner(TestModel::free(1));
        let points = vec![
            TestPoint::new(vec![vec![0.0]]),
            TestPoint::new(vec![vec![4.0]]),
        ];
        planner.insert_graph(&points).unwrap();

        let middle = TestPoint::new(vec![vec![1.0]]);
        planner
            .add_trajectory(&middle, points[0].id(), points[1].id())
            .unwrap();

        assert_eq!(planner.graph().size(), 3);
        assert_eq!(planner.index_of(&middle.id()), Some(1));
        assert_index_consistent(&planner);

        let (cost, path) = planner.shortest_path();
        assert_relative_eq!(cost, 4.0);
        assert_eq!(
            path_joints(&path),
            vec![vec![0.0], vec![1.0], vec![4.0]],
        );
    }

    #[test]
    fn a_failed_add_leaves_the_graph_untouched() {
        let mut planner = planner(TestModel::free(1));
        let points = vec![
            TestPoint::new(vec![vec![0.0]]),
            TestPoint::new(vec![vec![1.0]]),
        ];
        planner.insert_graph(&points).unwrap();
        let snapshot = planner.graph().clone();

        let bad = TestPoint::new(vec![]);
        let result = planner.add_trajectory(&bad, points[1].id(), Uuid::nil());
        assert_eq!(result, Err(PlanningError::IkFailure(bad.id())));
        assert_eq!(planner.graph(), &snapshot);
        assert_index_consistent(&planner);
    }

    #[test]
    fn unknown_points_cannot_be_modified_or_removed() {
        let mut planner = planner(TestModel::free(1));
        let points = vec![
            TestPoint::new(vec![vec![0.0]]),
            TestPoint::new(vec![vec![1.0]]),
        ];
        planner.insert_graph(&points).unwrap();
        let snapshot = planner.graph().clone();

        let stranger = TestPoint::new(vec![vec![9.0]]);
        assert_eq!(
            planner.modify_trajectory(&stranger),
            Err(PlanningError::UnknownPoint(stranger.id())),
        );
        assert_eq!(
            planner.remove_trajectory(&stranger),
            Err(PlanningError::UnknownPoint(stranger.id())),
        );
        assert_eq!(planner.graph(), &snapshot);
    }

    #[test]
    fn removing_an_interior_rung_bridges_its_neighbors() {
        let mut planner = planner(TestModel::free(1));
        let points = vec![
            TestPoint::new(vec![vec![0.0]]),
            TestPoint::new(vec![vec![10.0]]),
            TestPoint::new(vec![vec![2.0]]),
        ];
        planner.insert_graph(&points).unwrap();

        planner.remove_trajectory(&points[1]).unwrap();
        assert_eq!(planner.graph().size(), 2);
        assert_index_consistent(&planner);

        let (cost, path) = planner.shortest_path();
        assert_relative_eq!(cost, 2.0);
        assert_eq!(path_joints(&path), vec![vec![0.0], vec![2.0]]);
    }

    #[test]
    fn removing_down_to_the_endpoints_matches_a_fresh_build() {
        let points: Vec<TestPoint> = (0..5)
            .map(|i| TestPoint::new(vec![vec![i as f64], vec![i as f64 + 0.25]]))
            .collect();

        let mut edited = planner(TestModel::free(1));
        edited.insert_graph(&points).unwrap();

        for (removed, point) in [&points[2], &points[1], &points[3]].into_iter().enumerate() {
            edited.remove_trajectory(point).unwrap();
            assert_eq!(edited.graph().size(), 4 - removed);
            assert_index_consistent(&edited);
        }

        let mut fresh = planner(TestModel::free(1));
        fresh
            .insert_graph(&[points[0].clone(), points[4].clone()])
            .unwrap();
        assert_eq!(edited.graph(), fresh.graph());
    }

    #[test]
    fn modifying_twice_with_the_same_point_is_idempotent() {
        let points: Vec<TestPoint> = (0..3)
            .map(|i| TestPoint::new(vec![vec![i as f64]]))
            .collect();
        let replacement = points[1].replaced(vec![vec![8.0], vec![9.0]]);

        let mut planner = planner(TestModel::free(1));
        planner.insert_graph(&points).unwrap();

        planner.modify_trajectory(&replacement).unwrap();
        let once = planner.graph().clone();

        planner.modify_trajectory(&replacement).unwrap();
        assert_eq!(planner.graph(), &once);
    }

    #[test]
    fn incremental_edits_match_a_graph_built_from_scratch() {
        let points: Vec<TestPoint> = (0..5)
            .map(|i| TestPoint::new(vec![vec![i as f64]]))
            .collect();
        let new_second = points[1].replaced(vec![vec![1.5], vec![1.75]]);
        let new_fourth = points[3].replaced(vec![vec![30.0]]);

        let mut edited = planner(TestModel::free(1));
        edited.insert_graph(&points).unwrap();
        edited.modify_trajectory(&new_second).unwrap();
        edited.modify_trajectory(&new_fourth).unwrap();

        let baked = vec![
            points[0].clone(),
            new_second,
            points[2].clone(),
            new_fourth,
            points[4].clone(),
        ];
        let mut fresh = planner(TestModel::free(1));
        fresh.insert_graph(&baked).unwrap();

        assert_eq!(edited.graph(), fresh.graph());
    }

    #[test]
    fn the_reported_cost_matches_the_edge_costs_along_the_path() {
        let mut planner = planner(TestModel::free(1));
        let points: Vec<TestPoint> = (0..4)
            .map(|i| TestPoint::new(vec![vec![i as f64 * 1.5], vec![i as f64 * 2.0]]))
            .collect();
        planner.insert_graph(&points).unwrap();

        let (cost, path) = planner.shortest_path();
        assert!(cost.is_finite());
        assert_eq!(path.len(), planner.graph().size());

        let total: f64 = path
            .windows(2)
            .map(|pair| {
                pair[0]
                    .joints()
                    .iter()
                    .zip(pair[1].joints())
                    .map(|(a, b)| (a - b).abs())
                    .sum::<f64>()
            })
            .sum();
        assert_relative_eq!(cost, total);
    }

    #[test]
    fn a_custom_cost_function_drives_the_search() {
        let mut planner = planner(TestModel::free(1));
        // Prefer the largest joint motion by inverting the travel metric.
        planner.set_cost_function(Some(Box::new(|from: &[f64], to: &[f64]| {
            1.0 / (1.0 + (from[0] - to[0]).abs())
        })));

        let points = vec![
            TestPoint::new(vec![vec![0.0]]),
            TestPoint::new(vec![vec![1.0], vec![5.0]]),
        ];
        planner.insert_graph(&points).unwrap();

        let (_, path) = planner.shortest_path();
        assert_eq!(path_joints(&path), vec![vec![0.0], vec![5.0]]);
    }
}
