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

//! Joint-space trajectory planning over ladder graphs.
//!
//! A Cartesian waypoint sequence becomes a layered DAG: one rung per
//! waypoint, one vertex per admissible joint configuration, and weighted
//! edges between consecutive rungs filtered by a timing-constrained
//! move-validity check. A single dynamic-programming pass then extracts
//! the cheapest joint trajectory.
//!
//! The kinematics stay outside the crate: callers provide a [`RobotModel`]
//! and [`TrajectoryPoint`] implementations, and optionally override the
//! transition metric through [`CostFunction`].

pub mod edges;

pub mod error;

pub mod graph;
pub use graph::LadderGraph;

pub mod id_index;

pub mod planner;
pub use planner::PlanningGraph;

pub mod point;
pub use point::{JointTrajectoryPoint, TrajectoryPoint};

pub mod robot;
pub use robot::{CostFunction, RobotModel};

pub mod search;
pub use search::DagSearch;

pub mod timing;
pub use timing::TimingConstraint;

pub mod prelude {
    pub use super::edges::build_edges;
    pub use super::error::{GraphError, PlanningError};
    pub use super::graph::{Edge, EdgeList, LadderGraph, Rung};
    pub use super::id_index::IdIndex;
    pub use super::planner::PlanningGraph;
    pub use super::point::{JointTrajectoryPoint, TrajectoryPoint};
    pub use super::robot::{CostFunction, RobotModel};
    pub use super::search::DagSearch;
    pub use super::timing::TimingConstraint;
}
