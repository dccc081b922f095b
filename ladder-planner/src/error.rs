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

pub use std::error::Error as StdError;
pub use thiserror::Error as ThisError;

use uuid::Uuid;

/// Structural failures raised by [`LadderGraph`](crate::graph::LadderGraph)
/// operations. Every variant leaves the graph unchanged.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("allocate requires an empty graph, but {0} rungs are present")]
    AlreadyAllocated(usize),

    #[error("rung index {index} is out of bounds for {len} rungs")]
    OutOfBounds { index: usize, len: usize },

    #[error("joint data of length {len} is not a multiple of {dof} degrees of freedom")]
    MisalignedJointData { len: usize, dof: usize },

    #[error("{given} edge lists assigned to a rung with {expected} vertices")]
    EdgeCountMismatch { given: usize, expected: usize },

    #[error("rung {0} is the last rung and has no outgoing edge block")]
    NoNextRung(usize),
}

/// Failures raised by [`PlanningGraph`](crate::planner::PlanningGraph)
/// operations.
///
/// An infeasible graph is not an error: `shortest_path` reports it through
/// the positive-infinity cost sentinel so that callers can keep comparing
/// costs numerically.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum PlanningError {
    #[error("a trajectory needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("inverse kinematics returned no solutions for point {0}")]
    IkFailure(Uuid),

    #[error("no trajectory point with id {0} exists in the graph")]
    UnknownPoint(Uuid),

    #[error(transparent)]
    Graph(#[from] GraphError),
}
