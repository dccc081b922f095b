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

use crate::robot::RobotModel;
use crate::timing::TimingConstraint;
use uuid::Uuid;

/// One Cartesian waypoint submitted to the planner.
///
/// The planner only cares about identity, the timing constraint and the
/// enumeration of admissible joint configurations; the pose representation
/// and any sampling strategy belong to the implementor. `joint_poses` must
/// enumerate deterministically for a given waypoint: vertices are stored
/// and reported in enumeration order.
pub trait TrajectoryPoint<M: RobotModel> {
    fn id(&self) -> Uuid;

    fn timing(&self) -> TimingConstraint;

    /// The admissible joint configurations for this waypoint, each of
    /// length `model.dof()`. An empty result means inverse kinematics
    /// failed for the waypoint.
    fn joint_poses(&self, model: &M) -> Vec<Vec<f64>>;
}

impl<M: RobotModel, T: TrajectoryPoint<M> + ?Sized> TrajectoryPoint<M> for &T {
    fn id(&self) -> Uuid {
        (**self).id()
    }

    fn timing(&self) -> TimingConstraint {
        (**self).timing()
    }

    fn joint_poses(&self, model: &M) -> Vec<Vec<f64>> {
        (**self).joint_poses(model)
    }
}

impl<M: RobotModel, T: TrajectoryPoint<M> + ?Sized> TrajectoryPoint<M> for Box<T> {
    fn id(&self) -> Uuid {
        (**self).id()
    }

    fn timing(&self) -> TimingConstraint {
        (**self).timing()
    }

    fn joint_poses(&self, model: &M) -> Vec<Vec<f64>> {
        (**self).joint_poses(model)
    }
}

/// A waypoint pinned to a single joint configuration.
///
/// This is the planner's output primitive, and it is also a valid input
/// point: feeding it back produces a rung with exactly one vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct JointTrajectoryPoint {
    id: Uuid,
    joints: Vec<f64>,
    timing: TimingConstraint,
}

impl JointTrajectoryPoint {
    /// Create a point with a freshly generated identity.
    pub fn new(joints: Vec<f64>, timing: TimingConstraint) -> Self {
        Self::with_id(Uuid::new_v4(), joints, timing)
    }

    pub fn with_id(id: Uuid, joints: Vec<f64>, timing: TimingConstraint) -> Self {
        Self { id, joints, timing }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn joints(&self) -> &[f64] {
        &self.joints
    }

    pub fn into_joints(self) -> Vec<f64> {
        self.joints
    }

    pub fn timing(&self) -> TimingConstraint {
        self.timing
    }
}

impl<M: RobotModel> TrajectoryPoint<M> for JointTrajectoryPoint {
    fn id(&self) -> Uuid {
        self.id
    }

    fn timing(&self) -> TimingConstraint {
        self.timing
    }

    fn joint_poses(&self, _model: &M) -> Vec<Vec<f64>> {
        vec![self.joints.clone()]
    }
}
