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

use ladder_planner::{RobotModel, TimingConstraint, TrajectoryPoint};
use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use std::f64::consts::PI;
use time_point::Duration;
use uuid::Uuid;

pub const GANTRY_DOF: usize = 6;

/// A six-axis Cartesian gantry with a spherical wrist: three prismatic
/// axes carry the tool position, three revolute axes reproduce the tool
/// orientation as roll-pitch-yaw. The one-to-one mapping between pose and
/// joints keeps the demo's inverse kinematics closed-form.
#[derive(Debug, Clone)]
pub struct GantryModel {
    /// Per-joint speed limits for the move-validity check: meters per
    /// second on the prismatic axes, radians per second on the wrist.
    joint_speed_limits: [f64; GANTRY_DOF],
}

impl GantryModel {
    pub fn new(joint_speed_limits: [f64; GANTRY_DOF]) -> Self {
        Self { joint_speed_limits }
    }

    /// The joint values realizing `pose`, with the redundant rotation
    /// about the tool Z axis fixed to `z_angle`.
    pub fn inverse(&self, pose: &Isometry3<f64>, z_angle: f64) -> [f64; GANTRY_DOF] {
        let spun = pose * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), z_angle);
        let (roll, pitch, yaw) = spun.rotation.euler_angles();
        let p = &pose.translation.vector;
        [p.x, p.y, p.z, roll, pitch, yaw]
    }
}

impl Default for GantryModel {
    fn default() -> Self {
        Self::new([1.0, 1.0, 1.0, 2.0 * PI, 2.0 * PI, 2.0 * PI])
    }
}

impl RobotModel for GantryModel {
    fn dof(&self) -> usize {
        GANTRY_DOF
    }

    fn is_valid_move(&self, from: &[f64], to: &[f64], dt_upper: Duration) -> bool {
        let dt = dt_upper.nanos as f64 * 1e-9;
        if dt <= 0.0 {
            return false;
        }

        from.iter()
            .zip(to)
            .zip(&self.joint_speed_limits)
            .all(|((a, b), limit)| (a - b).abs() <= limit * dt)
    }
}

/// A Cartesian waypoint with free rotation about the tool Z axis,
/// discretized into `samples` evenly spaced candidate configurations.
#[derive(Debug, Clone)]
pub struct CartesianPoint {
    id: Uuid,
    pose: Isometry3<f64>,
    timing: TimingConstraint,
    samples: usize,
}

impl CartesianPoint {
    /// Panics if `samples` is zero; a waypoint without candidates could
    /// never be planned through.
    pub fn new(pose: Isometry3<f64>, timing: TimingConstraint, samples: usize) -> Self {
        assert!(samples > 0, "a waypoint needs at least one candidate");
        Self {
            id: Uuid::new_v4(),
            pose,
            timing,
            samples,
        }
    }

    pub fn pose(&self) -> &Isometry3<f64> {
        &self.pose
    }
}

impl TrajectoryPoint<GantryModel> for CartesianPoint {
    fn id(&self) -> Uuid {
        self.id
    }

    fn timing(&self) -> TimingConstraint {
        self.timing
    }

    fn joint_poses(&self, model: &GantryModel) -> Vec<Vec<f64>> {
        let step = 2.0 * PI / self.samples as f64;
        (0..self.samples)
            .map(|k| model.inverse(&self.pose, k as f64 * step).to_vec())
            .collect()
    }
}
