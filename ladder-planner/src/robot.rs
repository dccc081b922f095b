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

use time_point::Duration;

/// Kinematic capabilities of the manipulator being planned for.
///
/// The planner shares the model read-only and never mutates it. Distinct
/// planner instances may share one model across threads when the
/// implementation allows it.
pub trait RobotModel {
    /// The number of joints in one configuration. Constant for the
    /// lifetime of the model and at least 1.
    fn dof(&self) -> usize;

    /// Whether the transition between two joint configurations is
    /// achievable within `dt_upper`. Only consulted for moves whose
    /// destination waypoint carries a specified timing constraint.
    fn is_valid_move(&self, from: &[f64], to: &[f64], dt_upper: Duration) -> bool;
}

/// User-supplied transition cost between two joint configurations.
///
/// Must return a non-negative value and behave as a pure function; a
/// stateful implementation is confined to the planner it was installed in.
pub trait CostFunction {
    fn cost(&self, from: &[f64], to: &[f64]) -> f64;
}

impl<F: Fn(&[f64], &[f64]) -> f64> CostFunction for F {
    fn cost(&self, from: &[f64], to: &[f64]) -> f64 {
        self(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn closures_are_cost_functions() {
        let max_joint_delta = |from: &[f64], to: &[f64]| {
            from.iter()
                .zip(to)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max)
        };

        let f: &dyn CostFunction = &max_joint_delta;
        assert_relative_eq!(f.cost(&[0.0, 1.0], &[2.0, 1.5]), 2.0);
    }
}
