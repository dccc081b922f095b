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

/// An upper bound on the time allowed to move into a waypoint from its
/// predecessor.
///
/// When the bound is unspecified the kinematic move-validity check is
/// skipped entirely and transition cost alone decides the plan.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimingConstraint {
    upper: Option<Duration>,
}

impl TimingConstraint {
    /// A constraint that allows unlimited time for the move.
    pub fn unconstrained() -> Self {
        Self { upper: None }
    }

    /// Bound the move by `upper`. Non-positive durations are treated as
    /// unconstrained.
    pub fn with_upper(upper: Duration) -> Self {
        if upper.nanos <= 0 {
            return Self::unconstrained();
        }

        Self { upper: Some(upper) }
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self::with_upper(Duration::from_secs_f64(secs))
    }

    pub fn is_specified(&self) -> bool {
        self.upper.is_some()
    }

    pub fn upper(&self) -> Option<Duration> {
        self.upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconstrained_is_not_specified() {
        assert!(!TimingConstraint::unconstrained().is_specified());
        assert!(!TimingConstraint::default().is_specified());
        assert_eq!(TimingConstraint::unconstrained().upper(), None);
    }

    #[test]
    fn positive_bound_is_specified() {
        let tm = TimingConstraint::from_secs_f64(0.25);
        assert!(tm.is_specified());
        assert_eq!(tm.upper(), Some(Duration::from_secs_f64(0.25)));
    }

    #[test]
    fn non_positive_bound_collapses_to_unconstrained() {
        assert!(!TimingConstraint::from_secs_f64(0.0).is_specified());
        assert!(!TimingConstraint::with_upper(Duration::new(-1)).is_specified());
    }
}
