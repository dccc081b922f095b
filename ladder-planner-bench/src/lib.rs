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

//! Demo workloads for the ladder planner: Cartesian curves with a
//! redundant tool axis, planned on a gantry whose inverse kinematics are
//! closed-form. Used by the criterion benches and as executable examples
//! of the planner's collaborator contracts.

pub mod gantry;
pub use gantry::{CartesianPoint, GantryModel, GANTRY_DOF};

pub mod lemniscate;
pub use lemniscate::{lemniscate_curve, CurveError};
