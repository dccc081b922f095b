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

use nalgebra::{Isometry3, Rotation3, Translation3, UnitQuaternion, Vector3};
use std::f64::consts::{FRAC_PI_4, PI};
use thiserror::Error;

/// Keeps the polar samples off the lobe boundaries, where the lemniscate
/// radius degenerates to zero.
const EPSILON: f64 = 1e-4;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("foci distance and sphere radius must be positive, got {foci_distance} and {sphere_radius}")]
    BadGeometry {
        foci_distance: f64,
        sphere_radius: f64,
    },

    #[error("need at least 10 points per lemniscate and 1 lemniscate, got {num_points} and {num_lemniscates}")]
    TooSparse {
        num_points: usize,
        num_lemniscates: usize,
    },
}

/// Sample poses along lemniscate curves wrapped onto a sphere.
///
/// Each of the `num_lemniscates` curves is rotated by an equal share of a
/// half turn about the sphere's vertical axis and sampled at `num_points`
/// poses. Every pose sits on the sphere of `sphere_radius` around
/// `sphere_center` with its tool Z axis pointing at the center, which
/// makes the output a ready-made workload for a planner driving a
/// center-mounted workpiece.
pub fn lemniscate_curve(
    foci_distance: f64,
    sphere_radius: f64,
    num_points: usize,
    num_lemniscates: usize,
    sphere_center: &Vector3<f64>,
) -> Result<Vec<Isometry3<f64>>, CurveError> {
    if foci_distance <= 0.0 || sphere_radius <= 0.0 {
        return Err(CurveError::BadGeometry {
            foci_distance,
            sphere_radius,
        });
    }
    if num_points < 10 || num_lemniscates < 1 {
        return Err(CurveError::TooSparse {
            num_points,
            num_lemniscates,
        });
    }

    let a = foci_distance;
    let ro = sphere_radius;
    let half = num_points / 2;

    // Polar angle samples over the two lobes where the lemniscate radius
    // is real: <-pi/4, pi/4> and <3pi/4, 5pi/4>.
    let d_theta = PI / (num_points - 1) as f64;
    let mut theta = vec![0.0; num_points];
    for i in 0..half {
        theta[i] = -FRAC_PI_4 + i as f64 * d_theta;
    }
    theta[0] += EPSILON;
    theta[half - 1] -= EPSILON;
    for i in 0..(num_points - half) {
        theta[half + i] = 3.0 * FRAC_PI_4 + i as f64 * d_theta;
    }
    theta[half] += EPSILON;
    theta[num_points - 1] -= EPSILON;

    let d_omega = PI / num_lemniscates as f64;

    let mut poses = Vec::with_capacity(num_points * num_lemniscates);
    for j in 0..num_lemniscates {
        let omega = j as f64 * d_omega;
        for &t in &theta {
            let r = (a * a * (2.0 * t).cos()).sqrt();
            let phi = if r < ro {
                (r / ro).asin()
            } else {
                PI - ((2.0 * ro - r) / ro).asin()
            };

            let x = ro * (t + omega).cos() * phi.sin();
            let y = ro * (t + omega).sin() * phi.sin();
            let z = ro * phi.cos();

            // Tool Z looks back at the sphere center.
            let unit_z = Vector3::new(-x, -y, -z).normalize();
            let unit_x = Vector3::y().cross(&unit_z).normalize();
            let unit_y = unit_z.cross(&unit_x).normalize();
            let rotation = Rotation3::from_basis_unchecked(&[unit_x, unit_y, unit_z]);

            let translation = Translation3::new(
                sphere_center.x + x,
                sphere_center.y + y,
                sphere_center.z + z,
            );
            poses.push(Isometry3::from_parts(
                translation,
                UnitQuaternion::from_rotation_matrix(&rotation),
            ));
        }
    }

    Ok(poses)
}
