// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Primitive mesh generators

mod arrow;
mod cube;

pub use arrow::{arrow, ArrowParams};
pub use cube::cube;

use nalgebra::Point3;
use std::f64::consts::TAU;

use crate::mesh::Mesh;

/// Append a circle of `resolution` points in the plane `x = x`, centred on the
/// X axis. Points run counter-clockwise seen from +X. Returns the first index.
pub(crate) fn add_ring(mesh: &mut Mesh, x: f64, radius: f64, resolution: u32) -> u32 {
    let first = mesh.point_count() as u32;
    for i in 0..resolution {
        let angle = TAU * f64::from(i) / f64::from(resolution);
        mesh.add_point(Point3::new(x, radius * angle.cos(), radius * angle.sin()));
    }
    first
}
