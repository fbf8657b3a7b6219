// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coincident point merging and duplicate polygon removal.
//!
//! [`MeshCleaner`] turns a polygon soup (typically several meshes appended
//! together) into a mesh where:
//!
//! - coincident points are merged (exact coordinate equality by default,
//!   or within a tolerance through a [`SpatialGrid`]),
//! - polygons that collapse below three distinct corners are dropped,
//! - polygons referencing the same point set as an earlier polygon are
//!   dropped, whatever their winding,
//! - points no longer referenced by any polygon are removed.
//!
//! Surviving points and polygons keep their relative input order, so the
//! result is a pure function of the input.

use nalgebra::Point3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::mesh::{Mesh, Polygon};
use crate::spatial::SpatialGrid;

/// What a cleaning pass removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanStats {
    /// Input points folded into an earlier coincident point
    pub merged_points: usize,
    /// Polygons dropped for having fewer than three distinct corners
    pub degenerate_polygons: usize,
    /// Polygons dropped as repeats of an earlier point set
    pub duplicate_polygons: usize,
    /// Points dropped because no polygon uses them
    pub unused_points: usize,
}

/// Reusable cleaning pass. All scratch storage lives on the struct and is
/// cleared, not reallocated, on every call.
#[derive(Debug, Default)]
pub struct MeshCleaner {
    tolerance: f64,
    exact_lookup: FxHashMap<[u64; 3], u32>,
    grid: SpatialGrid,
    merged_positions: Vec<f64>,
    remap: Vec<u32>,
    compact: Vec<u32>,
    polygons: Vec<Polygon>,
    seen: FxHashSet<Polygon>,
}

impl MeshCleaner {
    /// Creates a cleaner. A tolerance of `0.0` (or anything non-positive)
    /// merges only points with identical coordinates.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            ..Self::default()
        }
    }

    /// Merge tolerance in use.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Cleans `input` and returns the result as a new mesh.
    pub fn clean(&mut self, input: &Mesh) -> Mesh {
        let mut out = Mesh::new();
        self.clean_into(input, &mut out);
        out
    }

    /// Cleans `input` into `out`, overwriting its previous content.
    pub fn clean_into(&mut self, input: &Mesh, out: &mut Mesh) -> CleanStats {
        let mut stats = CleanStats::default();
        self.reset();

        self.merge_points(input, &mut stats);
        self.filter_polygons(input, &mut stats);
        self.compact_into(out, &mut stats);

        stats
    }

    fn reset(&mut self) {
        self.exact_lookup.clear();
        if self.tolerance > 0.0 {
            self.grid.reset(self.tolerance * 2.0);
        }
        self.merged_positions.clear();
        self.remap.clear();
        self.compact.clear();
        self.polygons.clear();
        self.seen.clear();
    }

    fn merge_points(&mut self, input: &Mesh, stats: &mut CleanStats) {
        self.remap.reserve(input.point_count());
        for point in input.points() {
            let existing = if self.tolerance > 0.0 {
                self.grid
                    .find_near(&self.merged_positions, &point, self.tolerance)
            } else {
                self.exact_lookup.get(&exact_key(&point)).copied()
            };

            let index = match existing {
                Some(index) => {
                    stats.merged_points += 1;
                    index
                }
                None => {
                    let index = (self.merged_positions.len() / 3) as u32;
                    self.merged_positions
                        .extend_from_slice(&[point.x, point.y, point.z]);
                    if self.tolerance > 0.0 {
                        self.grid.insert(index, &point);
                    } else {
                        self.exact_lookup.insert(exact_key(&point), index);
                    }
                    index
                }
            };
            self.remap.push(index);
        }
    }

    fn filter_polygons(&mut self, input: &Mesh, stats: &mut CleanStats) {
        for polygon in &input.polygons {
            let mut mapped = Polygon::new();
            for &i in polygon {
                let Some(&index) = self.remap.get(i as usize) else {
                    continue;
                };
                if mapped.last() != Some(&index) {
                    mapped.push(index);
                }
            }
            while mapped.len() > 1 && mapped.first() == mapped.last() {
                mapped.pop();
            }

            let mut key = mapped.clone();
            key.sort_unstable();
            key.dedup();
            if key.len() < 3 {
                stats.degenerate_polygons += 1;
                continue;
            }
            if !self.seen.insert(key) {
                stats.duplicate_polygons += 1;
                continue;
            }
            self.polygons.push(mapped);
        }
    }

    fn compact_into(&mut self, out: &mut Mesh, stats: &mut CleanStats) {
        const UNUSED: u32 = u32::MAX;

        let merged_count = self.merged_positions.len() / 3;
        self.compact.resize(merged_count, UNUSED);
        for polygon in &self.polygons {
            for &i in polygon {
                self.compact[i as usize] = 0;
            }
        }

        out.clear();
        for (old, slot) in self.compact.iter_mut().enumerate() {
            if *slot == UNUSED {
                stats.unused_points += 1;
                continue;
            }
            let base = old * 3;
            *slot = out.add_point(Point3::new(
                self.merged_positions[base],
                self.merged_positions[base + 1],
                self.merged_positions[base + 2],
            ));
        }

        out.polygons.reserve(self.polygons.len());
        for polygon in self.polygons.drain(..) {
            out.polygons.push(
                polygon
                    .iter()
                    .map(|&i| self.compact[i as usize])
                    .collect(),
            );
        }
    }
}

/// Bit pattern key for exact coordinate equality. Adding `0.0` folds
/// negative zero onto positive zero so `-0.0 == 0.0` holds here too.
#[inline]
fn exact_key(point: &Point3<f64>) -> [u64; 3] {
    [
        (point.x + 0.0).to_bits(),
        (point.y + 0.0).to_bits(),
        (point.z + 0.0).to_bits(),
    ]
}
