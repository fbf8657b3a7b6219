// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial hash grid for tolerance-based point lookup.
//!
//! Used by [`MeshCleaner`](crate::MeshCleaner) when a non-zero merge
//! tolerance is configured. Space is divided into cubic cells of side
//! `cell_size`; a lookup visits the 3x3x3 neighbourhood of the query cell.

use nalgebra::Point3;
use rustc_hash::FxHashMap;

/// A spatial hash grid over point indices of a mesh under construction.
#[derive(Debug, Default)]
pub struct SpatialGrid {
    cell_size: f64,
    grid: FxHashMap<(i64, i64, i64), Vec<u32>>,
}

impl SpatialGrid {
    /// Creates an empty grid. `cell_size` must be positive and should be
    /// at least the query tolerance.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            grid: FxHashMap::default(),
        }
    }

    /// Removes all entries and sets a new cell size, keeping allocations.
    pub fn reset(&mut self, cell_size: f64) {
        self.cell_size = cell_size;
        self.grid.clear();
    }

    /// Records point `index` at `position`.
    pub fn insert(&mut self, index: u32, position: &Point3<f64>) {
        let cell = self.cell_coords(position);
        self.grid.entry(cell).or_default().push(index);
    }

    /// Returns the first recorded point within `tolerance` of `position`.
    ///
    /// `positions` is the flat coordinate buffer the recorded indices refer
    /// to. Candidates are visited in insertion order per cell, so results are
    /// deterministic for a given insertion sequence.
    pub fn find_near(
        &self,
        positions: &[f64],
        position: &Point3<f64>,
        tolerance: f64,
    ) -> Option<u32> {
        let (cx, cy, cz) = self.cell_coords(position);
        let tol_sq = tolerance * tolerance;
        let mut best: Option<u32> = None;

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(indices) = self.grid.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    for &index in indices {
                        let base = index as usize * 3;
                        let dist_sq = (positions[base] - position.x).powi(2)
                            + (positions[base + 1] - position.y).powi(2)
                            + (positions[base + 2] - position.z).powi(2);
                        if dist_sq <= tol_sq && best.map_or(true, |b| index < b) {
                            best = Some(index);
                        }
                    }
                }
            }
        }
        best
    }

    /// Number of occupied cells.
    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    fn cell_coords(&self, position: &Point3<f64>) -> (i64, i64, i64) {
        (
            (position.x / self.cell_size).floor() as i64,
            (position.y / self.cell_size).floor() as i64,
            (position.z / self.cell_size).floor() as i64,
        )
    }
}
