// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wavefront OBJ export.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use dynmod_geometry::Mesh;

/// Write `mesh` as a single OBJ object. Polygons keep their winding; indices
/// are 1-based as the format requires.
pub fn write_obj<W: Write>(out: &mut W, name: &str, mesh: &Mesh) -> io::Result<()> {
    writeln!(out, "o {name}")?;
    for p in mesh.points() {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for polygon in &mesh.polygons {
        write!(out, "f")?;
        for index in polygon {
            write!(out, " {}", index + 1)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn export_obj(path: &Path, name: &str, mesh: &Mesh) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_obj(&mut out, name, mesh)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynmod_geometry::Point3;

    #[test]
    fn test_triangle() {
        let mut mesh = Mesh::new();
        mesh.add_point(Point3::new(0.0, 0.0, 0.0));
        mesh.add_point(Point3::new(1.0, 0.0, 0.0));
        mesh.add_point(Point3::new(0.0, 1.5, 0.0));
        mesh.add_triangle(0, 1, 2);

        let mut out = Vec::new();
        write_obj(&mut out, "tri", &mesh).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "o tri\nv 0 0 0\nv 1 0 0\nv 0 1.5 0\nf 1 2 3\n"
        );
    }
}
