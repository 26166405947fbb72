//! Wavefront OBJ import via `tobj`.
//!
//! Every object/group in the file becomes one [`Mesh`]. Faces are triangulated
//! and attributes are re-indexed to a single index buffer, so the result has
//! the same shape as a parsed PLY mesh. Normals are estimated from the faces
//! when the file carries none.

use std::io::BufRead;
use std::path::Path;

use log::debug;

use crate::error::LoadError;
use crate::math::{vec2::Vec2, vec3::Vec3, vec4::Vec4};
use crate::mesh::Mesh;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// A named mesh read from an OBJ file.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjMesh {
    pub name: String,
    pub mesh: Mesh,
}

/// Load every object in the OBJ file at `path`. Materials are not read.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Vec<ObjMesh>, LoadError> {
    let path = path.as_ref();
    let (models, _materials) = tobj::load_obj(path, &load_options())?;
    let meshes = models
        .into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("loaded {} meshes from {}", meshes.len(), path.display());
    Ok(meshes)
}

/// Load OBJ data from any buffered reader, ignoring `mtllib` references.
pub fn load_obj_from_reader<R: BufRead>(reader: &mut R) -> Result<Vec<ObjMesh>, LoadError> {
    let (models, _materials) = tobj::load_obj_buf(reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;
    models.into_iter().map(convert).collect()
}

fn convert(model: tobj::Model) -> Result<ObjMesh, LoadError> {
    let m = model.mesh;

    let vertices: Vec<Vec3> = m
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();

    let mut mesh = Mesh::new(vertices, m.indices)?;

    if m.normals.len() == m.positions.len() {
        let normals = m
            .normals
            .chunks_exact(3)
            .map(|n| Vec3::new(n[0], n[1], n[2]))
            .collect();
        mesh = mesh.with_normals(normals)?;
    }
    if !m.texcoords.is_empty() {
        let uvs = m
            .texcoords
            .chunks_exact(2)
            .map(|t| Vec2::new(t[0], t[1]))
            .collect();
        mesh = mesh.with_uvs(uvs)?;
    }
    if m.vertex_color.len() == m.positions.len() {
        let colors = m
            .vertex_color
            .chunks_exact(3)
            .map(|c| Vec4::new(c[0], c[1], c[2], 1.0))
            .collect();
        mesh = mesh.with_colors(colors)?;
    }

    Ok(ObjMesh {
        name: model.name,
        mesh,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const QUAD: &str = "o quad
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
f 1/1 2/2 3/3 4/4
";

    #[test]
    fn quad_is_triangulated_with_estimated_normals() {
        let meshes = load_obj_from_reader(&mut Cursor::new(QUAD)).unwrap();
        assert_eq!(meshes.len(), 1);

        let quad = &meshes[0];
        assert_eq!(quad.name, "quad");
        assert_eq!(quad.mesh.vertex_count(), 4);
        assert_eq!(quad.mesh.triangle_count(), 2);
        assert!(quad.mesh.has_uvs());
        for n in quad.mesh.normals() {
            assert_relative_eq!(*n, Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        }
        assert_eq!(quad.mesh.colors(), &[Vec4::WHITE; 4]);
    }

    #[test]
    fn explicit_normals_are_kept() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 -1\nf 1//1 2//1 3//1\n";
        let meshes = load_obj_from_reader(&mut Cursor::new(text)).unwrap();
        assert_eq!(meshes[0].mesh.normals()[0], Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_obj("does/not/exist.obj").is_err());
    }
}
