//! Per-vertex normals estimated from face topology.
//!
//! Every triangle contributes its unit face normal to each of its three
//! corners; a vertex normal is the plain mean of the face normals around it.
//! [`estimate_normals`] leaves that mean as-is, so vertices where faces meet at
//! an angle get normals shorter than one. [`estimate_unit_normals`]
//! renormalizes.

use crate::math::vec3::Vec3;

/// Unit normal of the triangle `(a, b, c)` with counter-clockwise front faces.
///
/// Degenerate triangles yield the zero vector.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalize()
}

/// Averages face normals onto vertices without renormalizing.
///
/// `indices` is read as a flat list of triangles; a trailing partial triangle is
/// ignored. Every index must be `< vertices.len()`. Vertices no face refers to
/// get the zero vector.
pub fn estimate_normals(vertices: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; vertices.len()];
    let mut shared = vec![0u32; vertices.len()];

    for tri in indices.chunks_exact(3) {
        let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let normal = face_normal(vertices[i0], vertices[i1], vertices[i2]);

        for i in [i0, i1, i2] {
            sums[i] += normal;
            shared[i] += 1;
        }
    }

    sums.into_iter()
        .zip(shared)
        .map(|(sum, count)| {
            if count == 0 {
                Vec3::ZERO
            } else {
                sum / count as f32
            }
        })
        .collect()
}

/// Like [`estimate_normals`], then scales every non-zero normal to unit length.
pub fn estimate_unit_normals(vertices: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    estimate_normals(vertices, indices)
        .into_iter()
        .map(|n| n.normalize())
        .collect()
}
