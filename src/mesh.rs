//! Triangle meshes ready for upload.
//!
//! A [`Mesh`] owns per-vertex positions, normals, colors and (optionally) texture
//! coordinates plus a flat triangle index list. It is built once by the PLY
//! parser, the OBJ importer or one of the built-in shapes, and is only read
//! afterwards. [`VertexLayout`] describes how the attributes are interleaved
//! into a single `f32` buffer for the renderer.

use crate::error::LoadError;
use crate::math::{vec2::Vec2, vec3::Vec3, vec4::Vec4};
use crate::normals::estimate_normals;

/// Triangle mesh with per-vertex attributes.
///
/// Invariants, checked by [`Mesh::validate`]:
/// - `normals` and `colors` have one entry per vertex
/// - `uvs` is empty or has one entry per vertex
/// - `indices.len()` is a multiple of 3 and every index is in range
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    colors: Vec<Vec4>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
}

impl Mesh {
    /// Build a mesh from positions and triangle indices.
    ///
    /// Colors default to opaque white and normals are estimated from the faces.
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, LoadError> {
        check_indices(&indices, vertices.len())?;
        let normals = estimate_normals(&vertices, &indices);
        let colors = vec![Vec4::WHITE; vertices.len()];
        Ok(Self {
            vertices,
            indices,
            colors,
            uvs: Vec::new(),
            normals,
        })
    }

    /// Replace the per-vertex colors.
    pub fn with_colors(mut self, colors: Vec<Vec4>) -> Result<Self, LoadError> {
        self.colors = colors;
        self.validate()?;
        Ok(self)
    }

    /// Replace the texture coordinates. Pass an empty vector to drop them.
    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Result<Self, LoadError> {
        self.uvs = uvs;
        self.validate()?;
        Ok(self)
    }

    /// Replace the estimated normals with explicit ones.
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Result<Self, LoadError> {
        self.normals = normals;
        self.validate()?;
        Ok(self)
    }

    /// Assemble a mesh whose indices the caller has already range-checked.
    pub(crate) fn from_checked_parts(
        vertices: Vec<Vec3>,
        indices: Vec<u32>,
        colors: Vec<Vec4>,
        uvs: Vec<Vec2>,
        normals: Vec<Vec3>,
    ) -> Self {
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        Self {
            vertices,
            indices,
            colors,
            uvs,
            normals,
        }
    }

    /// Check every structural invariant.
    pub fn validate(&self) -> Result<(), LoadError> {
        let n = self.vertices.len();
        check_indices(&self.indices, n)?;
        if self.normals.len() != n {
            return Err(LoadError::InvalidMesh(format!(
                "{} normals for {} vertices",
                self.normals.len(),
                n
            )));
        }
        if self.colors.len() != n {
            return Err(LoadError::InvalidMesh(format!(
                "{} colors for {} vertices",
                self.colors.len(),
                n
            )));
        }
        if !self.uvs.is_empty() && self.uvs.len() != n {
            return Err(LoadError::InvalidMesh(format!(
                "{} texture coordinates for {} vertices",
                self.uvs.len(),
                n
            )));
        }
        Ok(())
    }

    // ============ Accessors ============

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_uvs(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Iterate over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    // ============ Flat Arrays ============

    /// Positions as `x, y, z, x, y, z, ...`.
    pub fn positions_flat(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.to_array()).collect()
    }

    pub fn normals_flat(&self) -> Vec<f32> {
        self.normals.iter().flat_map(|n| n.to_array()).collect()
    }

    /// Colors as `r, g, b, a, ...`.
    pub fn colors_flat(&self) -> Vec<f32> {
        self.colors.iter().flat_map(|c| c.to_array()).collect()
    }

    pub fn uvs_flat(&self) -> Vec<f32> {
        self.uvs.iter().flat_map(|uv| uv.to_array()).collect()
    }

    /// Interleave the attributes named by `layout` into one vertex buffer.
    ///
    /// A texture-coordinate slot on a mesh without UVs is filled with zeros.
    pub fn interleave(&self, layout: &VertexLayout) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.vertices.len() * layout.stride());

        for i in 0..self.vertices.len() {
            for attribute in layout.attributes() {
                match attribute.kind {
                    AttributeKind::Position => out.extend_from_slice(&self.vertices[i].to_array()),
                    AttributeKind::Normal => out.extend_from_slice(&self.normals[i].to_array()),
                    AttributeKind::Color => out.extend_from_slice(&self.colors[i].to_array()),
                    AttributeKind::TexCoord => {
                        let uv = self.uvs.get(i).copied().unwrap_or(Vec2::ZERO);
                        out.extend_from_slice(&uv.to_array());
                    }
                }
            }
        }

        out
    }

    // ============ Built-in Shapes ============

    /// A 2x2x2 cube centred on the origin, one solid color per face.
    pub fn cube() -> Self {
        let faces: [([Vec3; 4], Vec4); 6] = [
            // front: cyan
            (
                [
                    Vec3::new(-1.0, -1.0, 1.0),
                    Vec3::new(1.0, -1.0, 1.0),
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(-1.0, 1.0, 1.0),
                ],
                Vec4::new(0.0, 1.0, 1.0, 1.0),
            ),
            // back: red
            (
                [
                    Vec3::new(-1.0, -1.0, -1.0),
                    Vec3::new(-1.0, 1.0, -1.0),
                    Vec3::new(1.0, 1.0, -1.0),
                    Vec3::new(1.0, -1.0, -1.0),
                ],
                Vec4::new(1.0, 0.0, 0.0, 1.0),
            ),
            // top: green
            (
                [
                    Vec3::new(-1.0, 1.0, -1.0),
                    Vec3::new(-1.0, 1.0, 1.0),
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(1.0, 1.0, -1.0),
                ],
                Vec4::new(0.0, 1.0, 0.0, 1.0),
            ),
            // bottom: blue
            (
                [
                    Vec3::new(-1.0, -1.0, -1.0),
                    Vec3::new(1.0, -1.0, -1.0),
                    Vec3::new(1.0, -1.0, 1.0),
                    Vec3::new(-1.0, -1.0, 1.0),
                ],
                Vec4::new(0.0, 0.0, 1.0, 1.0),
            ),
            // right: yellow
            (
                [
                    Vec3::new(1.0, -1.0, -1.0),
                    Vec3::new(1.0, 1.0, -1.0),
                    Vec3::new(1.0, 1.0, 1.0),
                    Vec3::new(1.0, -1.0, 1.0),
                ],
                Vec4::new(1.0, 1.0, 0.0, 1.0),
            ),
            // left: purple
            (
                [
                    Vec3::new(-1.0, -1.0, -1.0),
                    Vec3::new(-1.0, -1.0, 1.0),
                    Vec3::new(-1.0, 1.0, 1.0),
                    Vec3::new(-1.0, 1.0, -1.0),
                ],
                Vec4::new(1.0, 0.0, 1.0, 1.0),
            ),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut colors = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (corners, color) in faces {
            let base = vertices.len() as u32;
            vertices.extend_from_slice(&corners);
            colors.extend_from_slice(&[color; 4]);
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::solid(vertices, indices, colors)
    }

    /// A 20x20 dark grey floor in the `y = 0` plane, facing up.
    pub fn table() -> Self {
        let vertices = vec![
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(-10.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, -10.0),
        ];
        let colors = vec![Vec4::new(0.2, 0.2, 0.2, 1.0); 4];
        Self::solid(vertices, vec![0, 1, 2, 0, 2, 3], colors)
    }

    /// A single red/green/blue triangle at `z = -1`, facing the viewer.
    pub fn triangle() -> Self {
        let vertices = vec![
            Vec3::new(-0.5, -0.5, -1.0),
            Vec3::new(0.5, -0.5, -1.0),
            Vec3::new(0.0, 0.5, -1.0),
        ];
        let colors = vec![
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
        ];
        Self::solid(vertices, vec![0, 1, 2], colors)
    }

    /// A tetrahedron with unshared vertices so each face gets a flat normal.
    pub fn tetrahedron() -> Self {
        let apex = Vec3::new(0.0, 1.0, 0.0);
        let left = Vec3::new(-1.0, -1.0, 1.0);
        let back = Vec3::new(0.0, -1.0, -1.0);
        let right = Vec3::new(1.0, -1.0, 1.0);

        Self::faceted(&[
            ([left, back, right], Vec4::new(1.0, 1.0, 0.0, 1.0)),
            ([apex, left, right], Vec4::new(0.0, 1.0, 0.0, 1.0)),
            ([apex, back, left], Vec4::new(0.0, 0.0, 1.0, 1.0)),
            ([apex, right, back], Vec4::new(1.0, 0.0, 0.0, 1.0)),
        ])
    }

    /// A unit octahedron, one color per face.
    pub fn octahedron() -> Self {
        let top = Vec3::UP;
        let bottom = -Vec3::UP;
        let right = Vec3::RIGHT;
        let left = -Vec3::RIGHT;
        let front = Vec3::new(0.0, 0.0, 1.0);
        let back = Vec3::new(0.0, 0.0, -1.0);

        Self::faceted(&[
            ([top, front, right], Vec4::new(1.0, 0.0, 0.0, 1.0)),
            ([top, left, front], Vec4::new(0.0, 1.0, 0.0, 1.0)),
            ([top, back, left], Vec4::new(0.0, 0.0, 1.0, 1.0)),
            ([top, right, back], Vec4::new(1.0, 1.0, 0.0, 1.0)),
            ([bottom, right, front], Vec4::new(0.0, 1.0, 1.0, 1.0)),
            ([bottom, front, left], Vec4::new(1.0, 0.0, 1.0, 1.0)),
            ([bottom, left, back], Vec4::new(1.0, 0.5, 0.0, 1.0)),
            ([bottom, back, right], Vec4::new(0.5, 0.0, 1.0, 1.0)),
        ])
    }

    fn faceted(faces: &[([Vec3; 3], Vec4)]) -> Self {
        let mut vertices = Vec::with_capacity(faces.len() * 3);
        let mut colors = Vec::with_capacity(faces.len() * 3);
        for (corners, color) in faces {
            vertices.extend_from_slice(corners);
            colors.extend_from_slice(&[*color; 3]);
        }
        let indices = (0..vertices.len() as u32).collect();
        Self::solid(vertices, indices, colors)
    }

    fn solid(vertices: Vec<Vec3>, indices: Vec<u32>, colors: Vec<Vec4>) -> Self {
        let normals = estimate_normals(&vertices, &indices);
        Self::from_checked_parts(vertices, indices, colors, Vec::new(), normals)
    }
}

fn check_indices(indices: &[u32], vertex_count: usize) -> Result<(), LoadError> {
    if indices.len() % 3 != 0 {
        return Err(LoadError::InvalidMesh(format!(
            "{} indices is not a whole number of triangles",
            indices.len()
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(LoadError::InvalidMesh(format!(
            "index {bad} out of range for {vertex_count} vertices"
        )));
    }
    Ok(())
}

// ============ Vertex Layout ============

/// Which mesh attribute a layout slot carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Position,
    Normal,
    Color,
    TexCoord,
}

impl AttributeKind {
    /// Number of `f32` components in one element.
    pub fn components(self) -> usize {
        match self {
            AttributeKind::Position | AttributeKind::Normal => 3,
            AttributeKind::Color => 4,
            AttributeKind::TexCoord => 2,
        }
    }
}

/// One slot of an interleaved vertex, bound to a shader attribute by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: String,
    pub kind: AttributeKind,
}

impl VertexAttribute {
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered list of attributes making up one interleaved vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::position_normal_color_uv()
    }
}

impl VertexLayout {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self { attributes }
    }

    /// `a_pos`, `a_normal`, `a_color`, `a_uv`.
    pub fn position_normal_color_uv() -> Self {
        Self::new(vec![
            VertexAttribute::new("a_pos", AttributeKind::Position),
            VertexAttribute::new("a_normal", AttributeKind::Normal),
            VertexAttribute::new("a_color", AttributeKind::Color),
            VertexAttribute::new("a_uv", AttributeKind::TexCoord),
        ])
    }

    /// `a_pos`, `a_normal`, `a_color`.
    pub fn position_normal_color() -> Self {
        Self::new(vec![
            VertexAttribute::new("a_pos", AttributeKind::Position),
            VertexAttribute::new("a_normal", AttributeKind::Normal),
            VertexAttribute::new("a_color", AttributeKind::Color),
        ])
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Floats per vertex.
    pub fn stride(&self) -> usize {
        self.attributes.iter().map(|a| a.kind.components()).sum()
    }

    pub fn stride_bytes(&self) -> usize {
        self.stride() * std::mem::size_of::<f32>()
    }

    /// Float offset of each attribute within a vertex, in layout order.
    pub fn offsets(&self) -> impl Iterator<Item = (&VertexAttribute, usize)> + '_ {
        self.attributes.iter().scan(0, |offset, attribute| {
            let this = *offset;
            *offset += attribute.kind.components();
            Some((attribute, this))
        })
    }
}
