//! Boundary to the graphics device.
//!
//! The crate never talks to a graphics API directly. It produces vertex data
//! and matrices and hands them to a [`Renderer`] the embedding application
//! implements. Attribute and uniform locations are looked up through a
//! [`ShaderRegistry`] built for one compiled shader program and passed
//! explicitly to whatever binds against it.

use std::collections::HashMap;

use log::{debug, warn};

use crate::error::BindError;
use crate::math::{mat3::Mat3, mat4::Mat4, vec2::Vec2, vec3::Vec3, vec4::Vec4};
use crate::mesh::VertexLayout;

/// Opaque handle to a buffer owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u32);

/// Location of a vertex attribute in a shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttributeLocation(pub u32);

/// Location of a uniform in a shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Where one attribute lives inside an interleaved `f32` vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeBinding {
    pub location: AttributeLocation,
    pub components: usize,
    pub stride_bytes: usize,
    pub offset_bytes: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformVector {
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
}

/// Operations the embedding graphics backend provides.
///
/// Matrices are passed in storage order and can be uploaded without a
/// transpose flag.
pub trait Renderer {
    fn upload_vertex_buffer(&mut self, data: &[f32]) -> BufferHandle;
    fn upload_index_buffer(&mut self, indices: &[u32]) -> BufferHandle;
    fn bind_vertex_buffer(&mut self, buffer: BufferHandle, attributes: &[AttributeBinding]);
    fn bind_index_buffer(&mut self, buffer: BufferHandle);
    fn bind_uniform_matrix(&mut self, location: UniformLocation, matrix: &Mat4);
    fn bind_uniform_matrix3(&mut self, location: UniformLocation, matrix: &Mat3);
    fn bind_uniform_vector(&mut self, location: UniformLocation, value: UniformVector);
    /// Draw `count` indices from the bound index buffer as triangles.
    fn draw_indexed(&mut self, count: usize);
}

// ============ Shader Declarations ============

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Qualifier {
    In,
    Uniform,
}

/// One `in` or `uniform` declaration found in shader source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub qualifier: Qualifier,
    pub glsl_type: String,
    pub name: String,
}

/// Scan GLSL source for top-level `in` and `uniform` declarations.
///
/// `layout(...)` qualifiers, precision qualifiers, array suffixes and line
/// comments are ignored. One declaration per line.
pub fn parse_declarations(source: &str) -> Vec<Declaration> {
    source.lines().filter_map(parse_declaration).collect()
}

fn parse_declaration(line: &str) -> Option<Declaration> {
    let line = line.split("//").next().unwrap_or_default();
    let line = strip_layout(line);
    let statement = line.trim().strip_suffix(';')?;

    let mut tokens = statement.split_whitespace();
    let qualifier = match tokens.next()? {
        "in" => Qualifier::In,
        "uniform" => Qualifier::Uniform,
        _ => return None,
    };
    let rest: Vec<&str> = tokens
        .filter(|t| !matches!(*t, "lowp" | "mediump" | "highp"))
        .collect();
    let [glsl_type, name] = rest.as_slice() else {
        return None;
    };
    let name = name.split('[').next().unwrap_or_default();

    Some(Declaration {
        qualifier,
        glsl_type: glsl_type.to_string(),
        name: name.to_string(),
    })
}

fn strip_layout(line: &str) -> String {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix("layout") {
        if let Some(close) = rest.find(')') {
            return rest[close + 1..].to_string();
        }
    }
    trimmed.to_string()
}

// ============ Registry ============

/// Attribute and uniform locations of one compiled shader program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderRegistry {
    attributes: HashMap<String, AttributeLocation>,
    uniforms: HashMap<String, UniformLocation>,
}

impl ShaderRegistry {
    /// Build from vertex shader source.
    ///
    /// `resolve` maps each declaration to the location the compiled program
    /// reports for it. An attribute the program does not expose is skipped;
    /// an unresolved uniform is an error.
    pub fn from_source<F>(vertex_source: &str, mut resolve: F) -> Result<Self, BindError>
    where
        F: FnMut(Qualifier, &str) -> Option<u32>,
    {
        let mut registry = Self::default();

        for decl in parse_declarations(vertex_source) {
            match (decl.qualifier, resolve(decl.qualifier, &decl.name)) {
                (Qualifier::In, Some(loc)) => {
                    registry.attributes.insert(decl.name, AttributeLocation(loc));
                }
                (Qualifier::In, None) => {
                    warn!("attribute `{}` is not active in the program", decl.name);
                }
                (Qualifier::Uniform, Some(loc)) => {
                    registry.uniforms.insert(decl.name, UniformLocation(loc));
                }
                (Qualifier::Uniform, None) => {
                    return Err(BindError::UnknownIdentifier(decl.name));
                }
            }
        }

        debug!(
            "shader registry: {} attributes, {} uniforms",
            registry.attributes.len(),
            registry.uniforms.len()
        );
        Ok(registry)
    }

    pub fn attribute(&self, name: &str) -> Result<AttributeLocation, BindError> {
        self.attributes
            .get(name)
            .copied()
            .ok_or_else(|| BindError::UnknownIdentifier(name.to_string()))
    }

    pub fn uniform(&self, name: &str) -> Result<UniformLocation, BindError> {
        self.uniforms
            .get(name)
            .copied()
            .ok_or_else(|| BindError::UnknownIdentifier(name.to_string()))
    }

    pub fn has_uniform(&self, name: &str) -> bool {
        self.uniforms.contains_key(name)
    }

    /// Resolve every attribute of `layout` to a binding. Fails on the first
    /// name the program does not declare.
    pub fn bindings(&self, layout: &VertexLayout) -> Result<Vec<AttributeBinding>, BindError> {
        let stride_bytes = layout.stride_bytes();
        layout
            .offsets()
            .map(|(attribute, offset)| {
                Ok(AttributeBinding {
                    location: self.attribute(&attribute.name)?,
                    components: attribute.kind.components(),
                    stride_bytes,
                    offset_bytes: offset * std::mem::size_of::<f32>(),
                })
            })
            .collect()
    }

    pub fn bind_matrix(
        &self,
        renderer: &mut dyn Renderer,
        name: &str,
        matrix: &Mat4,
    ) -> Result<(), BindError> {
        renderer.bind_uniform_matrix(self.uniform(name)?, matrix);
        Ok(())
    }

    pub fn bind_matrix3(
        &self,
        renderer: &mut dyn Renderer,
        name: &str,
        matrix: &Mat3,
    ) -> Result<(), BindError> {
        renderer.bind_uniform_matrix3(self.uniform(name)?, matrix);
        Ok(())
    }

    pub fn bind_vector(
        &self,
        renderer: &mut dyn Renderer,
        name: &str,
        value: UniformVector,
    ) -> Result<(), BindError> {
        renderer.bind_uniform_vector(self.uniform(name)?, value);
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::recording::{registry, Call, RecordingRenderer, VERTEX_SHADER};
    use super::*;

    #[test]
    fn declarations_strip_layout_and_qualifiers() {
        let decls = parse_declarations(VERTEX_SHADER);
        assert_eq!(decls.len(), 8);
        assert_eq!(
            decls[0],
            Declaration {
                qualifier: Qualifier::In,
                glsl_type: "vec3".into(),
                name: "a_pos".into(),
            }
        );
        assert_eq!(decls[5].qualifier, Qualifier::Uniform);
        assert_eq!(decls[5].name, "u_normal");
        assert!(decls.iter().all(|d| d.name != "v_color"));
    }

    #[test]
    fn precision_arrays_and_comments() {
        let src = "uniform highp mat4 u_bones[4]; // skinning\n// uniform mat4 u_gone;\nin vec2 a_uv;\n";
        let decls = parse_declarations(src);
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].name, "u_bones");
        assert_eq!(decls[0].glsl_type, "mat4");
        assert_eq!(decls[1].qualifier, Qualifier::In);
    }

    #[test]
    fn registry_resolves_known_names() {
        let registry = registry();
        assert_eq!(registry.attribute("a_pos"), Ok(AttributeLocation(0)));
        assert_eq!(registry.uniform("u_model"), Ok(UniformLocation(4)));
        assert!(registry.has_uniform("u_normal"));
    }

    #[test]
    fn unknown_names_fail() {
        let registry = registry();
        assert_eq!(
            registry.uniform("u_missing"),
            Err(BindError::UnknownIdentifier("u_missing".into()))
        );
        assert!(registry.attribute("u_model").is_err());

        let mut renderer = RecordingRenderer::default();
        assert!(registry
            .bind_matrix(&mut renderer, "u_missing", &Mat4::identity())
            .is_err());
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn unresolved_uniform_is_an_error() {
        let result = ShaderRegistry::from_source("uniform mat4 u_model;\n", |_, _| None);
        assert_eq!(result, Err(BindError::UnknownIdentifier("u_model".into())));
    }

    #[test]
    fn inactive_attribute_is_skipped() {
        let registry = ShaderRegistry::from_source("in vec3 a_pos;\n", |_, _| None).unwrap();
        assert!(registry.attribute("a_pos").is_err());
    }

    #[test]
    fn layout_bindings() {
        let bindings = registry()
            .bindings(&VertexLayout::position_normal_color_uv())
            .unwrap();
        assert_eq!(bindings.len(), 4);
        assert_eq!(
            bindings[2],
            AttributeBinding {
                location: AttributeLocation(2),
                components: 4,
                stride_bytes: 48,
                offset_bytes: 24,
            }
        );
    }

    #[test]
    fn bind_forwards_to_renderer() {
        let registry = registry();
        let mut renderer = RecordingRenderer::default();
        registry
            .bind_vector(&mut renderer, "u_proj", UniformVector::Vec3(Vec3::ONE))
            .unwrap();
        assert_eq!(
            renderer.calls,
            vec![Call::Vector(UniformLocation(7), UniformVector::Vec3(Vec3::ONE))]
        );
    }
}
