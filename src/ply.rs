//! ASCII PLY mesh parser.
//!
//! The header is scanned up to `end_header` to learn the vertex and face counts
//! and the column of each vertex property. The body is then read as exactly
//! `element vertex` lines of whitespace-separated numbers, followed by face
//! lines of the form `<count> <i0> <i1> ...`. Polygons with more than three
//! corners are fan-split into triangles.
//!
//! ```
//! use meshwork::ply;
//!
//! let text = "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\n\
//!             property float y\nproperty float z\nelement face 1\n\
//!             property list uchar int vertex_indices\nend_header\n\
//!             0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
//! let mesh = ply::parse(text).unwrap();
//! assert_eq!(mesh.indices(), &[0, 1, 2]);
//! ```

use log::{debug, warn};

use crate::error::{ParseError, ParseWarning};
use crate::math::{vec2::Vec2, vec3::Vec3, vec4::Vec4};
use crate::mesh::Mesh;
use crate::normals::{estimate_normals, estimate_unit_normals};

/// Knobs for [`parse_with_options`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Rescale positions so the largest absolute coordinate is exactly 1.
    pub normalize_to_unit: bool,
    /// Renormalize averaged vertex normals to unit length.
    pub renormalize_normals: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            normalize_to_unit: true,
            renormalize_normals: false,
        }
    }
}

/// Declared body encoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlyFormat {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
    Other(String),
}

impl PlyFormat {
    fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_lowercase().as_str() {
            "ascii" => PlyFormat::Ascii,
            "binary_little_endian" => PlyFormat::BinaryLittleEndian,
            "binary_big_endian" => PlyFormat::BinaryBigEndian,
            _ => PlyFormat::Other(keyword.to_string()),
        }
    }
}

/// Scalar types a PLY property may declare, under either naming scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarType {
    Char,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
}

impl ScalarType {
    fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "char" | "int8" => ScalarType::Char,
            "uchar" | "uint8" => ScalarType::UChar,
            "short" | "int16" => ScalarType::Short,
            "ushort" | "uint16" => ScalarType::UShort,
            "int" | "int32" => ScalarType::Int,
            "uint" | "uint32" => ScalarType::UInt,
            "float" | "float32" => ScalarType::Float,
            "double" | "float64" => ScalarType::Double,
            _ => return None,
        })
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, ScalarType::Float | ScalarType::Double)
    }
}

/// A scalar property of the vertex element. Its column is its index in
/// [`PlyHeader::vertex_properties`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VertexProperty {
    pub name: String,
    pub scalar: ScalarType,
}

/// Everything learned from the header block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlyHeader {
    pub format: PlyFormat,
    pub version: String,
    pub comments: Vec<String>,
    pub vertex_count: usize,
    pub face_count: usize,
    pub vertex_properties: Vec<VertexProperty>,
}

impl Default for PlyHeader {
    fn default() -> Self {
        Self {
            format: PlyFormat::Ascii,
            version: String::from("1.0"),
            comments: Vec::new(),
            vertex_count: 0,
            face_count: 0,
            vertex_properties: Vec::new(),
        }
    }
}

impl PlyHeader {
    /// Column of the first property matching any of `names`.
    fn column(&self, names: &[&str]) -> Option<(usize, ScalarType)> {
        self.vertex_properties
            .iter()
            .position(|p| names.contains(&p.name.as_str()))
            .map(|i| (i, self.vertex_properties[i].scalar))
    }
}

/// Result of [`parse_with_options`].
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedPly {
    pub mesh: Mesh,
    pub header: PlyHeader,
    pub warnings: Vec<ParseWarning>,
}

/// Parse with default options and keep only the mesh.
pub fn parse(text: &str) -> Result<Mesh, ParseError> {
    parse_with_options(text, &ParseOptions::default()).map(|parsed| parsed.mesh)
}

pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<ParsedPly, ParseError> {
    let mut warnings = Vec::new();
    let mut lines = text.lines().enumerate().map(|(i, line)| (i + 1, line.trim()));

    let header = parse_header(&mut lines, &mut warnings)?;
    let columns = Columns::resolve(&header)?;

    // ============ Vertices ============

    // Declared counts are untrusted; buffers grow with the rows actually read.
    let mut vertices = Vec::new();
    let mut colors = Vec::new();
    let mut uvs = Vec::new();

    let mut body = lines.filter(|(_, line)| !line.is_empty());
    for (line_no, line) in body.by_ref().take(header.vertex_count) {
        let row = parse_row(line_no, line, header.vertex_properties.len())?;

        vertices.push(Vec3::new(
            row[columns.position[0]],
            row[columns.position[1]],
            row[columns.position[2]],
        ));
        colors.push(columns.color(&row));
        if let Some([u, v]) = columns.uv {
            uvs.push(Vec2::new(row[u], row[v]));
        }
    }
    if vertices.len() < header.vertex_count {
        return Err(ParseError::TruncatedVertices {
            expected: header.vertex_count,
            found: vertices.len(),
        });
    }

    // ============ Faces ============

    let mut indices = Vec::new();
    let mut faces = 0;
    for (line_no, line) in body {
        faces += 1;
        let corners = parse_face(line_no, line, vertices.len())?;
        if corners.len() < 3 {
            warn!("line {line_no}: skipping face with {} vertices", corners.len());
            warnings.push(ParseWarning::DegenerateFace { line: line_no });
            continue;
        }
        for pair in corners[1..].windows(2) {
            indices.extend_from_slice(&[corners[0], pair[0], pair[1]]);
        }
    }
    if faces != header.face_count {
        warn!(
            "header declared {} faces, found {faces}",
            header.face_count
        );
        warnings.push(ParseWarning::FaceCountMismatch {
            declared: header.face_count,
            found: faces,
        });
    }

    // ============ Post-processing ============

    if options.normalize_to_unit {
        normalize_to_unit(&mut vertices);
    }
    let normals = if options.renormalize_normals {
        estimate_unit_normals(&vertices, &indices)
    } else {
        estimate_normals(&vertices, &indices)
    };

    debug!(
        "parsed PLY: {} vertices, {} triangles, {} warnings",
        vertices.len(),
        indices.len() / 3,
        warnings.len()
    );

    Ok(ParsedPly {
        mesh: Mesh::from_checked_parts(vertices, indices, colors, uvs, normals),
        header,
        warnings,
    })
}

#[derive(PartialEq)]
enum Element {
    Pending,
    Vertex,
    Face,
    Other,
}

fn parse_header<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    warnings: &mut Vec<ParseWarning>,
) -> Result<PlyHeader, ParseError> {
    let mut header = PlyHeader::default();
    let mut element = Element::Pending;

    for (line_no, line) in lines.by_ref() {
        let malformed = || ParseError::MalformedHeader {
            line: line_no,
            text: line.to_string(),
        };
        let mut tokens = line.split_whitespace();

        match tokens.next() {
            None | Some("ply") | Some("obj_info") => {}
            Some("end_header") => return Ok(header),
            Some("comment") => {
                let comment = line["comment".len()..].trim();
                header.comments.push(comment.to_string());
            }
            Some("format") => {
                let keyword = tokens.next().ok_or_else(malformed)?;
                header.format = PlyFormat::from_keyword(keyword);
                if let Some(version) = tokens.next() {
                    header.version = version.to_string();
                }
                if header.format != PlyFormat::Ascii {
                    warn!("file format is not ascii, {keyword} format not supported");
                    warnings.push(ParseWarning::UnsupportedFormat(keyword.to_string()));
                }
            }
            Some("element") => {
                let name = tokens.next().ok_or_else(malformed)?;
                let count = tokens
                    .next()
                    .and_then(|c| c.parse::<usize>().ok())
                    .ok_or_else(malformed)?;
                element = match name {
                    "vertex" => {
                        header.vertex_count = count;
                        Element::Vertex
                    }
                    "face" => {
                        header.face_count = count;
                        Element::Face
                    }
                    _ => Element::Other,
                };
            }
            Some("property") => {
                let kind = tokens.next().ok_or_else(malformed)?;
                if element != Element::Vertex {
                    continue;
                }
                // Vertex lines have a fixed column count; a list would make it variable.
                if kind == "list" {
                    return Err(malformed());
                }
                let scalar = ScalarType::from_keyword(kind).ok_or_else(malformed)?;
                let name = tokens.next().ok_or_else(malformed)?;
                header.vertex_properties.push(VertexProperty {
                    name: name.to_string(),
                    scalar,
                });
            }
            Some(keyword) => {
                warn!("line {line_no}: skipping unknown header keyword `{keyword}`");
                warnings.push(ParseWarning::UnknownHeaderLine {
                    line: line_no,
                    keyword: keyword.to_string(),
                });
            }
        }
    }

    Err(ParseError::MissingEndHeader)
}

/// Column positions of the properties the mesh cares about.
struct Columns {
    position: [usize; 3],
    color: Option<([usize; 3], Option<usize>, f32)>,
    uv: Option<[usize; 2]>,
}

impl Columns {
    fn resolve(header: &PlyHeader) -> Result<Self, ParseError> {
        let axis = |name: &'static str| {
            header
                .column(&[name])
                .map(|(c, _)| c)
                .ok_or(ParseError::MissingPositionProperty(name))
        };
        let position = [axis("x")?, axis("y")?, axis("z")?];

        let color = match (
            header.column(&["r", "red"]),
            header.column(&["g", "green"]),
            header.column(&["b", "blue"]),
        ) {
            (Some((r, scalar)), Some((g, _)), Some((b, _))) => {
                let alpha = header.column(&["alpha", "a"]).map(|(c, _)| c);
                let scale = if scalar.is_integer() { 1.0 / 255.0 } else { 1.0 };
                Some(([r, g, b], alpha, scale))
            }
            _ => None,
        };

        let uv = match (
            header.column(&["u", "s", "texture_u"]),
            header.column(&["v", "t", "texture_v"]),
        ) {
            (Some((u, _)), Some((v, _))) => Some([u, v]),
            _ => None,
        };

        Ok(Self {
            position,
            color,
            uv,
        })
    }

    fn color(&self, row: &[f32]) -> Vec4 {
        match self.color {
            Some(([r, g, b], alpha, scale)) => Vec4::new(
                row[r] * scale,
                row[g] * scale,
                row[b] * scale,
                alpha.map_or(1.0, |a| row[a] * scale),
            ),
            None => Vec4::WHITE,
        }
    }
}

fn parse_row(line_no: usize, line: &str, expected: usize) -> Result<Vec<f32>, ParseError> {
    let row = line
        .split_whitespace()
        .map(|token| {
            token.parse::<f32>().map_err(|_| ParseError::InvalidNumber {
                line: line_no,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<f32>, _>>()?;

    if row.len() < expected {
        return Err(ParseError::MissingColumn {
            line: line_no,
            expected,
            found: row.len(),
        });
    }
    Ok(row)
}

fn parse_face(line_no: usize, line: &str, vertex_count: usize) -> Result<Vec<u32>, ParseError> {
    let mut tokens = line.split_whitespace();
    let invalid = |token: &str| ParseError::InvalidNumber {
        line: line_no,
        token: token.to_string(),
    };

    let count_token = tokens.next().unwrap_or_default();
    let count: usize = count_token.parse().map_err(|_| invalid(count_token))?;

    let corners = tokens
        .take(count)
        .map(|token| {
            let index: u32 = token.parse().map_err(|_| invalid(token))?;
            if index as usize >= vertex_count {
                return Err(ParseError::IndexOutOfRange {
                    line: line_no,
                    index,
                    vertex_count,
                });
            }
            Ok(index)
        })
        .collect::<Result<Vec<u32>, _>>()?;

    if corners.len() < count {
        return Err(ParseError::MissingColumn {
            line: line_no,
            expected: count + 1,
            found: corners.len() + 1,
        });
    }
    Ok(corners)
}

/// Uniformly rescale so the largest absolute coordinate becomes 1.
fn normalize_to_unit(vertices: &mut [Vec3]) {
    let max = vertices.iter().map(Vec3::max_abs).fold(0.0f32, f32::max);
    if max == 0.0 {
        return;
    }
    let scale = 1.0 / max;
    for v in vertices.iter_mut() {
        *v = *v * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const TRIANGLE: &str = "ply
format ascii 1.0
comment made by hand
element vertex 3
property float x
property float y
property float z
element face 1
property list uchar int vertex_indices
end_header
0 0 0
1 0 0
0 1 0
3 0 1 2
";

    fn with_body(properties: &str, vertex_count: usize, face_count: usize, body: &str) -> String {
        format!(
            "ply\nformat ascii 1.0\nelement vertex {vertex_count}\n{properties}\
             element face {face_count}\nproperty list uchar int vertex_indices\nend_header\n{body}"
        )
    }

    const XYZ: &str = "property float x\nproperty float y\nproperty float z\n";

    #[test]
    fn minimal_triangle() {
        let mesh = parse(TRIANGLE).unwrap();
        assert_eq!(mesh.positions_flat().len(), 9);
        assert_eq!(mesh.indices(), &[0, 1, 2]);
        for n in mesh.normals() {
            assert_relative_eq!(*n, Vec3::new(0.0, 0.0, 1.0));
        }
        assert_eq!(mesh.colors(), &[Vec4::WHITE; 3]);
        assert!(!mesh.has_uvs());
    }

    #[test]
    fn header_is_recorded() {
        let parsed = parse_with_options(TRIANGLE, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.header.format, PlyFormat::Ascii);
        assert_eq!(parsed.header.comments, vec!["made by hand".to_string()]);
        assert_eq!(parsed.header.vertex_count, 3);
        assert_eq!(parsed.header.face_count, 1);
        assert_eq!(parsed.header.vertex_properties.len(), 3);
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn quad_fan_splits() {
        let text = with_body(XYZ, 4, 1, "0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3\n");
        let mesh = parse(&text).unwrap();
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn pentagon_fan_splits() {
        let text = with_body(XYZ, 5, 1, "0 0 0\n1 0 0\n2 1 0\n1 2 0\n0 1 0\n5 0 1 2 3 4\n");
        let mesh = parse(&text).unwrap();
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3, 0, 3, 4]);
    }

    #[test]
    fn positions_are_normalized_to_unit() {
        let text = with_body(XYZ, 3, 1, "0 0 0\n4 0 0\n0 -8 2\n3 0 1 2\n");
        let mesh = parse(&text).unwrap();
        assert_eq!(mesh.vertices()[1], Vec3::new(0.5, 0.0, 0.0));
        assert_eq!(mesh.vertices()[2], Vec3::new(0.0, -1.0, 0.25));

        let raw = parse_with_options(
            &text,
            &ParseOptions {
                normalize_to_unit: false,
                ..ParseOptions::default()
            },
        )
        .unwrap();
        assert_eq!(raw.mesh.vertices()[1], Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn all_zero_mesh_is_left_alone() {
        let text = with_body(XYZ, 3, 1, "0 0 0\n0 0 0\n0 0 0\n3 0 1 2\n");
        let mesh = parse(&text).unwrap();
        assert!(mesh.vertices().iter().all(|v| *v == Vec3::ZERO));
    }

    #[test]
    fn columns_follow_declaration_order() {
        let props = "property float nx\nproperty float z\nproperty float y\nproperty float x\n";
        let text = with_body(props, 3, 1, "9 0 0 0\n9 0 0 1\n9 0 1 0\n3 0 1 2\n");
        let mesh = parse(&text).unwrap();
        assert_eq!(mesh.vertices()[1], Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.vertices()[2], Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn integer_colors_are_scaled() {
        let props = format!(
            "{XYZ}property uchar red\nproperty uchar green\nproperty uchar blue\nproperty uchar alpha\n"
        );
        let body = "0 0 0 255 0 0 255\n1 0 0 0 255 0 255\n0 1 0 0 0 255 0\n3 0 1 2\n";
        let mesh = parse(&with_body(&props, 3, 1, body)).unwrap();
        assert_relative_eq!(mesh.colors()[0], Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_relative_eq!(mesh.colors()[2], Vec4::new(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn float_colors_and_uvs() {
        let props = format!(
            "{XYZ}property float r\nproperty float g\nproperty float b\nproperty float u\nproperty float v\n"
        );
        let body = "0 0 0 0.5 0.5 0.5 0 0\n1 0 0 1 0 0 1 0\n0 1 0 0 1 0 0 1\n3 0 1 2\n";
        let mesh = parse(&with_body(&props, 3, 1, body)).unwrap();
        assert_relative_eq!(mesh.colors()[0], Vec4::new(0.5, 0.5, 0.5, 1.0));
        assert_eq!(mesh.uvs(), &[Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = with_body(XYZ, 3, 1, "\n0 0 0\n\n1 0 0\n0 1 0\n\n3 0 1 2\n\n");
        assert_eq!(parse(&text).unwrap().vertex_count(), 3);
    }

    #[test]
    fn missing_position_property() {
        let props = "property float x\nproperty float y\n";
        let err = parse(&with_body(props, 1, 0, "0 0\n")).unwrap_err();
        assert_eq!(err, ParseError::MissingPositionProperty("z"));
    }

    #[test]
    fn missing_end_header() {
        let err = parse("ply\nformat ascii 1.0\nelement vertex 0\n").unwrap_err();
        assert_eq!(err, ParseError::MissingEndHeader);
    }

    #[test]
    fn index_out_of_range() {
        let text = with_body(XYZ, 3, 1, "0 0 0\n1 0 0\n0 1 0\n3 0 1 7\n");
        assert!(matches!(
            parse(&text),
            Err(ParseError::IndexOutOfRange { index: 7, vertex_count: 3, .. })
        ));
    }

    #[test]
    fn truncated_vertex_block() {
        let text = with_body(XYZ, 3, 0, "0 0 0\n1 0 0\n");
        assert_eq!(
            parse(&text).unwrap_err(),
            ParseError::TruncatedVertices { expected: 3, found: 2 }
        );
    }

    #[test]
    fn huge_declared_vertex_count_is_an_error() {
        let text = with_body(XYZ, usize::MAX, 0, "0 0 0\n");
        assert_eq!(
            parse(&text).unwrap_err(),
            ParseError::TruncatedVertices { expected: usize::MAX, found: 1 }
        );
    }

    #[test]
    fn huge_declared_face_count_only_warns() {
        let text = with_body(XYZ, 3, usize::MAX / 2, "0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n");
        let parsed = parse_with_options(&text, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.mesh.indices(), &[0, 1, 2]);
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::FaceCountMismatch { declared: usize::MAX / 2, found: 1 }]
        );
    }

    #[test]
    fn unknown_header_keyword_warns_and_continues() {
        let text = TRIANGLE.replace("end_header", "vendor_hint fast\nend_header");
        let parsed = parse_with_options(&text, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.mesh.indices(), &[0, 1, 2]);
        assert!(matches!(
            parsed.warnings.as_slice(),
            [ParseWarning::UnknownHeaderLine { keyword, .. }] if keyword == "vendor_hint"
        ));
    }

    #[test]
    fn bad_number_reports_line() {
        let text = with_body(XYZ, 3, 1, "0 0 0\n1 zero 0\n0 1 0\n3 0 1 2\n");
        assert_eq!(
            parse(&text).unwrap_err(),
            ParseError::InvalidNumber { line: 11, token: "zero".into() }
        );
    }

    #[test]
    fn short_vertex_line() {
        let text = with_body(XYZ, 3, 1, "0 0 0\n1 0\n0 1 0\n3 0 1 2\n");
        assert!(matches!(
            parse(&text),
            Err(ParseError::MissingColumn { expected: 3, found: 2, .. })
        ));
    }

    #[test]
    fn non_ascii_format_warns_and_continues() {
        let text = TRIANGLE.replace("format ascii 1.0", "format binary_little_endian 1.0");
        let parsed = parse_with_options(&text, &ParseOptions::default()).unwrap();
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::UnsupportedFormat("binary_little_endian".into())]
        );
        assert_eq!(parsed.mesh.indices(), &[0, 1, 2]);
    }

    #[test]
    fn degenerate_faces_are_skipped() {
        let text = with_body(XYZ, 3, 2, "0 0 0\n1 0 0\n0 1 0\n2 0 1\n3 0 1 2\n");
        let parsed = parse_with_options(&text, &ParseOptions::default()).unwrap();
        assert_eq!(parsed.mesh.indices(), &[0, 1, 2]);
        assert_eq!(parsed.warnings, vec![ParseWarning::DegenerateFace { line: 13 }]);
    }

    #[test]
    fn face_count_mismatch_warns() {
        let text = with_body(XYZ, 3, 2, "0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n");
        let parsed = parse_with_options(&text, &ParseOptions::default()).unwrap();
        assert_eq!(
            parsed.warnings,
            vec![ParseWarning::FaceCountMismatch { declared: 2, found: 1 }]
        );
    }

    #[test]
    fn renormalize_option() {
        // Folded pair facing +z and +y: vertex 0 sits on both faces.
        let text = with_body(
            XYZ,
            4,
            2,
            "0 0 0\n1 0 0\n0 1 0\n0 0 -1\n3 0 1 2\n3 0 1 3\n",
        );
        let plain = parse(&text).unwrap();
        assert!(plain.normals()[0].magnitude() < 0.9);

        let unit = parse_with_options(
            &text,
            &ParseOptions {
                renormalize_normals: true,
                ..ParseOptions::default()
            },
        )
        .unwrap();
        assert_relative_eq!(unit.mesh.normals()[0].magnitude(), 1.0, epsilon = 1e-6);
    }
}
