//! Error types for mesh loading, matrix math and shader binding.

use thiserror::Error;

/// Errors produced by the matrix/vector library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("matrix is singular (determinant {determinant:e})")]
    SingularMatrix { determinant: f32 },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A malformed or incomplete mesh description. Fatal to that mesh only.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("missing `end_header` marker")]
    MissingEndHeader,

    #[error("header does not declare vertex property `{0}`")]
    MissingPositionProperty(&'static str),

    #[error("line {line}: malformed header line `{text}`")]
    MalformedHeader { line: usize, text: String },

    #[error("line {line}: `{token}` is not a valid number")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: expected at least {expected} columns, found {found}")]
    MissingColumn {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("expected {expected} vertex lines, found {found}")]
    TruncatedVertices { expected: usize, found: usize },

    #[error("line {line}: face references vertex {index} but only {vertex_count} exist")]
    IndexOutOfRange {
        line: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Non-fatal conditions noticed while parsing. Logged and collected.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseWarning {
    /// The header declares a non-ASCII encoding; parsing continued best-effort.
    UnsupportedFormat(String),
    /// A face line with fewer than three vertices was skipped.
    DegenerateFace { line: usize },
    /// The body held a different number of faces than the header declared.
    FaceCountMismatch { declared: usize, found: usize },
    /// A header line with an unrecognized keyword was skipped.
    UnknownHeaderLine { line: usize, keyword: String },
}

impl std::fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseWarning::UnsupportedFormat(format) => {
                write!(f, "file format is not ascii, {format} format not supported")
            }
            ParseWarning::DegenerateFace { line } => {
                write!(f, "line {line}: face with fewer than 3 vertices skipped")
            }
            ParseWarning::FaceCountMismatch { declared, found } => {
                write!(f, "header declared {declared} faces, body has {found}")
            }
            ParseWarning::UnknownHeaderLine { line, keyword } => {
                write!(f, "line {line}: unknown header keyword `{keyword}` skipped")
            }
        }
    }
}

/// A bind targeted a name the compiled shader program does not declare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("`{0}` is not an attribute or uniform of this shader program")]
    UnknownIdentifier(String),

    #[error("entity `{0}` has no uploaded mesh")]
    NotUploaded(String),
}

/// Errors from loading assets off disk.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("invalid mesh: {0}")]
    InvalidMesh(String),
}

/// Errors from a render pass.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Math(#[from] MathError),
}
