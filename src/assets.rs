//! Loading text and images for scene setup.
//!
//! Everything is loaded synchronously, once, before entities enter the scene.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::LoadError;
use crate::mesh::Mesh;
use crate::ply::{self, ParseOptions};

/// Decoded image, 8-bit RGBA, rows top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// RGBA of the pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        let p = self.pixels.get(i..i + 4)?;
        Some([p[0], p[1], p[2], p[3]])
    }
}

/// Where scene assets come from.
pub trait AssetSource {
    fn load_text(&self, path: &str) -> Result<String, LoadError>;
    fn load_image(&self, path: &str) -> Result<ImageData, LoadError>;
}

/// Reads assets from a directory on disk.
#[derive(Clone, Debug)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssets {
    fn load_text(&self, path: &str) -> Result<String, LoadError> {
        let full = self.root.join(path);
        let text = std::fs::read_to_string(&full)?;
        debug!("loaded {} ({} bytes)", full.display(), text.len());
        Ok(text)
    }

    fn load_image(&self, path: &str) -> Result<ImageData, LoadError> {
        let full = self.root.join(path);
        let img = image::open(&full)?.to_rgba8();
        let (width, height) = img.dimensions();
        debug!("loaded {} ({width}x{height})", full.display());
        Ok(ImageData {
            width,
            height,
            pixels: img.into_raw(),
        })
    }
}

/// Load and parse a PLY mesh with default options.
pub fn load_ply(source: &dyn AssetSource, path: &str) -> Result<Mesh, LoadError> {
    load_ply_with_options(source, path, &ParseOptions::default())
}

pub fn load_ply_with_options(
    source: &dyn AssetSource,
    path: &str,
    options: &ParseOptions,
) -> Result<Mesh, LoadError> {
    let text = source.load_text(path)?;
    let parsed = ply::parse_with_options(&text, options)?;
    Ok(parsed.mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use std::collections::HashMap;

    /// In-memory asset source.
    struct Memory(HashMap<&'static str, &'static str>);

    impl AssetSource for Memory {
        fn load_text(&self, path: &str) -> Result<String, LoadError> {
            self.0.get(path).map(|s| s.to_string()).ok_or_else(|| {
                LoadError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string()))
            })
        }

        fn load_image(&self, _path: &str) -> Result<ImageData, LoadError> {
            Ok(ImageData {
                width: 1,
                height: 1,
                pixels: vec![255; 4],
            })
        }
    }

    const TRIANGLE: &str = "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\n\
                            property float y\nproperty float z\nelement face 1\n\
                            property list uchar int vertex_indices\nend_header\n\
                            0 0 0\n2 0 0\n0 2 0\n3 0 1 2\n";

    #[test]
    fn load_ply_through_source() {
        let source = Memory(HashMap::from([("tri.ply", TRIANGLE)]));
        let mesh = load_ply(&source, "tri.ply").unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.vertices()[1].x, 1.0);
    }

    #[test]
    fn missing_asset_is_io_error() {
        let source = Memory(HashMap::new());
        assert!(matches!(load_ply(&source, "nope.ply"), Err(LoadError::Io(_))));
    }

    #[test]
    fn parse_errors_are_wrapped() {
        let source = Memory(HashMap::from([("bad.ply", "ply\nformat ascii 1.0\n")]));
        assert!(matches!(
            load_ply(&source, "bad.ply"),
            Err(LoadError::Parse(ParseError::MissingEndHeader))
        ));
    }

    #[test]
    fn fs_assets_round_trip_an_image() {
        let dir = std::env::temp_dir().join(format!("meshwork-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let img = image::RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 {
                image::Rgba([255, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 255, 128])
            }
        });
        img.save(dir.join("tex.png")).unwrap();
        std::fs::write(dir.join("note.txt"), "hello").unwrap();

        let assets = FsAssets::new(&dir);
        let data = assets.load_image("tex.png").unwrap();
        assert_eq!((data.width, data.height), (2, 1));
        assert_eq!(data.pixel(1, 0), Some([0, 0, 255, 128]));
        assert_eq!(data.pixel(2, 0), None);
        assert_eq!(assets.load_text("note.txt").unwrap(), "hello");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
