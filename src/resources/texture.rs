//! Texture loading
//!
//! [`CubeMapData`] assembles the six faces of the environment cube on the CPU,
//! including its mip chain. Uploading is left to the renderer.

use std::path::Path;

use image::{imageops, DynamicImage, GenericImageView, RgbaImage};

use crate::error::{ViewerError, ViewerResult};

/// Decoded RGBA8 image
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub name: String,
}

impl TextureData {
    /// Load texture from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ViewerResult<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let img = image::open(path).map_err(|e| ViewerError::asset(path, e))?;
        Ok(Self::from_image(img, &name))
    }

    /// Load texture from encoded bytes
    pub fn from_bytes(bytes: &[u8], name: &str) -> ViewerResult<Self> {
        let img = image::load_from_memory(bytes)?;
        Ok(Self::from_image(img, name))
    }

    fn from_image(img: DynamicImage, name: &str) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.to_rgba8().into_raw(),
            name: name.to_string(),
        }
    }

    /// Create a solid color texture
    pub fn solid_color(width: u32, height: u32, color: [u8; 4], name: &str) -> Self {
        let data = color
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self {
            width,
            height,
            data,
            name: name.to_string(),
        }
    }

    /// Flip rows in place
    pub fn flip_vertical(&mut self) {
        let row = (self.width * 4) as usize;
        let height = self.height as usize;
        for y in 0..height / 2 {
            let (top, bottom) = self.data.split_at_mut((height - 1 - y) * row);
            top[y * row..(y + 1) * row].swap_with_slice(&mut bottom[..row]);
        }
    }

    /// Resample to `width` x `height`
    pub fn resized(self, width: u32, height: u32) -> Self {
        if self.width == width && self.height == height {
            return self;
        }
        let Some(img) = RgbaImage::from_raw(self.width, self.height, self.data) else {
            return Self::solid_color(width, height, [0; 4], &self.name);
        };
        let resized = imageops::resize(&img, width, height, imageops::FilterType::Triangle);
        Self {
            width,
            height,
            data: resized.into_raw(),
            name: self.name,
        }
    }

    /// Half-size copy using a 2x2 box filter
    fn downsampled(&self) -> Self {
        let width = (self.width / 2).max(1);
        let height = (self.height / 2).max(1);
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        let texel = |x: u32, y: u32, c: usize| -> u32 {
            let x = x.min(self.width - 1);
            let y = y.min(self.height - 1);
            self.data[((y * self.width + x) * 4) as usize + c] as u32
        };
        for y in 0..height {
            for x in 0..width {
                for c in 0..4 {
                    let sum = texel(2 * x, 2 * y, c)
                        + texel(2 * x + 1, 2 * y, c)
                        + texel(2 * x, 2 * y + 1, c)
                        + texel(2 * x + 1, 2 * y + 1, c);
                    data.push(((sum + 2) / 4) as u8);
                }
            }
        }
        Self {
            width,
            height,
            data,
            name: self.name.clone(),
        }
    }
}

/// Face order of a cube texture: +X, -X, +Y, -Y, +Z, -Z
pub const CUBE_FACES: [&str; 6] = ["px", "nx", "py", "ny", "pz", "nz"];

/// Six square RGBA8 faces plus their mip chains
#[derive(Debug, Clone)]
pub struct CubeMapData {
    pub size: u32,
    /// `levels[mip][face]`
    pub levels: Vec<[TextureData; 6]>,
    /// Faces that were missing on disk
    pub missing: Vec<&'static str>,
}

impl CubeMapData {
    /// Load `{prefix}-{face}.{extension}` for every face from `dir`.
    ///
    /// Never fails: a face that is missing or cannot be decoded becomes an
    /// empty (zero) face of the common size and is reported with a warning.
    pub fn load(dir: &Path, prefix: &str, extension: &str) -> Self {
        let mut missing = Vec::new();
        let loaded: Vec<Option<TextureData>> = CUBE_FACES
            .iter()
            .map(|face| {
                let path = dir.join(format!("{prefix}-{face}.{extension}"));
                match TextureData::from_file(&path) {
                    Ok(mut texture) => {
                        texture.flip_vertical();
                        Some(texture)
                    }
                    Err(e) => {
                        log::warn!("Cube face {face} unavailable, using an empty face: {e}");
                        missing.push(*face);
                        None
                    }
                }
            })
            .collect();

        let size = loaded
            .iter()
            .flatten()
            .next()
            .map(|t| t.width.max(t.height))
            .unwrap_or(1);

        let mut loaded = loaded.into_iter();
        let base = CUBE_FACES.map(|face| match loaded.next().flatten() {
            Some(texture) => texture.resized(size, size),
            None => TextureData::solid_color(size, size, [0; 4], face),
        });

        log::info!(
            "Loaded cube map {prefix} ({size}x{size}, {} of 6 faces)",
            6 - missing.len()
        );
        Self::with_mips(base, missing)
    }

    /// Build a cube from six faces of equal size
    pub fn from_faces(faces: [TextureData; 6]) -> Self {
        Self::with_mips(faces, Vec::new())
    }

    fn with_mips(base: [TextureData; 6], missing: Vec<&'static str>) -> Self {
        let size = base[0].width;
        let mut levels = vec![base];
        while let Some(last) = levels.last() {
            if last[0].width <= 1 {
                break;
            }
            let next = [0, 1, 2, 3, 4, 5].map(|i| last[i].downsampled());
            levels.push(next);
        }
        Self {
            size,
            levels,
            missing,
        }
    }

    pub fn mip_level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Full-resolution faces
    pub fn faces(&self) -> &[TextureData; 6] {
        &self.levels[0]
    }
}
