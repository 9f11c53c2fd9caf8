//! Sprite lookup and placeholder rendering
//!
//! Sprites are cosmetic: a missing or undecodable file is never an error,
//! the row just gets a generated placeholder tile instead. Lookup is tiered:
//!
//! 1. exact `<creature_id>.png` in the sprites directory
//! 2. any image file whose stem matches the creature id (walkdir scan)
//! 3. a flat placeholder tile colored from the dex number

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use iced::widget::image::Handle;
use walkdir::WalkDir;

/// Edge length of sprite tiles (square).
pub const SPRITE_SIZE: u32 = 48;

/// Image extensions the scan accepts.
const SPRITE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// In-memory sprite cache keyed by creature id.
pub struct SpriteCache {
    /// creature id → sprite file found by the startup scan.
    index: HashMap<String, PathBuf>,
    /// Decoded handles, including placeholders.
    handles: HashMap<String, Handle>,
}

impl SpriteCache {
    /// Scan a sprites directory once. A missing directory yields an empty
    /// index; every lookup then falls through to placeholders.
    pub fn scan(sprites_dir: &Path) -> Self {
        let mut index = HashMap::new();

        for entry in WalkDir::new(sprites_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(extension) = path.extension() else {
                continue;
            };
            let ext = extension.to_string_lossy().to_lowercase();
            if !SPRITE_EXTENSIONS.contains(&ext.as_str()) {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                index
                    .entry(stem.to_string_lossy().to_string())
                    .or_insert_with(|| path.to_path_buf());
            }
        }

        if !index.is_empty() {
            println!("🖼️  Indexed {} sprites in {}", index.len(), sprites_dir.display());
        }

        SpriteCache {
            index,
            handles: HashMap::new(),
        }
    }

    /// Get the sprite handle for a creature, decoding on first use and
    /// falling back to a placeholder tile.
    pub fn handle(&mut self, creature_id: &str, regional_dex: u32) -> Handle {
        if let Some(handle) = self.handles.get(creature_id) {
            return handle.clone();
        }

        let handle = self
            .index
            .get(creature_id)
            .and_then(|path| decode_sprite(path))
            .unwrap_or_else(|| placeholder_handle(regional_dex));

        self.handles.insert(creature_id.to_string(), handle.clone());
        handle
    }

    /// Whether a real sprite file (not a placeholder) is known for this id.
    pub fn has_sprite(&self, creature_id: &str) -> bool {
        self.index.contains_key(creature_id)
    }
}

/// Decode a sprite file into an iced handle. Failure is cosmetic.
fn decode_sprite(path: &Path) -> Option<Handle> {
    match image::open(path) {
        Ok(img) => {
            let rgba = img
                .resize(SPRITE_SIZE, SPRITE_SIZE, image::imageops::FilterType::Nearest)
                .to_rgba8();
            let (width, height) = rgba.dimensions();
            Some(Handle::from_rgba(width, height, rgba.into_raw()))
        }
        Err(e) => {
            eprintln!("⚠️  Failed to decode sprite {}: {}", path.display(), e);
            None
        }
    }
}

/// Build the flat placeholder tile for a dex number.
fn placeholder_handle(regional_dex: u32) -> Handle {
    let pixels = placeholder_pixels(regional_dex);
    Handle::from_rgba(SPRITE_SIZE, SPRITE_SIZE, pixels)
}

/// Flat RGBA tile with a color cycled from the dex number, so neighboring
/// dex entries stay visually distinct.
fn placeholder_pixels(regional_dex: u32) -> Vec<u8> {
    let hue = (regional_dex * 47) % 360;
    let (r, g, b) = hue_to_rgb(hue);

    let mut pixels = Vec::with_capacity((SPRITE_SIZE * SPRITE_SIZE * 4) as usize);
    for _ in 0..(SPRITE_SIZE * SPRITE_SIZE) {
        pixels.extend_from_slice(&[r, g, b, 255]);
    }
    pixels
}

/// Muted hue → RGB, fixed saturation and value.
fn hue_to_rgb(hue: u32) -> (u8, u8, u8) {
    let h = hue as f32 / 60.0;
    let c = 0.45_f32;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = 0.35_f32;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_directory_yields_empty_index() {
        let cache = SpriteCache::scan(Path::new("/nonexistent/sprites"));
        assert!(!cache.has_sprite("pidgey"));
    }

    #[test]
    fn test_placeholder_never_fails() {
        let mut cache = SpriteCache::scan(Path::new("/nonexistent/sprites"));
        // No sprite on disk: we still get a handle (the placeholder).
        let _ = cache.handle("pidgey", 16);
        let _ = cache.handle("mewtwo", 150);
    }

    #[test]
    fn test_placeholder_tile_shape() {
        let pixels = placeholder_pixels(25);
        assert_eq!(pixels.len(), (SPRITE_SIZE * SPRITE_SIZE * 4) as usize);
        // Flat tile: every pixel identical.
        assert!(pixels.chunks(4).all(|px| px == &pixels[0..4]));
    }

    #[test]
    fn test_placeholders_vary_with_dex_number() {
        assert_ne!(placeholder_pixels(1)[0..3], placeholder_pixels(2)[0..3]);
    }
}
