//! PNG encoding for RGBA overlays.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the image has ≤256 unique
//!   colors. Quantile choropleths and small overlays usually qualify.
//! - **RGBA PNG (color type 6)**: fallback for images with >256 colors,
//!   which is the common case for continuous index rasters.
//!
//! Use `create_png_auto` for automatic mode selection, or `create_png` for
//! explicit RGBA encoding.

use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;
use thiserror::Error;

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

#[derive(Debug, Error)]
pub enum PngError {
    #[error("pixel buffer has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("image dimensions {width}x{height} are not encodable")]
    Dimensions { width: usize, height: usize },

    #[error("IDAT compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

type Palette = Vec<(u8, u8, u8, u8)>;

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> Result<(), PngError> {
    if width == 0 || height == 0 || width > u32::MAX as usize || height > u32::MAX as usize {
        return Err(PngError::Dimensions { width, height });
    }
    let expected = width * height * 4;
    if pixels.len() != expected {
        return Err(PngError::BufferSize {
            width,
            height,
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

/// Create a PNG image with automatic format selection.
///
/// - If ≤256 unique colors: indexed PNG
/// - Otherwise: RGBA PNG
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    check_dimensions(pixels, width, height)?;
    let num_pixels = pixels.len() / 4;

    let palette_result = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette_result {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices),
        None => create_png(pixels, width, height),
    }
}

/// Pack RGBA bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}

#[inline(always)]
fn unpack_color(packed: u32) -> (u8, u8, u8, u8) {
    let [r, g, b, a] = packed.to_le_bytes();
    (r, g, b, a)
}

/// Sequential palette extraction for small images.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk[0], chunk[1], chunk[2], chunk[3]);
        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push((chunk[0], chunk[1], chunk[2], chunk[3]));
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger images.
///
/// Collects unique colors per chunk, merges them in chunk order so the
/// palette is deterministic, then maps pixels to indices in parallel.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);
    let chunk_size = chunk_pixels * 4;

    let per_chunk: Vec<Option<Vec<u32>>> = pixels
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            let mut order = Vec::new();
            for pixel in chunk.chunks_exact(4) {
                let packed = pack_color(pixel[0], pixel[1], pixel[2], pixel[3]);
                if seen.insert(packed, ()).is_none() {
                    order.push(packed);
                    if order.len() > MAX_PALETTE_SIZE {
                        return None;
                    }
                }
            }
            Some(order)
        })
        .collect();

    let mut global_colors: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for packed in per_chunk.into_iter().collect::<Option<Vec<_>>>()?.into_iter().flatten() {
        if !global_colors.contains_key(&packed) {
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            global_colors.insert(packed, palette.len() as u8);
            palette.push(unpack_color(packed));
        }
    }

    let mut indices = vec![0u8; pixels.len() / 4];
    indices
        .par_chunks_mut(chunk_pixels)
        .zip(pixels.par_chunks(chunk_size))
        .for_each(|(idx_chunk, px_chunk)| {
            for (idx, px) in idx_chunk.iter_mut().zip(px_chunk.chunks_exact(4)) {
                let packed = pack_color(px[0], px[1], px[2], px[3]);
                *idx = global_colors.get(&packed).copied().unwrap_or(0);
            }
        });

    Some((palette, indices))
}

fn write_ihdr(png: &mut Vec<u8>, width: usize, height: usize, color_type: u8) {
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color_type);
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(png, b"IHDR", &ihdr_data);
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
) -> Result<Vec<u8>, PngError> {
    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(&mut png, width, height, 3);

    let plte_data: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
    write_chunk(&mut png, b"PLTE", &plte_data);

    // tRNS only when some entry is not opaque
    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns_data: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns_data);
    }

    let idat_data = deflate_scanlines(indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a PNG image from RGBA pixel data (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    check_dimensions(pixels, width, height)?;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_ihdr(&mut png, width, height, 6);

    let idat_data = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Deflate `height` rows of `row_bytes` each, with filter type 0.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> Result<Vec<u8>, PngError> {
    let mut uncompressed = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes).take(height) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_simple() {
        let pixels = [
            255, 0, 0, 216, // red
            0, 255, 0, 216, // green
            0, 0, 0, 0, // hole
            255, 0, 0, 216, // red again
        ];

        let (palette, indices) = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_extract_palette_too_many_colors() {
        let pixels: Vec<u8> = (0..300u32).flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255]).collect();
        assert!(extract_palette_sequential(&pixels).is_none());
        assert!(extract_palette_parallel(&pixels).is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        // 128x128, five-bucket choropleth-like pattern
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for y in 0..128u32 {
            for x in 0..128u32 {
                let bucket = ((x / 26) + (y / 64)) % 5;
                pixels.extend_from_slice(&[200 - bucket as u8 * 30, 40, 40, 153]);
            }
        }

        let (seq_palette, seq_indices) = extract_palette_sequential(&pixels).unwrap();
        let (par_palette, par_indices) = extract_palette_parallel(&pixels).unwrap();
        assert_eq!(seq_palette, par_palette);
        assert_eq!(seq_indices, par_indices);
    }

    #[test]
    fn test_chunk_crc() {
        let mut out = Vec::new();
        write_chunk(&mut out, b"IEND", &[]);
        assert_eq!(out, [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xae, 0x42, 0x60, 0x82]);
    }
}
