//! CPU side mip chain generation for RGBA8 textures.

use crate::BYTES_PER_PIXEL;

/// Length of the full mip chain for a texture of the given size, level 0 included.
pub fn max_mip_levels(width: u32, height: u32) -> u32 {
    let max_dim = width.max(height).max(1);
    32 - max_dim.leading_zeros()
}

/// Size of mip `level` for a texture of the given base size.
pub fn mip_extent(width: u32, height: u32, level: u32) -> (u32, u32) {
    let w = width.checked_shr(level).unwrap_or(0).max(1);
    let h = height.checked_shr(level).unwrap_or(0).max(1);
    (w, h)
}

/// Halves an RGBA8 image with a 2x2 box filter. Edge texels of odd sized images are clamped.
pub fn downsample_rgba8(src: &[u8], width: u32, height: u32) -> (Vec<u8>, u32, u32) {
    let (dst_width, dst_height) = mip_extent(width, height, 1);
    let mut out = vec![0u8; (dst_width * dst_height) as usize * BYTES_PER_PIXEL];

    for y in 0..dst_height {
        for x in 0..dst_width {
            let sx = x * 2;
            let sy = y * 2;
            let sample_coords = [
                (sx, sy),
                ((sx + 1).min(width - 1), sy),
                (sx, (sy + 1).min(height - 1)),
                ((sx + 1).min(width - 1), (sy + 1).min(height - 1)),
            ];

            let mut accum = [0u32; BYTES_PER_PIXEL];
            for (px, py) in sample_coords {
                let i = (py * width + px) as usize * BYTES_PER_PIXEL;
                for (channel, sum) in accum.iter_mut().enumerate() {
                    *sum += src[i + channel] as u32;
                }
            }

            let di = (y * dst_width + x) as usize * BYTES_PER_PIXEL;
            for (channel, sum) in accum.into_iter().enumerate() {
                out[di + channel] = ((sum + 2) / 4) as u8;
            }
        }
    }

    (out, dst_width, dst_height)
}

/// One generated mip level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    pub level: u32,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Iterates levels `1..level_count`, each downsampled from the previous one.
#[derive(Debug)]
pub struct MipChain<'a> {
    base: &'a [u8],
    previous: Option<MipLevel>,
    base_width: u32,
    base_height: u32,
    level_count: u32,
}

impl<'a> MipChain<'a> {
    pub fn new(base: &'a [u8], width: u32, height: u32, level_count: u32) -> Self {
        Self {
            base,
            previous: None,
            base_width: width,
            base_height: height,
            level_count: level_count.min(max_mip_levels(width, height)),
        }
    }
}

impl Iterator for MipChain<'_> {
    type Item = MipLevel;

    fn next(&mut self) -> Option<Self::Item> {
        let (src, width, height, level) = match &self.previous {
            None => (self.base, self.base_width, self.base_height, 1),
            Some(prev) => (prev.pixels.as_slice(), prev.width, prev.height, prev.level + 1),
        };

        if level >= self.level_count {
            return None;
        }

        let (pixels, width, height) = downsample_rgba8(src, width, height);
        let mip = MipLevel {
            level,
            width,
            height,
            pixels,
        };
        self.previous = Some(mip.clone());
        Some(mip)
    }
}
