//! The seam between the texture pipeline and the graphics device.
//!
//! The pipeline only ever asks a [`TextureFactory`] for four things: allocate a 2D texture,
//! write pixels into it, create a sampleable view, and optionally fill its mip chain.

use crate::error::{GpuResourceError, GpuStage};
use std::fmt::Debug;
use wgpu::{Extent3d, Origin3d, TextureFormat, TextureUsages};

/// Pixel format of every texture the pipeline creates.
pub const TEXTURE_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Sampleable, writable, and renderable so mip levels can be produced on the device.
pub const TEXTURE_USAGE: TextureUsages = TextureUsages::TEXTURE_BINDING
    .union(TextureUsages::COPY_DST)
    .union(TextureUsages::RENDER_ATTACHMENT);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TextureAllocation {
    pub width: u32,
    pub height: u32,
    pub mip_level_count: u32,
    pub array_layers: u32,
    pub format: TextureFormat,
    pub usage: TextureUsages,
}

impl TextureAllocation {
    pub fn rgba8_2d(width: u32, height: u32, mip_level_count: u32) -> Self {
        Self {
            width,
            height,
            mip_level_count,
            array_layers: 1,
            format: TEXTURE_FORMAT,
            usage: TEXTURE_USAGE,
        }
    }

    pub fn size(&self) -> Extent3d {
        Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: self.array_layers,
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TextureUpload<'a> {
    pub data: &'a [u8],
    pub mip_level: u32,
    pub array_layer: u32,
    pub origin: Origin3d,
    pub size: Extent3d,
    pub bytes_per_row: u32,
}

impl<'a> TextureUpload<'a> {
    /// A write covering the whole of `mip_level` on array layer 0.
    pub fn full(
        data: &'a [u8],
        mip_level: u32,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuResourceError> {
        let bytes_per_row = width
            .checked_mul(crate::BYTES_PER_PIXEL as u32)
            .ok_or_else(|| {
                GpuResourceError::new(
                    GpuStage::Upload,
                    format!("row of {width} texels does not fit in a single upload"),
                )
            })?;

        Ok(Self {
            data,
            mip_level,
            array_layer: 0,
            origin: Origin3d::ZERO,
            size: Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            bytes_per_row,
        })
    }

    /// Bytes this write reads from `data`.
    pub fn required_len(&self) -> u64 {
        self.bytes_per_row as u64 * self.size.height as u64 * self.size.depth_or_array_layers as u64
    }
}

pub trait TextureFactory {
    type Texture: Debug;
    type View: Debug;

    fn allocate_texture_2d(
        &self,
        label: &str,
        desc: &TextureAllocation,
    ) -> Result<Self::Texture, GpuResourceError>;

    fn upload(
        &self,
        texture: &Self::Texture,
        upload: TextureUpload<'_>,
    ) -> Result<(), GpuResourceError>;

    fn create_view(&self, texture: &Self::Texture) -> Result<Self::View, GpuResourceError>;

    /// Populates mip levels past 0 from the level 0 pixels.
    fn fill_mip_chain(
        &self,
        _texture: &Self::Texture,
        _base: &[u8],
        _width: u32,
        _height: u32,
    ) -> Result<(), GpuResourceError> {
        Ok(())
    }
}
