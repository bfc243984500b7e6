//! Texture decode, upload and caching.
//!
//! Pixel data comes in from a file, a stream or a raw RGBA8 buffer, is normalized by the
//! [`decode`] module and staged by a [`TextureBuilder`]. Building checks the [`TextureCache`]
//! by [`TextureId`] first and only allocates and uploads through the [`TextureFactory`] when
//! no texture with that identity exists yet.
//!
//! ```no_run
//! use kiln_texture::{TextureBuilder, TextureCache, WgpuTextureFactory};
//! # fn run(device: std::sync::Arc<wgpu::Device>, queue: std::sync::Arc<wgpu::Queue>) -> kiln_texture::Result<()> {
//! let cache = TextureCache::new(WgpuTextureFactory::new(device, queue));
//!
//! let grass = TextureBuilder::world(&cache).from_path("grass.png")?.build()?;
//! let again = TextureBuilder::world(&cache).from_path("grass.png")?.build()?;
//! assert!(std::sync::Arc::ptr_eq(&grass, &again));
//! # Ok(())
//! # }
//! ```

mod builder;
mod cache;
pub mod decode;
mod error;
mod factory;
mod handle;
mod identity;
pub mod mips;
pub mod staging;
mod wgpu_factory;

pub use builder::{TextureBuilder, TextureSettings, WORLD_MIP_LEVELS};
pub use cache::{SharedTexture, TextureCache};
pub use error::{GpuResourceError, GpuStage, Result, TextureError, TextureErrorKind};
pub use factory::{
    TEXTURE_FORMAT, TEXTURE_USAGE, TextureAllocation, TextureFactory, TextureUpload,
};
pub use handle::{DIFFUSE_CLASSIFICATION, TextureHandle};
pub use identity::TextureId;
pub use wgpu_factory::WgpuTextureFactory;

/// RGBA8, one byte per channel.
pub const BYTES_PER_PIXEL: usize = 4;
