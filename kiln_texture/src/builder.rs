use crate::BYTES_PER_PIXEL;
use crate::cache::{SharedTexture, TextureCache};
use crate::decode::{DecodedImage, Flip, decode, decode_path, decode_stream};
use crate::error::{
    GpuResourceErr, InvalidExtentErr, MissingPixelsErr, PixelBufferSizeErr, Result,
};
use crate::factory::{TextureAllocation, TextureFactory, TextureUpload};
use crate::handle::{DIFFUSE_CLASSIFICATION, TextureHandle};
use crate::identity::TextureId;
use crate::staging::StagingPool;
use bon::Builder;
use kiln_utils::EngineArgs;
use snafu::{OptionExt, ResultExt, ensure};
use std::io::{Read, Seek};
use std::path::Path;
use tracing::debug;

/// Mip levels requested for textures that generate mips. Not derived from the texture size.
pub const WORLD_MIP_LEVELS: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct TextureSettings {
    #[builder(into, default = DIFFUSE_CLASSIFICATION.to_owned())]
    pub classification: String,
    #[builder(default = false)]
    pub generate_mips: bool,
    #[builder(default = EngineArgs::get().default_flip_vertically())]
    pub flip_vertically: bool,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl TextureSettings {
    /// Flat textures drawn in screen space. No mips.
    pub fn ui() -> Self {
        Self::default()
    }

    /// Textures sampled in perspective, with a mip chain.
    pub fn world() -> Self {
        Self::builder().generate_mips(true).build()
    }

    pub fn mip_level_count(&self) -> u32 {
        if self.generate_mips {
            WORLD_MIP_LEVELS
        } else {
            1
        }
    }
}

#[derive(Debug)]
struct StagedPixels {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl From<DecodedImage> for StagedPixels {
    fn from(image: DecodedImage) -> Self {
        Self {
            bytes: image.pixels,
            width: image.width,
            height: image.height,
        }
    }
}

/// Stages pixel data for a texture and turns it into a cached [`TextureHandle`].
///
/// ```no_run
/// # use kiln_texture::{TextureBuilder, TextureCache, TextureFactory};
/// # fn load<F: TextureFactory>(cache: &TextureCache<F>) -> kiln_texture::Result<()> {
/// let grass = TextureBuilder::world(cache).from_path("textures/grass.png")?.build()?;
/// let cursor = TextureBuilder::ui(cache)
///     .from_bytes(vec![255; 16 * 16 * 4], 16, 16)
///     .named("ui/cursor")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct TextureBuilder<'c, F: TextureFactory> {
    cache: &'c TextureCache<F>,
    settings: TextureSettings,
    identity: TextureId,
    pixels: Option<StagedPixels>,
}

impl<'c, F: TextureFactory> TextureBuilder<'c, F> {
    pub fn new(cache: &'c TextureCache<F>) -> Self {
        Self::with_settings(cache, TextureSettings::default())
    }

    pub fn ui(cache: &'c TextureCache<F>) -> Self {
        Self::with_settings(cache, TextureSettings::ui())
    }

    pub fn world(cache: &'c TextureCache<F>) -> Self {
        Self::with_settings(cache, TextureSettings::world())
    }

    pub fn with_settings(cache: &'c TextureCache<F>, settings: TextureSettings) -> Self {
        Self {
            cache,
            settings,
            identity: TextureId::synthetic(),
            pixels: None,
        }
    }

    pub fn identity(&self) -> &TextureId {
        &self.identity
    }

    pub fn settings(&self) -> &TextureSettings {
        &self.settings
    }

    pub fn has_pixels(&self) -> bool {
        self.pixels.is_some()
    }

    pub fn from_path(self, path: impl AsRef<Path>) -> Result<Self> {
        let flip = self.settings.flip_vertically;
        self.from_path_flipped(path, flip)
    }

    /// Decodes the image at `path`, unless a texture for that path is already cached.
    pub fn from_path_flipped(
        mut self,
        path: impl AsRef<Path>,
        flip_vertically: bool,
    ) -> Result<Self> {
        let path = path.as_ref();
        let identity = TextureId::from_path(path);
        self.settings.flip_vertically = flip_vertically;

        if self.cache.contains(identity.as_str()) {
            self.identity = identity;
            self.pixels = None;
            return Ok(self);
        }

        let resolved = EngineArgs::get().resolve_texture_path(path);
        let image = decode_path(&resolved, Flip::from(flip_vertically))?;

        self.identity = identity;
        self.pixels = Some(image.into());
        Ok(self)
    }

    /// Stages already decoded RGBA8 pixels. The size is checked against `width` and `height`
    /// when the texture is built.
    pub fn from_bytes(mut self, bytes: impl Into<Vec<u8>>, width: u32, height: u32) -> Self {
        self.identity = TextureId::synthetic();
        self.pixels = Some(StagedPixels {
            bytes: bytes.into(),
            width,
            height,
        });
        self
    }

    /// Decodes an encoded image held in memory.
    pub fn from_memory(mut self, encoded: &[u8]) -> Result<Self> {
        let image = decode(encoded, Flip::from(self.settings.flip_vertically))?;
        self.identity = TextureId::synthetic();
        self.pixels = Some(image.into());
        Ok(self)
    }

    pub fn from_stream<R: Read + Seek>(self, stream: &mut R) -> Result<Self> {
        let flip = self.settings.flip_vertically;
        self.from_stream_flipped(stream, flip)
    }

    pub fn from_stream_flipped<R: Read + Seek>(
        mut self,
        stream: &mut R,
        flip_vertically: bool,
    ) -> Result<Self> {
        self.settings.flip_vertically = flip_vertically;
        let image = decode_stream(stream, Flip::from(flip_vertically))?;
        self.identity = TextureId::stream();
        self.pixels = Some(image.into());
        Ok(self)
    }

    /// Enables mip generation. Passing `false` leaves an earlier `true` in place.
    pub fn generate_mips(mut self, enabled: bool) -> Self {
        if enabled {
            self.settings.generate_mips = true;
        }
        self
    }

    pub fn classification(mut self, classification: impl Into<String>) -> Self {
        self.settings.classification = classification.into();
        self
    }

    /// Keys the texture by a caller chosen identity, so bytes and streams can be cached too.
    pub fn named(mut self, identity: impl Into<TextureId>) -> Self {
        self.identity = identity.into();
        self
    }

    pub fn build(self) -> Result<SharedTexture<F>> {
        let TextureBuilder {
            cache,
            settings,
            identity,
            pixels,
        } = self;

        let build = |factory: &F, staging: &StagingPool| -> Result<TextureHandle<F>> {
            let pixels = pixels.context(MissingPixelsErr {
                identity: identity.clone(),
            })?;
            let StagedPixels {
                bytes,
                width,
                height,
            } = pixels;

            let extent_err = || InvalidExtentErr {
                identity: identity.clone(),
                width,
                height,
            };
            ensure!(width > 0 && height > 0, extent_err());
            let expected = (width as u64 * height as u64)
                .checked_mul(BYTES_PER_PIXEL as u64)
                .with_context(extent_err)?;

            let staged = staging.stage(bytes);
            ensure!(
                staged.len() as u64 == expected,
                PixelBufferSizeErr {
                    identity: identity.clone(),
                    width,
                    height,
                    expected,
                    actual: staged.len() as u64,
                }
            );

            let mip_level_count = settings.mip_level_count();
            let desc = TextureAllocation::rgba8_2d(width, height, mip_level_count);
            let gpu_err = || GpuResourceErr {
                identity: identity.clone(),
            };

            let texture = factory
                .allocate_texture_2d(identity.as_str(), &desc)
                .with_context(|_| gpu_err())?;
            let upload =
                TextureUpload::full(&staged, 0, width, height).with_context(|_| gpu_err())?;
            factory
                .upload(&texture, upload)
                .with_context(|_| gpu_err())?;
            if settings.generate_mips {
                factory
                    .fill_mip_chain(&texture, &staged, width, height)
                    .with_context(|_| gpu_err())?;
            }
            let view = factory.create_view(&texture).with_context(|_| gpu_err())?;
            drop(staged);

            debug!("Built texture {identity} ({width}x{height}, {mip_level_count} mip level(s))");

            Ok(TextureHandle::new(
                identity.clone(),
                texture,
                view,
                settings.classification,
                width,
                height,
                mip_level_count,
            ))
        };

        cache.get_or_try_insert_with(&identity, build)
    }
}
