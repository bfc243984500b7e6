use crate::factory::TextureFactory;
use crate::identity::TextureId;
use std::fmt::{Debug, Formatter};
use wgpu::Extent3d;

/// Classification of textures sampled as the base color of a surface.
pub const DIFFUSE_CLASSIFICATION: &str = "texture_diffuse";

/// A built texture with its view, as handed to renderers.
///
/// Handles are immutable and shared out of the [`TextureCache`](crate::TextureCache). The GPU
/// objects inside are owned by the device the factory allocated them on.
pub struct TextureHandle<F: TextureFactory> {
    identity: TextureId,
    texture: F::Texture,
    view: F::View,
    classification: String,
    width: u32,
    height: u32,
    mip_level_count: u32,
}

impl<F: TextureFactory> TextureHandle<F> {
    pub(crate) fn new(
        identity: TextureId,
        texture: F::Texture,
        view: F::View,
        classification: String,
        width: u32,
        height: u32,
        mip_level_count: u32,
    ) -> Self {
        Self {
            identity,
            texture,
            view,
            classification,
            width,
            height,
            mip_level_count,
        }
    }

    pub fn identity(&self) -> &TextureId {
        &self.identity
    }

    pub fn texture(&self) -> &F::Texture {
        &self.texture
    }

    pub fn view(&self) -> &F::View {
        &self.view
    }

    pub fn classification(&self) -> &str {
        &self.classification
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Mip levels requested when the texture was allocated.
    pub fn mip_level_count(&self) -> u32 {
        self.mip_level_count
    }

    pub fn size(&self) -> Extent3d {
        Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

impl<F: TextureFactory> Debug for TextureHandle<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureHandle")
            .field("identity", &self.identity)
            .field("texture", &self.texture)
            .field("view", &self.view)
            .field("classification", &self.classification)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mip_level_count", &self.mip_level_count)
            .finish()
    }
}
