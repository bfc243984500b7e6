use crate::error::{GpuResourceError, GpuStage};
use crate::factory::{TextureAllocation, TextureFactory, TextureUpload};
use crate::mips::{MipChain, max_mip_levels, mip_extent};
use futures::executor::block_on;
use std::sync::Arc;
use tracing::{debug, warn};
use wgpu::{
    Device, ErrorFilter, Origin3d, Queue, TexelCopyBufferLayout, TexelCopyTextureInfo, Texture,
    TextureAspect, TextureDescriptor, TextureDimension, TextureView, TextureViewDescriptor,
};

type Result<T, E = GpuResourceError> = std::result::Result<T, E>;

/// [`TextureFactory`] backed by a wgpu device and its queue.
///
/// Requests are validated up front, and every device call runs inside validation and
/// out-of-memory error scopes. Failures come back as a [`GpuResourceError`] instead of
/// reaching the device's uncaptured error handler.
#[derive(Debug, Clone)]
pub struct WgpuTextureFactory {
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl WgpuTextureFactory {
    pub fn new(device: Arc<Device>, queue: Arc<Queue>) -> Self {
        Self { device, queue }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Runs `op` inside validation and out-of-memory error scopes.
    fn scoped<T>(&self, stage: GpuStage, op: impl FnOnce() -> T) -> Result<T> {
        let out_of_memory = self.device.push_error_scope(ErrorFilter::OutOfMemory);
        let validation = self.device.push_error_scope(ErrorFilter::Validation);

        let value = op();

        let validation_err = block_on(validation.pop());
        let out_of_memory_err = block_on(out_of_memory.pop());
        match validation_err.or(out_of_memory_err) {
            Some(err) => Err(GpuResourceError::new(stage, err.to_string())),
            None => Ok(value),
        }
    }

    fn validate_allocation(&self, desc: &TextureAllocation) -> Result<()> {
        let limits = self.device.limits();

        if desc.width == 0 || desc.height == 0 {
            return Err(GpuResourceError::new(
                GpuStage::Allocate,
                format!("extent {}x{} must be non-zero", desc.width, desc.height),
            ));
        }

        let max_dim = limits.max_texture_dimension_2d;
        if desc.width > max_dim || desc.height > max_dim {
            return Err(GpuResourceError::new(
                GpuStage::Allocate,
                format!(
                    "extent {}x{} exceeds the device limit of {max_dim}",
                    desc.width, desc.height
                ),
            ));
        }

        if desc.array_layers == 0 || desc.array_layers > limits.max_texture_array_layers {
            return Err(GpuResourceError::new(
                GpuStage::Allocate,
                format!("{} array layers are not supported", desc.array_layers),
            ));
        }

        if desc.mip_level_count == 0 {
            return Err(GpuResourceError::new(
                GpuStage::Allocate,
                "mip_level_count must be >= 1",
            ));
        }

        Ok(())
    }

    fn write(
        &self,
        stage: GpuStage,
        texture: &Texture,
        upload: TextureUpload<'_>,
    ) -> Result<()> {
        if upload.mip_level >= texture.mip_level_count() {
            return Err(GpuResourceError::new(
                stage,
                format!(
                    "mip level {} out of range (mip_level_count={})",
                    upload.mip_level,
                    texture.mip_level_count()
                ),
            ));
        }

        if upload.array_layer >= texture.depth_or_array_layers() {
            return Err(GpuResourceError::new(
                stage,
                format!("array layer {} out of range", upload.array_layer),
            ));
        }

        let (mip_width, mip_height) =
            mip_extent(texture.width(), texture.height(), upload.mip_level);
        let end_x = upload.origin.x.saturating_add(upload.size.width);
        let end_y = upload.origin.y.saturating_add(upload.size.height);
        if end_x > mip_width || end_y > mip_height {
            return Err(GpuResourceError::new(
                stage,
                format!(
                    "region {}x{} at ({},{}) exceeds mip {} extent {mip_width}x{mip_height}",
                    upload.size.width,
                    upload.size.height,
                    upload.origin.x,
                    upload.origin.y,
                    upload.mip_level
                ),
            ));
        }

        let required = upload.required_len();
        if (upload.data.len() as u64) < required {
            return Err(GpuResourceError::new(
                stage,
                format!(
                    "upload needs {required} bytes but only {} were provided",
                    upload.data.len()
                ),
            ));
        }

        self.scoped(stage, || {
            self.queue.write_texture(
                TexelCopyTextureInfo {
                    texture,
                    mip_level: upload.mip_level,
                    origin: Origin3d {
                        x: upload.origin.x,
                        y: upload.origin.y,
                        z: upload.array_layer,
                    },
                    aspect: TextureAspect::All,
                },
                upload.data,
                TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(upload.bytes_per_row),
                    rows_per_image: Some(upload.size.height),
                },
                upload.size,
            );
        })
    }
}

impl TextureFactory for WgpuTextureFactory {
    type Texture = Texture;
    type View = TextureView;

    fn allocate_texture_2d(&self, label: &str, desc: &TextureAllocation) -> Result<Texture> {
        self.validate_allocation(desc)?;

        let max_levels = max_mip_levels(desc.width, desc.height);
        let mip_level_count = desc.mip_level_count.min(max_levels);
        if mip_level_count < desc.mip_level_count {
            warn!(
                "Texture {label:?} requested {} mip levels, {}x{} only allows {max_levels}",
                desc.mip_level_count, desc.width, desc.height
            );
        }

        debug!(
            "Allocating {}x{} texture {label:?} with {mip_level_count} mip level(s)",
            desc.width, desc.height
        );

        self.scoped(GpuStage::Allocate, || {
            self.device.create_texture(&TextureDescriptor {
                label: Some(label),
                size: desc.size(),
                mip_level_count,
                sample_count: 1,
                dimension: TextureDimension::D2,
                format: desc.format,
                usage: desc.usage,
                view_formats: &[],
            })
        })
    }

    fn upload(&self, texture: &Texture, upload: TextureUpload<'_>) -> Result<()> {
        self.write(GpuStage::Upload, texture, upload)
    }

    fn create_view(&self, texture: &Texture) -> Result<TextureView> {
        self.scoped(GpuStage::CreateView, || {
            texture.create_view(&TextureViewDescriptor::default())
        })
    }

    fn fill_mip_chain(
        &self,
        texture: &Texture,
        base: &[u8],
        width: u32,
        height: u32,
    ) -> Result<()> {
        let level_count = texture.mip_level_count();
        for mip in MipChain::new(base, width, height, level_count) {
            let upload = TextureUpload::full(&mip.pixels, mip.level, mip.width, mip.height)?;
            self.write(GpuStage::GenerateMips, texture, upload)?;
        }

        debug!("Filled {} mip level(s)", level_count.saturating_sub(1));
        Ok(())
    }
}
