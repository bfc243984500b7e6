#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use kiln_texture::{
    GpuResourceError, GpuStage, TextureAllocation, TextureCache, TextureFactory, TextureUpload,
};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeTexture {
    pub id: u32,
    pub desc: TextureAllocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeView {
    pub texture_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub texture_id: u32,
    pub mip_level: u32,
    pub array_layer: u32,
    pub width: u32,
    pub height: u32,
    pub len: usize,
    pub first_texel: Option<[u8; 4]>,
}

#[derive(Debug, Default)]
pub struct Calls {
    pub allocations: Vec<TextureAllocation>,
    pub uploads: Vec<RecordedUpload>,
    pub views: u32,
    pub mip_fills: u32,
}

/// A [`TextureFactory`] that records every request instead of talking to a device.
#[derive(Debug, Default)]
pub struct RecordingFactory {
    calls: Mutex<Calls>,
    fail_stage: Mutex<Option<GpuStage>>,
}

impl RecordingFactory {
    pub fn failing_at(stage: GpuStage) -> Self {
        let factory = Self::default();
        factory.fail_at(Some(stage));
        factory
    }

    pub fn fail_at(&self, stage: Option<GpuStage>) {
        *self.fail_stage.lock() = stage;
    }

    pub fn allocations(&self) -> Vec<TextureAllocation> {
        self.calls.lock().allocations.clone()
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.calls.lock().uploads.clone()
    }

    pub fn view_count(&self) -> u32 {
        self.calls.lock().views
    }

    pub fn mip_fill_count(&self) -> u32 {
        self.calls.lock().mip_fills
    }

    /// allocate + upload + view calls combined
    pub fn gpu_call_count(&self) -> usize {
        let calls = self.calls.lock();
        calls.allocations.len() + calls.uploads.len() + calls.views as usize
    }

    fn check(&self, stage: GpuStage) -> Result<(), GpuResourceError> {
        match *self.fail_stage.lock() {
            Some(failing) if failing == stage => {
                Err(GpuResourceError::new(stage, "device lost"))
            }
            _ => Ok(()),
        }
    }
}

impl TextureFactory for RecordingFactory {
    type Texture = FakeTexture;
    type View = FakeView;

    fn allocate_texture_2d(
        &self,
        _label: &str,
        desc: &TextureAllocation,
    ) -> Result<FakeTexture, GpuResourceError> {
        let mut calls = self.calls.lock();
        calls.allocations.push(*desc);
        self.check(GpuStage::Allocate)?;

        Ok(FakeTexture {
            id: calls.allocations.len() as u32,
            desc: *desc,
        })
    }

    fn upload(
        &self,
        texture: &FakeTexture,
        upload: TextureUpload<'_>,
    ) -> Result<(), GpuResourceError> {
        self.calls.lock().uploads.push(RecordedUpload {
            texture_id: texture.id,
            mip_level: upload.mip_level,
            array_layer: upload.array_layer,
            width: upload.size.width,
            height: upload.size.height,
            len: upload.data.len(),
            first_texel: upload.data.first_chunk::<4>().copied(),
        });
        self.check(GpuStage::Upload)
    }

    fn create_view(&self, texture: &FakeTexture) -> Result<FakeView, GpuResourceError> {
        self.calls.lock().views += 1;
        self.check(GpuStage::CreateView)?;

        Ok(FakeView {
            texture_id: texture.id,
        })
    }

    fn fill_mip_chain(
        &self,
        _texture: &FakeTexture,
        _base: &[u8],
        _width: u32,
        _height: u32,
    ) -> Result<(), GpuResourceError> {
        self.calls.lock().mip_fills += 1;
        self.check(GpuStage::GenerateMips)
    }
}

pub fn recording_cache() -> TextureCache<RecordingFactory> {
    TextureCache::new(RecordingFactory::default())
}

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const BLUE: [u8; 4] = [0, 0, 255, 255];

/// Top half red, bottom half blue, so a vertical flip is visible in the first texel.
pub fn two_tone_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| {
        if y < height / 2 { Rgba(RED) } else { Rgba(BLUE) }
    })
}

pub fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("PNG encoding should succeed");
    bytes.into_inner()
}

pub fn write_png(dir: &Path, name: &str, image: &RgbaImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).expect("writing fixture image");
    path
}

/// A factory on the first adapter wgpu can find, or `None` on machines without one.
pub fn headless_factory() -> Option<kiln_texture::WgpuTextureFactory> {
    use std::sync::Arc;

    futures::executor::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::from_env_or_default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .ok()?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()?;

        Some(kiln_texture::WgpuTextureFactory::new(
            Arc::new(device),
            Arc::new(queue),
        ))
    })
}
