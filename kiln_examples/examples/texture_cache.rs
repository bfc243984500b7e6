//! Builds a handful of textures on a headless device and shows the cache deduplicating them.
//!
//! Run with `RUST_LOG=kiln_texture=trace` to follow every cache hit and upload.

use image::{Rgba, RgbaImage};
use kiln_texture::{TextureBuilder, TextureCache, WgpuTextureFactory};
use kiln_utils::EngineArgs;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wgpu::{Adapter, Instance, InstanceDescriptor, RequestAdapterOptions};

async fn request_adapter() -> Result<Adapter, Box<dyn Error>> {
    let options = RequestAdapterOptions::default();

    for backend in EngineArgs::get().backends().unwrap_or_default() {
        let mut desc = InstanceDescriptor::from_env_or_default();
        desc.backends = *backend;

        match Instance::new(&desc).request_adapter(&options).await {
            Ok(adapter) => return Ok(adapter),
            Err(e) => debug!("No adapter on backend {backend:?}: {e}"),
        }
    }

    if EngineArgs::get().backends().is_some() {
        warn!("No adapter on any forced backend. Retrying with all available backends");
    }

    let instance = Instance::new(&InstanceDescriptor::from_env_or_default());
    Ok(instance.request_adapter(&options).await?)
}

async fn request_factory() -> Result<WgpuTextureFactory, Box<dyn Error>> {
    let adapter = request_adapter().await?;
    info!("Using adapter {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Texture Cache Example"),
            ..Default::default()
        })
        .await?;

    Ok(WgpuTextureFactory::new(Arc::new(device), Arc::new(queue)))
}

fn checkerboard(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgba([230, 230, 230, 255])
        } else {
            Rgba([40, 40, 40, 255])
        }
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    kiln_utils::init_logging();

    let path = std::env::temp_dir().join("kiln_checkerboard.png");
    checkerboard(64).save(&path)?;

    let factory = futures::executor::block_on(request_factory())?;
    let cache = TextureCache::new(factory);

    let floor = TextureBuilder::world(&cache).from_path(&path)?.build()?;
    let floor_again = TextureBuilder::world(&cache).from_path(&path)?.build()?;
    if !Arc::ptr_eq(&floor, &floor_again) {
        warn!("Texture cache returned a second copy of {}", floor.identity());
    }

    let cursor = TextureBuilder::ui(&cache)
        .from_bytes(vec![255u8; 16 * 16 * 4], 16, 16)
        .named("ui/cursor")
        .build()?;

    let encoded = std::fs::read(&path)?;
    let from_stream = TextureBuilder::ui(&cache)
        .from_stream(&mut std::io::Cursor::new(encoded))?
        .build()?;

    for texture in [&floor, &cursor, &from_stream] {
        info!(
            "{} [{}] {}x{}, {} mip level(s) requested, {} on device",
            texture.identity(),
            texture.classification(),
            texture.width(),
            texture.height(),
            texture.mip_level_count(),
            texture.texture().mip_level_count(),
        );
    }

    info!(
        "{} textures cached, {} staging buffers used, {} bytes still staged",
        cache.len(),
        cache.staging().staged_count(),
        cache.staging().outstanding_bytes()
    );

    Ok(())
}
