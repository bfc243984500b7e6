use crate::identity::TextureId;
use snafu::Snafu;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type Result<T, E = TextureError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum TextureError {
    #[snafu(display("Unable to read texture file {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to read {expected} bytes from texture stream: {source}"))]
    ReadStream {
        expected: u64,
        source: std::io::Error,
    },

    #[snafu(display("Unable to decode texture image: {source}"))]
    Decode { source: image::ImageError },

    #[snafu(display(
        "Pixel buffer of texture {identity} holds {actual} bytes, but {width}x{height} RGBA8 needs {expected}"
    ))]
    PixelBufferSize {
        identity: TextureId,
        width: u32,
        height: u32,
        expected: u64,
        actual: u64,
    },

    #[snafu(display("Texture {identity} has an unusable extent of {width}x{height}"))]
    InvalidExtent {
        identity: TextureId,
        width: u32,
        height: u32,
    },

    #[snafu(display("Texture {identity} is not cached and has no pixel data staged"))]
    MissingPixels { identity: TextureId },

    #[snafu(display("Unable to create GPU texture {identity}: {source}"))]
    GpuResource {
        identity: TextureId,
        source: GpuResourceError,
    },
}

/// The coarse failure classes callers usually branch on.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureErrorKind {
    Io,
    Decode,
    InvalidArgument,
    GpuResource,
}

impl TextureError {
    pub fn kind(&self) -> TextureErrorKind {
        match self {
            TextureError::ReadFile { .. } | TextureError::ReadStream { .. } => TextureErrorKind::Io,
            TextureError::Decode { .. } => TextureErrorKind::Decode,
            TextureError::PixelBufferSize { .. }
            | TextureError::InvalidExtent { .. }
            | TextureError::MissingPixels { .. } => TextureErrorKind::InvalidArgument,
            TextureError::GpuResource { .. } => TextureErrorKind::GpuResource,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GpuStage {
    Allocate,
    Upload,
    CreateView,
    GenerateMips,
}

impl Display for GpuStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GpuStage::Allocate => "allocation",
            GpuStage::Upload => "upload",
            GpuStage::CreateView => "view creation",
            GpuStage::GenerateMips => "mip generation",
        };
        f.write_str(name)
    }
}

/// A device side failure reported by a [`TextureFactory`](crate::TextureFactory).
#[derive(Debug, Snafu)]
#[snafu(display("Texture {stage} failed: {reason}"))]
pub struct GpuResourceError {
    pub stage: GpuStage,
    pub reason: String,
}

impl GpuResourceError {
    pub fn new(stage: GpuStage, reason: impl Into<String>) -> Self {
        GpuResourceSnafu { stage, reason }.build()
    }
}
