use argh::FromArgs;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

fn force_backend(backend: &str) -> Result<Option<Vec<wgpu::Backends>>, String> {
    let backends: wgpu::Backends = wgpu::Backends::from_comma_list(backend);

    if backends.is_empty() {
        return Ok(None);
    }

    let mut backends: Vec<wgpu::Backends> = backends.into_iter().collect();

    // vulkan is tried last, the rest keep their order
    backends.sort_by_key(|b| b.contains(wgpu::Backends::VULKAN));

    Ok(Some(backends))
}

/// Engine arguments
#[derive(Debug, Default, FromArgs)]
pub struct EngineArgs {
    #[argh(switch, hidden_help)]
    pub no_texture_flip: bool,

    #[argh(option, hidden_help)]
    pub texture_root: Option<PathBuf>,

    #[argh(option, hidden_help, from_str_fn(force_backend))]
    pub force_backend: Option<Option<Vec<wgpu::Backends>>>,
}

impl EngineArgs {
    fn init() -> Option<EngineArgs> {
        let mut args = std::env::args();
        let cmd_name = args.next()?;
        let args: Vec<String> = args.collect();
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        EngineArgs::from_args(&[&cmd_name], &args).ok()
    }

    pub fn get() -> &'static EngineArgs {
        static INSTANCE: LazyLock<EngineArgs> =
            LazyLock::new(|| EngineArgs::init().unwrap_or_default());
        &INSTANCE
    }

    /// Whether textures decoded from files or streams are flipped unless a caller says otherwise.
    pub fn default_flip_vertically(&self) -> bool {
        !self.no_texture_flip
    }

    /// Resolves a relative texture path against `--texture-root`, if one was given.
    pub fn resolve_texture_path<'a>(&self, path: &'a Path) -> Cow<'a, Path> {
        match &self.texture_root {
            Some(root) if path.is_relative() => Cow::Owned(root.join(path)),
            _ => Cow::Borrowed(path),
        }
    }

    pub fn backends(&self) -> Option<&[wgpu::Backends]> {
        self.force_backend.as_ref()?.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> EngineArgs {
        EngineArgs::from_args(&["kiln"], args).expect("arguments should parse")
    }

    #[test]
    fn defaults_flip_textures() {
        let args = parse(&[]);
        assert!(args.default_flip_vertically());
        assert!(args.backends().is_none());
    }

    #[test]
    fn no_texture_flip_switch() {
        let args = parse(&["--no-texture-flip"]);
        assert!(!args.default_flip_vertically());
    }

    #[test]
    fn resolves_relative_paths_against_root() {
        let args = parse(&["--texture-root", "assets"]);

        let relative = args.resolve_texture_path(Path::new("grass.png"));
        assert_eq!(relative.as_ref(), Path::new("assets/grass.png"));

        let absolute = Path::new("/tmp/grass.png");
        assert_eq!(args.resolve_texture_path(absolute).as_ref(), absolute);
    }

    #[test]
    fn vulkan_is_tried_last() {
        let args = parse(&["--force-backend", "vulkan,gl"]);
        let backends = args.backends().expect("backends were forced");
        assert_eq!(backends.last(), Some(&wgpu::Backends::VULKAN));
    }

    #[test]
    fn forced_backends_keep_their_order() {
        let backends = force_backend("vulkan,metal,dx12,gl")
            .unwrap()
            .expect("backends were forced");

        let others: Vec<wgpu::Backends> = wgpu::Backends::from_comma_list("metal,dx12,gl")
            .into_iter()
            .collect();
        assert_eq!(backends[..3], others[..]);
        assert_eq!(backends[3], wgpu::Backends::VULKAN);
    }

    #[test]
    fn unknown_backend_is_ignored() {
        let args = parse(&["--force-backend", "carrier-pigeon"]);
        assert!(args.backends().is_none());
    }
}
