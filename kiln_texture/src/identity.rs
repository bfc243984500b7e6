//! Logical texture identities.
//!
//! Two build requests with an equal [`TextureId`] resolve to the same cached texture.
//! Files are keyed by their path, everything else gets a synthetic id unless the caller
//! names it explicitly.

use std::borrow::Borrow;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const SYNTHETIC_PREFIX: &str = "Texture ";
const STREAM_PREFIX: &str = "Stream ";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(Arc<str>);

impl TextureId {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        Self(path.as_ref().to_string_lossy().into())
    }

    /// A fresh id that no other builder will ever produce.
    pub fn synthetic() -> Self {
        Self(format!("{SYNTHETIC_PREFIX}{}", Uuid::new_v4()).into())
    }

    /// A fresh id for a texture read from a stream.
    pub fn stream() -> Self {
        Self(format!("{STREAM_PREFIX}{}", Uuid::new_v4()).into())
    }

    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for ids minted by [`synthetic`](Self::synthetic) or [`stream`](Self::stream).
    pub fn is_synthetic(&self) -> bool {
        [SYNTHETIC_PREFIX, STREAM_PREFIX].iter().any(|prefix| {
            self.0
                .strip_prefix(prefix)
                .is_some_and(|rest| Uuid::try_parse(rest).is_ok())
        })
    }
}

impl Display for TextureId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TextureId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TextureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TextureId {
    fn from(value: &str) -> Self {
        Self::named(value)
    }
}

impl From<String> for TextureId {
    fn from(value: String) -> Self {
        Self::named(value)
    }
}

impl From<&Path> for TextureId {
    fn from(value: &Path) -> Self {
        Self::from_path(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn path_ids_are_stable() {
        let a = TextureId::from_path("textures/grass.png");
        let b = TextureId::from_path(Path::new("textures/grass.png"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "textures/grass.png");
        assert!(!a.is_synthetic());
    }

    #[test]
    fn synthetic_ids_never_repeat() {
        let ids: HashSet<TextureId> = (0..64).map(|_| TextureId::synthetic()).collect();
        assert_eq!(ids.len(), 64);
        assert!(ids.iter().all(TextureId::is_synthetic));
    }

    #[test]
    fn stream_ids_are_tagged() {
        let id = TextureId::stream();
        assert!(id.as_str().starts_with("Stream "));
        assert!(id.is_synthetic());
        assert_ne!(id, TextureId::stream());
    }

    #[test]
    fn named_ids_look_up_by_str() {
        let id = TextureId::named("ui/cursor");
        let set: HashSet<TextureId> = [id.clone()].into();
        assert!(set.contains("ui/cursor"));
        assert!(!TextureId::named("Texture of a cat").is_synthetic());
    }
}
