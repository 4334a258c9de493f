//! Classification of dependency nodes by their file extension.

use std::fmt;

use camino::Utf8Path;

/// Composite assets carry references of their own; this is the corpus's
/// native extension for them, matched exactly.
const COMPOSITE: &str = "prefab";

const MEDIA: &[&str] = &[
    "png", "jpg", "jpeg", "tga", "tif", "tiff", "gif", "bmp", "psd", "exr", "hdr",
];

const CODE: &[&str] = &[
    "cs", "js", "shader", "asmdef", "cginc", "hlsl", "glslinc", "template",
];

/// The bucket a dependency lands in when query results are presented.
///
/// The variant order is the display order, so a `BTreeMap` keyed by
/// `Category` iterates the way the buckets should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Composite assets which can themselves carry references.
    Composite,
    /// Image formats.
    Media,
    /// Source, shader and module definition formats.
    Code,
    /// Everything else, including extensionless paths.
    Other,
}

impl Category {
    /// Buckets a node by its extension, case-insensitively.
    ///
    /// Total: any path classifies into exactly one category, and the same
    /// extension always lands in the same one.
    pub fn classify(node: impl AsRef<Utf8Path>) -> Self {
        let ext = match node.as_ref().extension() {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return Self::Other,
        };

        if ext == COMPOSITE {
            Self::Composite
        } else if MEDIA.contains(&ext.as_str()) {
            Self::Media
        } else if CODE.contains(&ext.as_str()) {
            Self::Code
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite => write!(f, "Composite"),
            Self::Media => write!(f, "Media"),
            Self::Code => write!(f, "Code"),
            Self::Other => write!(f, "Other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_by_extension() {
        assert_eq!(Category::classify("a/b/c.prefab"), Category::Composite);
        assert_eq!(Category::classify("sprites/tile.png"), Category::Media);
        assert_eq!(Category::classify("textures/sky.exr"), Category::Media);
        assert_eq!(Category::classify("scripts/player.cs"), Category::Code);
        assert_eq!(Category::classify("shaders/water.hlsl"), Category::Code);
        assert_eq!(Category::classify("data/table.bytes"), Category::Other);
    }

    #[test]
    fn extension_matching_ignores_case() {
        assert_eq!(Category::classify("a.PNG"), Category::classify("a.png"));
        assert_eq!(Category::classify("B.Prefab"), Category::Composite);
        assert_eq!(Category::classify("c.SHADER"), Category::Code);
    }

    #[test]
    fn pathological_paths_still_classify() {
        assert_eq!(Category::classify(""), Category::Other);
        assert_eq!(Category::classify("no_extension"), Category::Other);
        assert_eq!(Category::classify(".hidden"), Category::Other);
        assert_eq!(Category::classify("dir.png/file"), Category::Other);
    }

    #[test]
    fn display_order_follows_variant_order() {
        let mut categories = [
            Category::Other,
            Category::Code,
            Category::Composite,
            Category::Media,
        ];
        categories.sort();

        assert_eq!(
            categories,
            [
                Category::Composite,
                Category::Media,
                Category::Code,
                Category::Other,
            ]
        );
    }
}
