//! System font lookup for text annotations

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use ab_glyph::{FontArc, FontVec};

/// File stems tried, in order, when a family is not installed
const FALLBACK_STEMS: &[&str] = &[
    "meiryo",
    "segoeui",
    "arial",
    "dejavusans",
    "liberationsans",
    "notosans",
    "helvetica",
    "freesans",
];

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

/// How deep to descend into each font directory
const MAX_DEPTH: usize = 4;

/// A loaded font and whether it was a substitute for the requested family
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    pub font: FontArc,
    pub fallback: bool,
}

/// Resolves font family names to font files under a set of directories.
///
/// The directory index is built on first use; loaded fonts are cached by
/// family so repeated exports parse each file once.
#[derive(Debug, Default)]
pub struct FontBook {
    dirs: Vec<PathBuf>,
    index: Option<BTreeMap<String, PathBuf>>,
    cache: HashMap<String, Option<ResolvedFont>>,
}

/// Lowercase a family or file stem and drop separators: "Segoe UI" -> "segoeui"
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl FontBook {
    /// Look only in `dirs`
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            dirs,
            ..Default::default()
        }
    }

    /// Usual system and per-user font directories
    pub fn system() -> Self {
        let mut dirs: Vec<PathBuf> = Vec::new();
        if let Some(dir) = dirs::font_dir() {
            dirs.push(dir);
        }
        if let Some(home) = dirs::home_dir() {
            dirs.push(home.join(".fonts"));
        }
        for dir in [
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/Library/Fonts",
            "/System/Library/Fonts",
            "C:\\Windows\\Fonts",
        ] {
            dirs.push(PathBuf::from(dir));
        }
        Self::with_dirs(dirs)
    }

    fn index(&mut self) -> &BTreeMap<String, PathBuf> {
        let dirs = &self.dirs;
        self.index.get_or_insert_with(|| {
            let mut index = BTreeMap::new();
            for dir in dirs {
                for entry in walkdir::WalkDir::new(dir)
                    .max_depth(MAX_DEPTH)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(Result::ok)
                {
                    let path = entry.path();
                    let is_font = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| FONT_EXTENSIONS.contains(&e.to_lowercase().as_str()));
                    if !is_font {
                        continue;
                    }
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        index
                            .entry(normalize(stem))
                            .or_insert_with(|| path.to_path_buf());
                    }
                }
            }
            log::debug!("Indexed {} font files", index.len());
            index
        })
    }

    fn lookup(&mut self, family: &str) -> Option<PathBuf> {
        let key = normalize(family);
        if key.is_empty() {
            return None;
        }
        let index = self.index();
        index
            .get(&key)
            .or_else(|| index.get(&format!("{key}regular")))
            .cloned()
    }

    /// Load the font for `family`, substituting a default if it is missing.
    ///
    /// Returns `None` only when no usable font file exists at all.
    pub fn resolve(&mut self, family: &str) -> Option<ResolvedFont> {
        if let Some(hit) = self.cache.get(family) {
            return hit.clone();
        }

        let resolved = match self.lookup(family).and_then(|path| load(&path)) {
            Some(font) => Some(ResolvedFont {
                font,
                fallback: false,
            }),
            None => {
                let font = self.fallback();
                match &font {
                    Some(_) => log::warn!("Font {family:?} unavailable, using a default font"),
                    None => log::warn!("Font {family:?} unavailable and no default font found"),
                }
                font.map(|font| ResolvedFont {
                    font,
                    fallback: true,
                })
            }
        };

        self.cache.insert(family.to_string(), resolved.clone());
        resolved
    }

    fn fallback(&mut self) -> Option<FontArc> {
        for stem in FALLBACK_STEMS {
            if let Some(font) = self.lookup(stem).and_then(|path| load(&path)) {
                return Some(font);
            }
        }
        // Anything installed beats no text at all
        let paths: Vec<PathBuf> = self.index().values().cloned().collect();
        paths.iter().find_map(|path| load(path))
    }
}

fn load(path: &Path) -> Option<FontArc> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("Could not read font {}: {}", path.display(), err);
            return None;
        }
    };
    match FontVec::try_from_vec_and_index(bytes, 0) {
        Ok(font) => Some(FontArc::from(font)),
        Err(err) => {
            log::warn!("Could not parse font {}: {}", path.display(), err);
            None
        }
    }
}
