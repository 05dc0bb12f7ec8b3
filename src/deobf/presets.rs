//! Alias presets: aliases chosen by an earlier run or by hand.
//!
//! Presets are plain identity → alias tables, one per symbol kind. A
//! [`PresetStore`] loads them before a run and persists the run's final
//! tables afterwards. Two stores are provided: [`MemoryPresets`] and the
//! line-oriented [`MapFilePresets`]:
//!
//! ```text
//! # comment
//! p com.a = widgets
//! c com.a.b = Button
//! f com.a.b.c:I = count
//! m com.a.b.d(Landroid/view/View;)V = onClick
//! ```

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::error::{DeobfError, DeobfResult};

/// Identity → alias tables for each symbol kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AliasPresets {
    /// Full original package path → segment alias.
    pub packages: IndexMap<SmolStr, SmolStr>,
    /// Full original type name → short alias.
    pub types: IndexMap<SmolStr, SmolStr>,
    /// Field identity → alias.
    pub fields: IndexMap<SmolStr, SmolStr>,
    /// Method identity → alias.
    pub methods: IndexMap<SmolStr, SmolStr>,
}

impl AliasPresets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all kinds.
    pub fn len(&self) -> usize {
        self.packages.len() + self.types.len() + self.fields.len() + self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.packages.clear();
        self.types.clear();
        self.fields.clear();
        self.methods.clear();
    }

    /// Parse the map file format.
    pub fn parse(text: &str) -> DeobfResult<Self> {
        let mut presets = Self::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let malformed = |reason: &str| DeobfError::MalformedPreset {
                line: idx + 1,
                reason: reason.to_string(),
            };

            let (kind, rest) = line.split_once(' ').ok_or_else(|| malformed("missing symbol kind"))?;
            let (identity, alias) = rest
                .split_once(" = ")
                .ok_or_else(|| malformed("expected '<identity> = <alias>'"))?;
            let (identity, alias) = (identity.trim(), alias.trim());
            if identity.is_empty() || alias.is_empty() {
                return Err(malformed("empty identity or alias"));
            }

            let table = match kind {
                "p" => &mut presets.packages,
                "c" => &mut presets.types,
                "f" => &mut presets.fields,
                "m" => &mut presets.methods,
                other => return Err(malformed(&format!("unknown symbol kind '{other}'"))),
            };
            table.insert(identity.into(), alias.into());
        }
        Ok(presets)
    }

    /// Render the map file format.
    pub fn render(&self) -> String {
        let mut out = String::from("# identifier alias map\n");
        let sections = [
            ("p", &self.packages),
            ("c", &self.types),
            ("f", &self.fields),
            ("m", &self.methods),
        ];
        for (kind, table) in sections {
            for (identity, alias) in table {
                let _ = writeln!(out, "{kind} {identity} = {alias}");
            }
        }
        out
    }

    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> DeobfResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> DeobfResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// STORES
// ============================================================================

/// Durable storage for alias presets.
pub trait PresetStore {
    /// Read the stored presets. A store with nothing saved yields empty presets.
    fn load(&mut self) -> DeobfResult<AliasPresets>;

    /// Persist `presets`. Existing content is only replaced when
    /// `force_overwrite` is set; returns whether anything was written.
    fn save(&mut self, presets: &AliasPresets, force_overwrite: bool) -> DeobfResult<bool>;

    /// Discard preset state held in memory; stored presets are kept.
    fn clear(&mut self);
}

/// Presets kept in memory, standing in for durable storage.
#[derive(Clone, Debug, Default)]
pub struct MemoryPresets {
    stored: AliasPresets,
    loaded: Option<AliasPresets>,
}

impl MemoryPresets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_presets(presets: AliasPresets) -> Self {
        Self {
            stored: presets,
            loaded: None,
        }
    }

    /// The stored presets.
    pub fn presets(&self) -> &AliasPresets {
        &self.stored
    }

    /// Presets handed out by the last [`load`](PresetStore::load).
    pub fn loaded(&self) -> Option<&AliasPresets> {
        self.loaded.as_ref()
    }
}

impl PresetStore for MemoryPresets {
    fn load(&mut self) -> DeobfResult<AliasPresets> {
        self.loaded = Some(self.stored.clone());
        Ok(self.stored.clone())
    }

    fn save(&mut self, presets: &AliasPresets, force_overwrite: bool) -> DeobfResult<bool> {
        if !force_overwrite && !self.stored.is_empty() {
            return Ok(false);
        }
        self.stored = presets.clone();
        Ok(true)
    }

    fn clear(&mut self) {
        self.loaded = None;
    }
}

/// Presets stored in a map file on disk.
#[derive(Clone, Debug)]
pub struct MapFilePresets {
    path: PathBuf,
    loaded: Option<AliasPresets>,
}

impl MapFilePresets {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            loaded: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Presets read by the last successful [`load`](PresetStore::load).
    pub fn loaded(&self) -> Option<&AliasPresets> {
        self.loaded.as_ref()
    }

    fn io_error(&self, source: std::io::Error) -> DeobfError {
        DeobfError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl PresetStore for MapFilePresets {
    fn load(&mut self) -> DeobfResult<AliasPresets> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no preset map file");
            return Ok(AliasPresets::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        let presets = AliasPresets::parse(&text)?;
        tracing::debug!(path = %self.path.display(), entries = presets.len(), "loaded presets");
        self.loaded = Some(presets.clone());
        Ok(presets)
    }

    fn save(&mut self, presets: &AliasPresets, force_overwrite: bool) -> DeobfResult<bool> {
        if !force_overwrite && self.path.exists() {
            tracing::warn!(path = %self.path.display(), "preset map file exists, not overwriting");
            return Ok(false);
        }
        fs::write(&self.path, presets.render()).map_err(|e| self.io_error(e))?;
        tracing::debug!(path = %self.path.display(), entries = presets.len(), "saved presets");
        Ok(true)
    }

    fn clear(&mut self) {
        self.loaded = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AliasPresets {
        let mut presets = AliasPresets::new();
        presets.packages.insert("com.a".into(), "widgets".into());
        presets.types.insert("com.a.b".into(), "Button".into());
        presets.fields.insert("com.a.b.c:I".into(), "count".into());
        presets.methods.insert("com.a.b.d(Landroid/view/View;)V".into(), "onClick".into());
        presets
    }

    #[test]
    fn test_parse_rendered() {
        let presets = sample();
        let text = presets.render();
        assert!(text.contains("m com.a.b.d(Landroid/view/View;)V = onClick"));
        assert_eq!(AliasPresets::parse(&text).unwrap(), presets);
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let presets = AliasPresets::parse("# header\n\n   \nc a.b = Widget\n").unwrap();
        assert_eq!(presets.len(), 1);
        assert_eq!(presets.types.get("a.b").map(SmolStr::as_str), Some("Widget"));
    }

    #[test]
    fn test_parse_reports_line() {
        let err = AliasPresets::parse("c a.b = Widget\nx a.c = Other\n").unwrap_err();
        match err {
            DeobfError::MalformedPreset { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("unknown symbol kind"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(AliasPresets::parse("c a.b =").is_err());
        assert!(AliasPresets::parse("c").is_err());
    }

    #[test]
    fn test_memory_store_respects_force() {
        let mut store = MemoryPresets::new();
        assert!(store.save(&sample(), false).unwrap());
        assert!(!store.save(&AliasPresets::new(), false).unwrap());
        assert_eq!(store.load().unwrap(), sample());
        assert!(store.loaded().is_some());

        store.clear();
        assert!(store.loaded().is_none());
        assert_eq!(store.presets(), &sample());

        assert!(store.save(&AliasPresets::new(), true).unwrap());
        assert!(store.presets().is_empty());
    }

    #[test]
    fn test_map_file_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = MapFilePresets::new(dir.path().join("missing.map"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_map_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.map");
        let mut store = MapFilePresets::new(&path);

        assert!(store.save(&sample(), false).unwrap());
        assert!(!store.save(&AliasPresets::new(), false).unwrap());
        assert_eq!(store.load().unwrap(), sample());
        assert_eq!(store.loaded(), Some(&sample()));

        store.clear();
        assert!(store.loaded().is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json() {
        let json = sample().to_json().unwrap();
        assert_eq!(AliasPresets::from_json(&json).unwrap(), sample());
    }
}
