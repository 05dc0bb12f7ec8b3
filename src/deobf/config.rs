//! Rename engine settings.

/// Scalars read once before a [`Deobfuscator`](super::Deobfuscator) is built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeobfConfig {
    /// Names shorter than this are renamed.
    pub min_length: usize,
    /// Names longer than this are renamed.
    pub max_length: usize,
    /// Derive type aliases from the compiler-recorded source file name.
    pub use_source_name_as_alias: bool,
    /// Ignore existing presets and overwrite the map file on save.
    pub force_regenerate: bool,
}

impl Default for DeobfConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_length: 64,
            use_source_name_as_alias: true,
            force_regenerate: false,
        }
    }
}

impl DeobfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_source_name_alias(mut self, enabled: bool) -> Self {
        self.use_source_name_as_alias = enabled;
        self
    }

    pub fn with_force_regenerate(mut self, force: bool) -> Self {
        self.force_regenerate = force;
        self
    }
}
