//! Compilation options.

/// Target file format, as selected by the `-k` flag of CDL tools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// netCDF classic
    #[default]
    Classic,
    /// netCDF classic with 64-bit offsets
    Offset64,
    /// netCDF-4 enhanced model
    Netcdf4,
    /// netCDF-4 storage restricted to the classic model
    Netcdf4Classic,
}

impl Format {
    /// Formats restricted to the classic data model.
    pub fn is_classic_model(self) -> bool {
        !matches!(self, Format::Netcdf4)
    }

    /// Formats whose storage honors special attributes (`_ChunkSizes`, ...).
    pub fn allows_specials(self) -> bool {
        matches!(self, Format::Netcdf4 | Format::Netcdf4Classic)
    }
}

/// What to do with special attributes after parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialPolicy {
    /// Keep them as per-variable storage flags.
    Keep,
    /// Turn them back into ordinary attributes.
    Demote,
}

/// Configuration for one compilation.
#[derive(Clone, Debug)]
pub struct Config {
    /// Target file format
    pub(crate) format: Format,
    /// Bytes buffered per hyperslab write
    pub(crate) chunk_budget: usize,
    /// Explicit special-attribute policy; derived from `format` when unset
    pub(crate) special_policy: Option<SpecialPolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: Format::default(),
            chunk_budget: 1 << 20,
            special_policy: None,
        }
    }
}

impl Config {
    /// Create a new Config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target format.
    pub fn format(mut self, value: Format) -> Self {
        self.format = value;
        self
    }

    /// Set the byte budget per hyperslab write. Zero is raised to one byte.
    pub fn chunk_budget(mut self, bytes: usize) -> Self {
        self.chunk_budget = bytes.max(1);
        self
    }

    /// Override the special-attribute policy.
    pub fn special_policy(mut self, value: SpecialPolicy) -> Self {
        self.special_policy = Some(value);
        self
    }

    pub fn target_format(&self) -> Format {
        self.format
    }

    pub fn is_classic_model(&self) -> bool {
        self.format.is_classic_model()
    }

    pub fn budget(&self) -> usize {
        self.chunk_budget
    }

    pub fn specials(&self) -> SpecialPolicy {
        self.special_policy.unwrap_or(if self.format.allows_specials() {
            SpecialPolicy::Keep
        } else {
            SpecialPolicy::Demote
        })
    }
}
