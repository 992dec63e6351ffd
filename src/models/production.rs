//! # Production Description
//!
//! The fully-resolved, in-memory description of a production: characters,
//! locations, the ordered shot list and output formats. The engine only reads
//! it; scene assembly for each entry happens in host-bound collaborators.

use crate::config::{ConfigResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const MAX_PRODUCTION_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionConfig {
    pub production: ProductionInfo,
    #[serde(default)]
    pub characters: BTreeMap<String, CharacterConfig>,
    #[serde(default)]
    pub locations: BTreeMap<String, LocationConfig>,
    #[serde(default)]
    pub shots: Vec<ShotConfig>,
    #[serde(default)]
    pub outputs: Vec<OutputConfig>,
    /// File this description was loaded from
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionInfo {
    /// Key used for checkpoints and output directories
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CharacterConfig {
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(flatten)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(flatten)]
    pub properties: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub name: String,
    /// File extension / container, e.g. `mp4`, `png`, `exr`
    pub format: String,
    #[serde(default)]
    pub resolution: Option<[u32; 2]>,
    #[serde(default)]
    pub fps: Option<u32>,
}

impl OutputConfig {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.format)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: u32,
    pub end: u32,
}

impl FrameRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Inclusive frame count, zero when the range is inverted and saturating
    /// at `u32::MAX` for the full range
    pub fn frame_count(&self) -> u32 {
        if self.is_ordered() {
            (self.end - self.start).saturating_add(1)
        } else {
            0
        }
    }
}

/// One renderable unit of work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotConfig {
    pub name: String,
    #[serde(default)]
    pub template: String,
    pub scene: u32,
    /// Primary character; empty when the shot has none
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub character2: Option<String>,
    #[serde(default)]
    pub location: String,
    /// Length in frames
    pub duration: u32,
    pub frame_range: FrameRange,
    #[serde(default)]
    pub variations: u32,
}

impl ShotConfig {
    /// A shot with the given name and scene, one second at 24 fps, no cast
    pub fn new(name: impl Into<String>, scene: u32) -> Self {
        Self {
            name: name.into(),
            template: String::new(),
            scene,
            character: String::new(),
            character2: None,
            location: String::new(),
            duration: 24,
            frame_range: FrameRange::new(1, 24),
            variations: 0,
        }
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = character.into();
        self
    }

    pub fn with_character2(mut self, character: impl Into<String>) -> Self {
        self.character2 = Some(character.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn with_frames(mut self, start: u32, end: u32) -> Self {
        self.frame_range = FrameRange::new(start, end);
        self.duration = self.frame_range.frame_count();
        self
    }

    pub fn has_character(&self) -> bool {
        !self.character.is_empty()
    }

    /// Secondary character, when present and non-empty
    pub fn secondary_character(&self) -> Option<&str> {
        self.character2.as_deref().filter(|name| !name.is_empty())
    }
}

impl ProductionConfig {
    /// An empty production with the given id, used by builders and tests
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            production: ProductionInfo {
                id: id.into(),
                title: None,
                version: None,
            },
            characters: BTreeMap::new(),
            locations: BTreeMap::new(),
            shots: Vec::new(),
            outputs: Vec::new(),
            source: None,
        }
    }

    pub fn production_id(&self) -> &str {
        &self.production.id
    }

    pub fn shot_count(&self) -> usize {
        self.shots.len()
    }

    /// Reference stored alongside checkpoints to identify the originating config
    pub fn config_reference(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => format!("inline:{}", self.production.id),
        }
    }

    pub fn from_yaml_str(contents: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(contents).map_err(|e| ConfigurationError::invalid_yaml("<inline>", e))
    }

    /// Read and parse a production description, remembering its path
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let metadata = std::fs::metadata(path)
            .map_err(|e| ConfigurationError::file_read_error(display.clone(), e))?;
        if !metadata.is_file() {
            return Err(ConfigurationError::invalid_value(
                "file_type",
                "directory or special file",
                "production path must point to a regular file",
            ));
        }
        if metadata.len() > MAX_PRODUCTION_FILE_SIZE {
            return Err(ConfigurationError::invalid_value(
                "file_size",
                metadata.len().to_string(),
                format!(
                    "production file too large ({}MB > {}MB limit)",
                    metadata.len() / (1024 * 1024),
                    MAX_PRODUCTION_FILE_SIZE / (1024 * 1024)
                ),
            ));
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::file_read_error(display.clone(), e))?;
        let mut config: ProductionConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigurationError::invalid_yaml(display, e))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }
}
