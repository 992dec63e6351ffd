use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline phases of a production run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionPhase {
    /// Check the production description before any work happens
    Validate,
    /// Prepare output locations and the host scene
    Prepare,
    /// Build or load character assets
    Characters,
    /// Build or load location sets
    Locations,
    /// Render every shot
    Shots,
    /// Post-process rendered material
    PostProcess,
    /// Export to the configured output formats
    Export,
    /// Write the manifest and release resources
    Finalize,
}

impl ExecutionPhase {
    /// The fixed phase ordering
    pub const ALL: [ExecutionPhase; 8] = [
        Self::Validate,
        Self::Prepare,
        Self::Characters,
        Self::Locations,
        Self::Shots,
        Self::PostProcess,
        Self::Export,
        Self::Finalize,
    ];

    /// Position of this phase in [`ExecutionPhase::ALL`]
    pub fn index(&self) -> usize {
        match self {
            Self::Validate => 0,
            Self::Prepare => 1,
            Self::Characters => 2,
            Self::Locations => 3,
            Self::Shots => 4,
            Self::PostProcess => 5,
            Self::Export => 6,
            Self::Finalize => 7,
        }
    }

    /// The phase that follows this one, `None` for the last phase
    pub fn next(&self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Check if this is the last phase of the pipeline
    pub fn is_last(&self) -> bool {
        matches!(self, Self::Finalize)
    }
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validate => write!(f, "validate"),
            Self::Prepare => write!(f, "prepare"),
            Self::Characters => write!(f, "characters"),
            Self::Locations => write!(f, "locations"),
            Self::Shots => write!(f, "shots"),
            Self::PostProcess => write!(f, "post_process"),
            Self::Export => write!(f, "export"),
            Self::Finalize => write!(f, "finalize"),
        }
    }
}

impl std::str::FromStr for ExecutionPhase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "validate" => Ok(Self::Validate),
            "prepare" => Ok(Self::Prepare),
            "characters" => Ok(Self::Characters),
            "locations" => Ok(Self::Locations),
            "shots" => Ok(Self::Shots),
            "post_process" => Ok(Self::PostProcess),
            "export" => Ok(Self::Export),
            "finalize" => Ok(Self::Finalize),
            _ => Err(format!("Invalid execution phase: {s}")),
        }
    }
}

impl Default for ExecutionPhase {
    fn default() -> Self {
        Self::Validate
    }
}

/// Lifecycle status of a production run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Created, not started
    Pending,
    /// Being driven by an engine
    Running,
    /// Stopped cooperatively, resumable
    Paused,
    /// Every phase succeeded
    Completed,
    /// A phase failed; resumable from a checkpoint
    Failed,
    /// Stopped on request, not resumable
    Cancelled,
}

impl RunStatus {
    /// Check if this is a terminal state (no further mutation allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Check if a checkpoint in this state may be resumed
    pub fn is_resumable(&self) -> bool {
        matches!(self, Self::Paused | Self::Failed)
    }

    /// Check if the run is currently being driven
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Check if the run stopped before finishing without failing
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Paused | Self::Cancelled)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid run status: {s}")),
        }
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::Pending
    }
}
