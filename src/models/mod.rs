pub mod production;
pub mod result;

// Re-export core models for easy access
pub use production::{
    CharacterConfig, FrameRange, LocationConfig, OutputConfig, ProductionConfig, ProductionInfo,
    ShotConfig,
};
pub use result::{ProductionResult, ShotOutcome, ShotReport};
