//! Production validation
//!
//! The VALIDATE phase hands the production description to a
//! [`ProductionValidator`]. Any reported error is fatal to the run; warnings
//! are carried into the production result.

use crate::models::ProductionConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single finding, located by a dotted path into the production description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue::new(path, message));
    }

    pub fn warning(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue::new(path, message));
    }
}

/// Checks a production description before any phase does work
pub trait ProductionValidator: Send + Sync {
    fn validate(&self, config: &ProductionConfig) -> ValidationResult;
}

/// Structural checks: shot list shape and cross references
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralValidator;

impl ProductionValidator for StructuralValidator {
    fn validate(&self, config: &ProductionConfig) -> ValidationResult {
        let mut result = ValidationResult::default();

        if config.production.id.trim().is_empty() {
            result.error("production.id", "production id must not be empty");
        }

        if config.shots.is_empty() {
            result.error("shots", "production has no shots");
        }

        if config.outputs.is_empty() {
            result.warning("outputs", "no output formats configured; nothing will be exported");
        }

        let mut seen_names = HashSet::new();
        for (index, shot) in config.shots.iter().enumerate() {
            let path = format!("shots[{index}]");

            if shot.name.trim().is_empty() {
                result.error(format!("{path}.name"), "shot name must not be empty");
            } else if !seen_names.insert(shot.name.as_str()) {
                result.warning(
                    format!("{path}.name"),
                    format!("duplicate shot name '{}'", shot.name),
                );
            }

            if !shot.frame_range.is_ordered() {
                result.error(
                    format!("{path}.frame_range"),
                    format!(
                        "start frame {} is after end frame {}",
                        shot.frame_range.start, shot.frame_range.end
                    ),
                );
            }

            if shot.duration == 0 {
                result.error(format!("{path}.duration"), "duration must be at least one frame");
            }

            if shot.has_character() && !config.characters.contains_key(&shot.character) {
                result.error(
                    format!("{path}.character"),
                    format!("unknown character '{}'", shot.character),
                );
            }

            if let Some(secondary) = shot.secondary_character() {
                if !config.characters.contains_key(secondary) {
                    result.error(
                        format!("{path}.character2"),
                        format!("unknown character '{secondary}'"),
                    );
                } else if secondary == shot.character {
                    result.warning(
                        format!("{path}.character2"),
                        "secondary character repeats the primary character",
                    );
                }
            }

            if !shot.location.is_empty() && !config.locations.contains_key(&shot.location) {
                result.error(
                    format!("{path}.location"),
                    format!("unknown location '{}'", shot.location),
                );
            }
        }

        result
    }
}
