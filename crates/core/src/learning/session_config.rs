use rand::Rng;
use thiserror::Error;

use crate::shared::constants::SAMPLE_RANGE;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("sample target {0} is outside the allowed range [5..200]")]
    SampleTargetOutOfRange(usize),
    #[error("name {0:?} cannot be used as a predictor name")]
    UnsafeName(String),
}

/// Validated parameters for one learning session.
///
/// Construction either yields a usable config or rejects the whole
/// session start; nothing about the running system changes on rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    name: String,
    positive_target: usize,
    negative_target: usize,
}

impl SessionConfig {
    /// A blank (or whitespace) name is replaced with a randomly generated
    /// `Object_<n>` name. Names double as store file names, so
    /// filesystem-hostile names are rejected outright rather than escaped.
    pub fn new(
        name: &str,
        positive_target: usize,
        negative_target: usize,
    ) -> Result<Self, ConfigError> {
        if !SAMPLE_RANGE.contains(&positive_target) {
            return Err(ConfigError::SampleTargetOutOfRange(positive_target));
        }
        if !SAMPLE_RANGE.contains(&negative_target) {
            return Err(ConfigError::SampleTargetOutOfRange(negative_target));
        }

        let trimmed = name.trim();
        let name = if trimmed.is_empty() {
            random_name()
        } else {
            validate_name(trimmed)?;
            trimmed.to_string()
        };

        Ok(Self {
            name,
            positive_target,
            negative_target,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn positive_target(&self) -> usize {
        self.positive_target
    }

    pub fn negative_target(&self) -> usize {
        self.negative_target
    }
}

fn random_name() -> String {
    format!("Object_{}", rand::thread_rng().gen_range(0..1000))
}

fn validate_name(name: &str) -> Result<(), ConfigError> {
    let hostile = name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
        || name.contains('\0');
    if hostile {
        return Err(ConfigError::UnsafeName(name.to_string()));
    }
    Ok(())
}
