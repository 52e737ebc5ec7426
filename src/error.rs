//! Configuration errors
//!
//! Simulation operations never fail; degenerate input is absorbed in place.
//! Only loading and validating a `SimConfig` can be rejected.

/// Error raised while loading or validating a simulation config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config JSON could not be parsed
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A numeric field is outside its accepted range
    #[error("config field `{field}` = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        expected: &'static str,
    },
}
