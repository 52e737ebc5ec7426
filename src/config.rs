//! Simulation tuning and quality presets
//!
//! Every coefficient the simulation uses lives here so hosts can tune the
//! feel of the field from JSON without touching code.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Parse a preset name as given on the command line
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Ambient particle population for this preset
    pub fn ambient_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 20,
            QualityPreset::Medium => 50,
            QualityPreset::High => 120,
        }
    }

    /// Particles spawned per selection burst
    pub fn burst_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 8,
            QualityPreset::Medium => 24,
            QualityPreset::High => 40,
        }
    }
}

/// Simulation parameters
///
/// Velocities and forces are expressed per fixed tick (pixels/tick), matching
/// the frame-locked feel of the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for initial layout and particle spawning
    pub seed: u64,
    /// Quality preset the particle counts were derived from
    pub quality: QualityPreset,

    // === Bubbles ===
    /// Smallest base radius assigned at initialization
    pub base_radius_min: f32,
    /// Largest base radius assigned at initialization
    pub base_radius_max: f32,
    /// Hard floor for the animated radius
    pub min_radius: f32,
    /// External scale applied to bubble mass
    pub intensity: f32,

    // === Forces ===
    /// Pull toward the pointer for hovered bubbles
    pub attraction: f32,
    /// Overlap push between colliding bubbles
    pub repulsion: f32,
    /// Constant upward drift
    pub lift: f32,
    /// Velocity damping factor applied each tick
    pub friction: f32,
    /// Fraction of normal velocity kept after a wall bounce
    pub restitution: f32,

    // === Radius animation ===
    /// Fraction of the remaining radius gap closed each tick
    pub spring_stiffness: f32,
    /// Per-bubble stiffness is scaled by a random factor in [1 - jitter, 1]
    pub stiffness_jitter: f32,
    /// Relative size of the idle breathing motion
    pub pulse_amplitude: f32,
    /// Pulse phase advance per tick (radians)
    pub pulse_speed: f32,
    /// Radius multiplier while hovered
    pub hover_scale: f32,
    /// Radius multiplier while expanded
    pub expand_scale: f32,

    // === Ambient particles ===
    pub ambient_count: usize,
    pub ambient_speed: f32,
    pub ambient_size_min: f32,
    pub ambient_size_max: f32,
    pub ambient_alpha_min: f32,
    pub ambient_alpha_max: f32,
    pub ambient_decay: f32,
    pub ambient_min_lifespan: f32,

    // === Burst particles ===
    pub burst_count: usize,
    pub burst_speed_min: f32,
    pub burst_speed_max: f32,
    pub burst_size_min: f32,
    pub burst_size_max: f32,
    pub burst_decay: f32,
    pub burst_drag: f32,
    pub burst_min_lifespan: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        let quality = QualityPreset::default();
        Self {
            seed: 42,
            quality,

            base_radius_min: 40.0,
            base_radius_max: 70.0,
            min_radius: 8.0,
            intensity: 1.0,

            attraction: 0.0015,
            repulsion: 0.05,
            lift: 0.01,
            friction: 0.98,
            restitution: 0.7,

            spring_stiffness: 0.1,
            stiffness_jitter: 0.15,
            pulse_amplitude: 0.05,
            pulse_speed: 0.03,
            hover_scale: 1.15,
            expand_scale: 1.6,

            ambient_count: quality.ambient_particles(),
            ambient_speed: 0.4,
            ambient_size_min: 1.0,
            ambient_size_max: 3.0,
            ambient_alpha_min: 0.2,
            ambient_alpha_max: 0.6,
            ambient_decay: 0.995,
            ambient_min_lifespan: 0.3,

            burst_count: quality.burst_particles(),
            burst_speed_min: 2.0,
            burst_speed_max: 5.0,
            burst_size_min: 2.0,
            burst_size_max: 4.0,
            burst_decay: 0.95,
            burst_drag: 0.96,
            burst_min_lifespan: 0.6,
        }
    }
}

impl SimConfig {
    /// Create a config from a quality preset (applies preset particle counts)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    /// Apply a quality preset (updates particle populations)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;
        self.ambient_count = preset.ambient_particles();
        self.burst_count = preset.burst_particles();
    }

    /// Parse and validate a config from JSON. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every coefficient against the range the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("base_radius_min", self.base_radius_min)?;
        at_least("base_radius_max", self.base_radius_max, self.base_radius_min, ">= base_radius_min")?;
        positive("min_radius", self.min_radius)?;
        positive("intensity", self.intensity)?;

        non_negative("attraction", self.attraction)?;
        non_negative("repulsion", self.repulsion)?;
        finite("lift", self.lift)?;
        unit_open_closed("friction", self.friction)?;
        unit_closed("restitution", self.restitution)?;

        unit_open_closed("spring_stiffness", self.spring_stiffness)?;
        if !(0.0..1.0).contains(&self.stiffness_jitter) {
            return Err(out_of_range("stiffness_jitter", self.stiffness_jitter, "0 <= x < 1"));
        }
        non_negative("pulse_amplitude", self.pulse_amplitude)?;
        finite("pulse_speed", self.pulse_speed)?;
        positive("hover_scale", self.hover_scale)?;
        positive("expand_scale", self.expand_scale)?;

        non_negative("ambient_speed", self.ambient_speed)?;
        positive("ambient_size_min", self.ambient_size_min)?;
        at_least("ambient_size_max", self.ambient_size_max, self.ambient_size_min, ">= ambient_size_min")?;
        unit_closed("ambient_alpha_min", self.ambient_alpha_min)?;
        unit_closed("ambient_alpha_max", self.ambient_alpha_max)?;
        at_least("ambient_alpha_max", self.ambient_alpha_max, self.ambient_alpha_min, ">= ambient_alpha_min")?;
        unit_open("ambient_decay", self.ambient_decay)?;
        unit_open_closed("ambient_min_lifespan", self.ambient_min_lifespan)?;

        non_negative("burst_speed_min", self.burst_speed_min)?;
        at_least("burst_speed_max", self.burst_speed_max, self.burst_speed_min, ">= burst_speed_min")?;
        positive("burst_size_min", self.burst_size_min)?;
        at_least("burst_size_max", self.burst_size_max, self.burst_size_min, ">= burst_size_min")?;
        unit_open("burst_decay", self.burst_decay)?;
        unit_open_closed("burst_drag", self.burst_drag)?;
        unit_open_closed("burst_min_lifespan", self.burst_min_lifespan)?;

        Ok(())
    }
}

fn out_of_range(field: &'static str, value: f32, expected: &'static str) -> ConfigError {
    ConfigError::OutOfRange {
        field,
        value,
        expected,
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(out_of_range(field, value, "finite"))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value, "> 0"))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value, ">= 0"))
    }
}

fn at_least(
    field: &'static str,
    value: f32,
    floor: f32,
    expected: &'static str,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= floor {
        Ok(())
    } else {
        Err(out_of_range(field, value, expected))
    }
}

fn unit_closed(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(out_of_range(field, value, "0 <= x <= 1"))
    }
}

fn unit_open_closed(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value, "0 < x <= 1"))
    }
}

fn unit_open(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(out_of_range(field, value, "0 < x < 1"))
    }
}
