//! Configuration
//!
//! [`SimulationConfig`] carries the gameplay constants and is plain data.
//! [`RuntimeConfig`] is read from the environment by the binary.

use std::env;

use serde::{Serialize, Deserialize};

// =============================================================================
// SIMULATION
// =============================================================================

/// Gameplay tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Distance moved per tick with both treads forward
    pub tank_speed: f64,
    /// Degrees turned per tick in a pivot (half of this in an arc turn)
    pub rotate_speed: f64,
    /// Range at which a unit stops closing and starts aiming
    pub fire_range: f64,
    /// Shell travel per tick
    pub muzzle_velocity: f64,
    /// Cooldown after firing, ms
    pub reload_ms: i64,
    /// Move orders complete inside this radius
    pub arrive_radius: f64,
    /// Impacts closer than this to the center destroy outright
    pub direct_hit_radius: f64,
    /// Heading error below which the heading snaps onto the target
    pub snap_angle: f64,
    /// Heading error above which the unit pivots in place
    pub arc_turn_limit: f64,
    /// Heading error allowed when firing
    pub fire_alignment: f64,
    /// Crater lifetime, ms
    pub crater_lifetime_ms: i64,
    /// Zoom must stay strictly above this
    pub min_zoom: f64,
    /// Wheel delta units per zoom step
    pub wheel_zoom_divisor: f64,
    /// Grid notch spacing in world units
    pub grid_spacing: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tank_speed: 2.0,
            rotate_speed: 2.0,
            fire_range: 400.0,
            muzzle_velocity: 50.0,
            reload_ms: 7_500,
            arrive_radius: 15.0,
            direct_hit_radius: 5.0,
            snap_angle: 2.5,
            arc_turn_limit: 30.0,
            fire_alignment: 1.0,
            crater_lifetime_ms: 10_000,
            min_zoom: 0.1,
            wheel_zoom_divisor: 1_000.0,
            grid_spacing: 50.0,
        }
    }
}

// =============================================================================
// RUNTIME
// =============================================================================

/// Highest accepted frame rate. Above this the frame period rounds to zero.
pub const MAX_TICK_RATE: u32 = 1_000;

/// Binary settings loaded from environment variables.
#[derive(Clone, Debug, PartialEq)]
pub struct RuntimeConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Frames per second
    pub tick_rate: u32,
    /// Canvas width in pixels
    pub canvas_width: f64,
    /// Canvas height in pixels
    pub canvas_height: f64,
    /// Tanks in the local skirmish
    pub tanks: usize,
    /// Random walls in the local skirmish
    pub walls: usize,
    /// Scenario seed; `None` draws one from the clock
    pub seed: Option<u64>,
    /// Frames to run before stopping; 0 runs until interrupted
    pub frames: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tick_rate: crate::TICK_RATE,
            canvas_width: 1280.0,
            canvas_height: 720.0,
            tanks: 6,
            walls: 4,
            seed: None,
            frames: 600,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let defaults = Self::default();

        let (canvas_width, canvas_height) = match lookup("TANK_BATTLE_CANVAS") {
            Some(raw) => parse_canvas(&raw)?,
            None => (defaults.canvas_width, defaults.canvas_height),
        };

        let tick_rate = parse_or(&lookup, "TANK_BATTLE_TICK_RATE", defaults.tick_rate)?;
        if tick_rate == 0 || tick_rate > MAX_TICK_RATE {
            return Err(ConfigError::Invalid("TANK_BATTLE_TICK_RATE", tick_rate.to_string()));
        }

        Ok(Self {
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            tick_rate,
            canvas_width,
            canvas_height,
            tanks: parse_or(&lookup, "TANK_BATTLE_TANKS", defaults.tanks)?,
            walls: parse_or(&lookup, "TANK_BATTLE_WALLS", defaults.walls)?,
            seed: lookup("TANK_BATTLE_SEED")
                .map(|raw| raw.parse().map_err(|_| ConfigError::Invalid("TANK_BATTLE_SEED", raw)))
                .transpose()?,
            frames: parse_or(&lookup, "TANK_BATTLE_FRAMES", defaults.frames)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid(key, raw)),
        None => Ok(default),
    }
}

fn parse_canvas(raw: &str) -> Result<(f64, f64), ConfigError> {
    let invalid = || ConfigError::Invalid("TANK_BATTLE_CANVAS", raw.to_string());
    let (w, h) = raw.split_once('x').ok_or_else(invalid)?;
    let width: f64 = w.trim().parse().map_err(|_| invalid())?;
    let height: f64 = h.trim().parse().map_err(|_| invalid())?;
    if width <= 0.0 || height <= 0.0 {
        return Err(invalid());
    }
    Ok((width, height))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Variable set but unparseable.
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
