use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A simulated agent as broadcast by the simulation.
///
/// The simulation serializes additional bookkeeping fields (`ID`, `VX`,
/// `Health`, ...) which the viewer ignores.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Entity {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Width")]
    pub width: f64,
    #[serde(rename = "TeamID")]
    pub team_id: i64,
    #[serde(rename = "Active")]
    pub active: bool,
    #[serde(rename = "Invulnerable", default)]
    pub invulnerable: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Food {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Size")]
    pub size: f64,
    #[serde(rename = "Active")]
    pub active: bool,
}

/// One complete state update. `team_count` stays signed so that a
/// non-positive count is reported by the classifier instead of failing decode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "Entities", default, deserialize_with = "null_as_empty")]
    pub entities: Vec<Entity>,
    #[serde(rename = "Foods", default, deserialize_with = "null_as_empty")]
    pub foods: Vec<Food>,
    #[serde(rename = "TeamCount")]
    pub team_count: i64,
}

impl Snapshot {
    /// Lift a legacy rectangle frame into a single-team snapshot with no food.
    pub fn from_legacy(rects: &[LegacyRect]) -> Self {
        let entities = rects
            .iter()
            .map(|rect| Entity {
                x: rect.x + rect.width / 2.0,
                y: rect.y + rect.height / 2.0,
                width: rect.width.min(rect.height) / 2.0,
                team_id: 0,
                active: true,
                invulnerable: false,
            })
            .collect();
        Self {
            entities,
            foods: Vec::new(),
            team_count: 1,
        }
    }
}

/// Rectangle served by the `/simulate` polling endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LegacyRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Simulation parameters submitted by the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    pub team_count: u32,
    pub population: u32,
    pub food_count: u32,
    pub min_size: f64,
    pub start_max_size: f64,
    pub max_size: f64,
    pub base_speed: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            team_count: 2,
            population: 10,
            food_count: 200,
            min_size: 5.0,
            start_max_size: 10.0,
            max_size: 15.0,
            base_speed: 10.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SettingsError {
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
    #[error("size bounds out of order: min {min} <= start max {start_max} <= max {max} required")]
    SizeOrder { min: f64, start_max: f64, max: f64 },
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let counts = [
            ("TeamCount", self.team_count),
            ("Population", self.population),
            ("FoodCount", self.food_count),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(SettingsError::NotPositive { field });
            }
        }
        let reals = [
            ("MinSize", self.min_size),
            ("StartMaxSize", self.start_max_size),
            ("MaxSize", self.max_size),
            ("BaseSpeed", self.base_speed),
        ];
        for (field, value) in reals {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::NotPositive { field });
            }
        }
        if self.min_size > self.start_max_size || self.start_max_size > self.max_size {
            return Err(SettingsError::SizeOrder {
                min: self.min_size,
                start_max: self.start_max_size,
                max: self.max_size,
            });
        }
        Ok(())
    }
}

/// Outbound message from the viewer to the simulation.
///
/// All variants share one key casing: a `Type` discriminator followed by
/// PascalCase fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type", rename_all = "lowercase")]
pub enum ControlMessage {
    Click {
        #[serde(rename = "X")]
        x: f64,
        #[serde(rename = "Y")]
        y: f64,
    },
    Resize {
        #[serde(rename = "Width")]
        width: u32,
        #[serde(rename = "Height")]
        height: u32,
    },
    Settings(Settings),
}

impl ControlMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ControlMessage::Click { .. } => "click",
            ControlMessage::Resize { .. } => "resize",
            ControlMessage::Settings(_) => "settings",
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("frame is not UTF-8 text")]
    NotText,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn decode_snapshot_json(data: &str) -> Result<Snapshot, DecodeError> {
    Ok(serde_json::from_str(data)?)
}

pub fn decode_snapshot_bytes(data: &[u8]) -> Result<Snapshot, DecodeError> {
    let text = std::str::from_utf8(data).map_err(|_| DecodeError::NotText)?;
    decode_snapshot_json(text)
}

pub fn decode_legacy_rects_json(data: &str) -> Result<Vec<LegacyRect>, DecodeError> {
    Ok(serde_json::from_str(data)?)
}

pub fn encode_control_json(message: &ControlMessage) -> serde_json::Result<String> {
    serde_json::to_string(message)
}

pub fn decode_control_json(data: &str) -> Result<ControlMessage, DecodeError> {
    Ok(serde_json::from_str(data)?)
}
