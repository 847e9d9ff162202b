use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::types::DEFAULT_ARRIVAL_RADIUS;

pub const ANY_ZONE_TOKEN: &str = "any";
pub const ANY_MARKED_ZONE_TOKEN: &str = "any_marked";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    ReachPoi,
    RescueInteract,
    Landing,
    PrecisionLanding,
    LandingAccuracy,
    ReturnToOrbit,
    TimeUnder,
    FuelRemaining,
    NoDamage,
    ReachPreviousLandingSite,
}

impl ObjectiveKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "reach_poi" => Some(Self::ReachPoi),
            "rescue_interact" => Some(Self::RescueInteract),
            "landing" => Some(Self::Landing),
            "precision_landing" => Some(Self::PrecisionLanding),
            "landing_accuracy" => Some(Self::LandingAccuracy),
            "return_to_orbit" => Some(Self::ReturnToOrbit),
            "time_under" => Some(Self::TimeUnder),
            "fuel_remaining" => Some(Self::FuelRemaining),
            "no_damage" => Some(Self::NoDamage),
            "reach_previous_landing_site" => Some(Self::ReachPreviousLandingSite),
            _ => None,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::ReachPoi => "reach_poi",
            Self::RescueInteract => "rescue_interact",
            Self::Landing => "landing",
            Self::PrecisionLanding => "precision_landing",
            Self::LandingAccuracy => "landing_accuracy",
            Self::ReturnToOrbit => "return_to_orbit",
            Self::TimeUnder => "time_under",
            Self::FuelRemaining => "fuel_remaining",
            Self::NoDamage => "no_damage",
            Self::ReachPreviousLandingSite => "reach_previous_landing_site",
        }
    }
}

/// Type-specific parameters of an objective, resolved once at load time.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectiveRule {
    ReachPoi {
        poi_id: String,
    },
    RescueInteract {
        target_id: String,
    },
    /// `zone_id: None` accepts any zone; `max_impact_speed == 0` means no cap.
    Landing {
        zone_id: Option<String>,
        max_impact_speed: f32,
    },
    PrecisionLanding {
        max_hull_damage_ratio: f32,
    },
    LandingAccuracy {
        zone_id: String,
    },
    ReturnToOrbit {
        min_altitude: Option<f32>,
    },
    TimeUnder {
        limit_seconds: f32,
    },
    FuelRemaining {
        min_ratio: f32,
    },
    NoDamage,
    ReachPreviousLandingSite {
        arrival_radius: f32,
    },
}

impl ObjectiveRule {
    pub fn kind(&self) -> ObjectiveKind {
        match self {
            Self::ReachPoi { .. } => ObjectiveKind::ReachPoi,
            Self::RescueInteract { .. } => ObjectiveKind::RescueInteract,
            Self::Landing { .. } => ObjectiveKind::Landing,
            Self::PrecisionLanding { .. } => ObjectiveKind::PrecisionLanding,
            Self::LandingAccuracy { .. } => ObjectiveKind::LandingAccuracy,
            Self::ReturnToOrbit { .. } => ObjectiveKind::ReturnToOrbit,
            Self::TimeUnder { .. } => ObjectiveKind::TimeUnder,
            Self::FuelRemaining { .. } => ObjectiveKind::FuelRemaining,
            Self::NoDamage => ObjectiveKind::NoDamage,
            Self::ReachPreviousLandingSite { .. } => ObjectiveKind::ReachPreviousLandingSite,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawObjectiveSpec")]
pub struct ObjectiveSpec {
    pub id: String,
    pub label: String,
    pub bonus: bool,
    pub rule: ObjectiveRule,
}

impl ObjectiveSpec {
    pub fn new(id: impl Into<String>, rule: ObjectiveRule) -> Self {
        Self {
            id: id.into(),
            label: String::new(),
            bonus: false,
            rule,
        }
    }

    pub fn kind(&self) -> ObjectiveKind {
        self.rule.kind()
    }
}

#[derive(Debug, Deserialize)]
struct RawObjectiveSpec {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    bonus: bool,
    #[serde(default)]
    params: Map<String, Value>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl TryFrom<RawObjectiveSpec> for ObjectiveSpec {
    type Error = String;

    fn try_from(raw: RawObjectiveSpec) -> Result<Self, Self::Error> {
        let kind = ObjectiveKind::from_token(raw.kind.trim())
            .ok_or_else(|| format!("unknown objective type '{}'", raw.kind))?;
        let source = ParamSource::new(&raw.params, &raw.fields);
        let rule = match kind {
            ObjectiveKind::ReachPoi => ObjectiveRule::ReachPoi {
                poi_id: source.required_string("poi_id", kind)?,
            },
            ObjectiveKind::RescueInteract => ObjectiveRule::RescueInteract {
                target_id: source.required_string("target_id", kind)?,
            },
            ObjectiveKind::Landing => ObjectiveRule::Landing {
                zone_id: source.string("zone_id")?.and_then(specific_zone),
                max_impact_speed: source.f32("max_impact_speed")?.unwrap_or(0.0).max(0.0),
            },
            ObjectiveKind::PrecisionLanding => ObjectiveRule::PrecisionLanding {
                max_hull_damage_ratio: source.f32("max_hull_damage")?.unwrap_or(0.0),
            },
            ObjectiveKind::LandingAccuracy => ObjectiveRule::LandingAccuracy {
                zone_id: source.required_string("zone_id", kind)?,
            },
            ObjectiveKind::ReturnToOrbit => ObjectiveRule::ReturnToOrbit {
                min_altitude: source.f32("min_altitude")?.filter(|value| *value > 0.0),
            },
            ObjectiveKind::TimeUnder => ObjectiveRule::TimeUnder {
                limit_seconds: source.required_f32("seconds", kind)?,
            },
            ObjectiveKind::FuelRemaining => ObjectiveRule::FuelRemaining {
                min_ratio: source.required_f32("min_fuel", kind)?,
            },
            ObjectiveKind::NoDamage => ObjectiveRule::NoDamage,
            ObjectiveKind::ReachPreviousLandingSite => ObjectiveRule::ReachPreviousLandingSite {
                arrival_radius: source
                    .f32("arrival_radius")?
                    .filter(|radius| *radius > 0.0)
                    .unwrap_or(DEFAULT_ARRIVAL_RADIUS),
            },
        };

        let id = if raw.id.trim().is_empty() {
            kind.as_token().to_string()
        } else {
            raw.id
        };
        Ok(Self {
            id,
            label: raw.label,
            bonus: raw.bonus,
            rule,
        })
    }
}

/// `None` for wildcard zone targets.
pub(crate) fn specific_zone(zone_id: String) -> Option<String> {
    let trimmed = zone_id.trim();
    if trimmed.is_empty() || trimmed == ANY_ZONE_TOKEN || trimmed == ANY_MARKED_ZONE_TOKEN {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parameter lookup over a nested `params` map with the record's own fields
/// as fallback. `params` wins when both carry a key.
pub(crate) struct ParamSource<'a> {
    params: &'a Map<String, Value>,
    fields: &'a Map<String, Value>,
}

impl<'a> ParamSource<'a> {
    pub(crate) fn new(params: &'a Map<String, Value>, fields: &'a Map<String, Value>) -> Self {
        Self { params, fields }
    }

    fn value(&self, key: &str) -> Option<&'a Value> {
        self.params
            .get(key)
            .filter(|value| !value.is_null())
            .or_else(|| self.fields.get(key).filter(|value| !value.is_null()))
    }

    pub(crate) fn f32(&self, key: &str) -> Result<Option<f32>, String> {
        match self.value(key) {
            None => Ok(None),
            Some(value) => value
                .as_f64()
                .map(|number| Some(number as f32))
                .ok_or_else(|| format!("parameter '{key}' must be a number, got {value}")),
        }
    }

    pub(crate) fn string(&self, key: &str) -> Result<Option<String>, String> {
        match self.value(key) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(value) => Err(format!("parameter '{key}' must be a string, got {value}")),
        }
    }

    fn required_f32(&self, key: &str, kind: ObjectiveKind) -> Result<f32, String> {
        self.f32(key)?.ok_or_else(|| missing(key, kind))
    }

    fn required_string(&self, key: &str, kind: ObjectiveKind) -> Result<String, String> {
        self.string(key)?
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| missing(key, kind))
    }
}

fn missing(key: &str, kind: ObjectiveKind) -> String {
    format!(
        "objective type '{}' requires parameter '{key}'",
        kind.as_token()
    )
}
