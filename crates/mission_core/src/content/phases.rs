use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::objectives::{specific_zone, ObjectiveSpec, ParamSource};
use super::types::DEFAULT_ARRIVAL_RADIUS;

pub const LEGACY_PHASE_ID: &str = "legacy";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseMode {
    #[default]
    Lander,
    Buggy,
    Rescue,
}

impl PhaseMode {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Lander => "lander",
            Self::Buggy => "buggy",
            Self::Rescue => "rescue",
        }
    }

    /// Whether entering a phase of this mode needs the host to switch vehicles.
    pub fn requires_mode_switch(self) -> bool {
        !matches!(self, Self::Lander)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneTarget {
    Any,
    Zone(String),
}

impl ZoneTarget {
    pub fn from_token(token: &str) -> Self {
        match specific_zone(token.to_string()) {
            Some(zone) => Self::Zone(zone),
            None => Self::Any,
        }
    }

    pub fn matches(&self, landed_zone: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Zone(target) => landed_zone == Some(target.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PhaseCompletion {
    /// Never advances on its own; mission end conditions decide.
    Legacy,
    LandedInZone { target: ZoneTarget },
    ReachedPoi { poi_id: String },
    RescuedTarget { target_id: String },
    ReachedPreviousLandingSite { arrival_radius: f32 },
}

impl PhaseCompletion {
    pub fn as_token(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::LandedInZone { .. } => "landed_in_zone",
            Self::ReachedPoi { .. } => "reached_poi",
            Self::RescuedTarget { .. } => "rescued_target",
            Self::ReachedPreviousLandingSite { .. } => "reached_previous_landing_site",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawPhaseSpec")]
pub struct PhaseSpec {
    pub id: String,
    pub mode: PhaseMode,
    pub objectives: Vec<ObjectiveSpec>,
    pub completion: PhaseCompletion,
}

impl PhaseSpec {
    /// The single implicit phase of a mission without a `phases` list.
    pub fn legacy(objectives: Vec<ObjectiveSpec>) -> Self {
        Self {
            id: LEGACY_PHASE_ID.to_string(),
            mode: PhaseMode::Lander,
            objectives,
            completion: PhaseCompletion::Legacy,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawPhaseSpec {
    id: String,
    #[serde(default)]
    mode: PhaseMode,
    #[serde(default)]
    objectives: Vec<ObjectiveSpec>,
    #[serde(default)]
    completion: RawCompletion,
}

#[derive(Debug, Default, Deserialize)]
struct RawCompletion {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    params: Map<String, Value>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl TryFrom<RawPhaseSpec> for PhaseSpec {
    type Error = String;

    fn try_from(raw: RawPhaseSpec) -> Result<Self, Self::Error> {
        if raw.id.trim().is_empty() {
            return Err("phase id cannot be empty".to_string());
        }
        let completion = parse_completion(&raw.completion)
            .map_err(|message| format!("phase '{}': {message}", raw.id))?;
        Ok(Self {
            id: raw.id,
            mode: raw.mode,
            objectives: raw.objectives,
            completion,
        })
    }
}

fn parse_completion(raw: &RawCompletion) -> Result<PhaseCompletion, String> {
    let source = ParamSource::new(&raw.params, &raw.fields);
    let completion = match raw.kind.trim() {
        "" | "legacy" => PhaseCompletion::Legacy,
        "landed_in_zone" => PhaseCompletion::LandedInZone {
            target: ZoneTarget::from_token(&source.string("target_zone")?.unwrap_or_default()),
        },
        "reached_poi" => PhaseCompletion::ReachedPoi {
            poi_id: required(source.string("poi_id")?, "poi_id")?,
        },
        "rescued_target" => PhaseCompletion::RescuedTarget {
            target_id: required(source.string("target_id")?, "target_id")?,
        },
        "reached_previous_landing_site" => PhaseCompletion::ReachedPreviousLandingSite {
            arrival_radius: source
                .f32("arrival_radius")?
                .filter(|radius| *radius > 0.0)
                .unwrap_or(DEFAULT_ARRIVAL_RADIUS),
        },
        other => return Err(format!("unknown completion type '{other}'")),
    };
    Ok(completion)
}

fn required(value: Option<String>, key: &str) -> Result<String, String> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| format!("completion requires parameter '{key}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completion_defaults_to_legacy() {
        let phase: PhaseSpec = serde_json::from_value(json!({ "id": "descent" })).expect("phase");
        assert_eq!(phase.mode, PhaseMode::Lander);
        assert_eq!(phase.completion, PhaseCompletion::Legacy);
    }

    #[test]
    fn landed_in_zone_reads_target_from_params() {
        let phase: PhaseSpec = serde_json::from_value(json!({
            "id": "descent",
            "completion": { "type": "landed_in_zone", "params": { "target_zone": "alpha" } }
        }))
        .expect("phase");
        assert_eq!(
            phase.completion,
            PhaseCompletion::LandedInZone {
                target: ZoneTarget::Zone("alpha".to_string())
            }
        );
    }

    #[test]
    fn any_marked_target_matches_every_zone() {
        let target = ZoneTarget::from_token("any_marked");
        assert_eq!(target, ZoneTarget::Any);
        assert!(target.matches(None));
        assert!(target.matches(Some("beta")));
        let specific = ZoneTarget::from_token("alpha");
        assert!(specific.matches(Some("alpha")));
        assert!(!specific.matches(Some("beta")));
        assert!(!specific.matches(None));
    }

    #[test]
    fn rescue_mode_and_target_parse() {
        let phase: PhaseSpec = serde_json::from_value(json!({
            "id": "rescue_crew",
            "mode": "rescue",
            "completion": { "type": "rescued_target", "target_id": "crew_1" }
        }))
        .expect("phase");
        assert_eq!(phase.mode, PhaseMode::Rescue);
        assert!(phase.mode.requires_mode_switch());
        assert_eq!(
            phase.completion,
            PhaseCompletion::RescuedTarget {
                target_id: "crew_1".to_string()
            }
        );
    }

    #[test]
    fn unknown_completion_type_names_the_phase() {
        let err = serde_json::from_value::<PhaseSpec>(json!({
            "id": "drive",
            "completion": { "type": "teleport" }
        }))
        .expect_err("err");
        let message = err.to_string();
        assert!(message.contains("drive"), "{message}");
        assert!(message.contains("teleport"), "{message}");
    }
}
