use std::collections::HashSet;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use super::objectives::ObjectiveRule;
use super::types::{MissionConfig, DEFAULT_LANDING_TOLERANCE_MULT};

#[derive(Debug, Error)]
pub enum MissionConfigError {
    #[error("failed to read mission file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse mission json: {message}")]
    Parse { message: String },
    #[error("parse mission json at {path}: {message}")]
    ParseAt { path: String, message: String },
    #[error("validation failed at {path}: {message}")]
    Invalid { path: String, message: String },
}

pub fn load_mission_config(path: &Path) -> Result<MissionConfig, MissionConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| MissionConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_mission_config(&raw)?;
    info!(
        mission_id = %config.id,
        path = %path.display(),
        phase_count = config.phases.len(),
        objective_count = config.objectives.len(),
        "mission_config_loaded"
    );
    Ok(config)
}

pub fn parse_mission_config(raw: &str) -> Result<MissionConfig, MissionConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let mut config = match serde_path_to_error::deserialize::<_, MissionConfig>(&mut deserializer)
    {
        Ok(config) => config,
        Err(error) => {
            let path = error.path().to_string();
            let message = error.into_inner().to_string();
            return Err(if path.is_empty() || path == "." {
                MissionConfigError::Parse { message }
            } else {
                MissionConfigError::ParseAt { path, message }
            });
        }
    };
    validate_mission_config(&config)?;
    sanitize_modifiers(&mut config);
    Ok(config)
}

fn invalid(path: impl Into<String>, message: impl Into<String>) -> MissionConfigError {
    MissionConfigError::Invalid {
        path: path.into(),
        message: message.into(),
    }
}

fn expected_actual(
    path: impl Into<String>,
    expected: impl Display,
    actual: impl Display,
) -> MissionConfigError {
    invalid(path, format!("expected {expected}, got {actual}"))
}

fn require_finite(path: &str, value: f32) -> Result<(), MissionConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(expected_actual(path, "finite number", value))
    }
}

pub fn validate_mission_config(config: &MissionConfig) -> Result<(), MissionConfigError> {
    let limit = config.failure_rules.time_limit_seconds;
    require_finite("failure_rules.time_limit_seconds", limit)?;
    if limit < 0.0 {
        return Err(expected_actual(
            "failure_rules.time_limit_seconds",
            "non-negative seconds",
            limit,
        ));
    }

    if let Some(spawn) = &config.spawn {
        require_finite("spawn.height_above_surface", spawn.height_above_surface)?;
        require_finite("spawn.x_offset", spawn.x_offset)?;
        if !spawn.initial_velocity.is_finite() {
            return Err(invalid("spawn.initial_velocity", "expected finite components"));
        }
    }

    let mut zone_ids = HashSet::new();
    for (index, zone) in config.terrain.landing_zones.iter().enumerate() {
        let path = format!("terrain.landing_zones[{index}]");
        if zone.id.trim().is_empty() {
            return Err(invalid(format!("{path}.id"), "landing zone id cannot be empty"));
        }
        if !zone_ids.insert(zone.id.as_str()) {
            return Err(invalid(
                format!("{path}.id"),
                format!("duplicate landing zone id '{}'", zone.id),
            ));
        }
        require_finite(&format!("{path}.center_x"), zone.center_x)?;
    }

    let mut phase_ids = HashSet::new();
    for (index, phase) in config.phases.iter().enumerate() {
        if !phase_ids.insert(phase.id.as_str()) {
            return Err(invalid(
                format!("phases[{index}].id"),
                format!("duplicate phase id '{}'", phase.id),
            ));
        }
        for (objective_index, objective) in phase.objectives.iter().enumerate() {
            validate_rule(
                &format!("phases[{index}].objectives[{objective_index}]"),
                &objective.rule,
            )?;
        }
    }
    for (index, objective) in config.objectives.iter().enumerate() {
        validate_rule(&format!("objectives[{index}]"), &objective.rule)?;
    }

    Ok(())
}

fn validate_rule(path: &str, rule: &ObjectiveRule) -> Result<(), MissionConfigError> {
    match rule {
        ObjectiveRule::TimeUnder { limit_seconds } => {
            require_finite(&format!("{path}.seconds"), *limit_seconds)?;
            if *limit_seconds <= 0.0 {
                return Err(expected_actual(
                    format!("{path}.seconds"),
                    "positive seconds",
                    limit_seconds,
                ));
            }
        }
        ObjectiveRule::FuelRemaining { min_ratio } => {
            if !(0.0..=1.0).contains(min_ratio) {
                return Err(expected_actual(
                    format!("{path}.min_fuel"),
                    "ratio in [0, 1]",
                    min_ratio,
                ));
            }
        }
        ObjectiveRule::PrecisionLanding {
            max_hull_damage_ratio,
        } => require_finite(&format!("{path}.max_hull_damage"), *max_hull_damage_ratio)?,
        ObjectiveRule::Landing {
            max_impact_speed, ..
        } => require_finite(&format!("{path}.max_impact_speed"), *max_impact_speed)?,
        _ => {}
    }
    Ok(())
}

/// Out-of-range modifiers are recoverable: they fall back to defaults.
fn sanitize_modifiers(config: &mut MissionConfig) {
    let mult = config.mission_modifiers.landing_tolerance_mult;
    if !mult.is_finite() || mult <= 0.0 {
        warn!(
            mission_id = %config.id,
            landing_tolerance_mult = mult,
            fallback = DEFAULT_LANDING_TOLERANCE_MULT,
            "landing_tolerance_mult_invalid_using_default"
        );
        config.mission_modifiers.landing_tolerance_mult = DEFAULT_LANDING_TOLERANCE_MULT;
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::content::PhaseCompletion;

    const PHASED_MISSION: &str = r#"{
        "id": "m_phased",
        "tier": 2,
        "spawn": { "zone_id": "alpha", "height_above_surface": 600 },
        "terrain": {
            "baseline": 0,
            "landing_zones": [{ "id": "alpha", "center_x": 120 }]
        },
        "phases": [
            {
                "id": "descent",
                "mode": "lander",
                "objectives": [{ "id": "touch", "type": "landing", "max_impact_speed": 30 }],
                "completion": { "type": "landed_in_zone", "target_zone": "alpha" }
            },
            {
                "id": "drive",
                "mode": "buggy",
                "objectives": [{ "id": "poi", "type": "reach_poi", "params": { "poi_id": "crater" } }],
                "completion": { "type": "reached_poi", "poi_id": "crater" }
            }
        ],
        "objectives": [{ "id": "fuel", "type": "fuel_remaining", "min_fuel": 0.2 }],
        "failure_rules": { "time_limit_seconds": 600 }
    }"#;

    #[test]
    fn phased_mission_parses() {
        let config = parse_mission_config(PHASED_MISSION).expect("config");
        assert_eq!(config.id, "m_phased");
        assert_eq!(config.tier, 2);
        assert!(config.uses_phases());
        assert_eq!(config.phases.len(), 2);
        assert_eq!(
            config.phases[1].completion,
            PhaseCompletion::ReachedPoi {
                poi_id: "crater".to_string()
            }
        );
        assert_eq!(config.time_limit_seconds(), Some(600.0));
        assert!((config.mission_modifiers.landing_tolerance_mult - 1.4).abs() < 1e-6);
    }

    #[test]
    fn parse_error_reports_json_path() {
        let raw = r#"{ "id": "m", "phases": [{ "id": "descent", "objectives": [{ "type": "warp" }] }] }"#;
        let err = parse_mission_config(raw).expect_err("err");
        match err {
            MissionConfigError::ParseAt { path, message } => {
                assert!(path.starts_with("phases[0].objectives[0]"), "{path}");
                assert!(message.contains("warp"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_phase_ids_are_rejected() {
        let raw = r#"{ "id": "m", "phases": [{ "id": "descent" }, { "id": "descent" }] }"#;
        let err = parse_mission_config(raw).expect_err("err");
        assert!(matches!(err, MissionConfigError::Invalid { ref path, .. } if path == "phases[1].id"));
    }

    #[test]
    fn negative_time_limit_is_rejected() {
        let raw = r#"{ "id": "m", "failure_rules": { "time_limit_seconds": -5 } }"#;
        let err = parse_mission_config(raw).expect_err("err");
        assert!(err.to_string().contains("failure_rules.time_limit_seconds"));
    }

    #[test]
    fn non_positive_tolerance_falls_back_to_default() {
        let raw = r#"{ "id": "m", "mission_modifiers": { "landing_tolerance_mult": 0 } }"#;
        let config = parse_mission_config(raw).expect("config");
        assert!(
            (config.mission_modifiers.landing_tolerance_mult - DEFAULT_LANDING_TOLERANCE_MULT)
                .abs()
                < 1e-6
        );
    }

    #[test]
    fn empty_object_is_an_empty_config() {
        let config = parse_mission_config("{}").expect("config");
        assert!(config.is_empty());
        assert_eq!(config.time_limit_seconds(), None);
    }

    #[test]
    fn load_reads_from_disk() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("mission.json");
        fs::write(&path, PHASED_MISSION).expect("write");
        let config = load_mission_config(&path).expect("load");
        assert_eq!(config.objectives.len(), 1);
    }

    #[test]
    fn load_missing_file_reports_path() {
        let temp = TempDir::new().expect("temp");
        let path = temp.path().join("missing.json");
        let err = load_mission_config(&path).expect_err("err");
        assert!(matches!(err, MissionConfigError::Read { .. }));
        assert!(err.to_string().contains("missing.json"));
    }
}
