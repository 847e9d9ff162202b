use std::fs;
use std::path::Path;

use mission_core::{MissionInput, Vec2};
use serde::Deserialize;
use tracing::info;

/// Timed list of inbound notifications replayed against one mission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ReplayScript {
    #[serde(default)]
    pub(crate) steps: Vec<ReplayStep>,
    /// Step size used to drive mission time between steps.
    #[serde(default = "default_tick_ms")]
    pub(crate) tick_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ReplayStep {
    pub(crate) at_ms: u64,
    pub(crate) input: MissionInput,
    /// Where the simulated vehicle sits when the input is applied.
    #[serde(default)]
    pub(crate) vehicle_position: Option<Vec2>,
}

fn default_tick_ms() -> u64 {
    100
}

pub(crate) fn load_replay_script(path: &Path) -> Result<ReplayScript, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("read replay '{}': {error}", path.display()))?;
    let script = parse_replay_script(&raw)?;
    info!(
        path = %path.display(),
        step_count = script.steps.len(),
        "replay_script_loaded"
    );
    Ok(script)
}

pub(crate) fn parse_replay_script(raw: &str) -> Result<ReplayScript, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let script = match serde_path_to_error::deserialize::<_, ReplayScript>(&mut deserializer) {
        Ok(script) => script,
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            return if path.is_empty() || path == "." {
                Err(format!("parse replay json: {source}"))
            } else {
                Err(format!("parse replay json at {path}: {source}"))
            };
        }
    };
    validate_replay_script(&script)?;
    Ok(script)
}

fn validation_err(path: &str, message: impl Into<String>) -> String {
    format!("validation failed at {path}: {}", message.into())
}

fn validate_replay_script(script: &ReplayScript) -> Result<(), String> {
    if script.tick_ms == 0 {
        return Err(validation_err("tick_ms", "expected > 0, got 0"));
    }
    let mut previous = 0_u64;
    for (index, step) in script.steps.iter().enumerate() {
        if step.at_ms < previous {
            return Err(validation_err(
                &format!("steps[{index}].at_ms"),
                format!("expected >= {previous}, got {}", step.at_ms),
            ));
        }
        previous = step.at_ms;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCRIPT: &str = r#"{
        "steps": [
            { "at_ms": 0, "input": { "kind": "begin_gameplay", "zone_id": "alpha" } },
            {
                "at_ms": 4000,
                "input": { "kind": "touchdown", "zone_id": "alpha", "impact_speed": 12, "successful": true },
                "vehicle_position": { "x": 104, "y": 40 }
            },
            { "at_ms": 4500, "input": { "kind": "complete_mission" } }
        ]
    }"#;

    #[test]
    fn script_parses_with_default_tick() {
        let script = parse_replay_script(SCRIPT).expect("script");
        assert_eq!(script.tick_ms, 100);
        assert_eq!(script.steps.len(), 3);
        assert_eq!(
            script.steps[0].input,
            MissionInput::BeginGameplay {
                zone_id: "alpha".to_string()
            }
        );
        assert_eq!(script.steps[2].input, MissionInput::CompleteMission);
        assert_eq!(script.steps[1].vehicle_position, Some(Vec2::new(104.0, 40.0)));
        assert_eq!(script.steps[0].vehicle_position, None);
    }

    #[test]
    fn out_of_order_steps_are_rejected() {
        let raw = r#"{ "steps": [
            { "at_ms": 500, "input": { "kind": "tick", "dt_seconds": 0.5 } },
            { "at_ms": 200, "input": { "kind": "timer_expired" } }
        ] }"#;
        let err = parse_replay_script(raw).expect_err("order");
        assert_eq!(
            err,
            "validation failed at steps[1].at_ms: expected >= 500, got 200"
        );
    }

    #[test]
    fn parse_error_reports_step_path() {
        let raw = r#"{ "steps": [
            { "at_ms": 0, "input": { "kind": "abort" } },
            { "at_ms": 10, "input": { "kind": "fuel_changed", "ratio": "full" } }
        ] }"#;
        let err = parse_replay_script(raw).expect_err("type");
        assert!(err.starts_with("parse replay json at steps[1]"), "{err}");
    }

    #[test]
    fn loads_script_from_disk() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("replay.json");
        fs::write(&path, SCRIPT).expect("write");
        let script = load_replay_script(&path).expect("load");
        assert_eq!(script.steps.len(), 3);

        let missing = load_replay_script(&dir.path().join("nope.json")).expect_err("missing");
        assert!(missing.starts_with("read replay"), "{missing}");
    }
}
