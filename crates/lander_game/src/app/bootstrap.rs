use std::path::PathBuf;
use std::sync::Arc;

use mission_core::{load_mission_config, MissionConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::replay::{load_replay_script, ReplayScript};

pub(crate) const MISSION_ENV_VAR: &str = "LANDER_MISSION";
pub(crate) const REPLAY_ENV_VAR: &str = "LANDER_REPLAY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunPaths {
    pub(crate) mission: PathBuf,
    pub(crate) replay: PathBuf,
}

pub(crate) struct AppWiring {
    pub(crate) config: Arc<MissionConfig>,
    pub(crate) replay: ReplayScript,
}

pub(crate) fn build_app(args: &[String]) -> Result<AppWiring, String> {
    init_tracing();
    info!("=== Lander Mission Harness ===");

    let paths = resolve_run_paths(
        args,
        std::env::var(MISSION_ENV_VAR).ok(),
        std::env::var(REPLAY_ENV_VAR).ok(),
    )?;
    info!(
        mission = %paths.mission.display(),
        replay = %paths.replay.display(),
        "run_paths_resolved"
    );
    let config = load_mission_config(&paths.mission).map_err(|error| error.to_string())?;
    let replay = load_replay_script(&paths.replay)?;

    Ok(AppWiring {
        config: Arc::new(config),
        replay,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Positional arguments win over the environment; both paths are required.
pub(crate) fn resolve_run_paths(
    args: &[String],
    mission_env: Option<String>,
    replay_env: Option<String>,
) -> Result<RunPaths, String> {
    let pick = |index: usize, env_value: Option<String>, env_var: &str| {
        args.get(index)
            .cloned()
            .or(env_value)
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| {
                format!(
                    "missing {} path: pass <mission.json> <replay.json> or set {env_var}",
                    if index == 0 { "mission" } else { "replay" }
                )
            })
    };
    Ok(RunPaths {
        mission: pick(0, mission_env, MISSION_ENV_VAR)?,
        replay: pick(1, replay_env, REPLAY_ENV_VAR)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn positional_args_take_precedence() {
        let paths = resolve_run_paths(
            &args(&["m.json", "r.json"]),
            Some("env_m.json".to_string()),
            Some("env_r.json".to_string()),
        )
        .expect("paths");
        assert_eq!(paths.mission, PathBuf::from("m.json"));
        assert_eq!(paths.replay, PathBuf::from("r.json"));
    }

    #[test]
    fn environment_fills_missing_args() {
        let paths = resolve_run_paths(
            &args(&["m.json"]),
            None,
            Some(" env_r.json ".to_string()),
        )
        .expect("paths");
        assert_eq!(paths.mission, PathBuf::from("m.json"));
        assert_eq!(paths.replay, PathBuf::from("env_r.json"));
    }

    #[test]
    fn missing_paths_name_the_env_var() {
        let err = resolve_run_paths(&[], None, None).expect_err("missing");
        assert!(err.contains("mission"), "{err}");
        assert!(err.contains(MISSION_ENV_VAR), "{err}");

        let err = resolve_run_paths(&args(&["m.json", "  "]), None, None).expect_err("blank");
        assert!(err.contains(REPLAY_ENV_VAR), "{err}");
    }
}
