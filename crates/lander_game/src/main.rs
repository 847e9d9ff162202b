use std::process::ExitCode;

mod app;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match app::bootstrap::build_app(&args) {
        Ok(wiring) => app::loop_runner::run(wiring),
        Err(message) => {
            tracing::error!(error = %message, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
