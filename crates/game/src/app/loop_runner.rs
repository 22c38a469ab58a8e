use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use engine::run_headless;
use tracing::{error, info};

use super::bootstrap::{self, AppWiring};

pub(crate) fn run() -> ExitCode {
    let app = match bootstrap::build_app() {
        Ok(app) => app,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };
    run_app(app)
}

fn run_app(app: AppWiring) -> ExitCode {
    let AppWiring {
        mut runtime,
        script,
    } = app;
    let stdout = io::stdout();
    let result = match script {
        Some(path) => {
            let file = match File::open(&path) {
                Ok(file) => file,
                Err(err) => {
                    error!(path = %path.display(), error = %err, "script_open_failed");
                    return ExitCode::FAILURE;
                }
            };
            info!(path = %path.display(), "console_script_started");
            run_headless(&mut runtime, BufReader::new(file), stdout.lock())
        }
        None => run_headless(&mut runtime, io::stdin().lock(), stdout.lock()),
    };

    if let Err(err) = result {
        error!(error = %err, "console_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
