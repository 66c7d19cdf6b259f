//! Binary entrypoint that launches the alimtalk studio.

use std::process::ExitCode;

use alimtalk_studio::start_alimtalk_studio;

/// Start the studio server with configuration from the environment.
fn main() -> ExitCode {
    start_alimtalk_studio::run()
}
