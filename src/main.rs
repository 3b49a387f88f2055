use std::process::ExitCode;

use env_logger::Env;

use screen_ocr::config::{CaptureSettings, SettingsUpdate};

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut settings = CaptureSettings::default();
    if let Err(e) = SettingsUpdate::from_env().and_then(|update| settings.apply(update)) {
        log::error!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    run(settings)
}

#[cfg(windows)]
fn run(settings: CaptureSettings) -> ExitCode {
    match screen_ocr::app::runtime::run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(windows))]
fn run(_settings: CaptureSettings) -> ExitCode {
    log::error!("screen-ocr needs the Windows desktop to select and capture regions");
    ExitCode::FAILURE
}
