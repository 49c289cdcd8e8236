use deal_etl_import::{PipelineSettings, settings_path};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

/// Print the effective settings (file, environment and `--db` merged).
pub(crate) fn run_config_show(settings: &PipelineSettings) -> Result<(), CliError> {
    let path = settings_path();
    let origin = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not present, using defaults)", path.display())
    };
    log::info!(
        "{} {}",
        "Settings:".if_supports_color(Stdout, |t| t.bold()),
        origin
    );
    crate::log_blank();
    log::info!("{}", settings.to_toml_string()?.trim_end());
    Ok(())
}

pub(crate) fn run_config_path() -> Result<(), CliError> {
    log::info!("{}", settings_path().display());
    Ok(())
}
