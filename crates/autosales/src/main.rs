mod bootstrap;
mod output;

use std::sync::Arc;

use anyhow::Result;
use autosales_core::settings::Settings;
use autosales_data::reader::load_dataset;
use autosales_data::report::ReportMode;
use autosales_runtime::report_session::ReportSession;
use autosales_ui::app::App;

fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::setup_logging(
        &settings.log_level,
        settings.log_file.as_ref(),
        settings.is_interactive(),
    )?;

    tracing::info!("Automobile sales dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Data: {}, Mode: {}, Output: {}, Theme: {}",
        settings.data.display(),
        settings.mode,
        settings.output,
        settings.theme
    );

    let dataset = Arc::new(load_dataset(&settings.data)?);
    let mode = ReportMode::from_settings(&settings.mode, settings.year, &dataset)?;
    let mut session = ReportSession::with_mode(Arc::clone(&dataset), mode);

    match settings.output.as_str() {
        "tui" => {
            App::new(session, &settings.theme, settings.show_raw).run()?;
            tracing::info!("Dashboard closed");
        }
        "text" => {
            print!("{}", output::render_report(session.report()?));
            if settings.show_raw {
                println!();
                print!("{}", output::render_raw(&dataset));
            }
        }
        "json" => {
            println!("{}", session.report()?.to_json_pretty()?);
        }
        unknown => anyhow::bail!("Unknown output format: {unknown}"),
    }

    Ok(())
}
