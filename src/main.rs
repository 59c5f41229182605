//! Binary entry point: open the contact database, then drive the Ratatui event
//! loop until the user exits.
use contact_book::{logging, run_app, App, AppConfig, Controller};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    logging::init(config.log_path.as_deref())?;
    info!(db = %config.db_path.display(), "starting contact book");

    let controller = Controller::open(&config.db_path)?;
    let mut app = App::new(controller);
    let result = run_app(&mut app);

    // Close even when the event loop failed; the loop error wins.
    let closed = app.into_controller().close();
    result?;
    closed?;

    info!("contact book closed");
    Ok(())
}
