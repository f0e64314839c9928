use std::path::PathBuf;

use clap::Parser;
use transitkit::{event_bus, init_logging, run_startup, AppContext, SettingsPersistence, StartupOptions};

/// Editor for public-transport track networks
#[derive(Debug, Parser)]
#[command(name = "transitkit", version, about)]
struct Cli {
    /// Do not show the splash banner
    #[arg(long)]
    no_splash: bool,

    /// Project to open on startup
    #[arg(long, value_name = "PATH")]
    project: Option<PathBuf>,

    /// Configuration directory to use instead of the platform default
    #[arg(long, value_name = "PATH")]
    home: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match SettingsPersistence::open(cli.home.as_deref())
        .and_then(|settings| settings.validate().map(|_| settings))
    {
        Ok(settings) => settings,
        Err(e) if e.is_content_error() => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(-1);
        }
        Err(e) => {
            eprintln!("Unable to read configuration: {}", e);
            std::process::exit(-1);
        }
    };

    init_logging(&settings.config().logging.level)?;
    tracing::info!(config = %settings.path().display(), "Starting TransitKit {}", transitkit::VERSION);

    let app = AppContext::start(settings.config(), event_bus())?;
    let options = StartupOptions {
        show_splash: !cli.no_splash && settings.config().ui.show_splash,
        project: cli.project,
    };
    run_startup(&app, &mut settings, &options)?;

    // Executor calls block, so the runtime is only used to wait for the signal
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(tokio::signal::ctrl_c())?;

    tracing::info!("Shutting down");
    app.shutdown();
    Ok(())
}
