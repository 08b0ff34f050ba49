use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use winit::event_loop::EventLoop;

use peek::catalog::FileCatalog;
use peek::cli::{AppInfo, Cli, Options};
use peek::config::Config;
use peek::ui::App;
use peek::ui::state::ViewerState;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let info = AppInfo::from_build();
    let mut config = Config::in_working_dir();

    let Some(path) = cli.path.as_deref() else {
        let last: Option<String> = config.get("last_path");
        print!("{}", info.about(last.as_deref()));
        return ExitCode::SUCCESS;
    };

    let options = match Options::from_cli(&cli, path) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.print_command {
        let exe = std::env::current_exe().unwrap_or_else(|_| PathBuf::from(info.name));
        println!("{}", options.run_command(&exe));
        return ExitCode::SUCCESS;
    }

    if let Err(e) = config.set("last_path", options.target().display().to_string()) {
        log::error!("Could not write {:?}: {}", config.path(), e);
    }

    let (catalog, issues) =
        FileCatalog::build(&options.path, options.file.as_deref(), options.sort_order);
    for issue in &issues {
        log::warn!("{}", issue);
    }
    if catalog.is_empty() {
        log::warn!("No files found in {:?}", options.path);
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = ViewerState::new(info, catalog, &issues, &options);
    let mut app = App::new(state, &options);

    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop terminated: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
