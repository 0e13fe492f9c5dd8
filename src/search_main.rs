use clap::Parser;

use langsift::Settings;
use langsift::cli::SearchCli;
use langsift::cli::commands::search;

fn main() {
    let cli = SearchCli::parse();

    let settings = Settings::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        Settings::default()
    });
    langsift::logging::init_with_config(&settings.logging);

    if let Err(e) = search::run(&settings) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
