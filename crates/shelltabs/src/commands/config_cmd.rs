use clap::ArgMatches;

use shelltabs_core::config::{config_file_path, load_or_default};

pub fn handle_config_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("path", _)) => {
            println!("{}", config_file_path().display());
            Ok(())
        }
        Some(("show", _)) | None => {
            let config = load_or_default(&config_file_path());
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        Some((unknown, _)) => Err(format!("Unknown config subcommand: {}", unknown).into()),
    }
}
