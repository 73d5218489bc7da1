use clap::ArgMatches;

mod config_cmd;
mod open;
mod run;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("open", sub_matches)) => open::handle_open_command(sub_matches),
        Some(("config", sub_matches)) => config_cmd::handle_config_command(sub_matches),
        // `shelltabs` with no subcommand runs the engine.
        Some(("run", _)) | None => run::handle_run_command(),
        Some((unknown, _)) => Err(format!("Unknown command: {}", unknown).into()),
    }
}
