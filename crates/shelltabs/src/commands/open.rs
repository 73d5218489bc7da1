use clap::ArgMatches;

pub fn handle_open_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let path = matches
        .get_one::<String>("path")
        .expect("path is a required argument");
    let origin: isize = matches
        .get_one::<String>("origin")
        .map(|s| s.as_str())
        .unwrap_or("0")
        .parse()
        .map_err(|_| "origin must be a decimal window handle")?;

    send_to_running_instance(origin, path)
}

#[cfg(windows)]
fn send_to_running_instance(origin: isize, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    use shelltabs_core::config::{config_file_path, load_or_default};
    use shelltabs_ipc::client::send_open;

    let config = load_or_default(&config_file_path());
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(send_open(&config.ipc.pipe_name, origin, path))?;
    println!("Sent open request for '{}'", path);
    Ok(())
}

#[cfg(not(windows))]
fn send_to_running_instance(origin: isize, path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let _ = origin;
    Err(format!(
        "Cannot request open of '{}': shelltabs only runs on Windows",
        path
    )
    .into())
}
