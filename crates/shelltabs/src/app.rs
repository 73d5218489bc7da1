use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("shelltabs")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Group independent top-level windows into tabbed hosts")
        .long_about(
            "shelltabs watches top-level windows (primarily file-manager windows), \
             groups them by configurable rules, and hosts each group's windows as \
             tabs inside one container window. A running instance also intercepts \
             open-folder requests from other processes so folders open as tabs in \
             an existing group instead of new free-floating windows.",
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only log errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("run").about("Run the engine (default when no subcommand is given)"),
        )
        .subcommand(
            Command::new("open")
                .about("Ask a running instance to open a folder as a tab")
                .arg(
                    Arg::new("path")
                        .help("Folder path to open")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("origin")
                        .long("origin")
                        .help("Decimal handle of the window the request originates from (0 if unknown)")
                        .default_value("0"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect configuration")
                .subcommand(Command::new("path").about("Print the config file path"))
                .subcommand(Command::new("show").about("Print the effective configuration")),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run() {
        let matches = build_cli()
            .try_get_matches_from(["shelltabs", "run"])
            .unwrap();
        assert_eq!(matches.subcommand_name(), Some("run"));
    }

    #[test]
    fn test_cli_parses_open_with_origin() {
        let matches = build_cli()
            .try_get_matches_from(["shelltabs", "open", "C:\\Users\\me", "--origin", "42"])
            .unwrap();
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "open");
        assert_eq!(sub.get_one::<String>("path").unwrap(), "C:\\Users\\me");
        assert_eq!(sub.get_one::<String>("origin").unwrap(), "42");
    }

    #[test]
    fn test_cli_quiet_is_global() {
        let matches = build_cli()
            .try_get_matches_from(["shelltabs", "--quiet", "run"])
            .unwrap();
        assert!(matches.get_flag("quiet"));
    }

    #[test]
    fn test_cli_no_subcommand_is_allowed() {
        let matches = build_cli().try_get_matches_from(["shelltabs"]).unwrap();
        assert_eq!(matches.subcommand_name(), None);
    }
}
