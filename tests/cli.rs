use clap::Parser;
use patchup::cli::{Cli, Commands, ExportArgs};

#[test]
fn export_flag_parsing() {
    // Given
    let argv = vec![
        "pup",
        "export",
        "--dest",
        "/exports",
        "--unit",
        "app",
        "--source-only",
        "--clean",
        "--no-remember",
        "src/com/a/Foo.java",
        "src/com/a",
    ];

    // When
    let cmd = Cli::parse_from(argv);

    // Then
    match cmd.command {
        Commands::Export(ExportArgs { paths, dest, unit, source_only, clean, no_remember }) => {
            assert_eq!(paths.len(), 2);
            assert_eq!(dest.as_deref(), Some("/exports"));
            assert_eq!(unit.as_deref(), Some("app"));
            assert!(source_only);
            assert!(clean);
            assert!(no_remember);
        }
        _ => panic!("expected Export command"),
    }
}

#[test]
fn export_requires_a_selection() {
    let result = Cli::try_parse_from(["pup", "export"]);
    assert!(result.is_err());
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let cmd = Cli::parse_from(["pup", "unit", "src/Foo.java", "--quiet", "--dry-run"]);

    assert!(cmd.quiet);
    assert!(cmd.dry_run);
    assert!(!cmd.no_color);
    match cmd.command {
        Commands::Unit(args) => assert_eq!(args.paths.len(), 1),
        _ => panic!("expected Unit command"),
    }
}
