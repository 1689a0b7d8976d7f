use std::path::PathBuf;

use clap::Parser;

use starbase_daemon::Args;

#[test]
fn defaults_point_at_local_paths() {
    let args = Args::parse_from(["starbased"]);
    assert_eq!(args.config, PathBuf::from("base.toml"));
    assert_eq!(args.listen, "127.0.0.1:5003");
    assert_eq!(args.hostname, "localhost");
    assert_eq!(
        args.failed_dir(),
        PathBuf::from(".starbase/failed_announcements")
    );
    assert_eq!(
        args.accepted_dir(),
        PathBuf::from(".starbase/accepted_announcements")
    );
}

#[test]
fn flags_override_defaults() {
    let args = Args::parse_from([
        "starbased",
        "--config",
        "/etc/starbase/base.toml",
        "--listen",
        "0.0.0.0:8080",
        "--hostname",
        "base.example",
        "--data-dir",
        "/var/lib/starbase",
    ]);
    assert_eq!(args.config, PathBuf::from("/etc/starbase/base.toml"));
    assert_eq!(args.listen, "0.0.0.0:8080");
    assert_eq!(args.hostname, "base.example");
    assert_eq!(
        args.failed_dir(),
        PathBuf::from("/var/lib/starbase/failed_announcements")
    );
}
