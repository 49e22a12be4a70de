use std::fs;
use std::path::PathBuf;

use clap::Parser;
use staticd::config::{Cli, ConfigError, DEFAULT_PORT, FileConfig, ServerConfig, parse_port};
use tempfile::tempdir;

#[test]
fn test_file_config_parse() {
    let cfg = FileConfig::parse("root=/srv/www\nport=9000\n");

    assert_eq!(cfg.root, Some(PathBuf::from("/srv/www")));
    assert_eq!(cfg.port.as_deref(), Some("9000"));
}

#[test]
fn test_file_config_ignores_comments_blanks_and_junk() {
    let cfg = FileConfig::parse(
        "# served content\n\
         \n\
         \t  \n\
         not a setting\n\
         colour=blue\n\
         port=81\n",
    );

    assert_eq!(cfg.root, None);
    assert_eq!(cfg.port.as_deref(), Some("81"));
}

#[test]
fn test_file_config_trims_and_matches_keys_case_insensitively() {
    let cfg = FileConfig::parse("  ROOT =  /var/www  \r\n Port= 8081\r\n");

    assert_eq!(cfg.root, Some(PathBuf::from("/var/www")));
    assert_eq!(cfg.port.as_deref(), Some("8081"));
}

#[test]
fn test_file_config_last_value_wins() {
    let cfg = FileConfig::parse("port=1\nport=2\n");

    assert_eq!(cfg.port.as_deref(), Some("2"));
}

#[test]
fn test_file_config_load_missing_file() {
    let dir = tempdir().unwrap();
    let result = FileConfig::load(&dir.path().join("nope.conf"));

    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[test]
fn test_parse_port() {
    assert_eq!(parse_port("1").unwrap(), 1);
    assert_eq!(parse_port("65535").unwrap(), 65535);
    assert_eq!(parse_port(" 8080 ").unwrap(), 8080);
    assert!(matches!(parse_port("0"), Err(ConfigError::InvalidPort(_))));
    assert!(matches!(parse_port("65536"), Err(ConfigError::InvalidPort(_))));
    assert!(matches!(parse_port("-1"), Err(ConfigError::InvalidPort(_))));
    assert!(matches!(parse_port("http"), Err(ConfigError::InvalidPort(_))));
}

#[test]
fn test_server_config_canonicalizes_root() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("www")).unwrap();
    let requested = dir.path().join("www").join("..").join("www");

    let cfg = ServerConfig::new(&requested, 8080).unwrap();

    assert_eq!(cfg.root_requested(), requested.as_path());
    assert_eq!(cfg.root_canonical(), fs::canonicalize(dir.path().join("www")).unwrap());
    assert_eq!(cfg.port(), 8080);
}

#[test]
fn test_server_config_rejects_missing_root() {
    let dir = tempdir().unwrap();
    let result = ServerConfig::new(dir.path().join("missing"), 8080);

    assert!(matches!(result, Err(ConfigError::InvalidRoot { .. })));
}

#[test]
fn test_server_config_rejects_file_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("a.txt");
    fs::write(&file, "hi").unwrap();

    assert!(matches!(
        ServerConfig::new(&file, 8080),
        Err(ConfigError::RootNotDirectory(_))
    ));
}

#[test]
fn test_server_config_rejects_port_zero() {
    let dir = tempdir().unwrap();

    assert!(matches!(
        ServerConfig::new(dir.path(), 0),
        Err(ConfigError::InvalidPort(_))
    ));
}

#[test]
fn test_cli_flags() {
    let cli = Cli::try_parse_from(["staticd", "-r", "/srv/www", "-p", "9000", "-c", "s.conf"]).unwrap();

    assert_eq!(cli.root, Some(PathBuf::from("/srv/www")));
    assert_eq!(cli.port.as_deref(), Some("9000"));
    assert_eq!(cli.config, Some(PathBuf::from("s.conf")));
}

#[test]
fn test_cli_rejects_unknown_flag() {
    assert!(Cli::try_parse_from(["staticd", "-x"]).is_err());
}

#[test]
fn test_from_cli_uses_config_file() {
    let dir = tempdir().unwrap();
    let conf = dir.path().join("server.conf");
    fs::write(&conf, format!("root={}\nport=9001\n", dir.path().display())).unwrap();

    let cli = Cli {
        config: Some(conf),
        ..Cli::default()
    };
    let cfg = ServerConfig::from_cli(&cli).unwrap();

    assert_eq!(cfg.root_canonical(), fs::canonicalize(dir.path()).unwrap());
    assert_eq!(cfg.port(), 9001);
}

#[test]
fn test_from_cli_flags_override_config_file() {
    let dir = tempdir().unwrap();
    let other = dir.path().join("other");
    fs::create_dir(&other).unwrap();
    let conf = dir.path().join("server.conf");
    fs::write(&conf, format!("root={}\nport=9001\n", dir.path().display())).unwrap();

    let cli = Cli {
        root: Some(other.clone()),
        port: Some("9002".to_string()),
        config: Some(conf),
    };
    let cfg = ServerConfig::from_cli(&cli).unwrap();

    assert_eq!(cfg.root_canonical(), fs::canonicalize(&other).unwrap());
    assert_eq!(cfg.port(), 9002);
}

#[test]
fn test_from_cli_default_port() {
    let dir = tempdir().unwrap();
    let cli = Cli {
        root: Some(dir.path().to_path_buf()),
        ..Cli::default()
    };

    assert_eq!(ServerConfig::from_cli(&cli).unwrap().port(), DEFAULT_PORT);
}

#[test]
fn test_from_cli_invalid_port_in_file() {
    let dir = tempdir().unwrap();
    let conf = dir.path().join("server.conf");
    fs::write(&conf, "port=70000\n").unwrap();

    let cli = Cli {
        root: Some(dir.path().to_path_buf()),
        config: Some(conf),
        ..Cli::default()
    };

    assert!(matches!(
        ServerConfig::from_cli(&cli),
        Err(ConfigError::InvalidPort(_))
    ));
}

#[test]
fn test_from_cli_unreadable_config_file() {
    let dir = tempdir().unwrap();
    let cli = Cli {
        root: Some(dir.path().to_path_buf()),
        config: Some(dir.path().join("missing.conf")),
        ..Cli::default()
    };

    assert!(matches!(
        ServerConfig::from_cli(&cli),
        Err(ConfigError::Read { .. })
    ));
}

#[test]
fn test_config_clone() {
    let dir = tempdir().unwrap();
    let cfg1 = ServerConfig::new(dir.path(), 8080).unwrap();
    let cfg2 = cfg1.clone();

    assert_eq!(cfg1.root_canonical(), cfg2.root_canonical());
    assert_eq!(cfg1.port(), cfg2.port());
}
