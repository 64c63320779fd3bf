use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};
use voicelink_server::config::{load_config, ConfigError};

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let config = load_config(path.to_str()).unwrap();
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(config.livekit.url, "ws://localhost:7880");
    assert_eq!(config.livekit.token_ttl_seconds, 3600);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.cors.client_url, "http://localhost:5173");
}

#[test]
fn file_sections_are_read() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[server]
host = "0.0.0.0"
port = 3100

[livekit]
url = "wss://media.example.com"
api_key = "APIkey"
api_secret = "s3cret"
token_ttl_seconds = 600

[logging]
level = "voicelink_server=debug,info"
json = true

[cors]
client_url = "https://voice.example.com"
"#
    )
    .unwrap();

    let config = load_config(file.path().to_str()).unwrap();
    assert_eq!(config.server.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    assert_eq!(config.server.port, 3100);
    assert_eq!(config.livekit.url, "wss://media.example.com");
    assert_eq!(config.livekit.api_key, "APIkey");
    assert_eq!(config.livekit.api_secret, "s3cret");
    assert_eq!(config.livekit.token_ttl_seconds, 600);
    assert_eq!(config.logging.level, "voicelink_server=debug,info");
    assert!(config.logging.json);
    assert_eq!(config.cors.client_url, "https://voice.example.com");
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server\nport = ").unwrap();

    let err = load_config(file.path().to_str()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
