use std::time::Duration;
use std::{env, fs};

use membrane_auth::SigningAlgorithm;
use membrane_server::config::loader::load_config;

#[test]
fn config_parsing_and_env_overrides_and_validation() {
    let dir = tempfile::tempdir().expect("tmp dir");
    let path = dir.path().join("membrane.toml");

    let toml_content = r#"
[server]
host = "127.0.0.1"
port = 8081

[token]
app_id_field = "client"
redirect_url_field = "next"
expiration_field = "expires"
algorithm = "RS384"

[keys]
directory = "/etc/membrane/clients"
server_public_key = "/etc/membrane/server_public_key.pem"
server_private_key = "/etc/membrane/server_private_key.pem"

[sso]
frontend_url = "https://sso.example/login"
public_base_url = "https://sso.example"

[email]
token_ttl = "15m"
allowed_pattern = '[^@\s]+@example\.org$'
sender = "no-reply@sso.example"

[email.smtp]
host = "smtp.example.org"
port = 465
username = "mailer"
password = "secret"

[logging]
level = "debug"
"#;
    fs::write(&path, toml_content).expect("write toml");

    // 1) Valid config parses
    let cfg = load_config(path.to_str()).expect("should parse config");
    assert_eq!(cfg.server.port, 8081);
    assert_eq!(cfg.token.app_id_field, "client");
    assert_eq!(cfg.token.subject_field, "sub");
    assert_eq!(cfg.token.algorithm, SigningAlgorithm::RS384);
    assert_eq!(cfg.email.token_ttl, Duration::from_secs(15 * 60));
    assert_eq!(cfg.email.smtp.as_ref().map(|s| s.port), Some(465));
    assert_eq!(cfg.sso.verification_path, "/authenticate");
    assert_eq!(
        cfg.sso.verification_endpoint().unwrap().as_str(),
        "https://sso.example/authenticate"
    );
    assert_eq!(cfg.logging.level, "debug");

    // 2) Env override should win over file
    unsafe {
        env::set_var("MEMBRANE__SERVER__PORT", "9090");
        env::set_var("MEMBRANE__EMAIL__TOKEN_TTL", "30s");
    }
    let cfg_env = load_config(path.to_str()).expect("should parse config with env overrides");
    assert_eq!(cfg_env.server.port, 9090);
    assert_eq!(cfg_env.email.token_ttl, Duration::from_secs(30));
    unsafe {
        env::remove_var("MEMBRANE__SERVER__PORT");
        env::remove_var("MEMBRANE__EMAIL__TOKEN_TTL");
    }

    // 3) Invalid values fail validation
    let invalid = toml_content.replace("level = \"debug\"", "level = \"loud\"");
    fs::write(&path, invalid).expect("write toml");
    assert!(load_config(path.to_str()).is_err());

    // 4) Symmetric algorithms are refused
    let hmac = toml_content.replace("RS384", "HS256");
    fs::write(&path, hmac).expect("write toml");
    assert!(load_config(path.to_str()).is_err());

    // 5) The token section is required
    let start = toml_content.find("[token]").unwrap();
    let end = toml_content.find("[keys]").unwrap();
    let no_token = format!("{}{}", &toml_content[..start], &toml_content[end..]);
    fs::write(&path, no_token).expect("write toml");
    assert!(load_config(path.to_str()).is_err());
}
