use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Environment variable prefix. Nested keys use `__`, e.g. `ACCREDIT_QR__SIZE=150`.
pub const ENV_PREFIX: &str = "ACCREDIT_";

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from environment variables only
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    Figment::new()
        .merge(env_provider())
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn env_provider() -> Env {
    // ACCREDIT_CONFIG names the file itself, it is not a setting
    Env::prefixed(ENV_PREFIX).ignore(&["CONFIG"]).split("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_from_str_valid() {
        let toml = r#"
[templates]
attendee = "attendee.pdf"

[qr]
position = "100,50"
size = 120
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.qr.size, 120);
    }

    #[test]
    fn test_load_config_from_str_missing_qr() {
        let toml = r#"
[templates]
attendee = "attendee.pdf"
"#;
        let result = load_config_from_str(toml);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/accredit.toml"));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[folders]
input = "/data/in"
output = "/data/out"

[templates]
attendee = "attendee.pdf"
staff = "staff.pdf"

[qr]
position = [120, 80]
size = 150
"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.folders.input.to_str().unwrap(), "/data/in");
        assert_eq!(config.folders.output.to_str().unwrap(), "/data/out");
        assert_eq!(
            config.templates.staff.as_deref().unwrap().to_str().unwrap(),
            "staff.pdf"
        );
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "accredit.toml",
                r#"
[templates]
attendee = "attendee.pdf"

[qr]
position = "1,2"
size = 150
"#,
            )?;
            jail.set_env("ACCREDIT_QR__SIZE", "90");
            jail.set_env("ACCREDIT_QR__POSITION", "30,40");
            jail.set_env("ACCREDIT_TICKET_TYPES__STAFF", "Crew,Helpers");

            let config = load_config(Path::new("accredit.toml")).unwrap();
            assert_eq!(config.qr.size, 90);
            assert_eq!(config.qr.position.x, 30.0);
            assert_eq!(config.qr.position.y, 40.0);
            assert_eq!(config.ticket_types.staff, vec!["Crew", "Helpers"]);
            Ok(())
        });
    }

    #[test]
    fn test_load_config_from_env_only() {
        Jail::expect_with(|jail| {
            jail.set_env("ACCREDIT_TEMPLATES__ATTENDEE", "/templates/attendee.pdf");
            jail.set_env("ACCREDIT_QR__POSITION", "10,20");
            jail.set_env("ACCREDIT_QR__SIZE", "-5");
            jail.set_env("ACCREDIT_CONFIG", "ignored.toml");

            let config = load_config_from_env().unwrap();
            assert_eq!(config.qr.size, -5);
            assert_eq!(
                config.templates.attendee.to_str().unwrap(),
                "/templates/attendee.pdf"
            );
            Ok(())
        });
    }
}
