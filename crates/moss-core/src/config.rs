use crate::error::Error;
use crate::language::Language;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

pub const DEFAULT_SERVER: &str = "moss.stanford.edu";
pub const DEFAULT_PORT: u16 = 7690;

const DEFAULT_IGNORE_LIMIT: u32 = 10;
const DEFAULT_RESULT_LIMIT: u32 = 250;

/// Settings read from `Moss.toml` (optional) and `MOSS_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub userid: u64,
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    #[serde(default)]
    pub options: OptionsConfig,
}

/// Raw, unvalidated session options as they appear in configuration sources.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionsConfig {
    pub language: Option<String>,
    pub directory: Option<String>,
    pub experimental: Option<String>,
    pub max_matches: Option<i64>,
    pub show: Option<i64>,
    pub comment: Option<String>,
}

fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            userid: 0,
            server: default_server(),
            port: default_port(),
            http_timeout_secs: None,
            options: OptionsConfig::default(),
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Moss").required(false))
        .add_source(
            Environment::with_prefix("MOSS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

impl OptionsConfig {
    /// Validate every value that is present and apply it over the defaults.
    pub fn to_session_config(&self) -> Result<SessionConfig, Error> {
        let mut session = SessionConfig::default();
        if let Some(lang) = &self.language {
            session.set_language(lang)?;
        }
        if let Some(flag) = &self.directory {
            session.set_directory_mode(parse_flag("directory", flag)?);
        }
        if let Some(flag) = &self.experimental {
            session.set_experimental(parse_flag("experimental", flag)?);
        }
        if let Some(limit) = self.max_matches {
            session.set_ignore_limit(limit)?;
        }
        if let Some(limit) = self.show {
            session.set_result_limit(limit)?;
        }
        if let Some(comment) = &self.comment {
            session.set_comment(comment.clone());
        }
        Ok(session)
    }
}

/// Options carried on the handshake and query lines of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    ignore_limit: u32,
    directory_mode: bool,
    result_limit: u32,
    experimental: bool,
    comment: String,
    language: Language,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ignore_limit: DEFAULT_IGNORE_LIMIT,
            directory_mode: false,
            result_limit: DEFAULT_RESULT_LIMIT,
            experimental: false,
            comment: String::new(),
            language: Language::default(),
        }
    }
}

impl SessionConfig {
    pub fn set_language(&mut self, lang: &str) -> Result<(), Error> {
        self.language = lang.parse()?;
        Ok(())
    }

    pub fn set_directory_mode(&mut self, enabled: bool) {
        self.directory_mode = enabled;
    }

    /// Passages appearing more often than `limit` times are ignored (`maxmatches`).
    pub fn set_ignore_limit(&mut self, limit: i64) -> Result<(), Error> {
        self.ignore_limit = validate_limit("ignore limit", limit)?;
        Ok(())
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Number of matching pairs shown in the report (`show`).
    pub fn set_result_limit(&mut self, limit: i64) -> Result<(), Error> {
        self.result_limit = validate_limit("result limit", limit)?;
        Ok(())
    }

    pub fn set_experimental(&mut self, enabled: bool) {
        self.experimental = enabled;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn directory_mode(&self) -> bool {
        self.directory_mode
    }

    pub fn experimental(&self) -> bool {
        self.experimental
    }

    pub fn ignore_limit(&self) -> u32 {
        self.ignore_limit
    }

    pub fn result_limit(&self) -> u32 {
        self.result_limit
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }
}

fn validate_limit(option: &'static str, limit: i64) -> Result<u32, Error> {
    if limit <= 1 {
        return Err(Error::invalid(
            option,
            format!("the limit needs to be greater than 1, got {}", limit),
        ));
    }
    u32::try_from(limit).map_err(|_| Error::invalid(option, format!("{} is too large", limit)))
}

/// Parse a boolean switch given as text (config files, environment, command line).
pub fn parse_flag(option: &'static str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::invalid(option, format!("{:?} is not a boolean", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(source: &str) -> AppConfig {
        Config::builder()
            .add_source(ConfigFile::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_session_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.ignore_limit(), 10);
        assert!(!config.directory_mode());
        assert_eq!(config.result_limit(), 250);
        assert!(!config.experimental());
        assert_eq!(config.comment(), "");
        assert_eq!(config.language(), Language::C);
    }

    #[test]
    fn test_limits_must_exceed_one() {
        let mut config = SessionConfig::default();
        for bad in [1, 0, -1, i64::MIN] {
            assert!(matches!(
                config.set_ignore_limit(bad),
                Err(Error::InvalidArgument { .. })
            ));
            assert!(matches!(
                config.set_result_limit(bad),
                Err(Error::InvalidArgument { .. })
            ));
        }
        assert_eq!(config.ignore_limit(), 10);
        assert_eq!(config.result_limit(), 250);

        config.set_ignore_limit(2).unwrap();
        config.set_result_limit(1000).unwrap();
        assert_eq!(config.ignore_limit(), 2);
        assert_eq!(config.result_limit(), 1000);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("directory", "true").unwrap());
        assert!(parse_flag("directory", "On").unwrap());
        assert!(parse_flag("directory", "1").unwrap());
        assert!(!parse_flag("directory", "false").unwrap());
        assert!(!parse_flag("directory", " no ").unwrap());
        for bad in ["", "2", "maybe", "truee"] {
            assert!(matches!(
                parse_flag("directory", bad),
                Err(Error::InvalidArgument { option: "directory", .. })
            ));
        }
    }

    #[test]
    fn test_app_config_defaults_when_empty() {
        let config = from_toml("");
        assert_eq!(config.userid, 0);
        assert_eq!(config.server, DEFAULT_SERVER);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.http_timeout_secs.is_none());
        assert_eq!(config.options.to_session_config().unwrap(), SessionConfig::default());
    }

    #[test]
    fn test_app_config_options_are_validated() {
        let config = from_toml(
            r#"
            userid = 987654321
            server = "localhost"
            port = 9000

            [options]
            language = "python"
            directory = true
            max_matches = 5
            show = 40
            comment = "lab 3"
            "#,
        );
        assert_eq!(config.userid, 987654321);
        assert_eq!(config.server, "localhost");
        assert_eq!(config.port, 9000);

        let session = config.options.to_session_config().unwrap();
        assert_eq!(session.language(), Language::Python);
        assert!(session.directory_mode());
        assert!(!session.experimental());
        assert_eq!(session.ignore_limit(), 5);
        assert_eq!(session.result_limit(), 40);
        assert_eq!(session.comment(), "lab 3");
    }

    #[test]
    fn test_app_config_rejects_bad_options() {
        let config = from_toml("[options]\nlanguage = \"cobol\"\n");
        assert!(matches!(
            config.options.to_session_config(),
            Err(Error::UnsupportedLanguage(_))
        ));

        let config = from_toml("[options]\nshow = 1\n");
        assert!(matches!(
            config.options.to_session_config(),
            Err(Error::InvalidArgument { .. })
        ));

        let config = from_toml("[options]\nexperimental = \"sometimes\"\n");
        assert!(matches!(
            config.options.to_session_config(),
            Err(Error::InvalidArgument { option: "experimental", .. })
        ));
    }

    #[test]
    fn test_load_configuration_reads_environment() {
        std::env::set_var("MOSS_USERID", "4242");
        std::env::set_var("MOSS_SERVER", "moss.example.org");
        std::env::set_var("MOSS_OPTIONS__LANGUAGE", "java");
        std::env::set_var("MOSS_OPTIONS__SHOW", "40");

        let config = load_configuration();

        for key in ["MOSS_USERID", "MOSS_SERVER", "MOSS_OPTIONS__LANGUAGE", "MOSS_OPTIONS__SHOW"] {
            std::env::remove_var(key);
        }

        let config = config.unwrap();
        assert_eq!(config.userid, 4242);
        assert_eq!(config.server, "moss.example.org");
        assert_eq!(config.port, DEFAULT_PORT);

        let session = config.options.to_session_config().unwrap();
        assert_eq!(session.language(), Language::Java);
        assert_eq!(session.result_limit(), 40);
    }
}
