use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub folders: FoldersConfig,
    pub templates: TemplatesConfig,
    #[serde(default)]
    pub ticket_types: TicketTypesConfig,
    pub qr: QrConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub text: TextConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
}

/// Input/output locations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FoldersConfig {
    #[serde(default = "default_input_folder")]
    pub input: PathBuf,
    #[serde(default = "default_output_folder")]
    pub output: PathBuf,
    /// Where the final archive is written (defaults to the output folder)
    #[serde(default)]
    pub archive: Option<PathBuf>,
    /// File names considered during latest-file discovery
    #[serde(default = "default_input_pattern")]
    pub input_pattern: String,
}

impl Default for FoldersConfig {
    fn default() -> Self {
        Self {
            input: default_input_folder(),
            output: default_output_folder(),
            archive: None,
            input_pattern: default_input_pattern(),
        }
    }
}

fn default_input_folder() -> PathBuf {
    PathBuf::from("input")
}

fn default_output_folder() -> PathBuf {
    PathBuf::from("output")
}

fn default_input_pattern() -> String {
    r"(?i)\.(xlsx|xlsm|xls|ods|csv)$".to_string()
}

/// Template documents per role. Only the default (attendee) template is required.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TemplatesConfig {
    pub attendee: PathBuf,
    #[serde(default)]
    pub staff: Option<PathBuf>,
    #[serde(default)]
    pub speaker: Option<PathBuf>,
}

/// Ticket-type strings selecting each role
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketTypesConfig {
    #[serde(default = "default_staff_types", deserialize_with = "string_or_list")]
    pub staff: Vec<String>,
    #[serde(default = "default_speaker_types", deserialize_with = "string_or_list")]
    pub speaker: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub attendee: Vec<String>,
}

impl Default for TicketTypesConfig {
    fn default() -> Self {
        Self {
            staff: default_staff_types(),
            speaker: default_speaker_types(),
            attendee: Vec::new(),
        }
    }
}

fn default_staff_types() -> Vec<String> {
    vec!["Helpers".to_string()]
}

fn default_speaker_types() -> Vec<String> {
    vec!["Speakers".to_string()]
}

/// Scannable code placement, in page units with a lower-left origin
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QrConfig {
    pub position: QrPosition,
    /// Side length of the square code. Signed so that bad values reach validation.
    pub size: i64,
}

/// `(x, y)` of the lower-left corner of the code.
///
/// Accepts `"x,y"`, `[x, y]` or `{ x = .., y = .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QrPosition {
    pub x: f32,
    pub y: f32,
}

impl fmt::Display for QrPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl std::str::FromStr for QrPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let (Some(x), Some(y), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected \"x,y\", got \"{}\"", s));
        };
        let x = x
            .parse::<f32>()
            .map_err(|e| format!("invalid x coordinate \"{}\": {}", x, e))?;
        let y = y
            .parse::<f32>()
            .map_err(|e| format!("invalid y coordinate \"{}\": {}", y, e))?;
        Ok(Self { x, y })
    }
}

impl<'de> Deserialize<'de> for QrPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Pair([f32; 2]),
            Table { x: f32, y: f32 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
            Repr::Pair([x, y]) => Ok(Self { x, y }),
            Repr::Table { x, y } => Ok(Self { x, y }),
        }
    }
}

/// Logical field -> source column header
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_attendee_id_column")]
    pub attendee_id: String,
    #[serde(default = "default_first_name_column")]
    pub first_name: String,
    #[serde(default = "default_last_name_column")]
    pub last_name: String,
    #[serde(default = "default_ticket_type_column")]
    pub ticket_type: String,
    #[serde(default)]
    pub company: Option<String>,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            attendee_id: default_attendee_id_column(),
            first_name: default_first_name_column(),
            last_name: default_last_name_column(),
            ticket_type: default_ticket_type_column(),
            company: None,
        }
    }
}

fn default_attendee_id_column() -> String {
    "Attendee #".to_string()
}

fn default_first_name_column() -> String {
    "Final Attendee First Name".to_string()
}

fn default_last_name_column() -> String {
    "Final Attendee Last Name".to_string()
}

fn default_ticket_type_column() -> String {
    "Ticket Type".to_string()
}

/// Name block sizing and placement
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextConfig {
    /// Horizontal budget for each name line (points)
    #[serde(default = "default_max_width")]
    pub max_width: f32,
    #[serde(default = "default_max_font_size")]
    pub max_font_size: f32,
    #[serde(default = "default_min_font_size")]
    pub min_font_size: f32,
    #[serde(default = "default_font_step")]
    pub step: f32,
    /// Space between the code and the name block (points)
    #[serde(default = "default_gap")]
    pub gap: f32,
    #[serde(default = "default_true")]
    pub show_company: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_font_size: default_max_font_size(),
            min_font_size: default_min_font_size(),
            step: default_font_step(),
            gap: default_gap(),
            show_company: true,
        }
    }
}

fn default_max_width() -> f32 {
    300.0
}

fn default_max_font_size() -> f32 {
    30.0
}

fn default_min_font_size() -> f32 {
    10.0
}

fn default_font_step() -> f32 {
    1.0
}

fn default_gap() -> f32 {
    10.0
}

fn default_true() -> bool {
    true
}

/// Final archive naming
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_archive_prefix")]
    pub prefix: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            prefix: default_archive_prefix(),
        }
    }
}

fn default_archive_prefix() -> String {
    "attendees".to_string()
}

/// Accepts either a list of strings or a single comma-separated string
/// (the form environment variables arrive in).
fn string_or_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        One(String),
        Many(Vec<String>),
    }

    let values = match Repr::deserialize(deserializer)? {
        Repr::One(s) => s.split(',').map(str::to_string).collect::<Vec<_>>(),
        Repr::Many(v) => v,
    };

    Ok(values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect())
}

/// Flattened config view for display
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub folders: FoldersConfig,
    pub templates: TemplatesConfig,
    pub ticket_types: TicketTypesConfig,
    pub qr_position: String,
    pub qr_size: i64,
    pub columns: ColumnsConfig,
    pub text: TextConfig,
    pub archive: ArchiveConfig,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            folders: config.folders.clone(),
            templates: config.templates.clone(),
            ticket_types: config.ticket_types.clone(),
            qr_position: config.qr.position.to_string(),
            qr_size: config.qr.size,
            columns: config.columns.clone(),
            text: config.text.clone(),
            archive: config.archive.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[templates]
attendee = "templates/attendee.pdf"

[qr]
position = "120,80"
size = 150
"#;

    #[test]
    fn test_deserialize_minimal_config_uses_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.folders.input, PathBuf::from("input"));
        assert_eq!(config.folders.output, PathBuf::from("output"));
        assert!(config.folders.archive.is_none());
        assert_eq!(config.ticket_types.staff, vec!["Helpers"]);
        assert_eq!(config.ticket_types.speaker, vec!["Speakers"]);
        assert!(config.ticket_types.attendee.is_empty());
        assert_eq!(config.columns.attendee_id, "Attendee #");
        assert!(config.columns.company.is_none());
        assert_eq!(config.text.max_width, 300.0);
        assert_eq!(config.text.max_font_size, 30.0);
        assert_eq!(config.text.min_font_size, 10.0);
        assert_eq!(config.archive.prefix, "attendees");
    }

    #[test]
    fn test_position_string_form() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.qr.position, QrPosition { x: 120.0, y: 80.0 });
        assert_eq!(config.qr.size, 150);
    }

    #[test]
    fn test_position_array_and_table_forms() {
        let toml = r#"
[templates]
attendee = "a.pdf"

[qr]
position = [10, 20.5]
size = 100
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.qr.position, QrPosition { x: 10.0, y: 20.5 });

        let toml = r#"
[templates]
attendee = "a.pdf"

[qr]
size = 100
position = { x = 1, y = 2 }
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.qr.position, QrPosition { x: 1.0, y: 2.0 });
    }

    #[test]
    fn test_malformed_position_rejected() {
        let toml = r#"
[templates]
attendee = "a.pdf"

[qr]
position = "120;80"
size = 100
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_position_from_str() {
        assert_eq!(
            " 12 , 34 ".parse::<QrPosition>().unwrap(),
            QrPosition { x: 12.0, y: 34.0 }
        );
        assert!("12".parse::<QrPosition>().is_err());
        assert!("1,2,3".parse::<QrPosition>().is_err());
        assert!("a,2".parse::<QrPosition>().is_err());
    }

    #[test]
    fn test_ticket_types_comma_string() {
        let toml = r#"
[templates]
attendee = "a.pdf"

[ticket_types]
staff = "Helpers, Volunteers ,"
speaker = ["Speakers", "Keynote"]

[qr]
position = "0,0"
size = 100
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.ticket_types.staff, vec!["Helpers", "Volunteers"]);
        assert_eq!(config.ticket_types.speaker, vec!["Speakers", "Keynote"]);
    }

    #[test]
    fn test_missing_templates_section_fails() {
        let toml = r#"
[qr]
position = "0,0"
size = 100
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.qr_position, "120,80");
        assert_eq!(sanitized.qr_size, 150);
        assert_eq!(
            sanitized.templates.attendee,
            PathBuf::from("templates/attendee.pdf")
        );
    }
}
