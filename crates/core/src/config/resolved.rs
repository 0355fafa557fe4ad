use regex_lite::Regex;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{validate_config, Config, ConfigError};
use crate::render::{FontSizing, QrGeometry, TextLayout};
use crate::role::{Role, RoleMapping};
use crate::roster::ColumnMapping;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Immutable settings for one run, derived from a validated [`Config`].
///
/// Every configured template has been opened and looks like a PDF by the
/// time this exists.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub input_folder: PathBuf,
    pub output_folder: PathBuf,
    pub archive_folder: PathBuf,
    pub input_pattern: Regex,
    pub roles: RoleMapping,
    pub columns: ColumnMapping,
    pub qr: QrGeometry,
    pub text: TextLayout,
    pub archive_prefix: String,
}

impl ResolvedConfig {
    /// Validates `config`, checks the template files and builds the run settings.
    pub fn resolve(config: Config) -> Result<Self, ConfigError> {
        validate_config(&config)?;

        let input_pattern = Regex::new(&config.folders.input_pattern).map_err(|e| {
            ConfigError::ValidationError(format!("folders.input_pattern is invalid: {}", e))
        })?;

        let templates = &config.templates;
        check_template(Role::Attendee, &templates.attendee)?;
        let mut roles = RoleMapping::new(&templates.attendee);
        for (role, template) in [
            (Role::Staff, &templates.staff),
            (Role::Speaker, &templates.speaker),
        ] {
            if let Some(path) = template {
                check_template(role, path)?;
                roles = roles.with_template(role, path);
            } else {
                tracing::debug!("No template for role {}, using the attendee template", role);
            }
        }

        let ticket_types = &config.ticket_types;
        let roles = roles
            .with_ticket_types(Role::Staff, ticket_types.staff.iter().cloned())
            .with_ticket_types(Role::Speaker, ticket_types.speaker.iter().cloned())
            .with_ticket_types(Role::Attendee, ticket_types.attendee.iter().cloned());

        let text = &config.text;
        let archive_folder = config
            .folders
            .archive
            .clone()
            .unwrap_or_else(|| config.folders.output.clone());

        Ok(Self {
            input_folder: config.folders.input.clone(),
            output_folder: config.folders.output.clone(),
            archive_folder,
            input_pattern,
            roles,
            columns: ColumnMapping::from(&config.columns),
            qr: QrGeometry {
                x: config.qr.position.x,
                y: config.qr.position.y,
                size: config.qr.size as f32,
            },
            text: TextLayout {
                sizing: FontSizing {
                    max_width: text.max_width,
                    max_size: text.max_font_size,
                    min_size: text.min_font_size,
                    step: text.step,
                },
                gap: text.gap,
                show_company: text.show_company,
                ..TextLayout::default()
            },
            archive_prefix: config.archive.prefix.trim().to_string(),
        })
    }
}

fn check_template(role: Role, path: &Path) -> Result<(), ConfigError> {
    let unreadable = |source: std::io::Error| ConfigError::TemplateUnreadable {
        role,
        path: path.to_path_buf(),
        source,
    };

    let mut header = [0u8; 5];
    File::open(path)
        .and_then(|mut file| file.read_exact(&mut header))
        .map_err(unreadable)?;

    if header != PDF_MAGIC {
        return Err(unreadable(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "not a PDF document",
        )));
    }

    Ok(())
}
