use super::{types::Config, ConfigError};

/// Smallest accepted font shrink step, in points.
pub const MIN_FONT_STEP: f32 = 0.01;

/// Validate configuration
/// Currently validates:
/// - Required sections exist (enforced by serde)
/// - QR size is positive and the position is finite
/// - Text sizing is coherent (positive budget, min <= max, step of at least 0.01pt)
/// - Input pattern compiles
/// - Archive prefix is a plain file-name stem
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // QR geometry
    if config.qr.size <= 0 {
        return Err(invalid(format!(
            "qr.size must be positive, got {}",
            config.qr.size
        )));
    }
    let position = config.qr.position;
    if !position.x.is_finite() || !position.y.is_finite() {
        return Err(invalid(format!(
            "qr.position must be finite, got {}",
            position
        )));
    }

    // Text sizing
    let text = &config.text;
    if !(text.max_width > 0.0) {
        return Err(invalid(format!(
            "text.max_width must be positive, got {}",
            text.max_width
        )));
    }
    if !(text.min_font_size > 0.0) {
        return Err(invalid(format!(
            "text.min_font_size must be positive, got {}",
            text.min_font_size
        )));
    }
    if !(text.max_font_size >= text.min_font_size) {
        return Err(invalid(format!(
            "text.max_font_size ({}) must not be below text.min_font_size ({})",
            text.max_font_size, text.min_font_size
        )));
    }
    if !text.max_font_size.is_finite() {
        return Err(invalid(format!(
            "text.max_font_size must be finite, got {}",
            text.max_font_size
        )));
    }
    if !(text.step >= MIN_FONT_STEP) || text.max_font_size - text.step == text.max_font_size {
        return Err(invalid(format!(
            "text.step must be at least {}, got {}",
            MIN_FONT_STEP, text.step
        )));
    }
    if !text.gap.is_finite() {
        return Err(invalid("text.gap must be finite".to_string()));
    }

    // Discovery
    regex_lite::Regex::new(&config.folders.input_pattern).map_err(|e| {
        invalid(format!(
            "folders.input_pattern is not a valid pattern: {}",
            e
        ))
    })?;

    // Columns
    let columns = &config.columns;
    for (field, header) in [
        ("columns.attendee_id", &columns.attendee_id),
        ("columns.first_name", &columns.first_name),
        ("columns.last_name", &columns.last_name),
        ("columns.ticket_type", &columns.ticket_type),
    ] {
        if header.trim().is_empty() {
            return Err(invalid(format!("{} cannot be empty", field)));
        }
    }

    // Archive naming
    let prefix = &config.archive.prefix;
    if prefix.trim().is_empty() {
        return Err(invalid("archive.prefix cannot be empty".to_string()));
    }
    if prefix.contains(['/', '\\']) {
        return Err(invalid(format!(
            "archive.prefix must not contain path separators, got '{}'",
            prefix
        )));
    }

    Ok(())
}

fn invalid(message: String) -> ConfigError {
    ConfigError::ValidationError(message)
}
