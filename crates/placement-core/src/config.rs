//! Engine configuration
//!
//! TOML-based settings for page rendering, recipient limits and the field
//! palette offered for drag-out. Every section is optional.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_types::FieldType;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub recipients: RecipientConfig,
    #[serde(default)]
    pub fields: FieldConfig,
}

impl EngineConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use placement_core::config::EngineConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = EngineConfig::from_str(r#"
    ///     [render]
    ///     default_width_px = 640.0
    ///
    ///     [recipients]
    ///     max_recipients = 5
    /// "#)?;
    /// assert_eq!(config.recipients.max_recipients, Some(5));
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.render.default_width_px.is_finite() && self.render.default_width_px > 0.0) {
            anyhow::bail!(
                "render.default_width_px must be positive, got {}",
                self.render.default_width_px
            );
        }
        if !(self.render.min_width_change_px >= 0.0) {
            anyhow::bail!(
                "render.min_width_change_px must not be negative, got {}",
                self.render.min_width_change_px
            );
        }
        if self.recipients.max_recipients == Some(0) {
            anyhow::bail!("recipients.max_recipients must be at least 1");
        }
        if self.fields.palette.is_empty() {
            anyhow::bail!("fields.palette must list at least one field type");
        }
        Ok(())
    }
}

/// Page surface rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Width used before the container has been measured
    #[serde(default = "default_width_px")]
    pub default_width_px: f64,
    /// Container width changes below this do not trigger a re-render
    #[serde(default = "default_min_width_change_px")]
    pub min_width_change_px: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            default_width_px: default_width_px(),
            min_width_change_px: default_min_width_change_px(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecipientConfig {
    /// Optional cap on the number of recipients per session
    #[serde(default)]
    pub max_recipients: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Field types offered for drag-out, in display order
    #[serde(default = "default_palette")]
    pub palette: Vec<FieldType>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            palette: default_palette(),
        }
    }
}

fn default_width_px() -> f64 {
    800.0
}

fn default_min_width_change_px() -> f64 {
    0.5
}

fn default_palette() -> Vec<FieldType> {
    FieldType::ALL.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.render.default_width_px, 800.0);
        assert_eq!(config.recipients.max_recipients, None);
        assert_eq!(
            config.fields.palette,
            vec![FieldType::Signature, FieldType::Text, FieldType::Date]
        );
    }

    #[test]
    fn test_partial_sections() {
        let config = EngineConfig::from_str(
            r#"
            [render]
            min_width_change_px = 2.0

            [fields]
            palette = ["Signature", "Date"]
            "#,
        )
        .unwrap();
        assert_eq!(config.render.default_width_px, 800.0);
        assert_eq!(config.render.min_width_change_px, 2.0);
        assert_eq!(config.fields.palette, vec![FieldType::Signature, FieldType::Date]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(EngineConfig::from_str("[render]\ndefault_width_px = 0.0").is_err());
        assert!(EngineConfig::from_str("[recipients]\nmax_recipients = 0").is_err());
        assert!(EngineConfig::from_str("[fields]\npalette = []").is_err());
        assert!(EngineConfig::from_str("[fields]\npalette = [\"Checkbox\"]").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file("/nonexistent/placement.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
