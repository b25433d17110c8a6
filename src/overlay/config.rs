use crate::render::graph::Color;
use crate::scene::registry::{PropertyKind, PropertySchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for property '{property}'")]
    InvalidValue { property: String, value: String },
    #[error("malformed property declaration '{0}'")]
    MalformedDeclaration(String),
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Appearance settings for one overlay attachment.
///
/// Every field has a default, so an empty declaration yields a white host
/// with neither wireframe nor markers. Values are only type-checked:
/// `color` is carried through verbatim and an `opacity` outside [0, 1] goes
/// to the materials unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    color: Color,
    show_nodes: bool,
    opacity: f32,
    show_wireframe: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            color: Color::white(),
            show_nodes: false,
            opacity: 1.0,
            show_wireframe: false,
        }
    }
}

impl OverlayConfig {
    pub fn new(
        color: impl Into<Color>,
        show_nodes: bool,
        opacity: f32,
        show_wireframe: bool,
    ) -> Self {
        Self {
            color: color.into(),
            show_nodes,
            opacity,
            show_wireframe,
        }
    }

    pub fn builder() -> OverlayConfigBuilder {
        OverlayConfigBuilder {
            config: Self::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a declaration string such as
    /// `"color: #D92B6A; showNodes: true; opacity: 0.15"` on top of defaults.
    pub fn parse_attributes(attributes: &str) -> Result<Self, ConfigError> {
        Self::default().merge_attributes(attributes)
    }

    /// Applies a declaration string on top of this config. Properties not
    /// mentioned keep their current value.
    pub fn merge_attributes(&self, attributes: &str) -> Result<Self, ConfigError> {
        let mut merged = self.clone();
        for (property, value) in parse_declarations(attributes)? {
            match property {
                "color" => merged.color = Color::new(value),
                "showNodes" => merged.show_nodes = parse_bool(property, value)?,
                "opacity" => merged.opacity = parse_number(property, value)?,
                "showWireframe" => merged.show_wireframe = parse_bool(property, value)?,
                unknown => {
                    log::warn!("[overlay] ignoring unknown property '{unknown}'");
                }
            }
        }
        Ok(merged)
    }

    pub fn schema() -> Vec<PropertySchema> {
        vec![
            PropertySchema::new("color", PropertyKind::String, Color::WHITE),
            PropertySchema::new("showNodes", PropertyKind::Boolean, "false"),
            PropertySchema::new("opacity", PropertyKind::Number, "1"),
            PropertySchema::new("showWireframe", PropertyKind::Boolean, "false"),
        ]
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn show_nodes(&self) -> bool {
        self.show_nodes
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn show_wireframe(&self) -> bool {
        self.show_wireframe
    }
}

pub struct OverlayConfigBuilder {
    config: OverlayConfig,
}

impl OverlayConfigBuilder {
    pub fn color(mut self, color: impl Into<Color>) -> Self {
        self.config.color = color.into();
        self
    }

    pub fn show_nodes(mut self, show: bool) -> Self {
        self.config.show_nodes = show;
        self
    }

    pub fn opacity(mut self, opacity: f32) -> Self {
        self.config.opacity = opacity;
        self
    }

    pub fn show_wireframe(mut self, show: bool) -> Self {
        self.config.show_wireframe = show;
        self
    }

    pub fn build(self) -> OverlayConfig {
        self.config
    }
}

/// Splits `key: value; key: value` into trimmed pairs. Empty segments are
/// skipped; the value is everything after the first colon.
pub fn parse_declarations(input: &str) -> Result<Vec<(&str, &str)>, ConfigError> {
    input
        .split(';')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            segment
                .split_once(':')
                .map(|(key, value)| (key.trim(), value.trim()))
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| ConfigError::MalformedDeclaration(segment.to_owned()))
        })
        .collect()
}

fn parse_bool(property: &str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(property, value)),
    }
}

fn parse_number(property: &str, value: &str) -> Result<f32, ConfigError> {
    value.parse().map_err(|_| invalid(property, value))
}

fn invalid(property: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        property: property.to_owned(),
        value: value.to_owned(),
    }
}
