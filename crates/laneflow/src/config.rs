//! Configuration types for laneflow layout and rendering.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from a
//! TOML file; every field is optional and falls back to its default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - Shape sizes, margins and padding used by the layout engine.
//! - [`StyleConfig`] - Colors used by the SVG preview.
//!
//! # Example
//!
//! ```
//! # use laneflow::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.layout().column_spacing(), 130.0);
//! assert_eq!(config.layout().row_spacing(), 160.0);
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use laneflow_core::color::Color;

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Dimensions driving the grid-to-geometry mapping.
///
/// A grid cell is `node_width + 2 * horizontal_margin` wide and
/// `node_height + 2 * vertical_margin` tall.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Width of an activity box.
    node_width: f32,
    /// Height of an activity box.
    node_height: f32,
    /// Diameter of start and end events.
    event_size: f32,
    /// Side of the exclusive gateway diamond.
    gateway_size: f32,
    horizontal_margin: f32,
    vertical_margin: f32,
    /// Offset of the whole diagram from the origin.
    padding: f32,
    /// Width of the participant strip left of the lanes.
    lane_header_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 100.0,
            node_height: 80.0,
            event_size: 36.0,
            gateway_size: 50.0,
            horizontal_margin: 15.0,
            vertical_margin: 40.0,
            padding: 50.0,
            lane_header_width: 30.0,
        }
    }
}

impl LayoutConfig {
    pub fn node_width(&self) -> f32 {
        self.node_width
    }

    pub fn node_height(&self) -> f32 {
        self.node_height
    }

    pub fn event_size(&self) -> f32 {
        self.event_size
    }

    pub fn gateway_size(&self) -> f32 {
        self.gateway_size
    }

    pub fn horizontal_margin(&self) -> f32 {
        self.horizontal_margin
    }

    pub fn vertical_margin(&self) -> f32 {
        self.vertical_margin
    }

    pub fn padding(&self) -> f32 {
        self.padding
    }

    pub fn lane_header_width(&self) -> f32 {
        self.lane_header_width
    }

    /// Distance between the left edges of two adjacent columns.
    pub fn column_spacing(&self) -> f32 {
        self.node_width + 2.0 * self.horizontal_margin
    }

    /// Distance between the top edges of two adjacent rows.
    pub fn row_spacing(&self) -> f32 {
        self.node_height + 2.0 * self.vertical_margin
    }

    /// Checks that every dimension is usable.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first negative or non-finite value, or an
    /// event or gateway that does not fit inside an activity cell.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("node_width", self.node_width),
            ("node_height", self.node_height),
            ("event_size", self.event_size),
            ("gateway_size", self.gateway_size),
            ("horizontal_margin", self.horizontal_margin),
            ("vertical_margin", self.vertical_margin),
            ("padding", self.padding),
            ("lane_header_width", self.lane_header_width),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("`layout.{name}` must be a non-negative number, got {value}"));
            }
        }

        let cell = self.node_width.min(self.node_height);
        if self.event_size > cell || self.gateway_size > cell {
            return Err(format!(
                "events ({}) and gateways ({}) must fit inside a {}x{} activity box",
                self.event_size, self.gateway_size, self.node_width, self.node_height
            ));
        }
        Ok(())
    }
}

/// Visual styling configuration for the SVG preview.
///
/// Fields that are not set fall back to renderer defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    background_color: Option<String>,

    #[serde(default)]
    lane_color: Option<String>,

    #[serde(default)]
    shape_fill_color: Option<String>,

    #[serde(default)]
    stroke_color: Option<String>,

    #[serde(default)]
    text_color: Option<String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        parse_optional("background_color", self.background_color.as_deref())
    }

    /// Returns the fill of lane bands, or `None` to use the default.
    pub fn lane_color(&self) -> Result<Option<Color>, String> {
        parse_optional("lane_color", self.lane_color.as_deref())
    }

    /// Returns the fill of events, gateways and tasks, or `None` to use the default.
    pub fn shape_fill_color(&self) -> Result<Option<Color>, String> {
        parse_optional("shape_fill_color", self.shape_fill_color.as_deref())
    }

    /// Returns the stroke of shapes and sequence flows, or `None` to use the default.
    pub fn stroke_color(&self) -> Result<Option<Color>, String> {
        parse_optional("stroke_color", self.stroke_color.as_deref())
    }

    /// Returns the color of node and lane labels, or `None` to use the default.
    pub fn text_color(&self) -> Result<Option<Color>, String> {
        parse_optional("text_color", self.text_color.as_deref())
    }
}

fn parse_optional(field: &str, value: Option<&str>) -> Result<Option<Color>, String> {
    value
        .map(Color::new)
        .transpose()
        .map_err(|err| format!("Invalid {field} in config: {err}"))
}
