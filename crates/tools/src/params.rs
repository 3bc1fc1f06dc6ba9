//! Typed tool parameters.
//!
//! Each tool has a concrete parameter record, parsed and validated at
//! the dispatch boundary before anything else happens. Unknown fields
//! are ignored (callers send whatever their UI collects); missing or
//! empty required fields are rejected.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use cf_domain::tool::ToolError;

/// Parse a raw argument object into a typed record.
pub fn parse<T: DeserializeOwned>(args: &serde_json::Value) -> Result<T, ToolError> {
    serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidParameters(e.to_string()))
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidParameters(format!("{field} is required")));
    }
    Ok(())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Shared enums
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreset {
    #[default]
    Product,
    Lifestyle,
    Elegant,
    Minimalist,
    Vibrant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    Transparent,
    White,
    Gradient,
    Contextual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Center,
    #[default]
    Original,
    SceneIntegrated,
    RuleOfThirds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "3:4")]
    Portrait,
}

impl AspectRatio {
    /// Output dimensions for each supported ratio.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::Square => (1024, 1024),
            AspectRatio::Wide => (1600, 900),
            AspectRatio::Tall => (900, 1600),
            AspectRatio::Landscape => (1200, 900),
            AspectRatio::Portrait => (900, 1200),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Per-tool records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Deserialize)]
pub struct ProductShotParams {
    pub product_description: String,
    #[serde(default)]
    pub style_preset: StylePreset,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub scene_description: Option<String>,
}

impl ProductShotParams {
    pub fn from_args(args: &serde_json::Value) -> Result<Self, ToolError> {
        let params: Self = parse(args)?;
        require_non_empty("product_description", &params.product_description)?;
        Ok(params)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageToVideoParams {
    pub source_image_url: String,
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default = "d_duration_seconds")]
    pub duration_seconds: u32,
}

fn d_duration_seconds() -> u32 {
    5
}

impl ImageToVideoParams {
    pub fn from_args(args: &serde_json::Value) -> Result<Self, ToolError> {
        let params: Self = parse(args)?;
        require_non_empty("source_image_url", &params.source_image_url)?;
        require_non_empty("prompt", &params.prompt)?;
        Ok(params)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrowserTaskParams {
    /// Natural-language instruction for the browser agent.
    pub task: String,
    #[serde(default = "d_environment")]
    pub environment: String,
    #[serde(default = "d_save_session_data")]
    pub save_session_data: bool,
}

fn d_environment() -> String {
    "browser".into()
}

fn d_save_session_data() -> bool {
    true
}

impl BrowserTaskParams {
    pub fn from_args(args: &serde_json::Value) -> Result<Self, ToolError> {
        let params: Self = parse(args)?;
        require_non_empty("task", &params.task)?;
        Ok(params)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
