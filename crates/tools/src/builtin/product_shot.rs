//! Product shot generation tool.
//!
//! Synthesizes the generation prompt from the typed parameters and
//! acknowledges the request. The actual rendering happens in the
//! generation workers; this tool's contract is the prompt, the chosen
//! presets, and a fresh request id per call.

use async_trait::async_trait;
use serde_json::Value;

use cf_domain::tool::{ToolDefinition, ToolError, ToolMetadata, ToolOutput};

use crate::params::ProductShotParams;
use crate::registry::{RunContext, Tool};

pub struct ProductShotTool {
    def: ToolDefinition,
}

impl ProductShotTool {
    pub fn new() -> Self {
        Self {
            def: ToolDefinition {
                name: "product_shot".into(),
                description:
                    "Generate a product shot with a chosen style, background, and placement"
                        .into(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "product_description": {
                            "type": "string",
                            "description": "What the product is and how it should look"
                        },
                        "style_preset": {
                            "type": "string",
                            "enum": ["product", "lifestyle", "elegant", "minimalist", "vibrant"]
                        },
                        "background": {
                            "type": "string",
                            "enum": ["transparent", "white", "gradient", "contextual"]
                        },
                        "placement": {
                            "type": "string",
                            "enum": ["center", "original", "scene_integrated", "rule_of_thirds"]
                        },
                        "aspect_ratio": {
                            "type": "string",
                            "enum": ["1:1", "16:9", "9:16", "4:3", "3:4"]
                        },
                        "scene_description": {
                            "type": "string",
                            "description": "Detailed scene the product should be placed in"
                        }
                    },
                    "required": ["product_description"]
                }),
                required_credits: 2,
            },
        }
    }

    /// The prompt handed to the image generator.
    fn synthesize_prompt(params: &ProductShotParams) -> String {
        let scene = params
            .scene_description
            .as_deref()
            .unwrap_or(&params.product_description);
        let (width, height) = params.aspect_ratio.dimensions();
        format!(
            "Professional product photograph of {}. Style: {:?}. Background: {:?}. Placement: {:?}. Scene: {scene}. Output {width}x{height}.",
            params.product_description, params.style_preset, params.background, params.placement,
        )
    }
}

impl Default for ProductShotTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ProductShotTool {
    fn definition(&self) -> &ToolDefinition {
        &self.def
    }

    async fn execute(&self, args: &Value, ctx: &RunContext) -> Result<ToolOutput, ToolError> {
        let params = ProductShotParams::from_args(args)?;
        let prompt = Self::synthesize_prompt(&params);
        let (width, height) = params.aspect_ratio.dimensions();

        tracing::debug!(run_id = %ctx.run_id, prompt = %prompt, "product shot requested");

        let metadata = ToolMetadata::new()
            .with_extra("prompt", Value::String(prompt))
            .with_extra(
                "style_preset",
                serde_json::to_value(params.style_preset).expect("enum serializes"),
            )
            .with_extra(
                "aspect_ratio",
                serde_json::to_value(params.aspect_ratio).expect("enum serializes"),
            )
            .with_extra("width", width.into())
            .with_extra("height", height.into());

        Ok(ToolOutput {
            content: format!(
                "Product shot queued for \"{}\" ({width}x{height})",
                params.product_description
            ),
            metadata,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
