//! Image-to-video tool.
//!
//! Animates an already-generated (or uploaded) still into a short
//! clip. Same contract as the other generation tools: acknowledge,
//! hand back a request id, let the workers do the rendering.

use async_trait::async_trait;
use serde_json::Value;

use cf_domain::tool::{ToolDefinition, ToolError, ToolMetadata, ToolOutput};

use crate::params::ImageToVideoParams;
use crate::registry::{RunContext, Tool};

pub struct ImageToVideoTool {
    def: ToolDefinition,
}

impl ImageToVideoTool {
    pub fn new() -> Self {
        Self {
            def: ToolDefinition {
                name: "image_to_video".into(),
                description: "Animate a source image into a short video clip".into(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "source_image_url": {
                            "type": "string",
                            "description": "URL of the image to animate"
                        },
                        "prompt": {
                            "type": "string",
                            "description": "How the clip should move and feel"
                        },
                        "aspect_ratio": {
                            "type": "string",
                            "enum": ["1:1", "16:9", "9:16", "4:3", "3:4"]
                        },
                        "duration_seconds": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": 30
                        }
                    },
                    "required": ["source_image_url", "prompt"]
                }),
                required_credits: 1,
            },
        }
    }
}

impl Default for ImageToVideoTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ImageToVideoTool {
    fn definition(&self) -> &ToolDefinition {
        &self.def
    }

    async fn execute(&self, args: &Value, ctx: &RunContext) -> Result<ToolOutput, ToolError> {
        let params = ImageToVideoParams::from_args(args)?;

        tracing::debug!(
            run_id = %ctx.run_id,
            source = %params.source_image_url,
            duration = params.duration_seconds,
            "image-to-video requested"
        );

        let metadata = ToolMetadata::new()
            .with_extra("source_image_url", Value::String(params.source_image_url))
            .with_extra("prompt", Value::String(params.prompt.clone()))
            .with_extra("duration_seconds", params.duration_seconds.into())
            .with_extra(
                "aspect_ratio",
                serde_json::to_value(params.aspect_ratio).expect("enum serializes"),
            );

        Ok(ToolOutput {
            content: format!(
                "Video clip queued ({}s): {}",
                params.duration_seconds, params.prompt
            ),
            metadata,
        })
    }
}
