//! Built-in tools.

mod browser_use;
mod image_to_video;
mod product_shot;

pub use browser_use::BrowserUseTool;
pub use image_to_video::ImageToVideoTool;
pub use product_shot::ProductShotTool;

use std::sync::Arc;

use cf_domain::error::Result;

use crate::registry::ToolRegistry;

/// Register every built-in tool. Called once from bootstrap.
pub fn register_builtins(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(Arc::new(ProductShotTool::new()))?;
    registry.register(Arc::new(ImageToVideoTool::new()))?;
    registry.register(Arc::new(BrowserUseTool::new()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_register_cleanly() {
        let mut registry = ToolRegistry::new();
        register_builtins(&mut registry).unwrap();
        let names: Vec<String> = registry
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["browser_use", "image_to_video", "product_shot"]);
    }
}
