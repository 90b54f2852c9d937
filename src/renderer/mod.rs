//! Template rendering engine for skelly
//!
//! This module provides template rendering capabilities using MiniJinja.
//!
//! The module is structured as:
//! - `interface`: Core trait definitions for template rendering
//! - `minijinja`: MiniJinja-based implementation of the template renderer
//! - `filters`: Helper filters and functions available to templates

pub mod filters;
pub mod interface;
pub mod minijinja;

pub use interface::TemplateRenderer;
pub use minijinja::MiniJinjaRenderer;

/// Convenience function to create the default template renderer
pub fn new_renderer() -> MiniJinjaRenderer {
    MiniJinjaRenderer::new()
}
