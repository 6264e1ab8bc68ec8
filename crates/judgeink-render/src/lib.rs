//! JudgeInk Render Library
//!
//! Turns composed [`judgeink_core::Frame`]s into drawing commands.
//! The default implementation builds a Vello scene.

mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, decode_reference_image};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::VelloRenderer;
