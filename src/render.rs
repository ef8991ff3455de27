//! Render composition.
//!
//! Flows describe what they want drawn with a [`Render`] value. The loop
//! flattens every flow's render into one list of [`Instanced`] draws for the
//! basic pipeline.

use crate::data_structures::model::Model;

/// Data for instanced rendering: a model and the instance buffer placing it.
#[derive(Clone)]
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub model: &'a Model,
    pub amount: usize,
}

/// Specifies how a flow should be rendered.
///
/// - `None` renders nothing
/// - `Defaults(Vec<Instanced>)` renders a batch of instanced objects
pub enum Render<'a> {
    None,
    Defaults(Vec<Instanced<'a>>),
}

impl<'a> Render<'a> {
    pub(crate) fn into_draws(self) -> Vec<Instanced<'a>> {
        match self {
            Render::None => Vec::new(),
            Render::Defaults(draws) => draws,
        }
    }

    /// Number of instanced draws.
    pub fn draw_count(&self) -> usize {
        match self {
            Render::None => 0,
            Render::Defaults(draws) => draws.len(),
        }
    }
}
