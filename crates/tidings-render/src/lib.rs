//! Feed text rendering.
//!
//! The engine only needs three things from this crate: whether a reason code
//! exists, the templates registered for a reason in a language, and a way to
//! turn a template plus an entry into display text. All three are passed into
//! the engine explicitly through [`RenderContext`].

pub mod language;
pub mod reasons;
pub mod renderer;

pub use language::Localization;
pub use reasons::{ReasonCatalogue, ReasonTemplates, Reasons};
pub use renderer::{PlaceholderRenderer, Renderer, TextKind};

/// Collaborators used while rendering a retrieved page.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub reasons: &'a dyn ReasonCatalogue,
    pub renderer: &'a dyn Renderer,
    pub localization: &'a Localization,
}
