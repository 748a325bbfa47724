//! Page layout and template rendering
//!
//! Pages are built per request, validated into a [`ContentPayload`] and
//! rendered by the [`TemplateEngine`] through the `section.tpl` or a custom
//! template, then wrapped in the set's `main.tpl`.

pub mod engine;
pub mod error;
pub mod module;
pub mod page;
pub mod payload;
pub mod substitute;
pub mod template_set;

pub use engine::{MenuProvider, NoMenu, PageChrome, RenderedPage, TemplateEngine};
pub use error::TemplateError;
pub use module::LayoutModule;
pub use page::Page;
pub use payload::{ContentPayload, FieldMap, Section};
pub use substitute::substitute;
pub use template_set::{TemplateSet, DEFAULT_TEMPLATE_SET, MAIN_TEMPLATE, SECTION_TEMPLATE};
