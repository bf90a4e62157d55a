//! Strategy construction: template catalog, instantiation and the leg store.

mod catalog;
mod instantiate;
mod store;

pub use catalog::{
    get_template, is_valid_template, list_templates, template_ids, templates_by_category,
    StrategyCategory, StrategyTemplate, TemplateLeg, BUILTIN_TEMPLATES,
};
pub use instantiate::instantiate_template;
pub use store::{LegStore, LegUpdate};
