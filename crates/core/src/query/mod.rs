//! Query block configuration and result post-processing.
//!
//! A block's YAML text becomes a validated [`QueryConfig`]; after the index
//! has been searched, [`apply`] filters, sorts and limits the results in the
//! order renderers display them.

pub mod config;
pub mod pipeline;

pub use config::{FieldKind, FieldSpec, QueryConfig, QueryConfigError, SortSpec, TemplateKind};
pub use pipeline::{apply, apply_with_rng, order, order_with_rng, truncate};
