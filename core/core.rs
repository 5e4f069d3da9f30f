pub mod bundler;
pub mod config;
pub mod error;
pub mod extract;
pub mod gather;
pub mod linearize;
pub mod manifest;
pub mod output_formats;
pub mod render;
pub mod rules;
pub mod tokens;

pub use bundler::{Bundle, Bundler, INVALID_TOKEN_COUNT};
pub use config::{Config, FiltersConfig, ManifestConfig, TokenizerConfig};
pub use error::{AppError, Result};
pub use extract::{ExtractorRegistry, GoExtractor, ImportExtractor, NoopExtractor, SourceHeader};
pub use gather::FileRecord;
pub use linearize::{DirectoryGroups, linearize};
pub use output_formats::BundleReport;
pub use render::{BundleSection, render_bundle, split_sections};
pub use rules::FilterRules;
pub use tokens::{TiktokenCounter, TokenCounter};
