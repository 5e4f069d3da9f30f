pub mod bundle;
pub mod completion;
pub mod config;
pub mod files;
