// Data shapes shared across the crate.

// `dotbins.yaml`: top-level settings and discovery.
pub mod config;
// One tool entry, raw and normalized.
pub mod tools;
// GitHub releases and their assets.
pub mod release;
// `versions.json`.
pub mod state_file;
