// The resolution engine.
// Leaf modules first: pattern templates, asset scoring and binary lookup,
// then the GitHub collaborator and the orchestrator that ties them together.

// `{version}`/`{platform}`/`{arch}` expansion and glob matching.
pub mod pattern;
// Heuristic asset selection when no pattern is configured.
pub mod asset_detection;
// Finding a binary inside an archive listing.
pub mod binary_locator;
// Release metadata and asset downloads.
pub mod github;
// Per (tool, platform, arch) orchestration.
pub mod tool_resolver;
// Removing binaries that are no longer configured.
pub mod cleanup;
// Low-level helpers: platform vocabulary, archives, writing binaries.
pub mod utilities;
