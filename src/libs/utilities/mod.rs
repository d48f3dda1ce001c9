// Declare the `platform` module: OS/arch vocabulary and keyword matchers.
pub mod platform;
// Declare the `compression` module: in-memory archive listing and entry reads.
pub mod compression;
// Declare the `binary` module: atomic writes and checksums of installed binaries.
pub mod binary;
