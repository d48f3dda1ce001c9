// Command-line definitions (`clap` derive).
pub mod cmd_enums;
