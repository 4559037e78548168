//! CLI command handlers. Each returns the rendered report; printing is left
//! to the binary.

mod profile_cmd;

pub use profile_cmd::*;
