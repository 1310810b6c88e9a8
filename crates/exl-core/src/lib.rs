#![doc = "Parameter model, command-line serialization and shared errors for exlauncher."]

pub mod cmdline;
pub mod duration;
pub mod errors;
pub mod hash;
pub mod params;
pub mod serde;

pub use cmdline::{call_signature, command_line_tokens, to_command_line};
pub use duration::{to_duration, WallTime};
pub use errors::{ErrorInfo, LaunchError};
pub use hash::sha256_hex;
pub use params::{ParamValue, ParameterSet, Scalar};
pub use crate::serde::to_canonical_json_bytes;
