//! Flattening of parameter sets into command-line arguments.
//!
//! Values are emitted verbatim. Nothing is quoted or escaped, so values holding
//! whitespace or shell metacharacters reach the scheduler shell unchanged.

use crate::params::ParameterSet;

/// Serializes `params` as `--key value --list v1 v2 ...` in insertion order.
///
/// An empty set yields an empty string and the result never carries trailing
/// whitespace.
pub fn to_command_line(params: &ParameterSet) -> String {
    command_line_tokens(params).join(" ")
}

/// The same arguments as [`to_command_line`], one token per argv slot.
pub fn command_line_tokens(params: &ParameterSet) -> Vec<String> {
    let mut tokens = Vec::with_capacity(params.len() * 2);
    for (key, value) in params.iter() {
        tokens.push(format!("--{key}"));
        tokens.extend(value.tokens());
    }
    tokens
}

/// Renders the keyword call a local run would perform, e.g. `train(lr=0.1, seed=0)`.
pub fn call_signature(function: &str, params: &ParameterSet, seed: u64) -> String {
    let mut args: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={}", value.tokens().join(" ")))
        .collect();
    args.push(format!("seed={seed}"));
    format!("{function}({})", args.join(", "))
}
