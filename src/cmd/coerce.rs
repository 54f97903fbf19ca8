/*!
`coerce.rs` - raw flag values to outgoing JSON arguments.

The flag layer already produced typed scalars (i64 / f64 / bool) for
schema-typed parameters; those pass through untouched. Parameters declared
`array` or `object` arrive as raw text and are decoded here as JSON, falling
back to the raw string when decoding fails: the declared type is a hint, the
service performs its own validation.

Only supplied flags end up in the argument object. Absent optional flags are
omitted entirely, never null-filled.
*/

use clap::ArgMatches;
use serde_json::{Map, Number, Value};

use super::synth::{FlagKind, SynthesizedCommand};

/// Decode a raw string according to the schema's declared type.
pub fn coerce(raw: &str, declared_type: &str) -> Value {
    if matches!(declared_type, "array" | "object")
        && let Ok(value) = serde_json::from_str::<Value>(raw)
    {
        return value;
    }
    Value::String(raw.to_string())
}

/// Build the outgoing argument object from one parse result.
pub fn collect_arguments(
    command: &SynthesizedCommand,
    matches: &ArgMatches,
) -> Map<String, Value> {
    let mut arguments = Map::new();
    for flag in &command.flags {
        let value = match flag.kind {
            FlagKind::Int => matches.get_one::<i64>(&flag.param).map(|v| Value::from(*v)),
            FlagKind::Float => matches.get_one::<f64>(&flag.param).map(|v| float_value(*v)),
            FlagKind::Bool => matches.get_one::<bool>(&flag.param).map(|v| Value::Bool(*v)),
            FlagKind::Text => matches
                .get_one::<String>(&flag.param)
                .map(|v| coerce(v, &flag.declared_type)),
        };
        if let Some(value) = value {
            arguments.insert(flag.param.clone(), value);
        }
    }
    arguments
}

/// Non-finite floats have no JSON form; fall back to their text rendering.
fn float_value(v: f64) -> Value {
    Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(v.to_string()))
}
