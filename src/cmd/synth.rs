/*!
`synth.rs` - schema to command-line surface.

Each discovered tool becomes one subcommand; each property of its parameter
schema becomes one flag:

  - display name: parameter name with underscores rendered as hyphens
  - type: integer -> i64, number -> f64, boolean -> bool, everything else
    (including array and object) -> raw string, decoded later by coercion
  - required iff the parameter is named in the schema's `required` set
  - help text: the property's description

Flag order follows the schema's property order. Synthesis is pure: equal
descriptors always produce equal commands, so help output is stable and the
derivation is testable without a live service.
*/

use std::collections::HashSet;

use clap::{Arg, Command, value_parser};
use serde_json::Value;

use crate::mcp::ToolDescriptor;

/// Typed shape of one synthesized flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Int,
    Float,
    Bool,
    Text,
}

impl FlagKind {
    fn from_schema_type(declared: &str) -> Self {
        match declared {
            "integer" => FlagKind::Int,
            "number" => FlagKind::Float,
            "boolean" => FlagKind::Bool,
            _ => FlagKind::Text,
        }
    }

    fn value_name(self) -> &'static str {
        match self {
            FlagKind::Int => "INT",
            FlagKind::Float => "FLOAT",
            FlagKind::Bool => "BOOL",
            FlagKind::Text => "STRING",
        }
    }
}

/// One flag derived from one schema property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSpec {
    /// Parameter name exactly as the service expects it.
    pub param: String,
    /// Display name on the command line (kebab-case).
    pub flag: String,
    pub kind: FlagKind,
    pub required: bool,
    pub help: String,
    /// Declared schema type, kept around for structured-value coercion.
    pub declared_type: String,
}

/// A tool's full flag surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedCommand {
    pub tool: String,
    pub about: String,
    pub flags: Vec<FlagSpec>,
}

/// Derive a command from a tool descriptor.
pub fn synthesize(descriptor: &ToolDescriptor) -> SynthesizedCommand {
    let schema = &descriptor.input_schema;

    let required: HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let mut flags = Vec::new();
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (param, property) in properties {
            let declared_type = property
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("string")
                .to_string();
            let help = property
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            flags.push(FlagSpec {
                flag: param.replace('_', "-"),
                kind: FlagKind::from_schema_type(&declared_type),
                required: required.contains(param.as_str()),
                param: param.clone(),
                help,
                declared_type,
            });
        }
    }

    SynthesizedCommand {
        tool: descriptor.name.clone(),
        about: descriptor.description.clone(),
        flags,
    }
}

/// Realize the flag set as a `clap` command. Scalar conversion (int, float,
/// bool) happens in the flag layer via typed value parsers.
pub fn to_clap(command: &SynthesizedCommand) -> Command {
    let mut cmd = Command::new(command.tool.clone())
        .about(command.about.clone())
        .bin_name(format!("mcp-surface {}", command.tool));
    for flag in &command.flags {
        let arg = Arg::new(flag.param.clone())
            .long(flag.flag.clone())
            .value_name(flag.kind.value_name())
            .required(flag.required)
            .help(flag.help.clone());
        cmd = cmd.arg(match flag.kind {
            FlagKind::Int => arg.value_parser(value_parser!(i64)),
            FlagKind::Float => arg.value_parser(value_parser!(f64)),
            FlagKind::Bool => arg.value_parser(value_parser!(bool)),
            FlagKind::Text => arg.value_parser(value_parser!(String)),
        });
    }
    cmd
}

/// Lookup table of synthesized commands, keyed by tool name.
///
/// Built once per process from the catalog and treated as immutable; the
/// iteration order matches the catalog's.
#[derive(Debug, Default)]
pub struct CommandTable {
    commands: Vec<SynthesizedCommand>,
}

impl CommandTable {
    pub fn build(tools: &[ToolDescriptor]) -> Self {
        Self {
            commands: tools.iter().map(synthesize).collect(),
        }
    }

    pub fn get(&self, tool: &str) -> Option<&SynthesizedCommand> {
        self.commands.iter().find(|c| c.tool == tool)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SynthesizedCommand> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
