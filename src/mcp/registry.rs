//! Static catalogue of the decompiler operations exposed as MCP tools.
//!
//! Each entry maps one tool 1:1 onto one decompiler endpoint and says how
//! the raw response is shaped. Descriptions are part of the external
//! contract seen by tool-discovery clients and must not drift from the
//! `#[tool]` attributes in [`super::server`].

use std::collections::HashSet;
use std::str::FromStr;

use serde::Serialize;

use super::dispatch::Shape;
use crate::config::JadxMcpConfig;

/// Tool category, used for config toggles and catalogue listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    /// Decompiled Java source and Smali text
    Source,
    /// Classes and their members
    Structure,
    /// Superclasses and interface implementations
    Hierarchy,
    /// Name-based lookup
    Search,
    /// Cross-references
    Xrefs,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Structure => "structure",
            Self::Hierarchy => "hierarchy",
            Self::Search => "search",
            Self::Xrefs => "xrefs",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Source => "Decompiled Java source and Smali disassembly",
            Self::Structure => "Classes, methods and fields",
            Self::Hierarchy => "Superclasses and interface implementations",
            Self::Search => "Search methods by name",
            Self::Xrefs => "Cross-references to methods",
        }
    }

    pub fn all() -> &'static [ToolCategory] {
        &[
            Self::Source,
            Self::Structure,
            Self::Hierarchy,
            Self::Search,
            Self::Xrefs,
        ]
    }
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolCategory {
    type Err = ();

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalized = input.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "source" | "code" | "smali" => Ok(Self::Source),
            "structure" | "classes" | "members" => Ok(Self::Structure),
            "hierarchy" | "inheritance" => Ok(Self::Hierarchy),
            "search" => Ok(Self::Search),
            "xrefs" | "xref" | "references" => Ok(Self::Xrefs),
            _ => Err(()),
        }
    }
}

/// One tool argument and the query key it is sent as.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ParamSpec {
    /// Argument name in the tool's input schema.
    pub name: &'static str,
    /// Query parameter name on the decompiler endpoint.
    #[serde(skip)]
    pub query_key: &'static str,
    pub description: &'static str,
}

/// Immutable description of one operation.
#[derive(Debug, Serialize)]
pub struct OperationDescriptor {
    pub name: &'static str,
    /// Path relative to the decompiler base URI.
    #[serde(skip)]
    pub endpoint: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub shape: Shape,
    pub category: ToolCategory,
}

const CLASS: ParamSpec = ParamSpec {
    name: "class_name",
    query_key: "class",
    description: "Fully qualified class name, e.g. com.example.MainActivity",
};

const METHOD: ParamSpec = ParamSpec {
    name: "method_name",
    query_key: "method",
    description: "Method name",
};

const INTERFACE: ParamSpec = ParamSpec {
    name: "interface_name",
    query_key: "interface",
    description: "Fully qualified interface name",
};

pub static GET_METHOD_CODE: OperationDescriptor = OperationDescriptor {
    name: "get_method_code",
    endpoint: "get_method_code",
    description: "Retrieve the source code of a specific method from a class.",
    params: &[CLASS, METHOD],
    shape: Shape::Text,
    category: ToolCategory::Source,
};

pub static GET_ALL_CLASSES: OperationDescriptor = OperationDescriptor {
    name: "get_all_classes",
    endpoint: "get_all_classes",
    description: "Get a complete list of all classes in the decompiled project.",
    params: &[],
    shape: Shape::Lines,
    category: ToolCategory::Structure,
};

pub static GET_CLASS_CODE: OperationDescriptor = OperationDescriptor {
    name: "get_class_code",
    endpoint: "get_class_code",
    description: "Retrieve the complete Java source code of a specified class.",
    params: &[CLASS],
    shape: Shape::Text,
    category: ToolCategory::Source,
};

pub static SEARCH_METHOD_BY_NAME: OperationDescriptor = OperationDescriptor {
    name: "search_method_by_name",
    endpoint: "search_method_by_name",
    description: "Search for methods with a specific name across all classes in the project.",
    params: &[METHOD],
    shape: Shape::Lines,
    category: ToolCategory::Search,
};

pub static GET_METHODS_OF_CLASS: OperationDescriptor = OperationDescriptor {
    name: "get_methods_of_class",
    endpoint: "get_methods_of_class",
    description: "List all methods defined in a specific class.",
    params: &[CLASS],
    shape: Shape::Lines,
    category: ToolCategory::Structure,
};

pub static GET_FIELDS_OF_CLASS: OperationDescriptor = OperationDescriptor {
    name: "get_fields_of_class",
    endpoint: "get_fields_of_class",
    description: "List all fields and their types defined in a specific class.",
    params: &[CLASS],
    shape: Shape::Lines,
    category: ToolCategory::Structure,
};

pub static GET_SMALI_OF_CLASS: OperationDescriptor = OperationDescriptor {
    name: "get_smali_of_class",
    endpoint: "get_smali_of_class",
    description: "Retrieve the Smali (disassembled Dalvik bytecode) representation of a class.",
    params: &[CLASS],
    shape: Shape::Text,
    category: ToolCategory::Source,
};

pub static GET_IMPLEMENTATION_OF_INTERFACE: OperationDescriptor = OperationDescriptor {
    name: "get_implementation_of_interface",
    endpoint: "get_implementation_of_interface",
    description: "Find all classes that implement a specific interface.",
    params: &[INTERFACE],
    shape: Shape::Lines,
    category: ToolCategory::Hierarchy,
};

pub static GET_SUPERCLASSES_OF_CLASS: OperationDescriptor = OperationDescriptor {
    name: "get_superclasses_of_class",
    endpoint: "get_superclasses_of_class",
    description: "Get the inheritance hierarchy (parent classes) of a specific class.",
    params: &[CLASS],
    shape: Shape::Lines,
    category: ToolCategory::Hierarchy,
};

pub static FIND_XREF_OF_METHOD: OperationDescriptor = OperationDescriptor {
    name: "find_xref_of_method",
    endpoint: "find_xref_of_method",
    description: "Find all cross-references (usages) of a specific method.",
    params: &[CLASS, METHOD],
    shape: Shape::Lines,
    category: ToolCategory::Xrefs,
};

/// Every operation, in catalogue order.
pub static OPERATIONS: &[&OperationDescriptor] = &[
    &GET_METHOD_CODE,
    &GET_ALL_CLASSES,
    &GET_CLASS_CODE,
    &SEARCH_METHOD_BY_NAME,
    &GET_METHODS_OF_CLASS,
    &GET_FIELDS_OF_CLASS,
    &GET_SMALI_OF_CLASS,
    &GET_IMPLEMENTATION_OF_INTERFACE,
    &GET_SUPERCLASSES_OF_CLASS,
    &FIND_XREF_OF_METHOD,
];

/// Get an operation by tool name
pub fn get_operation(name: &str) -> Option<&'static OperationDescriptor> {
    OPERATIONS.iter().copied().find(|op| op.name == name)
}

/// Get operations by category
pub fn operations_by_category(
    category: ToolCategory,
) -> impl Iterator<Item = &'static OperationDescriptor> {
    OPERATIONS
        .iter()
        .copied()
        .filter(move |op| op.category == category)
}

/// Whether the config leaves this operation visible.
///
/// A per-tool override beats its category toggle. Category keys are
/// matched loosely (`xref`, `XRefs` and `references` all mean `xrefs`).
pub fn is_enabled(config: &JadxMcpConfig, op: &OperationDescriptor) -> bool {
    if let Some(ov) = config.tools.overrides.get(op.name) {
        return ov.enabled;
    }
    config
        .tools
        .categories
        .iter()
        .filter(|(key, _)| key.parse::<ToolCategory>().ok() == Some(op.category))
        .all(|(_, c)| c.enabled)
}

/// Names of the operations enabled for a given config.
pub fn enabled_operations(config: &JadxMcpConfig) -> HashSet<&'static str> {
    OPERATIONS
        .iter()
        .filter(|op| is_enabled(config, op))
        .map(|op| op.name)
        .collect()
}
