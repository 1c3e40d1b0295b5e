//! Schema compilation.
//!
//! [`CodeGenerator`] walks a schema tree once and emits a C++ validator
//! class as two text streams: a header declaring the class and a source
//! carrying the implementation. `$ref` targets become member functions of a
//! nested `Definitions` structure; everything else is emitted inline in
//! schema order.

macro_rules! src_out {
    ($gen:expr, $($arg:tt)*) => { $gen.src.write(format_args!($($arg)*)) };
}

macro_rules! hdr_out {
    ($gen:expr, $($arg:tt)*) => { $gen.hdr.write(format_args!($($arg)*)) };
}

pub(crate) use hdr_out;
pub(crate) use src_out;

mod array;
mod combinators;
mod enum_;
mod object;
pub mod refs;
mod types;

use ahash::AHashMap;

use crate::catalog::{Property, PropertySet, SchemaType, TypeSet, METADATA_KEYS};
use crate::emit::EmitBuffer;
use crate::errata::{Errata, Rv, Severity};
use crate::node::SchemaNode;

/// The generated validator, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub header: String,
    pub source: String,
}

/// Single-use compilation context. Construct one per schema, call
/// [`CodeGenerator::run`], and inspect the returned diagnostics.
pub struct CodeGenerator<'s> {
    root: &'s SchemaNode,
    class_name: String,
    header_include: String,
    pub(crate) hdr: EmitBuffer,
    pub(crate) src: EmitBuffer,
    var_idx: u32,
    definitions: AHashMap<String, String>,
}

impl<'s> CodeGenerator<'s> {
    /// `header_include` is the path the generated source will `#include`;
    /// normally the header output path.
    pub fn new(
        root: &'s SchemaNode,
        class_name: impl Into<String>,
        header_include: impl Into<String>,
    ) -> Self {
        Self {
            root,
            class_name: class_name.into(),
            header_include: header_include.into(),
            hdr: EmitBuffer::new(),
            src: EmitBuffer::new(),
            var_idx: 1,
            definitions: AHashMap::new(),
        }
    }

    /// Compiles the schema. The artifact is present only when no diagnostic
    /// reached [`Severity::Error`]; the diagnostics are returned either way.
    pub fn run(mut self) -> Rv<Option<Artifact>> {
        let mut notes = Errata::new();
        let root = self.root;

        if !root.is_mapping() {
            notes.error(format!("Root node must be a {}.", SchemaType::Object));
            return Rv::with(None, notes);
        }

        self.emit_src_prologue();
        self.emit_hdr_prologue();

        notes.note(self.process_definitions(root));
        self.emit_hdr_epilogue();

        src_out!(self, "bool {}::operator()(YAML::Node const& node) {{\n", self.class_name);
        self.src.indent();
        src_out!(self, "static constexpr std::string_view name {{\"root\"}};\n");
        src_out!(self, "erratum.clear();\n\n");
        notes.note(self.validate_node(root, "node"));
        src_out!(self, "\nreturn erratum.severity() < swoc::Severity::ERROR;\n");
        self.src.exdent();
        src_out!(self, "}}\n");

        if notes.severity() >= Severity::Error {
            return Rv::with(None, notes);
        }
        let Self { hdr, src, .. } = self;
        Rv::with(
            Some(Artifact {
                header: hdr.into_string(),
                source: src.into_string(),
            }),
            notes,
        )
    }

    /// Allocates a fresh variable name for the emitted code. The counter
    /// never resets; scoping is left to the generated braces.
    pub(crate) fn var_name(&mut self) -> String {
        let name = format!("node_{}", self.var_idx);
        self.var_idx += 1;
        name
    }

    /// Registers and emits a validation function for every `$ref` target
    /// reachable from `node`.
    ///
    /// The table entry is inserted before the target is traversed, so a
    /// reference cycle finds its identifier already present and terminates.
    /// Dependent definitions finish emitting before this one starts, which
    /// keeps every function body contiguous in the source stream.
    fn process_definitions(&mut self, node: &'s SchemaNode) -> Errata {
        let mut notes = Errata::new();
        if node.is_mapping() {
            if let Some(ref_node) = node.get(Property::Ref.as_str()) {
                let Some(reference) = ref_node.scalar() else {
                    notes.error(format!(
                        "'$ref' value at line {} must be a string.",
                        ref_node.line()
                    ));
                    return notes;
                };
                if self.definitions.contains_key(reference) {
                    return notes;
                }
                let (target, errata) = refs::locate(self.root, reference).into_parts();
                let Some(target) = target else {
                    notes.note(errata);
                    notes.error(format!(
                        "Unable to find ref \"{}\" used at {}.",
                        reference,
                        ref_node.pos()
                    ));
                    return notes;
                };
                let defun = refs::definition_name(reference);
                self.definitions
                    .insert(reference.to_string(), defun.clone());
                notes.note(self.process_definitions(target));

                hdr_out!(
                    self,
                    "bool {} (swoc::Errata &erratum, YAML::Node const& node, std::string_view const& name);\n",
                    defun
                );
                src_out!(
                    self,
                    "bool {}::Definitions::{} (swoc::Errata &erratum, YAML::Node const& node, std::string_view const& name) {{\n",
                    self.class_name,
                    defun
                );
                self.src.indent();
                let body = self.validate_node(target, "node");
                let failed = body.severity() >= Severity::Error;
                notes.note(body);
                src_out!(self, "return true;\n");
                self.src.exdent();
                src_out!(self, "}}\n\n");
                if failed {
                    notes.info(format!(
                        "Failed to generate definition \"{}\" at {}, used at {}.",
                        reference,
                        target.pos(),
                        ref_node.pos()
                    ));
                }
            } else {
                for (_, value) in node.entries() {
                    notes.note(self.process_definitions(value));
                }
            }
        } else if node.is_sequence() {
            for item in node.items() {
                notes.note(self.process_definitions(item));
            }
        }
        notes
    }

    /// Emits validation for one schema mapping against the runtime value
    /// bound to `var`.
    ///
    /// `$ref` short-circuits everything else. Otherwise properties run in a
    /// fixed order: `type` first (it computes the permitted type set), then
    /// the object group, the array group, `anyOf`, `oneOf`, `enum`.
    pub(crate) fn validate_node(&mut self, value: &'s SchemaNode, var: &str) -> Errata {
        let mut zret = Errata::new();
        if !value.is_mapping() {
            zret.error(format!(
                "Value at line {} must be a {}.",
                value.line(),
                SchemaType::Object
            ));
            return zret;
        }

        if let Some(ref_node) = value.get(Property::Ref.as_str()) {
            if value.len() > 1 {
                zret.warn(format!(
                    "Ignoring tags in value at line {} - use of '$ref' tag at line {} requires ignoring all other tags.",
                    value.line(),
                    ref_node.line()
                ));
            }
            let reference = ref_node.scalar().unwrap_or_default();
            match self.definitions.get(reference) {
                Some(defun) => {
                    let defun = defun.clone();
                    src_out!(self, "if (! defun.{}(erratum, {}, name)) return false;\n", defun, var);
                }
                None => {
                    zret.error(format!(
                        "Invalid '$ref' at line {} in value at line {} - '{}' not found.",
                        ref_node.line(),
                        value.line(),
                        reference
                    ));
                }
            }
            return zret;
        }

        let mut present = PropertySet::new();
        for (key, _) in value.entries() {
            let Some(name) = key.scalar() else { continue };
            match name.parse::<Property>() {
                Ok(prop) => present = present.insert(prop),
                Err(()) => {
                    if !METADATA_KEYS.contains(&name) {
                        zret.warn(format!(
                            "Ignoring unknown key '{}' at line {} in value at line {}.",
                            name,
                            key.line(),
                            value.line()
                        ));
                    }
                }
            }
        }

        let mut type_set = TypeSet::full();
        if let Some(n) = value.get(Property::Type.as_str()) {
            let (order, errata) = types::process(n).into_parts();
            if zret.note(errata).severity() >= Severity::Error {
                let severity = zret.severity();
                zret.annotate(
                    severity,
                    format!(
                        "Unable to process value at line {} for '{}' at line {}.",
                        n.line(),
                        Property::Type,
                        value.line()
                    ),
                );
                return zret;
            }
            if !order.is_empty() {
                type_set = TypeSet::new();
                for ty in &order {
                    type_set = type_set.insert(*ty);
                }
                types::emit_check(self, &order, var);
            }
        }

        if type_set.contains(SchemaType::Object) {
            let r = object::process(self, value, var, type_set, present);
            if zret.note(r).severity() >= Severity::Error {
                let severity = zret.severity();
                zret.annotate(
                    severity,
                    format!(
                        "Unable to process value at line {} as {}.",
                        value.line(),
                        SchemaType::Object
                    ),
                );
                return zret;
            }
        }

        if type_set.contains(SchemaType::Array) {
            let r = array::process(self, value, var, type_set, present);
            if zret.note(r).severity() >= Severity::Error {
                let severity = zret.severity();
                zret.annotate(
                    severity,
                    format!("Unable to process value at line {}.", value.line()),
                );
                return zret;
            }
        }

        if let Some(n) = value.get(Property::AnyOf.as_str()) {
            if zret
                .note(combinators::process_any_of(self, n, var))
                .severity()
                >= Severity::Error
            {
                return zret;
            }
        }

        if let Some(n) = value.get(Property::OneOf.as_str()) {
            if zret
                .note(combinators::process_one_of(self, n, var))
                .severity()
                >= Severity::Error
            {
                return zret;
            }
        }

        if let Some(n) = value.get(Property::Enum.as_str()) {
            if zret.note(enum_::process(self, n, var)).severity() >= Severity::Error {
                return zret;
            }
        }

        zret
    }

    fn emit_src_prologue(&mut self) {
        src_out!(
            self,
            "#include <functional>\n#include <array>\n#include <algorithm>\n#include <iostream>\n\n#include \"{}\"\n\nusing Validator = std::function<bool (YAML::Node const&)>;\n",
            self.header_include
        );
        src_out!(self, "{}", RUNTIME_HELPERS);
    }

    fn emit_hdr_prologue(&mut self) {
        hdr_out!(
            self,
            "#include <string_view>\n\n#include \"swoc/Errata.h\"\n#include \"yaml-cpp/yaml.h\"\n\n"
        );
        hdr_out!(self, "class {} {{\npublic:\n", self.class_name);
        self.hdr.indent();
        hdr_out!(self, "swoc::Errata erratum;\n");
        hdr_out!(self, "bool operator()(YAML::Node const& n);\n\n");
        hdr_out!(self, "struct Definitions {{\n");
        self.hdr.indent();
    }

    fn emit_hdr_epilogue(&mut self) {
        hdr_out!(self, "{}::Definitions& defun {{*this}};\n", self.class_name);
        self.hdr.exdent();
        hdr_out!(self, "}} defun;\n");
        self.hdr.exdent();
        hdr_out!(self, "}};\n");
    }
}

/// Hand written support functions injected into every generated source
/// file. The names form a stable contract with the emitted checks.
const RUNTIME_HELPERS: &str = r#"
namespace {

bool
equal(YAML::Node const& lhs, YAML::Node const& rhs)
{
  if (lhs.Type() != rhs.Type()) {
    return false;
  }
  if (lhs.IsSequence()) {
    if (lhs.size() != rhs.size()) {
      return false;
    }
    for (size_t i = 0, n = lhs.size(); i < n; ++i) {
      if (!equal(lhs[i], rhs[i])) {
        return false;
      }
    }
    return true;
  }
  if (lhs.IsMap()) {
    if (lhs.size() != rhs.size()) {
      return false;
    }
    for (auto const& pair : lhs) {
      if (!rhs[pair.first] || !equal(pair.second, rhs[pair.first])) {
        return false;
      }
    }
    return true;
  }
  return lhs.Scalar() == rhs.Scalar();
}

bool is_null_type(YAML::Node const& node) {
  return node.IsNull();
}

bool is_bool_type(YAML::Node const& node) {
  if (node.IsScalar()) {
    auto const& value = node.Scalar();
    return 0 == strcasecmp("true", value.c_str()) || 0 == strcasecmp("false", value.c_str());
  }
  return false;
}

bool is_object_type(YAML::Node const& node) {
  return node.IsMap();
}

bool is_array_type(YAML::Node const& node) {
  return node.IsSequence();
}

bool is_number_type(YAML::Node const& node) {
  if (node.IsScalar()) {
    swoc::TextView value { node.Scalar() };
    swoc::TextView parsed;
    if (value.trim_if(&isspace).size() < 1) {
      return false;
    }
    swoc::svtod(value, &parsed);
    return value.size() == parsed.size();
  }
  return false;
}

bool is_integer_type(YAML::Node const& node) {
  if (node.IsScalar()) {
    swoc::TextView value { node.Scalar() };
    swoc::TextView parsed;
    if (value.trim_if(&isspace).size() < 1) {
      return false;
    }
    swoc::svtoi(value, &parsed);
    return value.size() == parsed.size();
  }
  return false;
}

bool is_string_type(YAML::Node const& node) {
  return node.IsScalar();
}

} // namespace

"#;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variable_names_are_monotonic() {
        let root = SchemaNode::from_json(&json!({}));
        let mut gen = CodeGenerator::new(&root, "Schema", "Schema.h");
        assert_eq!(gen.var_name(), "node_1");
        assert_eq!(gen.var_name(), "node_2");
        assert_eq!(gen.var_name(), "node_3");
    }

    #[test]
    fn definition_table_grows_monotonically() {
        let root = SchemaNode::from_json(&json!({
            "definitions": {"port": {"type": "integer"}},
            "type": "object",
            "properties": {
                "src": {"$ref": "#/definitions/port"},
                "dst": {"$ref": "#/definitions/port"}
            }
        }));
        let mut gen = CodeGenerator::new(&root, "Schema", "Schema.h");
        gen.emit_hdr_prologue();
        let errata = gen.process_definitions(gen.root);
        assert!(errata.is_ok());
        assert_eq!(gen.definitions.len(), 1);
        assert_eq!(
            gen.definitions.get("#/definitions/port").map(String::as_str),
            Some("v_definitions_port")
        );
    }

    #[test]
    fn in_progress_references_reuse_the_registered_identifier() {
        let root = SchemaNode::from_json(&json!({
            "definitions": {
                "tree": {
                    "type": "object",
                    "properties": {"child": {"$ref": "#/definitions/tree"}}
                }
            },
            "$ref": "#/definitions/tree"
        }));
        let mut gen = CodeGenerator::new(&root, "Schema", "Schema.h");
        gen.emit_hdr_prologue();
        let errata = gen.process_definitions(gen.root);
        assert!(errata.is_ok());
        assert_eq!(gen.definitions.len(), 1);
        // The self-reference inside the body resolves to the same function.
        assert_eq!(
            gen.src
                .as_str()
                .matches("defun.v_definitions_tree(erratum, node_1, name)")
                .count(),
            1
        );
        assert_eq!(
            gen.src
                .as_str()
                .matches("bool Schema::Definitions::v_definitions_tree (")
                .count(),
            1
        );
    }
}
