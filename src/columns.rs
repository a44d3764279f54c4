use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::{ErrorCatalog, ErrorCode};
use crate::error::{FrgCheckError, Result};

/// The named input fields of one FRG row, with their exact sheet labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKind {
    RequirementsRealization,
    Requirements,
    Interface,
    OutputSemantics,
    Mechanism,
    Capability,
    Implementation,
    OutputSemanticsUniformCircuit,
}

impl FieldKind {
    pub const ALL: [FieldKind; 8] = [
        FieldKind::RequirementsRealization,
        FieldKind::Requirements,
        FieldKind::Interface,
        FieldKind::OutputSemantics,
        FieldKind::Mechanism,
        FieldKind::Capability,
        FieldKind::Implementation,
        FieldKind::OutputSemanticsUniformCircuit,
    ];

    /// The column header as it appears on the FRG sheet.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::RequirementsRealization => "Requirements realization by interface",
            FieldKind::Requirements => "Requirements",
            FieldKind::Interface => "Interface",
            FieldKind::OutputSemantics => "Output semantics",
            FieldKind::Mechanism => "Mechanism",
            FieldKind::Capability => "Capability",
            FieldKind::Implementation => "Implementation",
            FieldKind::OutputSemanticsUniformCircuit => "Output semantics (Uniform Circuit)",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Immutable mapping from fields and error codes to 1-based sheet columns.
///
/// Input columns are one-to-one: each field lives in exactly one column.
/// Output columns are many-to-one on purpose: several error codes report
/// into the same review column.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    inputs: BTreeMap<FieldKind, u32>,
    outputs: BTreeMap<ErrorCode, u32>,
}

impl ColumnLayout {
    pub fn new(inputs: BTreeMap<FieldKind, u32>, outputs: BTreeMap<ErrorCode, u32>) -> Self {
        Self { inputs, outputs }
    }

    /// The column layout of the production FRG sheet.
    pub fn standard() -> Self {
        let inputs = BTreeMap::from([
            (FieldKind::RequirementsRealization, 59),
            (FieldKind::Requirements, 61),
            (FieldKind::Interface, 51),
            (FieldKind::OutputSemantics, 63),
            (FieldKind::Mechanism, 53),
            (FieldKind::Capability, 56),
            (FieldKind::Implementation, 52),
            (FieldKind::OutputSemanticsUniformCircuit, 27),
        ]);

        let outputs = BTreeMap::from([
            (ErrorCode::E1001, 60),
            (ErrorCode::E1101, 58),
            (ErrorCode::E1102, 58),
            (ErrorCode::E1103, 58),
            (ErrorCode::E1104, 58),
            (ErrorCode::E2001, 54),
            (ErrorCode::E2002, 54),
            (ErrorCode::E2101, 54),
            (ErrorCode::E2102, 54),
            (ErrorCode::E2103, 54),
            (ErrorCode::E2104, 54),
            (ErrorCode::E2201, 54),
            (ErrorCode::E2202, 62),
            (ErrorCode::E2203, 64),
            (ErrorCode::E2204, 54),
            (ErrorCode::E2205, 57),
            (ErrorCode::E2206, 62),
        ]);

        Self { inputs, outputs }
    }

    pub fn input_column(&self, field: FieldKind) -> Option<u32> {
        self.inputs.get(&field).copied()
    }

    pub fn output_column(&self, code: ErrorCode) -> Option<u32> {
        self.outputs.get(&code).copied()
    }

    /// Startup self-check: every checked code must resolve in the catalog,
    /// every field it references must have an input column, and the code
    /// itself must have an output column. A miss here is a wiring mistake,
    /// not a runtime data problem.
    pub fn validate(&self, catalog: &ErrorCatalog) -> Result<()> {
        for code in ErrorCode::CHECKED {
            let definition = catalog.lookup(code).ok_or_else(|| {
                FrgCheckError::Configuration(format!(
                    "error code {} is in the checked list but has no catalog definition",
                    code
                ))
            })?;

            for field in &definition.target_fields {
                if self.input_column(*field).is_none() {
                    return Err(FrgCheckError::Configuration(format!(
                        "field '{}' (referenced by error code {}) has no input column",
                        field, code
                    )));
                }
            }

            if self.output_column(code).is_none() {
                return Err(FrgCheckError::Configuration(format!(
                    "error code {} has no output column",
                    code
                )));
            }
        }
        Ok(())
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::standard()
    }
}
