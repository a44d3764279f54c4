use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::columns::FieldKind;
use crate::error::FrgCheckError;

/// One documentation-quality check on an FRG row.
///
/// The numeric identifiers are the domain's own naming: 1xxx codes audit the
/// Requirements/Interface columns, 2xxx codes audit the Mechanism/Capability/
/// Output semantics columns. Variants exist for every cataloged code;
/// [`ErrorCode::CHECKED`] is the subset actually run on each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    E1001,
    E1101,
    E1102,
    E1103,
    E1104,
    E2001,
    E2002,
    E2101,
    E2102,
    E2103,
    E2104,
    E2201,
    E2202,
    E2203,
    E2204,
    E2205,
    E2206,
}

impl ErrorCode {
    /// Every code the catalog defines.
    pub const ALL: [ErrorCode; 17] = [
        ErrorCode::E1001,
        ErrorCode::E1101,
        ErrorCode::E1102,
        ErrorCode::E1103,
        ErrorCode::E1104,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2101,
        ErrorCode::E2102,
        ErrorCode::E2103,
        ErrorCode::E2104,
        ErrorCode::E2201,
        ErrorCode::E2202,
        ErrorCode::E2203,
        ErrorCode::E2204,
        ErrorCode::E2205,
        ErrorCode::E2206,
    ];

    /// The fixed, ordered list of codes checked on every row.
    ///
    /// 2203 and 2205 are cataloged and column-mapped but deliberately left
    /// out of the per-row run.
    pub const CHECKED: [ErrorCode; 15] = [
        ErrorCode::E1001,
        ErrorCode::E1101,
        ErrorCode::E1102,
        ErrorCode::E1103,
        ErrorCode::E1104,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2101,
        ErrorCode::E2102,
        ErrorCode::E2103,
        ErrorCode::E2104,
        ErrorCode::E2201,
        ErrorCode::E2202,
        ErrorCode::E2204,
        ErrorCode::E2206,
    ];

    /// The wire/sheet representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E1001 => "1001",
            ErrorCode::E1101 => "1101",
            ErrorCode::E1102 => "1102",
            ErrorCode::E1103 => "1103",
            ErrorCode::E1104 => "1104",
            ErrorCode::E2001 => "2001",
            ErrorCode::E2002 => "2002",
            ErrorCode::E2101 => "2101",
            ErrorCode::E2102 => "2102",
            ErrorCode::E2103 => "2103",
            ErrorCode::E2104 => "2104",
            ErrorCode::E2201 => "2201",
            ErrorCode::E2202 => "2202",
            ErrorCode::E2203 => "2203",
            ErrorCode::E2204 => "2204",
            ErrorCode::E2205 => "2205",
            ErrorCode::E2206 => "2206",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = FrgCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| FrgCheckError::UnknownErrorCode(s.to_string()))
    }
}

/// One catalog entry: which fields the check reads and how to describe the
/// error pattern to the evaluator.
#[derive(Debug, Clone)]
pub struct ErrorDefinition {
    pub code: ErrorCode,
    /// Fields whose cell contents are embedded in the prompt, in this order.
    pub target_fields: Vec<FieldKind>,
    pub description: String,
    pub examples: Vec<String>,
    /// Per-field exposition shown to the evaluator alongside the error.
    pub field_notes: Vec<(FieldKind, String)>,
}

/// The fixed, hand-authored table of error patterns.
///
/// Built once at startup and never mutated; pass it to the checker by
/// reference. Content mirrors the review guideline for BRA Function
/// Realization Graph sheets.
#[derive(Debug, Clone)]
pub struct ErrorCatalog {
    definitions: BTreeMap<ErrorCode, ErrorDefinition>,
}

impl ErrorCatalog {
    pub fn lookup(&self, code: ErrorCode) -> Option<&ErrorDefinition> {
        self.definitions.get(&code)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// The production catalog.
    pub fn standard() -> Self {
        use FieldKind::*;

        const REQUIREMENTS_NOTE: &str =
            "Requirements: 機能ノードに対する要求機能を、Capability と Output semantics で規定するカラム。";
        const INTERFACE_NOTE: &str =
            "Interface: 機能ノードの入力信号と出力信号を定義し、信号の流れを規定するカラム。";
        const REALIZATION_NOTE: &str =
            "Requirements realization by interface: Interface 経由で Requirement をどのように満たすかを記述するカラム。";
        const OUTPUT_SEMANTICS_NOTE: &str =
            "Output semantics: 外部観測者による出力信号パターンへの意味付けを記述するカラム。";
        const MECHANISM_NOTE: &str =
            "Mechanism: Subnodes の相互作用により Capability を実現する仕組みを自然言語で説明するカラム。";
        const CAPABILITY_NOTE: &str =
            "Capability: 入力信号を出力信号へ外形的に変換する能力を記述するカラム。";
        const IMPLEMENTATION_NOTE: &str =
            "Implementation: 疑似コードなどで具体的な信号処理手順を列挙するカラム。";
        const UNIFORM_CIRCUIT_NOTE: &str =
            "Output semantics (Uniform Circuit): Uniform Circuit 単位での出力信号の意味を記述し、階層間で一貫性を確保するカラム。";

        let entries = vec![
            ErrorDefinition {
                code: ErrorCode::E1001,
                target_fields: vec![RequirementsRealization],
                description: "先行する実現事例や理論が示されていない".to_string(),
                examples: vec![
                    "「前時刻の位置情報と嗅覚情報を入力とする回路は、これらの入力から次時刻の位置情報を計算し出力できることは過去の文献でも指摘されており、実現可能である。」※文献情報がない。".to_string(),
                    "Mechanism カラムでの裏付け説明（計算手順など）が未記載、または『未記入』のまま。".to_string(),
                ],
                field_notes: vec![(
                    RequirementsRealization,
                    "Interface カラム経由で Requirement をどのように満たすかを記述するカラム。".to_string(),
                )],
            },
            ErrorDefinition {
                code: ErrorCode::E1101,
                target_fields: vec![Requirements, Interface],
                description: "Interface に記載された入力 Circuit が Requirements に記載された入力 Uniform Circuit と一致していない".to_string(),
                examples: vec![
                    "Requirements:『前時刻の位置情報と嗅覚情報を入力…』、Interface:『U.YYY(XXX1, XXX2, XXX3)』で Circuit 名不一致。".to_string(),
                ],
                field_notes: vec![
                    (Requirements, REQUIREMENTS_NOTE.to_string()),
                    (Interface, INTERFACE_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E1102,
                target_fields: vec![Requirements, Interface],
                description: "Requirements に記載された出力 Uniform Circuit が Interface の出力 Uniform Circuit に含まれていない".to_string(),
                examples: vec![
                    "Requirements には出力 C があるのに Interface の出力リストに C が存在しない。".to_string(),
                ],
                field_notes: vec![
                    (Requirements, REQUIREMENTS_NOTE.to_string()),
                    (Interface, INTERFACE_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E1103,
                target_fields: vec![RequirementsRealization, OutputSemantics],
                description: "Requirements realization by interface に記述した入出力の Output semantics が当該 Uniform Circuit の説明と一致しない".to_string(),
                examples: vec![
                    "出力 Y の意味を『速度』と記載しているが、Uniform Circuit 側では『角速度』として定義されている。".to_string(),
                ],
                field_notes: vec![
                    (RequirementsRealization, REALIZATION_NOTE.to_string()),
                    (OutputSemantics, OUTPUT_SEMANTICS_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E1104,
                target_fields: vec![RequirementsRealization, Requirements],
                description: "Requirements realization by interface に記載された入出力が Requirements の記述と一致しない".to_string(),
                examples: vec![
                    "Requirements に無い追加入力が Requirements realization by interface にだけ登場している。".to_string(),
                ],
                field_notes: vec![
                    (RequirementsRealization, REALIZATION_NOTE.to_string()),
                    (Requirements, REQUIREMENTS_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E2001,
                target_fields: vec![Mechanism],
                description: "Input の Uniform Circuit が示されていない".to_string(),
                examples: vec![
                    "Mechanism カラムに『入力: (InputCircuit)』等の記載がなく、どの回路を入力にするか不明。".to_string(),
                ],
                field_notes: vec![(Mechanism, MECHANISM_NOTE.to_string())],
            },
            ErrorDefinition {
                code: ErrorCode::E2002,
                target_fields: vec![Mechanism],
                description: "Output の Uniform Circuit が示されていない".to_string(),
                examples: vec![
                    "Mechanism カラムに『出力: (OutputCircuit)』等の記載がなく、どの回路が出力か不明。".to_string(),
                ],
                field_notes: vec![(Mechanism, MECHANISM_NOTE.to_string())],
            },
            ErrorDefinition {
                code: ErrorCode::E2101,
                target_fields: vec![Mechanism, Capability],
                description: "Mechanism の説明が Capability を実現していない".to_string(),
                examples: vec![
                    "Capability で『学習率の自動調整が可能』と宣言しているが、Mechanism で学習率更新の手順が説明されていない。".to_string(),
                ],
                field_notes: vec![
                    (Mechanism, "Mechanism: Subnodes の相互作用により Capability を実現する仕組みを説明するカラム。".to_string()),
                    (Capability, CAPABILITY_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E2102,
                target_fields: vec![Mechanism, Implementation],
                description: "Mechanism の説明が Implementation に含まれる内容を網羅していない".to_string(),
                examples: vec![
                    "Implementation に具体的な前処理ステップがあるのに Mechanism でその記載が抜けている。".to_string(),
                ],
                field_notes: vec![
                    (Mechanism, "Mechanism: Subnodes の相互作用により Capability を実現する仕組みを説明するカラム。".to_string()),
                    (Implementation, IMPLEMENTATION_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E2103,
                target_fields: vec![Mechanism, Implementation],
                description: "Mechanism が Implementation の処理順序（計算的フロー）を含んでいない".to_string(),
                examples: vec![
                    "Implementation には『Step1 -> Step2 -> Step3』とあるが Mechanism に順序の言及がない。".to_string(),
                ],
                field_notes: vec![
                    (Mechanism, "Mechanism: Subnodes の相互作用により Capability を実現する仕組みを説明するカラム。".to_string()),
                    (Implementation, IMPLEMENTATION_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E2104,
                target_fields: vec![Mechanism, OutputSemantics],
                description: "Output semantics の内容が Mechanism に書かれている".to_string(),
                examples: vec![
                    "Mechanism に『この出力は角速度を表す』とあり、本来 Output semantics に記載すべき説明が混在している。".to_string(),
                ],
                field_notes: vec![
                    (Mechanism, "Mechanism: Subnodes の相互作用により Capability を実現する仕組みを説明するカラム。".to_string()),
                    (OutputSemantics, OUTPUT_SEMANTICS_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E2201,
                target_fields: vec![Capability, OutputSemantics],
                description: "Output semantics の内容が Capability に書かれている".to_string(),
                examples: vec![
                    "Capability に『出力 V は…』と出力の意味を詳述しており、Output semantics カラムが空欄。".to_string(),
                ],
                field_notes: vec![
                    (Capability, CAPABILITY_NOTE.to_string()),
                    (OutputSemantics, OUTPUT_SEMANTICS_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E2202,
                target_fields: vec![Requirements, OutputSemantics],
                description: "Requirements に Output semantics が書かれていない".to_string(),
                examples: vec![
                    "Requirements で各出力を定義しているが、その意味や単位が Output semantics にも Requirements にも未記載。".to_string(),
                ],
                field_notes: vec![
                    (Requirements, REQUIREMENTS_NOTE.to_string()),
                    (OutputSemantics, OUTPUT_SEMANTICS_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E2203,
                target_fields: vec![OutputSemantics, OutputSemanticsUniformCircuit],
                description: "Output semantics と Output semantics (Uniform Circuit) の記述が整合していない".to_string(),
                examples: vec![
                    "Output semantics に『速度』、Uniform Circuit では『角速度』と定義されている。".to_string(),
                ],
                field_notes: vec![
                    (OutputSemantics, OUTPUT_SEMANTICS_NOTE.to_string()),
                    (OutputSemanticsUniformCircuit, UNIFORM_CIRCUIT_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E2204,
                target_fields: vec![Requirements, Capability, OutputSemantics],
                description: "Capability に Output semantics を入れても Requirements を満たす説明になっていない".to_string(),
                examples: vec![
                    "Capability に詳細な出力意味を記載しているが、Requirements の機能要求と直接対応付ける記述が無い。".to_string(),
                ],
                field_notes: vec![
                    (Requirements, REQUIREMENTS_NOTE.to_string()),
                    (Capability, CAPABILITY_NOTE.to_string()),
                    (OutputSemantics, OUTPUT_SEMANTICS_NOTE.to_string()),
                ],
            },
            ErrorDefinition {
                code: ErrorCode::E2205,
                target_fields: vec![Mechanism],
                description: "Mechanism カラム内で他行と重複・矛盾する説明が含まれている".to_string(),
                examples: vec![
                    "同一カラム内で『積分器』と『微分器』の両方を同時に実装すると記述しているが、前後の説明が整合していない。".to_string(),
                ],
                field_notes: vec![(Mechanism, MECHANISM_NOTE.to_string())],
            },
            ErrorDefinition {
                code: ErrorCode::E2206,
                target_fields: vec![Requirements, Capability],
                description: "Capability と Requirements が整合していない".to_string(),
                examples: vec![
                    "Requirements で処理速度 1 ms 未満と規定されているのに、Capability では 10 ms と記載している。".to_string(),
                ],
                field_notes: vec![
                    (Requirements, REQUIREMENTS_NOTE.to_string()),
                    (Capability, CAPABILITY_NOTE.to_string()),
                ],
            },
        ];

        let definitions = entries
            .into_iter()
            .map(|definition| (definition.code, definition))
            .collect();

        Self { definitions }
    }
}

impl Default for ErrorCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_codes_all_resolve() {
        let catalog = ErrorCatalog::standard();
        for code in ErrorCode::CHECKED {
            let definition = catalog.lookup(code).unwrap();
            assert_eq!(definition.code, code);
            assert!(!definition.target_fields.is_empty());
            assert!(!definition.description.is_empty());
        }
    }

    #[test]
    fn test_catalog_covers_all_codes() {
        let catalog = ErrorCatalog::standard();
        assert_eq!(catalog.len(), ErrorCode::ALL.len());
    }

    #[test]
    fn test_code_round_trip() {
        for code in ErrorCode::ALL {
            assert_eq!(code.as_str().parse::<ErrorCode>().unwrap(), code);
        }
        assert!("9999".parse::<ErrorCode>().is_err());
    }

    #[test]
    fn test_checked_list_omits_dormant_codes() {
        assert!(!ErrorCode::CHECKED.contains(&ErrorCode::E2203));
        assert!(!ErrorCode::CHECKED.contains(&ErrorCode::E2205));
        assert_eq!(ErrorCode::CHECKED.len(), 15);
    }

    #[test]
    fn test_field_notes_cover_target_fields() {
        let catalog = ErrorCatalog::standard();
        for code in ErrorCode::ALL {
            let definition = catalog.lookup(code).unwrap();
            for field in &definition.target_fields {
                assert!(
                    definition.field_notes.iter().any(|(noted, _)| noted == field),
                    "code {} is missing a note for field '{}'",
                    code,
                    field
                );
            }
        }
    }
}
