// Prompt assembly for the per-(row, error code) check requests.

use crate::catalog::ErrorDefinition;
use crate::columns::FieldKind;

/// Fixed system context shared by every check: BRA domain vocabulary plus the
/// JSON-only output contract.
pub const SYSTEM_PROMPT_CONTEXT: &str = r##"
# あなたのタスク
あなたは、提供された「入力データ」を、指定された「評価対象エラー」に基づいて評価するAIアシスタントです。
評価結果を、必ず指定されたJSON形式で出力してください。

# 評価に必要な背景情報

## 1. 前提概念
現在の神経科学では、脳の様々な領域の解剖学的構造の理解が進んでいます。脳と似た認知行動を再現する神経回路モデルは、その計算機能が解剖学的構造と整合することで妥当性が高まります。
脳参照アーキテクチャ(BRA)駆動開発では、BRAという標準形式で計算モデルを記述し、脳型ソフトウェア開発を進めます。

## 2. BRAデータ
- **BRAデータ**: 標準化された脳型ソフトウェア記述形式。脳情報フロー（BIF）と仮説的コンポーネント図（HCD）から構成。
- **BIF (Brain Information Flow)**: 脳内の解剖学的構造を「Circuit」（ノード）と「connection」（リンク）で表現した有向グラフ。
- **HCD (Hypothetical Component Diagram)**: BIFの構造に整合するように機能を分解した仮説的コンポーネント図。
- **FRG (Function Realization Graph)**: 機能分解を行うための機能階層図。

## 3. 機能に関連する概念
- **Requirement**:
    - 定義: 機能ノードに対する要求機能。
    - 性質: 入出力信号の変換能力(Capability)と信号の意味付け(Output semantics)で規定。
    - 分解: 「役割分解」（特化したOutput semantics付与）と「体系的分解」（Capability分割）。
    - 記述例: 「[入力信号の意味]から[出力信号の意味]への変換を[Capability]により実現する」。例: 「生物刺激から恐怖応答への変換を条件付け学習により実現する」。
    - 記法: R.(Requirement名)
- **Capability**:
    - 定義: 機能ノード内部の信号変換能力。
    - 性質: 入力信号から出力信号への外形的な変換処理を定義。信号の意味付けとは無関係。
    - 記述例: 「[入力信号パターン]を[出力信号パターン]に変換する」。例: 「時系列信号を二値信号に変換する」。
    - 記法: C.(Capability名)
- **Output semantics**:
    - 定義: 外部観測者による信号パターンへの意味付け。
    - 性質: 出力信号に外部観測者から意味を付与。同一Uniform Circuitsの異なる階層間で意味づけの一貫性が必要。
    - 記述例: 「[信号パターン]は[意味]を表す」。例: 「高頻度発火は危険物の存在を表す」。
- **Mechanism**:
    - 定義: 機能ノード内のSubnodes処理の相互作用によるCapability実現の説明。
    - 性質: Subnodes処理の相互作用から得られる機能を自然言語で説明。個々のSubnode処理を超えた創発的機能を含む場合あり。Capabilityの実現を説明。階層の深掘りはしない。
    - 記述例: 「[Subnode1]と[Subnode2]の相互作用により[創発機能]が実現され、その結果[入力信号]が[出力信号]に変換される」。
- **Implementation**:
    - 定義: 機能ノード内における信号処理の形式的表現の列挙。
    - 性質: 疑似コードによる具体的な処理手順の列挙。内部の個別変換処理を形式的に記述。
    - 記法例: `[ STR ] = U.STR( dmPFC )`
- **Interface**:
    - 定義: 機能ノードの入力接続と出力信号の定義。
    - 性質: 接続される入力信号と出力信号を定義。HCD上の信号の流れを規定。
- **Uniform Circuits**:
    - 定義: BIF上で定義されたCircuitに基づく。一つの信号のOutput semanticsを対応付ける単位。
    - 記法: U.(Uniform-Circuit名)

## 4. 機能の評価に関連する概念
- **Requirement realization by interface**: 根拠に基づいた、Interfaceにおける入出力のOutput semanticsによるRequirementの実現可能性の説明。
- **Mechanism (記述要件として)**: Capabilityを実現するための、Implementationとその計算順序を含めた説明。

# あなたへの指示

以下の「入力データ」と「評価対象エラー」の内容をよく読み、評価を行ってください。
評価結果は、必ず下記のJSON形式で、そのJSON文字列のみを出力してください。

## 出力JSON形式
```json
{
  "error_id": "評価したエラーコードのID (例: 1001)",
  "is_error_found": true,
  "reason": "エラーであると判断した場合、その具体的な理由。エラーでない場合は '問題なし' と記述。",
  "suggestion": "エラーであると判断した場合の改善案。エラーでない場合はnullまたは空文字列。"
}
```
is_error_found は、エラーが実際に存在する場合に true、存在しない場合に false としてください。
reason と suggestion は、具体的かつ簡潔に記述してください。
重要事項
出力は、上記で指定されたJSON形式の文字列のみとしてください。
JSONの前後に説明文、コメント、マークダウンの json タグなど、他のテキストは一切含めないでください。
"##;

/// Concatenates the labeled field blocks embedded in the user prompt, in
/// catalog-declared order. Blank cells stay as empty strings.
pub fn build_input_block(values: &[(FieldKind, String)]) -> String {
    let mut block = String::from("#入力\n");
    for (field, value) in values {
        block.push_str(&format!("種類: {}\n内容: {}\n\n", field.label(), value));
    }
    block
}

/// Renders the per-error user prompt around a prepared input block.
pub fn build_user_prompt(definition: &ErrorDefinition, input_block: &str) -> String {
    let field_kinds = definition
        .target_fields
        .iter()
        .map(|field| field.label())
        .collect::<Vec<_>>()
        .join(", ");

    let examples = if definition.examples.is_empty() {
        "N/A".to_string()
    } else {
        definition.examples.join("\n")
    };

    let error_details = format!(
        "\nエラーID: {code}\n説明: {description}\n評価対象カラムの種類: {field_kinds}\n具体例: {examples}\n\nあなたのタスクは、上記の「入力データ」が、「評価対象エラー」に該当するかどうかを判断し、システムプロンプトで指示されたJSON形式で結果を返すことです。\n",
        code = definition.code,
        description = definition.description,
    );

    format!(
        "\n# タスク概要\n- あなたのタスクは、以下の「入力データ」を、システムプロンプトで提供された「エラーコードリスト」に基づいて網羅的にチェックすることです。 (このプロンプトでは単一のエラーコードを扱います)\n- 指示された手順に従い、「最終的な出力形式 (JSON)」に従ってJSONデータのみを出力してください。\n- 論理的かつ体系的に評価を進めてください。\n\n# 入力データ\n{input_block}\n# 調査対象error\n{error_details}\n"
    )
}
