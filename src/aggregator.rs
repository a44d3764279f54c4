use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::verdict::Verdict;

/// Global policy for what the aggregated review cells show.
///
/// The mode changes both the visible subset and the OK/NG derivation, so it
/// is a single switch rather than two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Show only error-positive verdicts; OK when none remain after filtering.
    ErrorsOnly,
    /// Show every verdict; OK only when all of them are negative.
    All,
}

impl Default for DisplayMode {
    fn default() -> Self {
        DisplayMode::ErrorsOnly
    }
}

/// Per-row accumulator of verdicts, keyed by output column.
///
/// Verdicts land in the order the checked list was processed; several error
/// codes can contribute to the same column. One instance lives for one row's
/// run and is discarded after the bulk write.
#[derive(Debug, Default)]
pub struct RowResults {
    by_column: BTreeMap<u32, Vec<Verdict>>,
}

impl RowResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, column: u32, verdict: Verdict) {
        self.by_column.entry(column).or_default().push(verdict);
    }

    /// Output columns touched so far, ascending.
    pub fn columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.by_column.keys().copied()
    }

    pub fn verdicts(&self, column: u32) -> &[Verdict] {
        self.by_column
            .get(&column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_column.is_empty()
    }

    /// Renders one column's final cell text: an OK/NG status line followed by
    /// the pretty-printed JSON array of the visible verdicts.
    pub fn render(&self, column: u32, mode: DisplayMode) -> Result<String> {
        let verdicts = self.verdicts(column);

        let (status, visible): (&str, Vec<&Verdict>) = match mode {
            DisplayMode::ErrorsOnly => {
                let visible: Vec<&Verdict> =
                    verdicts.iter().filter(|v| v.is_error_found).collect();
                let status = if visible.is_empty() { "OK" } else { "NG" };
                (status, visible)
            }
            DisplayMode::All => {
                let all_clear = verdicts.iter().all(|v| !v.is_error_found);
                let status = if all_clear { "OK" } else { "NG" };
                (status, verdicts.iter().collect())
            }
        };

        let body = serde_json::to_string_pretty(&visible)?;
        Ok(format!("{}:\n{}", status, body))
    }

    /// Renders every touched column.
    pub fn render_all(&self, mode: DisplayMode) -> Result<BTreeMap<u32, String>> {
        let mut rendered = BTreeMap::new();
        for column in self.columns() {
            rendered.insert(column, self.render(column, mode)?);
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ErrorCode;

    fn clean(code: ErrorCode) -> Verdict {
        Verdict {
            error_id: code.as_str().to_string(),
            is_error_found: false,
            reason: "問題なし".to_string(),
            suggestion: String::new(),
            raw_output: None,
        }
    }

    fn flagged(code: ErrorCode, reason: &str) -> Verdict {
        Verdict {
            error_id: code.as_str().to_string(),
            is_error_found: true,
            reason: reason.to_string(),
            suggestion: "修正してください".to_string(),
            raw_output: None,
        }
    }

    #[test]
    fn test_errors_only_all_clean_is_ok_with_empty_array() {
        let mut results = RowResults::new();
        results.add(54, clean(ErrorCode::E2001));
        results.add(54, clean(ErrorCode::E2002));
        results.add(54, clean(ErrorCode::E2101));

        let text = results.render(54, DisplayMode::ErrorsOnly).unwrap();
        assert!(text.starts_with("OK:\n"));
        let body: Vec<Verdict> = serde_json::from_str(&text["OK:\n".len()..]).unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn test_errors_only_keeps_only_positive_verdicts() {
        let mut results = RowResults::new();
        results.add(54, clean(ErrorCode::E2001));
        results.add(54, flagged(ErrorCode::E2002, "出力回路が不明"));
        results.add(54, clean(ErrorCode::E2101));
        results.add(54, flagged(ErrorCode::E2104, "意味付けが混在"));

        let text = results.render(54, DisplayMode::ErrorsOnly).unwrap();
        assert!(text.starts_with("NG:\n"));
        let body: Vec<Verdict> = serde_json::from_str(&text["NG:\n".len()..]).unwrap();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].error_id, "2002");
        assert_eq!(body[1].error_id, "2104");
        assert!(body.iter().all(|v| v.is_error_found));
    }

    #[test]
    fn test_all_mode_keeps_everything_in_processing_order() {
        let mut results = RowResults::new();
        results.add(54, clean(ErrorCode::E2001));
        results.add(54, flagged(ErrorCode::E2002, "出力回路が不明"));
        results.add(54, clean(ErrorCode::E2101));

        let text = results.render(54, DisplayMode::All).unwrap();
        assert!(text.starts_with("NG:\n"));
        let body: Vec<Verdict> = serde_json::from_str(&text["NG:\n".len()..]).unwrap();
        let ids: Vec<&str> = body.iter().map(|v| v.error_id.as_str()).collect();
        assert_eq!(ids, ["2001", "2002", "2101"]);
    }

    #[test]
    fn test_all_mode_clean_row_is_ok() {
        let mut results = RowResults::new();
        results.add(62, clean(ErrorCode::E2202));
        results.add(62, clean(ErrorCode::E2206));

        let text = results.render(62, DisplayMode::All).unwrap();
        assert!(text.starts_with("OK:\n"));
        let body: Vec<Verdict> = serde_json::from_str(&text["OK:\n".len()..]).unwrap();
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut results = RowResults::new();
        results.add(58, flagged(ErrorCode::E1101, "Circuit 名不一致"));
        results.add(58, clean(ErrorCode::E1102));

        let first = results.render(58, DisplayMode::All).unwrap();
        let second = results.render(58, DisplayMode::All).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rendered_verdicts_round_trip() {
        let mut results = RowResults::new();
        let original = flagged(ErrorCode::E2206, "処理速度の規定が矛盾");
        results.add(62, original.clone());

        let text = results.render(62, DisplayMode::All).unwrap();
        let body: Vec<Verdict> = serde_json::from_str(&text["NG:\n".len()..]).unwrap();
        assert_eq!(body[0].error_id, original.error_id);
        assert_eq!(body[0].is_error_found, original.is_error_found);
        assert_eq!(body[0].reason, original.reason);
        assert_eq!(body[0].suggestion, original.suggestion);
    }

    #[test]
    fn test_single_negative_verdict_scenario() {
        // Capability = "時系列信号を二値信号に変換する", code 2201 judged clean.
        let raw = r#"{"error_id":"2201","is_error_found":false,"reason":"問題なし","suggestion":""}"#;
        let verdict = crate::verdict::parse_verdict(raw, ErrorCode::E2201).unwrap();

        let mut results = RowResults::new();
        results.add(54, verdict);

        let text = results.render(54, DisplayMode::All).unwrap();
        assert!(text.starts_with("OK:\n"));
        let body: Vec<Verdict> = serde_json::from_str(&text["OK:\n".len()..]).unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].error_id, "2201");
        assert_eq!(body[0].reason, "問題なし");
    }

    #[test]
    fn test_untouched_column_renders_ok_empty() {
        let results = RowResults::new();
        let text = results.render(60, DisplayMode::ErrorsOnly).unwrap();
        assert_eq!(text, "OK:\n[]");
    }
}
