use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::Sender;
use tokio::time::sleep;

use crate::aggregator::{DisplayMode, RowResults};
use crate::catalog::{ErrorCatalog, ErrorCode};
use crate::columns::ColumnLayout;
use crate::error::{FrgCheckError, Result};
use crate::llm::client::Evaluator;
use crate::llm::prompts::{build_input_block, build_user_prompt, SYSTEM_PROMPT_CONTEXT};
use crate::sheet::Worksheet;
use crate::verdict::{parse_verdict, Verdict};

/// Marker painted on a row while its checks are running.
pub const IN_PROGRESS_MARKER: &str = "#ff0000";

/// Progress notifications, sent best-effort while a row is processed.
#[derive(Debug, Clone)]
pub enum CheckEvent {
    RowStarted {
        row: u32,
    },
    CodeStarted {
        row: u32,
        code: ErrorCode,
        index: usize,
        total: usize,
    },
    CodeFinished {
        row: u32,
        code: ErrorCode,
        error_found: bool,
    },
    RowFlushed {
        row: u32,
        columns: Vec<u32>,
    },
    RowFailed {
        row: u32,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub display_mode: DisplayMode,
    /// Minimum interval inserted after every evaluator call, success or not.
    /// Zero disables pacing (tests).
    pub pacing: Duration,
    pub progress: Option<Sender<CheckEvent>>,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::ErrorsOnly,
            pacing: Duration::from_millis(1500),
            progress: None,
        }
    }
}

/// Drives the fixed error list over worksheet rows: builds prompts, calls the
/// evaluator, aggregates verdicts, and bulk-writes the rendered review cells.
pub struct RowChecker<E: Evaluator> {
    catalog: ErrorCatalog,
    layout: ColumnLayout,
    evaluator: E,
    options: CheckOptions,
}

impl<E: Evaluator> RowChecker<E> {
    pub fn new(catalog: ErrorCatalog, layout: ColumnLayout, evaluator: E) -> Self {
        Self {
            catalog,
            layout,
            evaluator,
            options: CheckOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CheckOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CheckOptions {
        &self.options
    }

    /// Startup self-check of the catalog/layout wiring.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate(&self.catalog)
    }

    /// Checks one row against the full fixed error list and overwrites its
    /// review columns.
    ///
    /// The row's marker is set to [`IN_PROGRESS_MARKER`] for the duration and
    /// restored afterwards, whether the run succeeded or not. Output columns
    /// are written only after every code has been processed, so a failure
    /// mid-row leaves the previous cell contents untouched.
    pub async fn check_row<W: Worksheet>(&self, sheet: &mut W, row: u32) -> Result<()> {
        let saved_marker = sheet.marker(row)?;
        sheet.set_marker(row, IN_PROGRESS_MARKER)?;

        let outcome = self.run_row(sheet, row).await;

        if let Err(e) = sheet.set_marker(row, &saved_marker) {
            warn!("row {}: failed to restore marker: {}", row, e);
        }

        if let Err(e) = &outcome {
            error!("row {}: check failed: {}", row, e);
            self.send_event(CheckEvent::RowFailed {
                row,
                message: e.to_string(),
            })
            .await;
        }

        outcome
    }

    /// Batch mode: checks rows 2 through `last_row` inclusive (row 1 is the
    /// header), strictly sequentially; each row is fully flushed before the
    /// next starts.
    pub async fn check_rows_through<W: Worksheet>(
        &self,
        sheet: &mut W,
        last_row: u32,
    ) -> Result<()> {
        if last_row < 1 {
            return Err(FrgCheckError::InvalidReviewBound(last_row));
        }
        for row in 2..=last_row {
            self.check_row(sheet, row).await?;
        }
        Ok(())
    }

    async fn run_row<W: Worksheet>(&self, sheet: &mut W, row: u32) -> Result<()> {
        let total = ErrorCode::CHECKED.len();
        info!("Checking row {} against {} error codes", row, total);
        self.send_event(CheckEvent::RowStarted { row }).await;

        let mut results = RowResults::new();

        for (index, code) in ErrorCode::CHECKED.iter().copied().enumerate() {
            self.send_event(CheckEvent::CodeStarted {
                row,
                code,
                index,
                total,
            })
            .await;
            debug!("row {}: processing error code {} ({}/{})", row, code, index + 1, total);

            let verdict = self.evaluate_code(sheet, row, code).await?;
            let error_found = verdict.is_error_found;

            match self.layout.output_column(code) {
                Some(column) => results.add(column, verdict),
                // Unreachable with a validated layout; mirrors the
                // degrade-and-continue contract for substitute layouts.
                None => warn!(
                    "row {}: no output column mapped for code {}; verdict dropped",
                    row, code
                ),
            }

            self.send_event(CheckEvent::CodeFinished {
                row,
                code,
                error_found,
            })
            .await;

            if !self.options.pacing.is_zero() {
                sleep(self.options.pacing).await;
            }
        }

        let columns: Vec<u32> = results.columns().collect();
        for column in &columns {
            let rendered = results.render(*column, self.options.display_mode)?;
            sheet.set_value(row, *column, &rendered)?;
        }
        info!("row {}: flushed {} review columns", row, columns.len());
        self.send_event(CheckEvent::RowFlushed { row, columns }).await;

        Ok(())
    }

    /// Runs one error code for one row. Every per-code failure degrades to an
    /// error-positive verdict so the remaining codes still run; only cell
    /// reads propagate, since a sheet that cannot be read at all is not a
    /// per-code condition.
    async fn evaluate_code<W: Worksheet>(
        &self,
        sheet: &W,
        row: u32,
        code: ErrorCode,
    ) -> Result<Verdict> {
        let definition = match self.catalog.lookup(code) {
            Some(definition) => definition,
            None => {
                warn!("row {}: no catalog definition for error code {}", row, code);
                return Ok(Verdict::failure(
                    code,
                    format!("設定エラー: エラーID '{}' の定義が見つかりません。", code),
                    "エラーカタログの定義を確認してください。",
                ));
            }
        };

        if definition.target_fields.is_empty() {
            warn!("row {}: error code {} declares no target fields", row, code);
            return Ok(Verdict::failure(
                code,
                format!(
                    "設定エラー: エラーID '{}' に対象カラムが定義されていません。",
                    code
                ),
                "エラーカタログとカラムレイアウトを確認してください。",
            ));
        }

        let mut values = Vec::with_capacity(definition.target_fields.len());
        for field in &definition.target_fields {
            let column = match self.layout.input_column(*field) {
                Some(column) => column,
                None => {
                    warn!(
                        "row {}: no input column mapped for field '{}' (code {})",
                        row, field, code
                    );
                    return Ok(Verdict::failure(
                        code,
                        format!(
                            "設定エラー: 入力カラム '{}' のマッピングが見つかりません。",
                            field
                        ),
                        "入力カラムのレイアウトを確認してください。",
                    ));
                }
            };
            let value = sheet.value(row, column)?;
            values.push((*field, value));
        }

        let input_block = build_input_block(&values);
        let user_prompt = build_user_prompt(definition, &input_block);

        let reply = match self
            .evaluator
            .evaluate(SYSTEM_PROMPT_CONTEXT, &user_prompt)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!("row {}: evaluation failed for code {}: {}", row, code, e);
                return Ok(Verdict::failure(
                    code,
                    format!("API呼び出しエラー: {}", e),
                    "APIキー、エンドポイント、ネットワーク接続を確認してください。",
                ));
            }
        };

        match parse_verdict(&reply, code) {
            Ok(verdict) => Ok(verdict),
            Err(FrgCheckError::EmptyReply) => {
                warn!("row {}: empty reply for code {}", row, code);
                Ok(Verdict::failure(
                    code,
                    "APIから空の応答がありました。",
                    "APIの状態やプロンプトを確認してください。",
                ))
            }
            Err(e) => {
                warn!("row {}: unparseable reply for code {}: {}", row, code, e);
                Ok(Verdict::failure_with_raw(
                    code,
                    format!("API応答のJSONパースエラー: {}", e),
                    "APIの応答形式を確認してください。",
                    reply,
                ))
            }
        }
    }

    async fn send_event(&self, event: CheckEvent) {
        if let Some(progress) = &self.options.progress {
            let _ = progress.send(event).await;
        }
    }
}
