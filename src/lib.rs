//! # FRG Checker
//!
//! A library for auditing rows of a BRA (Brain Reference Architecture)
//! Function Realization Graph worksheet against a fixed catalog of
//! documentation-quality error patterns, using Gemini as the evaluator.
//!
//! ## Core Concepts
//!
//! - **Row**: one functional-decomposition node under review; its named
//!   fields (Mechanism, Capability, Output semantics, ...) live in fixed
//!   columns.
//! - **Error code**: one hand-authored check (e.g. 2201, "Output semantics
//!   content written into Capability"); the checked list is fixed and ordered.
//! - **Verdict**: the per-(row, code) judgment: error-found flag, reason,
//!   suggestion. Pipeline failures become error-positive verdicts so nothing
//!   is silently dropped.
//! - **Review columns**: several codes aggregate into one output column; each
//!   cell is overwritten with an OK/NG status line plus the verdict JSON.
//!
//! ## Example
//!
//! ```rust,ignore
//! use frg_checker::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let credentials = Credentials::from_env()?;
//!     let checker = RowChecker::new(
//!         ErrorCatalog::standard(),
//!         ColumnLayout::standard(),
//!         GeminiClient::new(credentials),
//!     );
//!     checker.validate()?;
//!
//!     let mut sheet = GridSheet::from_csv_path("frg.csv")?;
//!     checker.check_row(&mut sheet, 2).await?;
//!     sheet.to_csv_path("frg.csv")?;
//!     Ok(())
//! }
//! ```

pub mod aggregator;
pub mod catalog;
pub mod checker;
pub mod columns;
pub mod error;
pub mod llm;
pub mod sheet;
pub mod verdict;

pub use aggregator::{DisplayMode, RowResults};
pub use catalog::{ErrorCatalog, ErrorCode, ErrorDefinition};
pub use checker::{CheckEvent, CheckOptions, RowChecker, IN_PROGRESS_MARKER};
pub use columns::{ColumnLayout, FieldKind};
pub use error::{FrgCheckError, Result};
pub use llm::client::{Credentials, Evaluator, GeminiClient, DEFAULT_MODEL};
pub use llm::prompts::SYSTEM_PROMPT_CONTEXT;
pub use sheet::{GridSheet, Worksheet, DEFAULT_MARKER};
pub use verdict::{parse_verdict, Verdict};
