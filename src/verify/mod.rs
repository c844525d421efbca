//! Consistency checks for generated seed documents.
//!
//! Re-reads a seed file and confirms the properties generation is supposed to
//! guarantee: every foreign key points at an inserted parent row, every parent
//! has exactly one summary row, summary totals equal the sums over the detail
//! rows, and detail INSERTs respect the batch size.

pub mod insert;

use anyhow::Context;
use insert::{InsertStatement, Literal, Statement};
use seed_data_gen::{PipelineKind, Schema, SummaryLink, Table, TableRole};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::PathBuf;

/// Maximum number of issues to collect before stopping
const MAX_ISSUES: usize = 1000;

/// Issue severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
        }
    }
}

/// A problem found in a seed document
#[derive(Debug, Clone, Serialize)]
pub struct VerifyIssue {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_index: Option<usize>,
}

impl VerifyIssue {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            table: None,
            statement_index: None,
        }
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_statement(mut self, index: usize) -> Self {
        self.statement_index = Some(index);
        self
    }
}

impl fmt::Display for VerifyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.severity, self.code)?;
        if let Some(ref table) = self.table {
            write!(f, " table={}", table)?;
        }
        if let Some(stmt) = self.statement_index {
            write!(f, " stmt={}", stmt)?;
        }
        write!(f, ": {}", self.message)
    }
}

#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub path: PathBuf,
    /// Schema to check against; detected from table names when absent
    pub pipeline: Option<PipelineKind>,
    /// Largest row count allowed in one detail-table INSERT
    pub batch_size: usize,
}

#[derive(Debug, Serialize)]
pub struct VerifySummary {
    pub pipeline: String,
    pub issues: Vec<VerifyIssue>,
    pub summary: SummaryStats,
    pub tables: Vec<TableCount>,
    pub checks: CheckResults,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub errors: usize,
    pub warnings: usize,
    pub statements_scanned: usize,
    pub rows_scanned: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub name: String,
    pub rows: usize,
}

#[derive(Debug, Serialize)]
pub struct CheckResults {
    pub syntax: CheckStatus,
    pub tables: CheckStatus,
    pub fk_integrity: CheckStatus,
    pub batch_size: CheckStatus,
    pub aggregates: CheckStatus,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Failed(usize),
    Skipped(String),
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "OK"),
            CheckStatus::Failed(n) => write!(f, "{} issues", n),
            CheckStatus::Skipped(reason) => write!(f, "Skipped ({})", reason),
        }
    }
}

impl CheckStatus {
    fn from_count(count: usize) -> Self {
        if count > 0 {
            CheckStatus::Failed(count)
        } else {
            CheckStatus::Ok
        }
    }
}

impl VerifySummary {
    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }
}

/// Rows and statements seen for one table
#[derive(Default)]
struct TableState {
    truncated: bool,
    inserts: Vec<(usize, InsertStatement)>,
}

impl TableState {
    fn row_count(&self) -> usize {
        self.inserts.iter().map(|(_, i)| i.rows.len()).sum()
    }

    /// Values of `column` across every INSERT, with their statement index
    fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = (usize, &'a Literal)> {
        self.inserts.iter().flat_map(move |(idx, insert)| {
            let col = insert.column_index(column);
            insert
                .rows
                .iter()
                .filter_map(move |row| col.and_then(|c| row.get(c)).map(|v| (*idx, v)))
        })
    }
}

pub struct Verifier {
    options: VerifyOptions,
    issues: Vec<VerifyIssue>,
    tables: HashMap<String, TableState>,
    table_order: Vec<String>,
    statement_count: usize,
    syntax_errors: usize,
    table_errors: usize,
    fk_errors: usize,
    batch_errors: usize,
    aggregate_errors: usize,
}

impl Verifier {
    pub fn new(options: VerifyOptions) -> Self {
        Self {
            options,
            issues: Vec::new(),
            tables: HashMap::new(),
            table_order: Vec::new(),
            statement_count: 0,
            syntax_errors: 0,
            table_errors: 0,
            fk_errors: 0,
            batch_errors: 0,
            aggregate_errors: 0,
        }
    }

    fn add_issue(&mut self, issue: VerifyIssue) {
        if issue.severity == Severity::Error {
            match issue.code {
                "SYNTAX" => self.syntax_errors += 1,
                "MISSING_TABLE" | "COLUMN_MISMATCH" | "ROW_ARITY" => self.table_errors += 1,
                "FK_MISSING_PARENT" => self.fk_errors += 1,
                "BATCH_TOO_LARGE" => self.batch_errors += 1,
                "SUMMARY_DUPLICATE" | "SUMMARY_MISSING" | "TOTAL_MISMATCH" => {
                    self.aggregate_errors += 1
                }
                _ => {}
            }
        }

        if self.issues.len() < MAX_ISSUES {
            self.issues.push(issue);
        }
    }

    /// Read and verify the file named in the options
    pub fn verify(self) -> anyhow::Result<VerifySummary> {
        let path = self.options.path.clone();
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        self.verify_str(&text)
    }

    /// Verify an in-memory document
    pub fn verify_str(mut self, text: &str) -> anyhow::Result<VerifySummary> {
        for stmt in insert::split_statements(text) {
            let idx = self.statement_count;
            self.statement_count += 1;
            match insert::parse_statement(stmt) {
                Ok(Statement::Truncate(name)) => self.table_state(&name).truncated = true,
                Ok(Statement::Insert(insert)) => {
                    let name = insert.table.clone();
                    self.table_state(&name).inserts.push((idx, insert));
                }
                Ok(_) => {}
                Err(e) => self.add_issue(VerifyIssue::error("SYNTAX", e.to_string()).with_statement(idx)),
            }
        }

        let pipeline = match self.options.pipeline {
            Some(kind) => kind,
            None => PipelineKind::detect(self.table_order.iter().map(String::as_str))
                .ok_or_else(|| {
                    anyhow::anyhow!("Cannot detect the schema of this document; pass --pipeline")
                })?,
        };
        let schema = self.schema_for(pipeline);
        tracing::debug!(%pipeline, tables = self.table_order.len(), "verifying seed document");

        self.check_tables(&schema);
        self.check_foreign_keys(&schema);
        self.check_batches(&schema);
        let aggregates = match schema.summary_link() {
            Some(link) => {
                self.check_aggregates(&link);
                CheckStatus::from_count(self.aggregate_errors)
            }
            None => CheckStatus::Skipped("no summary table".to_string()),
        };

        Ok(self.build_summary(pipeline, aggregates))
    }

    fn table_state(&mut self, name: &str) -> &mut TableState {
        if !self.tables.contains_key(name) {
            self.table_order.push(name.to_string());
        }
        self.tables.entry(name.to_string()).or_default()
    }

    /// The ecommerce summary table is optional and user-named; treat any
    /// extra table in the document as that summary.
    fn schema_for(&self, pipeline: PipelineKind) -> Schema {
        if pipeline != PipelineKind::Ecommerce {
            return pipeline.schema(None);
        }
        let known = pipeline.schema(None);
        let summary = self
            .table_order
            .iter()
            .find(|name| known.get_table(name).is_none())
            .map(String::as_str);
        pipeline.schema(summary)
    }

    fn check_tables(&mut self, schema: &Schema) {
        let mut found = Vec::new();
        for table in &schema.tables {
            match self.tables.get(&table.name) {
                None => found.push(
                    VerifyIssue::error("MISSING_TABLE", format!("No statements for {}", table.name))
                        .with_table(&table.name),
                ),
                Some(state) => {
                    if !state.truncated {
                        found.push(
                            VerifyIssue::warning(
                                "NOT_TRUNCATED",
                                format!("{} is inserted without a preceding TRUNCATE", table.name),
                            )
                            .with_table(&table.name),
                        );
                    }
                    found.extend(column_issues(table, state));
                }
            }
        }

        for name in &self.table_order {
            if schema.get_table(name).is_none() {
                found.push(
                    VerifyIssue::warning("UNKNOWN_TABLE", format!("{} is not part of the schema", name))
                        .with_table(name),
                );
            }
        }

        for issue in found {
            self.add_issue(issue);
        }
    }

    fn check_foreign_keys(&mut self, schema: &Schema) {
        let mut found = Vec::new();
        for table in &schema.tables {
            let Some(state) = self.tables.get(&table.name) else {
                continue;
            };
            for (column, fk) in table.foreign_keys() {
                let parent_rows = self.parent_rows(&fk.to_table);
                for (idx, value) in state.column_values(column) {
                    let valid = value
                        .as_int()
                        .is_some_and(|id| id >= 1 && id as u64 <= parent_rows as u64);
                    if !valid {
                        found.push(
                            VerifyIssue::error(
                                "FK_MISSING_PARENT",
                                format!(
                                    "{}.{} = {:?} has no row in {} ({} rows)",
                                    table.name, column, value, fk.to_table, parent_rows
                                ),
                            )
                            .with_table(&table.name)
                            .with_statement(idx),
                        );
                    }
                }
            }
        }
        for issue in found {
            self.add_issue(issue);
        }
    }

    fn check_batches(&mut self, schema: &Schema) {
        let limit = self.options.batch_size;
        let mut found = Vec::new();
        for table in schema.tables.iter().filter(|t| t.role == TableRole::Detail) {
            let Some(state) = self.tables.get(&table.name) else {
                continue;
            };
            for (idx, insert) in &state.inserts {
                if insert.rows.len() > limit {
                    found.push(
                        VerifyIssue::error(
                            "BATCH_TOO_LARGE",
                            format!("INSERT carries {} rows (limit {})", insert.rows.len(), limit),
                        )
                        .with_table(&table.name)
                        .with_statement(*idx),
                    );
                }
            }
        }
        for issue in found {
            self.add_issue(issue);
        }
    }

    fn check_aggregates(&mut self, link: &SummaryLink) {
        let parent_rows = self.parent_rows(&link.parent_table) as i64;
        let mut expected: BTreeMap<i64, i64> = (1..=parent_rows).map(|id| (id, 0)).collect();

        if let Some(detail) = self.tables.get(&link.detail_table) {
            for (_, insert) in &detail.inserts {
                let (Some(fk), Some(measure)) = (
                    insert.column_index(&link.detail_fk_column),
                    insert.column_index(&link.measure_column),
                ) else {
                    continue;
                };
                for row in &insert.rows {
                    let id = row.get(fk).and_then(Literal::as_int);
                    let amount = row.get(measure).and_then(Literal::as_int);
                    if let (Some(id), Some(amount)) = (id, amount) {
                        if let Some(total) = expected.get_mut(&id) {
                            *total += amount;
                        }
                    }
                }
            }
        }

        let mut found = Vec::new();
        let mut seen: BTreeMap<i64, i64> = BTreeMap::new();
        if let Some(summary) = self.tables.get(&link.summary_table) {
            for (idx, insert) in &summary.inserts {
                let (Some(key), Some(total)) = (
                    insert.column_index(&link.key_column),
                    insert.column_index(&link.total_column),
                ) else {
                    continue;
                };
                for row in &insert.rows {
                    let (Some(id), Some(actual)) = (
                        row.get(key).and_then(Literal::as_int),
                        row.get(total).and_then(Literal::as_int),
                    ) else {
                        continue;
                    };
                    if seen.insert(id, actual).is_some() {
                        found.push(
                            VerifyIssue::error(
                                "SUMMARY_DUPLICATE",
                                format!("{} {} appears more than once", link.key_column, id),
                            )
                            .with_table(&link.summary_table)
                            .with_statement(*idx),
                        );
                        continue;
                    }
                    if let Some(&want) = expected.get(&id) {
                        if want != actual {
                            found.push(
                                VerifyIssue::error(
                                    "TOTAL_MISMATCH",
                                    format!(
                                        "{} {}: {} = {} but {} rows sum to {}",
                                        link.key_column,
                                        id,
                                        link.total_column,
                                        actual,
                                        link.detail_table,
                                        want
                                    ),
                                )
                                .with_table(&link.summary_table)
                                .with_statement(*idx),
                            );
                        }
                    }
                }
            }
        }

        for id in expected.keys().filter(|id| !seen.contains_key(id)) {
            found.push(
                VerifyIssue::error(
                    "SUMMARY_MISSING",
                    format!("No summary row for {} {}", link.key_column, id),
                )
                .with_table(&link.summary_table),
            );
        }

        for issue in found {
            self.add_issue(issue);
        }
    }

    /// Parent ids are the auto-increment values 1..=n of the inserted rows
    fn parent_rows(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, TableState::row_count)
    }

    fn build_summary(&self, pipeline: PipelineKind, aggregates: CheckStatus) -> VerifySummary {
        let errors = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        let warnings = self.issues.len() - errors;

        let tables: Vec<TableCount> = self
            .table_order
            .iter()
            .map(|name| TableCount {
                name: name.clone(),
                rows: self.parent_rows(name),
            })
            .collect();

        VerifySummary {
            pipeline: pipeline.to_string(),
            issues: self.issues.clone(),
            summary: SummaryStats {
                errors,
                warnings,
                statements_scanned: self.statement_count,
                rows_scanned: tables.iter().map(|t| t.rows).sum(),
            },
            tables,
            checks: CheckResults {
                syntax: CheckStatus::from_count(self.syntax_errors),
                tables: CheckStatus::from_count(self.table_errors),
                fk_integrity: CheckStatus::from_count(self.fk_errors),
                batch_size: CheckStatus::from_count(self.batch_errors),
                aggregates,
            },
        }
    }
}

fn column_issues(table: &Table, state: &TableState) -> Vec<VerifyIssue> {
    let expected = table.insert_columns();
    let mut issues = Vec::new();
    for (idx, insert) in &state.inserts {
        if insert.columns != expected {
            issues.push(
                VerifyIssue::error(
                    "COLUMN_MISMATCH",
                    format!(
                        "columns ({}) differ from ({})",
                        insert.columns.join(", "),
                        expected.join(", ")
                    ),
                )
                .with_table(&table.name)
                .with_statement(*idx),
            );
            continue;
        }
        if let Some(row) = insert.rows.iter().find(|r| r.len() != expected.len()) {
            issues.push(
                VerifyIssue::error(
                    "ROW_ARITY",
                    format!("row has {} values, expected {}", row.len(), expected.len()),
                )
                .with_table(&table.name)
                .with_statement(*idx),
            );
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> VerifyOptions {
        VerifyOptions {
            path: PathBuf::new(),
            pipeline: None,
            batch_size: 50,
        }
    }

    const CINEMA: &str = "USE pvrinox_db;
SET FOREIGN_KEY_CHECKS = 0;
-- PVRINOX Seed Data

-- Movies
TRUNCATE TABLE Movies;
INSERT INTO Movies (Name, Genre, Rating, Duration) VALUES ('A', 'Drama', 7.5, 120), ('B', 'Action', 8.0, 150);

-- Snacks
TRUNCATE TABLE Snacks;
INSERT INTO Snacks (Name, Price, StockQty) VALUES ('Popcorn', 250.00, 40);

-- Staff
TRUNCATE TABLE Staff;
INSERT INTO Staff (Name, Role) VALUES ('Asha', 'Usher');

-- Shows (3 records)
TRUNCATE TABLE Shows;
INSERT INTO Shows (MovieId, ShowTime, ScreenNo, TicketsSold) VALUES (1, '2024-05-20 18:00:00', 2, 40), (1, '2024-05-21 18:00:00', 3, 10), (2, '2024-05-22 18:00:00', 1, 7);

-- SalesSummary
TRUNCATE TABLE SalesSummary;
INSERT INTO SalesSummary (MovieId, TotalTicketsSold) VALUES (1, 50), (2, 7);
";

    #[test]
    fn test_consistent_document_passes() {
        let summary = Verifier::new(options()).verify_str(CINEMA).unwrap();
        assert_eq!(summary.pipeline, "cinema");
        assert!(!summary.has_errors(), "{:?}", summary.issues);
        assert_eq!(summary.checks.aggregates, CheckStatus::Ok);
        assert_eq!(
            summary.tables.iter().find(|t| t.name == "Shows").map(|t| t.rows),
            Some(3)
        );
    }

    #[test]
    fn test_total_mismatch_reported() {
        let doc = CINEMA.replace("(2, 7);", "(2, 8);");
        let summary = Verifier::new(options()).verify_str(&doc).unwrap();
        assert_eq!(summary.checks.aggregates, CheckStatus::Failed(1));
        assert_eq!(summary.issues[0].code, "TOTAL_MISMATCH");
    }

    #[test]
    fn test_dangling_reference_reported() {
        let doc = CINEMA.replace("(2, '2024-05-22", "(3, '2024-05-22");
        let summary = Verifier::new(options()).verify_str(&doc).unwrap();
        assert_eq!(summary.checks.fk_integrity, CheckStatus::Failed(1));
    }

    #[test]
    fn test_missing_summary_row_reported() {
        let doc = CINEMA.replace(", (2, 7);", ";");
        let summary = Verifier::new(options()).verify_str(&doc).unwrap();
        assert!(summary.issues.iter().any(|i| i.code == "SUMMARY_MISSING"));
    }

    #[test]
    fn test_batch_limit() {
        let opts = VerifyOptions {
            batch_size: 2,
            ..options()
        };
        let summary = Verifier::new(opts).verify_str(CINEMA).unwrap();
        assert_eq!(summary.checks.batch_size, CheckStatus::Failed(1));
    }

    #[test]
    fn test_undetectable_document() {
        let err = Verifier::new(options())
            .verify_str("TRUNCATE TABLE Staff;")
            .unwrap_err();
        assert!(err.to_string().contains("--pipeline"));
    }
}
