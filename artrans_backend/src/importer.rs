use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;

use crate::artran::Artran;
use crate::config::ImportTarget;
use crate::console::Operator;
use crate::database::models::NewComment;
use crate::identity::{is_valid_url, IdentityResolver};
use crate::progress::ProgressReporter;
use crate::rebuild::{rebuild_reply_chain, CommittedComment};
use crate::remap::{IdentifierMapping, Ordinal, OrdinalTable};
use crate::store::ImportStore;
use crate::utils::{parse_source_date, source_date_or_now};

const CONFIRM_QUESTION: &str = "Start importing?";

/// Errors that abort the whole run. Per-record failures never surface here.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode artrans JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no comments found in input")]
    Empty,
    #[error("target site URL {0:?} is not a valid http(s) URL")]
    InvalidTargetUrl(String),
    #[error("operator interaction failed: {0}")]
    Prompt(#[source] std::io::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl ImportError {
    /// Input or configuration problems, as opposed to I/O and storage faults.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            ImportError::Decode(_) | ImportError::Empty | ImportError::InvalidTargetUrl(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Preflight,
    Confirm,
    Importing,
    Rebuilding,
    Done,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreflightSummary {
    pub site_name: Option<String>,
    pub site_url: Option<String>,
    pub record_count: usize,
    pub url_resolver: bool,
}

impl PreflightSummary {
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let unspecified = || "unspecified".to_string();
        vec![
            (
                "target site name",
                self.site_name.clone().unwrap_or_else(unspecified),
            ),
            (
                "target site URL",
                self.site_url.clone().unwrap_or_else(unspecified),
            ),
            ("comments", self.record_count.to_string()),
            (
                "URL resolver",
                if self.url_resolver { "on" } else { "off" }.to_string(),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub total: usize,
    pub imported: usize,
    pub skipped: Vec<SkippedRecord>,
    pub rebuilt: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The operator declined; nothing was written.
    Aborted,
    Completed(ImportReport),
}

/// Result of the import pass, consumed by the reply-chain rebuild.
#[derive(Debug, Default)]
struct ImportPass {
    committed: Vec<CommittedComment>,
    mapping: IdentifierMapping,
    skipped: Vec<SkippedRecord>,
}

/// Drives one Artrans import through
/// `Preflight → Confirm → Importing → Rebuilding → Done`.
pub struct ArtransImporter<'a, S: ?Sized> {
    store: &'a S,
    target: ImportTarget,
    operator: &'a mut dyn Operator,
    progress: &'a mut dyn ProgressReporter,
    phase: ImportPhase,
}

impl<'a, S: ImportStore + ?Sized> ArtransImporter<'a, S> {
    pub fn new(
        store: &'a S,
        target: ImportTarget,
        operator: &'a mut dyn Operator,
        progress: &'a mut dyn ProgressReporter,
    ) -> Self {
        Self {
            store,
            target,
            operator,
            progress,
            phase: ImportPhase::Preflight,
        }
    }

    pub fn phase(&self) -> ImportPhase {
        self.phase
    }

    pub fn run(&mut self, records: &[Artran]) -> Result<ImportOutcome, ImportError> {
        let summary = match self.preflight(records) {
            Ok(summary) => summary,
            Err(err) => {
                self.enter(ImportPhase::Aborted);
                return Err(err);
            }
        };

        self.enter(ImportPhase::Confirm);
        if !self
            .operator
            .confirm(CONFIRM_QUESTION)
            .map_err(ImportError::Prompt)?
        {
            tracing::info!("import declined by operator");
            self.enter(ImportPhase::Aborted);
            return Ok(ImportOutcome::Aborted);
        }

        self.enter(ImportPhase::Importing);
        let pass = self.import_records(records)?;

        self.enter(ImportPhase::Rebuilding);
        let rebuilt = rebuild_reply_chain(self.store, &pass.committed, &pass.mapping)
            .context("failed to rebuild reply chain")?;

        self.enter(ImportPhase::Done);
        let report = ImportReport {
            total: summary.record_count,
            imported: pass.committed.len(),
            skipped: pass.skipped,
            rebuilt,
        };
        tracing::info!(
            total = report.total,
            imported = report.imported,
            skipped = report.skipped.len(),
            "artrans import finished"
        );
        self.operator
            .report(&format!("Imported {} comments", report.imported))
            .map_err(ImportError::Prompt)?;
        Ok(ImportOutcome::Completed(report))
    }

    fn enter(&mut self, next: ImportPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "import phase transition");
        self.phase = next;
    }

    fn preflight(&mut self, records: &[Artran]) -> Result<PreflightSummary, ImportError> {
        let Some(first) = records.first() else {
            return Err(ImportError::Empty);
        };
        if let Some(url) = &self.target.site_url {
            if !is_valid_url(url) {
                return Err(ImportError::InvalidTargetUrl(url.clone()));
            }
        }

        let summary = PreflightSummary {
            site_name: self.target.site_name.clone(),
            site_url: self.target.site_url.clone(),
            record_count: records.len(),
            url_resolver: self.target.url_resolver_enabled(),
        };
        self.operator
            .review(&summary, first)
            .map_err(ImportError::Prompt)?;
        Ok(summary)
    }

    fn import_records(&mut self, records: &[Artran]) -> Result<ImportPass, ImportError> {
        // Ordinals must exist before the first write so replies can point forward.
        let ordinals = OrdinalTable::assign(records);
        let resolver = IdentityResolver::new(self.store, &self.target)?;
        let mut pass = ImportPass::default();

        self.progress.start(records.len());
        for (index, record) in records.iter().enumerate() {
            let parent = ordinals.provisional_parent(record);
            match import_record(self.store, &resolver, record, parent) {
                Ok(comment_id) => {
                    pass.mapping
                        .record_committed(ordinals.ordinal_at(index), comment_id);
                    pass.committed.push(CommittedComment {
                        comment_id,
                        provisional_parent: parent,
                    });
                }
                Err(err) => {
                    tracing::error!(
                        source_id = %record.id,
                        error = %format!("{err:#}"),
                        "failed to import comment, skipping"
                    );
                    pass.skipped.push(SkippedRecord {
                        id: record.id.clone(),
                        reason: format!("{err:#}"),
                    });
                }
            }
            self.progress.record_done(index);
        }
        self.progress.finish();
        Ok(pass)
    }
}

/// Resolves identity, writes the comment with its provisional parent and
/// restores the source timestamps. Returns the new comment id.
fn import_record<S: ImportStore + ?Sized>(
    store: &S,
    resolver: &IdentityResolver<'_, S>,
    record: &Artran,
    parent: Option<Ordinal>,
) -> Result<i64> {
    let identity = resolver
        .resolve(record)
        .context("failed to resolve user, site or page")?;

    let comment = NewComment {
        content: record.content.clone(),
        page_key: identity.page.key,
        site_name: identity.site.name,
        user_id: identity.user.id,
        rid: parent.map(Ordinal::get).unwrap_or(0),
        ua: record.ua.clone(),
        ip: record.ip.clone(),
        is_collapsed: record.is_collapsed,
        is_pending: record.is_pending,
        is_pinned: record.is_pinned,
        vote_up: i64::from(record.vote_up),
        vote_down: i64::from(record.vote_down),
    };
    let comment_id = store
        .create_comment(&comment)
        .context("failed to save comment")?;

    // The store stamps rows with the insert time; put the source dates back.
    let created_at = source_date_or_now(&record.created_at);
    let updated_at = parse_source_date(&record.updated_at).unwrap_or_else(|| created_at.clone());
    if let Err(err) = store.restore_timestamps(comment_id, &created_at, &updated_at) {
        tracing::warn!(
            source_id = %record.id,
            comment_id,
            error = %format!("{err:#}"),
            "failed to restore comment timestamps"
        );
    }
    Ok(comment_id)
}
