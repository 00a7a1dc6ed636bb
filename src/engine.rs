use crate::cancel::CancelToken;
use crate::command::LaidOutDocument;
use crate::config::{FooterConfig, Labels, LayoutConfig, TableConfig};
use crate::debug::DebugLogger;
use crate::error::DocFlowError;
use crate::geometry::PageGeometry;
use crate::layout::{LayoutRun, RunStats};
use crate::measure::TextMeasurer;
use crate::metrics::{DocumentMetrics, PageMetrics};
use crate::model::DocumentModel;
use crate::totals::{MoneyFormat, TaxPolicy};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

/// Turns a [`DocumentModel`] into page-grouped draw commands.
///
/// The engine holds configuration only. Every call to [`LayoutEngine::run`]
/// starts from a fresh cursor on page 1, so one engine can serve any number
/// of documents, sequentially or from several threads.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
    debug: Option<Arc<DebugLogger>>,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutEngineBuilder {
    config: LayoutConfig,
    debug_path: Option<PathBuf>,
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self {
            config: LayoutConfig::default(),
            debug: None,
        }
    }
}

impl LayoutEngine {
    pub fn builder() -> LayoutEngineBuilder {
        LayoutEngineBuilder::default()
    }

    pub fn new(config: LayoutConfig) -> Result<Self, DocFlowError> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Lays out one document. Inputs are checked before anything is drawn.
    pub fn run(
        &self,
        doc: &DocumentModel,
        geometry: &PageGeometry,
        measurer: &dyn TextMeasurer,
    ) -> Result<LaidOutDocument, DocFlowError> {
        self.run_inner(None, doc, geometry, measurer, None)
            .map(|(laid_out, _)| laid_out)
    }

    /// Like [`run`](Self::run), but gives up between table rows once `cancel`
    /// is triggered.
    pub fn run_cancellable(
        &self,
        doc: &DocumentModel,
        geometry: &PageGeometry,
        measurer: &dyn TextMeasurer,
        cancel: &CancelToken,
    ) -> Result<LaidOutDocument, DocFlowError> {
        self.run_inner(None, doc, geometry, measurer, Some(cancel))
            .map(|(laid_out, _)| laid_out)
    }

    pub fn run_with_metrics(
        &self,
        doc: &DocumentModel,
        geometry: &PageGeometry,
        measurer: &dyn TextMeasurer,
    ) -> Result<(LaidOutDocument, DocumentMetrics), DocFlowError> {
        let started = std::time::Instant::now();
        let (laid_out, stats) = self.run_inner(None, doc, geometry, measurer, None)?;
        let layout_ms = started.elapsed().as_secs_f64() * 1000.0;
        let metrics = collect_metrics(&laid_out, &stats, layout_ms);
        Ok((laid_out, metrics))
    }

    /// Lays out many documents concurrently. Results come back in input
    /// order, one per model, and a failure affects only its own entry.
    pub fn run_many_parallel(
        &self,
        docs: &[DocumentModel],
        geometry: &PageGeometry,
        measurer: &dyn TextMeasurer,
    ) -> Vec<Result<LaidOutDocument, DocFlowError>> {
        use rayon::prelude::*;

        let mut results: Vec<(usize, Result<LaidOutDocument, DocFlowError>)> = docs
            .par_iter()
            .enumerate()
            .map(|(idx, doc)| {
                let res = self
                    .run_inner(Some(idx), doc, geometry, measurer, None)
                    .map(|(laid_out, _)| laid_out);
                (idx, res)
            })
            .collect();
        results.sort_by_key(|(idx, _)| *idx);
        results.into_iter().map(|(_, res)| res).collect()
    }

    /// Writes the debug counters gathered so far as one summary event.
    pub fn emit_debug_summary(&self, context: &str) {
        if let Some(logger) = &self.debug {
            logger.emit_summary(context);
            logger.flush();
        }
    }

    fn run_inner(
        &self,
        doc_id: Option<usize>,
        doc: &DocumentModel,
        geometry: &PageGeometry,
        measurer: &dyn TextMeasurer,
        cancel: Option<&CancelToken>,
    ) -> Result<(LaidOutDocument, RunStats), DocFlowError> {
        geometry.validate()?;
        doc.validate()?;
        self.config.validate()?;

        let started = std::time::Instant::now();
        let result = LayoutRun::new(doc, *geometry, &self.config, measurer)
            .with_cancel(cancel)
            .with_debug(self.debug.as_deref(), doc_id)
            .run();

        if let Some(logger) = &self.debug {
            let (pages, outcome) = match &result {
                Ok((laid_out, _)) => (laid_out.page_count(), "ok".to_string()),
                Err(err) => (0, err.to_string()),
            };
            logger.log_event(&json!({
                "type": "layout.run",
                "doc_id": doc_id,
                "document": doc.kind.name(),
                "items": doc.items.len(),
                "pages": pages,
                "outcome": outcome,
                "ms": started.elapsed().as_secs_f64() * 1000.0,
            }));
        }
        if let Ok((laid_out, stats)) = &result {
            log::debug!(
                "laid out {} with {} items on {} pages ({} breaks)",
                doc.kind.name(),
                doc.items.len(),
                laid_out.page_count(),
                stats.page_breaks
            );
        }
        result
    }
}

fn collect_metrics(laid_out: &LaidOutDocument, stats: &RunStats, layout_ms: f64) -> DocumentMetrics {
    let pages = laid_out
        .pages
        .iter()
        .map(|page| PageMetrics {
            page_number: page.number,
            command_count: page.commands.len(),
            row_count: stats
                .rows_per_page
                .get(page.number.saturating_sub(1))
                .copied()
                .unwrap_or(0),
        })
        .collect::<Vec<_>>();
    DocumentMetrics {
        total_rows: pages.iter().map(|page| page.row_count).sum(),
        pages,
        page_breaks: stats.page_breaks,
        layout_ms,
    }
}

impl LayoutEngineBuilder {
    pub fn config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn tax_policy(mut self, tax: TaxPolicy) -> Self {
        self.config.tax = tax;
        self
    }

    /// Tax rate in basis points: 1400 is 14%.
    pub fn tax_rate_bps(mut self, rate_bps: u32) -> Self {
        self.config.tax.rate_bps = rate_bps;
        self
    }

    pub fn clamp_discount(mut self, clamp: bool) -> Self {
        self.config.tax.clamp_discount = clamp;
        self
    }

    pub fn money_format(mut self, money: MoneyFormat) -> Self {
        self.config.money = money;
        self
    }

    pub fn labels(mut self, labels: Labels) -> Self {
        self.config.labels = labels;
        self
    }

    pub fn table(mut self, table: TableConfig) -> Self {
        self.config.table = table;
        self
    }

    pub fn footer(mut self, footer: FooterConfig) -> Self {
        self.config.footer = footer;
        self
    }

    pub fn footer_message(mut self, message: impl Into<String>) -> Self {
        self.config.footer.message = message.into();
        self
    }

    pub fn fonts(mut self, regular: &str, bold: &str) -> Self {
        self.config.fonts.regular = Arc::from(regular);
        self.config.fonts.bold = Arc::from(bold);
        self
    }

    // Enable a JSON-lines trace of page breaks and runs.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<LayoutEngine, DocFlowError> {
        self.config.validate()?;
        let debug = if let Some(path) = self.debug_path {
            Some(Arc::new(DebugLogger::new(path)?))
        } else {
            None
        };
        Ok(LayoutEngine {
            config: self.config,
            debug,
        })
    }
}
