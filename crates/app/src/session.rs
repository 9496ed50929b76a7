//! The editing session: one draft, one invoice number, one preview.
//!
//! The session is the edit controller of the system: it routes user edits
//! into the pure reducer, keeps the preview fed with the latest committed
//! snapshot, and owns the exporter. It performs no computation of its own
//! beyond routing and default construction.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info};

use factura_model::{Edit, Invoice, InvoiceNumber, Totals, apply};
use factura_render::{
    CompanyProfile, ExportError, ExportPhase, Exporter, InvoicePreview, RegionRegistry,
};

/// What crosses the submission boundary: the assigned number plus the
/// complete current draft.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionPayload {
    pub invoice_number: Option<InvoiceNumber>,
    #[serde(flatten)]
    pub invoice: Invoice,
}

/// One invoice-editing session.
pub struct Session {
    invoice: Invoice,
    number: Option<InvoiceNumber>,
    preview: Arc<InvoicePreview>,
    registry: RegionRegistry,
    exporter: Exporter,
}

impl Session {
    /// Open a session with a fresh draft dated today.
    pub fn new(profile: CompanyProfile, output_dir: impl Into<PathBuf>) -> Self {
        Self::with_draft(profile, output_dir, Invoice::draft(Local::now().date_naive()))
    }

    pub fn with_draft(
        profile: CompanyProfile,
        output_dir: impl Into<PathBuf>,
        invoice: Invoice,
    ) -> Self {
        let preview = Arc::new(InvoicePreview::new(profile, invoice.clone()));
        let registry = RegionRegistry::new();
        registry.register(preview.clone());
        Self {
            invoice,
            number: None,
            preview,
            registry,
            exporter: Exporter::new(output_dir),
        }
    }

    /// Assign the session invoice number. Idempotent: once assigned, the
    /// number never changes for the lifetime of the session.
    pub fn start(&mut self) {
        self.start_at(Local::now());
    }

    pub fn start_at(&mut self, now: DateTime<Local>) {
        if self.number.is_some() {
            return;
        }
        let number = InvoiceNumber::generate(now);
        info!(number = %number, "session started");
        self.number = Some(number);
        self.push_snapshot();
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn number(&self) -> Option<&InvoiceNumber> {
        self.number.as_ref()
    }

    /// Derived totals, recomputed from the current draft on every read.
    pub fn totals(&self) -> Totals {
        Totals::compute(&self.invoice)
    }

    /// Route one edit through the reducer and commit the result.
    pub fn apply(&mut self, edit: Edit) {
        debug!(?edit, "applying edit");
        self.invoice = apply(&self.invoice, &edit);
        self.push_snapshot();
    }

    /// Hand the assembled draft to the submission collaborator.
    ///
    /// There is no backend in scope: the payload is logged and returned.
    pub fn submit(&self) -> SubmissionPayload {
        let payload = SubmissionPayload {
            invoice_number: self.number.clone(),
            invoice: self.invoice.clone(),
        };
        match serde_json::to_string(&payload) {
            Ok(json) => info!(payload = %json, "invoice submitted"),
            Err(err) => info!(error = %err, "invoice submitted (payload not serializable)"),
        }
        payload
    }

    /// Export the preview to `factura.pdf` in the session output directory.
    pub async fn export_pdf(&self) -> Result<PathBuf, ExportError> {
        self.exporter.export(&self.registry).await
    }

    pub fn export_phase(&self) -> ExportPhase {
        self.exporter.phase()
    }

    fn push_snapshot(&self) {
        self.preview.update(self.invoice.clone(), self.number.clone());
    }
}
