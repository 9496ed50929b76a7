//! Export engine: capture the preview, assemble the PDF, deliver the file.
//!
//! One export at a time. The engine walks `Idle → Capturing → Assembling`
//! and lands back on `Idle` (or `Failed`, from which a fresh user attempt
//! may start). Print mode on the region is entered through a guard that
//! restores it on every exit path. There is no retry and no cancellation:
//! a failed attempt is terminal until the user triggers a new one.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};

use image::RgbaImage;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::pdf::{self, PdfError};
use crate::region::{PREVIEW_REGION_ID, PreviewRegion, RegionRegistry};

/// Name of the delivered document.
pub const EXPORT_FILE_NAME: &str = "factura.pdf";

/// Fixed capture oversampling factor for print-quality output.
pub const OVERSAMPLE: u32 = 2;

/// Export lifecycle state, observable by the UI for the busy indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportPhase {
    Idle,
    Capturing,
    Assembling,
    Failed,
}

impl ExportPhase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ExportPhase::Capturing,
            2 => ExportPhase::Assembling,
            3 => ExportPhase::Failed,
            _ => ExportPhase::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ExportPhase::Idle => 0,
            ExportPhase::Capturing => 1,
            ExportPhase::Assembling => 2,
            ExportPhase::Failed => 3,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    /// The preview region is not there; nothing was started.
    #[error("preview region `{0}` not found")]
    RegionNotFound(String),

    /// An export is already in flight; the trigger was a no-op.
    #[error("an export is already in progress")]
    ExportInFlight,

    #[error("capture failed")]
    Capture(#[source] anyhow::Error),

    #[error("could not encode capture as PNG")]
    Encode(#[from] image::ImageError),

    #[error("document assembly failed")]
    Assembly(#[from] PdfError),

    #[error("could not deliver the document")]
    Deliver(#[from] std::io::Error),
}

/// Restores the region's print mode on drop, success and failure alike.
struct PrintModeGuard<'a> {
    region: &'a dyn PreviewRegion,
}

impl<'a> PrintModeGuard<'a> {
    fn enter(region: &'a dyn PreviewRegion) -> Self {
        region.set_print_mode(true);
        Self { region }
    }
}

impl Drop for PrintModeGuard<'_> {
    fn drop(&mut self) {
        self.region.set_print_mode(false);
    }
}

/// Drives one export attempt at a time.
pub struct Exporter {
    phase: AtomicU8,
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            phase: AtomicU8::new(ExportPhase::Idle.as_u8()),
            output_dir: output_dir.into(),
        }
    }

    pub fn phase(&self) -> ExportPhase {
        ExportPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase(), ExportPhase::Capturing | ExportPhase::Assembling)
    }

    /// Export the preview region to `factura.pdf` in the output directory.
    ///
    /// Looks up the region first: a missing region aborts before any state
    /// is touched. A trigger while an attempt is in flight fails with
    /// [`ExportError::ExportInFlight`] and starts nothing.
    pub async fn export(&self, registry: &RegionRegistry) -> Result<PathBuf, ExportError> {
        let Some(region) = registry.find(PREVIEW_REGION_ID) else {
            warn!(region = PREVIEW_REGION_ID, "preview region not found, export aborted");
            return Err(ExportError::RegionNotFound(PREVIEW_REGION_ID.to_string()));
        };

        self.begin()?;
        let result = self.run(region.as_ref()).await;
        match &result {
            Ok(path) => {
                self.set_phase(ExportPhase::Idle);
                info!(path = %path.display(), "export delivered");
            }
            Err(err) => {
                self.set_phase(ExportPhase::Failed);
                error!(error = %err, "export failed");
            }
        }
        result
    }

    async fn run(&self, region: &dyn PreviewRegion) -> Result<PathBuf, ExportError> {
        let capture = {
            let _print_mode = PrintModeGuard::enter(region);
            debug!(oversample = OVERSAMPLE, "capturing preview");
            region
                .rasterize(OVERSAMPLE)
                .await
                .map_err(ExportError::Capture)?
            // Print mode ends here, before assembly, as on screen.
        };

        self.set_phase(ExportPhase::Assembling);
        let png = encode_png(&capture)?;
        let document = pdf::assemble(&png)?;

        // Deliver only after the whole document exists in memory.
        let path = self.output_dir.join(EXPORT_FILE_NAME);
        tokio::fs::write(&path, &document).await?;
        Ok(path)
    }

    /// Re-entrancy gate: only `Idle` (or `Failed`, for a fresh user
    /// attempt) may transition into `Capturing`.
    fn begin(&self) -> Result<(), ExportError> {
        for from in [ExportPhase::Idle, ExportPhase::Failed] {
            if self
                .phase
                .compare_exchange(
                    from.as_u8(),
                    ExportPhase::Capturing.as_u8(),
                    Ordering::SeqCst,
                    Ordering::SeqCst,
                )
                .is_ok()
            {
                return Ok(());
            }
        }
        warn!("export trigger ignored, another export is in flight");
        Err(ExportError::ExportInFlight)
    }

    fn set_phase(&self, phase: ExportPhase) {
        self.phase.store(phase.as_u8(), Ordering::SeqCst);
    }
}

fn encode_png(capture: &RgbaImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    capture.write_to(&mut buf, image::ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CompanyProfile;
    use crate::region::InvoicePreview;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use factura_model::Invoice;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    fn registry_with_preview() -> (RegionRegistry, Arc<InvoicePreview>) {
        let invoice = Invoice::draft(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let preview = Arc::new(InvoicePreview::new(CompanyProfile::default(), invoice));
        let registry = RegionRegistry::new();
        registry.register(preview.clone());
        (registry, preview)
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("factura-export-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// A region whose capture blocks until released.
    struct SlowRegion {
        print_mode: AtomicBool,
        release: tokio::sync::Notify,
    }

    impl SlowRegion {
        fn new() -> Self {
            Self {
                print_mode: AtomicBool::new(false),
                release: tokio::sync::Notify::new(),
            }
        }
    }

    #[async_trait]
    impl PreviewRegion for SlowRegion {
        fn id(&self) -> &str {
            PREVIEW_REGION_ID
        }

        fn set_print_mode(&self, on: bool) {
            self.print_mode.store(on, Ordering::SeqCst);
        }

        fn is_print_mode(&self) -> bool {
            self.print_mode.load(Ordering::SeqCst)
        }

        async fn rasterize(&self, _oversample: u32) -> anyhow::Result<RgbaImage> {
            self.release.notified().await;
            Ok(RgbaImage::new(4, 4))
        }
    }

    /// A region whose capture always fails.
    struct BrokenRegion {
        print_mode: AtomicBool,
    }

    #[async_trait]
    impl PreviewRegion for BrokenRegion {
        fn id(&self) -> &str {
            PREVIEW_REGION_ID
        }

        fn set_print_mode(&self, on: bool) {
            self.print_mode.store(on, Ordering::SeqCst);
        }

        fn is_print_mode(&self) -> bool {
            self.print_mode.load(Ordering::SeqCst)
        }

        async fn rasterize(&self, _oversample: u32) -> anyhow::Result<RgbaImage> {
            anyhow::bail!("rasterization blew up")
        }
    }

    #[test]
    fn phases_serialize_lowercase() {
        let json = serde_json::to_string(&ExportPhase::Capturing).unwrap();
        assert_eq!(json, "\"capturing\"");
        let json = serde_json::to_string(&ExportPhase::Idle).unwrap();
        assert_eq!(json, "\"idle\"");
    }

    #[tokio::test]
    async fn export_delivers_factura_pdf() {
        let dir = temp_dir("ok");
        let (registry, preview) = registry_with_preview();
        let exporter = Exporter::new(&dir);

        let path = exporter.export(&registry).await.unwrap();
        assert_eq!(path.file_name().unwrap(), EXPORT_FILE_NAME);
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(exporter.phase(), ExportPhase::Idle);
        // Print mode was restored.
        assert!(!preview.is_print_mode());
    }

    #[tokio::test]
    async fn missing_region_aborts_without_state_change() {
        let dir = temp_dir("missing");
        let registry = RegionRegistry::new();
        let exporter = Exporter::new(&dir);

        let err = exporter.export(&registry).await.unwrap_err();
        assert!(matches!(err, ExportError::RegionNotFound(_)));
        assert_eq!(exporter.phase(), ExportPhase::Idle);
        assert!(!dir.join(EXPORT_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn second_trigger_while_busy_is_rejected() {
        let dir = temp_dir("busy");
        let region = Arc::new(SlowRegion::new());
        let registry = Arc::new(RegionRegistry::new());
        registry.register(region.clone());
        let exporter = Arc::new(Exporter::new(&dir));

        let first = {
            let exporter = exporter.clone();
            let registry = registry.clone();
            tokio::spawn(async move { exporter.export(&registry).await })
        };

        // Wait until the first export is in the capturing phase.
        while !exporter.is_busy() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        let err = exporter.export(&registry).await.unwrap_err();
        assert!(matches!(err, ExportError::ExportInFlight));

        region.release.notify_one();
        let first = first.await.unwrap();
        assert!(first.is_ok());
        assert_eq!(exporter.phase(), ExportPhase::Idle);
    }

    #[tokio::test]
    async fn failed_capture_restores_print_mode_and_delivers_nothing() {
        let dir = temp_dir("broken");
        let region = Arc::new(BrokenRegion {
            print_mode: AtomicBool::new(false),
        });
        let registry = RegionRegistry::new();
        registry.register(region.clone());
        let exporter = Exporter::new(&dir);

        let err = exporter.export(&registry).await.unwrap_err();
        assert!(matches!(err, ExportError::Capture(_)));
        assert!(!region.is_print_mode());
        assert_eq!(exporter.phase(), ExportPhase::Failed);
        assert!(!dir.join(EXPORT_FILE_NAME).exists());

        // A fresh user attempt may start from Failed.
        let err = exporter.export(&registry).await.unwrap_err();
        assert!(matches!(err, ExportError::Capture(_)));
    }
}
