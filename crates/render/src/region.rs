//! Capture seam: the preview region and its registry.
//!
//! Mirrors the source of truth the exporter works against: a live,
//! fully laid-out preview that can be switched into print mode and
//! rasterized. The registry stands in for locating the region by id.

use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use image::RgbaImage;

use factura_model::{Invoice, InvoiceNumber, Totals};

use crate::layout::{Scene, build_scene};
use crate::profile::CompanyProfile;
use crate::raster::rasterize;

/// Region id of the invoice preview.
pub const PREVIEW_REGION_ID: &str = "invoice-preview";

/// A rendered visual region the exporter can capture.
///
/// Print mode is a presentation state owned by the region; the exporter
/// is the only component that toggles it and must do so symmetrically.
#[async_trait]
pub trait PreviewRegion: Send + Sync {
    fn id(&self) -> &str;

    fn set_print_mode(&self, on: bool);

    fn is_print_mode(&self) -> bool;

    /// Rasterize the region at an integer oversampling factor.
    async fn rasterize(&self, oversample: u32) -> anyhow::Result<RgbaImage>;
}

/// Lookup table of live regions, keyed by region id.
#[derive(Default)]
pub struct RegionRegistry {
    regions: Mutex<HashMap<String, Arc<dyn PreviewRegion>>>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, region: Arc<dyn PreviewRegion>) {
        let mut regions = self.regions.lock().unwrap_or_else(|e| e.into_inner());
        regions.insert(region.id().to_string(), region);
    }

    pub fn unregister(&self, id: &str) {
        let mut regions = self.regions.lock().unwrap_or_else(|e| e.into_inner());
        regions.remove(id);
    }

    pub fn find(&self, id: &str) -> Option<Arc<dyn PreviewRegion>> {
        let regions = self.regions.lock().unwrap_or_else(|e| e.into_inner());
        regions.get(id).cloned()
    }
}

struct Snapshot {
    invoice: Invoice,
    totals: Totals,
    number: Option<InvoiceNumber>,
}

/// The live invoice preview.
///
/// Holds the last committed draft snapshot; the controller pushes a new
/// one on every edit, so a capture always reflects the state at the
/// moment the export was triggered.
pub struct InvoicePreview {
    profile: CompanyProfile,
    snapshot: Mutex<Snapshot>,
    print_mode: AtomicBool,
}

impl InvoicePreview {
    pub fn new(profile: CompanyProfile, invoice: Invoice) -> Self {
        let totals = Totals::compute(&invoice);
        Self {
            profile,
            snapshot: Mutex::new(Snapshot {
                invoice,
                totals,
                number: None,
            }),
            print_mode: AtomicBool::new(false),
        }
    }

    /// Replace the committed snapshot. Totals are recomputed here so the
    /// preview never renders stale derived amounts.
    pub fn update(&self, invoice: Invoice, number: Option<InvoiceNumber>) {
        let totals = Totals::compute(&invoice);
        let mut snapshot = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        *snapshot = Snapshot {
            invoice,
            totals,
            number,
        };
    }

    /// Lay out the current snapshot.
    pub fn scene(&self) -> Scene {
        let snapshot = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        build_scene(
            &snapshot.invoice,
            &snapshot.totals,
            snapshot.number.as_ref(),
            &self.profile,
            self.print_mode.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl PreviewRegion for InvoicePreview {
    fn id(&self) -> &str {
        PREVIEW_REGION_ID
    }

    fn set_print_mode(&self, on: bool) {
        self.print_mode.store(on, Ordering::SeqCst);
    }

    fn is_print_mode(&self) -> bool {
        self.print_mode.load(Ordering::SeqCst)
    }

    async fn rasterize(&self, oversample: u32) -> anyhow::Result<RgbaImage> {
        Ok(rasterize(&self.scene(), oversample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn preview() -> InvoicePreview {
        let invoice = Invoice::draft(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        InvoicePreview::new(CompanyProfile::default(), invoice)
    }

    #[test]
    fn registry_finds_registered_regions() {
        let registry = RegionRegistry::new();
        assert!(registry.find(PREVIEW_REGION_ID).is_none());
        registry.register(Arc::new(preview()));
        assert!(registry.find(PREVIEW_REGION_ID).is_some());
        registry.unregister(PREVIEW_REGION_ID);
        assert!(registry.find(PREVIEW_REGION_ID).is_none());
    }

    #[tokio::test]
    async fn capture_reflects_print_mode() {
        let preview = preview();
        preview.set_print_mode(true);
        assert!(preview.is_print_mode());
        let image = preview.rasterize(2).await.unwrap();
        assert_eq!(image.width(), 2 * crate::layout::PREVIEW_WIDTH);
        preview.set_print_mode(false);
        assert!(!preview.is_print_mode());
    }
}
