//! `factura-render` — preview rendering and PDF export.
//!
//! The preview is a display list built from the current draft, painted by
//! a small software rasterizer. The exporter captures the preview region
//! at 2× oversampling, encodes the capture as PNG and embeds it into a
//! single-page A4 document.

pub mod export;
pub mod glyphs;
pub mod layout;
pub mod pdf;
pub mod profile;
pub mod raster;
pub mod region;

pub use export::{EXPORT_FILE_NAME, ExportError, ExportPhase, Exporter, OVERSAMPLE};
pub use layout::Scene;
pub use profile::CompanyProfile;
pub use region::{InvoicePreview, PREVIEW_REGION_ID, PreviewRegion, RegionRegistry};
