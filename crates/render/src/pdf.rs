//! Single-page PDF assembly.
//!
//! The capture's PNG is decoded to RGB and embedded as a FlateDecode
//! image XObject on one A4 portrait page. The image fills the page width
//! edge to edge; its height follows from the raster's aspect ratio.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use thiserror::Error;

/// A4 portrait, in millimeters.
pub const A4_WIDTH_MM: f64 = 210.0;
pub const A4_HEIGHT_MM: f64 = 297.0;

const MM_TO_PT: f64 = 72.0 / 25.4;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("could not decode capture image")]
    Image(#[from] image::ImageError),
    #[error("could not compress image stream")]
    Io(#[from] std::io::Error),
    #[error("capture image is empty")]
    EmptyImage,
}

/// Assemble a complete single-page document from a PNG capture.
///
/// Returns the PDF bytes; nothing touches the filesystem here, so a
/// failed assembly delivers no partial file.
pub fn assemble(png: &[u8]) -> Result<Vec<u8>, PdfError> {
    let decoded = image::load_from_memory(png)?.to_rgb8();
    let (raster_w, raster_h) = decoded.dimensions();
    if raster_w == 0 || raster_h == 0 {
        return Err(PdfError::EmptyImage);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(decoded.as_raw())?;
    let stream = encoder.finish()?;

    let page_w = A4_WIDTH_MM * MM_TO_PT;
    let page_h = A4_HEIGHT_MM * MM_TO_PT;
    // Image fills the page width; height keeps the raster aspect ratio.
    let img_w = page_w;
    let img_h = raster_h as f64 * page_w / raster_w as f64;
    // PDF origin is bottom-left; anchor the image to the top of the page.
    let img_y = page_h - img_h;

    let mut doc = Writer::new();
    doc.object(
        1,
        "<< /Type /Catalog /Pages 2 0 R >>".as_bytes().to_vec(),
    );
    doc.object(
        2,
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".as_bytes().to_vec(),
    );
    doc.object(
        3,
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /XObject << /Im0 5 0 R >> >> /Contents 4 0 R >>",
            fmt_num(page_w),
            fmt_num(page_h)
        )
        .into_bytes(),
    );

    let content = format!(
        "q\n{} 0 0 {} 0 {} cm\n/Im0 Do\nQ\n",
        fmt_num(img_w),
        fmt_num(img_h),
        fmt_num(img_y)
    );
    doc.stream_object(4, "<< /Length {len} >>", content.into_bytes());

    let image_dict = format!(
        "<< /Type /XObject /Subtype /Image /Width {raster_w} /Height {raster_h} \
         /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode \
         /Length {{len}} >>"
    );
    doc.stream_object(5, &image_dict, stream);

    Ok(doc.finish(1))
}

/// Minimal PDF serializer: objects, xref table, trailer.
struct Writer {
    out: Vec<u8>,
    offsets: Vec<(u32, usize)>,
}

impl Writer {
    fn new() -> Self {
        let mut out = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n");
        // Binary marker comment.
        out.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");
        Self {
            out,
            offsets: Vec::new(),
        }
    }

    fn object(&mut self, id: u32, body: Vec<u8>) {
        self.offsets.push((id, self.out.len()));
        self.out
            .extend_from_slice(format!("{id} 0 obj\n").as_bytes());
        self.out.extend_from_slice(&body);
        self.out.extend_from_slice(b"\nendobj\n");
    }

    /// Write a stream object; `dict` must contain a `{len}` placeholder.
    fn stream_object(&mut self, id: u32, dict: &str, data: Vec<u8>) {
        self.offsets.push((id, self.out.len()));
        let dict = dict.replace("{len}", &data.len().to_string());
        self.out
            .extend_from_slice(format!("{id} 0 obj\n{dict}\nstream\n").as_bytes());
        self.out.extend_from_slice(&data);
        self.out.extend_from_slice(b"\nendstream\nendobj\n");
    }

    fn finish(mut self, root: u32) -> Vec<u8> {
        self.offsets.sort_by_key(|&(id, _)| id);
        let count = self.offsets.len() + 1;
        let xref_at = self.out.len();
        self.out
            .extend_from_slice(format!("xref\n0 {count}\n").as_bytes());
        self.out
            .extend_from_slice(b"0000000000 65535 f \n");
        for &(_, offset) in &self.offsets {
            self.out
                .extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        self.out.extend_from_slice(
            format!(
                "trailer\n<< /Size {count} /Root {root} 0 R >>\nstartxref\n{xref_at}\n%%EOF\n"
            )
            .as_bytes(),
        );
        self.out
    }
}

/// Format a coordinate with enough precision for page geometry.
fn fmt_num(value: f64) -> String {
    let text = format!("{value:.4}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
