//! Preview layout: turns a draft snapshot into a display list.
//!
//! The scene mirrors the on-screen preview: company header, invoice
//! number block, client block, item table, totals summary, notes and
//! footer. Coordinates are unscaled preview pixels; the rasterizer
//! applies the oversampling factor.

use chrono::NaiveDate;
use factura_model::{Invoice, InvoiceNumber, LineItem, Totals};

use crate::glyphs;
use crate::profile::CompanyProfile;

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

const INK: Rgb = Rgb(15, 23, 42);
const MUTED: Rgb = Rgb(100, 116, 139);
const LINE: Rgb = Rgb(226, 232, 240);
const SOFT_BG: Rgb = Rgb(248, 250, 252);
const BANNER_BG: Rgb = Rgb(224, 231, 255);
const BANNER_INK: Rgb = Rgb(67, 56, 202);

/// Horizontal text anchoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    /// `x` is the right edge of the run.
    Right,
}

/// One paint operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Rect {
        x: u32,
        y: u32,
        w: u32,
        h: u32,
        color: Rgb,
    },
    Rule {
        x: u32,
        y: u32,
        w: u32,
        color: Rgb,
    },
    Text {
        x: u32,
        y: u32,
        /// Glyph pixel multiplier: 1 = small, 2 = heading.
        scale: u32,
        align: Align,
        color: Rgb,
        content: String,
    },
}

/// A laid-out preview, ready for the rasterizer.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub ops: Vec<Op>,
}

/// Preview width in unscaled pixels.
pub const PREVIEW_WIDTH: u32 = 640;
const PAD: u32 = 32;
const RIGHT_EDGE: u32 = PREVIEW_WIDTH - PAD;
const BANNER_HEIGHT: u32 = 24;

// Item table column anchors (right edges for the numeric columns).
const COL_QTY: u32 = 400;
const COL_PRICE: u32 = 510;
const COL_TOTAL: u32 = RIGHT_EDGE;
const DESC_MAX_CHARS: usize = 48;

/// Placeholder shown for items without a description.
pub const EMPTY_ITEM_LABEL: &str = "Ítem sin descripción";

struct SceneBuilder {
    ops: Vec<Op>,
    y: u32,
}

impl SceneBuilder {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            y: PAD,
        }
    }

    fn text(&mut self, x: u32, scale: u32, align: Align, color: Rgb, content: impl Into<String>) {
        self.ops.push(Op::Text {
            x,
            y: self.y,
            scale,
            align,
            color,
            content: content.into(),
        });
    }

    fn advance(&mut self, scale: u32) {
        self.y += glyphs::GLYPH_HEIGHT * scale + 5;
    }

    fn line(&mut self, x: u32, scale: u32, align: Align, color: Rgb, content: impl Into<String>) {
        self.text(x, scale, align, color, content);
        self.advance(scale);
    }

    fn rule(&mut self, color: Rgb) {
        self.ops.push(Op::Rule {
            x: PAD,
            y: self.y,
            w: PREVIEW_WIDTH - 2 * PAD,
            color,
        });
        self.y += 13;
    }

    fn space(&mut self, h: u32) {
        self.y += h;
    }
}

/// Build the preview scene for one committed snapshot.
///
/// `print_mode` removes screen-only decoration (the draft banner) for
/// document output.
pub fn build_scene(
    invoice: &Invoice,
    totals: &Totals,
    number: Option<&InvoiceNumber>,
    profile: &CompanyProfile,
    print_mode: bool,
) -> Scene {
    let mut b = SceneBuilder::new();
    let symbol = invoice.currency.symbol();

    if !print_mode {
        b.ops.push(Op::Rect {
            x: 0,
            y: 0,
            w: PREVIEW_WIDTH,
            h: BANNER_HEIGHT,
            color: BANNER_BG,
        });
        b.ops.push(Op::Text {
            x: PAD,
            y: 8,
            scale: 1,
            align: Align::Left,
            color: BANNER_INK,
            content: "VISTA PREVIA · BORRADOR".to_string(),
        });
        b.y = BANNER_HEIGHT + PAD;
    }

    // Header: issuer on the left, invoice identity on the right.
    let header_top = b.y;
    b.line(PAD, 2, Align::Left, INK, profile.name.clone());
    b.line(PAD, 1, Align::Left, MUTED, profile.address.clone());
    b.line(
        PAD,
        1,
        Align::Left,
        MUTED,
        format!("{} · {}", profile.email, profile.phone),
    );
    b.line(PAD, 1, Align::Left, MUTED, format!("RUT: {}", profile.tax_id));
    let header_bottom = b.y;

    b.y = header_top;
    b.line(RIGHT_EDGE, 1, Align::Right, MUTED, "FACTURA");
    let number_slot = number.map(|n| n.to_string()).unwrap_or_default();
    b.line(RIGHT_EDGE, 2, Align::Right, INK, format!("N° {number_slot}"));
    b.line(
        RIGHT_EDGE,
        1,
        Align::Right,
        MUTED,
        format!("Fecha emisión: {}", format_date(invoice.issue_date)),
    );
    if let Some(due) = invoice.due_date {
        b.line(
            RIGHT_EDGE,
            1,
            Align::Right,
            MUTED,
            format!("Vencimiento: {}", format_date(due)),
        );
    }
    b.line(
        RIGHT_EDGE,
        1,
        Align::Right,
        MUTED,
        format!("Moneda: {}", invoice.currency.code()),
    );
    b.y = b.y.max(header_bottom);
    b.space(4);
    b.rule(LINE);

    // Client block.
    let client = &invoice.client;
    let client_top = b.y;
    b.line(PAD, 1, Align::Left, MUTED, "CLIENTE");
    let name = if client.name.is_empty() {
        "—".to_string()
    } else {
        client.name.clone()
    };
    b.line(PAD, 1, Align::Left, INK, name);
    if let Some(tax_id) = &client.tax_id {
        b.line(PAD, 1, Align::Left, MUTED, format!("RUT / ID Fiscal: {tax_id}"));
    }
    if let Some(address) = &client.address {
        b.line(PAD, 1, Align::Left, MUTED, address.clone());
    }
    let client_bottom = b.y;
    if let Some(email) = &client.email {
        b.y = client_top;
        b.line(RIGHT_EDGE, 1, Align::Right, MUTED, "CONTACTO");
        b.line(RIGHT_EDGE, 1, Align::Right, MUTED, email.clone());
    }
    b.y = b.y.max(client_bottom);
    b.space(4);
    b.rule(LINE);

    // Item table.
    b.text(PAD, 1, Align::Left, MUTED, "Descripción");
    b.text(COL_QTY, 1, Align::Right, MUTED, "Cantidad");
    b.text(COL_PRICE, 1, Align::Right, MUTED, "Precio unitario");
    b.text(COL_TOTAL, 1, Align::Right, MUTED, "Total");
    b.advance(1);
    b.rule(LINE);
    for item in &invoice.items {
        let description = describe(item);
        b.text(PAD, 1, Align::Left, INK, description[0].clone());
        b.text(COL_QTY, 1, Align::Right, MUTED, format_quantity(item.quantity));
        b.text(
            COL_PRICE,
            1,
            Align::Right,
            MUTED,
            format!("{symbol}{}", format_amount(item.unit_price)),
        );
        b.text(
            COL_TOTAL,
            1,
            Align::Right,
            INK,
            format!("{symbol}{}", format_amount(item.line_total())),
        );
        b.advance(1);
        // Long descriptions wrap onto continuation rows.
        for line in &description[1..] {
            b.line(PAD, 1, Align::Left, INK, line.clone());
        }
        b.rule(SOFT_BG);
    }
    b.space(8);

    // Totals summary, right-aligned.
    let label_x = COL_QTY;
    b.text(label_x, 1, Align::Left, MUTED, "Subtotal");
    b.text(
        COL_TOTAL,
        1,
        Align::Right,
        MUTED,
        format!("{symbol}{}", format_amount(totals.subtotal)),
    );
    b.advance(1);
    if invoice.discount != 0.0 {
        b.text(
            label_x,
            1,
            Align::Left,
            MUTED,
            format!("Descuento ({}%)", format_quantity(invoice.discount)),
        );
        b.text(
            COL_TOTAL,
            1,
            Align::Right,
            MUTED,
            format!("-{symbol}{}", format_amount(totals.discount_amount)),
        );
        b.advance(1);
    }
    if invoice.tax_rate != 0.0 {
        b.text(
            label_x,
            1,
            Align::Left,
            MUTED,
            format!("Impuesto ({}%)", format_quantity(invoice.tax_rate)),
        );
        b.text(
            COL_TOTAL,
            1,
            Align::Right,
            MUTED,
            format!("{symbol}{}", format_amount(totals.tax_amount)),
        );
        b.advance(1);
    }
    b.ops.push(Op::Rule {
        x: label_x,
        y: b.y,
        w: COL_TOTAL - label_x,
        color: LINE,
    });
    b.space(8);
    b.text(label_x, 1, Align::Left, INK, "Total");
    b.text(
        COL_TOTAL,
        2,
        Align::Right,
        INK,
        format!("{symbol}{}", format_amount(totals.total)),
    );
    b.advance(2);

    // Notes, verbatim with newlines preserved.
    if let Some(notes) = invoice.notes.as_deref().filter(|n| !n.is_empty()) {
        b.space(8);
        let lines: Vec<&str> = notes.lines().collect();
        let box_height = 12 + 12 * (1 + lines.len() as u32) + 8;
        b.ops.push(Op::Rect {
            x: PAD,
            y: b.y,
            w: PREVIEW_WIDTH - 2 * PAD,
            h: box_height,
            color: SOFT_BG,
        });
        b.space(12);
        b.line(PAD + 8, 1, Align::Left, MUTED, "NOTAS");
        for line in lines {
            b.line(PAD + 8, 1, Align::Left, MUTED, line.to_string());
        }
        b.space(8);
    }

    // Footer.
    b.space(12);
    b.rule(LINE);
    b.line(
        PAD,
        1,
        Align::Left,
        MUTED,
        format!("Esta factura ha sido generada con {}.", profile.name),
    );
    b.line(
        PAD,
        1,
        Align::Left,
        MUTED,
        "El pago debe realizarse dentro de los 30 días siguientes a la fecha de emisión.",
    );

    let height = b.y + PAD;
    Scene {
        width: PREVIEW_WIDTH,
        height,
        ops: b.ops,
    }
}

fn describe(item: &LineItem) -> Vec<String> {
    let text = if item.description.is_empty() {
        EMPTY_ITEM_LABEL
    } else {
        &item.description
    };
    wrap(text, DESC_MAX_CHARS)
}

/// Greedy word wrap at `max_chars` per line; words longer than a full
/// line are broken hard. Always returns at least one line.
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;
    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while !chars.is_empty() {
            let space = if current_len == 0 { 0 } else { 1 };
            let room = max_chars.saturating_sub(current_len + space);
            let fits_fresh_line = chars.len() <= max_chars;
            if room == 0 || (room < chars.len() && current_len > 0 && fits_fresh_line) {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
                continue;
            }
            let take = room.min(chars.len());
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(chars.drain(..take));
            current_len += take;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format an amount with `.` thousands grouping and up to two decimals.
pub fn format_amount(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let negative = rounded < 0.0;
    let cents_total = rounded.abs() * 100.0;
    let cents_total = cents_total.round() as u128;
    let int_part = cents_total / 100;
    let cents = (cents_total % 100) as u32;

    let digits = int_part.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if cents != 0 {
        out.push(',');
        out.push_str(&format!("{cents:02}"));
    }
    out
}

/// Format a quantity or rate: integers without decimals, otherwise plain.
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
