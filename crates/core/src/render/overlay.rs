//! Overlay content: code, name block and company line as PDF operators.

use lopdf::content::Operation;
use lopdf::Object;

use super::error::RenderError;
use super::qr::QrMatrix;
use super::text::{encode_win_ansi, fit_font_size};
use super::types::{QrGeometry, TextLayout};
use crate::roster::AttendeeRecord;

const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
/// #005BAB
const COMPANY_BLUE: [f32; 3] = [0.0, 91.0 / 255.0, 171.0 / 255.0];

/// A positioned line of text, baseline origin in page units.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: [f32; 3],
}

/// Where the overlay elements go for a given code placement.
///
/// The name block starts `gap` units right of the code. The first name sits
/// in the upper part of the code's height and the last name below it; the
/// company line, when shown, goes under the last name.
#[derive(Debug, Clone, Copy)]
pub struct OverlayLayout {
    qr: QrGeometry,
    text: TextLayout,
}

impl OverlayLayout {
    pub fn new(qr: QrGeometry, text: TextLayout) -> Self {
        Self { qr, text }
    }

    pub fn qr(&self) -> &QrGeometry {
        &self.qr
    }

    /// Name lines for `record`, uppercased and sized to the width budget.
    pub fn text_lines(&self, record: &AttendeeRecord) -> Vec<TextLine> {
        let QrGeometry { x, y, size } = self.qr;
        let text_x = x + size + self.text.gap;

        let first = record.first_name.to_uppercase();
        let last = record.last_name.to_uppercase();
        let first_size = fit_font_size(&first, &self.text.sizing);
        let last_size = fit_font_size(&last, &self.text.sizing);
        let last_y = y + size / 4.0 + size / 10.0;

        let mut lines = vec![
            TextLine {
                text: first,
                x: text_x,
                y: y + size * 0.75 - 20.0,
                size: first_size,
                color: BLACK,
            },
            TextLine {
                text: last,
                x: text_x,
                y: last_y,
                size: last_size,
                color: BLACK,
            },
        ];

        if self.text.show_company {
            if let Some(company) = record.company.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                let company = company.to_uppercase();
                let company_size =
                    fit_font_size(&company, &self.text.sizing.capped(self.text.company_max_size));
                lines.push(TextLine {
                    text: company,
                    x: text_x,
                    y: last_y - (company_size + 8.0),
                    size: company_size,
                    color: COMPANY_BLUE,
                });
            }
        }

        lines
    }

    /// Content operators drawing the overlay for `record`, with every
    /// coordinate shifted by `origin` (the page's lower-left corner).
    pub fn operations(
        &self,
        record: &AttendeeRecord,
        origin: (f32, f32),
        font_resource: &str,
    ) -> Result<Vec<Operation>, RenderError> {
        let matrix = QrMatrix::encode(&record.id)?;
        let (ox, oy) = origin;
        let qr = QrGeometry {
            x: self.qr.x + ox,
            y: self.qr.y + oy,
            size: self.qr.size,
        };

        let mut ops = vec![Operation::new("q", vec![])];

        // Light background keeps the quiet zone readable over artwork
        ops.push(fill_color(WHITE));
        ops.push(rect([qr.x, qr.y, qr.size, qr.size]));
        ops.push(Operation::new("f", vec![]));

        ops.push(fill_color(BLACK));
        for r in matrix.rects(&qr) {
            ops.push(rect(r));
        }
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));

        for line in self.text_lines(record) {
            if line.text.is_empty() {
                continue;
            }
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![Object::Name(font_resource.as_bytes().to_vec()), line.size.into()],
            ));
            ops.push(fill_color(line.color));
            ops.push(Operation::new(
                "Td",
                vec![(line.x + ox).into(), (line.y + oy).into()],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_win_ansi(&line.text))],
            ));
            ops.push(Operation::new("ET", vec![]));
        }

        Ok(ops)
    }
}

fn fill_color([r, g, b]: [f32; 3]) -> Operation {
    Operation::new("rg", vec![r.into(), g.into(), b.into()])
}

fn rect([x, y, w, h]: [f32; 4]) -> Operation {
    Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()])
}
