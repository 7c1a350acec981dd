// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! A small flowing-layout PDF writer.
//!
//! Content is laid out top to bottom on A4 pages. Every drawing call
//! reserves its height first and starts a new page when the remaining
//! space is too small, so callers never deal with coordinates. Text uses
//! the standard Helvetica fonts with `WinAnsiEncoding`, which covers the
//! German umlauts and `ß`; characters outside that code page print as `?`.

use std::borrow::Cow;

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::ReportError;

/// A4 portrait in PDF points.
const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 16.0;
const SECTION_SIZE: f32 = 12.0;
const FONT_SIZE: f32 = 10.0;
const FOOTER_SIZE: f32 = 8.0;
const LINE_HEIGHT: f32 = 13.0;
const CELL_PADDING: f32 = 4.0;

/// Width of the label column of key/value fields.
const LABEL_WIDTH: f32 = 140.0;

/// Mean Helvetica advance width as a fraction of the font size.
const AVERAGE_GLYPH_WIDTH: f32 = 0.52;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

/// Placeholder printed for empty values.
pub const EMPTY_VALUE: &str = "-";

pub struct PdfDocument {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    fonts: PageFonts,
    next_id: Ref,
    page_refs: Vec<Ref>,

    finished: Vec<(Ref, Content)>,
    current: Content,
    current_id: Ref,
    cursor_y: f32,

    footer: String,
}

/// Font resources shared by every page.
#[derive(Clone, Copy)]
struct PageFonts {
    regular: Ref,
    bold: Ref,
}

impl PdfDocument {
    /// Starts a document with one empty page.
    ///
    /// `footer` is printed at the bottom left of every page, next to the
    /// page number.
    #[must_use]
    pub fn new(title: &str, footer: &str) -> Self {
        let mut pdf = Pdf::new();
        let mut next_id = Ref::new(1);

        let catalog_id = next_id.bump();
        let pages_id = next_id.bump();
        let fonts = PageFonts {
            regular: next_id.bump(),
            bold: next_id.bump(),
        };
        let info_id = next_id.bump();

        pdf.type1_font(fonts.regular)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(fonts.bold)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.document_info(info_id)
            .title(TextStr(title))
            .producer(TextStr("EiDiV"));

        let first_page = next_id.bump();
        let first_content = next_id.bump();
        write_page(&mut pdf, pages_id, fonts, first_page, first_content);

        Self {
            pdf,
            catalog_id,
            pages_id,
            fonts,
            next_id,
            page_refs: vec![first_page],
            finished: Vec::new(),
            current: Content::new(),
            current_id: first_content,
            cursor_y: PAGE_HEIGHT - MARGIN,
            footer: footer.to_string(),
        }
    }

    /// Writes a page dictionary and returns the id of its content stream.
    fn add_page_object(&mut self) -> Ref {
        let page_id = self.next_id.bump();
        let content_id = self.next_id.bump();
        self.page_refs.push(page_id);
        write_page(&mut self.pdf, self.pages_id, self.fonts, page_id, content_id);
        content_id
    }

    fn break_page(&mut self) {
        let content_id = self.add_page_object();
        let content = std::mem::replace(&mut self.current, Content::new());
        let finished_id = std::mem::replace(&mut self.current_id, content_id);
        self.finished.push((finished_id, content));
        self.cursor_y = PAGE_HEIGHT - MARGIN;
    }

    /// Makes sure `height` points fit above the bottom margin.
    fn reserve(&mut self, height: f32) {
        if self.cursor_y - height < MARGIN {
            self.break_page();
        }
    }

    #[must_use]
    pub const fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    /// Document title, printed large.
    pub fn title(&mut self, text: &str) {
        self.reserve(TITLE_SIZE + LINE_HEIGHT);
        self.cursor_y -= TITLE_SIZE;
        draw_text(&mut self.current, BOLD, TITLE_SIZE, MARGIN, self.cursor_y, text);
        self.cursor_y -= LINE_HEIGHT;
    }

    /// A single line of regular text.
    pub fn line(&mut self, text: &str) {
        for wrapped in wrap(text, CONTENT_WIDTH, FONT_SIZE) {
            self.reserve(LINE_HEIGHT);
            self.cursor_y -= LINE_HEIGHT;
            draw_text(
                &mut self.current,
                REGULAR,
                FONT_SIZE,
                MARGIN,
                self.cursor_y + 3.0,
                &wrapped,
            );
        }
    }

    /// A section heading with a rule below it.
    ///
    /// The heading is moved to the next page if not even one line of
    /// content would fit below it.
    pub fn section(&mut self, heading: &str) {
        self.reserve(SECTION_SIZE + 2.0 * LINE_HEIGHT + 8.0);
        self.cursor_y -= 8.0 + SECTION_SIZE;
        draw_text(&mut self.current, BOLD, SECTION_SIZE, MARGIN, self.cursor_y, heading);
        self.cursor_y -= 4.0;

        let content: &mut Content = &mut self.current;
        content.save_state();
        content.set_line_width(0.5);
        content.move_to(MARGIN, self.cursor_y);
        content.line_to(PAGE_WIDTH - MARGIN, self.cursor_y);
        content.stroke();
        content.restore_state();
    }

    /// A key/value line. Long values wrap within the value column.
    pub fn field(&mut self, label: &str, value: &str) {
        let value: &str = if value.trim().is_empty() {
            EMPTY_VALUE
        } else {
            value
        };
        let lines: Vec<String> = wrap(value, CONTENT_WIDTH - LABEL_WIDTH, FONT_SIZE);

        for (index, wrapped) in lines.iter().enumerate() {
            self.reserve(LINE_HEIGHT);
            self.cursor_y -= LINE_HEIGHT;
            let baseline: f32 = self.cursor_y + 3.0;
            if index == 0 {
                draw_text(&mut self.current, BOLD, FONT_SIZE, MARGIN, baseline, label);
            }
            draw_text(
                &mut self.current,
                REGULAR,
                FONT_SIZE,
                MARGIN + LABEL_WIDTH,
                baseline,
                wrapped,
            );
        }
    }

    /// Free text spanning the full width. Line breaks in `text` are kept.
    pub fn paragraph(&mut self, text: &str) {
        if text.trim().is_empty() {
            self.line(EMPTY_VALUE);
            return;
        }
        self.cursor_y -= 2.0;
        self.line(text);
    }

    /// A bordered table with a shaded header row.
    ///
    /// `widths` are fractions of the printable width and must sum to at
    /// most 1. The header row is repeated after every page break. An empty
    /// table prints a single "Keine Einträge" row.
    ///
    /// # Errors
    ///
    /// Returns an error if a row does not have one cell per column or the
    /// columns are wider than the page.
    pub fn table(
        &mut self,
        name: &str,
        headers: &[&str],
        widths: &[f32],
        rows: &[Vec<String>],
    ) -> Result<(), ReportError> {
        if widths.len() != headers.len() {
            return Err(ReportError::ColumnMismatch {
                table: name.to_string(),
                expected: headers.len(),
                found: widths.len(),
            });
        }
        if widths.iter().sum::<f32>() > 1.0 + f32::EPSILON {
            return Err(ReportError::TableTooWide {
                table: name.to_string(),
            });
        }
        if let Some(row) = rows.iter().find(|row| row.len() != headers.len()) {
            return Err(ReportError::ColumnMismatch {
                table: name.to_string(),
                expected: headers.len(),
                found: row.len(),
            });
        }

        let columns: Vec<f32> = widths.iter().map(|w| w * CONTENT_WIDTH).collect();
        let header_cells: Vec<String> = headers.iter().map(ToString::to_string).collect();

        // Header plus at least one body row stays together.
        self.reserve(4.0 * LINE_HEIGHT);
        self.cursor_y -= 6.0;
        self.table_row(&columns, &header_cells, true, false);

        if rows.is_empty() {
            let empty = vec![String::from("Keine Einträge")];
            self.table_row(&[CONTENT_WIDTH], &empty, false, false);
            return Ok(());
        }

        for (index, row) in rows.iter().enumerate() {
            let height: f32 = row_height(&columns, row);
            if self.cursor_y - height < MARGIN {
                self.break_page();
                self.table_row(&columns, &header_cells, true, false);
            }
            self.table_row(&columns, row, false, index % 2 == 1);
        }
        Ok(())
    }

    fn table_row(&mut self, columns: &[f32], cells: &[String], header: bool, striped: bool) {
        let height: f32 = row_height(columns, cells);
        self.reserve(height);
        let top: f32 = self.cursor_y;
        let bottom: f32 = top - height;
        let total_width: f32 = columns.iter().sum();

        let content: &mut Content = &mut self.current;
        if header || striped {
            let shade: f32 = if header { 0.86 } else { 0.96 };
            content.save_state();
            content.set_fill_gray(shade);
            content.rect(MARGIN, bottom, total_width, height);
            content.fill_nonzero();
            content.restore_state();
        }

        let font: Name<'static> = if header { BOLD } else { REGULAR };
        let mut x: f32 = MARGIN;
        for (width, cell) in columns.iter().zip(cells) {
            let mut baseline: f32 = top - CELL_PADDING - FONT_SIZE + 1.0;
            for wrapped in wrap(cell, width - 2.0 * CELL_PADDING, FONT_SIZE) {
                draw_text(content, font, FONT_SIZE, x + CELL_PADDING, baseline, &wrapped);
                baseline -= LINE_HEIGHT;
            }

            content.save_state();
            content.set_stroke_gray(0.65);
            content.set_line_width(0.5);
            content.rect(x, bottom, *width, height);
            content.stroke();
            content.restore_state();

            x += width;
        }

        self.cursor_y = bottom;
    }

    /// Finishes the document and returns the PDF bytes.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        let last = std::mem::replace(&mut self.current, Content::new());
        self.finished.push((self.current_id, last));

        let total: usize = self.finished.len();
        for (index, (content_id, mut content)) in self.finished.into_iter().enumerate() {
            let page_label: String = format!("Seite {} von {total}", index + 1);
            let footer_y: f32 = MARGIN / 2.0;
            draw_text(&mut content, REGULAR, FOOTER_SIZE, MARGIN, footer_y, &self.footer);
            draw_text(
                &mut content,
                REGULAR,
                FOOTER_SIZE,
                PAGE_WIDTH - MARGIN - text_width(&page_label, FOOTER_SIZE),
                footer_y,
                &page_label,
            );
            self.pdf.stream(content_id, &content.finish());
        }

        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .count(i32::try_from(self.page_refs.len()).unwrap_or(i32::MAX))
            .kids(self.page_refs.iter().copied());

        self.pdf.finish()
    }
}

fn write_page(pdf: &mut Pdf, pages_id: Ref, fonts: PageFonts, page_id: Ref, content_id: Ref) {
    let mut page = pdf.page(page_id);
    page.parent(pages_id)
        .media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
        .contents(content_id);
    page.resources()
        .fonts()
        .pair(REGULAR, fonts.regular)
        .pair(BOLD, fonts.bold);
}

fn draw_text(content: &mut Content, font: Name<'_>, size: f32, x: f32, y: f32, text: &str) {
    content.begin_text();
    content.set_font(font, size);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
    content.show(Str(&encode_win_ansi(text)));
    content.end_text();
}

fn row_height(columns: &[f32], cells: &[String]) -> f32 {
    let lines: usize = columns
        .iter()
        .zip(cells)
        .map(|(width, cell)| wrap(cell, width - 2.0 * CELL_PADDING, FONT_SIZE).len())
        .max()
        .unwrap_or(1);
    line_span(lines) + 2.0 * CELL_PADDING
}

#[allow(clippy::cast_precision_loss)]
fn line_span(lines: usize) -> f32 {
    lines as f32 * LINE_HEIGHT
}

/// Estimated printed width of `text`.
#[allow(clippy::cast_precision_loss)]
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVERAGE_GLYPH_WIDTH
}

/// Wraps `text` to lines that fit into `width` points.
///
/// Always returns at least one line.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let columns: usize = ((width / (size * AVERAGE_GLYPH_WIDTH)).floor().max(1.0)) as usize;
    let lines: Vec<String> = textwrap::wrap(text, columns)
        .into_iter()
        .map(Cow::into_owned)
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

/// Encodes `text` for a font using `WinAnsiEncoding` (Windows-1252).
///
/// Latin-1 characters map to themselves; the typographic characters of the
/// 0x80 to 0x9F block are translated; anything else becomes `?`.
#[must_use]
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => b' ',
            ' '..='~' | '\u{a0}'..='\u{ff}' => u8::try_from(c).unwrap_or(b'?'),
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}
