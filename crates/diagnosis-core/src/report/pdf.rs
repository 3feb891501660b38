use image::{DynamicImage, RgbImage};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Polygon, Rgb,
};

use super::{display_number, ReportRow, DOCUMENT_TITLE, TABLE_HEADERS};
use crate::error::CoreError;
use crate::fonts::FontProfile;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const ROW_HEIGHT: f32 = 10.0;
const COLUMN_WIDTHS: [f32; 4] = [60.0, 30.0, 30.0, 30.0];
const CHART_WIDTH_MM: f32 = 190.0;
const PT_TO_MM: f32 = 0.352_778;

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
}

#[derive(Clone, Copy)]
struct CellStyle {
    size: f32,
    align: Align,
    border: bool,
    /// Gray level of the background fill
    fill: Option<f32>,
}

const TITLE_STYLE: CellStyle = CellStyle {
    size: 16.0,
    align: Align::Center,
    border: false,
    fill: None,
};
const HEADER_STYLE: CellStyle = CellStyle {
    size: 12.0,
    align: Align::Center,
    border: true,
    fill: Some(0.87),
};
const AREA_STYLE: CellStyle = CellStyle {
    size: 12.0,
    align: Align::Left,
    border: true,
    fill: None,
};
const NUMBER_STYLE: CellStyle = CellStyle {
    align: Align::Center,
    ..AREA_STYLE
};

/// Top-down page cursor over a printpdf document, which measures from the bottom.
struct PageWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    /// Distance from the top edge of the page, in mm
    y: f32,
}

impl PageWriter {
    fn new(fonts: &FontProfile) -> Result<Self, CoreError> {
        let (doc, page, layer) =
            PdfDocument::new(DOCUMENT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = match fonts.ttf() {
            Some(ttf) => doc.add_external_font(ttf),
            None => doc.add_builtin_font(BuiltinFont::Helvetica),
        }
        .map_err(pdf_error)?;
        let layer = doc.get_page(page).get_layer(layer);
        layer.set_outline_thickness(0.5);
        Ok(Self {
            doc,
            layer,
            font,
            y: MARGIN,
        })
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= PAGE_HEIGHT - MARGIN
    }

    /// Start a new page when `height` more mm would cross the bottom margin.
    fn reserve(&mut self, height: f32) {
        if self.fits(height) {
            return;
        }
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.layer.set_outline_thickness(0.5);
        self.y = MARGIN;
    }

    /// One row-high cell of `width` mm at `x` on the current line.
    fn cell(&self, x: f32, width: f32, text: &str, style: CellStyle) {
        let top = PAGE_HEIGHT - self.y;
        let bottom = top - ROW_HEIGHT;
        let corners = vec![
            (Point::new(Mm(x), Mm(bottom)), false),
            (Point::new(Mm(x + width), Mm(bottom)), false),
            (Point::new(Mm(x + width), Mm(top)), false),
            (Point::new(Mm(x), Mm(top)), false),
        ];

        if let Some(gray) = style.fill {
            self.layer
                .set_fill_color(Color::Rgb(Rgb::new(gray, gray, gray, None)));
            self.layer.add_polygon(Polygon {
                rings: vec![corners.clone()],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            });
            self.layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        }
        if style.border {
            self.layer.add_line(Line {
                points: corners,
                is_closed: true,
            });
        }

        let text_x = match style.align {
            Align::Left => x + 1.0,
            Align::Center => x + (width - text_width(text, style.size)).max(0.0) / 2.0,
        };
        let glyph_height = style.size * PT_TO_MM;
        let baseline = bottom + (ROW_HEIGHT - glyph_height) / 2.0 + glyph_height * 0.2;
        self.layer
            .use_text(text, style.size, Mm(text_x), Mm(baseline), &self.font);
    }

    fn image(&mut self, chart: &RgbImage) {
        let (px_w, px_h) = chart.dimensions();
        let height = CHART_WIDTH_MM * px_h as f32 / px_w as f32;
        self.reserve(height);

        let dpi = px_w as f32 * 25.4 / CHART_WIDTH_MM;
        let image = Image::from_dynamic_image(&DynamicImage::ImageRgb8(chart.clone()));
        image.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(PAGE_HEIGHT - self.y - height)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.y += height;
    }

    fn finish(self) -> Result<Vec<u8>, CoreError> {
        self.doc.save_to_bytes().map_err(pdf_error)
    }
}

/// Title, table, then the embedded chart image.
pub(super) fn render(rows: &[ReportRow], chart: &RgbImage, fonts: &FontProfile) -> Result<Vec<u8>, CoreError> {
    let mut page = PageWriter::new(fonts)?;

    page.cell(MARGIN, PAGE_WIDTH - 2.0 * MARGIN, DOCUMENT_TITLE, TITLE_STYLE);
    page.y += ROW_HEIGHT + 10.0;

    table_header(&mut page);
    for row in rows {
        if !page.fits(ROW_HEIGHT) {
            // repeat the header on every continuation page
            page.reserve(ROW_HEIGHT);
            table_header(&mut page);
        }
        let cells = [
            row.category.clone(),
            display_number(row.allocation),
            display_number(row.level),
            display_number(row.score),
        ];
        let mut x = MARGIN;
        for (i, (text, width)) in cells.iter().zip(COLUMN_WIDTHS).enumerate() {
            let style = if i == 0 { AREA_STYLE } else { NUMBER_STYLE };
            page.cell(x, width, text, style);
            x += width;
        }
        page.y += ROW_HEIGHT;
    }

    page.y += 10.0;
    page.image(chart);
    page.finish()
}

fn table_header(page: &mut PageWriter) {
    page.reserve(ROW_HEIGHT);
    let mut x = MARGIN;
    for (header, width) in TABLE_HEADERS.iter().zip(COLUMN_WIDTHS) {
        page.cell(x, width, header, HEADER_STYLE);
        x += width;
    }
    page.y += ROW_HEIGHT;
}

/// Rough advance width: full-width glyphs take the full em, others about half.
fn text_width(text: &str, size: f32) -> f32 {
    let ems: f32 = text
        .chars()
        .map(|c| if c.is_ascii() { 0.5 } else { 1.0 })
        .sum();
    ems * size * PT_TO_MM
}

fn pdf_error(e: printpdf::Error) -> CoreError {
    CoreError::Pdf(e.to_string())
}
