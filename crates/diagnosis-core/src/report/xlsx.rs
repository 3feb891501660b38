use rust_xlsxwriter::{Chart, ChartType, Color, Format, FormatAlign, FormatBorder, Workbook};

use super::{ReportRow, AREA_LABEL, CHART_TITLE, LEVEL_LABEL, SHEET_NAME, TABLE_HEADERS};
use crate::error::CoreError;
use crate::fonts::FontProfile;

const HEADER_FILL: u32 = 0xDDDDDD;
const COLUMN_WIDTHS: [f64; 4] = [24.0, 10.0, 10.0, 12.0];
/// Chart anchor, cell F2.
const CHART_ANCHOR: (u32, u16) = (1, 5);

pub(super) fn render(rows: &[ReportRow], fonts: &FontProfile) -> Result<Vec<u8>, CoreError> {
    let family = fonts.sheet_family();
    let header_format = Format::new()
        .set_font_name(family)
        .set_bold()
        .set_font_size(12)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin)
        .set_background_color(Color::RGB(HEADER_FILL));
    let cell_format = Format::new()
        .set_font_name(family)
        .set_border(FormatBorder::Thin);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (header, width)) in TABLE_HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *header, &header_format)?;
        sheet.set_column_width(col, width)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        sheet.write_string_with_format(r, 0, &row.category, &cell_format)?;
        sheet.write_number_with_format(r, 1, row.allocation, &cell_format)?;
        sheet.write_number_with_format(r, 2, row.level, &cell_format)?;
        sheet.write_number_with_format(r, 3, row.score, &cell_format)?;
    }

    if !rows.is_empty() {
        let last = rows.len() as u32;
        let mut chart = Chart::new(ChartType::Column);
        chart.title().set_name(CHART_TITLE);
        chart.x_axis().set_name(AREA_LABEL);
        chart.y_axis().set_name(LEVEL_LABEL);
        chart
            .add_series()
            .set_categories((SHEET_NAME, 1, 0, last, 0))
            .set_values((SHEET_NAME, 1, 2, last, 2));
        chart.legend().set_hidden();
        sheet.insert_chart(CHART_ANCHOR.0, CHART_ANCHOR.1, &chart)?;
    }

    Ok(workbook.save_to_buffer()?)
}
