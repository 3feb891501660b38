use image::RgbImage;
use plotters::prelude::*;

use super::{ReportRow, AREA_LABEL, CHART_TITLE, LEVEL_LABEL};
use crate::error::CoreError;
use crate::fonts::FontProfile;

pub(super) const CHART_WIDTH: u32 = 800;
pub(super) const CHART_HEIGHT: u32 = 400;

const BAR_COLOR: RGBColor = RGBColor(135, 206, 235);
/// Levels are on a five point scale; the axis grows when a payload exceeds it.
const MIN_Y_MAX: f64 = 5.0;

/// Rasterize the per-category levels as a bar chart, one bar per row in row order.
pub(super) fn render(rows: &[ReportRow], fonts: &FontProfile) -> Result<RgbImage, CoreError> {
    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    draw(&mut buffer, rows, fonts.chart_family()).map_err(|e| CoreError::Chart(e.to_string()))?;
    RgbImage::from_raw(CHART_WIDTH, CHART_HEIGHT, buffer)
        .ok_or_else(|| CoreError::Chart("chart buffer does not match image size".to_string()))
}

fn draw(
    buffer: &mut [u8],
    rows: &[ReportRow],
    family: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::with_buffer(buffer, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    if rows.is_empty() {
        root.present()?;
        return Ok(());
    }

    let n = rows.len();
    let y_max = rows.iter().map(|r| r.level).fold(MIN_Y_MAX, f64::max);

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    match family {
        Some(family) => {
            builder
                .caption(CHART_TITLE, (family, 22))
                .x_label_area_size(70)
                .y_label_area_size(50);
        }
        None => {
            builder.x_label_area_size(10).y_label_area_size(10);
        }
    }
    let mut chart = builder.build_cartesian_2d((0..n).into_segmented(), 0.0..y_max)?;

    let labels: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    let label_for = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    };

    match family {
        Some(family) => chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&label_for)
            .x_desc(AREA_LABEL)
            .y_desc(LEVEL_LABEL)
            .label_style((family, 14))
            .axis_desc_style((family, 16))
            .draw()?,
        // no glyph font: bare axes, no mesh and no tick labels
        None => {
            let area = chart.plotting_area().strip_coord_spec();
            let (w, h) = area.dim_in_pixel();
            let (right, bottom) = (w as i32 - 1, h as i32 - 1);
            area.draw(&PathElement::new(vec![(0, 0), (0, bottom), (right, bottom)], BLACK))?;
        }
    }

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BAR_COLOR.filled())
            .margin(12)
            .data(rows.iter().enumerate().map(|(i, r)| (i, r.level))),
    )?;

    root.present()?;
    Ok(())
}
