/// Glyph capability shared by every report renderer.
///
/// Resolved once at startup. With a Korean-capable TrueType font on disk the
/// renderers embed it; without one they fall back to defaults that cannot show
/// Hangul, and a single warning is logged here instead of on every render.
use std::path::Path;

use plotters::style::FontStyle;
use tracing::{info, warn};

pub const KOREAN_FONT_FAMILY: &str = "NanumGothic";
pub const FALLBACK_SHEET_FONT: &str = "Calibri";

#[derive(Debug, Clone, Copy)]
pub struct FontProfile {
    /// TrueType bytes of the glyph font, `None` when falling back
    ttf: Option<&'static [u8]>,
}

impl FontProfile {
    pub fn resolve(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "font file not found, Korean text in PDF/chart may not display correctly"
                );
                return Self::fallback();
            }
        };

        // Lives for the rest of the process: the chart rasterizer requires 'static font data.
        let ttf: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if plotters::style::register_font(KOREAN_FONT_FAMILY, FontStyle::Normal, ttf).is_err() {
            warn!(path = %path.display(), "font file is not a usable TrueType font, falling back");
            return Self::fallback();
        }
        info!(path = %path.display(), family = KOREAN_FONT_FAMILY, "report font loaded");
        Self { ttf: Some(ttf) }
    }

    pub fn fallback() -> Self {
        Self { ttf: None }
    }

    pub fn ttf(&self) -> Option<&'static [u8]> {
        self.ttf
    }

    /// Font family name written into spreadsheet cells.
    pub fn sheet_family(&self) -> &'static str {
        if self.ttf.is_some() {
            KOREAN_FONT_FAMILY
        } else {
            FALLBACK_SHEET_FONT
        }
    }

    /// Font family the chart rasterizer can draw text with, if any.
    pub fn chart_family(&self) -> Option<&'static str> {
        self.ttf.map(|_| KOREAN_FONT_FAMILY)
    }
}
