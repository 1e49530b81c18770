//! Renders tabular report data as downloadable PDF and CSV documents.

use csv::WriterBuilder;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};

use crate::Error;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 12.0;
const ROW_HEIGHT_MM: f32 = 8.0;
const BODY_FONT_SIZE: f32 = 10.0;
const TITLE_FONT_SIZE: f32 = 16.0;

/// Renders a table of report data into a downloadable document.
///
/// Handlers depend on this trait rather than a concrete backend so tests can
/// swap in a renderer that fails on demand.
pub trait DocumentRenderer {
    /// Render `rows` as a PDF table titled `title` with a `columns` header.
    fn render_table(
        &self,
        title: &str,
        columns: &[&str],
        rows: &[Vec<String>],
    ) -> Result<Vec<u8>, Error>;

    /// Render `rows` as CSV with a `columns` header row.
    fn render_csv(&self, columns: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, Error>;
}

/// Renders tables with the printpdf and csv crates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableRenderer;

impl DocumentRenderer for TableRenderer {
    fn render_table(
        &self,
        title: &str,
        columns: &[&str],
        rows: &[Vec<String>],
    ) -> Result<Vec<u8>, Error> {
        let (document, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

        let font = add_font(&document, BuiltinFont::Helvetica)?;
        let bold_font = add_font(&document, BuiltinFont::HelveticaBold)?;

        let column_width = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / columns.len().max(1) as f32;
        let column_x = |index: usize| Mm(MARGIN_MM + index as f32 * column_width);

        let mut current_layer = document.get_page(page).get_layer(layer);
        let mut y = PAGE_HEIGHT_MM - MARGIN_MM - ROW_HEIGHT_MM;

        current_layer.use_text(title, TITLE_FONT_SIZE, Mm(MARGIN_MM), Mm(y), &bold_font);
        y -= 2.0 * ROW_HEIGHT_MM;

        for (index, column) in columns.iter().enumerate() {
            current_layer.use_text(*column, BODY_FONT_SIZE, column_x(index), Mm(y), &bold_font);
        }
        y -= ROW_HEIGHT_MM;

        for row in rows {
            if y < MARGIN_MM {
                let (next_page, next_layer) =
                    document.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
                current_layer = document.get_page(next_page).get_layer(next_layer);
                y = PAGE_HEIGHT_MM - MARGIN_MM - ROW_HEIGHT_MM;
            }

            for (index, cell) in row.iter().enumerate() {
                current_layer.use_text(cell, BODY_FONT_SIZE, column_x(index), Mm(y), &font);
            }
            y -= ROW_HEIGHT_MM;
        }

        document
            .save_to_bytes()
            .map_err(|error| Error::RenderError(error.to_string()))
    }

    fn render_csv(&self, columns: &[&str], rows: &[Vec<String>]) -> Result<Vec<u8>, Error> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());

        writer
            .write_record(columns)
            .map_err(|error| Error::RenderError(error.to_string()))?;

        for row in rows {
            writer
                .write_record(row)
                .map_err(|error| Error::RenderError(error.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|error| Error::RenderError(error.to_string()))
    }
}

fn add_font(
    document: &PdfDocumentReference,
    font: BuiltinFont,
) -> Result<IndirectFontRef, Error> {
    document
        .add_builtin_font(font)
        .map_err(|error| Error::RenderError(error.to_string()))
}
