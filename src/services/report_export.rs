//! Report export
//!
//! Renders the active motor report as an Excel workbook or a landscape A4 PDF
//! table. Both renderers work in memory and return the file bytes.

use chrono::{DateTime, NaiveDate, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};

use crate::dto::report_dto::{ActiveMotorRow, NOT_AVAILABLE};
use crate::utils::errors::{AppError, AppResult};

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const REPORT_TITLE: &str = "Active Motors";

/// (header, xlsx column width, pdf column width in mm)
const COLUMNS: [(&str, f64, f32); 11] = [
    ("TON Number", 15.0, 24.0),
    ("Designation", 20.0, 36.0),
    ("Serial Number", 15.0, 26.0),
    ("Power", 12.0, 18.0),
    ("Speed (RPM)", 12.0, 18.0),
    ("Current", 12.0, 18.0),
    ("IM", 10.0, 14.0),
    ("Frame Size", 12.0, 18.0),
    ("Bearing NDE", 15.0, 32.0),
    ("Bearing DE", 15.0, 32.0),
    ("Last Maintenance", 18.0, 31.0),
];

// A4 landscape
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 15.0;
const ROW_HEIGHT: f32 = 6.0;
const FONT_SIZE: f32 = 8.0;
// average Helvetica glyph width at FONT_SIZE
const CHAR_WIDTH: f32 = 1.45;

/// `active-motors-<date>.<extension>`
pub fn export_filename(extension: &str, date: NaiveDate) -> String {
    format!("active-motors-{}.{}", date.format("%Y-%m-%d"), extension)
}

fn text_or_na(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

fn row_cells(row: &ActiveMotorRow) -> [String; 11] {
    [
        row.ton_number.clone(),
        row.designation.clone(),
        row.serial_number.clone(),
        text_or_na(&row.power),
        row.speed
            .map(|s| s.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        text_or_na(&row.current),
        text_or_na(&row.mounting),
        text_or_na(&row.frame_size),
        text_or_na(&row.bearing_nde),
        text_or_na(&row.bearing_de),
        row.last_maintenance_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    ]
}

fn xlsx_error(e: rust_xlsxwriter::XlsxError) -> AppError {
    AppError::Internal(format!("Excel export failed: {}", e))
}

fn pdf_error(e: printpdf::Error) -> AppError {
    AppError::Internal(format!("PDF export failed: {}", e))
}

/// Render the rows as a single-sheet workbook with a styled header row
pub fn active_motors_xlsx(rows: &[ActiveMotorRow]) -> AppResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(REPORT_TITLE).map_err(xlsx_error)?;

    let header_fmt = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x4472C4))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let cell_fmt = Format::new().set_border(FormatBorder::Thin);

    for (col, (title, width, _)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        sheet
            .write_string_with_format(0, col, *title, &header_fmt)
            .map_err(xlsx_error)?;
        sheet.set_column_width(col, *width).map_err(xlsx_error)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let line = index as u32 + 1;
        for (col, cell) in row_cells(row).iter().enumerate() {
            sheet
                .write_string_with_format(line, col as u16, cell, &cell_fmt)
                .map_err(xlsx_error)?;
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

/// Clip `text` to what fits in a column of `width` millimetres
fn fit(text: &str, width: f32) -> String {
    let max_chars = ((width - 2.0) / CHAR_WIDTH).max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

fn draw_row(layer: &PdfLayerReference, cells: &[String], y: f32, font: &IndirectFontRef) {
    let mut x = MARGIN;
    for (cell, (_, _, width)) in cells.iter().zip(COLUMNS.iter()) {
        layer.use_text(fit(cell, *width), FONT_SIZE, Mm(x + 1.0), Mm(y), font);
        x += width;
    }
}

/// Render the rows as a paginated table, repeating the header on every page
pub fn active_motors_pdf(rows: &[ActiveMotorRow], generated_at: DateTime<Utc>) -> AppResult<Vec<u8>> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let headers: Vec<String> = COLUMNS.iter().map(|(title, _, _)| title.to_string()).collect();

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    layer.use_text(REPORT_TITLE, 16.0, Mm(MARGIN), Mm(PAGE_HEIGHT - MARGIN), &bold);
    layer.use_text(
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M UTC")),
        9.0,
        Mm(MARGIN),
        Mm(PAGE_HEIGHT - MARGIN - 7.0),
        &font,
    );

    let mut y = PAGE_HEIGHT - MARGIN - 18.0;
    draw_row(&layer, &headers, y, &bold);
    y -= ROW_HEIGHT;

    let mut page_number = 1;
    for row in rows {
        if y < MARGIN {
            page_number += 1;
            let (page, page_layer) = doc.add_page(
                Mm(PAGE_WIDTH),
                Mm(PAGE_HEIGHT),
                format!("Page {}", page_number),
            );
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_HEIGHT - MARGIN;
            draw_row(&layer, &headers, y, &bold);
            y -= ROW_HEIGHT;
        }

        draw_row(&layer, &row_cells(row), y, &font);
        y -= ROW_HEIGHT;
    }

    if rows.is_empty() {
        layer.use_text("No active motors", FONT_SIZE, Mm(MARGIN), Mm(y), &font);
    }

    doc.save_to_bytes().map_err(pdf_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(serial: &str) -> ActiveMotorRow {
        ActiveMotorRow {
            motor_id: Uuid::new_v4(),
            ton_number: "TON-100".into(),
            designation: "Cooling pump".into(),
            serial_number: serial.into(),
            power: Some("10 HP".into()),
            speed: Some(1450.0),
            current: None,
            mounting: Some("B3".into()),
            frame_size: None,
            bearing_nde: None,
            bearing_de: Some("6309".into()),
            last_maintenance_date: NaiveDate::from_ymd_opt(2024, 5, 2),
        }
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        assert_eq!(export_filename("xlsx", date), "active-motors-2024-05-02.xlsx");
    }

    #[test]
    fn test_missing_values_render_as_na() {
        let cells = row_cells(&row("S/N-1"));
        assert_eq!(cells[4], "1450");
        assert_eq!(cells[5], NOT_AVAILABLE);
        assert_eq!(cells[10], "2024-05-02");
    }

    #[test]
    fn test_fit_clips_long_text() {
        assert_eq!(fit("6309", 32.0), "6309");
        let clipped = fit(&"x".repeat(80), 14.0);
        assert!(clipped.ends_with("..."));
        assert!(clipped.chars().count() < 80);
    }

    #[test]
    fn test_xlsx_is_a_zip_container() {
        let bytes = active_motors_xlsx(&[row("S/N-1"), row("S/N-2")]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_pdf_paginates_long_reports() {
        let rows: Vec<_> = (0..80).map(|i| row(&format!("S/N-{}", i))).collect();
        let bytes = active_motors_pdf(&rows, Utc::now()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        let empty = active_motors_pdf(&[], Utc::now()).unwrap();
        assert!(empty.starts_with(b"%PDF"));
    }
}
