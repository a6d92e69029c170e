//! Rate-sheet generator — fixed-layout, single-page PDF lead magnets.
//!
//! The document is built fully in memory with `pdf-writer` and written once;
//! a failed write never leaves a partial file behind. Rates are compile-time
//! constants — there is no live feed in this version.

use std::fs;
use std::path::PathBuf;

use chrono::{Datelike, Utc};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use uuid::Uuid;

use crate::core::error::AppError;

/// US Letter in points.
const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;

/// Loan product table: (product, interest rate, APR, 30-day trend).
const RATES: &[(&str, &str, &str, &str)] = &[
    ("30-Year Fixed Conventional", "6.875%", "6.950%", "-0.12%"),
    ("20-Year Fixed Conventional", "6.500%", "6.580%", "-0.05%"),
    ("15-Year Fixed Conventional", "6.125%", "6.210%", "STABLE"),
    ("FHA 30-Year Fixed", "6.250%", "6.850%", "-0.15%"),
    ("VA 30-Year Fixed", "6.250%", "6.500%", "-0.10%"),
];

// Brand palette.
const NAVY: (f32, f32, f32) = (0.04, 0.07, 0.16);
const RED: (f32, f32, f32) = (0.86, 0.15, 0.15);
const GREEN: (f32, f32, f32) = (0.1, 0.6, 0.3);

/// Writes rate-sheet PDFs into a fixed downloads directory.
pub struct RateSheetGenerator {
    downloads_dir: PathBuf,
}

impl RateSheetGenerator {
    pub fn new(downloads_dir: impl Into<PathBuf>) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
        }
    }

    /// Create the downloads directory if it does not exist yet.
    pub fn ensure_dir(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.downloads_dir).map_err(|e| {
            AppError::Document(format!(
                "cannot create downloads dir {}: {e}",
                self.downloads_dir.display()
            ))
        })
    }

    /// Absolute path of a previously generated file.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.downloads_dir.join(filename)
    }

    /// Generate a rate sheet for `session_id` and return the bare filename.
    ///
    /// The filename embeds a UUIDv7, so it is time-ordered and unique per
    /// call even within the same millisecond.
    pub fn generate(&self, session_id: &str) -> Result<String, AppError> {
        let filename = format!("HRY_Rate_Sheet_{}.pdf", Uuid::now_v7().simple());
        let path = self.downloads_dir.join(&filename);

        let bytes = render_rate_sheet(session_id);

        if let Err(e) = fs::write(&path, &bytes) {
            // Don't leave a truncated document behind.
            let _ = fs::remove_file(&path);
            return Err(AppError::Document(format!(
                "cannot write {}: {e}",
                path.display()
            )));
        }

        Ok(filename)
    }
}

/// Render the full document into memory.
///
/// Coordinates are PDF points with the origin at the bottom-left of a US
/// Letter page.
fn render_rate_sheet(session_id: &str) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let font_regular_id = Ref::new(4);
    let font_bold_id = Ref::new(5);
    let font_oblique_id = Ref::new(6);
    let content_id = Ref::new(7);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    {
        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(page_tree_id);
        page.contents(content_id);
        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        fonts.pair(Name(b"F1"), font_regular_id);
        fonts.pair(Name(b"F2"), font_bold_id);
        fonts.pair(Name(b"F3"), font_oblique_id);
        fonts.finish();
        resources.finish();
        page.finish();
    }

    pdf.type1_font(font_regular_id).base_font(Name(b"Helvetica"));
    pdf.type1_font(font_bold_id).base_font(Name(b"Helvetica-Bold"));
    pdf.type1_font(font_oblique_id).base_font(Name(b"Helvetica-Oblique"));

    let mut c = Content::new();

    // Header band with red accent line.
    fill_rect(&mut c, NAVY, 0.0, PAGE_HEIGHT - 100.0, PAGE_WIDTH, 100.0);
    fill_rect(&mut c, RED, 0.0, PAGE_HEIGHT - 105.0, PAGE_WIDTH, 5.0);

    text(&mut c, b"F2", 26.0, (1.0, 1.0, 1.0), 40.0, PAGE_HEIGHT - 60.0, "HomeRatesYard");
    text(
        &mut c,
        b"F1",
        11.0,
        (0.6, 0.7, 0.9),
        40.0,
        PAGE_HEIGHT - 80.0,
        "Enterprise Mortgage Intelligence",
    );

    // Document title and metadata.
    text(&mut c, b"F2", 18.0, NAVY, 40.0, PAGE_HEIGHT - 160.0, "Live Market Rate Sheet");

    let session_label: String = session_id.chars().take(8).collect::<String>().to_uppercase();
    let now = Utc::now();
    text(
        &mut c,
        b"F1",
        10.0,
        (0.4, 0.4, 0.4),
        40.0,
        PAGE_HEIGHT - 180.0,
        &format!("Generated automatically for session: {session_label}"),
    );
    text(
        &mut c,
        b"F1",
        10.0,
        (0.4, 0.4, 0.4),
        40.0,
        PAGE_HEIGHT - 195.0,
        &format!("Date: {}", now.format("%B %d, %Y - %I:%M %p UTC")),
    );

    // Table header row.
    let mut y = PAGE_HEIGHT - 250.0;
    fill_rect(&mut c, (0.95, 0.96, 0.98), 40.0, y - 10.0, PAGE_WIDTH - 80.0, 30.0);
    text(&mut c, b"F2", 11.0, NAVY, 50.0, y, "Loan Product");
    text(&mut c, b"F2", 11.0, NAVY, 280.0, y, "Interest Rate");
    text(&mut c, b"F2", 11.0, NAVY, 380.0, y, "APR");
    text(&mut c, b"F2", 11.0, NAVY, 480.0, y, "30-Day Trend");

    // Product rows with alternating fills and trend coloring.
    y -= 30.0;
    for (i, (product, rate, apr, trend)) in RATES.iter().enumerate() {
        if i % 2 == 0 {
            fill_rect(&mut c, (0.98, 0.98, 0.99), 40.0, y - 10.0, PAGE_WIDTH - 80.0, 30.0);
        }

        text(&mut c, b"F2", 11.0, (0.1, 0.1, 0.1), 50.0, y, product);
        text(&mut c, b"F2", 12.0, RED, 280.0, y, rate);
        text(&mut c, b"F1", 11.0, (0.4, 0.4, 0.4), 380.0, y, apr);

        let trend_color = if trend.contains('-') {
            GREEN
        } else if trend.contains('+') {
            RED
        } else {
            (0.5, 0.5, 0.5)
        };
        text(&mut c, b"F1", 11.0, trend_color, 480.0, y, trend);

        y -= 30.0;
    }

    // Disclaimers.
    let gray = (0.6, 0.6, 0.6);
    text(
        &mut c,
        b"F3",
        8.0,
        gray,
        40.0,
        60.0,
        "*Rates shown are national averages based on a $450,000 loan amount, 740+ FICO score, and 20% down payment.",
    );
    text(
        &mut c,
        b"F3",
        8.0,
        gray,
        40.0,
        50.0,
        "This is an AI-generated summary and not a commitment to lend. Connect with a licensed loan officer for an official Loan Estimate.",
    );
    text(
        &mut c,
        b"F3",
        8.0,
        gray,
        40.0,
        35.0,
        &format!(
            "(c) {} HomeRatesYard Enterprise Analytics. Bank-Level 256-bit Encryption.",
            now.year()
        ),
    );

    pdf.stream(content_id, &c.finish());
    pdf.finish()
}

fn fill_rect(c: &mut Content, color: (f32, f32, f32), x: f32, y: f32, w: f32, h: f32) {
    c.set_fill_rgb(color.0, color.1, color.2);
    c.rect(x, y, w, h);
    c.fill_nonzero();
}

fn text(c: &mut Content, font: &[u8], size: f32, color: (f32, f32, f32), x: f32, y: f32, s: &str) {
    c.set_fill_rgb(color.0, color.1, color.2);
    c.begin_text();
    c.set_font(Name(font), size);
    c.next_line(x, y);
    c.show(Str(s.as_bytes()));
    c.end_text();
}
