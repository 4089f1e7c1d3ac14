//! Invoice documents.
//!
//! - `render` builds the printable HTML page
//! - `pdf` prints a page to PDF with a headless browser

pub mod pdf;
pub mod render;

pub use pdf::{ChromeOptions, ChromePdfConverter, PdfConverter, PdfError, attachment_filename};
pub use render::{PageSetup, due_amount, escape_html, format_money, render_invoice};
