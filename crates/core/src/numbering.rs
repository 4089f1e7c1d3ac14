//! Daily sequential invoice numbers.
//!
//! Numbers look like `Invoice-250114C`: a `YYMMDD` date followed by a letter
//! for the position of the invoice within that day. The first invoice of the
//! day gets `A`. From the 27th invoice onward the letter stays at `Z`, so
//! labels can repeat on very busy days.

use chrono::NaiveDate;

/// Prefix shared by every generated number.
pub const INVOICE_NUMBER_PREFIX: &str = "Invoice-";

const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Returns the sequence letter for the `issued_today`-th invoice (0-based).
#[must_use]
pub fn sequence_letter(issued_today: u64) -> char {
    let last = LETTERS.len() - 1;
    let index = usize::try_from(issued_today).map_or(last, |i| i.min(last));
    char::from(LETTERS[index])
}

/// Formats the number for an invoice dated `date` when `issued_today`
/// invoices already carry that date.
#[must_use]
pub fn format_invoice_number(date: NaiveDate, issued_today: u64) -> String {
    format!(
        "{INVOICE_NUMBER_PREFIX}{}{}",
        date.format("%y%m%d"),
        sequence_letter(issued_today)
    )
}
