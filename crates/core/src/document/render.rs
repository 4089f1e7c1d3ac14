//! Invoice HTML rendering.
//!
//! `render_invoice` is a pure function of its inputs. The page doubles as the
//! PDF source, so the `@page` rule carries the print layout.

use crate::invoice::{Client, CompanyProfile, Invoice, LineItem};

/// Page layout used when the document is printed to PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    /// CSS page size keyword.
    pub size: &'static str,
    /// Top margin in millimetres.
    pub margin_top_mm: u32,
    /// Right margin in millimetres.
    pub margin_right_mm: u32,
    /// Bottom margin in millimetres.
    pub margin_bottom_mm: u32,
    /// Left margin in millimetres.
    pub margin_left_mm: u32,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            size: "A4",
            margin_top_mm: 20,
            margin_right_mm: 15,
            margin_bottom_mm: 20,
            margin_left_mm: 15,
        }
    }
}

impl PageSetup {
    fn css(&self) -> String {
        format!(
            "@page {{ size: {}; margin: {}mm {}mm {}mm {}mm; }}",
            self.size,
            self.margin_top_mm,
            self.margin_right_mm,
            self.margin_bottom_mm,
            self.margin_left_mm
        )
    }
}

const STYLE: &str = r"
* { box-sizing: border-box; }
html { -webkit-print-color-adjust: exact; print-color-adjust: exact; }
body { margin: 0; padding: 40px; background: #f0f2f5; color: #2c3e50;
  font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; }
.sheet { position: relative; z-index: 1; max-width: 900px; margin: auto; background: #fff;
  padding: 40px 50px; border-radius: 16px; box-shadow: 0 10px 25px rgba(0,0,0,.08); }
.watermark { position: fixed; top: 50%; left: 50%; z-index: 2; font-weight: 800; color: #1a2a52;
  opacity: .08; white-space: nowrap; pointer-events: none; user-select: none;
  transform: translate(-50%, -50%) rotate(-30deg); }
.watermark.paid { font-size: 240px; }
.watermark.unpaid { font-size: 200px; }
.actions button, .actions a { display: inline-block; text-decoration: none; background: #1a2a52; color: #fff; border: 0; border-radius: 8px;
  padding: 12px 28px; margin: 0 8px 20px 0; font-size: 14px; cursor: pointer; }
.head { display: flex; justify-content: space-between; align-items: flex-start; margin-bottom: 25px; }
.head h1 { margin: 0 0 10px; font-size: 34px; color: #1a2a52; }
.muted { font-size: 14px; line-height: 1.6; color: #7f8c8d; }
.muted strong { color: #2c3e50; }
.due { text-align: right; font-size: 18px; font-weight: 700; color: #e84118; }
.parties { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; margin-bottom: 30px; font-size: 14px; }
table { width: 100%; border-collapse: collapse; font-size: 14px; }
th { background: #1a2a52; color: #fff; padding: 14px 15px; text-align: left; }
td { padding: 14px 15px; border-bottom: 1px solid #e0e0e0; vertical-align: top; }
.num { text-align: right; white-space: nowrap; }
.desc { font-size: 13px; color: #7f8c8d; }
.totals { max-width: 360px; margin: 30px 0 0 auto; font-size: 16px; }
.totals div { display: flex; justify-content: space-between; padding: 8px 0; border-bottom: 1px solid #e0e0e0; }
.totals .final { font-weight: 700; color: #1a2a52; border-bottom: 0; }
.banks { display: flex; gap: 20px; margin-top: 40px; padding-top: 20px; border-top: 2px solid #e0e0e0; }
.bank { flex: 1; font-size: 14px; line-height: 1.6; }
.bank strong { color: #1a2a52; font-size: 15px; }
.thanks { margin-top: 50px; text-align: center; font-weight: 600; color: #95a5a6; }
@media print {
  .actions { display: none; }
  body { padding: 0; background: #fff; }
  .sheet { padding: 0; border-radius: 0; box-shadow: none; }
}
";

/// Escapes text for safe inclusion in HTML content and attributes.
#[must_use]
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Formats an amount as dollars with two decimals.
#[must_use]
pub fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Amount billed by the document, re-summed from the items.
#[must_use]
pub fn due_amount(items: &[LineItem]) -> f64 {
    items.iter().map(LineItem::total).sum()
}

/// Escapes each line and joins them with `<br>`.
fn lines_html(text: &str) -> String {
    text.lines()
        .map(escape_html)
        .collect::<Vec<_>>()
        .join("<br>")
}

fn item_row(item: &LineItem) -> String {
    let description = item
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .map(|d| {
            let bullets = d
                .lines()
                .map(|line| format!("- {}", escape_html(line)))
                .collect::<Vec<_>>()
                .join("<br>");
            format!("<br><span class=\"desc\">{bullets}</span>")
        })
        .unwrap_or_default();

    format!(
        "<tr><td>{title}{description}</td><td class=\"num\">{qty}</td>\
         <td class=\"num\">{price}</td><td class=\"num\">{total}</td></tr>\n",
        title = escape_html(&item.title),
        qty = item.quantity,
        price = format_money(item.unit_price),
        total = format_money(item.total()),
    )
}

/// Path segment for the PDF link. Only URL-safe characters survive, so the
/// value can sit in an attribute without further quoting.
fn pdf_label(number: &str) -> String {
    let label: String = number
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if label.trim_matches('.').is_empty() {
        "invoice".to_string()
    } else {
        label
    }
}

/// First line in bold, the rest plain.
fn bank_block(info: &str) -> Option<String> {
    if info.trim().is_empty() {
        return None;
    }
    let mut lines = info.lines();
    let heading = lines.next().unwrap_or_default();
    let mut parts = vec![format!("<strong>{}</strong>", escape_html(heading))];
    parts.extend(lines.map(escape_html));
    Some(format!("<div class=\"bank\">{}</div>", parts.join("<br>")))
}

fn bill_to(client: Option<&Client>) -> String {
    let Some(client) = client else {
        return String::new();
    };
    let mut parts = vec![escape_html(&client.contact_person)];
    for field in [&client.address, &client.email, &client.phone] {
        if let Some(value) = field.as_deref().filter(|v| !v.trim().is_empty()) {
            parts.push(lines_html(value));
        }
    }
    parts.join("<br>")
}

/// Renders the printable invoice page.
///
/// A missing client (dangling reference) leaves the "Bill To" block empty.
#[must_use]
pub fn render_invoice(
    invoice: &Invoice,
    client: Option<&Client>,
    company: &CompanyProfile,
    items: &[LineItem],
) -> String {
    let total = due_amount(items);
    let half = total / 2.0;
    let number = escape_html(&invoice.invoice_number);
    let label = pdf_label(&invoice.invoice_number);

    let watermark = invoice
        .status
        .watermark()
        .map(|text| {
            format!(
                "<div class=\"watermark {}\">{text}</div>\n",
                text.to_ascii_lowercase()
            )
        })
        .unwrap_or_default();

    let rows: String = items.iter().map(item_row).collect();
    let banks: String = [&company.bank_info_1, &company.bank_info_2]
        .into_iter()
        .filter_map(|info| bank_block(info))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{number}</title>
<style>{page}{STYLE}</style>
</head>
<body class="invoice-page {status}">
{watermark}<div class="sheet">
<div class="actions">
<button type="button" onclick="window.print()">Print</button>
<a href="/api/invoices/{id}/pdf/{label}" target="_blank" rel="noopener">Download PDF</a>
</div>
<div class="head">
<div>
<h1>Invoice</h1>
<div class="muted"><strong>{company_name}</strong><br>{company_address}</div>
</div>
<div class="due">Invoice Due<br>{due}</div>
</div>
<div class="parties">
<div><strong>Bill To:</strong><br>{bill_to}</div>
<div><strong>Invoice #:</strong> {number}<br><strong>Date:</strong> {date}</div>
</div>
<table>
<thead><tr><th>Description</th><th class="num">Qty</th><th class="num">Price</th><th class="num">Total</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<div class="totals">
<div><span>Total</span><strong>{due}</strong></div>
<div><span>Deposit (50%)</span><span>{half}</span></div>
<div class="final"><span>Remaining Balance (50%)</span><span>{half}</span></div>
</div>
<div class="banks">{banks}</div>
<div class="thanks">Thank you for your business!</div>
</div>
</body>
</html>
"#,
        page = PageSetup::default().css(),
        status = invoice.status,
        id = invoice.id,
        company_name = escape_html(&company.name),
        company_address = lines_html(&company.address),
        due = format_money(total),
        half = format_money(half),
        bill_to = bill_to(client),
        date = invoice.invoice_date.format("%Y-%m-%d"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::InvoiceStatus;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn invoice(status: InvoiceStatus) -> Invoice {
        Invoice {
            id: 7,
            invoice_number: "Invoice-250114A".to_string(),
            client_id: Some(1),
            project: "Website".to_string(),
            status,
            invoice_date: NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
            subtotal: 150.0,
            notes: String::new(),
            created_at: None,
            paid_at: None,
            advance_paid_at: None,
        }
    }

    fn client() -> Client {
        Client {
            id: 1,
            contact_person: "Jane Doe".to_string(),
            email: Some("jane@example.com".to_string()),
            phone: None,
            address: Some("1 Main St\nParamaribo".to_string()),
        }
    }

    fn company() -> CompanyProfile {
        CompanyProfile {
            name: "Acme Studio".to_string(),
            address: "Kernkampweg 10".to_string(),
            bank_info_1: "Hakrinbank\nUSD 123456\nSWIFT HAKRSRPA".to_string(),
            ..CompanyProfile::default()
        }
    }

    fn items() -> Vec<LineItem> {
        vec![
            LineItem {
                title: "Design".to_string(),
                description: Some("Logo\nColour palette".to_string()),
                quantity: 2,
                unit_price: 50.0,
            },
            LineItem {
                title: "Hosting".to_string(),
                description: None,
                quantity: 1,
                unit_price: 50.0,
            },
        ]
    }

    #[rstest]
    #[case(InvoiceStatus::Paid, true, false)]
    #[case(InvoiceStatus::Unpaid, false, true)]
    #[case(InvoiceStatus::Advance, false, false)]
    fn test_watermark_follows_status(
        #[case] status: InvoiceStatus,
        #[case] paid: bool,
        #[case] unpaid: bool,
    ) {
        let html = render_invoice(&invoice(status), Some(&client()), &company(), &items());
        assert_eq!(html.contains(">PAID<"), paid);
        assert_eq!(html.contains("UNPAID"), unpaid);
    }

    #[test]
    fn test_totals_block() {
        let html = render_invoice(
            &invoice(InvoiceStatus::Unpaid),
            Some(&client()),
            &company(),
            &items(),
        );
        assert!(html.contains("Invoice Due<br>$150.00"));
        assert!(html.contains("<span>Deposit (50%)</span><span>$75.00</span>"));
        assert!(html.contains("<span>Remaining Balance (50%)</span><span>$75.00</span>"));
    }

    #[test]
    fn test_total_comes_from_items_not_stored_subtotal() {
        let mut stale = invoice(InvoiceStatus::Unpaid);
        stale.subtotal = 999.0;
        let html = render_invoice(&stale, None, &company(), &items());
        assert!(html.contains("$150.00"));
        assert!(!html.contains("$999.00"));
    }

    #[test]
    fn test_item_rows() {
        let html = render_invoice(&invoice(InvoiceStatus::Paid), None, &company(), &items());
        assert!(html.contains("Design<br><span class=\"desc\">- Logo<br>- Colour palette</span>"));
        assert!(html.contains("<td class=\"num\">2</td>"));
        assert!(html.contains("<td class=\"num\">$50.00</td><td class=\"num\">$100.00</td>"));
    }

    #[test]
    fn test_bank_block_emphasizes_first_line() {
        let html = render_invoice(&invoice(InvoiceStatus::Paid), None, &company(), &[]);
        assert!(html.contains(
            "<div class=\"bank\"><strong>Hakrinbank</strong><br>USD 123456<br>SWIFT HAKRSRPA</div>"
        ));
        assert_eq!(html.matches("class=\"bank\"").count(), 1);
    }

    #[test]
    fn test_bank_block_with_blank_first_line() {
        let mut profile = company();
        profile.bank_info_2 = "\nIBAN SR00 0001".to_string();
        let html = render_invoice(&invoice(InvoiceStatus::Paid), None, &profile, &[]);
        assert!(html.contains("<div class=\"bank\"><strong></strong><br>IBAN SR00 0001</div>"));
        assert_eq!(html.matches("class=\"bank\"").count(), 2);

        profile.bank_info_2 = "  \n ".to_string();
        let html = render_invoice(&invoice(InvoiceStatus::Paid), None, &profile, &[]);
        assert_eq!(html.matches("class=\"bank\"").count(), 1);
    }

    #[test]
    fn test_download_link() {
        let html = render_invoice(&invoice(InvoiceStatus::Unpaid), None, &company(), &[]);
        assert!(html.contains("href=\"/api/invoices/7/pdf/Invoice-250114A\""));
    }

    #[test]
    fn test_invoice_number_cannot_inject_script() {
        let mut hostile = invoice(InvoiceStatus::Unpaid);
        hostile.invoice_number =
            "x');alert(document.cookie);//\"><img src=x onerror=alert(1)>".to_string();
        let html = render_invoice(&hostile, None, &company(), &[]);

        assert!(!html.contains("<img"));
        assert!(!html.contains("window.open"));
        let handlers: Vec<&str> = html
            .split("onclick=\"")
            .skip(1)
            .filter_map(|rest| rest.split('"').next())
            .collect();
        assert_eq!(handlers, ["window.print()"]);
        assert!(html.contains("<title>x&#39;);alert(document.cookie);//&quot;&gt;&lt;img"));
        assert!(html.contains(
            "href=\"/api/invoices/7/pdf/x___alert_document.cookie_______img_src_x_onerror_alert_1__\""
        ));
    }

    #[rstest]
    #[case("Invoice-250114A", "Invoice-250114A")]
    #[case("a b/c", "a_b_c")]
    #[case("..", "invoice")]
    #[case("", "invoice")]
    fn test_pdf_label(#[case] number: &str, #[case] expected: &str) {
        assert_eq!(pdf_label(number), expected);
    }

    #[test]
    fn test_missing_client_leaves_bill_to_empty() {
        let html = render_invoice(&invoice(InvoiceStatus::Unpaid), None, &company(), &items());
        assert!(html.contains("<strong>Bill To:</strong><br></div>"));
    }

    #[test]
    fn test_bill_to_lists_client_details() {
        let html = render_invoice(
            &invoice(InvoiceStatus::Unpaid),
            Some(&client()),
            &company(),
            &items(),
        );
        assert!(html.contains("Jane Doe<br>1 Main St<br>Paramaribo<br>jane@example.com"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut evil = client();
        evil.contact_person = "<script>alert('x')</script>".to_string();
        let html = render_invoice(&invoice(InvoiceStatus::Unpaid), Some(&evil), &company(), &[]);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn test_print_page_setup() {
        let html = render_invoice(&invoice(InvoiceStatus::Unpaid), None, &company(), &[]);
        assert!(html.contains("@page { size: A4; margin: 20mm 15mm 20mm 15mm; }"));
        assert!(html.contains("print-color-adjust: exact"));
        assert!(html.contains(".actions { display: none; }"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let a = render_invoice(&invoice(InvoiceStatus::Advance), Some(&client()), &company(), &items());
        let b = render_invoice(&invoice(InvoiceStatus::Advance), Some(&client()), &company(), &items());
        assert_eq!(a, b);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a & b < "c" > 'd'"#), "a &amp; b &lt; &quot;c&quot; &gt; &#39;d&#39;");
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1234.5), "$1234.50");
        assert_eq!(format_money(0.0), "$0.00");
    }
}
