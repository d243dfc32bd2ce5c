//! Receipt layout
//!
//! Sections, top to bottom: store header, title, invoice meta, buyer, items,
//! totals, GST summary, then optional footer and terms.

use super::{Columns, DOUBLE_SEPARATOR, LineWriter, MIN_TEXT_COLUMN, SEPARATOR, wrap};
use crate::money::{format_amount, format_quantity, format_rate, format_signed};
use crate::tax::InvoiceTotals;
use kirana_printer::{Align, TextLine, ellipsize, text_width};
use serde::{Deserialize, Serialize};
use shared::{Invoice, PrinterProfile, StoreProfile, ValidationResult, gstin::state_name};
use tracing::{debug, instrument};

const TITLE: &str = "TAX INVOICE";
const WALK_IN: &str = "Walk-in Customer";
const PLACE_OF_SUPPLY: &str = "Place of Supply:";
const RATE_HEADER: &str = "RATE";

/// Free text printed after the totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReceiptExtras {
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub terms: Option<String>,
}

/// Lay out a priced invoice as fixed-width lines
///
/// Fails if the printer width is not supported or the buyer GSTIN is
/// malformed.
#[instrument(skip_all, fields(invoice = %invoice.invoice_number))]
pub fn layout_receipt(
    invoice: &Invoice,
    totals: &InvoiceTotals,
    store: &StoreProfile,
    printer: &PrinterProfile,
    extras: &ReceiptExtras,
) -> ValidationResult<Vec<TextLine>> {
    let width = printer.columns()?;
    invoice.buyer.validate()?;

    let mut w = LineWriter::new(width);
    store_header(&mut w, store);
    invoice_meta(&mut w, invoice);
    buyer_block(&mut w, invoice, store)?;
    item_block(&mut w, invoice, totals, printer);
    totals_block(&mut w, totals, printer);
    gst_summary(&mut w, totals);

    if let Some(footer) = extras.footer.as_deref().filter(|f| !f.trim().is_empty()) {
        w.wrapped(footer, Align::Center);
    }
    if let Some(terms) = extras.terms.as_deref().filter(|t| !t.trim().is_empty()) {
        w.wrapped(terms, Align::Left);
    }

    Ok(w.finish())
}

fn store_header(w: &mut LineWriter, store: &StoreProfile) {
    for piece in wrap(&store.legal_name, w.width()) {
        let line = w.center(&piece).bold().double_height();
        w.push(line);
    }
    for address in &store.address_lines {
        w.wrapped(address, Align::Center);
    }
    if !store.gstin.trim().is_empty() {
        w.wrapped(&format!("GSTIN: {}", store.gstin.trim()), Align::Center);
    }
    if let Some(phone) = store.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        w.wrapped(&format!("Ph: {phone}"), Align::Center);
    }
    w.separator(DOUBLE_SEPARATOR);
    let title = w.center(TITLE).bold();
    w.push(title);
    w.separator(SEPARATOR);
}

fn invoice_meta(w: &mut LineWriter, invoice: &Invoice) {
    let number = w.label_value("Invoice No:", &invoice.invoice_number);
    let date = w.label_value(
        "Date:",
        &invoice.invoice_date.format("%d-%m-%Y").to_string(),
    );
    w.push(number).push(date);
    if let Some(method) = invoice.payment_method.as_deref().filter(|m| !m.is_empty()) {
        let line = w.label_value("Payment:", method);
        w.push(line);
    }
}

fn buyer_block(w: &mut LineWriter, invoice: &Invoice, store: &StoreProfile) -> ValidationResult<()> {
    let buyer = &invoice.buyer;
    let name = match buyer.name.trim() {
        "" => WALK_IN,
        name => name,
    };
    let line = w.label_value("Bill To:", name);
    w.push(line);

    if let Some(phone) = buyer.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        let line = w.label_value("Phone:", phone.trim());
        w.push(line);
    }
    if let Some(tax_id) = buyer.tax_id.as_deref().filter(|t| !t.trim().is_empty()) {
        let line = w.label_value("GSTIN:", tax_id.trim());
        w.push(line);
    }

    // Walk-in sales are supplied in the seller's state
    let place = match buyer.resolved_state_code()? {
        Some(code) => Some(code),
        None => store.seller_state_code().ok(),
    };
    if let Some(code) = place {
        let value = match state_name(&code) {
            Some(name) if text_width(name) + code.len() + 4 + PLACE_OF_SUPPLY.len() <= w.width() => {
                format!("{name} ({code})")
            }
            _ => code,
        };
        let line = w.label_value(PLACE_OF_SUPPLY, &value);
        w.push(line);
    }
    w.separator(SEPARATOR);
    Ok(())
}

/// Widest quantity-and-unit text an item row may show
const QTY_WIDTH: usize = 8;

fn item_block(
    w: &mut LineWriter,
    invoice: &Invoice,
    totals: &InvoiceTotals,
    printer: &PrinterProfile,
) {
    let narrow = printer.is_narrow();
    let (headers, minimums): (Vec<String>, Vec<usize>) = if narrow {
        (vec!["QTY".into(), "AMOUNT".into()], vec![4, 9])
    } else {
        (vec!["QTY".into(), "RATE".into(), "AMOUNT".into()], vec![5, 9, 10])
    };

    let rows: Vec<Vec<String>> = invoice
        .lines
        .iter()
        .zip(&totals.line_breakdowns)
        .map(|(line, tax)| {
            let mut qty = format_quantity(line.quantity);
            if let Some(unit) = line.unit.as_deref() {
                qty.push_str(unit);
            }
            let qty = ellipsize(&qty, QTY_WIDTH);
            let amount = format_amount(tax.taxable);
            if narrow {
                vec![qty, amount]
            } else {
                vec![qty, format_amount(line.rate), amount]
            }
        })
        .collect();

    let columns = Columns::fit(
        w.width(),
        &minimums,
        std::iter::once(headers.as_slice()).chain(rows.iter().map(Vec::as_slice)),
    );
    // Amounts too wide for a table go on their own line under the name
    let stacked = !columns.fits(MIN_TEXT_COLUMN);
    if stacked {
        debug!(width = w.width(), "item columns overflow, stacking item rows");
    }

    let header = if stacked {
        w.label_value("ITEM", "AMOUNT")
    } else {
        w.left(&columns.row("ITEM", &headers))
    };
    w.push(header.bold());
    w.separator(SEPARATOR);

    for ((line, tax), row) in invoice.lines.iter().zip(&totals.line_breakdowns).zip(&rows) {
        if stacked {
            let name = w.left(&line.name);
            w.push(name);
            let detail = w.label_value(
                &format!("  {} x {}", row[0], format_amount(line.rate)),
                &format_amount(tax.taxable),
            );
            w.push(detail);
        } else {
            let item = w.left(&columns.row(&line.name, row));
            w.push(item);
        }
        if narrow {
            continue;
        }
        if let Some(hsn) = line.hsn_code.as_deref().filter(|h| !h.is_empty()) {
            let sub = w.left(&format!("  HSN {hsn}  GST {}%", format_rate(line.gst_rate)));
            w.push(sub);
        }
        if tax.discount > 0.0 {
            let sub = w.label_value(
                &format!("  Less {}% discount", format_rate(line.discount_percent)),
                &format!("-{}", format_amount(tax.discount)),
            );
            w.push(sub);
        }
    }
    w.separator(SEPARATOR);
}

fn totals_block(w: &mut LineWriter, totals: &InvoiceTotals, printer: &PrinterProfile) {
    let mut rows: Vec<(&str, String)> = vec![
        (
            "Items / Qty:",
            format!(
                "{} / {}",
                totals.line_count,
                format_quantity(totals.total_quantity)
            ),
        ),
        ("Subtotal:", format_amount(totals.subtotal)),
    ];
    if totals.discount_amount > 0.0 {
        rows.push(("Discount:", format!("-{}", format_amount(totals.discount_amount))));
    }
    rows.push(("Taxable Amount:", format_amount(totals.taxable_amount)));
    if totals.is_intrastate {
        rows.push(("CGST:", format_amount(totals.cgst)));
        rows.push(("SGST:", format_amount(totals.sgst)));
    } else {
        rows.push(("IGST:", format_amount(totals.igst)));
    }
    rows.push(("Round Off:", format_signed(totals.round_off)));

    for (label, value) in rows {
        let line = w.label_value(label, &value);
        w.push(line);
    }
    w.separator(SEPARATOR);

    let grand = format!(
        "{} {}",
        printer.currency_symbol,
        format_amount(totals.grand_total)
    );
    let line = w.label_value("GRAND TOTAL", &grand).bold();
    w.push(line);
    w.separator(DOUBLE_SEPARATOR);
}

fn gst_summary(w: &mut LineWriter, totals: &InvoiceTotals) {
    if totals.gst_summary.is_empty() {
        return;
    }
    let headers: Vec<String> = if totals.is_intrastate {
        vec!["TAXABLE".into(), "CGST".into(), "SGST".into()]
    } else {
        vec!["TAXABLE".into(), "IGST".into()]
    };
    let rows: Vec<(String, Vec<String>)> = totals
        .gst_summary
        .iter()
        .map(|row| {
            let rate = format!("{}%", format_rate(row.gst_rate));
            let values = if totals.is_intrastate {
                vec![
                    format_amount(row.taxable),
                    format_amount(row.cgst),
                    format_amount(row.sgst),
                ]
            } else {
                vec![format_amount(row.taxable), format_amount(row.igst)]
            };
            (rate, values)
        })
        .collect();

    let minimums: Vec<usize> = headers.iter().map(|h| text_width(h)).collect();
    let columns = Columns::fit(
        w.width(),
        &minimums,
        rows.iter().map(|(_, values)| values.as_slice()),
    );
    let rate_width = rows
        .iter()
        .map(|(rate, _)| text_width(rate))
        .chain(std::iter::once(text_width(RATE_HEADER)))
        .max()
        .unwrap_or(0);

    let title = w.center("GST SUMMARY").bold();
    w.push(title);

    if columns.fits(rate_width) {
        let header = w.left(&columns.row(RATE_HEADER, &headers));
        w.push(header);
        for (rate, values) in &rows {
            let line = w.left(&columns.row(rate, values));
            w.push(line);
        }
    } else {
        debug!(width = w.width(), "GST summary columns overflow, stacking rates");
        for (rate, values) in &rows {
            let line = w.label_value(&format!("GST {rate} taxable:"), &values[0]);
            w.push(line);
            for (name, value) in headers.iter().zip(values).skip(1) {
                let line = w.label_value(&format!("  {name}:"), value);
                w.push(line);
            }
        }
    }
    w.separator(SEPARATOR);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::{TaxContext, aggregate};
    use chrono::NaiveDate;
    use kirana_printer::ELLIPSIS;
    use shared::{Buyer, InvoiceLine, ValidationError};

    fn store() -> StoreProfile {
        StoreProfile {
            legal_name: "Sharma General Stores".into(),
            address_lines: vec!["12 MG Road, Shivajinagar".into(), "Pune 411005".into()],
            gstin: "27AAPFU0939F1ZV".into(),
            phone: Some("020 2553 0000".into()),
            state_code: None,
            upi_id: None,
        }
    }

    fn invoice(lines: Vec<InvoiceLine>) -> Invoice {
        Invoice {
            invoice_number: "INV-2024-0042".into(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            buyer: Buyer::default(),
            lines,
            payment_method: Some("UPI".into()),
        }
    }

    fn render(invoice: &Invoice, printer: &PrinterProfile, extras: &ReceiptExtras) -> Vec<TextLine> {
        let ctx = TaxContext::for_invoice(&store(), &invoice.buyer).unwrap();
        let totals = aggregate(&invoice.lines, &ctx).unwrap();
        layout_receipt(invoice, &totals, &store(), printer, extras).unwrap()
    }

    fn texts(lines: &[TextLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    fn assert_exact_width(lines: &[TextLine], width: usize) {
        for line in lines {
            assert_eq!(text_width(&line.text), width, "{:?}", line.text);
        }
    }

    #[test]
    fn test_narrow_long_name_truncated_amount_visible() {
        let name = "Premium Basmati Rice Extra Long Grain 5K";
        assert_eq!(name.chars().count(), 40);
        let inv = invoice(vec![InvoiceLine::new(name, 2.0, 45.0, 5.0)]);
        let lines = render(&inv, &PrinterProfile::narrow(), &ReceiptExtras::default());

        assert_exact_width(&lines, 32);
        let row = texts(&lines)
            .into_iter()
            .find(|t| t.starts_with("Premium"))
            .unwrap();
        assert!(row.contains(ELLIPSIS));
        assert!(row.ends_with("90.00"));
        assert!(!row.contains("5K"));
    }

    #[test]
    fn test_long_unit_keeps_name_and_amount() {
        let mut line = InvoiceLine::new("Rice", 2.0, 45.0, 5.0);
        line.unit = Some("packets-of-five-kilograms".into());
        let inv = invoice(vec![line]);
        let lines = render(&inv, &PrinterProfile::narrow(), &ReceiptExtras::default());

        assert_exact_width(&lines, 32);
        let row = texts(&lines)
            .into_iter()
            .find(|t| t.starts_with("Rice"))
            .unwrap();
        assert!(row.contains("2pack..."));
        assert!(row.ends_with("90.00"));
    }

    #[test]
    fn test_oversized_amount_stacks_item_rows() {
        let inv = invoice(vec![InvoiceLine::new("Rice", 2.0, 45.0, 5.0)]);
        let mut totals = aggregate(&inv.lines, &TaxContext::intrastate()).unwrap();
        totals.line_breakdowns[0].taxable = 1e20;
        let lines = layout_receipt(
            &inv,
            &totals,
            &store(),
            &PrinterProfile::narrow(),
            &ReceiptExtras::default(),
        )
        .unwrap();

        assert_exact_width(&lines, 32);
        let all = texts(&lines);
        let header = lines
            .iter()
            .find(|l| l.text.starts_with("ITEM"))
            .unwrap();
        assert!(header.bold);
        assert!(header.text.ends_with("AMOUNT"));
        let name = all.iter().position(|t| t.trim_end() == "Rice").unwrap();
        assert!(all[name + 1].ends_with("100000000000000000000.00"));
    }

    #[test]
    fn test_gst_summary_stacks_when_rate_column_overflows() {
        let inv = invoice(vec![InvoiceLine::new("Steel Almirah", 10.0, 150000.0, 18.0)]);
        let lines = render(&inv, &PrinterProfile::narrow(), &ReceiptExtras::default());

        assert_exact_width(&lines, 32);
        let all = texts(&lines);
        assert!(all.iter().any(|t| t.starts_with("GST 18% taxable:") && t.ends_with("1500000.00")));
        assert!(all.iter().any(|t| t.starts_with("  CGST:") && t.ends_with("135000.00")));
        assert!(all.iter().any(|t| t.starts_with("  SGST:") && t.ends_with("135000.00")));
        assert!(!all.iter().any(|t| t.starts_with("RATE")));

        let lines = render(&inv, &PrinterProfile::wide(), &ReceiptExtras::default());
        let all = texts(&lines);
        assert!(all.iter().any(|t| t.starts_with("18%") && t.ends_with("135000.00")));
    }

    #[test]
    fn test_wide_layout_has_rate_column_and_sub_lines() {
        let inv = invoice(vec![
            InvoiceLine::new("Ghee 1L", 1.0, 620.0, 12.0)
                .with_discount(10.0)
                .with_hsn("0405"),
            InvoiceLine::new("Toor Dal", 2.0, 110.0, 5.0),
        ]);
        let lines = render(&inv, &PrinterProfile::wide(), &ReceiptExtras::default());
        assert_exact_width(&lines, 48);

        let all = texts(&lines);
        let header = all.iter().find(|t| t.starts_with("ITEM")).unwrap();
        assert!(header.contains("RATE"));
        assert!(all.iter().any(|t| t.starts_with("Ghee 1L") && t.contains("620.00") && t.ends_with("558.00")));
        assert!(all.iter().any(|t| t.starts_with("  HSN 0405  GST 12%")));
        assert!(all.iter().any(|t| t.starts_with("  Less 10% discount") && t.ends_with("-62.00")));
    }

    #[test]
    fn test_wide_42_columns() {
        let inv = invoice(vec![InvoiceLine::new("Sugar", 1.0, 48.0, 5.0)]);
        let lines = render(
            &inv,
            &PrinterProfile::wide().with_columns(42),
            &ReceiptExtras::default(),
        );
        assert_exact_width(&lines, 42);
    }

    #[test]
    fn test_totals_block_intrastate() {
        let inv = invoice(vec![InvoiceLine::new("Rice", 2.0, 45.0, 5.0)]);
        let lines = render(&inv, &PrinterProfile::narrow(), &ReceiptExtras::default());
        let all = texts(&lines);

        assert!(all.iter().any(|t| t.starts_with("CGST:") && t.ends_with("2.25")));
        assert!(all.iter().any(|t| t.starts_with("SGST:") && t.ends_with("2.25")));
        assert!(!all.iter().any(|t| t.starts_with("IGST:")));
        assert!(all.iter().any(|t| t.starts_with("Round Off:") && t.ends_with("+0.50")));

        let grand = lines.iter().find(|l| l.text.starts_with("GRAND TOTAL")).unwrap();
        assert!(grand.bold);
        assert!(grand.text.ends_with("Rs. 95.00"));
        assert!(all.iter().any(|t| t.starts_with("Place of Supply:") && t.ends_with(" 27")));
    }

    #[test]
    fn test_totals_block_interstate() {
        let mut inv = invoice(vec![
            InvoiceLine::new("Mixer Grinder", 1.0, 1000.0, 18.0).with_discount(10.0),
        ]);
        inv.buyer = Buyer {
            name: "Asha Traders".into(),
            tax_id: Some("29AAGCB7383J1Z4".into()),
            ..Default::default()
        };
        let lines = render(&inv, &PrinterProfile::wide(), &ReceiptExtras::default());
        let all = texts(&lines);

        assert!(all.iter().any(|t| t.starts_with("IGST:") && t.ends_with("162.00")));
        assert!(!all.iter().any(|t| t.starts_with("CGST:")));
        assert!(all.iter().any(|t| t.starts_with("Discount:") && t.ends_with("-100.00")));
        assert!(all.iter().any(|t| t.starts_with("GRAND TOTAL") && t.ends_with("Rs. 1062.00")));
        assert!(all.iter().any(|t| t.starts_with("Place of Supply:") && t.ends_with("Karnataka (29)")));
        assert!(all.iter().any(|t| t.starts_with("GSTIN:") && t.ends_with("29AAGCB7383J1Z4")));
    }

    #[test]
    fn test_sections_bounded_by_separators() {
        let inv = invoice(vec![InvoiceLine::new("Rice", 2.0, 45.0, 5.0)]);
        let lines = render(&inv, &PrinterProfile::narrow(), &ReceiptExtras::default());
        let separators = lines
            .iter()
            .filter(|l| l.text.chars().all(|c| c == SEPARATOR) || l.text.chars().all(|c| c == DOUBLE_SEPARATOR))
            .count();
        assert!(separators >= 7);

        let header = &lines[0];
        assert!(header.bold && header.double_height);
        assert_eq!(header.align, Align::Center);
        assert!(texts(&lines).iter().any(|t| t.trim() == TITLE));
        assert!(texts(&lines).iter().any(|t| t.trim() == "GST SUMMARY"));
    }

    #[test]
    fn test_footer_and_terms_wrapped() {
        let inv = invoice(vec![InvoiceLine::new("Rice", 1.0, 45.0, 5.0)]);
        let extras = ReceiptExtras {
            footer: Some("Thank you for shopping with us!".into()),
            terms: Some("Goods once sold will not be taken back or exchanged.".into()),
        };
        let lines = render(&inv, &PrinterProfile::narrow(), &extras);
        assert_exact_width(&lines, 32);

        let all = texts(&lines);
        assert!(all.iter().any(|t| t.trim() == "Thank you for shopping with us!"));
        let tail: String = all[all.len() - 2..].concat();
        assert!(tail.starts_with("Goods once sold will not be take"));
        assert!(tail.contains("n back or exchanged."));
    }

    #[test]
    fn test_walk_in_buyer() {
        let inv = invoice(vec![InvoiceLine::new("Rice", 1.0, 45.0, 5.0)]);
        let lines = render(&inv, &PrinterProfile::narrow(), &ReceiptExtras::default());
        assert!(texts(&lines).iter().any(|t| t.starts_with("Bill To:") && t.ends_with(WALK_IN)));
    }

    #[test]
    fn test_malformed_buyer_gstin_rejected() {
        let mut inv = invoice(vec![InvoiceLine::new("Rice", 1.0, 45.0, 5.0)]);
        let totals = aggregate(&inv.lines, &TaxContext::intrastate()).unwrap();
        inv.buyer.tax_id = Some("29AAGCB7383J1Z5".into());

        let result = layout_receipt(
            &inv,
            &totals,
            &store(),
            &PrinterProfile::narrow(),
            &ReceiptExtras::default(),
        );
        assert!(matches!(result, Err(ValidationError::InvalidTaxId { .. })));
    }

    #[test]
    fn test_unsupported_width_rejected() {
        let inv = invoice(vec![]);
        let totals = aggregate(&inv.lines, &TaxContext::intrastate()).unwrap();
        let result = layout_receipt(
            &inv,
            &totals,
            &store(),
            &PrinterProfile::wide().with_columns(36),
            &ReceiptExtras::default(),
        );
        assert_eq!(result, Err(ValidationError::InvalidPrinterWidth(36)));
    }
}
