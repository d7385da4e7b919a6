//! Plain-text rendition of a generated agreement.

use std::fmt::Write;

use crate::agreement::types::{parse_amount, AgreementDraft};

/// Format a dollar amount with thousands separators, e.g. `250,000.5`.
pub fn format_usd(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match cents {
        0 => grouped,
        c if c % 10 == 0 => format!("{grouped}.{}", c / 10),
        c => format!("{grouped}.{c:02}"),
    }
}

fn amount(raw: &str) -> String {
    parse_amount(raw).map(format_usd).unwrap_or_else(|| raw.to_string())
}

/// File name offered for download.
pub fn document_file_name(draft: &AgreementDraft) -> String {
    let safe: String = draft
        .property
        .property_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    format!("property_agreement_{safe}.txt")
}

/// Render the agreement text. Transaction fields read `N/A` until generated.
pub fn render_document(draft: &AgreementDraft) -> String {
    let tx = draft.transaction.as_ref();
    let na = || "N/A".to_string();
    let transaction_id = tx.map(|t| t.transaction_id.clone()).unwrap_or_else(na);
    let property = &draft.property;

    let mut out = String::new();
    let _ = writeln!(out, "REAL ESTATE PURCHASE AGREEMENT");
    let _ = writeln!(out);
    let _ = writeln!(out, "TRANSACTION ID: {transaction_id}");
    let _ = writeln!(out, "AGREEMENT ID: {}", tx.map(|t| t.agreement_id.clone()).unwrap_or_else(na));
    let _ = writeln!(out, "BLOCKCHAIN: {}", tx.map(|t| t.network.clone()).unwrap_or_else(na));
    let _ = writeln!(out, "BLOCK NUMBER: {}", tx.map(|t| t.block_number.to_string()).unwrap_or_else(na));
    let _ = writeln!(out, "TIMESTAMP: {}", tx.map(|t| t.timestamp.clone()).unwrap_or_else(na));
    let _ = writeln!(out, "DATE: {}", draft.agreement_date);
    let _ = writeln!(out);
    let _ = writeln!(out, "PROPERTY DETAILS:");
    let _ = writeln!(out, "Property ID: {}", property.property_id);
    let _ = writeln!(
        out,
        "Address: {}, {}, {} {}",
        property.address, property.city, property.state, property.zip_code
    );
    let _ = writeln!(out, "Description: {}", property.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "SELLER INFORMATION:");
    let _ = writeln!(out, "Name: {}", draft.seller_name);
    let _ = writeln!(out, "Email: {}", draft.seller_email);
    let _ = writeln!(out, "Address: {}", draft.seller_address);
    let _ = writeln!(out);
    let _ = writeln!(out, "BUYER INFORMATION:");
    let _ = writeln!(out, "Name: {}", draft.buyer_name);
    let _ = writeln!(out, "Email: {}", draft.buyer_email);
    let _ = writeln!(out, "Address: {}", draft.buyer_address);
    let _ = writeln!(out);
    let _ = writeln!(out, "AGREEMENT TERMS:");
    let _ = writeln!(out, "Purchase Price: ${}", amount(&draft.agreement_price));
    let _ = writeln!(out, "Down Payment: ${}", amount(&draft.down_payment));
    let _ = writeln!(out, "Closing Date: {}", draft.closing_date);
    let _ = writeln!(out, "Financing Details: {}", draft.financing_details);
    let _ = writeln!(out);
    let _ = writeln!(out, "SPECIAL CONDITIONS:");
    let _ = writeln!(out, "{}", draft.special_conditions);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "This agreement is secured by blockchain technology under transaction ID {transaction_id}."
    );
    let _ = writeln!(
        out,
        "Both parties have electronically signed this agreement on {}.",
        draft.agreement_date
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "SELLER SIGNATURE: {} (Signed electronically)", draft.seller_name);
    let _ = writeln!(out, "BUYER SIGNATURE: {} (Signed electronically)", draft.buyer_name);
    out
}
