//! vCard 3.0 export of a resolved card.

use crate::CardRecord;

/// Render `record` as a vCard 3.0 document (CRLF line endings).
///
/// Missing fields render as empty values; a missing name renders as `Name`.
pub fn to_vcard(record: &CardRecord) -> String {
    let text = |value: &Option<String>| escape(value.as_deref().unwrap_or(""));
    let name = escape(record.full_name.as_deref().unwrap_or("Name"));

    let lines = [
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", name),
        format!("ORG:{}", text(&record.company_name)),
        format!("TITLE:{}", text(&record.job_title)),
        format!("TEL;TYPE=WORK:{}", text(&record.work_phone)),
        format!("EMAIL;TYPE=WORK:{}", text(&record.work_email)),
        format!("URL:{}", text(&record.website)),
        format!(
            "ADR;TYPE=WORK:;;{};{};{}",
            text(&record.address),
            text(&record.city),
            text(&record.country)
        ),
        format!("NOTE:{}", text(&record.about_me)),
        "END:VCARD".to_string(),
    ];

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

/// Download filename for the card's vCard.
pub fn vcard_filename(record: &CardRecord) -> String {
    match record.full_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => format!("{}.vcf", name),
        _ => "contact.vcf".to_string(),
    }
}

/// Escape a text value (RFC 2426 section 4).
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ',' => out.push_str("\\,"),
            ';' => out.push_str("\\;"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}
