use crate::model::{DocumentKind, DocumentModel};

/// Conventional output file name for a generated document.
///
/// Proposals: `Proposal_<Party_Name>_<timestamp>.<ext>`, whitespace runs in
/// the party name replaced by `_`. Quotations: `quotation-<last 6 digits of
/// timestamp>.<ext>`. `timestamp_ms` is milliseconds since the Unix epoch.
pub fn suggested_file_name(doc: &DocumentModel, timestamp_ms: i64, extension: &str) -> String {
    let extension = extension.trim_start_matches('.');
    let stamp = timestamp_ms.to_string();
    match doc.kind {
        DocumentKind::Proposal { .. } => {
            let party = doc.contact.party_name().split_whitespace().collect::<Vec<_>>().join("_");
            format!("{}_{party}_{stamp}.{extension}", doc.kind.name())
        }
        DocumentKind::Quotation => {
            let start = stamp.len().saturating_sub(6);
            format!(
                "{}-{}.{extension}",
                doc.kind.name().to_lowercase(),
                &stamp[start..]
            )
        }
    }
}

/// [`suggested_file_name`] stamped with the current wall-clock time.
pub fn suggested_file_name_now(doc: &DocumentModel, extension: &str) -> String {
    suggested_file_name(doc, chrono::Utc::now().timestamp_millis(), extension)
}
