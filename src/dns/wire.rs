//! dns-json wire format.
//!
//! The subset of the DNS-over-HTTPS JSON response this pipeline reads:
//! the question section (to know which record type was asked) and the
//! answer section. An absent `Answer` key means no result.

use serde::Deserialize;

/// A record type as it appears on the wire.
///
/// Providers differ here: some return the numeric RR type, some the
/// mnemonic. Answers are matched against the question by comparing this
/// value verbatim, whichever representation the endpoint chose.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecordType {
    Number(u16),
    Name(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct DohQuestion {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DohRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub data: String,
}

/// A DNS-over-HTTPS response body.
#[derive(Debug, Clone, Deserialize)]
pub struct DohResponse {
    #[serde(rename = "Question", default)]
    pub question: Vec<DohQuestion>,
    #[serde(rename = "Answer")]
    pub answer: Option<Vec<DohRecord>>,
}

/// Extract the answer value from a response.
///
/// Filters the answer records for the type matching the first question
/// and takes the first match's data. CNAME chains and other extra
/// records are skipped by the type filter.
pub fn find_answer(response: &DohResponse) -> Option<&str> {
    let question = response.question.first()?;
    response
        .answer
        .as_ref()?
        .iter()
        .find(|record| record.record_type == question.record_type)
        .map(|record| record.data.as_str())
}
