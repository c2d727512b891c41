use thiserror::Error;

/// Errors produced by the query-configuration pipeline.
///
/// Lookup failures are absorbed where they occur and degrade to "no
/// answer" for the affected family; they appear here so the resolver can
/// log a structured reason before dropping them. Field-change conversion
/// errors are returned to the caller, which ignores the event.
#[derive(Debug, Error)]
pub enum FormError {
    // Resolution errors (absorbed, never escalated to the user)
    #[error("DNS-over-HTTPS request for {name} failed")]
    LookupTransport {
        name: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("DNS-over-HTTPS response for {name} was not valid dns-json")]
    LookupDecode {
        name: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("DNS lookup for {name} timed out after {timeout_ms} ms")]
    LookupTimedOut { name: String, timeout_ms: u64 },

    // Field-change conversion errors (event is ignored by the caller)
    #[error("unrecognized form field {field:?}")]
    UnknownField { field: String },
    #[error("value for form field {field:?} has the wrong shape")]
    FieldValueShape { field: String },
    #[error("unrecognized query type {value:?}")]
    UnknownQueryType { value: String },
}

impl FormError {
    /// Wrap a transport failure for `name`.
    pub fn lookup_transport(name: &str, source: reqwest::Error) -> Self {
        FormError::LookupTransport {
            name: name.to_owned(),
            source,
        }
    }

    /// Wrap a dns-json decode failure for `name`.
    pub fn lookup_decode(name: &str, source: reqwest::Error) -> Self {
        FormError::LookupDecode {
            name: name.to_owned(),
            source,
        }
    }
}
