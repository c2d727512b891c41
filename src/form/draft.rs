//! The query draft and its finalized snapshot.

use crate::device::DEFAULT_VRF;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

/// The diagnostic query types a looking-glass offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    BgpRoute,
    BgpCommunity,
    #[serde(rename = "bgp_aspath")]
    BgpAsPath,
    Ping,
    Traceroute,
}

impl QueryType {
    /// Whether this query operates on a single address, making a
    /// hostname target eligible for pre-resolution.
    pub fn requires_resolution(self) -> bool {
        matches!(
            self,
            QueryType::BgpRoute | QueryType::Ping | QueryType::Traceroute
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryType::BgpRoute => "bgp_route",
            QueryType::BgpCommunity => "bgp_community",
            QueryType::BgpAsPath => "bgp_aspath",
            QueryType::Ping => "ping",
            QueryType::Traceroute => "traceroute",
        }
    }
}

impl FromStr for QueryType {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "bgp_route" => Ok(QueryType::BgpRoute),
            "bgp_community" => Ok(QueryType::BgpCommunity),
            "bgp_aspath" => Ok(QueryType::BgpAsPath),
            "ping" => Ok(QueryType::Ping),
            "traceroute" => Ok(QueryType::Traceroute),
            _ => Err(()),
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The in-progress draft, mutated one field per change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDraft {
    pub query_location: Vec<String>,
    pub query_type: Option<QueryType>,
    pub query_vrf: String,
    pub query_target: String,
}

impl Default for QueryDraft {
    fn default() -> Self {
        Self {
            query_location: Vec::new(),
            query_type: None,
            query_vrf: DEFAULT_VRF.to_owned(),
            query_target: String::new(),
        }
    }
}

/// The snapshot handed to the execution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizedQuery {
    pub query_location: Vec<String>,
    pub query_type: QueryType,
    pub query_vrf: String,
    pub query_target: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl FinalizedQuery {
    /// Finalize a draft. The target is whitespace-trimmed here; nothing
    /// else is normalized.
    pub fn new(
        query_location: Vec<String>,
        query_type: QueryType,
        query_vrf: String,
        query_target: &str,
    ) -> Self {
        Self {
            query_location,
            query_type,
            query_vrf,
            query_target: query_target.trim().to_owned(),
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    /// The same query stamped with the current time, for requery.
    pub fn restamped(&self) -> Self {
        Self {
            timestamp: OffsetDateTime::now_utc(),
            ..self.clone()
        }
    }

    /// SHA-256 digest of the query fields, hex-encoded. Stable across
    /// restamps, so repeated submissions of the same query share a key.
    pub fn digest(&self) -> String {
        let repr = format!(
            "FinalizedQuery(query_location={:?}, query_type={}, query_vrf={}, query_target={})",
            self.query_location, self.query_type, self.query_vrf, self.query_target
        );
        let hash = Sha256::digest(repr.as_bytes());
        hash.iter().map(|byte| format!("{byte:02x}")).collect()
    }
}
