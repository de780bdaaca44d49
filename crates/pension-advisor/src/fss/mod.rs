//! FSS OpenAPI Record Source
//!
//! The upstream is the financial regulator's integrated pension portal:
//! twelve HTTP GET endpoints returning JSON envelopes with a status code
//! and a record list. Status conventions vary across endpoints, so the
//! envelope is normalized in one place (`RecordSet::from_value`) instead
//! of replicating the inconsistency at every call site.

mod client;
mod demo;

pub use client::{FssClient, SourceConfig};
pub use demo::StaticPensionSource;

#[cfg(test)]
pub use demo::FailingPensionSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::record::Record;

/// The single success marker after normalization
pub const SUCCESS_CODE: &str = "000";

/// Errors at the record-source boundary.
///
/// Every upstream failure becomes one of these values; none of them is
/// ever allowed to propagate as a panic, and none is retried.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Network-level failure (DNS, connect, timeout, non-2xx transport)
    #[error("Upstream request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Upstream answered with a non-success status code
    #[error("Upstream status {code}: {message}")]
    Status { code: String, message: String },

    /// Body could not be interpreted as a record envelope
    #[error("Upstream response not decodable: {0}")]
    Decode(String),
}

/// One FSS OpenAPI operation and its URL path
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// Pension-savings fee/return rates per company
    SavingsCompanies,
    /// Pension-savings fee/return rates per product
    SavingsProducts,
    /// Principal-guaranteed pension-savings insurance products
    GuaranteedInsurance,
    /// Retirement-pension operator performance
    RetirementPerformance,
    /// Retirement-pension total cost burden ratios
    RetirementCost,
    /// Retirement-pension customized fee comparison
    CustomFees,
    /// Principal-guaranteed product supply status per operator
    GuaranteedSupply,
    /// Principal-guaranteed retirement-pension products
    GuaranteedProducts,
    /// Overall pension reserve statistics
    PensionStats,
    /// Public pension statistics
    PublicPensionStats,
    /// Personal pension statistics
    PersonalPensionStats,
    /// Retirement pension statistics
    RetirementPensionStats,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::SavingsCompanies => "psCorpList.json",
            Endpoint::SavingsProducts => "psProdList.json",
            Endpoint::GuaranteedInsurance => "psGuaranteedProdList.json",
            Endpoint::RetirementPerformance => "rpCorpResultList.json",
            Endpoint::RetirementCost => "rpCorpBurdenRatioList.json",
            Endpoint::CustomFees => "rpCorpCustomFeeList.json",
            Endpoint::GuaranteedSupply => "rpGuaranteedProdSupplyList.json",
            Endpoint::GuaranteedProducts => "rpGuaranteedProdList.json",
            Endpoint::PensionStats => "pensionStat.json",
            Endpoint::PublicPensionStats => "publicPensionStat.json",
            Endpoint::PersonalPensionStats => "personalPensionStat.json",
            Endpoint::RetirementPensionStats => "retirementPensionStat.json",
        }
    }
}

/// Per-call query filters. Only the fields an endpoint understands are
/// honored upstream; the access key is appended by the client, never here.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SourceQuery {
    pub year: Option<String>,
    pub quarter: Option<String>,
    pub area_code: Option<String>,
    pub sys_type: Option<String>,
    pub term: Option<String>,
    pub reserve: Option<String>,
    pub channel_code: Option<String>,
    pub product_type: Option<String>,
    pub report_date: Option<String>,
    pub stat_type: Option<String>,
}

impl SourceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn quarter(mut self, quarter: impl Into<String>) -> Self {
        self.quarter = Some(quarter.into());
        self
    }

    pub fn area_code(mut self, area_code: impl Into<String>) -> Self {
        self.area_code = Some(area_code.into());
        self
    }

    pub fn sys_type(mut self, sys_type: impl Into<String>) -> Self {
        self.sys_type = Some(sys_type.into());
        self
    }

    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn reserve(mut self, reserve: impl Into<String>) -> Self {
        self.reserve = Some(reserve.into());
        self
    }

    pub fn channel_code(mut self, channel_code: impl Into<String>) -> Self {
        self.channel_code = Some(channel_code.into());
        self
    }

    pub fn product_type(mut self, product_type: impl Into<String>) -> Self {
        self.product_type = Some(product_type.into());
        self
    }

    pub fn report_date(mut self, report_date: impl Into<String>) -> Self {
        self.report_date = Some(report_date.into());
        self
    }

    pub fn stat_type(mut self, stat_type: impl Into<String>) -> Self {
        self.stat_type = Some(stat_type.into());
        self
    }

    /// Upstream query-parameter pairs in the upstream's key spelling
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let mut push = |key, value: &Option<String>| {
            if let Some(v) = value {
                params.push((key, v.clone()));
            }
        };

        push("year", &self.year);
        push("quarter", &self.quarter);
        push("areaCode", &self.area_code);
        push("sysType", &self.sys_type);
        push("term", &self.term);
        push("reserve", &self.reserve);
        push("channelCode", &self.channel_code);
        push("productType", &self.product_type);
        push("reportDate", &self.report_date);
        push("statType", &self.stat_type);

        params
    }
}

/// Normalized response envelope: status, message and the record list
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecordSet {
    pub code: String,
    pub message: String,
    pub count: usize,
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Normalize a raw upstream body.
    ///
    /// Accepts the status code under `code`, `resultCode` or
    /// `result.code`, and the record list under `list` or `result.list`.
    /// A body carrying a list but no code counts as success; a body with
    /// neither is undecodable.
    pub fn from_value(body: &Value) -> Result<Self, SourceError> {
        let obj = body
            .as_object()
            .ok_or_else(|| SourceError::Decode("Body is not a JSON object".into()))?;

        let nested = obj.get("result").and_then(Value::as_object);

        let code = obj
            .get("code")
            .or_else(|| obj.get("resultCode"))
            .or_else(|| nested.and_then(|r| r.get("code")))
            .map(value_as_code);

        let message = obj
            .get("message")
            .or_else(|| nested.and_then(|r| r.get("message")))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let list = obj
            .get("list")
            .or_else(|| nested.and_then(|r| r.get("list")))
            .and_then(Value::as_array);

        let code = match (code, list) {
            (Some(c), _) => c,
            (None, Some(_)) => SUCCESS_CODE.to_string(),
            (None, None) => {
                return Err(SourceError::Decode(
                    "Body carries neither a status code nor a record list".into(),
                ))
            }
        };

        if code != SUCCESS_CODE {
            return Err(SourceError::Status { code, message });
        }

        let records: Vec<Record> = list
            .map(|items| {
                items
                    .iter()
                    .filter(|v| v.is_object())
                    .map(|v| Record::from_value(v.clone()))
                    .collect()
            })
            .unwrap_or_default();

        let count = obj
            .get("count")
            .and_then(Value::as_u64)
            .map_or(records.len(), |c| c as usize);

        Ok(Self {
            code,
            message,
            count,
            records,
        })
    }
}

/// Status codes arrive as strings on most endpoints and numbers on a few
fn value_as_code(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Record source seam (Strategy pattern).
///
/// `FssClient` talks to the live OpenAPI; `StaticPensionSource` serves
/// bundled rows for tests and demo mode.
#[async_trait]
pub trait PensionSource: Send + Sync {
    /// Fetch one endpoint with the given filters
    async fn fetch(&self, endpoint: Endpoint, query: &SourceQuery)
        -> Result<RecordSet, SourceError>;

    /// Check if the source is reachable
    async fn health_check(&self) -> bool {
        self.fetch(Endpoint::PensionStats, &SourceQuery::new())
            .await
            .is_ok()
    }

    /// Source name (for logging)
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_envelope() {
        let body = json!({
            "code": "000",
            "message": "OK",
            "count": 2,
            "list": [{"company": "A"}, {"company": "B"}],
        });

        let set = RecordSet::from_value(&body).unwrap();
        assert_eq!(set.code, SUCCESS_CODE);
        assert_eq!(set.count, 2);
        assert_eq!(set.records.len(), 2);
    }

    #[test]
    fn test_nested_envelope() {
        let body = json!({
            "result": {
                "code": "000",
                "message": "fine",
                "list": [{"company": "A"}],
            }
        });

        let set = RecordSet::from_value(&body).unwrap();
        assert_eq!(set.records.len(), 1);
        assert_eq!(set.message, "fine");
    }

    #[test]
    fn test_result_code_spelling_and_numeric_code() {
        let body = json!({"resultCode": 0, "list": []});
        // Numeric zero is not the "000" marker; it surfaces as a status error
        let err = RecordSet::from_value(&body).unwrap_err();
        assert!(matches!(err, SourceError::Status { code, .. } if code == "0"));
    }

    #[test]
    fn test_list_without_code_is_success() {
        let body = json!({"list": [{"company": "A"}]});
        let set = RecordSet::from_value(&body).unwrap();
        assert_eq!(set.code, SUCCESS_CODE);
        assert_eq!(set.count, 1);
    }

    #[test]
    fn test_error_code_surfaces() {
        let body = json!({"code": "999", "message": "service key invalid"});
        let err = RecordSet::from_value(&body).unwrap_err();
        match err {
            SourceError::Status { code, message } => {
                assert_eq!(code, "999");
                assert_eq!(message, "service key invalid");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[test]
    fn test_undecodable_body() {
        assert!(RecordSet::from_value(&json!("plain text")).is_err());
        assert!(RecordSet::from_value(&json!({"unrelated": true})).is_err());
    }

    #[test]
    fn test_query_param_spelling() {
        let query = SourceQuery::new()
            .year("2023")
            .quarter("4")
            .area_code("A")
            .sys_type("DC");

        let params = query.to_params();
        assert!(params.contains(&("year", "2023".into())));
        assert!(params.contains(&("areaCode", "A".into())));
        assert!(params.contains(&("sysType", "DC".into())));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(Endpoint::SavingsProducts.path(), "psProdList.json");
        assert_eq!(Endpoint::PensionStats.path(), "pensionStat.json");
    }
}
