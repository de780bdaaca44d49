//! Static Pension Source
//!
//! Serves bundled sample rows shaped like live OpenAPI responses. Used by
//! tests and by the server's demo mode when no service key is configured.
//! Query filters are not applied - the live API filters server-side, and
//! the bundled sets are small enough to return whole.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Endpoint, PensionSource, RecordSet, SourceError, SourceQuery};
use crate::record::Record;

/// In-memory source with fixed sample rows per endpoint
#[derive(Clone, Debug, Default)]
pub struct StaticPensionSource;

impl StaticPensionSource {
    pub fn new() -> Self {
        Self
    }

    fn rows(endpoint: Endpoint) -> Vec<Value> {
        match endpoint {
            Endpoint::SavingsCompanies => vec![
                json!({"area": "Life Insurance", "company": "Samsung Life",
                       "avgFeeRate3": 1.05, "avgFeeRate5": 1.12,
                       "avgEarnRate3": 3.45, "avgEarnRate5": 3.10, "reserve": 182_350}),
                json!({"area": "Bank", "company": "KB Kookmin Bank",
                       "avgFeeRate3": 0.82, "avgFeeRate5": 0.88,
                       "avgEarnRate3": 2.95, "avgEarnRate5": 2.70, "reserve": 95_410}),
                json!({"area": "Securities", "company": "Mirae Asset Securities",
                       "avgFeeRate3": 0.74, "avgFeeRate5": 0.79,
                       "avgEarnRate3": 5.62, "avgEarnRate5": 4.88, "reserve": 88_200}),
                json!({"area": "Life Insurance", "company": "Hanwha Life",
                       "avgFeeRate3": 1.18, "avgFeeRate5": 1.21,
                       "avgEarnRate3": 3.02, "avgEarnRate5": 2.85, "reserve": 74_930}),
                json!({"area": "Bank", "company": "Shinhan Bank",
                       "avgFeeRate3": 0.85, "avgFeeRate5": 0.90,
                       "avgEarnRate3": 3.11, "avgEarnRate5": 2.92, "reserve": 81_760}),
                json!({"area": "Securities", "company": "Samsung Securities",
                       "avgFeeRate3": 0.77, "avgFeeRate5": 0.83,
                       "avgEarnRate3": 5.20, "avgEarnRate5": 4.55, "reserve": 63_540}),
            ],
            Endpoint::SavingsProducts => vec![
                json!({"company": "Mirae Asset Securities", "product": "Mirae Asset Pension Savings Fund Growth 1",
                       "productType": "fund", "avgFeeRate3": 0.45, "avgEarnRate3": 6.85,
                       "guarantees": "N", "balance": 12_450, "reserve": 11_980,
                       "sells": "Y", "launchDate": "2015-03-02"}),
                json!({"company": "Samsung Securities", "product": "Samsung Pension Savings Index Balanced",
                       "productType": "fund", "avgFeeRate3": 0.52, "avgEarnRate3": 5.40,
                       "guarantees": "N", "balance": 9_830, "reserve": 9_420,
                       "sells": "Y", "launchDate": "2016-07-11"}),
                json!({"company": "KB Kookmin Bank", "product": "KB Pension Savings Trust Stable",
                       "productType": "trust", "avgFeeRate3": 0.61, "avgEarnRate3": 3.10,
                       "guarantees": "N", "balance": 15_200, "reserve": 14_880,
                       "sells": "Y", "launchDate": "2012-01-16"}),
                json!({"company": "Samsung Life", "product": "Samsung Life Pension Savings Insurance Dividend 1",
                       "productType": "insurance", "avgFeeRate3": 1.21, "avgEarnRate3": 2.65,
                       "guarantees": "Y", "balance": 28_340, "reserve": 27_900,
                       "sells": "Y", "launchDate": "2008-05-19"}),
                json!({"company": "Hanwha Life", "product": "Hanwha Pension Savings Insurance Safe Plus",
                       "productType": "insurance", "avgFeeRate3": 1.34, "avgEarnRate3": 2.48,
                       "guarantees": "Y", "balance": 17_620, "reserve": 17_350,
                       "sells": "Y", "launchDate": "2010-11-08"}),
                json!({"company": "Shinhan Bank", "product": "Shinhan Pension Savings Trust Growth",
                       "productType": "trust", "avgFeeRate3": 0.58, "avgEarnRate3": 3.95,
                       "guarantees": "N", "balance": 8_110, "reserve": 7_890,
                       "sells": "Y", "launchDate": "2013-09-23"}),
                json!({"company": "Mirae Asset Securities", "product": "Mirae Asset Pension Savings Fund Legacy",
                       "productType": "fund", "avgFeeRate3": 0.92, "avgEarnRate3": 4.10,
                       "guarantees": "N", "balance": 3_420, "reserve": 3_300,
                       "sells": "N", "launchDate": "2009-02-02"}),
                json!({"company": "Samsung Life", "product": "Samsung Life Pension Savings Classic",
                       "productType": "insurance", "avgEarnRate3": 2.20,
                       "guarantees": "Y", "balance": 5_210, "reserve": 5_100,
                       "sells": "Y", "launchDate": "2005-06-27"}),
            ],
            Endpoint::GuaranteedInsurance => vec![
                json!({"company": "Samsung Life", "product": "Samsung Guaranteed Pension Insurance 1",
                       "productType": "insurance", "minGuaranteeRate": 1.75,
                       "channel": "agency", "sells": "Y"}),
                json!({"company": "Hanwha Life", "product": "Hanwha Guaranteed Pension Insurance Safe",
                       "productType": "insurance", "minGuaranteeRate": 1.50,
                       "channel": "online", "sells": "Y"}),
                json!({"company": "Kyobo Life", "product": "Kyobo Guaranteed Pension Insurance Plus",
                       "productType": "insurance", "minGuaranteeRate": 1.60,
                       "channel": "agency", "sells": "Y"}),
            ],
            Endpoint::RetirementPerformance => vec![
                json!({"company": "Samsung Life", "sysType": "DB",
                       "earnRate1": 4.12, "avgEarnRate3": 3.35, "avgEarnRate5": 2.98, "reserve": 412_000}),
                json!({"company": "KB Kookmin Bank", "sysType": "DC",
                       "earnRate1": 4.55, "avgEarnRate3": 3.71, "avgEarnRate5": 3.12, "reserve": 286_500}),
                json!({"company": "Mirae Asset Securities", "sysType": "IRP",
                       "earnRate1": 6.02, "avgEarnRate3": 4.48, "avgEarnRate5": 3.90, "reserve": 131_200}),
                json!({"company": "Shinhan Bank", "sysType": "DC",
                       "earnRate1": 4.31, "avgEarnRate3": 3.52, "avgEarnRate5": 3.05, "reserve": 264_800}),
            ],
            Endpoint::RetirementCost => vec![
                json!({"company": "Samsung Life", "year": "2023", "burdenRatio": 0.45, "totalCost": 1_854}),
                json!({"company": "KB Kookmin Bank", "year": "2023", "burdenRatio": 0.38, "totalCost": 1_089}),
                json!({"company": "Mirae Asset Securities", "year": "2023", "burdenRatio": 0.31, "totalCost": 407}),
                json!({"company": "Shinhan Bank", "year": "2023", "burdenRatio": 0.40, "totalCost": 1_059}),
            ],
            Endpoint::CustomFees => vec![
                json!({"company": "Mirae Asset Securities", "sysType": "DC", "term": "5",
                       "reserve": "50", "totalFee": 22.5, "feeRate": 0.45}),
                json!({"company": "KB Kookmin Bank", "sysType": "DC", "term": "5",
                       "reserve": "50", "totalFee": 26.0, "feeRate": 0.52}),
                json!({"company": "Samsung Life", "sysType": "DC", "term": "5",
                       "reserve": "50", "totalFee": 31.5, "feeRate": 0.63}),
                json!({"company": "Shinhan Bank", "sysType": "DC", "term": "5",
                       "reserve": "50", "totalFee": 27.0, "feeRate": 0.54}),
            ],
            Endpoint::GuaranteedSupply => vec![
                json!({"company": "Samsung Life", "productCount": 18, "sysType": "DB,DC,IRP"}),
                json!({"company": "KB Kookmin Bank", "productCount": 12, "sysType": "DC,IRP"}),
                json!({"company": "Kyobo Life", "productCount": 9, "sysType": "DB,DC"}),
            ],
            Endpoint::GuaranteedProducts => vec![
                json!({"company": "Samsung Life", "product": "Fixed Deposit Pension 36M",
                       "productType": "deposit", "rate": 3.40, "term": "36", "sysType": "DC"}),
                json!({"company": "KB Kookmin Bank", "product": "KB Guaranteed Deposit 24M",
                       "productType": "deposit", "rate": 3.25, "term": "24", "sysType": "IRP"}),
                json!({"company": "Kyobo Life", "product": "Kyobo GIC 12M",
                       "productType": "gic", "rate": 3.05, "term": "12", "sysType": "DC"}),
            ],
            Endpoint::PensionStats => vec![
                json!({"year": "2019", "personalReserve": 143_400, "retirementReserve": 221_200, "publicReserve": 736_700}),
                json!({"year": "2020", "personalReserve": 151_700, "retirementReserve": 255_500, "publicReserve": 833_700}),
                json!({"year": "2021", "personalReserve": 160_100, "retirementReserve": 295_600, "publicReserve": 948_700}),
                json!({"year": "2022", "personalReserve": 165_300, "retirementReserve": 335_900, "publicReserve": 890_500}),
                json!({"year": "2023", "personalReserve": 172_900, "retirementReserve": 382_400, "publicReserve": 1_035_800}),
                json!({"year": "2024", "personalReserve": 180_200, "retirementReserve": 421_100, "publicReserve": 1_112_300}),
            ],
            Endpoint::PublicPensionStats => vec![
                json!({"year": "2023", "scheme": "national", "reserve": 1_035_800, "subscribers": 22_300_000}),
                json!({"year": "2023", "scheme": "civil-service", "reserve": 21_600, "subscribers": 1_250_000}),
                json!({"year": "2023", "scheme": "military", "reserve": 1_400, "subscribers": 190_000}),
            ],
            Endpoint::PersonalPensionStats => vec![
                json!({"year": "2023", "statType": "tax-qualified", "sector": "insurance", "reserve": 120_500}),
                json!({"year": "2023", "statType": "tax-qualified", "sector": "bank", "reserve": 32_100}),
                json!({"year": "2023", "statType": "tax-qualified", "sector": "securities", "reserve": 20_300}),
            ],
            Endpoint::RetirementPensionStats => vec![
                json!({"year": "2023", "statType": "by-system", "sysType": "DB", "reserve": 205_300}),
                json!({"year": "2023", "statType": "by-system", "sysType": "DC", "reserve": 101_400}),
                json!({"year": "2023", "statType": "by-system", "sysType": "IRP", "reserve": 75_700}),
            ],
        }
    }
}

#[async_trait]
impl PensionSource for StaticPensionSource {
    async fn fetch(
        &self,
        endpoint: Endpoint,
        _query: &SourceQuery,
    ) -> Result<RecordSet, SourceError> {
        let records: Vec<Record> = Self::rows(endpoint)
            .into_iter()
            .map(Record::from_value)
            .collect();

        Ok(RecordSet {
            code: super::SUCCESS_CODE.into(),
            message: "OK".into(),
            count: records.len(),
            records,
        })
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "StaticSource"
    }
}

/// A source that fails every fetch; used to test degraded paths
#[cfg(test)]
pub struct FailingPensionSource;

#[cfg(test)]
#[async_trait]
impl PensionSource for FailingPensionSource {
    async fn fetch(
        &self,
        _endpoint: Endpoint,
        _query: &SourceQuery,
    ) -> Result<RecordSet, SourceError> {
        Err(SourceError::Status {
            code: "999".into(),
            message: "upstream down".into(),
        })
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "FailingSource"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::field;

    #[tokio::test]
    async fn test_static_rows_decode() {
        let source = StaticPensionSource::new();
        let set = source
            .fetch(Endpoint::SavingsProducts, &SourceQuery::new())
            .await
            .unwrap();

        assert!(set.count >= 8);
        assert!(set.records[0].text(field::COMPANY).is_some());
        assert!(set.records[0].num(field::AVG_FEE_RATE3).is_some());
    }

    #[tokio::test]
    async fn test_every_endpoint_has_rows() {
        let source = StaticPensionSource::new();
        for endpoint in [
            Endpoint::SavingsCompanies,
            Endpoint::SavingsProducts,
            Endpoint::GuaranteedInsurance,
            Endpoint::RetirementPerformance,
            Endpoint::RetirementCost,
            Endpoint::CustomFees,
            Endpoint::GuaranteedSupply,
            Endpoint::GuaranteedProducts,
            Endpoint::PensionStats,
            Endpoint::PublicPensionStats,
            Endpoint::PersonalPensionStats,
            Endpoint::RetirementPensionStats,
        ] {
            let set = source.fetch(endpoint, &SourceQuery::new()).await.unwrap();
            assert!(!set.records.is_empty(), "{endpoint:?} has no rows");
        }
    }
}
