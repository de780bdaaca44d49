//! Market Analysis
//!
//! Client-side composites over the record source: low-fee product
//! ranking, company ranking, whole-market summary and product search.
//! Everything is computed fresh per request - the upstream publishes
//! quarterly, so there is nothing worth caching at this layer.

use serde::{Deserialize, Serialize};

use crate::aggregate::{filter_selling, rank_top, summarize, Order};
use crate::fss::{Endpoint, PensionSource, SourceError, SourceQuery};
use crate::record::{field, Record, WORST_FEE_SENTINEL};

/// Oldest statistics year included in the summary's trailing window
const STATS_CUTOFF_YEAR: f64 = 2021.0;

/// Maximum statistics points in the trailing window
const STATS_WINDOW: usize = 6;

/// Maximum rows returned by a product search
const SEARCH_RESULT_CAP: usize = 50;

/// One row of the low-fee product ranking
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    pub rank: u32,
    pub company: String,
    pub product: String,
    pub product_type: String,
    pub avg_fee_rate3: f64,
    pub avg_earn_rate3: f64,
    pub guarantees: bool,
    pub balance: f64,
    pub reserve: f64,
}

impl ProductRow {
    fn from_ranked(rank: u32, record: &Record) -> Self {
        Self {
            rank,
            company: record.text(field::COMPANY).unwrap_or("N/A").to_string(),
            product: record.text(field::PRODUCT).unwrap_or("N/A").to_string(),
            product_type: record.text(field::PRODUCT_TYPE).unwrap_or("N/A").to_string(),
            avg_fee_rate3: record.num_or(field::AVG_FEE_RATE3, 0.0),
            avg_earn_rate3: record.num_or(field::AVG_EARN_RATE3, 0.0),
            guarantees: record.flag(field::GUARANTEES),
            balance: record.num_or(field::BALANCE, 0.0),
            reserve: record.num_or(field::RESERVE, 0.0),
        }
    }
}

/// One row of the company ranking
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRow {
    pub rank: u32,
    pub area: String,
    pub company: String,
    pub avg_fee_rate3: f64,
    pub avg_fee_rate5: f64,
    pub avg_earn_rate3: f64,
    pub avg_earn_rate5: f64,
    pub reserve: f64,
}

impl CompanyRow {
    fn from_ranked(rank: u32, record: &Record) -> Self {
        Self {
            rank,
            area: record.text(field::AREA).unwrap_or("N/A").to_string(),
            company: record.text(field::COMPANY).unwrap_or("N/A").to_string(),
            avg_fee_rate3: record.num_or(field::AVG_FEE_RATE3, 0.0),
            avg_fee_rate5: record.num_or(field::AVG_FEE_RATE5, 0.0),
            avg_earn_rate3: record.num_or(field::AVG_EARN_RATE3, 0.0),
            avg_earn_rate5: record.num_or(field::AVG_EARN_RATE5, 0.0),
            reserve: record.num_or(field::RESERVE, 0.0),
        }
    }
}

/// Aggregate market scalars plus a trailing statistics window.
///
/// Every numeric field is a defined zero when the inputs are empty.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub total_products: usize,
    pub total_companies: usize,
    pub average_fee_rate: f64,
    pub average_earn_rate: f64,
    pub lowest_fee_rate: f64,
    pub highest_earn_rate: f64,
    pub statistics: Vec<Record>,
}

/// Product search filters; all optional and combined conjunctively
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchFilters {
    pub company: Option<String>,
    pub product_type: Option<String>,
    pub max_fee_rate: Option<f64>,
    pub min_earn_rate: Option<f64>,
}

/// Selling products ranked ascending by 3-year average fee rate
pub async fn low_fee_products(
    source: &dyn PensionSource,
    limit: usize,
) -> Result<Vec<ProductRow>, SourceError> {
    let set = source
        .fetch(Endpoint::SavingsProducts, &SourceQuery::new())
        .await?;

    let selling = filter_selling(&set.records);
    let ranked = rank_top(
        &selling,
        field::AVG_FEE_RATE3,
        Order::Ascending,
        limit,
        WORST_FEE_SENTINEL,
    );

    Ok(ranked
        .iter()
        .map(|r| ProductRow::from_ranked(r.rank, &r.record))
        .collect())
}

/// Companies ranked ascending by 3-year average fee rate, optionally
/// filtered by region code upstream
pub async fn company_ranking(
    source: &dyn PensionSource,
    area_code: Option<&str>,
) -> Result<Vec<CompanyRow>, SourceError> {
    let mut query = SourceQuery::new();
    if let Some(area) = area_code {
        query = query.area_code(area);
    }

    let set = source.fetch(Endpoint::SavingsCompanies, &query).await?;
    let ranked = rank_top(
        &set.records,
        field::AVG_FEE_RATE3,
        Order::Ascending,
        set.records.len(),
        WORST_FEE_SENTINEL,
    );

    Ok(ranked
        .iter()
        .map(|r| CompanyRow::from_ranked(r.rank, &r.record))
        .collect())
}

/// Whole-market summary. Each sub-fetch that fails degrades its section
/// to the zero default instead of failing the summary.
pub async fn market_summary(source: &dyn PensionSource) -> MarketSummary {
    let mut summary = MarketSummary::default();

    if let Ok(products) = source
        .fetch(Endpoint::SavingsProducts, &SourceQuery::new())
        .await
    {
        let selling = filter_selling(&products.records);
        summary.total_products = selling.len();

        let stats = summarize(&selling, &[field::AVG_FEE_RATE3, field::AVG_EARN_RATE3]);
        let fee = &stats[field::AVG_FEE_RATE3];
        let earn = &stats[field::AVG_EARN_RATE3];

        summary.average_fee_rate = round2(fee.mean);
        summary.lowest_fee_rate = fee.min;
        summary.average_earn_rate = round2(earn.mean);
        summary.highest_earn_rate = earn.max;
    }

    if let Ok(companies) = source
        .fetch(Endpoint::SavingsCompanies, &SourceQuery::new())
        .await
    {
        summary.total_companies = companies.records.len();
    }

    if let Ok(stats) = source
        .fetch(Endpoint::PensionStats, &SourceQuery::new())
        .await
    {
        let recent: Vec<Record> = stats
            .records
            .iter()
            .filter(|r| r.num_or(field::YEAR, 0.0) >= STATS_CUTOFF_YEAR)
            .cloned()
            .collect();

        let start = recent.len().saturating_sub(STATS_WINDOW);
        summary.statistics = recent[start..].to_vec();
    }

    summary
}

/// Selling products matching every supplied filter, capped at 50 rows
pub async fn search_products(
    source: &dyn PensionSource,
    filters: &SearchFilters,
) -> Result<Vec<ProductRow>, SourceError> {
    let set = source
        .fetch(Endpoint::SavingsProducts, &SourceQuery::new())
        .await?;

    let matches: Vec<Record> = filter_selling(&set.records)
        .into_iter()
        .filter(|r| {
            filters.company.as_deref().is_none_or(|needle| {
                r.text(field::COMPANY)
                    .is_some_and(|c| c.to_lowercase().contains(&needle.to_lowercase()))
            })
        })
        .filter(|r| {
            filters.product_type.as_deref().is_none_or(|needle| {
                r.text(field::PRODUCT_TYPE)
                    .is_some_and(|t| t.to_lowercase().contains(&needle.to_lowercase()))
            })
        })
        .filter(|r| {
            filters
                .max_fee_rate
                .is_none_or(|max| r.num_or(field::AVG_FEE_RATE3, WORST_FEE_SENTINEL) <= max)
        })
        .filter(|r| {
            filters
                .min_earn_rate
                .is_none_or(|min| r.num_or(field::AVG_EARN_RATE3, f64::NEG_INFINITY) >= min)
        })
        .take(SEARCH_RESULT_CAP)
        .collect();

    Ok(matches
        .iter()
        .enumerate()
        .map(|(i, r)| ProductRow::from_ranked((i + 1) as u32, r))
        .collect())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fss::{FailingPensionSource, StaticPensionSource};

    #[tokio::test]
    async fn test_low_fee_ranking_is_ascending() {
        let source = StaticPensionSource::new();
        let rows = low_fee_products(&source, 5).await.unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].rank, 1);
        for pair in rows.windows(2) {
            assert!(pair[0].avg_fee_rate3 <= pair[1].avg_fee_rate3);
        }
    }

    #[tokio::test]
    async fn test_low_fee_excludes_discontinued() {
        let source = StaticPensionSource::new();
        let rows = low_fee_products(&source, 100).await.unwrap();
        assert!(rows.iter().all(|r| r.product != "Mirae Asset Pension Savings Fund Legacy"));
    }

    #[tokio::test]
    async fn test_missing_fee_rate_sorts_last() {
        let source = StaticPensionSource::new();
        let rows = low_fee_products(&source, 100).await.unwrap();
        // The record with no avgFeeRate3 takes the sentinel and lands last
        assert_eq!(rows.last().unwrap().product, "Samsung Life Pension Savings Classic");
        assert_eq!(rows.last().unwrap().avg_fee_rate3, 0.0);
    }

    #[tokio::test]
    async fn test_company_ranking_covers_all_companies() {
        let source = StaticPensionSource::new();
        let rows = company_ranking(&source, None).await.unwrap();

        assert_eq!(rows.len(), 6);
        let ranks: Vec<_> = rows.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(rows[0].company, "Mirae Asset Securities");
    }

    #[tokio::test]
    async fn test_market_summary_scalars() {
        let source = StaticPensionSource::new();
        let summary = market_summary(&source).await;

        assert_eq!(summary.total_products, 7);
        assert_eq!(summary.total_companies, 6);
        assert!(summary.average_fee_rate > 0.0);
        assert!(summary.lowest_fee_rate <= summary.average_fee_rate);
        assert!(summary.highest_earn_rate >= summary.average_earn_rate);
        // 2021..=2024 pass the cutoff
        assert_eq!(summary.statistics.len(), 4);
    }

    #[tokio::test]
    async fn test_market_summary_degrades_to_zero_defaults() {
        let summary = market_summary(&FailingPensionSource).await;

        assert_eq!(summary.total_products, 0);
        assert_eq!(summary.total_companies, 0);
        assert_eq!(summary.average_fee_rate, 0.0);
        assert_eq!(summary.lowest_fee_rate, 0.0);
        assert!(summary.statistics.is_empty());
    }

    #[tokio::test]
    async fn test_search_conjunction() {
        let source = StaticPensionSource::new();

        let filters = SearchFilters {
            product_type: Some("fund".into()),
            max_fee_rate: Some(0.5),
            ..Default::default()
        };
        let rows = search_products(&source, &filters).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].company, "Mirae Asset Securities");

        let filters = SearchFilters {
            company: Some("samsung".into()),
            ..Default::default()
        };
        let rows = search_products(&source, &filters).await.unwrap();
        assert!(rows.len() >= 2);
        assert!(rows.iter().all(|r| r.company.contains("Samsung")));
    }

    #[tokio::test]
    async fn test_search_propagates_source_error() {
        let result = search_products(&FailingPensionSource, &SearchFilters::default()).await;
        assert!(matches!(result, Err(SourceError::Status { .. })));
    }
}
