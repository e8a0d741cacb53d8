use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
pub enum ProductSort {
    #[serde(rename = "price-low-high")]
    PriceLowHigh,
    #[serde(rename = "price-high-low")]
    PriceHighLow,
    #[serde(rename = "rating")]
    Rating,
    #[default]
    #[serde(rename = "newest")]
    Newest,
}

impl ProductSort {
    pub fn order_by_sql(&self) -> &'static str {
        match self {
            ProductSort::PriceLowHigh => "price ASC",
            ProductSort::PriceHighLow => "price DESC",
            ProductSort::Rating => "rating DESC",
            ProductSort::Newest => "created_at DESC",
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub demographic: Option<String>,
    pub sort: Option<ProductSort>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    /// Comma-separated membership lists.
    pub sizes: Option<String>,
    pub colors: Option<String>,
    pub brands: Option<String>,
    pub ratings: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Split a comma-separated query value, dropping empty segments.
pub fn comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// The ratings filter matches anything at or above the lowest selected tier.
pub fn min_rating(raw: &str) -> Option<f64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<f64>().ok())
        .fold(None, |acc, value| match acc {
            Some(current) if current <= value => Some(current),
            _ => Some(value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_list_drops_empty_segments() {
        assert_eq!(comma_list("S,M,,L, "), vec!["S", "M", "L"]);
        assert!(comma_list("").is_empty());
    }

    #[test]
    fn min_rating_picks_lowest_tier() {
        assert_eq!(min_rating("4,3,5"), Some(3.0));
        assert_eq!(min_rating("4.5"), Some(4.5));
        assert_eq!(min_rating("not-a-number"), None);
    }

    #[test]
    fn sort_values_parse_from_query_names() {
        let query: ProductQuery =
            serde_json::from_str(r#"{"sort": "price-low-high", "minPrice": 100}"#).unwrap();
        assert!(matches!(query.sort, Some(ProductSort::PriceLowHigh)));
        assert_eq!(query.min_price, Some(100));
    }
}
