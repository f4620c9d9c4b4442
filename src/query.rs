//! Query language parser: the GET filter/sort/paginate parameters.
//!
//! Table-independent: column names are only lower-cased here, resolution
//! against a table's column map happens in the executor. Percent-decoding is
//! done by axum's `Query` extractor before values reach this module.

use crate::error::ApiError;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Parsed, validated GET parameters. Constructed per request and consumed
/// once by the executor.
///
/// `None` always means "clause absent": `offset` absent is distinct from
/// `offset=0`, and `limit=all` collapses to the same no-LIMIT behavior as an
/// omitted `limit`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryRequest {
    pub offset: Option<i64>,
    pub search: Option<String>,
    pub search_key: Option<String>,
    pub order: Option<SortOrder>,
    pub order_key: Option<String>,
    pub limit: Option<i64>,
}

/// An empty parameter value is the same as an omitted one.
fn non_empty(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params.get(key).filter(|v| !v.is_empty()).cloned()
}

/// Parse and validate the query string of a collection GET.
///
/// Paired parameters (`search`/`search_key`, `order`/`order_key`) must travel
/// together: a value without its target column (or the reverse) is ambiguous
/// and rejected outright. The one exception is `order_key` alone, which sorts
/// ascending.
pub fn parse_query_params(params: &HashMap<String, String>) -> Result<QueryRequest, ApiError> {
    // where id >= <offset>; "" and "nan" are legacy no-offset spellings
    let offset = match non_empty(params, "offset") {
        None => None,
        Some(v) if v.eq_ignore_ascii_case("nan") => None,
        Some(v) => Some(v.parse::<i64>().map_err(|_| {
            ApiError::MalformedQuery(format!("offset must be an integer, got '{}'", v))
        })?),
    };

    // where <search_key> like '%<search>%'
    let search = non_empty(params, "search");
    let search_key = non_empty(params, "search_key").map(|v| v.to_lowercase());
    if search.is_some() != search_key.is_some() {
        return Err(ApiError::MalformedQuery(
            "search and search_key must be provided together".to_string(),
        ));
    }

    // order by <order_key> [asc|desc]
    let order_key = non_empty(params, "order_key").map(|v| v.to_lowercase());
    let order = match non_empty(params, "order") {
        None => None,
        Some(v) => match v.to_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => {
                return Err(ApiError::MalformedQuery(format!(
                    "order must be one of asc, desc; got '{}'",
                    v
                )))
            }
        },
    };
    let order = match (order, &order_key) {
        (Some(_), None) => {
            return Err(ApiError::MalformedQuery(
                "order and order_key must be provided together".to_string(),
            ))
        }
        (None, Some(_)) => Some(SortOrder::Asc),
        (o, _) => o,
    };

    // top <limit>; "all" means every row, same as omitting the parameter
    let limit = match non_empty(params, "limit") {
        None => None,
        Some(v) if v.eq_ignore_ascii_case("all") => None,
        Some(v) => Some(v.parse::<i64>().map_err(|_| {
            ApiError::MalformedQuery(format!("limit must be an integer or 'all', got '{}'", v))
        })?),
    };

    Ok(QueryRequest {
        offset,
        search,
        search_key,
        order,
        order_key,
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn empty_query_string_parses_to_defaults() {
        let q = parse_query_params(&params(&[])).unwrap();
        assert_eq!(q, QueryRequest::default());
    }

    #[test]
    fn offset_sentinels_mean_no_offset() {
        for v in ["", "nan", "NaN"] {
            let q = parse_query_params(&params(&[("offset", v)])).unwrap();
            assert_eq!(q.offset, None);
        }
        let q = parse_query_params(&params(&[("offset", "0")])).unwrap();
        assert_eq!(q.offset, Some(0));
        let q = parse_query_params(&params(&[("offset", "5")])).unwrap();
        assert_eq!(q.offset, Some(5));
    }

    #[test]
    fn non_integer_offset_is_malformed() {
        let err = parse_query_params(&params(&[("offset", "five")])).unwrap_err();
        assert!(matches!(err, ApiError::MalformedQuery(_)));
    }

    #[test]
    fn search_pair_is_both_or_neither() {
        for p in [
            params(&[("search", "bolt")]),
            params(&[("search_key", "name")]),
        ] {
            assert!(matches!(
                parse_query_params(&p).unwrap_err(),
                ApiError::MalformedQuery(_)
            ));
        }
        let q = parse_query_params(&params(&[("search", "Bolt"), ("search_key", "Name")])).unwrap();
        // search literal kept as given, key lower-cased for resolution
        assert_eq!(q.search.as_deref(), Some("Bolt"));
        assert_eq!(q.search_key.as_deref(), Some("name"));
    }

    #[test]
    fn order_alone_is_malformed_but_order_key_alone_defaults_asc() {
        assert!(matches!(
            parse_query_params(&params(&[("order", "asc")])).unwrap_err(),
            ApiError::MalformedQuery(_)
        ));
        let q = parse_query_params(&params(&[("order_key", "name")])).unwrap();
        assert_eq!(q.order, Some(SortOrder::Asc));
        assert_eq!(q.order_key.as_deref(), Some("name"));
    }

    #[test]
    fn order_value_must_be_asc_or_desc() {
        let q = parse_query_params(&params(&[("order", "DESC"), ("order_key", "qty")])).unwrap();
        assert_eq!(q.order, Some(SortOrder::Desc));
        assert!(matches!(
            parse_query_params(&params(&[("order", "sideways"), ("order_key", "qty")])).unwrap_err(),
            ApiError::MalformedQuery(_)
        ));
    }

    #[test]
    fn limit_all_equals_omitted() {
        let all = parse_query_params(&params(&[("limit", "ALL")])).unwrap();
        let omitted = parse_query_params(&params(&[])).unwrap();
        assert_eq!(all.limit, omitted.limit);
        let q = parse_query_params(&params(&[("limit", "10")])).unwrap();
        assert_eq!(q.limit, Some(10));
        assert!(matches!(
            parse_query_params(&params(&[("limit", "ten")])).unwrap_err(),
            ApiError::MalformedQuery(_)
        ));
    }
}
