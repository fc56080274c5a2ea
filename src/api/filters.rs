//! Query-string filters.
//!
//! A [`QueryFilter`] is a deferred transformation of the outgoing
//! [`QueryParams`]. Filters are applied in order at request time. The
//! `where` key accumulates across filters; every other key is overwritten.
//!
//! Predicates and expressions are passed through verbatim. See
//! <https://dev.targetprocess.com/docs/sorting-and-filters> for the syntax.

use std::collections::BTreeMap;

use super::error::{ApiError, Result};

/// URL query parameters, multi-valued and ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(BTreeMap<String, Vec<String>>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values for `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Replace all values of `key` with `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), vec![value.into()]);
    }

    /// Append `value` to the values of `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
    }

    /// URL-encode as `k=v&k2=v2`, sorted by key.
    pub fn encode(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.iter() {
            serializer.append_pair(k, v);
        }
        serializer.finish()
    }

    /// Collect the query pairs of a URL.
    pub fn from_url(url: &url::Url) -> Self {
        url.query_pairs().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.add(k, v);
        }
        params
    }
}

/// A deferred modification of a request's query parameters.
#[derive(Debug, Clone)]
pub enum QueryFilter {
    /// Predicates appended to `where`, joined with `and`.
    Where(Vec<String>),
    /// `take=1`.
    First,
    /// `include=[a,b]`.
    Include(Vec<String>),
    /// `select={expr}`.
    Select(String),
    /// `result={expr}`.
    Result(String),
    /// `take=|n|`.
    MaxPerPage(i64),
    /// A caller-supplied transformation.
    Custom(fn(QueryParams) -> Result<QueryParams>),
}

impl QueryFilter {
    /// Wrap a plain function as a filter. This is the only kind of filter
    /// that may fail.
    pub fn custom(f: fn(QueryParams) -> Result<QueryParams>) -> Self {
        QueryFilter::Custom(f)
    }

    /// Apply this filter to `params`.
    pub fn apply(&self, mut params: QueryParams) -> Result<QueryParams> {
        match self {
            QueryFilter::Where(predicates) => {
                for predicate in predicates {
                    let joined = match params.get("where") {
                        Some(current) if !current.is_empty() => {
                            format!("{current} and {predicate}")
                        }
                        _ => predicate.clone(),
                    };
                    params.set("where", joined);
                }
            }
            QueryFilter::First => params.set("take", "1"),
            QueryFilter::Include(fields) => {
                params.set("include", format!("[{}]", fields.join(",")));
            }
            QueryFilter::Select(expr) => params.set("select", format!("{{{expr}}}")),
            QueryFilter::Result(expr) => params.set("result", format!("{{{expr}}}")),
            QueryFilter::MaxPerPage(count) => {
                // The API treats negative page sizes like their magnitude.
                params.set("take", count.unsigned_abs().to_string());
            }
            QueryFilter::Custom(f) => return f(params),
        }
        Ok(params)
    }
}

/// Apply `filters` to `params` in order.
pub fn apply_all(params: QueryParams, filters: &[QueryFilter]) -> Result<QueryParams> {
    filters
        .iter()
        .try_fold(params, |params, filter| filter.apply(params))
        .map_err(|e| match e {
            ApiError::Filter(_) => e,
            other => ApiError::context("Error running query filter", other),
        })
}

/// Filter on `predicates`, e.g. `"EntityState.Name != 'Done'"`.
///
/// Repeated use is additive: every predicate is joined to the existing
/// `where` value with `and`.
pub fn where_clause<I, S>(predicates: I) -> QueryFilter
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    QueryFilter::Where(predicates.into_iter().map(Into::into).collect())
}

/// Return a single entity.
///
/// Pair with `page = false` on accessors that page: the first page of size
/// one links to the next page of size one.
pub fn first() -> QueryFilter {
    QueryFilter::First
}

/// Limit the returned fields.
pub fn include<I, S>(fields: I) -> QueryFilter
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    QueryFilter::Include(fields.into_iter().map(Into::into).collect())
}

/// Project the response with a v2 `select` expression. The response shape
/// changes, so decode into a matching type with [`crate::Client::get`].
pub fn select(expr: impl Into<String>) -> QueryFilter {
    QueryFilter::Select(expr.into())
}

/// Aggregate with a v2 `result` expression, e.g. `"effortSum:sum(effort)"`.
pub fn result(expr: impl Into<String>) -> QueryFilter {
    QueryFilter::Result(expr.into())
}

/// Page size. The API default is 25.
pub fn max_per_page(count: i64) -> QueryFilter {
    QueryFilter::MaxPerPage(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(filters: &[QueryFilter]) -> QueryParams {
        apply_all(QueryParams::new(), filters).unwrap()
    }

    #[test]
    fn test_where_single() {
        let params = run(&[where_clause(["EntityState.Name == 'Done'"])]);
        assert_eq!(params.get("where"), Some("EntityState.Name == 'Done'"));
    }

    #[test]
    fn test_where_multiple_predicates() {
        let params = run(&[where_clause([
            "EntityState.Name == 'Done'",
            "Team.Name == 'Administrators'",
        ])]);
        assert_eq!(
            params.get("where"),
            Some("EntityState.Name == 'Done' and Team.Name == 'Administrators'")
        );
    }

    #[test]
    fn test_where_accumulates_across_calls() {
        let params = run(&[
            where_clause(["A == 1"]),
            first(),
            where_clause(["B == 2", "C == 3"]),
            where_clause(["D == 4"]),
        ]);
        assert_eq!(
            params.get("where"),
            Some("A == 1 and B == 2 and C == 3 and D == 4")
        );
        assert_eq!(params.get_all("where").len(), 1);
    }

    #[test]
    fn test_where_empty() {
        let params = run(&[where_clause([""])]);
        assert_eq!(params.get("where"), Some(""));
    }

    #[test]
    fn test_where_replaces_empty_value() {
        let params = run(&[where_clause([""]), where_clause(["Id == 3"])]);
        assert_eq!(params.get("where"), Some("Id == 3"));
    }

    #[test]
    fn test_first_sets_take() {
        assert_eq!(run(&[first()]).get("take"), Some("1"));
    }

    #[test]
    fn test_first_overrides_prior_take() {
        let params = run(&[max_per_page(500), first()]);
        assert_eq!(params.get("take"), Some("1"));
    }

    #[test]
    fn test_max_per_page() {
        assert_eq!(run(&[max_per_page(100)]).get("take"), Some("100"));
    }

    #[test]
    fn test_max_per_page_negative_conversion() {
        for n in [1_i64, 25, 100, 1000] {
            assert_eq!(run(&[max_per_page(n)]), run(&[max_per_page(-n)]));
        }
        assert_eq!(run(&[max_per_page(-100)]).get("take"), Some("100"));
    }

    #[test]
    fn test_include() {
        let params = run(&[include(["Team", "Name", "ModifyDate"])]);
        assert_eq!(params.get("include"), Some("[Team,Name,ModifyDate]"));
    }

    #[test]
    fn test_select() {
        let expr = "id,name,assignedUser.Where(login=='jane@example.com'),responsibleTeam:{responsibleTeam.id,responsibleTeam.team},entityState";
        let params = run(&[select(expr)]);
        assert_eq!(params.get("select"), Some(format!("{{{expr}}}").as_str()));
    }

    #[test]
    fn test_select_empty() {
        assert_eq!(run(&[select("")]).get("select"), Some("{}"));
    }

    #[test]
    fn test_result() {
        let params = run(&[result("effortSum:sum(effort)")]);
        assert_eq!(params.get("result"), Some("{effortSum:sum(effort)}"));
        assert_eq!(run(&[result("")]).get("result"), Some("{}"));
    }

    #[test]
    fn test_filters_keep_seed_params() {
        let seed: QueryParams = [("skip", "25"), ("take", "25")].into_iter().collect();
        let params = apply_all(seed, &[include(["Name"])]).unwrap();
        assert_eq!(params.get("skip"), Some("25"));
        assert_eq!(params.get("take"), Some("25"));
    }

    #[test]
    fn test_custom_filter_failure() {
        fn reject(_: QueryParams) -> Result<QueryParams> {
            Err(ApiError::Filter("take too large".to_string()))
        }
        let err = apply_all(QueryParams::new(), &[QueryFilter::custom(reject)]).unwrap_err();
        assert!(matches!(err, ApiError::Filter(_)));
        assert!(err.to_string().contains("take too large"));
    }

    #[test]
    fn test_encode_is_sorted_and_escaped() {
        let params = run(&[where_clause(["Name == 'A&B'"]), first()]);
        assert_eq!(params.encode(), "take=1&where=Name+%3D%3D+%27A%26B%27");
    }

    #[test]
    fn test_from_url_keeps_repeated_keys() {
        let url = url::Url::parse("https://x.tpondemand.com/api/v1/Bugs/?take=25&skip=25&a=1&a=2")
            .unwrap();
        let params = QueryParams::from_url(&url);
        assert_eq!(params.get("skip"), Some("25"));
        assert_eq!(params.get_all("a"), ["1".to_string(), "2".to_string()]);
    }
}
