//! Flat search parameters passed from query strings down to the stores.

use std::collections::BTreeMap;

/// Field name to raw string value. Keys are AND-ed by the stores.
pub type SearchParams = BTreeMap<String, String>;

/// Build search parameters from raw key/value pairs, dropping empty values.
pub fn search_params<I, K, V>(pairs: I) -> SearchParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .filter(|(_, value)| !value.is_empty())
        .collect()
}
