use std::sync::Arc;

use shared::{domain::SortValue, protocol::SORT_QUERY_PARAM};
use tracing::info;
use url::Url;

use crate::{
    controls::ControlDescriptor,
    error::{log_only_error_callback, DispatchError, ErrorCallback},
    navigation::PageNavigator,
};

/// Matches `URLSearchParams.set`: the first `sort` pair is overwritten in
/// place, any later ones are dropped, and the pair is appended when absent.
/// Other pairs and the fragment are left alone.
pub fn with_sort_param(current: &Url, value: &SortValue) -> Url {
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = current
        .query_pairs()
        .filter_map(|(key, val)| {
            if key != SORT_QUERY_PARAM {
                return Some((key.into_owned(), val.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((key.into_owned(), value.as_str().to_string()))
        })
        .collect();
    if !replaced {
        pairs.push((SORT_QUERY_PARAM.to_string(), value.as_str().to_string()));
    }

    let mut next = current.clone();
    next.query_pairs_mut()
        .clear()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    next
}

pub struct SortNavigator {
    navigator: Arc<dyn PageNavigator>,
    on_error: ErrorCallback,
}

impl SortNavigator {
    pub fn new(navigator: Arc<dyn PageNavigator>) -> Self {
        Self {
            navigator,
            on_error: log_only_error_callback(),
        }
    }

    pub fn with_error_callback(mut self, on_error: ErrorCallback) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn handle_click(&self, control: &ControlDescriptor) -> Result<Url, DispatchError> {
        match control.sort_value() {
            Ok(value) => Ok(self.update_sort_value(&value)),
            Err(err) => {
                (self.on_error)(&err);
                Err(err)
            }
        }
    }

    pub fn update_sort_value(&self, value: &SortValue) -> Url {
        let next = with_sort_param(&self.navigator.current_url(), value);
        info!(sort = %value, url = %next, "sort: navigating");
        self.navigator.navigate(next.clone());
        next
    }
}

#[cfg(test)]
#[path = "tests/sort_tests.rs"]
mod tests;
