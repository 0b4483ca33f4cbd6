use super::*;
use crate::navigation::{InMemoryNavigator, NavigationEvent};

fn url(raw: &str) -> Url {
    Url::parse(raw).expect("url")
}

#[test]
fn appends_sort_to_existing_query() {
    let next = with_sort_param(
        &url("https://site/shop?category=shoes"),
        &SortValue::new("price_desc"),
    );
    assert_eq!(next.as_str(), "https://site/shop?category=shoes&sort=price_desc");
}

#[test]
fn adds_query_when_page_has_none() {
    let next = with_sort_param(&url("https://site/shop"), &SortValue::new("name"));
    assert_eq!(next.as_str(), "https://site/shop?sort=name");
}

#[test]
fn overwrites_first_sort_in_place_and_drops_duplicates() {
    let next = with_sort_param(
        &url("https://site/shop?sort=old&category=shoes&sort=older&page=2"),
        &SortValue::new("price_asc"),
    );
    assert_eq!(
        next.as_str(),
        "https://site/shop?sort=price_asc&category=shoes&page=2"
    );
}

#[test]
fn keeps_fragment_and_encodes_value() {
    let next = with_sort_param(
        &url("https://site/shop?category=shoes#grid"),
        &SortValue::new("price desc&more"),
    );
    assert_eq!(
        next.as_str(),
        "https://site/shop?category=shoes&sort=price+desc%26more#grid"
    );
}

#[test]
fn clicking_same_control_twice_is_idempotent() {
    let navigator = Arc::new(InMemoryNavigator::new(url("https://site/shop?category=shoes")));
    let sorter = SortNavigator::new(navigator.clone());
    let control = ControlDescriptor::sort("price_desc");

    let first = sorter.handle_click(&control).expect("first");
    let second = sorter.handle_click(&control).expect("second");

    assert_eq!(first, second);
    assert_eq!(
        first.as_str(),
        "https://site/shop?category=shoes&sort=price_desc"
    );
    assert_eq!(
        navigator.history(),
        vec![
            NavigationEvent::Navigated(first.clone()),
            NavigationEvent::Navigated(second),
        ]
    );
    assert_eq!(navigator.current_url(), first);
}

#[test]
fn missing_value_does_not_navigate() {
    let navigator = Arc::new(InMemoryNavigator::new(url("https://site/shop")));
    let seen = Arc::new(std::sync::Mutex::new(0usize));
    let counter = seen.clone();
    let sorter = SortNavigator::new(navigator.clone()).with_error_callback(Arc::new(
        move |_err: &DispatchError| {
            *counter.lock().expect("lock") += 1;
        },
    ));

    let err = sorter
        .handle_click(&ControlDescriptor::new().with_class("sort-products"))
        .expect_err("must fail");

    assert!(matches!(
        err,
        DispatchError::MissingAttribute {
            attribute: "data-value"
        }
    ));
    assert!(navigator.history().is_empty());
    assert_eq!(*seen.lock().expect("lock"), 1);
}
