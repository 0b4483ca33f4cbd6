use serde::{Deserialize, Serialize};

use crate::domain::{CartAction, ProductId};

pub const UPDATE_ITEM_PATH: &str = "/update_item/";
pub const CSRF_HEADER: &str = "X-CSRFToken";
pub const SORT_QUERY_PARAM: &str = "sort";

pub const PRODUCT_ATTRIBUTE: &str = "data-product";
pub const ACTION_ATTRIBUTE: &str = "data-action";
pub const SORT_VALUE_ATTRIBUTE: &str = "data-value";

pub const DEFAULT_UPDATE_CART_CLASS: &str = "update-cart";
pub const DEFAULT_SORT_CLASS: &str = "sort-products";

/// Body of `POST /update_item/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub product_id: ProductId,
    pub action: CartAction,
}

/// The server's answer is valid JSON of no fixed shape (the shop replies with
/// the bare string `"added"`).
pub type UpdateItemResponse = serde_json::Value;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_item_request_uses_camel_case_keys() {
        let request = UpdateItemRequest {
            product_id: ProductId::new("42"),
            action: CartAction::Add,
        };
        assert_eq!(
            serde_json::to_string(&request).expect("serialize"),
            r#"{"productId":"42","action":"add"}"#
        );
    }
}
