use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use shared::{
    domain::{CartAction, ProductId, SortValue},
    protocol::{
        ACTION_ATTRIBUTE, DEFAULT_SORT_CLASS, DEFAULT_UPDATE_CART_CLASS, PRODUCT_ATTRIBUTE,
        SORT_VALUE_ATTRIBUTE,
    },
};

use crate::error::DispatchError;

/// Rendering-agnostic description of a clickable element: its class list and
/// its attributes (`data-*` included).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlDescriptor {
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl ControlDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_cart(product_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self::new()
            .with_class(DEFAULT_UPDATE_CART_CLASS)
            .with_attribute(PRODUCT_ATTRIBUTE, product_id)
            .with_attribute(ACTION_ATTRIBUTE, action)
    }

    pub fn sort(value: impl Into<String>) -> Self {
        Self::new()
            .with_class(DEFAULT_SORT_CLASS)
            .with_attribute(SORT_VALUE_ATTRIBUTE, value)
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn required(&self, name: &'static str) -> Result<&str, DispatchError> {
        self.attribute(name)
            .ok_or(DispatchError::MissingAttribute { attribute: name })
    }

    pub fn product_id(&self) -> Result<ProductId, DispatchError> {
        self.required(PRODUCT_ATTRIBUTE).map(ProductId::new)
    }

    pub fn cart_action(&self) -> Result<CartAction, DispatchError> {
        self.required(ACTION_ATTRIBUTE).map(CartAction::from)
    }

    pub fn sort_value(&self) -> Result<SortValue, DispatchError> {
        self.required(SORT_VALUE_ATTRIBUTE).map(SortValue::new)
    }
}
