use std::sync::Arc;

use shared::protocol::{DEFAULT_SORT_CLASS, DEFAULT_UPDATE_CART_CLASS};
use tracing::debug;
use url::Url;

use crate::{
    controls::ControlDescriptor,
    dispatcher::{CartActionDispatcher, DispatchOutcome},
    error::DispatchError,
    sort::SortNavigator,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingClasses {
    pub update_cart: String,
    pub sort: String,
}

impl Default for BindingClasses {
    fn default() -> Self {
        Self {
            update_cart: DEFAULT_UPDATE_CART_CLASS.into(),
            sort: DEFAULT_SORT_CLASS.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    UpdateCart,
    Sort,
}

#[derive(Debug, Default)]
pub struct ClickOutcome {
    pub cart: Option<Result<DispatchOutcome, DispatchError>>,
    pub sort: Option<Result<Url, DispatchError>>,
}

impl ClickOutcome {
    pub fn is_unbound(&self) -> bool {
        self.cart.is_none() && self.sort.is_none()
    }
}

/// A page's controls plus the listeners attached when the page was bound.
///
/// Binding is a one-time snapshot: controls added later sit on the page but
/// never receive a listener.
pub struct ShopPage {
    controls: Vec<ControlDescriptor>,
    listeners: Vec<Vec<ListenerKind>>,
    dispatcher: Arc<CartActionDispatcher>,
    sorter: Arc<SortNavigator>,
}

impl ShopPage {
    pub fn bind(
        controls: Vec<ControlDescriptor>,
        classes: &BindingClasses,
        dispatcher: Arc<CartActionDispatcher>,
        sorter: Arc<SortNavigator>,
    ) -> Self {
        let listeners: Vec<Vec<ListenerKind>> = controls
            .iter()
            .map(|control| {
                let mut kinds = Vec::new();
                if control.has_class(&classes.update_cart) {
                    kinds.push(ListenerKind::UpdateCart);
                }
                if control.has_class(&classes.sort) {
                    kinds.push(ListenerKind::Sort);
                }
                kinds
            })
            .collect();
        debug!(
            controls = controls.len(),
            cart_listeners = listeners
                .iter()
                .filter(|k| k.contains(&ListenerKind::UpdateCart))
                .count(),
            sort_listeners = listeners
                .iter()
                .filter(|k| k.contains(&ListenerKind::Sort))
                .count(),
            "page: listeners bound"
        );
        Self {
            controls,
            listeners,
            dispatcher,
            sorter,
        }
    }

    /// Returns the new control's index.
    pub fn add_control(&mut self, control: ControlDescriptor) -> usize {
        self.controls.push(control);
        self.controls.len() - 1
    }

    pub fn controls(&self) -> &[ControlDescriptor] {
        &self.controls
    }

    pub fn listeners(&self, index: usize) -> &[ListenerKind] {
        self.listeners.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Runs every listener bound to the control at `index`. The sort listener
    /// navigates before the cart request is awaited, so a slow update endpoint
    /// never holds up sorting.
    pub async fn click(&self, index: usize) -> ClickOutcome {
        let Some(control) = self.controls.get(index) else {
            debug!(index, "page: click on unknown control");
            return ClickOutcome::default();
        };

        let listeners = self.listeners(index);
        let mut outcome = ClickOutcome::default();
        if listeners.contains(&ListenerKind::Sort) {
            outcome.sort = Some(self.sorter.handle_click(control));
        }
        if listeners.contains(&ListenerKind::UpdateCart) {
            outcome.cart = Some(self.dispatcher.handle_click(control).await);
        }
        if outcome.is_unbound() {
            debug!(index, "page: click on control without listeners");
        }
        outcome
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
