//! Click handling for the shop's cart and sort controls.
//!
//! A [`ShopPage`] is bound once over the controls the page rendered. Clicking
//! an update-cart control posts the cart action to `/update_item/` and reloads
//! the page; clicking a sort control navigates to the same page with its
//! `sort` query parameter rewritten.

use std::sync::Arc;

pub mod config;
pub mod controls;
pub mod dispatcher;
pub mod error;
pub mod navigation;
pub mod page;
pub mod sort;
pub mod transport;

pub use config::{load_settings, load_settings_from, ClientSettings};
pub use controls::ControlDescriptor;
pub use dispatcher::{CartActionDispatcher, ConcurrencyPolicy, DispatchOutcome, DispatcherConfig};
pub use error::{DispatchError, ErrorCallback};
pub use navigation::{InMemoryNavigator, NavigationEvent, PageNavigator};
pub use page::{BindingClasses, ClickOutcome, ListenerKind, ShopPage};
pub use sort::{with_sort_param, SortNavigator};
pub use transport::{CartTransport, HttpCartTransport, RawUpdateResponse};

pub struct ShopClient {
    dispatcher: Arc<CartActionDispatcher>,
    sorter: Arc<SortNavigator>,
    classes: BindingClasses,
}

impl ShopClient {
    pub fn from_settings(
        settings: &ClientSettings,
        navigator: Arc<dyn PageNavigator>,
    ) -> Result<Self, DispatchError> {
        let transport = Arc::new(HttpCartTransport::new(settings.update_item_url()?));
        Ok(Self::with_transport(settings, transport, navigator))
    }

    pub fn with_transport(
        settings: &ClientSettings,
        transport: Arc<dyn CartTransport>,
        navigator: Arc<dyn PageNavigator>,
    ) -> Self {
        Self::new(
            settings,
            transport,
            navigator,
            error::log_only_error_callback(),
        )
    }

    pub fn new(
        settings: &ClientSettings,
        transport: Arc<dyn CartTransport>,
        navigator: Arc<dyn PageNavigator>,
        on_error: ErrorCallback,
    ) -> Self {
        let dispatcher =
            CartActionDispatcher::new(settings.dispatcher_config(), transport, navigator.clone())
                .with_error_callback(on_error.clone());
        let sorter = SortNavigator::new(navigator).with_error_callback(on_error);
        Self {
            dispatcher: Arc::new(dispatcher),
            sorter: Arc::new(sorter),
            classes: settings.binding_classes(),
        }
    }

    pub fn dispatcher(&self) -> &CartActionDispatcher {
        &self.dispatcher
    }

    pub fn sorter(&self) -> &SortNavigator {
        &self.sorter
    }

    pub fn bind_page(&self, controls: Vec<ControlDescriptor>) -> ShopPage {
        ShopPage::bind(
            controls,
            &self.classes,
            self.dispatcher.clone(),
            self.sorter.clone(),
        )
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
