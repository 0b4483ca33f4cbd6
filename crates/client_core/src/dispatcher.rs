use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use shared::{
    domain::{CartAction, CsrfToken, ProductId, SessionIdentity, DEFAULT_ANONYMOUS_SENTINEL},
    protocol::{UpdateItemRequest, UpdateItemResponse},
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::{
    controls::ControlDescriptor,
    error::{log_only_error_callback, DispatchError, ErrorCallback},
    navigation::PageNavigator,
    transport::CartTransport,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConcurrencyPolicy {
    /// Whichever response lands last triggers the last reload.
    #[default]
    Unordered,
    SerializePerProduct,
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub session: SessionIdentity,
    pub anonymous_sentinel: String,
    pub csrf_token: CsrfToken,
    pub concurrency: ConcurrencyPolicy,
}

impl DispatcherConfig {
    pub fn new(session: SessionIdentity, csrf_token: CsrfToken) -> Self {
        Self {
            session,
            anonymous_sentinel: DEFAULT_ANONYMOUS_SENTINEL.to_string(),
            csrf_token,
            concurrency: ConcurrencyPolicy::default(),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.session.is_anonymous(&self.anonymous_sentinel)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    SkippedAnonymous,
    Reloaded { response: UpdateItemResponse },
}

pub struct CartActionDispatcher {
    config: DispatcherConfig,
    transport: Arc<dyn CartTransport>,
    navigator: Arc<dyn PageNavigator>,
    on_error: ErrorCallback,
    product_locks: StdMutex<HashMap<ProductId, ProductSlot>>,
}

struct ProductSlot {
    lock: Arc<Mutex<()>>,
    // Permits alive for this product, holding or waiting.
    users: usize,
}

/// Per-product turn under `SerializePerProduct`. Dropping it, including when
/// the click future is cancelled mid-wait, releases the turn and forgets the
/// product once nobody else is queued on it.
struct ProductPermit<'a> {
    locks: &'a StdMutex<HashMap<ProductId, ProductSlot>>,
    product_id: ProductId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ProductPermit<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = lock_slots(self.locks);
        if let Some(slot) = locks.get_mut(&self.product_id) {
            slot.users -= 1;
            if slot.users == 0 {
                locks.remove(&self.product_id);
            }
        }
    }
}

fn lock_slots(
    locks: &StdMutex<HashMap<ProductId, ProductSlot>>,
) -> std::sync::MutexGuard<'_, HashMap<ProductId, ProductSlot>> {
    locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CartActionDispatcher {
    pub fn new(
        config: DispatcherConfig,
        transport: Arc<dyn CartTransport>,
        navigator: Arc<dyn PageNavigator>,
    ) -> Self {
        Self {
            config,
            transport,
            navigator,
            on_error: log_only_error_callback(),
            product_locks: StdMutex::new(HashMap::new()),
        }
    }

    pub fn with_error_callback(mut self, on_error: ErrorCallback) -> Self {
        self.on_error = on_error;
        self
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Failures go to the error callback before being returned.
    pub async fn handle_click(
        &self,
        control: &ControlDescriptor,
    ) -> Result<DispatchOutcome, DispatchError> {
        let result = self.dispatch_control(control).await;
        if let Err(err) = &result {
            (self.on_error)(err);
        }
        result
    }

    async fn dispatch_control(
        &self,
        control: &ControlDescriptor,
    ) -> Result<DispatchOutcome, DispatchError> {
        if self.config.is_anonymous() {
            info!(user = %self.config.session, "cart: user not logged in, update skipped");
            return Ok(DispatchOutcome::SkippedAnonymous);
        }

        let product_id = control.product_id()?;
        let action = control.cart_action()?;
        debug!(%product_id, %action, user = %self.config.session, "cart: control clicked");

        let response = self.update_user_order(product_id, action).await?;
        Ok(DispatchOutcome::Reloaded { response })
    }

    pub async fn update_user_order(
        &self,
        product_id: ProductId,
        action: CartAction,
    ) -> Result<UpdateItemResponse, DispatchError> {
        let _permit = match self.config.concurrency {
            ConcurrencyPolicy::Unordered => None,
            ConcurrencyPolicy::SerializePerProduct => Some(self.lock_product(&product_id).await),
        };
        self.send_and_reload(&product_id, action).await
    }

    async fn send_and_reload(
        &self,
        product_id: &ProductId,
        action: CartAction,
    ) -> Result<UpdateItemResponse, DispatchError> {
        let request = UpdateItemRequest {
            product_id: product_id.clone(),
            action,
        };
        info!(%product_id, action = %request.action, "cart: sending update");

        let raw = self
            .transport
            .post_update(&request, &self.config.csrf_token)
            .await?;
        if !raw.is_success() {
            warn!(%product_id, status = raw.status, "cart: update endpoint returned non-success status");
        }

        let data: UpdateItemResponse = serde_json::from_slice(&raw.body)?;
        info!(%product_id, %data, "cart: update acknowledged, reloading page");
        self.navigator.reload();
        Ok(data)
    }

    async fn lock_product(&self, product_id: &ProductId) -> ProductPermit<'_> {
        let (mut permit, lock) = {
            let mut locks = lock_slots(&self.product_locks);
            let slot = locks
                .entry(product_id.clone())
                .or_insert_with(|| ProductSlot {
                    lock: Arc::new(Mutex::new(())),
                    users: 0,
                });
            slot.users += 1;
            let permit = ProductPermit {
                locks: &self.product_locks,
                product_id: product_id.clone(),
                guard: None,
            };
            (permit, slot.lock.clone())
        };
        permit.guard = Some(lock.lock_owned().await);
        permit
    }

    #[cfg(test)]
    pub(crate) fn tracked_product_locks(&self) -> usize {
        lock_slots(&self.product_locks).len()
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
