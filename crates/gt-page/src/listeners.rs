// listeners.rs - Page-scoped click subscriptions.
//
// A listener exists only while the thing that needs it is alive: subscribing
// returns a Subscription guard, and dropping the guard removes the listener.
// The registry belongs to one page, so nothing outlives the page either.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};

/// Where a click landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// Inside the options menu of the given goal.
    OptionsMenu(String),
    /// On a goal row (not its menu).
    GoalRow(String),
    /// Anywhere else on the page.
    Elsewhere,
}

/// What a listener asks the page to do in response to a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickEffect {
    CloseMenu,
}

type Handler = Box<dyn Fn(&ClickTarget) -> Option<ClickEffect> + Send>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: BTreeMap<u64, Handler>,
}

/// Click listeners registered on one page.
#[derive(Clone, Default)]
pub struct ClickListeners {
    registry: Arc<Mutex<Registry>>,
}

impl std::fmt::Debug for ClickListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickListeners")
            .field("active", &self.len())
            .finish()
    }
}

impl ClickListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. It stays registered until the guard is dropped.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&ClickTarget) -> Option<ClickEffect> + Send + 'static,
    {
        let mut registry = match self.registry.lock() {
            Ok(r) => r,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = registry.next_id;
        registry.next_id += 1;
        registry.handlers.insert(id, Box::new(handler));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Run every active handler and collect the effects they request.
    pub fn dispatch(&self, target: &ClickTarget) -> Vec<ClickEffect> {
        match self.registry.lock() {
            Ok(registry) => registry
                .handlers
                .values()
                .filter_map(|handler| handler(target))
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Number of active subscriptions.
    pub fn len(&self) -> usize {
        self.registry.lock().map(|r| r.handlers.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Guard for a registered listener; dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut registry) = registry.lock() {
                registry.handlers.remove(&self.id);
            }
        }
    }
}

/// Handler that closes the options menu of `goal_id` on any click outside it.
pub fn close_on_outside_click(
    goal_id: String,
) -> impl Fn(&ClickTarget) -> Option<ClickEffect> + Send + 'static {
    move |target| match target {
        ClickTarget::OptionsMenu(id) if *id == goal_id => None,
        _ => Some(ClickEffect::CloseMenu),
    }
}
