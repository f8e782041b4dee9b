use std::sync::{Arc, Weak};

use domain::core::{FormConfig, FormController};
use domain::timers::TimerFired;
use tokio::sync::{Mutex, MutexGuard, mpsc::UnboundedReceiver};
use tracing::debug;

use crate::store::AppStore;

pub type Controller = FormController<AppStore>;

/// Cheaply clonable handle to the one form controller of this process.
/// Holding the lock for a whole request keeps events strictly sequential.
#[derive(Clone)]
pub struct FormHandle {
    inner: Arc<Mutex<Controller>>,
}

impl FormHandle {
    /// Builds the controller, runs the page-load step and starts applying timers
    pub async fn start(store: AppStore, config: FormConfig) -> Self {
        let (mut controller, timers) = FormController::new(Arc::new(store), config);
        controller.load().await;

        let handle = Self {
            inner: Arc::new(Mutex::new(controller)),
        };
        tokio::spawn(apply_timers(Arc::downgrade(&handle.inner), timers));
        handle
    }

    pub async fn controller(&self) -> MutexGuard<'_, Controller> {
        self.inner.lock().await
    }
}

async fn apply_timers(
    controller: Weak<Mutex<Controller>>,
    mut timers: UnboundedReceiver<TimerFired>,
) {
    while let Some(fired) = timers.recv().await {
        let Some(controller) = controller.upgrade() else {
            break;
        };
        controller.lock().await.apply_timer(fired);
    }
    debug!("Timer loop stopped");
}
