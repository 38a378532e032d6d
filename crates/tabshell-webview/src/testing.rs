//! Recording host bridge for tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tabshell_common::{HostError, ViewId};

use crate::bridge::{HostAction, HostBridge, HostResponse, SurfaceOptions};
use crate::view::NavigationHistory;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Create {
        view_id: ViewId,
        options: SurfaceOptions,
    },
    Send {
        view_id: ViewId,
        action: HostAction,
    },
    Request {
        view_id: ViewId,
        action: HostAction,
    },
}

/// Records every call and answers requests with canned responses.
#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<HostCall>>,
    live: Mutex<HashSet<ViewId>>,
    fail_creates: AtomicBool,
    capture: Mutex<Vec<u8>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        let host = Self::default();
        *lock(&host.capture) = vec![0x89, b'P', b'N', b'G'];
        Arc::new(host)
    }

    pub fn calls(&self) -> Vec<HostCall> {
        lock(&self.calls).clone()
    }

    pub fn clear(&self) {
        lock(&self.calls).clear();
    }

    /// Ids passed to `create_surface`, in order.
    pub fn created(&self) -> Vec<ViewId> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                HostCall::Create { view_id, .. } => Some(view_id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn create_options(&self, id: &ViewId) -> Option<SurfaceOptions> {
        lock(&self.calls).iter().rev().find_map(|call| match call {
            HostCall::Create { view_id, options } if view_id == id => Some(options.clone()),
            _ => None,
        })
    }

    /// Actions sent or requested for one view, in order.
    pub fn actions_for(&self, id: &ViewId) -> Vec<HostAction> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                HostCall::Send { view_id, action } | HostCall::Request { view_id, action }
                    if view_id == id =>
                {
                    Some(action.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub fn count_for(&self, id: &ViewId, name: &str) -> usize {
        self.actions_for(id)
            .iter()
            .filter(|a| a.name() == name)
            .count()
    }

    pub fn is_live(&self, id: &ViewId) -> bool {
        lock(&self.live).contains(id)
    }

    pub fn live_count(&self) -> usize {
        lock(&self.live).len()
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn set_capture(&self, png: Vec<u8>) {
        *lock(&self.capture) = png;
    }
}

#[async_trait]
impl HostBridge for RecordingHost {
    fn create_surface(&self, view_id: &ViewId, options: &SurfaceOptions) -> Result<(), HostError> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(HostError::Rejected {
                action: "CREATE".into(),
                reason: "creation disabled".into(),
            });
        }
        lock(&self.calls).push(HostCall::Create {
            view_id: view_id.clone(),
            options: options.clone(),
        });
        lock(&self.live).insert(view_id.clone());
        Ok(())
    }

    fn send(&self, view_id: &ViewId, action: HostAction) -> Result<(), HostError> {
        if action == HostAction::Destroy {
            lock(&self.live).remove(view_id);
        }
        lock(&self.calls).push(HostCall::Send {
            view_id: view_id.clone(),
            action,
        });
        Ok(())
    }

    async fn request(
        &self,
        view_id: &ViewId,
        action: HostAction,
    ) -> Result<HostResponse, HostError> {
        if !self.is_live(view_id) {
            return Err(HostError::UnknownSurface(view_id.to_string()));
        }
        let response = match &action {
            HostAction::CapturePage => HostResponse::Image(lock(&self.capture).clone()),
            HostAction::GetUrl => HostResponse::Url(String::new()),
            HostAction::GetNavigationHistory => HostResponse::History(NavigationHistory::default()),
            HostAction::IsCurrentlyAudible => HostResponse::Bool(false),
            HostAction::ExecuteJavascript { .. } => HostResponse::Value(Value::Null),
            _ => HostResponse::Ack,
        };
        lock(&self.calls).push(HostCall::Request {
            view_id: view_id.clone(),
            action,
        });
        Ok(response)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
