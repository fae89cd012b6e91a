use std::collections::BTreeMap;
use std::sync::Mutex;

use super::dispatcher::{DispatchError, NotificationDispatcher, NotificationRequest};

/// In-memory dispatcher that records scheduled alerts by identifier.
///
/// Re-scheduling an identifier replaces the earlier request. A failure can be
/// injected to exercise error paths.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    scheduled: Mutex<BTreeMap<String, NotificationRequest>>,
    failure: Mutex<Option<DispatchError>>,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dispatcher whose every `schedule` and `cancel` call fails with `error`.
    pub fn failing(error: DispatchError) -> Self {
        let d = Self::default();
        d.fail_with(Some(error));
        d
    }

    pub fn fail_with(&self, error: Option<DispatchError>) {
        if let Ok(mut slot) = self.failure.lock() {
            *slot = error;
        }
    }

    pub fn scheduled(&self) -> Vec<NotificationRequest> {
        self.scheduled
            .lock()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, identifier: &str) -> Option<NotificationRequest> {
        self.scheduled.lock().ok()?.get(identifier).cloned()
    }

    fn injected_failure(&self) -> Result<(), DispatchError> {
        match self.failure.lock().ok().and_then(|f| f.clone()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn schedule(&self, request: &NotificationRequest) -> Result<(), DispatchError> {
        self.injected_failure()?;

        let mut scheduled = self
            .scheduled
            .lock()
            .map_err(|_| DispatchError::Unavailable("dispatcher lock poisoned".to_string()))?;
        scheduled.insert(request.identifier.clone(), request.clone());
        Ok(())
    }

    fn cancel(&self, identifier: &str) -> Result<(), DispatchError> {
        self.injected_failure()?;
        let mut scheduled = self
            .scheduled
            .lock()
            .map_err(|_| DispatchError::Unavailable("dispatcher lock poisoned".to_string()))?;
        scheduled.remove(identifier);
        Ok(())
    }
}
