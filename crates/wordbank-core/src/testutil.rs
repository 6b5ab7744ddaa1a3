//! In-memory doubles for unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{OracleError, StoreError};
use crate::traits::{EntryStore, GradeRequest, GradingFeedback, GradingOracle};

/// Map-backed store that can be switched into a failing state.
#[derive(Default)]
pub struct MapStore {
    data: Mutex<BTreeMap<String, String>>,
    failing: AtomicBool,
}

impl MapStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("test store offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl EntryStore for MapStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.check()?;
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check()?;
        self.insert_raw(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.check()?;
        self.data.lock().unwrap().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        self.check()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

/// Grader that replays queued results and records every request.
#[derive(Default)]
pub struct ScriptedGrader {
    replies: Mutex<VecDeque<Result<GradingFeedback, OracleError>>>,
    pub requests: Mutex<Vec<GradeRequest>>,
    pub calls: AtomicUsize,
}

impl ScriptedGrader {
    pub fn push(&self, reply: Result<GradingFeedback, OracleError>) {
        self.replies.lock().unwrap().push_back(reply);
    }
}

#[async_trait]
impl GradingOracle for ScriptedGrader {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn grade(&self, request: &GradeRequest) -> Result<GradingFeedback, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(OracleError::NetworkError("no scripted reply".into())))
    }
}
