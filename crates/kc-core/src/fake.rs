//! In-memory collaborators for unit tests.
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use kc_model::WorkloadInstance;

use crate::{
    channel::{CommandChannel, Connector},
    directory::WorkloadDirectory,
    error::{ChannelError, DirectoryError},
};

#[derive(Default)]
struct Namespace {
    selected: bool,
    instances: Vec<String>,
}

#[derive(Default)]
pub struct FakeDirectory {
    namespaces: Mutex<BTreeMap<String, Namespace>>,
    deleted: Mutex<Vec<(String, String)>>,
    fail_listing: AtomicBool,
    fail_delete: AtomicBool,
    hang: AtomicBool,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selected(self, namespace: &str, names: &[&str]) -> Self {
        self.put(namespace, true, names);
        self
    }

    pub fn with_unselected(self, namespace: &str, names: &[&str]) -> Self {
        self.put(namespace, false, names);
        self
    }

    pub fn put(&self, namespace: &str, selected: bool, names: &[&str]) {
        self.namespaces.lock().unwrap().insert(
            namespace.to_string(),
            Namespace {
                selected,
                instances: names.iter().map(|n| n.to_string()).collect(),
            },
        );
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn hang(&self, hang: bool) {
        self.hang.store(hang, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }

    async fn guard(&self, op: &'static str) -> Result<(), DirectoryError> {
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(DirectoryError::Rejected {
                op,
                reason: "injected failure".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WorkloadDirectory for FakeDirectory {
    async fn list_namespaces(&self, _selector: &str) -> Result<Vec<String>, DirectoryError> {
        self.guard("list namespaces").await?;
        let namespaces = self.namespaces.lock().unwrap();
        Ok(namespaces
            .iter()
            .filter(|(_, ns)| ns.selected)
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn list_instances(&self, namespace: &str) -> Result<Vec<WorkloadInstance>, DirectoryError> {
        self.guard("list instances").await?;
        let namespaces = self.namespaces.lock().unwrap();
        Ok(namespaces
            .get(namespace)
            .map(|ns| {
                ns.instances
                    .iter()
                    .map(|name| WorkloadInstance::new(namespace, name.as_str()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete_instance(&self, namespace: &str, name: &str) -> Result<(), DirectoryError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(DirectoryError::Rejected {
                op: "delete instance",
                reason: "injected failure".into(),
            });
        }
        if let Some(ns) = self.namespaces.lock().unwrap().get_mut(namespace) {
            ns.instances.retain(|n| n != name);
        }
        self.deleted
            .lock()
            .unwrap()
            .push((namespace.to_string(), name.to_string()));
        Ok(())
    }
}

/// What a fake connection yields from `recv`, in order.
#[derive(Clone, Debug)]
pub enum Incoming {
    Event(String),
    Fail,
    Close,
}

/// Hands out connections that record every sent line into one shared log.
///
/// Each connection consumes the next script; once scripts run out, `recv` blocks forever.
#[derive(Default)]
pub struct FakeConnector {
    sent: Arc<Mutex<Vec<String>>>,
    scripts: Mutex<VecDeque<Vec<Incoming>>>,
    connects: AtomicUsize,
    closes: Arc<AtomicUsize>,
    failing_connects: AtomicUsize,
    fail_send_at: Mutex<Option<usize>>,
    hang_sends: AtomicBool,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, script: Vec<Incoming>) -> Self {
        self.scripts.lock().unwrap().push_back(script);
        self
    }

    /// Refuse the next `n` connection attempts.
    pub fn fail_connects(&self, n: usize) {
        self.failing_connects.store(n, Ordering::SeqCst);
    }

    /// Fail the `index`-th send of the next connection.
    pub fn fail_send_at(&self, index: Option<usize>) {
        *self.fail_send_at.lock().unwrap() = index;
    }

    /// Make every send of later connections block forever.
    pub fn hang_sends(&self, hang: bool) {
        self.hang_sends.store(hang, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear_sent(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> Result<Box<dyn CommandChannel>, ChannelError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let refused = self
            .failing_connects
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if refused {
            return Err(ChannelError::Backend("connection refused".into()));
        }
        let incoming = self.scripts.lock().unwrap().pop_front();
        Ok(Box::new(FakeChannel {
            sent: Arc::clone(&self.sent),
            closes: Arc::clone(&self.closes),
            hang_sends: self.hang_sends.load(Ordering::SeqCst),
            hang_when_drained: incoming.is_none(),
            incoming: incoming.unwrap_or_default().into(),
            fail_send_at: self.fail_send_at.lock().unwrap().take(),
            sends: 0,
        }))
    }
}

struct FakeChannel {
    sent: Arc<Mutex<Vec<String>>>,
    closes: Arc<AtomicUsize>,
    hang_sends: bool,
    incoming: VecDeque<Incoming>,
    hang_when_drained: bool,
    fail_send_at: Option<usize>,
    sends: usize,
}

#[async_trait]
impl CommandChannel for FakeChannel {
    async fn send(&mut self, command: &str) -> Result<(), ChannelError> {
        if self.hang_sends {
            std::future::pending::<()>().await;
        }
        let index = self.sends;
        self.sends += 1;
        if self.fail_send_at == Some(index) {
            return Err(ChannelError::Closed);
        }
        self.sent.lock().unwrap().push(command.to_string());
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, ChannelError> {
        match self.incoming.pop_front() {
            Some(Incoming::Event(raw)) => Ok(Some(raw)),
            Some(Incoming::Fail) => Err(ChannelError::Backend("read failed".into())),
            Some(Incoming::Close) => Ok(None),
            None if self.hang_when_drained => std::future::pending().await,
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
