//! Test doubles for the store and network seams.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::Error;
use crate::cache::CacheStore;
use crate::fetcher::NetworkFetcher;
use crate::hooks::{Notification, NotificationHost, SyncTask};
use crate::request::{RequestDescriptor, RequestKey};
use crate::response::{Response, StoredResponse};

/// Fetcher answering from a URL table. Unknown URLs fail like a dropped connection.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Response>>,
    requested: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, response: Response) {
        self.responses.lock().unwrap().insert(url.to_string(), response);
    }

    pub fn fail(&self, url: &str) {
        self.responses.lock().unwrap().remove(url);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl NetworkFetcher for ScriptedFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<Response, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let url = request.url().to_string();
        self.requested.lock().unwrap().push(url.clone());
        self.responses
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .ok_or_else(|| Error::NetworkFailure(format!("connection refused: {url}")))
    }
}

/// Store wrapper counting entry reads and writes.
pub struct CountingStore<S> {
    inner: S,
    gets: AtomicUsize,
    puts: AtomicUsize,
    fail_puts: AtomicBool,
}

impl<S: CacheStore> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, gets: AtomicUsize::new(0), puts: AtomicUsize::new(0), fail_puts: AtomicBool::new(false) }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: CacheStore> CacheStore for CountingStore<S> {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.inner.open(name).await
    }

    async fn get(&self, name: &str, key: &RequestKey) -> Result<Option<StoredResponse>, Error> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(name, key).await
    }

    async fn put(&self, name: &str, key: &RequestKey, entry: StoredResponse) -> Result<(), Error> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::StoreWriteFailure("disk full".into()));
        }
        self.inner.put(name, key, entry).await
    }

    async fn put_all(&self, name: &str, entries: Vec<(RequestKey, StoredResponse)>) -> Result<(), Error> {
        self.puts.fetch_add(entries.len(), Ordering::SeqCst);
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::StoreWriteFailure("disk full".into()));
        }
        self.inner.put_all(name, entries).await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.inner.delete(name).await
    }

    async fn list_names(&self) -> Result<Vec<String>, Error> {
        self.inner.list_names().await
    }

    async fn keys(&self, name: &str) -> Result<Vec<RequestKey>, Error> {
        self.inner.keys(name).await
    }
}

/// Notification host remembering every call.
#[derive(Default)]
pub struct RecordingHost {
    shown: Mutex<Vec<Notification>>,
    opened: Mutex<Vec<String>>,
    closed: AtomicUsize,
    refuse: AtomicBool,
}

impl RecordingHost {
    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Make every later call fail.
    pub fn refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), Error> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(Error::InvalidState("no window client".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationHost for RecordingHost {
    async fn show(&self, notification: Notification) -> Result<(), Error> {
        self.check()?;
        self.shown.lock().unwrap().push(notification);
        Ok(())
    }

    async fn close(&self, _notification: &Notification) -> Result<(), Error> {
        self.check()?;
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn open_window(&self, url: &str) -> Result<(), Error> {
        self.check()?;
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSync {
    runs: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl RecordingSync {
    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SyncTask for RecordingSync {
    async fn run(&self, tag: &str) -> Result<(), Error> {
        self.runs.lock().unwrap().push(tag.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::NetworkFailure(format!("outbox flush failed for {tag}")));
        }
        Ok(())
    }
}
