//! In-memory fakes for the collaborator traits, with call counters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::context::BotContext;
use crate::error::{FetchError, StoreError, TranslateError};
use crate::feed::ChangeFeed;
use crate::platform::ChatSender;
use crate::storage::LanguageStore;
use crate::translate::Translator;

#[derive(Default)]
pub struct FakeStore {
    languages: Mutex<HashMap<String, String>>,
    fail: bool,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
}

impl FakeStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn with(self, user_id: &str, language: &str) -> Self {
        self.languages
            .lock()
            .unwrap()
            .insert(user_id.to_string(), language.to_string());
        self
    }

    pub fn stored(&self, user_id: &str) -> Option<String> {
        self.languages.lock().unwrap().get(user_id).cloned()
    }

    pub fn calls(&self) -> usize {
        self.reads.load(Ordering::SeqCst) + self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageStore for FakeStore {
    async fn get_language(&self, user_id: &str) -> Result<Option<String>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Closed);
        }
        Ok(self.stored(user_id))
    }

    async fn set_language(&self, user_id: &str, language: &str) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::Closed);
        }
        self.languages
            .lock()
            .unwrap()
            .insert(user_id.to_string(), language.to_string());
        Ok(())
    }
}

pub struct FakeFeed {
    rendered: Option<String>,
    pub fetches: AtomicUsize,
}

impl FakeFeed {
    pub fn ok(rendered: &str) -> Self {
        Self {
            rendered: Some(rendered.to_string()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Fails every fetch with a 503 status.
    pub fn failing() -> Self {
        Self {
            rendered: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChangeFeed for FakeFeed {
    async fn fetch(&self) -> Result<String, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.rendered
            .clone()
            .ok_or(FetchError::Status(reqwest::StatusCode::SERVICE_UNAVAILABLE))
    }
}

pub struct FakeTranslator {
    fail: bool,
    pub calls: AtomicUsize,
}

impl FakeTranslator {
    /// Succeeds with `"[<lang>] <text>"`.
    pub fn tagging() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for FakeTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TranslateError::Malformed("service down".to_string()));
        }
        Ok(format!("[{}] {}", target_lang, text))
    }
}

#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatSender for RecordingSender {
    async fn send(&self, chat_id: &str, text: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((chat_id.to_string(), text.to_string()));
        Ok(())
    }
}

/// Fakes kept behind `Arc`s so tests can inspect them after handing them out.
pub struct Harness {
    pub store: Arc<FakeStore>,
    pub feed: Arc<FakeFeed>,
    pub translator: Arc<FakeTranslator>,
}

impl Harness {
    pub fn new(store: FakeStore, feed: FakeFeed, translator: FakeTranslator) -> Self {
        Self {
            store: Arc::new(store),
            feed: Arc::new(feed),
            translator: Arc::new(translator),
        }
    }

    pub fn context(&self) -> BotContext {
        BotContext::new(
            self.store.clone(),
            self.feed.clone(),
            self.translator.clone(),
        )
    }
}

/// A complete HTTP/1.1 response with a JSON content type.
pub fn http_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    )
}

/// Serve `response` verbatim to the first connection on a local port.
///
/// Returns the base URL and a handle yielding the raw request head.
pub async fn serve_once(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{}", addr), handle)
}
