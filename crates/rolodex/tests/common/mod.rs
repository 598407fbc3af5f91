//! Shared harness: a live server on a random port, backed by a memory store
//! unless a test supplies its own.

#![allow(dead_code)]

use reqwest::{Client, Response, StatusCode};
use rolodex::api::serve_with_shutdown;
use rolodex::{AppState, MemoryStore, RecordStore, Resource};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestServer<S = MemoryStore> {
    pub base: String,
    pub client: Client,
    pub state: AppState<S>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<rolodex::Result<()>>>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        Self::spawn_with(MemoryStore::new()).await
    }
}

impl<S: RecordStore> TestServer<S> {
    pub async fn spawn_with(store: S) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = AppState::new(store);
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(serve_with_shutdown(
            listener,
            state.clone(),
            false,
            async move {
                let _ = rx.await;
            },
        ));

        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
            state,
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.client.post(self.url(path)).json(body).send().await.unwrap()
    }

    pub async fn put(&self, path: &str, body: &Value) -> Response {
        self.client.put(self.url(path)).json(body).send().await.unwrap()
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.client.delete(self.url(path)).send().await.unwrap()
    }

    pub async fn count<T: Resource>(&self) -> usize {
        self.state.store.count::<T>().await.unwrap()
    }

    pub async fn stop(mut self) {
        drop(self.client);
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await.unwrap().unwrap();
        }
    }
}

/// Status and JSON body of a response.
pub async fn body_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap();
    (status, body)
}

/// Error message of a `{"error": ...}` body.
pub async fn error_message(response: Response) -> (StatusCode, String) {
    let (status, body) = body_json(response).await;
    let message = body["error"].as_str().unwrap().to_string();
    (status, message)
}
