//! Firebase Realtime Database client
//!
//! Uses the REST API: every location is addressable as `<base>/<path>.json`.
//! Writes are `PUT` (replace), `PATCH` (merge fields) and `DELETE`. Listeners
//! are long-lived `GET` requests answered with an event stream, mirrored
//! locally so every change can be reported as a full snapshot.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::event_stream::{DatabaseEvent, EventParser, Mirror};
use super::push_id::PushIdGenerator;
use super::{segments, RemoteStore, StoreError, StoreEvent, StoreResult, Subscription};

/// REST client for one database
#[derive(Debug)]
pub struct FirebaseStore {
    client: Client,
    base_url: String,
    auth: Option<String>,
    keys: PushIdGenerator,
}

impl FirebaseStore {
    /// Create a client for `base_url` (e.g. `https://<project>.firebaseio.com`)
    ///
    /// `auth` is sent as the `auth` query parameter on every request.
    pub fn new(base_url: &str, auth: Option<String>) -> StoreResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(StoreError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            client: Client::new(),
            base_url: base_url.to_string(),
            auth: auth.filter(|token| !token.is_empty()),
            keys: PushIdGenerator::new(),
        })
    }

    /// Database URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// REST endpoint for a location
    pub fn url(&self, path: &str) -> String {
        let path: Vec<&str> = segments(path).collect();
        if path.is_empty() {
            format!("{}/.json", self.base_url)
        } else {
            format!("{}/{}.json", self.base_url, path.join("/"))
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match self.auth {
            Some(ref token) => builder.query(&[("auth", token.as_str())]),
            None => builder,
        }
    }

    /// Send a write and check the response status
    async fn send_write(&self, builder: RequestBuilder) -> StoreResult<()> {
        let response = builder.query(&[("print", "silent")]).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::from_response(status, &body))
    }
}

fn key_path(path: &str, key: &str) -> String {
    format!("{}/{}", path.trim_end_matches('/'), key)
}

#[async_trait]
impl RemoteStore for FirebaseStore {
    /// Open a listener in a background task
    ///
    /// Must be called from within a Tokio runtime.
    fn subscribe(&self, path: &str) -> Subscription {
        let (tx, subscription) = Subscription::channel();
        let request = self
            .request(Method::GET, path)
            .header(ACCEPT, "text/event-stream");

        info!("Listening on {}", self.url(path));
        tokio::spawn(listen(request, tx));

        subscription
    }

    fn generate_key(&self, _path: &str) -> String {
        self.keys.generate()
    }

    async fn write(&self, path: &str, key: &str, record: Value) -> StoreResult<()> {
        debug!("PUT {}/{}", path, key);
        let builder = self.request(Method::PUT, &key_path(path, key)).json(&record);
        self.send_write(builder).await
    }

    async fn write_field(
        &self,
        path: &str,
        key: &str,
        field: &str,
        value: Value,
    ) -> StoreResult<()> {
        debug!("PATCH {}/{} {}", path, key, field);
        let mut body = serde_json::Map::new();
        body.insert(field.to_string(), value);
        let builder = self
            .request(Method::PATCH, &key_path(path, key))
            .json(&Value::Object(body));
        self.send_write(builder).await
    }

    async fn remove(&self, path: &str, key: &str) -> StoreResult<()> {
        debug!("DELETE {}/{}", path, key);
        let builder = self.request(Method::DELETE, &key_path(path, key));
        self.send_write(builder).await
    }
}

/// Listener task: runs until the stream ends or the subscription is dropped
async fn listen(request: RequestBuilder, tx: mpsc::UnboundedSender<StoreEvent>) {
    match stream_snapshots(request, &tx).await {
        Ok(()) => debug!("Listener closed by subscriber"),
        Err(e) => {
            warn!("Listener stopped: {}", e);
            let _ = tx.send(StoreEvent::Error(e));
        }
    }
}

async fn stream_snapshots(
    request: RequestBuilder,
    tx: &mpsc::UnboundedSender<StoreEvent>,
) -> StoreResult<()> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StoreError::from_response(status, &body));
    }

    let mut body = response.bytes_stream();
    let mut parser = EventParser::new();
    let mut mirror = Mirror::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        for raw in parser.feed(&chunk) {
            let Some(event) = DatabaseEvent::parse(&raw)? else {
                debug!("Ignoring stream event '{}'", raw.event);
                continue;
            };

            match event {
                DatabaseEvent::Cancel(reason) => return Err(StoreError::Cancelled(reason)),
                DatabaseEvent::AuthRevoked => return Err(StoreError::AuthRevoked),
                DatabaseEvent::KeepAlive => {}
                data_event => {
                    if mirror.apply(data_event) {
                        let snapshot = mirror.snapshot();
                        debug!("Snapshot with {} children", snapshot.len());
                        if tx.send(StoreEvent::Snapshot(snapshot)).is_err() {
                            return Ok(());
                        }
                    }
                }
            }
        }

        if tx.is_closed() {
            return Ok(());
        }
    }

    Err(StoreError::Stream("connection closed by database".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        assert!(matches!(
            FirebaseStore::new("example.firebaseio.com", None),
            Err(StoreError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_url_building() {
        let store = FirebaseStore::new("https://demo.firebaseio.com/", None).unwrap();
        assert_eq!(store.base_url(), "https://demo.firebaseio.com");
        assert_eq!(store.url("tasks"), "https://demo.firebaseio.com/tasks.json");
        assert_eq!(
            store.url("/tasks/-Nabc/"),
            "https://demo.firebaseio.com/tasks/-Nabc.json"
        );
        assert_eq!(store.url(""), "https://demo.firebaseio.com/.json");
    }

    #[test]
    fn test_auth_query_parameter() {
        let store =
            FirebaseStore::new("https://demo.firebaseio.com", Some("secret".into())).unwrap();
        let request = store.request(Method::GET, "tasks").build().unwrap();
        assert_eq!(request.url().query(), Some("auth=secret"));

        let anonymous = FirebaseStore::new("https://demo.firebaseio.com", Some(String::new()))
            .unwrap();
        let request = anonymous.request(Method::GET, "tasks").build().unwrap();
        assert_eq!(request.url().query(), None);
    }

    #[test]
    fn test_debug_shows_base_url() {
        let store = FirebaseStore::new("https://demo.firebaseio.com", None).unwrap();
        assert!(format!("{:?}", store).contains("https://demo.firebaseio.com"));
        assert!(FirebaseStore::new("demo", None).unwrap_err().to_string().contains("demo"));
    }

    #[test]
    fn test_generated_keys_differ() {
        let store = FirebaseStore::new("https://demo.firebaseio.com", None).unwrap();
        assert_ne!(store.generate_key("tasks"), store.generate_key("tasks"));
    }
}
