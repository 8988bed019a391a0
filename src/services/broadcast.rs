//! Event forwarding to the hosted broker via its REST trigger API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::PusherEndpoint;
use crate::error::{AppError, AppResult};
use crate::models::{BroadcastEvent, Credentials};

const AUTH_VERSION: &str = "1.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Publishes events to subscribers. Delivery itself is the broker's job.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    async fn trigger(&self, event: &BroadcastEvent) -> AppResult<()>;
}

/// Wire body of `POST /apps/{app_id}/events`. `data` is JSON encoded as a string.
#[derive(Debug, Serialize)]
struct TriggerBody<'a> {
    name: &'a str,
    channels: &'a [String],
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    socket_id: Option<&'a str>,
}

impl<'a> TriggerBody<'a> {
    fn from_event(event: &'a BroadcastEvent) -> AppResult<Self> {
        Ok(Self {
            name: &event.name,
            channels: &event.channels,
            data: serde_json::to_string(&event.data)?,
            socket_id: event.socket_id.as_deref(),
        })
    }
}

/// Broker REST client signing each request with the app credentials.
#[derive(Debug, Clone)]
pub struct PusherBroadcaster {
    client: reqwest::Client,
    credentials: Credentials,
    base_url: String,
    app_id: String,
}

impl PusherBroadcaster {
    pub fn new(credentials: Credentials, endpoint: &PusherEndpoint) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            credentials,
            base_url: endpoint.base_url(),
            app_id: endpoint.app_id.clone(),
        })
    }

    fn events_path(&self) -> String {
        format!("/apps/{}/events", self.app_id)
    }
}

#[async_trait]
impl Broadcaster for PusherBroadcaster {
    async fn trigger(&self, event: &BroadcastEvent) -> AppResult<()> {
        let path = self.events_path();
        let body = serde_json::to_string(&TriggerBody::from_event(event)?)?;
        let query = signed_query(&self.credentials, "POST", &path, &body, Utc::now().timestamp())?;
        let url = format!("{}{}?{}", self.base_url, path, query);

        let res = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            warn!(status = %status, event = %event.name, "broker rejected event");
            return Err(AppError::Broadcast(format!(
                "broker responded with {}",
                status
            )));
        }

        info!(channels = ?event.channels, event = %event.name, "broadcast");
        Ok(())
    }
}

/// Query string for a signed REST call, `auth_signature` last.
///
/// Signed string: `METHOD\npath\nsorted_query` where the query carries `auth_key`,
/// `auth_timestamp`, `auth_version` and `body_md5`.
pub(crate) fn signed_query(
    credentials: &Credentials,
    method: &str,
    path: &str,
    body: &str,
    timestamp: i64,
) -> AppResult<String> {
    let body_md5 = format!("{:x}", md5::compute(body.as_bytes()));
    // keys are already in lexical order
    let params = [
        ("auth_key", credentials.app_key().to_string()),
        ("auth_timestamp", timestamp.to_string()),
        ("auth_version", AUTH_VERSION.to_string()),
        ("body_md5", body_md5),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let string_to_sign = format!("{}\n{}\n{}", method, path, query);
    let signature = credentials.sign(string_to_sign.as_bytes())?;
    Ok(format!("{}&auth_signature={}", query, signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::Uri, routing::post, Router};
    use std::net::SocketAddr;
    use tokio::sync::mpsc;

    const DOCS_SECRET: &str = "7ad3773142a6692b25b8";

    fn docs_credentials() -> Credentials {
        Credentials::new("278d425bdf160c739803", DOCS_SECRET).unwrap()
    }

    /// Local stand-in for the broker: answers every trigger with `status` and reports
    /// the request URI and body it saw.
    async fn spawn_broker(
        status: reqwest::StatusCode,
    ) -> (SocketAddr, mpsc::UnboundedReceiver<(String, String)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/apps/:app_id/events",
            post(move |uri: Uri, body: String| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send((uri.to_string(), body));
                    axum::http::StatusCode::from_u16(status.as_u16()).unwrap()
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, rx)
    }

    fn local_broadcaster(addr: SocketAddr) -> PusherBroadcaster {
        let endpoint = PusherEndpoint {
            app_id: "3".to_string(),
            scheme: "http".to_string(),
            host: addr.to_string(),
        };
        let mut broadcaster = PusherBroadcaster::new(docs_credentials(), &endpoint).unwrap();
        // a proxy from the environment must not intercept loopback traffic
        broadcaster.client = reqwest::Client::builder().no_proxy().build().unwrap();
        broadcaster
    }

    fn query_param<'a>(uri: &'a str, name: &str) -> Option<&'a str> {
        let (_, query) = uri.split_once('?')?;
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
    }

    fn chat_event() -> BroadcastEvent {
        BroadcastEvent::new(
            "private-chat",
            "new_message",
            serde_json::json!({ "name": "ann", "message": "hi" }),
        )
        .excluding(Some("1.2"))
    }

    #[tokio::test]
    async fn trigger_sends_signed_request() {
        let (addr, mut rx) = spawn_broker(reqwest::StatusCode::OK).await;
        local_broadcaster(addr).trigger(&chat_event()).await.unwrap();

        let (uri, body) = rx.recv().await.unwrap();
        assert!(uri.starts_with("/apps/3/events?"), "uri: {}", uri);
        assert_eq!(query_param(&uri, "auth_key"), Some("278d425bdf160c739803"));
        assert_eq!(query_param(&uri, "auth_version"), Some("1.0"));
        let body_md5 = format!("{:x}", md5::compute(body.as_bytes()));
        assert_eq!(query_param(&uri, "body_md5"), Some(body_md5.as_str()));

        let timestamp: i64 = query_param(&uri, "auth_timestamp").unwrap().parse().unwrap();
        let expected =
            signed_query(&docs_credentials(), "POST", "/apps/3/events", &body, timestamp).unwrap();
        assert_eq!(uri.split_once('?').unwrap().1, expected);
        assert!(!uri.contains(DOCS_SECRET));

        let sent: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(sent["name"], "new_message");
        assert_eq!(sent["socket_id"], "1.2");
    }

    #[tokio::test]
    async fn trigger_maps_error_status_to_broadcast_error() {
        let (addr, mut rx) = spawn_broker(reqwest::StatusCode::INTERNAL_SERVER_ERROR).await;
        let err = local_broadcaster(addr)
            .trigger(&chat_event())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Broadcast(_)), "got {:?}", err);
        let message = err.to_string();
        assert!(message.contains("500"), "message: {}", message);
        assert!(!message.contains(DOCS_SECRET));
        assert!(!message.contains("auth_signature"));

        let (uri, _) = rx.recv().await.unwrap();
        assert!(query_param(&uri, "auth_signature").is_some());
    }

    #[test]
    fn trigger_body_encodes_data_as_string() {
        let event = BroadcastEvent::new(
            "project-3",
            "foo",
            serde_json::json!({ "some": "data" }),
        );
        let body = serde_json::to_string(&TriggerBody::from_event(&event).unwrap()).unwrap();
        assert_eq!(
            body,
            r#"{"name":"foo","channels":["project-3"],"data":"{\"some\":\"data\"}"}"#
        );
    }

    #[test]
    fn trigger_body_carries_excluded_socket() {
        let event = BroadcastEvent::new("private-chat", "new_message", serde_json::json!({}))
            .excluding(Some("1.2"));
        let body = serde_json::to_value(TriggerBody::from_event(&event).unwrap()).unwrap();
        assert_eq!(body["socket_id"], "1.2");
    }

    #[test]
    fn signed_query_matches_docs_vector() {
        let body = r#"{"name":"foo","channels":["project-3"],"data":"{\"some\":\"data\"}"}"#;
        let query =
            signed_query(&docs_credentials(), "POST", "/apps/3/events", body, 1353088179).unwrap();
        assert_eq!(
            query,
            "auth_key=278d425bdf160c739803\
             &auth_timestamp=1353088179\
             &auth_version=1.0\
             &body_md5=ec365a775a4cd0599faeb73354201b6f\
             &auth_signature=da454824c97ba181a32ccc17a72625ba02771f50b50e1e7430e47a1f3f457e6c"
        );
    }

    #[test]
    fn signed_query_omits_secret() {
        let query = signed_query(&docs_credentials(), "POST", "/apps/3/events", "{}", 1).unwrap();
        assert!(!query.contains(DOCS_SECRET));
    }
}
