//! [`DiscordGateway`] -- the Gateway WebSocket connection loop.
//!
//! Keeps a session open (Hello, Identify or Resume, heartbeats), reconnects
//! after failures, and forwards `READY`, `RESUMED`, `INTERACTION_CREATE`
//! and connection drops to a [`GatewayEventHandler`].
//!
//! Interaction handlers run on spawned tasks, so a slow handler never
//! delays heartbeats or socket reads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::RwLock;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use fxg_types::{PlatformError, SecretString};

use crate::events::{
    ConnectionProperties, GatewayPayload, HelloData, IdentifyPayload, Interaction, OP_DISPATCH,
    OP_HEARTBEAT, OP_HEARTBEAT_ACK, OP_HELLO, OP_IDENTIFY, OP_INVALID_SESSION, OP_RECONNECT,
    OP_RESUME, ReadyEvent, ResumePayload,
};
use crate::traits::GatewayEventHandler;

/// Delay before reconnecting after a connection failure.
const RECONNECT_DELAY_SECS: u64 = 5;

/// Heartbeat interval used when Hello never arrives.
const FALLBACK_HEARTBEAT_MS: u64 = 41_250;

/// How a single connection ended.
#[derive(Debug, PartialEq, Eq)]
enum ConnectionEnd {
    /// The cancellation token fired.
    Cancelled,
    /// The connection dropped and should be re-established.
    Dropped,
}

/// Gateway v10 client.
pub struct DiscordGateway {
    token: SecretString,
    gateway_url: String,
    intents: u32,
    /// Last received sequence number for heartbeats and resuming.
    sequence: AtomicU64,
    /// Session ID from the READY event.
    session_id: RwLock<Option<String>>,
    /// Resume gateway URL from the READY event.
    resume_url: RwLock<Option<String>>,
}

impl DiscordGateway {
    pub fn new(token: SecretString, gateway_url: impl Into<String>, intents: u32) -> Self {
        Self {
            token,
            gateway_url: gateway_url.into(),
            intents,
            sequence: AtomicU64::new(0),
            session_id: RwLock::new(None),
            resume_url: RwLock::new(None),
        }
    }

    /// Run until `cancel` fires, reconnecting whenever the connection drops.
    ///
    /// `handler.on_disconnect` is called after every dropped connection and
    /// once more on shutdown.
    pub async fn run(
        &self,
        handler: Arc<dyn GatewayEventHandler>,
        cancel: CancellationToken,
    ) -> Result<(), PlatformError> {
        if self.token.is_empty() {
            return Err(PlatformError::Gateway("bot token is empty".into()));
        }

        info!("Discord gateway starting");

        loop {
            let end = self.run_connection(&handler, &cancel).await;
            handler.on_disconnect().await;

            if end == ConnectionEnd::Cancelled {
                break;
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(Duration::from_secs(RECONNECT_DELAY_SECS)) => {
                    info!("reconnecting Discord gateway...");
                }
            }
        }

        info!("Discord gateway stopped");
        Ok(())
    }

    async fn run_connection(
        &self,
        handler: &Arc<dyn GatewayEventHandler>,
        cancel: &CancellationToken,
    ) -> ConnectionEnd {
        let gateway_url = self
            .resume_url
            .read()
            .await
            .clone()
            .unwrap_or_else(|| self.gateway_url.clone());

        let ws_stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return ConnectionEnd::Cancelled,
            res = tokio_tungstenite::connect_async(&gateway_url) => match res {
                Ok((stream, _)) => stream,
                Err(e) => {
                    error!(error = %e, "failed to connect Discord gateway");
                    return ConnectionEnd::Dropped;
                }
            },
        };

        info!("Discord gateway connected");

        let (mut ws_write, mut ws_read) = ws_stream.split();

        // Wait for Hello (opcode 10).
        let heartbeat_interval = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = ws_write.close().await;
                    return ConnectionEnd::Cancelled;
                }
                msg = ws_read.next() => match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        if let Ok(payload) = serde_json::from_str::<GatewayPayload>(&text)
                            && payload.op == OP_HELLO
                            && let Some(d) = payload.d
                            && let Ok(hello) = serde_json::from_value::<HelloData>(d)
                        {
                            break hello.heartbeat_interval;
                        }
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error waiting for Hello");
                        return ConnectionEnd::Dropped;
                    }
                    None => break FALLBACK_HEARTBEAT_MS,
                    _ => {}
                },
            }
        };

        debug!(interval_ms = heartbeat_interval, "received Hello");

        let auth = self.auth_payload().await;
        if let Ok(json) = serde_json::to_string(&auth)
            && let Err(e) = ws_write.send(WsMessage::Text(json)).await
        {
            error!(error = %e, "failed to send Resume/Identify");
            return ConnectionEnd::Dropped;
        }

        let mut heartbeat_timer = tokio::time::interval(Duration::from_millis(heartbeat_interval));
        // The first tick fires immediately.
        heartbeat_timer.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Discord gateway received cancellation");
                    let _ = ws_write.close().await;
                    return ConnectionEnd::Cancelled;
                }
                _ = heartbeat_timer.tick() => {
                    let seq = self.sequence.load(Ordering::SeqCst);
                    if let Ok(json) = serde_json::to_string(&GatewayPayload::heartbeat(seq)) {
                        if let Err(e) = ws_write.send(WsMessage::Text(json)).await {
                            warn!(error = %e, "failed to send heartbeat");
                            return ConnectionEnd::Dropped;
                        }
                        debug!(seq, "sent heartbeat");
                    }
                }
                msg = ws_read.next() => match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        let payload = match serde_json::from_str::<GatewayPayload>(&text) {
                            Ok(payload) => payload,
                            Err(e) => {
                                warn!(error = %e, "failed to parse gateway payload");
                                continue;
                            }
                        };
                        if let Some(s) = payload.s {
                            self.sequence.store(s, Ordering::SeqCst);
                        }

                        match payload.op {
                            OP_DISPATCH => {
                                if let Some(ref event_name) = payload.t {
                                    self.dispatch(event_name, payload.d, handler).await;
                                }
                            }
                            OP_HEARTBEAT_ACK => debug!("heartbeat acknowledged"),
                            OP_HEARTBEAT => {
                                // Server requesting an immediate heartbeat.
                                let seq = self.sequence.load(Ordering::SeqCst);
                                if let Ok(json) = serde_json::to_string(&GatewayPayload::heartbeat(seq)) {
                                    let _ = ws_write.send(WsMessage::Text(json)).await;
                                }
                            }
                            OP_RECONNECT => {
                                info!("server requested reconnect");
                                return ConnectionEnd::Dropped;
                            }
                            OP_INVALID_SESSION => {
                                let resumable = payload
                                    .d
                                    .as_ref()
                                    .and_then(Value::as_bool)
                                    .unwrap_or(false);
                                if resumable {
                                    warn!("invalid session (resumable), retrying");
                                } else {
                                    warn!("invalid session (not resumable), clearing state for fresh Identify");
                                    self.clear_session().await;
                                }
                                return ConnectionEnd::Dropped;
                            }
                            op => debug!(op, "unhandled opcode"),
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        info!("Discord gateway closed by server");
                        return ConnectionEnd::Dropped;
                    }
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = ws_write.send(WsMessage::Pong(data)).await;
                    }
                    Some(Err(e)) => {
                        error!(error = %e, "Discord gateway WebSocket error");
                        return ConnectionEnd::Dropped;
                    }
                    None => {
                        info!("Discord gateway stream ended");
                        return ConnectionEnd::Dropped;
                    }
                    _ => {} // Binary, Pong, Frame
                },
            }
        }
    }

    /// Resume (OP 6) when a session exists, otherwise Identify (OP 2).
    async fn auth_payload(&self) -> GatewayPayload {
        let session_id = self.session_id.read().await.clone();
        let (op, d) = match session_id {
            Some(session_id) => {
                let seq = self.sequence.load(Ordering::SeqCst);
                info!(session_id = %session_id, seq, "attempting Resume (OP 6)");
                let resume = ResumePayload {
                    token: self.token.expose().to_owned(),
                    session_id,
                    seq,
                };
                (OP_RESUME, serde_json::to_value(resume))
            }
            None => {
                debug!("no session_id available, sending Identify (OP 2)");
                let identify = IdentifyPayload {
                    token: self.token.expose().to_owned(),
                    intents: self.intents,
                    properties: ConnectionProperties {
                        os: std::env::consts::OS.to_owned(),
                        browser: "fxg-relay".into(),
                        device: "fxg-relay".into(),
                    },
                };
                (OP_IDENTIFY, serde_json::to_value(identify))
            }
        };
        GatewayPayload {
            op,
            d: Some(d.unwrap_or_default()),
            s: None,
            t: None,
        }
    }

    async fn clear_session(&self) {
        *self.session_id.write().await = None;
        *self.resume_url.write().await = None;
        self.sequence.store(0, Ordering::SeqCst);
    }

    /// Route one dispatch event to the handler.
    ///
    /// Lifecycle events are awaited inline. Interactions are spawned onto
    /// their own task.
    pub(crate) async fn dispatch(
        &self,
        event_name: &str,
        d: Option<Value>,
        handler: &Arc<dyn GatewayEventHandler>,
    ) {
        match event_name {
            "READY" => {
                let Some(d) = d else { return };
                match serde_json::from_value::<ReadyEvent>(d) {
                    Ok(ready) => {
                        info!(
                            bot_id = %ready.user.id,
                            bot_name = %ready.user.tag(),
                            "Discord bot authenticated"
                        );
                        *self.session_id.write().await = Some(ready.session_id.clone());
                        *self.resume_url.write().await = ready.resume_gateway_url.clone();
                        handler.on_ready(ready).await;
                    }
                    Err(e) => warn!(error = %e, "failed to parse READY"),
                }
            }
            "RESUMED" => {
                info!("session resumed successfully");
                handler.on_resumed().await;
            }
            "INTERACTION_CREATE" => {
                let Some(d) = d else { return };
                match serde_json::from_value::<Interaction>(d) {
                    // Interaction handling makes REST calls; run it off the
                    // connection loop so heartbeats keep flowing.
                    Ok(interaction) => {
                        let handler = Arc::clone(handler);
                        tokio::spawn(async move {
                            handler.on_interaction(interaction).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "failed to parse INTERACTION_CREATE"),
                }
            }
            other => debug!(event = %other, "unhandled dispatch event"),
        }
    }
}
