//! Relay channel: lifecycle of the persistent connection for one
//! pairing session
//!
//! 1. Dial the relay at `{ws_origin}/api/ws/pos/{session_id}`
//! 2. Guard the dial with the connection timeout
//! 3. Keep-alive `{"type":"ping"}` while open
//! 4. Decode inbound frames and hand them to the dispatcher
//! 5. Reconnect after a fixed delay on abnormal close
//! 6. Manual close (or handle drop) suppresses reconnect

use std::fmt;
use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use shared::message::{Notice, NoticeCategory, OutboundMessage, ScannerStatus};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, connect_async};
use tokio_util::sync::CancellationToken;

use crate::catalog::CatalogLookup;
use crate::config::ChannelConfig;
use crate::decode;
use crate::dispatch::EventDispatcher;
use crate::error::ChannelError;
use crate::notify::Notifier;
use crate::order::ActiveOrder;
use crate::scan::{ScanConsumer, ScanCue};
use crate::session::PairingSession;

pub type WsStream = tokio_tungstenite::WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Connection state of the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Indicator event surfaced to the owning UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Channel connection state changed
    State(ChannelState),
    /// Mobile scanner presence changed
    Scanner(ScannerStatus),
}

/// Builder for a relay channel.
pub struct RelayChannel {
    config: ChannelConfig,
    catalog: Arc<dyn CatalogLookup>,
    cue: Option<Arc<dyn ScanCue>>,
}

impl RelayChannel {
    pub fn new(config: ChannelConfig, catalog: Arc<dyn CatalogLookup>) -> Self {
        Self {
            config,
            catalog,
            cue: None,
        }
    }

    /// Attach a cue fired on accepted scans.
    pub fn with_cue(mut self, cue: Arc<dyn ScanCue>) -> Self {
        self.cue = Some(cue);
        self
    }

    /// Start the channel for a fresh pairing session.
    pub fn connect(self) -> RelayChannelHandle {
        self.connect_with_session(PairingSession::generate())
    }

    /// Start the channel for a caller-supplied session.
    pub fn connect_with_session(self, session: PairingSession) -> RelayChannelHandle {
        let notifier = Notifier::default();
        let (events_tx, _) = broadcast::channel(64);
        let order = Arc::new(Mutex::new(ActiveOrder::new()));
        let shutdown = CancellationToken::new();

        let task = ChannelTask {
            config: self.config.clone(),
            relay_url: session.relay_url(self.config.relay_origin()),
            session: session.clone(),
            catalog: self.catalog.clone(),
            cue: self.cue.clone(),
            order: order.clone(),
            notifier: notifier.clone(),
            events_tx: events_tx.clone(),
            shutdown: shutdown.clone(),
        };
        let join = tokio::spawn(task.run());

        RelayChannelHandle {
            config: self.config,
            session,
            catalog: self.catalog,
            cue: self.cue,
            order,
            notifier,
            events_tx,
            shutdown,
            task: Some(join),
        }
    }
}

/// Owning handle for a running channel.
///
/// Dropping the handle closes the connection as a manual close: the
/// socket is shut and no reconnect fires afterwards.
pub struct RelayChannelHandle {
    config: ChannelConfig,
    session: PairingSession,
    catalog: Arc<dyn CatalogLookup>,
    cue: Option<Arc<dyn ScanCue>>,
    order: Arc<Mutex<ActiveOrder>>,
    notifier: Notifier,
    events_tx: broadcast::Sender<ChannelEvent>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RelayChannelHandle {
    pub fn session(&self) -> &PairingSession {
        &self.session
    }

    /// Address rendered as the scannable pairing code.
    pub fn pairing_url(&self) -> String {
        self.session.pairing_url(&self.config.origin)
    }

    /// The order scans are inserted into.
    pub fn order(&self) -> Arc<Mutex<ActiveOrder>> {
        self.order.clone()
    }

    /// Subscribe to operator notices.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    /// Subscribe to state and scanner indicator events.
    pub fn events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events_tx.subscribe()
    }

    /// Manual close. Suppresses the reconnect that a network failure
    /// would otherwise schedule.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    /// Abandon the current session and start over with a fresh id. The
    /// previous connection is torn down before the replacement dials.
    pub fn reset(self) -> RelayChannelHandle {
        self.shutdown.cancel();
        RelayChannel {
            config: self.config.clone(),
            catalog: self.catalog.clone(),
            cue: self.cue.clone(),
        }
        .connect()
    }

    /// Wait for the channel task to finish (meaningful after `close`).
    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for RelayChannelHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// The background task that owns the socket.
struct ChannelTask {
    config: ChannelConfig,
    relay_url: String,
    session: PairingSession,
    catalog: Arc<dyn CatalogLookup>,
    cue: Option<Arc<dyn ScanCue>>,
    order: Arc<Mutex<ActiveOrder>>,
    notifier: Notifier,
    events_tx: broadcast::Sender<ChannelEvent>,
    shutdown: CancellationToken,
}

impl ChannelTask {
    /// Main run loop: dial, run the session, re-dial on abnormal close.
    async fn run(mut self) {
        tracing::info!(session_id = %self.session.session_id(), "relay channel started");

        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let mut scan = ScanConsumer::new(
            self.catalog.clone(),
            self.order.clone(),
            self.notifier.clone(),
            self.config.duplicate_scan_window,
        );
        if let Some(cue) = &self.cue {
            scan = scan.with_cue(cue.clone());
        }
        // Dedup markers and the one-time ack notice live for the whole
        // channel instance, across reconnects of the same session.
        let mut dispatcher = EventDispatcher::new(
            self.session.session_id(),
            scan,
            self.notifier.clone(),
            self.events_tx.clone(),
            outbound_tx,
            self.config.duplicate_notice_window,
        );

        loop {
            if self.shutdown.is_cancelled() {
                break;
            }

            self.emit_state(ChannelState::Connecting);
            match self.dial().await {
                Ok(ws) => {
                    self.emit_state(ChannelState::Open);
                    self.notifier.send(Notice::success(
                        NoticeCategory::Channel,
                        "Connected",
                        "Relay channel open",
                    ));

                    let should_reconnect =
                        self.run_session(ws, &mut dispatcher, &mut outbound_rx).await;
                    self.emit_state(ChannelState::Closed);

                    if !should_reconnect {
                        break;
                    }
                    self.notifier.send(Notice::warning(
                        NoticeCategory::Channel,
                        "Disconnected",
                        format!(
                            "Relay connection lost, reconnecting in {}s",
                            self.config.reconnect_delay.as_secs()
                        ),
                    ));
                }
                Err(e) => {
                    tracing::warn!(session_id = %self.session.session_id(), "relay connect failed: {e}");
                    self.emit_state(ChannelState::Closed);
                    let notice = match &e {
                        ChannelError::Timeout(window) => Notice::error(
                            NoticeCategory::Channel,
                            "Connection timed out",
                            format!("Relay did not answer within {}s", window.as_secs()),
                        ),
                        _ => Notice::error(
                            NoticeCategory::Channel,
                            "Connection failed",
                            e.to_string(),
                        ),
                    };
                    self.notifier.send(notice);
                }
            }

            if self.shutdown.is_cancelled() {
                break;
            }

            // Fixed delay, same session id. The sleep is the reconnect
            // timer; cancelling the token while it runs is how a manual
            // close suppresses the attempt.
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }

        self.emit_state(ChannelState::Closed);
        tracing::info!(session_id = %self.session.session_id(), "relay channel stopped");
    }

    /// Dial the relay, bounded by the connection timeout.
    async fn dial(&self) -> Result<WsStream, ChannelError> {
        tracing::info!(url = %self.relay_url, "dialing relay");
        match tokio::time::timeout(
            self.config.connection_timeout,
            connect_async(self.relay_url.as_str()),
        )
        .await
        {
            Ok(Ok((ws, _response))) => {
                tracing::info!("relay connected");
                Ok(ws)
            }
            Ok(Err(e)) => Err(ChannelError::Connection(e.to_string())),
            Err(_) => Err(ChannelError::Timeout(self.config.connection_timeout)),
        }
    }

    /// Run one open session until close, error or shutdown. Returns
    /// whether the channel should re-dial.
    async fn run_session(
        &mut self,
        ws: WsStream,
        dispatcher: &mut EventDispatcher,
        outbound_rx: &mut mpsc::UnboundedReceiver<OutboundMessage>,
    ) -> bool {
        let (mut ws_sink, mut ws_stream) = ws.split();

        // Drop replies queued while the channel was down; a heartbeat
        // reply is only meaningful inside the session that asked for it.
        while outbound_rx.try_recv().is_ok() {}

        let mut ping_interval = tokio::time::interval(self.config.keep_alive_interval);
        ping_interval.tick().await; // skip immediate tick

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::info!("manual close, shutting relay socket");
                    let _ = ws_sink.close().await;
                    return false;
                }

                // Application keep-alive
                _ = ping_interval.tick() => {
                    if let Err(e) = send_json(&mut ws_sink, &OutboundMessage::ping()).await {
                        tracing::warn!("keep-alive send failed, disconnecting: {e}");
                        return true;
                    }
                }

                // Replies queued by the dispatcher
                reply = outbound_rx.recv() => {
                    match reply {
                        Some(msg) => {
                            if let Err(e) = send_json(&mut ws_sink, &msg).await {
                                tracing::warn!("reply send failed, disconnecting: {e}");
                                return true;
                            }
                        }
                        None => return true, // dispatcher gone, tear down
                    }
                }

                // Incoming frame
                frame = ws_stream.next() => {
                    match frame {
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_sink.send(Message::Pong(data)).await;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            let code = frame.as_ref().map(|f| f.code);
                            if matches!(code, Some(CloseCode::Normal)) {
                                tracing::info!("relay closed the channel normally");
                                return false;
                            }
                            tracing::warn!(?code, "relay closed the channel abnormally");
                            return true;
                        }
                        Some(Ok(msg)) => {
                            if let Some(event) = decode::decode_frame(&msg) {
                                dispatcher.dispatch(event);
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!("relay transport error: {e}");
                            return true;
                        }
                        None => {
                            tracing::info!("relay stream ended");
                            return true;
                        }
                    }
                }
            }
        }
    }

    fn emit_state(&self, state: ChannelState) {
        tracing::debug!(%state, "channel state");
        let _ = self.events_tx.send(ChannelEvent::State(state));
    }
}

/// Serialize and send one outbound message as a text frame.
async fn send_json<S>(sink: &mut S, msg: &OutboundMessage) -> Result<(), ChannelError>
where
    S: futures::Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let json = msg.to_json()?;
    sink.send(Message::Text(json.into()))
        .await
        .map_err(|e| ChannelError::Connection(e.to_string()))
}
