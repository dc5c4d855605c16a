//! Event dispatcher: exactly one side effect per decoded relay event

use std::time::Duration;

use shared::message::{
    InboundEvent, Notice, NoticeCategory, OutboundMessage, ScannerStatus,
};
use tokio::sync::{broadcast, mpsc};
use tokio::time::Instant;

use crate::channel::ChannelEvent;
use crate::notify::Notifier;
use crate::scan::ScanConsumer;

/// Routes decoded events to their side effects.
///
/// Protocol replies (`heartbeat_response`, `connection_confirmed`) are
/// queued on the outbound channel inside the same dispatch call; the
/// channel loop drains that queue onto the socket.
pub struct EventDispatcher {
    session_id: String,
    scan: ScanConsumer,
    notifier: Notifier,
    events_tx: broadcast::Sender<ChannelEvent>,
    outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
    notice_window: Duration,
    /// Last scanner-status notice polarity and when it was emitted
    last_status_notice: Option<(ScannerStatus, Instant)>,
    /// The "server acknowledged" notice fires once per channel instance
    acknowledged: bool,
}

impl EventDispatcher {
    pub fn new(
        session_id: impl Into<String>,
        scan: ScanConsumer,
        notifier: Notifier,
        events_tx: broadcast::Sender<ChannelEvent>,
        outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
        notice_window: Duration,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            scan,
            notifier,
            events_tx,
            outbound_tx,
            notice_window,
            last_status_notice: None,
            acknowledged: false,
        }
    }

    /// Route one decoded event.
    pub fn dispatch(&mut self, event: InboundEvent) {
        match event {
            InboundEvent::Barcode { code } => self.scan.on_scan(&code),
            InboundEvent::ScannerStatus { status } => self.on_scanner_status(status),
            InboundEvent::Connection { status } => {
                if status == "connected" {
                    self.on_connection_ack();
                } else {
                    tracing::debug!(%status, "connection event with unhandled status");
                }
            }
            InboundEvent::Heartbeat => {
                self.queue(OutboundMessage::heartbeat_response());
            }
            InboundEvent::Error { message } => {
                tracing::warn!("relay reported error: {message}");
                self.notifier
                    .send(Notice::error(NoticeCategory::Relay, "Relay error", message));
            }
            InboundEvent::ServerShutdown => {
                tracing::warn!("relay announced shutdown");
                self.notifier.send(Notice::warning(
                    NoticeCategory::Relay,
                    "Relay shutting down",
                    "Relay is going down, the channel will reconnect automatically",
                ));
            }
            InboundEvent::Unknown => {
                tracing::debug!("ignoring unrecognized relay event");
            }
        }
    }

    /// Scanner presence changed: the indicator always updates, the notice
    /// is suppressed while the same polarity repeats inside the window
    /// (flapping connections otherwise storm the operator).
    fn on_scanner_status(&mut self, status: ScannerStatus) {
        let _ = self.events_tx.send(ChannelEvent::Scanner(status));

        let now = Instant::now();
        if let Some((last, at)) = self.last_status_notice {
            if last == status && now.duration_since(at) < self.notice_window {
                tracing::debug!(%status, "scanner status notice suppressed");
                return;
            }
        }
        self.last_status_notice = Some((status, now));

        let notice = match status {
            ScannerStatus::Connected => Notice::success(
                NoticeCategory::Scanner,
                "Scanner connected",
                "Mobile scanner is online",
            ),
            ScannerStatus::Disconnected => Notice::warning(
                NoticeCategory::Scanner,
                "Scanner disconnected",
                "Mobile scanner dropped off",
            ),
        };
        self.notifier.send(notice);
    }

    fn on_connection_ack(&mut self) {
        self.queue(OutboundMessage::connection_confirmed(&self.session_id));
        if !self.acknowledged {
            self.acknowledged = true;
            self.notifier.send(Notice::info(
                NoticeCategory::Channel,
                "Paired",
                "Relay acknowledged this register",
            ));
        }
    }

    fn queue(&self, msg: OutboundMessage) {
        if self.outbound_tx.send(msg).is_err() {
            tracing::debug!("outbound queue closed, reply dropped");
        }
    }
}
