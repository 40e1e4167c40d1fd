//! The dispatch loop: one task, one connection, one event at a time.
//!
//! The flow is:
//!   1. Connect → feed `Open` (or `Error` + `Closed`) to the controller
//!   2. Loop: race the next user command against the next server frame
//!      - command → controller validates → codec encodes → transport sends
//!      - frame → codec decodes → controller applies
//!   3. Close → controller goes to `Closed`
//!
//! Every handler runs to completion before the next event is looked at,
//! so the controller never sees two events at once.

use roomchat_protocol::Codec;
use roomchat_session::{RoomSessionController, View};
use roomchat_transport::{Connection, Transport, TransportError, TransportEvent};
use tokio::sync::mpsc;

use crate::{ExitReason, RoomchatError, UserCommand};

/// Runs a session from connect to close and reports why it ended.
pub(crate) async fn run_dispatch<T, C, V>(
    transport: &T,
    endpoint: &str,
    codec: &C,
    controller: &mut RoomSessionController<V>,
    mut commands: mpsc::Receiver<UserCommand>,
) -> ExitReason
where
    T: Transport<Error = TransportError>,
    T::Connection: Connection<Error = TransportError>,
    C: Codec,
    V: View,
{
    if let Err(e) = controller.connect() {
        tracing::warn!(error = %e, "session cannot connect");
        return ExitReason::ConnectFailed(e.to_string());
    }

    // --- Step 1: Connect ---
    let conn = match transport.connect(endpoint).await {
        Ok(conn) => conn,
        Err(e) => {
            let details = e.to_string();
            apply_transport_event(codec, controller, TransportEvent::Error(details.clone()));
            apply_transport_event(codec, controller, TransportEvent::Closed);
            return ExitReason::ConnectFailed(details);
        }
    };
    let conn_id = conn.id();
    apply_transport_event(codec, controller, TransportEvent::Open);

    // --- Step 2: Event loop ---
    let reason = loop {
        tokio::select! {
            cmd = commands.recv() => match cmd {
                Some(UserCommand::Disconnect) => {
                    tracing::info!(%conn_id, "disconnect requested");
                    break ExitReason::UserDisconnected;
                }
                Some(cmd) => {
                    if let Err(e) = handle_command(&conn, codec, controller, cmd).await {
                        let details = e.to_string();
                        apply_transport_event(codec, controller, TransportEvent::Error(details.clone()));
                        break ExitReason::TransportError(details);
                    }
                }
                None => {
                    tracing::debug!(%conn_id, "command channel closed");
                    break ExitReason::CommandsClosed;
                }
            },

            incoming = conn.recv() => {
                let event = TransportEvent::from_recv(incoming);
                match &event {
                    TransportEvent::Closed => {
                        tracing::info!(%conn_id, "connection closed by server");
                        break ExitReason::ServerClosed;
                    }
                    TransportEvent::Error(details) => {
                        let details = details.clone();
                        apply_transport_event(codec, controller, event);
                        break ExitReason::TransportError(details);
                    }
                    TransportEvent::Open | TransportEvent::Frame(_) => {
                        apply_transport_event(codec, controller, event);
                    }
                }
            }
        }
    };

    // --- Step 3: Close ---
    if matches!(
        reason,
        ExitReason::UserDisconnected | ExitReason::CommandsClosed
    ) {
        if let Err(e) = conn.close().await {
            tracing::debug!(%conn_id, error = %e, "close failed");
        }
    }
    apply_transport_event(codec, controller, TransportEvent::Closed);
    reason
}

/// Feeds one transport event into the controller.
///
/// Frames that don't decode are logged and dropped; the session is not
/// touched.
fn apply_transport_event<C: Codec, V: View>(
    codec: &C,
    controller: &mut RoomSessionController<V>,
    event: TransportEvent,
) {
    match event {
        TransportEvent::Open => controller.on_open(),
        TransportEvent::Frame(raw) => match codec.decode_event(&raw) {
            Ok(incoming) => controller.apply(incoming),
            Err(e) => {
                tracing::warn!(error = %e, frame = %raw, "dropping malformed frame");
            }
        },
        TransportEvent::Error(details) => controller.on_error(&details),
        TransportEvent::Closed => controller.on_close(),
    }
}

/// Turns a user command into at most one outgoing frame.
///
/// Session refusals and encode failures are logged and swallowed. Only a
/// failed send comes back as an error, because it ends the connection.
async fn handle_command<Conn, C, V>(
    conn: &Conn,
    codec: &C,
    controller: &mut RoomSessionController<V>,
    cmd: UserCommand,
) -> Result<(), TransportError>
where
    Conn: Connection<Error = TransportError>,
    C: Codec,
    V: View,
{
    let intent = match cmd {
        UserCommand::Join { room, username } => controller.join(&room, &username),
        UserCommand::Leave => controller.leave(),
        UserCommand::SendMessage { text, username } => {
            controller.send_message(&text, &username)
        }
        // Handled by the loop before we get here.
        UserCommand::Disconnect => return Ok(()),
    };

    match encode_and_send(conn, codec, intent).await {
        Ok(()) => Ok(()),
        Err(RoomchatError::Transport(e)) => Err(e),
        Err(RoomchatError::Session(e)) => {
            tracing::debug!(error = %e, "command rejected");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to encode intent");
            Ok(())
        }
    }
}

async fn encode_and_send<Conn, C>(
    conn: &Conn,
    codec: &C,
    intent: Result<roomchat_protocol::OutgoingIntent, roomchat_session::SessionError>,
) -> Result<(), RoomchatError>
where
    Conn: Connection<Error = TransportError>,
    C: Codec,
{
    let intent = intent?;
    let frame = codec.encode_intent(&intent)?;
    tracing::debug!(action = intent.action(), room = intent.room(), "sending");
    conn.send(&frame).await?;
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Dispatch loop tests against an in-memory transport.
    //!
    //! The mock records every frame the loop sends and replays whatever
    //! the test pushes into its incoming channel, so we can check exactly
    //! what hits the wire and in what order.

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex as StdMutex};
    use std::time::Duration;

    use roomchat_protocol::JsonCodec;
    use roomchat_session::{
        Affordance, ConnectionState, RecordingView, SessionConfig,
    };
    use roomchat_transport::ConnectionId;

    use super::*;
    use crate::ClientHandle;

    // -- Mock transport ---------------------------------------------------

    type Sent = Arc<StdMutex<Vec<String>>>;

    struct MockConnection {
        incoming: tokio::sync::Mutex<mpsc::UnboundedReceiver<Option<String>>>,
        sent: Sent,
        closed: Arc<AtomicBool>,
    }

    impl Connection for MockConnection {
        type Error = TransportError;

        async fn send(&self, frame: &str) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push(frame.to_string());
            Ok(())
        }

        async fn recv(&self) -> Result<Option<String>, TransportError> {
            // `Some(None)` from the test means "server closed".
            match self.incoming.lock().await.recv().await {
                Some(Some(frame)) => Ok(Some(frame)),
                Some(None) | None => Ok(None),
            }
        }

        async fn close(&self) -> Result<(), TransportError> {
            self.closed.store(true, Ordering::Relaxed);
            Ok(())
        }

        fn id(&self) -> ConnectionId {
            ConnectionId::new(1)
        }
    }

    struct MockTransport {
        conn: StdMutex<Option<MockConnection>>,
    }

    impl Transport for MockTransport {
        type Connection = MockConnection;
        type Error = TransportError;

        async fn connect(&self, url: &str) -> Result<MockConnection, TransportError> {
            self.conn.lock().unwrap().take().ok_or_else(|| {
                TransportError::ConnectFailed {
                    url: url.to_string(),
                    source: std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "refused",
                    ),
                }
            })
        }
    }

    struct Harness {
        transport: MockTransport,
        server_tx: mpsc::UnboundedSender<Option<String>>,
        sent: Sent,
        closed: Arc<AtomicBool>,
    }

    fn harness() -> Harness {
        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let sent: Sent = Arc::default();
        let closed = Arc::new(AtomicBool::new(false));
        let conn = MockConnection {
            incoming: tokio::sync::Mutex::new(server_rx),
            sent: Arc::clone(&sent),
            closed: Arc::clone(&closed),
        };
        Harness {
            transport: MockTransport {
                conn: StdMutex::new(Some(conn)),
            },
            server_tx,
            sent,
            closed,
        }
    }

    fn controller() -> RoomSessionController<RecordingView> {
        RoomSessionController::new(SessionConfig::default(), RecordingView::default())
    }

    /// Polls `cond` until it holds or a second passes.
    async fn wait_until(cond: impl Fn() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not met in time");
    }

    // =====================================================================
    // Tests
    // =====================================================================

    #[tokio::test]
    async fn test_connect_failure_reports_and_closes() {
        let transport = MockTransport {
            conn: StdMutex::new(None),
        };
        let mut ctl = controller();
        let (_handle, rx) = ClientHandle::channel(4);

        let reason =
            run_dispatch(&transport, "ws://nowhere", &JsonCodec::default(), &mut ctl, rx)
                .await;

        assert!(matches!(reason, ExitReason::ConnectFailed(_)));
        assert_eq!(ctl.session().connection_state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_join_and_hello_flow() {
        let h = harness();
        let mut ctl = controller();
        let (handle, rx) = ClientHandle::channel(4);
        let codec = JsonCodec::default();

        let driver = async {
            handle.join("lobby", "alice").await.unwrap();
            wait_until(|| h.sent.lock().unwrap().len() == 1).await;
            h.server_tx
                .send(Some(
                    r#"{"username":"Server","message":"welcome","type":"HI"}"#.into(),
                ))
                .unwrap();
            h.server_tx
                .send(Some(r#"{"username":"bob","message":"hey"}"#.into()))
                .unwrap();
            // Server closes after its two frames; the loop exits on its own.
            h.server_tx.send(None).unwrap();
        };

        let (reason, ()) = tokio::join!(
            run_dispatch(&h.transport, "ws://test", &codec, &mut ctl, rx),
            driver
        );

        assert_eq!(reason, ExitReason::ServerClosed);
        assert_eq!(
            h.sent.lock().unwrap()[0],
            r#"{"action":"join","room":"lobby","username":"alice"}"#
        );
        assert_eq!(ctl.session().current_room(), "lobby");
        assert_eq!(ctl.view().affordance, Affordance::Leave);
        assert_eq!(ctl.view().messages.len(), 1);
        assert_eq!(ctl.session().connection_state(), ConnectionState::Closed);
    }

    #[tokio::test]
    async fn test_rejected_commands_send_nothing() {
        let h = harness();
        let mut ctl = controller();
        let (handle, rx) = ClientHandle::channel(8);
        let codec = JsonCodec::default();

        let driver = async {
            handle.join("  ", "alice").await.unwrap();
            handle.send_message("   ", "alice").await.unwrap();
            handle.leave().await.unwrap();
            handle.send_message("real one", "alice").await.unwrap();
            wait_until(|| !h.sent.lock().unwrap().is_empty()).await;
            handle.disconnect().await.unwrap();
        };

        let (reason, ()) = tokio::join!(
            run_dispatch(&h.transport, "ws://test", &codec, &mut ctl, rx),
            driver
        );

        assert_eq!(reason, ExitReason::UserDisconnected);
        let sent = h.sent.lock().unwrap();
        assert_eq!(sent.len(), 1, "only the non-blank message goes out");
        assert!(sent[0].contains(r#""message":"real one""#));
        assert!(sent[0].contains(r#""room":"global""#));
        assert!(h.closed.load(Ordering::Relaxed), "socket should be closed");
    }

    #[tokio::test]
    async fn test_malformed_frame_is_dropped() {
        let h = harness();
        let mut ctl = controller();
        let (handle, rx) = ClientHandle::channel(4);
        let codec = JsonCodec::default();

        h.server_tx.send(Some("not json".into())).unwrap();
        h.server_tx
            .send(Some(r#"{"username":"bob","message":"still here"}"#.into()))
            .unwrap();
        h.server_tx.send(None).unwrap();

        let reason = run_dispatch(&h.transport, "ws://test", &codec, &mut ctl, rx).await;
        drop(handle);

        assert_eq!(reason, ExitReason::ServerClosed);
        assert_eq!(ctl.view().messages.len(), 1);
        assert_eq!(ctl.view().messages[0].text, "still here");
    }

    #[tokio::test]
    async fn test_dropping_handles_stops_the_loop() {
        let h = harness();
        let mut ctl = controller();
        let (handle, rx) = ClientHandle::channel(4);
        drop(handle);

        let reason =
            run_dispatch(&h.transport, "ws://test", &JsonCodec::default(), &mut ctl, rx)
                .await;

        assert_eq!(reason, ExitReason::CommandsClosed);
        assert!(h.closed.load(Ordering::Relaxed));
    }
}
