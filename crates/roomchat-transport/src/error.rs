/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Establishing the connection to the endpoint failed.
    #[error("connect to {url} failed: {source}")]
    ConnectFailed {
        /// The endpoint we tried to reach.
        url: String,
        /// What went wrong underneath (DNS, TCP, WebSocket upgrade).
        #[source]
        source: std::io::Error,
    },

    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),
}
