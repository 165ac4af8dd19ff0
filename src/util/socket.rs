//! Socket utilities and tuning

use socket2::{SockRef, TcpKeepalive};
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;

/// Idle time before the first keepalive probe
pub const KEEPALIVE_TIME: Duration = Duration::from_secs(60);
/// Interval between keepalive probes
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(10);

/// Apply request/response tuning to a connected editor stream
pub fn tune_stream(stream: &TcpStream) -> io::Result<()> {
    // Requests are single small writes; don't hold them back
    stream.set_nodelay(true)?;

    // Detect a vanished editor between exchanges
    let keepalive = TcpKeepalive::new()
        .with_time(KEEPALIVE_TIME)
        .with_interval(KEEPALIVE_INTERVAL);
    SockRef::from(stream).set_tcp_keepalive(&keepalive)?;

    Ok(())
}
