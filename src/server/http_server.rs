use super::service::AppService;
use may::coroutine::JoinHandle;
use may_minihttp::HttpServerWithHeaders;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Header slots `may_minihttp` parses per request.
pub const MAX_HEADERS: usize = 32;

/// How long [`ServerHandle::wait_ready`] polls before giving up.
pub const READY_TIMEOUT: Duration = Duration::from_millis(250);

const READY_POLL: Duration = Duration::from_millis(5);

/// Bind `addr` and run the accept loop for `service` on a `may` coroutine.
///
/// # Errors
///
/// Returns `InvalidInput` when `addr` resolves to nothing, or the bind error.
pub fn listen<A: ToSocketAddrs>(service: AppService, addr: A) -> io::Result<ServerHandle> {
    let addr = resolve(addr)?;
    let accept_loop = HttpServerWithHeaders::<_, MAX_HEADERS>(service).start(addr)?;
    debug!(addr = %addr, max_headers = MAX_HEADERS, "Accept loop started");
    Ok(ServerHandle { addr, accept_loop })
}

fn resolve<A: ToSocketAddrs>(addr: A) -> io::Result<SocketAddr> {
    addr.to_socket_addrs()?.next().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "listen address resolved to nothing")
    })
}

/// A running tinyroute server.
pub struct ServerHandle {
    addr: SocketAddr,
    accept_loop: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the accept loop is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll until a TCP connect succeeds, for at most [`READY_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// `TimedOut` when no connection was accepted in time.
    pub fn wait_ready(&self) -> io::Result<()> {
        self.wait_ready_within(READY_TIMEOUT)
    }

    /// Like [`wait_ready`](Self::wait_ready) with an explicit deadline.
    ///
    /// # Errors
    ///
    /// `TimedOut` when no connection was accepted within `timeout`.
    pub fn wait_ready_within(&self, timeout: Duration) -> io::Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("no listener on {} after {timeout:?}", self.addr),
                ));
            }
            thread::sleep(READY_POLL);
        }
    }

    /// Cancel the accept loop and wait for its coroutine to unwind.
    pub fn stop(self) {
        debug!(addr = %self.addr, "Stopping accept loop");
        // SAFETY: the accept loop owns only its listener and per-connection
        // `AppService` clones, which hold an `Arc` of the immutable route table
        // and no locks. Nothing it holds is observed after the join below.
        #[allow(unsafe_code)]
        unsafe {
            self.accept_loop.coroutine().cancel();
        }
        // A cancelled coroutine joins with its cancellation panic.
        let _ = self.accept_loop.join();
    }

    /// Block until the accept loop exits on its own.
    ///
    /// # Errors
    ///
    /// The panic payload if the accept loop panicked.
    pub fn join(self) -> thread::Result<()> {
        self.accept_loop.join()
    }
}
