//! UDP transport: three sockets, one dispatcher.
//!
//! The server binds one socket per RPC program (NFS, MOUNT, KLM) and
//! spawns a receive loop for each. Every datagram is forwarded, with its
//! origin, into a single unbounded queue; administrative calls from
//! [`RunningServer`] travel through the same queue. One dispatcher task
//! owns the [`ServerState`] and drains the queue strictly in order, so
//! requests and admin operations are totally ordered against each other
//! and the state needs no locks. Replies are sent from the dispatcher on
//! the socket the request arrived on.
//!
//! The default ports are the standard ones shifted up by 20000, keeping
//! the server bindable without privileges.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::server::{ServerConfig, ServerState};
use crate::vfs::{BackendFactory, MountOpts};

/// Default port of the NFS program (2049 + 20000).
pub const NFS_PORT: u16 = 22049;
/// Default port of the MOUNT program (2050 + 20000).
pub const MOUNT_PORT: u16 = 22050;
/// Default port of the KLM program (2045 + 20000).
pub const NLM_PORT: u16 = 22045;

/// Largest datagram the receive loops will accept.
const MAX_DATAGRAM: usize = 65536;

enum ServerMessage {
    Datagram { data: Vec<u8>, peer: SocketAddr, socket: Arc<UdpSocket> },
    AddMountpoint { path: String, factory: Arc<dyn BackendFactory>, opts: MountOpts },
    SetDebug(bool),
    Shutdown,
}

/// An NFSv2 server being configured. Add mount points, then call
/// [`serve`](Nfs2Server::serve) to bind the sockets and start
/// dispatching.
pub struct Nfs2Server {
    config: ServerConfig,
    state: ServerState,
}

impl Nfs2Server {
    pub fn new(config: ServerConfig) -> Self {
        let state = ServerState::new(&config);
        Nfs2Server { config, state }
    }

    /// Registers an export path before the server starts. More can be
    /// added at runtime through [`RunningServer::add_mountpoint`].
    pub fn add_mountpoint(
        &mut self,
        path: &str,
        factory: Arc<dyn BackendFactory>,
        opts: MountOpts,
    ) {
        self.state.add_mountpoint(path, factory, opts);
    }

    /// Binds the three program sockets on `ip` and starts the dispatcher.
    ///
    /// Port 0 in the configuration asks the OS for an ephemeral port;
    /// the bound addresses are available on the returned handle.
    pub async fn serve(self, ip: &str) -> io::Result<RunningServer> {
        let nfs = bind(ip, self.config.nfs_port).await?;
        let mount = bind(ip, self.config.mount_port).await?;
        let nlm = bind(ip, self.config.nlm_port).await?;

        let nfs_addr = nfs.local_addr()?;
        let mount_addr = mount.local_addr()?;
        let nlm_addr = nlm.local_addr()?;
        info!("serving NFS on {}, MOUNT on {}, KLM on {}", nfs_addr, mount_addr, nlm_addr);

        let (queue, rx) = mpsc::unbounded_channel();
        let recv_tasks = vec![
            tokio::spawn(recv_loop(nfs, queue.clone())),
            tokio::spawn(recv_loop(mount, queue.clone())),
            tokio::spawn(recv_loop(nlm, queue.clone())),
        ];
        let dispatcher = tokio::spawn(dispatch_loop(self.state, rx));

        Ok(RunningServer { queue, nfs_addr, mount_addr, nlm_addr, dispatcher, recv_tasks })
    }
}

/// Handle to a running server: the bound addresses, the administrative
/// surface, and shutdown.
pub struct RunningServer {
    queue: mpsc::UnboundedSender<ServerMessage>,
    nfs_addr: SocketAddr,
    mount_addr: SocketAddr,
    nlm_addr: SocketAddr,
    dispatcher: JoinHandle<()>,
    recv_tasks: Vec<JoinHandle<()>>,
}

impl RunningServer {
    pub fn nfs_addr(&self) -> SocketAddr {
        self.nfs_addr
    }

    pub fn mount_addr(&self) -> SocketAddr {
        self.mount_addr
    }

    pub fn nlm_addr(&self) -> SocketAddr {
        self.nlm_addr
    }

    /// Registers an export path. The registration is ordered with the
    /// requests in flight: it takes effect once the dispatcher reaches
    /// it in the queue.
    pub fn add_mountpoint(&self, path: &str, factory: Arc<dyn BackendFactory>, opts: MountOpts) {
        let _ = self.queue.send(ServerMessage::AddMountpoint {
            path: path.to_string(),
            factory,
            opts,
        });
    }

    /// Toggles per-request debug tracing.
    pub fn set_debug(&self, on: bool) {
        let _ = self.queue.send(ServerMessage::SetDebug(on));
    }

    /// Stops the server. Requests already queued ahead of the shutdown
    /// message are still served; later datagrams are dropped.
    pub async fn shutdown(self) {
        let _ = self.queue.send(ServerMessage::Shutdown);
        for task in self.recv_tasks {
            task.abort();
        }
        let _ = self.dispatcher.await;
    }
}

async fn bind(ip: &str, port: u16) -> io::Result<Arc<UdpSocket>> {
    let socket = UdpSocket::bind((ip, port)).await?;
    Ok(Arc::new(socket))
}

/// Forwards datagrams from one socket into the dispatch queue.
async fn recv_loop(socket: Arc<UdpSocket>, queue: mpsc::UnboundedSender<ServerMessage>) {
    let mut buf = vec![0_u8; MAX_DATAGRAM];
    loop {
        match socket.recv_from(&mut buf).await {
            Ok((len, peer)) => {
                let message = ServerMessage::Datagram {
                    data: buf[..len].to_vec(),
                    peer,
                    socket: socket.clone(),
                };
                if queue.send(message).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!("recv error on {:?}: {}", socket.local_addr(), e);
            }
        }
    }
}

/// Drains the queue one message at a time; this is the serialization
/// point the rest of the server relies on.
async fn dispatch_loop(mut state: ServerState, mut rx: mpsc::UnboundedReceiver<ServerMessage>) {
    while let Some(message) = rx.recv().await {
        match message {
            ServerMessage::Datagram { data, peer, socket } => {
                if let Some(reply) = state.process(&data, &peer.to_string()).await {
                    if let Err(e) = socket.send_to(&reply, peer).await {
                        warn!("failed to send reply to {}: {}", peer, e);
                    }
                }
            }
            ServerMessage::AddMountpoint { path, factory, opts } => {
                state.add_mountpoint(&path, factory, opts);
            }
            ServerMessage::SetDebug(on) => {
                debug!("debug tracing {}", if on { "enabled" } else { "disabled" });
                state.set_debug(on);
            }
            ServerMessage::Shutdown => break,
        }
    }
    debug!("dispatcher finished");
}
