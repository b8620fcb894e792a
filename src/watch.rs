//! Watch mode: debounced filesystem events trigger a rebuild, and open
//! browser tabs are told to reload over a websocket once it succeeds.

use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use camino::Utf8PathBuf;
use notify::{EventKind, RecursiveMode};
use notify_debouncer_full::new_debouncer;
use tungstenite::WebSocket;

fn reserve_port() -> anyhow::Result<(TcpListener, u16)> {
    let listener = match TcpListener::bind("127.0.0.1:1337") {
        Ok(sock) => sock,
        Err(_) => TcpListener::bind("127.0.0.1:0")?,
    };

    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

/// Watches `roots` recursively and re-runs `rebuild` on relevant changes.
///
/// `rebuild` reports its own failures and returns whether the outputs
/// changed; a failed rebuild keeps the loop alive and simply skips the
/// browser reload.
pub(crate) fn watch(
    roots: &[Utf8PathBuf],
    dist: Utf8PathBuf,
    rebuild: impl Fn() -> bool,
) -> anyhow::Result<()> {
    let (tcp, port) = reserve_port()?;
    tracing::info!("live reload listening on port {port}");

    let clients = Arc::new(Mutex::new(Vec::new()));
    let thread_i = new_thread_ws_incoming(tcp, clients.clone());
    let (tx_reload, thread_o) = new_thread_ws_reload(clients);

    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(250), None, tx)?;

    for root in roots {
        tracing::info!("watching {root}");
        debouncer.watch(root.as_std_path(), RecursiveMode::Recursive)?;
    }

    #[cfg(feature = "server")]
    let _thread_http = crate::server::start(dist);
    #[cfg(not(feature = "server"))]
    let _ = dist;

    tracing::info!("running initial build...");
    rebuild();
    tracing::info!("initial build completed, now watching for changes...");

    while let Ok(events) = rx.recv()? {
        let relevant = events.iter().any(|de| {
            matches!(
                de.event.kind,
                EventKind::Create(..) | EventKind::Modify(..) | EventKind::Remove(..)
            )
        });

        if !relevant {
            continue;
        }

        let start = Instant::now();

        if rebuild() {
            tx_reload.send(())?;
        }

        tracing::info!("refreshed in {:?}", start.elapsed());
    }

    thread_i.join().ok();
    thread_o.join().ok();

    Ok(())
}

fn new_thread_ws_incoming(
    server: TcpListener,
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for stream in server.incoming() {
            let Ok(stream) = stream else { continue };
            let Ok(socket) = tungstenite::accept(stream) else {
                continue;
            };

            clients.lock().unwrap().push(socket);
        }
    })
}

fn new_thread_ws_reload(
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
) -> (Sender<()>, JoinHandle<()>) {
    let (tx, rx) = std::sync::mpsc::channel();

    let thread = std::thread::spawn(move || {
        while rx.recv().is_ok() {
            let mut clients = clients.lock().unwrap();
            let mut broken = vec![];

            for (i, socket) in clients.iter_mut().enumerate() {
                match socket.send("reload".into()) {
                    Ok(_) => {}
                    Err(tungstenite::error::Error::Io(e))
                        if e.kind() == std::io::ErrorKind::BrokenPipe =>
                    {
                        broken.push(i);
                    }
                    Err(e) => {
                        tracing::error!("websocket error: {e:?}");
                    }
                }
            }

            for i in broken.into_iter().rev() {
                clients.remove(i);
            }
        }
    });

    (tx, thread)
}
