use crate::graph::Session;
use crate::rpc::rpc_handler::handle_connection;
use log::{error, info, warn};
use std::io;
use std::net::TcpListener;
use std::ops::Deref;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

/// Serves one shared session over JSON-RPC with a fixed pool of workers.
///
/// Every request locks the session for its whole duration, so concurrent
/// `step` calls are applied one after the other.
pub fn start_server(listen_at: &str, queue_size: usize, threads: u64) -> io::Result<()> {
    let session: Arc<Mutex<Session>> = Arc::new(Mutex::new(Session::new()));

    let (sender, receiver) = mpsc::sync_channel(queue_size);
    let protected_receiver = Arc::new(Mutex::new(receiver));
    for _ in 0..threads {
        let rec = protected_receiver.clone();
        let s = session.clone();
        thread::spawn(move || loop {
            let next = match rec.lock() {
                Ok(receiver) => receiver.recv(),
                Err(_) => return,
            };
            let Ok(socket) = next else {
                return;
            };
            if let Err(e) = handle_connection(s.deref(), socket) {
                error!("Error handling connection: {e}");
            }
        });
    }
    let listener = TcpListener::bind(listen_at)?;
    info!("Listening at {listen_at}");
    loop {
        match listener.accept() {
            Ok((socket, _)) => match sender.try_send(socket) {
                Ok(()) => {}
                Err(e) => warn!("Queue full: {e}"),
            },
            Err(e) => warn!("Error accepting connection: {e}"),
        }
    }
}
