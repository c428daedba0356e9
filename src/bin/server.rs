use std::env;
use std::process::ExitCode;

use flowstep::server;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let listen_at = env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1:8080".to_string());
    let threads = match env::args().nth(2).map(|t| t.parse::<u64>()) {
        None => 4,
        Some(Ok(threads)) if threads > 0 => threads,
        Some(_) => {
            eprintln!("Usage: server [<listen address>] [<worker threads>]");
            return ExitCode::FAILURE;
        }
    };
    match server::start_server(&listen_at, 10, threads) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Could not create server at {listen_at}: {e}");
            ExitCode::FAILURE
        }
    }
}
