use crate::graph::Phase;
use json::JsonValue;
use log::{debug, info, warn};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Logging scope of one RPC call, tagged with peer, request id and method.
pub struct CallContext {
    peer: String,
    request_id: JsonValue,
    method: String,
    started: Instant,
}

impl CallContext {
    pub fn new(peer: &str, request_id: &JsonValue, method: &str) -> Self {
        let context = CallContext {
            peer: peer.to_string(),
            request_id: request_id.clone(),
            method: method.to_string(),
            started: Instant::now(),
        };
        debug!("-> {context} {method}");
        context
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    pub fn log_message(&self, message: &str) {
        info!("   {self} {}: {message}", self.method);
    }

    pub fn log_error(&self, code: i64, message: &str) {
        warn!("   {self} {} failed (code {code}): {message}", self.method);
    }

    /// Logs an engine phase change caused by this call; silent if nothing moved.
    pub fn log_phase(&self, before: Phase, after: Phase) {
        if before != after {
            info!(
                "   {self} {}: {} -> {}",
                self.method,
                before.as_str(),
                after.as_str()
            );
        }
    }
}

impl Drop for CallContext {
    fn drop(&mut self) {
        debug!("<- {self} {} ({} ms)", self.method, self.elapsed_ms());
    }
}

impl Display for CallContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}]", self.peer, self.request_id)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_names_peer_and_request() {
        let context = CallContext::new("127.0.0.1:9000", &JsonValue::from(5), "step");
        assert_eq!(context.to_string(), "[127.0.0.1:9000] [5]");
        assert_eq!(context.method(), "step");
        assert!(context.elapsed_ms() < 60_000);

        let anonymous = CallContext::new("", &JsonValue::Null, "state");
        assert_eq!(anonymous.to_string(), "[] [null]");
    }
}
