//! Extending generated error types with their own behaviour.

use serde::Serialize;
use stack_errors::{ErrorVariant, StructuredError, namespace_error};

namespace_error! {
    /// Errors from the wire protocol: the client sent something wrong.
    pub struct ProtocolError("PTL");
}

namespace_error! {
    /// Errors in our own code: never shown to clients in full.
    pub struct InternalError("INT") with [("service", "gateway")];
}

#[derive(Serialize)]
struct ApiResponse {
    status: u16,
    code: String,
    message: String,
}

impl ProtocolError {
    /// Client-facing reply with the protocol code and message.
    fn to_api(&self) -> ApiResponse {
        ApiResponse {
            status: 400,
            code: self.code().to_string(),
            message: self.message().to_string(),
        }
    }
}

impl InternalError {
    /// Write the full chain to the operator log.
    fn log(&self) {
        self.with_log(|log| eprintln!("[internal] {}", log));
        for cause in self.error_stack() {
            eprintln!("[internal]   caused by {}", cause);
        }
    }

    /// Client-facing reply that hides the details.
    fn to_api(&self) -> ApiResponse {
        ApiResponse {
            status: 500,
            code: self.code().to_string(),
            message: "Internal error".to_string(),
        }
    }
}

fn handle(request: &str) -> Result<String, StructuredError> {
    match request {
        "ping" => Ok("pong".to_string()),
        "v0" => Err(ProtocolError::new(1, "Invalid protocol version").into()),
        _ => {
            let io = std::io::Error::other("backend unreachable");
            Err(InternalError::wrap(7, "Request handling failed", io).into())
        }
    }
}

/// Generic catch site: dispatch on the kind of error.
fn respond(err: StructuredError) -> ApiResponse {
    let err = match ProtocolError::downcast(err) {
        Ok(protocol) => return protocol.to_api(),
        Err(other) => other,
    };
    match InternalError::downcast(err) {
        Ok(internal) => {
            internal.log();
            internal.to_api()
        }
        Err(other) => ApiResponse {
            status: 500,
            code: other.code().to_string(),
            message: "Unknown error".to_string(),
        },
    }
}

fn main() {
    println!("--- Variant Extensions Example ---\n");

    for request in ["ping", "v0", "query"] {
        let body = match handle(request) {
            Ok(reply) => reply,
            Err(err) => match serde_json::to_string(&respond(err)) {
                Ok(json) => json,
                Err(e) => format!("failed to encode reply: {}", e),
            },
        };
        println!("{:>6} -> {}", request, body);
    }
}
