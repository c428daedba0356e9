use crate::graph::Session;
use crate::rpc::call_context::CallContext;
use crate::rpc::rpc_functions::{
    dot, export, flow, initialize, load_graph, reset, residual, state, step, InputValidationError,
    JsonRpcRequest,
};
use json::JsonValue;
use std::error::Error;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::sync::Mutex;

pub fn handle_connection(session: &Mutex<Session>, mut socket: TcpStream) -> Result<(), Box<dyn Error>> {
    let request = read_request(&mut socket)?;
    let client_ip = socket.peer_addr()?.to_string();

    let call_context = CallContext::new(&client_ip, &request.id, &request.method);

    let result = match request.method.as_str() {
        "load_graph" => load_graph(session, &request.params, &call_context),
        "initialize" => initialize(session, &call_context),
        "step" => step(session, &call_context),
        "reset" => reset(session, &call_context),
        "state" => state(session),
        "residual" => residual(session, &request.params),
        "flow" => flow(session, &request.params),
        "export" => export(session),
        "dot" => dot(session, &request.params),
        _ => {
            return respond(
                &mut socket,
                request.id,
                None,
                Some((-32601, "Method not found".to_string())),
                &call_context,
            )
        }
    };

    match result {
        Ok(value) => respond(&mut socket, request.id, Some(value), None, &call_context),
        Err(e) => {
            let code = if e.is::<InputValidationError>() {
                -32602
            } else {
                -32000
            };
            respond(&mut socket, request.id, None, Some((code, e.to_string())), &call_context)
        }
    }
}

fn respond(
    socket: &mut TcpStream,
    id: JsonValue,
    result: Option<JsonValue>,
    error: Option<(i64, String)>,
    call_context: &CallContext,
) -> Result<(), Box<dyn Error>> {
    if let Some((code, message)) = error.as_ref() {
        call_context.log_error(*code, message);
    }
    let response_json = jsonrpc_serialize_response(
        id,
        result.unwrap_or(JsonValue::Null),
        error.as_ref().map(|(c, m)| (*c, m.as_str())),
    );
    socket.write_all(jsonrpc_response(response_json).as_bytes())?;
    Ok(())
}

fn read_payload(socket: &mut TcpStream) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut reader = BufReader::new(socket);
    let mut length = 0;
    for result in reader.by_ref().lines() {
        let l = result?;
        if l.is_empty() {
            break;
        }

        let header = "content-length: ";
        if l.to_lowercase().starts_with(header) {
            length = l[header.len()..].parse::<usize>()?;
        }
    }
    let mut payload = vec![0u8; length];

    reader.read_exact(payload.as_mut_slice())?;
    Ok(payload)
}

fn read_request(socket: &mut TcpStream) -> Result<JsonRpcRequest, Box<dyn Error>> {
    let payload = read_payload(socket)?;
    let mut request = json::parse(&String::from_utf8(payload)?)?;
    let id = request["id"].take();
    let params = request["params"].take();
    match request["method"].as_str() {
        Some(method) => Ok(JsonRpcRequest {
            id,
            method: method.to_string(),
            params,
        }),
        _ => Err(From::from(format!("Invalid JSON-RPC request: {}", request))),
    }
}

pub fn jsonrpc_serialize_response(id: JsonValue, result: JsonValue, error: Option<(i64, &str)>) -> String {
    let mut response = json::object! {
        jsonrpc: "2.0",
        id: id,
    };
    let inserted = match error {
        Some((code, message)) => response.insert(
            "error",
            json::object! {
                code: code,
                message: message,
            },
        ),
        None => response.insert("result", result),
    };
    // Inserting into an object literal only fails for non-objects.
    debug_assert!(inserted.is_ok());
    response.dump()
}

fn jsonrpc_response(json_payload: String) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n\r\n{}",
        json_payload.len(),
        json_payload
    )
}
