//! Register a call handle and invoke it from the same process.
//!
//! Run with a server on localhost:
//!   cargo run --example call-response

use std::time::Duration;

use oocsi::{ClientConfig, Data, OocsiClient};
use serde_json::json;

fn main() {
    let responder = OocsiClient::connect(ClientConfig::new("localhost:4444"));
    let caller = OocsiClient::connect(ClientConfig::new("localhost:4444"));

    while !(responder.is_connected() && caller.is_connected()) {
        std::thread::sleep(Duration::from_millis(100));
    }

    responder.register("addten", |request, response| {
        let n = request.get("n").and_then(|v| v.as_i64()).unwrap_or(0);
        response.insert("result".to_string(), json!(n + 10));
    });

    let mut request = Data::new();
    request.insert("n".to_string(), json!(32));
    caller.call("addten", request, Duration::from_secs(2), |response| {
        println!("addten(32) = {}", response["result"]);
    });

    std::thread::sleep(Duration::from_secs(1));
    responder.close();
    caller.close();
}
