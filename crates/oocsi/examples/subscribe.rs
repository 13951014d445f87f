//! Subscribe to a channel and print everything that arrives.
//!
//! Run with a server on localhost:
//!   cargo run --example subscribe
//!
//! Send something to "testchannel" from any other OOCSI client to see it
//! printed here.

use std::time::Duration;

use oocsi::{ClientConfig, OocsiClient};

fn main() {
    let client = OocsiClient::connect(ClientConfig::new("localhost:4444"));

    client.subscribe("testchannel", |event| {
        println!("{} -> {:?}", event.sender, event.data);
    });

    eprintln!("Subscribed as {}; waiting for events (ctrl-c to quit)", client.name());
    loop {
        std::thread::sleep(Duration::from_secs(1));
    }
}
