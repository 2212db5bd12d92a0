#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use memctx::{CacheClient, ClientError, Lookup};

/// A `CacheClient` that answers from a map and records every call it receives
#[derive(Debug, Default)]
pub struct FakeClient {
    pub values: HashMap<String, Vec<u8>>,
    // when set, `connect` fails with this message
    pub refuse: Option<String>,
    pub connected_to: Option<(String, u16)>,
    pub calls: Vec<String>,
}

impl FakeClient {
    pub fn with_value(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.as_bytes().to_vec());
        self
    }

    pub fn refusing(message: &str) -> Self {
        FakeClient {
            refuse: Some(message.to_string()),
            ..FakeClient::default()
        }
    }
}

impl CacheClient for FakeClient {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), ClientError> {
        self.calls.push(format!("connect {}:{}", host, port));
        if let Some(msg) = &self.refuse {
            return Err(ClientError(msg.clone()));
        }
        self.connected_to = Some((host.to_string(), port));
        Ok(())
    }

    fn get(&mut self, key: &str) -> Result<Lookup, ClientError> {
        self.calls.push(format!("get {}", key));
        Ok(match self.values.get(key) {
            Some(v) => Lookup::Found(v.clone()),
            None => Lookup::Absent,
        })
    }

    fn disconnect(&mut self) {
        self.calls.push("disconnect".to_string());
        self.connected_to = None;
    }

    fn close(&mut self) {
        self.calls.push("close".to_string());
        self.connected_to = None;
    }
}

/// starts a minimal ASCII memcached server on a random local port that knows `version` and
/// `get`, and returns the port
pub fn spawn_server(values: &[(&str, &str)]) -> u16 {
    let values: HashMap<String, String> = values
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let values = Arc::new(values);
    let listener = TcpListener::bind("127.0.0.1:0").expect("unable to bind fake server");
    let port = listener.local_addr().expect("no local addr").port();

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let values = Arc::clone(&values);
            thread::spawn(move || serve(stream, &values));
        }
    });
    port
}

fn serve(stream: TcpStream, values: &HashMap<String, String>) {
    let mut writer = match stream.try_clone() {
        Ok(w) => w,
        Err(_) => return,
    };
    let mut reader = BufReader::new(stream);
    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => return,
            Ok(_) => {}
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        let mut reply = String::new();
        match words.first() {
            Some(&"version") => reply.push_str("VERSION 1.6.21\r\n"),
            Some(&"get") => {
                for key in &words[1..] {
                    if let Some(value) = values.get(*key) {
                        reply.push_str(&format!("VALUE {} 0 {}\r\n{}\r\n", key, value.len(), value));
                    }
                }
                reply.push_str("END\r\n");
            }
            _ => reply.push_str("ERROR\r\n"),
        }
        if writer.write_all(reply.as_bytes()).and_then(|_| writer.flush()).is_err() {
            return;
        }
    }
}


/// a local port that nothing listens on
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("unable to bind");
    listener.local_addr().expect("no local addr").port()
}
