//! Linkstash RPC Server — JSON-RPC over stdin/stdout for UI integration.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"bookmark.add", "params":{"user_id":"...","url":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":{"status":400,"error":"..."}}
//!
//! `changes.subscribe` registers the caller on the change feed; after each
//! handled request, pending events are emitted as
//! {"event":"change","table":"bookmarks","kind":"INSERT","row_id":"...","user_id":"..."} lines.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::Receiver;
use std::sync::Mutex;
use std::time::Instant;

use serde_json::{json, Value};

use linkstash::app::App;
use linkstash::rpc_handler::handle_method;
use linkstash::types::events::ChangeEvent;

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self {
            window_start: Instant::now(),
            request_count: 0,
            max_per_second,
        }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

/// Drains pending change events from every subscription and prints them.
fn flush_change_events(subscriptions: &[Receiver<ChangeEvent>]) {
    for rx in subscriptions {
        while let Ok(event) = rx.try_recv() {
            if let Ok(mut line) = serde_json::to_value(&event) {
                if let Some(obj) = line.as_object_mut() {
                    obj.insert("event".to_string(), json!("change"));
                }
                println!("{}", line);
            }
        }
    }
    let _ = io::stdout().flush();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Prefer LINKSTASH_DATA_DIR, fall back to the executable's directory
    let db_path = if let Ok(dir) = std::env::var("LINKSTASH_DATA_DIR") {
        std::path::PathBuf::from(dir).join("linkstash.db")
    } else if let Ok(exe) = std::env::current_exe() {
        exe.parent()
            .unwrap_or(std::path::Path::new("."))
            .join("linkstash.db")
    } else {
        std::path::PathBuf::from("linkstash.db")
    };
    let app = Mutex::new(
        App::new(db_path.to_str().unwrap_or("linkstash.db"))
            .expect("Failed to initialize Linkstash"),
    );

    // Signal ready
    let ready = json!({"event":"ready","version":env!("CARGO_PKG_VERSION")});
    println!("{}", ready);
    io::stdout().flush().unwrap();

    // Max 200 RPC requests per second to prevent DoS
    let mut rate_limiter = RateLimiter::new(200);
    let mut subscriptions: Vec<Receiver<ChangeEvent>> = Vec::new();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let err = json!({"id":null,"error":{"status":400,"error":format!("parse error: {}",e)}});
                println!("{}", err);
                io::stdout().flush().unwrap();
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            let response = json!({"id": id, "error": {"status": 429, "error": "rate limit exceeded"}});
            println!("{}", response);
            io::stdout().flush().unwrap();
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        // Subscriptions are owned by the server loop, not the handler
        let response = if method == "changes.subscribe" {
            match params.get("user_id").and_then(|v| v.as_str()) {
                Some(user_id) if !user_id.is_empty() => {
                    let rx = match app.lock() {
                        Ok(a) => a.change_feed.subscribe(user_id),
                        Err(e) => {
                            let response = json!({"id": id, "error": {"status": 500, "error": e.to_string()}});
                            println!("{}", response);
                            io::stdout().flush().unwrap();
                            continue;
                        }
                    };
                    subscriptions.push(rx);
                    json!({"id": id, "result": {"subscribed": true}})
                }
                _ => json!({"id": id, "error": {"status": 401, "error": "Unauthorized"}}),
            }
        } else {
            match handle_method(&app, method, &params).await {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => json!({"id": id, "error": err}),
            }
        };

        println!("{}", response);
        io::stdout().flush().unwrap();

        flush_change_events(&subscriptions);
    }
}
