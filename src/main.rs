//! Chronicle - Durable Record Store with Per-Field History
//! Interactive shell over the store library, speaking the same JSON
//! shapes the HTTP boundary serves to clients.

use std::io::{self, BufRead, Write};

use chronicle::config::Config;
use chronicle::error::ChronicleError;
use chronicle::store::RecordStore;
use chronicle::types::{Patch, RecordId};

fn parse_id(raw: &str) -> Option<RecordId> {
    match raw.parse::<RecordId>() {
        Ok(id) if id > 0 => Some(id),
        _ => {
            println!("  invalid id; id must be a positive number");
            None
        }
    }
}

fn print_record(result: Result<chronicle::types::Record, ChronicleError>) {
    match result {
        Ok(record) => match serde_json::to_string(&record) {
            Ok(json) => println!("  {}", json),
            Err(e) => println!("  ERROR: {}", e),
        },
        Err(e) => println!("  {{\"error\":\"{}\"}}", e),
    }
}

fn main() {
    env_logger::init();

    println!();
    println!("  ╔═══════════════════════════════════════════╗");
    println!("  ║          CHRONICLE Record Store           ║");
    println!("  ║    Merge-Patch + Field History v1.0.0     ║");
    println!("  ╚═══════════════════════════════════════════╝");
    println!();
    println!("  Commands:");
    println!("    get <id>               - Read a record");
    println!("    set <id> <key> <value> - Set one field");
    println!("    del <id> <key>         - Delete one field");
    println!("    patch <id> <json>      - Apply a merge-patch, e.g. {{\"foo\":\"bar\",\"old\":null}}");
    println!("    history <id> <key>     - Show a field's history, newest first");
    println!("    records                - List known record ids");
    println!("    info                   - Show store statistics");
    println!("    exit                   - Shutdown store");
    println!();

    let config = Config::default();
    let mut store = match RecordStore::open(config) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("[ERROR] Failed to open store: {}", err);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("chronicle> ");
        stdout.flush().unwrap();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap() == 0 {
            break; // EOF
        }

        let parts: Vec<&str> = line.trim().split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }

        match parts[0].to_lowercase().as_str() {
            "get" => {
                if parts.len() < 2 {
                    println!("  Usage: get <id>");
                    continue;
                }
                let Some(id) = parse_id(parts[1]) else { continue };
                print_record(store.get(id));
            }
            "set" | "put" => {
                if parts.len() < 4 {
                    println!("  Usage: set <id> <key> <value>");
                    continue;
                }
                let Some(id) = parse_id(parts[1]) else { continue };
                let patch = Patch::new().set(parts[2], parts[3..].join(" "));
                print_record(store.apply_patch(id, &patch));
            }
            "del" | "delete" => {
                if parts.len() < 3 {
                    println!("  Usage: del <id> <key>");
                    continue;
                }
                let Some(id) = parse_id(parts[1]) else { continue };
                let patch = Patch::new().remove(parts[2]);
                print_record(store.apply_patch(id, &patch));
            }
            "patch" => {
                if parts.len() < 3 {
                    println!("  Usage: patch <id> <json>");
                    continue;
                }
                let Some(id) = parse_id(parts[1]) else { continue };
                let raw = parts[2..].join(" ");
                let value: serde_json::Value = match serde_json::from_str(&raw) {
                    Ok(v) => v,
                    Err(_) => {
                        println!("  invalid input; could not parse json");
                        continue;
                    }
                };
                match Patch::from_json(&value) {
                    Ok(patch) => print_record(store.apply_patch(id, &patch)),
                    Err(e) => println!("  ERROR: {}", e),
                }
            }
            "history" | "hist" => {
                if parts.len() < 3 {
                    println!("  Usage: history <id> <key>");
                    continue;
                }
                let Some(id) = parse_id(parts[1]) else { continue };
                let history = store.key_history(id, parts[2]);
                match serde_json::to_string(&history) {
                    Ok(json) => println!("  {}", json),
                    Err(e) => println!("  ERROR: {}", e),
                }
            }
            "records" | "list" => {
                let ids = store.record_ids();
                if ids.is_empty() {
                    println!("  (empty)");
                } else {
                    for id in &ids {
                        println!("  {}", id);
                    }
                    println!("  ({} records)", ids.len());
                }
            }
            "info" | "stats" => {
                println!("{}", store.metrics().report());
            }
            "exit" | "quit" | "q" => {
                println!("  Shutting down CHRONICLE...");
                break;
            }
            _ => {
                println!("  Unknown command: '{}'. Type 'exit' to quit.", parts[0]);
            }
        }
    }
}
