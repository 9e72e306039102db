//! Replays a recorded awe command stream and prints the final state.
//!
//! Usage:
//!   awe-replay [FILE]
//!
//! Commands are read one JSON object per line from FILE, or from stdin when
//! no file is given. Blank lines are skipped. The final snapshot is written to
//! stdout as pretty JSON. Log output goes to stderr; set `AWE_LOG` to change
//! the filter (default `warn`).

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use awe_store::codec::encode_snapshot;
use awe_store::Store;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("AWE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn replay(input: impl BufRead, store: &mut Store) -> Result<(), String> {
    for (n, line) in input.lines().enumerate() {
        let lineno = n + 1;
        let line = line.map_err(|e| format!("line {lineno}: {e}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let message: serde_json::Value =
            serde_json::from_str(&line).map_err(|e| format!("line {lineno}: invalid JSON: {e}"))?;
        store
            .dispatch_json(&message)
            .map_err(|e| format!("line {lineno}: {e}"))?;
    }
    Ok(())
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let mut store = Store::new();
    let result = match args.get(1) {
        Some(path) => match File::open(path) {
            Ok(file) => replay(BufReader::new(file), &mut store),
            Err(e) => Err(format!("{path}: {e}")),
        },
        None => replay(io::stdin().lock(), &mut store),
    };
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let out = match serde_json::to_string_pretty(&encode_snapshot(store.snapshot())) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let mut stdout = io::stdout().lock();
    if let Err(e) = stdout
        .write_all(out.as_bytes())
        .and_then(|()| stdout.write_all(b"\n"))
    {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
