//! Burst arbitration fabric CLI.
//!
//! This binary provides a single entry point for driving the fabric. It performs:
//! 1. **Demo run:** Stream write frames from every client into the reference RAM,
//!    read every region back through the arbiter, and verify the payloads.
//! 2. **Reporting:** Print the fabric statistics table and per-client status.
//!
//! Configuration is JSON (see memfab_core::config::Config); the CLI uses
//! built-in defaults when no file is given.

use clap::{Parser, Subcommand};
use std::{fs, process};

use memfab_core::common::ClientId;
use memfab_core::config::Config;
use memfab_core::fabric::Fabric;
use memfab_core::resource::MemoryResource;
use memfab_core::resource::model::ModelRam;

#[derive(Parser, Debug)]
#[command(
    name = "memfab",
    author,
    version,
    about = "Multi-client burst arbitration fabric",
    long_about = "Run the write/read-back demo against the reference RAM.\n\nEvery client streams one write frame into its own region, then reads the\nregion back through the arbiter; the run ends with the statistics report\nand per-client status. Set RUST_LOG=memfab_core=debug to watch grants.\n\nExamples:\n  memfab run\n  memfab run --clients 8 --words 200\n  memfab run --config fabric.json --ticks 50000"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Stream write frames from every client, read them back, verify.
    Run {
        /// JSON configuration file (built-in defaults when omitted).
        #[arg(short, long)]
        config: Option<String>,

        /// Tick budget for the whole run.
        #[arg(long, default_value_t = 100_000)]
        ticks: u64,

        /// Override the configured client count.
        #[arg(long)]
        clients: Option<usize>,

        /// Words each client streams per frame.
        #[arg(long, default_value_t = 64)]
        words: u64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Run {
            config,
            ticks,
            clients,
            words,
        }) => cmd_run(config, ticks, clients, words),
        None => {
            eprintln!("memfab — pass a subcommand");
            eprintln!();
            eprintln!("  memfab run                      Demo with built-in defaults");
            eprintln!("  memfab run --config <json>      Demo with a JSON config");
            eprintln!("  memfab run --clients 8          Override the client count");
            eprintln!();
            eprintln!("  memfab --help  for full options");
            process::exit(1);
        }
    }
}

/// Loads the JSON config file, or returns the defaults when no path is given.
///
/// Exits the process with code 1 on a missing file or malformed JSON.
fn load_config(path: Option<&str>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config {path}: {e}");
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing config {path}: {e}");
        process::exit(1);
    })
}

/// The payload each client writes: client identity folded into the word so
/// read-back verification catches cross-client routing mistakes.
fn demo_word(client: usize, index: u64) -> u64 {
    (client as u64) << 32 | index
}

/// Runs the demo: one write frame per client, then a read-back frame per
/// client, all within the tick budget. Prints the report and exits non-zero
/// on a fault, an exhausted budget, or a payload mismatch.
fn cmd_run(config_path: Option<String>, ticks: u64, clients: Option<usize>, words: u64) {
    let mut config = load_config(config_path.as_deref());
    if let Some(n) = clients {
        config.fabric.clients = n;
    }
    if words > config.resource.region_words {
        eprintln!(
            "Error: --words {words} exceeds the per-client region of {} words",
            config.resource.region_words
        );
        process::exit(1);
    }

    let mut fabric = Fabric::new(&config, ModelRam::new(&config.resource)).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    let n = fabric.clients();

    println!(
        "[*] Fabric: {n} clients, burst {}, fifo {}, resource {}",
        config.fabric.burst_size,
        config.fabric.fifo_depth,
        fabric.resource().name()
    );
    println!("[*] Demo: {words} words per client, budget {ticks} ticks");
    println!();

    let mut used = 0u64;
    stream_writes(&mut fabric, &config, words, &mut used, ticks);
    let verified = read_back(&mut fabric, &config, words, &mut used, ticks);

    print!("{}", fabric.stats().report());
    println!();
    println!("Per-client status");
    for c in 0..n {
        println!("  client{c}: {}", fabric.status(ClientId(c)));
    }
    println!();

    let total = words * n as u64;
    if verified == total {
        println!("[*] Verified {verified}/{total} read-back words in {used} ticks");
    } else {
        eprintln!("[!] Only {verified}/{total} read-back words matched");
        process::exit(1);
    }
}

/// Advances the fabric one round, charging the tick budget.
///
/// Returns `false` when the budget is exhausted; exits the process on a
/// fatal fabric fault.
fn step(fabric: &mut Fabric<ModelRam>, used: &mut u64, budget: u64) -> bool {
    if *used >= budget {
        return false;
    }
    *used += 1;
    if let Err(e) = fabric.tick() {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
    true
}

/// Streams one write frame per client, interleaving enqueues with ticks so
/// queue backpressure is honored, then drains until every word is submitted.
fn stream_writes(
    fabric: &mut Fabric<ModelRam>,
    config: &Config,
    words: u64,
    used: &mut u64,
    budget: u64,
) {
    let n = fabric.clients();
    let mut sent = vec![0u64; n];
    for c in 0..n {
        fabric.begin_frame(ClientId(c));
    }

    loop {
        let mut pending = false;
        for c in 0..n {
            let client = ClientId(c);
            if sent[c] == words {
                continue;
            }
            pending = true;
            if fabric.status(client).fifo_occupancy < config.fabric.fifo_depth
                && fabric.enqueue_write(client, demo_word(c, sent[c])).is_ok()
            {
                sent[c] += 1;
                if sent[c] == words {
                    fabric.end_frame(client);
                }
            }
        }
        if !pending {
            break;
        }
        if !step(fabric, used, budget) {
            exhausted(used);
        }
    }

    let total = words * n as u64;
    while fabric.stats().words_submitted < total {
        if !step(fabric, used, budget) {
            exhausted(used);
        }
    }
}

/// Issues a read frame per client over its freshly written region and counts
/// the completions that match the written payloads.
fn read_back(
    fabric: &mut Fabric<ModelRam>,
    config: &Config,
    words: u64,
    used: &mut u64,
    budget: u64,
) -> u64 {
    let n = fabric.clients();
    let bases: Vec<u64> = (0..n)
        .map(|c| fabric.resource().region_base(ClientId(c)))
        .collect();
    let mut issued = vec![0u64; n];
    let mut received = vec![0u64; n];
    let mut verified = 0u64;
    for c in 0..n {
        fabric.begin_frame(ClientId(c));
    }

    loop {
        let mut pending = false;
        for c in 0..n {
            let client = ClientId(c);
            if issued[c] < words {
                pending = true;
                if fabric.status(client).fifo_occupancy < config.fabric.fifo_depth
                    && fabric.enqueue_read(client, bases[c] + issued[c]).is_ok()
                {
                    issued[c] += 1;
                    if issued[c] == words {
                        fabric.end_frame(client);
                    }
                }
            }
            while let Some(word) = fabric.take_completion(client) {
                if word == demo_word(c, received[c]) {
                    verified += 1;
                }
                received[c] += 1;
            }
            if received[c] < words {
                pending = true;
            }
        }
        if !pending {
            break;
        }
        if !step(fabric, used, budget) {
            exhausted(used);
        }
    }
    verified
}

/// Reports an exhausted tick budget and exits with code 1.
fn exhausted(used: &u64) -> ! {
    eprintln!("\n[!] Tick budget exhausted after {used} rounds");
    process::exit(1);
}
