//! shardkv Server Binary
//!
//! Starts the TCP server for shardkv.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use shardkv::network::Server;
use shardkv::{Config, Dispatcher, HashFunction, ReplayPolicy};
use tracing_subscriber::{fmt, EnvFilter};

/// shardkv Server
#[derive(Parser, Debug)]
#[command(name = "shardkv-server")]
#[command(about = "In-memory key-value store with a write-ahead log")]
#[command(version)]
struct Args {
    /// Interface to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// TCP port to listen on
    #[arg(short, long, default_value_t = 4242, value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Initial capacity of the plain store
    #[arg(short = 'c', long, default_value_t = 32, value_parser = parse_positive)]
    initial_capacity: usize,

    /// Number of shards (1 uses the plain store)
    #[arg(short, long, default_value_t = 1, value_parser = parse_positive)]
    shards: usize,

    /// Hash used to route keys to shards
    #[arg(long, value_enum, default_value_t = HashArg::Djb2)]
    hash: HashArg,

    /// Path of the write-ahead log file
    #[arg(short, long, default_value = "./wal_files/wal_file")]
    wal_path: String,

    /// Disable the write-ahead log (data is lost on restart)
    #[arg(long)]
    no_persistence: bool,

    /// What to do with a partial record at the end of the WAL
    #[arg(long, value_enum, default_value_t = ReplayArg::TruncateTail)]
    replay_policy: ReplayArg,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HashArg {
    Sum,
    Djb2,
    Crc32,
}

impl From<HashArg> for HashFunction {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Sum => HashFunction::SimpleSum,
            HashArg::Djb2 => HashFunction::Djb2,
            HashArg::Crc32 => HashFunction::Crc32,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ReplayArg {
    TruncateTail,
    Strict,
}

impl From<ReplayArg> for ReplayPolicy {
    fn from(arg: ReplayArg) -> Self {
        match arg {
            ReplayArg::TruncateTail => ReplayPolicy::TruncateTail,
            ReplayArg::Strict => ReplayPolicy::Strict,
        }
    }
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shardkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("shardkv Server v{}", shardkv::VERSION);

    // Build config from args
    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .initial_capacity(args.initial_capacity)
        .shard_count(args.shards)
        .hash_function(args.hash.into())
        .wal_path(&args.wal_path)
        .persistence_enabled(!args.no_persistence)
        .replay_policy(args.replay_policy.into())
        .build();

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    tracing::info!("WAL: {} (persistence {})", args.wal_path, !args.no_persistence);
    tracing::info!("Shards: {} ({:?} hash)", config.shard_count, config.hash_function);

    // Rebuild the store before any client can connect
    let dispatcher = match Dispatcher::open(&config) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    let server = Server::new(config, dispatcher);
    if let Err(e) = server.start() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
