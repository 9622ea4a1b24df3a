//! shardkv CLI Client
//!
//! Command-line interface for interacting with shardkv.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use clap::{Parser, Subcommand};
use shardkv::protocol::{read_response, write_command, Command};

/// shardkv CLI
#[derive(Parser, Debug)]
#[command(name = "shardkv-cli")]
#[command(about = "CLI for the shardkv key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:4242")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair
    Set {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key
    Del {
        /// The key to delete
        key: String,
    },
}

impl From<Commands> for Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Get { key } => Command::Get { key: key.into_bytes() },
            Commands::Set { key, value } => Command::Set {
                key: key.into_bytes(),
                value: value.into_bytes(),
            },
            Commands::Del { key } => Command::Del { key: key.into_bytes() },
        }
    }
}

fn run(args: Args) -> shardkv::Result<bool> {
    let stream = TcpStream::connect(&args.server)?;
    let mut writer = BufWriter::new(stream.try_clone()?);
    let mut reader = BufReader::new(stream);

    write_command(&mut writer, &args.command.into())?;
    let response = read_response(&mut reader)?;

    println!("{response}");
    Ok(response.starts_with('+'))
}

fn main() {
    let args = Args::parse();

    match run(args) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }
}
