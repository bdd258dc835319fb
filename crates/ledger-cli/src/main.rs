use anyhow::Result;
use clap::{Parser, Subcommand};
use ledger_core::{
    mine::{mine_next_block, SearchStrategy},
    Ledger,
};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "ledger-cli")]
#[command(about = "CLI client for the proof-of-work ledger node")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a transaction to the node's pending pool
    Submit {
        /// Node base URL (e.g. http://127.0.0.1:5001)
        #[arg(long, default_value = "http://127.0.0.1:5001")]
        node: String,
        /// Sender
        #[arg(long)]
        sender: String,
        /// Recipient
        #[arg(long)]
        recipient: String,
        /// Amount
        #[arg(long)]
        amount: f64,
    },
    /// Ask the node to mine the next block
    Mine {
        #[arg(long, default_value = "http://127.0.0.1:5001")]
        node: String,
    },
    /// Print the node's full chain
    Chain {
        #[arg(long, default_value = "http://127.0.0.1:5001")]
        node: String,
    },
    /// Register peers with the node
    Register {
        #[arg(long, default_value = "http://127.0.0.1:5001")]
        node: String,
        /// Peer address, bare host:port or URL; may be repeated
        #[arg(long = "peer", required = true)]
        peers: Vec<String>,
    },
    /// Run conflict resolution on the node
    Resolve {
        #[arg(long, default_value = "http://127.0.0.1:5001")]
        node: String,
    },
    /// Mine two blocks on a local in-memory ledger and print the chain
    Demo {
        /// Address credited with the mining rewards
        #[arg(long, default_value = "my-address")]
        miner: String,
    },
}

#[derive(Serialize)]
struct Tx {
    sender: String,
    recipient: String,
    amount: serde_json::Number,
}

#[derive(Serialize)]
struct Nodes {
    nodes: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .pretty()
        .init();

    let cli = Cli::parse();
    let client = reqwest::Client::new();
    match cli.cmd {
        Command::Submit {
            node,
            sender,
            recipient,
            amount,
        } => {
            let tx = Tx {
                sender,
                recipient,
                amount: json_amount(amount)?,
            };
            let res = client
                .post(format!("{node}/transactions/new"))
                .json(&tx)
                .send()
                .await?;
            print_response(res).await?;
        }
        Command::Mine { node } => {
            print_response(client.get(format!("{node}/mine")).send().await?).await?;
        }
        Command::Chain { node } => {
            print_response(client.get(format!("{node}/chain")).send().await?).await?;
        }
        Command::Register { node, peers } => {
            let res = client
                .post(format!("{node}/nodes/register"))
                .json(&Nodes { nodes: peers })
                .send()
                .await?;
            print_response(res).await?;
        }
        Command::Resolve { node } => {
            print_response(client.get(format!("{node}/nodes/resolve")).send().await?).await?;
        }
        Command::Demo { miner } => demo(&miner)?,
    }
    Ok(())
}

/// Whole numbers are sent as JSON integers, everything else as floats.
fn json_amount(amount: f64) -> Result<serde_json::Number> {
    if amount.fract() == 0.0 && amount.abs() < u64::MAX as f64 {
        if amount >= 0.0 {
            return Ok((amount as u64).into());
        }
        return Ok((amount as i64).into());
    }
    serde_json::Number::from_f64(amount)
        .ok_or_else(|| anyhow::anyhow!("amount must be a finite number, got {amount}"))
}

async fn print_response(res: reqwest::Response) -> Result<()> {
    let status = res.status();
    let body = res.text().await?;
    println!("status: {}", status);
    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}

fn demo(miner: &str) -> Result<()> {
    let mut ledger = Ledger::new();
    info!("ledger created, mining block 2");
    mine_next_block(&mut ledger, miner, SearchStrategy::Sequential)
        .ok_or_else(|| anyhow::anyhow!("proof search aborted"))?;

    info!("mining block 3");
    ledger.new_transaction("Alice", "Bob", 5);
    mine_next_block(&mut ledger, miner, SearchStrategy::Sequential)
        .ok_or_else(|| anyhow::anyhow!("proof search aborted"))?;

    for block in ledger.chain() {
        println!("{}", serde_json::to_string_pretty(&block.hashed())?);
        println!("{}", "-".repeat(40));
    }
    Ok(())
}
