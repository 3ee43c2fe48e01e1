//! Signing CLI.
//!
//! One-shot command-line interface that drives a signing session
//! against a signer emulator over TCP, answering confirmation prompts
//! interactively on stdin.
//!
//! # Usage
//!
//! ```bash
//! hwsign_cli sign-tx \
//!     --path "m/44'/60'/0'/0/0" \
//!     --nonce 0 \
//!     --gas-price 20000000000 \
//!     --gas-limit 21000 \
//!     --to 0x8ea7a3fccc211ed48b763b4164884ddbcf3b0a98 \
//!     --value 100000000000000000 \
//!     --chain-id 3
//! ```

use std::io::Write;
use std::net::SocketAddr;

use clap::{Parser, Subcommand};

use hwsign_client::{
    parse_derivation_path, sign_transaction, Decision, PolicyContext, Prompt, SignError,
    TcpTransport, TransactionRequest,
};

#[derive(Parser, Debug)]
#[command(name = "hwsign-cli", about = "Sign transactions with a hardware signer")]
struct Cli {
    /// Signer emulator address.
    #[arg(long, default_value = "127.0.0.1:9999")]
    addr: SocketAddr,

    /// Answer every prompt affirmatively instead of asking on stdin.
    #[arg(long)]
    yes: bool,

    #[clap(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
#[clap(rename_all = "snake_case")]
enum CliCommand {
    /// Sign a transaction
    SignTx {
        /// Derivation path, e.g. m/44'/60'/0'/0/0
        #[clap(long)]
        path: String,
        #[clap(long)]
        nonce: u128,
        #[clap(long)]
        gas_price: u128,
        #[clap(long)]
        gas_limit: u128,
        /// Recipient address; omit to deploy a contract
        #[clap(long)]
        to: Option<String>,
        #[clap(long, default_value_t = 0)]
        value: u128,
        /// Data payload as hex
        #[clap(long)]
        data: Option<String>,
        #[clap(long)]
        chain_id: Option<u64>,
        /// Allow data payload display and confirmation on the signer
        #[clap(long)]
        advanced: bool,
    },
}

fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    let s = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(s).map_err(|e| format!("Invalid hex: {}", e))
}

fn parse_address(s: &str) -> Result<[u8; 20], String> {
    let bytes = parse_hex(s)?;
    if bytes.len() != 20 {
        return Err("Address must be 20 bytes".to_string());
    }
    let mut arr = [0u8; 20];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}

fn prompt_label(prompt: &Prompt) -> String {
    match prompt {
        Prompt::ConfirmOutput => "Confirm recipient and value".to_string(),
        Prompt::ConfirmData => "Confirm data payload".to_string(),
        Prompt::Warning => "Signer warning".to_string(),
        Prompt::Other(code) => format!("Signer prompt (code {})", code),
    }
}

fn ask_on_stdin(prompt: &Prompt) -> Decision {
    print!("{} - approve? [y/N] ", prompt_label(prompt));
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return Decision::Deny;
    }
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Decision::Affirm,
        _ => Decision::Deny,
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let CliCommand::SignTx {
        path,
        nonce,
        gas_price,
        gas_limit,
        to,
        value,
        data,
        chain_id,
        advanced,
    } = &cli.command;

    let request = TransactionRequest {
        path: parse_derivation_path(path)?,
        nonce: Some(*nonce),
        gas_price: Some(*gas_price),
        gas_limit: Some(*gas_limit),
        to: to.as_deref().map(parse_address).transpose()?,
        value: *value,
        data: data.as_deref().map(parse_hex).transpose()?.unwrap_or_default(),
        chain_id: *chain_id,
    };
    let policy = PolicyContext {
        advanced_mode: *advanced,
    };

    let transport = TcpTransport::connect(cli.addr).await?;

    let auto = cli.yes;
    let mut decider = move |prompt: &Prompt| {
        if auto {
            println!("{} - auto-approved", prompt_label(prompt));
            Decision::Affirm
        } else {
            ask_on_stdin(prompt)
        }
    };

    match sign_transaction(&transport, &request, &policy, &mut decider).await {
        Ok(sig) => {
            println!("v: {}", sig.v);
            println!("r: 0x{}", hex::encode(sig.r));
            println!("s: 0x{}", hex::encode(sig.s));
        }
        Err(SignError::Cancelled(reason)) => {
            println!("Cancelled: {}", reason);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
