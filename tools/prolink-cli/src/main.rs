use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::debug;
use prolink::{
    compression, decoder,
    prolink_types::{CompressionFlag, ShortcutPayload, SignatureData, TransactionData},
    transport, CodecLimits, EncodeOptions, LinkEnvironment, Request,
};
use serde_json::{json, Value};

/// Encode wallet JSON-RPC requests into compact prolink payloads and back.
///
/// Payload arguments may be bare base64url strings or universal links carrying `?p=<payload>`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Maximum accepted payload length (base64url characters) when decoding.
    #[arg(long, global = true, env = "PROLINK_MAX_PAYLOAD_LEN")]
    max_payload_len: Option<usize>,

    /// Maximum decompressed record size in bytes when decoding.
    #[arg(long, global = true, env = "PROLINK_MAX_RECORD_LEN")]
    max_record_len: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a JSON request (`{"method", "params", "chainId"?, "capabilities"?}`).
    Encode {
        /// Request file; reads stdin when omitted.
        file: Option<PathBuf>,

        /// Print a universal link for this environment instead of the bare payload.
        #[arg(long, value_parser = str::parse::<LinkEnvironment>)]
        link: Option<LinkEnvironment>,

        /// Always use the generic JSON-RPC form.
        #[arg(long)]
        no_specialize: bool,

        /// Never compress the record.
        #[arg(long)]
        no_compress: bool,
    },
    /// Decode a payload and print the request as JSON.
    Decode { payload: String },
    /// Print a summary of the payload envelope.
    Inspect { payload: String },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut limits = CodecLimits::default();
    if let Some(max) = cli.max_payload_len {
        limits = limits.with_max_payload_len(max);
    }
    if let Some(max) = cli.max_record_len {
        limits = limits.with_max_record_len(max);
    }

    match cli.command {
        Command::Encode {
            file,
            link,
            no_specialize,
            no_compress,
        } => {
            let options = EncodeOptions {
                specialize: !no_specialize,
                compress: !no_compress,
                limits,
            };
            println!("{}", encode(file, link, &options)?);
        }
        Command::Decode { payload } => {
            let request = prolink::decode_with_limits(payload_arg(&payload), &limits)
                .context("failed to decode payload")?;
            println!("{}", serde_json::to_string_pretty(&request)?);
        }
        Command::Inspect { payload } => {
            println!("{}", serde_json::to_string_pretty(&inspect(payload_arg(&payload), &limits)?)?);
        }
    }
    Ok(())
}

fn encode(file: Option<PathBuf>, link: Option<LinkEnvironment>, options: &EncodeOptions) -> Result<String> {
    let raw = match &file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read request from stdin")?;
            buf
        }
    };
    let request: Request = serde_json::from_str(&raw).context("request is not valid JSON")?;
    let payload = prolink::encode_with_options(&request, options)
        .with_context(|| format!("failed to encode {}", request.method))?;
    debug!("payload is {} characters", payload.len());

    Ok(match link {
        Some(target) => prolink::to_universal_link(&payload, target),
        None => payload,
    })
}

fn payload_arg(input: &str) -> &str {
    let input = input.trim();
    prolink::payload_from_link(input).unwrap_or(input)
}

fn inspect(payload: &str, limits: &CodecLimits) -> Result<Value> {
    let framed = transport::decode_base64url(payload, limits.max_payload_len)
        .context("payload is not base64url")?;
    let record = compression::unframe(&framed, limits.max_record_len)
        .context("failed to unframe payload")?;
    let envelope =
        decoder::decode_record_with_limits(&record, limits).context("failed to decode envelope")?;

    let kind = match &envelope.shortcut {
        ShortcutPayload::GenericRpc(payload) => format!("generic_rpc ({})", payload.method),
        ShortcutPayload::WalletSendCalls(payload) => match &payload.transaction_data {
            TransactionData::Erc20Transfer { .. } => "wallet_sendCalls/erc20_transfer".to_string(),
            TransactionData::NativeTransfer { .. } => "wallet_sendCalls/native_transfer".to_string(),
            TransactionData::GenericCalls { calls } => {
                format!("wallet_sendCalls/generic_calls ({} calls)", calls.len())
            }
        },
        ShortcutPayload::WalletSign(payload) => match &payload.signature_data {
            SignatureData::SpendPermission(_) => "wallet_sign/spend_permission".to_string(),
            SignatureData::ReceiveWithAuthorization(_) => {
                "wallet_sign/receive_with_authorization".to_string()
            }
            SignatureData::GenericTypedData { .. } => "wallet_sign/generic_typed_data".to_string(),
        },
    };

    Ok(json!({
        "protocolVersion": envelope.protocol_version,
        "chainId": envelope.chain_id,
        "shortcut": kind,
        "hasFrom": envelope.from.is_some(),
        "capabilities": envelope
            .capabilities
            .as_ref()
            .map(|caps| caps.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default(),
        "compressed": framed.first() == Some(&(CompressionFlag::Zstd as u8)),
        "payloadChars": payload.len(),
        "framedBytes": framed.len(),
        "recordBytes": record.len(),
    }))
}
