//! App Argument Options
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use vmeet_configuration::RpcUrls;

/// Create, inspect and join wallet-gated meetings
#[derive(Parser, Debug)]
#[command(name = "vmeet", version)]
pub struct AppOpts {
    #[command(subcommand)]
    pub cmd: Commands,
    #[command(flatten)]
    pub log: LogOptions,
    #[command(flatten)]
    pub contract: ContractOpts,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Hash(Hash),
    NewId,
    Sign(Sign),
    Recover(Recover),
    Verify(Verify),
    Register(Register),
    Join(Join),
    Network(Network),
    Demo,
}

/// Print the challenge hash for a meeting id
#[derive(Args, Debug)]
pub struct Hash {
    pub meeting_id: String,
}

/// Sign the challenge for a meeting id with a private key
#[derive(Args, Debug)]
pub struct Sign {
    pub meeting_id: String,
    /// Hex encoded private key of the signing wallet
    #[arg(long, env = "VMEET_KEY", hide_env_values = true)]
    pub key: String,
}

/// Recover the address that signed the challenge for a meeting id
#[derive(Args, Debug)]
pub struct Recover {
    pub meeting_id: String,
    /// 65 byte signature, hex encoded
    pub signature: String,
}

/// Ask the contract whether a signature authorizes its signer for a meeting
#[derive(Args, Debug)]
pub struct Verify {
    pub meeting_id: String,
    /// 65 byte signature, hex encoded
    pub signature: String,
}

/// Authorize addresses for a meeting. Needs the owner key.
#[derive(Args, Debug)]
pub struct Register {
    pub meeting_id: String,
    #[arg(required = true)]
    pub addresses: Vec<String>,
}

/// Run the join protocol for a meeting with a private key
#[derive(Args, Debug)]
pub struct Join {
    pub meeting_id: String,
    /// Hex encoded private key of the joining wallet
    #[arg(long, env = "VMEET_KEY", hide_env_values = true)]
    pub key: String,
}

/// Name the network behind a chain id
#[derive(Args, Debug)]
pub struct Network {
    /// Decimal or 0x prefixed hex
    #[arg(value_parser = parse_chain_id)]
    pub chain_id: u64,
}

/// specify the log output
#[derive(Args, Debug)]
pub struct LogOptions {
    /// Output logs as newline delimited JSON
    #[arg(long, global = true)]
    pub json: bool,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

/// Where the verification contract lives
#[derive(Args, Debug, Clone)]
pub struct ContractOpts {
    /// Use a contract deployed in this process instead of an RPC node
    #[arg(long, global = true)]
    pub local: bool,
    #[arg(long, global = true, env = "VMEET_RPC_URL", default_value = RpcUrls::LOCAL)]
    pub rpc_url: String,
    #[arg(long, global = true, env = "VMEET_CONTRACT_ADDRESS")]
    pub contract_address: Option<String>,
    /// Hex encoded private key of the contract owner
    #[arg(long, global = true, env = "VMEET_OWNER_KEY", hide_env_values = true)]
    pub owner_key: Option<String>,
    /// Skip asking the node for its chain id
    #[arg(long, global = true, env = "VMEET_CHAIN_ID", value_parser = parse_chain_id)]
    pub chain_id: Option<u64>,
}

pub fn parse_chain_id(value: &str) -> Result<u64, String> {
    let value = value.trim();
    match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    }
    .map_err(|e| format!("invalid chain id {value}: {e}"))
}
