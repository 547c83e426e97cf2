//! Chain & RPC endpoints

/// Urls of JSON-RPC nodes hosting the verification contract
pub struct RpcUrls;
impl RpcUrls {
    /// Address to the locally running Anvil/Hardhat node <https://getfoundry.sh/anvil/overview/>
    pub const LOCAL: &'static str = "http://localhost:8545";
}

pub struct ChainIds;
impl ChainIds {
    pub const ETHEREUM: u64 = 0x1;
    pub const GOERLI: u64 = 0x5;
    pub const POLYGON: u64 = 0x89;
    pub const MUMBAI: u64 = 0x13881;
    pub const HARDHAT: u64 = 0x7a69;
}

pub const UNKNOWN_NETWORK: &str = "Unknown Network";

/// Human readable name of the network with `chain_id`
pub fn network_name(chain_id: u64) -> &'static str {
    match chain_id {
        ChainIds::ETHEREUM => "Ethereum Mainnet",
        ChainIds::POLYGON => "Polygon Mainnet",
        ChainIds::MUMBAI => "Mumbai Testnet",
        ChainIds::GOERLI => "Goerli Testnet",
        ChainIds::HARDHAT => "Hardhat Network",
        _ => UNKNOWN_NETWORK,
    }
}
