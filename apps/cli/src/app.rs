//! Application functions
use color_eyre::eyre::{self, eyre, Result, WrapErr};
use ethers::signers::{LocalWallet, Signer};
use vmeet_configuration::network_name;
use vmeet_cryptography::signature::{checksummed, parse_address};
use vmeet_cryptography::utils::{generate_local_wallet, wallet_from_hex};
use vmeet_directory::{InMemoryDirectory, MeetingService};
use vmeet_id::{
    JoinError, JoinFlow, LocalVerifyContract, MeetingContract, MeetingIdentifier, MessageHash,
    RpcVerifyContract, WalletProvider,
};

use crate::args::{self, AppOpts, Commands, ContractOpts};

pub struct App {
    opts: AppOpts,
}

impl App {
    pub fn new(opts: AppOpts) -> Self {
        Self { opts }
    }

    pub async fn run(self) -> Result<()> {
        let App { opts } = self;
        let AppOpts { cmd, contract, .. } = opts;

        match cmd {
            Commands::Hash(args::Hash { meeting_id }) => {
                let hash = MessageHash::of(&MeetingIdentifier::new(meeting_id)?);
                println!("message hash:            {hash}");
                println!("eth signed message hash: 0x{}", hex::encode(hash.eth_signed()));
            }
            Commands::NewId => println!("{}", MeetingIdentifier::generate()),
            Commands::Sign(args::Sign { meeting_id, key }) => {
                let wallet = wallet_from_hex(key)?;
                let hash = MessageHash::of(&MeetingIdentifier::new(meeting_id)?);
                let signature = wallet.personal_sign(wallet.address(), &hash).await?;
                println!("0x{}", hex::encode(signature.bytes()));
            }
            Commands::Recover(args::Recover {
                meeting_id,
                signature,
            }) => {
                let hash = MessageHash::of(&MeetingIdentifier::new(meeting_id)?);
                let signer = hash.recover_signer(&decode_signature(&signature)?)?;
                println!("{}", checksummed(signer));
            }
            Commands::Verify(args::Verify {
                meeting_id,
                signature,
            }) => {
                let meeting = MeetingIdentifier::new(meeting_id)?;
                let signature = decode_signature(&signature)?;
                let contract = contract_for(&contract, reader_wallet(&contract)?).await?;
                let authorized = contract.verify(&meeting, &signature).await?;
                println!("{authorized}");
            }
            Commands::Register(args::Register {
                meeting_id,
                addresses,
            }) => {
                let meeting = MeetingIdentifier::new(meeting_id)?;
                let signers = addresses
                    .iter()
                    .map(parse_address)
                    .collect::<Result<Vec<_>, _>>()?;
                let contract = contract_for(&contract, owner_wallet(&contract)?).await?;
                contract.map_identifier_to_signers(&meeting, &signers).await?;
                info!(meeting = %meeting, count = signers.len(), "registered signers");
            }
            Commands::Join(args::Join { meeting_id, key }) => {
                let wallet = wallet_from_hex(key)?;
                let contract = contract_for(&contract, wallet.clone()).await?;
                let mut flow = JoinFlow::new(wallet, contract);
                match flow.join(&meeting_id).await {
                    Ok(meeting) => println!("joined {meeting}"),
                    Err(JoinError::VerificationFailed) => {
                        eyre::bail!("wallet is not authorized for meeting {meeting_id}")
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Commands::Network(args::Network { chain_id }) => {
                println!("{}", network_name(chain_id))
            }
            Commands::Demo => demo().await?,
        }
        Ok(())
    }
}

/// The verification contract, sending calls from `wallet`
async fn contract_for(
    opts: &ContractOpts,
    wallet: LocalWallet,
) -> Result<Box<dyn MeetingContract>> {
    if opts.local {
        let owner = match &opts.owner_key {
            Some(key) => wallet_from_hex(key)?.address(),
            None => wallet.address(),
        };
        warn!("using an in-process contract, registrations end with this command");
        return Ok(Box::new(
            LocalVerifyContract::deploy(owner).connect(wallet.address()),
        ));
    }

    let address = opts
        .contract_address
        .as_ref()
        .ok_or_else(|| eyre!("--contract-address or VMEET_CONTRACT_ADDRESS is required"))?;
    let address = parse_address(address)?;
    let contract = match opts.chain_id {
        Some(chain_id) => RpcVerifyContract::new(&opts.rpc_url, address, wallet, chain_id)?,
        None => RpcVerifyContract::connect(&opts.rpc_url, address, wallet).await?,
    };
    debug!(url = %opts.rpc_url, contract = %checksummed(address), "using deployed contract");
    Ok(Box::new(contract))
}

fn owner_wallet(opts: &ContractOpts) -> Result<LocalWallet> {
    let key = opts
        .owner_key
        .as_ref()
        .ok_or_else(|| eyre!("--owner-key or VMEET_OWNER_KEY is required to register signers"))?;
    Ok(wallet_from_hex(key)?)
}

/// Any wallet works for read-only calls
fn reader_wallet(opts: &ContractOpts) -> Result<LocalWallet> {
    match &opts.owner_key {
        Some(key) => Ok(wallet_from_hex(key)?),
        None => Ok(generate_local_wallet()),
    }
}

fn decode_signature(signature: &str) -> Result<Vec<u8>> {
    let signature = signature.trim();
    hex::decode(signature.strip_prefix("0x").unwrap_or(signature))
        .wrap_err("signature is not valid hex")
}

/// Walk through creating a meeting, inviting a participant and joining, all in process
async fn demo() -> Result<()> {
    let owner = generate_local_wallet();
    let alice = generate_local_wallet();
    let bob = generate_local_wallet();
    let mallory = generate_local_wallet();

    let contract = LocalVerifyContract::deploy(owner.address());
    let service = MeetingService::new(InMemoryDirectory::new(), contract.clone());

    service.register(alice.address(), "alice").await?;
    service.register(bob.address(), "bob").await?;

    let meeting = service.create_meeting(alice.address()).await?;
    info!(meeting = %meeting.id, "alice created a meeting");
    service
        .invite(&meeting.id, alice.address(), &[checksummed(bob.address())])
        .await?;

    for summary in service.meetings_for(bob.address()).await? {
        let names = summary
            .participants
            .iter()
            .map(|p| p.display_name.as_str())
            .collect::<Vec<_>>();
        println!("{}: {}", summary.id, names.join(", "));
    }

    let mut bob_session = JoinFlow::new(bob, contract.clone());
    let joined = bob_session.join(meeting.id.as_str()).await?;
    println!("bob joined {joined}");

    let mut mallory_session = JoinFlow::new(mallory, contract);
    match mallory_session.join(meeting.id.as_str()).await {
        Err(JoinError::VerificationFailed) => println!("mallory was turned away"),
        Ok(_) => eyre::bail!("unauthorized wallet joined the meeting"),
        Err(err) => return Err(err.into()),
    }

    bob_session.leave();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    // anvil/hardhat account #0
    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn app(args: &[&str]) -> App {
        let opts =
            AppOpts::try_parse_from(std::iter::once("vmeet").chain(args.iter().copied())).unwrap();
        App::new(opts)
    }

    async fn signature_hex(meeting_id: &str) -> String {
        let wallet = wallet_from_hex(KEY).unwrap();
        let hash = MessageHash::of(&MeetingIdentifier::new(meeting_id).unwrap());
        let signature = wallet.personal_sign(wallet.address(), &hash).await.unwrap();
        format!("0x{}", hex::encode(signature.bytes()))
    }

    #[tokio::test]
    async fn demo_walks_through_create_invite_and_join() {
        demo().await.unwrap();
    }

    #[test]
    fn signatures_decode_with_or_without_prefix() {
        assert_eq!(decode_signature(" 0xdeadbeef ").unwrap(), vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(decode_signature("0102").unwrap(), vec![1, 2]);
        assert!(decode_signature("0xnot-hex").is_err());
    }

    #[tokio::test]
    async fn offline_commands_succeed() {
        app(&["hash", "ABCD-EFGH-IJKL"]).run().await.unwrap();
        app(&["new-id"]).run().await.unwrap();
        app(&["network", "0x89"]).run().await.unwrap();
        app(&["sign", "ABCD-EFGH-IJKL", "--key", KEY])
            .run()
            .await
            .unwrap();
        assert!(app(&["hash", "   "]).run().await.is_err());
    }

    #[tokio::test]
    async fn recover_accepts_wallet_signatures_only() {
        let signature = signature_hex("ABCD-EFGH-IJKL").await;
        app(&["recover", "ABCD-EFGH-IJKL", &signature])
            .run()
            .await
            .unwrap();

        let mut eip155 = decode_signature(&signature).unwrap();
        eip155[64] += 8;
        let eip155 = hex::encode(eip155);
        assert!(app(&["recover", "ABCD-EFGH-IJKL", &eip155])
            .run()
            .await
            .is_err());
        assert!(app(&["recover", "ABCD-EFGH-IJKL", "0x1234"])
            .run()
            .await
            .is_err());
    }

    #[tokio::test]
    async fn local_contract_turns_away_unregistered_wallets() {
        let signature = signature_hex("ABCD-EFGH-IJKL").await;
        app(&["verify", "ABCD-EFGH-IJKL", &signature, "--local"])
            .run()
            .await
            .unwrap();

        let err = app(&["join", "ABCD-EFGH-IJKL", "--key", KEY, "--local"])
            .run()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not authorized"));
    }

    #[tokio::test]
    async fn register_needs_the_owner_key() {
        if std::env::var("VMEET_OWNER_KEY").is_ok() {
            return;
        }
        let address = checksummed(wallet_from_hex(KEY).unwrap().address());
        let err = app(&["register", "ABCD-EFGH-IJKL", &address, "--local"])
            .run()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--owner-key"));

        app(&[
            "register",
            "ABCD-EFGH-IJKL",
            &address,
            "--local",
            "--owner-key",
            KEY,
        ])
        .run()
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn deployed_contract_needs_an_address() {
        if std::env::var("VMEET_CONTRACT_ADDRESS").is_ok() {
            return;
        }
        let signature = signature_hex("ABCD-EFGH-IJKL").await;
        let err = app(&["verify", "ABCD-EFGH-IJKL", &signature, "--chain-id", "31337"])
            .run()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("--contract-address"));
    }
}
