use anchor_client::{
    solana_sdk::{
        commitment_config::CommitmentConfig,
        pubkey::Pubkey,
        signature::{read_keypair_file, Keypair},
        signer::Signer,
    },
    Client, Cluster, Program,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::rc::Rc;
use xnft_entangler::{accounts, instruction, utils::find_entangler_address, XnftEntangler};

/// Provider settings resolve the same way `AnchorProvider.env()` does.
#[derive(Parser, Debug)]
#[command(name = "xnft-entangler-client", version)]
pub struct Opts {
    /// Cluster name (localnet, devnet, ...) or RPC URL
    #[arg(long, env = "ANCHOR_PROVIDER_URL", default_value = "localnet")]
    cluster: String,
    /// Keypair paying for and signing transactions
    #[arg(long, env = "ANCHOR_WALLET", default_value = "~/.config/solana/id.json")]
    wallet: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send `initialize` and print the transaction signature
    Initialize,
    /// Print the entangler of a pair
    Show {
        #[arg(long)]
        mint_a: Pubkey,
        #[arg(long)]
        mint_b: Pubkey,
    },
    /// Re-price a pair or hand it to another authority; the wallet must be its authority
    Update {
        #[arg(long)]
        mint_a: Pubkey,
        #[arg(long)]
        mint_b: Pubkey,
        /// Omit for a free pair
        #[arg(long)]
        price: Option<u64>,
        #[arg(long)]
        pays_every_time: bool,
        /// Defaults to the wallet
        #[arg(long)]
        new_authority: Option<Pubkey>,
    },
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let cluster: Cluster = opts.cluster.parse()?;
    let payer = load_wallet(&opts.wallet)?;
    let wallet = payer.pubkey();

    let client = Client::new_with_options(cluster, Rc::new(payer), CommitmentConfig::processed());
    let program = client.program(xnft_entangler::ID)?;

    match opts.command {
        Command::Initialize => initialize(&program),
        Command::Show { mint_a, mint_b } => show(&program, mint_a, mint_b),
        Command::Update {
            mint_a,
            mint_b,
            price,
            pays_every_time,
            new_authority,
        } => update(
            &program,
            wallet,
            mint_a,
            mint_b,
            price,
            pays_every_time,
            new_authority.unwrap_or(wallet),
        ),
    }
}

fn load_wallet(path: &str) -> Result<Keypair> {
    let path = shellexpand::tilde(path);
    read_keypair_file(&*path).map_err(|e| anyhow!("reading keypair {path}: {e}"))
}

fn initialize(program: &Program<Rc<Keypair>>) -> Result<()> {
    let tx = program
        .request()
        .accounts(accounts::Initialize {})
        .args(instruction::Initialize)
        .send()
        .context("sending initialize")?;
    println!("Your transaction signature {tx}");
    Ok(())
}

fn show(program: &Program<Rc<Keypair>>, mint_a: Pubkey, mint_b: Pubkey) -> Result<()> {
    let (address, _) = find_entangler_address(&mint_a, &mint_b);
    let entangler: XnftEntangler = program
        .account(address)
        .with_context(|| format!("fetching entangler {address}"))?;
    println!("entangler: {address}");
    println!("{entangler:#?}");
    Ok(())
}

fn update(
    program: &Program<Rc<Keypair>>,
    authority: Pubkey,
    mint_a: Pubkey,
    mint_b: Pubkey,
    price: Option<u64>,
    pays_every_time: bool,
    new_authority: Pubkey,
) -> Result<()> {
    let (entangler, _) = find_entangler_address(&mint_a, &mint_b);
    let tx = program
        .request()
        .accounts(accounts::UpdateEntangler {
            authority,
            new_authority,
            entangler,
        })
        .args(instruction::UpdateEntangler {
            price,
            pays_every_time,
        })
        .send()
        .context("sending update_entangler")?;
    println!("Your transaction signature {tx}");
    Ok(())
}
