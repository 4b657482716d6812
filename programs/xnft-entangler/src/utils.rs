use anchor_lang::{
    prelude::*,
    system_program::{self, Transfer as SystemTransfer},
};
use anchor_spl::{
    associated_token::get_associated_token_address,
    metadata,
    token::{self, spl_token, Transfer},
};

use crate::EntanglerError;

pub const PREFIX: &[u8] = b"xnft-entangler";
pub const ESCROW: &[u8] = b"escrow";
pub const METADATA: &[u8] = b"metadata";
pub const EDITION: &[u8] = b"edition";

/// One half of an entangled pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn seed(self) -> &'static [u8] {
        match self {
            Side::A => b"A",
            Side::B => b"B",
        }
    }

    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/* ---------------------- ADDRESSES ---------------------- */

pub fn find_entangler_address(mint_a: &Pubkey, mint_b: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[PREFIX, mint_a.as_ref(), mint_b.as_ref()], &crate::ID)
}

pub fn find_escrow_address(mint_a: &Pubkey, mint_b: &Pubkey, side: Side) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[PREFIX, mint_a.as_ref(), mint_b.as_ref(), ESCROW, side.seed()],
        &crate::ID,
    )
}

/// Metaplex metadata PDA of `mint`.
pub fn find_metadata_address(mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[METADATA, metadata::ID.as_ref(), mint.as_ref()],
        &metadata::ID,
    )
}

/// Metaplex (master) edition PDA of `mint`.
pub fn find_edition_address(mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[METADATA, metadata::ID.as_ref(), mint.as_ref(), EDITION],
        &metadata::ID,
    )
}

/// Account that receives swap fees: the authority itself for SOL, its ATA otherwise.
pub fn treasury_address(authority: &Pubkey, treasury_mint: &Pubkey) -> Pubkey {
    if is_native_mint(treasury_mint) {
        *authority
    } else {
        get_associated_token_address(authority, treasury_mint)
    }
}

pub fn is_native_mint(mint: &Pubkey) -> bool {
    *mint == spl_token::native_mint::ID
}

/* ---------------------- RULES ---------------------- */

/// A mint qualifies when its supply is one raw unit or one whole token.
pub fn is_single_unit_supply(supply: u64, decimals: u8) -> bool {
    supply == 1 || 10u64.checked_pow(decimals.into()) == Some(supply)
}

/// Price owed by the next swap, if any.
pub fn fee_due(price: Option<u64>, paid: bool, pays_every_time: bool) -> Option<u64> {
    match price {
        Some(price) if price > 0 && (!paid || pays_every_time) => Some(price),
        _ => None,
    }
}

/* ---------------------- ASSERTIONS ---------------------- */

pub fn assert_derivation(program_id: &Pubkey, account: &AccountInfo, seeds: &[&[u8]]) -> Result<()> {
    let (key, _) = Pubkey::find_program_address(seeds, program_id);
    require_keys_eq!(key, *account.key, EntanglerError::DerivedKeyInvalid);
    Ok(())
}

pub fn assert_owned_by(account: &AccountInfo, owner: &Pubkey) -> Result<()> {
    require_keys_eq!(*account.owner, *owner, EntanglerError::IncorrectOwner);
    Ok(())
}

/// Checks that `metadata` (and `edition`, when given) are the live Metaplex accounts of `mint`.
/// Callers pass only editions that hold data, see [`edition_option`].
pub fn assert_metadata_valid(
    metadata: &AccountInfo,
    edition: Option<&AccountInfo>,
    mint: &Pubkey,
) -> Result<()> {
    assert_derivation(
        &metadata::ID,
        metadata,
        &[METADATA, metadata::ID.as_ref(), mint.as_ref()],
    )?;
    require!(!metadata.data_is_empty(), EntanglerError::MetadataDoesntExist);
    assert_owned_by(metadata, &metadata::ID)?;

    if let Some(edition) = edition {
        assert_derivation(
            &metadata::ID,
            edition,
            &[METADATA, metadata::ID.as_ref(), mint.as_ref(), EDITION],
        )?;
        assert_owned_by(edition, &metadata::ID)?;
    }
    Ok(())
}

/// Editions are optional: an empty account means the mint has none.
pub fn edition_option<'a, 'info>(edition: &'a AccountInfo<'info>) -> Option<&'a AccountInfo<'info>> {
    (edition.data_len() > 0).then_some(edition)
}

/* ---------------------- CPI ---------------------- */

/// Moves `amount` of the treasury mint from the swapper to the pair's treasury.
/// For SOL `payment_account` is the paying wallet and must sign the transaction.
pub fn pay_treasury<'info>(
    amount: u64,
    native: bool,
    payment_account: &AccountInfo<'info>,
    payment_transfer_authority: &AccountInfo<'info>,
    authority_treasury: &AccountInfo<'info>,
    token_program: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
) -> Result<()> {
    if native {
        let cpi_accounts = SystemTransfer {
            from: payment_account.clone(),
            to: authority_treasury.clone(),
        };
        let cpi_ctx = CpiContext::new(system_program.clone(), cpi_accounts);
        system_program::transfer(cpi_ctx, amount)
    } else {
        let cpi_accounts = Transfer {
            from: payment_account.clone(),
            to: authority_treasury.clone(),
            authority: payment_transfer_authority.clone(),
        };
        let cpi_ctx = CpiContext::new(token_program.clone(), cpi_accounts);
        token::transfer(cpi_ctx, amount)
    }
}
