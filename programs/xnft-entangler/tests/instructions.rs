use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hash;
use anchor_lang::solana_program::instruction::AccountMeta;
use anchor_lang::{InstructionData, ToAccountMetas};
use xnft_entangler::utils::{find_entangler_address, find_escrow_address, Side};
use xnft_entangler::{accounts, instruction};

// These tests pin the wire format clients rely on: instruction discriminators,
// borsh argument layout, and the order and flags of each instruction's accounts.

fn sighash(name: &str) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash(format!("global:{name}").as_bytes()).to_bytes()[..8]);
    out
}

fn flags(metas: &[AccountMeta]) -> Vec<(bool, bool)> {
    metas.iter().map(|m| (m.is_signer, m.is_writable)).collect()
}

#[test]
fn initialize_is_bare_discriminator() {
    let data = instruction::Initialize.data();
    assert_eq!(data, sighash("initialize").to_vec());
    assert!(accounts::Initialize {}.to_account_metas(None).is_empty());
}

#[test]
fn create_entangler_args_follow_discriminator() {
    let data = instruction::CreateEntangler {
        price: Some(5),
        pays_every_time: true,
    }
    .data();
    assert_eq!(&data[..8], &sighash("create_entangler"));
    assert_eq!(&data[8..], &[1, 5, 0, 0, 0, 0, 0, 0, 0, 1]);

    let free = instruction::CreateEntangler {
        price: None,
        pays_every_time: false,
    }
    .data();
    assert_eq!(&free[8..], &[0, 0]);
}

#[test]
fn update_entangler_accounts() {
    let data = instruction::UpdateEntangler {
        price: Some(1),
        pays_every_time: false,
    }
    .data();
    assert_eq!(&data[..8], &sighash("update_entangler"));

    let authority = Pubkey::new_unique();
    let new_authority = Pubkey::new_unique();
    let (entangler, _) = find_entangler_address(&Pubkey::new_unique(), &Pubkey::new_unique());
    let metas = accounts::UpdateEntangler {
        authority,
        new_authority,
        entangler,
    }
    .to_account_metas(None);

    assert_eq!(
        metas.iter().map(|m| m.pubkey).collect::<Vec<_>>(),
        vec![authority, new_authority, entangler]
    );
    assert_eq!(flags(&metas), vec![(true, false), (false, false), (false, true)]);
}

#[test]
fn create_entangler_accounts() {
    let mint_a = Pubkey::new_unique();
    let mint_b = Pubkey::new_unique();
    let (entangler, _) = find_entangler_address(&mint_a, &mint_b);
    let (reverse_entangler, _) = find_entangler_address(&mint_b, &mint_a);
    let (escrow_a, _) = find_escrow_address(&mint_a, &mint_b, Side::A);
    let (escrow_b, _) = find_escrow_address(&mint_a, &mint_b, Side::B);

    let metas = accounts::CreateEntangler {
        payer: Pubkey::new_unique(),
        transfer_authority: Pubkey::new_unique(),
        authority: Pubkey::new_unique(),
        treasury_mint: Pubkey::new_unique(),
        mint_a,
        metadata_a: Pubkey::new_unique(),
        master_edition_a: Pubkey::new_unique(),
        mint_b,
        metadata_b: Pubkey::new_unique(),
        master_edition_b: Pubkey::new_unique(),
        token_b: Pubkey::new_unique(),
        entangler,
        reverse_entangler,
        escrow_a,
        escrow_b,
        token_program: anchor_spl::token::ID,
        system_program: anchor_lang::system_program::ID,
        rent: anchor_lang::solana_program::sysvar::rent::ID,
    }
    .to_account_metas(None);

    assert_eq!(metas.len(), 18);
    assert!(metas[0].is_signer && metas[0].is_writable);
    assert!(metas[1].is_signer && !metas[1].is_writable);
    // token_b, entangler, escrows are written; reverse entangler is only read
    assert!(metas[10].is_writable);
    assert!(metas[11].is_writable && metas[11].pubkey == entangler);
    assert!(!metas[12].is_writable && metas[12].pubkey == reverse_entangler);
    assert!(metas[13].is_writable && metas[14].is_writable);
}

#[test]
fn swap_xnft_accounts() {
    assert_eq!(instruction::SwapXnft.data(), sighash("swap_xnft").to_vec());

    let mint_a = Pubkey::new_unique();
    let mint_b = Pubkey::new_unique();
    let (entangler, _) = find_entangler_address(&mint_a, &mint_b);
    let (escrow_a, _) = find_escrow_address(&mint_a, &mint_b, Side::A);
    let (escrow_b, _) = find_escrow_address(&mint_a, &mint_b, Side::B);

    let metas = accounts::SwapXnft {
        payer: Pubkey::new_unique(),
        treasury_mint: Pubkey::new_unique(),
        payment_account: Pubkey::new_unique(),
        payment_transfer_authority: Pubkey::new_unique(),
        authority_treasury: Pubkey::new_unique(),
        token: Pubkey::new_unique(),
        token_mint: mint_a,
        replacement_token_metadata: Pubkey::new_unique(),
        replacement_token_mint: mint_b,
        replacement_token: Pubkey::new_unique(),
        transfer_authority: Pubkey::new_unique(),
        entangler,
        escrow_a,
        escrow_b,
        token_program: anchor_spl::token::ID,
        associated_token_program: anchor_spl::associated_token::ID,
        system_program: anchor_lang::system_program::ID,
        rent: anchor_lang::solana_program::sysvar::rent::ID,
    }
    .to_account_metas(None);

    assert_eq!(
        flags(&metas),
        vec![
            (true, true),   // payer
            (false, false), // treasury_mint
            (false, true),  // payment_account
            (true, false),  // payment_transfer_authority
            (false, true),  // authority_treasury
            (false, true),  // token
            (false, false), // token_mint
            (false, false), // replacement_token_metadata
            (false, false), // replacement_token_mint
            (false, true),  // replacement_token
            (true, false),  // transfer_authority
            (false, true),  // entangler
            (false, true),  // escrow_a
            (false, true),  // escrow_b
            (false, false),
            (false, false),
            (false, false),
            (false, false),
        ]
    );
}
