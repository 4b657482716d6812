use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token::{self, Mint, Token, TokenAccount, Transfer},
};

pub mod utils;
use utils::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

#[program]
pub mod xnft_entangler {
    use super::*;

    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        msg!("xnft-entangler initialized: program={}", ctx.program_id);
        Ok(())
    }

    /// Entangles mint A with mint B.
    /// - B's whole supply moves from the payer's ATA into escrow B; escrow A starts empty.
    /// - Fails if the reverse pair (B, A) already exists.
    /// - Parameters:
    ///    - price: amount of treasury_mint charged on swap (None or 0 = free)
    ///    - pays_every_time: charge on every swap instead of only the first
    pub fn create_entangler<'info>(
        ctx: Context<'_, '_, '_, 'info, CreateEntangler<'info>>,
        price: Option<u64>,
        pays_every_time: bool,
    ) -> Result<()> {
        require!(
            ctx.accounts.reverse_entangler.data_is_empty(),
            EntanglerError::EntangledPairExists
        );

        let mint_a = &ctx.accounts.mint_a;
        let mint_b = &ctx.accounts.mint_b;
        require!(
            is_single_unit_supply(mint_a.supply, mint_a.decimals),
            EntanglerError::MustHaveSupplyOne
        );
        require!(
            is_single_unit_supply(mint_b.supply, mint_b.decimals),
            EntanglerError::MustHaveSupplyOne
        );

        let master_edition_a = ctx.accounts.master_edition_a.to_account_info();
        let master_edition_b = ctx.accounts.master_edition_b.to_account_info();
        assert_metadata_valid(
            &ctx.accounts.metadata_a,
            edition_option(&master_edition_a),
            &mint_a.key(),
        )?;
        assert_metadata_valid(
            &ctx.accounts.metadata_b,
            edition_option(&master_edition_b),
            &mint_b.key(),
        )?;

        let supply_b = mint_b.supply;
        require!(
            ctx.accounts.token_b.amount == supply_b,
            EntanglerError::InvalidTokenAmount
        );

        let entangler = &mut ctx.accounts.entangler;
        entangler.authority = ctx.accounts.authority.key();
        entangler.treasury_mint = ctx.accounts.treasury_mint.key();
        entangler.mint_a = mint_a.key();
        entangler.mint_b = mint_b.key();
        entangler.escrow_a = ctx.accounts.escrow_a.key();
        entangler.escrow_b = ctx.accounts.escrow_b.key();
        entangler.bump = ctx.bumps.entangler;
        entangler.escrow_a_bump = ctx.bumps.escrow_a;
        entangler.escrow_b_bump = ctx.bumps.escrow_b;
        entangler.price = price;
        entangler.paid = false;
        entangler.pays_every_time = pays_every_time;

        // Deposit B so the first holder of A has something to swap for
        let cpi_accounts = Transfer {
            from: ctx.accounts.token_b.to_account_info(),
            to: ctx.accounts.escrow_b.to_account_info(),
            authority: ctx.accounts.transfer_authority.to_account_info(),
        };
        let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
        token::transfer(cpi_ctx, supply_b)?;

        msg!(
            "create_entangler: a={} b={} authority={} price={:?} pays_every_time={}",
            entangler.mint_a,
            entangler.mint_b,
            entangler.authority,
            price,
            pays_every_time
        );
        Ok(())
    }

    /// Hands the pair to `new_authority` and replaces its pricing. `paid` is left as is.
    pub fn update_entangler(
        ctx: Context<UpdateEntangler>,
        price: Option<u64>,
        pays_every_time: bool,
    ) -> Result<()> {
        let entangler = &mut ctx.accounts.entangler;
        entangler.authority = ctx.accounts.new_authority.key();
        entangler.price = price;
        entangler.pays_every_time = pays_every_time;

        msg!(
            "update_entangler: authority={} price={:?} pays_every_time={}",
            entangler.authority,
            price,
            pays_every_time
        );
        Ok(())
    }

    /// Swaps the caller's whole holding of one side for the other side held in escrow.
    pub fn swap_xnft<'info>(ctx: Context<'_, '_, '_, 'info, SwapXnft<'info>>) -> Result<()> {
        let user_token = &ctx.accounts.token;
        let token_mint = &ctx.accounts.token_mint;
        let replacement_token_mint = &ctx.accounts.replacement_token_mint;
        let entangler = &ctx.accounts.entangler;

        require!(
            user_token.amount == token_mint.supply,
            EntanglerError::InvalidTokenAmount
        );

        let side = entangler.side_of(&token_mint.key())?;
        require_keys_eq!(
            replacement_token_mint.key(),
            entangler.mint(side.other()),
            EntanglerError::InvalidMint
        );
        assert_metadata_valid(
            &ctx.accounts.replacement_token_metadata,
            None,
            &replacement_token_mint.key(),
        )?;

        let (deposit_escrow, release_escrow) = match side {
            Side::A => (&ctx.accounts.escrow_a, &ctx.accounts.escrow_b),
            Side::B => (&ctx.accounts.escrow_b, &ctx.accounts.escrow_a),
        };
        msg!(
            "swap_xnft: side={:?} deposit={} release={}",
            side,
            deposit_escrow.key(),
            release_escrow.key()
        );

        let fee = fee_due(entangler.price, entangler.paid, entangler.pays_every_time);
        if let Some(amount) = fee {
            let treasury_mint = ctx.accounts.treasury_mint.key();
            let native = is_native_mint(&treasury_mint);
            if native {
                require_keys_eq!(
                    ctx.accounts.payment_account.key(),
                    ctx.accounts.payer.key(),
                    EntanglerError::PublicKeyMismatch
                );
            }
            require_keys_eq!(
                ctx.accounts.authority_treasury.key(),
                treasury_address(&entangler.authority, &treasury_mint),
                EntanglerError::PublicKeyMismatch
            );

            pay_treasury(
                amount,
                native,
                &ctx.accounts.payment_account.to_account_info(),
                &ctx.accounts.payment_transfer_authority.to_account_info(),
                &ctx.accounts.authority_treasury.to_account_info(),
                &ctx.accounts.token_program.to_account_info(),
                &ctx.accounts.system_program.to_account_info(),
            )?;
            msg!("swap_xnft: paid {} of {} to {}", amount, treasury_mint, entangler.authority);
        }

        // Caller's token into its side's escrow
        let cpi_accounts = Transfer {
            from: user_token.to_account_info(),
            to: deposit_escrow.to_account_info(),
            authority: ctx.accounts.transfer_authority.to_account_info(),
        };
        let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
        token::transfer(cpi_ctx, token_mint.supply)?;

        // Counterpart out of escrow, signed by the entangler PDA
        let mint_a = entangler.mint_a;
        let mint_b = entangler.mint_b;
        let bump = [entangler.bump];
        let seeds: &[&[u8]] = &[PREFIX, mint_a.as_ref(), mint_b.as_ref(), &bump];
        let signer = &[seeds];

        let cpi_accounts = Transfer {
            from: release_escrow.to_account_info(),
            to: ctx.accounts.replacement_token.to_account_info(),
            authority: entangler.to_account_info(),
        };
        let cpi_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            cpi_accounts,
            signer,
        );
        token::transfer(cpi_ctx, replacement_token_mint.supply)?;

        if fee.is_some() {
            ctx.accounts.entangler.paid = true;
        }
        Ok(())
    }
}

/* ---------------------- ACCOUNTS ---------------------- */

#[derive(Accounts)]
pub struct Initialize {}

#[derive(Accounts)]
pub struct CreateEntangler<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    /// Owner or delegate of token_b
    pub transfer_authority: Signer<'info>,

    /// CHECK: any key may be made authority of the pair
    pub authority: UncheckedAccount<'info>,

    pub treasury_mint: Box<Account<'info, Mint>>,

    pub mint_a: Box<Account<'info, Mint>>,

    /// CHECK: derivation, owner and data checked in handler
    pub metadata_a: UncheckedAccount<'info>,

    /// CHECK: may be empty; checked in handler when it holds data
    pub master_edition_a: UncheckedAccount<'info>,

    #[account(constraint = mint_b.key() != mint_a.key() @ EntanglerError::PublicKeysShouldBeUnique)]
    pub mint_b: Box<Account<'info, Mint>>,

    /// CHECK: derivation, owner and data checked in handler
    pub metadata_b: UncheckedAccount<'info>,

    /// CHECK: may be empty; checked in handler when it holds data
    pub master_edition_b: UncheckedAccount<'info>,

    /// Payer's ATA holding the whole supply of mint_b
    #[account(
        mut,
        associated_token::mint = mint_b,
        associated_token::authority = payer
    )]
    pub token_b: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = payer,
        space = 8 + XnftEntangler::LEN,
        seeds = [PREFIX, mint_a.key().as_ref(), mint_b.key().as_ref()],
        bump
    )]
    pub entangler: Box<Account<'info, XnftEntangler>>,

    /// Same pair with the mints swapped; must not exist
    /// CHECK: PDA verified via seeds, emptiness checked in handler
    #[account(
        seeds = [PREFIX, mint_b.key().as_ref(), mint_a.key().as_ref()],
        bump
    )]
    pub reverse_entangler: UncheckedAccount<'info>,

    #[account(
        init,
        payer = payer,
        seeds = [PREFIX, mint_a.key().as_ref(), mint_b.key().as_ref(), ESCROW, b"A"],
        bump,
        token::mint = mint_a,
        token::authority = entangler
    )]
    pub escrow_a: Box<Account<'info, TokenAccount>>,

    #[account(
        init,
        payer = payer,
        seeds = [PREFIX, mint_a.key().as_ref(), mint_b.key().as_ref(), ESCROW, b"B"],
        bump,
        token::mint = mint_b,
        token::authority = entangler
    )]
    pub escrow_b: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

#[derive(Accounts)]
pub struct UpdateEntangler<'info> {
    pub authority: Signer<'info>,

    /// CHECK: the current authority may pick anyone
    pub new_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [PREFIX, entangler.mint_a.as_ref(), entangler.mint_b.as_ref()],
        bump = entangler.bump,
        has_one = authority @ EntanglerError::InvalidAuthority
    )]
    pub entangler: Account<'info, XnftEntangler>,
}

#[derive(Accounts)]
pub struct SwapXnft<'info> {
    #[account(mut)]
    pub payer: Signer<'info>,

    pub treasury_mint: Box<Account<'info, Mint>>,

    /// Payer wallet for SOL pricing, a treasury_mint token account otherwise
    /// CHECK: verified in handler (SOL) or by the token program (SPL)
    #[account(mut)]
    pub payment_account: UncheckedAccount<'info>,

    pub payment_transfer_authority: Signer<'info>,

    /// CHECK: compared against the pair authority's treasury in handler
    #[account(mut)]
    pub authority_treasury: UncheckedAccount<'info>,

    #[account(mut, constraint = token.mint == token_mint.key() @ EntanglerError::InvalidMint)]
    pub token: Box<Account<'info, TokenAccount>>,

    pub token_mint: Box<Account<'info, Mint>>,

    /// CHECK: derivation, owner and data checked in handler
    pub replacement_token_metadata: UncheckedAccount<'info>,

    pub replacement_token_mint: Box<Account<'info, Mint>>,

    /// Payer's ATA for the counterpart (auto-create if missing)
    #[account(
        init_if_needed,
        payer = payer,
        associated_token::mint = replacement_token_mint,
        associated_token::authority = payer
    )]
    pub replacement_token: Box<Account<'info, TokenAccount>>,

    pub transfer_authority: Signer<'info>,

    #[account(
        mut,
        seeds = [PREFIX, entangler.mint_a.as_ref(), entangler.mint_b.as_ref()],
        bump = entangler.bump,
        has_one = treasury_mint
    )]
    pub entangler: Box<Account<'info, XnftEntangler>>,

    #[account(
        mut,
        seeds = [PREFIX, entangler.mint_a.as_ref(), entangler.mint_b.as_ref(), ESCROW, b"A"],
        bump = entangler.escrow_a_bump
    )]
    pub escrow_a: Box<Account<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [PREFIX, entangler.mint_a.as_ref(), entangler.mint_b.as_ref(), ESCROW, b"B"],
        bump = entangler.escrow_b_bump
    )]
    pub escrow_b: Box<Account<'info, TokenAccount>>,

    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
    pub system_program: Program<'info, System>,
    pub rent: Sysvar<'info, Rent>,
}

/* ---------------------- STATE ---------------------- */

#[account]
#[derive(Debug)]
pub struct XnftEntangler {
    pub authority: Pubkey,
    pub treasury_mint: Pubkey, // native mint = priced in SOL
    pub mint_a: Pubkey,
    pub mint_b: Pubkey,
    pub escrow_a: Pubkey,
    pub escrow_b: Pubkey,
    pub bump: u8,
    pub escrow_a_bump: u8,
    pub escrow_b_bump: u8,
    pub price: Option<u64>,
    pub paid: bool, // first payment made
    pub pays_every_time: bool,
}

impl XnftEntangler {
    // size calc
    pub const LEN: usize =
        32 + // authority
        32 + // treasury_mint
        32 + // mint_a
        32 + // mint_b
        32 + // escrow_a
        32 + // escrow_b
        1  + // bump
        1  + // escrow_a_bump
        1  + // escrow_b_bump
        (1 + 8) + // price
        1  + // paid
        1;   // pays_every_time

    pub fn mint(&self, side: Side) -> Pubkey {
        match side {
            Side::A => self.mint_a,
            Side::B => self.mint_b,
        }
    }

    pub fn side_of(&self, mint: &Pubkey) -> Result<Side> {
        if *mint == self.mint_a {
            Ok(Side::A)
        } else if *mint == self.mint_b {
            Ok(Side::B)
        } else {
            err!(EntanglerError::InvalidMint)
        }
    }
}

/* ---------------------- ERRORS ---------------------- */

#[error_code]
pub enum EntanglerError {
    #[msg("PublicKeyMismatch")]
    PublicKeyMismatch,
    #[msg("IncorrectOwner")]
    IncorrectOwner,
    #[msg("PublicKeysShouldBeUnique")]
    PublicKeysShouldBeUnique,
    #[msg("Derived key invalid")]
    DerivedKeyInvalid,
    #[msg("Metadata doesn't exist")]
    MetadataDoesntExist,
    #[msg("Invalid token amount")]
    InvalidTokenAmount,
    #[msg("This token is not a valid mint for this entangled pair")]
    InvalidMint,
    #[msg("This pair already exists as it's reverse")]
    EntangledPairExists,
    #[msg("Must have supply one!")]
    MustHaveSupplyOne,
    #[msg("Signer is not the entangler authority")]
    InvalidAuthority,
}
