use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, CloseAccount, Mint, Token, TokenAccount, Transfer};

use crate::error::EscrowError;
use crate::events::CampaignClosed;
use crate::state::Campaign;

#[derive(Accounts)]
pub struct CloseCampaign<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        close = creator,
        has_one = creator @ EscrowError::Unauthorized,
        has_one = mint @ EscrowError::AssetMismatch,
        seeds = [Campaign::SEED_PREFIX, campaign.creator.as_ref()],
        bump = campaign.bump,
    )]
    pub campaign: Account<'info, Campaign>,

    #[account(
        mut,
        associated_token::mint = mint,
        associated_token::authority = campaign,
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Receives any residual vault balance, created on the fly if missing
    #[account(
        init_if_needed,
        payer = creator,
        associated_token::mint = mint,
        associated_token::authority = creator,
    )]
    pub creator_ata: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}

/// Tears down a settled campaign and reclaims its rent. Every stake must be
/// settled first: a finalized campaign qualifies immediately, an abandoned
/// one once every contributor has taken their refund. Anything still sitting
/// in the vault at that point arrived outside `contribute` and is swept to
/// the creator, so stray deposits can never wedge the teardown. Closing is
/// refused in the very second the campaign opened, which keeps the stamps of
/// successive campaigns at this address strictly increasing.
pub fn handler(ctx: Context<CloseCampaign>) -> Result<()> {
    let clock = Clock::get()?;
    let campaign = &ctx.accounts.campaign;

    require!(
        clock.unix_timestamp > campaign.started_at,
        EscrowError::CloseTooSoon
    );
    require!(
        campaign.claims_settled(),
        EscrowError::OutstandingContributions
    );

    let creator = campaign.creator;
    let bump = campaign.bump;
    let seeds = &[Campaign::SEED_PREFIX, creator.as_ref(), &[bump]];
    let signer_seeds = &[&seeds[..]];

    let residual = ctx.accounts.vault.amount;
    if residual > 0 {
        let cpi_accounts = Transfer {
            from: ctx.accounts.vault.to_account_info(),
            to: ctx.accounts.creator_ata.to_account_info(),
            authority: ctx.accounts.campaign.to_account_info(),
        };
        let cpi_ctx = CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            cpi_accounts,
            signer_seeds,
        );
        token::transfer(cpi_ctx, residual)?;
    }

    let cpi_accounts = CloseAccount {
        account: ctx.accounts.vault.to_account_info(),
        destination: ctx.accounts.creator.to_account_info(),
        authority: ctx.accounts.campaign.to_account_info(),
    };
    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        cpi_accounts,
        signer_seeds,
    );
    token::close_account(cpi_ctx)?;

    emit!(CampaignClosed {
        campaign: ctx.accounts.campaign.key(),
        creator: ctx.accounts.creator.key(),
        residual,
    });

    Ok(())
}
