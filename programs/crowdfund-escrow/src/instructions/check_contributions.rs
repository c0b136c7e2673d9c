use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::error::EscrowError;
use crate::events::CampaignFinalized;
use crate::state::Campaign;

#[derive(Accounts)]
pub struct CheckContributions<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        has_one = creator @ EscrowError::Unauthorized,
        has_one = mint @ EscrowError::AssetMismatch,
        constraint = !campaign.finalized @ EscrowError::AlreadyFinalized,
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

    /// Creator's receiving account, created on the fly if missing
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

/// The single decision point of the campaign: either the goal is met and the
/// whole vault moves to the creator, or nothing happens at all.
pub fn handler(ctx: Context<CheckContributions>) -> Result<()> {
    let campaign = &ctx.accounts.campaign;
    let balance = ctx.accounts.vault.amount;

    require!(campaign.goal_reached(balance), EscrowError::GoalNotMet);

    let creator = campaign.creator;
    let bump = campaign.bump;
    let seeds = &[Campaign::SEED_PREFIX, creator.as_ref(), &[bump]];
    let signer_seeds = &[&seeds[..]];

    // Everything in the vault, including any amount past the goal
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
    token::transfer(cpi_ctx, balance)?;

    let campaign = &mut ctx.accounts.campaign;
    campaign.finalized = true;

    emit!(CampaignFinalized {
        campaign: campaign.key(),
        creator,
        amount_released: balance,
    });

    Ok(())
}
