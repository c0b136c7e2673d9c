use anchor_lang::prelude::*;
use anchor_spl::associated_token::AssociatedToken;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::error::EscrowError;
use crate::events::CampaignCreated;
use crate::state::Campaign;

#[derive(Accounts)]
pub struct Initialize<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    /// Mint the campaign raises in; every later contribution must match it
    pub mint: Account<'info, Mint>,

    /// init_if_needed so hitting an occupied address surfaces as the typed
    /// AlreadyInitialized error below instead of a system-program failure
    #[account(
        init_if_needed,
        payer = creator,
        space = 8 + Campaign::INIT_SPACE,
        seeds = [Campaign::SEED_PREFIX, creator.key().as_ref()],
        bump,
    )]
    pub campaign: Account<'info, Campaign>,

    /// Custody vault: the campaign PDA's associated token account. No wallet
    /// key can sign transfers out of it.
    #[account(
        init_if_needed,
        payer = creator,
        associated_token::mint = mint,
        associated_token::authority = campaign,
    )]
    pub vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub associated_token_program: Program<'info, AssociatedToken>,
}

pub fn handler(ctx: Context<Initialize>, goal_amount: u64, duration_days: u16) -> Result<()> {
    // A live campaign always carries a positive goal; a freshly created
    // account is zeroed.
    require!(
        ctx.accounts.campaign.goal_amount == 0,
        EscrowError::AlreadyInitialized
    );
    require!(goal_amount > 0, EscrowError::InvalidGoal);

    let clock = Clock::get()?;

    let campaign = &mut ctx.accounts.campaign;
    campaign.creator = ctx.accounts.creator.key();
    campaign.mint = ctx.accounts.mint.key();
    campaign.goal_amount = goal_amount;
    campaign.raised_amount = 0;
    campaign.started_at = clock.unix_timestamp;
    campaign.duration_days = duration_days;
    campaign.finalized = false;
    campaign.bump = ctx.bumps.campaign;

    emit!(CampaignCreated {
        campaign: campaign.key(),
        creator: campaign.creator,
        mint: campaign.mint,
        goal_amount,
        duration_days,
    });

    Ok(())
}
