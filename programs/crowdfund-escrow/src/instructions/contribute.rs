use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::error::EscrowError;
use crate::events::ContributionReceived;
use crate::state::{Campaign, Contributor};

#[derive(Accounts)]
pub struct Contribute<'info> {
    #[account(mut)]
    pub contributor: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        has_one = mint @ EscrowError::AssetMismatch,
        seeds = [Campaign::SEED_PREFIX, campaign.creator.as_ref()],
        bump = campaign.bump,
    )]
    pub campaign: Account<'info, Campaign>,

    /// Cumulative record for this (campaign, wallet) pair; created on the
    /// first contribution, accumulated into afterwards
    #[account(
        init_if_needed,
        payer = contributor,
        space = 8 + Contributor::INIT_SPACE,
        seeds = [
            Contributor::SEED_PREFIX,
            campaign.key().as_ref(),
            contributor.key().as_ref(),
        ],
        bump,
    )]
    pub contributor_account: Account<'info, Contributor>,

    #[account(
        mut,
        associated_token::mint = mint,
        associated_token::authority = contributor,
    )]
    pub contributor_ata: Account<'info, TokenAccount>,

    #[account(
        mut,
        associated_token::mint = mint,
        associated_token::authority = campaign,
    )]
    pub vault: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<Contribute>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;

    // a stake left behind by a previous campaign at this address restarts
    // from zero
    let recorded = ctx
        .accounts
        .contributor_account
        .live_amount(&ctx.accounts.campaign);
    let new_total =
        ctx.accounts
            .campaign
            .accept_contribution(recorded, amount, clock.unix_timestamp)?;

    // Deposit into the vault; the record updates below land in the same
    // transaction, so neither effect is ever observable without the other.
    let cpi_accounts = Transfer {
        from: ctx.accounts.contributor_ata.to_account_info(),
        to: ctx.accounts.vault.to_account_info(),
        authority: ctx.accounts.contributor.to_account_info(),
    };
    let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
    token::transfer(cpi_ctx, amount)?;

    let campaign_key = ctx.accounts.campaign.key();

    let campaign = &mut ctx.accounts.campaign;
    campaign.raised_amount = campaign
        .raised_amount
        .checked_add(amount)
        .ok_or(EscrowError::Overflow)?;

    let record = &mut ctx.accounts.contributor_account;
    record.campaign = campaign_key;
    record.contributor = ctx.accounts.contributor.key();
    record.amount = new_total;
    record.started_at = ctx.accounts.campaign.started_at;
    record.bump = ctx.bumps.contributor_account;

    emit!(ContributionReceived {
        campaign: campaign_key,
        contributor: record.contributor,
        amount,
        total_contributed: new_total,
        raised_amount: ctx.accounts.campaign.raised_amount,
    });

    Ok(())
}
