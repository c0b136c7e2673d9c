use anchor_lang::prelude::*;
use anchor_spl::token::{self, Mint, Token, TokenAccount, Transfer};

use crate::error::EscrowError;
use crate::events::ContributionRefunded;
use crate::state::{Campaign, Contributor};

#[derive(Accounts)]
pub struct Refund<'info> {
    #[account(mut)]
    pub contributor: Signer<'info>,

    pub mint: Account<'info, Mint>,

    #[account(
        mut,
        has_one = mint @ EscrowError::AssetMismatch,
        constraint = !campaign.finalized @ EscrowError::CampaignFinalized,
        seeds = [Campaign::SEED_PREFIX, campaign.creator.as_ref()],
        bump = campaign.bump,
    )]
    pub campaign: Account<'info, Campaign>,

    /// Closed on exit; a refunded stake never lingers at zero
    #[account(
        mut,
        close = contributor,
        seeds = [
            Contributor::SEED_PREFIX,
            campaign.key().as_ref(),
            contributor.key().as_ref(),
        ],
        bump = contributor_account.bump,
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

/// Returns the caller's entire recorded stake from the vault. Available any
/// time before finalization; a finalized campaign has already paid the vault
/// out, so there is nothing left to claim. A record stranded by an earlier
/// campaign at this address is not a stake here and cannot refund.
pub fn handler(ctx: Context<Refund>) -> Result<()> {
    let refund_amount = ctx
        .accounts
        .contributor_account
        .live_amount(&ctx.accounts.campaign);
    require!(refund_amount > 0, EscrowError::NoContribution);

    let creator = ctx.accounts.campaign.creator;
    let bump = ctx.accounts.campaign.bump;
    let seeds = &[Campaign::SEED_PREFIX, creator.as_ref(), &[bump]];
    let signer_seeds = &[&seeds[..]];

    let cpi_accounts = Transfer {
        from: ctx.accounts.vault.to_account_info(),
        to: ctx.accounts.contributor_ata.to_account_info(),
        authority: ctx.accounts.campaign.to_account_info(),
    };
    let cpi_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        cpi_accounts,
        signer_seeds,
    );
    token::transfer(cpi_ctx, refund_amount)?;

    let campaign = &mut ctx.accounts.campaign;
    campaign.raised_amount = campaign
        .raised_amount
        .checked_sub(refund_amount)
        .ok_or(EscrowError::Overflow)?;

    emit!(ContributionRefunded {
        campaign: campaign.key(),
        contributor: ctx.accounts.contributor.key(),
        amount: refund_amount,
        raised_amount: campaign.raised_amount,
    });

    Ok(())
}
