pub mod error;
pub mod events;
pub mod instructions;
pub mod state;

use anchor_lang::prelude::*;
use instructions::*;

declare_id!("CrowdZ9fMPeGKBa8tmXHW3nV5dQq27RuyE4cJsL6bTkD");

/// Crowdfund Escrow Program
///
/// All-or-nothing crowdfunding backed by an SPL token vault:
/// - Creators open a campaign with a fixed goal and optional deadline
/// - Contributors deposit tokens into the campaign vault, each capped at
///   10% of the goal so no single backer can carry a campaign alone
/// - Once the vault reaches the goal, the creator finalizes and receives
///   the full balance in one transfer
/// - Until then, any contributor can walk away with a full refund
///
/// # Security Considerations
///
/// The vault is an associated token account owned by the campaign PDA, so
/// deposits can only leave through `check_contributions` (to the recorded
/// creator, goal met) or `refund` (to the recorded contributor). Every
/// instruction pins the campaign to its seeds and the vault to the
/// campaign's mint, preventing substitute-account attacks.
///
/// Campaign addresses are reused across close/reopen, so contributor records
/// carry a generation stamp: a stake recorded under a predecessor campaign
/// counts for nothing against a successor at the same address. See
/// `state.rs` (`Contributor::live_amount`) and `close_campaign.rs` for the
/// stamp discipline.
#[program]
pub mod crowdfund_escrow {
    use super::*;

    /// Open a campaign with a fixed funding goal and optional duration.
    pub fn initialize(ctx: Context<Initialize>, goal_amount: u64, duration_days: u16) -> Result<()> {
        initialize::handler(ctx, goal_amount, duration_days)
    }

    /// Deposit tokens toward the goal, capped per contributor at 10% of it.
    pub fn contribute(ctx: Context<Contribute>, amount: u64) -> Result<()> {
        contribute::handler(ctx, amount)
    }

    /// Release the full vault to the creator once the goal is met.
    pub fn check_contributions(ctx: Context<CheckContributions>) -> Result<()> {
        check_contributions::handler(ctx)
    }

    /// Return a contributor's entire stake before finalization.
    pub fn refund(ctx: Context<Refund>) -> Result<()> {
        refund::handler(ctx)
    }

    /// Reclaim rent from a campaign once every stake has been settled.
    pub fn close_campaign(ctx: Context<CloseCampaign>) -> Result<()> {
        close_campaign::handler(ctx)
    }
}
