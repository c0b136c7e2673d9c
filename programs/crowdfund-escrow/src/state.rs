use anchor_lang::prelude::*;

use crate::error::EscrowError;

/// Share of the goal any single contributor may supply, in basis points.
pub const MAX_CONTRIBUTION_BPS: u64 = 1_000;
pub const BPS_DENOMINATOR: u64 = 10_000;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// One fundraising campaign: a fixed goal in a single SPL mint, collected
/// into a vault only the campaign PDA can sign for.
#[account]
#[derive(InitSpace)]
pub struct Campaign {
    /// Wallet that opened the campaign; may finalize and receives the pool
    pub creator: Pubkey,
    /// SPL mint every contribution must match
    pub mint: Pubkey,
    /// Target amount, in base units of `mint`
    pub goal_amount: u64,
    /// Net contributions currently backing the vault; frozen at finalization
    pub raised_amount: u64,
    /// Unix timestamp when the campaign opened
    pub started_at: i64,
    /// Days the campaign accepts contributions; 0 = no deadline
    pub duration_days: u16,
    /// Set once, by a successful goal check
    pub finalized: bool,
    /// PDA bump seed
    pub bump: u8,
}

/// Cumulative stake of one wallet in one campaign. A refund closes it; a
/// record stranded by a finalized campaign stays on the ledger but carries no
/// claim on any later campaign reusing the same address.
#[account]
#[derive(InitSpace)]
pub struct Contributor {
    pub campaign: Pubkey,
    pub contributor: Pubkey,
    pub amount: u64,
    /// Copy of the campaign's `started_at` taken when the stake was recorded;
    /// a mismatch marks a record left behind by an earlier campaign
    pub started_at: i64,
    pub bump: u8,
}

/// Where a campaign sits in its lifecycle. Derived from stored state plus
/// the clock, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignPhase {
    /// Accepting contributions
    Open,
    /// Deadline elapsed without finalization; refunds remain available
    Expired,
    /// Goal was met and the vault paid out
    Finalized,
}

impl Campaign {
    pub const SEED_PREFIX: &'static [u8] = b"campaign";

    /// Largest cumulative stake a single contributor may hold, one tenth of
    /// the goal. Goals below ten base units floor to a cap of zero, which
    /// shuts the campaign to contributions entirely.
    pub fn contribution_cap(&self) -> u64 {
        let cap = (self.goal_amount as u128) * (MAX_CONTRIBUTION_BPS as u128)
            / (BPS_DENOMINATOR as u128);
        // cap <= goal_amount, so the narrowing cast cannot truncate
        cap as u64
    }

    /// Timestamp after which contributions close, if a deadline is set.
    pub fn deadline_ts(&self) -> Option<i64> {
        if self.duration_days == 0 {
            return None;
        }
        Some(self.started_at + self.duration_days as i64 * SECONDS_PER_DAY)
    }

    pub fn phase(&self, now: i64) -> CampaignPhase {
        if self.finalized {
            CampaignPhase::Finalized
        } else if self.deadline_ts().is_some_and(|end| now >= end) {
            CampaignPhase::Expired
        } else {
            CampaignPhase::Open
        }
    }

    /// Run a prospective contribution through the phase, amount, and cap
    /// rules; returns the contributor's new cumulative total.
    pub fn accept_contribution(&self, recorded: u64, amount: u64, now: i64) -> Result<u64> {
        match self.phase(now) {
            CampaignPhase::Finalized => return err!(EscrowError::CampaignFinalized),
            CampaignPhase::Expired => return err!(EscrowError::DeadlinePassed),
            CampaignPhase::Open => {}
        }
        require!(amount > 0, EscrowError::InvalidContributionAmount);

        let new_total = recorded
            .checked_add(amount)
            .ok_or(EscrowError::Overflow)?;
        require!(
            new_total <= self.contribution_cap(),
            EscrowError::ContributionCapExceeded
        );
        Ok(new_total)
    }

    pub fn goal_reached(&self, vault_balance: u64) -> bool {
        vault_balance >= self.goal_amount
    }

    /// Whether every outstanding stake has been settled, by payout or by
    /// refund. Tokens sent straight to the vault outside `contribute` are not
    /// stakes and never block closing.
    pub fn claims_settled(&self) -> bool {
        self.finalized || self.raised_amount == 0
    }
}

impl Contributor {
    pub const SEED_PREFIX: &'static [u8] = b"contributor";

    /// Amount this record may claim against the given campaign. Campaign
    /// addresses are reused across close/reopen, so a record stamped by an
    /// earlier occupant of the address counts for nothing.
    pub fn live_amount(&self, campaign: &Campaign) -> u64 {
        if self.started_at == campaign.started_at {
            self.amount
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn campaign(goal_amount: u64, duration_days: u16) -> Campaign {
        Campaign {
            creator: Pubkey::new_unique(),
            mint: Pubkey::new_unique(),
            goal_amount,
            raised_amount: 0,
            started_at: NOW,
            duration_days,
            finalized: false,
            bump: 254,
        }
    }

    fn record(amount: u64, started_at: i64) -> Contributor {
        Contributor {
            campaign: Pubkey::new_unique(),
            contributor: Pubkey::new_unique(),
            amount,
            started_at,
            bump: 255,
        }
    }

    #[test]
    fn cap_is_a_tenth_of_the_goal() {
        assert_eq!(campaign(30_000_000, 0).contribution_cap(), 3_000_000);
        assert_eq!(campaign(25, 0).contribution_cap(), 2);
        assert_eq!(campaign(u64::MAX, 0).contribution_cap(), u64::MAX / 10);
    }

    #[test]
    fn tiny_goals_floor_the_cap_to_zero() {
        let c = campaign(9, 0);
        assert_eq!(c.contribution_cap(), 0);
        assert_eq!(campaign(10, 0).contribution_cap(), 1);

        // no contribution can ever enter such a campaign
        assert_eq!(
            c.accept_contribution(0, 1, NOW),
            Err(EscrowError::ContributionCapExceeded.into())
        );
    }

    #[test]
    fn cap_rejects_the_crossing_contribution() {
        let c = campaign(30_000_000, 0);

        let first = c.accept_contribution(0, 1_000_000, NOW).unwrap();
        assert_eq!(first, 1_000_000);
        let second = c.accept_contribution(first, 1_000_000, NOW).unwrap();
        assert_eq!(second, 2_000_000);

        // 2M recorded + 2M more crosses the 3M cap and the whole call fails
        assert_eq!(
            c.accept_contribution(second, 2_000_000, NOW),
            Err(EscrowError::ContributionCapExceeded.into())
        );

        // landing exactly on the cap is still allowed
        assert_eq!(
            c.accept_contribution(second, 1_000_000, NOW).unwrap(),
            3_000_000
        );
    }

    #[test]
    fn zero_contributions_are_rejected() {
        let c = campaign(30_000_000, 0);
        assert_eq!(
            c.accept_contribution(0, 0, NOW),
            Err(EscrowError::InvalidContributionAmount.into())
        );
    }

    #[test]
    fn contribution_totals_cannot_overflow() {
        let c = campaign(u64::MAX, 0);
        assert_eq!(
            c.accept_contribution(u64::MAX - 1, 2, NOW),
            Err(EscrowError::Overflow.into())
        );
    }

    #[test]
    fn finalized_campaigns_take_no_contributions() {
        let mut c = campaign(30_000_000, 0);
        c.finalized = true;
        assert_eq!(
            c.accept_contribution(0, 1, NOW),
            Err(EscrowError::CampaignFinalized.into())
        );
    }

    #[test]
    fn deadline_closes_contributions() {
        let c = campaign(30_000_000, 7);
        let end = c.deadline_ts().unwrap();
        assert_eq!(end, NOW + 7 * SECONDS_PER_DAY);

        assert_eq!(c.accept_contribution(0, 1, end - 1).unwrap(), 1);
        assert_eq!(
            c.accept_contribution(0, 1, end),
            Err(EscrowError::DeadlinePassed.into())
        );
    }

    #[test]
    fn zero_duration_never_expires() {
        let c = campaign(30_000_000, 0);
        assert_eq!(c.deadline_ts(), None);
        assert_eq!(
            c.phase(NOW + 100 * 365 * SECONDS_PER_DAY),
            CampaignPhase::Open
        );
    }

    #[test]
    fn phase_follows_clock_and_flag() {
        let mut c = campaign(1_000, 3);
        assert_eq!(c.phase(NOW), CampaignPhase::Open);
        assert_eq!(c.phase(NOW + 3 * SECONDS_PER_DAY - 1), CampaignPhase::Open);
        assert_eq!(c.phase(NOW + 3 * SECONDS_PER_DAY), CampaignPhase::Expired);

        // finalization outranks expiry
        c.finalized = true;
        assert_eq!(c.phase(NOW + 3 * SECONDS_PER_DAY), CampaignPhase::Finalized);
    }

    #[test]
    fn goal_check_is_a_pure_threshold() {
        let c = campaign(30_000_000, 0);
        assert!(!c.goal_reached(0));
        assert!(!c.goal_reached(2_000_000));
        assert!(!c.goal_reached(29_999_999));
        assert!(c.goal_reached(30_000_000));
        assert!(c.goal_reached(30_000_001));
    }

    #[test]
    fn lifecycle_keeps_vault_and_records_in_step() {
        let c = campaign(30_000_000, 0);
        let mut vault: u64 = 0;
        let mut alice: u64 = 0;
        let mut bob: u64 = 0;

        for _ in 0..2 {
            alice = c.accept_contribution(alice, 1_000_000, NOW).unwrap();
            vault += 1_000_000;
        }
        bob = c.accept_contribution(bob, 2_500_000, NOW).unwrap();
        vault += 2_500_000;
        assert_eq!(alice + bob, vault);

        // a failed goal check moves nothing
        assert!(!c.goal_reached(vault));
        assert_eq!(alice + bob, vault);

        // refund returns exactly the recorded stake and removes the record
        vault -= alice;
        alice = 0;
        assert_eq!(alice + bob, vault);
        assert_eq!(vault, 2_500_000);
    }

    #[test]
    fn derived_addresses_are_per_identity() {
        let creator_a = Pubkey::new_unique();
        let creator_b = Pubkey::new_unique();
        let (campaign_a, _) = Pubkey::find_program_address(
            &[Campaign::SEED_PREFIX, creator_a.as_ref()],
            &crate::ID,
        );
        let (campaign_a_again, _) = Pubkey::find_program_address(
            &[Campaign::SEED_PREFIX, creator_a.as_ref()],
            &crate::ID,
        );
        let (campaign_b, _) = Pubkey::find_program_address(
            &[Campaign::SEED_PREFIX, creator_b.as_ref()],
            &crate::ID,
        );
        assert_eq!(campaign_a, campaign_a_again);
        assert_ne!(campaign_a, campaign_b);

        let wallet = Pubkey::new_unique();
        let (record_a, _) = Pubkey::find_program_address(
            &[
                Contributor::SEED_PREFIX,
                campaign_a.as_ref(),
                wallet.as_ref(),
            ],
            &crate::ID,
        );
        let (record_b, _) = Pubkey::find_program_address(
            &[
                Contributor::SEED_PREFIX,
                campaign_b.as_ref(),
                wallet.as_ref(),
            ],
            &crate::ID,
        );
        assert_ne!(record_a, record_b);
    }

    #[test]
    fn stale_records_carry_no_claim() {
        let c = campaign(30_000_000, 0);

        assert_eq!(record(1_000_000, c.started_at).live_amount(&c), 1_000_000);
        assert_eq!(record(1_000_000, c.started_at - 1).live_amount(&c), 0);
        assert_eq!(record(1_000_000, c.started_at + 1).live_amount(&c), 0);
    }

    #[test]
    fn reopened_campaigns_cannot_honor_old_stakes() {
        // one creator, so both campaign lives occupy the same derived address
        let creator = Pubkey::new_unique();
        let (first_addr, _) = Pubkey::find_program_address(
            &[Campaign::SEED_PREFIX, creator.as_ref()],
            &crate::ID,
        );
        let (second_addr, _) = Pubkey::find_program_address(
            &[Campaign::SEED_PREFIX, creator.as_ref()],
            &crate::ID,
        );
        assert_eq!(first_addr, second_addr);

        let mut first = campaign(30_000_000, 0);
        first.creator = creator;
        let stake = first.accept_contribution(0, 1_000_000, NOW).unwrap();
        let old_record = record(stake, first.started_at);

        // teardown is admitted only after the opening second has passed, so
        // a successor's stamp is always strictly newer than its predecessor's
        let mut second = campaign(30_000_000, 0);
        second.creator = creator;
        second.started_at = first.started_at + 1;

        // the stranded stake neither refunds nor seeds a new total
        assert_eq!(old_record.live_amount(&second), 0);
        assert_eq!(
            second.accept_contribution(
                old_record.live_amount(&second),
                500_000,
                second.started_at,
            ),
            Ok(500_000)
        );
    }

    #[test]
    fn close_gate_follows_claims_not_vault_balance() {
        let mut c = campaign(30_000_000, 0);

        // open with outstanding stakes: blocked
        c.raised_amount = 2_000_000;
        assert!(!c.claims_settled());

        // every stake refunded: closable, even if dust was sent straight to
        // the vault with a bare token transfer
        c.raised_amount = 0;
        assert!(c.claims_settled());

        // paid out: closable, stranded records notwithstanding
        c.raised_amount = 2_000_000;
        c.finalized = true;
        assert!(c.claims_settled());
    }
}
