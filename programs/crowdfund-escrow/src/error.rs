use anchor_lang::prelude::*;

#[error_code]
pub enum EscrowError {
    #[msg("A live campaign already exists for this creator")]
    AlreadyInitialized,
    #[msg("Goal amount must be greater than zero")]
    InvalidGoal,
    #[msg("Contribution amount must be greater than zero")]
    InvalidContributionAmount,
    #[msg("Cumulative contribution would exceed the per-contributor cap")]
    ContributionCapExceeded,
    #[msg("Campaign deadline has passed")]
    DeadlinePassed,
    #[msg("Token mint does not match the campaign asset")]
    AssetMismatch,
    #[msg("Campaign has been finalized; contributions and refunds are closed")]
    CampaignFinalized,
    #[msg("Campaign was already finalized")]
    AlreadyFinalized,
    #[msg("Vault balance has not reached the goal amount")]
    GoalNotMet,
    #[msg("No contribution recorded for this wallet")]
    NoContribution,
    #[msg("Only the campaign creator may perform this action")]
    Unauthorized,
    #[msg("Contributions are still escrowed in the vault")]
    OutstandingContributions,
    #[msg("Campaign cannot close in the same second it opened")]
    CloseTooSoon,
    #[msg("Arithmetic overflow")]
    Overflow,
}
