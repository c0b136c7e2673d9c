use anchor_lang::prelude::*;

#[event]
pub struct CampaignCreated {
    pub campaign: Pubkey,
    pub creator: Pubkey,
    pub mint: Pubkey,
    pub goal_amount: u64,
    pub duration_days: u16,
}

#[event]
pub struct ContributionReceived {
    pub campaign: Pubkey,
    pub contributor: Pubkey,
    pub amount: u64,
    pub total_contributed: u64,
    pub raised_amount: u64,
}

#[event]
pub struct CampaignFinalized {
    pub campaign: Pubkey,
    pub creator: Pubkey,
    pub amount_released: u64,
}

#[event]
pub struct ContributionRefunded {
    pub campaign: Pubkey,
    pub contributor: Pubkey,
    pub amount: u64,
    pub raised_amount: u64,
}

#[event]
pub struct CampaignClosed {
    pub campaign: Pubkey,
    pub creator: Pubkey,
    pub residual: u64,
}
