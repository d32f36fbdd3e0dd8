pub mod deal;
pub mod news;
pub mod player_deal;
pub mod player_earning;
pub mod profile;
pub mod referral;
pub mod sub_affiliate;

pub use player_deal::PlayerDealStatus;
pub use player_earning::PaymentStatus;
pub use profile::Role;
pub use referral::ReferralStatus;
