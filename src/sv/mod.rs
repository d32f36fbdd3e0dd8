pub mod deal;
pub mod earning;
pub mod geo;
pub mod news;
pub mod player_deal;
pub mod profile;
pub mod referral;
pub mod session;
#[cfg(test)]
pub mod test_utils;

pub use deal::Deal;
pub use earning::Earning;
pub use geo::Geo;
pub use news::News;
pub use player_deal::PlayerDeal;
pub use profile::Profile;
pub use referral::Referral;
pub use session::{Session, Sessions};
