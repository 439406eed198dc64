pub mod controller;
pub mod ip;
pub mod locations;

pub use controller::{FormInput, GalleryItem, Intent, MemeApp, Outcome, Preview, Status, StatusKind};
pub use ip::{IpResolver, IpifyResolver, StaticIp, UNKNOWN_IP};
pub use locations::{LocationChoices, OTHER_LOCATION};
