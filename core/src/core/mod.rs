pub mod bus;
pub mod machine;
pub mod software;

pub use bus::{Bus, InterruptState};
pub use machine::{InputButton, Machine};
pub use software::{SoftwareImage, SoftwareRegion};
