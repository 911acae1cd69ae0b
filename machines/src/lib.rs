pub mod altair;
pub mod apple1;
pub mod registry;
pub mod trs80;

pub use altair::AltairSystem;
pub use apple1::Apple1System;
pub use trs80::Trs80System;
