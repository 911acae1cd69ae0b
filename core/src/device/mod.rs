pub mod front_panel;
pub mod keyboard_matrix;
pub mod pia6821;
pub mod serial;
pub mod terminal;
pub mod video_ram;

pub use front_panel::FrontPanel;
pub use keyboard_matrix::KeyboardMatrix;
pub use pia6821::Pia6821;
pub use serial::Serial2Sio;
pub use terminal::TerminalModel;
pub use video_ram::VideoRam;
