pub mod generator;
pub mod report;
pub mod selector;

pub use generator::DesignGenerator;
pub use report::INVALID_INPUT_SENTINEL;
