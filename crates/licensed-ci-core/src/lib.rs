pub mod context;
pub mod error;
pub mod inputs;
pub mod options;
pub mod outputs;

pub use context::{Context, SenderType};
pub use error::ConfigError;
pub use inputs::Inputs;
pub use options::CliOptions;
pub use outputs::StepOutputs;
