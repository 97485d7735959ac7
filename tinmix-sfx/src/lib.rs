pub mod backend;
pub mod clip;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod mixer;
pub mod player;
pub mod registry;
pub mod scheduler;
pub mod settings;
pub mod sound;

pub use clip::SfxHandle;
pub use engine::SfxEngine;
pub use error::{SfxError, SfxResult};
pub use player::SfxManager;
pub use scheduler::{CallbackStatus, OutputConsumer};
pub use settings::{BitDepth, EngineSettings, OutputFormat, OutputLayout, SampleRate, SpeakerSetup};
