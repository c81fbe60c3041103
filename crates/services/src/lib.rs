#![forbid(unsafe_code)]

pub mod admin;
pub mod answers;
pub mod app_services;
pub mod config_store;
pub mod error;
pub mod gateway;
pub mod results;
pub mod session;

pub use quiz_core::Clock;

pub use admin::{AdminGate, ConfigEditor, TierEdit};
pub use answers::AnswerTracker;
pub use app_services::AppServices;
pub use config_store::ConfigStore;
pub use error::{
    AdminError, AppServicesError, GatewayError, SaveError, SaveStage, SessionError, TrackerError,
};
pub use gateway::{ConfigSource, LoadedConfiguration, QuizGateway};
pub use results::{ResultOutcome, ReturnReason, evaluate};
pub use session::{DEFAULT_TRANSITION_DELAY, QuizProgress, QuizSession, SessionState};
