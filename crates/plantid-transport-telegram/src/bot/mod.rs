/// Command and message handlers
pub mod handlers;
/// Loading indicator phrases and selection
pub mod loading;
/// Per-message request flow
pub mod orchestrator;
/// Chat transport seam and its Telegram implementation
pub mod transport;

pub use loading::{FixedPicker, PhrasePicker, RandomPicker, LOADING_PHRASES};
pub use orchestrator::{Inbound, RequestOrchestrator, RequestOutcome};
pub use transport::{ChatTransport, TelegramTransport};
