//! Chat use cases: document indexing, assistant management, conversation
//! runs, search fallback and the orchestrator that sequences them.

pub mod assistant;
pub mod conversation;
pub mod indexing;
pub mod orchestrator;
pub mod search;

pub use assistant::AssistantManagementClient;
pub use conversation::{ConversationClient, ConversationPhase, FragmentStream, WaitPolicy};
pub use indexing::DocumentIndexingClient;
pub use orchestrator::{ChatOrchestrator, TurnOutcome, UploadReport};
pub use search::{SearchAnswer, SearchFallbackClient};
