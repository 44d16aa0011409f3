//! # Career Evaluator Core
//!
//! The evaluation-request lifecycle behind the career risk evaluator: a
//! questionnaire is forwarded to a language model, and the model's fixed
//! format answer is turned into a risk score with an explanation.
//!
//! ## Components
//!
//! - Session registry ([`session`]): in-memory status records keyed by a
//!   client-chosen id, with timestamps from an injectable [`clock`]
//! - Expiry sweep ([`sweeper`]): background removal of idle sessions
//! - Model provider ([`provider`]): the upstream text-completion seam
//! - Response grammar ([`protocol`]): `Score:` / `Explanation:` parsing
//! - Evaluation service ([`service`]): validation, upstream call, parsing and
//!   session updates for a single request
//!
//! ## Request Lifecycle
//!
//! ```text
//! received → processing → completed
//!                       ↘ error
//! ```
//!
//! A request that fails validation never reaches `processing` and leaves no
//! session behind.

pub mod clock;
pub mod config;
pub mod prompt;
pub mod protocol;
pub mod provider;
pub mod service;
pub mod session;
pub mod sweeper;

// Re-exports
pub use config::{EvaluatorConfig, ProviderSecret};
pub use prompt::Profile;
pub use protocol::{EvaluationResult, ParseFailure, ParseOutcome};
pub use service::{Evaluation, EvaluationError, EvaluationService};
pub use session::{
    ANONYMOUS_SESSION_ID, Session, SessionError, SessionHandle, SessionId, SessionRegistry,
    SessionStatus,
};
