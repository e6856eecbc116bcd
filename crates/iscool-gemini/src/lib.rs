//! Minimal Gemini `generateContent` client.
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), iscool_gemini::GeminiError> {
//! use iscool_gemini::{GeminiClient, Provider, Turn, TurnRole};
//!
//! let client = GeminiClient::new("my-api-key")?;
//! let reply = client
//!     .generate(
//!         "gemini-2.5-flash",
//!         Some("Be concise."),
//!         &[Turn::text(TurnRole::User, "2+2?")],
//!     )
//!     .await?;
//! println!("{reply}");
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, GeminiClient, Provider};
pub use error::GeminiError;
pub use types::{Candidate, CandidateContent, GenerateContentResponse, Part, Turn, TurnRole};
