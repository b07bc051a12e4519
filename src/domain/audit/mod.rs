//! Decision Audit Domain Module
//!
//! Types and rules for auditing a single decision through five sequential
//! stages. Nothing here performs I/O; the model gateway and the audit handler
//! in the application layer drive these definitions.
//!
//! # Architecture
//!
//! - **DecisionInput**: validated request every stage reads
//! - **Stage / StageOutput**: pipeline order and the typed result each stage decodes
//! - **Analysis stages**: instruction and context rendering per stage
//! - **Policy**: directive-language and question-format rules
//! - **AuditReport**: composite response merging synthesis with every prior result
//!
//! # Example
//!
//! ```ignore
//! use audit::{AnalysisStage, Decomposer, DecisionInput};
//!
//! let input = DecisionInput::new("Move abroad for a job", "career", "long", vec![])?;
//! let prompt = Decomposer.context(&input);
//! ```

pub mod analysis;
pub mod input;
pub mod policy;
pub mod results;
pub mod stage;

pub use analysis::*;
pub use input::*;
pub use policy::*;
pub use results::*;
pub use stage::*;
