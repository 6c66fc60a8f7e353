//! hr-workflow: armado de cadenas de aprobación de RRHH
//!
//! Crate que opera por encima del motor `flow`: arma la cadena completa
//! de un documento (líder inmediato + padrón de aprobadores), siembra
//! las asignaciones por defecto y procesa aprobaciones por lotes.

pub mod batch;
pub mod errors;
pub mod factory;

pub use batch::{batch_approve, BatchOutcome};
pub use errors::WorkflowError;
pub use factory::ApprovalWorkflowFactory;
