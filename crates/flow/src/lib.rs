//! Crate `flow` — motor de aprobaciones multinivel
//!
//! Este crate define los tipos de dominio del flujo de aprobación
//! (`ApprovalFlow`, `HistoryEntry`, `Alert`), los contratos de
//! persistencia y colaboradores (`FlowRepository`, `HistoryLog`,
//! `AssignmentStore`, `NotificationDispatcher`) con implementaciones en
//! memoria útiles para pruebas, y los servicios que operan sobre ellos:
//! el motor de transiciones, el padrón de aprobadores, el monitoreo del
//! padrón y la analítica.
//!
//! Diseño resumido:
//! - Cadena fija de cuatro niveles; el estado global codifica el nivel
//!   con el turno y las casillas guardan la decisión de cada nivel.
//! - Historial solo-agregar persistido en el mismo commit que cada
//!   transición.
//! - Escritura condicional: una transición solo se aplica si el estado
//!   actual coincide con el esperado, lo que descarta la segunda de dos
//!   decisiones concurrentes sobre el mismo nivel.
//!
//! Ejemplo rápido:
//! ```rust
//! use flow::stubs::{InMemoryFlowRepository, InMemorySubjectStore, RecordingNotifier, StaticAdminOverride};
//! use flow::TransitionEngine;
//! use std::sync::Arc;
//! let repo = Arc::new(InMemoryFlowRepository::new());
//! let engine = TransitionEngine::new(repo,
//!                                    Arc::new(InMemorySubjectStore::new()),
//!                                    Arc::new(RecordingNotifier::new()),
//!                                    Arc::new(StaticAdminOverride::none()));
//! ```
pub mod analytics;
pub mod directory;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod monitoring;
pub mod repository;
pub mod service;
pub mod stubs;

pub use analytics::*;
pub use directory::*;
pub use domain::*;
pub use engine::*;
pub use errors::*;
pub use monitoring::*;
pub use repository::*;
pub use service::*;
pub use stubs::*;
