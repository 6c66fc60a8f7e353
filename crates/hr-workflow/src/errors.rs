use thiserror::Error;

// Errores comunes de la capa de workflows de RRHH.
//
// Este enum centraliza los errores que pueden ocurrir al armar cadenas
// de aprobación: errores del motor (`FlowError`), errores del dominio
// (`DomainError`) y validaciones locales.
#[derive(Error, Debug)]
pub enum WorkflowError {
  /// Errores originados por el motor de aprobaciones.
  #[error("Error de flujo: {0}")]
  Flow(#[from] flow::errors::FlowError),

  /// Errores originados por operaciones del dominio de RRHH.
  #[error("Error de dominio: {0}")]
  Domain(#[from] hr_domain::DomainError),

  /// Errores de validacion local del workflow (por ejemplo cadenas
  /// incompletas).
  #[error("Error de validación: {0}")]
  Validation(String),

  /// Error genérico: captura otros tipos de errores no tipados.
  #[error("Otro error: {0}")]
  Other(String),
}
