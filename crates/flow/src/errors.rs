// Archivo: errors.rs
// Propósito: definir los errores del motor de aprobaciones y el alias
// Result<T> usado por las APIs del crate. Mensajes en español.
use hr_domain::DomainError;
use thiserror::Error;
/// Errores comunes del motor de aprobaciones.
///
/// - `NotFound`: entidad no encontrada.
/// - `Conflict`: choque con otro flujo abierto del mismo sujeto.
/// - `InvalidState`: la transición no es legal desde el estado actual.
/// - `Forbidden`: el actor no tiene el turno ni potestad de admin.
/// - `Validation`: entrada rechazada antes de tocar el estado.
/// - `Unavailable`: colaborador externo o almacenamiento caído.
#[derive(Error, Debug)]
pub enum FlowError {
  /// Entidad no encontrada (flujo, asignación, empleado).
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Ya existe un flujo abierto para el sujeto.
  #[error("Conflicto: {0}")]
  Conflict(String),
  /// Transición ilegal desde el estado actual del flujo, incluida una
  /// escritura que perdió la carrera contra otra transición.
  #[error("Estado inválido: {0}")]
  InvalidState(String),
  /// El actor no está autorizado para decidir en este nivel.
  #[error("Prohibido: {0}")]
  Forbidden(String),
  /// Entrada inválida (comentarios cortos, campos vacíos).
  #[error("Error de validación: {0}")]
  Validation(String),
  /// Almacenamiento o colaborador externo no disponible.
  #[error("No disponible: {0}")]
  Unavailable(String),
}
/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, FlowError>;

impl From<DomainError> for FlowError {
  fn from(e: DomainError) -> Self {
    match e {
      DomainError::NotFound(m) => FlowError::NotFound(m),
      DomainError::ValidationError(m) => FlowError::Validation(m),
      DomainError::ExternalError(m) => FlowError::Unavailable(m),
      DomainError::SerializationError(m) => FlowError::Unavailable(m),
    }
  }
}
