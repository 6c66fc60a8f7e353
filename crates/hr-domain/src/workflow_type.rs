// workflow_type.rs
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tipos de documento que recorren la cadena de aprobación.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
  JobDescription,
  Goal,
  Bonus,
  Calibration,
}

impl WorkflowType {
  pub const ALL: [WorkflowType; 4] =
    [WorkflowType::JobDescription, WorkflowType::Goal, WorkflowType::Bonus, WorkflowType::Calibration];

  /// Etiqueta legible para menús y notificaciones.
  pub fn label(self) -> &'static str {
    match self {
      WorkflowType::JobDescription => "Descripción de Cargo",
      WorkflowType::Goal => "Metas",
      WorkflowType::Bonus => "Bonificación",
      WorkflowType::Calibration => "Calibración",
    }
  }
}

impl fmt::Display for WorkflowType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      WorkflowType::JobDescription => "job_description",
      WorkflowType::Goal => "goal",
      WorkflowType::Bonus => "bonus",
      WorkflowType::Calibration => "calibration",
    };
    write!(f, "{}", s)
  }
}

impl FromStr for WorkflowType {
  type Err = DomainError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_lowercase().as_str() {
      "job_description" => Ok(WorkflowType::JobDescription),
      "goal" => Ok(WorkflowType::Goal),
      "bonus" => Ok(WorkflowType::Bonus),
      "calibration" => Ok(WorkflowType::Calibration),
      other => Err(DomainError::ValidationError(format!("tipo de workflow desconocido: {}", other))),
    }
  }
}
