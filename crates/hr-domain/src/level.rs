// level.rs
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nivel de la cadena de aprobación. La cadena es fija y lineal:
/// cuatro niveles que se recorren siempre en orden ascendente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalLevel {
  Leader,
  Specialist,
  Manager,
  Director,
}

impl ApprovalLevel {
  /// Los cuatro niveles en orden de recorrido.
  pub const ALL: [ApprovalLevel; 4] =
    [ApprovalLevel::Leader, ApprovalLevel::Specialist, ApprovalLevel::Manager, ApprovalLevel::Director];

  /// Valor numérico 1..=4 del nivel.
  pub fn as_u8(self) -> u8 {
    match self {
      ApprovalLevel::Leader => 1,
      ApprovalLevel::Specialist => 2,
      ApprovalLevel::Manager => 3,
      ApprovalLevel::Director => 4,
    }
  }

  /// Construye el nivel desde su valor numérico.
  pub fn from_u8(n: u8) -> Result<Self, DomainError> {
    match n {
      1 => Ok(ApprovalLevel::Leader),
      2 => Ok(ApprovalLevel::Specialist),
      3 => Ok(ApprovalLevel::Manager),
      4 => Ok(ApprovalLevel::Director),
      other => Err(DomainError::ValidationError(format!("nivel de aprobación fuera de rango: {}", other))),
    }
  }

  /// Índice 0..=3 para acceder al arreglo de casillas de un flujo.
  pub fn index(self) -> usize {
    (self.as_u8() - 1) as usize
  }

  /// Nivel siguiente en la cadena, o `None` si es el último.
  pub fn next(self) -> Option<Self> {
    match self {
      ApprovalLevel::Leader => Some(ApprovalLevel::Specialist),
      ApprovalLevel::Specialist => Some(ApprovalLevel::Manager),
      ApprovalLevel::Manager => Some(ApprovalLevel::Director),
      ApprovalLevel::Director => None,
    }
  }

  /// Nombre del rol que decide en este nivel.
  pub fn role_name(self) -> &'static str {
    match self {
      ApprovalLevel::Leader => "Líder Inmediato",
      ApprovalLevel::Specialist => "Especialista de Cargos y Salarios",
      ApprovalLevel::Manager => "Gerente de RRHH",
      ApprovalLevel::Director => "Director de Gente",
    }
  }
}

impl fmt::Display for ApprovalLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "L{}", self.as_u8())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn numeric_roundtrip_and_order() {
    for (i, level) in ApprovalLevel::ALL.iter().enumerate() {
      assert_eq!(level.as_u8() as usize, i + 1);
      assert_eq!(ApprovalLevel::from_u8(level.as_u8()).unwrap(), *level);
      assert_eq!(level.index(), i);
    }
    assert!(ApprovalLevel::from_u8(0).is_err());
    assert!(ApprovalLevel::from_u8(5).is_err());
  }

  #[test]
  fn next_walks_the_chain() {
    assert_eq!(ApprovalLevel::Leader.next(), Some(ApprovalLevel::Specialist));
    assert_eq!(ApprovalLevel::Manager.next(), Some(ApprovalLevel::Director));
    assert_eq!(ApprovalLevel::Director.next(), None);
  }
}
