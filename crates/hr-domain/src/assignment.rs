// assignment.rs
use crate::{ApprovalLevel, DomainError, WorkflowType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Asignación de un aprobador por defecto a un nivel de la cadena.
///
/// `workflow_type = None` significa "todos los tipos"; una asignación con
/// tipo explícito tiene precedencia sobre las genéricas al resolver el
/// aprobador de un nivel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproverAssignment {
  pub id: Uuid,
  pub role_level: ApprovalLevel,
  pub role_name: String,
  pub approver_id: i64,
  pub approver_name: String,
  pub approver_email: Option<String>,
  pub workflow_type: Option<WorkflowType>,
  pub is_active: bool,
  pub is_primary: bool,
  pub can_skip: bool,
  pub is_required: bool,
  pub notify_by_email: bool,
  pub notify_by_push: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ApproverAssignment {
  /// Crea una asignación activa con los valores por defecto del padrón:
  /// requerida, no principal, sin salto de nivel, notificación por correo.
  pub fn new(role_level: ApprovalLevel,
             approver_id: i64,
             approver_name: &str,
             workflow_type: Option<WorkflowType>)
             -> Result<Self, DomainError> {
    if approver_name.trim().is_empty() {
      return Err(DomainError::ValidationError("el nombre del aprobador no puede estar vacío".into()));
    }
    let now = Utc::now();
    Ok(Self { id: Uuid::new_v4(),
              role_level,
              role_name: role_level.role_name().to_string(),
              approver_id,
              approver_name: approver_name.trim().to_string(),
              approver_email: None,
              workflow_type,
              is_active: true,
              is_primary: false,
              can_skip: false,
              is_required: true,
              notify_by_email: true,
              notify_by_push: false,
              created_at: now,
              updated_at: now })
  }

  pub fn with_email(mut self, email: &str) -> Result<Self, DomainError> {
    if !email.contains('@') {
      return Err(DomainError::ValidationError(format!("correo inválido: {}", email)));
    }
    self.approver_email = Some(email.trim().to_string());
    Ok(self)
  }

  pub fn as_primary(mut self) -> Self {
    self.is_primary = true;
    self
  }

  /// Aplica un parche parcial validando cada campo tocado y refresca
  /// `updated_at`.
  pub fn apply(&mut self, patch: AssignmentPatch) -> Result<(), DomainError> {
    if let Some(role_name) = patch.role_name {
      if role_name.trim().is_empty() {
        return Err(DomainError::ValidationError("el nombre del rol no puede estar vacío".into()));
      }
      self.role_name = role_name.trim().to_string();
    }
    if let Some(approver_id) = patch.approver_id {
      self.approver_id = approver_id;
    }
    if let Some(approver_name) = patch.approver_name {
      if approver_name.trim().is_empty() {
        return Err(DomainError::ValidationError("el nombre del aprobador no puede estar vacío".into()));
      }
      self.approver_name = approver_name.trim().to_string();
    }
    if let Some(email) = patch.approver_email {
      // Some(None) limpia el correo registrado
      match email {
        Some(e) if !e.contains('@') => {
          return Err(DomainError::ValidationError(format!("correo inválido: {}", e)));
        }
        Some(e) => self.approver_email = Some(e.trim().to_string()),
        None => self.approver_email = None,
      }
    }
    if let Some(wt) = patch.workflow_type {
      self.workflow_type = wt;
    }
    if let Some(v) = patch.is_active {
      self.is_active = v;
    }
    if let Some(v) = patch.is_primary {
      self.is_primary = v;
    }
    if let Some(v) = patch.can_skip {
      self.can_skip = v;
    }
    if let Some(v) = patch.is_required {
      self.is_required = v;
    }
    if let Some(v) = patch.notify_by_email {
      self.notify_by_email = v;
    }
    if let Some(v) = patch.notify_by_push {
      self.notify_by_push = v;
    }
    self.updated_at = Utc::now();
    Ok(())
  }
}

/// Parche parcial sobre una asignación; los campos en `None` no se tocan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentPatch {
  pub role_name: Option<String>,
  pub approver_id: Option<i64>,
  pub approver_name: Option<String>,
  pub approver_email: Option<Option<String>>,
  pub workflow_type: Option<Option<WorkflowType>>,
  pub is_active: Option<bool>,
  pub is_primary: Option<bool>,
  pub can_skip: Option<bool>,
  pub is_required: Option<bool>,
  pub notify_by_email: Option<bool>,
  pub notify_by_push: Option<bool>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn new_fills_role_name_and_defaults() -> Result<(), DomainError> {
    let a = ApproverAssignment::new(ApprovalLevel::Specialist, 20, "Diego Souza", None)?;
    assert_eq!(a.role_name, "Especialista de Cargos y Salarios");
    assert!(a.is_active);
    assert!(a.is_required);
    assert!(!a.is_primary);
    assert!(a.notify_by_email);
    Ok(())
  }

  #[test]
  fn patch_updates_and_clears_email() -> Result<(), DomainError> {
    let mut a = ApproverAssignment::new(ApprovalLevel::Leader, 10, "Ana", None)?.with_email("ana@acme.com")?;
    let patch = AssignmentPatch { approver_email: Some(None),
                                  is_active: Some(false),
                                  ..Default::default() };
    a.apply(patch)?;
    assert_eq!(a.approver_email, None);
    assert!(!a.is_active);
    Ok(())
  }

  #[test]
  fn patch_rejects_invalid_fields() {
    let mut a = ApproverAssignment::new(ApprovalLevel::Leader, 10, "Ana", None).unwrap();
    let bad_name = AssignmentPatch { approver_name: Some("   ".into()), ..Default::default() };
    assert!(a.apply(bad_name).is_err());
    let bad_email = AssignmentPatch { approver_email: Some(Some("sin-arroba".into())), ..Default::default() };
    assert!(a.apply(bad_email).is_err());
  }
}
