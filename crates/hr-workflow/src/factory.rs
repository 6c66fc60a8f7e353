use crate::WorkflowError;
use flow::domain::Actor;
use flow::repository::{FlowRepository, HistoryLog};
use flow::ApprovalService;
use hr_domain::{ApprovalLevel, ApproverAssignment, WorkflowType};
use std::sync::Arc;
use uuid::Uuid;

/// Fábrica para armar cadenas de aprobación completas.
///
/// Resuelve los niveles 2 a 4 desde el padrón de aprobadores; el nivel 1
/// (líder inmediato) depende del colaborador dueño del documento y por
/// eso se recibe por parámetro en cada creación.
pub struct ApprovalWorkflowFactory<R>
  where R: FlowRepository + HistoryLog
{
  service: Arc<ApprovalService<R>>,
}

impl<R> ApprovalWorkflowFactory<R> where R: FlowRepository + HistoryLog + 'static
{
  pub fn new(service: Arc<ApprovalService<R>>) -> Self {
    Self { service }
  }

  /// Crea el flujo de un documento con la cadena resuelta: el líder
  /// inmediato en el nivel 1 y el padrón para los niveles restantes.
  pub fn create_for_subject(&self,
                            subject_id: i64,
                            workflow_type: WorkflowType,
                            leader_id: i64,
                            leader_name: &str,
                            creator: &Actor)
                            -> Result<Uuid, WorkflowError> {
    if leader_name.trim().is_empty() {
      return Err(WorkflowError::Validation("el nombre del líder inmediato no puede estar vacío".into()));
    }
    let specialist = self.service.resolve_approver(ApprovalLevel::Specialist, workflow_type)?;
    let manager = self.service.resolve_approver(ApprovalLevel::Manager, workflow_type)?;
    let director = self.service.resolve_approver(ApprovalLevel::Director, workflow_type)?;
    let approvers = [(leader_id, leader_name.trim().to_string()),
                     (specialist.approver_id, specialist.approver_name),
                     (manager.approver_id, manager.approver_name),
                     (director.approver_id, director.approver_name)];
    let id = self.service.create(subject_id, workflow_type, approvers, creator)?;
    Ok(id)
  }

  /// Siembra el padrón con las asignaciones por defecto que falten.
  ///
  /// Idempotente: un nivel que ya tiene alguna asignación registrada no
  /// se toca. Devuelve cuántas asignaciones se crearon.
  pub fn initialize_default_assignments(&self,
                                        defaults: &[(ApprovalLevel, i64, &str)])
                                        -> Result<usize, WorkflowError> {
    let mut created = 0usize;
    for (level, approver_id, approver_name) in defaults {
      let existing = self.service.directory().list_by_level_and_type(*level, None)?;
      if !existing.is_empty() {
        continue;
      }
      let assignment = ApproverAssignment::new(*level, *approver_id, approver_name, None)?.as_primary();
      self.service.create_assignment(assignment)?;
      created += 1;
    }
    Ok(created)
  }
}
