// Archivo: engine.rs
// Propósito: implementar las transiciones de la máquina de estados de
// aprobación. Toda transición se valida contra una lectura del flujo y se
// confirma con la escritura condicional del repositorio, de modo que dos
// decisiones concurrentes sobre el mismo nivel no avancen el flujo dos
// veces.
use crate::domain::{Actor, ApprovalFlow, DecisionStatus, FlowStatus, FlowUpdate, HistoryAction, HistoryEntry,
                    LevelDecision, SYSTEM_LEVEL, SYSTEM_LEVEL_NAME};
use crate::errors::{FlowError, Result};
use crate::repository::{AdminOverride, FlowRepository, NotificationDispatcher, Recipient, SubjectDocumentStore};
use chrono::Utc;
use hr_domain::{ApprovalLevel, WorkflowType};
use std::sync::Arc;
use uuid::Uuid;

/// Largo mínimo de los comentarios de rechazo y devolución.
const MIN_COMMENT_LEN: usize = 10;

/// Motor de transiciones del flujo de aprobación.
///
/// Responsabilidades:
/// - Validar estado y autorización antes de cada transición
/// - Confirmar la transición con `update_flow_if` (estado esperado)
/// - Registrar la entrada de historial en el mismo commit
/// - Notificar al siguiente interesado en modo mejor esfuerzo
pub struct TransitionEngine<R>
    where R: FlowRepository
{
    repo: Arc<R>,
    subjects: Arc<dyn SubjectDocumentStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    admin: Arc<dyn AdminOverride>,
}

impl<R> TransitionEngine<R> where R: FlowRepository
{
    pub fn new(repo: Arc<R>,
               subjects: Arc<dyn SubjectDocumentStore>,
               notifier: Arc<dyn NotificationDispatcher>,
               admin: Arc<dyn AdminOverride>)
               -> Self {
        Self { repo, subjects, notifier, admin }
    }

    /// Crea un flujo en borrador con la cadena de aprobadores ya resuelta.
    /// `approvers` va en orden de niveles: (id, nombre) de L1 a L4.
    pub fn create(&self,
                  subject_id: i64,
                  workflow_type: WorkflowType,
                  approvers: [(i64, String); 4],
                  creator: &Actor)
                  -> Result<Uuid> {
        let flow = ApprovalFlow::new(subject_id, workflow_type, approvers, creator.id);
        let entry = HistoryEntry::new(flow.id,
                                      subject_id,
                                      HistoryAction::Created,
                                      SYSTEM_LEVEL,
                                      SYSTEM_LEVEL_NAME,
                                      creator,
                                      Some("Flujo de aprobación creado".into()));
        self.repo.insert_flow(flow, entry)
    }

    /// Somete el flujo a la cadena: de `Draft` (primer envío) o `Returned`
    /// (reenvío, que limpia las decisiones previas) hacia el nivel 1.
    pub fn submit(&self, flow_id: &Uuid, actor: &Actor) -> Result<ApprovalFlow> {
        let flow = self.repo.get_flow(flow_id)?;
        let resubmit = match flow.status {
            FlowStatus::Draft => false,
            FlowStatus::Returned => true,
            other => {
                return Err(FlowError::InvalidState(format!("el flujo no puede someterse desde el estado {}", other)))
            }
        };
        let update = FlowUpdate { new_status: FlowStatus::pending(ApprovalLevel::Leader),
                                  decision: None,
                                  submitted_at: Some(Utc::now()),
                                  completed_at: None,
                                  reset_levels: resubmit };
        let action = if resubmit { HistoryAction::Resubmitted } else { HistoryAction::Submitted };
        let entry = HistoryEntry::new(flow.id,
                                      flow.subject_id,
                                      action,
                                      ApprovalLevel::Leader.as_u8(),
                                      ApprovalLevel::Leader.role_name(),
                                      actor,
                                      Some("Documento sometido a aprobación".into()));
        let updated = self.repo.update_flow_if(flow_id, flow.status, update, entry)?;
        let first = updated.level(ApprovalLevel::Leader);
        self.notify_best_effort(&Recipient::Employee(first.approver_id),
                                "Documento pendiente de aprobación",
                                &format!("El documento {} ({}) aguarda su decisión como {}.",
                                         updated.subject_id,
                                         updated.workflow_type.label(),
                                         ApprovalLevel::Leader.role_name()));
        Ok(updated)
    }

    /// Aprueba el nivel con el turno. Avanza al siguiente nivel o, en el
    /// nivel 4, cierra el flujo y espeja el veredicto en el documento.
    pub fn approve(&self,
                   flow_id: &Uuid,
                   level: ApprovalLevel,
                   actor: &Actor,
                   comments: Option<String>)
                   -> Result<ApprovalFlow> {
        let flow = self.repo.get_flow(flow_id)?;
        Self::expect_turn(&flow, level)?;
        self.authorize(&flow, level, actor)?;
        let now = Utc::now();
        let (new_status, completed_at) = match level.next() {
            Some(next) => (FlowStatus::pending(next), None),
            None => (FlowStatus::Approved, Some(now)),
        };
        let update = FlowUpdate { new_status,
                                  decision: Some(LevelDecision { level,
                                                                 status: DecisionStatus::Approved,
                                                                 comments: comments.clone(),
                                                                 decided_at: now }),
                                  submitted_at: None,
                                  completed_at,
                                  reset_levels: false };
        let entry = HistoryEntry::new(flow.id,
                                      flow.subject_id,
                                      HistoryAction::Approved,
                                      level.as_u8(),
                                      level.role_name(),
                                      actor,
                                      comments);
        let updated = self.repo.update_flow_if(flow_id, FlowStatus::pending(level), update, entry)?;
        match level.next() {
            Some(next) => {
                let slot = updated.level(next);
                self.notify_best_effort(&Recipient::Employee(slot.approver_id),
                                        "Documento pendiente de aprobación",
                                        &format!("El documento {} ({}) aguarda su decisión como {}.",
                                                 updated.subject_id,
                                                 updated.workflow_type.label(),
                                                 next.role_name()));
            }
            None => {
                if let Err(e) = self.subjects.mark_approved(updated.workflow_type, updated.subject_id) {
                    log::warn!("no se pudo espejar la aprobación del documento {}: {}", updated.subject_id, e);
                }
                self.notify_best_effort(&Recipient::Employee(updated.submitted_by),
                                        "Documento aprobado",
                                        &format!("El documento {} ({}) completó los cuatro niveles de aprobación.",
                                                 updated.subject_id,
                                                 updated.workflow_type.label()));
            }
        }
        Ok(updated)
    }

    /// Rechaza el flujo de forma terminal. Exige un comentario de al menos
    /// diez caracteres.
    pub fn reject(&self, flow_id: &Uuid, level: ApprovalLevel, actor: &Actor, comments: &str) -> Result<ApprovalFlow> {
        let comments = Self::validated_comments(comments)?;
        let flow = self.repo.get_flow(flow_id)?;
        Self::expect_turn(&flow, level)?;
        self.authorize(&flow, level, actor)?;
        let now = Utc::now();
        let update = FlowUpdate { new_status: FlowStatus::Rejected,
                                  decision: Some(LevelDecision { level,
                                                                 status: DecisionStatus::Rejected,
                                                                 comments: Some(comments.clone()),
                                                                 decided_at: now }),
                                  submitted_at: None,
                                  completed_at: Some(now),
                                  reset_levels: false };
        let entry = HistoryEntry::new(flow.id,
                                      flow.subject_id,
                                      HistoryAction::Rejected,
                                      level.as_u8(),
                                      level.role_name(),
                                      actor,
                                      Some(comments.clone()));
        let updated = self.repo.update_flow_if(flow_id, FlowStatus::pending(level), update, entry)?;
        if let Err(e) = self.subjects.mark_rejected(updated.workflow_type, updated.subject_id) {
            log::warn!("no se pudo espejar el rechazo del documento {}: {}", updated.subject_id, e);
        }
        self.notify_best_effort(&Recipient::Employee(updated.submitted_by),
                                "Documento rechazado",
                                &format!("El documento {} ({}) fue rechazado en el nivel {}. Motivo: {}",
                                         updated.subject_id,
                                         updated.workflow_type.label(),
                                         level.role_name(),
                                         comments));
        Ok(updated)
    }

    /// Devuelve el flujo al autor para ajustes. No es terminal: el autor
    /// puede corregir y reenviar con `submit`.
    pub fn send_back(&self,
                     flow_id: &Uuid,
                     level: ApprovalLevel,
                     actor: &Actor,
                     comments: &str)
                     -> Result<ApprovalFlow> {
        let comments = Self::validated_comments(comments)?;
        let flow = self.repo.get_flow(flow_id)?;
        Self::expect_turn(&flow, level)?;
        self.authorize(&flow, level, actor)?;
        let update = FlowUpdate { new_status: FlowStatus::Returned,
                                  decision: Some(LevelDecision { level,
                                                                 status: DecisionStatus::Returned,
                                                                 comments: Some(comments.clone()),
                                                                 decided_at: Utc::now() }),
                                  submitted_at: None,
                                  completed_at: None,
                                  reset_levels: false };
        let entry = HistoryEntry::new(flow.id,
                                      flow.subject_id,
                                      HistoryAction::Returned,
                                      level.as_u8(),
                                      level.role_name(),
                                      actor,
                                      Some(comments.clone()));
        let updated = self.repo.update_flow_if(flow_id, FlowStatus::pending(level), update, entry)?;
        self.notify_best_effort(&Recipient::Employee(updated.submitted_by),
                                "Documento devuelto para ajustes",
                                &format!("El documento {} ({}) fue devuelto en el nivel {}. Motivo: {}",
                                         updated.subject_id,
                                         updated.workflow_type.label(),
                                         level.role_name(),
                                         comments));
        Ok(updated)
    }

    fn expect_turn(flow: &ApprovalFlow, level: ApprovalLevel) -> Result<()> {
        if flow.status != FlowStatus::pending(level) {
            return Err(FlowError::InvalidState(format!("el flujo está en {} y la decisión corresponde al nivel {}",
                                                       flow.status,
                                                       level.as_u8())));
        }
        Ok(())
    }

    /// Autoriza contra el aprobador fijado en la casilla del flujo; la
    /// potestad de admin permite decidir en cualquier nivel.
    fn authorize(&self, flow: &ApprovalFlow, level: ApprovalLevel, actor: &Actor) -> Result<()> {
        let slot = flow.level(level);
        if slot.approver_id != actor.id && !self.admin.can_override(actor.id) {
            return Err(FlowError::Forbidden(format!("el actor {} no es el aprobador del nivel {} ({})",
                                                    actor.id,
                                                    level.as_u8(),
                                                    level.role_name())));
        }
        Ok(())
    }

    fn validated_comments(comments: &str) -> Result<String> {
        let trimmed = comments.trim();
        if trimmed.chars().count() < MIN_COMMENT_LEN {
            return Err(FlowError::Validation(format!("el comentario debe tener al menos {} caracteres",
                                                     MIN_COMMENT_LEN)));
        }
        Ok(trimmed.to_string())
    }

    fn notify_best_effort(&self, recipient: &Recipient, title: &str, body: &str) {
        if let Err(e) = self.notifier.notify(recipient, title, body) {
            log::warn!("notificación descartada ({}): {}", title, e);
        }
    }
}
