// Archivo: domain.rs
// Propósito: tipos centrales del motor de aprobaciones: estado del flujo,
// casillas por nivel, entradas del historial, alertas y el parche que los
// repositorios aplican al aceptar una transición.
use chrono::{DateTime, Utc};
use hr_domain::{ApprovalLevel, WorkflowType};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Estado global de una instancia de flujo.
///
/// Los estados `PendingL1..PendingL4` codifican el nivel que tiene el
/// turno; `Approved` y `Rejected` son terminales, `Returned` vuelve al
/// autor para ajustes y admite reenvío.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Draft,
    PendingL1,
    PendingL2,
    PendingL3,
    PendingL4,
    Approved,
    Rejected,
    Returned,
}

impl FlowStatus {
    /// Estado pendiente que corresponde a un nivel de la cadena.
    pub fn pending(level: ApprovalLevel) -> Self {
        match level {
            ApprovalLevel::Leader => FlowStatus::PendingL1,
            ApprovalLevel::Specialist => FlowStatus::PendingL2,
            ApprovalLevel::Manager => FlowStatus::PendingL3,
            ApprovalLevel::Director => FlowStatus::PendingL4,
        }
    }

    /// Nivel con el turno, o `None` si el flujo no espera decisión.
    pub fn pending_level(self) -> Option<ApprovalLevel> {
        match self {
            FlowStatus::PendingL1 => Some(ApprovalLevel::Leader),
            FlowStatus::PendingL2 => Some(ApprovalLevel::Specialist),
            FlowStatus::PendingL3 => Some(ApprovalLevel::Manager),
            FlowStatus::PendingL4 => Some(ApprovalLevel::Director),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FlowStatus::Approved | FlowStatus::Rejected)
    }

    /// Abierto = no terminal. Un flujo abierto bloquea la creación de otro
    /// para el mismo sujeto y tipo.
    pub fn is_open(self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowStatus::Draft => "draft",
            FlowStatus::PendingL1 => "pending_l1",
            FlowStatus::PendingL2 => "pending_l2",
            FlowStatus::PendingL3 => "pending_l3",
            FlowStatus::PendingL4 => "pending_l4",
            FlowStatus::Approved => "approved",
            FlowStatus::Rejected => "rejected",
            FlowStatus::Returned => "returned",
        };
        write!(f, "{}", s)
    }
}

/// Decisión registrada en una casilla de nivel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionStatus {
    Pending,
    Approved,
    Rejected,
    Returned,
}

/// Casilla de un nivel de la cadena: quién decide y qué decidió.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSlot {
    pub approver_id: i64,
    pub approver_name: String,
    pub decision: DecisionStatus,
    pub comments: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl LevelSlot {
    pub fn new(approver_id: i64, approver_name: String) -> Self {
        Self { approver_id,
               approver_name,
               decision: DecisionStatus::Pending,
               comments: None,
               decided_at: None }
    }

    /// Vuelve la casilla a `Pending` conservando el aprobador asignado.
    pub fn reset(&mut self) {
        self.decision = DecisionStatus::Pending;
        self.comments = None;
        self.decided_at = None;
    }
}

/// Instancia de flujo de aprobación de un documento.
///
/// Las cuatro casillas se fijan al crear el flujo y no se reasignan por
/// ediciones posteriores del padrón de aprobadores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalFlow {
    pub id: Uuid,
    pub subject_id: i64,
    pub workflow_type: WorkflowType,
    pub status: FlowStatus,
    pub levels: [LevelSlot; 4],
    pub submitted_by: i64,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ApprovalFlow {
    /// Crea un flujo en `Draft` con la cadena de aprobadores resuelta.
    /// `approvers` va en orden de niveles: (id, nombre) de L1 a L4.
    pub fn new(subject_id: i64,
               workflow_type: WorkflowType,
               approvers: [(i64, String); 4],
               submitted_by: i64)
               -> Self {
        let [a1, a2, a3, a4] = approvers;
        Self { id: Uuid::new_v4(),
               subject_id,
               workflow_type,
               status: FlowStatus::Draft,
               levels: [LevelSlot::new(a1.0, a1.1),
                        LevelSlot::new(a2.0, a2.1),
                        LevelSlot::new(a3.0, a3.1),
                        LevelSlot::new(a4.0, a4.1)],
               submitted_by,
               submitted_at: None,
               completed_at: None,
               created_at: Utc::now() }
    }

    pub fn level(&self, level: ApprovalLevel) -> &LevelSlot {
        &self.levels[level.index()]
    }

    pub fn level_mut(&mut self, level: ApprovalLevel) -> &mut LevelSlot {
        &mut self.levels[level.index()]
    }

    pub fn pending_level(&self) -> Option<ApprovalLevel> {
        self.status.pending_level()
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

/// Acción registrada en el historial de un flujo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Created,
    Submitted,
    Resubmitted,
    Approved,
    Rejected,
    Returned,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HistoryAction::Created => "created",
            HistoryAction::Submitted => "submitted",
            HistoryAction::Resubmitted => "resubmitted",
            HistoryAction::Approved => "approved",
            HistoryAction::Rejected => "rejected",
            HistoryAction::Returned => "returned",
        };
        write!(f, "{}", s)
    }
}

/// Nivel ficticio usado por acciones que no pertenecen a un nivel de la
/// cadena (creación del flujo).
pub const SYSTEM_LEVEL: u8 = 0;
pub const SYSTEM_LEVEL_NAME: &str = "Sistema";

/// Quién ejecuta una operación sobre el motor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    pub role: String,
}

impl Actor {
    pub fn new(id: i64, name: &str, role: &str) -> Self {
        Self { id, name: name.to_string(), role: role.to_string() }
    }
}

/// Entrada inmutable del historial de un flujo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub flow_id: Uuid,
    pub subject_id: i64,
    pub action: HistoryAction,
    pub level: u8,
    pub level_name: String,
    pub actor_id: i64,
    pub actor_name: String,
    pub actor_role: String,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(flow_id: Uuid,
               subject_id: i64,
               action: HistoryAction,
               level: u8,
               level_name: &str,
               actor: &Actor,
               comments: Option<String>)
               -> Self {
        Self { id: Uuid::new_v4(),
               flow_id,
               subject_id,
               action,
               level,
               level_name: level_name.to_string(),
               actor_id: actor.id,
               actor_name: actor.name.clone(),
               actor_role: actor.role.clone(),
               comments,
               created_at: Utc::now() }
    }
}

/// Clase de anomalía detectada por el monitoreo del padrón.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    RoleWithoutApprover,
    ApproverInactive,
}

/// Alerta producida por un escaneo de monitoreo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub role_level: ApprovalLevel,
    pub role_name: String,
    pub affected_assignment: Option<Uuid>,
    pub detected_at: DateTime<Utc>,
}

/// Decisión que la transición escribe en la casilla del nivel.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelDecision {
    pub level: ApprovalLevel,
    pub status: DecisionStatus,
    pub comments: Option<String>,
    pub decided_at: DateTime<Utc>,
}

/// Parche que el repositorio aplica de forma atómica junto con la entrada
/// de historial de la transición.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowUpdate {
    pub new_status: FlowStatus,
    pub decision: Option<LevelDecision>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Reenvío tras una devolución: limpia las decisiones de la cadena.
    pub reset_levels: bool,
}

impl FlowUpdate {
    /// Parche que solo mueve el estado.
    pub fn status(new_status: FlowStatus) -> Self {
        Self { new_status,
               decision: None,
               submitted_at: None,
               completed_at: None,
               reset_levels: false }
    }

    /// Aplica el parche sobre el flujo. Lo usan las implementaciones de
    /// repositorio dentro de su sección crítica.
    pub fn apply_to(&self, flow: &mut ApprovalFlow) {
        if self.reset_levels {
            for slot in flow.levels.iter_mut() {
                slot.reset();
            }
        }
        if let Some(decision) = &self.decision {
            let slot = flow.level_mut(decision.level);
            slot.decision = decision.status;
            slot.comments = decision.comments.clone();
            slot.decided_at = Some(decision.decided_at);
        }
        flow.status = self.new_status;
        if self.submitted_at.is_some() {
            flow.submitted_at = self.submitted_at;
        }
        if self.completed_at.is_some() {
            flow.completed_at = self.completed_at;
        }
    }
}

/// Rango temporal semiabierto para filtros de consultas; los extremos en
/// `None` no acotan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Rango sin acotar (todo el historial).
    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if instant < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if instant > end {
                return false;
            }
        }
        true
    }
}
