// Archivo: repository.rs
// Propósito: contratos de persistencia y de colaboradores externos del
// motor de aprobaciones. Las implementaciones reales (SQL, colas) viven
// fuera del crate; `stubs.rs` trae versiones en memoria.
use crate::domain::{ApprovalFlow, DateRange, FlowStatus, FlowUpdate, HistoryEntry};
use crate::errors::Result;
use hr_domain::{ApprovalLevel, ApproverAssignment, AssignmentPatch, WorkflowType};
use uuid::Uuid;

/// Almacén de instancias de flujo.
///
/// Nota sobre concurrencia: `insert_flow` y `update_flow_if` deben ser
/// atómicos y persistir la entrada de historial en el mismo commit que el
/// cambio de flujo. `update_flow_if` es una escritura condicional: solo
/// aplica el parche si el estado actual coincide con `expected`; así dos
/// aprobaciones concurrentes del mismo nivel no avanzan el flujo dos
/// veces — la segunda recibe `InvalidState`.
pub trait FlowRepository: Send + Sync {
    /// Inserta un flujo nuevo junto con su entrada de historial `created`.
    /// Falla con `Conflict` si el sujeto ya tiene un flujo abierto del
    /// mismo tipo.
    fn insert_flow(&self, flow: ApprovalFlow, entry: HistoryEntry) -> Result<Uuid>;

    /// Recupera un flujo por id; `NotFound` si no existe.
    fn get_flow(&self, flow_id: &Uuid) -> Result<ApprovalFlow>;

    /// Escritura condicional: aplica `update` y agrega `entry` solo si el
    /// estado actual es `expected`. Devuelve el flujo ya actualizado.
    fn update_flow_if(&self,
                      flow_id: &Uuid,
                      expected: FlowStatus,
                      update: FlowUpdate,
                      entry: HistoryEntry)
                      -> Result<ApprovalFlow>;

    /// Flujos de un sujeto y tipo, del más reciente al más antiguo.
    fn list_by_subject(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<Vec<ApprovalFlow>>;

    /// El flujo abierto (no terminal) del sujeto, si existe.
    fn active_by_subject(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<Option<ApprovalFlow>>;

    /// Flujos cuyo turno corresponde al aprobador dado.
    fn list_pending_for(&self, approver_id: i64) -> Result<Vec<ApprovalFlow>>;

    /// Todos los flujos (consultas analíticas).
    fn list_flows(&self) -> Result<Vec<ApprovalFlow>>;
}

/// Bitácora de auditoría, solo-agregar.
pub trait HistoryLog: Send + Sync {
    /// Agrega una entrada. Las entradas nunca se editan ni se borran.
    fn append(&self, entry: HistoryEntry) -> Result<()>;

    /// Entradas de un flujo en orden cronológico ascendente.
    fn list_by_flow(&self, flow_id: &Uuid) -> Result<Vec<HistoryEntry>>;

    /// Entradas dentro de un rango temporal, para reportes.
    fn list_range(&self, range: &DateRange) -> Result<Vec<HistoryEntry>>;
}

/// Almacén del padrón de aprobadores por defecto.
pub trait AssignmentStore: Send + Sync {
    fn insert(&self, assignment: ApproverAssignment) -> Result<Uuid>;
    fn update(&self, id: &Uuid, patch: AssignmentPatch) -> Result<ApproverAssignment>;
    fn delete(&self, id: &Uuid) -> Result<()>;
    fn get(&self, id: &Uuid) -> Result<ApproverAssignment>;
    fn list(&self) -> Result<Vec<ApproverAssignment>>;

    /// Asignaciones de un nivel. Con `workflow_type = Some(t)` incluye las
    /// de tipo exacto `t` y las genéricas (tipo `None`); con `None` lista
    /// todas las del nivel.
    fn list_by_level_and_type(&self,
                              level: ApprovalLevel,
                              workflow_type: Option<WorkflowType>)
                              -> Result<Vec<ApproverAssignment>>;
}

/// Destinatario de una notificación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Employee(i64),
    Role(String),
}

/// Canal de notificaciones. Las transiciones lo invocan en modo mejor
/// esfuerzo: un fallo se registra y no revierte la transición.
pub trait NotificationDispatcher: Send + Sync {
    fn notify(&self, recipient: &Recipient, title: &str, body: &str) -> Result<()>;
}

/// Espejo del veredicto final sobre el documento de origen (la descripción
/// de cargo, la meta, etc. viven en otro módulo de la plataforma).
pub trait SubjectDocumentStore: Send + Sync {
    fn mark_approved(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<()>;
    fn mark_rejected(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<()>;
}

/// Potestad administrativa: decidir en cualquier nivel sin ser el
/// aprobador asignado. Es una capacidad aparte del padrón; no participa
/// en la resolución de aprobadores.
pub trait AdminOverride: Send + Sync {
    fn can_override(&self, actor_id: i64) -> bool;
}
