// Archivo: stubs.rs
// Propósito: implementaciones en memoria de los contratos de
// `repository.rs`, pensadas para tests y para el binario de demostración.
// Un único mutex cubre flujos + historial para que la escritura
// condicional y el agregado de historial sean un solo commit.
use crate::domain::{ApprovalFlow, DateRange, FlowStatus, FlowUpdate, HistoryEntry};
use crate::errors::{FlowError, Result};
use crate::repository::{AdminOverride, AssignmentStore, FlowRepository, HistoryLog, NotificationDispatcher,
                        Recipient, SubjectDocumentStore};
use hr_domain::{ApprovalLevel, ApproverAssignment, AssignmentPatch, WorkflowType};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

fn lock<'a, T>(m: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>> {
    m.lock()
     .map_err(|e| FlowError::Unavailable(format!("mutex '{}' poisoned: {}", name, e)))
}

#[derive(Default)]
struct FlowStoreInner {
    flows: HashMap<Uuid, ApprovalFlow>,
    history: Vec<HistoryEntry>,
}

/// Almacén de flujos + historial en memoria.
pub struct InMemoryFlowRepository {
    inner: Mutex<FlowStoreInner>,
}

impl InMemoryFlowRepository {
    pub fn new() -> Self {
        Self { inner: Mutex::new(FlowStoreInner::default()) }
    }
}

impl Default for InMemoryFlowRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowRepository for InMemoryFlowRepository {
    fn insert_flow(&self, flow: ApprovalFlow, entry: HistoryEntry) -> Result<Uuid> {
        let mut inner = lock(&self.inner, "flow_store")?;
        let clash = inner.flows
                         .values()
                         .any(|f| {
                             f.workflow_type == flow.workflow_type
                             && f.subject_id == flow.subject_id
                             && f.status.is_open()
                         });
        if clash {
            return Err(FlowError::Conflict(format!("el sujeto {} ya tiene un flujo abierto de tipo {}",
                                                   flow.subject_id, flow.workflow_type)));
        }
        let id = flow.id;
        inner.flows.insert(id, flow);
        inner.history.push(entry);
        Ok(id)
    }

    fn get_flow(&self, flow_id: &Uuid) -> Result<ApprovalFlow> {
        let inner = lock(&self.inner, "flow_store")?;
        inner.flows
             .get(flow_id)
             .cloned()
             .ok_or_else(|| FlowError::NotFound(format!("flujo {}", flow_id)))
    }

    fn update_flow_if(&self,
                      flow_id: &Uuid,
                      expected: FlowStatus,
                      update: FlowUpdate,
                      entry: HistoryEntry)
                      -> Result<ApprovalFlow> {
        let mut inner = lock(&self.inner, "flow_store")?;
        let flow = match inner.flows.get_mut(flow_id) {
            Some(f) => f,
            None => return Err(FlowError::NotFound(format!("flujo {}", flow_id))),
        };
        if flow.status != expected {
            return Err(FlowError::InvalidState(format!("el flujo está en {} y la transición esperaba {}",
                                                       flow.status, expected)));
        }
        update.apply_to(flow);
        let updated = flow.clone();
        inner.history.push(entry);
        Ok(updated)
    }

    fn list_by_subject(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<Vec<ApprovalFlow>> {
        let inner = lock(&self.inner, "flow_store")?;
        let mut out: Vec<ApprovalFlow> = inner.flows
                                              .values()
                                              .filter(|f| f.workflow_type == workflow_type && f.subject_id == subject_id)
                                              .cloned()
                                              .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn active_by_subject(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<Option<ApprovalFlow>> {
        let inner = lock(&self.inner, "flow_store")?;
        Ok(inner.flows
                .values()
                .filter(|f| f.workflow_type == workflow_type && f.subject_id == subject_id && f.is_open())
                .max_by_key(|f| f.created_at)
                .cloned())
    }

    fn list_pending_for(&self, approver_id: i64) -> Result<Vec<ApprovalFlow>> {
        let inner = lock(&self.inner, "flow_store")?;
        let mut out: Vec<ApprovalFlow> =
            inner.flows
                 .values()
                 .filter(|f| {
                     f.pending_level()
                      .map(|level| f.level(level).approver_id == approver_id)
                      .unwrap_or(false)
                 })
                 .cloned()
                 .collect();
        out.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(out)
    }

    fn list_flows(&self) -> Result<Vec<ApprovalFlow>> {
        let inner = lock(&self.inner, "flow_store")?;
        Ok(inner.flows.values().cloned().collect())
    }
}

impl HistoryLog for InMemoryFlowRepository {
    fn append(&self, entry: HistoryEntry) -> Result<()> {
        let mut inner = lock(&self.inner, "flow_store")?;
        inner.history.push(entry);
        Ok(())
    }

    fn list_by_flow(&self, flow_id: &Uuid) -> Result<Vec<HistoryEntry>> {
        let inner = lock(&self.inner, "flow_store")?;
        let mut out: Vec<HistoryEntry> = inner.history
                                              .iter()
                                              .filter(|e| &e.flow_id == flow_id)
                                              .cloned()
                                              .collect();
        // el sort estable preserva el orden de inserción ante timestamps iguales
        out.sort_by_key(|e| e.created_at);
        Ok(out)
    }

    fn list_range(&self, range: &DateRange) -> Result<Vec<HistoryEntry>> {
        let inner = lock(&self.inner, "flow_store")?;
        let mut out: Vec<HistoryEntry> = inner.history
                                              .iter()
                                              .filter(|e| range.contains(e.created_at))
                                              .cloned()
                                              .collect();
        out.sort_by_key(|e| e.created_at);
        Ok(out)
    }
}

/// Padrón de aprobadores en memoria.
pub struct InMemoryAssignmentStore {
    assignments: Mutex<HashMap<Uuid, ApproverAssignment>>,
}

impl InMemoryAssignmentStore {
    pub fn new() -> Self {
        Self { assignments: Mutex::new(HashMap::new()) }
    }
}

impl Default for InMemoryAssignmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentStore for InMemoryAssignmentStore {
    fn insert(&self, assignment: ApproverAssignment) -> Result<Uuid> {
        let mut map = lock(&self.assignments, "assignments")?;
        let id = assignment.id;
        map.insert(id, assignment);
        Ok(id)
    }

    fn update(&self, id: &Uuid, patch: AssignmentPatch) -> Result<ApproverAssignment> {
        let mut map = lock(&self.assignments, "assignments")?;
        let assignment = map.get_mut(id)
                            .ok_or_else(|| FlowError::NotFound(format!("asignación {}", id)))?;
        assignment.apply(patch)?;
        Ok(assignment.clone())
    }

    fn delete(&self, id: &Uuid) -> Result<()> {
        let mut map = lock(&self.assignments, "assignments")?;
        map.remove(id)
           .map(|_| ())
           .ok_or_else(|| FlowError::NotFound(format!("asignación {}", id)))
    }

    fn get(&self, id: &Uuid) -> Result<ApproverAssignment> {
        let map = lock(&self.assignments, "assignments")?;
        map.get(id)
           .cloned()
           .ok_or_else(|| FlowError::NotFound(format!("asignación {}", id)))
    }

    fn list(&self) -> Result<Vec<ApproverAssignment>> {
        let map = lock(&self.assignments, "assignments")?;
        let mut out: Vec<ApproverAssignment> = map.values().cloned().collect();
        out.sort_by(|a, b| a.role_level.cmp(&b.role_level).then(a.created_at.cmp(&b.created_at)));
        Ok(out)
    }

    fn list_by_level_and_type(&self,
                              level: ApprovalLevel,
                              workflow_type: Option<WorkflowType>)
                              -> Result<Vec<ApproverAssignment>> {
        let map = lock(&self.assignments, "assignments")?;
        let mut out: Vec<ApproverAssignment> =
            map.values()
               .filter(|a| a.role_level == level)
               .filter(|a| match workflow_type {
                   Some(t) => a.workflow_type.is_none() || a.workflow_type == Some(t),
                   None => true,
               })
               .cloned()
               .collect();
        out.sort_by_key(|a| a.created_at);
        Ok(out)
    }
}

/// Estado espejado del documento de origen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectVerdict {
    Approved,
    Rejected,
}

/// Espejo en memoria del veredicto del documento de origen.
pub struct InMemorySubjectStore {
    verdicts: Mutex<HashMap<(WorkflowType, i64), SubjectVerdict>>,
    failing: AtomicBool,
}

impl InMemorySubjectStore {
    pub fn new() -> Self {
        Self { verdicts: Mutex::new(HashMap::new()), failing: AtomicBool::new(false) }
    }

    /// Simula la caída del módulo de documentos.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn verdict_of(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<Option<SubjectVerdict>> {
        let map = lock(&self.verdicts, "subject_verdicts")?;
        Ok(map.get(&(workflow_type, subject_id)).copied())
    }

    fn record(&self, workflow_type: WorkflowType, subject_id: i64, verdict: SubjectVerdict) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(FlowError::Unavailable("módulo de documentos fuera de servicio".into()));
        }
        let mut map = lock(&self.verdicts, "subject_verdicts")?;
        map.insert((workflow_type, subject_id), verdict);
        Ok(())
    }
}

impl Default for InMemorySubjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SubjectDocumentStore for InMemorySubjectStore {
    fn mark_approved(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<()> {
        self.record(workflow_type, subject_id, SubjectVerdict::Approved)
    }

    fn mark_rejected(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<()> {
        self.record(workflow_type, subject_id, SubjectVerdict::Rejected)
    }
}

/// Notificación capturada por el despachador de prueba.
#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub recipient: Recipient,
    pub title: String,
    pub body: String,
}

/// Despachador que registra lo enviado en lugar de enviarlo.
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentNotification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self { sent: Mutex::new(Vec::new()), failing: AtomicBool::new(false) }
    }

    /// Simula la caída del canal de notificaciones.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Result<Vec<SentNotification>> {
        let sent = lock(&self.sent, "notifications")?;
        Ok(sent.clone())
    }
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationDispatcher for RecordingNotifier {
    fn notify(&self, recipient: &Recipient, title: &str, body: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(FlowError::Unavailable("canal de notificaciones fuera de servicio".into()));
        }
        let mut sent = lock(&self.sent, "notifications")?;
        sent.push(SentNotification { recipient: recipient.clone(),
                                     title: title.to_string(),
                                     body: body.to_string() });
        Ok(())
    }
}

/// Potestad administrativa sobre una lista fija de ids.
pub struct StaticAdminOverride {
    admins: HashSet<i64>,
}

impl StaticAdminOverride {
    pub fn new(ids: &[i64]) -> Self {
        Self { admins: ids.iter().copied().collect() }
    }

    /// Sin administradores: nadie puede decidir fuera de turno.
    pub fn none() -> Self {
        Self::new(&[])
    }
}

impl AdminOverride for StaticAdminOverride {
    fn can_override(&self, actor_id: i64) -> bool {
        self.admins.contains(&actor_id)
    }
}
