// Archivo: service.rs
// Propósito: implementar `ApprovalService`, la capa orquestadora que
// expone las operaciones de alto nivel del motor (transiciones, consultas,
// historial, analítica y CRUD del padrón). Esta capa debe ser invocada
// desde handlers HTTP o desde workers.
use crate::analytics::{AnalyticsService, ApproverResponseTime, ApproverStats, Bottleneck, Kpis};
use crate::directory::ApproverDirectory;
use crate::domain::{Actor, ApprovalFlow, DateRange, HistoryEntry};
use crate::engine::TransitionEngine;
use crate::errors::Result;
use crate::repository::{AdminOverride, FlowRepository, HistoryLog, NotificationDispatcher, SubjectDocumentStore};
use hr_domain::{ApprovalLevel, ApproverAssignment, AssignmentPatch, WorkflowType};
use std::sync::Arc;
use uuid::Uuid;

/// Servicio de alto nivel que expone la API del motor de aprobaciones.
///
/// Orquesta el repositorio, el motor de transiciones, el padrón y la
/// analítica. Está pensada para ser invocada desde un handler HTTP.
pub struct ApprovalService<R>
    where R: FlowRepository + HistoryLog
{
    repo: Arc<R>,
    engine: TransitionEngine<R>,
    directory: Arc<ApproverDirectory>,
    analytics: AnalyticsService<R>,
}

impl<R> ApprovalService<R> where R: FlowRepository + HistoryLog + 'static
{
    /// Crea el servicio inyectando el repositorio y los colaboradores. El
    /// motor y la analítica se construyen internamente y se reusan.
    pub fn new(repo: Arc<R>,
               directory: Arc<ApproverDirectory>,
               subjects: Arc<dyn SubjectDocumentStore>,
               notifier: Arc<dyn NotificationDispatcher>,
               admin: Arc<dyn AdminOverride>)
               -> Self {
        let engine = TransitionEngine::new(repo.clone(), subjects, notifier, admin);
        let analytics = AnalyticsService::new(repo.clone());
        Self { repo, engine, directory, analytics }
    }

    // --- transiciones ---------------------------------------------------

    pub fn create(&self,
                  subject_id: i64,
                  workflow_type: WorkflowType,
                  approvers: [(i64, String); 4],
                  creator: &Actor)
                  -> Result<Uuid> {
        self.engine.create(subject_id, workflow_type, approvers, creator)
    }

    pub fn submit(&self, flow_id: &Uuid, actor: &Actor) -> Result<ApprovalFlow> {
        self.engine.submit(flow_id, actor)
    }

    pub fn approve(&self,
                   flow_id: &Uuid,
                   level: ApprovalLevel,
                   actor: &Actor,
                   comments: Option<String>)
                   -> Result<ApprovalFlow> {
        self.engine.approve(flow_id, level, actor, comments)
    }

    pub fn reject(&self, flow_id: &Uuid, level: ApprovalLevel, actor: &Actor, comments: &str) -> Result<ApprovalFlow> {
        self.engine.reject(flow_id, level, actor, comments)
    }

    pub fn send_back(&self,
                     flow_id: &Uuid,
                     level: ApprovalLevel,
                     actor: &Actor,
                     comments: &str)
                     -> Result<ApprovalFlow> {
        self.engine.send_back(flow_id, level, actor, comments)
    }

    // --- consultas ------------------------------------------------------

    pub fn get_flow(&self, flow_id: &Uuid) -> Result<ApprovalFlow> {
        self.repo.get_flow(flow_id)
    }

    pub fn get_by_subject(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<Vec<ApprovalFlow>> {
        self.repo.list_by_subject(workflow_type, subject_id)
    }

    pub fn get_active_by_subject(&self, workflow_type: WorkflowType, subject_id: i64) -> Result<Option<ApprovalFlow>> {
        self.repo.active_by_subject(workflow_type, subject_id)
    }

    /// Bandeja del aprobador: flujos cuyo turno le corresponde.
    pub fn get_pending_for(&self, approver_id: i64) -> Result<Vec<ApprovalFlow>> {
        self.repo.list_pending_for(approver_id)
    }

    pub fn list_flows(&self) -> Result<Vec<ApprovalFlow>> {
        self.repo.list_flows()
    }

    /// Historial completo de un flujo, en orden cronológico.
    pub fn get_history(&self, flow_id: &Uuid) -> Result<Vec<HistoryEntry>> {
        self.repo.list_by_flow(flow_id)
    }

    // --- analítica ------------------------------------------------------

    pub fn kpis(&self, range: &DateRange, workflow_type: Option<WorkflowType>) -> Result<Kpis> {
        self.analytics.kpis(range, workflow_type)
    }

    pub fn stats_by_approver(&self, range: &DateRange, limit: usize) -> Result<Vec<ApproverStats>> {
        self.analytics.by_approver(range, limit)
    }

    pub fn avg_response_time_by_approver(&self, range: &DateRange, limit: usize) -> Result<Vec<ApproverResponseTime>> {
        self.analytics.avg_response_time_by_approver(range, limit)
    }

    pub fn bottlenecks(&self, limit: usize) -> Result<Vec<Bottleneck>> {
        self.analytics.bottlenecks(limit)
    }

    // --- padrón de aprobadores -----------------------------------------

    pub fn create_assignment(&self, assignment: ApproverAssignment) -> Result<Uuid> {
        self.directory.create_assignment(assignment)
    }

    pub fn update_assignment(&self, id: &Uuid, patch: AssignmentPatch) -> Result<ApproverAssignment> {
        self.directory.update_assignment(id, patch)
    }

    pub fn delete_assignment(&self, id: &Uuid) -> Result<()> {
        self.directory.delete_assignment(id)
    }

    pub fn toggle_assignment_active(&self, id: &Uuid) -> Result<ApproverAssignment> {
        self.directory.toggle_active(id)
    }

    pub fn list_assignments(&self) -> Result<Vec<ApproverAssignment>> {
        self.directory.list_assignments()
    }

    pub fn resolve_approver(&self, level: ApprovalLevel, workflow_type: WorkflowType) -> Result<ApproverAssignment> {
        self.directory.resolve_approver(level, workflow_type)
    }

    /// Acceso directo al padrón para capas superiores.
    pub fn directory(&self) -> &ApproverDirectory {
        &self.directory
    }
}
