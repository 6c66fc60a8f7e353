// Archivo: directory.rs
// Propósito: padrón de aprobadores. Resuelve qué empleado decide en cada
// nivel de la cadena y expone el CRUD administrativo de asignaciones.
use crate::errors::{FlowError, Result};
use crate::repository::AssignmentStore;
use hr_domain::{ApprovalLevel, ApproverAssignment, AssignmentPatch, EmployeeDirectory, WorkflowType};
use std::sync::Arc;
use uuid::Uuid;

/// Padrón de aprobadores por defecto.
///
/// Una asignación es elegible si ella está activa y el empleado apuntado
/// sigue activo en el padrón de empleados. Al resolver un nivel, una
/// asignación con tipo de workflow exacto gana sobre una genérica; entre
/// iguales gana la principal y luego la más antigua.
pub struct ApproverDirectory {
    assignments: Arc<dyn AssignmentStore>,
    employees: Arc<dyn EmployeeDirectory>,
}

impl ApproverDirectory {
    pub fn new(assignments: Arc<dyn AssignmentStore>, employees: Arc<dyn EmployeeDirectory>) -> Self {
        Self { assignments, employees }
    }

    /// Asignación activa con empleado activo.
    pub fn is_eligible(&self, assignment: &ApproverAssignment) -> Result<bool> {
        if !assignment.is_active {
            return Ok(false);
        }
        Ok(self.employees.is_active(assignment.approver_id)?)
    }

    fn eligible_for(&self, level: ApprovalLevel, workflow_type: WorkflowType) -> Result<Vec<ApproverAssignment>> {
        let mut out = Vec::new();
        for assignment in self.assignments.list_by_level_and_type(level, Some(workflow_type))? {
            if self.is_eligible(&assignment)? {
                out.push(assignment);
            }
        }
        Ok(out)
    }

    /// Resuelve el aprobador de un nivel para un tipo de documento.
    pub fn resolve_approver(&self, level: ApprovalLevel, workflow_type: WorkflowType) -> Result<ApproverAssignment> {
        let mut candidates = self.eligible_for(level, workflow_type)?;
        // tipo exacto antes que genérico, principal antes que secundario,
        // y la más antigua como desempate
        candidates.sort_by(|a, b| {
                      let rank = |x: &ApproverAssignment| (x.workflow_type.is_none(), !x.is_primary, x.created_at);
                      rank(a).cmp(&rank(b))
                  });
        candidates.into_iter().next().ok_or_else(|| {
                                         FlowError::NotFound(format!("sin aprobador elegible para el nivel {} ({}) y tipo {}",
                                                                     level.as_u8(),
                                                                     level.role_name(),
                                                                     workflow_type))
                                     })
    }

    /// Niveles de la cadena que quedarían sin aprobador para este tipo.
    pub fn roles_without_eligible_approver(&self, workflow_type: WorkflowType) -> Result<Vec<ApprovalLevel>> {
        let mut out = Vec::new();
        for level in ApprovalLevel::ALL {
            if self.eligible_for(level, workflow_type)?.is_empty() {
                out.push(level);
            }
        }
        Ok(out)
    }

    /// Asignaciones activas que apuntan a un empleado dado de baja.
    pub fn assignments_with_inactive_employee(&self) -> Result<Vec<ApproverAssignment>> {
        let mut out = Vec::new();
        for assignment in self.assignments.list()? {
            if assignment.is_active && !self.employees.is_active(assignment.approver_id)? {
                out.push(assignment);
            }
        }
        Ok(out)
    }

    // --- CRUD administrativo -------------------------------------------

    pub fn create_assignment(&self, assignment: ApproverAssignment) -> Result<Uuid> {
        self.assignments.insert(assignment)
    }

    pub fn update_assignment(&self, id: &Uuid, patch: AssignmentPatch) -> Result<ApproverAssignment> {
        self.assignments.update(id, patch)
    }

    pub fn delete_assignment(&self, id: &Uuid) -> Result<()> {
        self.assignments.delete(id)
    }

    pub fn get_assignment(&self, id: &Uuid) -> Result<ApproverAssignment> {
        self.assignments.get(id)
    }

    pub fn list_assignments(&self) -> Result<Vec<ApproverAssignment>> {
        self.assignments.list()
    }

    pub fn list_by_level_and_type(&self,
                                  level: ApprovalLevel,
                                  workflow_type: Option<WorkflowType>)
                                  -> Result<Vec<ApproverAssignment>> {
        self.assignments.list_by_level_and_type(level, workflow_type)
    }

    /// Invierte el estado activo de una asignación.
    pub fn toggle_active(&self, id: &Uuid) -> Result<ApproverAssignment> {
        let current = self.assignments.get(id)?;
        let patch = AssignmentPatch { is_active: Some(!current.is_active), ..Default::default() };
        self.assignments.update(id, patch)
    }
}
