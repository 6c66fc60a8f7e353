// Archivo: monitoring.rs
// Propósito: escaneo periódico del padrón de aprobadores. Detecta niveles
// sin aprobador elegible y asignaciones activas que apuntan a empleados
// dados de baja, y despacha alertas con deduplicación por ventana de
// enfriamiento.
use crate::directory::ApproverDirectory;
use crate::domain::{Alert, AlertKind};
use crate::errors::Result;
use crate::repository::{NotificationDispatcher, Recipient};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hr_domain::{ApprovalLevel, WorkflowType};
use std::sync::Arc;

/// Resultado de un escaneo del padrón.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Niveles sin aprobador elegible en al menos un tipo de workflow.
    pub roles_without_approver: Vec<ApprovalLevel>,
    /// Asignaciones activas cuyo empleado está inactivo.
    pub inactive_assignments: Vec<hr_domain::ApproverAssignment>,
    /// Alertas derivadas de lo anterior.
    pub alerts: Vec<Alert>,
}

/// Monitoreo del padrón de aprobadores.
///
/// `scan` es de solo lectura y puede correrse cuantas veces se quiera.
/// `run_check_and_alert` despacha las alertas nuevas; una alerta ya
/// despachada para la misma clave `(clase, nivel)` se suprime hasta que
/// venza la ventana de enfriamiento. Un despacho fallido no se anota en
/// la caché, así el próximo escaneo lo reintenta.
pub struct MonitoringService {
    directory: Arc<ApproverDirectory>,
    notifier: Arc<dyn NotificationDispatcher>,
    cooldown: Duration,
    dispatched: DashMap<(AlertKind, ApprovalLevel), DateTime<Utc>>,
}

impl MonitoringService {
    pub fn new(directory: Arc<ApproverDirectory>, notifier: Arc<dyn NotificationDispatcher>, cooldown: Duration) -> Self {
        Self { directory,
               notifier,
               cooldown,
               dispatched: DashMap::new() }
    }

    /// Recorre el padrón y arma el informe de anomalías, sin despachar.
    pub fn scan(&self) -> Result<ScanReport> {
        let mut orphaned: Vec<ApprovalLevel> = Vec::new();
        for workflow_type in WorkflowType::ALL {
            for level in self.directory.roles_without_eligible_approver(workflow_type)? {
                if !orphaned.contains(&level) {
                    orphaned.push(level);
                }
            }
        }
        orphaned.sort();

        let inactive = self.directory.assignments_with_inactive_employee()?;
        let now = Utc::now();
        let mut alerts = Vec::new();
        for level in &orphaned {
            alerts.push(Alert { kind: AlertKind::RoleWithoutApprover,
                                role_level: *level,
                                role_name: level.role_name().to_string(),
                                affected_assignment: None,
                                detected_at: now });
        }
        for assignment in &inactive {
            alerts.push(Alert { kind: AlertKind::ApproverInactive,
                                role_level: assignment.role_level,
                                role_name: assignment.role_name.clone(),
                                affected_assignment: Some(assignment.id),
                                detected_at: now });
        }
        Ok(ScanReport { roles_without_approver: orphaned,
                        inactive_assignments: inactive,
                        alerts })
    }

    /// Escanea y despacha las alertas fuera de enfriamiento. Devuelve la
    /// cantidad despachada en esta corrida.
    pub fn run_check_and_alert(&self) -> Result<usize> {
        let report = self.scan()?;
        let mut dispatched = 0usize;
        for alert in &report.alerts {
            let key = (alert.kind, alert.role_level);
            let now = Utc::now();
            if let Some(last) = self.dispatched.get(&key) {
                if now - *last < self.cooldown {
                    continue;
                }
            }
            let (title, body) = match alert.kind {
                AlertKind::RoleWithoutApprover => {
                    ("Nivel sin aprobador elegible",
                     format!("El nivel {} ({}) quedó sin ningún aprobador elegible; los flujos que lleguen a ese nivel se estancarán.",
                             alert.role_level.as_u8(),
                             alert.role_name))
                }
                AlertKind::ApproverInactive => {
                    ("Asignación con empleado inactivo",
                     format!("Una asignación activa del nivel {} ({}) apunta a un empleado dado de baja.",
                             alert.role_level.as_u8(),
                             alert.role_name))
                }
            };
            match self.notifier.notify(&Recipient::Role("admin".into()), title, &body) {
                Ok(()) => {
                    self.dispatched.insert(key, now);
                    dispatched += 1;
                }
                Err(e) => {
                    log::warn!("alerta {:?} del nivel {} no despachada: {}; se reintentará en el próximo escaneo",
                               alert.kind,
                               alert.role_level.as_u8(),
                               e);
                }
            }
        }
        Ok(dispatched)
    }
}
