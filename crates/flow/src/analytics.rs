// Archivo: analytics.rs
// Propósito: consultas analíticas sobre los flujos: KPIs globales,
// consolidado por aprobador, tiempos de respuesta y cuellos de botella.
// Todas las duraciones se calculan en días como milisegundos / 86 400 000;
// el redondeo se aplica solo al presentar, nunca antes de ordenar.
use crate::domain::{ApprovalFlow, DateRange, DecisionStatus, FlowStatus};
use crate::errors::Result;
use crate::repository::FlowRepository;
use chrono::{DateTime, Utc};
use hr_domain::{ApprovalLevel, WorkflowType};
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

const MS_PER_DAY: f64 = 86_400_000.0;

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

/// Conteo de flujos por desenlace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
}

impl StatusCounts {
    fn add(&mut self, status: FlowStatus) {
        self.total += 1;
        match status {
            FlowStatus::Approved => self.approved += 1,
            FlowStatus::Rejected => self.rejected += 1,
            _ => self.pending += 1,
        }
    }
}

/// Indicadores globales del período consultado.
#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
    pub totals: StatusCounts,
    /// Promedio de días entre creación y aprobación final, redondeado a
    /// días enteros para presentación.
    pub avg_response_time_days: i64,
    /// Desglose por tipo de workflow, en orden de primera aparición.
    pub by_type: IndexMap<String, StatusCounts>,
}

/// Consolidado de decisiones de un aprobador.
#[derive(Debug, Clone, Serialize)]
pub struct ApproverStats {
    pub approver_id: i64,
    pub approver_name: String,
    pub total: u64,
    pub approved: u64,
    pub rejected: u64,
    pub pending: u64,
}

/// Tiempo medio de respuesta de un aprobador.
#[derive(Debug, Clone, Serialize)]
pub struct ApproverResponseTime {
    pub approver_id: i64,
    pub approver_name: String,
    /// Promedio en días, redondeado a un decimal para presentación.
    pub avg_response_time_days: f64,
    pub total_approvals: u64,
}

/// Flujo estancado en un nivel, con su espera acumulada.
#[derive(Debug, Clone, Serialize)]
pub struct Bottleneck {
    pub flow_id: Uuid,
    pub subject_id: i64,
    pub workflow_type: WorkflowType,
    pub level: ApprovalLevel,
    pub level_name: String,
    pub approver_id: i64,
    pub approver_name: String,
    pub created_at: DateTime<Utc>,
    /// Días de espera sin redondear; el orden del informe depende de este
    /// valor exacto.
    pub days_waiting: f64,
}

/// Consultas analíticas sobre el almacén de flujos.
pub struct AnalyticsService<R>
    where R: FlowRepository
{
    repo: Arc<R>,
}

impl<R> AnalyticsService<R> where R: FlowRepository
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    fn flows_in(&self, range: &DateRange, workflow_type: Option<WorkflowType>) -> Result<Vec<ApprovalFlow>> {
        Ok(self.repo
               .list_flows()?
               .into_iter()
               .filter(|f| range.contains(f.created_at))
               .filter(|f| workflow_type.map(|t| f.workflow_type == t).unwrap_or(true))
               .collect())
    }

    /// KPIs del período: totales por desenlace, promedio de días hasta la
    /// aprobación y desglose por tipo.
    pub fn kpis(&self, range: &DateRange, workflow_type: Option<WorkflowType>) -> Result<Kpis> {
        let flows = self.flows_in(range, workflow_type)?;
        let mut totals = StatusCounts::default();
        let mut by_type: IndexMap<String, StatusCounts> = IndexMap::new();
        for flow in &flows {
            totals.add(flow.status);
            by_type.entry(flow.workflow_type.to_string())
                   .or_default()
                   .add(flow.status);
        }
        let durations: Vec<f64> = flows.iter()
                                       .filter(|f| f.status == FlowStatus::Approved)
                                       .filter_map(|f| f.completed_at.map(|done| days_between(f.created_at, done)))
                                       .collect();
        let avg_response_time_days = if durations.is_empty() {
            0
        } else {
            (durations.iter().sum::<f64>() / durations.len() as f64).round() as i64
        };
        Ok(Kpis { totals, avg_response_time_days, by_type })
    }

    /// Consolidado por aprobador, ordenado por volumen total descendente.
    /// Cuenta decisiones emitidas más la casilla con el turno actual.
    pub fn by_approver(&self, range: &DateRange, limit: usize) -> Result<Vec<ApproverStats>> {
        let flows = self.flows_in(range, None)?;
        let mut map: IndexMap<i64, ApproverStats> = IndexMap::new();
        for flow in &flows {
            let turn = flow.pending_level();
            for (idx, slot) in flow.levels.iter().enumerate() {
                let has_turn = turn.map(|l| l.index() == idx).unwrap_or(false);
                let (approved, rejected, pending) = match slot.decision {
                    DecisionStatus::Approved => (1, 0, 0),
                    DecisionStatus::Rejected => (0, 1, 0),
                    DecisionStatus::Returned => (0, 0, 0),
                    DecisionStatus::Pending if has_turn => (0, 0, 1),
                    DecisionStatus::Pending => continue,
                };
                let stats = map.entry(slot.approver_id)
                               .or_insert_with(|| ApproverStats { approver_id: slot.approver_id,
                                                                  approver_name: slot.approver_name.clone(),
                                                                  total: 0,
                                                                  approved: 0,
                                                                  rejected: 0,
                                                                  pending: 0 });
                stats.total += 1;
                stats.approved += approved;
                stats.rejected += rejected;
                stats.pending += pending;
            }
        }
        let mut out: Vec<ApproverStats> = map.into_values().collect();
        out.sort_by(|a, b| b.total.cmp(&a.total));
        out.truncate(limit);
        Ok(out)
    }

    /// Tiempo medio entre la creación del flujo y cada aprobación emitida,
    /// por aprobador, ordenado por cantidad de aprobaciones.
    pub fn avg_response_time_by_approver(&self, range: &DateRange, limit: usize) -> Result<Vec<ApproverResponseTime>> {
        let flows = self.flows_in(range, None)?;
        let mut samples: IndexMap<i64, (String, Vec<f64>)> = IndexMap::new();
        for flow in &flows {
            for slot in &flow.levels {
                if slot.decision != DecisionStatus::Approved {
                    continue;
                }
                if let Some(decided) = slot.decided_at {
                    let entry = samples.entry(slot.approver_id)
                                       .or_insert_with(|| (slot.approver_name.clone(), Vec::new()));
                    entry.1.push(days_between(flow.created_at, decided));
                }
            }
        }
        let mut out: Vec<ApproverResponseTime> =
            samples.into_iter()
                   .map(|(approver_id, (approver_name, days))| {
                       let avg = days.iter().sum::<f64>() / days.len() as f64;
                       ApproverResponseTime { approver_id,
                                              approver_name,
                                              avg_response_time_days: (avg * 10.0).round() / 10.0,
                                              total_approvals: days.len() as u64 }
                   })
                   .collect();
        out.sort_by(|a, b| b.total_approvals.cmp(&a.total_approvals));
        out.truncate(limit);
        Ok(out)
    }

    /// Flujos con decisión pendiente, del más estancado al más reciente.
    pub fn bottlenecks(&self, limit: usize) -> Result<Vec<Bottleneck>> {
        let now = Utc::now();
        let mut out: Vec<Bottleneck> = self.repo
                                           .list_flows()?
                                           .into_iter()
                                           .filter_map(|flow| {
                                               let level = flow.pending_level()?;
                                               let slot = flow.level(level);
                                               Some(Bottleneck { flow_id: flow.id,
                                                                 subject_id: flow.subject_id,
                                                                 workflow_type: flow.workflow_type,
                                                                 level,
                                                                 level_name: level.role_name().to_string(),
                                                                 approver_id: slot.approver_id,
                                                                 approver_name: slot.approver_name.clone(),
                                                                 created_at: flow.created_at,
                                                                 days_waiting: days_between(flow.created_at, now) })
                                           })
                                           .collect();
        out.sort_by(|a, b| b.days_waiting.total_cmp(&a.days_waiting));
        out.truncate(limit);
        Ok(out)
    }
}
