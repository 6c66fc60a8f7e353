use chrono::{Duration, Utc};
use flow::analytics::AnalyticsService;
use flow::domain::{Actor, ApprovalFlow, DateRange, DecisionStatus, FlowStatus, HistoryAction, HistoryEntry,
                   SYSTEM_LEVEL, SYSTEM_LEVEL_NAME};
use flow::repository::FlowRepository;
use flow::stubs::InMemoryFlowRepository;
use hr_domain::{ApprovalLevel, WorkflowType};
use std::sync::Arc;

const MS_2_4_DAYS: i64 = 207_360_000;

fn chain() -> [(i64, String); 4] {
  [(10, "Laura".into()), (20, "Diego".into()), (30, "Marta".into()), (40, "Raúl".into())]
}

fn insert(repo: &InMemoryFlowRepository, flow: ApprovalFlow) {
  let actor = Actor::new(flow.submitted_by, "Autor", "collaborator");
  let entry = HistoryEntry::new(flow.id, flow.subject_id, HistoryAction::Created, SYSTEM_LEVEL, SYSTEM_LEVEL_NAME,
                                &actor, None);
  repo.insert_flow(flow, entry).expect("insert");
}

/// Arma el escenario: un flujo aprobado, uno rechazado y tres pendientes
/// estancados 10, 7 y 3 días.
fn seeded_repo() -> Arc<InMemoryFlowRepository> {
  let repo = Arc::new(InMemoryFlowRepository::new());
  let now = Utc::now();

  // aprobado: duró 2,4 días de punta a punta
  let mut approved = ApprovalFlow::new(100, WorkflowType::JobDescription, chain(), 5);
  approved.created_at = now - Duration::milliseconds(MS_2_4_DAYS);
  approved.status = FlowStatus::Approved;
  approved.completed_at = Some(now);
  let offsets = [Duration::milliseconds(129_600_000), // 1,5 días
                 Duration::days(2),
                 Duration::milliseconds(216_000_000), // 2,5 días
                 Duration::milliseconds(MS_2_4_DAYS)];
  for (slot, offset) in approved.levels.iter_mut().zip(offsets) {
    slot.decision = DecisionStatus::Approved;
    slot.decided_at = Some(approved.created_at + offset);
  }
  insert(&repo, approved);

  // rechazado en el nivel 2; el nivel 1 había aprobado a las 12 horas
  let mut rejected = ApprovalFlow::new(101, WorkflowType::JobDescription, chain(), 5);
  rejected.created_at = now - Duration::days(5);
  rejected.status = FlowStatus::Rejected;
  rejected.completed_at = Some(now - Duration::days(4));
  rejected.levels[0].decision = DecisionStatus::Approved;
  rejected.levels[0].decided_at = Some(rejected.created_at + Duration::hours(12));
  rejected.levels[1].decision = DecisionStatus::Rejected;
  rejected.levels[1].decided_at = Some(rejected.created_at + Duration::days(1));
  insert(&repo, rejected);

  // pendientes estancados: (sujeto, días de espera, estado)
  let stuck = [(102, 10, FlowStatus::PendingL2), (103, 7, FlowStatus::PendingL1), (104, 3, FlowStatus::PendingL3)];
  for (subject_id, days, status) in stuck {
    let mut flow = ApprovalFlow::new(subject_id, WorkflowType::Goal, chain(), 5);
    flow.created_at = now - Duration::days(days);
    flow.status = status;
    flow.submitted_at = Some(flow.created_at);
    insert(&repo, flow);
  }

  repo
}

#[test]
fn kpis_count_outcomes_and_round_avg_days() {
  let repo = seeded_repo();
  let analytics = AnalyticsService::new(repo);

  let kpis = analytics.kpis(&DateRange::all(), None).expect("kpis");
  assert_eq!(kpis.totals.total, 5);
  assert_eq!(kpis.totals.approved, 1);
  assert_eq!(kpis.totals.rejected, 1);
  assert_eq!(kpis.totals.pending, 3);
  // 2,4 días redondeados a días enteros para presentación
  assert_eq!(kpis.avg_response_time_days, 2);

  let jd = kpis.by_type.get("job_description").expect("jd");
  assert_eq!(jd.total, 2);
  assert_eq!(jd.approved, 1);
  let goals = kpis.by_type.get("goal").expect("goal");
  assert_eq!(goals.pending, 3);
}

#[test]
fn kpis_respect_type_and_range_filters() {
  let repo = seeded_repo();
  let analytics = AnalyticsService::new(repo);

  let only_goals = analytics.kpis(&DateRange::all(), Some(WorkflowType::Goal)).expect("goals");
  assert_eq!(only_goals.totals.total, 3);
  assert_eq!(only_goals.avg_response_time_days, 0);

  // un rango que deja fuera los flujos más viejos
  let recent = DateRange { start: Some(Utc::now() - Duration::days(4)), end: None };
  let kpis = analytics.kpis(&recent, None).expect("recent");
  assert_eq!(kpis.totals.total, 2); // el aprobado (2,4 días) y el estancado de 3 días
}

#[test]
fn by_approver_ranks_by_total_volume() {
  let repo = seeded_repo();
  let analytics = AnalyticsService::new(repo);

  let stats = analytics.by_approver(&DateRange::all(), 10).expect("stats");
  assert_eq!(stats.len(), 4);

  // 10 y 20 empatan con 3 decisiones/turnos; luego 30 y al final 40
  assert_eq!(stats[0].total, 3);
  assert_eq!(stats[1].total, 3);
  let top_ids: Vec<i64> = stats[..2].iter().map(|s| s.approver_id).collect();
  assert!(top_ids.contains(&10) && top_ids.contains(&20));
  assert_eq!(stats[2].approver_id, 30);
  assert_eq!(stats[2].total, 2);
  assert_eq!(stats[3].approver_id, 40);
  assert_eq!(stats[3].total, 1);

  let ten = stats.iter().find(|s| s.approver_id == 10).expect("10");
  assert_eq!(ten.approved, 2);
  assert_eq!(ten.pending, 1);
  let twenty = stats.iter().find(|s| s.approver_id == 20).expect("20");
  assert_eq!(twenty.rejected, 1);
}

#[test]
fn by_approver_truncates_to_limit() {
  let repo = seeded_repo();
  let analytics = AnalyticsService::new(repo);
  let stats = analytics.by_approver(&DateRange::all(), 2).expect("stats");
  assert_eq!(stats.len(), 2);
}

#[test]
fn response_time_averages_round_to_one_decimal() {
  let repo = seeded_repo();
  let analytics = AnalyticsService::new(repo);

  let times = analytics.avg_response_time_by_approver(&DateRange::all(), 10).expect("times");
  // el aprobador 10 tiene dos aprobaciones (1,5 y 0,5 días) y encabeza
  assert_eq!(times[0].approver_id, 10);
  assert_eq!(times[0].total_approvals, 2);
  assert!((times[0].avg_response_time_days - 1.0).abs() < f64::EPSILON);

  let thirty = times.iter().find(|t| t.approver_id == 30).expect("30");
  assert!((thirty.avg_response_time_days - 2.5).abs() < f64::EPSILON);
}

#[test]
fn bottlenecks_order_by_exact_days_waiting() {
  let repo = seeded_repo();
  let analytics = AnalyticsService::new(repo);

  let bottlenecks = analytics.bottlenecks(10).expect("bottlenecks");
  assert_eq!(bottlenecks.len(), 3);
  let subjects: Vec<i64> = bottlenecks.iter().map(|b| b.subject_id).collect();
  assert_eq!(subjects, vec![102, 103, 104]);
  assert!((bottlenecks[0].days_waiting - 10.0).abs() < 0.1);
  assert!((bottlenecks[2].days_waiting - 3.0).abs() < 0.1);
  // cada entrada apunta a la casilla con el turno
  assert_eq!(bottlenecks[0].level, ApprovalLevel::Specialist);
  assert_eq!(bottlenecks[0].approver_id, 20);

  let top_two = analytics.bottlenecks(2).expect("limit");
  assert_eq!(top_two.len(), 2);
}
