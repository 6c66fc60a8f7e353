use flow::domain::{Actor, DecisionStatus, FlowStatus, HistoryAction};
use flow::errors::FlowError;
use flow::repository::{FlowRepository, HistoryLog, Recipient};
use flow::stubs::{InMemoryFlowRepository, InMemorySubjectStore, RecordingNotifier, StaticAdminOverride,
                  SubjectVerdict};
use flow::TransitionEngine;
use hr_domain::{ApprovalLevel, WorkflowType};
use std::sync::Arc;

struct Fixture {
  repo: Arc<InMemoryFlowRepository>,
  subjects: Arc<InMemorySubjectStore>,
  notifier: Arc<RecordingNotifier>,
  engine: TransitionEngine<InMemoryFlowRepository>,
}

fn fixture_with_admins(admins: &[i64]) -> Fixture {
  let repo = Arc::new(InMemoryFlowRepository::new());
  let subjects = Arc::new(InMemorySubjectStore::new());
  let notifier = Arc::new(RecordingNotifier::new());
  let engine = TransitionEngine::new(repo.clone(),
                                     subjects.clone(),
                                     notifier.clone(),
                                     Arc::new(StaticAdminOverride::new(admins)));
  Fixture { repo, subjects, notifier, engine }
}

fn fixture() -> Fixture {
  fixture_with_admins(&[])
}

fn chain() -> [(i64, String); 4] {
  [(10, "Laura Núñez".into()), (20, "Diego Souza".into()), (30, "Marta Gil".into()), (40, "Raúl Ortega".into())]
}

fn author() -> Actor {
  Actor::new(5, "Pedro Autor", "collaborator")
}

fn approver(level: ApprovalLevel) -> Actor {
  let (id, name) = match level {
    ApprovalLevel::Leader => (10, "Laura Núñez"),
    ApprovalLevel::Specialist => (20, "Diego Souza"),
    ApprovalLevel::Manager => (30, "Marta Gil"),
    ApprovalLevel::Director => (40, "Raúl Ortega"),
  };
  Actor::new(id, name, "approver")
}

#[test]
fn full_lifecycle_approves_subject_42() {
  let f = fixture();
  let flow_id = f.engine.create(42, WorkflowType::JobDescription, chain(), &author()).expect("create");

  f.engine.submit(&flow_id, &author()).expect("submit");
  for level in ApprovalLevel::ALL {
    f.engine.approve(&flow_id, level, &approver(level), None).expect("approve");
  }

  let flow = f.repo.get_flow(&flow_id).expect("get");
  assert_eq!(flow.status, FlowStatus::Approved);
  assert!(flow.completed_at.is_some());
  for slot in &flow.levels {
    assert_eq!(slot.decision, DecisionStatus::Approved);
  }

  // el veredicto se espeja en el documento de origen
  let verdict = f.subjects.verdict_of(WorkflowType::JobDescription, 42).expect("verdict");
  assert_eq!(verdict, Some(SubjectVerdict::Approved));

  // historial ascendente: created, submitted y una aprobación por nivel
  let history = f.repo.list_by_flow(&flow_id).expect("history");
  let actions: Vec<HistoryAction> = history.iter().map(|e| e.action).collect();
  assert_eq!(actions,
             vec![HistoryAction::Created,
                  HistoryAction::Submitted,
                  HistoryAction::Approved,
                  HistoryAction::Approved,
                  HistoryAction::Approved,
                  HistoryAction::Approved]);
  assert_eq!(history[2].level, 1);
  assert_eq!(history[5].level, 4);
  for pair in history.windows(2) {
    assert!(pair[0].created_at <= pair[1].created_at);
  }

  // se notificó a cada nivel siguiente y al autor al cierre
  let sent = f.notifier.sent().expect("sent");
  assert_eq!(sent.len(), 5);
  assert_eq!(sent[0].recipient, Recipient::Employee(10));
  assert_eq!(sent[4].recipient, Recipient::Employee(5));
}

#[test]
fn rejection_midway_closes_subject_42() {
  let f = fixture();
  let flow_id = f.engine.create(42, WorkflowType::JobDescription, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");
  f.engine.approve(&flow_id, ApprovalLevel::Leader, &approver(ApprovalLevel::Leader), None).expect("L1");

  let flow = f.engine
              .reject(&flow_id, ApprovalLevel::Specialist, &approver(ApprovalLevel::Specialist),
                      "falta la justificación presupuestaria")
              .expect("reject");
  assert_eq!(flow.status, FlowStatus::Rejected);
  assert_eq!(flow.level(ApprovalLevel::Leader).decision, DecisionStatus::Approved);
  assert_eq!(flow.level(ApprovalLevel::Specialist).decision, DecisionStatus::Rejected);

  let verdict = f.subjects.verdict_of(WorkflowType::JobDescription, 42).expect("verdict");
  assert_eq!(verdict, Some(SubjectVerdict::Rejected));

  let actions: Vec<HistoryAction> = f.repo.list_by_flow(&flow_id).expect("history").iter().map(|e| e.action).collect();
  assert_eq!(actions,
             vec![HistoryAction::Created, HistoryAction::Submitted, HistoryAction::Approved, HistoryAction::Rejected]);

  // terminal: ninguna transición posterior se acepta
  assert!(f.engine.submit(&flow_id, &author()).is_err());
  assert!(f.engine.approve(&flow_id, ApprovalLevel::Specialist, &approver(ApprovalLevel::Specialist), None).is_err());
}

#[test]
fn one_open_flow_per_subject() {
  let f = fixture();
  f.engine.create(7, WorkflowType::Goal, chain(), &author()).expect("create");
  let dup = f.engine.create(7, WorkflowType::Goal, chain(), &author());
  assert!(matches!(dup, Err(FlowError::Conflict(_))));

  // otro tipo de workflow no choca
  f.engine.create(7, WorkflowType::Bonus, chain(), &author()).expect("otro tipo");
}

#[test]
fn terminal_flow_frees_the_subject() {
  let f = fixture();
  let flow_id = f.engine.create(8, WorkflowType::Goal, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");
  f.engine
   .reject(&flow_id, ApprovalLevel::Leader, &approver(ApprovalLevel::Leader), "presupuesto mal calculado")
   .expect("reject");

  // el flujo rechazado es terminal; el sujeto puede abrir otro
  f.engine.create(8, WorkflowType::Goal, chain(), &author()).expect("create de nuevo");
}

#[test]
fn submit_only_from_draft_or_returned() {
  let f = fixture();
  let flow_id = f.engine.create(1, WorkflowType::Goal, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");
  let again = f.engine.submit(&flow_id, &author());
  assert!(matches!(again, Err(FlowError::InvalidState(_))));
}

#[test]
fn approve_out_of_turn_is_invalid_state() {
  let f = fixture();
  let flow_id = f.engine.create(2, WorkflowType::Goal, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");

  // el turno es del nivel 1; el nivel 2 no puede decidir todavía
  let early = f.engine.approve(&flow_id, ApprovalLevel::Specialist, &approver(ApprovalLevel::Specialist), None);
  assert!(matches!(early, Err(FlowError::InvalidState(_))));
}

#[test]
fn wrong_actor_is_forbidden_but_admin_passes() {
  let f = fixture_with_admins(&[99]);
  let flow_id = f.engine.create(3, WorkflowType::Goal, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");

  let intruder = Actor::new(77, "Otro", "collaborator");
  let res = f.engine.approve(&flow_id, ApprovalLevel::Leader, &intruder, None);
  assert!(matches!(res, Err(FlowError::Forbidden(_))));

  let admin = Actor::new(99, "Admin", "admin");
  f.engine.approve(&flow_id, ApprovalLevel::Leader, &admin, None).expect("admin decide fuera de turno");
}

#[test]
fn reject_and_send_back_require_substantive_comments() {
  let f = fixture();
  let flow_id = f.engine.create(4, WorkflowType::Goal, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");

  let leader = approver(ApprovalLevel::Leader);
  assert!(matches!(f.engine.reject(&flow_id, ApprovalLevel::Leader, &leader, "corto"),
                   Err(FlowError::Validation(_))));
  assert!(matches!(f.engine.send_back(&flow_id, ApprovalLevel::Leader, &leader, "   nueve!  "),
                   Err(FlowError::Validation(_))));

  // la validación no tocó el estado
  let flow = f.repo.get_flow(&flow_id).expect("get");
  assert_eq!(flow.status, FlowStatus::PendingL1);
}

#[test]
fn send_back_and_resubmit_clears_previous_decisions() {
  let f = fixture();
  let flow_id = f.engine.create(5, WorkflowType::Calibration, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");
  f.engine.approve(&flow_id, ApprovalLevel::Leader, &approver(ApprovalLevel::Leader), None).expect("L1");
  f.engine
   .send_back(&flow_id, ApprovalLevel::Specialist, &approver(ApprovalLevel::Specialist), "faltan las metas del Q3")
   .expect("devolver");

  let flow = f.repo.get_flow(&flow_id).expect("get");
  assert_eq!(flow.status, FlowStatus::Returned);
  // la decisión del nivel 1 sigue visible mientras está devuelto
  assert_eq!(flow.level(ApprovalLevel::Leader).decision, DecisionStatus::Approved);

  let resubmitted = f.engine.submit(&flow_id, &author()).expect("reenviar");
  assert_eq!(resubmitted.status, FlowStatus::PendingL1);
  for slot in &resubmitted.levels {
    assert_eq!(slot.decision, DecisionStatus::Pending);
    assert!(slot.comments.is_none());
  }

  let history = f.repo.list_by_flow(&flow_id).expect("history");
  assert_eq!(history.last().map(|e| e.action), Some(HistoryAction::Resubmitted));
  // la devolución quedó en la bitácora aunque la casilla se limpió
  assert!(history.iter().any(|e| e.action == HistoryAction::Returned));
}

#[test]
fn concurrent_approvals_advance_only_once() {
  use std::thread;

  let f = fixture();
  let flow_id = f.engine.create(6, WorkflowType::Goal, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");

  let engine = Arc::new(f.engine);
  let mut handles = Vec::new();
  for _ in 0..2 {
    let engine = engine.clone();
    handles.push(thread::spawn(move || {
                   engine.approve(&flow_id, ApprovalLevel::Leader, &approver(ApprovalLevel::Leader), None)
                 }));
  }
  let results: Vec<_> = handles.into_iter().map(|h| h.join().expect("join")).collect();

  let oks = results.iter().filter(|r| r.is_ok()).count();
  assert_eq!(oks, 1);
  assert!(results.iter()
                 .filter(|r| r.is_err())
                 .all(|r| matches!(r, Err(FlowError::InvalidState(_)))));

  // el flujo avanzó exactamente un nivel y hay una sola aprobación anotada
  let flow = f.repo.get_flow(&flow_id).expect("get");
  assert_eq!(flow.status, FlowStatus::PendingL2);
  let approvals = f.repo
                   .list_by_flow(&flow_id)
                   .expect("history")
                   .iter()
                   .filter(|e| e.action == HistoryAction::Approved)
                   .count();
  assert_eq!(approvals, 1);
}

#[test]
fn notifier_failure_does_not_block_transitions() {
  let f = fixture();
  f.notifier.set_failing(true);
  let flow_id = f.engine.create(9, WorkflowType::Goal, chain(), &author()).expect("create");
  let flow = f.engine.submit(&flow_id, &author()).expect("submit pese al canal caído");
  assert_eq!(flow.status, FlowStatus::PendingL1);
}

#[test]
fn subject_store_failure_does_not_revert_final_approval() {
  let f = fixture();
  let flow_id = f.engine.create(11, WorkflowType::Goal, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");
  for level in [ApprovalLevel::Leader, ApprovalLevel::Specialist, ApprovalLevel::Manager] {
    f.engine.approve(&flow_id, level, &approver(level), None).expect("approve");
  }

  f.subjects.set_failing(true);
  let flow = f.engine
              .approve(&flow_id, ApprovalLevel::Director, &approver(ApprovalLevel::Director), None)
              .expect("la transición se confirma aunque el espejo falle");
  assert_eq!(flow.status, FlowStatus::Approved);
}

#[test]
fn history_range_filters_by_date() {
  use chrono::{Duration, Utc};
  use flow::domain::DateRange;

  let f = fixture();
  let flow_id = f.engine.create(13, WorkflowType::Goal, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");

  let all = f.repo.list_range(&DateRange::all()).expect("rango completo");
  assert_eq!(all.len(), 2);

  let future = DateRange { start: Some(Utc::now() + Duration::days(1)), end: None };
  assert!(f.repo.list_range(&future).expect("rango futuro").is_empty());
}

#[test]
fn pending_inbox_follows_the_turn() {
  let f = fixture();
  let flow_id = f.engine.create(12, WorkflowType::Goal, chain(), &author()).expect("create");
  f.engine.submit(&flow_id, &author()).expect("submit");

  assert_eq!(f.repo.list_pending_for(10).expect("inbox L1").len(), 1);
  assert!(f.repo.list_pending_for(20).expect("inbox L2").is_empty());

  f.engine.approve(&flow_id, ApprovalLevel::Leader, &approver(ApprovalLevel::Leader), None).expect("L1");
  assert!(f.repo.list_pending_for(10).expect("inbox L1").is_empty());
  assert_eq!(f.repo.list_pending_for(20).expect("inbox L2").len(), 1);
}
