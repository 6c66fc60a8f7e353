use flow::domain::Actor;
use flow::repository::{FlowRepository, HistoryLog};
use flow::ApprovalService;
use hr_domain::ApprovalLevel;
use uuid::Uuid;

/// Resultado de un procesamiento por lotes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
  pub approved: usize,
  pub failed: usize,
  /// Flujos que fallaron, con el mensaje del error.
  pub errors: Vec<(Uuid, String)>,
}

/// Aprueba un lote de flujos en el mismo nivel, tolerando fallas por
/// ítem: un flujo que no está en turno o no autoriza al actor se anota
/// como fallido y el lote continúa.
pub fn batch_approve<R>(service: &ApprovalService<R>,
                        flow_ids: &[Uuid],
                        level: ApprovalLevel,
                        actor: &Actor,
                        comments: Option<String>)
                        -> BatchOutcome
  where R: FlowRepository + HistoryLog + 'static
{
  let mut outcome = BatchOutcome::default();
  for flow_id in flow_ids {
    match service.approve(flow_id, level, actor, comments.clone()) {
      Ok(_) => outcome.approved += 1,
      Err(e) => {
        log::warn!("aprobación en lote: el flujo {} falló: {}", flow_id, e);
        outcome.failed += 1;
        outcome.errors.push((*flow_id, e.to_string()));
      }
    }
  }
  outcome
}
