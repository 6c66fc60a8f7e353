use flow::domain::Actor;
use flow::errors::FlowError;
use flow::stubs::{InMemoryFlowRepository, InMemorySubjectStore, RecordingNotifier, StaticAdminOverride};
use flow::TransitionEngine;
use hr_domain::{ApprovalLevel, WorkflowType};
use std::sync::Arc;

fn main() -> Result<(), FlowError> {
    // Repo y colaboradores en memoria
    let repo = Arc::new(InMemoryFlowRepository::new());
    let subjects = Arc::new(InMemorySubjectStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let engine = TransitionEngine::new(repo.clone(), subjects, notifier.clone(), Arc::new(StaticAdminOverride::none()));

    // Crear el flujo del sujeto 42 con su cadena de aprobadores
    let author = Actor::new(5, "Pedro Autor", "collaborator");
    let chain = [(10, "Laura Núñez".to_string()),
                 (20, "Diego Souza".to_string()),
                 (30, "Marta Gil".to_string()),
                 (40, "Raúl Ortega".to_string())];
    let flow_id = engine.create(42, WorkflowType::JobDescription, chain, &author)?;
    println!("flujo creado {}\n", flow_id);

    // Someter y recorrer los cuatro niveles
    let flow = engine.submit(&flow_id, &author)?;
    println!("sometido; estado: {}", flow.status);
    for level in ApprovalLevel::ALL {
        let slot_id = flow.level(level).approver_id;
        let approver = Actor::new(slot_id, &format!("Aprobador {}", slot_id), "approver");
        let updated = engine.approve(&flow_id, level, &approver, None)?;
        println!("nivel {} aprobado; estado: {}", level.as_u8(), updated.status);
    }

    // Las notificaciones emitidas durante el recorrido
    for sent in notifier.sent()? {
        println!("notificado {:?}: {}", sent.recipient, sent.title);
    }

    Ok(())
}
