use chrono::Duration;
use flow::domain::{Actor, DateRange};
use flow::stubs::{InMemoryAssignmentStore, InMemoryFlowRepository, InMemorySubjectStore, RecordingNotifier,
                  StaticAdminOverride};
use flow::{ApprovalService, ApproverDirectory, MonitoringService};
use hr_domain::{ApprovalLevel, Employee, InMemoryEmployeeDirectory, WorkflowType};
use hr_workflow::ApprovalWorkflowFactory;
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;
use uuid::Uuid;

/// Pequeño menú interactivo para operar el motor de aprobaciones sobre
/// el stack en memoria.
///
/// Opciones soportadas:
/// 1) Ver flujos
/// 2) Crear flujo para un sujeto
/// 3) Someter flujo
/// 4) Aprobar nivel
/// 5) Rechazar / devolver
/// 6) Ver historial de un flujo
/// 7) KPIs y cuellos de botella
/// 8) Escanear el padrón (monitoreo)
/// 9) Salir
fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let repo = Arc::new(InMemoryFlowRepository::new());
    let employees = Arc::new(InMemoryEmployeeDirectory::new());
    seed_employees(&employees)?;
    let directory = Arc::new(ApproverDirectory::new(Arc::new(InMemoryAssignmentStore::new()), employees.clone()));
    let notifier = Arc::new(RecordingNotifier::new());
    let admin_ids = admin_ids_from_env();
    let service = Arc::new(ApprovalService::new(repo,
                                                directory.clone(),
                                                Arc::new(InMemorySubjectStore::new()),
                                                notifier.clone(),
                                                Arc::new(StaticAdminOverride::new(&admin_ids))));
    let factory = ApprovalWorkflowFactory::new(service.clone());
    factory.initialize_default_assignments(&[(ApprovalLevel::Specialist, 20, "Diego Souza"),
                                             (ApprovalLevel::Manager, 30, "Marta Gil"),
                                             (ApprovalLevel::Director, 40, "Raúl Ortega")])
           .map_err(|e| Box::new(e) as Box<dyn Error>)?;
    let monitoring = MonitoringService::new(directory, notifier, cooldown_from_env());

    loop {
        println!("\n== Aprobaciones CLI ==");
        println!("1) Ver flujos");
        println!("2) Crear flujo para un sujeto");
        println!("3) Someter flujo");
        println!("4) Aprobar nivel");
        println!("5) Rechazar / devolver");
        println!("6) Ver historial de un flujo");
        println!("7) KPIs y cuellos de botella");
        println!("8) Escanear el padrón (monitoreo)");
        println!("9) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => {
                match service.list_flows() {
                    Ok(mut flows) => {
                        flows.sort_by_key(|f| f.created_at);
                        for f in flows {
                            println!("{} | sujeto {} | {} | {}", f.id, f.subject_id, f.workflow_type, f.status);
                        }
                    }
                    Err(e) => eprintln!("Error listando flujos: {}", e),
                }
            }
            "2" => {
                let subject_s = prompt("Id del sujeto (número): ")?;
                let subject_id: i64 = match subject_s.trim().parse() {
                    Ok(n) => n,
                    Err(_) => { eprintln!("Id inválido"); continue; }
                };
                let wt = match prompt_workflow_type()? {
                    Some(wt) => wt,
                    None => continue,
                };
                let leader_s = prompt("Id del líder inmediato: ")?;
                let leader_id: i64 = match leader_s.trim().parse() {
                    Ok(n) => n,
                    Err(_) => { eprintln!("Id inválido"); continue; }
                };
                let leader_name = prompt("Nombre del líder inmediato: ")?;
                let creator = Actor::new(subject_id, "colaborador", "collaborator");
                match factory.create_for_subject(subject_id, wt, leader_id, leader_name.trim(), &creator) {
                    Ok(id) => println!("Flujo creado: {}", id),
                    Err(e) => eprintln!("Error creando flujo: {}", e),
                }
            }
            "3" => {
                let (flow_id, actor) = match prompt_flow_and_actor()? {
                    Some(v) => v,
                    None => continue,
                };
                match service.submit(&flow_id, &actor) {
                    Ok(f) => println!("Flujo sometido; estado: {}", f.status),
                    Err(e) => eprintln!("Error al someter: {}", e),
                }
            }
            "4" => {
                let (flow_id, actor) = match prompt_flow_and_actor()? {
                    Some(v) => v,
                    None => continue,
                };
                let level = match prompt_level()? {
                    Some(l) => l,
                    None => continue,
                };
                let comments = prompt("Comentarios (enter para ninguno): ")?;
                let comments = if comments.trim().is_empty() { None } else { Some(comments.trim().to_string()) };
                match service.approve(&flow_id, level, &actor, comments) {
                    Ok(f) => println!("Aprobado; estado: {}", f.status),
                    Err(e) => eprintln!("Error al aprobar: {}", e),
                }
            }
            "5" => {
                let (flow_id, actor) = match prompt_flow_and_actor()? {
                    Some(v) => v,
                    None => continue,
                };
                let level = match prompt_level()? {
                    Some(l) => l,
                    None => continue,
                };
                let verb = prompt("'r' para rechazar, 'd' para devolver: ")?;
                let comments = prompt("Motivo (mínimo 10 caracteres): ")?;
                let res = match verb.trim() {
                    "r" => service.reject(&flow_id, level, &actor, comments.trim()),
                    "d" => service.send_back(&flow_id, level, &actor, comments.trim()),
                    other => { eprintln!("Opción inválida: {}", other); continue; }
                };
                match res {
                    Ok(f) => println!("Listo; estado: {}", f.status),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            "6" => {
                let id_s = prompt("Id del flujo (UUID): ")?;
                let flow_id = match Uuid::parse_str(id_s.trim()) {
                    Ok(u) => u,
                    Err(_) => { eprintln!("UUID inválido"); continue; }
                };
                match service.get_history(&flow_id) {
                    Ok(entries) => {
                        for e in entries {
                            let comments = e.comments.unwrap_or_else(|| "-".into());
                            println!("{} | {} | nivel {} ({}) | {} | {}",
                                     e.created_at, e.action, e.level, e.level_name, e.actor_name, comments);
                        }
                    }
                    Err(e) => eprintln!("Error listando historial: {}", e),
                }
            }
            "7" => {
                match service.kpis(&DateRange::all(), None) {
                    Ok(kpis) => {
                        println!("Total: {} | pendientes: {} | aprobados: {} | rechazados: {}",
                                 kpis.totals.total, kpis.totals.pending, kpis.totals.approved, kpis.totals.rejected);
                        println!("Tiempo medio de respuesta: {} días", kpis.avg_response_time_days);
                    }
                    Err(e) => eprintln!("Error calculando KPIs: {}", e),
                }
                match service.bottlenecks(5) {
                    Ok(list) => {
                        for b in list {
                            println!("sujeto {} | {} | {} | {:.1} días esperando a {}",
                                     b.subject_id, b.workflow_type, b.level_name, b.days_waiting, b.approver_name);
                        }
                    }
                    Err(e) => eprintln!("Error calculando cuellos de botella: {}", e),
                }
            }
            "8" => {
                match monitoring.run_check_and_alert() {
                    Ok(count) => println!("Escaneo completo; alertas despachadas: {}", count),
                    Err(e) => eprintln!("Error en el escaneo: {}", e),
                }
            }
            "9" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn seed_employees(employees: &InMemoryEmployeeDirectory) -> Result<(), Box<dyn Error>> {
    let seed = [(10, "Laura Núñez", "leader"),
                (20, "Diego Souza", "specialist"),
                (30, "Marta Gil", "manager"),
                (40, "Raúl Ortega", "director")];
    for (id, name, role) in seed {
        employees.upsert(Employee::new(id, name, role)?)?;
    }
    Ok(())
}

/// Ventana de enfriamiento de alertas, en minutos (MONITOR_COOLDOWN_MINUTES).
fn cooldown_from_env() -> Duration {
    let minutes = std::env::var("MONITOR_COOLDOWN_MINUTES")
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(60);
    Duration::minutes(minutes)
}

/// Ids con potestad de admin, separados por coma (ADMIN_IDS).
fn admin_ids_from_env() -> Vec<i64> {
    std::env::var("ADMIN_IDS")
        .ok()
        .map(|v| v.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default()
}

fn prompt_flow_and_actor() -> io::Result<Option<(Uuid, Actor)>> {
    let id_s = prompt("Id del flujo (UUID): ")?;
    let flow_id = match Uuid::parse_str(id_s.trim()) {
        Ok(u) => u,
        Err(_) => { eprintln!("UUID inválido"); return Ok(None); }
    };
    let actor_s = prompt("Id del actor: ")?;
    let actor_id: i64 = match actor_s.trim().parse() {
        Ok(n) => n,
        Err(_) => { eprintln!("Id inválido"); return Ok(None); }
    };
    let name = prompt("Nombre del actor: ")?;
    Ok(Some((flow_id, Actor::new(actor_id, name.trim(), "approver"))))
}

fn prompt_level() -> io::Result<Option<ApprovalLevel>> {
    let s = prompt("Nivel (1-4): ")?;
    match s.trim().parse::<u8>().ok().and_then(|n| ApprovalLevel::from_u8(n).ok()) {
        Some(level) => Ok(Some(level)),
        None => { eprintln!("Nivel inválido"); Ok(None) }
    }
}

fn prompt_workflow_type() -> io::Result<Option<WorkflowType>> {
    let s = prompt("Tipo (job_description, goal, bonus, calibration): ")?;
    match s.trim().parse::<WorkflowType>() {
        Ok(wt) => Ok(Some(wt)),
        Err(e) => { eprintln!("{}", e); Ok(None) }
    }
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}
