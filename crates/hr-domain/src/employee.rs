use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Empleado registrado en la plataforma de RRHH.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub role: String,
    pub is_active: bool,
}

impl Employee {
    pub fn new(id: i64, name: &str, role: &str) -> Result<Self, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::ValidationError("el nombre del empleado no puede estar vacío".into()));
        }
        if role.trim().is_empty() {
            return Err(DomainError::ValidationError("el rol del empleado no puede estar vacío".into()));
        }
        Ok(Self { id,
                  name: name.trim().to_string(),
                  email: None,
                  role: role.trim().to_string(),
                  is_active: true })
    }

    pub fn with_email(mut self, email: &str) -> Result<Self, DomainError> {
        if !email.contains('@') {
            return Err(DomainError::ValidationError(format!("correo inválido: {}", email)));
        }
        self.email = Some(email.trim().to_string());
        Ok(self)
    }
}

/// Consultas sobre el padrón de empleados que necesita el motor de
/// aprobaciones: existencia, nombre y estado activo.
pub trait EmployeeDirectory: Send + Sync {
    /// Recupera un empleado por id.
    fn get(&self, id: i64) -> Result<Option<Employee>, DomainError>;

    /// Nombre del empleado; error `NotFound` si no existe.
    fn get_name(&self, id: i64) -> Result<String, DomainError>;

    /// `true` solo si el empleado existe y está activo.
    fn is_active(&self, id: i64) -> Result<bool, DomainError>;
}

/// Implementación en memoria para tests y desarrollo.
pub struct InMemoryEmployeeDirectory {
    employees: Arc<Mutex<HashMap<i64, Employee>>>,
}

impl InMemoryEmployeeDirectory {
    pub fn new() -> Self {
        Self { employees: Arc::new(Mutex::new(HashMap::new())) }
    }

    fn lock_map(&self) -> Result<std::sync::MutexGuard<'_, HashMap<i64, Employee>>, DomainError> {
        self.employees
            .lock()
            .map_err(|e| DomainError::ExternalError(format!("Mutex 'employees' poisoned: {}", e)))
    }

    /// Inserta o reemplaza un empleado.
    pub fn upsert(&self, employee: Employee) -> Result<(), DomainError> {
        let mut map = self.lock_map()?;
        map.insert(employee.id, employee);
        Ok(())
    }

    /// Marca un empleado como inactivo (baja lógica).
    pub fn deactivate(&self, id: i64) -> Result<(), DomainError> {
        let mut map = self.lock_map()?;
        let emp = map.get_mut(&id)
                     .ok_or_else(|| DomainError::NotFound(format!("empleado {}", id)))?;
        emp.is_active = false;
        Ok(())
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn get(&self, id: i64) -> Result<Option<Employee>, DomainError> {
        let map = self.lock_map()?;
        Ok(map.get(&id).cloned())
    }

    fn get_name(&self, id: i64) -> Result<String, DomainError> {
        let map = self.lock_map()?;
        map.get(&id)
           .map(|e| e.name.clone())
           .ok_or_else(|| DomainError::NotFound(format!("empleado {}", id)))
    }

    fn is_active(&self, id: i64) -> Result<bool, DomainError> {
        let map = self.lock_map()?;
        Ok(map.get(&id).map(|e| e.is_active).unwrap_or(false))
    }
}

impl Default for InMemoryEmployeeDirectory {
    fn default() -> Self {
        Self::new()
    }
}
