mod assignment;
mod employee;
mod errors;
mod level;
mod workflow_type;

pub use assignment::{ApproverAssignment, AssignmentPatch};
pub use employee::{Employee, EmployeeDirectory, InMemoryEmployeeDirectory};
pub use errors::DomainError;
pub use level::ApprovalLevel;
pub use workflow_type::WorkflowType;
