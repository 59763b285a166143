//! Rule engine: calorie allocation, template selection, plan assembly and
//! feedback adjustment. Nothing in here touches the database.

pub mod allocator;
pub mod assembler;
pub mod feedback;
pub mod templates;
pub mod types;
