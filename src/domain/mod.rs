//! Framework-agnostic domain entities.

pub mod analytics;
pub mod course;
pub mod order;
pub mod user;

pub use analytics::{CustomerSpend, CustomerSummary, MonthKey};
pub use course::Course;
pub use order::{Order, OrderFilter, OrderStatus, PaymentStatus};
pub use user::{Role, User};
