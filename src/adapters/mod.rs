//! Port implementations.

pub mod memory;
pub mod postgres_course_repository;
pub mod postgres_order_repository;
pub mod postgres_user_repository;

pub use memory::{InMemoryCourseRepository, InMemoryOrderRepository, InMemoryUserRepository};
pub use postgres_course_repository::PostgresCourseRepository;
pub use postgres_order_repository::PostgresOrderRepository;
pub use postgres_user_repository::PostgresUserRepository;
