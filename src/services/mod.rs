pub mod analytics;
pub mod auth;
pub mod order_lifecycle;
pub mod seed;

pub use analytics::{AnalyticsService, DEFAULT_TOP_CUSTOMERS};
pub use auth::{AuthError, AuthService, Claims, Registration, Session, TokenService};
pub use order_lifecycle::{
    BulkInsertReport, NewOrder, OrderError, OrderLifecycle, OrderPatch, PartialBulkFailure,
};
pub use seed::{SeedError, SeedService, SeedSummary};
