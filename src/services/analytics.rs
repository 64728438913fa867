//! Revenue and customer reporting over completed orders.
//!
//! Both views are recomputed from the order store on every call.

use bigdecimal::BigDecimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::domain::{CustomerSpend, CustomerSummary, MonthKey, Order, OrderFilter};
use crate::ports::{OrderRepository, RepositoryResult, UserRepository};

pub const DEFAULT_TOP_CUSTOMERS: usize = 5;

#[derive(Clone)]
pub struct AnalyticsService {
    orders: Arc<dyn OrderRepository>,
    users: Arc<dyn UserRepository>,
}

impl AnalyticsService {
    pub fn new(orders: Arc<dyn OrderRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { orders, users }
    }

    /// Sum of `total_price` per UTC calendar month of `purchased_at`.
    /// Months with no completed order are absent.
    pub async fn revenue_per_month(&self) -> RepositoryResult<HashMap<MonthKey, BigDecimal>> {
        let orders = self.orders.find(&OrderFilter::completed()).await?;
        debug!(orders = orders.len(), "Computing revenue per month");
        Ok(revenue_by_month(&orders))
    }

    /// Accounts ranked by completed-order spend, highest first, at most `limit` entries.
    pub async fn top_customers(&self, limit: usize) -> RepositoryResult<Vec<CustomerSpend>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let orders = self.orders.find(&OrderFilter::completed()).await?;

        let ids = distinct_customers(&orders);
        let summaries = self.users.find_summaries(&ids).await?;

        debug!(orders = orders.len(), customers = ids.len(), limit, "Ranking customers");
        Ok(rank_customers(&orders, &summaries, limit))
    }
}

pub fn revenue_by_month(orders: &[Order]) -> HashMap<MonthKey, BigDecimal> {
    let mut revenue: HashMap<MonthKey, BigDecimal> = HashMap::new();
    for order in orders {
        *revenue
            .entry(MonthKey::of(order.purchased_at))
            .or_insert_with(|| BigDecimal::from(0)) += &order.total_price;
    }
    revenue
}

/// Purchasing accounts in first-seen order.
pub fn distinct_customers(orders: &[Order]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(orders.len());
    orders
        .iter()
        .map(|o| o.user_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Ties keep the order in which each account first appears in `orders`.
pub fn rank_customers(
    orders: &[Order],
    summaries: &HashMap<Uuid, CustomerSummary>,
    limit: usize,
) -> Vec<CustomerSpend> {
    let mut position: HashMap<Uuid, usize> = HashMap::new();
    let mut ranked: Vec<CustomerSpend> = Vec::new();

    for order in orders {
        let slot = *position.entry(order.user_id).or_insert_with(|| {
            let user = summaries
                .get(&order.user_id)
                .cloned()
                .unwrap_or_else(|| CustomerSummary::unknown(order.user_id));
            ranked.push(CustomerSpend {
                user,
                total_price: BigDecimal::from(0),
            });
            ranked.len() - 1
        });
        ranked[slot].total_price += &order.total_price;
    }

    ranked.sort_by(|a, b| b.total_price.cmp(&a.total_price));
    ranked.truncate(limit);
    ranked
}
