//! Scoped reads feeding the aggregators
//!
//! Every view needs incomes, expenses and class types. They are fetched
//! concurrently and the first failure aborts the whole view, so a report is
//! never built from a partial dataset.

use anyhow::{Context, Result};
use tracing::debug;

use crate::catalog::ClassType;
use crate::expenses::ExpenseRecord;
use crate::incomes::IncomeRecord;
use crate::profiles::{AuthContext, Scope};
use crate::store::Store;

/// Everything a report view is computed from
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub incomes: Vec<IncomeRecord>,
    pub expenses: Vec<ExpenseRecord>,
    pub class_types: Vec<ClassType>,
}

/// Fetch incomes, expenses and class types for `scope` concurrently
pub async fn fetch_dataset(store: &Store, scope: &Scope) -> Result<Dataset> {
    let (incomes, expenses, class_types) = tokio::try_join!(
        store.list_incomes(scope),
        store.list_expenses(scope),
        store.list_class_types(),
    )
    .context("Failed to fetch workshop data")?;

    debug!(
        incomes = incomes.len(),
        expenses = expenses.len(),
        class_types = class_types.len(),
        "dataset fetched"
    );

    Ok(Dataset {
        incomes,
        expenses,
        class_types,
    })
}

/// Look up the caller's profile, `None` when the id is unknown
pub async fn find_auth(store: &Store, user_id: &str) -> Result<Option<AuthContext>> {
    let profile = store
        .get_profile(user_id.trim())
        .await
        .context("Failed to load profile")?;
    Ok(profile.as_ref().map(AuthContext::from_profile))
}

/// Resolve the authorization context for a CLI command
pub async fn resolve_auth(store: &Store, user_id: &str) -> Result<AuthContext> {
    find_auth(store, user_id)
        .await?
        .with_context(|| format!("Unknown profile '{user_id}'. Add it with `profile add` first."))
}
