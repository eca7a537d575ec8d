// ABOUTME: Applies fixed "order" positions on top of the computed deployment sequence.
// ABOUTME: Negative positions count from the end of the full sequence.

use std::collections::HashMap;

use crate::appstack::{AppConfig, StackError};

/// Move applications with a fixed `order` to their positions.
///
/// Unordered applications keep their relative order. Negative positions are
/// normalized against the length of the whole sequence, then ordered
/// applications are inserted by ascending position. Positions past the end
/// append; positions that stay negative after normalization insert at the
/// front. This differs from inserting at a negative list index: `-10` in a
/// three-app stack never wraps around a second time, it always lands first.
pub fn apply_fixed_order(sorted: Vec<AppConfig>) -> Result<Vec<AppConfig>, StackError> {
    check_unique_orders(&sorted)?;

    let total = sorted.len() as i64;
    let (ordered, mut apps): (Vec<AppConfig>, Vec<AppConfig>) =
        sorted.into_iter().partition(AppConfig::is_ordered);

    // Side table of normalized positions; the apps themselves stay untouched.
    let mut positioned: Vec<(i64, AppConfig)> = ordered
        .into_iter()
        .filter_map(|app| app.order.map(|order| (normalize(order, total), app)))
        .collect();
    positioned.sort_by_key(|(position, _)| *position);

    for (position, app) in positioned {
        let index = position.clamp(0, apps.len() as i64) as usize;
        tracing::debug!(app = %app.name, order = ?app.order, index, "placing ordered app");
        apps.insert(index, app);
    }

    Ok(apps)
}

fn normalize(order: i64, total: i64) -> i64 {
    if order < 0 { order + total } else { order }
}

fn check_unique_orders(apps: &[AppConfig]) -> Result<(), StackError> {
    let mut seen: HashMap<i64, &AppConfig> = HashMap::new();
    for app in apps {
        let Some(order) = app.order else { continue };
        if let Some(first) = seen.insert(order, app) {
            return Err(StackError::DuplicateOrder {
                order,
                first: first.name.clone(),
                second: app.name.clone(),
            });
        }
    }
    Ok(())
}
