use crate::model::employee::EmployeeProfile;
use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::time::Duration;

/// Employee profiles keyed by emp_no, read on every marking-screen load.
pub static EMPLOYEE_CACHE: Lazy<Cache<String, EmployeeProfile>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(50_000)
        .time_to_live(Duration::from_secs(600))
        .support_invalidation_closures()
        .build()
});

pub async fn get(emp_no: &str) -> Option<EmployeeProfile> {
    EMPLOYEE_CACHE.get(emp_no).await
}

pub async fn put(profile: EmployeeProfile) {
    EMPLOYEE_CACHE.insert(profile.emp_no.clone(), profile).await;
}

pub async fn invalidate(emp_no: &str) {
    EMPLOYEE_CACHE.invalidate(emp_no).await;
}

/// Drops every cached profile belonging to a company.
pub fn invalidate_company(company_name: &str) {
    let company_name = company_name.to_string();
    // Only fails when invalidation closures are not enabled on the builder.
    if let Err(e) = EMPLOYEE_CACHE.invalidate_entries_if(move |_, p| p.company_name == company_name) {
        log::warn!("Company cache invalidation unavailable: {}", e);
        EMPLOYEE_CACHE.invalidate_all();
    }
}

async fn batch_put(profiles: Vec<EmployeeProfile>) {
    let futures: Vec<_> = profiles.into_iter().map(put).collect();
    futures::future::join_all(futures).await;
}

/// Loads employees who marked or were marked recently, in batches.
pub async fn warmup_employee_cache(pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, EmployeeProfile>(
        r#"
        SELECT DISTINCT e.emp_no, e.name, e.role, e.tel, e.company_name, e.security_firm, e.`rank`
        FROM employees e
        JOIN attendance a ON a.emp_no = e.emp_no
        WHERE a.date >= CURDATE() - INTERVAL ? DAY
        "#,
    )
    .bind(days)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        batch.push(row?);
        total += 1;

        if batch.len() >= batch_size {
            batch_put(std::mem::take(&mut batch)).await;
        }
    }

    if !batch.is_empty() {
        batch_put(batch).await;
    }

    log::info!(
        "Employee cache warmup complete: {} employees active in the last {} days",
        total,
        days
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(emp_no: &str, company: &str) -> EmployeeProfile {
        EmployeeProfile {
            emp_no: emp_no.into(),
            name: "Cached".into(),
            role: "user".into(),
            tel: "0771234567".into(),
            company_name: company.into(),
            security_firm: "oracle".into(),
            rank: "JSO".into(),
        }
    }

    #[actix_web::test]
    async fn put_get_invalidate() {
        put(profile("cache-test-1", "ASPDL")).await;
        assert_eq!(get("cache-test-1").await.map(|p| p.name), Some("Cached".into()));

        invalidate("cache-test-1").await;
        assert!(get("cache-test-1").await.is_none());
    }

    #[actix_web::test]
    async fn batch_put_inserts_all() {
        batch_put(vec![profile("cache-batch-1", "X"), profile("cache-batch-2", "X")]).await;
        assert!(get("cache-batch-1").await.is_some());
        assert!(get("cache-batch-2").await.is_some());
    }
}
