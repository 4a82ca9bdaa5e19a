use anyhow::{Result, anyhow};
use autoscale_cuckoo_filter::CuckooFilter;
use futures::StreamExt;
use once_cell::sync::Lazy;
use sqlx::MySqlPool;
use std::sync::RwLock;

/// Expected capacity and false-positive rate.
const FILTER_CAPACITY: usize = 100_000;
const FALSE_POSITIVE_RATE: f64 = 0.001;

static EMP_NO_FILTER: Lazy<RwLock<CuckooFilter<String>>> =
    Lazy::new(|| RwLock::new(CuckooFilter::new(FILTER_CAPACITY, FALSE_POSITIVE_RATE)));

#[inline]
fn normalize(emp_no: &str) -> String {
    emp_no.trim().to_lowercase()
}

/// Whether an employee number might be registered (false positives possible,
/// false negatives not).
pub fn might_exist(emp_no: &str) -> bool {
    let emp_no = normalize(emp_no);
    match EMP_NO_FILTER.read() {
        Ok(filter) => filter.contains(&emp_no),
        // A poisoned filter can't rule anything out.
        Err(_) => true,
    }
}

pub fn insert(emp_no: &str) {
    let emp_no = normalize(emp_no);
    if let Ok(mut filter) = EMP_NO_FILTER.write() {
        filter.add(&emp_no);
    }
}

/// Streams every employee number into the filter in batches.
pub async fn warmup_emp_no_filter(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>("SELECT emp_no FROM employees").fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total = 0usize;

    while let Some(row) = stream.next().await {
        let (emp_no,) = row.map_err(|e| anyhow!("DB row fetch failed: {}", e))?;

        batch.push(normalize(&emp_no));
        total += 1;

        if batch.len() == batch_size {
            insert_batch(&batch)?;
            batch.clear();
        }
    }

    if !batch.is_empty() {
        insert_batch(&batch)?;
    }

    log::info!("Employee number filter warmup complete: {} employees", total);
    Ok(())
}

fn insert_batch(emp_nos: &[String]) -> Result<()> {
    let mut filter = EMP_NO_FILTER
        .write()
        .map_err(|_| anyhow!("employee number filter poisoned"))?;

    for emp_no in emp_nos {
        filter.add(emp_no);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserted_numbers_are_reported_present() {
        let _ = env_logger::builder().is_test(true).try_init();

        insert(" Filter-Test-42 ");
        assert!(might_exist("filter-test-42"));
    }

    #[test]
    fn batch_insert_covers_every_entry() {
        let batch: Vec<String> = (0..50).map(|i| format!("batch-{i}")).collect();
        insert_batch(&batch).unwrap();
        assert!(batch.iter().all(|e| might_exist(e)));
    }
}
