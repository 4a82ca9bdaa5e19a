pub mod db_utils;
pub mod emp_no_filter;
pub mod employee_cache;
