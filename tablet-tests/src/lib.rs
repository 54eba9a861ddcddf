mod books;
mod guards;
mod users;

use crate::{books::books, guards::guards, users::users};
use log::LevelFilter;
use std::env;
use tablet::{DaoTemplate, Executor};

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the whole suite.
///
/// The executor must expose two tables:
/// - `users` with `id` as auto increment primary key
/// - `books` with `isbn` as primary key, not generated
pub async fn execute_tests<X: Executor>(executor: &X) {
    users(executor).await;
    books(executor).await;
    guards(executor).await;
}

/// Delete every row of the template's table, one primary key at a time.
pub async fn clear<X: Executor>(template: &DaoTemplate<X>) {
    let rows = template
        .find_all()
        .await
        .expect("Failed to query the rows to clear");
    for row in rows {
        let deleted = match row.get(template.primary_key_field()).cloned() {
            Some(key) if !key.is_null() => template.del(key).await,
            _ => template.del_where(row).await,
        }
        .expect("Failed to delete a row while clearing");
        assert!(deleted > 0, "Clearing deleted no row");
    }
    assert_eq!(
        template
            .count(Default::default())
            .await
            .expect("Failed to count the cleared rows"),
        0
    );
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
