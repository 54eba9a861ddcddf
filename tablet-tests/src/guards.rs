use crate::clear;
use std::sync::LazyLock;
use tablet::{DaoTemplate, Entity, Executor, Value};
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Destructive calls without a usable condition must leave the table untouched.
pub async fn guards<X: Executor>(executor: &X) {
    let _lock = MUTEX.lock().await;
    let users = DaoTemplate::new("users", executor);
    clear(&users).await;

    for name in ["eve", "frank", "grace"] {
        users
            .add(&mut Entity::new().set("username", name))
            .await
            .expect("Failed to add a user");
    }
    assert_eq!(users.count(Entity::new()).await.unwrap(), 3);

    assert_eq!(users.del(None::<i64>).await.unwrap(), 0);
    assert_eq!(users.del(Value::Null).await.unwrap(), 0);
    assert_eq!(users.del_by("", "eve").await.unwrap(), 0);
    assert_eq!(users.del_by("   ", "eve").await.unwrap(), 0);
    assert_eq!(users.del_where(Entity::new()).await.unwrap(), 0);
    assert_eq!(users.del_where(Entity::create("users")).await.unwrap(), 0);
    assert_eq!(users.del_where(None).await.unwrap(), 0);
    assert_eq!(users.count(Entity::new()).await.unwrap(), 3);

    // Existence agrees with the count, empty condition included
    for condition in [
        Entity::new(),
        Entity::new().set("username", "eve"),
        Entity::new().set("username", "mallory"),
    ] {
        let count = users.count(condition.clone()).await.unwrap();
        let exist = users.exist(condition).await.unwrap();
        assert_eq!(exist, count > 0);
    }

    clear(&users).await;
    assert!(!users.exist(Entity::new()).await.unwrap());
}
