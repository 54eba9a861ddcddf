use crate::clear;
use std::sync::LazyLock;
use tablet::{DaoTemplate, Entity, Executor, Value};
use time::macros::datetime;
use tokio::sync::Mutex;
use uuid::Uuid;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub async fn users<X: Executor>(executor: &X) {
    let _lock = MUTEX.lock().await;
    let users = DaoTemplate::new("users", executor);
    assert_eq!(users.primary_key_field(), "id");

    // Cleanup
    clear(&users).await;

    // Insert
    let mut alice = Entity::new()
        .set("username", "alice")
        .set("email", "alice@example.com")
        .set("follower_count", 56u32)
        .set("is_active", true)
        .set("last_login", datetime!(2025-07-15 10:00:00))
        .set("token", Uuid::new_v4());
    let alice_id = users
        .add_for_generated_key(&mut alice)
        .await
        .expect("Failed to add alice");
    assert_eq!(alice.table_name(), Some("users"));
    assert!(
        !alice.contains("id"),
        "Adding must not write the generated key back into the entity"
    );
    let mut bob = Entity::new()
        .set("username", "bob")
        .set("email", "bob@example.com")
        .set("follower_count", 99u32)
        .set("is_active", false)
        .set("last_login", None::<time::PrimitiveDateTime>);
    let inserted = users.add(&mut bob).await.expect("Failed to add bob");
    assert_eq!(inserted, 1);
    let mut charlie = Entity::new()
        .set("username", "charlie")
        .set("email", "charlie@example.com")
        .set("follower_count", 0u32)
        .set("is_active", true);
    let charlie_keys = users
        .add_for_generated_keys(&mut charlie)
        .await
        .expect("Failed to add charlie");
    let alice_id = alice_id.expect("Expected alice to get a generated key");
    assert_eq!(charlie_keys.len(), 1);
    assert_ne!(charlie_keys[0].clone(), Value::from(alice_id));

    // Count
    let total = users
        .count(Entity::new())
        .await
        .expect("Failed to count the users");
    assert_eq!(total, 3);
    assert!(
        users
            .exist(Entity::new().set("username", "bob"))
            .await
            .expect("Failed to check bob")
    );
    assert!(
        !users
            .exist(Entity::new().set("username", "dave"))
            .await
            .expect("Failed to check dave")
    );
    let active = users
        .count(Entity::new().set("is_active", true))
        .await
        .expect("Failed to count the active users");
    assert_eq!(active, 2);

    // Find
    let found = users.find_all().await.expect("Failed to find all the users");
    assert_eq!(
        found
            .iter()
            .map(|v| v.get_as::<String>("username").expect("Expected a username"))
            .collect::<Vec<_>>(),
        ["alice", "bob", "charlie"]
    );
    let active = users
        .find_by("is_active", true)
        .await
        .expect("Failed to find the active users");
    assert_eq!(active.len(), 2);
    let none = users
        .find_by("username", "nobody")
        .await
        .expect("Failed to find nobody");
    assert!(none.is_empty());

    // Get
    let bob = users
        .get_by("username", "bob")
        .await
        .expect("Failed to get bob")
        .expect("Bob must exist");
    assert_eq!(bob.get_as::<u32>("follower_count").unwrap(), 99);
    assert_eq!(
        bob.get_as::<Option<time::PrimitiveDateTime>>("last_login")
            .unwrap(),
        None
    );
    let bob_id = bob
        .get("id")
        .cloned()
        .expect("Rows read back must carry their primary key");
    let same = users
        .get(bob_id.clone())
        .await
        .expect("Failed to get bob by key")
        .expect("Bob must be found by key");
    assert_eq!(same.get_as::<String>("email").unwrap(), "bob@example.com");
    let first = users
        .get_where(None)
        .await
        .expect("Failed to get any user")
        .expect("The table is not empty");
    assert_eq!(first.get_as::<String>("username").unwrap(), "alice");

    // Update
    let mut update = Entity::new()
        .set("id", bob_id.clone())
        .set("follower_count", 100u32);
    let updated = users.update(&mut update).await.expect("Failed to update bob");
    assert_eq!(updated, 1);
    assert!(update.contains("id"), "The caller entity keeps its key");
    let bob = users
        .get(bob_id.clone())
        .await
        .expect("Failed to get bob")
        .expect("Bob must still exist");
    assert_eq!(bob.get_as::<u32>("follower_count").unwrap(), 100);
    assert_eq!(bob.get_as::<String>("username").unwrap(), "bob");

    // Add or update
    let mut dave = Entity::new()
        .set("username", "dave")
        .set("email", "dave@example.com")
        .set("is_active", false);
    let result = users
        .add_or_update(&mut dave)
        .await
        .expect("Failed to add dave");
    assert_eq!(result, 1);
    let dave_id = dave.get("id").cloned().expect("Dave must have got a key");
    dave.put("is_active", true);
    let result = users
        .add_or_update(&mut dave)
        .await
        .expect("Failed to update dave");
    assert_eq!(result, 1);
    let stored = users
        .get(dave_id)
        .await
        .expect("Failed to get dave")
        .expect("Dave must exist");
    assert_eq!(stored.get_as::<bool>("is_active").unwrap(), true);
    assert_eq!(users.count(Entity::new()).await.unwrap(), 4);

    // Delete
    let deleted = users.del(bob_id.clone()).await.expect("Failed to delete bob");
    assert_eq!(deleted, 1);
    let deleted = users
        .del(bob_id.clone())
        .await
        .expect("Failed to delete bob again");
    assert_eq!(deleted, 0);
    assert!(users.get(bob_id).await.expect("Failed to get bob").is_none());
    let deleted = users
        .del_by("username", "charlie")
        .await
        .expect("Failed to delete charlie");
    assert_eq!(deleted, 1);
    assert_eq!(users.count(Entity::new()).await.unwrap(), 2);

    clear(&users).await;
    assert!(
        users
            .get_where(None)
            .await
            .expect("Failed to query the empty table")
            .is_none()
    );
}
