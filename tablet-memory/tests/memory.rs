#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use tablet_core::{DaoTemplate, Entity, Executor, RowsAffected, Value, stream::TryStreamExt};
    use tablet_memory::MemoryExecutor;
    use tablet_tests::{execute_tests, init_logs, silent_logs};

    #[tokio::test]
    async fn memory() {
        init_logs();
        const URL: &'static str = "memory://?table=users:id&table=books";
        let executor = MemoryExecutor::connect(URL).expect("Could not open the database");
        assert_eq!(executor.table_names().await, ["books", "users"]);
        execute_tests(&executor).await;
    }

    #[tokio::test]
    async fn memory_created_tables() {
        init_logs();
        let executor = MemoryExecutor::new();
        executor
            .create_table("users", Some("id"))
            .await
            .expect("Could not create users");
        executor
            .create_table("books", None)
            .await
            .expect("Could not create books");
        assert!(executor.create_table("books", None).await.is_err());
        execute_tests(&executor).await;
        assert!(executor.drop_table("books").await);
        assert!(!executor.drop_table("books").await);
    }

    #[test]
    fn connect_rejects_bad_urls() {
        assert!(MemoryExecutor::connect("postgres://localhost").is_err());
        assert!(MemoryExecutor::connect("memory://?schema=public").is_err());
        assert!(MemoryExecutor::connect("memory://?table=").is_err());
        assert!(MemoryExecutor::connect("memory://").is_ok());
    }

    #[tokio::test]
    async fn executor_errors_propagate() {
        init_logs();
        let executor = MemoryExecutor::connect("memory://?table=users:id").unwrap();
        let missing = DaoTemplate::new("ghosts", &executor);
        silent_logs! {
            let error = missing
                .add(&mut Entity::new().set("name", "casper"))
                .await
                .expect_err("Inserting into a missing table must fail");
            assert!(format!("{:#}", error).contains("`ghosts` does not exist"));
            assert!(missing.find_all().await.is_err());
            assert!(missing.count(Entity::new()).await.is_err());
        }

        let users = DaoTemplate::new("users", &executor);
        let id = users
            .add_for_generated_key(&mut Entity::new().set("name", "alice"))
            .await
            .unwrap()
            .expect("Expected a generated key");
        assert_eq!(id, 1);
        let error = users
            .add(&mut Entity::new().set("id", id).set("name", "impostor"))
            .await
            .expect_err("Duplicate keys must be rejected");
        assert!(format!("{:#}", error).contains("Duplicate key"));
        let error = users
            .update(&mut Entity::new().set("id", id))
            .await
            .expect_err("An update without fields must be rejected by the executor");
        assert!(format!("{:#}", error).contains("Nothing to update"));
    }

    #[tokio::test]
    async fn connect_declares_tables() {
        let executor =
            MemoryExecutor::connect("memory://?table=users:id&table=books&table=logs:").unwrap();
        assert_eq!(executor.table_names().await, ["books", "logs", "users"]);
        let id = executor
            .insert_for_generated_key(&Entity::create("users").set("name", "alice"))
            .await
            .unwrap();
        assert_eq!(id, Some(1));
        for table in ["books", "logs"] {
            let id = executor
                .insert_for_generated_key(&Entity::create(table).set("name", "plain"))
                .await
                .unwrap();
            assert_eq!(id, None, "`{table}` has no auto increment column");
        }
        assert!(MemoryExecutor::connect("memory://?tables=a,b").is_err());
    }

    #[tokio::test]
    async fn update_checks_auto_increment_keys() {
        let executor = MemoryExecutor::connect("memory://?table=users:id").unwrap();
        let users = DaoTemplate::new("users", &executor);
        for name in ["alice", "bob"] {
            users
                .add(&mut Entity::new().set("name", name).set("group", 1))
                .await
                .unwrap();
        }
        let error = executor
            .update(
                &Entity::create("users").set("id", 2),
                &Entity::create("users").set("name", "alice"),
            )
            .await
            .expect_err("Taking the key of another row must fail");
        assert!(format!("{:#}", error).contains("Duplicate key"));
        let error = executor
            .update(
                &Entity::create("users").set("id", 7),
                &Entity::create("users").set("group", 1),
            )
            .await
            .expect_err("Giving the same key to many rows must fail");
        assert!(format!("{:#}", error).contains("Duplicate key"));
        let error = executor
            .update(
                &Entity::create("users").set("id", "seven"),
                &Entity::create("users").set("name", "alice"),
            )
            .await
            .expect_err("Keys must be integers");
        assert!(format!("{:#}", error).contains("expects an integer key"));
        let alice = users.get(1).await.unwrap().expect("Alice must keep her key");
        assert_eq!(alice.get_as::<String>("name").unwrap(), "alice");

        let moved = executor
            .update(
                &Entity::create("users").set("id", 10),
                &Entity::create("users").set("name", "alice"),
            )
            .await
            .unwrap();
        assert_eq!(moved.rows_affected, 1);
        let id = users
            .add_for_generated_key(&mut Entity::new().set("name", "carol"))
            .await
            .unwrap();
        assert_eq!(id, Some(11));
    }

    #[tokio::test]
    async fn explicit_keys_move_the_counter() {
        let executor = MemoryExecutor::connect("memory://?table=users:id").unwrap();
        let users = DaoTemplate::new("users", &executor);
        let result = executor
            .insert(&Entity::create("users").set("id", 10).set("name", "ten"))
            .await
            .unwrap();
        assert_eq!(
            result,
            RowsAffected {
                rows_affected: 1,
                last_affected_id: None
            }
        );
        let keys = users
            .add_for_generated_keys(&mut Entity::new().set("name", "eleven"))
            .await
            .unwrap();
        assert_eq!(keys, [Value::Int64(Some(11))]);
    }

    #[tokio::test]
    async fn template_can_target_other_tables() {
        let executor = MemoryExecutor::connect("memory://?table=users:id&table=audit").unwrap();
        let users = DaoTemplate::new("users", &executor);
        users
            .add(&mut Entity::create("audit").set("event", "login"))
            .await
            .unwrap();
        assert_eq!(users.count(Entity::new()).await.unwrap(), 0);
        assert_eq!(users.count(Entity::create("audit")).await.unwrap(), 1);
        assert_eq!(
            users
                .del_where(Entity::create("audit").set("event", "login"))
                .await
                .unwrap(),
            1
        );

        // Blank table names are replaced
        let mut blank = Entity::create("  ").set("name", "bob");
        users.add(&mut blank).await.unwrap();
        assert_eq!(blank.table_name(), Some("users"));
        assert_eq!(users.count(Entity::new()).await.unwrap(), 1);

        // Update always addresses the template table
        let mut moved = Entity::create("audit").set("id", 1).set("name", "robert");
        assert_eq!(users.update(&mut moved).await.unwrap(), 1);
        assert_eq!(moved.table_name(), Some("users"));
    }

    #[tokio::test]
    async fn find_projects_and_limits() {
        let executor = MemoryExecutor::connect("memory://?table=users:id").unwrap();
        for name in ["a", "b", "c"] {
            executor
                .insert(&Entity::create("users").set("name", name).set("group", 1))
                .await
                .unwrap();
        }
        let condition = Entity::create("users").set("group", 1i64);
        let rows: Vec<Entity> = executor
            .find(&["name", "missing"], &condition, Some(2))
            .try_collect()
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].field_names().collect::<Vec<_>>(), ["name", "missing"]);
        assert_eq!(rows[0].get("missing"), Some(&Value::Null));
        assert_eq!(rows[1].get_as::<String>("name").unwrap(), "b");
        let first = executor
            .find_one(&[], &Entity::create("users"))
            .await
            .unwrap()
            .expect("Expected a row");
        assert_eq!(first.get_as::<i64>("id").unwrap(), 1);
        assert_eq!(first.table_name(), Some("users"));
    }

    #[tokio::test]
    async fn null_conditions_match_missing_fields() {
        let executor = MemoryExecutor::connect("memory://?table=users:id").unwrap();
        let users = DaoTemplate::new("users", &executor);
        users
            .add(&mut Entity::new().set("name", "alice").set("email", "a@b.c"))
            .await
            .unwrap();
        users
            .add(&mut Entity::new().set("name", "bob"))
            .await
            .unwrap();
        users
            .add(&mut Entity::new().set("name", "carol").set("email", None::<String>))
            .await
            .unwrap();
        let without_email = users
            .find_where(Entity::new().set("email", Value::Null))
            .await
            .unwrap();
        assert_eq!(without_email.len(), 2);
        assert_eq!(users.del_by("email", Value::Null).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn shared_between_tasks() {
        let executor = Arc::new(MemoryExecutor::connect("memory://?table=users:id").unwrap());
        let users = Arc::new(DaoTemplate::new("users", executor.clone()));
        let tasks = (0..16)
            .map(|i| {
                let users = users.clone();
                tokio::spawn(async move {
                    users
                        .add_or_update(&mut Entity::new().set("name", format!("user{i}")))
                        .await
                })
            })
            .collect::<Vec<_>>();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 1);
        }
        assert_eq!(users.count(Entity::new()).await.unwrap(), 16);
        assert_eq!(executor.count(&Entity::create("users")).await.unwrap(), 16);
    }
}
