#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tablet::{DaoTemplate, Entity, TemplateError, Value};
    use tablet_memory::MemoryExecutor;

    fn listing(rows: &[Entity]) -> String {
        rows.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn products_lifecycle() {
        let executor = MemoryExecutor::connect("memory://?table=products:id")
            .expect("Could not open the database");
        let products = DaoTemplate::new("products", &executor);

        for (name, price, stock) in [
            ("keyboard", Decimal::new(4999, 2), 10u32),
            ("mouse", Decimal::new(1999, 2), 0u32),
            ("monitor", Decimal::new(19900, 2), 3u32),
        ] {
            let id = products
                .add_for_generated_key(
                    &mut Entity::new()
                        .set("name", name)
                        .set("price", price)
                        .set("stock", stock),
                )
                .await
                .expect("Failed to add a product");
            assert!(id.is_some());
        }
        assert_eq!(
            listing(&products.find_all().await.unwrap()),
            indoc! {"
                products{name: 'keyboard', price: 49.99, stock: 10, id: 1}
                products{name: 'mouse', price: 19.99, stock: 0, id: 2}
                products{name: 'monitor', price: 199.00, stock: 3, id: 3}"}
        );

        // Sold out products are removed
        let sold_out = products.find_by("stock", 0u32).await.unwrap();
        assert_eq!(sold_out.len(), 1);
        assert_eq!(products.del_by("stock", 0u32).await.unwrap(), 1);

        // Restock through add_or_update
        let mut monitor = products
            .get_by("name", "monitor")
            .await
            .unwrap()
            .expect("The monitor must exist");
        monitor.put("stock", 5u32);
        assert_eq!(products.add_or_update(&mut monitor).await.unwrap(), 1);
        let mut webcam = Entity::new()
            .set("name", "webcam")
            .set("price", Decimal::new(5900, 2))
            .set("stock", 7u32);
        assert_eq!(products.add_or_update(&mut webcam).await.unwrap(), 1);
        assert_eq!(webcam.get("id"), Some(&Value::Int64(Some(4))));

        assert_eq!(
            listing(&products.find_all().await.unwrap()),
            indoc! {"
                products{name: 'keyboard', price: 49.99, stock: 10, id: 1}
                products{name: 'monitor', price: 199.00, stock: 5, id: 3}
                products{name: 'webcam', price: 59.00, stock: 7, id: 4}"}
        );

        let error = products
            .update(&mut Entity::new().set("stock", 1u32))
            .await
            .expect_err("Updating without id must fail");
        assert!(matches!(
            error.downcast_ref::<TemplateError>(),
            Some(TemplateError::MissingPrimaryKey(field)) if field == "id"
        ));
        assert_eq!(error.to_string(), "Please determine `id` for update");

        assert!(products.exist(Entity::new().set("name", "webcam")).await.unwrap());
        assert_eq!(products.del(1).await.unwrap(), 1);
        assert_eq!(products.count(Entity::new()).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn products_shared_executor() {
        let executor = Arc::new(
            MemoryExecutor::connect("memory://?table=products:id&table=stores:code").unwrap(),
        );
        let products = DaoTemplate::new("products", executor.clone());
        let stores = DaoTemplate::with_primary_key("stores", "code", executor.clone());
        products
            .add(&mut Entity::new().set("name", "keyboard"))
            .await
            .unwrap();
        stores
            .add(&mut Entity::new().set("code", 100).set("city", "Turin"))
            .await
            .unwrap();
        assert_eq!(products.count(Entity::new()).await.unwrap(), 1);
        assert_eq!(stores.count(Entity::new()).await.unwrap(), 1);
        let store = stores.get(100).await.unwrap().expect("The store must exist");
        assert_eq!(store.get_as::<String>("city").unwrap(), "Turin");
        assert_eq!(executor.table_names().await, ["products", "stores"]);
    }
}
