use crate::clear;
use rust_decimal::Decimal;
use std::sync::LazyLock;
use tablet::{DaoTemplate, Entity, Executor, TemplateError};
use time::{Date, macros::date};
use tokio::sync::Mutex;

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

fn book(isbn: &str, title: &str, price: Decimal, published: Date) -> Entity {
    Entity::new()
        .set("isbn", isbn)
        .set("title", title)
        .set("price", price)
        .set("published", published)
}

pub async fn books<X: Executor>(executor: &X) {
    let _lock = MUTEX.lock().await;
    let books = DaoTemplate::with_primary_key("books", "isbn", executor);
    assert_eq!(books.table_name(), "books");
    assert_eq!(books.primary_key_field(), "isbn");

    clear(&books).await;

    // Insert
    for mut entity in [
        book(
            "978-0547928227",
            "The Hobbit",
            Decimal::new(1099, 2),
            date!(1937 - 09 - 21),
        ),
        book(
            "978-0439708180",
            "Harry Potter and the Sorcerer's Stone",
            Decimal::new(899, 2),
            date!(1997 - 06 - 26),
        ),
        book(
            "978-0345339683",
            "The Fellowship of the Ring",
            Decimal::new(1250, 2),
            date!(1954 - 07 - 29),
        ),
    ] {
        let inserted = books.add(&mut entity).await.expect("Failed to add a book");
        assert_eq!(inserted, 1);
    }
    assert_eq!(books.count(Entity::new()).await.unwrap(), 3);

    // Get
    let hobbit = books
        .get("978-0547928227")
        .await
        .expect("Failed to get the hobbit")
        .expect("The hobbit must exist");
    assert_eq!(hobbit.get_as::<String>("title").unwrap(), "The Hobbit");
    assert_eq!(
        hobbit.get_as::<Decimal>("price").unwrap(),
        Decimal::new(1099, 2)
    );
    assert_eq!(
        hobbit.get_as::<Date>("published").unwrap(),
        date!(1937 - 09 - 21)
    );
    assert!(
        books
            .get("000-0000000000")
            .await
            .expect("Failed to get a missing book")
            .is_none()
    );

    // Update
    let mut discounted = Entity::new()
        .set("isbn", "978-0547928227")
        .set("price", Decimal::new(799, 2));
    let updated = books
        .update(&mut discounted)
        .await
        .expect("Failed to update the hobbit");
    assert_eq!(updated, 1);
    let hobbit = books
        .get_by("title", "The Hobbit")
        .await
        .expect("Failed to get the hobbit")
        .expect("The hobbit must exist");
    assert_eq!(
        hobbit.get_as::<Decimal>("price").unwrap(),
        Decimal::new(799, 2)
    );
    let mut missing = Entity::new().set("title", "Untitled");
    let error = books
        .update(&mut missing)
        .await
        .expect_err("Updating without isbn must fail");
    assert_eq!(
        error.downcast_ref::<TemplateError>(),
        Some(&TemplateError::MissingPrimaryKey("isbn".into()))
    );
    let mut unknown = Entity::new()
        .set("isbn", "000-0000000000")
        .set("title", "Nothing");
    assert_eq!(
        books
            .update(&mut unknown)
            .await
            .expect("Updating a missing book is not an error"),
        0
    );

    // Add or update
    let mut fellowship = Entity::new()
        .set("isbn", "978-0345339683")
        .set("title", "The Fellowship of the Ring (Illustrated)");
    let result = books
        .add_or_update(&mut fellowship)
        .await
        .expect("Failed to update the fellowship");
    assert_eq!(result, 1);
    let mut anonymous = Entity::new()
        .set("title", "Anonymous pamphlet")
        .set("price", Decimal::ZERO);
    let result = books
        .add_or_update(&mut anonymous)
        .await
        .expect("Failed to add the pamphlet");
    assert_eq!(result, 1);
    assert!(
        !anonymous.contains("isbn"),
        "Isbn is not generated, the pamphlet must stay without"
    );
    assert_eq!(books.count(Entity::new()).await.unwrap(), 4);

    // Find
    let cheap = books
        .find_where(Entity::new().set("price", Decimal::new(899, 2)))
        .await
        .expect("Failed to find the cheap books");
    assert_eq!(cheap.len(), 1);
    assert_eq!(
        cheap[0].get_as::<String>("isbn").unwrap(),
        "978-0439708180"
    );

    // Delete
    let deleted = books
        .del_by("title", "Anonymous pamphlet")
        .await
        .expect("Failed to delete the pamphlet");
    assert_eq!(deleted, 1);
    let deleted = books
        .del("978-0439708180")
        .await
        .expect("Failed to delete harry potter");
    assert_eq!(deleted, 1);
    assert_eq!(books.count(Entity::new()).await.unwrap(), 2);

    clear(&books).await;
}
