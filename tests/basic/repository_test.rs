use crate::common;
use catalog::db::error::StoreError;
use catalog::db::models::book::{self, BookFilter, BookOrder, NewBook};
use catalog::db::models::publication::{self, Publication};
use std::matches;
use tempfile::tempdir;

#[actix_web::test]
async fn test_create_publication_then_fetch_by_id_expect_equal_fields() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    let stimatski = Publication::new(104, "Stimatski").unwrap();
    publication::Manager::create(&db, &stimatski).await.unwrap();
    let fetched = publication::Manager::find_by_id(&db, 104).await.unwrap();
    assert_eq!(stimatski, fetched);
}

#[actix_web::test]
async fn test_insert_book_then_fetch_by_id_expect_equal_fields() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    let new_book = NewBook::new(
        "Peter Pan",
        Some("J.M Barrie"),
        Some(4.7),
        Some("Hard-Cover"),
        Some("images/peter_pan.jpg"),
        Some(201),
        None,
    )
    .unwrap();
    let inserted = book::Manager::insert(&db, &new_book).await.unwrap();
    let fetched = book::Manager::find_by_id(&db, inserted.id).await.unwrap();
    assert_eq!(inserted, fetched);
    assert_eq!(fetched.title, "Peter Pan");
    assert_eq!(fetched.author.as_deref(), Some("J.M Barrie"));
    assert_eq!(fetched.avg_rating, Some(4.7));
    assert_eq!(fetched.num_pages, Some(201));
    assert!(!fetched.pub_date.is_empty());
}

#[actix_web::test]
async fn test_publication_new_when_name_invalid_expect_constraint_violation() {
    let too_long = "x".repeat(81);
    assert!(matches!(
        Publication::new(1, &too_long),
        Err(StoreError::Constraint(_))
    ));
    assert!(matches!(
        Publication::new(1, ""),
        Err(StoreError::Constraint(_))
    ));
}

#[actix_web::test]
async fn test_insert_book_when_dangling_pub_id_expect_referential_integrity_error() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    // Construction succeeds; the reference is only checked at persist time.
    let orphan = NewBook::new("Orphan", None, None, None, None, None, Some(999)).unwrap();
    let actual = book::Manager::insert(&db, &orphan).await.unwrap_err();
    assert!(matches!(actual, StoreError::ReferentialIntegrity(_)));
    assert!(book::Manager::find_all(&db).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_insert_book_when_duplicate_image_expect_constraint_violation() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    let first = NewBook::new("First", None, None, None, Some("images/cover.jpg"), None, None)
        .unwrap();
    let second = NewBook::new("Second", None, None, None, Some("images/cover.jpg"), None, None)
        .unwrap();
    book::Manager::insert(&db, &first).await.unwrap();
    let actual = book::Manager::insert(&db, &second).await.unwrap_err();
    assert!(matches!(actual, StoreError::Constraint(_)));
    assert_eq!(book::Manager::find_all(&db).await.unwrap().len(), 1);
}

#[actix_web::test]
async fn test_delete_publication_when_referenced_expect_blocked_until_books_removed() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    common::seed_catalog(&db).await;
    let stimatski = publication::Manager::find_by_id(&db, 104).await.unwrap();

    let blocked = publication::Manager::delete(&db, &stimatski)
        .await
        .unwrap_err();
    assert!(matches!(blocked, StoreError::ReferentialIntegrity(_)));

    let removed = book::Manager::delete_by_pub_id(&db, 104).await.unwrap();
    assert_eq!(removed, 2);

    publication::Manager::delete(&db, &stimatski).await.unwrap();
    let gone = publication::Manager::find_by_id(&db, 104).await.unwrap_err();
    assert!(matches!(
        gone,
        StoreError::NotFound {
            table: "publication",
            ..
        }
    ));
}

#[actix_web::test]
async fn test_create_multiple_books_when_one_invalid_expect_nothing_persisted() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    publication::Manager::create(&db, &Publication::new(104, "Stimatski").unwrap())
        .await
        .unwrap();
    let batch = [
        NewBook::new("Valid One", None, None, None, None, None, Some(104)).unwrap(),
        NewBook::new("Valid Two", None, None, None, None, None, Some(104)).unwrap(),
        // Dangling reference; passes construction, fails at persist time.
        NewBook::new("Invalid", None, None, None, None, None, Some(999)).unwrap(),
    ];
    let actual = book::Manager::insert_all(&db, &batch).await.unwrap_err();
    assert!(matches!(actual, StoreError::ReferentialIntegrity(_)));
    assert!(book::Manager::find_all(&db).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_create_multiple_publications_when_duplicate_id_expect_nothing_persisted() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    let batch = [
        Publication::new(1, "Star").unwrap(),
        Publication::new(1, "Haifa board").unwrap(),
    ];
    let actual = publication::Manager::create_all(&db, &batch)
        .await
        .unwrap_err();
    assert!(matches!(actual, StoreError::Constraint(_)));
    assert!(publication::Manager::find_all(&db).await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_find_all_by_author_expect_exactly_the_matching_subset() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    common::seed_catalog(&db).await;
    let rowling_books = book::Manager::find_all_by_author(&db, "J.K Rowling")
        .await
        .unwrap();
    assert_eq!(rowling_books.len(), 2);
    assert!(rowling_books
        .iter()
        .all(|b| b.author.as_deref() == Some("J.K Rowling")));
    let first = book::Manager::find_first_by_author(&db, "J.K Rowling")
        .await
        .unwrap();
    assert!(first.is_some());
    let nobody = book::Manager::find_first_by_author(&db, "Nobody")
        .await
        .unwrap();
    assert!(nobody.is_none());
}

#[actix_web::test]
async fn test_find_all_filtered_with_order_by_expect_sorted_ascending() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    common::seed_catalog(&db).await;
    let filter = BookFilter::new()
        .by_author("J.K Rowling")
        .order_by(BookOrder::Title);
    let books = book::Manager::find_all_filtered(&db, &filter).await.unwrap();
    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Harry Potter and the Chambers of Secrets",
            "Harry Potter and the Philosopher's Stone",
        ]
    );
}

#[actix_web::test]
async fn test_find_all_filtered_when_rated_above_expect_relational_subset() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    common::seed_catalog(&db).await;
    let filter = BookFilter::new().rated_above(3.0);
    let books = book::Manager::find_all_filtered(&db, &filter).await.unwrap();
    assert_eq!(books.len(), 3);
    assert!(books.iter().all(|b| b.avg_rating > Some(3.0)));
    assert!(!books
        .iter()
        .any(|b| b.title == "Harry Potter and the Philosopher's Stone"));
}

#[actix_web::test]
async fn test_find_all_filtered_with_limit_expect_row_count_capped() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    common::seed_catalog(&db).await;
    let filter = BookFilter::new().limit(2);
    let books = book::Manager::find_all_filtered(&db, &filter).await.unwrap();
    assert_eq!(books.len(), 2);
}

#[actix_web::test]
async fn test_find_first_when_empty_expect_none() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    assert!(book::Manager::find_first(&db).await.unwrap().is_none());
    let missing = book::Manager::find_by_id(&db, 1).await.unwrap_err();
    assert!(matches!(missing, StoreError::NotFound { table: "book", .. }));
}

#[actix_web::test]
async fn test_update_format_then_refetch_expect_only_format_changed() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    common::seed_catalog(&db).await;
    let before = book::Manager::find_first_by_title(&db, "Peter Pan")
        .await
        .unwrap()
        .unwrap();
    let mut changed = before.clone();
    changed.format = Some("AudioBook".to_owned());
    book::Manager::update(&db, &changed).await.unwrap();
    let after = book::Manager::find_by_id(&db, before.id).await.unwrap();
    assert_eq!(after.format.as_deref(), Some("AudioBook"));
    assert_eq!(after.title, before.title);
    assert_eq!(after.author, before.author);
    assert_eq!(after.avg_rating, before.avg_rating);
    assert_eq!(after.image, before.image);
    assert_eq!(after.num_pages, before.num_pages);
    assert_eq!(after.pub_date, before.pub_date);
    assert_eq!(after.pub_id, before.pub_id);
}

#[actix_web::test]
async fn test_update_when_value_violates_constraint_expect_error() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    common::seed_catalog(&db).await;
    let mut book_row = book::Manager::find_first(&db).await.unwrap().unwrap();
    book_row.format = Some("x".repeat(51));
    let actual = book::Manager::update(&db, &book_row).await.unwrap_err();
    assert!(matches!(actual, StoreError::Constraint(_)));
}

#[actix_web::test]
async fn test_delete_by_id_when_already_deleted_expect_not_found() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    let inserted = book::Manager::insert(
        &db,
        &NewBook::new("Ephemeral", None, None, None, None, None, None).unwrap(),
    )
    .await
    .unwrap();
    book::Manager::delete(&db, &inserted).await.unwrap();
    let again = book::Manager::delete_by_id(&db, inserted.id)
        .await
        .unwrap_err();
    assert!(matches!(again, StoreError::NotFound { table: "book", .. }));
}

#[actix_web::test]
async fn test_delete_by_pub_id_when_no_match_expect_zero_rows() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    let removed = book::Manager::delete_by_pub_id(&db, 42).await.unwrap();
    assert_eq!(removed, 0);
}

// The end-to-end flow from the original catalog walkthrough.
#[actix_web::test]
async fn test_end_to_end_stimatski_flow() {
    let dir = tempdir().unwrap();
    let db = common::connect_to_scratch_db(&dir).await;
    publication::Manager::create(&db, &Publication::new(104, "Stimatski").unwrap())
        .await
        .unwrap();
    let peter_pan = NewBook::new(
        "Peter Pan",
        Some("J.M Barrie"),
        Some(4.7),
        Some("Hard-Cover"),
        None,
        None,
        Some(104),
    )
    .unwrap();
    book::Manager::insert(&db, &peter_pan).await.unwrap();

    // Follow the foreign key the way a caller would: look the publication
    // up by name, then filter books by its id.
    let stimatski = publication::Manager::find_first_by_name(&db, "Stimatski")
        .await
        .unwrap()
        .unwrap();
    let stimatski_books = book::Manager::find_all_by_pub_id(&db, stimatski.id)
        .await
        .unwrap();
    assert_eq!(stimatski_books.len(), 1);
    assert_eq!(stimatski_books[0].title, "Peter Pan");

    let mut fetched = stimatski_books.into_iter().next().unwrap();
    fetched.format = Some("AudioBook".to_owned());
    book::Manager::update(&db, &fetched).await.unwrap();
    let refetched = book::Manager::find_by_id(&db, fetched.id).await.unwrap();
    assert_eq!(refetched.format.as_deref(), Some("AudioBook"));
}
