use chrono::{Duration, Utc};
use domains::{DomainError, ProductRepository};
use integration_tests::Harness;
use services::flatten;
use tokio_test::assert_ok;

#[tokio::test]
async fn replies_stop_at_the_configured_depth() {
    let h = Harness::with_max_depth(2);
    let ada = h.user("Ada Lovelace").await;
    let grace = h.user("Grace Hopper").await;
    let product = h.product(ada.id, "Invoicely", Utc::now()).await;
    let now = Utc::now();

    let root = assert_ok!(h.comments.create(Some(ada.id), product.id, None, "First!", now).await);
    let reply = assert_ok!(
        h.comments
            .create(Some(grace.id), product.id, Some(root.id), "Welcome", now)
            .await
    );
    let deepest = assert_ok!(
        h.comments
            .create(Some(ada.id), product.id, Some(reply.id), "Thanks", now)
            .await
    );

    let err = h
        .comments
        .create(Some(grace.id), product.id, Some(deepest.id), "Too deep", now)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::validation("Maximum reply depth reached"));

    let entries = flatten(h.comments.thread(product.id, Some(grace.id)).await.unwrap());
    let depths: Vec<_> = entries.iter().map(|e| (e.depth, e.can_reply)).collect();
    assert_eq!(depths, vec![(0, true), (1, true), (2, false)]);

    let anonymous = flatten(h.comments.thread(product.id, None).await.unwrap());
    assert!(anonymous.iter().all(|e| !e.can_reply && !e.can_edit && !e.can_flag));
}

#[tokio::test]
async fn roots_newest_first_replies_oldest_first() {
    let h = Harness::new();
    let ada = h.user("Ada Lovelace").await;
    let product = h.product(ada.id, "Invoicely", Utc::now()).await;
    let t0 = Utc::now();

    let old_root = h.comments.create(Some(ada.id), product.id, None, "old", t0).await.unwrap();
    h.comments
        .create(Some(ada.id), product.id, None, "new", t0 + Duration::minutes(5))
        .await
        .unwrap();
    h.comments
        .create(Some(ada.id), product.id, Some(old_root.id), "reply a", t0 + Duration::minutes(1))
        .await
        .unwrap();
    h.comments
        .create(Some(ada.id), product.id, Some(old_root.id), "reply b", t0 + Duration::minutes(2))
        .await
        .unwrap();

    let contents: Vec<_> = flatten(h.comments.thread(product.id, None).await.unwrap())
        .into_iter()
        .map(|e| e.comment.content)
        .collect();
    assert_eq!(contents, vec!["new", "old", "reply a", "reply b"]);
}

#[tokio::test]
async fn deleting_a_comment_removes_its_replies() {
    let h = Harness::new();
    let ada = h.user("Ada Lovelace").await;
    let grace = h.user("Grace Hopper").await;
    let product = h.product(ada.id, "Invoicely", Utc::now()).await;
    let now = Utc::now();

    let root = h.comments.create(Some(ada.id), product.id, None, "root", now).await.unwrap();
    h.comments
        .create(Some(grace.id), product.id, Some(root.id), "reply", now)
        .await
        .unwrap();

    let err = h.comments.delete(Some(grace.id), root.id).await.unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    assert_ok!(h.comments.delete(Some(ada.id), root.id).await);
    assert!(h.comments.thread(product.id, None).await.unwrap().is_empty());
    let stored = h.store.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.comments_count, 0);
}

#[tokio::test]
async fn edit_and_flag_permissions() {
    let h = Harness::new();
    let ada = h.user("Ada Lovelace").await;
    let grace = h.user("Grace Hopper").await;
    let product = h.product(ada.id, "Invoicely", Utc::now()).await;
    let now = Utc::now();
    let comment = h.comments.create(Some(ada.id), product.id, None, "typo", now).await.unwrap();

    let err = h
        .comments
        .edit(Some(grace.id), comment.id, "hijack", now)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));

    let edited = h
        .comments
        .edit(Some(ada.id), comment.id, "fixed", now + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(edited.content, "fixed");
    assert!(edited.is_edited());

    let err = h.comments.flag(Some(ada.id), comment.id).await.unwrap_err();
    assert_eq!(err, DomainError::forbidden("You cannot flag your own comment"));

    let flagged = h.comments.flag(Some(grace.id), comment.id).await.unwrap();
    assert!(flagged.is_flagged);
    assert_ok!(h.comments.flag(Some(grace.id), comment.id).await);
}
