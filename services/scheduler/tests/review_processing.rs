//! Review-processing tests: grading, counters, leech marking, and
//! the review log.

mod common;

use std::sync::Arc;

use chrono::Duration;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use parlons_scheduler::{CardStatus, CardStore, EngineError, Grade, StoreError};

use common::{recognition_card, seed_review_card, TestContext};

#[tokio::test]
async fn created_card_starts_new_and_immediately_due() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();

    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();

    assert_eq!(card.status, CardStatus::New);
    assert_eq!(card.ease_factor, 2.5);
    assert_eq!(card.interval_days, 0.0);
    assert_eq!(card.repetitions, 0);
    assert_eq!(card.lapses, 0);
    assert_eq!(card.total_reviews, 0);
    assert_eq!(card.next_review, Some(card.created_at));
    assert_eq!(card.last_reviewed, None);
}

#[tokio::test]
async fn reviewing_unknown_card_is_not_found() {
    let ctx = TestContext::new();
    let missing = Uuid::new_v4();

    let error = ctx
        .engine
        .process_review(missing, Grade::Good, None)
        .await
        .unwrap_err();

    assert!(matches!(error, EngineError::CardNotFound(id) if id == missing));
}

#[tokio::test]
async fn first_review_easy_graduates_at_easy_interval() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();

    let outcome = ctx
        .engine
        .process_review(card.id, Grade::Easy, Some(1800))
        .await
        .unwrap();

    assert_eq!(outcome.card.status, CardStatus::Review);
    assert_eq!(outcome.interval_days, 4.0);
    // Graduation does not touch ease.
    assert_eq!(outcome.card.ease_factor, 2.5);
    let reviewed_at = outcome.card.last_reviewed.unwrap();
    assert_eq!(outcome.next_review, reviewed_at + Duration::days(4));
}

#[tokio::test]
async fn first_review_good_stays_in_learning() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();

    let outcome = ctx
        .engine
        .process_review(card.id, Grade::Good, None)
        .await
        .unwrap();

    assert_eq!(outcome.card.status, CardStatus::Learning);
    assert!((outcome.interval_days - 10.0 / 1440.0).abs() < 1e-9);
    let reviewed_at = outcome.card.last_reviewed.unwrap();
    assert_eq!(outcome.next_review, reviewed_at + Duration::minutes(10));
}

#[tokio::test]
async fn good_review_multiplies_interval_by_ease() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();
    let card = seed_review_card(&ctx.store, &card, 10.0, 2.5).await;

    let outcome = ctx
        .engine
        .process_review(card.id, Grade::Good, None)
        .await
        .unwrap();

    assert_eq!(outcome.interval_days, 25.0);
    assert!((outcome.card.ease_factor - 2.5).abs() < 1e-9);
    let reviewed_at = outcome.card.last_reviewed.unwrap();
    assert_eq!(outcome.next_review, reviewed_at + Duration::days(25));
}

#[tokio::test]
async fn long_success_streak_stays_schedulable() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();
    let card = seed_review_card(&ctx.store, &card, 10.0, 2.5).await;

    let mut interval_days = 0.0;
    for _ in 0..30 {
        interval_days = ctx
            .engine
            .process_review(card.id, Grade::Good, None)
            .await
            .unwrap()
            .interval_days;
    }

    assert_eq!(interval_days, ctx.engine.config().maximum_interval_days);
}

#[tokio::test]
async fn failed_review_lapses_into_relearning() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();
    let card = seed_review_card(&ctx.store, &card, 10.0, 2.5).await;

    let outcome = ctx
        .engine
        .process_review(card.id, Grade::Wrong, None)
        .await
        .unwrap();

    assert_eq!(outcome.card.status, CardStatus::Relearning);
    assert_eq!(outcome.interval_days, 1.0);
    assert_eq!(outcome.card.repetitions, 0);
    assert_eq!(outcome.card.lapses, 1);
    assert!((outcome.card.ease_factor - 2.3).abs() < 1e-9);
}

#[tokio::test]
async fn counters_track_every_review() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();

    for grade in [Grade::Good, Grade::Blackout, Grade::Hard, Grade::Easy] {
        ctx.engine.process_review(card.id, grade, None).await.unwrap();
    }

    let card = ctx.store.get_card(card.id).await.unwrap().unwrap();
    assert_eq!(card.total_reviews, 4);
    assert_eq!(card.correct_reviews, 3);
    assert_eq!(card.lapses, 1);
}

#[tokio::test]
async fn leech_tag_is_added_exactly_once() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();

    // Seed the card one lapse short of the threshold.
    let mut seeded = ctx.store.get_card(card.id).await.unwrap().unwrap();
    seeded.lapses = 7;
    ctx.store.update_card(&seeded).await.unwrap();

    let outcome = ctx
        .engine
        .process_review(card.id, Grade::Blackout, None)
        .await
        .unwrap();
    assert_eq!(outcome.card.lapses, 8);
    assert!(outcome.card.is_leech());

    // Further failures must not duplicate the tag.
    let outcome = ctx
        .engine
        .process_review(card.id, Grade::Blackout, None)
        .await
        .unwrap();
    let leech_tags = outcome
        .card
        .tags
        .iter()
        .filter(|tag| *tag == "leech")
        .count();
    assert_eq!(leech_tags, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_reviews_of_one_card_lose_nothing() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();

    let engine = Arc::new(ctx.engine);
    let mut handles = Vec::new();
    for _ in 0..100 {
        let engine = engine.clone();
        let card_id = card.id;
        handles.push(tokio::spawn(async move {
            engine
                .process_review(card_id, Grade::Wrong, None)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let card = ctx.store.get_card(card.id).await.unwrap().unwrap();
    assert_eq!(card.total_reviews, 100);
    assert_eq!(card.lapses, 100);
    assert_eq!(card.correct_reviews, 0);

    let history = engine.review_history(card.id).await.unwrap();
    assert_eq!(history.len(), 100);
}

#[tokio::test]
async fn review_log_records_before_and_after_state() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();
    let card = seed_review_card(&ctx.store, &card, 10.0, 2.5).await;

    ctx.engine
        .process_review(card.id, Grade::Good, Some(2500))
        .await
        .unwrap();
    ctx.engine
        .process_review(card.id, Grade::Wrong, None)
        .await
        .unwrap();

    let history = ctx.engine.review_history(card.id).await.unwrap();
    assert_eq!(history.len(), 2);

    let first = &history[0];
    assert_eq!(first.grade, 4);
    assert_eq!(first.time_spent_ms, Some(2500));
    assert_eq!(first.interval_before, 10.0);
    assert_eq!(first.interval_after, 25.0);

    let second = &history[1];
    assert_eq!(second.grade, 1);
    assert_eq!(second.interval_before, 25.0);
    assert_eq!(second.interval_after, 1.0);
}

#[tokio::test]
async fn stale_card_write_is_rejected_by_the_store() {
    let ctx = TestContext::new();
    let user = Uuid::new_v4();
    let card = ctx.engine.create_card(recognition_card(user)).await.unwrap();

    let fresh = ctx.store.get_card(card.id).await.unwrap().unwrap();
    let stale = fresh.clone();
    ctx.store.update_card(&fresh).await.unwrap();

    let error = ctx.store.update_card(&stale).await.unwrap_err();
    assert!(matches!(error, StoreError::VersionConflict(id) if id == card.id));
}

#[tokio::test]
async fn review_history_for_unknown_card_is_not_found() {
    let ctx = TestContext::new();
    let error = ctx.engine.review_history(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(error, EngineError::CardNotFound(_)));
}
