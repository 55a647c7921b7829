mod common;

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;

use common::{
    combos, fixed_resolver, no_location, recommendation_session, reply, restaurant, user,
    FakeBackend,
};
use meal_finder_rs::error::{LocationError, MealError};
use meal_finder_rs::flows::{DiscoveryScope, RefreshOutcome};
use meal_finder_rs::state::{SelectionStatus, Submission};

fn two_restaurants() -> FakeBackend {
    FakeBackend {
        restaurants: vec![restaurant(1, "A"), restaurant(2, "B")],
        replies: HashMap::from([(1, reply(combos(10, 2))), (2, reply(combos(20, 2)))]),
        user: Some(user()),
        ..FakeBackend::default()
    }
}

fn one_big_restaurant() -> FakeBackend {
    FakeBackend {
        replies: HashMap::from([(7, reply(combos(100, 8)))]),
        user: Some(user()),
        ..FakeBackend::default()
    }
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_refresh_keeps_latest() {
    let backend = Arc::new(FakeBackend {
        scripted_discovery: Mutex::new(VecDeque::from([
            (Duration::from_millis(500), vec![restaurant(1, "A")]),
            (Duration::from_millis(10), vec![restaurant(2, "B")]),
        ])),
        ..two_restaurants()
    });
    let session = recommendation_session(&backend, fixed_resolver()).await;

    let first = session.refresh(DiscoveryScope::Nearby, 700);
    let second = async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        session.refresh(DiscoveryScope::Nearby, 700).await
    };
    let (first, second) = tokio::join!(first, second);

    let second = match second.unwrap() {
        RefreshOutcome::Applied(results) => results,
        other => panic!("newer refresh was not applied: {other:?}"),
    };
    assert!(second.iter().all(|c| c.restaurant_name == "B"));

    match first.unwrap() {
        RefreshOutcome::Superseded(generation) => assert_eq!(generation.value(), 1),
        other => panic!("older refresh was applied: {other:?}"),
    }

    assert_eq!(session.displayed_generation().map(|g| g.value()), Some(2));
    let shown = session.results().unwrap();
    assert!(shown.iter().all(|c| c.restaurant_name == "B"));
}

#[tokio::test]
async fn test_refresh_all_supported_needs_no_location() {
    let backend = Arc::new(two_restaurants());
    let session = recommendation_session(&backend, no_location()).await;

    let outcome = session
        .refresh(DiscoveryScope::AllSupported, 700)
        .await
        .unwrap();

    match outcome {
        RefreshOutcome::Applied(results) => assert_eq!(results.len(), 4),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_nearby_without_location_is_reported() {
    let backend = Arc::new(two_restaurants());
    let session = recommendation_session(&backend, no_location()).await;

    let err = session
        .refresh(DiscoveryScope::Nearby, 700)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        MealError::Location(LocationError::Unavailable)
    ));
    assert_eq!(backend.discovery_calls.load(Ordering::SeqCst), 0);
    assert!(session.results().is_none());
}

#[tokio::test]
async fn test_discovery_failure_is_reported() {
    let backend = Arc::new(FakeBackend {
        discovery_fails: true,
        ..two_restaurants()
    });
    let session = recommendation_session(&backend, fixed_resolver()).await;

    let err = session
        .refresh(DiscoveryScope::Nearby, 700)
        .await
        .unwrap_err();

    assert!(matches!(err, MealError::DiscoveryUnavailable(_)));
    assert_eq!(backend.recommend_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_zero_calorie_limit_is_rejected() {
    let backend = Arc::new(two_restaurants());
    let session = recommendation_session(&backend, fixed_resolver()).await;

    let err = session
        .refresh(DiscoveryScope::Nearby, 0)
        .await
        .unwrap_err();

    assert!(matches!(err, MealError::InvalidInput(_)));
    assert_eq!(backend.discovery_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_save_requires_sign_in() {
    let backend = Arc::new(FakeBackend {
        user: None,
        ..two_restaurants()
    });
    let session = recommendation_session(&backend, fixed_resolver()).await;
    session.refresh(DiscoveryScope::Nearby, 700).await.unwrap();

    let err = session.save_combination(0).await.unwrap_err();

    assert!(err.is_auth_required());
    assert!(backend.saved().is_empty());
    assert_eq!(session.status_of(0), SelectionStatus::Idle);
}

#[tokio::test]
async fn test_double_save_sends_one_request() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(FakeBackend {
        save_gate: Some(gate.clone()),
        ..two_restaurants()
    });
    let session = recommendation_session(&backend, fixed_resolver()).await;
    session.refresh(DiscoveryScope::Nearby, 700).await.unwrap();

    let release = async {
        tokio::task::yield_now().await;
        assert_eq!(session.status_of(0), SelectionStatus::Pending);
        gate.notify_one();
    };
    let (first, second, ()) = tokio::join!(
        session.save_combination(0),
        session.save_combination(0),
        release
    );

    assert_eq!(first.unwrap(), Submission::Committed);
    assert_eq!(second.unwrap(), Submission::AlreadyPending);
    assert_eq!(backend.saved().len(), 1);
    assert_eq!(session.status_of(0), SelectionStatus::Committed);

    assert_eq!(
        session.save_combination(0).await.unwrap(),
        Submission::AlreadyCommitted
    );
    assert_eq!(backend.saved().len(), 1);
}

#[tokio::test]
async fn test_saved_meal_uses_displayed_items() {
    let backend = Arc::new(two_restaurants());
    let session = recommendation_session(&backend, fixed_resolver()).await;
    session.refresh(DiscoveryScope::Nearby, 700).await.unwrap();
    let displayed = session.results().unwrap().get(3).cloned().unwrap();

    session.save_combination(3).await.unwrap();

    assert_eq!(
        backend.saved(),
        vec![(displayed.restaurant_id, displayed.menu_item_ids())]
    );
}

#[tokio::test]
async fn test_failed_save_can_be_retried() {
    let backend = Arc::new(two_restaurants());
    backend.saves_fail.store(true, Ordering::SeqCst);
    let session = recommendation_session(&backend, fixed_resolver()).await;
    session.refresh(DiscoveryScope::Nearby, 700).await.unwrap();

    let err = session.save_combination(1).await.unwrap_err();
    assert!(matches!(err, MealError::PersistenceFailed(_)));
    assert_eq!(session.status_of(1), SelectionStatus::Failed);

    backend.saves_fail.store(false, Ordering::SeqCst);
    assert_eq!(
        session.save_combination(1).await.unwrap(),
        Submission::Committed
    );
    assert_eq!(session.status_of(1), SelectionStatus::Committed);
    assert_eq!(backend.saved().len(), 2);
}

#[tokio::test]
async fn test_save_out_of_range_is_rejected() {
    let backend = Arc::new(two_restaurants());
    let session = recommendation_session(&backend, fixed_resolver()).await;
    session.refresh(DiscoveryScope::Nearby, 700).await.unwrap();

    let err = session.save_combination(99).await.unwrap_err();

    assert!(matches!(err, MealError::InvalidInput(_)));
    assert!(backend.saved().is_empty());
}

#[tokio::test]
async fn test_new_results_start_with_fresh_save_state() {
    let backend = Arc::new(two_restaurants());
    let session = recommendation_session(&backend, fixed_resolver()).await;
    session.refresh(DiscoveryScope::Nearby, 700).await.unwrap();
    session.save_combination(0).await.unwrap();
    assert_eq!(session.status_of(0), SelectionStatus::Committed);

    session.refresh(DiscoveryScope::Nearby, 700).await.unwrap();

    assert_eq!(session.status_of(0), SelectionStatus::Idle);
}

#[tokio::test]
async fn test_single_restaurant_list_is_unsampled_and_savable() {
    let backend = Arc::new(one_big_restaurant());
    let session = recommendation_session(&backend, no_location()).await;

    let outcome = session
        .refresh_restaurant(&restaurant(7, "Chipotle"), 700)
        .await
        .unwrap();

    let results = match outcome {
        RefreshOutcome::Applied(results) => results,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(results.len(), 8);
    assert_eq!(session.results().unwrap().len(), 8);

    assert_eq!(
        session.save_combination(7).await.unwrap(),
        Submission::Committed
    );
    assert_eq!(backend.saved(), vec![(7, vec![107])]);
    assert_eq!(session.status_of(7), SelectionStatus::Committed);
}

#[tokio::test]
async fn test_single_restaurant_double_save_sends_one_request() {
    let gate = Arc::new(Notify::new());
    let backend = Arc::new(FakeBackend {
        save_gate: Some(gate.clone()),
        ..one_big_restaurant()
    });
    let session = recommendation_session(&backend, no_location()).await;
    let chipotle = restaurant(7, "Chipotle");
    session.refresh_restaurant(&chipotle, 700).await.unwrap();

    let release = async {
        tokio::task::yield_now().await;
        assert_eq!(session.status_of(5), SelectionStatus::Pending);
        gate.notify_one();
    };
    let (first, second, ()) = tokio::join!(
        session.save_combination(5),
        session.save_combination(5),
        release
    );

    assert_eq!(first.unwrap(), Submission::Committed);
    assert_eq!(second.unwrap(), Submission::AlreadyPending);
    assert_eq!(backend.saved(), vec![(7, vec![105])]);
}

#[tokio::test]
async fn test_single_restaurant_replaces_sampled_results() {
    let backend = Arc::new(FakeBackend {
        restaurants: vec![restaurant(7, "Chipotle")],
        ..one_big_restaurant()
    });
    let session = recommendation_session(&backend, fixed_resolver()).await;
    session.refresh(DiscoveryScope::Nearby, 700).await.unwrap();
    session.save_combination(0).await.unwrap();
    assert_eq!(session.results().unwrap().len(), 5);

    let chipotle = restaurant(7, "Chipotle");
    session.refresh_restaurant(&chipotle, 700).await.unwrap();

    assert_eq!(session.displayed_generation().map(|g| g.value()), Some(2));
    assert_eq!(session.results().unwrap().len(), 8);
    assert_eq!(session.status_of(0), SelectionStatus::Idle);
}

#[tokio::test]
async fn test_single_restaurant_rejects_zero_limit_and_reports_failure() {
    let backend = Arc::new(one_big_restaurant());
    let session = recommendation_session(&backend, no_location()).await;

    let err = session
        .refresh_restaurant(&restaurant(7, "Chipotle"), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, MealError::InvalidInput(_)));
    assert_eq!(backend.recommend_calls.load(Ordering::SeqCst), 0);

    let err = session
        .refresh_restaurant(&restaurant(8, "Subway"), 700)
        .await
        .unwrap_err();
    assert!(matches!(err, MealError::RecommendationUnavailable { .. }));
    assert!(session.results().is_none());
}
