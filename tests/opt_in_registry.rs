use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use eventsBot::error::PersistenceError;
use eventsBot::service::opt_in_registry::{OptInOutcome, OptInRegistry, OptOutOutcome};
use eventsBot::store::{load_user_ids, save_user_ids};

fn temp_file() -> PathBuf {
    env::temp_dir()
        .join(format!("eventsbot_it_{}", uuid::Uuid::new_v4()))
        .join("optedInUsers.json")
}

#[tokio::test]
async fn opt_in_then_out_updates_membership() {
    let registry = OptInRegistry::load(temp_file()).await.unwrap();
    assert!(registry.is_empty().await);

    assert_eq!(registry.opt_in(7).await, OptInOutcome::Added);
    assert!(registry.contains(7).await);
    assert_eq!(registry.opt_in(7).await, OptInOutcome::AlreadyPresent);
    assert_eq!(registry.len().await, 1);

    assert_eq!(registry.opt_out(7).await, OptOutOutcome::Removed);
    assert!(!registry.contains(7).await);
    assert_eq!(registry.opt_out(7).await, OptOutOutcome::NotPresent);
}

#[tokio::test]
async fn every_mutation_is_persisted() {
    let path = temp_file();
    let registry = OptInRegistry::load(path.clone()).await.unwrap();
    registry.opt_in(1).await;
    registry.opt_in(2).await;
    registry.opt_out(1).await;
    assert!(!registry.is_dirty().await);

    let reloaded = OptInRegistry::load(path).await.unwrap();
    assert_eq!(reloaded.snapshot().await, HashSet::from([2]));
}

#[tokio::test]
async fn repeated_opt_in_does_not_rewrite_file() {
    let path = temp_file();
    let registry = OptInRegistry::load(path.clone()).await.unwrap();
    registry.opt_in(5).await;
    std::fs::remove_file(&path).unwrap();

    assert_eq!(registry.opt_in(5).await, OptInOutcome::AlreadyPresent);
    assert!(!path.exists());
}

#[tokio::test]
async fn save_then_load_round_trips() {
    let path = temp_file();
    let users: HashSet<u64> = HashSet::from([u64::MAX, 0, 123_456_789_012_345_678]);
    save_user_ids(&path, &users).await.unwrap();
    assert_eq!(load_user_ids(&path).await.unwrap(), users);

    save_user_ids(&path, &HashSet::new()).await.unwrap();
    assert!(load_user_ids(&path).await.unwrap().is_empty());

    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn malformed_file_is_reported() {
    let path = temp_file();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not json").unwrap();

    let err = OptInRegistry::load(path).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Malformed { .. }));
}

#[tokio::test]
async fn failed_save_leaves_registry_dirty_until_flush() {
    let dir = env::temp_dir().join(format!("eventsbot_it_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    // A directory in place of the file makes the rename fail.
    let path = dir.join("optedInUsers.json");
    std::fs::create_dir_all(path.join("blocker")).unwrap();

    let registry = OptInRegistry::empty(path.clone());
    assert_eq!(registry.opt_in(9).await, OptInOutcome::Added);
    assert!(registry.contains(9).await);
    assert!(registry.is_dirty().await);
    assert!(registry.flush().await.is_err());

    std::fs::remove_dir_all(&path).unwrap();
    registry.flush().await.unwrap();
    assert!(!registry.is_dirty().await);
    assert_eq!(load_user_ids(&path).await.unwrap(), HashSet::from([9]));
}
