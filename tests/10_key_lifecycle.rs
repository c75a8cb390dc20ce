mod common;

use anyhow::Result;
use uuid::Uuid;

#[tokio::test]
async fn first_key_auto_activates() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    let first = state
        .keys
        .add_key(owner, owner, "1234", Some("primary".to_string()), None)
        .await?;
    assert!(first.active, "owner's first key must auto-activate");

    let second = state.keys.add_key(owner, owner, "5678", None, None).await?;
    assert!(!second.active, "later keys must not steal activation");
    Ok(())
}

#[tokio::test]
async fn empty_pin_is_rejected() {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    for pin in ["", "   "] {
        let err = state
            .keys
            .add_key(owner, owner, pin, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, hrm_api::services::KeyError::Validation(_)));
    }
}

#[tokio::test]
async fn explicit_key_material_must_be_32_chars() {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    let one_short = "x".repeat(31);
    let one_long = "x".repeat(33);
    for bad in ["short", one_short.as_str(), one_long.as_str()] {
        let err = state
            .keys
            .add_key(owner, owner, "1234", None, Some(bad.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, hrm_api::services::KeyError::Validation(_)));
    }

    let ok = state
        .keys
        .add_key(owner, owner, "1234", None, Some("y".repeat(32)))
        .await;
    assert!(ok.is_ok());
}

#[tokio::test]
async fn listing_never_exposes_secret_material() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    state
        .keys
        .add_key(owner, owner, "1234", Some("payroll".to_string()), None)
        .await?;

    let keys = state.keys.list_keys(owner).await?;
    assert_eq!(keys.len(), 1);

    let json = serde_json::to_value(&keys)?;
    let entry = json[0].as_object().unwrap();
    assert!(!entry.contains_key("hash"));
    assert!(!entry.contains_key("key"));
    assert!(!entry.contains_key("material"));
    assert_eq!(entry["label"], "payroll");
    Ok(())
}

#[tokio::test]
async fn activation_leaves_exactly_one_active_key() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    let a = state.keys.add_key(owner, owner, "1111", None, None).await?;
    let b = state.keys.add_key(owner, owner, "2222", None, None).await?;
    assert!(a.active && !b.active);

    state.keys.activate(owner, b.id).await?;

    let keys = state.keys.list_keys(owner).await?;
    let active: Vec<_> = keys.iter().filter(|k| k.active).collect();
    assert_eq!(active.len(), 1, "exactly one key may be active");
    assert_eq!(active[0].id, b.id);
    Ok(())
}

#[tokio::test]
async fn activation_is_scoped_to_the_owner() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();
    let other = Uuid::new_v4();

    let mine = state.keys.add_key(owner, owner, "1111", None, None).await?;
    let theirs = state.keys.add_key(other, other, "2222", None, None).await?;

    // activating a foreign key id must fail, not cross tenants
    let err = state.keys.activate(owner, theirs.id).await.unwrap_err();
    assert!(matches!(err, hrm_api::services::KeyError::NotFound));

    let keys = state.keys.list_keys(owner).await?;
    assert!(keys.iter().any(|k| k.id == mine.id && k.active));
    Ok(())
}

#[tokio::test]
async fn delete_removes_the_key_even_when_active() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    let key = state.keys.add_key(owner, owner, "1234", None, None).await?;
    assert!(key.active);

    state.keys.delete_key(owner, key.id).await?;
    assert!(state.keys.list_keys(owner).await?.is_empty());

    let err = state.keys.delete_key(owner, key.id).await.unwrap_err();
    assert!(matches!(err, hrm_api::services::KeyError::NotFound));
    Ok(())
}

#[tokio::test]
async fn verify_matches_the_right_key() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    let a = state.keys.add_key(owner, owner, "1111", None, None).await?;
    let b = state.keys.add_key(owner, owner, "2222", None, None).await?;

    let hit = state.keys.verify(owner, "2222").await?;
    assert!(hit.matched);
    assert_eq!(hit.key_id, Some(b.id));

    let hit = state.keys.verify(owner, "1111").await?;
    assert!(hit.matched);
    assert_eq!(hit.key_id, Some(a.id));

    let miss = state.keys.verify(owner, "9999").await?;
    assert!(!miss.matched);
    assert_eq!(miss.key_id, None);
    Ok(())
}

#[tokio::test]
async fn gate_denies_wrong_pin_opaquely() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    let key = state.keys.add_key(owner, owner, "1234", None, None).await?;

    let id = state.keys.authorize_decryption(owner, "1234").await?;
    assert_eq!(id, key.id);

    let err = state
        .keys
        .authorize_decryption(owner, "0000")
        .await
        .unwrap_err();
    assert!(matches!(err, hrm_api::services::KeyError::Denied));

    // an owner with no keys at all gets the same denial
    let err = state
        .keys
        .authorize_decryption(Uuid::new_v4(), "1234")
        .await
        .unwrap_err();
    assert!(matches!(err, hrm_api::services::KeyError::Denied));
    assert_eq!(err.to_string(), "not authorized");
    Ok(())
}
