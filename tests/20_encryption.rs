mod common;

use anyhow::Result;
use uuid::Uuid;

use hrm_api::crypto::{self, KeyMaterial};
use hrm_api::services::EncryptionError;

const MATERIAL_A: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
const MATERIAL_B: &str = "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

#[tokio::test]
async fn encrypt_requires_an_active_key() {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    // no keys at all: the write must fail, never store plaintext
    let err = state
        .encryption
        .encrypt_for_owner(owner, "50000")
        .await
        .unwrap_err();
    assert!(matches!(err, EncryptionError::NoActiveKey));
}

#[tokio::test]
async fn owner_round_trip_with_stored_key() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    state
        .keys
        .add_key(owner, owner, "1234", None, Some(MATERIAL_A.to_string()))
        .await?;

    let token = state.encryption.encrypt_for_owner(owner, "50000").await?;
    assert_ne!(token, "50000");
    assert_eq!(token.split(':').count(), 3, "token must carry a key-id tag");

    let value = state.encryption.decrypt_for_owner(owner, &token).await?;
    assert_eq!(value, "50000");
    Ok(())
}

#[tokio::test]
async fn tagged_fields_survive_key_rotation() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    // key A is first, so active; encrypt under it
    let a = state
        .keys
        .add_key(owner, owner, "1111", None, Some(MATERIAL_A.to_string()))
        .await?;
    let token = state.encryption.encrypt_for_owner(owner, "50000").await?;

    // PIN verification: right PIN matches A, wrong PIN matches nothing
    let hit = state.keys.verify(owner, "1111").await?;
    assert!(hit.matched);
    assert_eq!(hit.key_id, Some(a.id));
    assert!(!state.keys.verify(owner, "2222").await?.matched);

    // add and activate key B
    let b = state
        .keys
        .add_key(owner, owner, "2222", None, Some(MATERIAL_B.to_string()))
        .await?;
    assert!(!b.active, "adding a key must not rotate implicitly");
    state.keys.activate(owner, b.id).await?;

    // the key-id tag resolves the historical key: old data stays readable
    let value = state.encryption.decrypt_for_owner(owner, &token).await?;
    assert_eq!(value, "50000");

    // new writes use B
    let fresh = state.encryption.encrypt_for_owner(owner, "60000").await?;
    let (tag, _) = crypto::split_tag(&fresh);
    assert_eq!(tag, Some(b.id));
    Ok(())
}

#[tokio::test]
async fn raw_decrypt_with_the_wrong_key_fails() {
    // the untagged primitive demonstrates the rotation-orphaning hazard the
    // key-id tag exists to prevent
    let a = KeyMaterial::from_exact(MATERIAL_A).unwrap();
    let b = KeyMaterial::from_exact(MATERIAL_B).unwrap();

    let token = crypto::encrypt_field("50000", &a);
    match crypto::decrypt_field(&token, &b) {
        Err(_) => {}
        Ok(v) => assert_ne!(v, "50000", "wrong key must never yield the plaintext"),
    }
}

#[tokio::test]
async fn deleted_key_makes_its_fields_unreadable() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    let a = state
        .keys
        .add_key(owner, owner, "1111", None, Some(MATERIAL_A.to_string()))
        .await?;
    let token = state.encryption.encrypt_for_owner(owner, "50000").await?;

    let b = state.keys.add_key(owner, owner, "2222", None, None).await?;
    state.keys.activate(owner, b.id).await?;
    state.keys.delete_key(owner, a.id).await?;

    let err = state
        .encryption
        .decrypt_for_owner(owner, &token)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EncryptionError::Crypto(hrm_api::crypto::CryptoError::Decrypt)
    ));
    Ok(())
}

#[tokio::test]
async fn tags_do_not_cross_tenant_boundaries() -> Result<()> {
    let state = common::test_state();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    state
        .keys
        .add_key(alice, alice, "1111", None, Some(MATERIAL_A.to_string()))
        .await?;
    state
        .keys
        .add_key(bob, bob, "2222", None, Some(MATERIAL_B.to_string()))
        .await?;

    let token = state.encryption.encrypt_for_owner(alice, "50000").await?;

    // bob cannot decrypt alice's field even though the key id is valid
    let err = state
        .encryption
        .decrypt_for_owner(bob, &token)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EncryptionError::Crypto(hrm_api::crypto::CryptoError::Decrypt)
    ));
    Ok(())
}

#[tokio::test]
async fn legacy_untagged_fields_use_the_active_key() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    state
        .keys
        .add_key(owner, owner, "1234", None, Some(MATERIAL_A.to_string()))
        .await?;

    // a field written before key-id tagging existed
    let key = KeyMaterial::from_exact(MATERIAL_A).unwrap();
    let legacy = crypto::encrypt_field("45000", &key);

    let value = state.encryption.decrypt_for_owner(owner, &legacy).await?;
    assert_eq!(value, "45000");
    Ok(())
}
