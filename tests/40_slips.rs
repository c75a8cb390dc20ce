mod common;

use std::collections::BTreeMap;

use anyhow::Result;
use rust_decimal::Decimal;
use uuid::Uuid;

use hrm_api::services::{KeyError, SlipError};

fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn slip_creation_requires_an_active_key() {
    let state = common::test_state();
    let owner = Uuid::new_v4();

    let err = state
        .slips
        .create_slip(owner, Uuid::new_v4(), fields(&[("basic", "1000")]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SlipError::Encryption(hrm_api::services::EncryptionError::NoActiveKey)
    ));

    // nothing was stored
    assert!(state.slips.list_slips(owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn slip_fields_are_stored_encrypted() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();
    state.keys.add_key(owner, owner, "1234", None, None).await?;

    let slip = state
        .slips
        .create_slip(
            owner,
            Uuid::new_v4(),
            fields(&[("basic", "1000"), ("bonus", "200")]),
        )
        .await?;

    for (name, stored) in &slip.fields {
        assert_ne!(stored, "1000", "field {name} must not be plaintext");
        assert_ne!(stored, "200", "field {name} must not be plaintext");
        assert_eq!(stored.split(':').count(), 3, "field {name} must be tagged");
    }

    // identical amounts encrypt to different tokens (random IV)
    let again = state
        .slips
        .create_slip(owner, Uuid::new_v4(), fields(&[("basic", "1000")]))
        .await?;
    assert_ne!(again.fields["basic"], slip.fields["basic"]);
    Ok(())
}

#[tokio::test]
async fn unknown_fields_are_rejected() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();
    state.keys.add_key(owner, owner, "1234", None, None).await?;

    let err = state
        .slips
        .create_slip(owner, Uuid::new_v4(), fields(&[("salary_total", "1000")]))
        .await
        .unwrap_err();
    assert!(matches!(err, SlipError::Validation(_)));

    let err = state
        .slips
        .create_slip(owner, Uuid::new_v4(), BTreeMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SlipError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn decrypt_is_pin_gated_and_computes_totals() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();
    state.keys.add_key(owner, owner, "1234", None, None).await?;

    let employee = Uuid::new_v4();
    let slip = state
        .slips
        .create_slip(
            owner,
            employee,
            fields(&[
                ("basic", "1000"),
                ("bonus", "200"),
                ("tax_deduction", "50"),
            ]),
        )
        .await?;

    // wrong PIN: denied before any decryption
    let err = state
        .slips
        .decrypt_slip(owner, slip.id, "0000")
        .await
        .unwrap_err();
    assert!(matches!(err, SlipError::Key(KeyError::Denied)));

    let decrypted = state.slips.decrypt_slip(owner, slip.id, "1234").await?;
    assert_eq!(decrypted.employee_id, employee);
    assert_eq!(decrypted.fields["basic"], "1000");
    assert_eq!(decrypted.fields["bonus"], "200");
    assert_eq!(decrypted.fields["tax_deduction"], "50");
    assert_eq!(decrypted.totals.total_allowances, Decimal::from(1200));
    assert_eq!(decrypted.totals.total_deductions, Decimal::from(50));
    assert_eq!(decrypted.totals.net_payable, Decimal::from(1150));
    Ok(())
}

#[tokio::test]
async fn decrypt_survives_key_rotation() -> Result<()> {
    let state = common::test_state();
    let owner = Uuid::new_v4();
    state.keys.add_key(owner, owner, "1111", None, None).await?;

    let slip = state
        .slips
        .create_slip(owner, Uuid::new_v4(), fields(&[("basic", "1000")]))
        .await?;

    let b = state.keys.add_key(owner, owner, "2222", None, None).await?;
    state.keys.activate(owner, b.id).await?;

    // either PIN opens the gate; the key-id tag finds the historical key
    let decrypted = state.slips.decrypt_slip(owner, slip.id, "2222").await?;
    assert_eq!(decrypted.fields["basic"], "1000");
    Ok(())
}

#[tokio::test]
async fn slips_are_partitioned_by_owner() -> Result<()> {
    let state = common::test_state();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    state.keys.add_key(alice, alice, "1111", None, None).await?;
    state.keys.add_key(bob, bob, "2222", None, None).await?;

    let slip = state
        .slips
        .create_slip(alice, Uuid::new_v4(), fields(&[("basic", "1000")]))
        .await?;

    assert_eq!(state.slips.list_slips(alice).await?.len(), 1);
    assert!(state.slips.list_slips(bob).await?.is_empty());

    // bob cannot decrypt alice's slip even with his own valid PIN
    let err = state
        .slips
        .decrypt_slip(bob, slip.id, "2222")
        .await
        .unwrap_err();
    assert!(matches!(err, SlipError::NotFound));
    Ok(())
}
