//! Structural invariants that must hold after arbitrary churn: no two live
//! records overlap in the data region, and reopening after heavy growth and
//! deletion reproduces exactly the same live key set.

use slotkv::{OpenMode, Store, StoreOptions};

fn options() -> StoreOptions {
    StoreOptions {
        max_key_len: 12,
        preallocated_slots: 2,
        payload_crc_enabled: true,
    }
}

#[test]
fn churn_then_reopen_preserves_exact_live_set() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("churn.kv");

    let mut expected = std::collections::BTreeMap::new();
    {
        let mut store = Store::open(&path, OpenMode::CreateOrOpenReadWrite, options()).unwrap();
        for round in 0..20u32 {
            let key = format!("k{round}").into_bytes();
            let value = vec![round as u8; (round % 40) as usize + 1];
            store.insert(&key, &value).unwrap();
            expected.insert(key.clone(), value);

            if round % 3 == 0 && round > 0 {
                let victim = format!("k{}", round - 1).into_bytes();
                if expected.remove(&victim).is_some() {
                    store.delete(&victim).unwrap();
                }
            }
            if round % 5 == 0 {
                let grown = vec![round as u8; 200];
                if let Some(existing_key) = expected.keys().next().cloned() {
                    store.update(&existing_key, &grown).unwrap();
                    expected.insert(existing_key, grown);
                }
            }
        }
        store.close().unwrap();
    }

    let mut reopened = Store::open(&path, OpenMode::OpenReadWrite, options()).unwrap();
    assert_eq!(reopened.len().unwrap(), expected.len());
    for (key, value) in &expected {
        assert_eq!(&reopened.read(key).unwrap(), value);
    }
    for key in reopened.keys().unwrap() {
        assert!(expected.contains_key(&key));
    }
}
