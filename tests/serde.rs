#![cfg(feature = "serde")]

use paged_memory::{OwnedSet, Pages};

fn sample() -> Pages {
    let mut pages = Pages::new(3, 1);
    pages.append_begin(0).unwrap();
    pages.append_set(0, &[0, 2, 3], &[7]).unwrap();
    pages.append_set(0, &[1, 3], &[8]).unwrap();
    pages.assign_singleton(2, 5, &[9]).unwrap();
    pages
}

#[test]
fn bincode_keeps_contents_and_state() {
    let pages = sample();
    let encoded = bincode::serialize(&pages).unwrap();
    let mut decoded: Pages = bincode::deserialize(&encoded).unwrap();
    assert_eq!(decoded, pages);

    // The decoded container remembers which indices are written.
    assert!(decoded.append_begin(1).is_err());
    assert!(decoded.assign_singleton(2, 6, &[0]).is_err());
}

#[test]
fn json_owned_sets() {
    let pages = sample();
    let owned = pages.sets(0).unwrap().map(|set| set.into_owned()).collect::<Vec<_>>();
    let text = serde_json::to_string(&owned).unwrap();
    let back: Vec<OwnedSet> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, owned);
    assert_eq!(&back[1].elements[..], &[1, 3]);
    assert_eq!(&back[1].extras[..], &[8]);
}

#[test]
fn json_keeps_contents_and_state() {
    let pages = sample();
    let text = serde_json::to_string(&pages).unwrap();
    let mut decoded: Pages = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, pages);
    assert!(decoded.append_begin(1).is_err());
}

#[test]
fn open_index_survives() {
    let mut pages = Pages::new(2, 0);
    pages.append_begin(1).unwrap();
    pages.append_set(1, &[4], &[]).unwrap();
    let encoded = bincode::serialize(&pages).unwrap();
    let mut decoded: Pages = bincode::deserialize(&encoded).unwrap();
    decoded.append_set(1, &[5, 6], &[]).unwrap();
    assert_eq!(decoded.count(1).unwrap(), 2);
}

/// Decodes `text`, expecting it to be refused.
fn refused(text: &str) -> String {
    match serde_json::from_str::<Pages>(text) {
        Ok(pages) => panic!("accepted malformed input: {pages:?}"),
        Err(error) => error.to_string(),
    }
}

#[test]
fn json_rejects_malformed() {
    // More offsets than counts.
    refused(r#"{"offset":[0,0],"count":[3],"data":[1,4],"extras":0,"last":null,"appending":false}"#);
    // Two records claimed, one stored.
    refused(r#"{"offset":[0],"count":[2],"data":[1,4],"extras":0,"last":0,"appending":false}"#);
    // A record whose extras run past the store.
    refused(r#"{"offset":[0],"count":[1],"data":[1,4],"extras":1,"last":0,"appending":false}"#);
    // Sets for an index that was never written.
    refused(r#"{"offset":[4294967295],"count":[1],"data":[1,4],"extras":0,"last":null,"appending":false}"#);
    // Overlapping indices.
    refused(r#"{"offset":[0,1],"count":[1,1],"data":[1,4,1,5],"extras":0,"last":1,"appending":false}"#);
}

#[test]
fn json_rejects_inconsistent_state() {
    // `last` names an index below the highest written one.
    let text = refused(r#"{"offset":[0,2],"count":[1,0],"data":[1,4],"extras":0,"last":0,"appending":false}"#);
    assert!(text.contains("disagrees with offsets"), "{text}");
    // `last` is set but nothing is written.
    refused(r#"{"offset":[4294967295],"count":[0],"data":[],"extras":0,"last":0,"appending":false}"#);
    // Appends would land after another index's records.
    refused(r#"{"offset":[0,2],"count":[1,0],"data":[1,4,1,5],"extras":0,"last":1,"appending":true}"#);
}

