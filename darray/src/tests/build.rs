use crate::builder::DoubleArrayBuilder;
use crate::errors::DarrayError;

use super::words;

/// 未ソートの入力は順序違反になる
#[test]
fn test_unsorted() {
    let e = DoubleArrayBuilder::new()
        .build(&["ab", "ac", "aa"])
        .unwrap_err();
    match e {
        DarrayError::OrderingViolation(e) => assert_eq!(2, e.index()),
        e => panic!("unexpected error: {e}"),
    }
}

/// 重複した入力は順序違反になる
#[test]
fn test_duplicated() {
    let e = DoubleArrayBuilder::new()
        .build(&["a", "b", "b", "c"])
        .unwrap_err();
    assert!(matches!(e, DarrayError::OrderingViolation(_)));
    assert!(!e.is_internal());
}

/// 順序違反は無効なバイトより先に検出される
#[test]
fn test_ordering_checked_from_the_first_key() {
    let e = DoubleArrayBuilder::new()
        .build(&["b", "a\0"])
        .unwrap_err();
    assert!(matches!(e, DarrayError::OrderingViolation(_)));
}

/// 辺コードに変換できないバイトは構築時に拒否される
#[test]
fn test_invalid_key_byte() {
    let e = DoubleArrayBuilder::new()
        .build(&[&b"a"[..], b"b\0c"])
        .unwrap_err();
    match e {
        DarrayError::InvalidKeyByte(e) => {
            assert_eq!(1, e.position());
            assert_eq!(0, e.byte());
        }
        e => panic!("unexpected error: {e}"),
    }

    let e = DoubleArrayBuilder::new()
        .code_offset(b'a' - 1)
        .build(&["A", "a"])
        .unwrap_err();
    assert!(matches!(e, DarrayError::InvalidKeyByte(_)));
}

/// 空のキー集合
#[test]
fn test_empty_key_set() {
    let keys: [&str; 0] = [];
    let da = DoubleArrayBuilder::new().build(&keys).unwrap();
    assert_eq!(2, da.num_nodes());
    assert_eq!(0, da.num_keys());
    assert_eq!(None, da.lookup(b"").unwrap());
    assert_eq!(None, da.lookup(b"a").unwrap());
}

/// 空文字列は先頭のキーとして登録できる
#[test]
fn test_empty_key() {
    let da = DoubleArrayBuilder::new().build(&["", "a"]).unwrap();
    assert_eq!(Some(0), da.lookup(b"").unwrap());
    assert_eq!(Some(1), da.lookup(b"a").unwrap());
}

/// 共通接頭辞を持つ小さなキー集合
#[test]
fn test_build_small() {
    let keys = ["ace", "ad", "ade", "cab", "dab", "dad"];
    let da = DoubleArrayBuilder::new().build(&keys).unwrap();

    assert_eq!(Some(0), da.lookup(b"ace").unwrap());
    assert_eq!(Some(3), da.lookup(b"cab").unwrap());
    assert_eq!(6, da.num_keys());

    assert_eq!(None, da.lookup(b"").unwrap());
    assert_eq!(None, da.lookup(b"a").unwrap());
    assert_eq!(None, da.lookup(b"da").unwrap());
    assert_eq!(None, da.lookup(b"dac").unwrap());
}

/// 辺コードのオフセットを指定した構築
#[test]
fn test_build_with_code_offset() {
    let keys = ["ab", "ac", "b", "da"];
    let da = DoubleArrayBuilder::new()
        .code_offset(b'a' - 1)
        .build(&keys)
        .unwrap();

    for (i, key) in keys.iter().enumerate() {
        assert_eq!(
            Some(u32::try_from(i).unwrap()),
            da.lookup_with_offset(key.as_bytes(), b'a' - 1).unwrap()
        );
    }
    assert_eq!(None, da.lookup_with_offset(b"a", b'a' - 1).unwrap());
    assert_eq!(None, da.lookup_with_offset(b"d", b'a' - 1).unwrap());
    assert!(da.lookup_with_offset(b"A", b'a' - 1).is_err());

    // Edge codes are what the trie actually stores.
    assert_eq!(Some(3), da.lookup_codes([4, 1]));
}

/// 識別子はソート順の順位と一致する
#[test]
fn test_ids_are_ranks() {
    let keys = words();
    let da = DoubleArrayBuilder::new().build(&keys).unwrap();
    assert_eq!(keys.len(), da.num_keys());
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(Some(u32::try_from(i).unwrap()), da.lookup(key.as_bytes()).unwrap());
    }
}

/// 配列の拡張は既存の割り当てを壊さない
#[test]
fn test_growth() {
    let keys = words();
    let grown = DoubleArrayBuilder::new()
        .initial_capacity(crate::builder::MIN_INITIAL_CAPACITY)
        .build(&keys)
        .unwrap();
    let roomy = DoubleArrayBuilder::new()
        .initial_capacity(1 << 16)
        .build(&keys)
        .unwrap();

    for key in &keys {
        let expected = roomy.lookup(key.as_bytes()).unwrap();
        assert!(expected.is_some());
        assert_eq!(expected, grown.lookup(key.as_bytes()).unwrap());

        let extended = format!("{key}x");
        assert_eq!(
            roomy.lookup(extended.as_bytes()).unwrap(),
            grown.lookup(extended.as_bytes()).unwrap()
        );
    }
}

/// 同じ入力からは同じ検索結果が得られる
#[test]
fn test_deterministic() {
    let keys = words();
    let a = DoubleArrayBuilder::new().build(&keys).unwrap();
    let b = DoubleArrayBuilder::new().build(&keys).unwrap();
    for key in &keys {
        assert_eq!(a.lookup(key.as_bytes()).unwrap(), b.lookup(key.as_bytes()).unwrap());
    }
}

/// 長いキーでもスタックを使い果たさない
#[test]
fn test_long_key() {
    let long = vec![b'a'; 3_000];
    let mut longer = long.clone();
    longer.push(b'b');
    let keys = [long.as_slice(), longer.as_slice()];
    let da = DoubleArrayBuilder::new().build(&keys).unwrap();
    assert_eq!(Some(0), da.lookup(&long).unwrap());
    assert_eq!(Some(1), da.lookup(&longer).unwrap());
    assert_eq!(None, da.lookup(&long[1..]).unwrap());
}

/// すべての辺コードを使うノード
#[test]
fn test_full_fanout() {
    let keys: Vec<Vec<u8>> = (1..=255u8).map(|b| vec![b, b]).collect();
    let da = DoubleArrayBuilder::new().build(&keys).unwrap();
    for (i, key) in keys.iter().enumerate() {
        assert_eq!(Some(u32::try_from(i).unwrap()), da.lookup(key).unwrap());
        assert_eq!(None, da.lookup(&key[..1]).unwrap());
    }
}
