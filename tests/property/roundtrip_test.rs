// tests/property/roundtrip_test.rs

//! Property-based round-trip tests: the codec over arbitrary command frames,
//! and write/read command pairs over arbitrary data.

use crate::test_helpers::TestContext;
use bytes::{Bytes, BytesMut};
use citrinedb::core::RespValue;
use citrinedb::core::protocol::{RespFrame, RespFrameCodec};
use proptest::prelude::*;
use tokio_util::codec::Decoder;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        max_shrink_iters: 1000,
        ..ProptestConfig::default()
    })]

    /// Any command frame — arbitrary binary arguments included — survives
    /// encode-then-decode byte for byte.
    #[test]
    fn test_command_frame_codec_roundtrip(
        parts in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..200), 1..10)
    ) {
        let frame = RespFrame::Array(
            parts
                .iter()
                .map(|p| RespFrame::BulkString(Bytes::from(p.clone())))
                .collect(),
        );
        let encoded = frame.encode_to_vec().unwrap();

        let mut codec = RespFrameCodec;
        let mut buf = BytesMut::from(&encoded[..]);
        let decoded = codec.decode(&mut buf).unwrap().unwrap();
        prop_assert_eq!(decoded, frame);
        prop_assert!(buf.is_empty());
    }

    #[test]
    fn test_set_get_roundtrip(
        key in "[a-zA-Z0-9_]{1,50}",
        value in ".{0,500}"
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestContext::new();

            let set_result = ctx.set(&key, &value).await.unwrap();
            assert_eq!(set_result, RespValue::SimpleString("OK".into()));

            let get_result = ctx.get(&key).await.unwrap();
            match get_result {
                RespValue::BulkString(bs) => {
                    assert_eq!(String::from_utf8_lossy(&bs), value);
                }
                other => panic!("GET should return BulkString, got {other:?}"),
            }
        });
    }

    #[test]
    fn test_rpush_lrange_roundtrip(
        key in "[a-zA-Z0-9_]{1,50}",
        values in prop::collection::vec(".{0,100}", 1..=25)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let ctx = TestContext::new();
            let value_refs: Vec<&str> = values.iter().map(|s| s.as_str()).collect();

            let rpush_result = ctx.rpush(&key, &value_refs).await.unwrap();
            assert_eq!(rpush_result, RespValue::Integer(values.len() as i64));

            // LRANGE 0 -1 returns everything in head-to-tail order.
            let lrange_result = ctx.lrange(&key, 0, -1).await.unwrap();
            match lrange_result {
                RespValue::Array(arr) => {
                    assert_eq!(arr.len(), values.len());
                    for (i, value) in values.iter().enumerate() {
                        match &arr[i] {
                            RespValue::BulkString(bs) => {
                                assert_eq!(&String::from_utf8_lossy(bs), value);
                            }
                            other => panic!("expected BulkString element, got {other:?}"),
                        }
                    }
                }
                other => panic!("LRANGE should return Array, got {other:?}"),
            }
        });
    }
}
