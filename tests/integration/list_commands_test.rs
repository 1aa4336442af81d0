// tests/integration/list_commands_test.rs

//! Integration tests for RPUSH, LPUSH, LRANGE, LLEN, and LPOP.

use super::test_helpers::{TestContext, bulk, expect_array};
use citrinedb::core::{CitrineError, RespValue};

#[tokio::test]
async fn test_rpush_lrange_lpop_llen() {
    let ctx = TestContext::new();

    assert_eq!(
        ctx.rpush("mylist", &["a", "b", "c"]).await.unwrap(),
        RespValue::Integer(3)
    );

    let items = expect_array(ctx.lrange("mylist", 0, -1).await.unwrap());
    assert_eq!(items, vec![bulk("a"), bulk("b"), bulk("c")]);

    assert_eq!(ctx.lpop("mylist").await.unwrap(), bulk("a"));
    assert_eq!(ctx.llen("mylist").await.unwrap(), RespValue::Integer(2));
}

#[tokio::test]
async fn test_lpush_prepends_reversed() {
    let ctx = TestContext::new();
    ctx.rpush("mylist", &["b", "c"]).await.unwrap();

    // LPUSH x y on [b, c] yields [y, x, b, c].
    assert_eq!(
        ctx.lpush("mylist", &["x", "y"]).await.unwrap(),
        RespValue::Integer(4)
    );
    let items = expect_array(ctx.lrange("mylist", 0, -1).await.unwrap());
    assert_eq!(items, vec![bulk("y"), bulk("x"), bulk("b"), bulk("c")]);
}

#[tokio::test]
async fn test_lpush_onto_fresh_key() {
    let ctx = TestContext::new();
    assert_eq!(
        ctx.lpush("fresh", &["a", "b", "c"]).await.unwrap(),
        RespValue::Integer(3)
    );
    let items = expect_array(ctx.lrange("fresh", 0, -1).await.unwrap());
    assert_eq!(items, vec![bulk("c"), bulk("b"), bulk("a")]);
}

#[tokio::test]
async fn test_lrange_clamps_and_negative_indices() {
    let ctx = TestContext::new();
    ctx.rpush("l", &["a", "b", "c", "d", "e"]).await.unwrap();

    // Tail slice via negative start.
    let items = expect_array(ctx.lrange("l", -2, -1).await.unwrap());
    assert_eq!(items, vec![bulk("d"), bulk("e")]);

    // Negative stop short of the tail.
    let items = expect_array(ctx.lrange("l", 0, -2).await.unwrap());
    assert_eq!(items, vec![bulk("a"), bulk("b"), bulk("c"), bulk("d")]);

    // Out-of-range stop clamps to the end.
    let items = expect_array(ctx.lrange("l", 2, 100).await.unwrap());
    assert_eq!(items, vec![bulk("c"), bulk("d"), bulk("e")]);

    // Inverted range is empty.
    assert!(expect_array(ctx.lrange("l", 3, 1).await.unwrap()).is_empty());

    // Start past the end is empty.
    assert!(expect_array(ctx.lrange("l", 9, 12).await.unwrap()).is_empty());
}

#[tokio::test]
async fn test_missing_key_is_lenient_for_lists() {
    let ctx = TestContext::new();
    assert!(expect_array(ctx.lrange("nope", 0, -1).await.unwrap()).is_empty());
    assert_eq!(ctx.llen("nope").await.unwrap(), RespValue::Integer(0));
    assert_eq!(ctx.lpop("nope").await.unwrap(), RespValue::Null);
    assert_eq!(ctx.run(&["LPOP", "nope", "3"]).await.unwrap(), RespValue::Null);
}

#[tokio::test]
async fn test_lpop_count() {
    let ctx = TestContext::new();
    ctx.rpush("l", &["a", "b", "c"]).await.unwrap();

    let items = expect_array(ctx.run(&["LPOP", "l", "2"]).await.unwrap());
    assert_eq!(items, vec![bulk("a"), bulk("b")]);

    // Asking for more than remains takes what's there.
    let items = expect_array(ctx.run(&["LPOP", "l", "5"]).await.unwrap());
    assert_eq!(items, vec![bulk("c")]);

    // The emptied list replies null bulk, not an empty array.
    assert_eq!(ctx.run(&["LPOP", "l", "2"]).await.unwrap(), RespValue::Null);
}

#[tokio::test]
async fn test_emptied_list_key_stays_present() {
    let ctx = TestContext::new();
    ctx.rpush("l", &["only"]).await.unwrap();
    ctx.lpop("l").await.unwrap();

    // The key still exists as an (empty) list.
    assert_eq!(
        ctx.type_of("l").await.unwrap(),
        RespValue::SimpleString("list".to_string())
    );
    assert_eq!(ctx.llen("l").await.unwrap(), RespValue::Integer(0));
}

#[tokio::test]
async fn test_list_ops_on_string_key_are_wrong_type() {
    let ctx = TestContext::new();
    ctx.set("s", "v").await.unwrap();

    assert!(matches!(
        ctx.rpush("s", &["a"]).await.unwrap_err(),
        CitrineError::WrongType
    ));
    assert!(matches!(
        ctx.lpush("s", &["a"]).await.unwrap_err(),
        CitrineError::WrongType
    ));
    assert!(matches!(
        ctx.lrange("s", 0, -1).await.unwrap_err(),
        CitrineError::WrongType
    ));
    assert!(matches!(
        ctx.llen("s").await.unwrap_err(),
        CitrineError::WrongType
    ));
    assert!(matches!(
        ctx.lpop("s").await.unwrap_err(),
        CitrineError::WrongType
    ));
}

#[tokio::test]
async fn test_lrange_non_integer_index() {
    let ctx = TestContext::new();
    ctx.rpush("l", &["a"]).await.unwrap();
    let err = ctx.run(&["LRANGE", "l", "zero", "-1"]).await.unwrap_err();
    assert!(matches!(err, CitrineError::NotAnInteger));
}

#[tokio::test]
async fn test_llen_tracks_pushes_and_pops() {
    let ctx = TestContext::new();
    ctx.rpush("l", &["a", "b"]).await.unwrap();
    ctx.lpush("l", &["c"]).await.unwrap();
    ctx.lpop("l").await.unwrap();
    assert_eq!(ctx.llen("l").await.unwrap(), RespValue::Integer(2));
}
