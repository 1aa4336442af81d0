// tests/integration/blocking_test.rs

//! Integration tests for the blocking commands: BLPOP and XREAD BLOCK.
//!
//! All tests run on a paused clock, so sleeps advance virtual time
//! deterministically instead of burning wall-clock time.

use super::test_helpers::{TestContext, bulk, expect_array};
use citrinedb::core::{CitrineError, RespValue};
use std::time::Duration;
use tokio::time::sleep;

// ===== BLPOP =====

#[tokio::test(start_paused = true)]
async fn test_blpop_immediate_success() {
    let ctx = TestContext::new();
    ctx.rpush("mylist", &["value1", "value2"]).await.unwrap();

    let result = ctx.blpop("mylist", 1.0).await.unwrap();
    let items = expect_array(result);
    assert_eq!(items, vec![bulk("mylist"), bulk("value1")]);

    // One element was consumed.
    assert_eq!(ctx.llen("mylist").await.unwrap(), RespValue::Integer(1));
}

#[tokio::test(start_paused = true)]
async fn test_blpop_timeout_returns_null_array() {
    let ctx = TestContext::new();
    let result = ctx.blpop("mylist", 0.1).await.unwrap();
    assert_eq!(result, RespValue::NullArray);
}

#[tokio::test(start_paused = true)]
async fn test_blpop_woken_by_rpush() {
    let ctx = TestContext::new();

    // Client A blocks on the empty queue.
    let waiter = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.run_as(&["BLPOP", "q", "0"], 2).await })
    };
    sleep(Duration::from_millis(10)).await;

    // Client B pushes one element; its reply is the post-push length.
    assert_eq!(ctx.rpush("q", &["hello"]).await.unwrap(), RespValue::Integer(1));

    // A wakes with the element, and the queue is empty afterwards.
    let result = waiter.await.unwrap().unwrap();
    assert_eq!(expect_array(result), vec![bulk("q"), bulk("hello")]);
    assert_eq!(ctx.llen("q").await.unwrap(), RespValue::Integer(0));
}

#[tokio::test(start_paused = true)]
async fn test_blpop_on_emptied_list_blocks() {
    let ctx = TestContext::new();

    // Leave an empty-but-present list behind.
    ctx.rpush("q", &["x"]).await.unwrap();
    ctx.lpop("q").await.unwrap();
    assert_eq!(
        ctx.type_of("q").await.unwrap(),
        RespValue::SimpleString("list".to_string())
    );

    let waiter = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.run_as(&["BLPOP", "q", "0"], 2).await })
    };
    sleep(Duration::from_millis(10)).await;
    ctx.rpush("q", &["y"]).await.unwrap();

    let result = waiter.await.unwrap().unwrap();
    assert_eq!(expect_array(result), vec![bulk("q"), bulk("y")]);
}

#[tokio::test(start_paused = true)]
async fn test_blpop_fairness_first_waiter_wins() {
    let ctx = TestContext::new();

    // Register two waiters in a known order.
    let first = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.run_as(&["BLPOP", "q", "0"], 2).await })
    };
    sleep(Duration::from_millis(10)).await;
    let second = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.run_as(&["BLPOP", "q", "0"], 3).await })
    };
    sleep(Duration::from_millis(10)).await;

    // One push serves exactly the first waiter.
    ctx.rpush("q", &["a"]).await.unwrap();
    let result = first.await.unwrap().unwrap();
    assert_eq!(expect_array(result), vec![bulk("q"), bulk("a")]);
    assert!(!second.is_finished());

    // The next push serves the remaining waiter.
    ctx.rpush("q", &["b"]).await.unwrap();
    let result = second.await.unwrap().unwrap();
    assert_eq!(expect_array(result), vec![bulk("q"), bulk("b")]);
}

#[tokio::test(start_paused = true)]
async fn test_multi_element_push_wakes_at_most_one_waiter() {
    let ctx = TestContext::new();

    let first = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.run_as(&["BLPOP", "q", "0"], 2).await })
    };
    sleep(Duration::from_millis(10)).await;
    let second = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.run_as(&["BLPOP", "q", "0"], 3).await })
    };
    sleep(Duration::from_millis(10)).await;

    // A single three-element push wakes only the first waiter, even though
    // it could satisfy both.
    assert_eq!(
        ctx.rpush("q", &["a", "b", "c"]).await.unwrap(),
        RespValue::Integer(3)
    );
    let result = first.await.unwrap().unwrap();
    assert_eq!(expect_array(result), vec![bulk("q"), bulk("a")]);

    sleep(Duration::from_millis(10)).await;
    assert!(!second.is_finished());
    assert_eq!(ctx.llen("q").await.unwrap(), RespValue::Integer(2));

    // The second waiter is served by the next push call, head first.
    ctx.rpush("q", &["d"]).await.unwrap();
    let result = second.await.unwrap().unwrap();
    assert_eq!(expect_array(result), vec![bulk("q"), bulk("b")]);
}

#[tokio::test(start_paused = true)]
async fn test_blpop_wrong_type_errors_before_blocking() {
    let ctx = TestContext::new();
    ctx.set("q", "not a list").await.unwrap();
    let err = ctx.blpop("q", 0.1).await.unwrap_err();
    assert!(matches!(err, CitrineError::WrongType));
}

#[tokio::test]
async fn test_blpop_negative_timeout_is_rejected() {
    let ctx = TestContext::new();
    let err = ctx.blpop("q", -1.0).await.unwrap_err();
    assert!(matches!(err, CitrineError::NegativeTimeout));
}

#[tokio::test(start_paused = true)]
async fn test_vanished_waiter_does_not_lose_the_element() {
    let ctx = TestContext::new();

    // A client blocks, then disappears mid-block (task cancelled).
    let waiter = {
        let ctx = ctx.clone();
        tokio::spawn(async move { ctx.run_as(&["BLPOP", "q", "0"], 7).await })
    };
    sleep(Duration::from_millis(10)).await;
    waiter.abort();
    sleep(Duration::from_millis(10)).await;

    // The push finds only the dead waiter; the element must stay queued.
    ctx.rpush("q", &["precious"]).await.unwrap();
    assert_eq!(ctx.llen("q").await.unwrap(), RespValue::Integer(1));
    assert_eq!(
        expect_array(ctx.lrange("q", 0, -1).await.unwrap()),
        vec![bulk("precious")]
    );
}

// ===== XREAD BLOCK =====

/// Unwraps `[[key, [[id, fields]...]]...]` and returns the (key, ids) pairs.
fn stream_keys_and_ids(value: RespValue) -> Vec<(RespValue, Vec<RespValue>)> {
    expect_array(value)
        .into_iter()
        .map(|stream_reply| {
            let mut parts = expect_array(stream_reply);
            let entries = expect_array(parts.pop().unwrap());
            let key = parts.pop().unwrap();
            let ids = entries
                .into_iter()
                .map(|entry| expect_array(entry).swap_remove(0))
                .collect();
            (key, ids)
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_xread_block_woken_by_xadd() {
    let ctx = TestContext::new();
    ctx.xadd("s", "1-1", &[("f", "old")]).await.unwrap();

    let reader = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            ctx.run_as(&["XREAD", "BLOCK", "0", "STREAMS", "s", "$"], 2).await
        })
    };
    sleep(Duration::from_millis(10)).await;

    ctx.xadd("s", "2-1", &[("f", "new")]).await.unwrap();

    // Only the entry appended after the call is returned.
    let result = reader.await.unwrap().unwrap();
    let streams = stream_keys_and_ids(result);
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].0, bulk("s"));
    assert_eq!(streams[0].1, vec![bulk("2-1")]);
}

#[tokio::test(start_paused = true)]
async fn test_xread_block_timeout_returns_null_array() {
    let ctx = TestContext::new();
    ctx.xadd("s", "1-1", &[("f", "v")]).await.unwrap();

    let result = ctx
        .run(&["XREAD", "BLOCK", "100", "STREAMS", "s", "$"])
        .await
        .unwrap();
    assert_eq!(result, RespValue::NullArray);
}

#[tokio::test(start_paused = true)]
async fn test_xread_block_with_data_returns_immediately() {
    let ctx = TestContext::new();
    ctx.xadd("s", "1-1", &[("f", "v")]).await.unwrap();

    let result = ctx
        .run(&["XREAD", "BLOCK", "0", "STREAMS", "s", "0-0"])
        .await
        .unwrap();
    let streams = stream_keys_and_ids(result);
    assert_eq!(streams[0].1, vec![bulk("1-1")]);
}

#[tokio::test(start_paused = true)]
async fn test_xread_block_trailing_block_clause() {
    let ctx = TestContext::new();
    ctx.xadd("s", "1-1", &[("f", "v")]).await.unwrap();

    // The BLOCK clause is also accepted after the id list.
    let result = ctx
        .run(&["XREAD", "STREAMS", "s", "$", "BLOCK", "100"])
        .await
        .unwrap();
    assert_eq!(result, RespValue::NullArray);
}

#[tokio::test(start_paused = true)]
async fn test_xread_block_wakes_on_any_of_several_streams() {
    let ctx = TestContext::new();
    ctx.xadd("s1", "1-1", &[("f", "v")]).await.unwrap();
    ctx.xadd("s2", "1-1", &[("f", "v")]).await.unwrap();

    let reader = {
        let ctx = ctx.clone();
        tokio::spawn(async move {
            ctx.run_as(
                &["XREAD", "BLOCK", "0", "STREAMS", "s1", "s2", "$", "$"],
                2,
            )
            .await
        })
    };
    sleep(Duration::from_millis(10)).await;

    ctx.xadd("s2", "2-1", &[("g", "w")]).await.unwrap();

    // Only the stream that produced data appears in the reply.
    let result = reader.await.unwrap().unwrap();
    let streams = stream_keys_and_ids(result);
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].0, bulk("s2"));
    assert_eq!(streams[0].1, vec![bulk("2-1")]);
}
