//! Integration tests for the RedisUtils façade
//!
//! These run against a live server at `REDIS_HOST` (and optional
//! `REDIS_PORT`); each test is skipped when `REDIS_HOST` is not set. Every
//! test works under its own random key prefix and removes its keys afterwards.

use redishaus::prelude::*;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    name: String,
    age: u32,
    tags: Vec<String>,
}

fn profile(name: &str, age: u32) -> Profile {
    Profile {
        name: name.to_string(),
        age,
        tags: vec!["a".to_string(), "b".to_string()],
    }
}

fn setup() -> Option<RedisHaus> {
    let host = std::env::var("REDIS_HOST").ok()?;
    let port = std::env::var("REDIS_PORT")
        .ok()
        .and_then(|port| port.parse().ok())
        .unwrap_or(6379);
    let prefix = format!("redishaus_test:{}:", Uuid::new_v4());

    let config = AppConfig {
        redis: RedisConfig::new(host, port, 0).with_key_prefix(&prefix),
        cache: CacheConfig::default(),
    };
    Some(RedisHaus::new(config).expect("Failed to build RedisHaus"))
}

async fn cleanup(haus: &RedisHaus) {
    let redis = haus.utils();
    let keys = redis.keys("*").await.unwrap();
    redis.delete_many(&keys).await.unwrap();
}

macro_rules! haus_or_skip {
    () => {
        match setup() {
            Some(haus) => haus,
            None => {
                eprintln!("REDIS_HOST not set, skipping");
                return;
            }
        }
    };
}

#[tokio::test]
async fn test_health_check() {
    let haus = haus_or_skip!();
    assert_eq!(haus.health_check().await.unwrap(), "PONG");
}

#[tokio::test]
async fn test_string_roundtrip_and_missing_key() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.set("profile", &profile("ada", 36)).await.unwrap();
    let loaded: Option<Profile> = redis.get("profile").await.unwrap();
    assert_eq!(loaded, Some(profile("ada", 36)));

    let untyped: Option<Value> = redis.get("profile").await.unwrap();
    assert_eq!(untyped.unwrap()["age"], 36);

    let missing: Option<Profile> = redis.get("nope").await.unwrap();
    assert!(missing.is_none());

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_json_text_is_parsed_into_structs() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    let text = serde_json::to_string(&profile("bob", 41)).unwrap();
    redis.set("encoded", &text).await.unwrap();

    let loaded: Option<Profile> = redis.get("encoded").await.unwrap();
    assert_eq!(loaded, Some(profile("bob", 41)));

    let as_text: Option<String> = redis.get("encoded").await.unwrap();
    assert_eq!(as_text, Some(text));

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_conditional_and_multi_writes() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    assert!(redis.set_if_absent("once", &1).await.unwrap());
    assert!(!redis.set_if_absent("once", &2).await.unwrap());

    redis.multi_set([("m1", 1), ("m2", 2)]).await.unwrap();
    let values: Vec<Option<i64>> = redis.multi_get(&["m1", "missing", "m2"]).await.unwrap();
    assert_eq!(values, vec![Some(1), None, Some(2)]);

    let previous: Option<i64> = redis.get_and_set("m1", &10).await.unwrap();
    assert_eq!(previous, Some(1));

    let empty: Vec<Option<i64>> = redis.multi_get::<i64, &str>(&[]).await.unwrap();
    assert!(empty.is_empty());

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_counters() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    assert_eq!(redis.increment("hits").await.unwrap(), 1);
    assert_eq!(redis.increment_by("hits", 4).await.unwrap(), 5);
    assert_eq!(redis.decrement("hits").await.unwrap(), 4);
    let hits: Option<i64> = redis.get("hits").await.unwrap();
    assert_eq!(hits, Some(4));

    let total = redis.increment_by_float("ratio", 0.5).await.unwrap();
    assert!((total - 0.5).abs() < f64::EPSILON);

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_expiry() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.set_ex("session", &"token", Duration::from_secs(30)).await.unwrap();
    let ttl = redis.get_expire("session").await.unwrap();
    assert!(ttl > 0 && ttl <= 30);

    redis.set_ex("short", &"token", Duration::from_millis(1500)).await.unwrap();
    let ttl_ms = redis.get_expire_millis("short").await.unwrap();
    assert!(ttl_ms > 0 && ttl_ms <= 1500);

    assert!(redis.persist("session").await.unwrap());
    assert_eq!(redis.get_expire("session").await.unwrap(), -1);

    assert!(redis.expire("session", Duration::from_secs(10)).await.unwrap());
    assert!(!redis.expire("missing", Duration::from_secs(10)).await.unwrap());

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_key_operations() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.set("alpha", &1).await.unwrap();
    redis.l_right_push("queue", &"job").await.unwrap();

    assert!(redis.has_key("alpha").await.unwrap());
    assert_eq!(redis.key_type("alpha").await.unwrap(), DataType::String);
    assert_eq!(redis.key_type("queue").await.unwrap(), DataType::List);
    assert_eq!(redis.key_type("missing").await.unwrap(), DataType::None);

    redis.rename("alpha", "beta").await.unwrap();
    assert!(!redis.has_key("alpha").await.unwrap());
    assert!(!redis.rename_if_absent("beta", "queue").await.unwrap());

    let mut scanned = redis.scan(&ScanOptions::all().count(10)).await.unwrap();
    scanned.sort();
    assert_eq!(scanned, vec!["beta".to_string(), "queue".to_string()]);

    assert!(redis.delete("beta").await.unwrap());
    assert_eq!(redis.delete_many::<&str>(&[]).await.unwrap(), 0);

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_hash_operations() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.h_put("user", "name", &"ada").await.unwrap();
    redis
        .h_put_all("user", [("city", json!("london")), ("visits", json!(3))])
        .await
        .unwrap();
    assert!(!redis.h_put_if_absent("user", "name", &"bob").await.unwrap());

    let name: Option<String> = redis.h_get("user", "name").await.unwrap();
    assert_eq!(name.as_deref(), Some("ada"));

    let all: std::collections::HashMap<String, Value> = redis.h_get_all("user").await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all["visits"], json!(3));

    let picked: Vec<Option<String>> = redis.h_multi_get("user", &["city", "zip"]).await.unwrap();
    assert_eq!(picked, vec![Some("london".to_string()), None]);

    assert_eq!(redis.h_increment("user", "visits", 2).await.unwrap(), 5);
    assert_eq!(redis.h_size("user").await.unwrap(), 3);

    let mut fields: Vec<String> = redis.h_keys("user").await.unwrap();
    fields.sort();
    assert_eq!(fields, vec!["city", "name", "visits"]);

    let scanned: std::collections::HashMap<String, Value> =
        redis.h_scan("user", &ScanOptions::all().pattern("n*")).await.unwrap();
    assert_eq!(scanned.keys().collect::<Vec<_>>(), vec!["name"]);

    assert_eq!(redis.h_delete("user", &["city", "zip"]).await.unwrap(), 1);
    assert_eq!(redis.h_delete::<&str>("user", &[]).await.unwrap(), 0);
    assert!(!redis.h_exists("user", "city").await.unwrap());

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_list_operations() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    assert_eq!(redis.l_right_push_all("jobs", &[1, 2, 3]).await.unwrap(), 3);
    assert_eq!(redis.l_left_push("jobs", &0).await.unwrap(), 4);
    assert_eq!(redis.l_right_push_all::<i64>("jobs", &[]).await.unwrap(), 0);

    let all: Vec<i64> = redis.l_range("jobs", 0, -1).await.unwrap();
    assert_eq!(all, vec![0, 1, 2, 3]);

    assert_eq!(redis.l_insert_after("jobs", &1, &9).await.unwrap(), 5);
    let second: Option<i64> = redis.l_index("jobs", 2).await.unwrap();
    assert_eq!(second, Some(9));

    let head: Option<i64> = redis.l_left_pop("jobs").await.unwrap();
    assert_eq!(head, Some(0));
    let tail: Option<i64> = redis.l_right_pop("jobs").await.unwrap();
    assert_eq!(tail, Some(3));

    redis.l_trim("jobs", 0, 1).await.unwrap();
    assert_eq!(redis.l_len("jobs").await.unwrap(), 2);

    assert_eq!(redis.l_left_push_if_present("absent", &1).await.unwrap(), 0);

    let moved: Option<i64> = redis.l_right_pop_and_left_push("jobs", "done").await.unwrap();
    assert_eq!(moved, Some(9));

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_blocking_pop_times_out() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    let popped: Option<i64> = redis
        .l_blocking_left_pop("empty", Duration::from_secs(1))
        .await
        .unwrap();
    assert!(popped.is_none());

    redis.l_right_push("ready", &7).await.unwrap();
    let popped: Option<i64> = redis
        .l_blocking_right_pop("ready", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(popped, Some(7));

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_set_operations() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    assert_eq!(redis.s_add("left", &["a", "b", "c"]).await.unwrap(), 3);
    assert_eq!(redis.s_add("right", &["b", "c", "d"]).await.unwrap(), 3);
    assert_eq!(redis.s_add::<&str>("left", &[]).await.unwrap(), 0);

    assert!(redis.s_is_member("left", &"a").await.unwrap());
    assert_eq!(redis.s_size("left").await.unwrap(), 3);

    let mut common: Vec<String> = redis.s_intersect("left", &["right"]).await.unwrap();
    common.sort();
    assert_eq!(common, vec!["b", "c"]);

    let mut only_left: Vec<String> = redis.s_difference("left", &["right"]).await.unwrap();
    only_left.sort();
    assert_eq!(only_left, vec!["a"]);

    assert_eq!(redis.s_union_and_store("left", &["right"], "both").await.unwrap(), 4);

    let sample: Vec<String> = redis.s_random_members("both", 6).await.unwrap();
    assert_eq!(sample.len(), 6);
    let distinct: Vec<String> = redis.s_distinct_random_members("both", 6).await.unwrap();
    assert_eq!(distinct.len(), 4);

    assert!(redis.s_move("left", &"a", "right").await.unwrap());
    assert_eq!(redis.s_remove("right", &["a", "z"]).await.unwrap(), 1);

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_sorted_set_operations() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    let members = vec![
        TypedTuple::new("bronze".to_string(), 10.0),
        TypedTuple::new("silver".to_string(), 20.0),
        TypedTuple::new("gold".to_string(), 30.0),
    ];
    assert_eq!(redis.z_add_all("board", &members).await.unwrap(), 3);
    assert!(!redis.z_add("board", &"gold", 35.0).await.unwrap());

    let ranked: Vec<TypedTuple<String>> = redis.z_range_with_scores("board", 0, -1).await.unwrap();
    assert_eq!(ranked.last().map(|t| t.score), Some(35.0));

    let top: Vec<String> = redis.z_reverse_range("board", 0, 0).await.unwrap();
    assert_eq!(top, vec!["gold"]);

    let middle: Vec<String> = redis.z_range_by_score("board", 15.0, 25.0).await.unwrap();
    assert_eq!(middle, vec!["silver"]);

    let paged: Vec<TypedTuple<String>> = redis
        .z_range_by_score_with_scores_limit("board", 0.0, 100.0, 1, 1)
        .await
        .unwrap();
    assert_eq!(paged[0].value, "silver");

    assert_eq!(redis.z_rank("board", &"bronze").await.unwrap(), Some(0));
    assert_eq!(redis.z_reverse_rank("board", &"bronze").await.unwrap(), Some(2));
    assert_eq!(redis.z_rank("board", &"tin").await.unwrap(), None);

    assert_eq!(redis.z_increment_score("board", &"bronze", 1.5).await.unwrap(), 11.5);
    assert_eq!(redis.z_score("board", &"bronze").await.unwrap(), Some(11.5));
    assert_eq!(redis.z_count("board", 11.0, 21.0).await.unwrap(), 2);

    let scanned: Vec<TypedTuple<String>> = redis.z_scan("board", &ScanOptions::all()).await.unwrap();
    assert_eq!(scanned.len(), 3);

    assert_eq!(redis.z_remove_range_by_score("board", 0.0, 12.0).await.unwrap(), 1);
    assert_eq!(redis.z_size("board").await.unwrap(), 2);

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_dump_expire_at_random_and_move() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.set("dumped", &"payload").await.unwrap();
    let dumped = redis.dump("dumped").await.unwrap();
    assert!(dumped.is_some_and(|bytes| !bytes.is_empty()));
    assert!(redis.dump("missing").await.unwrap().is_none());

    let deadline = chrono::Utc::now() + chrono::Duration::seconds(60);
    assert!(redis.expire_at("dumped", deadline).await.unwrap());
    let ttl = redis.get_expire("dumped").await.unwrap();
    assert!(ttl > 0 && ttl <= 60);

    assert!(redis.random_key().await.unwrap().is_some());

    assert!(redis.move_key("dumped", 1).await.unwrap());
    assert!(!redis.has_key("dumped").await.unwrap());
    assert!(!redis.move_key("missing", 1).await.unwrap());

    // The moved key now lives in database 1 under the same prefix
    let other_db = RedisHaus::new(AppConfig {
        redis: RedisConfig {
            database: 1,
            ..haus.template().config().clone()
        },
        cache: CacheConfig::default(),
    })
    .unwrap();
    let moved: Option<String> = other_db.utils().get("dumped").await.unwrap();
    assert_eq!(moved.as_deref(), Some("payload"));

    cleanup(&other_db).await;
    cleanup(&haus).await;
}

#[tokio::test]
async fn test_huge_expiry_keeps_the_key() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.set("forever", &1).await.unwrap();
    // Out-of-range expiries are rejected by the server instead of deleting the key
    let _ = redis.expire("forever", Duration::from_secs(u64::MAX)).await;
    assert!(redis.has_key("forever").await.unwrap());

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_string_ranges_bits_and_append() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.set("greeting", &"hello").await.unwrap();
    // Stored as the JSON text "hello", quotes included
    assert_eq!(redis.size("greeting").await.unwrap(), 7);
    assert_eq!(redis.get_range("greeting", 1, 5).await.unwrap(), "hello");

    assert_eq!(redis.set_range("greeting", &7, 1).await.unwrap(), 7);
    let patched: Option<String> = redis.get("greeting").await.unwrap();
    assert_eq!(patched.as_deref(), Some("7ello"));

    redis.set("number", &12).await.unwrap();
    assert_eq!(redis.append("number", "3").await.unwrap(), 3);
    let number: Option<i64> = redis.get("number").await.unwrap();
    assert_eq!(number, Some(123));

    assert!(!redis.set_bit("bits", 7, true).await.unwrap());
    assert!(redis.set_bit("bits", 7, true).await.unwrap());
    assert!(redis.get_bit("bits", 7).await.unwrap());
    assert!(!redis.get_bit("bits", 0).await.unwrap());

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_multi_set_if_absent_and_decrement_by() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    assert!(redis.multi_set_if_absent([("a", 1), ("b", 2)]).await.unwrap());
    assert!(!redis.multi_set_if_absent([("b", 3), ("c", 4)]).await.unwrap());
    assert!(!redis.has_key("c").await.unwrap());
    let b: Option<i64> = redis.get("b").await.unwrap();
    assert_eq!(b, Some(2));

    redis.increment_by("stock", 10).await.unwrap();
    assert_eq!(redis.decrement_by("stock", 4).await.unwrap(), 6);

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_hash_values_and_float_increment() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis
        .h_put_all("prices", [("apple", 1.5), ("pear", 2.25)])
        .await
        .unwrap();

    let mut values: Vec<f64> = redis.h_values("prices").await.unwrap();
    values.sort_by(|a, b| a.total_cmp(b));
    assert_eq!(values, vec![1.5, 2.25]);

    assert_eq!(redis.h_increment_float("prices", "apple", 0.25).await.unwrap(), 1.75);
    let apple: Option<f64> = redis.h_get("prices", "apple").await.unwrap();
    assert_eq!(apple, Some(1.75));

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_list_set_remove_and_insert() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.l_right_push_all("letters", &["a", "b", "a", "c"]).await.unwrap();
    redis.l_set("letters", 1, &"B").await.unwrap();
    assert_eq!(redis.l_remove("letters", 0, &"a").await.unwrap(), 2);

    let remaining: Vec<String> = redis.l_range("letters", 0, -1).await.unwrap();
    assert_eq!(remaining, vec!["B", "c"]);

    assert_eq!(redis.l_insert_before("letters", &"c", &"x").await.unwrap(), 3);
    assert_eq!(redis.l_insert_before("letters", &"nope", &"y").await.unwrap(), -1);
    let inserted: Vec<String> = redis.l_range("letters", 0, -1).await.unwrap();
    assert_eq!(inserted, vec!["B", "x", "c"]);

    assert_eq!(redis.l_right_push_if_present("letters", &"z").await.unwrap(), 4);
    assert_eq!(redis.l_right_push_if_present("absent", &"z").await.unwrap(), 0);
    assert!(!redis.has_key("absent").await.unwrap());

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_blocking_right_pop_and_left_push() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.l_right_push_all("source", &[1, 2]).await.unwrap();
    let moved: Option<i64> = redis
        .l_blocking_right_pop_and_left_push("source", "dest", Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(moved, Some(2));
    let head: Option<i64> = redis.l_index("dest", 0).await.unwrap();
    assert_eq!(head, Some(2));

    let nothing: Option<i64> = redis
        .l_blocking_right_pop_and_left_push("empty", "dest", Duration::from_secs(1))
        .await
        .unwrap();
    assert!(nothing.is_none());

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_set_members_pop_scan_and_stores() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    redis.s_add("s1", &["a", "b", "c"]).await.unwrap();
    redis.s_add("s2", &["c", "d"]).await.unwrap();

    let mut members: Vec<String> = redis.s_members("s1").await.unwrap();
    members.sort();
    assert_eq!(members, vec!["a", "b", "c"]);

    let random: Option<String> = redis.s_random_member("s1").await.unwrap();
    assert!(random.is_some_and(|member| members.contains(&member)));

    let mut union: Vec<String> = redis.s_union("s1", &["s2"]).await.unwrap();
    union.sort();
    assert_eq!(union, vec!["a", "b", "c", "d"]);

    assert_eq!(redis.s_intersect_and_store("s1", &["s2"], "inter").await.unwrap(), 1);
    assert_eq!(redis.s_difference_and_store("s1", &["s2"], "diff").await.unwrap(), 2);
    let mut diff: Vec<String> = redis.s_members("diff").await.unwrap();
    diff.sort();
    assert_eq!(diff, vec!["a", "b"]);

    let scanned: Vec<String> = redis.s_scan("s1", &ScanOptions::all()).await.unwrap();
    assert_eq!(scanned.len(), 3);
    // Members are matched in their serialized form, quotes included
    let matched: Vec<String> = redis
        .s_scan("s1", &ScanOptions::all().pattern("\"a\""))
        .await
        .unwrap();
    assert_eq!(matched, vec!["a"]);

    let popped: Option<String> = redis.s_pop("inter").await.unwrap();
    assert_eq!(popped.as_deref(), Some("c"));
    let empty: Option<String> = redis.s_pop("inter").await.unwrap();
    assert!(empty.is_none());

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_sorted_set_reverse_ranges_and_stores() {
    let haus = haus_or_skip!();
    let redis = haus.utils();

    let scores = vec![
        TypedTuple::new("a".to_string(), 1.0),
        TypedTuple::new("b".to_string(), 2.0),
        TypedTuple::new("c".to_string(), 3.0),
        TypedTuple::new("d".to_string(), 4.0),
    ];
    redis.z_add_all("z", &scores).await.unwrap();

    let window: Vec<TypedTuple<String>> =
        redis.z_range_by_score_with_scores("z", 2.0, 3.0).await.unwrap();
    assert_eq!(window, scores[1..3].to_vec());

    let top_two: Vec<TypedTuple<String>> = redis.z_reverse_range_with_scores("z", 0, 1).await.unwrap();
    assert_eq!(top_two, vec![scores[3].clone(), scores[2].clone()]);

    // Bounds are given low-to-high even though results come back high-to-low
    let reversed: Vec<String> = redis.z_reverse_range_by_score("z", 2.0, 3.0).await.unwrap();
    assert_eq!(reversed, vec!["c", "b"]);

    let reversed_scored: Vec<TypedTuple<String>> = redis
        .z_reverse_range_by_score_with_scores("z", 1.0, 4.0)
        .await
        .unwrap();
    assert_eq!(reversed_scored.first(), Some(&scores[3]));
    assert_eq!(reversed_scored.len(), 4);

    let page: Vec<String> = redis
        .z_reverse_range_by_score_limit("z", 1.0, 4.0, 1, 2)
        .await
        .unwrap();
    assert_eq!(page, vec!["c", "b"]);

    redis
        .z_add_all(
            "z2",
            &[
                TypedTuple::new("c".to_string(), 10.0),
                TypedTuple::new("e".to_string(), 5.0),
            ],
        )
        .await
        .unwrap();
    assert_eq!(redis.z_union_and_store("z", &["z2"], "union").await.unwrap(), 5);
    assert_eq!(redis.z_score("union", &"c").await.unwrap(), Some(13.0));
    assert_eq!(redis.z_intersect_and_store("z", &["z2"], "inter").await.unwrap(), 1);
    assert_eq!(redis.z_score("inter", &"c").await.unwrap(), Some(13.0));

    assert_eq!(redis.z_remove("z", &["a", "zz"]).await.unwrap(), 1);
    assert_eq!(redis.z_remove_range("z", 0, 0).await.unwrap(), 1);
    let rest: Vec<String> = redis.z_range("z", 0, -1).await.unwrap();
    assert_eq!(rest, vec!["c", "d"]);

    cleanup(&haus).await;
}

#[tokio::test]
async fn test_shared_connection_recovers_after_being_killed() {
    let haus = haus_or_skip!();
    let template = haus.template();

    let mut shared = template.connection().await.unwrap();
    let client_id: i64 = redis::cmd("CLIENT")
        .arg("ID")
        .query_async(&mut shared)
        .await
        .unwrap();

    let mut admin = template.dedicated_connection().await.unwrap();
    let killed: i64 = redis::cmd("CLIENT")
        .arg("KILL")
        .arg("ID")
        .arg(client_id)
        .query_async(&mut admin)
        .await
        .unwrap();
    assert_eq!(killed, 1);

    // The first command may observe the dropped link; later ones reconnect
    let mut recovered = false;
    for _ in 0..50 {
        if haus.health_check().await.is_ok() {
            recovered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(recovered, "shared connection did not reconnect");

    haus.utils().set("after", &1).await.unwrap();
    let after: Option<i64> = haus.utils().get("after").await.unwrap();
    assert_eq!(after, Some(1));

    cleanup(&haus).await;
}
