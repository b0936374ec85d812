use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use ctxjson_serializer::{marshal_with_context, to_value_with_context, Contextual, MarshalError};
use serde_json::{json, Value as JsonValue};

const CTX: &str = "marshalcontext";
const HANDLER: &str = "marshalhandler";

#[derive(Contextual)]
struct Item {
    #[tag(json = "sku")]
    sku: String,
    #[tag(json = "cost", marshalcontext = "internal")]
    cost: f64,
}

fn item(sku: &str, cost: f64) -> Item {
    Item {
        sku: sku.to_string(),
        cost,
    }
}

#[test]
fn test_list_marshals_each_element() -> Result<()> {
    let items = vec![item("a-1", 1.5), item("b-2", 2.0)];

    for context in ["", "internal"] {
        let whole = to_value_with_context(&items, context, CTX, HANDLER)?;
        let parts = items
            .iter()
            .map(|i| to_value_with_context(i, context, CTX, HANDLER))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(whole, JsonValue::Array(parts));
    }

    let public = to_value_with_context(&items, "", CTX, HANDLER)?;
    assert_eq!(public, json!([{"sku": "a-1"}, {"sku": "b-2"}]));
    Ok(())
}

#[test]
fn test_map_marshals_each_value() -> Result<()> {
    let mut stock = HashMap::new();
    stock.insert("north".to_string(), item("n", 3.0));
    stock.insert("south".to_string(), item("s", 4.0));

    let value = to_value_with_context(&stock, "internal", CTX, HANDLER)?;
    assert_eq!(
        value,
        json!({
            "north": {"sku": "n", "cost": 3.0},
            "south": {"sku": "s", "cost": 4.0}
        })
    );

    let public = to_value_with_context(&stock, "", CTX, HANDLER)?;
    for (key, entry) in &stock {
        assert_eq!(
            public[key.as_str()],
            to_value_with_context(entry, "", CTX, HANDLER)?
        );
    }
    Ok(())
}

#[test]
fn test_non_string_map_keys_are_stringified() -> Result<()> {
    let mut by_id = BTreeMap::new();
    by_id.insert(10u32, item("ten", 10.0));
    by_id.insert(2u32, item("two", 2.0));

    let bytes = marshal_with_context(&by_id, "", CTX, HANDLER)?;
    assert_eq!(
        String::from_utf8(bytes)?,
        r#"{"10":{"sku":"ten"},"2":{"sku":"two"}}"#
    );
    Ok(())
}

#[test]
fn test_null_and_indirections() -> Result<()> {
    let missing: Option<Item> = None;
    assert_eq!(marshal_with_context(&missing, "", CTX, HANDLER)?, b"null");

    let boxed = Box::new(item("boxed", 1.0));
    let shared = Arc::new(item("shared", 1.0));
    let counted = Rc::new(Some(item("counted", 1.0)));
    assert_eq!(
        to_value_with_context(&boxed, "", CTX, HANDLER)?,
        json!({"sku": "boxed"})
    );
    assert_eq!(
        to_value_with_context(&shared, "", CTX, HANDLER)?,
        json!({"sku": "shared"})
    );
    assert_eq!(
        to_value_with_context(&counted, "", CTX, HANDLER)?,
        json!({"sku": "counted"})
    );
    Ok(())
}

#[test]
fn test_empty_containers() -> Result<()> {
    let empty_list: Vec<Item> = Vec::new();
    let empty_map: HashMap<String, Item> = HashMap::new();
    assert_eq!(marshal_with_context(&empty_list, "", CTX, HANDLER)?, b"[]");
    assert_eq!(marshal_with_context(&empty_map, "", CTX, HANDLER)?, b"{}");
    Ok(())
}

#[test]
fn test_primitives_and_sets() -> Result<()> {
    let labels: BTreeSet<&str> = ["b", "a", "c"].into_iter().collect();
    assert_eq!(
        to_value_with_context(&labels, "", CTX, HANDLER)?,
        json!(["a", "b", "c"])
    );
    assert_eq!(to_value_with_context(&42i64, "", CTX, HANDLER)?, json!(42));
    assert_eq!(to_value_with_context("text", "", CTX, HANDLER)?, json!("text"));
    assert_eq!(to_value_with_context(&'x', "", CTX, HANDLER)?, json!("x"));
    Ok(())
}

#[test]
fn test_json_value_passthrough() -> Result<()> {
    let raw = json!({"nested": [1, {"deep": true}], "nothing": null});
    assert_eq!(to_value_with_context(&raw, "any", CTX, HANDLER)?, raw);
    Ok(())
}

#[test]
fn test_non_finite_float_is_unsupported() {
    let bad = vec![item("ok", 1.0), item("nan", f64::NAN)];

    let err = marshal_with_context(&bad, "internal", CTX, HANDLER).unwrap_err();
    assert!(matches!(err, MarshalError::UnsupportedValue(_)));

    // the offending field is never traversed outside its context
    let public = marshal_with_context(&bad, "", CTX, HANDLER);
    assert!(public.is_ok());
}

#[derive(Contextual)]
#[contextual(handlers(scaled))]
struct Reading {
    #[tag(json = "ratio")]
    ratio: f32,
    #[tag(json = "samples")]
    samples: Vec<f32>,
    #[tag(json = "scaled", marshalhandler = "scaled")]
    scaled: f32,
}

impl Reading {
    fn scaled(&self, _context: &str) -> f32 {
        self.scaled
    }
}

#[test]
fn test_f32_keeps_single_precision_form() -> Result<()> {
    let reading = Reading {
        ratio: 0.1,
        samples: vec![0.2, 1.25, 3.3],
        scaled: 0.7,
    };

    let bytes = marshal_with_context(&reading, "", CTX, HANDLER)?;
    assert_eq!(
        String::from_utf8(bytes)?,
        r#"{"ratio":0.1,"samples":[0.2,1.25,3.3],"scaled":0.7}"#
    );
    Ok(())
}

#[derive(Contextual)]
#[contextual(handlers(score))]
struct Scored {
    #[tag(json = "score", marshalhandler = "score")]
    score: f64,
}

impl Scored {
    fn score(&self, _context: &str) -> f64 {
        self.score
    }
}

#[test]
fn test_non_finite_handler_output_is_unsupported() -> Result<()> {
    for score in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = marshal_with_context(&Scored { score }, "", CTX, HANDLER).unwrap_err();
        assert!(matches!(err, MarshalError::UnsupportedValue(_)));
    }

    let finite = to_value_with_context(&Scored { score: 2.5 }, "", CTX, HANDLER)?;
    assert_eq!(finite, json!({"score": 2.5}));

    let reading = Reading {
        ratio: 0.0,
        samples: Vec::new(),
        scaled: f32::NAN,
    };
    let err = marshal_with_context(&reading, "", CTX, HANDLER).unwrap_err();
    assert!(matches!(err, MarshalError::UnsupportedValue(_)));
    Ok(())
}
