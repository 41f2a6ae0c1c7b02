use msgtmpl_schema::{
    Cardinality, DecodeErrorKind, DynamicMessage, Kind, ScalarKind, SchemaError, SchemaRegistry,
    Value, json,
};
use msgtmpl_testhelpers::IPanic;

const ORDERS: &str = r#"{
    "messages": [
        { "name": "shop.Order", "fields": [
            { "name": "order_id", "number": 1, "type": "uint64" },
            { "name": "lines", "number": 2, "type": "shop.Line", "repeated": true },
            { "name": "status", "number": 3, "type": "shop.Status" },
            { "name": "note", "number": 4, "type": "string", "json_name": "remark" }
        ] },
        { "name": "shop.Line", "fields": [
            { "name": "sku", "number": 1, "type": "string" },
            { "name": "quantity", "number": 2, "type": "int32" },
            { "name": "unit_price", "number": 3, "type": "double" }
        ] }
    ],
    "enums": [
        { "name": "shop.Status", "values": [
            { "name": "STATUS_UNSPECIFIED", "number": 0 },
            { "name": "STATUS_PAID", "number": 2 }
        ] }
    ]
}"#;

#[test]
fn loads_document_and_exposes_descriptors() -> Result<(), IPanic> {
    msgtmpl_testhelpers::setup();

    let registry = SchemaRegistry::from_json_str(ORDERS)?;
    let names: Vec<_> = registry
        .messages()
        .map(|message| message.full_name().to_owned())
        .collect();
    assert_eq!(names, ["shop.Order", "shop.Line"]);

    let order = registry.message(".shop.Order").unwrap();
    let lines = order.field_by_json_name("lines").unwrap();
    assert_eq!(lines.cardinality(), Cardinality::Repeated);
    assert_eq!(lines.number(), 2);
    assert_eq!(lines.to_string(), "shop.Order.lines");

    let note = order.field_by_number(4).unwrap();
    assert_eq!(note.name(), "note");
    assert_eq!(note.json_name(), "remark");
    assert!(order.field_by_json_name("note").is_none());

    let line = registry.message("shop.Line").unwrap();
    let price = line.field_by_name("unit_price").unwrap();
    assert_eq!(price.json_name(), "unitPrice");
    assert_eq!(price.kind(), Kind::Scalar(ScalarKind::Double));

    assert!(registry.message("shop.Status").is_none());
    assert_eq!(registry.enumeration("shop.Status").unwrap().default_number(), 0);
    Ok(())
}

#[test]
fn decodes_and_reencodes_an_order() -> Result<(), IPanic> {
    msgtmpl_testhelpers::setup();

    let registry = SchemaRegistry::from_json_str(ORDERS)?;
    let order = registry.message("shop.Order").unwrap();

    let message = json::from_str(
        r#"{
            "order_id": "42",
            "lines": [
                { "sku": "A-1", "quantity": 2, "unitPrice": 1.25 },
                { "sku": "B-7", "quantity": 0 }
            ],
            "status": 2,
            "remark": "leave at door"
        }"#,
        &order,
    )?;

    assert_eq!(message.get_by_name("orderId").unwrap().as_u64(), Some(42));
    assert_eq!(
        message.get_by_name("status").unwrap().as_enum_number(),
        Some(2)
    );

    insta::assert_snapshot!(
        json::to_string(&message),
        @r#"{"orderId":"42","lines":[{"sku":"A-1","quantity":2,"unitPrice":1.25},{"sku":"B-7"}],"status":"STATUS_PAID","remark":"leave at door"}"#
    );
    Ok(())
}

#[test]
fn unset_and_default_values_decode_to_the_same_message() -> Result<(), IPanic> {
    msgtmpl_testhelpers::setup();

    let registry = SchemaRegistry::from_json_str(ORDERS)?;
    let order = registry.message("shop.Order").unwrap();

    let explicit = json::from_str(
        r#"{"orderId": 0, "lines": [], "status": "STATUS_UNSPECIFIED", "remark": ""}"#,
        &order,
    )?;
    assert_eq!(explicit, DynamicMessage::new(order.clone()));
    assert_eq!(json::to_string(&explicit), "{}");
    Ok(())
}

#[test]
fn decode_errors_name_the_offending_location() {
    msgtmpl_testhelpers::setup();

    let registry = SchemaRegistry::from_json_str(ORDERS).unwrap();
    let order = registry.message("shop.Order").unwrap();

    let err = json::from_str(r#"{"lines": [{"quantity": "many"}]}"#, &order).unwrap_err();
    assert!(matches!(err.kind, DecodeErrorKind::InvalidValue { .. }));
    insta::assert_snapshot!(err, @"at lines[0].quantity: invalid value: \"many\" is not an integer (in shop.Line)");

    let err = json::from_str(r#"{"status": "STATUS_LOST"}"#, &order).unwrap_err();
    insta::assert_snapshot!(err, @"at status: `STATUS_LOST` is not a value of enum shop.Status (in shop.Order)");

    let err = json::from_str("[]", &order).unwrap_err();
    insta::assert_snapshot!(err, @"expected object, got array (in shop.Order)");
}

#[test]
fn value_kinds_are_checked_against_fields() {
    msgtmpl_testhelpers::setup();

    let registry = SchemaRegistry::from_json_str(ORDERS).unwrap();
    let order = registry.message("shop.Order").unwrap();
    let mut message = DynamicMessage::new(order);

    message.set_by_name("status", Value::EnumNumber(7)).unwrap();
    let err = message.set_by_name("lines", Value::U64(1)).unwrap_err();
    insta::assert_snapshot!(err, @"field `shop.Order.lines` expects list of message shop.Line, got uint64");
}

#[test]
fn rejects_malformed_documents() {
    msgtmpl_testhelpers::setup();

    let err = SchemaRegistry::from_json_str(r#"{"messages": [{"name": "a.B", "fields": [{"name": "x", "number": 0, "type": "int32"}]}]}"#)
        .unwrap_err();
    insta::assert_snapshot!(err, @"field `a.B.x` uses reserved number 0");

    let err = SchemaRegistry::from_json_str(r#"{"types": []}"#).unwrap_err();
    assert!(matches!(err, SchemaError::Document(_)));

    let err = SchemaRegistry::from_json_str(r#"{"enums": [{"name": "a.E", "values": []}]}"#).unwrap_err();
    insta::assert_snapshot!(err, @"enum `a.E` declares no values");
}
