#![allow(dead_code)]

use std::collections::HashMap;

use msgtmpl::{SchemaRegistry, TemplateCompiler, Value};

/// Message types shaped after the scenarios in the templates under test.
pub const SCHEMA: &str = r#"{
    "messages": [
        { "name": "test.Foo", "fields": [
            { "name": "one", "number": 1, "type": "int32" },
            { "name": "two", "number": 2, "type": "string" }
        ] },
        { "name": "test.Nested", "fields": [
            { "name": "foo", "number": 1, "type": "test.Nested.Foo" }
        ] },
        { "name": "test.Nested.Foo", "fields": [
            { "name": "bar", "number": 1, "type": "string" },
            { "name": "bar2", "number": 2, "type": "test.Nested.Bar2" }
        ] },
        { "name": "test.Nested.Bar2", "fields": [
            { "name": "key", "number": 1, "type": "string" }
        ] },
        { "name": "test.StringList", "fields": [
            { "name": "foo", "number": 1, "type": "string", "repeated": true }
        ] },
        { "name": "test.MessageList", "fields": [
            { "name": "foo", "number": 1, "type": "test.MessageList.Item", "repeated": true }
        ] },
        { "name": "test.MessageList.Item", "fields": [
            { "name": "bar", "number": 1, "type": "string" }
        ] },
        { "name": "test.Kitchen", "fields": [
            { "name": "flag", "number": 1, "type": "bool" },
            { "name": "total", "number": 2, "type": "int64" },
            { "name": "ratio", "number": 3, "type": "double" },
            { "name": "payload", "number": 4, "type": "bytes" },
            { "name": "level", "number": 5, "type": "test.Level" },
            { "name": "counts", "number": 6, "type": "uint64", "repeated": true },
            { "name": "display_name", "number": 7, "type": "string" }
        ] }
    ],
    "enums": [
        { "name": "test.Level", "values": [
            { "name": "LEVEL_UNSPECIFIED", "number": 0 },
            { "name": "LEVEL_LOW", "number": 1 },
            { "name": "LEVEL_HIGH", "number": 2 }
        ] }
    ]
}"#;

pub fn compiler() -> TemplateCompiler {
    msgtmpl_testhelpers::setup();
    let registry = SchemaRegistry::from_json_str(SCHEMA).unwrap();
    TemplateCompiler::new(registry)
}

pub fn args<const N: usize>(pairs: [(&str, Value); N]) -> HashMap<String, Value> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect()
}
