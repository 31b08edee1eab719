use configurable::{
    AttributeSet, Configuration, ConfigurationClass, Declaration, DefaultMap, Error, Extension,
    Methods, Value,
};

/// Helper to build a class from attribute names only
fn class_of(attributes: &[&str]) -> ConfigurationClass {
    let declaration = Declaration::new(attributes.iter().copied(), DefaultMap::new(), ())
        .expect("Failed to declare");
    ConfigurationClass::build(&declaration)
}

fn string(value: &str) -> Value {
    Value::String(value.to_string())
}

/// Counts how often it was initialized and offers a mutating `bump`.
struct Counter;

impl Extension for Counter {
    fn methods(&self) -> &[&'static str] {
        &["bump", "current"]
    }

    fn invoke(&self, method: &str, config: &Configuration) -> Result<Value, Error> {
        match method {
            "current" => Ok(Value::U32(config.get_as("count")?.unwrap_or(0))),
            _ => Err(Error::Extension(format!("{method} needs mutable access"))),
        }
    }

    fn invoke_mut(&self, method: &str, config: &mut Configuration) -> Result<Value, Error> {
        match method {
            "bump" => {
                let count: u32 = config.get_as("count")?.unwrap_or(0);
                config.set("count", count + 1)?;
                Ok(Value::U32(count + 1))
            }
            _ => self.invoke(method, config),
        }
    }

    fn initialize(&self, config: &mut Configuration) -> Result<(), Error> {
        if config.get("count")?.is_none() {
            config.set("count", 0u32)?;
        }
        Ok(())
    }
}

#[test]
fn test_fresh_instance_is_null() {
    let config = class_of(&["name", "title"])
        .construct(Vec::new())
        .expect("Failed to construct");

    assert_eq!(config.get("name").unwrap(), None);
    assert_eq!(config.get("title").unwrap(), None);
    assert!(config.to_params().is_empty());
}

#[test]
fn test_construct_is_positional() {
    let config = class_of(&["name", "title", "country"])
        .construct([Some(string("Jane")), None])
        .expect("Failed to construct");

    assert_eq!(config.get("name").unwrap(), Some(&string("Jane")));
    assert_eq!(config.get("title").unwrap(), None);
    assert_eq!(config.get("country").unwrap(), None);
}

#[test]
fn test_construct_ignores_declared_defaults() {
    let declaration = Declaration::builder()
        .attribute("title")
        .default_value("name", "John Doe")
        .expect("Failed to serialize default")
        .build()
        .expect("Failed to declare");

    let class = ConfigurationClass::build(&declaration);
    let bare = class.construct(Vec::new()).expect("Failed to construct");
    assert_eq!(bare.get("name").unwrap(), None);

    let defaulted = class
        .construct(declaration.ordered_defaults())
        .expect("Failed to construct");
    assert_eq!(defaulted.get("name").unwrap(), Some(&string("John Doe")));
}

#[test]
fn test_construct_with_too_many_values_fails() {
    let result = class_of(&["name"]).construct([Some(string("a")), Some(string("b"))]);

    match result {
        Err(Error::Arity { expected, given }) => {
            assert_eq!(expected, 1);
            assert_eq!(given, 2);
        }
        other => panic!("Expected Arity error, got {other:?}"),
    }
}

#[test]
fn test_unknown_attribute_is_rejected_everywhere() {
    let mut config = class_of(&["name"])
        .construct(Vec::new())
        .expect("Failed to construct");

    assert!(matches!(config.get("origin"), Err(Error::UnknownAttribute(_))));
    assert!(matches!(config.set("origin", "USA"), Err(Error::UnknownAttribute(_))));
    assert!(matches!(
        config.set_value("origin", None),
        Err(Error::UnknownAttribute(_))
    ));
    assert!(matches!(config.clear("origin"), Err(Error::UnknownAttribute(_))));
    assert!(matches!(
        config.get_as::<String>("origin"),
        Err(Error::UnknownAttribute(_))
    ));
}

#[test]
fn test_setting_none_resets_to_null() {
    let mut config = class_of(&["name", "title"])
        .construct(Vec::new())
        .expect("Failed to construct");

    config.set("name", Some("Jane")).unwrap();
    assert_eq!(config.get("name").unwrap(), Some(&string("Jane")));

    config.set("name", None::<String>).unwrap();
    assert_eq!(config.get("name").unwrap(), None);

    config.set("title", "Dr.").unwrap();
    config.clear("title").unwrap();
    assert!(config.to_params().is_empty());
}

#[test]
fn test_to_params_keeps_declared_order() {
    let mut config = class_of(&["name", "title", "country"])
        .construct(Vec::new())
        .expect("Failed to construct");

    config.set("country", "Ireland").unwrap();
    config.set("name", "John Doe").unwrap();

    let params = config.to_params();
    assert_eq!(params.names().collect::<Vec<_>>(), ["name", "country"]);
    assert_eq!(params.get("title"), None);
    assert_eq!(
        params.get_as::<String>("country").unwrap().as_deref(),
        Some("Ireland")
    );
}

#[test]
fn test_params_render_as_toml() {
    let mut config = class_of(&["name", "port", "debug"])
        .construct(Vec::new())
        .expect("Failed to construct");

    config.set("name", "api").unwrap();
    config.set("port", 8080u16).unwrap();

    let toml = config.to_params().to_toml_string().expect("Failed to render");
    assert!(toml.contains("name = \"api\""));
    assert!(toml.contains("port = 8080"));
    assert!(!toml.contains("debug"));
}

#[test]
fn test_params_into_value_is_a_map() {
    let mut config = class_of(&["name"])
        .construct(Vec::new())
        .expect("Failed to construct");
    config.set("name", "Jane").unwrap();

    match config.to_params().into_value() {
        Value::Map(map) => {
            assert_eq!(map.len(), 1);
            assert_eq!(map.get(&string("name")), Some(&string("Jane")));
        }
        other => panic!("Expected a map, got {other:?}"),
    }
}

#[test]
fn test_apply_restores_params() {
    let class = class_of(&["name", "title", "country"]);
    let mut original = class.construct(Vec::new()).expect("Failed to construct");
    original.set("name", "John Doe").unwrap();
    original.set("country", "Ireland").unwrap();

    let mut copy = class.construct(Vec::new()).expect("Failed to construct");
    copy.apply(&original.to_params()).expect("Failed to apply");

    assert_eq!(copy.to_params(), original.to_params());
}

#[test]
fn test_empty_declaration_is_valueless() {
    let config = class_of(&[]).construct(Vec::new()).expect("Failed to construct");

    assert!(config.attributes().is_empty());
    assert!(config.to_params().is_empty());
    assert!(matches!(
        class_of(&[]).construct([None]),
        Err(Error::Arity { expected: 0, given: 1 })
    ));
}

#[test]
fn test_builds_are_not_interned() {
    let declaration = Declaration::new(["name"], DefaultMap::new(), ()).unwrap();
    let first = ConfigurationClass::build(&declaration);
    let second = ConfigurationClass::build(&declaration);

    assert!(!first.ptr_eq(&second));
    assert!(first.ptr_eq(&first.clone()));
}

#[test]
fn test_extension_initialize_and_mutating_methods() {
    let declaration = Declaration::builder()
        .attribute("count")
        .extension(Counter)
        .build()
        .expect("Failed to declare");
    let class = ConfigurationClass::build(&declaration);

    let mut config = class.construct(Vec::new()).expect("Failed to construct");
    assert_eq!(config.get_as::<u32>("count").unwrap(), Some(0));

    assert_eq!(config.call_mut("bump").unwrap(), Value::U32(1));
    assert_eq!(config.call_mut("bump").unwrap(), Value::U32(2));
    assert_eq!(config.call_as::<u32>("current").unwrap(), 2);

    assert!(matches!(config.call("bump"), Err(Error::Extension(_))));
    assert!(matches!(config.call("reset"), Err(Error::UnknownMethod(_))));

    let seeded = class
        .construct([Some(Value::U32(7))])
        .expect("Failed to construct");
    assert_eq!(seeded.call_as::<u32>("current").unwrap(), 7);
}

#[test]
fn test_closure_methods_read_attributes() {
    let declaration = Declaration::builder()
        .attribute("host")
        .default_value("port", 80u16)
        .unwrap()
        .extension(Methods::new().method("address", |c| {
            let host: String = c.get_as("host")?.unwrap_or_default();
            let port: u16 = c.get_as("port")?.unwrap_or_default();
            Ok(format!("{host}:{port}"))
        }))
        .build()
        .expect("Failed to declare");

    let mut config = ConfigurationClass::build(&declaration)
        .construct(declaration.ordered_defaults())
        .expect("Failed to construct");
    config.set("host", "localhost").unwrap();

    assert!(config.responds_to("address"));
    assert_eq!(
        config.call_as::<String>("address").unwrap(),
        "localhost:80"
    );
}

#[test]
fn test_declaration_collisions_are_rejected() {
    let attribute_collision = Declaration::builder()
        .attribute("address")
        .extension(Methods::new().method("address", |_| Ok("x")))
        .build();
    assert!(matches!(
        attribute_collision,
        Err(Error::MethodCollision(name)) if name == "address"
    ));

    let default_collision = Declaration::builder()
        .default_value("address", "x")
        .unwrap()
        .extension(Methods::new().method("address", |_| Ok("x")))
        .build();
    assert!(matches!(default_collision, Err(Error::MethodCollision(_))));

    let builtin_collision = Declaration::builder()
        .attribute("name")
        .extension(Methods::new().method("to_params", |_| Ok(0)))
        .build();
    assert!(matches!(builtin_collision, Err(Error::MethodCollision(_))));

    let duplicate_method = Declaration::builder()
        .extension(
            Methods::new()
                .method("greet", |_| Ok("a"))
                .method("greet", |_| Ok("b")),
        )
        .build();
    assert!(matches!(duplicate_method, Err(Error::MethodCollision(_))));
}

#[test]
fn test_empty_attribute_name_is_rejected() {
    assert!(matches!(
        Declaration::builder().attribute("").build(),
        Err(Error::InvalidAttributeName)
    ));
    assert!(matches!(
        Declaration::new(["name"], DefaultMap::new().with("", 1).unwrap(), ()),
        Err(Error::InvalidAttributeName)
    ));
}

#[test]
fn test_later_default_replaces_earlier() {
    let declaration = Declaration::builder()
        .default_value("name", "first")
        .unwrap()
        .default_value("name", "second")
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(declaration.attributes().len(), 1);
    assert_eq!(declaration.defaults().get("name"), Some(&string("second")));
    assert_eq!(declaration.ordered_defaults(), vec![Some(string("second"))]);
}

#[test]
fn test_builder_without_fields_builds_empty_declaration() {
    let declaration = Declaration::builder()
        .build()
        .expect("Builder without fields should succeed");

    assert!(declaration.attributes().is_empty());
    assert!(declaration.defaults().is_empty());
    assert!(declaration.extension().methods().is_empty());
}

#[test]
fn test_default_map_tracks_entries() {
    let mut defaults = DefaultMap::new();
    assert!(defaults.is_empty());

    defaults.insert("name", string("John Doe"));
    defaults.insert("name", string("Jane"));
    defaults.insert("country", string("Ireland"));

    assert_eq!(defaults.len(), 2);
    assert!(!defaults.is_empty());
    assert_eq!(defaults.keys().collect::<Vec<_>>(), ["name", "country"]);
    assert_eq!(defaults.get("name"), Some(&string("Jane")));
}

#[test]
fn test_attribute_set_collects_and_iterates() {
    let set: AttributeSet = ["name", "title", "name"].into_iter().collect();
    assert_eq!(set.len(), 2);

    let mut seen = Vec::new();
    for name in &set {
        seen.push(name.clone());
    }
    assert_eq!(seen, ["name", "title"]);
}

#[test]
fn test_params_iterate_in_declared_order() {
    let mut config = class_of(&["name", "title", "country"])
        .construct(Vec::new())
        .expect("Failed to construct");
    config.set("country", "Ireland").unwrap();
    config.set("name", "Jane").unwrap();
    let params = config.to_params();

    let borrowed: Vec<&str> = (&params).into_iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(borrowed, ["name", "country"]);

    let owned: Vec<(String, Value)> = params.into_iter().collect();
    assert_eq!(
        owned,
        vec![
            ("name".to_string(), string("Jane")),
            ("country".to_string(), string("Ireland")),
        ]
    );
}
