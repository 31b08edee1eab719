use configurable::{Configurable, Configuration, Error, Extension, Value};
use tracing_subscriber::EnvFilter;

struct Greeting;

impl Extension for Greeting {
    fn methods(&self) -> &[&'static str] {
        &["greeting"]
    }

    fn invoke(&self, _method: &str, config: &Configuration) -> Result<Value, Error> {
        let title: Option<String> = config.get_as("title")?;
        let name: Option<String> = config.get_as("name")?;
        let country: String = config.get_as("country")?.unwrap_or_default();

        let who = [title, name].into_iter().flatten().collect::<Vec<_>>().join(" ");
        Ok(Value::String(format!(
            "Hello {who} from {country}, how are you today?"
        )))
    }
}

/// A host with three attributes and a greeting.
#[derive(Configurable)]
#[configurable(attributes(name, title, country), extension = Greeting)]
struct Greeter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // The first access creates the configuration with its defaults
    let config = Greeter::configuration()?;
    println!("Initial config: {:?}", config);

    // The closure receives the shared instance mutably
    Greeter::configure(|c| {
        c.set("name", "John Doe")?;
        c.set("country", "Ireland")
    })?;

    let greeting: String = config.read().call_as("greeting")?;
    println!("{greeting}");
    println!("Params: {}", config.to_params().to_toml_string()?);

    // Undeclared attributes are rejected
    let result = Greeter::configure(|c| c.set("origin", "USA"));
    match result {
        Ok(()) => println!("Update succeeded"),
        Err(e) => println!("Update failed (expected): {}", e),
    }

    Ok(())
}
