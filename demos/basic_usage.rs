use stack_errors::{Result, StructuredError, ensure_as, namespace_error};

namespace_error! {
    /// Errors raised by the configuration loader.
    pub struct ConfigError("CFG") with [("package", "demo-config"), ("version", "0.1.0")];
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let value: f64 = raw.parse().map_err(|e: std::num::ParseFloatError| {
        ConfigError::wrap(101, "Threshold is not a number", e.to_string())
    })?;
    ensure_as!(
        (0.0..=100.0).contains(&value),
        ConfigError,
        102,
        "Threshold must be between 0 and 100"
    );
    Ok(value)
}

fn load_configuration(raw: &str) -> Result<f64> {
    parse_threshold(raw).map_err(|e| ConfigError::wrap(10, "Configuration is invalid", e).into())
}

fn main() {
    println!("--- Basic Usage Example ---\n");

    for input in ["42", "250", "forty"] {
        match load_configuration(input) {
            Ok(value) => println!("{:>6} -> ok ({})", input, value),
            Err(err) => {
                // One-line form for users.
                println!("{:>6} -> {}", input, err);

                // Whole chain for operators, head first.
                for (depth, link) in err.to_error_stack().iter().enumerate() {
                    println!("         {}{}", "  ".repeat(depth), link);
                }

                // Structured fields for log pipelines.
                err.with_log(|log| println!("         log: {}", log));
            }
        }
    }

    // Any std error can be cast in.
    let io = std::io::Error::other("config file missing");
    let cast = StructuredError::cast(io);
    println!("\ncast foreign error: {}", cast);
}
