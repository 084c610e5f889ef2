//! Sending a structured error across a process boundary as JSON.

use stack_errors::{ErrorVariant, JsonError, StructuredError, namespace_error};

namespace_error! {
    pub struct StorageError("STO") with [("node", "storage-1")];
}

namespace_error! {
    pub struct ApiError("API");
}

/// Runs on the "server": fails and serializes the error.
fn server() -> Result<String, JsonError> {
    let disk = std::io::Error::other("no space left on device");
    let storage = StorageError::wrap(3, "Write failed", disk);
    let api = ApiError::wrap(500, "Upload rejected", storage);
    api.to_json_string_pretty()
}

fn main() -> Result<(), JsonError> {
    println!("--- JSON Transport Example ---\n");

    let wire = server()?;
    println!("wire form:\n{}\n", wire);

    // On the "client": rebuild and inspect.
    let err = StructuredError::from_json_str(&wire)?;
    println!("received: {}", err);
    println!("is ApiError: {}", ApiError::matches(&err));

    for link in err.error_stack() {
        println!(
            "  cause {} (storage: {}, metadata: {:?})",
            link,
            StorageError::matches(link),
            link.metadata().snapshot()
        );
    }

    if let Some(storage) = err.find_code("STO3") {
        println!("storage node: {:?}", storage.metadata().get("node"));
    }

    // The trace never travels.
    println!("trace after transport: {:?}", err.root_cause().trace());
    Ok(())
}
