#![no_main]

use libfuzzer_sys::fuzz_target;

use stack_errors::StructuredError;

fuzz_target!(|data: &[u8]| {
    if let Ok(err) = StructuredError::from_json_slice(data) {
        // Anything that decodes must re-encode and decode to the same error.
        let text = err.to_json_string().expect("re-encode decoded error");
        let again = StructuredError::from_json_str(&text).expect("decode re-encoded error");
        assert_eq!(again, err);
        assert_eq!(again.depth(), err.depth());
    }
});
